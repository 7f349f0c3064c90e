use briefing_core::{
    compose_html, BriefingRecord, BriefingStore, CoreConfig, FixedClock, FsStore, GitCommitSink,
    GitSettings, InvestmentAdvice, MonthlyAggregator, YearMonth,
};
use chrono::{TimeZone, Utc};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn init_repo(dir: &Path) -> git2::Repository {
    let repo = git2::Repository::init(dir).expect("init should succeed");
    {
        let mut config = repo.config().expect("config should open");
        config.set_str("user.name", "Test Author").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
    }
    repo
}

fn head_summary(repo: &git2::Repository) -> String {
    repo.head()
        .unwrap()
        .peel_to_commit()
        .unwrap()
        .summary()
        .unwrap()
        .to_string()
}

#[test]
fn test_daily_and_monthly_publish_end_to_end() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let repo = init_repo(temp_dir.path());

    // An old briefing left over from an earlier run.
    fs::create_dir_all(temp_dir.path().join("briefings")).unwrap();
    fs::write(temp_dir.path().join("briefings/2020-01-01.json"), "{}").unwrap();
    fs::write(
        temp_dir.path().join("briefings/index.json"),
        "[\n  \"2020-01-01\"\n]",
    )
    .unwrap();

    let git = GitSettings {
        push: false,
        ..GitSettings::default()
    };
    let cfg = Arc::new(
        CoreConfig::new(
            temp_dir.path().to_path_buf(),
            chrono::FixedOffset::east_opt(9 * 3600).unwrap(),
            60,
            git.clone(),
        )
        .expect("config should be valid"),
    );
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 0, 30, 0).unwrap();
    let service = BriefingStore::new(
        cfg,
        FsStore::new(temp_dir.path()),
        GitCommitSink::new(temp_dir.path(), git),
        FixedClock(now),
    );

    let markdown = "## Markets\n- Stocks rose **2%** today 📎 Reuters\n💡 Watch [rates](https://example.com)";
    let advice = InvestmentAdvice::new(Some("Hold *cash*".into()), None);
    let receipt = service
        .publish(markdown, None, &advice)
        .expect("publish should succeed");
    assert_eq!(receipt.date_key, "2026-10-19");
    assert_eq!(head_summary(&repo), "briefing: 2026-10-19");

    let records = service
        .list_for_month(&YearMonth::parse("2026-10").unwrap())
        .expect("list should succeed");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].html, compose_html(markdown, &advice));

    let on_disk: BriefingRecord = serde_json::from_slice(
        &fs::read(temp_dir.path().join("briefings/2026-10-19.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(on_disk, records[0]);

    let monthly = MonthlyAggregator::new(&service)
        .publish_month("2026-09", "## September\nQuiet month", &InvestmentAdvice::default())
        .expect("monthly publish should succeed");
    assert_eq!(monthly.pruned, vec!["2020-01-01"]);
    assert_eq!(
        head_summary(&repo),
        "monthly: 2026-09 report + prune old briefings"
    );

    assert!(!temp_dir.path().join("briefings/2020-01-01.json").exists());
    let index: Vec<String> =
        serde_json::from_slice(&fs::read(temp_dir.path().join("briefings/index.json")).unwrap())
            .unwrap();
    assert_eq!(index, vec!["2026-10-19"]);

    let tree = repo.head().unwrap().peel_to_tree().unwrap();
    assert!(tree.get_path(Path::new("monthly/2026-09.json")).is_ok());
    assert!(tree.get_path(Path::new("monthly/index.json")).is_ok());
    assert!(tree.get_path(Path::new("briefings/2026-10-19.json")).is_ok());
    assert!(tree.get_path(Path::new("briefings/2020-01-01.json")).is_err());

    let mut revwalk = repo.revwalk().unwrap();
    revwalk.push_head().unwrap();
    assert_eq!(revwalk.count(), 2);
}
