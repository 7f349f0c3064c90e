use anyhow::Context;
use briefing_core::config::{
    git_settings_from_env_values, resolve_repo_dir, retention_days_from_env_value,
    utc_offset_from_env_value,
};
use briefing_core::{
    compose_html, BriefingStore, CommitMessage, CommitSink, CoreConfig, FsStore, GitCommitSink,
    InvestmentAdvice, MonthlyAggregator, NoopCommitSink, PublishResult, SystemClock, YearMonth,
};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "briefing")]
#[command(about = "Publish daily market briefings and monthly reports")]
struct Cli {
    /// Repository working tree holding the published records
    #[arg(long, global = true, env = "BRIEFING_REPO_DIR")]
    repo: Option<PathBuf>,
    /// Write files but skip git commit and push
    #[arg(long, global = true)]
    no_commit: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the HTML for a briefing without publishing it
    Render {
        /// Briefing markdown ('-' reads stdin)
        markdown: String,
        /// Global investment advice
        advice_global: Option<String>,
        /// Korean investment advice
        advice_korea: Option<String>,
    },
    #[command(flatten)]
    Repo(RepoCommands),
}

/// Commands that read or write the briefing repository.
#[derive(Subcommand)]
enum RepoCommands {
    /// Publish today's briefing
    Publish {
        /// Briefing markdown ('-' reads stdin)
        markdown: String,
        /// Display date (defaults to today's date in Korean)
        date: Option<String>,
        /// Global investment advice
        advice_global: Option<String>,
        /// Korean investment advice
        advice_korea: Option<String>,
    },
    /// Publish a monthly report and prune old briefings
    Monthly {
        /// Month key (YYYY-MM)
        year_month: String,
        /// Report markdown ('-' reads stdin)
        markdown: String,
        /// Global investment advice
        advice_global: Option<String>,
        /// Korean investment advice
        advice_korea: Option<String>,
    },
    /// List the briefings of a month
    List {
        /// Month key (YYYY-MM)
        year_month: String,
    },
    /// Remove old briefings
    Prune {
        /// Age cutoff in days (defaults to BRIEFING_RETENTION_DAYS or 60)
        #[arg(long)]
        days: Option<i64>,
    },
}

/// Commit sink chosen at startup from `--no-commit`.
enum Sink {
    Git(GitCommitSink),
    Noop(NoopCommitSink),
}

impl CommitSink for Sink {
    fn commit(&self, paths: &[String], message: &CommitMessage) -> PublishResult<()> {
        match self {
            Self::Git(sink) => sink.commit(paths, message),
            Self::Noop(sink) => sink.commit(paths, message),
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Resolves core configuration from `--repo` and the `BRIEFING_*` environment variables.
fn load_config(repo: Option<PathBuf>) -> anyhow::Result<CoreConfig> {
    let repo_dir = resolve_repo_dir(repo, std::env::var_os("HOME").map(PathBuf::from))?;
    let display_offset = utc_offset_from_env_value(env_value("BRIEFING_UTC_OFFSET_HOURS"))?;
    let retention_days = retention_days_from_env_value(env_value("BRIEFING_RETENTION_DAYS"))?;
    let git = git_settings_from_env_values(
        env_value("BRIEFING_GIT_REMOTE"),
        env_value("BRIEFING_GIT_BRANCH"),
        env_value("BRIEFING_GIT_PUSH"),
        env_value("BRIEFING_AUTHOR_NAME"),
        env_value("BRIEFING_AUTHOR_EMAIL"),
    )?;

    Ok(CoreConfig::new(
        repo_dir,
        display_offset,
        retention_days,
        git,
    )?)
}

fn read_markdown(arg: String) -> anyhow::Result<String> {
    if arg != "-" {
        return Ok(arg);
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read markdown from stdin")?;
    Ok(buf)
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("briefing=info".parse()?)
                .add_directive("briefing_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            markdown,
            advice_global,
            advice_korea,
        } => {
            let markdown = read_markdown(markdown)?;
            let advice = InvestmentAdvice::new(advice_global, advice_korea);
            println!("{}", compose_html(&markdown, &advice));
            Ok(())
        }
        Commands::Repo(command) => {
            let cfg = Arc::new(load_config(cli.repo)?);
            run(command, cfg, cli.no_commit)
        }
    }
}

fn run(command: RepoCommands, cfg: Arc<CoreConfig>, no_commit: bool) -> anyhow::Result<()> {
    tracing::debug!("using repository {}", cfg.repo_dir().display());

    let sink = if no_commit {
        Sink::Noop(NoopCommitSink)
    } else {
        Sink::Git(GitCommitSink::new(cfg.repo_dir(), cfg.git().clone()))
    };
    let service = BriefingStore::new(
        cfg.clone(),
        FsStore::new(cfg.repo_dir()),
        sink,
        SystemClock,
    );

    match command {
        RepoCommands::Publish {
            markdown,
            date,
            advice_global,
            advice_korea,
        } => {
            let markdown = read_markdown(markdown)?;
            let advice = InvestmentAdvice::new(advice_global, advice_korea);
            let receipt = service
                .publish(&markdown, date.as_deref(), &advice)
                .context("failed to publish briefing")?;
            println!("✅ 퍼블리싱 완료: {} ({})", receipt.date, receipt.date_key);
        }
        RepoCommands::Monthly {
            year_month,
            markdown,
            advice_global,
            advice_korea,
        } => {
            let markdown = read_markdown(markdown)?;
            let advice = InvestmentAdvice::new(advice_global, advice_korea);
            let receipt = MonthlyAggregator::new(&service)
                .publish_month(&year_month, &markdown, &advice)
                .with_context(|| format!("failed to publish monthly report {}", year_month))?;
            if !receipt.pruned.is_empty() {
                println!("🗑️  오래된 브리핑 {}개 정리 완료", receipt.pruned.len());
            }
            println!("✅ 월간 리포트 퍼블리싱 완료: {}", receipt.month);
        }
        RepoCommands::List { year_month } => {
            let month = YearMonth::parse(&year_month)?;
            let records = service
                .list_for_month(&month)
                .context("failed to list briefings")?;
            println!("{} 브리핑 {}개:", month, records.len());
            for record in records {
                let date = if record.date.is_empty() {
                    "unknown"
                } else {
                    record.date.as_str()
                };
                println!("  - {} ({})", date, record.date_key);
            }
        }
        RepoCommands::Prune { days } => {
            let days = days.unwrap_or(cfg.retention_days());
            let removed = service
                .prune_and_commit(days)
                .context("failed to prune briefings")?;
            println!("🗑️  오래된 브리핑 {}개 정리 완료", removed.len());
        }
    }

    Ok(())
}
