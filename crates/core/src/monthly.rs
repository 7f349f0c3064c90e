//! Monthly reports.
//!
//! A monthly report is published alongside a retention sweep of the daily briefings, and both
//! land in a single commit.

use crate::advice::{compose_html, InvestmentAdvice};
use crate::briefing::{self, paths_for_pruned, BriefingStore};
use crate::clock::Clock;
use crate::constants::{INDEX_FILENAME, MONTHLY_DIR_NAME};
use crate::dates::{generated_at, YearMonth};
use crate::error::PublishResult;
use crate::git::{CommitDomain, CommitMessage, CommitSink};
use crate::index::{to_pretty_json, KeyIndex};
use crate::store::RecordStore;
use serde::{Deserialize, Serialize};

/// A published monthly report, as stored on disk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRecord {
    pub month: String,
    pub html: String,
    pub generated_at: String,
}

/// What a successful monthly publish wrote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthlyReceipt {
    pub month: String,
    pub path: String,
    /// Daily keys removed by the retention sweep.
    pub pruned: Vec<String>,
}

pub fn record_path(month: &YearMonth) -> String {
    format!("{}/{}.json", MONTHLY_DIR_NAME, month)
}

pub fn index_path() -> String {
    format!("{}/{}", MONTHLY_DIR_NAME, INDEX_FILENAME)
}

/// Publishes monthly reports through the same store, sink and clock as the daily briefings.
pub struct MonthlyAggregator<'a, S, G, C> {
    briefings: &'a BriefingStore<S, G, C>,
}

impl<'a, S, G, C> MonthlyAggregator<'a, S, G, C>
where
    S: RecordStore,
    G: CommitSink,
    C: Clock,
{
    pub fn new(briefings: &'a BriefingStore<S, G, C>) -> Self {
        Self { briefings }
    }

    /// Publishes the report for `year_month` and prunes old daily briefings.
    ///
    /// # Arguments
    ///
    /// * `year_month` - Month key, `YYYY-MM` or `YYYY-M`.
    /// * `markdown` - Report body.
    /// * `advice` - Optional advice blocks appended after the body.
    ///
    /// # Returns
    ///
    /// A receipt with the normalised month, the record path and the pruned daily keys.
    ///
    /// # Errors
    ///
    /// Returns `PublishError::InvalidMonth` for a malformed month, or any store or commit
    /// error. Files written before a failing commit are left in place.
    pub fn publish_month(
        &self,
        year_month: &str,
        markdown: &str,
        advice: &InvestmentAdvice,
    ) -> PublishResult<MonthlyReceipt> {
        let month = YearMonth::parse(year_month)?;
        let store = self.briefings.store();

        let record = MonthlyRecord {
            month: month.to_string(),
            html: compose_html(markdown, advice),
            generated_at: generated_at(self.briefings.clock().now()),
        };
        let path = record_path(&month);
        store.write(&path, &to_pretty_json(&record)?)?;
        tracing::info!("wrote monthly report {}", path);

        let mut index = KeyIndex::load(store, &index_path())?;
        if index.insert_front_if_absent(&record.month) {
            index.save(store, &index_path())?;
        }

        let pruned = self
            .briefings
            .prune_older_than(self.briefings.config().retention_days())?;

        let mut paths = vec![path.clone(), index_path(), briefing::index_path()];
        paths.extend(paths_for_pruned(&pruned));
        let msg = CommitMessage::new(
            CommitDomain::Monthly,
            format!("{} report + prune old briefings", month),
        )?;
        self.briefings.sink().commit(&paths, &msg)?;

        Ok(MonthlyReceipt {
            month: record.month,
            path,
            pruned,
        })
    }
}
