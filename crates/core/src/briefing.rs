//! Daily briefing records.
//!
//! Each publish writes one `briefings/{dateKey}.json` record, refreshes
//! `briefings/index.json` and commits both. Records older than the retention window are
//! pruned from disk and from the index together, so the index always lists exactly the
//! records that exist.

use crate::advice::{compose_html, InvestmentAdvice};
use crate::clock::Clock;
use crate::config::CoreConfig;
use crate::constants::{BRIEFINGS_DIR_NAME, INDEX_FILENAME};
use crate::dates::{self, date_key, generated_at, parse_date_key, YearMonth};
use crate::error::{PublishError, PublishResult};
use crate::git::{CommitDomain, CommitMessage, CommitSink};
use crate::index::{to_pretty_json, KeyIndex};
use crate::store::RecordStore;
use chrono::{NaiveTime, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A published daily briefing, as stored on disk.
///
/// Missing fields read back as empty strings so hand-edited records still list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BriefingRecord {
    pub date: String,
    pub date_key: String,
    pub html: String,
    pub generated_at: String,
}

/// What a successful publish wrote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishReceipt {
    pub date_key: String,
    pub date: String,
    /// Store key of the record, e.g. `briefings/2026-10-19.json`.
    pub path: String,
}

/// Store key of the daily record for `date_key`.
pub fn record_path(date_key: &str) -> String {
    format!("{}/{}.json", BRIEFINGS_DIR_NAME, date_key)
}

/// Store key of the daily index.
pub fn index_path() -> String {
    format!("{}/{}", BRIEFINGS_DIR_NAME, INDEX_FILENAME)
}

/// Store keys of the records behind `keys`.
pub fn paths_for_pruned(keys: &[String]) -> Vec<String> {
    keys.iter().map(|k| record_path(k)).collect()
}

/// Service for publishing, pruning and listing daily briefings.
pub struct BriefingStore<S, G, C> {
    cfg: Arc<CoreConfig>,
    store: S,
    sink: G,
    clock: C,
}

impl<S, G, C> BriefingStore<S, G, C>
where
    S: RecordStore,
    G: CommitSink,
    C: Clock,
{
    pub fn new(cfg: Arc<CoreConfig>, store: S, sink: G, clock: C) -> Self {
        Self {
            cfg,
            store,
            sink,
            clock,
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sink(&self) -> &G {
        &self.sink
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Publishes today's briefing.
    ///
    /// The record for today's date key is written (overwriting any earlier publish on the
    /// same day), the index is updated, and both files are committed with the message
    /// `briefing: {dateKey}`.
    ///
    /// # Arguments
    ///
    /// * `markdown` - Briefing body in the lightweight markdown dialect.
    /// * `display_date` - Human-readable date shown on the page. When `None` or empty, the
    ///   Korean-formatted date of the publish instant is used.
    /// * `advice` - Optional advice blocks appended after the briefing body.
    ///
    /// # Errors
    ///
    /// Returns a `PublishError` if:
    /// - the existing index cannot be read or parsed,
    /// - writing the record or index fails,
    /// - the commit sink fails. Files already written are left in place.
    pub fn publish(
        &self,
        markdown: &str,
        display_date: Option<&str>,
        advice: &InvestmentAdvice,
    ) -> PublishResult<PublishReceipt> {
        let now = self.clock.now();
        let offset = self.cfg.display_offset();
        let key = date_key(now, offset);
        let date = display_date
            .filter(|d| !d.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| dates::display_date(now, offset));

        let record = BriefingRecord {
            date: date.clone(),
            date_key: key.clone(),
            html: compose_html(markdown, advice),
            generated_at: generated_at(now),
        };
        let path = record_path(&key);
        self.store.write(&path, &to_pretty_json(&record)?)?;
        tracing::info!("wrote briefing {}", path);

        let mut index = KeyIndex::load(&self.store, &index_path())?;
        index.insert_sorted_desc(&key);
        index.save(&self.store, &index_path())?;

        let msg = CommitMessage::new(CommitDomain::Briefing, key.as_str())?;
        self.sink.commit(&[path.clone(), index_path()], &msg)?;

        Ok(PublishReceipt {
            date_key: key,
            date,
            path,
        })
    }

    /// Removes daily records older than `cutoff_days`.
    ///
    /// A key is removed when midnight UTC of its date is strictly before `now - cutoff_days`.
    /// Keys that do not parse as dates are kept. A removed key's file is deleted if it exists.
    /// The index is rewritten, keeping the original order, only when something was removed.
    ///
    /// Nothing is committed; see [`Self::prune_and_commit`].
    ///
    /// # Returns
    ///
    /// The removed keys, in index order.
    ///
    /// # Errors
    ///
    /// Returns `PublishError::InvalidInput` for a negative or out-of-range `cutoff_days`, or a
    /// store error if the index cannot be read or a file cannot be removed.
    pub fn prune_older_than(&self, cutoff_days: i64) -> PublishResult<Vec<String>> {
        let window = TimeDelta::try_days(cutoff_days)
            .filter(|_| cutoff_days >= 0)
            .ok_or_else(|| {
                PublishError::InvalidInput(format!("invalid prune window: {} days", cutoff_days))
            })?;
        let cutoff = self.clock.now().checked_sub_signed(window).ok_or_else(|| {
            PublishError::InvalidInput(format!("invalid prune window: {} days", cutoff_days))
        })?;

        let index = KeyIndex::load(&self.store, &index_path())?;
        let (kept, removed) = index.partition(|key| match parse_date_key(key) {
            Some(date) => Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)) < cutoff,
            None => {
                tracing::warn!("keeping unparseable briefing key '{}'", key);
                false
            }
        });

        if removed.is_empty() {
            return Ok(removed);
        }

        for key in &removed {
            let path = record_path(key);
            if self.store.remove(&path)? {
                tracing::info!("pruned briefing {}", path);
            } else {
                tracing::debug!("pruned key {} had no record file", key);
            }
        }
        kept.save(&self.store, &index_path())?;

        Ok(removed)
    }

    /// Prunes like [`Self::prune_older_than`] and commits the result.
    ///
    /// When something was removed, the index and every removed record path are committed
    /// with the message `briefing: prune N old briefings`.
    pub fn prune_and_commit(&self, cutoff_days: i64) -> PublishResult<Vec<String>> {
        let removed = self.prune_older_than(cutoff_days)?;
        if removed.is_empty() {
            tracing::info!("no briefings older than {} days", cutoff_days);
            return Ok(removed);
        }

        let mut paths = vec![index_path()];
        paths.extend(paths_for_pruned(&removed));
        let msg = CommitMessage::new(
            CommitDomain::Briefing,
            format!("prune {} old briefings", removed.len()),
        )?;
        self.sink.commit(&paths, &msg)?;

        Ok(removed)
    }

    /// Lists the records of `month`, in index order.
    ///
    /// Indexed keys whose record file is missing or is not a JSON object are skipped. Fields
    /// absent from a record come back empty, except `dateKey`, which falls back to the index key.
    ///
    /// # Errors
    ///
    /// Returns a `PublishError` if the index cannot be read or parsed, or a record file cannot
    /// be read.
    pub fn list_for_month(&self, month: &YearMonth) -> PublishResult<Vec<BriefingRecord>> {
        let index = KeyIndex::load(&self.store, &index_path())?;

        let mut records = Vec::new();
        for key in index.keys().iter().filter(|k| month.contains(k)) {
            let Some(bytes) = self.store.read(&record_path(key))? else {
                tracing::debug!("skipping {}: record file is missing", key);
                continue;
            };
            let mut record: BriefingRecord = match serde_json::from_slice(&bytes) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!("skipping {}: unreadable record: {}", key, e);
                    continue;
                }
            };
            if record.date_key.is_empty() {
                record.date_key = key.clone();
            }
            records.push(record);
        }
        Ok(records)
    }
}
