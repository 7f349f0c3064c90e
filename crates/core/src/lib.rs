//! # Briefing Core
//!
//! Core logic for publishing daily market briefings and monthly reports.
//!
//! This crate contains the conversion rules and the storage/versioning of published records:
//! - Briefing markdown to HTML conversion, plus the optional investment advice fragment
//! - Date-keyed JSON records under `briefings/` and `monthly/` with their indexes
//! - Age-based pruning of daily records
//! - Git commit (and push) of every change through the [`CommitSink`] capability
//!
//! **No process concerns**: argument parsing, environment lookup and logging setup belong in
//! the `briefing` CLI crate.

pub mod advice;
pub mod briefing;
pub mod clock;
pub mod config;
pub mod constants;
pub mod dates;
pub mod error;
pub mod git;
pub mod index;
pub mod markdown;
pub mod monthly;
pub mod store;

pub use advice::{compose_html, render_investment_advice, InvestmentAdvice};
pub use briefing::{BriefingRecord, BriefingStore, PublishReceipt};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{CoreConfig, GitSettings};
pub use dates::YearMonth;
pub use error::{PublishError, PublishResult};
pub use git::{
    CommitDomain, CommitMessage, CommitSink, GitCommitSink, NoopCommitSink, RecordingCommitSink,
};
pub use index::KeyIndex;
pub use markdown::{convert_inline, md_to_html};
pub use monthly::{MonthlyAggregator, MonthlyReceipt, MonthlyRecord};
pub use store::{FsStore, MemoryStore, RecordStore};
