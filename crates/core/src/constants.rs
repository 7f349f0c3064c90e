//! Constants used throughout the briefing core crate.
//!
//! This module contains the on-disk layout names and the fixed glyphs of the briefing
//! markdown dialect so that the converter and the stores agree on them.

/// Directory holding one JSON record per calendar day.
pub const BRIEFINGS_DIR_NAME: &str = "briefings";

/// Directory holding one JSON record per calendar month.
pub const MONTHLY_DIR_NAME: &str = "monthly";

/// Filename of the key index inside each record directory.
pub const INDEX_FILENAME: &str = "index.json";

/// Default repository location, relative to the user's home directory.
pub const DEFAULT_REPO_DIR: &str = ".openclaw/workspace/daily-briefing";

/// Default civil offset (hours east of UTC) used for date keys and display dates.
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 9;

/// Daily briefings older than this many days are pruned by the monthly run.
pub const DEFAULT_RETENTION_DAYS: i64 = 60;

/// Default git remote and branch for publishing.
pub const DEFAULT_GIT_REMOTE: &str = "origin";
pub const DEFAULT_GIT_BRANCH: &str = "main";

/// Commit author used when the repository has no `user.name`/`user.email` configured.
pub const DEFAULT_AUTHOR_NAME: &str = "briefing-bot";
pub const DEFAULT_AUTHOR_EMAIL: &str = "briefing-bot@localhost";

/// Separates a list item's main clause from its source attribution.
pub const PIN_GLYPH: &str = "📎";

/// Marks a "key point" callout paragraph.
pub const CALLOUT_GLYPH: &str = "💡";
