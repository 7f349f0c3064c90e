//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. The core never reads environment variables itself; the CLI
//! reads them and hands the raw values to the `*_from_env_value` helpers below.

use crate::constants::{
    DEFAULT_AUTHOR_EMAIL, DEFAULT_AUTHOR_NAME, DEFAULT_GIT_BRANCH, DEFAULT_GIT_REMOTE,
    DEFAULT_REPO_DIR, DEFAULT_RETENTION_DAYS, DEFAULT_UTC_OFFSET_HOURS,
};
use crate::error::{PublishError, PublishResult};
use chrono::{FixedOffset, Offset, Utc};
use std::path::{Path, PathBuf};

/// Git publishing settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GitSettings {
    pub remote: String,
    pub branch: String,
    pub push: bool,
    /// Used only when the repository has no configured `user.name`/`user.email`.
    pub author_name: String,
    pub author_email: String,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            remote: DEFAULT_GIT_REMOTE.into(),
            branch: DEFAULT_GIT_BRANCH.into(),
            push: true,
            author_name: DEFAULT_AUTHOR_NAME.into(),
            author_email: DEFAULT_AUTHOR_EMAIL.into(),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    repo_dir: PathBuf,
    display_offset: FixedOffset,
    retention_days: i64,
    git: GitSettings,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `PublishError::InvalidConfig` if `retention_days` is not positive or a git
    /// remote/branch name is empty.
    pub fn new(
        repo_dir: PathBuf,
        display_offset: FixedOffset,
        retention_days: i64,
        git: GitSettings,
    ) -> PublishResult<Self> {
        if retention_days <= 0 {
            return Err(PublishError::InvalidConfig(
                "retention days must be greater than zero".into(),
            ));
        }
        if git.remote.trim().is_empty() || git.branch.trim().is_empty() {
            return Err(PublishError::InvalidConfig(
                "git remote and branch cannot be empty".into(),
            ));
        }

        Ok(Self {
            repo_dir,
            display_offset,
            retention_days,
            git,
        })
    }

    /// Configuration with every default except the repository directory.
    pub fn with_defaults(repo_dir: PathBuf) -> Self {
        Self {
            repo_dir,
            display_offset: default_display_offset(),
            retention_days: DEFAULT_RETENTION_DAYS,
            git: GitSettings::default(),
        }
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    pub fn display_offset(&self) -> FixedOffset {
        self.display_offset
    }

    pub fn retention_days(&self) -> i64 {
        self.retention_days
    }

    pub fn git(&self) -> &GitSettings {
        &self.git
    }
}

fn default_display_offset() -> FixedOffset {
    FixedOffset::east_opt(DEFAULT_UTC_OFFSET_HOURS * 3600).unwrap_or(Utc.fix())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve the repository directory.
///
/// An explicit override wins; otherwise the default lives under `home`.
pub fn resolve_repo_dir(
    override_dir: Option<PathBuf>,
    home: Option<PathBuf>,
) -> PublishResult<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir);
    }

    home.map(|h| h.join(DEFAULT_REPO_DIR)).ok_or_else(|| {
        PublishError::InvalidConfig(
            "no repository directory given and HOME is not set".into(),
        )
    })
}

/// Parse the display/date-key offset (whole hours east of UTC).
///
/// If `value` is `None` or empty/whitespace, returns UTC+9.
pub fn utc_offset_from_env_value(value: Option<String>) -> PublishResult<FixedOffset> {
    let Some(value) = non_empty(value) else {
        return Ok(default_display_offset());
    };

    let hours: i32 = value.parse().map_err(|_| {
        PublishError::InvalidConfig(format!("UTC offset must be whole hours, got '{}'", value))
    })?;
    if !(-23..=23).contains(&hours) {
        return Err(PublishError::InvalidConfig(format!(
            "UTC offset must be between -23 and 23 hours, got {}",
            hours
        )));
    }

    FixedOffset::east_opt(hours * 3600)
        .ok_or_else(|| PublishError::InvalidConfig(format!("invalid UTC offset: {}", hours)))
}

/// Parse the pruning cutoff in days. Defaults to 60.
pub fn retention_days_from_env_value(value: Option<String>) -> PublishResult<i64> {
    let Some(value) = non_empty(value) else {
        return Ok(DEFAULT_RETENTION_DAYS);
    };

    match value.parse::<i64>() {
        Ok(days) if days > 0 => Ok(days),
        _ => Err(PublishError::InvalidConfig(format!(
            "retention days must be a positive integer, got '{}'",
            value
        ))),
    }
}

/// Parse a boolean flag. Accepts `true/false`, `1/0`, `yes/no`, `on/off`; `None` → `default`.
pub fn flag_from_env_value(value: Option<String>, default: bool) -> PublishResult<bool> {
    let Some(value) = non_empty(value) else {
        return Ok(default);
    };

    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(PublishError::InvalidConfig(format!(
            "expected a boolean flag, got '{}'",
            value
        ))),
    }
}

/// Build git settings from optional raw values, falling back to defaults.
pub fn git_settings_from_env_values(
    remote: Option<String>,
    branch: Option<String>,
    push: Option<String>,
    author_name: Option<String>,
    author_email: Option<String>,
) -> PublishResult<GitSettings> {
    let defaults = GitSettings::default();
    Ok(GitSettings {
        remote: non_empty(remote).unwrap_or(defaults.remote),
        branch: non_empty(branch).unwrap_or(defaults.branch),
        push: flag_from_env_value(push, defaults.push)?,
        author_name: non_empty(author_name).unwrap_or(defaults.author_name),
        author_email: non_empty(author_email).unwrap_or(defaults.author_email),
    })
}
