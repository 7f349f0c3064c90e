//! Git helpers for publishing.
//!
//! Published records live as files in a local Git working tree that is pushed to a remote
//! (typically a static site repository). Everything that touches Git goes through the
//! [`CommitSink`] capability so services can be tested with a recording fake.
//!
//! ## Branch policy
//!
//! Commits are written to `refs/heads/<branch>` (`main` unless configured otherwise). In an
//! empty repository `HEAD` is pointed at that branch before the first commit. A repository
//! that already has history must have the branch checked out, otherwise the commit is
//! refused with `PublishError::InvalidConfig`.
//!
//! ## Staging rules
//!
//! Each path handed to [`CommitSink::commit`] is staged as it currently is on disk: present
//! files are added, missing files are removed from the index. This lets a single commit carry
//! both newly written records and pruned ones.
//!
//! ## Failure model
//!
//! Files are written before the commit is attempted and are not rolled back if committing or
//! pushing fails. Re-running the operation converges local and remote state.

use crate::config::GitSettings;
use crate::error::{PublishError, PublishResult};
use std::cell::RefCell;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Controlled vocabulary for commit subjects.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CommitDomain {
    Briefing,
    Monthly,
}

impl CommitDomain {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Briefing => "briefing",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for CommitDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single-line commit message rendered as `<domain>: <summary>`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommitMessage {
    domain: CommitDomain,
    summary: String,
}

impl CommitMessage {
    /// # Errors
    ///
    /// Returns `PublishError::InvalidInput` if `summary` is empty or spans multiple lines.
    pub fn new(domain: CommitDomain, summary: impl Into<String>) -> PublishResult<Self> {
        let summary = summary.into().trim().to_string();
        if summary.is_empty() || summary.contains(['\n', '\r']) {
            return Err(PublishError::InvalidInput(
                "commit summary must be non-empty and single-line".into(),
            ));
        }
        Ok(Self { domain, summary })
    }

    pub fn domain(&self) -> CommitDomain {
        self.domain
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn render(&self) -> String {
        format!("{}: {}", self.domain, self.summary)
    }
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Durable persistence for a set of changed files.
///
/// `paths` are repository-relative, slash-separated store keys.
pub trait CommitSink {
    fn commit(&self, paths: &[String], message: &CommitMessage) -> PublishResult<()>;
}

/// Sink that records nothing and always succeeds.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopCommitSink;

impl CommitSink for NoopCommitSink {
    fn commit(&self, paths: &[String], message: &CommitMessage) -> PublishResult<()> {
        tracing::info!(
            "skipping commit '{}' ({} files): committing disabled",
            message,
            paths.len()
        );
        Ok(())
    }
}

/// Sink that remembers every commit request. Useful for tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingCommitSink {
    commits: RefCell<Vec<(Vec<String>, String)>>,
}

impl RecordingCommitSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(paths, rendered message)` pair seen so far.
    pub fn commits(&self) -> Vec<(Vec<String>, String)> {
        self.commits.borrow().clone()
    }
}

impl CommitSink for RecordingCommitSink {
    fn commit(&self, paths: &[String], message: &CommitMessage) -> PublishResult<()> {
        self.commits
            .borrow_mut()
            .push((paths.to_vec(), message.render()));
        Ok(())
    }
}

/// Commits (and optionally pushes) through libgit2.
#[derive(Clone, Debug)]
pub struct GitCommitSink {
    workdir: PathBuf,
    settings: GitSettings,
}

impl GitCommitSink {
    pub fn new(workdir: impl Into<PathBuf>, settings: GitSettings) -> Self {
        Self {
            workdir: workdir.into(),
            settings,
        }
    }

    /// Open the repository at exactly `workdir` (no parent directory search).
    fn open(&self) -> PublishResult<(git2::Repository, PathBuf)> {
        let repo = git2::Repository::open_ext(
            &self.workdir,
            git2::RepositoryOpenFlags::NO_SEARCH,
            std::iter::empty::<&std::ffi::OsStr>(),
        )
        .map_err(PublishError::GitOpen)?;
        // git2 may canonicalise the workdir; use its view for path stripping.
        let workdir = repo
            .workdir()
            .ok_or_else(|| {
                PublishError::GitOpen(git2::Error::from_str(
                    "repository has no working directory",
                ))
            })?
            .to_path_buf();
        Ok((repo, workdir))
    }

    fn branch_ref(&self) -> String {
        format!("refs/heads/{}", self.settings.branch)
    }

    /// Normalise a path to be workdir-relative and reject anything escaping it.
    fn relative_path(workdir: &Path, path: &str) -> PublishResult<PathBuf> {
        let path = Path::new(path);
        let rel = if path.is_absolute() {
            path.strip_prefix(workdir)
                .map_err(|_| {
                    PublishError::InvalidInput(
                        "path is outside the repository working directory".into(),
                    )
                })?
                .to_path_buf()
        } else {
            path.to_path_buf()
        };

        if rel.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(PublishError::InvalidInput(
                "path must not contain parent directory references (..)".into(),
            ));
        }
        Ok(rel)
    }

    fn stage(
        index: &mut git2::Index,
        workdir: &Path,
        relative_paths: &[PathBuf],
    ) -> PublishResult<()> {
        for rel in relative_paths {
            if workdir.join(rel).is_file() {
                index.add_path(rel).map_err(PublishError::GitAdd)?;
            } else {
                index.remove_path(rel).map_err(PublishError::GitRemove)?;
            }
        }
        index.write().map_err(PublishError::GitIndex)
    }

    /// Make sure commits land on the configured branch.
    ///
    /// An empty repository has its `HEAD` pointed at `refs/heads/<branch>`. A repository with
    /// history must already have that branch checked out; anything else is refused so the
    /// commit never starts a parentless root on a fresh branch.
    fn ensure_branch_head(&self, repo: &git2::Repository) -> PublishResult<()> {
        match repo.head() {
            Ok(head) => {
                if head.is_branch() && head.name() == Some(self.branch_ref().as_str()) {
                    return Ok(());
                }
                Err(PublishError::InvalidConfig(format!(
                    "repository HEAD is on '{}', expected branch '{}'",
                    head.shorthand().unwrap_or("HEAD"),
                    self.settings.branch
                )))
            }
            Err(e)
                if e.code() == git2::ErrorCode::UnbornBranch
                    || e.code() == git2::ErrorCode::NotFound =>
            {
                repo.set_head(&self.branch_ref())
                    .map_err(PublishError::GitSetHead)
            }
            Err(e) => Err(PublishError::GitHead(e)),
        }
    }

    /// Resolve the parent commit for a new commit.
    ///
    /// - If `HEAD` exists, the parent list is `[HEAD]`.
    /// - If the repository is empty (`UnbornBranch`/`NotFound`), the parent list is empty.
    fn resolve_head_parents(repo: &git2::Repository) -> PublishResult<Vec<git2::Commit<'_>>> {
        match repo.head() {
            Ok(head) => {
                let commit = head.peel_to_commit().map_err(PublishError::GitPeel)?;
                Ok(vec![commit])
            }
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => Ok(vec![]),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(vec![]),
            Err(e) => Err(PublishError::GitHead(e)),
        }
    }

    fn signature(&self, repo: &git2::Repository) -> PublishResult<git2::Signature<'static>> {
        match repo.signature() {
            Ok(sig) => Ok(sig.to_owned()),
            Err(_) => git2::Signature::now(&self.settings.author_name, &self.settings.author_email)
                .map_err(PublishError::GitSignature),
        }
    }

    /// Stage `paths` and commit them. Returns `None` when the staged tree matches `HEAD`.
    fn commit_local(
        &self,
        repo: &git2::Repository,
        workdir: &Path,
        paths: &[String],
        message: &CommitMessage,
    ) -> PublishResult<Option<git2::Oid>> {
        let relative_paths = paths
            .iter()
            .map(|p| Self::relative_path(workdir, p))
            .collect::<PublishResult<Vec<_>>>()?;

        self.ensure_branch_head(repo)?;

        let mut index = repo.index().map_err(PublishError::GitIndex)?;
        Self::stage(&mut index, workdir, &relative_paths)?;

        let tree_id = index.write_tree().map_err(PublishError::GitWriteTree)?;
        let tree = repo.find_tree(tree_id).map_err(PublishError::GitFindTree)?;

        let parents = Self::resolve_head_parents(repo)?;
        if let Some(parent) = parents.first() {
            if parent.tree_id() == tree_id {
                tracing::info!("nothing to commit for '{}'", message);
                return Ok(None);
            }
        }
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

        let sig = self.signature(repo)?;
        let oid = repo
            .commit(
                Some("HEAD"),
                &sig,
                &sig,
                &message.render(),
                &tree,
                &parent_refs,
            )
            .map_err(PublishError::GitCommit)?;

        tracing::info!("committed {} ({} files): {}", oid, paths.len(), message);
        Ok(Some(oid))
    }

    fn push(&self, repo: &git2::Repository) -> PublishResult<()> {
        let mut remote = repo
            .find_remote(&self.settings.remote)
            .map_err(PublishError::GitRemote)?;
        let config = repo.config().map_err(PublishError::GitRemote)?;

        let rejection: RefCell<Option<(String, String)>> = RefCell::new(None);
        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(|url, username, allowed| {
            if allowed.contains(git2::CredentialType::SSH_KEY) {
                git2::Cred::ssh_key_from_agent(username.unwrap_or("git"))
            } else if allowed.contains(git2::CredentialType::USER_PASS_PLAINTEXT) {
                git2::Cred::credential_helper(&config, url, username)
            } else {
                git2::Cred::default()
            }
        });
        callbacks.push_update_reference(|reference, status| {
            if let Some(message) = status {
                *rejection.borrow_mut() = Some((reference.to_string(), message.to_string()));
            }
            Ok(())
        });

        let mut options = git2::PushOptions::new();
        options.remote_callbacks(callbacks);

        let refspec = format!("{0}:{0}", self.branch_ref());
        remote
            .push(&[refspec.as_str()], Some(&mut options))
            .map_err(PublishError::GitPush)?;
        drop(options);

        if let Some((reference, message)) = rejection.borrow_mut().take() {
            return Err(PublishError::PushRejected { reference, message });
        }

        tracing::info!(
            "pushed {} to {}",
            self.branch_ref(),
            self.settings.remote
        );
        Ok(())
    }
}

impl CommitSink for GitCommitSink {
    fn commit(&self, paths: &[String], message: &CommitMessage) -> PublishResult<()> {
        let (repo, workdir) = self.open()?;
        self.commit_local(&repo, &workdir, paths, message)?;

        if self.settings.push {
            self.push(&repo)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn local_settings() -> GitSettings {
        GitSettings {
            push: false,
            ..GitSettings::default()
        }
    }

    fn init_repo(dir: &Path) -> git2::Repository {
        let repo = git2::Repository::init(dir).expect("init should succeed");
        {
            let mut config = repo.config().expect("config should open");
            config.set_str("user.name", "Test Author").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }
        repo
    }

    fn head_message(repo: &git2::Repository) -> String {
        repo.head()
            .unwrap()
            .peel_to_commit()
            .unwrap()
            .message()
            .unwrap()
            .to_string()
    }

    fn message(summary: &str) -> CommitMessage {
        CommitMessage::new(CommitDomain::Briefing, summary).unwrap()
    }

    #[test]
    fn test_message_renders_domain_prefix() {
        let msg = CommitMessage::new(CommitDomain::Monthly, "2026-09 report").unwrap();
        assert_eq!(msg.render(), "monthly: 2026-09 report");
        assert_eq!(msg.domain(), CommitDomain::Monthly);
        assert_eq!(msg.summary(), "2026-09 report");
    }

    #[test]
    fn test_message_rejects_multiline_summary() {
        let err = CommitMessage::new(CommitDomain::Briefing, "line1\nline2").unwrap_err();
        assert!(matches!(err, PublishError::InvalidInput(_)));
        let err = CommitMessage::new(CommitDomain::Briefing, "   ").unwrap_err();
        assert!(matches!(err, PublishError::InvalidInput(_)));
    }

    #[test]
    fn test_commits_listed_paths_on_main() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = init_repo(temp_dir.path());
        fs::create_dir_all(temp_dir.path().join("briefings")).unwrap();
        fs::write(temp_dir.path().join("briefings/2026-10-19.json"), "{}").unwrap();
        fs::write(temp_dir.path().join("briefings/index.json"), "[]").unwrap();
        fs::write(temp_dir.path().join("untracked.txt"), "x").unwrap();

        let sink = GitCommitSink::new(temp_dir.path(), local_settings());
        sink.commit(
            &[
                "briefings/2026-10-19.json".to_string(),
                "briefings/index.json".to_string(),
            ],
            &message("2026-10-19"),
        )
        .expect("commit should succeed");

        assert_eq!(head_message(&repo), "briefing: 2026-10-19");
        assert_eq!(repo.head().unwrap().name(), Some("refs/heads/main"));

        let tree = repo.head().unwrap().peel_to_tree().unwrap();
        assert!(tree.get_path(Path::new("briefings/2026-10-19.json")).is_ok());
        assert!(tree.get_path(Path::new("untracked.txt")).is_err());
    }

    #[test]
    fn test_missing_paths_are_staged_as_deletions() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = init_repo(temp_dir.path());
        fs::create_dir_all(temp_dir.path().join("briefings")).unwrap();
        fs::write(temp_dir.path().join("briefings/2020-01-01.json"), "{}").unwrap();

        let sink = GitCommitSink::new(temp_dir.path(), local_settings());
        let paths = vec!["briefings/2020-01-01.json".to_string()];
        sink.commit(&paths, &message("add")).unwrap();

        fs::remove_file(temp_dir.path().join("briefings/2020-01-01.json")).unwrap();
        sink.commit(&paths, &message("prune 1 old briefings"))
            .unwrap();

        let tree = repo.head().unwrap().peel_to_tree().unwrap();
        assert!(tree.get_path(Path::new("briefings/2020-01-01.json")).is_err());
        assert_eq!(head_message(&repo), "briefing: prune 1 old briefings");
    }

    #[test]
    fn test_unchanged_tree_creates_no_commit() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = init_repo(temp_dir.path());
        fs::write(temp_dir.path().join("index.json"), "[]").unwrap();

        let sink = GitCommitSink::new(temp_dir.path(), local_settings());
        let paths = vec!["index.json".to_string()];
        sink.commit(&paths, &message("first")).unwrap();
        let first = repo.head().unwrap().target().unwrap();

        sink.commit(&paths, &message("second")).unwrap();
        assert_eq!(repo.head().unwrap().target().unwrap(), first);
    }

    #[test]
    fn test_refuses_history_on_another_branch() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = init_repo(temp_dir.path());
        fs::write(temp_dir.path().join("index.json"), "[]").unwrap();

        let master = GitCommitSink::new(
            temp_dir.path(),
            GitSettings {
                branch: "master".into(),
                ..local_settings()
            },
        );
        master
            .commit(&["index.json".to_string()], &message("on master"))
            .expect("commit on master should succeed");
        let master_tip = repo.head().unwrap().target().unwrap();

        fs::write(temp_dir.path().join("index.json"), "[\"x\"]").unwrap();
        let sink = GitCommitSink::new(temp_dir.path(), local_settings());
        let err = sink
            .commit(&["index.json".to_string()], &message("on main"))
            .unwrap_err();

        assert!(matches!(err, PublishError::InvalidConfig(_)));
        assert_eq!(repo.head().unwrap().name(), Some("refs/heads/master"));
        assert_eq!(repo.head().unwrap().target().unwrap(), master_tip);
        assert!(repo.find_reference("refs/heads/main").is_err());
    }

    #[test]
    fn test_commits_on_existing_branch_keep_history() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = init_repo(temp_dir.path());
        fs::write(temp_dir.path().join("index.json"), "[]").unwrap();

        let sink = GitCommitSink::new(temp_dir.path(), local_settings());
        let paths = vec!["index.json".to_string()];
        sink.commit(&paths, &message("first")).unwrap();
        let first = repo.head().unwrap().target().unwrap();

        fs::write(temp_dir.path().join("index.json"), "[\"2026-10-19\"]").unwrap();
        sink.commit(&paths, &message("second")).unwrap();

        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.parent_count(), 1);
        assert_eq!(head.parent_id(0).unwrap(), first);
    }

    #[test]
    fn test_rejects_paths_escaping_workdir() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        init_repo(temp_dir.path());

        let sink = GitCommitSink::new(temp_dir.path(), local_settings());
        let err = sink
            .commit(&["../outside.json".to_string()], &message("bad"))
            .unwrap_err();
        assert!(matches!(err, PublishError::InvalidInput(_)));
    }

    #[test]
    fn test_open_fails_outside_a_repository() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let sink = GitCommitSink::new(temp_dir.path(), local_settings());
        let err = sink
            .commit(&["index.json".to_string()], &message("x"))
            .unwrap_err();
        assert!(matches!(err, PublishError::GitOpen(_)));
    }

    #[test]
    fn test_push_without_remote_reports_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        init_repo(temp_dir.path());
        fs::write(temp_dir.path().join("index.json"), "[]").unwrap();

        let sink = GitCommitSink::new(temp_dir.path(), GitSettings::default());
        let err = sink
            .commit(&["index.json".to_string()], &message("x"))
            .unwrap_err();
        assert!(matches!(err, PublishError::GitRemote(_)));
    }

    #[test]
    fn test_push_to_local_bare_remote() {
        let remote_dir = TempDir::new().expect("Failed to create temp dir");
        git2::Repository::init_bare(remote_dir.path()).unwrap();

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = init_repo(temp_dir.path());
        repo.remote("origin", remote_dir.path().to_str().unwrap())
            .unwrap();
        fs::write(temp_dir.path().join("index.json"), "[]").unwrap();

        let sink = GitCommitSink::new(temp_dir.path(), GitSettings::default());
        sink.commit(&["index.json".to_string()], &message("pushed"))
            .expect("push to a local bare repository should succeed");

        let bare = git2::Repository::open_bare(remote_dir.path()).unwrap();
        let pushed = bare.find_reference("refs/heads/main").unwrap();
        assert_eq!(pushed.target(), repo.head().unwrap().target());
    }

    #[test]
    fn test_recording_sink_keeps_paths_and_messages() {
        let sink = RecordingCommitSink::new();
        sink.commit(&["a".to_string()], &message("one")).unwrap();
        assert_eq!(
            sink.commits(),
            vec![(vec!["a".to_string()], "briefing: one".to_string())]
        );
    }
}
