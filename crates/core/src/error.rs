#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid month key (expected YYYY-MM): {0}")]
    InvalidMonth(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to read file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to remove file: {0}")]
    FileRemove(std::io::Error),
    #[error("failed to serialize record: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize record: {0}")]
    Deserialization(serde_json::Error),

    #[error("failed to open git repository: {0}")]
    GitOpen(git2::Error),
    #[error("failed to access git index: {0}")]
    GitIndex(git2::Error),
    #[error("failed to add file to git index: {0}")]
    GitAdd(git2::Error),
    #[error("failed to remove file from git index: {0}")]
    GitRemove(git2::Error),
    #[error("failed to write git tree: {0}")]
    GitWriteTree(git2::Error),
    #[error("failed to find git tree: {0}")]
    GitFindTree(git2::Error),
    #[error("failed to create git signature: {0}")]
    GitSignature(git2::Error),
    #[error("failed to create git commit: {0}")]
    GitCommit(git2::Error),
    #[error("failed to get git head: {0}")]
    GitHead(git2::Error),
    #[error("failed to peel git commit: {0}")]
    GitPeel(git2::Error),
    #[error("failed to set git head: {0}")]
    GitSetHead(git2::Error),
    #[error("failed to find git remote: {0}")]
    GitRemote(git2::Error),
    #[error("failed to push to remote: {0}")]
    GitPush(git2::Error),
    #[error("push of {reference} was rejected by the remote: {message}")]
    PushRejected { reference: String, message: String },
}

pub type PublishResult<T> = std::result::Result<T, PublishError>;
