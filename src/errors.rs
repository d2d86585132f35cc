//! Typed errors for the GitHub mirror workflow.
//!
//! Every step of a mirror operation fails with its own variant so callers
//! can tell which stage gave up without parsing message text. Nothing here
//! is retried or compensated: a failed step terminates the whole call and
//! any files already written stay on the remote branch.

use thiserror::Error;

/// Errors raised by the mirror orchestrator and the GitHub client.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("repository {owner}/{repo} not found (status {status})")]
    RemoteNotFound {
        owner: String,
        repo: String,
        status: u16,
    },

    #[error("failed to resolve ref heads/{branch} (status {status})")]
    RemoteRef { branch: String, status: u16 },

    #[error("failed to create branch {branch} (status {status})")]
    BranchCreate { branch: String, status: u16 },

    #[error("failed to write {path} (status {status})")]
    FileWrite { path: String, status: u16 },

    #[error("failed to open pull request (status {status})")]
    PullRequest { status: u16 },

    #[error("failed to look up pull request #{number} (status {status})")]
    PullRequestLookup { number: u64, status: u16 },

    #[error("not a pull request URL: {url}")]
    InvalidReference { url: String },

    #[error("GitHub request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// The mirror step a [`MirrorError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorStage {
    RepoLookup,
    RefLookup,
    BranchCreate,
    FileWrite,
    PullRequestLookup,
    PullRequestOpen,
    Reference,
    Transport,
}

impl MirrorError {
    pub fn stage(&self) -> MirrorStage {
        match self {
            Self::RemoteNotFound { .. } => MirrorStage::RepoLookup,
            Self::RemoteRef { .. } => MirrorStage::RefLookup,
            Self::BranchCreate { .. } => MirrorStage::BranchCreate,
            Self::FileWrite { .. } => MirrorStage::FileWrite,
            Self::PullRequestLookup { .. } => MirrorStage::PullRequestLookup,
            Self::PullRequest { .. } => MirrorStage::PullRequestOpen,
            Self::InvalidReference { .. } => MirrorStage::Reference,
            Self::Transport(_) => MirrorStage::Transport,
        }
    }
}
