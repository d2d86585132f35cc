//! GitHub REST v3 surface consumed by the mirror workflow.
//!
//! The orchestrator talks to the remote only through the [`client::RepoHost`]
//! trait; [`client::GitHubClient`] is the reqwest-backed implementation.

pub mod client;

pub use client::{FileUpsert, GitHubClient, NewPull, PullBase, PullInfo, RepoHost, RepoInfo};
