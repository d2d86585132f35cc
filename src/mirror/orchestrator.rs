//! The mirror workflow: branch, files, pull request.
//!
//! Both flows are strictly sequential; every step needs data from the one
//! before it (ref creation needs the base sha, file writes need the branch,
//! the PR needs the commits). A failing step terminates the call with its
//! stage-tagged error and nothing is rolled back: files already written
//! stay on the remote branch, and reasoning about that partial state is the
//! caller's job.

use std::sync::Arc;

use chrono::Utc;

use crate::errors::MirrorError;
use crate::github::client::{FileUpsert, NewPull, RepoHost};

use super::render::{ConfabDraft, FileBundle, render, slug};

/// Owner, repository and number parsed out of a pull request web URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullLocator {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

/// Positionally tokenize `https://github.com/<owner>/<repo>/pull/<number>`.
///
/// Anything that does not match that fixed shape fails with
/// `InvalidReference` before any network call is made.
pub fn parse_pull_url(url: &str) -> Result<PullLocator, MirrorError> {
    let invalid = || MirrorError::InvalidReference {
        url: url.to_string(),
    };
    let parts: Vec<&str> = url.split('/').collect();
    if parts.len() < 7 || parts[5] != "pull" {
        return Err(invalid());
    }
    let (owner, repo) = (parts[3], parts[4]);
    if owner.is_empty() || repo.is_empty() {
        return Err(invalid());
    }
    let number: u64 = parts[6].parse().map_err(|_| invalid())?;
    Ok(PullLocator {
        owner: owner.to_string(),
        repo: repo.to_string(),
        number,
    })
}

/// Stateless mirror orchestrator over a [`RepoHost`] capability.
///
/// Holds no per-call state, so one shared instance serves concurrent
/// invocations without synchronization. The access token is passed per
/// call and never cached.
#[derive(Clone)]
pub struct ConfabMirror {
    host: Arc<dyn RepoHost>,
}

impl ConfabMirror {
    pub fn new(host: Arc<dyn RepoHost>) -> Self {
        Self { host }
    }

    /// Mirror a new confab: render the bundle, branch off the repository's
    /// default branch, upsert the four files, open a pull request. Returns
    /// the pull request's web URL.
    pub async fn create_mirror(
        &self,
        draft: &ConfabDraft,
        owner: &str,
        repo: &str,
        token: Option<&str>,
    ) -> Result<String, MirrorError> {
        let now = Utc::now();
        let bundle = render(draft, now);
        let branch = format!("confab-{}-{}", slug(&draft.name), now.timestamp());

        let repo_info = self.host.get_repo(owner, repo, token).await?;
        let base_sha = self
            .host
            .get_branch_sha(owner, repo, &repo_info.default_branch, token)
            .await?;
        self.host
            .create_branch(owner, repo, &branch, &base_sha, token)
            .await?;

        self.push_bundle(&bundle, draft, &branch, owner, repo, token, "Add")
            .await?;

        let pull = self
            .host
            .create_pull(
                owner,
                repo,
                NewPull {
                    title: format!("Add confab: {}", draft.name),
                    body: format!(
                        "Automated confab creation for {}\n\n{}",
                        draft.name, draft.description
                    ),
                    head: branch,
                    base: repo_info.default_branch,
                },
                token,
            )
            .await?;
        Ok(pull.html_url)
    }

    /// Mirror an update to a confab that already has a pull request: the
    /// existing PR's base branch becomes the new branch's base and the new
    /// PR's target. Returns the new pull request's URL.
    pub async fn update_mirror(
        &self,
        draft: &ConfabDraft,
        pull_url: &str,
        token: &str,
    ) -> Result<String, MirrorError> {
        let locator = parse_pull_url(pull_url)?;
        let token = Some(token);

        let now = Utc::now();
        let bundle = render(draft, now);
        let branch = format!("update-confab-{}-{}", slug(&draft.name), now.timestamp());

        let prior = self
            .host
            .get_pull(&locator.owner, &locator.repo, locator.number, token)
            .await?;
        let base_sha = self
            .host
            .get_branch_sha(&locator.owner, &locator.repo, &prior.base.branch, token)
            .await?;
        self.host
            .create_branch(&locator.owner, &locator.repo, &branch, &base_sha, token)
            .await?;

        self.push_bundle(
            &bundle,
            draft,
            &branch,
            &locator.owner,
            &locator.repo,
            token,
            "Update",
        )
        .await?;

        let pull = self
            .host
            .create_pull(
                &locator.owner,
                &locator.repo,
                NewPull {
                    title: format!("Update confab: {}", draft.name),
                    body: format!(
                        "Automated confab update for {}\n\n{}",
                        draft.name, draft.description
                    ),
                    head: branch,
                    base: prior.base.branch,
                },
                token,
            )
            .await?;
        Ok(pull.html_url)
    }

    /// Upsert each bundle file in order, stopping at the first failure.
    ///
    /// The existence lookup deliberately does not pin a ref: it reports the
    /// default/base branch's state even though the write targets the new
    /// branch. Found files contribute their sha so the write becomes an
    /// update instead of a create.
    #[allow(clippy::too_many_arguments)]
    async fn push_bundle(
        &self,
        bundle: &FileBundle,
        draft: &ConfabDraft,
        branch: &str,
        owner: &str,
        repo: &str,
        token: Option<&str>,
        verb: &str,
    ) -> Result<(), MirrorError> {
        for (file_name, content) in &bundle.files {
            let full_path = bundle.full_path(file_name);
            let sha = self
                .host
                .get_content_sha(owner, repo, &full_path, token)
                .await?;
            self.host
                .put_content(
                    owner,
                    repo,
                    &full_path,
                    FileUpsert {
                        message: format!("{verb} {file_name} for confab {}", draft.name),
                        content: content.clone(),
                        branch: branch.to_string(),
                        sha,
                    },
                    token,
                )
                .await?;
        }
        Ok(())
    }
}
