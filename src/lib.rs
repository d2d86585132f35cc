//! Confab configuration service.
//!
//! A confab is a named configuration bundle describing an AI agent's
//! purpose, guardrails, and settings. This service persists confab records
//! in SQLite and mirrors each one as a directory of text files committed to
//! a GitHub repository via pull request.
//!
//! ## Module Map
//!
//! | Module     | Responsibility                                           |
//! |------------|----------------------------------------------------------|
//! | `mirror`   | Rendering a confab into files + the branch/commit/PR flow |
//! | `github`   | `RepoHost` capability + reqwest-backed GitHub client      |
//! | `store`    | Confab records: SQLite access via async `DbHandle`        |
//! | `api`      | axum route handlers and `AppState`                        |
//! | `server`   | `ServerConfig`, router assembly, graceful shutdown        |
//! | `settings` | Mirror target (owner/repo/token) from the environment     |
//! | `errors`   | `MirrorError` taxonomy with per-stage tagging             |
//!
//! The mirror workflow is best-effort by contract: a failed mirror never
//! blocks the CRUD operation on the confab record, it only leaves the
//! record without (or with a stale) `github_url`.

pub mod api;
pub mod errors;
pub mod github;
pub mod logging;
pub mod mirror;
pub mod server;
pub mod settings;
pub mod store;
