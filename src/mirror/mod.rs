//! Confab → GitHub mirroring.
//!
//! `render` turns a draft into the fixed four-file bundle; `orchestrator`
//! drives branch creation, the file upsert loop, and pull-request opening.

pub mod orchestrator;
pub mod render;

pub use orchestrator::{ConfabMirror, PullLocator, parse_pull_url};
pub use render::{ConfabDraft, FileBundle, render, slug};
