//! Rendering a confab draft into its repository file bundle.
//!
//! Pure except for the caller-supplied timestamp: the same draft and
//! timestamp always produce the same four documents. The guardrails and
//! test-plan documents are constant assets; customizing them is a
//! post-creation edit in the mirrored repository, not an input here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ephemeral per-call description of a confab. Never persisted by the
/// mirror itself; its only durable trace is the rendered files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfabDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub guardrails: Option<String>,
    #[serde(default)]
    pub tests: Option<String>,
    #[serde(default)]
    pub configuration: serde_json::Map<String, serde_json::Value>,
}

/// Ordered rendered documents rooted under `confabs/<slug(name)>/`.
#[derive(Debug, Clone)]
pub struct FileBundle {
    pub dir: String,
    pub files: Vec<(String, String)>,
}

impl FileBundle {
    pub fn full_path(&self, file_name: &str) -> String {
        format!("{}/{}", self.dir, file_name)
    }
}

/// Lower-cased, space-to-hyphen form used in paths and branch names.
/// Nothing else is normalized; punctuation and non-ASCII pass through.
pub fn slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// Render the four-document bundle for a draft.
pub fn render(draft: &ConfabDraft, created_at: DateTime<Utc>) -> FileBundle {
    FileBundle {
        dir: format!("confabs/{}", slug(&draft.name)),
        files: vec![
            ("Confab.toml".to_string(), render_manifest(draft, created_at)),
            ("PURPOSE.md".to_string(), render_purpose(draft)),
            ("GUARDRAILS.md".to_string(), GUARDRAILS_MD.to_string()),
            ("TESTS.md".to_string(), TESTS_MD.to_string()),
        ],
    }
}

fn render_manifest(draft: &ConfabDraft, created_at: DateTime<Utc>) -> String {
    format!(
        r#"[confab]
name = "{name}"
description = "{description}"
version = "1.0.0"
created_at = "{created_at}"

[metadata]
author = "Let's Confab"
license = "MIT"
"#,
        name = draft.name,
        description = draft.description,
        created_at = created_at.to_rfc3339(),
    )
}

fn render_purpose(draft: &ConfabDraft) -> String {
    let description = if draft.description.is_empty() {
        None
    } else {
        Some(draft.description.as_str())
    };
    let purpose = match &draft.purpose {
        Some(purpose) => purpose.clone(),
        None => format!(
            "This confab is designed to {}",
            description.unwrap_or("perform specific tasks")
        ),
    };
    format!(
        r#"# Purpose: {name}

{purpose}

## Primary Objectives
- {objective}

## Target Use Cases
- User interactions and scenarios where this confab excels
- Specific problems it solves

## Expected Behavior
- How the confab should respond in different situations
- Key features and capabilities
"#,
        name = draft.name,
        purpose = purpose,
        objective = description.unwrap_or("Main functionality description"),
    )
}

const GUARDRAILS_MD: &str = r#"# Guardrails

## Safety Constraints
- Do not generate harmful, illegal, or unethical content
- Respect user privacy and data protection guidelines
- Avoid making claims beyond the confab's capabilities

## Behavioral Boundaries
- Stay within the defined scope of this confab
- Do not impersonate individuals or organizations without permission
- Maintain professional and respectful communication

## Content Guidelines
- Ensure all generated content is accurate and helpful
- Provide citations or sources when making factual claims
- Acknowledge limitations when uncertain

## Error Handling
- Gracefully handle ambiguous or unclear requests
- Ask for clarification when needed
- Provide helpful error messages and suggestions
"#;

const TESTS_MD: &str = r#"# Tests

## Unit Tests
### Basic Functionality
- [ ] Test basic conversation flow
- [ ] Test response accuracy
- [ ] Test error handling

### Edge Cases
- [ ] Test with ambiguous input
- [ ] Test with incomplete information
- [ ] Test with conflicting requests

## Integration Tests
### API Integration
- [ ] Test external API connections
- [ ] Test data flow between components
- [ ] Test error recovery

### User Interface
- [ ] Test user interaction patterns
- [ ] Test response formatting
- [ ] Test accessibility features

## Performance Tests
### Response Time
- [ ] Test under normal load
- [ ] Test under peak load
- [ ] Test with concurrent users

### Resource Usage
- [ ] Monitor memory usage
- [ ] Monitor CPU usage
- [ ] Test scalability limits

## Security Tests
### Input Validation
- [ ] Test for injection attacks
- [ ] Test for malicious input
- [ ] Test data sanitization

### Access Control
- [ ] Test authentication mechanisms
- [ ] Test authorization levels
- [ ] Test data privacy

## Test Scenarios
### Happy Path
1. User provides clear, valid input
2. Confab processes request correctly
3. Response is accurate and helpful

### Error Recovery
1. User provides invalid input
2. Confab identifies the issue
3. Confab provides helpful guidance

### Complex Queries
1. User asks multi-part questions
2. Confab addresses all components
3. Response is well-structured and complete
"#;
