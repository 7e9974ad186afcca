//! Prompt Formatting — feedback prompts for the generation retry loop
//!
//! The gateway never concatenates prompt strings itself; it delegates to a
//! [`PromptFormatter`]. The default implementation renders structured
//! validation issues into a numbered correction request, and renders the
//! manifest into a field-reference block suitable for an initial prompt.

use crate::manifest::{FieldCategory, FieldManifest};
use crate::manifest::known_mistakes::KNOWN_MISTAKES;
use crate::report::ValidationIssue;
use std::fmt::Write as _;

/// Renders retry prompts and field-reference blocks.
pub trait PromptFormatter: Send + Sync {
    /// Build the next-attempt prompt from the previous code and its issues.
    fn retry_prompt(&self, previous_code: &str, issues: &[ValidationIssue], attempt: u32)
        -> String;

    /// Render the valid fields (grouped by category) plus the known-mistake
    /// corrections, for injection into an initial prompt.
    fn field_reference(&self, manifest: &FieldManifest) -> String;
}

/// Plain-text formatter used unless the caller injects another one.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPromptFormatter;

impl PromptFormatter for DefaultPromptFormatter {
    fn retry_prompt(
        &self,
        previous_code: &str,
        issues: &[ValidationIssue],
        attempt: u32,
    ) -> String {
        let mut prompt = String::new();
        let _ = writeln!(
            prompt,
            "The strategy code from attempt {} failed validation.",
            attempt
        );
        prompt.push_str("\nPrevious code:\n```python\n");
        prompt.push_str(previous_code);
        if !previous_code.ends_with('\n') {
            prompt.push('\n');
        }
        prompt.push_str("```\n\nProblems found:\n");
        for (index, issue) in issues.iter().enumerate() {
            let _ = write!(prompt, "{}. {}", index + 1, issue.message);
            if issue.line > 0 {
                let _ = write!(prompt, " (line {})", issue.line);
            }
            if let Some(suggestion) = &issue.suggestion {
                let _ = write!(prompt, " — {}", suggestion);
            }
            prompt.push('\n');
        }
        prompt.push_str(
            "\nRewrite the strategy fixing every problem above. \
             Use only field names from the provided catalog.\n",
        );
        prompt
    }

    fn field_reference(&self, manifest: &FieldManifest) -> String {
        let mut block = String::from("Valid data fields:\n");
        for category in FieldCategory::ALL {
            let descriptors = manifest.by_category(category);
            if descriptors.is_empty() {
                continue;
            }
            let _ = writeln!(block, "\n[{}]", category);
            for descriptor in descriptors {
                let _ = writeln!(
                    block,
                    "- {} ({}): {}",
                    descriptor.canonical_name,
                    descriptor.aliases.join(", "),
                    descriptor.description.en
                );
            }
        }
        block.push_str("\nCommon mistakes to avoid:\n");
        for (mistake, canonical) in KNOWN_MISTAKES {
            let _ = writeln!(block, "- '{}' should be '{}'", mistake, canonical);
        }
        block
    }
}
