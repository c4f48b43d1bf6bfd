//! Prompt construction for answer generation.

use std::fmt::Write as _;

use beacon_core::constants::ANNOTATION_MARKER;
use beacon_core::models::{Prompt, RankedResult};

/// Builds the two-part prompt: a fixed system instruction and a user message
/// carrying the records' full text followed by the literal question.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    system: String,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            system: default_system_instruction(),
        }
    }

    /// Replace the system instruction. The annotation instruction is appended
    /// so the decoder still finds the trailing list.
    pub fn with_system_instruction(instruction: &str) -> Self {
        Self {
            system: format!("{}\n\n{}", instruction.trim(), annotation_instruction()),
        }
    }

    pub fn system_instruction(&self) -> &str {
        &self.system
    }

    pub fn build(&self, question: &str, ranked: &[RankedResult]) -> Prompt {
        let mut user = String::new();
        if ranked.is_empty() {
            user.push_str("No records are available.\n\n");
        } else {
            user.push_str("Records:\n\n");
            for (i, result) in ranked.iter().enumerate() {
                let r = &result.record;
                let _ = writeln!(user, "### {}. {}", i + 1, r.name);
                if !r.category.is_empty() {
                    let _ = writeln!(user, "Type: {}", r.category);
                }
                let tags: Vec<&str> = r.tags.iter().map(String::as_str).collect();
                if !tags.is_empty() {
                    let _ = writeln!(user, "Tags: {}", tags.join(", "));
                }
                if !r.stage.is_empty() {
                    let _ = writeln!(user, "Stage: {}", r.stage);
                }
                if !r.link.is_empty() {
                    let _ = writeln!(user, "Link: {}", r.link);
                }
                let _ = writeln!(user, "\n{}\n", r.long_text().trim());
            }
        }
        let _ = write!(user, "Question: {}", question.trim());

        Prompt {
            system: self.system.clone(),
            user,
        }
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn annotation_instruction() -> String {
    format!(
        "End your reply with one final line of the form\n\
         {ANNOTATION_MARKER}: [\"Record name\", \"Another record name\"]\n\
         listing, as a JSON array, the exact names of the records you used. \
         Use an empty array if none were relevant."
    )
}

fn default_system_instruction() -> String {
    format!(
        "You answer questions about the records supplied in the user message. \
         Use only the information in those records. If they do not contain the \
         answer, say so plainly. Refer to records by their name, never by a \
         number or identifier. Keep the answer concise.\n\n{}",
        annotation_instruction()
    )
}
