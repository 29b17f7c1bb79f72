use serde_json::Value;

use crate::error::{DialogError, Result};
use crate::messages;

/// Shape of reply a prompting step expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Any non-blank text. Recognised as a JSON string.
    Text,
    /// Yes or no. Recognised as a JSON bool.
    Confirm,
}

const YES: &[&str] = &["yes", "y", "yeah", "yep", "sure", "ok", "true", "1"];
const NO: &[&str] = &["no", "n", "nope", "false", "0"];

impl PromptKind {
    /// Turn a raw reply into the value handed to the next step.
    pub fn recognize(&self, reply: &str) -> Result<Value> {
        let trimmed = reply.trim();
        match self {
            PromptKind::Text => {
                if trimmed.is_empty() {
                    return Err(DialogError::Validation("empty reply".to_string()));
                }
                Ok(Value::String(trimmed.to_string()))
            }
            PromptKind::Confirm => {
                let word = trimmed
                    .trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase();
                if YES.contains(&word.as_str()) {
                    Ok(Value::Bool(true))
                } else if NO.contains(&word.as_str()) {
                    Ok(Value::Bool(false))
                } else {
                    Err(DialogError::Validation(format!(
                        "expected yes or no, got {:?}",
                        trimmed
                    )))
                }
            }
        }
    }

    /// Sent before the original prompt is repeated.
    pub fn retry_message(&self) -> &'static str {
        match self {
            PromptKind::Text => messages::RETRY_TEXT,
            PromptKind::Confirm => messages::RETRY_CONFIRM,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_prompt_trims_and_rejects_blank() {
        assert_eq!(
            PromptKind::Text.recognize("  Jane ").unwrap(),
            Value::String("Jane".into())
        );
        let err = PromptKind::Text.recognize("   ").unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn confirm_prompt_accepts_common_answers() {
        for yes in ["yes", "Yes!", " Y ", "sure", "OK"] {
            assert_eq!(PromptKind::Confirm.recognize(yes).unwrap(), Value::Bool(true), "{yes}");
        }
        for no in ["no", "No.", "n", "nope"] {
            assert_eq!(PromptKind::Confirm.recognize(no).unwrap(), Value::Bool(false), "{no}");
        }
    }

    #[test]
    fn confirm_prompt_rejects_anything_else() {
        assert!(PromptKind::Confirm.recognize("maybe").is_err());
        assert!(PromptKind::Confirm.recognize("").is_err());
    }
}
