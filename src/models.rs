use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Fallback identifier for submissions made before the user has signed in.
/// Applied only at the remote boundary; the core never invents ids elsewhere.
pub const ANONYMOUS_USER_ID: i64 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

/// The immutable outcome of one completed quiz attempt. The on-disk history
/// format keeps the `testIdentifier` field name; the remote submission shape
/// lives in `sink::ResultSubmission`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizResult {
    pub state: String,
    #[serde(rename = "testIdentifier")]
    pub test_number: u32,
    pub score: u32,
    pub total: u32,
    pub percentage: u32,
    pub answers: Vec<Option<String>>,
    pub timestamp: String,
}

/// Identity passed explicitly into session starts and remote submission
/// instead of being read ambiently from device storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: Option<i64>,
    pub selected_state: String,
}

impl UserContext {
    pub fn effective_user_id(&self) -> i64 {
        self.user_id.unwrap_or(ANONYMOUS_USER_ID)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub issue: String,
}

pub fn validate_question_set(questions: &[Question]) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    if questions.is_empty() {
        issues.push(ValidationIssue {
            field: "questions".into(),
            issue: "must contain at least one question".into(),
        });
    }

    for (i, q) in questions.iter().enumerate() {
        if q.prompt.trim().is_empty() {
            issues.push(ValidationIssue {
                field: format!("questions[{i}].prompt"),
                issue: "must not be empty".into(),
            });
        }
        if q.options.len() < 2 {
            issues.push(ValidationIssue {
                field: format!("questions[{i}].options"),
                issue: "must contain at least 2 options".into(),
            });
        }
        let mut seen = HashSet::new();
        for (j, opt) in q.options.iter().enumerate() {
            if opt.trim().is_empty() {
                issues.push(ValidationIssue {
                    field: format!("questions[{i}].options[{j}]"),
                    issue: "must not be empty".into(),
                });
            }
            if !seen.insert(opt.as_str()) {
                issues.push(ValidationIssue {
                    field: format!("questions[{i}].options[{j}]"),
                    issue: "must be unique".into(),
                });
            }
        }
        if !q.has_option(&q.correct_answer) {
            issues.push(ValidationIssue {
                field: format!("questions[{i}].correct_answer"),
                issue: "must be one of the options".into(),
            });
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}
