use crate::models::{validate_question_set, Question};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
pub struct QuizDefinition {
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateQuizzes {
    pub state: String,
    pub abbreviation: String,
    pub description: String,
    pub tests: BTreeMap<u32, QuizDefinition>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TestSummary {
    pub state: String,
    pub abbreviation: String,
    pub test_number: u32,
    pub title: String,
    pub description: String,
    pub question_count: usize,
}

/// Static question-set source keyed by (state, test number). Embedded
/// content is gated by the schema and `validate_question_set` at load.
#[derive(Debug, Clone)]
pub struct Catalog {
    states: BTreeMap<String, StateQuizzes>,
}

const EMBEDDED_SETS: &[&str] = &[
    include_str!("../assets/quizzes/california.json"),
    include_str!("../assets/quizzes/washington.json"),
];

impl Catalog {
    pub fn embedded() -> anyhow::Result<Self> {
        let schema_raw = include_str!("../contracts/question_set.schema.json");
        let schema: serde_json::Value = serde_json::from_str(schema_raw)?;
        let compiled = jsonschema::draft202012::new(&schema)
            .map_err(|e| anyhow::anyhow!("question set schema failed to compile: {e}"))?;

        let mut states = BTreeMap::new();
        for raw in EMBEDDED_SETS {
            let value: serde_json::Value = serde_json::from_str(raw)?;
            if compiled.validate(&value).is_err() {
                let issues: Vec<String> =
                    compiled.iter_errors(&value).map(|e| e.to_string()).collect();
                anyhow::bail!("embedded question set rejected by schema: {}", issues.join("; "));
            }
            let set: StateQuizzes = serde_json::from_value(value)?;
            for (number, test) in &set.tests {
                validate_question_set(&test.questions).map_err(|issues| {
                    anyhow::anyhow!(
                        "{} test {} has {} validation issue(s): {}",
                        set.state,
                        number,
                        issues.len(),
                        issues
                            .iter()
                            .map(|i| format!("{}: {}", i.field, i.issue))
                            .collect::<Vec<_>>()
                            .join("; ")
                    )
                })?;
            }
            states.insert(set.state.clone(), set);
        }
        Ok(Self { states })
    }

    pub fn available_states(&self) -> Vec<&str> {
        self.states.keys().map(String::as_str).collect()
    }

    pub fn state(&self, name: &str) -> Option<&StateQuizzes> {
        self.states.get(name)
    }

    pub fn quiz(&self, state: &str, test_number: u32) -> Option<&QuizDefinition> {
        self.states.get(state)?.tests.get(&test_number)
    }

    pub fn test_summaries(&self, state: &str) -> Vec<TestSummary> {
        let Some(set) = self.states.get(state) else {
            return Vec::new();
        };
        set.tests
            .iter()
            .map(|(number, test)| TestSummary {
                state: set.state.clone(),
                abbreviation: set.abbreviation.clone(),
                test_number: *number,
                title: test.title.clone(),
                description: test.description.clone(),
                question_count: test.questions.len(),
            })
            .collect()
    }

    /// Random subset of a test's questions for practice mode. Returns fewer
    /// than `count` when the test is smaller, and nothing for unknown tests.
    pub fn random_questions(&self, state: &str, test_number: u32, count: usize) -> Vec<Question> {
        match self.quiz(state, test_number) {
            Some(quiz) => quiz
                .questions
                .choose_multiple(&mut rand::thread_rng(), count.min(quiz.questions.len()))
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }
}
