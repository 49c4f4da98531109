use crate::error::QuizError;
use crate::models::{validate_question_set, Question, QuizResult};
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Score {
    pub score: u32,
    pub total: u32,
    pub percentage: u32,
}

/// One attempt at a fixed, ordered set of questions. The session is either
/// in progress or completed; once completed the answers are frozen and only
/// reads are allowed. Not thread-safe: one session belongs to one screen.
#[derive(Debug, Clone)]
pub struct QuizSession {
    state: String,
    test_number: u32,
    questions: Vec<Question>,
    current_index: usize,
    answers: Vec<Option<String>>,
    completed: bool,
}

impl QuizSession {
    pub fn start(
        state: impl Into<String>,
        test_number: u32,
        questions: Vec<Question>,
    ) -> Result<Self, QuizError> {
        validate_question_set(&questions).map_err(QuizError::InvalidQuiz)?;
        let answers = vec![None; questions.len()];
        Ok(Self {
            state: state.into(),
            test_number,
            questions,
            current_index: 0,
            answers,
            completed: false,
        })
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    /// The recorded answer for the current question, if any.
    pub fn current_answer(&self) -> Option<&str> {
        self.answers[self.current_index].as_deref()
    }

    pub fn answers(&self) -> &[Option<String>] {
        &self.answers
    }

    /// Records `option` for the current question, overwriting any earlier
    /// choice. Re-selection is allowed both before advancing and after
    /// revisiting via `retreat`.
    pub fn select_answer(&mut self, option: &str) -> Result<(), QuizError> {
        if self.completed {
            return Err(QuizError::SessionCompleted);
        }
        if !self.current_question().has_option(option) {
            return Err(QuizError::InvalidAnswer {
                index: self.current_index,
                answer: option.to_string(),
            });
        }
        self.answers[self.current_index] = Some(option.to_string());
        Ok(())
    }

    /// Moves to the next question, or finalizes the session when called on
    /// the last one. Forward progress requires a recorded answer; a failed
    /// call leaves the session untouched.
    pub fn advance(&mut self) -> Result<Option<QuizResult>, QuizError> {
        if self.completed {
            return Err(QuizError::SessionCompleted);
        }
        if self.answers[self.current_index].is_none() {
            return Err(QuizError::NoAnswerSelected);
        }
        if self.current_index + 1 == self.questions.len() {
            self.completed = true;
            return Ok(Some(self.result()));
        }
        self.current_index += 1;
        Ok(None)
    }

    /// Moves back one question. Neither the answer being left nor the one
    /// being revisited is cleared.
    pub fn retreat(&mut self) -> Result<(), QuizError> {
        if self.completed {
            return Err(QuizError::SessionCompleted);
        }
        if self.current_index == 0 {
            return Err(QuizError::AtStart);
        }
        self.current_index -= 1;
        Ok(())
    }

    pub fn score(&self) -> Result<Score, QuizError> {
        if !self.completed {
            return Err(QuizError::SessionNotComplete);
        }
        Ok(self.tally())
    }

    fn tally(&self) -> Score {
        let correct = self
            .questions
            .iter()
            .zip(&self.answers)
            .filter(|(q, a)| a.as_deref().is_some_and(|a| q.is_correct(a)))
            .count() as u32;
        let total = self.questions.len() as u32;
        let percentage = (correct as f64 * 100.0 / total as f64).round() as u32;
        Score { score: correct, total, percentage }
    }

    fn result(&self) -> QuizResult {
        let score = self.tally();
        QuizResult {
            state: self.state.clone(),
            test_number: self.test_number,
            score: score.score,
            total: score.total,
            percentage: score.percentage,
            answers: self.answers.clone(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(prompt: &str, correct: &str, wrong: &str) -> Question {
        Question {
            prompt: prompt.into(),
            options: vec![correct.into(), wrong.into()],
            correct_answer: correct.into(),
            explanation: None,
        }
    }

    fn five_question_session() -> QuizSession {
        let questions = (1..=5)
            .map(|n| question(&format!("Q{n}"), &format!("right{n}"), &format!("wrong{n}")))
            .collect();
        QuizSession::start("California", 1, questions).unwrap()
    }

    #[test]
    fn start_rejects_empty_question_list() {
        let err = QuizSession::start("California", 1, Vec::new()).unwrap_err();
        assert!(matches!(err, QuizError::InvalidQuiz(_)));
    }

    #[test]
    fn start_rejects_question_with_foreign_correct_answer() {
        let mut q = question("Q1", "right", "wrong");
        q.correct_answer = "elsewhere".into();
        let err = QuizSession::start("California", 1, vec![q]).unwrap_err();
        let QuizError::InvalidQuiz(issues) = err else {
            panic!("expected InvalidQuiz");
        };
        assert!(issues.iter().any(|i| i.field.contains("correct_answer")));
    }

    #[test]
    fn advance_without_answer_fails_and_keeps_position() {
        let mut session = five_question_session();
        let err = session.advance().unwrap_err();
        assert!(matches!(err, QuizError::NoAnswerSelected));
        assert_eq!(session.current_index(), 0);
        assert!(!session.is_completed());
    }

    #[test]
    fn select_answer_rejects_unknown_option() {
        let mut session = five_question_session();
        let err = session.select_answer("not an option").unwrap_err();
        assert!(matches!(err, QuizError::InvalidAnswer { index: 0, .. }));
        assert_eq!(session.current_answer(), None);
    }

    #[test]
    fn retreat_at_start_fails() {
        let mut session = five_question_session();
        assert!(matches!(session.retreat().unwrap_err(), QuizError::AtStart));
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn score_before_completion_fails() {
        let session = five_question_session();
        assert!(matches!(session.score().unwrap_err(), QuizError::SessionNotComplete));
    }

    #[test]
    fn advance_strictly_increases_index_until_completion() {
        let mut session = five_question_session();
        for expected in 0..5 {
            assert_eq!(session.current_index(), expected);
            session.select_answer(&format!("right{}", expected + 1)).unwrap();
            let result = session.advance().unwrap();
            assert_eq!(result.is_some(), expected == 4);
        }
        assert!(session.is_completed());
        assert!(matches!(session.advance().unwrap_err(), QuizError::SessionCompleted));
        assert!(matches!(
            session.select_answer("right1").unwrap_err(),
            QuizError::SessionCompleted
        ));
    }

    #[test]
    fn revisited_answer_is_overwritten_without_touching_others() {
        let mut session = five_question_session();
        session.select_answer("right1").unwrap();
        session.advance().unwrap();
        session.select_answer("right2").unwrap();
        session.retreat().unwrap();
        assert_eq!(session.current_answer(), Some("right1"));
        session.select_answer("wrong1").unwrap();
        assert_eq!(session.current_answer(), Some("wrong1"));
        assert_eq!(session.answers()[1].as_deref(), Some("right2"));
        assert_eq!(session.answers()[2], None);
    }

    #[test]
    fn navigation_preserves_selection_on_revisit() {
        let questions = vec![
            question("Speed limit?", "25 mph", "35 mph"),
            question("BAC limit?", "0.08%", "0.10%"),
            question("Hydrant distance?", "15 feet", "10 feet"),
        ];
        let mut session = QuizSession::start("California", 1, questions).unwrap();
        session.select_answer("25 mph").unwrap();
        session.advance().unwrap();
        session.select_answer("0.08%").unwrap();
        session.retreat().unwrap();
        assert_eq!(session.current_question().prompt, "Speed limit?");
        assert_eq!(session.current_answer(), Some("25 mph"));
    }

    #[test]
    fn four_of_five_scores_eighty_percent() {
        let mut session = five_question_session();
        for n in 1..=5 {
            let choice = if n == 3 { format!("wrong{n}") } else { format!("right{n}") };
            session.select_answer(&choice).unwrap();
            session.advance().unwrap();
        }
        let score = session.score().unwrap();
        assert_eq!(score, Score { score: 4, total: 5, percentage: 80 });
        // Scoring is pure over the frozen answers.
        assert_eq!(session.score().unwrap(), score);
    }

    #[test]
    fn single_question_quiz_completes_on_first_advance() {
        let mut session =
            QuizSession::start("Washington", 1, vec![question("Q1", "right", "wrong")]).unwrap();
        session.select_answer("right").unwrap();
        let result = session.advance().unwrap().unwrap();
        assert!(session.is_completed());
        assert_eq!(session.score().unwrap(), Score { score: 1, total: 1, percentage: 100 });
        assert_eq!(result.score, 1);
        assert_eq!(result.percentage, 100);
        assert_eq!(result.state, "Washington");
    }

    #[test]
    fn finalized_result_copies_answers_and_metadata() {
        let mut session = five_question_session();
        let mut finished = None;
        for n in 1..=5 {
            session.select_answer(&format!("right{n}")).unwrap();
            finished = session.advance().unwrap();
        }
        let result = finished.unwrap();
        assert_eq!(result.state, "California");
        assert_eq!(result.test_number, 1);
        assert_eq!((result.score, result.total, result.percentage), (5, 5, 100));
        assert_eq!(result.answers.len(), 5);
        assert_eq!(result.answers[2].as_deref(), Some("right3"));
        assert!(chrono::DateTime::parse_from_rfc3339(&result.timestamp).is_ok());
    }
}
