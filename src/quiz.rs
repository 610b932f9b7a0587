use serde::{Deserialize, Serialize};

/// One multiple-choice question as produced by the model. Immutable once
/// fetched; `correct_answer_index` is the zero-based index into `options`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuizMode {
    #[default]
    Idle,
    Active,
    Finished,
}

/// Quiz progression for the grammar panel: idle until started, one question
/// at a time while active, finished after the last answer is confirmed.
#[derive(Debug, Default)]
pub struct Quiz {
    questions: Vec<QuizQuestion>,
    mode: QuizMode,
    current: usize,
    selected_answer: Option<usize>,
    score: usize,
}

impl Quiz {
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        Self {
            questions,
            mode: QuizMode::Idle,
            current: 0,
            selected_answer: None,
            score: 0,
        }
    }

    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.current)
    }

    pub fn selected_answer(&self) -> Option<usize> {
        self.selected_answer
    }

    /// Whether the first (and only scored) pick for the current question was
    /// correct. None until an answer has been selected.
    pub fn answered_correctly(&self) -> Option<bool> {
        let selected = self.selected_answer?;
        let question = self.current_question()?;
        Some(selected == question.correct_answer_index)
    }

    pub fn start(&mut self) {
        if !self.questions.is_empty() {
            self.mode = QuizMode::Active;
        }
    }

    /// Score the first selection for the current question; every later
    /// selection on the same question is ignored.
    pub fn select_answer(&mut self, index: usize) {
        if self.mode != QuizMode::Active || self.selected_answer.is_some() {
            return;
        }
        let Some(question) = self.questions.get(self.current) else {
            return;
        };
        if index >= question.options.len() {
            return;
        }
        self.selected_answer = Some(index);
        if index == question.correct_answer_index {
            self.score += 1;
        }
    }

    /// Advance to the next question, or finish after the last one. Does
    /// nothing until the current question has been answered.
    pub fn advance(&mut self) {
        if self.mode != QuizMode::Active || self.selected_answer.is_none() {
            return;
        }
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.selected_answer = None;
        } else {
            self.mode = QuizMode::Finished;
        }
    }

    /// "Try Again": zero the score and position and re-enter the active
    /// state, keeping the already-fetched questions.
    pub fn restart(&mut self) {
        self.current = 0;
        self.selected_answer = None;
        self.score = 0;
        if !self.questions.is_empty() {
            self.mode = QuizMode::Active;
        }
    }

    pub fn is_last_question(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: usize) -> QuizQuestion {
        QuizQuestion {
            question: "Pick one".to_string(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer_index: correct,
        }
    }

    fn three_question_quiz() -> Quiz {
        Quiz::new(vec![question(0), question(1), question(2)])
    }

    #[test]
    fn starts_idle_and_activates() {
        let mut quiz = three_question_quiz();
        assert_eq!(quiz.mode(), QuizMode::Idle);
        quiz.start();
        assert_eq!(quiz.mode(), QuizMode::Active);
        assert_eq!(quiz.current_index(), 0);
        assert_eq!(quiz.score(), 0);
    }

    #[test]
    fn empty_quiz_cannot_start() {
        let mut quiz = Quiz::new(Vec::new());
        quiz.start();
        assert_eq!(quiz.mode(), QuizMode::Idle);
    }

    #[test]
    fn first_answer_is_scored_exactly_once() {
        let mut quiz = three_question_quiz();
        quiz.start();
        quiz.select_answer(0);
        assert_eq!(quiz.score(), 1);
        assert_eq!(quiz.answered_correctly(), Some(true));

        // Re-clicking the same question never changes score or selection.
        quiz.select_answer(1);
        quiz.select_answer(0);
        assert_eq!(quiz.score(), 1);
        assert_eq!(quiz.selected_answer(), Some(0));
    }

    #[test]
    fn wrong_first_answer_scores_zero() {
        let mut quiz = three_question_quiz();
        quiz.start();
        quiz.select_answer(3);
        assert_eq!(quiz.score(), 0);
        assert_eq!(quiz.answered_correctly(), Some(false));
    }

    #[test]
    fn out_of_range_answer_is_ignored() {
        let mut quiz = three_question_quiz();
        quiz.start();
        quiz.select_answer(7);
        assert_eq!(quiz.selected_answer(), None);
        assert_eq!(quiz.score(), 0);
    }

    #[test]
    fn advance_requires_an_answer() {
        let mut quiz = three_question_quiz();
        quiz.start();
        quiz.advance();
        assert_eq!(quiz.current_index(), 0);

        quiz.select_answer(0);
        quiz.advance();
        assert_eq!(quiz.current_index(), 1);
        assert_eq!(quiz.selected_answer(), None);
    }

    #[test]
    fn final_answer_finishes_with_total_score() {
        let mut quiz = three_question_quiz();
        quiz.start();
        quiz.select_answer(0); // correct
        quiz.advance();
        quiz.select_answer(0); // wrong (correct is 1)
        quiz.advance();
        assert!(quiz.is_last_question());
        quiz.select_answer(2); // correct
        quiz.advance();

        assert_eq!(quiz.mode(), QuizMode::Finished);
        assert_eq!(quiz.score(), 2);
        assert_eq!(quiz.len(), 3);
    }

    #[test]
    fn restart_resets_without_new_questions() {
        let mut quiz = three_question_quiz();
        quiz.start();
        for _ in 0..3 {
            quiz.select_answer(0);
            quiz.advance();
        }
        assert_eq!(quiz.mode(), QuizMode::Finished);

        quiz.restart();
        assert_eq!(quiz.mode(), QuizMode::Active);
        assert_eq!(quiz.current_index(), 0);
        assert_eq!(quiz.score(), 0);
        assert_eq!(quiz.selected_answer(), None);
        assert_eq!(quiz.len(), 3);
    }

    #[test]
    fn score_is_bounded_by_question_count() {
        let mut quiz = three_question_quiz();
        quiz.start();
        quiz.select_answer(0);
        quiz.select_answer(0);
        quiz.advance();
        quiz.select_answer(1);
        quiz.advance();
        quiz.select_answer(2);
        quiz.advance();
        assert!(quiz.score() <= quiz.len());
        assert_eq!(quiz.score(), 3);
    }
}
