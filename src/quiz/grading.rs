//! Grades a submission against the answer key taken from the session store.

use std::collections::{HashMap, HashSet};

use crate::{
    models::attempt::{AnswerRecord, SubmittedAnswer},
    quiz::engine::AnswerKey,
};

#[derive(Debug, Clone, PartialEq)]
pub struct GradedQuiz {
    pub score: i64,
    /// Size of the answer key, whatever the client sent.
    pub total_questions: i64,
    pub answers: Vec<AnswerRecord>,
    pub avg_time_per_question: Option<f64>,
}

/// Scores `answers` against `key`.
///
/// Unknown question ids, repeated answers to one question and out-of-range
/// selections are kept in the breakdown but count as wrong, so
/// `0 <= score <= total_questions` holds for any input.
pub fn grade(
    key: &HashMap<i64, AnswerKey>,
    answers: &[SubmittedAnswer],
    total_time_taken: Option<f64>,
) -> GradedQuiz {
    let mut graded: HashSet<i64> = HashSet::with_capacity(key.len());
    let mut records = Vec::with_capacity(answers.len());
    let mut score = 0;

    for answer in answers {
        let selected = answer.selected_answer_index;

        let record = match key.get(&answer.question_id) {
            Some(question_key) if graded.insert(answer.question_id) => {
                let presented = selected.and_then(|idx| usize::try_from(idx).ok());
                let is_correct = presented == Some(question_key.correct_index);
                if is_correct {
                    score += 1;
                }
                AnswerRecord {
                    question_id: answer.question_id,
                    user_answer_index: recorded_index(question_key, selected),
                    is_correct,
                }
            }
            Some(question_key) => {
                tracing::warn!(
                    "question {} answered more than once, ignoring repeat",
                    answer.question_id
                );
                AnswerRecord {
                    question_id: answer.question_id,
                    user_answer_index: recorded_index(question_key, selected),
                    is_correct: false,
                }
            }
            None => {
                tracing::warn!(
                    "question {} was not part of this quiz, marking incorrect",
                    answer.question_id
                );
                AnswerRecord {
                    question_id: answer.question_id,
                    user_answer_index: selected,
                    is_correct: false,
                }
            }
        };
        records.push(record);
    }

    let total_questions = key.len() as i64;
    let avg_time_per_question = match total_time_taken {
        Some(secs) if total_questions > 0 && secs.is_finite() => {
            Some(secs / total_questions as f64)
        }
        _ => None,
    };

    GradedQuiz {
        score,
        total_questions,
        answers: records,
        avg_time_per_question,
    }
}

/// Translates a presented selection to stored order. A selection that names
/// no presented option is kept as sent.
fn recorded_index(key: &AnswerKey, selected: Option<i64>) -> Option<i64> {
    selected.map(|raw| {
        usize::try_from(raw)
            .ok()
            .and_then(|presented| key.stored_index(presented))
            .map_or(raw, |stored| stored as i64)
    })
}
