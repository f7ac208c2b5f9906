//! Turns a pack's stored questions into a shuffled presentation plus the
//! server-side answer key needed to grade it.

use std::collections::HashMap;

use rand::{Rng, seq::SliceRandom};
use serde::Serialize;

use crate::{error::AppError, models::question::Question};

/// A question as the client sees it. Carries no hint of the right answer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentedQuestion {
    pub id: i64,
    pub question: String,
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Body of `GET /quiz/{pack_id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizPayload {
    pub pack_id: i64,
    pub title: String,
    pub questions: Vec<PresentedQuestion>,
}

/// What the server keeps per presented question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerKey {
    /// Correct option index in presentation order.
    pub correct_index: usize,
    /// `option_order[presented] == stored` index of that option.
    pub option_order: Vec<usize>,
}

impl AnswerKey {
    /// Maps a presented option index back to the stored order.
    pub fn stored_index(&self, presented: usize) -> Option<usize> {
        self.option_order.get(presented).copied()
    }
}

/// A freshly dealt quiz: what to send, and what to remember.
#[derive(Debug)]
pub struct DealtQuiz {
    pub questions: Vec<PresentedQuestion>,
    pub answer_key: HashMap<i64, AnswerKey>,
}

/// Shuffles question order and, within each question, option order.
///
/// Both shuffles are Fisher-Yates, so every ordering is equally likely.
/// The correct index is remapped through the option permutation.
pub fn deal<R: Rng + ?Sized>(questions: Vec<Question>, rng: &mut R) -> Result<DealtQuiz, AppError> {
    if questions.is_empty() {
        return Err(AppError::EmptyContent(
            "This quiz currently has no questions.".to_string(),
        ));
    }

    let mut questions = questions;
    questions.shuffle(rng);

    let mut presented = Vec::with_capacity(questions.len());
    let mut answer_key = HashMap::with_capacity(questions.len());

    for q in questions {
        let stored_options = q.options.0;
        let stored_correct = usize::try_from(q.correct_answer_index)
            .ok()
            .filter(|idx| *idx < stored_options.len())
            .ok_or_else(|| {
                AppError::InternalServerError(format!(
                    "question {} has correct index {} but {} options",
                    q.id,
                    q.correct_answer_index,
                    stored_options.len()
                ))
            })?;

        let mut option_order: Vec<usize> = (0..stored_options.len()).collect();
        option_order.shuffle(rng);

        // `stored_correct` is in bounds, so it appears exactly once in the permutation.
        let correct_index = option_order
            .iter()
            .position(|&stored| stored == stored_correct)
            .unwrap_or_default();

        let options = option_order
            .iter()
            .map(|&stored| stored_options[stored].clone())
            .collect();

        presented.push(PresentedQuestion {
            id: q.id,
            question: q.question_text,
            options,
            image_url: q.image_url,
        });
        answer_key.insert(
            q.id,
            AnswerKey {
                correct_index,
                option_order,
            },
        );
    }

    Ok(DealtQuiz {
        questions: presented,
        answer_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use sqlx::types::Json;

    fn question(id: i64, correct: i64) -> Question {
        Question {
            id,
            pack_id: 1,
            question_text: format!("Question {}", id),
            options: Json((0..4).map(|i| format!("q{}-opt{}", id, i)).collect()),
            correct_answer_index: correct,
            image_url: None,
        }
    }

    #[test]
    fn test_empty_pack_cannot_be_dealt() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = deal(vec![], &mut rng).unwrap_err();
        assert!(matches!(err, AppError::EmptyContent(_)));
    }

    #[test]
    fn test_remapped_index_points_at_stored_correct_option() {
        let mut rng = StdRng::seed_from_u64(7);
        for round in 0..200 {
            let originals: Vec<Question> = (1..=4).map(|id| question(id, (id + round) % 4)).collect();
            let dealt = deal(originals.clone(), &mut rng).unwrap();

            for presented in &dealt.questions {
                let original = originals.iter().find(|q| q.id == presented.id).unwrap();
                let key = &dealt.answer_key[&presented.id];
                let stored_correct = original.correct_answer_index as usize;

                assert_eq!(
                    presented.options[key.correct_index],
                    original.options.0[stored_correct]
                );
                assert_eq!(key.stored_index(key.correct_index), Some(stored_correct));

                let mut sorted = presented.options.clone();
                sorted.sort();
                let mut expected = original.options.0.clone();
                expected.sort();
                assert_eq!(sorted, expected);
            }
        }
    }

    #[test]
    fn test_payload_never_carries_correct_index() {
        let mut rng = StdRng::seed_from_u64(3);
        let dealt = deal(vec![question(1, 2), question(2, 0)], &mut rng).unwrap();
        let payload = QuizPayload {
            pack_id: 1,
            title: "P".to_string(),
            questions: dealt.questions,
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["packId"], 1);
        for q in json["questions"].as_array().unwrap() {
            let fields: Vec<&String> = q.as_object().unwrap().keys().collect();
            assert_eq!(fields.len(), 3, "unexpected fields: {:?}", fields);
            assert!(q.get("id").is_some());
            assert!(q.get("question").is_some());
            assert!(q.get("options").is_some());
        }
        assert!(!json.to_string().contains("correct"));
    }

    #[test]
    fn test_out_of_bounds_stored_index_is_rejected() {
        let mut rng = StdRng::seed_from_u64(5);
        let err = deal(vec![question(1, 9)], &mut rng).unwrap_err();
        assert!(matches!(err, AppError::InternalServerError(_)));
    }

    #[test]
    fn test_question_order_is_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(2024);
        let trials = 6000;
        let mut counts: HashMap<Vec<i64>, usize> = HashMap::new();

        for _ in 0..trials {
            let dealt = deal(vec![question(1, 0), question(2, 1), question(3, 2)], &mut rng).unwrap();
            let order: Vec<i64> = dealt.questions.iter().map(|q| q.id).collect();
            *counts.entry(order).or_default() += 1;
        }

        // 3! orderings, ~1000 each; the bound is about five standard deviations.
        assert_eq!(counts.len(), 6);
        for (order, count) in counts {
            assert!(
                (850..=1150).contains(&count),
                "ordering {:?} seen {} times",
                order,
                count
            );
        }
    }
}
