//! Statistics derived from stored attempts on every read.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    config::{ACHIEVEMENT_MIN_QUESTIONS, SPEED_MAX_AVG_SECONDS, SPEED_MIN_ACCURACY},
    models::attempt::AttemptScore,
};

/// One account's history on one pack.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PackStats {
    pub attempts: i64,
    pub best_score: i64,
    /// Score of the most recently completed attempt.
    pub last_score: i64,
    pub average_score: f64,
}

/// One account's totals across every pack.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverallStats {
    pub total_games_played: i64,
    pub total_correct_answers: i64,
    pub total_questions_answered: i64,
    /// Percent, `0.0` when nothing has been answered.
    pub accuracy: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Achievements {
    /// Every answer right on a long enough attempt.
    pub flawless_quiz: bool,
    /// Fast and accurate on a long enough attempt.
    pub sharpshooter_speed_quiz: bool,
}

/// Aggregates attempts that all belong to the same pack.
pub fn pack_stats<'a, I>(attempts: I) -> PackStats
where
    I: IntoIterator<Item = &'a AttemptScore>,
{
    let mut stats = PackStats::default();
    let mut latest: Option<&AttemptScore> = None;
    let mut sum = 0;

    for attempt in attempts {
        stats.attempts += 1;
        stats.best_score = stats.best_score.max(attempt.score);
        sum += attempt.score;

        let newer = latest.is_none_or(|l| {
            (attempt.completed_at, attempt.id) > (l.completed_at, l.id)
        });
        if newer {
            latest = Some(attempt);
        }
    }

    stats.last_score = latest.map(|a| a.score).unwrap_or(0);
    if stats.attempts > 0 {
        stats.average_score = sum as f64 / stats.attempts as f64;
    }
    stats
}

/// Groups attempts by pack and aggregates each group.
pub fn stats_by_pack(attempts: &[AttemptScore]) -> BTreeMap<i64, PackStats> {
    let mut grouped: BTreeMap<i64, Vec<&AttemptScore>> = BTreeMap::new();
    for attempt in attempts {
        grouped.entry(attempt.pack_id).or_default().push(attempt);
    }

    grouped
        .into_iter()
        .map(|(pack_id, group)| (pack_id, pack_stats(group)))
        .collect()
}

pub fn overall_stats(attempts: &[AttemptScore]) -> OverallStats {
    let total_correct_answers: i64 = attempts.iter().map(|a| a.score).sum();
    let total_questions_answered: i64 = attempts.iter().map(|a| a.total_questions).sum();

    OverallStats {
        total_games_played: attempts.len() as i64,
        total_correct_answers,
        total_questions_answered,
        accuracy: percent(total_correct_answers, total_questions_answered),
    }
}

pub fn achievements(attempts: &[AttemptScore]) -> Achievements {
    let long_enough = |a: &&AttemptScore| a.total_questions >= ACHIEVEMENT_MIN_QUESTIONS;

    Achievements {
        flawless_quiz: attempts
            .iter()
            .filter(long_enough)
            .any(|a| a.score == a.total_questions),
        sharpshooter_speed_quiz: attempts.iter().filter(long_enough).any(|a| {
            a.avg_time_per_question
                .is_some_and(|avg| avg <= SPEED_MAX_AVG_SECONDS)
                && percent(a.score, a.total_questions) >= SPEED_MIN_ACCURACY
        }),
    }
}

fn percent(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}
