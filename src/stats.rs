//! Pure aggregates over past attempts, consumed by the progress surface.
//! Every function is total: an empty history yields an explicit "no data"
//! value instead of an error so the UI can render its empty state.

use crate::models::QuizResult;
use chrono::DateTime;
use serde::Serialize;

pub fn count(results: &[QuizResult]) -> usize {
    results.len()
}

/// Mean of the attempt percentages, rounded to the nearest integer.
pub fn average_percentage(results: &[QuizResult]) -> Option<u32> {
    if results.is_empty() {
        return None;
    }
    let sum: u64 = results.iter().map(|r| u64::from(r.percentage)).sum();
    Some((sum as f64 / results.len() as f64).round() as u32)
}

pub fn best(results: &[QuizResult]) -> Option<&QuizResult> {
    results.iter().max_by_key(|r| r.percentage)
}

/// Most recent attempt by timestamp. Unparseable timestamps sort before
/// every valid one.
pub fn latest(results: &[QuizResult]) -> Option<&QuizResult> {
    results
        .iter()
        .max_by_key(|r| DateTime::parse_from_rfc3339(&r.timestamp).ok())
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProgressSummary {
    pub attempts: usize,
    pub average_percentage: Option<u32>,
    pub best_percentage: Option<u32>,
    pub latest_percentage: Option<u32>,
}

pub fn summarize(results: &[QuizResult]) -> ProgressSummary {
    ProgressSummary {
        attempts: count(results),
        average_percentage: average_percentage(results),
        best_percentage: best(results).map(|r| r.percentage),
        latest_percentage: latest(results).map(|r| r.percentage),
    }
}
