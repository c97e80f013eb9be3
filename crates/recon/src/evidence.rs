use std::collections::HashSet;

use crate::model::{ExtractIssue, ReconSummary, ReconciledRecord, Score, ScoreCounts, ScoreIssue};

/// Compute summary statistics from a reconciled record.
pub fn compute_summary(
    sources: usize,
    record: &ReconciledRecord,
    extract_issues: &[ExtractIssue],
    score_issues: &[ScoreIssue],
) -> ReconSummary {
    let mut scores = ScoreCounts::default();
    let mut contested_fields = Vec::new();
    let mut total_observations = 0;

    for (field, scored) in record.iter() {
        total_observations += scored.len();
        for s in scored {
            match s.score {
                Score::High => scores.high += 1,
                Score::Medium => scores.medium += 1,
                Score::Low => scores.low += 1,
            }
        }

        let distinct: HashSet<&str> = scored.iter().map(|s| s.value.as_str()).collect();
        if distinct.len() > 1 {
            contested_fields.push(field);
        }
    }

    ReconSummary {
        sources,
        total_fields: record.len(),
        total_observations,
        contested_fields,
        scores,
        extract_issues: extract_issues.len(),
        score_issues: score_issues.len(),
    }
}
