use std::cmp::Reverse;
use std::collections::HashMap;

use crate::error::ScoreError;
use crate::field::CanonicalField;
use crate::model::{FieldObservations, Observation, ReconciledRecord, Score, ScoreIssue, ScoredObservation};

/// Scored record plus the fields that could not be scored.
#[derive(Debug, Clone, Default)]
pub struct Scoring {
    pub record: ReconciledRecord,
    pub issues: Vec<ScoreIssue>,
}

/// Score every field by cross-source agreement and order fields for review.
///
/// A field that fails to score is left out and reported; the rest still score.
pub fn score(observations: &FieldObservations) -> Scoring {
    let mut scored = Vec::with_capacity(observations.len());
    let mut issues = Vec::new();

    for (field, list) in observations.iter() {
        match score_field(field, list) {
            Ok(ranked) => scored.push((field, ranked)),
            Err(error) => {
                log::warn!("field '{field}' not scored: {error}");
                issues.push(ScoreIssue { field, error });
            }
        }
    }

    Scoring {
        record: ReconciledRecord::from_ordered(presentation_order(scored)),
        issues,
    }
}

/// Score one field's observations, highest score first.
///
/// - one distinct value: High when several sources agree, Medium for a lone source
/// - every value distinct: Low across the board
/// - otherwise: High for a sole plurality leader, Medium for other repeated
///   values, Low for singletons
///
/// Equal scores keep extraction order.
pub fn score_field(
    field: CanonicalField,
    observations: &[Observation],
) -> Result<Vec<ScoredObservation>, ScoreError> {
    if observations.is_empty() {
        return Err(ScoreError::NoObservations);
    }
    if let Some(stray) = observations.iter().find(|o| o.field != field) {
        return Err(ScoreError::FieldMismatch {
            found: stray.field.to_string(),
        });
    }

    let total = observations.len();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for o in observations {
        *counts.entry(o.value.as_str()).or_insert(0) += 1;
    }
    let distinct = counts.len();
    let max_count = counts.values().copied().max().unwrap_or(0);
    let leaders = counts.values().filter(|&&c| c == max_count).count();

    let mut scored: Vec<ScoredObservation> = observations
        .iter()
        .map(|o| {
            let count = counts[o.value.as_str()];
            let score = if distinct == 1 {
                if total > 1 {
                    Score::High
                } else {
                    Score::Medium
                }
            } else if distinct == total {
                Score::Low
            } else if count == max_count && leaders == 1 {
                Score::High
            } else if count > 1 {
                Score::Medium
            } else {
                Score::Low
            };

            ScoredObservation {
                field,
                value: o.value.clone(),
                source: o.source.clone(),
                score,
                action: field.actions().to_vec(),
            }
        })
        .collect();

    // stable: ties stay in extraction order
    scored.sort_by_key(|s| Reverse(s.score.rank()));
    Ok(scored)
}

/// Identity fields first, then other "Name" fields alphabetically, then the
/// rest in first-seen order.
fn presentation_order(
    scored: Vec<(CanonicalField, Vec<ScoredObservation>)>,
) -> Vec<(CanonicalField, Vec<ScoredObservation>)> {
    let (identity, others): (Vec<_>, Vec<_>) =
        scored.into_iter().partition(|(f, _)| f.is_identity());
    let (mut named, rest): (Vec<_>, Vec<_>) =
        others.into_iter().partition(|(f, _)| f.is_name_like());

    let mut ordered = Vec::with_capacity(identity.len() + named.len() + rest.len());
    let mut identity = identity;
    for field in CanonicalField::IDENTITY {
        if let Some(pos) = identity.iter().position(|(f, _)| *f == field) {
            ordered.push(identity.remove(pos));
        }
    }

    named.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
    ordered.extend(named);
    ordered.extend(rest);
    ordered
}
