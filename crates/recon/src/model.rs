use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{serialize_display, ExtractError, ReconError, ScoreError};
use crate::field::CanonicalField;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One raw record from a source: arbitrary keys, arbitrary JSON values.
pub type RawRecord = Map<String, Value>;

/// Records collected from every source, keyed by source name.
///
/// Each source carries one record object or an array of them. Source order
/// is the order of insertion (document order when parsed from JSON).
#[derive(Debug, Clone, Default)]
pub struct SourceBundle {
    sources: Vec<(String, Value)>,
}

impl SourceBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source payload. Re-inserting a source replaces its payload in place.
    pub fn insert(&mut self, source: impl Into<String>, payload: Value) {
        let source = source.into();
        match self.sources.iter_mut().find(|(name, _)| *name == source) {
            Some(slot) => slot.1 = payload,
            None => self.sources.push((source, payload)),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>, payload: Value) -> Self {
        self.insert(source, payload);
        self
    }

    /// Build from a parsed JSON document.
    ///
    /// When the top-level object holds `envelope`, that object is the source
    /// map and must be an object; otherwise the top-level object itself is.
    pub fn from_value(value: Value, envelope: &str) -> Result<Self, ReconError> {
        let mut top = match value {
            Value::Object(top) => top,
            other => {
                return Err(ReconError::InputParse(format!(
                    "top-level value must be an object, found {}",
                    json_kind(&other)
                )));
            }
        };

        let sources = match top.remove(envelope) {
            Some(Value::Object(inner)) => inner,
            Some(other) => {
                return Err(ReconError::InputParse(format!(
                    "'{envelope}' must be an object of sources, found {}",
                    json_kind(&other)
                )));
            }
            None => top,
        };

        Ok(Self {
            sources: sources.into_iter().collect(),
        })
    }

    pub fn from_json_str(input: &str, envelope: &str) -> Result<Self, ReconError> {
        let value: Value =
            serde_json::from_str(input).map_err(|e| ReconError::InputParse(e.to_string()))?;
        Self::from_value(value, envelope)
    }

    pub fn sources(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.sources.iter().map(|(name, payload)| (name.as_str(), payload))
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// One normalized fact reported by one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observation {
    pub field: CanonicalField,
    pub value: String,
    pub source: String,
}

impl Observation {
    pub fn new(field: CanonicalField, value: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            source: source.into(),
        }
    }
}

/// Observations grouped per field, fields in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldObservations {
    fields: Vec<(CanonicalField, Vec<Observation>)>,
}

impl FieldObservations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an observation under its own field.
    pub fn push(&mut self, observation: Observation) {
        let field = observation.field;
        match self.fields.iter_mut().find(|(f, _)| *f == field) {
            Some((_, list)) => list.push(observation),
            None => self.fields.push((field, vec![observation])),
        }
    }

    /// Set a field's list wholesale, keeping its position if already present.
    pub fn insert(&mut self, field: CanonicalField, observations: Vec<Observation>) {
        match self.fields.iter_mut().find(|(f, _)| *f == field) {
            Some((_, list)) => *list = observations,
            None => self.fields.push((field, observations)),
        }
    }

    pub fn get(&self, field: CanonicalField) -> Option<&[Observation]> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, list)| list.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &[Observation])> {
        self.fields.iter().map(|(f, list)| (*f, list.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn observation_count(&self) -> usize {
        self.fields.iter().map(|(_, list)| list.len()).sum()
    }
}

impl FromIterator<Observation> for FieldObservations {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        let mut out = Self::new();
        for observation in iter {
            out.push(observation);
        }
        out
    }
}

/// A dropped observation or skipped record, kept for inspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractIssue {
    pub source: String,
    /// Index of the record within its source (0 for single-record sources).
    pub record: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<CanonicalField>,
    #[serde(serialize_with = "serialize_display")]
    pub error: ExtractError,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Score {
    High,
    Medium,
    Low,
}

impl Score {
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Add,
    Delete,
    Edit,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => write!(f, "ADD"),
            Self::Delete => write!(f, "DELETE"),
            Self::Edit => write!(f, "EDIT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredObservation {
    #[serde(skip)]
    pub field: CanonicalField,
    pub value: String,
    pub source: String,
    pub score: Score,
    pub action: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreIssue {
    pub field: CanonicalField,
    #[serde(serialize_with = "serialize_display")]
    pub error: ScoreError,
}

/// Scored observations per field, in presentation order.
///
/// Serializes as a JSON object keyed by field display name, preserving order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciledRecord {
    fields: Vec<(CanonicalField, Vec<ScoredObservation>)>,
}

impl ReconciledRecord {
    pub(crate) fn from_ordered(fields: Vec<(CanonicalField, Vec<ScoredObservation>)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, field: CanonicalField) -> Option<&[ScoredObservation]> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, list)| list.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &[ScoredObservation])> {
        self.fields.iter().map(|(f, list)| (*f, list.as_slice()))
    }

    pub fn field_order(&self) -> Vec<CanonicalField> {
        self.fields.iter().map(|(f, _)| *f).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for ReconciledRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, scored) in &self.fields {
            map.serialize_entry(field.as_str(), scored)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconSummary {
    pub sources: usize,
    pub total_fields: usize,
    pub total_observations: usize,
    /// Fields whose observations disagree on the value.
    pub contested_fields: Vec<CanonicalField>,
    pub scores: ScoreCounts,
    pub extract_issues: usize,
    pub score_issues: usize,
}

impl ReconSummary {
    pub fn is_contested(&self) -> bool {
        !self.contested_fields.is_empty()
    }
}

/// Everything one reconciliation call produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconReport {
    pub summary: ReconSummary,
    pub fields: ReconciledRecord,
    pub extract_issues: Vec<ExtractIssue>,
    pub score_issues: Vec<ScoreIssue>,
}
