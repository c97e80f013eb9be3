use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::ReconError;
use crate::field::CanonicalField;
use crate::normalize::Transform;

/// The alias table shipped with the crate.
pub const DEFAULT_ALIASES: &str = include_str!("../aliases.toml");

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Maps each source's raw keys onto canonical fields.
///
/// Field rules are applied in declaration order. Within a rule the first alias
/// present in a record wins.
#[derive(Debug, Clone, Deserialize)]
pub struct AliasConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Source whose records are never enriched with a looked-up locality.
    #[serde(default)]
    pub self_reported_source: Option<String>,
    /// Also file every unmatched key containing "name" as a Legal Name observation.
    #[serde(default)]
    pub capture_name_keys: bool,
    /// Wrapper key around the source map in upstream aggregator output.
    #[serde(default = "default_envelope")]
    pub envelope: String,
    pub fields: Vec<FieldRule>,
    #[serde(default)]
    pub suppress: Vec<SuppressRule>,
}

fn default_name() -> String {
    "aliases".into()
}

fn default_envelope() -> String {
    "combinedResults".into()
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct FieldRule {
    pub field: CanonicalField,
    pub aliases: Vec<String>,
    #[serde(default)]
    pub transform: Option<Transform>,
}

/// Skip `field` entirely for records from `source`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SuppressRule {
    pub field: CanonicalField,
    pub source: String,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl AliasConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: AliasConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ReconError> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| ReconError::Io(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&input)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.fields.is_empty() {
            return Err(ReconError::ConfigValidation(
                "at least one field rule is required".into(),
            ));
        }

        let mut seen = HashSet::new();
        for rule in &self.fields {
            if !seen.insert(rule.field) {
                return Err(ReconError::ConfigValidation(format!(
                    "field '{}' has more than one rule",
                    rule.field
                )));
            }
            if rule.aliases.is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "field '{}' has no aliases",
                    rule.field
                )));
            }
            if rule.aliases.iter().any(|a| a.trim().is_empty()) {
                return Err(ReconError::ConfigValidation(format!(
                    "field '{}' has a blank alias",
                    rule.field
                )));
            }
        }

        for rule in &self.suppress {
            if !seen.contains(&rule.field) {
                return Err(ReconError::ConfigValidation(format!(
                    "suppress rule for source '{}': field '{}' has no rule",
                    rule.source, rule.field
                )));
            }
        }

        if self.envelope.trim().is_empty() {
            return Err(ReconError::ConfigValidation("envelope must not be blank".into()));
        }

        Ok(())
    }

    pub fn rule(&self, field: CanonicalField) -> Option<&FieldRule> {
        self.fields.iter().find(|r| r.field == field)
    }

    pub fn aliases_for(&self, field: CanonicalField) -> &[String] {
        self.rule(field).map(|r| r.aliases.as_slice()).unwrap_or(&[])
    }

    pub fn is_suppressed(&self, field: CanonicalField, source: &str) -> bool {
        self.suppress
            .iter()
            .any(|r| r.field == field && r.source == source)
    }

    pub fn is_self_reported(&self, source: &str) -> bool {
        self.self_reported_source.as_deref() == Some(source)
    }
}

impl Default for AliasConfig {
    /// The embedded `aliases.toml`.
    fn default() -> Self {
        Self::from_toml(DEFAULT_ALIASES).expect("embedded aliases.toml is valid")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
