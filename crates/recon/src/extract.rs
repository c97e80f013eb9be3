use std::collections::HashSet;

use serde_json::Value;

use crate::config::AliasConfig;
use crate::error::ExtractError;
use crate::field::CanonicalField;
use crate::locality::{parse_postal_code, LocalityResolver};
use crate::model::{json_kind, ExtractIssue, FieldObservations, Observation, RawRecord, SourceBundle};
use crate::normalize::{is_blank, normalize_value, Transform};

/// Observations gathered from a bundle plus everything that was dropped on the way.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub observations: FieldObservations,
    pub issues: Vec<ExtractIssue>,
}

impl Extraction {
    fn drop_observation(
        &mut self,
        source: &str,
        record: usize,
        field: Option<CanonicalField>,
        error: ExtractError,
    ) {
        log::warn!("{source}[{record}]: dropped observation: {error}");
        self.issues.push(ExtractIssue {
            source: source.to_string(),
            record,
            field,
            error,
        });
    }
}

/// Walks source records and emits normalized, source-tagged observations.
pub struct FieldExtractor<'a> {
    config: &'a AliasConfig,
    resolver: &'a dyn LocalityResolver,
}

impl<'a> FieldExtractor<'a> {
    pub fn new(config: &'a AliasConfig, resolver: &'a dyn LocalityResolver) -> Self {
        Self { config, resolver }
    }

    pub fn extract(&self, bundle: &SourceBundle) -> Extraction {
        let mut out = Extraction::default();

        for (source, payload) in bundle.sources() {
            match payload {
                Value::Object(record) => self.extract_record(source, 0, record, &mut out),
                Value::Array(items) => {
                    for (index, item) in items.iter().enumerate() {
                        match item {
                            Value::Object(record) => {
                                self.extract_record(source, index, record, &mut out)
                            }
                            other => out.drop_observation(
                                source,
                                index,
                                None,
                                ExtractError::MalformedRecord { found: json_kind(other) },
                            ),
                        }
                    }
                }
                other => out.drop_observation(
                    source,
                    0,
                    None,
                    ExtractError::MalformedRecord { found: json_kind(other) },
                ),
            }
        }

        log::debug!(
            "extracted {} observations across {} fields from {} sources ({} dropped)",
            out.observations.observation_count(),
            out.observations.len(),
            bundle.len(),
            out.issues.len()
        );
        out
    }

    fn extract_record(&self, source: &str, index: usize, record: &RawRecord, out: &mut Extraction) {
        // Keys already claimed by a field rule; the name catch-all skips these.
        let mut claimed: HashSet<&str> = HashSet::new();

        for rule in &self.config.fields {
            if self.config.is_suppressed(rule.field, source) {
                continue;
            }
            let Some((key, value)) = first_present(record, &rule.aliases) else {
                continue;
            };
            claimed.insert(key);

            match normalize_value(rule.transform, key, value) {
                Ok(text) => out.observations.push(Observation::new(rule.field, text, source)),
                Err(error) => out.drop_observation(source, index, Some(rule.field), error),
            }
        }

        if !self.config.is_self_reported(source)
            && !self.config.is_suppressed(CanonicalField::Locality, source)
        {
            self.enrich_locality(source, index, record, out);
        }

        if self.config.capture_name_keys
            && !self.config.is_suppressed(CanonicalField::LegalName, source)
        {
            self.capture_name_keys(source, index, record, &claimed, out);
        }
    }

    /// Resolve the first present postal code to a locality observation.
    ///
    /// The scan stops at the first synonym key in the record even when its
    /// value is blank; a blank postal code skips enrichment.
    fn enrich_locality(&self, source: &str, index: usize, record: &RawRecord, out: &mut Extraction) {
        let aliases = self.config.aliases_for(CanonicalField::PostalCode);
        let Some((key, value)) = aliases
            .iter()
            .find_map(|alias| record.get_key_value(alias.as_str()))
        else {
            return;
        };
        if is_blank(value) {
            return;
        }

        let Some(postal_code) = parse_postal_code(value) else {
            let error = ExtractError::PostalCode {
                key: key.clone(),
                value: value.as_str().map_or_else(|| value.to_string(), str::to_string),
            };
            out.drop_observation(source, index, Some(CanonicalField::Locality), error);
            return;
        };

        match self.resolver.lookup(postal_code) {
            Some(locality) => out.observations.push(Observation::new(
                CanonicalField::Locality,
                locality.to_uppercase(),
                source,
            )),
            None => log::debug!("{source}[{index}]: no locality for postcode {postal_code}"),
        }
    }

    /// File unclaimed keys containing "name" as extra Legal Name observations.
    fn capture_name_keys(
        &self,
        source: &str,
        index: usize,
        record: &RawRecord,
        claimed: &HashSet<&str>,
        out: &mut Extraction,
    ) {
        let legal_aliases = self.config.aliases_for(CanonicalField::LegalName);

        for (key, value) in record {
            if claimed.contains(key.as_str()) || is_blank(value) {
                continue;
            }
            if !key.to_lowercase().contains("name") {
                continue;
            }

            let transform = legal_aliases
                .iter()
                .any(|a| a == key)
                .then_some(Transform::PersonName);

            match normalize_value(transform, key, value) {
                Ok(text) => out.observations.push(Observation::new(
                    CanonicalField::LegalName,
                    text,
                    source,
                )),
                Err(error) => {
                    out.drop_observation(source, index, Some(CanonicalField::LegalName), error)
                }
            }
        }
    }
}

/// First alias with a non-blank value, in alias order.
fn first_present<'r>(record: &'r RawRecord, aliases: &[String]) -> Option<(&'r str, &'r Value)> {
    aliases.iter().find_map(|alias| {
        record
            .get_key_value(alias.as_str())
            .filter(|(_, value)| !is_blank(value))
            .map(|(key, value)| (key.as_str(), value))
    })
}
