use serde_json::Value;

use crate::config::AliasConfig;
use crate::evidence::compute_summary;
use crate::extract::FieldExtractor;
use crate::locality::LocalityResolver;
use crate::model::{ReconReport, ReconciledRecord, SourceBundle};
use crate::score::score;

/// Extract-then-score pipeline over a fixed alias table and locality dataset.
///
/// Holds only shared references; one `Reconciler` can serve any number of
/// calls, including concurrent ones.
pub struct Reconciler<'a> {
    config: &'a AliasConfig,
    resolver: &'a dyn LocalityResolver,
}

impl<'a> Reconciler<'a> {
    pub fn new(config: &'a AliasConfig, resolver: &'a dyn LocalityResolver) -> Self {
        Self { config, resolver }
    }

    pub fn reconcile(&self, bundle: &SourceBundle) -> ReconciledRecord {
        self.run(bundle).fields
    }

    /// Reconcile a parsed JSON document. A non-object document yields an empty record.
    pub fn reconcile_value(&self, value: Value) -> ReconciledRecord {
        match SourceBundle::from_value(value, &self.config.envelope) {
            Ok(bundle) => self.reconcile(&bundle),
            Err(e) => {
                log::warn!("ignoring input: {e}");
                ReconciledRecord::default()
            }
        }
    }

    /// Reconcile serialized JSON. Malformed text yields an empty record.
    pub fn reconcile_str(&self, input: &str) -> ReconciledRecord {
        match SourceBundle::from_json_str(input, &self.config.envelope) {
            Ok(bundle) => self.reconcile(&bundle),
            Err(e) => {
                log::warn!("ignoring input: {e}");
                ReconciledRecord::default()
            }
        }
    }

    /// Reconcile and keep every dropped observation and unscored field.
    pub fn run(&self, bundle: &SourceBundle) -> ReconReport {
        let extraction = FieldExtractor::new(self.config, self.resolver).extract(bundle);
        let scoring = score(&extraction.observations);

        let summary = compute_summary(
            bundle.len(),
            &scoring.record,
            &extraction.issues,
            &scoring.issues,
        );

        log::debug!(
            "reconciled {} fields ({} contested) from {} sources",
            summary.total_fields,
            summary.contested_fields.len(),
            summary.sources
        );

        ReconReport {
            summary,
            fields: scoring.record,
            extract_issues: extraction.issues,
            score_issues: scoring.issues,
        }
    }
}

/// Run reconciliation per config. Returns scored fields + issues + summary.
pub fn run(
    config: &AliasConfig,
    resolver: &dyn LocalityResolver,
    bundle: &SourceBundle,
) -> ReconReport {
    Reconciler::new(config, resolver).run(bundle)
}
