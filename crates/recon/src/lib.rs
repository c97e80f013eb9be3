//! `registrum-recon`: multi-source business-entity reconciliation engine.
//!
//! Pure engine crate: receives records already collected from registries and
//! scrapers, returns per-field values ranked by cross-source agreement.
//! No CLI, network or persistence dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod extract;
pub mod field;
pub mod locality;
pub mod model;
pub mod normalize;
pub mod score;

pub use config::AliasConfig;
pub use engine::{run, Reconciler};
pub use error::{ExtractError, ReconError, ScoreError};
pub use field::CanonicalField;
pub use locality::{LocalityResolver, NoLocalities, PostcodeTable};
pub use model::{
    Action, Observation, ReconReport, ReconciledRecord, Score, ScoredObservation, SourceBundle,
};
