use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use crate::error::ReconError;

/// Postcode to locality lookup, consumed by the extractor.
///
/// Implementations must be read-only once constructed; one resolver may be
/// shared by concurrent reconciliation calls.
pub trait LocalityResolver: Send + Sync {
    fn lookup(&self, postal_code: u32) -> Option<String>;
}

/// Resolver with no reference data; every lookup misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocalities;

impl LocalityResolver for NoLocalities {
    fn lookup(&self, _postal_code: u32) -> Option<String> {
        None
    }
}

/// In-memory postcode table, usually loaded from the geocoded postcode CSV.
#[derive(Debug, Clone, Default)]
pub struct PostcodeTable {
    localities: HashMap<u32, String>,
}

impl PostcodeTable {
    pub const POSTCODE_COLUMN: &'static str = "Pcode";
    pub const LOCALITY_COLUMN: &'static str = "Locality";

    /// Load from CSV text with `Pcode` and `Locality` header columns.
    ///
    /// A postcode shared by several localities resolves to the first row.
    pub fn from_csv(csv_data: &str) -> Result<Self, ReconError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(csv_data.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| ReconError::Io(e.to_string()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let idx = |name: &str| -> Result<usize, ReconError> {
            headers.iter().position(|h| h == name).ok_or_else(|| ReconError::Dataset {
                row: 0,
                message: format!("missing column '{name}'"),
            })
        };

        let postcode_idx = idx(Self::POSTCODE_COLUMN)?;
        let locality_idx = idx(Self::LOCALITY_COLUMN)?;

        let mut table = Self::default();
        for (i, record) in reader.records().enumerate() {
            // header is row 1
            let row = i + 2;
            let record = record.map_err(|e| ReconError::Dataset {
                row,
                message: e.to_string(),
            })?;

            let raw = record.get(postcode_idx).unwrap_or("").trim();
            let postal_code: u32 = raw.parse().map_err(|_| ReconError::Dataset {
                row,
                message: format!("cannot parse postcode '{raw}'"),
            })?;

            let locality = record.get(locality_idx).unwrap_or("").trim();
            if locality.is_empty() {
                continue;
            }
            table
                .localities
                .entry(postal_code)
                .or_insert_with(|| locality.to_string());
        }

        log::debug!("loaded {} postcodes", table.len());
        Ok(table)
    }

    pub fn from_path(path: &Path) -> Result<Self, ReconError> {
        let csv_data = std::fs::read_to_string(path)
            .map_err(|e| ReconError::Io(format!("cannot read {}: {e}", path.display())))?;
        Self::from_csv(&csv_data)
    }

    pub fn len(&self) -> usize {
        self.localities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.localities.is_empty()
    }
}

impl FromIterator<(u32, String)> for PostcodeTable {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        let mut table = Self::default();
        for (postal_code, locality) in iter {
            table.localities.entry(postal_code).or_insert(locality);
        }
        table
    }
}

impl LocalityResolver for PostcodeTable {
    fn lookup(&self, postal_code: u32) -> Option<String> {
        self.localities.get(&postal_code).cloned()
    }
}

/// Read a raw postal-code value as an integer.
///
/// Accepts integer JSON numbers, whole floats, and digit strings with
/// surrounding whitespace.
pub fn parse_postal_code(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_u64() {
                return u32::try_from(i).ok();
            }
            let f = n.as_f64()?;
            if f.fract() == 0.0 && f >= 0.0 && f <= f64::from(u32::MAX) {
                Some(f as u32)
            } else {
                None
            }
        }
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
