use std::fmt;

/// Errors from loading configuration, input bundles and reference data.
///
/// The reconciliation entry points never return these; they only surface
/// from the constructors that build the engine's inputs.
#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (duplicate field rule, empty alias, etc.).
    ConfigValidation(String),
    /// Source bundle is not valid JSON or has the wrong top-level shape.
    InputParse(String),
    /// Postcode reference dataset row could not be read.
    Dataset { row: usize, message: String },
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::InputParse(msg) => write!(f, "input parse error: {msg}"),
            Self::Dataset { row, message } => {
                write!(f, "postcode dataset row {row}: {message}")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

/// Why a single observation (or a whole record) was dropped during extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractError {
    /// A bundle entry that should be a record is some other JSON type.
    MalformedRecord { found: &'static str },
    /// A field's value is an object or array.
    NonScalarValue { key: String },
    /// Postal code present but not an integer.
    PostalCode { key: String, value: String },
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedRecord { found } => {
                write!(f, "expected a record object, found {found}")
            }
            Self::NonScalarValue { key } => {
                write!(f, "key '{key}': nested value cannot be normalized")
            }
            Self::PostalCode { key, value } => {
                write!(f, "key '{key}': cannot parse postal code '{value}'")
            }
        }
    }
}

impl std::error::Error for ExtractError {}

/// Why a field was left out of the reconciled record.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreError {
    /// The field has no observations to score.
    NoObservations,
    /// An observation filed under this field belongs to another field.
    FieldMismatch { found: String },
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoObservations => write!(f, "no observations to score"),
            Self::FieldMismatch { found } => {
                write!(f, "observation belongs to field '{found}'")
            }
        }
    }
}

impl std::error::Error for ScoreError {}

/// Serialize any error through its `Display` form.
pub(crate) fn serialize_display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: fmt::Display,
    S: serde::Serializer,
{
    serializer.collect_str(value)
}
