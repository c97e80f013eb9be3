use serde::{Deserialize, Serialize};

use crate::model::Action;

/// The fixed canonical schema every source key is mapped onto.
///
/// Serialized by display name ("Legal Name", "Postal Code", ...), which is
/// also the spelling used in alias config files and in the JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalField {
    #[serde(rename = "Legal Name")]
    LegalName,
    #[serde(rename = "Entity Name")]
    EntityName,
    #[serde(rename = "Business Name")]
    BusinessName,
    #[serde(rename = "Trading Name")]
    TradingName,
    #[serde(rename = "Company Name")]
    CompanyName,
    #[serde(rename = "Name")]
    Name,
    #[serde(rename = "ABN")]
    Abn,
    #[serde(rename = "ACN")]
    Acn,
    #[serde(rename = "State")]
    State,
    #[serde(rename = "Postal Code")]
    PostalCode,
    #[serde(rename = "Locality")]
    Locality,
    #[serde(rename = "Suburb")]
    Suburb,
    #[serde(rename = "Active Status")]
    ActiveStatus,
    #[serde(rename = "ABR Entity Type")]
    AbrEntityType,
    #[serde(rename = "ABR Last Updated Date")]
    AbrLastUpdatedDate,
    #[serde(rename = "GST Effective Date")]
    GstEffectiveDate,
    #[serde(rename = "ABR Last Confirmed Date")]
    AbrLastConfirmedDate,
}

const CORRECTABLE: &[Action] = &[Action::Add, Action::Delete, Action::Edit];
const DELETE_ONLY: &[Action] = &[Action::Delete];

impl CanonicalField {
    pub const ALL: [CanonicalField; 17] = [
        Self::LegalName,
        Self::EntityName,
        Self::BusinessName,
        Self::TradingName,
        Self::CompanyName,
        Self::Name,
        Self::Abn,
        Self::Acn,
        Self::State,
        Self::PostalCode,
        Self::Locality,
        Self::Suburb,
        Self::ActiveStatus,
        Self::AbrEntityType,
        Self::AbrLastUpdatedDate,
        Self::GstEffectiveDate,
        Self::AbrLastConfirmedDate,
    ];

    /// Fields that identify the entity, in presentation order.
    pub const IDENTITY: [CanonicalField; 3] =
        [Self::LegalName, Self::EntityName, Self::BusinessName];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LegalName => "Legal Name",
            Self::EntityName => "Entity Name",
            Self::BusinessName => "Business Name",
            Self::TradingName => "Trading Name",
            Self::CompanyName => "Company Name",
            Self::Name => "Name",
            Self::Abn => "ABN",
            Self::Acn => "ACN",
            Self::State => "State",
            Self::PostalCode => "Postal Code",
            Self::Locality => "Locality",
            Self::Suburb => "Suburb",
            Self::ActiveStatus => "Active Status",
            Self::AbrEntityType => "ABR Entity Type",
            Self::AbrLastUpdatedDate => "ABR Last Updated Date",
            Self::GstEffectiveDate => "GST Effective Date",
            Self::AbrLastConfirmedDate => "ABR Last Confirmed Date",
        }
    }

    /// Corrective operations a reviewer may apply to this field's values.
    ///
    /// Only geographic fields can be edited in place; anything else is
    /// resolved by deleting the wrong observation.
    pub fn actions(&self) -> &'static [Action] {
        match self {
            Self::State | Self::PostalCode => CORRECTABLE,
            _ => DELETE_ONLY,
        }
    }

    pub fn is_identity(&self) -> bool {
        Self::IDENTITY.contains(self)
    }

    /// True when the display name contains "Name".
    pub fn is_name_like(&self) -> bool {
        self.as_str().contains("Name")
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
