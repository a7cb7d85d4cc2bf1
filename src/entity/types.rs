//! Entity and modifier records.
//!
//! | Field        | Purpose                                           |
//! |--------------|---------------------------------------------------|
//! | label        | Unique key assigned by the classifier (PERSON_1)  |
//! | entity_type  | Classification (PERSON, EMAIL, ...)               |
//! | text         | Surface form as it appears in the document        |
//! | occurrences  | Plain-text `[start, end)` char ranges             |
//! | should_mask  | The user's mask/unmask choice                     |

use serde::{Deserialize, Serialize};

// =============================================================================
// EntityType
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityType {
    Person,
    Address,
    Date,
    Email,
    PhoneNumber,
    Organization,
    Location,
    BankAccountNumber,
    IdNumber,
    HealthData,
    HealthId,
    Number,
    TaxNumber,
    CreditCard,
    Signature,
    Iban,
    IpAddress,
    LicensePlate,
    Currency,
    Passport,
    Ssn,
    Other(String),
}

impl EntityType {
    pub fn as_str(&self) -> &str {
        match self {
            EntityType::Person => "PERSON",
            EntityType::Address => "ADDRESS",
            EntityType::Date => "DATE",
            EntityType::Email => "EMAIL",
            EntityType::PhoneNumber => "PHONE_NUMBER",
            EntityType::Organization => "ORGANIZATION",
            EntityType::Location => "LOCATION",
            EntityType::BankAccountNumber => "BANK_ACCOUNT_NUMBER",
            EntityType::IdNumber => "ID_NUMBER",
            EntityType::HealthData => "HEALTH_DATA",
            EntityType::HealthId => "HEALTH_ID",
            EntityType::Number => "NUMBER",
            EntityType::TaxNumber => "TAX_NUMBER",
            EntityType::CreditCard => "CREDIT_CARD",
            EntityType::Signature => "SIGNATURE",
            EntityType::Iban => "IBAN",
            EntityType::IpAddress => "IPV4V6",
            EntityType::LicensePlate => "LICENSE_PLATE",
            EntityType::Currency => "CURRENCY",
            EntityType::Passport => "PASSPORT",
            EntityType::Ssn => "SSN",
            EntityType::Other(name) => name,
        }
    }

    /// Overlap priority: higher wins when two entities claim the same text.
    ///
    /// PERSON (3) > ADDRESS/DATE/EMAIL/PHONE (2) > everything else (1) >
    /// ORGANIZATION/LOCATION (0).
    pub fn priority(&self) -> u8 {
        match self {
            EntityType::Person => 3,
            EntityType::Address | EntityType::Date | EntityType::Email | EntityType::PhoneNumber => 2,
            EntityType::Organization | EntityType::Location => 0,
            _ => 1,
        }
    }
}

impl From<&str> for EntityType {
    fn from(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "PERSON" => EntityType::Person,
            "ADDRESS" => EntityType::Address,
            "DATE" => EntityType::Date,
            "EMAIL" => EntityType::Email,
            "PHONE_NUMBER" | "PHONENUMBER" | "PHONE" => EntityType::PhoneNumber,
            "ORGANIZATION" | "ORGANISATION" => EntityType::Organization,
            "LOCATION" => EntityType::Location,
            "BANK_ACCOUNT_NUMBER" => EntityType::BankAccountNumber,
            "ID_NUMBER" => EntityType::IdNumber,
            "HEALTH_DATA" => EntityType::HealthData,
            "HEALTH_ID" => EntityType::HealthId,
            "NUMBER" => EntityType::Number,
            "TAX_NUMBER" => EntityType::TaxNumber,
            "CREDIT_CARD" => EntityType::CreditCard,
            "SIGNATURE" => EntityType::Signature,
            "IBAN" => EntityType::Iban,
            "IPV4V6" | "IP_ADDRESS" => EntityType::IpAddress,
            "LICENSE_PLATE" => EntityType::LicensePlate,
            "CURRENCY" => EntityType::Currency,
            "PASSPORT" => EntityType::Passport,
            "SSN" => EntityType::Ssn,
            other => EntityType::Other(other.to_string()),
        }
    }
}

impl From<String> for EntityType {
    fn from(name: String) -> Self {
        EntityType::from(name.as_str())
    }
}

impl From<EntityType> for String {
    fn from(t: EntityType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Entity
// =============================================================================

/// Plain-text `[start, end)` char range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occurrence {
    pub start: usize,
    pub end: usize,
}

impl Occurrence {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn overlaps(&self, other: &Occurrence) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn shifted(&self, offset: usize) -> Self {
        Self::new(self.start + offset, self.end + offset)
    }
}

fn default_mask() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub label: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub occurrences: Vec<Occurrence>,
    #[serde(default = "default_mask")]
    pub should_mask: bool,
}

impl Entity {
    pub fn new(label: &str, entity_type: EntityType, text: &str) -> Self {
        Self {
            label: label.to_string(),
            entity_type,
            text: text.to_string(),
            occurrences: Vec::new(),
            should_mask: true,
        }
    }

    pub fn with_occurrence(mut self, start: usize, end: usize) -> Self {
        self.occurrences.push(Occurrence::new(start, end));
        self
    }

    pub fn with_mask(mut self, should_mask: bool) -> Self {
        self.should_mask = should_mask;
        self
    }
}

// =============================================================================
// Classifier Output
// =============================================================================

/// One span reported by the classifier, relative to the text it was sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedSpan {
    pub label: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub start: usize,
    pub end: usize,
}

/// Known entity in the shape the classifier accepts as a hint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnownEntity {
    pub label: String,
    pub name: String,
    pub should_mask: bool,
}

// =============================================================================
// Modifier
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierAction {
    Mask,
    Unmask,
    Ignore,
}

impl ModifierAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModifierAction::Mask => "mask",
            ModifierAction::Unmask => "unmask",
            ModifierAction::Ignore => "ignore",
        }
    }
}

/// A user override for one entity or surface string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifier {
    pub id: String,
    /// Entity label or surface text the override targets
    pub entity: String,
    pub action: ModifierAction,
    /// PII type to apply for `mask` overrides on undetected text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Modifier {
    pub fn new(id: &str, entity: &str, action: ModifierAction) -> Self {
        Self {
            id: id.to_string(),
            entity: entity.to_string(),
            action,
            label: None,
        }
    }
}
