use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wire label of the enterprise size selector, the one non-numeric input.
pub const SIZE_FIELD_LABEL: &str = "Small/Medium/Large";

pub const FIELD_COUNT: usize = 11;

/// Numeric metrics plus the size selector.
pub const FORM_INPUT_COUNT: usize = FIELD_COUNT + 1;

/// Stable identifiers of the numeric business metrics. Variant order matches
/// [`FIELDS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKey {
    Location,
    OwnerMotivation,
    OperationalProcess,
    DigitalTechnology,
    GrowthEfficiency,
    Certification,
    FinancialAssistance,
    AdministrativeHurdles,
    LocalHiring,
    SkillGap,
    EnterpriseAge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NumericKind {
    Float,
    Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDefinition {
    pub key: FieldKey,
    /// Exact business label; also the JSON key expected by the prediction service.
    pub label: &'static str,
    pub display_label: &'static str,
    pub help: &'static str,
    pub kind: NumericKind,
    pub required: bool,
}

pub static FIELDS: [FieldDefinition; FIELD_COUNT] = [
    FieldDefinition {
        key: FieldKey::Location,
        label: "Location",
        display_label: "Location Code",
        help: "Geographic location identifier",
        kind: NumericKind::Float,
        required: true,
    },
    FieldDefinition {
        key: FieldKey::OwnerMotivation,
        label: "About Enterprises, Owners Motivation",
        display_label: "Owner Motivation Level",
        help: "Owner motivation score (1-5)",
        kind: NumericKind::Integer,
        required: true,
    },
    FieldDefinition {
        key: FieldKey::OperationalProcess,
        label: "Enabler 2:Operational Process , Legacy & new machine to balance",
        display_label: "Operational Process Enabler",
        help: "Operational process maturity (1-5)",
        kind: NumericKind::Integer,
        required: true,
    },
    FieldDefinition {
        key: FieldKey::DigitalTechnology,
        label: "Enabler 1: Effortable Digital technologies",
        display_label: "Digital Technology Affordability",
        help: "Access to affordable digital tech (1-5)",
        kind: NumericKind::Integer,
        required: true,
    },
    FieldDefinition {
        key: FieldKey::GrowthEfficiency,
        label: "Outcome : Growth and Effeciency",
        display_label: "Growth & Efficiency Score",
        help: "Current growth and efficiency metric",
        kind: NumericKind::Float,
        required: true,
    },
    FieldDefinition {
        key: FieldKey::Certification,
        label: "Enabler 2 :Certification &Standarization",
        display_label: "Certification & Standardization",
        help: "Level of certifications (1-5)",
        kind: NumericKind::Integer,
        required: true,
    },
    FieldDefinition {
        key: FieldKey::FinancialAssistance,
        label: "Challanges3: Financial assistant & Incentive ,transparency in institutional support ,",
        display_label: "Financial Assistance Challenges",
        help: "Financial support challenges (1-5)",
        kind: NumericKind::Integer,
        required: true,
    },
    FieldDefinition {
        key: FieldKey::AdministrativeHurdles,
        label: "Enabler 3: Administrative and Regulatory Hurdles & Eco system Integration challenges",
        display_label: "Administrative Hurdles",
        help: "Regulatory challenges (1-5)",
        kind: NumericKind::Integer,
        required: true,
    },
    FieldDefinition {
        key: FieldKey::LocalHiring,
        label: "Enabler 4: Engaging local hire",
        display_label: "Local Hiring Engagement",
        help: "Local workforce engagement (1-5)",
        kind: NumericKind::Integer,
        required: true,
    },
    FieldDefinition {
        key: FieldKey::SkillGap,
        label: "Challenges 2: Skill Gap ,Retaining resources and workforce Management",
        display_label: "Skill Gap & Workforce Challenges",
        help: "Workforce management challenges (1-5)",
        kind: NumericKind::Integer,
        required: true,
    },
    FieldDefinition {
        key: FieldKey::EnterpriseAge,
        label: "Enterprise_Age",
        display_label: "Enterprise Age (Years)",
        help: "Age of the enterprise in years",
        kind: NumericKind::Integer,
        required: true,
    },
];

impl FieldKey {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::Location => "location",
            FieldKey::OwnerMotivation => "owner_motivation",
            FieldKey::OperationalProcess => "operational_process",
            FieldKey::DigitalTechnology => "digital_technology",
            FieldKey::GrowthEfficiency => "growth_efficiency",
            FieldKey::Certification => "certification",
            FieldKey::FinancialAssistance => "financial_assistance",
            FieldKey::AdministrativeHurdles => "administrative_hurdles",
            FieldKey::LocalHiring => "local_hiring",
            FieldKey::SkillGap => "skill_gap",
            FieldKey::EnterpriseAge => "enterprise_age",
        }
    }

    pub fn definition(self) -> &'static FieldDefinition {
        &FIELDS[self as usize]
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown form field {0:?}")]
pub struct UnknownField(pub String);

impl FromStr for FieldKey {
    type Err = UnknownField;

    /// Accepts the stable key (`owner_motivation`) or the exact business label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        FIELDS
            .iter()
            .find(|def| def.key.as_str() == s || def.label == s)
            .map(|def| def.key)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnterpriseSize {
    Small,
    Medium,
    Large,
}

impl EnterpriseSize {
    pub fn as_str(self) -> &'static str {
        match self {
            EnterpriseSize::Small => "Small",
            EnterpriseSize::Medium => "Medium",
            EnterpriseSize::Large => "Large",
        }
    }
}

impl fmt::Display for EnterpriseSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnterpriseSize {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Small" => Ok(EnterpriseSize::Small),
            "Medium" => Ok(EnterpriseSize::Medium),
            "Large" => Ok(EnterpriseSize::Large),
            _ => Err(()),
        }
    }
}
