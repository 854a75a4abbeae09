//! Typed views over the normalized applicant tables.
//!
//! Every column is optional: the record store omits empty cells, so a missing
//! column decodes to `None` and each consumer applies its own documented default.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Column names shared by decoding and by reconciliation patches.
pub mod columns {
    pub const FULL_NAME: &str = "Full Name";
    pub const LOCATION: &str = "Location";
    pub const COMPANY: &str = "Company";
    pub const TITLE: &str = "Title";
    pub const PREFERRED_RATE: &str = "Preferred Rate";
    pub const CURRENCY: &str = "Currency";
    pub const AVAILABILITY: &str = "Availability (hrs/wk)";
}

/// A cell that may hold a number or free text, e.g. `80` or `"$80/hr"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(serde_json::Number),
    Text(String),
    Other(serde_json::Value),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Text(s) => f.write_str(s),
            Scalar::Other(v) => write!(f, "{v}"),
        }
    }
}

impl From<Scalar> for serde_json::Value {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Number(n) => serde_json::Value::Number(n),
            Scalar::Text(s) => serde_json::Value::String(s),
            Scalar::Other(v) => v,
        }
    }
}

/// Personal Details row.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PersonalFields {
    #[serde(rename = "Full Name", default)]
    pub full_name: Option<String>,
    /// Default for rule evaluation: empty string.
    #[serde(rename = "Location", default)]
    pub location: Option<String>,
}

/// Work Experience row. `start`/`end` are never part of the canonical document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExperienceFields {
    #[serde(rename = "Company", default)]
    pub company: Option<String>,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    /// Required for the entry to count towards years of experience.
    #[serde(rename = "Start", default)]
    pub start: Option<Scalar>,
    /// Defaults to "now" when absent or unparseable.
    #[serde(rename = "End", default)]
    pub end: Option<Scalar>,
}

/// Salary Preferences row.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SalaryFields {
    #[serde(rename = "Preferred Rate", default)]
    pub preferred_rate: Option<Scalar>,
    #[serde(rename = "Minimum Rate", default)]
    pub minimum_rate: Option<Scalar>,
    #[serde(rename = "Currency", default)]
    pub currency: Option<String>,
    /// Hours per week. Default for rule evaluation: 0.
    #[serde(rename = "Availability (hrs/wk)", default)]
    pub availability: Option<Scalar>,
}

impl SalaryFields {
    /// Preferred rate, falling back to the minimum rate. First non-null wins.
    pub fn rate(&self) -> Option<&Scalar> {
        self.preferred_rate.as_ref().or(self.minimum_rate.as_ref())
    }
}

/// Shortlist Status column values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortlistStatus {
    Shortlisted,
    Rejected,
}

impl ShortlistStatus {
    pub fn from_passed(passed: bool) -> Self {
        if passed {
            Self::Shortlisted
        } else {
            Self::Rejected
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shortlisted => "Shortlisted",
            Self::Rejected => "Rejected",
        }
    }
}
