//! The canonical document: one applicant flattened into a single JSON value.
//!
//! Shape:
//! ```json
//! { "personal":   { "name": .., "location": .. },
//!   "experience": [ { "company": .., "title": .. } ],
//!   "salary":     { "rate": .., "currency": .., "availability": .. } }
//! ```
//! A section without a source row serializes as `{}` and an empty object reads
//! back as an absent section. Dates are deliberately not part of the document.
//!
//! Section fields are `Option<Option<_>>`: the outer layer records whether the
//! key was present at all, the inner one whether it held a value. An explicit
//! `null` clears the stored cell on decompress; a missing key leaves it alone.

use serde::{Deserialize, Serialize};

use super::applicant::Scalar;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalDocument {
    #[serde(default, with = "section")]
    pub personal: Option<PersonalSection>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub experience: Vec<ExperienceItem>,
    #[serde(default, with = "section")]
    pub salary: Option<SalarySection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalSection {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub location: Option<Option<String>>,
}

impl PersonalSection {
    pub fn name(&self) -> Option<&str> {
        self.name.as_ref()?.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_ref()?.as_deref()
    }
}

/// One work history entry. Order within the document is significant and
/// duplicates are allowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceItem {
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalarySection {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub rate: Option<Option<Scalar>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub currency: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub availability: Option<Option<Scalar>>,
}

impl CanonicalDocument {
    /// Serialized form stored on the applicant row (two-space indent).
    pub fn to_stored_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_stored_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Present key → `Some(value)`, including `Some(None)` for `null`. Absent keys
/// never reach this function and take the field default, `None`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

mod section {
    use serde::de::{DeserializeOwned, Error as _};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::{Map, Value};

    pub fn serialize<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(section) => section.serialize(serializer),
            None => serializer.serialize_map(Some(0))?.end(),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        match Option::<Map<String, Value>>::deserialize(deserializer)? {
            Some(map) if !map.is_empty() => serde_json::from_value(Value::Object(map))
                .map(Some)
                .map_err(D::Error::custom),
            _ => Ok(None),
        }
    }
}
