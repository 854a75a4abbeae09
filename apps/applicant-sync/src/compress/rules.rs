//! Deterministic shortlist rules.
//!
//! All four clauses must hold: experience, rate, availability, location. The
//! rationale string is stored on the Shortlisted Lead, so its layout is fixed:
//!
//! `Experience: OK (7.0 yrs; tier1=no); Comp: OK (rate=80.0/hr; avail=30.0 hrs/wk); Location: OK (Remote, USA)`

use chrono::NaiveDateTime;

use super::analytics::{total_years_experience, worked_at_tier1};
use crate::models::applicant::{ExperienceFields, PersonalFields, Scalar, SalaryFields};
use crate::models::record::Row;

/// Lowercased substrings accepted as a target location. Loose on purpose:
/// short codes such as "in" or "ca" match inside longer words.
pub const ALLOWED_LOCATIONS: &[&str] = &[
    "us",
    "usa",
    "united states",
    "canada",
    "ca",
    "uk",
    "united kingdom",
    "great britain",
    "gb",
    "germany",
    "de",
    "india",
    "in",
];

/// Thresholds for the shortlist clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortlistPolicy {
    pub min_years: f64,
    pub max_rate: f64,
    pub min_availability: f64,
    /// Sentinel used when the rate is missing; above `max_rate` so the clause fails.
    pub missing_rate: f64,
    pub missing_availability: f64,
}

impl Default for ShortlistPolicy {
    fn default() -> Self {
        Self {
            min_years: 4.0,
            max_rate: 100.0,
            min_availability: 20.0,
            missing_rate: 999.0,
            missing_availability: 0.0,
        }
    }
}

/// Measured values behind a decision.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortlistSignals {
    pub years_experience: f64,
    pub tier1: bool,
    pub rate: f64,
    pub availability: f64,
    pub location: String,
    pub experience_ok: bool,
    pub rate_ok: bool,
    pub availability_ok: bool,
    pub location_ok: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShortlistDecision {
    pub passed: bool,
    pub reason: String,
    pub signals: ShortlistSignals,
}

/// Stateless evaluator applying a `ShortlistPolicy`.
pub struct RuleEngine {
    policy: ShortlistPolicy,
}

impl RuleEngine {
    pub fn new(policy: ShortlistPolicy) -> Self {
        Self { policy }
    }

    pub fn evaluate(
        &self,
        personal: Option<&Row<PersonalFields>>,
        experience: &[Row<ExperienceFields>],
        salary: Option<&Row<SalaryFields>>,
        now: NaiveDateTime,
    ) -> ShortlistDecision {
        let policy = &self.policy;

        let years_experience = total_years_experience(experience, now);
        let tier1 = worked_at_tier1(experience);

        let salary = salary.map(|row| &row.fields);
        let rate = coerce_number(salary.and_then(SalaryFields::rate), policy.missing_rate);
        let availability = coerce_number(
            salary.and_then(|s| s.availability.as_ref()),
            policy.missing_availability,
        );

        let location = personal
            .and_then(|row| row.fields.location.clone())
            .unwrap_or_default();
        let location_lower = location.to_lowercase();
        let location_ok = ALLOWED_LOCATIONS
            .iter()
            .any(|token| location_lower.contains(token));

        let experience_ok = years_experience >= policy.min_years || tier1;
        let rate_ok = rate <= policy.max_rate;
        let availability_ok = availability >= policy.min_availability;

        let signals = ShortlistSignals {
            years_experience,
            tier1,
            rate,
            availability,
            location,
            experience_ok,
            rate_ok,
            availability_ok,
            location_ok,
        };

        ShortlistDecision {
            passed: experience_ok && rate_ok && availability_ok && location_ok,
            reason: build_reason(&signals),
            signals,
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(ShortlistPolicy::default())
    }
}

/// Numeric coercion for loosely typed cells.
///
/// Numbers pass through. Text keeps only ASCII digits and `.` and is parsed as
/// a float; an empty remainder or a parse failure yields `default`, as does any
/// other value shape.
pub fn coerce_number(value: Option<&Scalar>, default: f64) -> f64 {
    match value {
        Some(Scalar::Number(n)) => n.as_f64().unwrap_or(default),
        Some(Scalar::Text(text)) => {
            let digits: String = text
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            if digits.is_empty() {
                default
            } else {
                digits.parse().unwrap_or(default)
            }
        }
        _ => default,
    }
}

fn build_reason(s: &ShortlistSignals) -> String {
    format!(
        "Experience: {} ({} yrs; tier1={}); Comp: {} (rate={}/hr; avail={} hrs/wk); Location: {} ({})",
        if s.experience_ok { "OK" } else { "Insufficient" },
        format_float(s.years_experience),
        if s.tier1 { "yes" } else { "no" },
        if s.rate_ok { "OK" } else { "Too high" },
        format_float(s.rate),
        format_float(s.availability),
        if s.location_ok { "OK" } else { "Not target" },
        s.location,
    )
}

/// Float rendering with at least one fractional digit: `7.0`, `4.76`, `999.0`.
fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
