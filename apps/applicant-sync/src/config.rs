use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Built once in `main` and shared read-only through `AppState`.
#[derive(Debug, Clone)]
pub struct Config {
    pub airtable_api_url: String,
    pub airtable_base_id: String,
    pub airtable_token: String,
    pub tables: TableNames,
    pub fields: FieldNames,
    pub llm: LlmConfig,
    pub store_timeout_secs: u64,
    pub rust_log: String,
}

/// Record store table names.
#[derive(Debug, Clone)]
pub struct TableNames {
    pub applicants: String,
    pub personal: String,
    pub experience: String,
    pub salary: String,
    pub shortlist: String,
}

/// Column names the pipelines read and write outside the typed row structs.
#[derive(Debug, Clone)]
pub struct FieldNames {
    /// Link column on child tables pointing back at the applicant row.
    pub applicant_link: String,
    /// External-facing applicant key on the applicants table.
    pub applicant_id: String,
    pub compressed_json: String,
    pub shortlist_status: String,
    pub score_reason: String,
    /// LLM projection targets. An empty name disables that field.
    pub llm_summary: String,
    pub llm_score: String,
    pub llm_issues: String,
    pub llm_followups: String,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub mock: bool,
    pub run_always: bool,
    pub backoff_base_ms: u64,
    pub max_attempts: u32,
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// True when at least one generator can be built.
    pub fn enabled(&self) -> bool {
        self.mock || self.api_key.is_some()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_source<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let flag = |key: &str| lookup(key).map(|v| v.trim() == "1").unwrap_or(false);

        Ok(Config {
            airtable_api_url: var("AIRTABLE_API_URL", "https://api.airtable.com/v0"),
            airtable_base_id: require(&lookup, "AIRTABLE_BASE_ID")?,
            airtable_token: require(&lookup, "AIRTABLE_TOKEN")?,
            tables: TableNames {
                applicants: var("TBL_APPLICANTS", "Applicants"),
                personal: var("TBL_PERSONAL_DETAILS", "Personal Details"),
                experience: var("TBL_WORK_EXPERIENCE", "Work Experience"),
                salary: var("TBL_SALARY_PREFERENCES", "Salary Preferences"),
                shortlist: var("TBL_SHORTLISTED_LEADS", "Shortlisted Leads"),
            },
            fields: FieldNames {
                applicant_link: var("APPLICANT_LINK_FIELD", "Applicant"),
                applicant_id: var("APPLICANT_ID_FIELD", "Applicant ID"),
                compressed_json: var("COMPRESSED_JSON_FIELD", "Compressed JSON"),
                shortlist_status: var("SHORTLIST_STATUS_FIELD", "Shortlist Status"),
                score_reason: var("SCORE_REASON_FIELD", "Score Reason"),
                llm_summary: var("LLM_SUMMARY_FIELD", "LLM Summary"),
                llm_score: var("LLM_SCORE_FIELD", "LLM Score"),
                llm_issues: var("LLM_ISSUES_FIELD", "LLM Issues"),
                llm_followups: var("LLM_FOLLOWUPS_FIELD", "LLM Follow-Ups"),
            },
            llm: LlmConfig {
                api_url: var(
                    "GEMINI_API_URL",
                    "https://generativelanguage.googleapis.com/v1beta",
                ),
                api_key: lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()),
                model: var("GEMINI_MODEL", "gemini-2.5-flash"),
                mock: flag("MOCK_LLM"),
                run_always: flag("RUN_LLM_ALWAYS"),
                backoff_base_ms: parse_number(&lookup, "LLM_BACKOFF_MS", 1000)?,
                max_attempts: parse_number(&lookup, "LLM_MAX_ATTEMPTS", 3)?,
                timeout_secs: parse_number(&lookup, "LLM_TIMEOUT_SECS", 120)?,
            },
            store_timeout_secs: parse_number(&lookup, "STORE_TIMEOUT_SECS", 30)?,
            rust_log: var("RUST_LOG", "info"),
        })
    }
}

fn require<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_number<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number")),
        None => Ok(default),
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config::from_source(|key| match key {
        "AIRTABLE_BASE_ID" => Some("appTest".to_string()),
        "AIRTABLE_TOKEN" => Some("token".to_string()),
        "LLM_BACKOFF_MS" => Some("0".to_string()),
        _ => None,
    })
    .expect("test config builds")
}
