use async_trait::async_trait;

use super::{LlmError, TextGenerator};

const CANNED_RESPONSE: &str = "Summary: Mock evaluation of the applicant profile; no model was called.\n\
Score: 7\n\
Issues: None\n\
Follow-Ups:\n\
- Can you confirm your weekly availability?\n\
- What is your earliest start date?";

/// Offline generator returning a fixed response in the expected line format.
#[derive(Debug, Default)]
pub struct MockGenerator;

#[async_trait]
impl TextGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        Ok(CANNED_RESPONSE.to_string())
    }
}
