// Prompt text for the applicant evaluation call.

/// Instructions plus the exact response format. The compact document JSON is
/// appended after `JSON:`.
pub const EVALUATION_PROMPT_TEMPLATE: &str = "You are a recruiting analyst. Given this applicant profile JSON, do four things:\n\
1) 75-word summary.\n\
2) Score 1-10.\n\
3) Issues/gaps.\n\
4) Up to three follow-ups.\n\
Return exactly:\n\
Summary: <text>\n\
Score: <integer>\n\
Issues: <text or 'None'>\n\
Follow-Ups:\n\
- <q1>\n\
- <q2>\n\
- <q3>\n\
\n\
JSON:\n\
{document_json}";

pub fn evaluation_prompt(document_json: &str) -> String {
    EVALUATION_PROMPT_TEMPLATE.replace("{document_json}", document_json)
}
