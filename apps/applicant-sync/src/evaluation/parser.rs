//! Parser for the four-label evaluation response.
//!
//! ```text
//! Summary: <text>
//! Score: <integer>
//! Issues: <text>
//! Follow-Ups:
//! - <question>
//! ```
//! Labels are matched case-insensitively, in any order, in one pass. Blank lines
//! are ignored. A follow-up block ends at the first line without a bullet, and
//! that line is then read as a label line of its own. Only the first
//! `MAX_FOLLOWUPS` questions are kept; the rest of the block is still consumed.

/// Structured view of one evaluation response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmEvaluation {
    pub summary: String,
    /// Digits of the score line; 0 when there are none.
    pub score: i64,
    pub issues: String,
    pub followups: Vec<String>,
}

const BULLETS: &[char] = &['-', '•'];

const MAX_FOLLOWUPS: usize = 3;

/// Parses `text`, returning `None` when not a single label was recognized.
pub fn parse_llm_output(text: &str) -> Option<LlmEvaluation> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut evaluation = LlmEvaluation::default();
    let mut recognized = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let lower = line.to_lowercase();

        if lower.starts_with("summary:") {
            evaluation.summary = after_colon(line);
            recognized = true;
        } else if lower.starts_with("score:") {
            evaluation.score = parse_score(&after_colon(line));
            recognized = true;
        } else if lower.starts_with("issues:") {
            evaluation.issues = after_colon(line);
            recognized = true;
        } else if lower.starts_with("follow-ups") || lower.starts_with("follow ups") {
            recognized = true;
            i += 1;
            while let Some(item) = lines.get(i).and_then(|l| l.strip_prefix(BULLETS)) {
                let item = item.trim();
                if !item.is_empty() && evaluation.followups.len() < MAX_FOLLOWUPS {
                    evaluation.followups.push(item.to_string());
                }
                i += 1;
            }
            continue;
        }
        i += 1;
    }

    recognized.then_some(evaluation)
}

fn after_colon(line: &str) -> String {
    line.split_once(':')
        .map(|(_, rest)| rest.trim().to_string())
        .unwrap_or_default()
}

fn parse_score(raw: &str) -> i64 {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}
