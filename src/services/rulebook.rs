use serde::Serialize;
use sqlx::PgPool;

use super::StoreError;
use crate::database::rows::RulebookRow;
use crate::database::Database;

/// Read-through access to the rulebook. Rule bodies are authored as HTML in
/// the store; the platform serves them as plain text.
pub struct RulebookService {
    pool: PgPool,
}

/// A rulebook entry shaped for the wire, body already HTML-stripped.
#[derive(Debug, Clone, Serialize)]
pub struct RulebookEntry {
    pub rule_id: i32,
    pub rule_version: Option<String>,
    pub rule_status: Option<String>,
    pub rule_description: Option<String>,
    pub rule_subject: Option<String>,
    pub rule: String,
    pub rule_stage: Option<String>,
    pub rule_process_name: Option<String>,
    pub rule_process_owner: Option<String>,
}

impl RulebookService {
    pub fn new() -> Result<Self, StoreError> {
        Ok(Self {
            pool: Database::pool()?,
        })
    }

    pub async fn list(&self) -> Result<Vec<RulebookEntry>, StoreError> {
        let rows = sqlx::query("SELECT * FROM orbis.get_rulebook()")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                let row = RulebookRow::from_row(row)?;
                Ok(RulebookEntry {
                    rule_id: row.rule_id,
                    rule_version: row.rule_version,
                    rule_status: row.rule_status,
                    rule_description: row.rule_description,
                    rule_subject: row.rule_subject,
                    rule: strip_html(row.rule.as_deref().unwrap_or_default()),
                    rule_stage: row.rule_stage,
                    rule_process_name: row.rule_process_name,
                    rule_process_owner: row.rule_process_owner,
                })
            })
            .collect()
    }
}

/// Flatten an HTML fragment to plain text: tags become line boundaries,
/// common entities are decoded, and blank lines are dropped.
pub fn strip_html(input: &str) -> String {
    let mut text = String::with_capacity(input.len());
    let mut in_tag = false;

    for c in input.chars() {
        match c {
            '<' => {
                in_tag = true;
                text.push('\n');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    decode_entities(&text)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(text: &str) -> String {
    // `&amp;` last, so `&amp;lt;` decodes to the literal `&lt;`
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_nested_tags_to_lines() {
        assert_eq!(strip_html("<p>Hello <b>world</b></p>"), "Hello\nworld");
    }

    #[test]
    fn list_items_become_separate_lines() {
        assert_eq!(
            strip_html("<ul><li>One</li><li>Two</li></ul>"),
            "One\nTwo"
        );
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(strip_html("Fish &amp; Chips &gt; Salad"), "Fish & Chips > Salad");
        assert_eq!(strip_html("a&nbsp;b"), "a b");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(strip_html("no markup here"), "no markup here");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(strip_html(""), "");
        assert_eq!(strip_html("<br/><p></p>"), "");
    }
}
