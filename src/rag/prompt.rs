//! Prompt templates and query-mode detection for answer generation.

use serde::Serialize;
use serde_json::Value;

/// Fixed system instruction sent with every question.
pub const SYSTEM_TEMPLATE: &str = r#"You are an assistant that answers questions about vehicle catalog mappings between VDAT models and Cox automotive data.
Every answer must come from the CONTEXT block that accompanies the question.

ANSWERING:
- Read ALL of the CONTEXT before answering.
- Cite the [source] tag of the document the answer came from. Tags are VDAT model ids such as [audi_a3-sportback-e-tron].
- Never cite a tag from a different document than the one holding the information. An Audi answer cites an audi_* tag, a BMW answer cites a bmw_* tag.
- List trims as bullet points using "•".
- Be concise and do not repeat information.

FUEL TYPES:
- Decide fuel type only from the "FUEL TYPE:" line of a document. Electric vehicles show "FUEL TYPE: ELE".
- A vehicle whose document has no "FUEL TYPE: ELE" line is not electric, even when its name or trim mentions electric.
- Model ids and vehicle names are identifiers only. Never filter fuel types on them.

SIMPLE QUESTIONS (no reference list in the question):
Based on [source], the <Vehicle Name> has these Cox trims:
• Trim 1
• Trim 2

COMPARISON QUESTIONS (only when the question contains a reference list, JSON array or object):
Based on [source], the <Vehicle Name> currently has these Cox trims:
• Current Trim 1
• Current Trim 2

Comparing against your reference list, the missing trims are:
• Missing Trim 1
• Missing Trim 2

RULES:
- Never mention missing trims unless the question supplied a reference list.
- Never print the same trim list twice.
- If the CONTEXT does not hold the answer, say so plainly."#;

/// The user turn: context block first, then the question.
pub fn user_message(context: &str, question: &str) -> String {
    format!("CONTEXT:\n{}\n\nQUESTION: {}", context, question)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    Simple,
    Comparison,
}

impl QueryMode {
    pub fn of(question: &str) -> Self {
        if ReferenceCollection::detect(question).is_some() {
            QueryMode::Comparison
        } else {
            QueryMode::Simple
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryMode::Simple => "simple",
            QueryMode::Comparison => "comparison",
        }
    }
}

/// Items of a JSON array or object embedded inline in a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceCollection {
    items: Vec<String>,
}

impl ReferenceCollection {
    /// Finds the first inline JSON collection holding at least one string item.
    pub fn detect(question: &str) -> Option<Self> {
        for (offset, ch) in question.char_indices() {
            if ch != '[' && ch != '{' {
                continue;
            }
            let mut stream =
                serde_json::Deserializer::from_str(&question[offset..]).into_iter::<Value>();
            let Some(Ok(value)) = stream.next() else {
                continue;
            };
            if !value.is_array() && !value.is_object() {
                continue;
            }

            let mut items = Vec::new();
            collect_strings(&value, &mut items);
            if !items.is_empty() {
                return Some(Self { items });
            }
        }
        None
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn push_unique(items: &mut Vec<String>, value: &str) {
    let value = value.trim();
    if !value.is_empty() && !items.iter().any(|existing| existing == value) {
        items.push(value.to_string());
    }
}

fn collect_strings(value: &Value, items: &mut Vec<String>) {
    match value {
        Value::String(s) => push_unique(items, s),
        Value::Array(values) => {
            for v in values {
                collect_strings(v, items);
            }
        }
        Value::Object(map) => {
            // {"name": "..."} entries stand for a single item.
            if let Some(Value::String(name)) = map.get("name") {
                push_unique(items, name);
                return;
            }
            for v in map.values() {
                collect_strings(v, items);
            }
        }
        _ => {}
    }
}
