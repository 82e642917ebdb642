use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::warn;

pub fn extract_label_terms(raw: &str) -> BTreeSet<String> {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    if chars.next().is_none() || chars.next_back().is_none() {
        return BTreeSet::new();
    }
    let body = chars.as_str().trim();
    if body.is_empty() {
        return BTreeSet::new();
    }

    let object = match serde_json::from_str::<Map<String, Value>>(body) {
        Ok(object) => object,
        Err(error) => {
            warn!("selector expression {trimmed:?} is not a JSON object: {error}");
            return BTreeSet::new();
        }
    };

    object
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(text) => format!("{key}={text}"),
            other => format!("{key}={other}"),
        })
        .collect()
}

pub fn selector_query(terms: &BTreeSet<String>) -> String {
    terms.iter().cloned().collect::<Vec<_>>().join(",")
}
