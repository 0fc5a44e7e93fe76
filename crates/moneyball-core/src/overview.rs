// Pre-computed page data: query_results.json and saved_figs.json.
//
// Both files are regenerated offline, so they are read on every request
// rather than cached at startup.

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use std::path::Path;

/// A JSON object of named page values, in file order.
pub type PageData = Map<String, Value>;

/// Read a JSON file whose top level must be an object.
pub fn load_page_data(path: &Path) -> Result<PageData> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_page_data(&text).with_context(|| format!("invalid page data in {}", path.display()))
}

fn parse_page_data(text: &str) -> Result<PageData> {
    match serde_json::from_str::<Value>(text).context("failed to parse JSON")? {
        Value::Object(map) => Ok(map),
        other => bail!("expected a JSON object at top level, got {}", type_name(&other)),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
