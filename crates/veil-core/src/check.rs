use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One diagnostic or repair step. `details` is free-form and serialized flat
/// next to `name` and `ok`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub ok: bool,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl CheckResult {
    pub fn new(name: impl Into<String>, ok: bool) -> Self {
        Self {
            name: name.into(),
            ok,
            details: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

/// `[OK] name` / `[WARN] name` followed by indented `key: value` lines.
pub fn format_check(check: &CheckResult) -> String {
    let status = if check.ok { "OK" } else { "WARN" };
    let mut lines = vec![format!("[{status}] {}", check.name)];
    for (key, value) in &check.details {
        let rendered = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        lines.push(format!("    {key}: {rendered}"));
    }
    lines.join("\n")
}
