//! Redaction of secrets in text that ends up in logs or error messages.
//!
//! Response bodies from the model APIs and the ingestion endpoint are echoed
//! into warnings and errors; they sometimes carry keys back to the caller.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

const MAX_BODY_CHARS: usize = 1_024;
const REDACTED: &str = "[REDACTED]";

static BEARER_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bBearer\s+[A-Za-z0-9._\-+/=]{8,}").expect("bearer regex"));

static KEY_VALUE_SECRET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\b(api[_-]?key|access[_-]?token|token|secret|password|authorization|x-api-key)\b\s*[:=]\s*["']?[^"',\s}]+"#,
    )
    .expect("key=value regex")
});

/// Redact secrets and truncate a response body for logging.
///
/// JSON bodies are redacted field by field and re-serialized compactly;
/// anything else is scanned for inline `Bearer` tokens and `key=value` pairs.
pub fn sanitize_body(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "<empty response body>".to_string();
    }

    let redacted = match serde_json::from_str::<Value>(trimmed) {
        Ok(json) => redact(json).to_string(),
        Err(_) => redact_inline(trimmed),
    };
    truncate(redacted)
}

/// Show only the last four characters of a key.
pub fn mask_key(key: &str) -> String {
    let count = key.chars().count();
    if count <= 8 {
        return "****".to_string();
    }
    let tail: String = key.chars().skip(count - 4).collect();
    format!("****{}", tail)
}

fn redact(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, val)| {
                    let val = if is_secret_field(&key) {
                        Value::from(REDACTED)
                    } else {
                        redact(val)
                    };
                    (key, val)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(redact).collect()),
        Value::String(s) => Value::String(redact_inline(&s)),
        other => other,
    }
}

/// Exact names, or `*_token`, `*_secret`, `*_password`, `*api_key` suffixes.
/// Counters such as `input_tokens` or `max_tokens` are left alone.
fn is_secret_field(name: &str) -> bool {
    const SECRET_FIELDS: [&str; 7] = [
        "token",
        "secret",
        "password",
        "authorization",
        "cookie",
        "set_cookie",
        "apikey",
    ];
    const SECRET_SUFFIXES: [&str; 5] = ["_token", "_secret", "_password", "api_key", "private_key"];

    let name = name.to_ascii_lowercase().replace(['-', ' '], "_");
    SECRET_FIELDS.contains(&name.as_str())
        || SECRET_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

fn redact_inline(text: &str) -> String {
    let text = BEARER_TOKEN_RE.replace_all(text, "Bearer [REDACTED]");
    KEY_VALUE_SECRET_RE
        .replace_all(&text, "$1=[REDACTED]")
        .into_owned()
}

fn truncate(text: String) -> String {
    match text.char_indices().nth(MAX_BODY_CHARS) {
        Some((cut, _)) => {
            let dropped = text[cut..].chars().count();
            format!("{}... [truncated {} chars]", &text[..cut], dropped)
        }
        None => text,
    }
}
