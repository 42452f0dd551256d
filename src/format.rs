//! Response-body parsing for the two wire formats the API speaks.
//!
//! The parser is format-symmetric: it cannot tell a success body from an
//! error body, and callers disambiguate with the HTTP status code they
//! obtained separately. Both formats fold into [`serde_json::Value`] so the
//! rest of the crate handles one shape.

use serde_json::{Map, Value};

/// The response encoding requested from the API by appending `.xml` or
/// `.json` to each resource path.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ResponseFormat {
    #[default]
    Xml,
    Json,
}

impl ResponseFormat {
    pub(crate) fn extension(self) -> &'static str {
        match self {
            ResponseFormat::Xml => ".xml",
            ResponseFormat::Json => ".json",
        }
    }
}

/// Parses a raw response body.
///
/// Returns the error payload when the body exposes one (the `errors` field in
/// JSON, the first element of the `errors` collection in XML), the whole
/// decoded value otherwise, and `None` when the body is malformed for the
/// given format.
#[must_use]
pub fn parse(raw: &str, format: ResponseFormat) -> Option<Value> {
    match format {
        ResponseFormat::Json => parse_json(raw),
        ResponseFormat::Xml => parse_xml(raw),
    }
}

/// Whether a parsed value is usable as an operation result. A success status
/// whose body decodes to nothing still counts as a failed call.
pub(crate) fn is_usable(value: &Value) -> bool {
    !(value.is_null() || value.as_str().is_some_and(str::is_empty))
}

/// Extracts the vendor-supplied `message` from an error payload, looking at
/// the first element when the payload is a collection.
pub(crate) fn vendor_message(payload: &Value) -> Option<String> {
    let candidate = match payload {
        Value::Array(items) => items.first()?,
        other => other,
    };

    candidate
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_owned)
}

fn parse_json(raw: &str) -> Option<Value> {
    let value: Value = serde_json::from_str(raw).ok()?;
    if let Some(errors) = value.get("errors") {
        return Some(errors.clone());
    }
    Some(value)
}

fn parse_xml(raw: &str) -> Option<Value> {
    let document = roxmltree::Document::parse(raw).ok()?;
    let folded = fold_element(document.root_element());

    if let Some(errors) = folded.get("errors") {
        return Some(first_error(errors));
    }
    Some(folded)
}

/// Folds an XML element into a [`Value`]: child elements become object
/// entries, repeated tag names become arrays, and leaf elements become their
/// trimmed text content.
fn fold_element(node: roxmltree::Node<'_, '_>) -> Value {
    let mut children: Map<String, Value> = Map::new();

    for child in node.children().filter(|child| child.is_element()) {
        let name = child.tag_name().name().to_owned();
        let value = fold_element(child);
        match children.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let prior = existing.take();
                *existing = Value::Array(vec![prior, value]);
            }
            None => {
                children.insert(name, value);
            }
        }
    }

    if children.is_empty() {
        Value::String(node.text().unwrap_or_default().trim().to_owned())
    } else {
        Value::Object(children)
    }
}

fn first_error(errors: &Value) -> Value {
    match errors {
        Value::Array(items) => items.first().cloned().unwrap_or(Value::Null),
        Value::Object(map) => map
            .values()
            .next()
            .map(|entry| match entry {
                Value::Array(items) => items.first().cloned().unwrap_or(Value::Null),
                other => other.clone(),
            })
            .unwrap_or(Value::Null),
        other => other.clone(),
    }
}
