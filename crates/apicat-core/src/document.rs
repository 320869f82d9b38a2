use serde_json::Value;

use crate::error::ParseError;

/// One immutable specification document.
///
/// The raw input may be an outer wrapper holding `basic_info` (free-text
/// component metadata) and `openapi_spec` (the specification body); when the
/// wrapper is absent the whole document is treated as the body. Nothing in
/// the pipeline mutates the document after construction.
#[derive(Debug, Clone)]
pub struct SpecDocument {
    root: Value,
}

impl SpecDocument {
    pub fn from_json(input: &str) -> Result<Self, ParseError> {
        let root: Value = serde_json::from_str(input)?;
        Self::from_value(root)
    }

    pub fn from_yaml(input: &str) -> Result<Self, ParseError> {
        let root: Value = serde_yaml_ng::from_str(input)?;
        Self::from_value(root)
    }

    pub fn from_value(root: Value) -> Result<Self, ParseError> {
        let doc = Self { root };
        if doc.title().is_empty() {
            return Err(ParseError::MissingField("info.title".to_string()));
        }
        Ok(doc)
    }

    /// The specification body: the `openapi_spec` member of the wrapper, or
    /// the whole document when no wrapper is present.
    pub fn body(&self) -> &Value {
        match self.root.get("openapi_spec") {
            Some(body) if body.is_object() => body,
            _ => &self.root,
        }
    }

    fn basic_info(&self) -> Option<&Value> {
        self.root.get("basic_info")
    }

    fn basic_info_str(&self, key: &str) -> &str {
        self.basic_info()
            .and_then(|b| b.get(key))
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    fn body_str(&self, pointer: &str) -> &str {
        self.body()
            .pointer(pointer)
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn title(&self) -> &str {
        self.body_str("/info/title")
    }

    /// Free-text description, preferring the wrapper's `basic_info` over the
    /// specification's own `info.description`.
    pub fn description(&self) -> &str {
        self.basic_info()
            .and_then(|b| b.get("description"))
            .and_then(Value::as_str)
            .unwrap_or_else(|| self.body_str("/info/description"))
    }

    pub fn version(&self) -> &str {
        self.body_str("/info/version")
    }

    /// Owning component from the wrapper metadata, empty for bare
    /// documents.
    pub fn component(&self) -> &str {
        self.basic_info_str("component")
    }

    /// API flavor from the wrapper metadata, empty for bare documents.
    pub fn api_type(&self) -> &str {
        self.basic_info_str("api_type")
    }

    /// First declared server URL, or empty when none is declared.
    pub fn base_url(&self) -> &str {
        self.body()
            .pointer("/servers/0/url")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn paths(&self) -> Option<&serde_json::Map<String, Value>> {
        self.body().get("paths").and_then(Value::as_object)
    }
}
