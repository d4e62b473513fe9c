//! Bound or literal text
//!
//! Text-bearing properties carry either a literal or a pointer into the
//! data model. Generators are not always strict about the wrapper, so a bare
//! JSON string is taken as a literal too.

use serde::{Deserialize, Serialize};

/// Text property of a component.
///
/// Accepted wire forms:
///
/// ```json
/// {"literalString": "BTC Analysis"}
/// {"path": "/market/price"}
/// "BTC Analysis"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringValue {
    Literal {
        #[serde(rename = "literalString")]
        literal_string: String,
    },
    /// Pointer into the data model
    Path { path: String },
    /// Unwrapped literal
    Plain(String),
}

impl StringValue {
    pub fn literal(text: impl Into<String>) -> Self {
        StringValue::Literal {
            literal_string: text.into(),
        }
    }

    pub fn path(pointer: impl Into<String>) -> Self {
        StringValue::Path {
            path: pointer.into(),
        }
    }

    pub fn is_path(&self) -> bool {
        self.as_path().is_some()
    }

    /// True for both wrapped and bare literals.
    pub fn is_literal(&self) -> bool {
        self.as_literal().is_some()
    }

    pub fn as_path(&self) -> Option<&str> {
        if let StringValue::Path { path } = self {
            Some(path)
        } else {
            None
        }
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            StringValue::Literal { literal_string: text } | StringValue::Plain(text) => Some(text),
            StringValue::Path { .. } => None,
        }
    }

    /// Text to show without a data model.
    ///
    /// Paths render as `{/the/path}` so an unbound value stays visible.
    pub fn display_text(&self) -> String {
        match self.as_literal() {
            Some(text) => text.to_string(),
            None => format!("{{{}}}", self.as_path().unwrap_or_default()),
        }
    }
}

impl Default for StringValue {
    fn default() -> Self {
        StringValue::Plain(String::new())
    }
}

impl From<&str> for StringValue {
    fn from(text: &str) -> Self {
        StringValue::literal(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_forms() {
        let wrapped: StringValue = serde_json::from_value(json!({"literalString": "BTC"})).unwrap();
        let bare: StringValue = serde_json::from_value(json!("BTC")).unwrap();
        let bound: StringValue = serde_json::from_value(json!({"path": "/market/price"})).unwrap();

        assert_eq!(wrapped, StringValue::literal("BTC"));
        assert_eq!(bare, StringValue::Plain("BTC".to_string()));
        assert_eq!(bound.as_path(), Some("/market/price"));
        assert!(wrapped.is_literal() && bare.is_literal() && bound.is_path());
    }

    #[test]
    fn test_display_text() {
        assert_eq!(StringValue::from("Headline").display_text(), "Headline");
        assert_eq!(StringValue::path("/news/0/title").display_text(), "{/news/0/title}");
        assert_eq!(StringValue::default().display_text(), "");
    }

    #[test]
    fn test_literal_serializes_wrapped() {
        let json = serde_json::to_string(&StringValue::literal("Hi")).unwrap();
        assert_eq!(json, r#"{"literalString":"Hi"}"#);
    }
}
