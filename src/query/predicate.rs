//! Store-agnostic predicates.
//!
//! A [`Predicate`] describes one constraint on a record. Each predicate has
//! two interpretations that must agree: [`Predicate::matches`] evaluates it
//! in-process against a JSON record, and [`Predicate::to_param`] renders it in
//! the PostgREST query dialect understood by the remote store.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single constraint on a store record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    /// Scalar column equals `value` exactly.
    Eq { field: String, value: String },

    /// Array column contains `value` as one of its elements.
    Contains { field: String, value: String },

    /// Text column contains `needle`, ignoring case.
    ILike { field: String, needle: String },

    /// At least one of the inner predicates holds.
    Any(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Contains {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn ilike(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::ILike {
            field: field.into(),
            needle: needle.into(),
        }
    }

    /// Evaluates the predicate against a JSON record.
    ///
    /// Missing fields, nulls and type mismatches never match.
    ///
    /// ```
    /// use hirafi::query::Predicate;
    /// use serde_json::json;
    ///
    /// let record = json!({"first_name": "Karim", "skills": ["tiling"]});
    /// assert!(Predicate::ilike("first_name", "RIM").matches(&record));
    /// assert!(Predicate::contains("skills", "tiling").matches(&record));
    /// assert!(!Predicate::eq("wilaya", "Oran").matches(&record));
    /// ```
    #[must_use]
    pub fn matches(&self, record: &Value) -> bool {
        match self {
            Self::Eq { field, value } => record
                .get(field)
                .and_then(scalar_text)
                .is_some_and(|text| text == *value),
            Self::Contains { field, value } => record
                .get(field)
                .and_then(Value::as_array)
                .is_some_and(|items| {
                    items
                        .iter()
                        .filter_map(scalar_text)
                        .any(|item| item == *value)
                }),
            Self::ILike { field, needle } => record
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|text| text.to_lowercase().contains(&needle.to_lowercase())),
            Self::Any(inner) => inner.iter().any(|p| p.matches(record)),
        }
    }

    /// Renders the predicate as one PostgREST query parameter.
    ///
    /// ```
    /// use hirafi::query::Predicate;
    ///
    /// let (key, value) = Predicate::eq("wilaya", "Oran").to_param();
    /// assert_eq!((key.as_str(), value.as_str()), ("wilaya", "eq.Oran"));
    /// ```
    #[must_use]
    pub fn to_param(&self) -> (String, String) {
        match self {
            Self::Eq { field, value } => (field.clone(), format!("eq.{value}")),
            Self::Contains { field, value } => {
                (field.clone(), format!("cs.{{{}}}", quote_array_element(value)))
            }
            Self::ILike { field, needle } => {
                (field.clone(), format!("ilike.{}", like_pattern(needle)))
            }
            Self::Any(inner) => ("or".to_string(), format!("({})", join_conditions(inner))),
        }
    }

    /// Renders the predicate inside a logic tree such as `or=(...)`, where the
    /// field is part of the condition and reserved characters need quoting.
    fn to_condition(&self) -> String {
        match self {
            Self::Eq { field, value } => format!("{field}.eq.{}", quote_reserved(value)),
            Self::Contains { field, value } => format!(
                "{field}.cs.{}",
                quote_reserved(&format!("{{{}}}", quote_array_element(value)))
            ),
            Self::ILike { field, needle } => {
                format!("{field}.ilike.{}", quote_reserved(&like_pattern(needle)))
            }
            Self::Any(inner) => format!("or({})", join_conditions(inner)),
        }
    }
}

fn join_conditions(inner: &[Predicate]) -> String {
    inner
        .iter()
        .map(Predicate::to_condition)
        .collect::<Vec<_>>()
        .join(",")
}

/// Text form of a scalar JSON value, as the store would compare it.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Builds a `*needle*` pattern. `*` is the wildcard in PostgREST, so literal
/// stars are dropped; SQL wildcards are escaped.
fn like_pattern(needle: &str) -> String {
    let escaped: String = needle
        .chars()
        .filter(|c| *c != '*')
        .flat_map(|c| match c {
            '%' | '_' | '\\' => vec!['\\', c],
            other => vec![other],
        })
        .collect();
    format!("*{escaped}*")
}

fn quote_array_element(value: &str) -> String {
    if value
        .chars()
        .any(|c| matches!(c, ',' | '{' | '}' | '"' | '\\') || c.is_whitespace())
    {
        format!("\"{}\"", escape_quotes(value))
    } else {
        value.to_string()
    }
}

fn quote_reserved(value: &str) -> String {
    if value
        .chars()
        .any(|c| matches!(c, ',' | '.' | ':' | '(' | ')' | '"'))
    {
        format!("\"{}\"", escape_quotes(value))
    } else {
        value.to_string()
    }
}

fn escape_quotes(raw: &str) -> String {
    raw.replace('\\', r"\\").replace('"', "\\\"")
}
