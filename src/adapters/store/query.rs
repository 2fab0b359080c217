//! Typed query model for staging collections
//!
//! A deliberately small subset of document-store queries: equality and
//! membership filters, non-empty checks, computed fields and a left-outer
//! lookup join. Both store backends evaluate it with the functions here, so
//! query semantics do not depend on where the documents live.

use crate::domain::record::{field, set_field, Document};
use serde_json::Value;

/// Document predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document
    All,
    /// Field equals the value, or is an array containing it
    Eq(String, Value),
    /// Field equals (or contains) any of the values
    In(String, Vec<Value>),
    /// Field exists and is not an empty array
    NonEmpty(String),
    /// Every sub-filter matches
    And(Vec<Filter>),
    /// At least one sub-filter matches; an empty `Or` matches nothing
    Or(Vec<Filter>),
}

impl Filter {
    /// Equality filter on a dotted path
    pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(path.into(), value.into())
    }

    /// Evaluate the filter against a document
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Self::All => true,
            Self::Eq(path, expected) => field(doc, path).is_some_and(|v| value_matches(v, expected)),
            Self::In(path, candidates) => field(doc, path)
                .is_some_and(|v| candidates.iter().any(|c| value_matches(v, c))),
            Self::NonEmpty(path) => match field(doc, path) {
                None | Some(Value::Null) => false,
                Some(Value::Array(items)) => !items.is_empty(),
                Some(_) => true,
            },
            Self::And(filters) => filters.iter().all(|f| f.matches(doc)),
            Self::Or(filters) => filters.iter().any(|f| f.matches(doc)),
        }
    }
}

fn value_matches(actual: &Value, expected: &Value) -> bool {
    match actual {
        Value::Array(items) if !expected.is_array() => items.contains(expected),
        _ => actual == expected,
    }
}

/// Computed field expression for [`Stage::AddFields`]
#[derive(Debug, Clone, PartialEq)]
pub enum FieldExpr {
    /// A constant
    Literal(Value),
    /// Copy of another field (null when missing)
    Field(String),
    /// Concatenation of the values found at each path, traversing arrays
    ConcatArrays(Vec<String>),
}

impl FieldExpr {
    fn evaluate(&self, doc: &Document) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Field(path) => field(doc, path).cloned().unwrap_or(Value::Null),
            Self::ConcatArrays(paths) => {
                let mut items = Vec::new();
                for path in paths {
                    for value in path_values(doc, path) {
                        match value {
                            Value::Array(inner) => items.extend(inner),
                            Value::Null => {}
                            other => items.push(other),
                        }
                    }
                }
                Value::Array(items)
            }
        }
    }
}

/// Left-outer join against another collection
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    /// Foreign collection
    pub from: String,
    /// Path in the input document; array values match element-wise
    pub local_field: String,
    /// Path in the foreign documents
    pub foreign_field: String,
    /// Output field receiving the array of matched foreign documents
    pub as_field: String,
}

/// One pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Filter),
    AddFields(Vec<(String, FieldExpr)>),
    Lookup(Lookup),
}

impl Stage {
    /// Build a lookup stage
    pub fn lookup(from: &str, local_field: &str, foreign_field: &str, as_field: &str) -> Self {
        Self::Lookup(Lookup {
            from: from.to_string(),
            local_field: local_field.to_string(),
            foreign_field: foreign_field.to_string(),
            as_field: as_field.to_string(),
        })
    }
}

/// Collect every value reachable at a dotted path, fanning out over arrays
///
/// `values.cover.data` on `{"values": {"cover": [{"data": "a"}, {"data": "b"}]}}`
/// yields `["a", "b"]`.
pub fn path_values(doc: &Document, path: &str) -> Vec<Value> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut out = Vec::new();
    collect_path(doc, &segments, &mut out);
    out
}

fn collect_path(value: &Value, segments: &[&str], out: &mut Vec<Value>) {
    match segments.split_first() {
        None => out.push(value.clone()),
        Some((head, rest)) => match value {
            Value::Array(items) => {
                for item in items {
                    collect_path(item, segments, out);
                }
            }
            Value::Object(map) => {
                if let Some(next) = map.get(*head) {
                    collect_path(next, rest, out);
                }
            }
            _ => {}
        },
    }
}

/// Join keys a lookup needs for a set of input documents
///
/// Array values are flattened; nulls are dropped.
pub fn lookup_keys(docs: &[Document], lookup: &Lookup) -> Vec<Value> {
    let mut keys: Vec<Value> = Vec::new();
    for doc in docs {
        for value in path_values(doc, &lookup.local_field) {
            let flattened = match value {
                Value::Array(items) => items,
                Value::Null => Vec::new(),
                other => vec![other],
            };
            for key in flattened {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
    }
    keys
}

/// Apply one stage to a batch of documents
///
/// `foreign` holds candidate documents of the lookup's `from` collection; it
/// is ignored by the other stage kinds.
pub fn apply_stage(docs: Vec<Document>, stage: &Stage, foreign: &[Document]) -> Vec<Document> {
    match stage {
        Stage::Match(filter) => docs.into_iter().filter(|d| filter.matches(d)).collect(),
        Stage::AddFields(fields) => docs
            .into_iter()
            .map(|mut doc| {
                for (name, expr) in fields {
                    let value = expr.evaluate(&doc);
                    set_field(&mut doc, name, value);
                }
                doc
            })
            .collect(),
        Stage::Lookup(lookup) => docs
            .into_iter()
            .map(|mut doc| {
                let keys = lookup_keys(std::slice::from_ref(&doc), lookup);
                let joined: Vec<Value> = foreign
                    .iter()
                    .filter(|candidate| {
                        field(candidate, &lookup.foreign_field)
                            .is_some_and(|v| keys.iter().any(|k| value_matches(v, k)))
                    })
                    .cloned()
                    .collect();
                set_field(&mut doc, &lookup.as_field, Value::Array(joined));
                doc
            })
            .collect(),
    }
}

/// Render a key as the text Postgres' `->>` operator would return
pub fn key_as_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
