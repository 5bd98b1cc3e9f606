//! Merging extracted fields into a page's form state.
//!
//! Only present, non-blank values are applied; anything the extractor left
//! out keeps its pre-dictation value. Free-text fields listed in the policy
//! accumulate instead of being overwritten.

use serde_json::{Map, Value};

use taller_core::types::FormContext;

use crate::contract::contract_for;

/// Separator placed between accumulated dictations.
pub const ACCUMULATE_SEPARATOR: &str = "\n\n";

/// Which fields append rather than overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergePolicy {
    accumulate: Vec<String>,
}

impl MergePolicy {
    /// Every field overwrites.
    pub fn overwrite() -> Self {
        Self::default()
    }

    pub fn accumulating<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accumulate: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Policy used by the pages of each form context.
    ///
    /// The order editor accumulates the narrative fields its extraction
    /// contract returns; every other form overwrites.
    pub fn for_context(context: FormContext) -> Self {
        match context {
            FormContext::Order => {
                Self::accumulating(contract_for(context).expected_fields.iter().copied())
            }
            _ => Self::overwrite(),
        }
    }

    pub fn accumulates(&self, field: &str) -> bool {
        self.accumulate.iter().any(|f| f == field)
    }
}

/// Whether an extracted value carries nothing worth applying.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Object(map) => map.values().all(is_blank),
        Value::Array(items) => items.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Merge `data` into `form` and return how many leaf fields changed.
pub fn merge_fields(form: &mut Map<String, Value>, data: &Map<String, Value>, policy: &MergePolicy) -> usize {
    let mut applied = 0;
    for (key, value) in data {
        if is_blank(value) {
            continue;
        }

        if let Value::Object(incoming) = value {
            match form.get_mut(key) {
                Some(Value::Object(existing)) => {
                    applied += merge_fields(existing, incoming, policy);
                }
                _ => {
                    let mut section = Map::new();
                    applied += merge_fields(&mut section, incoming, policy);
                    form.insert(key.clone(), Value::Object(section));
                }
            }
            continue;
        }

        if policy.accumulates(key) {
            if let (Some(Value::String(existing)), Value::String(addition)) = (form.get_mut(key), value) {
                if !existing.trim().is_empty() {
                    existing.push_str(ACCUMULATE_SEPARATOR);
                    existing.push_str(addition.trim());
                    applied += 1;
                    continue;
                }
            }
        }

        let next = match value {
            Value::String(s) => Value::String(s.trim().to_string()),
            other => other.clone(),
        };
        form.insert(key.clone(), next);
        applied += 1;
    }
    applied
}
