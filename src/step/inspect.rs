//! Field inspection over stored state documents.
//!
//! Assertion steps check named fields on whatever an API-call step stored.
//! Stored values are `serde_json::Value` documents, so a field is an object
//! key. Keys may themselves contain dots (`"triton.cns.services"`); a name
//! that matches no literal key is tried as a path through nested objects
//! (`"Network.Id"`, `"Tags.triton.cns.services"`).

use std::num::FpCategory;

use serde_json::Value;

/// What inspection found for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPresence {
    /// The field does not exist on the value.
    Missing,
    /// The field exists but holds an empty or zero value.
    Empty,
    /// The field exists and holds content.
    Present,
}

/// Inspects `field` on `value`.
///
/// Non-object values expose no fields, so every lookup on them reports
/// [`FieldPresence::Missing`].
#[must_use]
pub fn inspect_field(value: &Value, field: &str) -> FieldPresence {
    match lookup(value, field) {
        None => FieldPresence::Missing,
        Some(found) if is_empty_value(found) => FieldPresence::Empty,
        Some(_) => FieldPresence::Present,
    }
}

/// Resolves `name` on `value`, preferring the literal key, then each split
/// at a dot from left to right.
fn lookup<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    let object = value.as_object()?;
    if let Some(found) = object.get(name) {
        return Some(found);
    }

    name.match_indices('.').find_map(|(index, _)| {
        let (head, tail) = name.split_at(index);
        let rest = tail.strip_prefix('.')?;
        lookup(object.get(head)?, rest)
    })
}

/// Returns whether `value` is the zero value of its kind.
///
/// `null`, `false`, any numeric zero, the empty string, the empty array, and
/// the empty object are all empty.
#[must_use]
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number
            .as_f64()
            .is_some_and(|float| float.classify() == FpCategory::Zero),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}
