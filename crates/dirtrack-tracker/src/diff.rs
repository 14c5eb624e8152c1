//! Field-level change report: baseline snapshot vs. current values.
//!
//! Values are compared one level deep, as whole serialized field values.
//! Nested structure inside a container is never diffed.

use std::collections::BTreeMap;

use dirtrack_types::FieldName;
use serde_json::Value;

/// Serialized field values keyed by field name.
pub type FieldSnapshot = BTreeMap<String, Value>;

/// Changes to the dirty fields of one instance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeReport {
    /// One entry per dirty field whose serialized value differs.
    pub changes: Vec<FieldChange>,
}

impl ChangeReport {
    /// Returns `true` if no dirty field differs from its baseline.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of differing fields.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// The change recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.changes.iter().find(|change| change.field() == field)
    }
}

/// How one field differs from its baseline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldChange {
    /// The field had no serialized value at the baseline.
    Added { field: FieldName, value: Value },
    /// The field no longer serializes to a value.
    Removed { field: FieldName, value: Value },
    /// The field's serialized value changed.
    Modified {
        field: FieldName,
        old: Value,
        new: Value,
    },
}

impl FieldChange {
    /// The field this change belongs to.
    pub fn field(&self) -> FieldName {
        match self {
            Self::Added { field, .. } | Self::Removed { field, .. } | Self::Modified { field, .. } => {
                *field
            }
        }
    }
}

/// Compare `baseline` and `current` for each of `fields`.
///
/// Dirty fields whose value went back to the baseline (e.g. a push followed
/// by a pop) produce no entry.
pub fn diff_fields<'a, I>(baseline: &FieldSnapshot, current: &FieldSnapshot, fields: I) -> ChangeReport
where
    I: IntoIterator<Item = &'a FieldName>,
{
    let mut changes = Vec::new();

    for &field in fields {
        match (baseline.get(field), current.get(field)) {
            (Some(old), Some(new)) if old != new => changes.push(FieldChange::Modified {
                field,
                old: old.clone(),
                new: new.clone(),
            }),
            (None, Some(new)) => changes.push(FieldChange::Added {
                field,
                value: new.clone(),
            }),
            (Some(old), None) => changes.push(FieldChange::Removed {
                field,
                value: old.clone(),
            }),
            _ => {}
        }
    }

    ChangeReport { changes }
}

/// Split a serialized model into its top-level fields.
///
/// Non-object serializations yield an empty snapshot.
pub fn snapshot_of(value: Value) -> FieldSnapshot {
    match value {
        Value::Object(map) => map.into_iter().collect(),
        _ => FieldSnapshot::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(value: Value) -> FieldSnapshot {
        snapshot_of(value)
    }

    #[test]
    fn modified_field_is_reported() {
        let old = snapshot(json!({"status": "open", "tags": [1]}));
        let new = snapshot(json!({"status": "closed", "tags": [1]}));
        let report = diff_fields(&old, &new, &["status", "tags"]);
        assert_eq!(report.len(), 1);
        assert_eq!(
            report.get("status"),
            Some(&FieldChange::Modified {
                field: "status",
                old: json!("open"),
                new: json!("closed"),
            })
        );
        assert!(report.get("tags").is_none());
    }

    #[test]
    fn only_requested_fields_are_compared() {
        let old = snapshot(json!({"a": 1, "b": 1}));
        let new = snapshot(json!({"a": 2, "b": 2}));
        let report = diff_fields(&old, &new, &["b"]);
        assert_eq!(report.len(), 1);
        assert_eq!(report.changes[0].field(), "b");
    }

    #[test]
    fn added_and_removed() {
        let old = snapshot(json!({"gone": 1}));
        let new = snapshot(json!({"fresh": 2}));
        let report = diff_fields(&old, &new, &["gone", "fresh"]);
        assert_eq!(
            report.changes,
            vec![
                FieldChange::Removed { field: "gone", value: json!(1) },
                FieldChange::Added { field: "fresh", value: json!(2) },
            ]
        );
    }

    #[test]
    fn reverted_value_produces_nothing() {
        let old = snapshot(json!({"tags": [1]}));
        let report = diff_fields(&old, &old.clone(), &["tags"]);
        assert!(report.is_empty());
    }

    #[test]
    fn non_object_snapshot_is_empty() {
        assert!(snapshot_of(json!([1, 2])).is_empty());
        assert!(snapshot_of(json!(null)).is_empty());
    }
}
