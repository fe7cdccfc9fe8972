use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One field that differs between the stored and the updated entity.
///
/// Only used to populate audit context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChangeSummary {
    /// Field name as stored.
    pub field_name: String,
    /// Value before the update.
    pub old_value: Value,
    /// Value after the update.
    pub new_value: Value,
}

impl FieldChangeSummary {
    /// Creates a change entry.
    #[must_use]
    pub fn new(field_name: impl Into<String>, old_value: Value, new_value: Value) -> Self {
        Self {
            field_name: field_name.into(),
            old_value,
            new_value,
        }
    }
}

/// Collects field changes while an update input is applied to an entity.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    changes: Vec<FieldChangeSummary>,
}

impl ChangeTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces `current` with `proposed` when it is present and different.
    pub fn apply<T>(&mut self, field_name: &str, current: &mut T, proposed: Option<T>)
    where
        T: Serialize + PartialEq,
    {
        let Some(proposed) = proposed else {
            return;
        };

        if *current == proposed {
            return;
        }

        self.changes.push(FieldChangeSummary::new(
            field_name,
            serde_json::to_value(&*current).unwrap_or(Value::Null),
            serde_json::to_value(&proposed).unwrap_or(Value::Null),
        ));
        *current = proposed;
    }

    /// Returns the collected changes.
    #[must_use]
    pub fn finish(self) -> Vec<FieldChangeSummary> {
        self.changes
    }
}
