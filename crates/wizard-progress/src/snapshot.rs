//! Progress snapshot of one wizard run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Loosely typed form/step fields
pub type FieldMap = Map<String, Value>;

/// One safe-navigation transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEntry {
    /// Location left
    pub from: String,
    /// Location entered
    pub to: String,
    /// When it happened
    pub timestamp: DateTime<Utc>,
}

impl NavigationEntry {
    /// Entry stamped now
    #[must_use]
    pub fn now(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Preserved data of one wizard run
///
/// `form_data` and `step_data` only ever grow or overwrite keys;
/// `navigation_history` is append-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressSnapshot {
    /// Entered form values
    pub form_data: FieldMap,
    /// Per-step bookkeeping
    pub step_data: FieldMap,
    /// Safe-navigation transitions, oldest first
    pub navigation_history: Vec<NavigationEntry>,
    /// Last successful preservation call
    pub last_saved_state: Option<DateTime<Utc>>,
}

impl ProgressSnapshot {
    /// Shallow-merge new fields; incoming keys overwrite existing ones
    pub fn merge(&mut self, form_data: FieldMap, step_data: FieldMap) {
        self.form_data.extend(form_data);
        self.step_data.extend(step_data);
    }

    /// Append a navigation transition
    pub fn record_navigation(&mut self, entry: NavigationEntry) {
        self.navigation_history.push(entry);
    }

    /// Fold a persisted snapshot into this one.
    ///
    /// Field maps are merged with the persisted values winning. History and
    /// the save timestamp are taken from the persisted copy when it has them.
    pub fn absorb(&mut self, persisted: &ProgressSnapshot) {
        self.merge(persisted.form_data.clone(), persisted.step_data.clone());
        if !persisted.navigation_history.is_empty() {
            self.navigation_history = persisted.navigation_history.clone();
        }
        if persisted.last_saved_state.is_some() {
            self.last_saved_state = persisted.last_saved_state;
        }
    }

    /// Whether nothing has been preserved yet
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.form_data.is_empty() && self.step_data.is_empty() && self.navigation_history.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fields(value: Value) -> FieldMap {
        match value {
            Value::Object(map) => map,
            _ => FieldMap::new(),
        }
    }

    #[test]
    fn merge_keeps_existing_keys() {
        let mut snapshot = ProgressSnapshot::default();
        snapshot.merge(fields(json!({"a": 1})), FieldMap::new());
        snapshot.merge(fields(json!({"b": 2})), FieldMap::new());
        assert_eq!(snapshot.form_data, fields(json!({"a": 1, "b": 2})));
    }

    #[test]
    fn merge_overwrites_same_key() {
        let mut snapshot = ProgressSnapshot::default();
        snapshot.merge(fields(json!({"email": "old@x.com"})), fields(json!({"step": 1})));
        snapshot.merge(fields(json!({"email": "new@x.com"})), fields(json!({"step": 2})));
        assert_eq!(snapshot.form_data["email"], "new@x.com");
        assert_eq!(snapshot.step_data["step"], 2);
    }

    #[test]
    fn absorb_prefers_persisted_values() {
        let mut live = ProgressSnapshot::default();
        live.merge(fields(json!({"a": 1, "c": 3})), FieldMap::new());

        let mut persisted = ProgressSnapshot::default();
        persisted.merge(fields(json!({"a": 10, "b": 2})), FieldMap::new());
        persisted.record_navigation(NavigationEntry::now("/deal/1", "/dashboard"));

        live.absorb(&persisted);
        assert_eq!(live.form_data, fields(json!({"a": 10, "b": 2, "c": 3})));
        assert_eq!(live.navigation_history.len(), 1);
    }

    #[test]
    fn wire_format_is_camel_case() {
        let json = serde_json::to_value(ProgressSnapshot::default()).unwrap();
        assert!(json.get("formData").is_some());
        assert!(json.get("navigationHistory").is_some());
        assert!(json.get("lastSavedState").is_some());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let snapshot: ProgressSnapshot = serde_json::from_str(r#"{"formData":{"x":1}}"#).unwrap();
        assert_eq!(snapshot.form_data["x"], 1);
        assert!(snapshot.navigation_history.is_empty());
    }

    proptest::proptest! {
        #[test]
        fn merge_is_a_key_union(
            first in proptest::collection::btree_map("[a-e]", 0i64..100, 0..5),
            second in proptest::collection::btree_map("[a-e]", 0i64..100, 0..5),
        ) {
            let to_fields = |m: &std::collections::BTreeMap<String, i64>| -> FieldMap {
                m.iter().map(|(k, v)| (k.clone(), json!(v))).collect()
            };
            let mut snapshot = ProgressSnapshot::default();
            snapshot.merge(to_fields(&first), FieldMap::new());
            snapshot.merge(to_fields(&second), FieldMap::new());

            for key in first.keys().chain(second.keys()) {
                proptest::prop_assert!(snapshot.form_data.contains_key(key));
            }
            for (key, value) in &second {
                proptest::prop_assert_eq!(&snapshot.form_data[key], &json!(value));
            }
        }
    }
}
