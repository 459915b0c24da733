//! Filter criteria and the predicates that evaluate them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Criterion value meaning "no constraint" when selected in a dropdown.
pub const ALL: &str = "all";

/// Whether a criterion value constrains anything.
///
/// `null`, the empty string and [`ALL`] impose no constraint. Every other
/// value, including `false` and `0`, does.
pub fn is_meaningful(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty() && s != ALL,
        _ => true,
    }
}

/// Active filter criteria, keyed by filter name.
///
/// Serializes as a plain JSON object so filter state can be saved and restored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Criteria(BTreeMap<String, Value>);

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse criteria from a JSON object such as `{"status": "active"}`.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert or overwrite a criterion. Returns whether anything changed.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> bool {
        let key = key.into();
        if self.0.get(&key) == Some(&value) {
            return false;
        }
        self.0.insert(key, value);
        true
    }

    /// Remove a criterion. Returns whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.0.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Criteria that actually constrain the view.
    pub fn active(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.iter().filter(|(_, value)| is_meaningful(value))
    }

    pub fn has_active(&self) -> bool {
        self.active().next().is_some()
    }

    /// Whether both hold the same meaningful entries, ignoring placeholders.
    pub fn same_active(&self, other: &Criteria) -> bool {
        self.active().eq(other.active())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Criteria {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A predicate testing one item against one criterion value.
pub type Predicate<T> = Arc<dyn Fn(&T, &Value) -> bool + Send + Sync>;

/// Named predicates, fixed when a filter store is built.
///
/// Lookups of unknown keys are permissive: an item always passes a filter
/// that has no predicate registered for it.
pub struct PredicateSet<T> {
    predicates: HashMap<String, Predicate<T>>,
}

impl<T> PredicateSet<T> {
    pub fn new() -> Self {
        Self {
            predicates: HashMap::new(),
        }
    }

    /// Builder form of [`PredicateSet::insert`].
    pub fn with<F>(mut self, key: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&T, &Value) -> bool + Send + Sync + 'static,
    {
        self.insert(key, predicate);
        self
    }

    pub fn insert<F>(&mut self, key: impl Into<String>, predicate: F)
    where
        F: Fn(&T, &Value) -> bool + Send + Sync + 'static,
    {
        self.predicates.insert(key.into(), Arc::new(predicate));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.predicates.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Test one item against one criterion.
    ///
    /// Non-meaningful values and unknown keys pass without calling anything.
    pub fn test(&self, key: &str, item: &T, value: &Value) -> bool {
        if !is_meaningful(value) {
            return true;
        }
        match self.predicates.get(key) {
            Some(predicate) => predicate(item, value),
            None => {
                tracing::trace!(key, "no predicate registered for filter key");
                true
            }
        }
    }

    /// Whether an item satisfies every active criterion.
    pub fn matches(&self, item: &T, criteria: &Criteria) -> bool {
        criteria
            .iter()
            .all(|(key, value)| self.test(key, item, value))
    }

    /// Stable filter: keeps matching items in their original order.
    pub fn apply(&self, items: &[T], criteria: &Criteria) -> Vec<T>
    where
        T: Clone,
    {
        if !criteria.has_active() {
            return items.to_vec();
        }
        items
            .iter()
            .filter(|item| self.matches(item, criteria))
            .cloned()
            .collect()
    }
}

impl<T> Default for PredicateSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for PredicateSet<T> {
    fn clone(&self) -> Self {
        Self {
            predicates: self.predicates.clone(),
        }
    }
}

impl<T> fmt::Debug for PredicateSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.predicates.keys().collect();
        keys.sort();
        f.debug_struct("PredicateSet").field("keys", &keys).finish()
    }
}

fn criterion_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Predicate: a text field equals the criterion (status dropdowns and the like).
pub fn field_equals<T, F>(field: F) -> impl Fn(&T, &Value) -> bool + Send + Sync + Clone
where
    F: Fn(&T) -> &str + Send + Sync + Clone,
{
    move |item: &T, value: &Value| field(item) == criterion_text(value)
}

/// Predicate: any of the given text fields contains the criterion, ignoring case.
pub fn text_contains<T, F>(fields: F) -> impl Fn(&T, &Value) -> bool + Send + Sync + Clone
where
    F: Fn(&T) -> Vec<&str> + Send + Sync + Clone,
{
    move |item: &T, value: &Value| {
        let needle = criterion_text(value).to_lowercase();
        fields(item)
            .into_iter()
            .any(|text| text.to_lowercase().contains(&needle))
    }
}
