//! Default key/value blackboard.
//!
//! The engine itself never looks inside a blackboard; any `Default` type can
//! serve as one. [`Blackboard`] is the ready-made choice for trees whose
//! leaves share a handful of loosely typed values.

use std::collections::HashMap;

/// A value stored in the [`Blackboard`].
#[derive(Debug, Clone, PartialEq)]
pub enum BlackboardValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Positions and directions.
    Vec3([f64; 3]),
}

impl BlackboardValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            BlackboardValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            BlackboardValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Integers widen to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            BlackboardValue::Float(v) => Some(*v),
            BlackboardValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            BlackboardValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<[f64; 3]> {
        match self {
            BlackboardValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<bool> for BlackboardValue {
    fn from(v: bool) -> Self {
        BlackboardValue::Bool(v)
    }
}

impl From<i64> for BlackboardValue {
    fn from(v: i64) -> Self {
        BlackboardValue::Int(v)
    }
}

impl From<i32> for BlackboardValue {
    fn from(v: i32) -> Self {
        BlackboardValue::Int(i64::from(v))
    }
}

impl From<f64> for BlackboardValue {
    fn from(v: f64) -> Self {
        BlackboardValue::Float(v)
    }
}

impl From<String> for BlackboardValue {
    fn from(v: String) -> Self {
        BlackboardValue::String(v)
    }
}

impl From<&str> for BlackboardValue {
    fn from(v: &str) -> Self {
        BlackboardValue::String(v.to_owned())
    }
}

impl From<[f64; 3]> for BlackboardValue {
    fn from(v: [f64; 3]) -> Self {
        BlackboardValue::Vec3(v)
    }
}

/// Named values shared by all nodes of one tree instance.
#[derive(Debug, Clone, Default)]
pub struct Blackboard {
    values: HashMap<String, BlackboardValue>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<BlackboardValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&BlackboardValue> {
        self.values.get(key)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(BlackboardValue::as_bool)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(BlackboardValue::as_int)
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(BlackboardValue::as_float)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(BlackboardValue::as_str)
    }

    pub fn get_vec3(&self, key: &str) -> Option<[f64; 3]> {
        self.get(key).and_then(BlackboardValue::as_vec3)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<BlackboardValue> {
        self.values.remove(key)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
