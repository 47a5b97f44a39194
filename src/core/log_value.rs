//! Values that can be passed to a logging call
//!
//! This module provides:
//! - `LogValue`: one logged argument (primitive, structured value, or error)
//! - `ObjectRef`: a shared, identity-bearing property map; objects may reference
//!   each other and themselves
//! - `WeakObjectRef`: the non-owning link a masked clone uses to point back at
//!   one of its own ancestors when the source value contains a cycle

use super::error::Result;
use super::error_record::ErrorValue;
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::RwLock;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::{Arc, Weak};

/// Text emitted wherever a cycle is cut during serialization or inspection
pub const CIRCULAR_MARKER: &str = "[Circular]";

type Properties = Vec<(String, LogValue)>;

/// Shared handle to an ordered property map.
///
/// Cloning the handle does not copy the properties; two handles to the same map
/// compare equal under [`ObjectRef::ptr_eq`]. A map that (directly or
/// indirectly) contains itself keeps itself alive until one of the links is
/// removed.
#[derive(Clone, Default)]
pub struct ObjectRef(Arc<RwLock<Properties>>);

impl ObjectRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<LogValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let object = Self::new();
        for (key, value) in pairs {
            object.insert(key, value);
        }
        object
    }

    /// Insert or replace a property, keeping the original position of an existing key
    pub fn insert(&self, key: impl Into<String>, value: impl Into<LogValue>) {
        let key = key.into();
        let value = value.into();
        let mut properties = self.0.write();
        match properties.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => properties.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<LogValue> {
        self.0
            .read()
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.clone())
    }

    pub fn remove(&self, key: &str) -> Option<LogValue> {
        let mut properties = self.0.write();
        let index = properties.iter().position(|(existing, _)| existing == key)?;
        Some(properties.remove(index).1)
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.read().iter().map(|(key, _)| key.clone()).collect()
    }

    /// Snapshot of the own properties, in insertion order
    pub fn entries(&self) -> Vec<(String, LogValue)> {
        self.0.read().clone()
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Identity of the underlying map, stable for its lifetime
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakObjectRef {
        WeakObjectRef(Arc::downgrade(&self.0))
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef")
            .field("id", &format_args!("{:#x}", self.id()))
            .field("keys", &self.keys())
            .finish()
    }
}

/// Non-owning link to an [`ObjectRef`]
#[derive(Clone, Default)]
pub struct WeakObjectRef(Weak<RwLock<Properties>>);

impl WeakObjectRef {
    pub fn upgrade(&self) -> Option<ObjectRef> {
        self.0.upgrade().map(ObjectRef)
    }

    /// Whether this link targets `object`
    pub fn points_to(&self, object: &ObjectRef) -> bool {
        std::ptr::eq(self.0.as_ptr(), Arc::as_ptr(&object.0))
    }
}

impl fmt::Debug for WeakObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(CIRCULAR_MARKER)
    }
}

/// One logged argument
#[derive(Debug, Clone, Default)]
pub enum LogValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(DateTime<Utc>),
    Array(Vec<LogValue>),
    Object(ObjectRef),
    Error(ErrorValue),
    /// Back-reference produced by masking a cyclic object
    Circular(WeakObjectRef),
}

impl LogValue {
    /// Build an object value from key/value pairs
    pub fn object<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<LogValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        LogValue::Object(ObjectRef::from_pairs(pairs))
    }

    /// Convert any serializable value through its JSON form
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(serde_json::to_value(value)?.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, LogValue::Null)
    }

    /// Objects, arrays and dates; rendered on their own line in pretty output
    pub fn is_structured(&self) -> bool {
        matches!(
            self,
            LogValue::Object(_) | LogValue::Array(_) | LogValue::Date(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            LogValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            LogValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            LogValue::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[LogValue]> {
        match self {
            LogValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorValue> {
        match self {
            LogValue::Error(error) => Some(error),
            _ => None,
        }
    }

    /// Short type name shown when `displayTypes` is enabled
    pub fn type_name(&self) -> &'static str {
        match self {
            LogValue::Null => "null",
            LogValue::Bool(_) => "boolean",
            LogValue::Int(_) | LogValue::Float(_) => "number",
            LogValue::String(_) => "string",
            LogValue::Date(_) => "date",
            LogValue::Array(_) => "array",
            LogValue::Object(_) | LogValue::Circular(_) => "object",
            LogValue::Error(_) => "error",
        }
    }

    /// JSON form of the value; cycles are cut with [`CIRCULAR_MARKER`]
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        self.json_with_path(&mut Vec::new())
    }

    pub(crate) fn json_with_path(&self, path: &mut Vec<usize>) -> serde_json::Value {
        use serde_json::Value;
        match self {
            LogValue::Null => Value::Null,
            LogValue::Bool(b) => Value::Bool(*b),
            LogValue::Int(i) => Value::Number((*i).into()),
            LogValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            LogValue::String(s) => Value::String(s.clone()),
            LogValue::Date(date) => Value::String(date.to_rfc3339_opts(SecondsFormat::Millis, true)),
            LogValue::Array(items) => {
                Value::Array(items.iter().map(|item| item.json_with_path(path)).collect())
            }
            LogValue::Object(object) => {
                if path.contains(&object.id()) {
                    return Value::String(CIRCULAR_MARKER.to_string());
                }
                path.push(object.id());
                let map = object
                    .entries()
                    .into_iter()
                    .map(|(key, value)| (key, value.json_with_path(path)))
                    .collect::<serde_json::Map<_, _>>();
                path.pop();
                Value::Object(map)
            }
            LogValue::Error(error) => error.json_with_path(path),
            LogValue::Circular(_) => Value::String(CIRCULAR_MARKER.to_string()),
        }
    }
}

impl Serialize for LogValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json_value().serialize(serializer)
    }
}

macro_rules! from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for LogValue {
                fn from(i: $t) -> Self {
                    LogValue::Int(i as i64)
                }
            }
        )*
    };
}

from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for LogValue {
    fn from(u: u64) -> Self {
        i64::try_from(u)
            .map(LogValue::Int)
            .unwrap_or(LogValue::Float(u as f64))
    }
}

impl From<usize> for LogValue {
    fn from(u: usize) -> Self {
        LogValue::from(u as u64)
    }
}

impl From<f32> for LogValue {
    fn from(f: f32) -> Self {
        LogValue::Float(f as f64)
    }
}

impl From<f64> for LogValue {
    fn from(f: f64) -> Self {
        LogValue::Float(f)
    }
}

impl From<bool> for LogValue {
    fn from(b: bool) -> Self {
        LogValue::Bool(b)
    }
}

impl From<String> for LogValue {
    fn from(s: String) -> Self {
        LogValue::String(s)
    }
}

impl From<&str> for LogValue {
    fn from(s: &str) -> Self {
        LogValue::String(s.to_string())
    }
}

impl From<&String> for LogValue {
    fn from(s: &String) -> Self {
        LogValue::String(s.clone())
    }
}

impl From<DateTime<Utc>> for LogValue {
    fn from(date: DateTime<Utc>) -> Self {
        LogValue::Date(date)
    }
}

impl From<ObjectRef> for LogValue {
    fn from(object: ObjectRef) -> Self {
        LogValue::Object(object)
    }
}

impl From<ErrorValue> for LogValue {
    fn from(error: ErrorValue) -> Self {
        LogValue::Error(error)
    }
}

impl<T: Into<LogValue>> From<Vec<T>> for LogValue {
    fn from(items: Vec<T>) -> Self {
        LogValue::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<LogValue>> From<Option<T>> for LogValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(LogValue::Null)
    }
}

impl From<serde_json::Value> for LogValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => LogValue::Null,
            Value::Bool(b) => LogValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => LogValue::Int(i),
                None => LogValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => LogValue::String(s),
            Value::Array(items) => LogValue::Array(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => LogValue::Object(ObjectRef::from_pairs(map)),
        }
    }
}
