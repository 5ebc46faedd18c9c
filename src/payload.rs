//! Request payload tree used for call bodies and query objects.
//!
//! [`Payload`] mirrors a JSON document but keeps two distinctions JSON cannot express:
//! an *absent* value (a key that exists but carries nothing) and opaque binary leaves
//! that normalization must never descend into.

pub mod normalize;

pub use normalize::*;

// crates.io
use serde::{Serializer, ser::SerializeMap};
// self
use crate::_prelude::*;

/// Value tree carried by [`Call`](crate::call::Call) bodies and queries.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Payload {
	/// No value; dropped from objects on serialization.
	#[default]
	Absent,
	/// Explicit null.
	Null,
	/// Boolean leaf.
	Bool(bool),
	/// Numeric leaf.
	Number(serde_json::Number),
	/// String leaf.
	String(String),
	/// Ordered sequence.
	Array(Vec<Payload>),
	/// Plain mapping.
	Object(BTreeMap<String, Payload>),
	/// Opaque binary content; passed through untouched.
	Binary(Vec<u8>),
}
impl Payload {
	/// Returns `true` for [`Payload::Absent`].
	pub fn is_absent(&self) -> bool {
		matches!(self, Self::Absent)
	}

	/// Returns `true` for arrays and objects.
	pub fn is_container(&self) -> bool {
		matches!(self, Self::Array(_) | Self::Object(_))
	}

	/// Looks up an object entry.
	pub fn get(&self, key: &str) -> Option<&Payload> {
		match self {
			Self::Object(map) => map.get(key),
			_ => None,
		}
	}

	/// Returns the string slice for string leaves.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(s) => Some(s),
			_ => None,
		}
	}

	/// Converts into a JSON value; absent values become `null` in arrays and are dropped from
	/// objects, binary leaves become byte arrays.
	pub fn to_json(&self) -> Value {
		match self {
			Self::Absent | Self::Null => Value::Null,
			Self::Bool(v) => Value::Bool(*v),
			Self::Number(v) => Value::Number(v.clone()),
			Self::String(v) => Value::String(v.clone()),
			Self::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
			Self::Object(map) => Value::Object(
				map.iter()
					.filter(|(_, v)| !v.is_absent())
					.map(|(k, v)| (k.clone(), v.to_json()))
					.collect(),
			),
			Self::Binary(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
		}
	}
}
impl Serialize for Payload {
	fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match self {
			Self::Absent | Self::Null => serializer.serialize_unit(),
			Self::Bool(v) => serializer.serialize_bool(*v),
			Self::Number(v) => v.serialize(serializer),
			Self::String(v) => serializer.serialize_str(v),
			Self::Array(items) => serializer.collect_seq(items),
			Self::Object(map) => {
				let present = map.values().filter(|v| !v.is_absent()).count();
				let mut state = serializer.serialize_map(Some(present))?;

				for (key, value) in map.iter().filter(|(_, v)| !v.is_absent()) {
					state.serialize_entry(key, value)?;
				}

				state.end()
			},
			Self::Binary(bytes) => serializer.serialize_bytes(bytes),
		}
	}
}
impl From<Value> for Payload {
	fn from(value: Value) -> Self {
		match value {
			Value::Null => Self::Null,
			Value::Bool(v) => Self::Bool(v),
			Value::Number(v) => Self::Number(v),
			Value::String(v) => Self::String(v),
			Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
			Value::Object(map) =>
				Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect()),
		}
	}
}
impl From<&str> for Payload {
	fn from(value: &str) -> Self {
		Self::String(value.to_owned())
	}
}
impl From<String> for Payload {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}
impl From<bool> for Payload {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}
impl From<i64> for Payload {
	fn from(value: i64) -> Self {
		Self::Number(value.into())
	}
}
impl From<Vec<u8>> for Payload {
	fn from(value: Vec<u8>) -> Self {
		Self::Binary(value)
	}
}
impl<T> From<Option<T>> for Payload
where
	T: Into<Payload>,
{
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Absent, Into::into)
	}
}
impl<K, V> FromIterator<(K, V)> for Payload
where
	K: Into<String>,
	V: Into<Payload>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		Self::Object(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}
