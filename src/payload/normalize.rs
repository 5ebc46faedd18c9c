//! Payload Normalizer: recursive trim / drop-absent / empty-to-null transform.
//!
//! Called directly through [`normalize`], string trimming defaults to on. When the
//! normalizer is driven by the request interceptor, unset options default to off; the
//! interceptor resolves its options with [`NormalizeOptions::resolve`] and `trim_default =
//! false`.

// self
use crate::{_prelude::*, payload::Payload};

/// Partial normalizer options; unset fields fall back to the caller's defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NormalizeOptions {
	/// Trim leading and trailing whitespace from strings.
	pub trim: Option<bool>,
	/// Remove object entries and array items whose value is absent.
	pub drop_absent: Option<bool>,
	/// Replace empty strings (after trimming) with null.
	pub empty_to_null: Option<bool>,
}
impl NormalizeOptions {
	/// Sets the trim flag.
	pub fn with_trim(mut self, trim: bool) -> Self {
		self.trim = Some(trim);

		self
	}

	/// Sets the drop-absent flag.
	pub fn with_drop_absent(mut self, drop_absent: bool) -> Self {
		self.drop_absent = Some(drop_absent);

		self
	}

	/// Sets the empty-to-null flag.
	pub fn with_empty_to_null(mut self, empty_to_null: bool) -> Self {
		self.empty_to_null = Some(empty_to_null);

		self
	}

	/// Field-by-field merge where every field set on `overrides` wins.
	pub fn merge(self, overrides: Self) -> Self {
		Self {
			trim: overrides.trim.or(self.trim),
			drop_absent: overrides.drop_absent.or(self.drop_absent),
			empty_to_null: overrides.empty_to_null.or(self.empty_to_null),
		}
	}

	/// Fills unset fields; only `trim` has a caller-chosen default, the rest default to off.
	pub fn resolve(self, trim_default: bool) -> NormalizeSettings {
		NormalizeSettings {
			trim: self.trim.unwrap_or(trim_default),
			drop_absent: self.drop_absent.unwrap_or(false),
			empty_to_null: self.empty_to_null.unwrap_or(false),
		}
	}
}

/// Fully resolved normalizer settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NormalizeSettings {
	/// Trim strings.
	pub trim: bool,
	/// Drop absent entries.
	pub drop_absent: bool,
	/// Empty strings become null.
	pub empty_to_null: bool,
}

/// Normalizes `payload` with `options`, trimming strings unless told otherwise.
pub fn normalize(payload: Payload, options: Option<NormalizeOptions>) -> Payload {
	normalize_with(payload, options.unwrap_or_default().resolve(true))
}

/// Normalizes `payload` with fully resolved settings.
pub fn normalize_with(payload: Payload, settings: NormalizeSettings) -> Payload {
	match payload {
		Payload::String(s) => normalize_string(s, settings),
		Payload::Array(items) => Payload::Array(
			items
				.into_iter()
				.map(|item| normalize_with(item, settings))
				.filter(|item| !(settings.drop_absent && item.is_absent()))
				.collect(),
		),
		Payload::Object(map) => Payload::Object(
			map.into_iter()
				.map(|(key, value)| (key, normalize_with(value, settings)))
				.filter(|(_, value)| !(settings.drop_absent && value.is_absent()))
				.collect(),
		),
		other => other,
	}
}

fn normalize_string(s: String, settings: NormalizeSettings) -> Payload {
	let s = if settings.trim { s.trim().to_owned() } else { s };

	if settings.empty_to_null && s.is_empty() { Payload::Null } else { Payload::String(s) }
}
