//! Localized user-facing messages and the process-wide language setting.
//!
//! The catalog is a pure lookup table. The only mutable state is the global
//! [`Language`] selector, which is read at failure-classification time by every
//! error presenter that does not receive a per-call override. Last write wins.

// self
use crate::_prelude::*;

static GLOBAL_LANGUAGE: RwLock<Option<Language>> = parking_lot::const_rwlock(None);

/// Languages with a message table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
	/// Simplified Chinese; the hard-coded fallback.
	#[default]
	Zh,
	/// English.
	En,
}
impl Language {
	/// Returns a stable label suitable for configuration files.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Zh => "zh",
			Self::En => "en",
		}
	}
}
impl Display for Language {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Language {
	type Err = UnknownLanguage;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		match s {
			"zh" => Ok(Self::Zh),
			"en" => Ok(Self::En),
			other => Err(UnknownLanguage(other.to_owned())),
		}
	}
}

/// Returned when parsing a language label that has no message table.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Language `{0}` has no message table.")]
pub struct UnknownLanguage(pub String);

/// Failure categories with a catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKey {
	/// Request timed out.
	RequestTimeout,
	/// Connectivity failure, also the generic fallback.
	NetworkError,
	/// HTTP 400.
	BadRequest,
	/// HTTP 401.
	Unauthorized,
	/// HTTP 403.
	Forbidden,
	/// HTTP 404.
	NotFound,
	/// HTTP 500.
	InternalServerError,
}
impl MessageKey {
	/// Maps an HTTP status to its catalog entry, if the status has a dedicated message.
	pub const fn for_status(status: u16) -> Option<Self> {
		match status {
			400 => Some(Self::BadRequest),
			401 => Some(Self::Unauthorized),
			403 => Some(Self::Forbidden),
			404 => Some(Self::NotFound),
			408 => Some(Self::RequestTimeout),
			_ => None,
		}
	}
}

/// Looks up the message for `key` in `language`.
pub const fn message(language: Language, key: MessageKey) -> &'static str {
	match language {
		Language::Zh => match key {
			MessageKey::RequestTimeout => "请求超时，请稍后再试。",
			MessageKey::NetworkError => "网络异常，请检查您的网络连接后重试。",
			MessageKey::BadRequest => "请求错误。请检查您的输入并重试。",
			MessageKey::Unauthorized => "登录认证过期，请重新登录后继续。",
			MessageKey::Forbidden => "禁止访问, 您没有权限访问此资源。",
			MessageKey::NotFound => "未找到, 请求的资源不存在。",
			MessageKey::InternalServerError => "内部服务器错误，请稍后再试。",
		},
		Language::En => match key {
			MessageKey::RequestTimeout => "Request timeout, please try again later.",
			MessageKey::NetworkError =>
				"Network error, please check your network connection and try again.",
			MessageKey::BadRequest => "Bad request. Please check your input and try again.",
			MessageKey::Unauthorized => "Authentication expired, please log in again to continue.",
			MessageKey::Forbidden =>
				"Access forbidden, you do not have permission to access this resource.",
			MessageKey::NotFound => "Not found, the requested resource does not exist.",
			MessageKey::InternalServerError => "Internal server error, please try again later.",
		},
	}
}

/// Returns the status-specific message, if the status has one.
pub fn status_message(language: Language, status: u16) -> Option<&'static str> {
	MessageKey::for_status(status).map(|key| message(language, key))
}

/// Sets (or clears) the process-wide language.
pub fn set_global_language(language: Option<Language>) {
	*GLOBAL_LANGUAGE.write() = language;
}

/// Returns the process-wide language, if one was set.
pub fn global_language() -> Option<Language> {
	*GLOBAL_LANGUAGE.read()
}

/// Resolves the effective language: call override, then global, then `fallback`, then
/// [`Language::default`].
pub fn resolve_language(call: Option<Language>, fallback: Option<Language>) -> Language {
	call.or_else(global_language).or(fallback).unwrap_or_default()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_mapping_covers_dedicated_codes_only() {
		assert_eq!(status_message(Language::En, 404), Some(message(Language::En, MessageKey::NotFound)));
		assert_eq!(
			status_message(Language::Zh, 408),
			Some(message(Language::Zh, MessageKey::RequestTimeout))
		);
		assert_eq!(status_message(Language::En, 500), None);
		assert_eq!(status_message(Language::En, 502), None);
	}

	#[test]
	fn language_labels_parse_and_print() {
		assert_eq!("en".parse::<Language>(), Ok(Language::En));
		assert_eq!(Language::Zh.to_string(), "zh");
		assert!("fr".parse::<Language>().is_err());

		let parsed: Language =
			serde_json::from_str("\"en\"").expect("Language label should deserialize.");

		assert_eq!(parsed, Language::En);
	}

	#[test]
	fn call_override_beats_fallback() {
		// The global setting is process-wide, so this test only exercises paths that do not
		// depend on it.
		assert_eq!(resolve_language(Some(Language::En), Some(Language::Zh)), Language::En);
	}
}
