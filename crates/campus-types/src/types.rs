//! Common types used throughout the Campus platform.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_with::skip_serializing_none;
use std::time::SystemTime;

// UserId //
//********//
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl Serialize for UserId {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_i64(self.0)
	}
}

impl<'de> Deserialize<'de> for UserId {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		Ok(UserId(i64::deserialize(deserializer)?))
	}
}

// Timestamp //
//***********//
/// Unix timestamp in seconds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn now() -> Timestamp {
		let res = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
		Timestamp(res.as_secs() as i64)
	}

	pub fn from_now(seconds: i64) -> Timestamp {
		Timestamp::now().add_seconds(seconds)
	}

	pub fn add_seconds(self, seconds: i64) -> Timestamp {
		Timestamp(self.0 + seconds)
	}

	/// RFC 3339 representation (UTC)
	pub fn to_iso_string(self) -> String {
		chrono::DateTime::from_timestamp(self.0, 0)
			.map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
			.unwrap_or_default()
	}

	pub fn parse_iso(s: &str) -> Option<Timestamp> {
		chrono::DateTime::parse_from_rfc3339(s)
			.ok()
			.map(|dt| Timestamp(dt.timestamp()))
			.or_else(|| {
				// Naive local form sent by HTML datetime inputs ("2025-05-01T10:00[:00]")
				chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
					.or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
					.ok()
					.map(|dt| Timestamp(dt.and_utc().timestamp()))
			})
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl Serialize for Timestamp {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_i64(self.0)
	}
}

impl<'de> Deserialize<'de> for Timestamp {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum Repr {
			Secs(i64),
			Iso(String),
		}

		match Repr::deserialize(deserializer)? {
			Repr::Secs(secs) => Ok(Timestamp(secs)),
			Repr::Iso(s) => Timestamp::parse_iso(&s)
				.ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s))),
		}
	}
}

pub fn serialize_timestamp_iso<S>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	serializer.serialize_str(&ts.to_iso_string())
}

pub fn serialize_timestamp_iso_opt<S>(
	ts: &Option<Timestamp>,
	serializer: S,
) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	match ts {
		Some(ts) => serializer.serialize_str(&ts.to_iso_string()),
		None => serializer.serialize_none(),
	}
}

// Patch //
//*******//
/// Tri-state field for partial updates.
///
/// Missing from the request body → `Undefined` (needs `#[serde(default)]`),
/// explicit `null` → `Null`, anything else → `Value`.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Patch<T> {
	#[default]
	Undefined,
	Null,
	Value(T),
}

impl<T> Patch<T> {
	pub fn is_undefined(&self) -> bool {
		matches!(self, Patch::Undefined)
	}

	pub fn as_ref(&self) -> Patch<&T> {
		match self {
			Patch::Undefined => Patch::Undefined,
			Patch::Null => Patch::Null,
			Patch::Value(v) => Patch::Value(v),
		}
	}

	pub fn value(&self) -> Option<&T> {
		match self {
			Patch::Value(v) => Some(v),
			_ => None,
		}
	}
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
	T: Deserialize<'de>,
{
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		Ok(match Option::<T>::deserialize(deserializer)? {
			Some(v) => Patch::Value(v),
			None => Patch::Null,
		})
	}
}

// ApiResponse //
//*************//
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
	pub offset: u32,
	pub limit: u32,
	pub total: u32,
}

/// Envelope for every successful API response
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
	pub data: T,
	pub pagination: Option<PaginationInfo>,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub time: Timestamp,
	pub req_id: Option<String>,
}

impl<T> ApiResponse<T> {
	pub fn new(data: T) -> Self {
		Self { data, pagination: None, time: Timestamp::now(), req_id: None }
	}

	pub fn with_pagination(data: T, offset: u32, limit: u32, total: u32) -> Self {
		Self {
			data,
			pagination: Some(PaginationInfo { offset, limit, total }),
			time: Timestamp::now(),
			req_id: None,
		}
	}

	pub fn with_req_id(mut self, req_id: String) -> Self {
		if !req_id.is_empty() {
			self.req_id = Some(req_id);
		}
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Deserialize)]
	struct Update {
		#[serde(default)]
		bio: Patch<String>,
		#[serde(default)]
		name: Patch<String>,
		#[serde(default)]
		email: Patch<String>,
	}

	#[test]
	fn test_patch_tristate() {
		let upd: Update = serde_json::from_str(r#"{"bio": null, "name": "Ana"}"#).unwrap();
		assert_eq!(upd.bio, Patch::Null);
		assert_eq!(upd.name, Patch::Value("Ana".to_string()));
		assert!(upd.email.is_undefined());
	}

	#[test]
	fn test_timestamp_accepts_iso_and_secs() {
		let ts: Timestamp = serde_json::from_str("1700000000").unwrap();
		assert_eq!(ts, Timestamp(1_700_000_000));
		let ts: Timestamp = serde_json::from_str(r#""2023-11-14T22:13:20Z""#).unwrap();
		assert_eq!(ts, Timestamp(1_700_000_000));
		let ts: Timestamp = serde_json::from_str(r#""2023-11-14T22:13""#).unwrap();
		assert_eq!(ts, Timestamp(1_699_999_980));
		assert!(serde_json::from_str::<Timestamp>(r#""yesterday""#).is_err());
	}

	#[test]
	fn test_timestamp_iso_roundtrip() {
		assert_eq!(Timestamp(0).to_iso_string(), "1970-01-01T00:00:00Z");
		assert_eq!(Timestamp::parse_iso("1970-01-01T00:01:00Z"), Some(Timestamp(60)));
	}

	#[test]
	fn test_api_response_req_id() {
		let res = ApiResponse::new(1).with_req_id(String::new());
		assert!(res.req_id.is_none());
		let res = ApiResponse::new(1).with_req_id("abc".into());
		assert_eq!(res.req_id.as_deref(), Some("abc"));
	}
}

// vim: ts=4
