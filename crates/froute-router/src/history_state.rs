//! The state blob the router stores in each history entry.
//!
//! Layout:
//!
//! ```json
//! { "__froute": { "sid": "…", "scrollX": 0, "scrollY": 0 }, "app": null }
//! ```
//!
//! `sid` identifies the router session that wrote the entry. Entries written
//! by someone else are read back with `sid: null`, zero scroll and
//! `app: null`. A scroll offset that is missing, `null` or not a finite
//! number reads as zero without discarding the rest of the state.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Router bookkeeping kept under `__froute`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InternalHistoryState {
	/// Session id of the router that wrote the entry.
	#[serde(default)]
	pub sid: Option<String>,
	/// Horizontal scroll position.
	#[serde(rename = "scrollX", default, deserialize_with = "scroll_offset")]
	pub scroll_x: f64,
	/// Vertical scroll position.
	#[serde(rename = "scrollY", default, deserialize_with = "scroll_offset")]
	pub scroll_y: f64,
}

fn scroll_offset<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Value::deserialize(deserializer)?;
	Ok(finite_or_zero(raw.as_f64()))
}

pub(crate) fn finite_or_zero(offset: Option<f64>) -> f64 {
	offset.filter(|o| o.is_finite()).unwrap_or(0.0)
}

/// A history entry's state as the router sees it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrouteHistoryState {
	/// Router bookkeeping.
	#[serde(rename = "__froute")]
	pub froute: InternalHistoryState,
	/// Application state.
	#[serde(default)]
	pub app: Value,
}

impl FrouteHistoryState {
	/// Creates a state written by session `sid` with zero scroll.
	pub fn new(sid: Option<String>, app: Value) -> Self {
		Self {
			froute: InternalHistoryState {
				sid,
				scroll_x: 0.0,
				scroll_y: 0.0,
			},
			app,
		}
	}

	/// Reads an entry's raw state.
	///
	/// Anything without a valid `__froute` envelope is treated as foreign and
	/// normalized to the default state.
	pub fn from_value(value: Option<&Value>) -> Self {
		match value {
			Some(v) if is_froute_state(v) => serde_json::from_value(v.clone()).unwrap_or_else(|e| {
				tracing::warn!(error = %e, "malformed router history state, treating as foreign");
				Self::default()
			}),
			_ => Self::default(),
		}
	}

	/// Serializes the state for storage in a history entry.
	pub fn to_value(&self) -> Value {
		serde_json::json!({
			"__froute": {
				"sid": self.froute.sid,
				"scrollX": finite_or_zero(Some(self.froute.scroll_x)),
				"scrollY": finite_or_zero(Some(self.froute.scroll_y)),
			},
			"app": self.app,
		})
	}

	/// Returns the session id that wrote the entry.
	pub fn sid(&self) -> Option<&str> {
		self.froute.sid.as_deref()
	}
}

/// Returns `true` if `value` carries a `__froute` object.
pub fn is_froute_state(value: &Value) -> bool {
	value.get("__froute").is_some_and(Value::is_object)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_to_value_layout() {
		let state = FrouteHistoryState::new(Some("abc".to_string()), json!({ "k": 1 }));

		assert_eq!(
			state.to_value(),
			json!({
				"__froute": { "sid": "abc", "scrollX": 0.0, "scrollY": 0.0 },
				"app": { "k": 1 }
			})
		);
	}

	#[rstest]
	fn test_from_value_reads_own_state() {
		// Arrange
		let raw = json!({
			"__froute": { "sid": "s1", "scrollX": 10, "scrollY": 20.5 },
			"app": ["x"]
		});

		// Act
		let state = FrouteHistoryState::from_value(Some(&raw));

		// Assert
		assert_eq!(state.sid(), Some("s1"));
		assert_eq!(state.froute.scroll_x, 10.0);
		assert_eq!(state.froute.scroll_y, 20.5);
		assert_eq!(state.app, json!(["x"]));
	}

	#[rstest]
	#[case(None)]
	#[case(Some(json!(null)))]
	#[case(Some(json!({ "app": 1 })))]
	#[case(Some(json!({ "__froute": "nope" })))]
	fn test_foreign_state_is_normalized(#[case] raw: Option<Value>) {
		let state = FrouteHistoryState::from_value(raw.as_ref());

		assert_eq!(state, FrouteHistoryState::default());
		assert_eq!(state.sid(), None);
		assert_eq!(state.app, Value::Null);
	}

	#[rstest]
	#[case(json!(null))]
	#[case(json!("bad"))]
	#[case(json!({ "x": 1 }))]
	fn test_invalid_scroll_keeps_sid_and_app(#[case] scroll: Value) {
		// Arrange
		let raw = json!({
			"__froute": { "sid": "s1", "scrollX": scroll, "scrollY": 4 },
			"app": { "k": 1 }
		});

		// Act
		let state = FrouteHistoryState::from_value(Some(&raw));

		// Assert
		assert_eq!(state.sid(), Some("s1"));
		assert_eq!(state.froute.scroll_x, 0.0);
		assert_eq!(state.froute.scroll_y, 4.0);
		assert_eq!(state.app, json!({ "k": 1 }));
	}

	#[rstest]
	#[case(f64::NAN)]
	#[case(f64::INFINITY)]
	#[case(f64::NEG_INFINITY)]
	fn test_non_finite_scroll_is_written_as_zero(#[case] offset: f64) {
		// Arrange
		let mut state = FrouteHistoryState::new(Some("s1".to_string()), json!({ "k": 1 }));
		state.froute.scroll_x = offset;
		state.froute.scroll_y = 12.0;

		// Act
		let value = state.to_value();
		let read = FrouteHistoryState::from_value(Some(&value));

		// Assert
		assert_eq!(value["__froute"]["scrollX"], json!(0.0));
		assert_eq!(read.sid(), Some("s1"));
		assert_eq!(read.froute.scroll_x, 0.0);
		assert_eq!(read.froute.scroll_y, 12.0);
		assert_eq!(read.app, json!({ "k": 1 }));
	}

	#[rstest]
	fn test_round_trip_through_value() {
		let state = FrouteHistoryState::new(None, json!("app"));

		assert_eq!(FrouteHistoryState::from_value(Some(&state.to_value())), state);
	}

	#[rstest]
	fn test_is_froute_state() {
		assert!(is_froute_state(&json!({ "__froute": {} })));
		assert!(!is_froute_state(&json!({ "other": {} })));
		assert!(!is_froute_state(&json!(3)));
	}
}
