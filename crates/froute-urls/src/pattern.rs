//! Path pattern compilation, matching and reversal.
//!
//! Patterns are `/`-separated segments where each segment is either a
//! literal, a required parameter `:name`, or an optional parameter
//! `:name?`:
//!
//! - `/users` - exact match
//! - `/users/:id` - one required parameter
//! - `/posts/:year/:slug?` - a required and an optional parameter
//!
//! Matching is case-insensitive and accepts one optional trailing
//! delimiter. A parameter captures a single non-empty segment that does not
//! contain `/`, `#` or `?`. Captured values are percent-decoded; a capture
//! that does not decode to valid UTF-8 makes the whole pattern fail to match.

use std::collections::{HashMap, HashSet};
use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::error::{RouteError, RouteResult};

/// Maximum allowed length for a pattern string in bytes.
const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum allowed number of path segments in a pattern.
const MAX_PATH_SEGMENTS: usize = 32;

/// Maximum allowed size for a compiled pattern regex (in bytes).
const MAX_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// Characters a parameter value may not contain.
const PARAM_CLASS: &str = "[^/#?]+?";

/// One segment of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
	/// A literal path segment matched verbatim (case-insensitively).
	Literal(String),
	/// A named parameter.
	Param {
		/// Parameter name.
		name: String,
		/// Whether the segment may be absent.
		optional: bool,
	},
}

impl Segment {
	/// Parses a single raw segment such as `users`, `:id` or `:tab?`.
	fn parse(raw: &str, pattern: &str) -> RouteResult<Self> {
		let Some(rest) = raw.strip_prefix(':') else {
			return Ok(Segment::Literal(raw.to_string()));
		};

		let (name, optional) = match rest.strip_suffix('?') {
			Some(name) => (name, true),
			None => (rest, false),
		};

		if !is_identifier(name) {
			return Err(RouteError::InvalidParamName {
				pattern: pattern.to_string(),
				name: name.to_string(),
			});
		}

		Ok(Segment::Param {
			name: name.to_string(),
			optional,
		})
	}
}

impl fmt::Display for Segment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Segment::Literal(lit) => f.write_str(lit),
			Segment::Param {
				name,
				optional: true,
			} => write!(f, ":{}?", name),
			Segment::Param { name, .. } => write!(f, ":{}", name),
		}
	}
}

/// Returns `true` if `name` is `[A-Za-z_][A-Za-z0-9_]*`.
pub(crate) fn is_identifier(name: &str) -> bool {
	let mut chars = name.chars();
	match chars.next() {
		Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
		_ => return false,
	}
	chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Result of matching a pathname against a [`PathPattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
	/// The portion of the pathname that matched.
	pub path: String,
	/// Decoded parameter values. Absent optional parameters are omitted.
	pub params: HashMap<String, String>,
}

/// A compiled path pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
	/// Normalized pattern string (always starts with `/`).
	pattern: String,
	segments: Vec<Segment>,
	regex: Regex,
	param_names: Vec<String>,
}

impl PathPattern {
	/// Compiles a pattern string.
	///
	/// Empty segments are dropped, so `/users/` and `users` both compile to
	/// `/users`.
	///
	/// # Errors
	///
	/// - [`RouteError::PatternTooLong`] when the pattern exceeds 1024 bytes
	/// - [`RouteError::TooManySegments`] when it has more than 32 segments
	/// - [`RouteError::InvalidParamName`] for non-identifier parameter names
	/// - [`RouteError::DuplicateParam`] when a name is used twice
	/// - [`RouteError::LiteralAfterOptional`] when a literal follows `:name?`
	/// - [`RouteError::InvalidRegex`] if the generated regex is rejected
	pub fn new(pattern: &str) -> RouteResult<Self> {
		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(RouteError::PatternTooLong {
				length: pattern.len(),
				max: MAX_PATTERN_LENGTH,
			});
		}

		let raw_segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
		if raw_segments.len() > MAX_PATH_SEGMENTS {
			return Err(RouteError::TooManySegments {
				count: raw_segments.len(),
				max: MAX_PATH_SEGMENTS,
			});
		}

		let mut segments = Vec::with_capacity(raw_segments.len());
		let mut seen = HashSet::new();
		let mut after_optional = false;

		for raw in raw_segments {
			let segment = Segment::parse(raw, pattern)?;
			match &segment {
				Segment::Literal(lit) if after_optional => {
					return Err(RouteError::LiteralAfterOptional {
						pattern: pattern.to_string(),
						segment: lit.clone(),
					});
				}
				Segment::Literal(_) => {}
				Segment::Param { name, optional } => {
					if !seen.insert(name.clone()) {
						return Err(RouteError::DuplicateParam {
							pattern: pattern.to_string(),
							name: name.clone(),
						});
					}
					after_optional |= *optional;
				}
			}
			segments.push(segment);
		}

		Self::from_segments(segments)
	}

	fn from_segments(segments: Vec<Segment>) -> RouteResult<Self> {
		let regex_str = Self::compile_regex(&segments);
		tracing::trace!(regex = %regex_str, "compiled path pattern");

		let regex = RegexBuilder::new(&regex_str)
			.case_insensitive(true)
			.size_limit(MAX_REGEX_SIZE)
			.build()
			.map_err(|e| RouteError::InvalidRegex(e.to_string()))?;

		let param_names = segments
			.iter()
			.filter_map(|s| match s {
				Segment::Param { name, .. } => Some(name.clone()),
				Segment::Literal(_) => None,
			})
			.collect();

		let pattern = if segments.is_empty() {
			"/".to_string()
		} else {
			segments.iter().map(|s| format!("/{}", s)).collect()
		};

		Ok(Self {
			pattern,
			segments,
			regex,
			param_names,
		})
	}

	/// Builds the anchored regex for a segment list.
	fn compile_regex(segments: &[Segment]) -> String {
		let mut regex_str = String::from("^");

		for segment in segments {
			match segment {
				Segment::Literal(lit) => {
					regex_str.push('/');
					regex_str.push_str(&regex::escape(lit));
				}
				Segment::Param {
					name,
					optional: false,
				} => {
					regex_str.push_str(&format!("/(?P<{}>{})", name, PARAM_CLASS));
				}
				Segment::Param {
					name,
					optional: true,
				} => {
					regex_str.push_str(&format!("(?:/(?P<{}>{}))?", name, PARAM_CLASS));
				}
			}
		}

		// Optional trailing delimiter
		regex_str.push_str("[/#?]?$");
		regex_str
	}

	/// Returns the normalized pattern string.
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// Returns the compiled segments.
	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	/// Returns the parameter names in declaration order.
	pub fn param_names(&self) -> &[String] {
		&self.param_names
	}

	/// Returns whether the pattern has no parameters.
	pub fn is_exact(&self) -> bool {
		self.param_names.is_empty()
	}

	/// Checks whether `pathname` matches structurally, without decoding.
	pub fn is_match(&self, pathname: &str) -> bool {
		self.regex.is_match(pathname)
	}

	/// Matches a pathname and returns the decoded parameters.
	///
	/// `pathname` must already be stripped of query and hash.
	pub fn matches(&self, pathname: &str) -> Option<PatternMatch> {
		let caps = self.regex.captures(pathname)?;
		let whole = caps.get(0)?;

		let mut params = HashMap::with_capacity(self.param_names.len());
		for name in &self.param_names {
			if let Some(m) = caps.name(name) {
				params.insert(name.clone(), decode_component(m.as_str())?);
			}
		}

		Some(PatternMatch {
			path: whole.as_str().to_string(),
			params,
		})
	}

	/// Fills the pattern with percent-encoded parameter values.
	///
	/// Optional parameters that are missing or empty are left out. An empty
	/// result is returned as `/`.
	///
	/// # Errors
	///
	/// Returns [`RouteError::MissingParameter`] when a required parameter is
	/// absent or empty.
	pub fn reverse(&self, params: &HashMap<String, String>) -> RouteResult<String> {
		let mut result = String::new();

		for segment in &self.segments {
			match segment {
				Segment::Literal(lit) => {
					result.push('/');
					result.push_str(lit);
				}
				Segment::Param { name, optional } => {
					match params.get(name).filter(|v| !v.is_empty()) {
						Some(value) => {
							result.push('/');
							result.push_str(&urlencoding::encode(value));
						}
						None if *optional => {}
						None => {
							return Err(RouteError::MissingParameter {
								pattern: self.pattern.clone(),
								name: name.clone(),
							});
						}
					}
				}
			}
		}

		if result.is_empty() {
			result.push('/');
		}
		Ok(result)
	}
}

/// Percent-decodes one captured component.
///
/// Returns `None` for malformed escapes or bytes that are not UTF-8.
fn decode_component(raw: &str) -> Option<String> {
	let bytes = raw.as_bytes();
	let mut i = 0;
	while i < bytes.len() {
		if bytes[i] == b'%' {
			let valid = bytes
				.get(i + 1..i + 3)
				.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
			if !valid {
				return None;
			}
			i += 3;
		} else {
			i += 1;
		}
	}

	urlencoding::decode(raw).ok().map(|s| s.into_owned())
}

impl PartialEq for PathPattern {
	fn eq(&self, other: &Self) -> bool {
		self.pattern == other.pattern
	}
}

impl Eq for PathPattern {}

impl fmt::Display for PathPattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.pattern)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}

	#[rstest]
	#[case("/users", "/users", true)]
	#[case("/users", "/users/", true)]
	#[case("/users", "/USERS", true)]
	#[case("/users", "/users/1", false)]
	#[case("/users/:id", "/users/1", true)]
	#[case("/users/:id", "/users/", false)]
	#[case("/users/:id", "/users", false)]
	#[case("/users/:id", "/users/1/2", false)]
	#[case("/posts/:slug?", "/posts", true)]
	#[case("/posts/:slug?", "/posts/hello", true)]
	#[case("/", "/", true)]
	#[case("/", "/a", false)]
	fn test_is_match(#[case] pattern: &str, #[case] path: &str, #[case] expected: bool) {
		let pattern = PathPattern::new(pattern).unwrap();
		assert_eq!(pattern.is_match(path), expected);
	}

	#[rstest]
	fn test_normalized_pattern() {
		assert_eq!(PathPattern::new("users//:id/").unwrap().pattern(), "/users/:id");
		assert_eq!(PathPattern::new("").unwrap().pattern(), "/");
		assert_eq!(PathPattern::new("/").unwrap().to_string(), "/");
	}

	#[rstest]
	fn test_matches_extracts_params() {
		// Arrange
		let pattern = PathPattern::new("/users/:user_id/posts/:post_id").unwrap();

		// Act
		let result = pattern.matches("/users/42/posts/7").unwrap();

		// Assert
		assert_eq!(result.path, "/users/42/posts/7");
		assert_eq!(result.params, params(&[("user_id", "42"), ("post_id", "7")]));
	}

	#[rstest]
	fn test_absent_optional_is_omitted() {
		let pattern = PathPattern::new("/posts/:year/:slug?").unwrap();

		let result = pattern.matches("/posts/2020").unwrap();

		assert_eq!(result.params, params(&[("year", "2020")]));
	}

	#[rstest]
	#[case("/users/%E3%81%82", "あ")]
	#[case("/users/%23sharp", "#sharp")]
	#[case("/users/..", "..")]
	#[case("/users/a%20b", "a b")]
	fn test_matches_decodes(#[case] path: &str, #[case] expected: &str) {
		let pattern = PathPattern::new("/users/:id").unwrap();

		let result = pattern.matches(path).unwrap();

		assert_eq!(result.params.get("id").map(String::as_str), Some(expected));
	}

	#[rstest]
	#[case("/users/%E3%81")]
	#[case("/users/%zz")]
	#[case("/users/%")]
	fn test_undecodable_capture_does_not_match(#[case] path: &str) {
		let pattern = PathPattern::new("/users/:id").unwrap();

		assert!(pattern.is_match(path));
		assert!(pattern.matches(path).is_none());
	}

	#[rstest]
	fn test_literal_is_escaped() {
		let pattern = PathPattern::new("/api/v1.0").unwrap();
		assert!(pattern.is_match("/api/v1.0"));
		assert!(!pattern.is_match("/api/v1X0"));
	}

	#[rstest]
	#[case("/users/:1d")]
	#[case("/users/:")]
	#[case("/users/:a-b")]
	fn test_rejects_invalid_param_name(#[case] pattern: &str) {
		let result = PathPattern::new(pattern);
		assert!(matches!(result, Err(RouteError::InvalidParamName { .. })));
	}

	#[rstest]
	fn test_rejects_duplicate_param() {
		let result = PathPattern::new("/a/:id/b/:id");
		assert_eq!(
			result.unwrap_err(),
			RouteError::DuplicateParam {
				pattern: "/a/:id/b/:id".to_string(),
				name: "id".to_string(),
			}
		);
	}

	#[rstest]
	fn test_rejects_literal_after_optional() {
		assert!(matches!(
			PathPattern::new("/a/:tab?/edit"),
			Err(RouteError::LiteralAfterOptional { .. })
		));
		// Parameters may still follow
		assert!(PathPattern::new("/a/:tab?/:sub?").is_ok());
	}

	#[rstest]
	fn test_rejects_excessive_length() {
		// Arrange
		let long_pattern = "/".to_string() + &"a".repeat(1025);

		// Act
		let result = PathPattern::new(&long_pattern);

		// Assert
		assert!(matches!(result, Err(RouteError::PatternTooLong { .. })));
	}

	#[rstest]
	fn test_rejects_excessive_segments() {
		let segments: Vec<&str> = (0..35).map(|_| "seg").collect();
		let pattern = format!("/{}/", segments.join("/"));

		let result = PathPattern::new(&pattern);

		assert!(matches!(result, Err(RouteError::TooManySegments { count: 35, .. })));
	}

	#[rstest]
	fn test_reverse() {
		let pattern = PathPattern::new("/users/:id/tab/:tab?").unwrap();

		assert_eq!(pattern.reverse(&params(&[("id", "1")])).unwrap(), "/users/1/tab");
		assert_eq!(
			pattern.reverse(&params(&[("id", "a b"), ("tab", "x/y")])).unwrap(),
			"/users/a%20b/tab/x%2Fy"
		);
	}

	#[rstest]
	fn test_reverse_missing_param() {
		let pattern = PathPattern::new("/users/:id").unwrap();

		let result = pattern.reverse(&HashMap::new());

		assert!(matches!(result, Err(RouteError::MissingParameter { name, .. }) if name == "id"));
	}

	#[rstest]
	fn test_reverse_then_match() {
		let pattern = PathPattern::new("/files/:name").unwrap();
		let original = params(&[("name", "日本語 #1?")]);

		let path = pattern.reverse(&original).unwrap();

		assert_eq!(pattern.matches(&path).unwrap().params, original);
	}

	#[rstest]
	fn test_pattern_equality() {
		let p1 = PathPattern::new("/users/:id").unwrap();
		let p2 = PathPattern::new("users/:id/").unwrap();
		let p3 = PathPattern::new("/users/:user_id").unwrap();

		assert_eq!(p1, p2);
		assert_ne!(p1, p3);
		assert!(!p1.is_exact());
		assert!(PathPattern::new("/about").unwrap().is_exact());
	}
}
