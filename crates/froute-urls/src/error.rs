//! Error types for route definitions and path building.

use thiserror::Error;

/// Result type for route definition operations.
pub type RouteResult<T> = Result<T, RouteError>;

/// Errors raised while defining routes or building paths from them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RouteError {
	/// Pattern string is longer than the compiler accepts.
	#[error("pattern length {length} exceeds maximum allowed length of {max} bytes")]
	PatternTooLong {
		/// Actual pattern length in bytes.
		length: usize,
		/// Maximum accepted length in bytes.
		max: usize,
	},

	/// Pattern has more segments than the compiler accepts.
	#[error("pattern has {count} path segments, exceeding maximum of {max}")]
	TooManySegments {
		/// Number of segments in the pattern.
		count: usize,
		/// Maximum accepted number of segments.
		max: usize,
	},

	/// A parameter token is not a plain identifier.
	#[error("invalid parameter name '{name}' in pattern '{pattern}'")]
	InvalidParamName {
		/// Pattern being compiled.
		pattern: String,
		/// Offending parameter name.
		name: String,
	},

	/// The same parameter name appears twice in one route.
	#[error("duplicate parameter '{name}' in pattern '{pattern}'")]
	DuplicateParam {
		/// Pattern being compiled.
		pattern: String,
		/// Repeated parameter name.
		name: String,
	},

	/// A literal segment follows an optional parameter.
	#[error("literal segment '{segment}' follows an optional parameter in pattern '{pattern}'")]
	LiteralAfterOptional {
		/// Pattern being compiled.
		pattern: String,
		/// Offending literal segment.
		segment: String,
	},

	/// The generated regex failed to compile.
	#[error("failed to compile pattern regex: {0}")]
	InvalidRegex(String),

	/// A required parameter was not supplied when building a path.
	#[error("missing parameter '{name}' for pattern '{pattern}'")]
	MissingParameter {
		/// Pattern being filled.
		pattern: String,
		/// Missing parameter name.
		name: String,
	},
}
