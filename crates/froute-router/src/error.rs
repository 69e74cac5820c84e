//! Router error types.

use froute_urls::RouteError;
use thiserror::Error;

/// Result type for router operations.
pub type RouterResult<T> = Result<T, RouterError>;

/// Errors surfaced by the navigation controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RouterError {
	/// No location has been committed yet.
	#[error("router has no current location; navigate before reading it")]
	MissingLocation,

	/// A before-route-change listener is already registered.
	#[error(
		"a before-route-change listener is already set; clear it before setting another one"
	)]
	DuplicateBeforeRouteListener,

	/// Component loading or the route's preload failed.
	#[error("preload failed for '{pathname}': {source}")]
	Preload {
		/// Pathname being navigated to.
		pathname: String,
		/// Underlying failure.
		#[source]
		source: anyhow::Error,
	},

	/// Route definition or path building error.
	#[error(transparent)]
	Route(#[from] RouteError),

	/// The router has been disposed.
	#[error("router has been disposed")]
	Disposed,
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::error::Error as _;

	#[rstest]
	fn test_preload_error_keeps_source() {
		// Arrange
		let err = RouterError::Preload {
			pathname: "/users/1".to_string(),
			source: anyhow::anyhow!("network down"),
		};

		// Act
		let message = err.to_string();
		let source = err.source().map(ToString::to_string);

		// Assert
		assert_eq!(message, "preload failed for '/users/1': network down");
		assert_eq!(source.as_deref(), Some("network down"));
	}

	#[rstest]
	fn test_route_error_converts() {
		let err: RouterError = RouteError::MissingParameter {
			pattern: "/users/:id".to_string(),
			name: "id".to_string(),
		}
		.into();

		assert!(matches!(err, RouterError::Route(_)));
		assert_eq!(err.to_string(), "missing parameter 'id' for pattern '/users/:id'");
	}
}
