//! Route definitions.
//!
//! Routes are declared with [`route_of`] and a chain of builder calls:
//!
//! ```
//! use froute_urls::{ActorDef, route_of};
//!
//! let user = route_of("/users/:id").build();
//! let post = route_of("/users")
//! 	.param("user_id")
//! 	.path("posts")
//! 	.param("post_id")
//! 	.state(|| serde_json::json!({ "tab": "comments" }))
//! 	.action(ActorDef::new(|| "PostPage"));
//!
//! assert_eq!(user.to_path(), "/users/:id");
//! assert_eq!(post.to_path(), "/users/:user_id/posts/:post_id");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::actor::{Actor, ActorDef};
use crate::error::RouteResult;
use crate::href::{ParsedQuery, parse_query, split_url};
use crate::pattern::PathPattern;

/// Produces the initial app state for a new history entry of a route.
pub type StateFactory = Arc<dyn Fn() -> Value + Send + Sync>;

/// Starts a route definition from a pathname pattern.
///
/// Accepts `/fragment`, `/fragment/:param` and `/fragment/:param?`.
pub fn route_of(path: &str) -> RouteDefiner {
	RouteDefiner::new(path)
}

/// Starts a route definition from a leading fragment.
#[deprecated(note = "use `route_of` instead")]
pub fn route_by(path: &str) -> RouteDefiner {
	RouteDefiner::new(path)
}

/// Builder for a [`RouteDefinition`].
///
/// Segments accumulate as written and are validated when the route is
/// finished with [`build`](Self::build) or [`action`](Self::action).
#[derive(Clone)]
pub struct RouteDefiner {
	stack: Vec<String>,
	state_factory: Option<StateFactory>,
}

impl RouteDefiner {
	fn new(path: &str) -> Self {
		Self {
			stack: vec![path.trim_start_matches('/').to_string()],
			state_factory: None,
		}
	}

	/// Appends a required parameter segment `:name`.
	pub fn param(mut self, name: &str) -> Self {
		self.stack.push(format!(":{}", name));
		self
	}

	/// Appends one or more literal segments.
	pub fn path(mut self, path: &str) -> Self {
		self.stack.push(path.trim_start_matches('/').to_string());
		self
	}

	/// Attaches the initial-state factory.
	pub fn state<F>(mut self, factory: F) -> Self
	where
		F: Fn() -> Value + Send + Sync + 'static,
	{
		self.state_factory = Some(Arc::new(factory));
		self
	}

	/// Returns the pattern accumulated so far.
	pub fn to_path(&self) -> String {
		format!("/{}", self.stack.join("/"))
	}

	/// Finishes the route without an actor.
	///
	/// # Errors
	///
	/// Returns a [`RouteError`](crate::RouteError) when the accumulated
	/// pattern is invalid.
	pub fn try_build(self) -> RouteResult<Arc<RouteDefinition>> {
		self.finish(None)
	}

	/// Finishes the route without an actor.
	///
	/// # Panics
	///
	/// Panics if the accumulated pattern is invalid (bad parameter name,
	/// duplicate parameter, literal after an optional parameter, or pattern
	/// limits). Use [`try_build`](Self::try_build) for fallible construction.
	pub fn build(self) -> Arc<RouteDefinition> {
		let path = self.to_path();
		self.try_build()
			.unwrap_or_else(|e| panic!("Invalid route pattern '{}': {}", path, e))
	}

	/// Attaches an actor and finishes the route.
	///
	/// # Errors
	///
	/// Returns a [`RouteError`](crate::RouteError) when the accumulated
	/// pattern is invalid.
	pub fn try_action(self, actor: ActorDef) -> RouteResult<Arc<RouteDefinition>> {
		self.finish(Some(actor.into_actor()))
	}

	/// Attaches an actor and finishes the route.
	///
	/// # Panics
	///
	/// Panics if the accumulated pattern is invalid.
	/// Use [`try_action`](Self::try_action) for fallible construction.
	pub fn action(self, actor: ActorDef) -> Arc<RouteDefinition> {
		let path = self.to_path();
		self.try_action(actor)
			.unwrap_or_else(|e| panic!("Invalid route pattern '{}': {}", path, e))
	}

	fn finish(self, actor: Option<Actor>) -> RouteResult<Arc<RouteDefinition>> {
		let pattern = PathPattern::new(&self.to_path())?;
		Ok(Arc::new(RouteDefinition {
			pattern,
			state_factory: self.state_factory,
			actor,
		}))
	}
}

impl fmt::Debug for RouteDefiner {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouteDefiner")
			.field("path", &self.to_path())
			.field("has_state", &self.state_factory.is_some())
			.finish()
	}
}

/// Result of matching a URL against a single route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
	/// The matched pathname.
	pub path: String,
	/// Decoded path parameters.
	pub params: HashMap<String, String>,
	/// Parsed query string.
	pub query: ParsedQuery,
	/// Raw search string including `?`, or empty.
	pub search: String,
}

/// An immutable, compiled route.
pub struct RouteDefinition {
	pattern: PathPattern,
	state_factory: Option<StateFactory>,
	actor: Option<Actor>,
}

impl RouteDefinition {
	/// Returns the route pattern, always starting with `/`.
	pub fn to_path(&self) -> &str {
		self.pattern.pattern()
	}

	/// Returns the compiled pattern.
	pub fn pattern(&self) -> &PathPattern {
		&self.pattern
	}

	/// Matches a URL against this route.
	///
	/// Query and hash are stripped before matching the pathname.
	pub fn matches(&self, url: &str) -> Option<MatchResult> {
		let parts = split_url(url);
		let matched = self.pattern.matches(&parts.pathname)?;

		Some(MatchResult {
			path: matched.path,
			params: matched.params,
			query: parse_query(&parts.search),
			search: parts.search,
		})
	}

	/// Creates the initial app state, or `null` without a state factory.
	pub fn create_state(&self) -> Value {
		self.state_factory
			.as_ref()
			.map(|factory| factory())
			.unwrap_or(Value::Null)
	}

	/// Returns the route's actor.
	pub fn actor(&self) -> Option<&Actor> {
		self.actor.as_ref()
	}
}

impl fmt::Debug for RouteDefinition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouteDefinition")
			.field("pattern", &self.pattern.pattern())
			.field("has_state", &self.state_factory.is_some())
			.field("actor", &self.actor)
			.finish()
	}
}

/// Routes keyed by name, kept in declaration order.
///
/// Resolution tries routes in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct Routes {
	entries: Vec<(String, Arc<RouteDefinition>)>,
}

impl Routes {
	/// Creates an empty route table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a route (builder style).
	pub fn route(mut self, name: impl Into<String>, route: Arc<RouteDefinition>) -> Self {
		self.insert(name, route);
		self
	}

	/// Adds a route, replacing an existing one with the same name in place.
	pub fn insert(&mut self, name: impl Into<String>, route: Arc<RouteDefinition>) {
		let name = name.into();
		match self.entries.iter_mut().find(|(n, _)| *n == name) {
			Some(entry) => entry.1 = route,
			None => self.entries.push((name, route)),
		}
	}

	/// Looks a route up by name.
	pub fn get(&self, name: &str) -> Option<&Arc<RouteDefinition>> {
		self.entries
			.iter()
			.find(|(n, _)| n == name)
			.map(|(_, route)| route)
	}

	/// Iterates `(name, route)` pairs in declaration order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<RouteDefinition>)> {
		self.entries.iter().map(|(n, r)| (n.as_str(), r))
	}

	/// Returns the number of routes.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns `true` if there are no routes.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl<N: Into<String>> FromIterator<(N, Arc<RouteDefinition>)> for Routes {
	fn from_iter<I: IntoIterator<Item = (N, Arc<RouteDefinition>)>>(iter: I) -> Self {
		let mut routes = Routes::new();
		for (name, route) in iter {
			routes.insert(name, route);
		}
		routes
	}
}
