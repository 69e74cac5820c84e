//! Route resolution: first-match over ordered routes plus an optional
//! resolver hook.
//!
//! Resolution tries routes in declaration order and takes the first
//! structural match. A [`RouteResolver`] may then rewrite, veto or
//! substitute that match. Resolvers see a [`RoutingContext`] through which
//! they can signal a status code or redirect and re-enter resolution.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::route::{MatchResult, RouteDefinition, Routes};
use crate::href::{ParsedQuery, split_url};

/// A route together with the result of matching it.
#[derive(Debug, Clone)]
pub struct FrouteMatch {
	/// The matched route.
	pub route: Arc<RouteDefinition>,
	/// Decoded path parameters.
	pub params: HashMap<String, String>,
	/// Parsed query string.
	pub query: ParsedQuery,
	/// The matched pathname.
	pub path: String,
	/// Raw search string including `?`, or empty.
	pub search: String,
}

impl FrouteMatch {
	/// Builds a match from a route and its per-route match result.
	pub fn new(route: Arc<RouteDefinition>, result: MatchResult) -> Self {
		Self {
			route,
			params: result.params,
			query: result.query,
			path: result.path,
			search: result.search,
		}
	}

	/// Returns a path parameter.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.params.get(name).map(String::as_str)
	}

	/// Returns `true` if this match is for `route` (by identity).
	pub fn is_route(&self, route: &Arc<RouteDefinition>) -> bool {
		Arc::ptr_eq(&self.route, route)
	}
}

/// The routing-only view of a router handed to resolvers.
///
/// Status and redirect written here are copied back into the router once
/// resolution finishes.
pub struct RoutingContext<'a> {
	routes: &'a Routes,
	status_code: u16,
	redirect_to: Option<String>,
}

impl<'a> RoutingContext<'a> {
	/// Creates a context with status `200` and no redirect.
	pub fn new(routes: &'a Routes) -> Self {
		Self::with_status(routes, 200, None)
	}

	/// Creates a context seeded with a router's current status and redirect.
	pub fn with_status(routes: &'a Routes, status_code: u16, redirect_to: Option<String>) -> Self {
		Self {
			routes,
			status_code,
			redirect_to,
		}
	}

	/// Returns the routes resolution runs over.
	pub fn routes(&self) -> &'a Routes {
		self.routes
	}

	/// Returns the status code.
	pub fn status_code(&self) -> u16 {
		self.status_code
	}

	/// Sets the status code.
	pub fn set_status_code(&mut self, status_code: u16) {
		self.status_code = status_code;
	}

	/// Returns the redirect target.
	pub fn redirect_to(&self) -> Option<&str> {
		self.redirect_to.as_deref()
	}

	/// Sets or clears the redirect target.
	pub fn set_redirect_to(&mut self, redirect_to: Option<String>) {
		self.redirect_to = redirect_to;
	}

	/// Resolves `url` against the routes without running any resolver.
	pub fn resolve_route(&self, url: &str) -> Option<FrouteMatch> {
		first_match(&split_url(url).href(), self.routes.iter().map(|(_, r)| r))
	}

	/// Consumes the context, returning the status code and redirect.
	pub fn into_parts(self) -> (u16, Option<String>) {
		(self.status_code, self.redirect_to)
	}
}

impl fmt::Debug for RoutingContext<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RoutingContext")
			.field("routes_count", &self.routes.len())
			.field("status_code", &self.status_code)
			.field("redirect_to", &self.redirect_to)
			.finish()
	}
}

/// Post-processes the raw match for a URL.
///
/// Receives the normalized URL (pathname, search and hash), the first
/// structural match if any, and the routing context. Its return value is
/// the resolution result.
pub type RouteResolver =
	Arc<dyn Fn(&str, Option<FrouteMatch>, &mut RoutingContext<'_>) -> Option<FrouteMatch> + Send + Sync>;

/// Wraps a closure as a [`RouteResolver`].
pub fn route_resolver<F>(resolver: F) -> RouteResolver
where
	F: Fn(&str, Option<FrouteMatch>, &mut RoutingContext<'_>) -> Option<FrouteMatch>
		+ Send
		+ Sync
		+ 'static,
{
	Arc::new(resolver)
}

fn first_match<'r>(
	url: &str,
	routes: impl IntoIterator<Item = &'r Arc<RouteDefinition>>,
) -> Option<FrouteMatch> {
	routes.into_iter().find_map(|route| {
		route
			.matches(url)
			.map(|result| FrouteMatch::new(Arc::clone(route), result))
	})
}

/// Resolves `url` against `routes` with a standalone routing context.
///
/// Routes are tried in declaration order and the first match wins.
pub fn match_by_routes(
	url: &str,
	routes: &Routes,
	resolver: Option<&RouteResolver>,
) -> Option<FrouteMatch> {
	let mut context = RoutingContext::new(routes);
	match_by_routes_with(url, resolver, &mut context)
}

/// Resolves `url` against the context's routes, letting the resolver write
/// status and redirect into `context`.
pub fn match_by_routes_with(
	url: &str,
	resolver: Option<&RouteResolver>,
	context: &mut RoutingContext<'_>,
) -> Option<FrouteMatch> {
	let url = split_url(url).href();
	let matched = first_match(&url, context.routes().iter().map(|(_, r)| r));

	tracing::debug!(
		url = %url,
		route = ?matched.as_ref().map(|m| m.route.to_path()),
		"resolved route"
	);

	match resolver {
		Some(resolver) => resolver(&url, matched, context),
		None => matched,
	}
}

/// Resolves `url` against a single route.
pub fn is_match_to_route(
	url: &str,
	route: &Arc<RouteDefinition>,
	resolver: Option<&RouteResolver>,
) -> Option<FrouteMatch> {
	let routes = Routes::new().route("route", Arc::clone(route));
	match_by_routes(url, &routes, resolver)
}
