//! Route definitions and URL resolution for the froute client-side router.
//!
//! This crate holds everything that can be decided from a URL alone:
//!
//! - **Route definitions**: [`route_of`] builds an immutable
//!   [`RouteDefinition`] from a `/`-separated pattern with `:name` and
//!   `:name?` parameters, an optional initial-state factory, and an optional
//!   [`Actor`] (component loader plus preload hook)
//! - **Path matching and building**: [`PathPattern`] compiles patterns into a
//!   case-insensitive matcher; [`build_path`] fills a route with parameters
//!   and a query
//! - **Resolution**: [`match_by_routes`] finds the first matching route in
//!   declaration order and passes it through an optional [`RouteResolver`];
//!   [`combine_route_resolver`] chains resolvers for aliasing, redirects or
//!   locale prefixes
//!
//! Navigation, history and events live in `froute-router`.
//!
//! # Quick Start
//!
//! ```
//! use froute_urls::prelude::*;
//!
//! let routes = Routes::new()
//! 	.route("usersShow", route_of("/users/:id").build())
//! 	.route("about", route_of("/about").build());
//!
//! let matched = match_by_routes("/users/42?tab=posts", &routes, None).unwrap();
//! assert_eq!(matched.param("id"), Some("42"));
//! assert_eq!(matched.search, "?tab=posts");
//!
//! let path = build_path(routes.get("usersShow").unwrap(), [("id", "7")], "tab=likes").unwrap();
//! assert_eq!(path, "/users/7?tab=likes");
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod actor;
pub mod builder;
pub mod error;
pub mod href;
pub mod pattern;
pub mod resolver;
pub mod route;
pub mod routing;

pub use actor::{
	Actor, ActorDef, Component, ComponentModule, PreloadContext, PreloadExtra, QueryKind,
	QueryShape,
};
pub use builder::{Query, build_path};
pub use error::{RouteError, RouteResult};
pub use href::{ParsedQuery, PathParts, QueryValue, parse_query, split_url, stringify_query};
pub use pattern::{PathPattern, PatternMatch, Segment};
pub use resolver::{CombinableResolver, Resolution, combinable_resolver, combine_route_resolver};
#[allow(deprecated)]
pub use route::route_by;
pub use route::{MatchResult, RouteDefiner, RouteDefinition, Routes, StateFactory, route_of};
pub use routing::{
	FrouteMatch, RouteResolver, RoutingContext, is_match_to_route, match_by_routes,
	match_by_routes_with, route_resolver,
};

/// Re-export commonly used types.
pub mod prelude {
	pub use crate::actor::{ActorDef, ComponentModule, PreloadContext, PreloadExtra, QueryShape};
	pub use crate::builder::{Query, build_path};
	pub use crate::error::{RouteError, RouteResult};
	pub use crate::href::{ParsedQuery, QueryValue};
	pub use crate::resolver::{Resolution, combinable_resolver, combine_route_resolver};
	pub use crate::route::{RouteDefinition, Routes, route_of};
	pub use crate::routing::{
		FrouteMatch, RouteResolver, RoutingContext, is_match_to_route, match_by_routes,
		route_resolver,
	};
}
