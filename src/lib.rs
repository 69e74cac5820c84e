//! # froute
//!
//! Client-side route matching and navigation for single-page applications.
//!
//! froute maps URLs to declared routes and drives navigation between them:
//! each route can lazily load its component and preload its data before the
//! navigation commits, and overlapping navigations are settled in favor of
//! the latest one.
//!
//! ## Crates
//!
//! - [`urls`] (`froute-urls`): route definitions, path matching and
//!   building, resolver chains
//! - [`router`] (`froute-router`): the navigation controller, history and
//!   route change events
//!
//! ## Feature Flags
//!
//! - `router` (default) - Navigation controller. Without it only route
//!   definitions and resolution are available.
//!
//! ## Quick Example
//!
//! ```rust
//! use froute::prelude::*;
//! use serde_json::json;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let routes = Routes::new()
//! 	.route("home", route_of("/").build())
//! 	.route(
//! 		"usersShow",
//! 		route_of("/users/:id")
//! 			.state(|| json!({ "tab": "posts" }))
//! 			.action(ActorDef::new(|| "UserPage").preload(|_ctx, params, _extra| async move {
//! 				assert!(params.contains_key("id"));
//! 				Ok(())
//! 			})),
//! 	);
//!
//! let router = create_router(routes, RouterOptions::new());
//! router.replace("/").await.unwrap();
//! router.push("/users/42?tab=likes").await.unwrap();
//!
//! let matched = router.current_match().unwrap();
//! assert_eq!(matched.param("id"), Some("42"));
//! assert_eq!(router.history_state().unwrap(), json!({ "tab": "posts" }));
//! # });
//! ```

#![warn(missing_docs)]

#[cfg(feature = "router")]
pub mod router;
pub mod urls;

// Re-export route definitions and resolution
pub use froute_urls::{
	ActorDef, ComponentModule, FrouteMatch, PreloadContext, Query, Resolution, RouteDefinition,
	RouteError, RouteResolver, RouteResult, Routes, RoutingContext, build_path,
	combinable_resolver, combine_route_resolver, is_match_to_route, match_by_routes,
	route_of, route_resolver,
};

// Re-export the navigation controller
#[cfg(feature = "router")]
pub use froute_router::{
	History, Location, MemoryHistory, NavigateOptions, NavigateTarget, RouterContext,
	RouterError, RouterEvent, RouterEventKind, RouterOptions, RouterResult, create_router,
};

/// Re-export commonly used types.
pub mod prelude {
	pub use froute_urls::prelude::*;

	#[cfg(feature = "router")]
	pub use froute_router::prelude::*;
}
