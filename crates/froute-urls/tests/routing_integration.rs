//! Integration tests for route resolution
//!
//! These tests exercise the public API end to end:
//! 1. Route definitions with builder chains and optional parameters
//! 2. First-match resolution with decoded params and parsed query
//! 3. Resolver chains for locale prefixes and alias redirects
//! 4. Path building from route definitions

use froute_urls::prelude::*;
use rstest::{fixture, rstest};
use std::sync::Arc;

struct AppRoutes {
	routes: Routes,
	users_show: Arc<RouteDefinition>,
	posts: Arc<RouteDefinition>,
}

#[fixture]
fn app() -> AppRoutes {
	let users_show = route_of("/users/:id").build();
	let posts = route_of("/posts")
		.param("year")
		.path(":slug?")
		.build();
	let routes = Routes::new()
		.route("usersShow", Arc::clone(&users_show))
		.route("posts", Arc::clone(&posts))
		.route("home", route_of("/").build());

	AppRoutes {
		routes,
		users_show,
		posts,
	}
}

fn i18n_then_alias(users_show: Arc<RouteDefinition>) -> RouteResolver {
	combine_route_resolver([
		combinable_resolver(|url, _, ctx| {
			let Some(rest) = url.strip_prefix('/') else {
				return Resolution::Skip;
			};
			let (lang, path) = rest.split_at(rest.find('/').unwrap_or(rest.len()));
			if !["en", "ja"].contains(&lang) {
				return Resolution::Skip;
			}
			ctx.resolve_route(path).into()
		}),
		combinable_resolver(move |url, matched, ctx| {
			let Some(uid) = url.strip_prefix("/u/") else {
				return matched.into();
			};
			ctx.set_status_code(302);
			ctx.set_redirect_to(build_path(&users_show, [("id", uid)], Query::Empty).ok());
			Resolution::Unmatched
		}),
	])
}

#[rstest]
fn test_resolves_params_and_query(app: AppRoutes) {
	// Act
	let matched = match_by_routes("/users/1?a=1#1", &app.routes, None).unwrap();

	// Assert
	assert!(matched.is_route(&app.users_show));
	assert_eq!(matched.param("id"), Some("1"));
	assert_eq!(matched.path, "/users/1");
	assert_eq!(matched.search, "?a=1");
	assert_eq!(matched.query.get("a"), Some(&QueryValue::Single("1".into())));
}

#[rstest]
#[case("/posts/2020", Some("2020"), None)]
#[case("/posts/2020/hello", Some("2020"), Some("hello"))]
#[case("/POSTS/2020/hello/", Some("2020"), Some("hello"))]
fn test_optional_segment(
	app: AppRoutes,
	#[case] url: &str,
	#[case] year: Option<&str>,
	#[case] slug: Option<&str>,
) {
	let matched = match_by_routes(url, &app.routes, None).unwrap();

	assert!(matched.is_route(&app.posts));
	assert_eq!(matched.param("year"), year);
	assert_eq!(matched.param("slug"), slug);
}

#[rstest]
fn test_decodes_non_ascii_params(app: AppRoutes) {
	let url = build_path(&app.users_show, [("id", "ユーザー")], Query::Empty).unwrap();

	let matched = match_by_routes(&url, &app.routes, None).unwrap();

	assert_eq!(matched.param("id"), Some("ユーザー"));
}

#[rstest]
#[case("/users/..", "..")]
#[case("/users/%23sharp", "#sharp")]
fn test_edge_case_params(app: AppRoutes, #[case] url: &str, #[case] id: &str) {
	let matched = match_by_routes(url, &app.routes, None).unwrap();

	assert_eq!(matched.param("id"), Some(id));
}

#[rstest]
fn test_unmatched_returns_none(app: AppRoutes) {
	assert!(match_by_routes("/users", &app.routes, None).is_none());
	assert!(match_by_routes("/users/1/2", &app.routes, None).is_none());
}

#[rstest]
#[case("/ja/users/1", "/users/1")]
#[case("/en/users/2", "/users/2")]
#[case("/users/3", "/users/3")]
fn test_locale_prefix_is_stripped(app: AppRoutes, #[case] url: &str, #[case] path: &str) {
	// Arrange
	let resolver = i18n_then_alias(Arc::clone(&app.users_show));
	let mut context = RoutingContext::new(&app.routes);

	// Act
	let matched = froute_urls::match_by_routes_with(url, Some(&resolver), &mut context);

	// Assert
	assert_eq!(matched.map(|m| m.path), Some(path.to_string()));
	assert_eq!(context.status_code(), 200);
}

#[rstest]
fn test_alias_signals_redirect(app: AppRoutes) {
	// Arrange
	let resolver = i18n_then_alias(Arc::clone(&app.users_show));
	let mut context = RoutingContext::new(&app.routes);

	// Act
	let matched = froute_urls::match_by_routes_with("/u/1", Some(&resolver), &mut context);

	// Assert
	assert!(matched.is_none());
	assert_eq!(context.into_parts(), (302, Some("/users/1".to_string())));
}

#[rstest]
fn test_build_path_round_trip(app: AppRoutes) {
	// Arrange
	let mut query = ParsedQuery::new();
	query.insert("tag".into(), QueryValue::from(vec!["rust", "web"]));

	// Act
	let url = build_path(&app.posts, [("year", "2024"), ("slug", "a b")], query).unwrap();
	let matched = match_by_routes(&url, &app.routes, None).unwrap();

	// Assert
	assert_eq!(url, "/posts/2024/a%20b?tag=rust&tag=web");
	assert_eq!(matched.param("slug"), Some("a b"));
	assert_eq!(
		matched.query.get("tag").map(QueryValue::values),
		Some(vec!["rust", "web"])
	);
}

#[rstest]
fn test_root_route(app: AppRoutes) {
	let matched = match_by_routes("/", &app.routes, None).unwrap();

	assert_eq!(matched.route.to_path(), "/");
	assert!(matched.params.is_empty());
}
