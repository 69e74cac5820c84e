//! Route property-based tests
//!
//! Property tests for building paths from routes and matching them back.

use std::collections::HashMap;

use froute_urls::{Query, RouteDefinition, build_path, route_of};
use proptest::prelude::*;
use rstest::*;
use std::sync::Arc;

fn param_value() -> impl Strategy<Value = String> {
	any::<String>().prop_filter("parameter values are non-empty", |v| !v.is_empty())
}

fn named_params() -> impl Strategy<Value = Vec<(String, String)>> {
	prop::collection::vec(("[a-z_][a-z0-9_]{0,8}", param_value()), 1..4).prop_map(|pairs| {
		pairs
			.into_iter()
			.enumerate()
			.map(|(i, (name, value))| (format!("{}_{}", name, i), value))
			.collect()
	})
}

fn route_with(params: &[(String, String)], optional: Option<&str>) -> Arc<RouteDefinition> {
	let mut definer = route_of("/r");
	for (name, _) in params {
		definer = definer.param(name);
	}
	if let Some(name) = optional {
		definer = definer.param(&format!("{}?", name));
	}
	definer.build()
}

// ============================================================================
// Property-Based Tests: build_path / matches
// ============================================================================

proptest! {
	/// Test: required params roundtrip
	///
	/// Category: Property
	/// Verifies that matching a built path yields the params it was built from.
	#[rstest]
	fn prop_required_params_roundtrip(params in named_params()) {
		let route = route_with(&params, None);

		let path = build_path(&route, params.clone(), Query::Empty).unwrap();
		let matched = route.matches(&path);

		let expected: HashMap<String, String> = params.into_iter().collect();
		prop_assert_eq!(matched.map(|m| m.params), Some(expected));
	}

	/// Test: optional param roundtrip
	///
	/// Category: Property
	/// Verifies that a trailing optional param survives the roundtrip when
	/// given and is absent from the match when omitted.
	#[rstest]
	fn prop_optional_param_roundtrip(
		params in named_params(),
		optional in prop::option::of(param_value()),
	) {
		let route = route_with(&params, Some("opt"));
		let mut given = params;
		if let Some(value) = &optional {
			given.push(("opt".to_string(), value.clone()));
		}

		let path = build_path(&route, given.clone(), Query::Empty).unwrap();
		let matched = route.matches(&path);

		let expected: HashMap<String, String> = given.into_iter().collect();
		prop_assert_eq!(matched.map(|m| m.params), Some(expected));
	}

	/// Test: query does not leak into params
	///
	/// Category: Property
	/// Verifies that a raw query suffix is kept apart from path params.
	#[rstest]
	fn prop_query_kept_out_of_params(
		params in named_params(),
		query in "[a-z]{1,8}=[a-z0-9]{0,8}",
	) {
		let route = route_with(&params, None);

		let path = build_path(&route, params.clone(), Query::from(query.as_str())).unwrap();
		let matched = route.matches(&path).unwrap();

		let expected: HashMap<String, String> = params.into_iter().collect();
		prop_assert_eq!(matched.params, expected);
		prop_assert_eq!(matched.search, format!("?{}", query));
	}
}
