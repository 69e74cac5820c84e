//! Chaining of route resolvers.

use std::sync::Arc;

use crate::routing::{FrouteMatch, RouteResolver, RoutingContext, route_resolver};

/// Outcome of one resolver in a chain.
#[derive(Debug, Clone)]
pub enum Resolution {
	/// Not applicable; the next resolver sees the unchanged input.
	Skip,
	/// Definitively no route; the chain stops.
	Unmatched,
	/// A match; later resolvers run against its path.
	Matched(FrouteMatch),
}

impl From<Option<FrouteMatch>> for Resolution {
	fn from(matched: Option<FrouteMatch>) -> Self {
		match matched {
			Some(m) => Resolution::Matched(m),
			None => Resolution::Unmatched,
		}
	}
}

/// A resolver usable inside [`combine_route_resolver`].
pub type CombinableResolver =
	Arc<dyn Fn(&str, Option<FrouteMatch>, &mut RoutingContext<'_>) -> Resolution + Send + Sync>;

/// Wraps a closure as a [`CombinableResolver`].
pub fn combinable_resolver<F>(resolver: F) -> CombinableResolver
where
	F: Fn(&str, Option<FrouteMatch>, &mut RoutingContext<'_>) -> Resolution + Send + Sync + 'static,
{
	Arc::new(resolver)
}

/// Combines resolvers into one [`RouteResolver`].
///
/// Each resolver runs in order. [`Resolution::Skip`] passes the current URL
/// and match on unchanged, [`Resolution::Unmatched`] ends the chain with no
/// route, and [`Resolution::Matched`] replaces the current match and URL
/// (with the match's path) for the following resolvers.
///
/// # Examples
///
/// ```
/// use froute_urls::{Resolution, Routes, combinable_resolver, combine_route_resolver, match_by_routes, route_of};
///
/// let routes = Routes::new().route("users", route_of("/users/:id").build());
/// let resolver = combine_route_resolver([
/// 	combinable_resolver(|_, _, _| Resolution::Skip),
/// 	combinable_resolver(|_, _, _| Resolution::Unmatched),
/// ]);
///
/// assert!(match_by_routes("/users/1", &routes, Some(&resolver)).is_none());
/// ```
pub fn combine_route_resolver<I>(resolvers: I) -> RouteResolver
where
	I: IntoIterator<Item = CombinableResolver>,
{
	let resolvers: Vec<CombinableResolver> = resolvers.into_iter().collect();

	route_resolver(move |url, matched, context| {
		let mut url = url.to_string();
		let mut current = matched;

		for resolver in &resolvers {
			match resolver(&url, current.clone(), context) {
				Resolution::Skip => continue,
				Resolution::Unmatched => return None,
				Resolution::Matched(next) => {
					url = next.path.clone();
					current = Some(next);
				}
			}
		}

		current
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::route::{Routes, route_of};
	use crate::routing::match_by_routes;
	use rstest::rstest;
	use std::sync::atomic::{AtomicUsize, Ordering};

	fn counted(counter: Arc<AtomicUsize>, result: fn() -> Resolution) -> CombinableResolver {
		combinable_resolver(move |_, _, _| {
			counter.fetch_add(1, Ordering::SeqCst);
			result()
		})
	}

	#[rstest]
	fn test_skip_then_unmatched_rejects() {
		// Arrange
		let routes = Routes::new().route("users", route_of("/users/:user_id").build());
		let first = Arc::new(AtomicUsize::new(0));
		let second = Arc::new(AtomicUsize::new(0));
		let resolver = combine_route_resolver([
			counted(Arc::clone(&first), || Resolution::Skip),
			counted(Arc::clone(&second), || Resolution::Unmatched),
		]);

		// Act
		let matched = match_by_routes("/users/1", &routes, Some(&resolver));

		// Assert
		assert!(matched.is_none());
		assert_eq!(first.load(Ordering::SeqCst), 1);
		assert_eq!(second.load(Ordering::SeqCst), 1);
	}

	#[rstest]
	fn test_unmatched_stops_chain() {
		let routes = Routes::new().route("users", route_of("/users/:user_id").build());
		let after = Arc::new(AtomicUsize::new(0));
		let resolver = combine_route_resolver([
			combinable_resolver(|_, _, _| Resolution::Unmatched),
			counted(Arc::clone(&after), || Resolution::Skip),
		]);

		assert!(match_by_routes("/users/1", &routes, Some(&resolver)).is_none());
		assert_eq!(after.load(Ordering::SeqCst), 0);
	}

	#[rstest]
	fn test_all_skipped_keeps_raw_match() {
		let routes = Routes::new().route("users", route_of("/users/:user_id").build());
		let resolver = combine_route_resolver([combinable_resolver(|_, _, _| Resolution::Skip)]);

		let matched = match_by_routes("/users/1", &routes, Some(&resolver)).unwrap();

		assert_eq!(matched.param("user_id"), Some("1"));
	}

	#[rstest]
	fn test_matched_rewrites_input_for_next_resolver() {
		// Arrange: strip a locale prefix, then check the next resolver sees
		// the rewritten path
		let routes = Routes::new().route("users", route_of("/users/:id").build());
		let resolver = combine_route_resolver([
			combinable_resolver(|url, _, ctx| match url.strip_prefix("/en") {
				Some(rest) => ctx.resolve_route(rest).into(),
				None => Resolution::Skip,
			}),
			combinable_resolver(|url, matched, _| {
				assert_eq!(url, "/users/3");
				assert!(matched.is_some());
				matched.into()
			}),
		]);

		// Act
		let matched = match_by_routes("/en/users/3", &routes, Some(&resolver));

		// Assert
		assert_eq!(matched.unwrap().param("id"), Some("3"));
	}
}
