//! Router configuration.

use std::fmt;
use std::sync::Arc;

use froute_urls::{PreloadContext, RouteResolver};

use crate::history::History;

/// Options for [`create_router`](crate::create_router).
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use froute_router::{MemoryHistory, RouterOptions};
/// use froute_urls::{PreloadContext, route_resolver};
///
/// let history = Arc::new(MemoryHistory::new());
/// let options = RouterOptions::new()
/// 	.with_resolver(route_resolver(|_, matched, _| matched))
/// 	.with_preload_context(PreloadContext::new("api-client"))
/// 	.with_history(history);
/// # let _ = options;
/// ```
#[derive(Clone, Default)]
pub struct RouterOptions {
	pub(crate) resolver: Option<RouteResolver>,
	pub(crate) preload_context: PreloadContext,
	pub(crate) history: Option<Arc<dyn History>>,
}

impl RouterOptions {
	/// Creates options with no resolver, an empty preload context and an
	/// in-memory history.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the resolver run after every structural match.
	pub fn with_resolver(mut self, resolver: RouteResolver) -> Self {
		self.resolver = Some(resolver);
		self
	}

	/// Sets the value handed to every preload function.
	pub fn with_preload_context(mut self, context: PreloadContext) -> Self {
		self.preload_context = context;
		self
	}

	/// Sets the history the router drives.
	///
	/// Without one, the router creates its own
	/// [`MemoryHistory`](crate::MemoryHistory).
	pub fn with_history(mut self, history: Arc<dyn History>) -> Self {
		self.history = Some(history);
		self
	}
}

impl fmt::Debug for RouterOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouterOptions")
			.field("has_resolver", &self.resolver.is_some())
			.field("preload_context", &self.preload_context)
			.field("history", &self.history)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::history::MemoryHistory;
	use froute_urls::route_resolver;
	use rstest::rstest;

	#[rstest]
	fn test_defaults() {
		let options = RouterOptions::new();

		assert!(options.resolver.is_none());
		assert!(options.preload_context.is_empty());
		assert!(options.history.is_none());
	}

	#[rstest]
	fn test_builder_sets_every_field() {
		// Arrange
		let history = Arc::new(MemoryHistory::with_initial_entries(["/a"]));

		// Act
		let options = RouterOptions::new()
			.with_resolver(route_resolver(|_, matched, _| matched))
			.with_preload_context(PreloadContext::new(42_u32))
			.with_history(history);

		// Assert
		assert!(options.resolver.is_some());
		assert_eq!(options.preload_context.downcast_ref::<u32>(), Some(&42));
		let pathname = options.history.map(|h| h.location().pathname);
		assert_eq!(pathname.as_deref(), Some("/a"));
	}

	#[rstest]
	fn test_debug_hides_closures() {
		let options = RouterOptions::new().with_resolver(route_resolver(|_, m, _| m));

		let debug = format!("{:?}", options);

		assert!(debug.contains("has_resolver: true"));
	}
}
