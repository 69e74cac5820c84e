//! Navigation controller for the froute client-side router.
//!
//! Built on the route definitions and resolution of `froute-urls`, this
//! crate adds everything that changes over time:
//!
//! - **Navigation**: [`RouterContext::navigate`] resolves a target, consults
//!   the before-change guard, preloads the matched route and commits the new
//!   location. Overlapping navigations are settled last-caller-wins
//! - **History**: the [`History`] trait the router drives, with the in-memory
//!   [`MemoryHistory`]; each entry carries a [`FrouteHistoryState`] recording
//!   which router session wrote it
//! - **Events**: [`RouterEvents`] emits route change start, completion and
//!   failure; route-changed observers see every committed push and pop
//!
//! # Quick Start
//!
//! ```
//! use froute_router::prelude::*;
//! use froute_urls::prelude::*;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let routes = Routes::new()
//! 	.route("home", route_of("/").build())
//! 	.route("usersShow", route_of("/users/:id").build());
//! let router = create_router(routes, RouterOptions::new());
//!
//! router.replace("/").await.unwrap();
//! router.push("/users/1").await.unwrap();
//! assert_eq!(router.current_location().unwrap().pathname, "/users/1");
//!
//! router.back().await.unwrap();
//! assert_eq!(router.current_location().unwrap().pathname, "/");
//! # });
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod context;
pub mod error;
pub mod events;
pub mod history;
pub mod history_state;
pub mod options;

pub use context::{
	BeforeRouteListener, Location, NavigateOptions, NavigateTarget, NavigationListener,
	RouterContext, create_router,
};
pub use error::{RouterError, RouterResult};
pub use events::{EventListener, RouterEvent, RouterEventKind, RouterEvents};
pub use history::{
	History, HistoryListener, HistoryLocation, HistoryUpdate, MemoryHistory, NavigationType,
	Unlisten, create_key,
};
pub use history_state::{FrouteHistoryState, InternalHistoryState, is_froute_state};
pub use options::RouterOptions;

/// Re-export commonly used types.
pub mod prelude {
	pub use crate::context::{
		Location, NavigateOptions, NavigateTarget, RouterContext, create_router,
	};
	pub use crate::error::{RouterError, RouterResult};
	pub use crate::events::{RouterEvent, RouterEventKind};
	pub use crate::history::{History, MemoryHistory, NavigationType};
	pub use crate::history_state::{FrouteHistoryState, InternalHistoryState};
	pub use crate::options::RouterOptions;
}
