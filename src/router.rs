//! Navigation controller module.
//!
//! This module provides the router context, the history abstraction and
//! route change events.
//!
//! # Examples
//!
//! ```rust
//! use froute::router::{MemoryHistory, RouterOptions, create_router};
//! use froute::urls::Routes;
//! use std::sync::Arc;
//!
//! let history = Arc::new(MemoryHistory::with_initial_entries(["/"]));
//! let router = create_router(Routes::new(), RouterOptions::new().with_history(history));
//! assert!(router.current_location().is_err());
//! ```

pub use froute_router::*;
