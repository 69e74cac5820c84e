//! Route definitions and URL resolution module.
//!
//! This module provides route builders, path matching and building, and
//! resolver chains.
//!
//! # Examples
//!
//! ```rust
//! use froute::urls::{Routes, match_by_routes, route_of};
//!
//! let routes = Routes::new().route("about", route_of("/about").build());
//! assert!(match_by_routes("/ABOUT/", &routes, None).is_some());
//! ```

pub use froute_urls::*;
