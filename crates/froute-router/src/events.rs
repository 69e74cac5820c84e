//! Route change events.
//!
//! Each router owns a [`RouterEvents`] emitter. Listeners are registered per
//! [`RouterEventKind`] and called synchronously, in registration order, every
//! time the router emits an event of that kind. A listener is removed by
//! passing back the same `Arc` it was registered with.
//!
//! # Design
//!
//! - **Thread-safe**: Uses `parking_lot::RwLock` for the listener table
//! - **Re-entrant**: Listeners are called without holding the lock, so they
//!   may register or remove listeners themselves

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::RouterError;

/// Kinds of router events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouterEventKind {
	/// A push or pop navigation started.
	RouteChangeStart,
	/// A navigation committed.
	RouteChangeComplete,
	/// A navigation failed during preload.
	RouteChangeError,
}

/// An emitted router event.
#[derive(Debug, Clone, Copy)]
pub enum RouterEvent<'a> {
	/// A push or pop navigation started.
	RouteChangeStart {
		/// Target pathname.
		url: &'a str,
	},
	/// A navigation committed.
	RouteChangeComplete {
		/// Committed pathname.
		url: &'a str,
	},
	/// A navigation failed during preload.
	RouteChangeError {
		/// The failure.
		error: &'a RouterError,
		/// Target pathname.
		url: &'a str,
	},
}

impl RouterEvent<'_> {
	/// Returns the kind of this event.
	pub fn kind(&self) -> RouterEventKind {
		match self {
			RouterEvent::RouteChangeStart { .. } => RouterEventKind::RouteChangeStart,
			RouterEvent::RouteChangeComplete { .. } => RouterEventKind::RouteChangeComplete,
			RouterEvent::RouteChangeError { .. } => RouterEventKind::RouteChangeError,
		}
	}

	/// Returns the pathname the event refers to.
	pub fn url(&self) -> &str {
		match self {
			RouterEvent::RouteChangeStart { url }
			| RouterEvent::RouteChangeComplete { url }
			| RouterEvent::RouteChangeError { url, .. } => url,
		}
	}
}

/// Callback receiving router events.
pub type EventListener = Arc<dyn Fn(&RouterEvent<'_>) + Send + Sync>;

/// Per-router event emitter.
#[derive(Default)]
pub struct RouterEvents {
	listeners: RwLock<HashMap<RouterEventKind, Vec<EventListener>>>,
}

impl RouterEvents {
	/// Creates an emitter with no listeners.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a closure and returns the handle needed to remove it.
	pub fn on<F>(&self, kind: RouterEventKind, listener: F) -> EventListener
	where
		F: Fn(&RouterEvent<'_>) + Send + Sync + 'static,
	{
		let listener: EventListener = Arc::new(listener);
		self.add_listener(kind, Arc::clone(&listener));
		listener
	}

	/// Registers an existing listener handle.
	pub fn add_listener(&self, kind: RouterEventKind, listener: EventListener) {
		self.listeners.write().entry(kind).or_default().push(listener);
	}

	/// Removes a listener by identity. Returns `true` if it was registered.
	pub fn off(&self, kind: RouterEventKind, listener: &EventListener) -> bool {
		let mut listeners = self.listeners.write();
		let Some(list) = listeners.get_mut(&kind) else {
			return false;
		};
		let before = list.len();
		list.retain(|l| !Arc::ptr_eq(l, listener));
		before != list.len()
	}

	/// Calls every listener registered for the event's kind.
	pub fn emit(&self, event: RouterEvent<'_>) {
		let listeners: Vec<EventListener> = self
			.listeners
			.read()
			.get(&event.kind())
			.cloned()
			.unwrap_or_default();

		for listener in listeners {
			listener(&event);
		}
	}

	/// Returns the number of listeners for `kind`.
	pub fn listener_count(&self, kind: RouterEventKind) -> usize {
		self.listeners.read().get(&kind).map_or(0, Vec::len)
	}

	/// Removes every listener.
	pub fn clear(&self) {
		self.listeners.write().clear();
	}
}

impl fmt::Debug for RouterEvents {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let listeners = self.listeners.read();
		let counts: HashMap<&RouterEventKind, usize> =
			listeners.iter().map(|(k, v)| (k, v.len())).collect();
		f.debug_struct("RouterEvents")
			.field("listeners", &counts)
			.finish()
	}
}
