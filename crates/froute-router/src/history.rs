//! History abstraction consumed by the router, with an in-memory
//! implementation.
//!
//! The router never touches a browser directly. It drives a [`History`]
//! through `push`, `replace`, `back` and `forward`, and subscribes to its
//! notifications with `listen`. [`MemoryHistory`] keeps a stack of entries in
//! memory, which is what tests and server-side rendering use.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use froute_urls::{PathParts, split_url};
use parking_lot::Mutex;
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Navigation types for history changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavigationType {
	/// A new entry was pushed.
	Push,
	/// The current entry was replaced.
	Replace,
	/// The current position moved (back/forward).
	Pop,
}

/// A history entry as seen through the [`History`] trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryLocation {
	/// Path component, starting with `/`.
	pub pathname: String,
	/// Query component including `?`, or empty.
	pub search: String,
	/// Fragment component including `#`, or empty.
	pub hash: String,
	/// Opaque entry state.
	pub state: Option<Value>,
	/// Unique entry key.
	pub key: String,
}

impl HistoryLocation {
	/// Creates an entry for `parts` with a fresh key.
	pub fn new(parts: &PathParts, state: Option<Value>) -> Self {
		Self {
			pathname: parts.pathname.clone(),
			search: parts.search.clone(),
			hash: parts.hash.clone(),
			state,
			key: create_key(),
		}
	}

	/// Returns the URL parts of this entry.
	pub fn parts(&self) -> PathParts {
		PathParts {
			pathname: self.pathname.clone(),
			search: self.search.clone(),
			hash: self.hash.clone(),
		}
	}

	/// Joins pathname, search and hash.
	pub fn href(&self) -> String {
		format!("{}{}{}", self.pathname, self.search, self.hash)
	}
}

/// A change notification delivered to history listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryUpdate {
	/// The new current entry.
	pub location: HistoryLocation,
	/// How the entry became current.
	pub action: NavigationType,
}

/// Callback receiving history notifications.
pub type HistoryListener = Box<dyn Fn(&HistoryUpdate) + Send + Sync>;

/// Removes a listener registered with [`History::listen`].
pub type Unlisten = Box<dyn FnOnce() + Send + Sync>;

/// A session history the router can drive.
pub trait History: Send + Sync + fmt::Debug {
	/// Returns the current entry.
	fn location(&self) -> HistoryLocation;

	/// Pushes a new entry after the current one, dropping any forward entries.
	fn push(&self, to: &PathParts, state: Option<Value>);

	/// Replaces the current entry.
	fn replace(&self, to: &PathParts, state: Option<Value>);

	/// Registers a listener for every change.
	fn listen(&self, listener: HistoryListener) -> Unlisten;

	/// Moves one entry back.
	fn back(&self);

	/// Moves one entry forward.
	fn forward(&self);
}

/// Generates an 8-character lowercase alphanumeric key.
pub fn create_key() -> String {
	rand::thread_rng()
		.sample_iter(Alphanumeric)
		.take(8)
		.map(|b| char::from(b).to_ascii_lowercase())
		.collect()
}

type SharedListener = Arc<dyn Fn(&HistoryUpdate) + Send + Sync>;

struct Entries {
	entries: Vec<HistoryLocation>,
	index: usize,
}

/// An in-memory [`History`].
///
/// Listeners are notified on every push, replace and position change.
/// Moving past either end of the stack is a no-op and notifies nobody.
///
/// # Example
///
/// ```
/// use froute_router::{History, MemoryHistory};
/// use froute_urls::split_url;
///
/// let history = MemoryHistory::with_initial_entries(["/", "/users/1"]);
/// assert_eq!(history.location().pathname, "/users/1");
///
/// history.back();
/// assert_eq!(history.location().pathname, "/");
///
/// history.push(&split_url("/about"), None);
/// assert_eq!(history.len(), 2);
/// ```
pub struct MemoryHistory {
	state: Mutex<Entries>,
	listeners: Arc<Mutex<Vec<(u64, SharedListener)>>>,
	next_listener_id: AtomicU64,
}

impl MemoryHistory {
	/// Creates a history with a single `/` entry.
	pub fn new() -> Self {
		Self::with_initial_entries(["/"])
	}

	/// Creates a history from URLs; the last one is current.
	///
	/// An empty list behaves like [`MemoryHistory::new`].
	pub fn with_initial_entries<I, S>(urls: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut entries: Vec<HistoryLocation> = urls
			.into_iter()
			.map(|url| HistoryLocation::new(&split_url(url.as_ref()), None))
			.collect();
		if entries.is_empty() {
			entries.push(HistoryLocation::new(&split_url("/"), None));
		}
		let index = entries.len() - 1;

		Self {
			state: Mutex::new(Entries { entries, index }),
			listeners: Arc::new(Mutex::new(Vec::new())),
			next_listener_id: AtomicU64::new(0),
		}
	}

	/// Returns the current position.
	pub fn index(&self) -> usize {
		self.state.lock().index
	}

	/// Returns the number of entries.
	pub fn len(&self) -> usize {
		self.state.lock().entries.len()
	}

	/// Returns `true` if there are no entries, which never happens.
	pub fn is_empty(&self) -> bool {
		self.state.lock().entries.is_empty()
	}

	/// Returns a snapshot of all entries.
	pub fn entries(&self) -> Vec<HistoryLocation> {
		self.state.lock().entries.clone()
	}

	/// Returns the number of registered listeners.
	pub fn listener_count(&self) -> usize {
		self.listeners.lock().len()
	}

	/// Moves `delta` entries; out-of-range moves are ignored.
	pub fn go(&self, delta: isize) {
		let location = {
			let mut state = self.state.lock();
			let Some(next) = state.index.checked_add_signed(delta) else {
				return;
			};
			if next >= state.entries.len() || next == state.index {
				return;
			}
			state.index = next;
			state.entries[next].clone()
		};

		self.notify(HistoryUpdate {
			location,
			action: NavigationType::Pop,
		});
	}

	fn notify(&self, update: HistoryUpdate) {
		// Clone out so listeners can call back into the history
		let listeners: Vec<SharedListener> = self
			.listeners
			.lock()
			.iter()
			.map(|(_, listener)| Arc::clone(listener))
			.collect();

		for listener in listeners {
			listener(&update);
		}
	}
}

impl Default for MemoryHistory {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for MemoryHistory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.state.lock();
		f.debug_struct("MemoryHistory")
			.field("index", &state.index)
			.field("entries", &state.entries.len())
			.field("listeners", &self.listeners.lock().len())
			.finish()
	}
}

impl History for MemoryHistory {
	fn location(&self) -> HistoryLocation {
		let state = self.state.lock();
		state.entries[state.index].clone()
	}

	fn push(&self, to: &PathParts, state: Option<Value>) {
		let location = HistoryLocation::new(to, state);
		{
			let mut entries = self.state.lock();
			let next = entries.index + 1;
			entries.entries.truncate(next);
			entries.entries.push(location.clone());
			entries.index = next;
		}

		self.notify(HistoryUpdate {
			location,
			action: NavigationType::Push,
		});
	}

	fn replace(&self, to: &PathParts, state: Option<Value>) {
		let location = HistoryLocation::new(to, state);
		{
			let mut entries = self.state.lock();
			let index = entries.index;
			entries.entries[index] = location.clone();
		}

		self.notify(HistoryUpdate {
			location,
			action: NavigationType::Replace,
		});
	}

	fn listen(&self, listener: HistoryListener) -> Unlisten {
		let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
		self.listeners.lock().push((id, Arc::from(listener)));

		let listeners = Arc::clone(&self.listeners);
		Box::new(move || {
			listeners.lock().retain(|(other, _)| *other != id);
		})
	}

	fn back(&self) {
		self.go(-1);
	}

	fn forward(&self) {
		self.go(1);
	}
}
