//! The navigation controller.
//!
//! [`RouterContext`] owns the routes, drives a [`History`], and tracks the
//! committed location and match. A navigation resolves its target, asks the
//! before-change guard, preloads the matched route, writes history and then
//! commits. Navigations may overlap: each one takes a token and only the
//! latest token is allowed to write history or commit.
//!
//! No lock is held across an await, so `navigate` can be called
//! concurrently from several tasks on a shared `Arc<RouterContext>`.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use froute_urls::{
	FrouteMatch, PathParts, PreloadContext, PreloadExtra, Query, RouteDefinition, RouteResolver,
	Routes, RoutingContext, match_by_routes_with, split_url,
};
use futures::future::BoxFuture;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use crate::error::{RouterError, RouterResult};
use crate::events::{RouterEvent, RouterEvents};
use crate::history::{History, HistoryUpdate, MemoryHistory, NavigationType, Unlisten, create_key};
use crate::history_state::{
	FrouteHistoryState, InternalHistoryState, finite_or_zero, is_froute_state,
};
use crate::options::RouterOptions;

/// The committed location of a router.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
	/// Unique key of this location.
	pub key: String,
	/// Path component, starting with `/`.
	pub pathname: String,
	/// Query component including `?`, or empty.
	pub search: String,
	/// Fragment component including `#`, or empty.
	pub hash: String,
	/// The history entry state written for this location.
	pub state: FrouteHistoryState,
}

impl Location {
	/// Returns the URL parts of this location.
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

/// Where to navigate.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigateTarget {
	/// A URL, relative or absolute.
	Url(String),
	/// Already split URL parts with optional application state.
	Location {
		/// Target URL parts.
		parts: PathParts,
		/// Application state for the new entry.
		state: Option<Value>,
	},
}

impl From<&str> for NavigateTarget {
	fn from(url: &str) -> Self {
		NavigateTarget::Url(url.to_string())
	}
}

impl From<String> for NavigateTarget {
	fn from(url: String) -> Self {
		NavigateTarget::Url(url)
	}
}

impl From<PathParts> for NavigateTarget {
	fn from(parts: PathParts) -> Self {
		NavigateTarget::Location { parts, state: None }
	}
}

impl From<&Location> for NavigateTarget {
	fn from(location: &Location) -> Self {
		NavigateTarget::Location {
			parts: location.parts(),
			state: Some(location.state.app.clone()),
		}
	}
}

/// Options for [`RouterContext::navigate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigateOptions {
	/// Application state for the new entry. Ignored when the target is a
	/// [`NavigateTarget::Location`] carrying its own state.
	pub state: Option<Value>,
	/// How the navigation writes history. `None` is used when hydrating the
	/// initial location: the entry is replaced without running the guard.
	pub action: Option<NavigationType>,
	/// Raw state of the history entry being navigated to. Set for pops, where
	/// the entry already exists and keeps its own session id.
	entry_state: Option<Option<Value>>,
}

impl NavigateOptions {
	/// Options for pushing a new entry.
	pub fn push() -> Self {
		Self {
			action: Some(NavigationType::Push),
			..Self::default()
		}
	}

	/// Options for replacing the current entry.
	pub fn replace() -> Self {
		Self {
			action: Some(NavigationType::Replace),
			..Self::default()
		}
	}

	/// Options for moving to an existing entry with raw state `entry_state`.
	pub fn pop(entry_state: Option<Value>) -> Self {
		Self {
			action: Some(NavigationType::Pop),
			entry_state: Some(entry_state),
			..Self::default()
		}
	}

	/// Sets the application state.
	pub fn with_state(mut self, state: Value) -> Self {
		self.state = Some(state);
		self
	}
}

/// Guard run before push and pop navigations. Resolving to `false` cancels
/// the navigation.
pub type BeforeRouteListener =
	Arc<dyn Fn(Option<&FrouteMatch>) -> BoxFuture<'static, bool> + Send + Sync>;

/// Observer called with every committed push or pop location.
pub type NavigationListener = Arc<dyn Fn(&Location) + Send + Sync>;

struct RouterState {
	status_code: u16,
	redirect_to: Option<String>,
	location: Option<Location>,
	current_match: Option<FrouteMatch>,
}

impl Default for RouterState {
	fn default() -> Self {
		Self {
			status_code: 200,
			redirect_to: None,
			location: None,
			current_match: None,
		}
	}
}

/// Creates a router over `routes`.
///
/// # Example
///
/// ```
/// use froute_router::{NavigateOptions, RouterOptions, create_router};
/// use froute_urls::{Routes, route_of};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let routes = Routes::new().route("usersShow", route_of("/users/:id").build());
/// let router = create_router(routes, RouterOptions::new());
///
/// router.navigate("/users/1", NavigateOptions::push()).await.unwrap();
///
/// let matched = router.current_match().unwrap();
/// assert_eq!(matched.param("id"), Some("1"));
/// assert_eq!(router.history().location().pathname, "/users/1");
/// # });
/// ```
pub fn create_router(routes: Routes, options: RouterOptions) -> Arc<RouterContext> {
	Arc::new(RouterContext::new(routes, options))
}

/// Navigation controller for one set of routes.
pub struct RouterContext {
	routes: Routes,
	history: Arc<dyn History>,
	events: RouterEvents,
	resolver: Option<RouteResolver>,
	preload_context: PreloadContext,
	sid: String,
	latest_navigation: AtomicU64,
	state: Mutex<RouterState>,
	before_route_change: Mutex<Option<BeforeRouteListener>>,
	route_changed: RwLock<Vec<NavigationListener>>,
	subscription: Mutex<Option<Unlisten>>,
	pending: Arc<Mutex<VecDeque<HistoryUpdate>>>,
	disposed: AtomicBool,
}

impl RouterContext {
	/// Creates a router and subscribes it to its history.
	pub fn new(routes: Routes, options: RouterOptions) -> Self {
		let RouterOptions {
			resolver,
			preload_context,
			history,
		} = options;
		let history = history.unwrap_or_else(|| Arc::new(MemoryHistory::new()));

		let context = Self {
			routes,
			history,
			events: RouterEvents::new(),
			resolver,
			preload_context,
			sid: create_key(),
			latest_navigation: AtomicU64::new(0),
			state: Mutex::new(RouterState::default()),
			before_route_change: Mutex::new(None),
			route_changed: RwLock::new(Vec::new()),
			subscription: Mutex::new(None),
			pending: Arc::new(Mutex::new(VecDeque::new())),
			disposed: AtomicBool::new(false),
		};
		context.subscribe();

		tracing::debug!(sid = %context.sid, routes = context.routes.len(), "router created");
		context
	}

	/// Returns the routes.
	pub fn routes(&self) -> &Routes {
		&self.routes
	}

	/// Returns the history this router drives.
	pub fn history(&self) -> &Arc<dyn History> {
		&self.history
	}

	/// Returns the event emitter.
	pub fn events(&self) -> &RouterEvents {
		&self.events
	}

	/// Returns this router's session id.
	///
	/// Entries written by this router carry it; entries without it were
	/// written by another page load.
	pub fn session_id(&self) -> &str {
		&self.sid
	}

	/// Returns the status code set by resolvers. Defaults to `200`.
	pub fn status_code(&self) -> u16 {
		self.state.lock().status_code
	}

	/// Sets the status code.
	pub fn set_status_code(&self, status_code: u16) {
		self.state.lock().status_code = status_code;
	}

	/// Returns the redirect target set by resolvers.
	pub fn redirect_to(&self) -> Option<String> {
		self.state.lock().redirect_to.clone()
	}

	/// Sets or clears the redirect target.
	pub fn set_redirect_to(&self, redirect_to: Option<String>) {
		self.state.lock().redirect_to = redirect_to;
	}

	/// Returns the committed match, if the committed location matched a route.
	pub fn current_match(&self) -> Option<FrouteMatch> {
		self.state.lock().current_match.clone()
	}

	/// Returns the committed location.
	///
	/// # Errors
	///
	/// Returns [`RouterError::MissingLocation`] before the first navigation
	/// commits.
	pub fn current_location(&self) -> RouterResult<Location> {
		self.state
			.lock()
			.location
			.clone()
			.ok_or(RouterError::MissingLocation)
	}

	/// Resolves `url` through the routes and the configured resolver.
	///
	/// Status code and redirect written by the resolver are stored on the
	/// router.
	pub fn resolve_route(&self, url: &str) -> Option<FrouteMatch> {
		let (status_code, redirect_to) = {
			let state = self.state.lock();
			(state.status_code, state.redirect_to.clone())
		};

		let mut context = RoutingContext::with_status(&self.routes, status_code, redirect_to);
		let matched = match_by_routes_with(url, self.resolver.as_ref(), &mut context);
		let (status_code, redirect_to) = context.into_parts();

		let mut state = self.state.lock();
		state.status_code = status_code;
		state.redirect_to = redirect_to;
		matched
	}

	/// Navigates to `target`.
	///
	/// Push and pop navigations run the before-change guard, emit
	/// `RouteChangeStart`, preload the matched route and, once committed,
	/// notify route-changed observers and emit `RouteChangeComplete`. Replace
	/// navigations only rewrite the current entry and commit.
	///
	/// A navigation overtaken by a later one returns `Ok(())` without writing
	/// history or committing.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Preload`] when loading the component or the
	/// route's preload fails; the committed location is left untouched.
	/// Returns [`RouterError::Disposed`] after [`RouterContext::dispose`].
	pub async fn navigate(
		&self,
		target: impl Into<NavigateTarget>,
		options: NavigateOptions,
	) -> RouterResult<()> {
		self.run_navigation(target.into(), options).await.map(|_| ())
	}

	async fn run_navigation(
		&self,
		target: NavigateTarget,
		options: NavigateOptions,
	) -> RouterResult<Settled> {
		if self.is_disposed() {
			return Err(RouterError::Disposed);
		}

		let token = self.latest_navigation.fetch_add(1, Ordering::SeqCst) + 1;
		let is_superseded = || self.latest_navigation.load(Ordering::SeqCst) != token;

		let NavigateOptions {
			state,
			action,
			entry_state,
		} = options;
		let (parts, user_state) = match target {
			NavigateTarget::Url(url) => (split_url(&url), state),
			NavigateTarget::Location { parts, state: own } => (parts, own.or(state)),
		};

		let next_match = self.resolve_route(&parts.href());

		if matches!(action, Some(NavigationType::Push | NavigationType::Pop)) {
			let guard = self.before_route_change.lock().clone();
			if let Some(guard) = guard {
				if !guard(next_match.as_ref()).await {
					tracing::debug!(pathname = %parts.pathname, "navigation prevented by guard");
					return Ok(Settled::Prevented);
				}
			}
		}
		if self.is_disposed() {
			return Err(RouterError::Disposed);
		}

		self.unsubscribe();
		let _resubscribe = Resubscribe(self);

		let next_state = self.next_entry_state(entry_state, user_state, next_match.as_ref());
		let next_location = Location {
			key: create_key(),
			pathname: parts.pathname.clone(),
			search: parts.search.clone(),
			hash: parts.hash.clone(),
			state: next_state,
		};

		if action == Some(NavigationType::Replace) {
			self.history
				.replace(&parts, Some(next_location.state.to_value()));
			self.commit(next_location, next_match);
			return Ok(Settled::Committed);
		}

		self.events.emit(RouterEvent::RouteChangeStart {
			url: &parts.pathname,
		});

		let outcome = match (action, &next_match) {
			(Some(NavigationType::Push), Some(matched)) => {
				let preloaded = self.preload_route(matched, false).await;
				if preloaded.is_ok() && !is_superseded() {
					self.history.push(&parts, Some(next_location.state.to_value()));
				}
				preloaded
			}
			(Some(NavigationType::Pop), Some(matched))
				if next_location.state.sid() != Some(self.sid.as_str()) =>
			{
				self.preload_route(matched, false).await
			}
			_ => {
				if !is_superseded() {
					self.history
						.replace(&parts, Some(next_location.state.to_value()));
				}
				Ok(())
			}
		};

		if let Err(error) = outcome {
			tracing::warn!(pathname = %parts.pathname, error = %error, "navigation failed");
			self.events.emit(RouterEvent::RouteChangeError {
				error: &error,
				url: &parts.pathname,
			});
			return Err(error);
		}
		if self.is_disposed() {
			return Err(RouterError::Disposed);
		}

		if is_superseded() {
			tracing::debug!(pathname = %parts.pathname, "navigation superseded");
			return Ok(Settled::Superseded);
		}

		self.commit(next_location.clone(), next_match);
		self.notify_route_changed(&next_location);
		self.events.emit(RouterEvent::RouteChangeComplete {
			url: &parts.pathname,
		});
		Ok(Settled::Committed)
	}

	/// Navigates to `target`, pushing a new entry.
	pub async fn push(&self, target: impl Into<NavigateTarget>) -> RouterResult<()> {
		self.navigate(target, NavigateOptions::push()).await
	}

	/// Navigates to `target`, replacing the current entry.
	pub async fn replace(&self, target: impl Into<NavigateTarget>) -> RouterResult<()> {
		self.navigate(target, NavigateOptions::replace()).await
	}

	fn next_entry_state(
		&self,
		entry_state: Option<Option<Value>>,
		user_state: Option<Value>,
		next_match: Option<&FrouteMatch>,
	) -> FrouteHistoryState {
		let from_entry = entry_state.is_some();
		if let Some(raw) = entry_state.flatten().filter(is_froute_state) {
			return FrouteHistoryState::from_value(Some(&raw));
		}

		let sid = (!from_entry).then(|| self.sid.clone());
		let app = user_state
			.or_else(|| next_match.map(|m| m.route.create_state()))
			.unwrap_or(Value::Null);
		FrouteHistoryState::new(sid, app)
	}

	fn commit(&self, location: Location, matched: Option<FrouteMatch>) {
		let mut state = self.state.lock();
		state.location = Some(location);
		state.current_match = matched;
	}

	fn notify_route_changed(&self, location: &Location) {
		let listeners = self.route_changed.read().clone();
		for listener in listeners {
			listener(location);
		}
	}

	/// Loads the matched route's component and, unless
	/// `only_component_preload` is set, runs its preload concurrently.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Preload`] if either fails.
	pub async fn preload_route(
		&self,
		matched: &FrouteMatch,
		only_component_preload: bool,
	) -> RouterResult<()> {
		let Some(actor) = matched.route.actor() else {
			return Ok(());
		};

		let preload = async {
			if only_component_preload {
				return Ok(());
			}
			let extra = PreloadExtra {
				query: matched.query.clone(),
				search: matched.search.clone(),
			};
			actor
				.preload(self.preload_context.clone(), matched.params.clone(), extra)
				.await
		};

		futures::try_join!(actor.load_component(), preload)
			.map(|_| ())
			.map_err(|source| RouterError::Preload {
				pathname: matched.path.clone(),
				source,
			})
	}

	/// Preloads the committed match, if any.
	pub async fn preload_current(&self, only_component_preload: bool) -> RouterResult<()> {
		match self.current_match() {
			Some(matched) => self.preload_route(&matched, only_component_preload).await,
			None => Ok(()),
		}
	}

	/// Returns the router bookkeeping of the committed entry.
	pub fn internal_history_state(&self) -> RouterResult<InternalHistoryState> {
		Ok(self.current_location()?.state.froute)
	}

	/// Rewrites the router bookkeeping (scroll position) of the committed
	/// entry. Non-finite scroll offsets are stored as zero.
	pub fn set_internal_history_state(&self, internal: InternalHistoryState) -> RouterResult<()> {
		let location = self.current_location()?;
		let state = FrouteHistoryState {
			froute: InternalHistoryState {
				scroll_x: finite_or_zero(Some(internal.scroll_x)),
				scroll_y: finite_or_zero(Some(internal.scroll_y)),
				..internal
			},
			app: location.state.app.clone(),
		};
		self.rewrite_current(location, state);
		Ok(())
	}

	/// Returns the application state of the committed entry.
	pub fn history_state(&self) -> RouterResult<Value> {
		Ok(self.current_location()?.state.app)
	}

	/// Rewrites the application state of the committed entry.
	pub fn set_history_state(&self, app: Value) -> RouterResult<()> {
		let location = self.current_location()?;
		let state = FrouteHistoryState {
			froute: location.state.froute.clone(),
			app,
		};
		self.rewrite_current(location, state);
		Ok(())
	}

	fn rewrite_current(&self, location: Location, state: FrouteHistoryState) {
		self.history.replace(&location.parts(), Some(state.to_value()));
		if let Some(current) = self.state.lock().location.as_mut() {
			current.state = state;
		}
	}

	/// Builds a concrete path for `route`.
	pub fn build_path<I, K, V>(
		&self,
		route: &RouteDefinition,
		params: I,
		query: impl Into<Query>,
	) -> RouterResult<String>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		Ok(froute_urls::build_path(route, params, query)?)
	}

	/// Sets the before-change guard.
	///
	/// # Errors
	///
	/// Returns [`RouterError::DuplicateBeforeRouteListener`] if a guard is
	/// already set.
	pub fn set_before_route_change_listener<F, Fut>(&self, listener: F) -> RouterResult<()>
	where
		F: Fn(Option<&FrouteMatch>) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = bool> + Send + 'static,
	{
		let mut slot = self.before_route_change.lock();
		if slot.is_some() {
			return Err(RouterError::DuplicateBeforeRouteListener);
		}
		*slot = Some(Arc::new(move |matched: Option<&FrouteMatch>| {
			Box::pin(listener(matched)) as BoxFuture<'static, bool>
		}));
		Ok(())
	}

	/// Removes the before-change guard.
	pub fn clear_before_route_change_listener(&self) {
		*self.before_route_change.lock() = None;
	}

	/// Registers an observer of committed push and pop navigations.
	pub fn observe_route_changed<F>(&self, listener: F) -> NavigationListener
	where
		F: Fn(&Location) + Send + Sync + 'static,
	{
		let listener: NavigationListener = Arc::new(listener);
		self.route_changed.write().push(Arc::clone(&listener));
		listener
	}

	/// Removes an observer by identity. Returns `true` if it was registered.
	pub fn unobserve_route_changed(&self, listener: &NavigationListener) -> bool {
		let mut listeners = self.route_changed.write();
		let before = listeners.len();
		listeners.retain(|l| !Arc::ptr_eq(l, listener));
		before != listeners.len()
	}

	/// Moves the history one entry back and navigates to it.
	///
	/// If the before-change guard rejects the move, the history is stepped
	/// forward again so it stays on the committed entry.
	pub async fn back(&self) -> RouterResult<()> {
		self.history.back();
		if self.drain_history_updates().await? == Some(Settled::Prevented) {
			self.step_unobserved(|history| history.forward());
		}
		Ok(())
	}

	/// Moves the history one entry forward and navigates to it.
	///
	/// If the before-change guard rejects the move, the history is stepped
	/// back again so it stays on the committed entry.
	pub async fn forward(&self) -> RouterResult<()> {
		self.history.forward();
		if self.drain_history_updates().await? == Some(Settled::Prevented) {
			self.step_unobserved(|history| history.back());
		}
		Ok(())
	}

	/// Navigates to every history position change observed since the last
	/// call, oldest first.
	///
	/// Use this after driving the history directly. A move rejected by the
	/// before-change guard is left in place.
	pub async fn process_history_updates(&self) -> RouterResult<()> {
		self.drain_history_updates().await.map(|_| ())
	}

	async fn drain_history_updates(&self) -> RouterResult<Option<Settled>> {
		let mut last = None;
		loop {
			let update = self.pending.lock().pop_front();
			let Some(update) = update else {
				return Ok(last);
			};
			tracing::debug!(pathname = %update.location.pathname, "history moved");

			let options = NavigateOptions::pop(update.location.state.clone());
			last = Some(self.run_navigation(update.location.parts().into(), options).await?);
		}
	}

	fn step_unobserved(&self, step: impl FnOnce(&dyn History)) {
		self.unsubscribe();
		let _resubscribe = Resubscribe(self);
		step(self.history.as_ref());
		tracing::debug!(pathname = %self.history.location().pathname, "history move reverted");
	}

	/// Detaches the router from its history and drops observers, event
	/// listeners, the guard and the committed state. Calling it again does
	/// nothing.
	pub fn dispose(&self) {
		if self.disposed.swap(true, Ordering::SeqCst) {
			return;
		}

		self.unsubscribe();
		self.pending.lock().clear();
		self.route_changed.write().clear();
		self.events.clear();
		*self.before_route_change.lock() = None;

		let mut state = self.state.lock();
		state.location = None;
		state.current_match = None;
		tracing::debug!(sid = %self.sid, "router disposed");
	}

	/// Returns `true` after [`RouterContext::dispose`].
	pub fn is_disposed(&self) -> bool {
		self.disposed.load(Ordering::SeqCst)
	}

	fn subscribe(&self) {
		if self.is_disposed() {
			return;
		}
		let mut subscription = self.subscription.lock();
		if subscription.is_some() {
			return;
		}

		let pending = Arc::clone(&self.pending);
		*subscription = Some(self.history.listen(Box::new(move |update| {
			if update.action == NavigationType::Pop {
				pending.lock().push_back(update.clone());
			}
		})));
	}

	fn unsubscribe(&self) {
		let unlisten = self.subscription.lock().take();
		if let Some(unlisten) = unlisten {
			unlisten();
		}
	}
}

/// How a navigation ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settled {
	Committed,
	Prevented,
	Superseded,
}

/// Restores the history subscription when a navigation ends, including when
/// its future is dropped.
struct Resubscribe<'a>(&'a RouterContext);

impl Drop for Resubscribe<'_> {
	fn drop(&mut self) {
		self.0.subscribe();
	}
}

impl fmt::Debug for RouterContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.state.lock();
		f.debug_struct("RouterContext")
			.field("sid", &self.sid)
			.field("routes_count", &self.routes.len())
			.field("status_code", &state.status_code)
			.field("redirect_to", &state.redirect_to)
			.field("location", &state.location.as_ref().map(Location::href))
			.field("disposed", &self.is_disposed())
			.finish()
	}
}
