//! Actors: the component loader and preload hook attached to a route.
//!
//! An [`ActorDef`] is what callers write; [`RouteDefiner::action`] turns it
//! into an [`Actor`] owned by the finished route. The actor memoizes the
//! loaded component so that repeated navigations to the same route reuse it.
//!
//! [`RouteDefiner::action`]: crate::RouteDefiner::action

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::href::{ParsedQuery, QueryValue};

/// A loaded, type-erased UI component.
pub type Component = Arc<dyn Any + Send + Sync>;

/// What a component loader produces: the component itself, or a module
/// exposing it as `default`.
#[derive(Clone)]
pub enum ComponentModule {
	/// The component.
	Component(Component),
	/// A module whose `default` export is the component.
	Module {
		/// The default export.
		default: Component,
	},
}

impl ComponentModule {
	/// Wraps a value as a bare component.
	pub fn component<C: Any + Send + Sync>(component: C) -> Self {
		ComponentModule::Component(Arc::new(component))
	}

	/// Wraps a value as a module's `default` export.
	pub fn module<C: Any + Send + Sync>(default: C) -> Self {
		ComponentModule::Module {
			default: Arc::new(default),
		}
	}

	/// Unwraps the module into its component.
	pub fn into_component(self) -> Component {
		match self {
			ComponentModule::Component(c) => c,
			ComponentModule::Module { default } => default,
		}
	}
}

impl fmt::Debug for ComponentModule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ComponentModule::Component(_) => f.write_str("ComponentModule::Component(..)"),
			ComponentModule::Module { .. } => f.write_str("ComponentModule::Module { .. }"),
		}
	}
}

/// Opaque value threaded from the router options into every preload call.
#[derive(Clone, Default)]
pub struct PreloadContext(Option<Arc<dyn Any + Send + Sync>>);

impl PreloadContext {
	/// Creates a context carrying `value`.
	pub fn new<T: Any + Send + Sync>(value: T) -> Self {
		Self(Some(Arc::new(value)))
	}

	/// Returns the carried value if it has type `T`.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.0.as_deref().and_then(|v| v.downcast_ref::<T>())
	}

	/// Returns `true` when no value was supplied.
	pub fn is_empty(&self) -> bool {
		self.0.is_none()
	}
}

impl fmt::Debug for PreloadContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PreloadContext")
			.field("is_set", &self.0.is_some())
			.finish()
	}
}

/// Query and search handed to a preload function next to the params.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreloadExtra {
	/// Parsed query, normalized through the actor's [`QueryShape`] if any.
	pub query: ParsedQuery,
	/// Raw search string including `?`, or empty.
	pub search: String,
}

/// How a declared query key is exposed to preload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
	/// Collapse to the first value.
	Single,
	/// Always a list.
	Multiple,
}

/// Declares the expected shape of a route's query string.
///
/// Undeclared keys are passed through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryShape {
	keys: BTreeMap<String, QueryKind>,
}

impl QueryShape {
	/// Creates an empty shape.
	pub fn new() -> Self {
		Self::default()
	}

	/// Declares `key` as single-valued.
	pub fn single(mut self, key: impl Into<String>) -> Self {
		self.keys.insert(key.into(), QueryKind::Single);
		self
	}

	/// Declares `key` as multi-valued.
	pub fn multiple(mut self, key: impl Into<String>) -> Self {
		self.keys.insert(key.into(), QueryKind::Multiple);
		self
	}

	/// Returns the declared kind of `key`.
	pub fn kind(&self, key: &str) -> Option<QueryKind> {
		self.keys.get(key).copied()
	}

	/// Applies the shape to a parsed query.
	pub fn normalize(&self, query: &ParsedQuery) -> ParsedQuery {
		query
			.iter()
			.map(|(key, value)| {
				let value = match (self.kind(key), value) {
					(Some(QueryKind::Single), QueryValue::Multiple(vs)) => {
						QueryValue::Single(vs.first().cloned().unwrap_or_default())
					}
					(Some(QueryKind::Multiple), QueryValue::Single(v)) => {
						QueryValue::Multiple(vec![v.clone()])
					}
					_ => value.clone(),
				};
				(key.clone(), value)
			})
			.collect()
	}
}

type ComponentLoader =
	Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<ComponentModule>> + Send + Sync>;

type PreloadFn = Arc<
	dyn Fn(PreloadContext, HashMap<String, String>, PreloadExtra) -> BoxFuture<'static, anyhow::Result<()>>
		+ Send
		+ Sync,
>;

/// Caller-facing actor definition.
///
/// # Examples
///
/// ```
/// use froute_urls::{ActorDef, ComponentModule, route_of};
///
/// let route = route_of("/users/:id").action(
/// 	ActorDef::lazy(|| async { Ok(ComponentModule::module("UserPage")) })
/// 		.preload(|_ctx, params, _extra| async move {
/// 			assert!(params.contains_key("id"));
/// 			Ok(())
/// 		}),
/// );
/// assert!(route.actor().is_some());
/// ```
#[derive(Clone)]
pub struct ActorDef {
	loader: ComponentLoader,
	preload: Option<PreloadFn>,
	query: Option<QueryShape>,
	extra: BTreeMap<String, Value>,
}

impl ActorDef {
	/// Creates a definition with a synchronous component factory.
	pub fn new<F, C>(component: F) -> Self
	where
		F: Fn() -> C + Send + Sync + 'static,
		C: Any + Send + Sync,
	{
		Self::from_loader(Arc::new(move || {
			let module = ComponentModule::component(component());
			async move { Ok::<_, anyhow::Error>(module) }.boxed()
		}))
	}

	/// Creates a definition with an asynchronous component loader.
	pub fn lazy<F, Fut>(loader: F) -> Self
	where
		F: Fn() -> Fut + Send + Sync + 'static,
		Fut: Future<Output = anyhow::Result<ComponentModule>> + Send + 'static,
	{
		Self::from_loader(Arc::new(move || loader().boxed()))
	}

	fn from_loader(loader: ComponentLoader) -> Self {
		Self {
			loader,
			preload: None,
			query: None,
			extra: BTreeMap::new(),
		}
	}

	/// Sets the preload function run before the route becomes active.
	pub fn preload<F, Fut>(mut self, preload: F) -> Self
	where
		F: Fn(PreloadContext, HashMap<String, String>, PreloadExtra) -> Fut
			+ Send
			+ Sync
			+ 'static,
		Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
	{
		self.preload = Some(Arc::new(move |ctx, params, extra| {
			preload(ctx, params, extra).boxed()
		}));
		self
	}

	/// Declares the query shape handed to preload.
	pub fn query(mut self, shape: QueryShape) -> Self {
		self.query = Some(shape);
		self
	}

	/// Attaches arbitrary metadata.
	pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
		self.extra.insert(key.into(), value);
		self
	}

	pub(crate) fn into_actor(self) -> Actor {
		Actor {
			loader: self.loader,
			preload: self.preload,
			query: self.query,
			extra: self.extra,
			cache: OnceCell::new(),
		}
	}
}

impl fmt::Debug for ActorDef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ActorDef")
			.field("has_preload", &self.preload.is_some())
			.field("query", &self.query)
			.field("extra", &self.extra)
			.finish()
	}
}

/// A route's component loader with its memoized component.
pub struct Actor {
	loader: ComponentLoader,
	preload: Option<PreloadFn>,
	query: Option<QueryShape>,
	extra: BTreeMap<String, Value>,
	cache: OnceCell<Component>,
}

impl Actor {
	/// Loads the component, running the loader at most once.
	///
	/// Concurrent callers share one in-flight load. A failed load leaves the
	/// cache empty so the next call retries.
	pub async fn load_component(&self) -> anyhow::Result<Component> {
		let component = self
			.cache
			.get_or_try_init(|| async {
				let module = (self.loader)().await?;
				tracing::debug!("component loaded");
				Ok::<_, anyhow::Error>(module.into_component())
			})
			.await?;
		Ok(Arc::clone(component))
	}

	/// Returns the component if it has already been loaded.
	pub fn cached_component(&self) -> Option<Component> {
		self.cache.get().cloned()
	}

	/// Runs the preload function, or does nothing if none is set.
	pub async fn preload(
		&self,
		context: PreloadContext,
		params: HashMap<String, String>,
		mut extra: PreloadExtra,
	) -> anyhow::Result<()> {
		let Some(preload) = &self.preload else {
			return Ok(());
		};
		if let Some(shape) = &self.query {
			extra.query = shape.normalize(&extra.query);
		}
		preload(context, params, extra).await
	}

	/// Returns `true` if a preload function is set.
	pub fn has_preload(&self) -> bool {
		self.preload.is_some()
	}

	/// Returns the declared query shape.
	pub fn query_shape(&self) -> Option<&QueryShape> {
		self.query.as_ref()
	}

	/// Returns a metadata value attached with [`ActorDef::extra`].
	pub fn extra(&self, key: &str) -> Option<&Value> {
		self.extra.get(key)
	}
}

impl fmt::Debug for Actor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Actor")
			.field("loaded", &self.cache.initialized())
			.field("has_preload", &self.preload.is_some())
			.field("query", &self.query)
			.field("extra", &self.extra)
			.finish()
	}
}
