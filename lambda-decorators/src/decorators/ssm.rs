use crate::{executor::Executor, Context, DecoratorError, Error, Middleware};
use log::debug;
use rusoto_core::Region;
use rusoto_ssm::{GetParametersRequest, Ssm, SsmClient};
use serde_json::Value;
use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex},
};

/// The most names SSM `GetParameters` accepts in one request.
pub const MAX_NAMES_PER_REQUEST: usize = 10;

/// A source of named configuration parameters.
pub trait ParameterStore {
    /// Fetches the given parameters, decrypted. Names the store does not know
    /// are left out of the result.
    ///
    /// [`SsmParameterStore`] never passes more than [`MAX_NAMES_PER_REQUEST`]
    /// names at once.
    fn get_parameters(&self, names: &[String]) -> Result<HashMap<String, String>, DecoratorError>;
}

impl<S: ParameterStore + ?Sized> ParameterStore for Arc<S> {
    fn get_parameters(&self, names: &[String]) -> Result<HashMap<String, String>, DecoratorError> {
        (**self).get_parameters(names)
    }
}

impl ParameterStore for HashMap<String, String> {
    fn get_parameters(&self, names: &[String]) -> Result<HashMap<String, String>, DecoratorError> {
        Ok(names
            .iter()
            .filter_map(|name| self.get(name).map(|value| (name.clone(), value.clone())))
            .collect())
    }
}

/// AWS Systems Manager Parameter Store.
pub struct SsmStore {
    client: SsmClient,
    executor: Executor,
}

impl SsmStore {
    /// A client for the region configured in the environment.
    pub fn new() -> Self {
        Self::with_client(SsmClient::new(Region::default()))
    }

    /// Uses the given client.
    pub fn with_client(client: SsmClient) -> Self {
        Self {
            client,
            executor: Executor::new(),
        }
    }
}

impl Default for SsmStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SsmStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SsmStore").finish()
    }
}

impl ParameterStore for SsmStore {
    fn get_parameters(&self, names: &[String]) -> Result<HashMap<String, String>, DecoratorError> {
        let request = GetParametersRequest {
            names: names.to_vec(),
            with_decryption: Some(true),
        };
        let result = self
            .executor
            .block_on(self.client.get_parameters(request))?
            .map_err(|e| DecoratorError::ParameterStore(e.to_string()))?;

        Ok(result
            .parameters
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| Some((p.name?, p.value?)))
            .collect())
    }
}

/// Fetches parameters before each invocation and adds them to
/// [`Context::parameters`].
///
/// Every requested name must be returned by the store, otherwise the
/// invocation fails with [`DecoratorError::MissingParameters`]. Parameters
/// put on the context by outer layers are kept, so several stores can be
/// stacked.
///
/// ```
/// use lambda_decorators::{decorators::SsmParameterStore, handler_fn, Context, Error, HandlerExt, Handler};
/// use serde_json::{json, Value};
/// use std::collections::HashMap;
///
/// let store: HashMap<String, String> =
///     HashMap::from([(String::from("/app/db-host"), String::from("db.internal"))]);
/// let handler = handler_fn(|_: Value, ctx: Context| -> Result<Value, Error> {
///     Ok(json!(ctx.parameters["/app/db-host"]))
/// })
/// .with(SsmParameterStore::with_store(store, ["/app/db-host"]));
///
/// assert_eq!(json!("db.internal"), handler.call(json!({}), Context::default())?);
/// # Ok::<(), Error>(())
/// ```
pub struct SsmParameterStore<S = SsmStore> {
    names: Vec<String>,
    store: S,
    memoize: bool,
    cache: Mutex<Option<HashMap<String, String>>>,
}

impl SsmParameterStore<SsmStore> {
    /// Fetches `names` from AWS Systems Manager.
    pub fn new<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self::with_store(SsmStore::new(), names)
    }
}

impl<S: ParameterStore> SsmParameterStore<S> {
    /// Fetches `names` from `store`.
    pub fn with_store<I, N>(store: S, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            store,
            memoize: false,
            cache: Mutex::new(None),
        }
    }

    /// Keeps the first successful fetch for the lifetime of the middleware.
    pub fn memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    fn fetch(&self) -> Result<HashMap<String, String>, DecoratorError> {
        let mut cache = self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(parameters) = cache.as_ref() {
            return Ok(parameters.clone());
        }

        debug!("fetching parameters {:?}", self.names);
        let mut parameters = HashMap::with_capacity(self.names.len());
        for names in self.names.chunks(MAX_NAMES_PER_REQUEST) {
            parameters.extend(self.store.get_parameters(names)?);
        }
        let missing: Vec<String> = self
            .names
            .iter()
            .filter(|name| !parameters.contains_key(*name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(DecoratorError::MissingParameters(missing));
        }

        if self.memoize {
            *cache = Some(parameters.clone());
        }
        Ok(parameters)
    }
}

impl<S> fmt::Debug for SsmParameterStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SsmParameterStore")
            .field("names", &self.names)
            .field("memoize", &self.memoize)
            .finish()
    }
}

impl<S: ParameterStore> Middleware for SsmParameterStore<S> {
    fn before(&self, event: Value, mut ctx: Context) -> Result<(Value, Context), Error> {
        ctx.parameters.extend(self.fetch()?);
        Ok((event, ctx))
    }
}
