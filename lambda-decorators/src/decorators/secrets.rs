use crate::{executor::Executor, Context, DecoratorError, Error, Middleware};
use log::debug;
use rusoto_core::Region;
use rusoto_secretsmanager::{
    GetSecretValueRequest, SecretsManager as SecretsManagerApi, SecretsManagerClient,
};
use serde_json::Value;
use std::{fmt, sync::Arc};

/// A source of secret strings.
pub trait SecretStore {
    /// Fetches the current string value of the secret `name`.
    fn get_secret(&self, name: &str) -> Result<String, DecoratorError>;
}

impl<S: SecretStore + ?Sized> SecretStore for Arc<S> {
    fn get_secret(&self, name: &str) -> Result<String, DecoratorError> {
        (**self).get_secret(name)
    }
}

impl SecretStore for std::collections::HashMap<String, String> {
    fn get_secret(&self, name: &str) -> Result<String, DecoratorError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| DecoratorError::SecretStore(format!("secret {} not found", name)))
    }
}

/// AWS Secrets Manager.
pub struct SecretsManagerStore {
    client: SecretsManagerClient,
    executor: Executor,
}

impl SecretsManagerStore {
    /// A client for the region configured in the environment.
    pub fn new() -> Self {
        Self::with_client(SecretsManagerClient::new(Region::default()))
    }

    /// Uses the given client.
    pub fn with_client(client: SecretsManagerClient) -> Self {
        Self {
            client,
            executor: Executor::new(),
        }
    }
}

impl Default for SecretsManagerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SecretsManagerStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretsManagerStore").finish()
    }
}

impl SecretStore for SecretsManagerStore {
    fn get_secret(&self, name: &str) -> Result<String, DecoratorError> {
        let request = GetSecretValueRequest {
            secret_id: name.to_string(),
            ..Default::default()
        };
        let response = self
            .executor
            .block_on(self.client.get_secret_value(request))?
            .map_err(|e| DecoratorError::SecretStore(e.to_string()))?;

        response
            .secret_string
            .ok_or_else(|| DecoratorError::SecretStore(format!("secret {} has no string value", name)))
    }
}

/// Fetches secrets before each invocation and exposes them as
/// [`Context::secrets`].
///
/// A secret whose value is a JSON document (the usual shape of key/value
/// secrets) is stored parsed; any other value is stored as a JSON string.
#[derive(Debug)]
pub struct SecretsManager<S = SecretsManagerStore> {
    names: Vec<String>,
    store: S,
}

impl SecretsManager<SecretsManagerStore> {
    /// Fetches `names` from AWS Secrets Manager.
    pub fn new<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self::with_store(SecretsManagerStore::new(), names)
    }
}

impl<S: SecretStore> SecretsManager<S> {
    /// Fetches `names` from `store`.
    pub fn with_store<I, N>(store: S, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            store,
        }
    }
}

impl<S: SecretStore> Middleware for SecretsManager<S> {
    fn before(&self, event: Value, mut ctx: Context) -> Result<(Value, Context), Error> {
        for name in &self.names {
            debug!("fetching secret {}", name);
            let raw = self.store.get_secret(name)?;
            let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
            ctx.secrets.insert(name.clone(), value);
        }
        Ok((event, ctx))
    }
}
