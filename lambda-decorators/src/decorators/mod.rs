//! The bundled middlewares.
//!
//! | middleware | hooks | effect |
//! |---|---|---|
//! | [`CorsHeaders`] | after | adds `Access-Control-Allow-*` headers |
//! | [`DumpJsonBody`] | after, on_exception | serializes the response `body` |
//! | [`JsonHttpResp`] | after, on_exception | wraps the return value in a 200 JSON response |
//! | [`LoadJsonBody`] | before, on_exception | parses a JSON request `body` |
//! | [`LoadJsonQueryStringParameters`] | before, on_exception | parses JSON query parameters |
//! | [`LoadUrlencodedBody`] | before | decodes a form-encoded request `body` |
//! | [`JsonSchemaValidator`] | before, after, on_exception | validates requests and responses |
//! | [`NoRetryOnFailure`] | before, on_exception | swallows retries of a request ID |
//! | [`SsmParameterStore`] | before | fills [`Context::parameters`](crate::Context::parameters) |
//! | [`SecretsManager`] | before | fills [`Context::secrets`](crate::Context::secrets) |
//!
//! [`async_handler`] is not a middleware but a handler adapter for `async fn`s.

mod async_handler;
mod cors;
mod form;
mod json;
mod no_retry;
mod schema;
mod secrets;
mod ssm;

pub use self::async_handler::{async_handler, AsyncHandler};
pub use self::cors::{CorsHeaders, ALLOW_CREDENTIALS, ALLOW_ORIGIN};
pub use self::form::LoadUrlencodedBody;
pub use self::json::{DumpJsonBody, JsonHttpResp, LoadJsonBody, LoadJsonQueryStringParameters};
pub use self::no_retry::{NoRetryOnFailure, SeenRequests};
pub use self::schema::JsonSchemaValidator;
pub use self::secrets::{SecretStore, SecretsManager, SecretsManagerStore};
pub use self::ssm::{ParameterStore, SsmParameterStore, SsmStore, MAX_NAMES_PER_REQUEST};
