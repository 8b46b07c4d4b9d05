use crate::{response::HEADERS, Error, Middleware};
use log::warn;
use serde_json::{Map, Value};

/// Response header naming the allowed origin.
pub const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
/// Response header allowing credentialed requests.
pub const ALLOW_CREDENTIALS: &str = "Access-Control-Allow-Credentials";

/// Injects CORS headers into HTTP responses.
///
/// ```
/// use lambda_decorators::{decorators::CorsHeaders, handler_fn, Context, Error, HandlerExt, Handler};
/// use serde_json::{json, Value};
///
/// let hello = handler_fn(|_: Value, _: Context| -> Result<Value, Error> {
///     Ok(json!({ "body": "foobar" }))
/// })
/// .with(CorsHeaders::new("https://example.com"));
///
/// assert_eq!(
///     json!({
///         "body": "foobar",
///         "headers": { "Access-Control-Allow-Origin": "https://example.com" },
///     }),
///     hello.call(json!({}), Context::default())?
/// );
/// # Ok::<(), Error>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct CorsHeaders {
    /// Value of `Access-Control-Allow-Origin`. Defaults to `*`.
    pub origin: String,
    /// Also send `Access-Control-Allow-Credentials: true`.
    pub credentials: bool,
}

impl Default for CorsHeaders {
    fn default() -> Self {
        Self {
            origin: String::from("*"),
            credentials: false,
        }
    }
}

impl CorsHeaders {
    /// CORS headers for a custom origin.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            ..Self::default()
        }
    }

    /// Sets whether credentialed requests are allowed.
    pub fn credentials(mut self, credentials: bool) -> Self {
        self.credentials = credentials;
        self
    }

    fn apply(&self, headers: &mut Map<String, Value>) {
        headers.insert(ALLOW_ORIGIN.to_string(), Value::from(self.origin.as_str()));
        if self.credentials {
            headers.insert(ALLOW_CREDENTIALS.to_string(), Value::Bool(true));
        }
    }
}

impl Middleware for CorsHeaders {
    fn after(&self, response: Value) -> Result<Value, Error> {
        let mut response = match response {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        let map = match response.as_object_mut() {
            Some(map) => map,
            None => {
                warn!("cannot add CORS headers to a non-mapping response");
                return Ok(response);
            }
        };

        match map
            .entry(HEADERS)
            .or_insert_with(|| Value::Object(Map::new()))
        {
            Value::Object(headers) => self.apply(headers),
            _ => warn!("cannot add CORS headers: `headers` is not a mapping"),
        }
        Ok(response)
    }
}
