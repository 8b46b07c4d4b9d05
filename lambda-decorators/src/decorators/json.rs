use crate::{
    response::{
        bad_request, http_response, internal_error, take_status, BODY, QUERY_STRING_PARAMETERS,
    },
    Context, DecoratorError, Error, Middleware,
};
use http::StatusCode;
use log::debug;
use serde_json::Value;

fn to_json(value: &Value, pretty: bool) -> Result<String, Error> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

/// Maps a [`DecoratorError::MalformedJson`] about `own` to `400 BAD REQUEST`
/// and re-signals every other failure.
fn recover_malformed(own: &str, err: Error) -> Result<Value, Error> {
    match DecoratorError::find(&err) {
        Some(e @ DecoratorError::MalformedJson { field, .. }) if *field == own => {
            debug!("answering 400: {}", e);
            Ok(bad_request())
        }
        _ => Err(err),
    }
}

/// Serializes the `body` of the handler's response to a JSON string.
///
/// The output is compact (`{"a":1}`) unless `pretty` is set. A response
/// without `body` (or no response at all) passes through. Any
/// failure of the wrapped handler becomes a `500` response with the failure's
/// message as body.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DumpJsonBody {
    /// Pretty-print the serialized body.
    pub pretty: bool,
}

impl Middleware for DumpJsonBody {
    fn after(&self, mut response: Value) -> Result<Value, Error> {
        if let Some(body) = response.get_mut(BODY) {
            *body = Value::String(to_json(body, self.pretty)?);
        }
        Ok(response)
    }

    fn on_exception(&self, err: Error) -> Result<Value, Error> {
        Ok(internal_error(&err))
    }
}

/// Serializes the handler's whole return value into the body of a successful
/// HTTP response.
///
/// A mapping-shaped return value may carry its own `statusCode`, which is
/// lifted out of the body into the response. The body is compact JSON
/// (`{"a":1}`) unless `pretty` is set. Failures of the wrapped handler
/// become a `500` response with the failure's message as body.
///
/// ```
/// use lambda_decorators::{decorators::JsonHttpResp, handler_fn, Context, Error, Handler, HandlerExt};
/// use serde_json::{json, Value};
///
/// let hello = handler_fn(|_: Value, _: Context| -> Result<Value, Error> {
///     Ok(json!({ "hello": "world" }))
/// })
/// .with(JsonHttpResp::default());
///
/// assert_eq!(
///     json!({ "statusCode": 200, "body": r#"{"hello":"world"}"# }),
///     hello.call(json!({}), Context::default())?
/// );
/// # Ok::<(), Error>(())
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct JsonHttpResp {
    /// Pretty-print the serialized body.
    pub pretty: bool,
}

impl Middleware for JsonHttpResp {
    fn after(&self, mut response: Value) -> Result<Value, Error> {
        let status = response
            .as_object_mut()
            .and_then(take_status)
            .unwrap_or(StatusCode::OK);
        Ok(http_response(status, to_json(&response, self.pretty)?))
    }

    fn on_exception(&self, err: Error) -> Result<Value, Error> {
        Ok(internal_error(&err))
    }
}

/// Parses a string `body` of the incoming event as JSON.
///
/// When the body is not valid JSON the handler is skipped and the caller gets
/// `400 BAD REQUEST`. Only malformed JSON reported for `body` is answered
/// this way; failures about other fields propagate.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LoadJsonBody;

impl Middleware for LoadJsonBody {
    fn before(&self, mut event: Value, ctx: Context) -> Result<(Value, Context), Error> {
        if let Some(Value::String(raw)) = event.get(BODY) {
            let parsed = serde_json::from_str(raw)
                .map_err(|source| DecoratorError::MalformedJson { field: BODY, source })?;
            event[BODY] = parsed;
        }
        Ok((event, ctx))
    }

    fn on_exception(&self, err: Error) -> Result<Value, Error> {
        recover_malformed(BODY, err)
    }
}

/// Parses JSON-encoded `queryStringParameters` of the incoming event.
///
/// A string holding the whole parameter mapping is parsed as one document;
/// failure to parse it answers `400 BAD REQUEST`. In a mapping, each string
/// value that is itself valid JSON is replaced by the parsed value and other
/// values are kept as they are.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LoadJsonQueryStringParameters;

impl Middleware for LoadJsonQueryStringParameters {
    fn before(&self, mut event: Value, ctx: Context) -> Result<(Value, Context), Error> {
        match event.get_mut(QUERY_STRING_PARAMETERS) {
            Some(Value::String(raw)) => {
                let parsed = serde_json::from_str(raw).map_err(|source| {
                    DecoratorError::MalformedJson {
                        field: QUERY_STRING_PARAMETERS,
                        source,
                    }
                })?;
                event[QUERY_STRING_PARAMETERS] = parsed;
            }
            Some(Value::Object(params)) => {
                for value in params.values_mut() {
                    let parsed = match value {
                        Value::String(raw) => serde_json::from_str::<Value>(raw).ok(),
                        _ => None,
                    };
                    if let Some(parsed) = parsed {
                        *value = parsed;
                    }
                }
            }
            _ => {}
        }
        Ok((event, ctx))
    }

    fn on_exception(&self, err: Error) -> Result<Value, Error> {
        recover_malformed(QUERY_STRING_PARAMETERS, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{err_fmt, handler_fn, Handler, HandlerExt};
    use serde_json::json;

    fn returning(response: Value) -> impl Handler {
        handler_fn(move |_: Value, _: Context| -> Result<Value, Error> { Ok(response.clone()) })
    }

    fn barf() -> impl Handler {
        handler_fn(|_: Value, _: Context| -> Result<Value, Error> { Err(err_fmt!("barf").into()) })
    }

    fn echo() -> impl Handler {
        handler_fn(|event: Value, _: Context| -> Result<Value, Error> { Ok(event) })
    }

    fn call(handler: impl Handler, event: Value) -> Value {
        handler.call(event, Context::default()).unwrap()
    }

    #[test]
    fn dump_json_body_ok() {
        let handler = returning(json!({ "statusCode": 200, "body": { "foobar": 42 } }))
            .with(DumpJsonBody::default());
        assert_eq!(
            json!({ "statusCode": 200, "body": r#"{"foobar":42}"# }),
            call(handler, json!({}))
        );
    }

    #[test]
    fn dump_json_body_no_response() {
        let handler = returning(Value::Null).with(DumpJsonBody::default());
        assert_eq!(Value::Null, call(handler, json!({})));
    }

    #[test]
    fn dump_json_body_error() {
        let handler = barf().with(DumpJsonBody::default());
        assert_eq!(
            json!({ "statusCode": 500, "body": "barf" }),
            call(handler, json!({}))
        );
    }

    #[test]
    fn dump_json_body_pretty() {
        let handler = returning(json!({ "body": { "foobar": 42 } }))
            .with(DumpJsonBody { pretty: true });
        assert_eq!(
            json!({ "body": "{\n  \"foobar\": 42\n}" }),
            call(handler, json!({}))
        );
    }

    #[test]
    fn json_http_resp_ok() {
        let handler = returning(json!({ "foobar": 42 })).with(JsonHttpResp::default());
        assert_eq!(
            json!({ "statusCode": 200, "body": r#"{"foobar":42}"# }),
            call(handler, json!({}))
        );
    }

    #[test]
    fn json_http_resp_no_response() {
        let handler = returning(Value::Null).with(JsonHttpResp::default());
        assert_eq!(
            json!({ "statusCode": 200, "body": "null" }),
            call(handler, json!({}))
        );
    }

    #[test]
    fn json_http_resp_error() {
        let handler = barf().with(JsonHttpResp::default());
        assert_eq!(
            json!({ "statusCode": 500, "body": "barf" }),
            call(handler, json!({}))
        );
    }

    #[test]
    fn json_http_resp_w_status_code() {
        let handler =
            returning(json!({ "foo": "bar", "statusCode": 403 })).with(JsonHttpResp::default());
        assert_eq!(
            json!({ "statusCode": 403, "body": r#"{"foo":"bar"}"# }),
            call(handler, json!({}))
        );
    }

    #[test]
    fn json_http_resp_w_list() {
        let handler = returning(json!([2, 4, 6])).with(JsonHttpResp::default());
        assert_eq!(
            json!({ "statusCode": 200, "body": "[2,4,6]" }),
            call(handler, json!({}))
        );
    }

    #[test]
    fn load_json_body_ok() {
        let handler = echo().with(LoadJsonBody);
        assert_eq!(
            json!({ "body": { "foo": "bar" } }),
            call(handler, json!({ "body": r#"{"foo":"bar"}"# }))
        );
    }

    #[test]
    fn load_json_body_bad_request() {
        let handler = echo().with(LoadJsonBody);
        assert_eq!(
            json!({ "statusCode": 400, "body": "BAD REQUEST" }),
            call(handler, json!({ "body": "{not json" }))
        );
    }

    #[test]
    fn load_json_body_keeps_handler_errors() {
        let handler = barf().with(LoadJsonBody);
        let err = handler
            .call(json!({ "body": "{}" }), Context::default())
            .unwrap_err();
        assert_eq!("barf", err.to_string());
    }

    #[test]
    fn load_json_body_without_body() {
        let handler = echo().with(LoadJsonBody);
        assert_eq!(json!({ "path": "/" }), call(handler, json!({ "path": "/" })));
    }

    #[test]
    fn query_string_parameters_empty() {
        let handler = echo().with(LoadJsonQueryStringParameters);
        assert_eq!(json!({}), call(handler, json!({})));
    }

    #[test]
    fn query_string_parameters_document() {
        let handler = echo().with(LoadJsonQueryStringParameters);
        assert_eq!(
            json!({ "queryStringParameters": {} }),
            call(&handler, json!({ "queryStringParameters": "{}" }))
        );
        assert_eq!(
            json!({ "queryStringParameters": { "foo": { "bar1": ["baz1", 2], "bar2": null } } }),
            call(
                &handler,
                json!({ "queryStringParameters": r#"{"foo": {"bar1": ["baz1", 2], "bar2": null}}"# })
            )
        );
    }

    #[test]
    fn query_string_parameters_values() {
        let handler = echo().with(LoadJsonQueryStringParameters);
        assert_eq!(
            json!({ "queryStringParameters": { "ids": [1, 2], "flag": true, "name": "bob" } }),
            call(
                handler,
                json!({ "queryStringParameters": { "ids": "[1, 2]", "flag": "true", "name": "bob" } })
            )
        );
    }

    #[test]
    fn query_string_parameters_bad_request() {
        let handler = echo().with(LoadJsonQueryStringParameters);
        assert_eq!(
            json!({ "statusCode": 400, "body": "BAD REQUEST" }),
            call(handler, json!({ "queryStringParameters": "{'foo': 1}" }))
        );
    }

    #[test]
    fn classic_stack() {
        let handler = handler_fn(|event: Value, _: Context| -> Result<Value, Error> {
            Ok(json!({ "hello": event["body"]["name"] }))
        })
        .with(LoadJsonBody)
        .with(JsonHttpResp::default());

        assert_eq!(
            json!({ "statusCode": 200, "body": r#"{"hello":"world"}"# }),
            call(&handler, json!({ "body": r#"{"name": "world"}"# }))
        );
        // The 400 produced by the inner layer is a normal value to the outer one.
        assert_eq!(
            json!({ "statusCode": 400, "body": r#"{"body":"BAD REQUEST"}"# }),
            call(&handler, json!({ "body": "oops" }))
        );
    }

    #[test]
    fn load_json_body_recovers_only_its_own_field() {
        let handler = handler_fn(|_: Value, _: Context| -> Result<Value, Error> {
            let source = serde_json::from_str::<Value>("{").unwrap_err();
            Err(DecoratorError::MalformedJson {
                field: QUERY_STRING_PARAMETERS,
                source,
            }
            .into())
        })
        .with(LoadJsonBody);

        let err = handler
            .call(json!({ "body": "{}" }), Context::default())
            .unwrap_err();
        assert!(matches!(
            DecoratorError::find(&err),
            Some(DecoratorError::MalformedJson {
                field: QUERY_STRING_PARAMETERS,
                ..
            })
        ));
    }

    #[test]
    fn inner_query_string_failure_passes_body_layer() {
        let handler = echo()
            .with(LoadJsonQueryStringParameters)
            .with(LoadJsonBody);
        assert_eq!(
            json!({ "statusCode": 400, "body": "BAD REQUEST" }),
            call(&handler, json!({ "body": "{}", "queryStringParameters": "nope" }))
        );
    }
}
