use crate::{response::http_response, Context, DecoratorError, Error, Middleware};
use http::StatusCode;
use jsonschema::Validator;
use log::debug;
use serde_json::Value;
use std::fmt;

/// Validates events and responses against JSON schemas.
///
/// An event violating the request schema is answered with `400` and the
/// handler is skipped; a response violating the response schema is replaced by
/// a `500`. In both cases the body names the first violation, prefixed with
/// `RequestValidationError: ` or `ResponseValidationError: `.
#[derive(Clone, Default)]
pub struct JsonSchemaValidator {
    request: Option<Validator>,
    response: Option<Validator>,
}

impl fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaValidator")
            .field("request", &self.request.is_some())
            .field("response", &self.response.is_some())
            .finish()
    }
}

fn compile(schema: &Value) -> Result<Validator, DecoratorError> {
    jsonschema::validator_for(schema).map_err(|e| DecoratorError::InvalidSchema(e.to_string()))
}

fn first_violation(validator: &Validator, instance: &Value) -> Option<String> {
    validator.iter_errors(instance).next().map(|e| e.to_string())
}

impl JsonSchemaValidator {
    /// Compiles the given schemas. Either may be left out.
    pub fn new(
        request_schema: Option<&Value>,
        response_schema: Option<&Value>,
    ) -> Result<Self, DecoratorError> {
        Ok(Self {
            request: request_schema.map(compile).transpose()?,
            response: response_schema.map(compile).transpose()?,
        })
    }

    /// Validates incoming events only.
    pub fn request(schema: &Value) -> Result<Self, DecoratorError> {
        Self::new(Some(schema), None)
    }

    /// Validates handler responses only.
    pub fn response(schema: &Value) -> Result<Self, DecoratorError> {
        Self::new(None, Some(schema))
    }
}

impl Middleware for JsonSchemaValidator {
    fn before(&self, event: Value, ctx: Context) -> Result<(Value, Context), Error> {
        if let Some(violation) = self
            .request
            .as_ref()
            .and_then(|validator| first_violation(validator, &event))
        {
            return Err(DecoratorError::RequestValidation(violation).into());
        }
        Ok((event, ctx))
    }

    fn after(&self, response: Value) -> Result<Value, Error> {
        match self
            .response
            .as_ref()
            .and_then(|validator| first_violation(validator, &response))
        {
            Some(violation) => {
                let err = DecoratorError::ResponseValidation(violation);
                debug!("answering 500: {}", err);
                Ok(http_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
            }
            None => Ok(response),
        }
    }

    fn on_exception(&self, err: Error) -> Result<Value, Error> {
        match DecoratorError::find(&err) {
            Some(e @ DecoratorError::RequestValidation(_)) => {
                debug!("answering 400: {}", e);
                Ok(http_response(StatusCode::BAD_REQUEST, e.to_string()))
            }
            _ => Err(err),
        }
    }
}
