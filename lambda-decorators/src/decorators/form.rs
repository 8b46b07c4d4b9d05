use crate::{response::BODY, Context, Error, Middleware};
use serde_json::{Map, Value};
use url::form_urlencoded;

/// Decodes an `application/x-www-form-urlencoded` string `body` into a mapping
/// from field name to the list of its values, in order of appearance.
///
/// `a=1&b=2&a=3` becomes `{"a": ["1", "3"], "b": ["2"]}`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LoadUrlencodedBody;

impl Middleware for LoadUrlencodedBody {
    fn before(&self, mut event: Value, ctx: Context) -> Result<(Value, Context), Error> {
        if let Some(Value::String(raw)) = event.get(BODY) {
            let mut fields = Map::new();
            for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
                let values = fields
                    .entry(key.into_owned())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(values) = values {
                    values.push(Value::String(value.into_owned()));
                }
            }
            event[BODY] = Value::Object(fields);
        }
        Ok((event, ctx))
    }
}
