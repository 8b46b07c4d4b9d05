use lambda_decorators::decorate;
use lambda_decorators::{Context, Error};
use serde_json::Value;

#[decorate]
fn echo(event: Value, _ctx: Context) -> Result<Value, Error> {
    Ok(event)
}

fn main() {
    let response = echo(Value::from(7), Context::default()).unwrap();
    assert_eq!(Value::from(7), response);
}
