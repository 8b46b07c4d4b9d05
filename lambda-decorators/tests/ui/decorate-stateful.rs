use lambda_decorators::decorate;
use lambda_decorators::decorators::NoRetryOnFailure;
use lambda_decorators::{err_fmt, Context, Error};
use serde_json::{json, Value};

#[decorate(NoRetryOnFailure::default())]
fn scheduled(_event: Value, _ctx: Context) -> Result<Value, Error> {
    Err(err_fmt!("job failed").into())
}

fn main() {
    assert!(scheduled(json!({}), Context::new("req-1")).is_err());
    // The stack, and the set of seen request IDs, outlives a single call.
    let retry = scheduled(json!({}), Context::new("req-1")).unwrap();
    assert_eq!(json!({ "statusCode": 200 }), retry);
}
