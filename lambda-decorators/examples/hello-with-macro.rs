use lambda_decorators::decorate;
use lambda_decorators::decorators::{CorsHeaders, JsonHttpResp};
use lambda_decorators::{handler_fn, Context, Error};
use serde_json::{json, Value};

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    lambda_decorators::run(handler_fn(hello)).await?;
    Ok(())
}

#[decorate(CorsHeaders::default(), JsonHttpResp::default())]
fn hello(_event: Value, _ctx: Context) -> Result<Value, Error> {
    Ok(json!({ "hello": "world" }))
}
