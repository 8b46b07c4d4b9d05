use lambda_decorators::decorators::{CorsHeaders, JsonHttpResp, LoadJsonBody};
use lambda_decorators::{handler_fn, Context, Error, HandlerExt};
use serde_json::{json, Value};

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let func = handler_fn(func)
        .with(LoadJsonBody)
        .with(JsonHttpResp::default())
        .with(CorsHeaders::new("https://example.com").credentials(true));
    lambda_decorators::run(func).await?;
    Ok(())
}

fn func(event: Value, _ctx: Context) -> Result<Value, Error> {
    Ok(json!({ "foo": event["body"]["foo"] }))
}
