use lambda_decorators::decorate;
use lambda_decorators::decorators::{CorsHeaders, JsonHttpResp, LoadJsonBody};
use lambda_decorators::{Context, Error};
use serde_json::{json, Value};

#[decorate(CorsHeaders::new("https://example.com"), JsonHttpResp::default(), LoadJsonBody)]
fn hello(event: Value, _ctx: Context) -> Result<Value, Error> {
    Ok(json!({ "hello": event["body"]["name"] }))
}

fn main() {
    let response = hello(json!({ "body": r#"{"name": "world"}"# }), Context::default()).unwrap();
    assert_eq!(
        json!({
            "statusCode": 200,
            "body": r#"{"hello":"world"}"#,
            "headers": { "Access-Control-Allow-Origin": "https://example.com" },
        }),
        response
    );
}
