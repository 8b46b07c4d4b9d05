#[lambda_decorators::decorate]
async fn hello(
    event: serde_json::Value,
    _ctx: lambda_decorators::Context,
) -> Result<serde_json::Value, lambda_decorators::Error> {
    Ok(event)
}

fn main() {}
