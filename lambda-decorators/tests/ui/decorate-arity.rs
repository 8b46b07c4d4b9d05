#[lambda_decorators::decorate]
fn hello(
    event: serde_json::Value,
) -> Result<serde_json::Value, lambda_decorators::Error> {
    Ok(event)
}

fn main() {}
