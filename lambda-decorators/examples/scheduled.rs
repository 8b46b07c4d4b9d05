use lambda_decorators::decorators::{async_handler, NoRetryOnFailure, SsmParameterStore};
use lambda_decorators::{err_fmt, Context, Error, HandlerExt};
use log::info;
use serde_json::{json, Value};

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let func = async_handler(report)
        .with(SsmParameterStore::new(["/reports/recipient"]).memoize(true))
        .with(NoRetryOnFailure::default());
    lambda_decorators::run(func).await?;
    Ok(())
}

async fn report(_event: Value, ctx: Context) -> Result<Value, Error> {
    let recipient = ctx
        .parameters
        .get("/reports/recipient")
        .ok_or_else(|| err_fmt!("no recipient configured"))?;
    info!("sending daily report to {}", recipient);
    Ok(json!({ "sent_to": recipient }))
}
