use scoped_tx::{run_scoped, ErrorCode, RpcError};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().init();

    println!("=== Error Shape Example ===\n");

    // Example 1: a business error comes back exactly as the work produced it
    println!("1. Business error passthrough...");
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "mysql://localhost/state".to_string());
    let pool = MySqlPool::connect(&database_url).await?;

    let err = run_scoped(&pool, |_tx| {
        Box::pin(async {
            Err::<(), _>(RpcError::new(
                ErrorCode::INVALID_PARAMS,
                "amount must be positive",
            ))
        })
    })
    .await
    .unwrap_err();
    println!("   code {}: {}\n", err.code(), err.message());

    // Example 2: a lifecycle failure is wrapped with a fixed message and the
    // driver error as its cause. A lazy pool to an unreachable host makes
    // begin fail on first use.
    println!("2. Connection error shape...");
    let broken: MySqlPool = MySqlPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy("mysql://unreachable.invalid/state")?;

    let err = run_scoped(&broken, |_tx| Box::pin(async { Ok::<_, RpcError>(()) }))
        .await
        .unwrap_err();
    println!("   code {}: {}", err.code(), err.message());
    if let Some(cause) = err.cause() {
        println!("   caused by: {cause}");
    }

    pool.close().await;
    Ok(())
}
