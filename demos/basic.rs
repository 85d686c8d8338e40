use scoped_tx::{run_scoped, ErrorCode, RpcError};
use sqlx::MySqlPool;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().init();

    // Connect to database
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "mysql://localhost/state".to_string());
    let pool = MySqlPool::connect(&database_url).await?;

    println!("=== Scoped Transaction Example ===\n");

    // Example 1: Simple INSERT
    println!("1. Creating an account...");
    run_scoped(&pool, |tx| {
        Box::pin(async move {
            sqlx::query("INSERT INTO accounts (owner, balance) VALUES (?, ?)")
                .bind("alice")
                .bind(100_i64)
                .execute(tx.as_executor())
                .await
                .map_err(|e| RpcError::with_cause(ErrorCode::DEFAULT, "insert failed", e))?;
            Ok(())
        })
    })
    .await?;
    println!("   ✓ Account created successfully\n");

    // Example 2: Multiple operations in one scope
    println!("2. Transferring funds...");
    let remaining: i64 = run_scoped(&pool, |tx| {
        Box::pin(async move {
            sqlx::query("UPDATE accounts SET balance = balance - 30 WHERE owner = ?")
                .bind("alice")
                .execute(tx.as_executor())
                .await
                .map_err(|e| RpcError::with_cause(ErrorCode::DEFAULT, "debit failed", e))?;

            sqlx::query("INSERT INTO accounts (owner, balance) VALUES (?, ?)")
                .bind("bob")
                .bind(30_i64)
                .execute(tx.as_executor())
                .await
                .map_err(|e| RpcError::with_cause(ErrorCode::DEFAULT, "credit failed", e))?;

            let balance: (i64,) = sqlx::query_as("SELECT balance FROM accounts WHERE owner = ?")
                .bind("alice")
                .fetch_one(tx.as_executor())
                .await
                .map_err(|e| RpcError::with_cause(ErrorCode::DEFAULT, "balance lookup failed", e))?;

            // Both sides of the transfer commit together
            Ok(balance.0)
        })
    })
    .await?;
    println!("   ✓ Transfer committed, alice has {remaining} left\n");

    // Example 3: Business error rolls the whole scope back
    println!("3. Testing rollback on a business error...");
    let result: Result<(), _> = run_scoped(&pool, |tx| {
        Box::pin(async move {
            sqlx::query("UPDATE accounts SET balance = balance - 1000 WHERE owner = ?")
                .bind("alice")
                .execute(tx.as_executor())
                .await
                .map_err(|e| RpcError::with_cause(ErrorCode::DEFAULT, "debit failed", e))?;

            // The debit above is rolled back
            Err(RpcError::new(
                ErrorCode::INVALID_REQUEST,
                "insufficient funds",
            ))
        })
    })
    .await;

    match result {
        Ok(_) => println!("   ✗ Should have failed!"),
        Err(e) => println!("   ✓ Scope rolled back: {e}\n"),
    }

    // Example 4: Returning values from a scope
    println!("4. Counting accounts...");
    let accounts: i64 = run_scoped(&pool, |tx| {
        Box::pin(async move {
            let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
                .fetch_one(tx.as_executor())
                .await
                .map_err(|e| RpcError::with_cause(ErrorCode::DEFAULT, "count failed", e))?;
            Ok(count.0)
        })
    })
    .await?;
    println!("   Accounts: {accounts}\n");

    println!("=== All examples completed successfully ===");

    pool.close().await;
    Ok(())
}
