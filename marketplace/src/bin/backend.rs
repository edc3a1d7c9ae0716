use marketplace::server::{initialize_executable, run_backend};
use marketplace::storage::MongoShopStorage;
use std::error::Error;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    println!("Starting backend...");
    let config = initialize_executable()?;
    let storage =
        MongoShopStorage::new(&config.common.database_url, &config.common.database_name).await?;
    run_backend(config, Arc::new(storage)).await
}
