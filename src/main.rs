use log::info;

mod deployment;
mod handlers;
mod ingest;
mod news;
mod record;
mod stream;

use deployment::{build_ingestor, detect_deployment_mode, run_local_mode, DeploymentMode};

#[cfg(feature = "lambda")]
use deployment::run_lambda_mode;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();
    info!("Starting news ingestor...");

    let deployment_mode = detect_deployment_mode();

    info!("🚀 Ingestor deployment detection: {deployment_mode}");

    let ingestor = match build_ingestor().await {
        Ok(ingestor) => ingestor,
        Err(e) => panic!("Ingestor failed to initialize: {e}"),
    };

    let result = match deployment_mode {
        DeploymentMode::Lambda => {
            #[cfg(feature = "lambda")]
            {
                run_lambda_mode(ingestor).await
            }
            #[cfg(not(feature = "lambda"))]
            {
                panic!("Lambda environment detected but lambda feature not enabled. Compile with --features lambda");
            }
        }
        DeploymentMode::Local => run_local_mode(ingestor).await,
    };

    if let Err(e) = result {
        panic!("News ingestor failed: {e}");
    }
}
