use std::env;
use std::error::Error;
use log::info;

#[cfg(feature = "lambda")]
use lambda_runtime::service_fn;

use crate::handlers::handle_invocation;
use crate::ingest::NewsIngestor;
use crate::news::{ProviderConfig, ProviderFactory};
use crate::stream::KinesisPublisher;

#[cfg(feature = "lambda")]
use crate::handlers::lambda_handler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMode {
    Lambda,
    Local,
}

impl std::fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeploymentMode::Lambda => write!(f, "AWS LAMBDA"),
            DeploymentMode::Local => write!(f, "LOCAL (single run)"),
        }
    }
}

pub fn is_lambda_environment() -> bool {
    env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok() ||
    env::var("AWS_LAMBDA_RUNTIME_API").is_ok() ||
    // Manual override
    env::var("LAMBDA_MODE").map(|v| v == "true").unwrap_or(false)
}

pub fn detect_deployment_mode() -> DeploymentMode {
    if is_lambda_environment() {
        DeploymentMode::Lambda
    } else {
        DeploymentMode::Local
    }
}

/// Build the long-lived clients once per process
pub async fn build_ingestor() -> Result<NewsIngestor, Box<dyn Error>> {
    let provider_config = ProviderConfig::from_env()?;
    let provider = ProviderFactory::create(&provider_config)?;
    info!("📡 News provider: {} ({})", provider.name(), provider_config.kind);

    let publisher = KinesisPublisher::from_env().await;

    Ok(NewsIngestor::new(provider, Box::new(publisher)))
}

#[cfg(feature = "lambda")]
pub async fn run_lambda_mode(ingestor: NewsIngestor) -> Result<(), Box<dyn Error>> {
    info!("☁️ AWS Lambda environment detected - setting up Lambda runtime");

    let ingestor = &ingestor;
    info!("👂 Lambda handler ready to receive invocations!");
    lambda_runtime::run(service_fn(move |event| async move {
        lambda_handler(ingestor, event).await
    }))
    .await
    .map_err(|e| format!("Lambda runtime failed: {e}").into())
}

pub async fn run_local_mode(ingestor: NewsIngestor) -> Result<(), Box<dyn Error>> {
    info!("🖥️ Local environment detected - running a single invocation");

    let response = handle_invocation(&ingestor).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if response.success {
        Ok(())
    } else {
        Err(format!("Invocation finished with status {:?}", response.status).into())
    }
}
