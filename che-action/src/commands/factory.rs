//! `resolve-factory` command handler.

use anyhow::{Context, Result};

use che_config::ActionConfig;
use che_core::{che_println, che_success};
use che_workspace::FactoryClient;

use super::validate;

pub async fn handle_resolve(config: &ActionConfig, repo_url: &str) -> Result<()> {
    validate(config)?;
    let che_url = config.che_url().context("Cannot reach the Che API")?;

    let factory = FactoryClient::new(&che_url)
        .resolve(repo_url)
        .await
        .with_context(|| format!("Failed to resolve factory for {repo_url}"))?;

    che_success!("Factory resolved by {}", che_url);
    che_println!("{}", serde_json::to_string_pretty(&factory)?);
    Ok(())
}
