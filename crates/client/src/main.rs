// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::Context as _;
use dots::logging::{self, LoggingConfig};
use dots::{Context, storage};
use dots_config::{Args, DotsConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse_args();
    let config = DotsConfig::from_env_file(&args.env_file)?;
    logging::init_with_config(LoggingConfig::from(&config.log))?;

    tracing::info!("Log level: {}", config.log.level);
    tracing::info!("Substrate URL: {}", config.substrate.url);

    let context = Context::connect(&config).await?;
    let system = context.system();
    println!("{} {} on {}", system.name, system.version, system.chain);
    println!("Account {}", context.address());

    let version = context.runtime_version().await?;
    println!(
        "Runtime {} version {} (transaction version {})",
        version.spec_name, version.spec_version, version.transaction_version
    );

    let (Some(pallet_name), Some(item_name)) = (&args.pallet, &args.item) else {
        return Ok(());
    };

    let loaded = context.metadata().await?;
    let pallet = loaded
        .metadata
        .pallet(pallet_name)
        .with_context(|| format!("Pallet {} not found", pallet_name))?;
    let item = pallet
        .storage_item(item_name)
        .with_context(|| format!("Storage item {}::{} not found", pallet_name, item_name))?;

    let value = match &args.key {
        Some(key) => {
            context
                .query_storage_map(pallet_name, item, &storage::parse_key_input(key))
                .await
        }
        None => context.query_storage(pallet_name, item).await,
    };

    match value {
        Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        None => println!("null"),
    }

    Ok(())
}
