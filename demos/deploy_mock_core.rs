// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Deploy MockCore and read it back
//!
//! Deploys a fresh MockCore, waits for the receipt, then queries it through
//! both the deploying signer and a read-only provider.
//!
//! Environment variables (set these in .env file):
//! - PRIVATE_KEY: Deployer private key (must start with 0x)
//! - RPC_URL: JSON-RPC endpoint, defaults to a local anvil node
//!
//! Run with: `cargo run --example deploy_mock_core`

use alloy_network::EthereumWallet;
use alloy_primitives::{Bytes, B256};
use alloy_provider::ProviderBuilder;
use alloy_signer_local::PrivateKeySigner;
use dotenvy::dotenv;
use mock_core_rs::providers::{read_only_http, AlloyContext};
use mock_core_rs::{ConfirmationConfig, MockCoreError, MockCoreFactory, TxOverrides};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("MockCore deployment");
    println!("===================\n");

    let private_key = std::env::var("PRIVATE_KEY").expect("PRIVATE_KEY must be set in .env file");
    let rpc_url: url::Url = std::env::var("RPC_URL")
        .unwrap_or_else(|_| "http://localhost:8545".to_string())
        .parse()?;

    let signer: PrivateKeySigner = private_key.parse().expect("Invalid PRIVATE_KEY format");
    let deployer = signer.address();
    println!("Deployer: {deployer}");

    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .connect_http(rpc_url.clone());

    let factory = MockCoreFactory::new(AlloyContext::with_signer(provider, deployer))
        .with_confirmation(ConfirmationConfig::local_devnet());

    // 1. Inspect the creation transaction without sending it
    let tx = factory.get_deploy_transaction(&TxOverrides::default())?;
    let init_code_len = tx.input.input().map_or(0, |code| code.len());
    println!("1. Init code: {init_code_len} bytes");

    // 2. Deploy and wait for the receipt
    let pending = factory.deploy(TxOverrides::default()).await?;
    println!("2. Deployment submitted: {}", pending.tx_hash());
    let core = pending.deployed().await?;
    println!("   MockCore deployed at {}", core.address());

    // 3. Query through a read-only provider
    let reader = MockCoreFactory::connect_to(core.address(), read_only_http(rpc_url));
    println!("3. Read-only queries:");
    println!("   localDomain:            {}", reader.local_domain().await?);
    println!("   MAX_MESSAGE_BODY_BYTES: {}", reader.max_message_body_bytes().await?);
    println!("   home:                   {}", reader.home().await?);
    println!("   nonces(1000):           {}", reader.nonces(1000).await?);

    // 4. State-changing calls need a signer
    match reader
        .dispatch(1000, B256::ZERO, Bytes::from_static(b"ping"), TxOverrides::default())
        .await
    {
        Err(MockCoreError::ReadOnlyContext { .. }) => {
            println!("4. Read-only dispatch refused, as expected")
        }
        Err(e) => println!("4. Dispatch failed: {e}"),
        Ok(pending) => println!("4. Unexpected submission: {}", pending.tx_hash()),
    }

    Ok(())
}
