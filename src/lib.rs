//! # mock-core-rs
//!
//! Typed Rust client bindings for the MockCore messaging contract.
//!
//! The crate deploys MockCore, builds its deployment transaction without
//! sending it, and binds handles to existing instances through a caller-chosen
//! execution context: a signer that can submit transactions, or a read-only
//! provider that can only query.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mock_core_rs::{MockCoreFactory, MockCoreError, TxOverrides};
//! use mock_core_rs::providers::AlloyContext;
//! use alloy_provider::ProviderBuilder;
//!
//! # async fn example() -> Result<(), MockCoreError> {
//! let provider = ProviderBuilder::new().connect_anvil_with_wallet();
//! let factory = MockCoreFactory::new(AlloyContext::with_wallet(provider));
//!
//! // Deploy and wait for the contract to be mined
//! let core = factory.deploy(TxOverrides::default()).await?.deployed().await?;
//! println!("MockCore at {} on domain {}", core.address(), core.local_domain().await?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Existing Deployments
//!
//! ```rust,no_run
//! use mock_core_rs::MockCoreFactory;
//! use mock_core_rs::providers::read_only_http;
//! use alloy_primitives::address;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let context = read_only_http("http://localhost:8545".parse()?);
//! let core = MockCoreFactory::connect_to(
//!     address!("5FbDB2315678afecb367f032d93F642f64180aa3"),
//!     context,
//! );
//! let nonce = core.nonces(1000).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Public API
//!
//! - [`MockCoreFactory`] and [`MockCoreContract`] - Typed MockCore bindings
//! - [`ContractFactory`] and [`Contract`] - The artifact-generic layer underneath
//! - [`Interface`] and [`Artifact`] - ABI introspection and encoding
//! - [`ExecutionContext`] and [`Clock`] - Seams for signers, providers and time
//! - [`MockCoreError`] and [`Result`] - Error types for error handling

mod artifact;
mod error;
mod factory;
mod interface;
mod receipt;
mod traits;

pub mod contracts;
pub mod providers;

pub use artifact::{Artifact, EntryKind, InterfaceEntry, Parameter};
pub use contracts::mock_core::{MockCore, MockCoreContract, MockCoreFactory};
pub use error::{MockCoreError, Result};
pub use factory::{
    ConfirmationConfig, Contract, ContractFactory, PendingDeployment, PendingTransaction,
    TxOverrides, DEFAULT_POLL_INTERVAL, DEVNET_POLL_INTERVAL,
};
pub use interface::Interface;
pub use receipt::Receipt;
pub use traits::{Clock, ExecutionContext};

// Public module for advanced users who need custom instrumentation
pub mod spans;

// Fakes for exercising bindings without a node
pub mod testing;
