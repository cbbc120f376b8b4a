//! Core trait abstractions for contract deployment and interaction.
//!
//! The adapter never talks to a node directly. Everything that touches the
//! network goes through an [`ExecutionContext`] supplied by the caller, and
//! every wait goes through a [`Clock`]. Production code uses
//! [`AlloyContext`](crate::providers::AlloyContext) and
//! [`TokioClock`](crate::providers::TokioClock); tests use the fakes in
//! [`crate::testing`].
//!
//! # Example: Implementing a Test Fake
//!
//! ```rust,ignore
//! use mock_core_rs::{ExecutionContext, Receipt, Result};
//!
//! struct AlwaysEmpty;
//!
//! #[async_trait::async_trait]
//! impl ExecutionContext for AlwaysEmpty {
//!     fn signer(&self) -> Option<Address> { None }
//!     async fn call(&self, _tx: TransactionRequest) -> Result<Bytes> { Ok(Bytes::new()) }
//!     // ...
//! }
//! ```

use alloy_primitives::{Address, Bytes, TxHash};
use alloy_rpc_types::TransactionRequest;
use async_trait::async_trait;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::receipt::Receipt;

/// A signer or a read-only provider.
///
/// A context with a [`signer`](ExecutionContext::signer) can authorize and
/// submit transactions; one without is limited to queries. The adapter checks
/// this before submitting anything, so a read-only context never sees a
/// `send_transaction` request from it.
///
/// Implementations are free to be shared across many client handles at once.
/// Ordering of concurrent submissions is whatever the implementation (and the
/// node behind it) enforces.
#[async_trait]
pub trait ExecutionContext: Send + Sync {
    /// Address transactions are signed by, `None` for read-only providers.
    fn signer(&self) -> Option<Address>;

    /// Returns `true` if this context cannot submit transactions.
    fn is_read_only(&self) -> bool {
        self.signer().is_none()
    }

    /// Executes a call without creating a transaction (`eth_call`).
    ///
    /// # Errors
    ///
    /// Reverts are reported as [`MockCoreError::Execution`](crate::MockCoreError::Execution),
    /// transport failures as [`MockCoreError::Rpc`](crate::MockCoreError::Rpc).
    async fn call(&self, tx: TransactionRequest) -> Result<Bytes>;

    /// Signs and submits a transaction, returning its hash.
    ///
    /// # Errors
    ///
    /// Failures are reported as [`MockCoreError::Submission`](crate::MockCoreError::Submission)
    /// carrying the transport error unmodified.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash>;

    /// Fetches the receipt of a transaction, `None` while it is still pending.
    async fn get_transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>>;

    /// Returns the runtime bytecode stored at `address`.
    async fn get_code_at(&self, address: Address) -> Result<Bytes>;
}

/// Trait for time-based operations.
///
/// Receipt polling sleeps through this trait, so tests can run through long
/// confirmation waits instantly.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Asynchronously sleeps for the given duration.
    async fn sleep(&self, duration: Duration);

    /// Returns the current instant in time.
    fn now(&self) -> Instant;
}
