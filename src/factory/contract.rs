use std::fmt;
use std::sync::Arc;

use alloy_network::TransactionBuilder;
use alloy_primitives::Address;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::SolCall;
use tracing::{debug, error, info, Instrument};

use super::{ConfirmationConfig, PendingTransaction, TxOverrides};
use crate::error::{MockCoreError, Result};
use crate::interface::Interface;
use crate::providers::TokioClock;
use crate::spans;
use crate::traits::{Clock, ExecutionContext};

/// A handle to a deployed contract: an address, its interface and the
/// execution context calls go through.
///
/// Handles are cheap to clone and immutable; [`connect`](Self::connect) and
/// [`attach`](Self::attach) return new handles and leave the original bound
/// where it was.
#[derive(Clone)]
pub struct Contract<C> {
    address: Address,
    interface: Interface,
    context: C,
    clock: Arc<dyn Clock>,
    confirmation: ConfirmationConfig,
}

impl<C: fmt::Debug> fmt::Debug for Contract<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contract")
            .field("name", &self.interface.name())
            .field("address", &self.address)
            .field("context", &self.context)
            .field("confirmation", &self.confirmation)
            .finish_non_exhaustive()
    }
}

impl<C> Contract<C> {
    pub fn new(address: Address, interface: Interface, context: C) -> Self {
        Self {
            address,
            interface,
            context,
            clock: Arc::new(TokioClock),
            confirmation: ConfirmationConfig::default(),
        }
    }

    /// Uses `clock` when waiting for receipts of transactions sent through
    /// this handle.
    pub fn with_clock(self, clock: impl Clock + 'static) -> Self {
        self.with_shared_clock(Arc::new(clock))
    }

    pub(crate) fn with_shared_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_confirmation(mut self, confirmation: ConfirmationConfig) -> Self {
        self.confirmation = confirmation;
        self
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn interface(&self) -> &Interface {
        &self.interface
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    /// A handle to the same contract acting through `context`.
    pub fn connect<C2>(&self, context: C2) -> Contract<C2> {
        Contract {
            address: self.address,
            interface: self.interface.clone(),
            context,
            clock: Arc::clone(&self.clock),
            confirmation: self.confirmation,
        }
    }

    /// A handle with the same interface and context at `address`.
    ///
    /// No check is made that code exists there; see
    /// [`is_deployed`](Self::is_deployed).
    pub fn attach(&self, address: Address) -> Self
    where
        C: Clone,
    {
        Self {
            address,
            ..self.clone()
        }
    }
}

impl<C: ExecutionContext> Contract<C> {
    /// Request for a read-only call of `call` on this contract.
    pub fn call_request<T: SolCall>(&self, call: &T) -> TransactionRequest {
        let tx = TransactionRequest::default()
            .with_to(self.address)
            .with_input(call.abi_encode());
        match self.context.signer() {
            Some(signer) => tx.with_from(signer),
            None => tx,
        }
    }

    /// Request for submitting `call` as a transaction, with `overrides`
    /// applied and the sender defaulting to the context's signer.
    ///
    /// # Errors
    ///
    /// - [`MockCoreError::UnknownFunction`] if `T` is not part of this
    ///   contract's interface
    /// - [`MockCoreError::InvalidOverrides`] if value is attached to a
    ///   non-payable function
    pub fn transaction_request<T: SolCall>(
        &self,
        call: &T,
        overrides: &TxOverrides,
    ) -> Result<TransactionRequest> {
        if overrides.carries_value() && !self.interface.is_payable(T::SIGNATURE)? {
            return Err(MockCoreError::InvalidOverrides(format!(
                "{} is not payable",
                T::SIGNATURE
            )));
        }

        let mut tx = overrides.apply(
            TransactionRequest::default()
                .with_to(self.address)
                .with_input(call.abi_encode()),
        );
        if tx.from.is_none() {
            if let Some(signer) = self.context.signer() {
                tx = tx.with_from(signer);
            }
        }
        Ok(tx)
    }

    /// Executes `call` without creating a transaction and decodes the result.
    ///
    /// # Errors
    ///
    /// [`MockCoreError::Execution`] if the call reverts, or if a function
    /// with outputs returns no data because there is no contract at the
    /// address; [`MockCoreError::Abi`] if the returned data
    /// does not match the function's outputs.
    pub async fn call<T: SolCall>(&self, call: T) -> Result<T::Return> {
        let span = spans::call(self.interface.name(), T::SIGNATURE, &self.address);
        let tx = self.call_request(&call);
        self.execute_call::<T>(tx).instrument(span).await
    }

    async fn execute_call<T: SolCall>(&self, tx: TransactionRequest) -> Result<T::Return> {
        let output = self.context.call(tx).await.inspect_err(|e| {
            spans::record_error(e);
            debug!(function = T::SIGNATURE, error = %e, event = "call_failed");
        })?;

        // Empty output is only valid for functions that return nothing
        let has_outputs = self
            .interface
            .function(T::SIGNATURE)
            .map_or(true, |function| !function.outputs.is_empty());
        if output.is_empty() && has_outputs {
            let err = MockCoreError::Execution {
                reason: format!(
                    "{} returned no data, is there a contract at {}?",
                    T::SIGNATURE,
                    self.address
                ),
                data: None,
            };
            spans::record_error(&err);
            return Err(err);
        }

        Ok(T::abi_decode_returns(&output)?)
    }

    /// Submits `call` as a transaction.
    ///
    /// # Errors
    ///
    /// - [`MockCoreError::ReadOnlyContext`] if the context has no signer; no
    ///   request is made in that case
    /// - [`MockCoreError::Submission`] if the context fails to submit
    /// - Everything [`transaction_request`](Self::transaction_request) returns
    pub async fn send<T: SolCall>(
        &self,
        call: T,
        overrides: TxOverrides,
    ) -> Result<PendingTransaction<C>>
    where
        C: Clone,
    {
        let span = spans::send_transaction(self.interface.name(), T::SIGNATURE, &self.address);
        self.submit(call, overrides).instrument(span).await
    }

    async fn submit<T: SolCall>(
        &self,
        call: T,
        overrides: TxOverrides,
    ) -> Result<PendingTransaction<C>>
    where
        C: Clone,
    {
        let function = T::SIGNATURE;
        if self.context.is_read_only() {
            spans::record_error_with_context(
                "ReadOnlyContext",
                "state-changing call through a read-only context",
                Some(function),
            );
            error!(
                function = function,
                address = %self.address,
                event = "send_refused_read_only_context"
            );
            return Err(MockCoreError::ReadOnlyContext {
                operation: "send a transaction",
            });
        }

        let tx = self
            .transaction_request(&call, &overrides)
            .inspect_err(spans::record_error)?;
        let tx_hash = self.context.send_transaction(tx).await.inspect_err(|e| {
            spans::record_error(e);
            error!(function = function, error = %e, event = "transaction_submission_failed");
        })?;

        tracing::Span::current().record("tx_hash", tracing::field::display(tx_hash));
        info!(
            function = function,
            address = %self.address,
            tx_hash = %tx_hash,
            event = "transaction_submitted"
        );

        Ok(PendingTransaction::new(
            tx_hash,
            self.context.clone(),
            Arc::clone(&self.clock),
            self.confirmation,
        ))
    }

    /// Whether runtime code exists at this handle's address.
    pub async fn is_deployed(&self) -> Result<bool> {
        Ok(!self.context.get_code_at(self.address).await?.is_empty())
    }
}
