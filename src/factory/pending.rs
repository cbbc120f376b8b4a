use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use alloy_primitives::{Address, TxHash};
use tracing::{debug, error, info, Instrument};

use super::{ConfirmationConfig, Contract};
use crate::error::{MockCoreError, Result};
use crate::interface::Interface;
use crate::receipt::Receipt;
use crate::spans;
use crate::traits::{Clock, ExecutionContext};

/// A submitted transaction whose receipt has not been observed yet.
pub struct PendingTransaction<C> {
    tx_hash: TxHash,
    context: C,
    clock: Arc<dyn Clock>,
    confirmation: ConfirmationConfig,
}

impl<C: fmt::Debug> fmt::Debug for PendingTransaction<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingTransaction")
            .field("tx_hash", &self.tx_hash)
            .field("context", &self.context)
            .field("confirmation", &self.confirmation)
            .finish_non_exhaustive()
    }
}

impl<C> PendingTransaction<C> {
    pub(crate) fn new(
        tx_hash: TxHash,
        context: C,
        clock: Arc<dyn Clock>,
        confirmation: ConfirmationConfig,
    ) -> Self {
        Self {
            tx_hash,
            context,
            clock,
            confirmation,
        }
    }

    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    pub fn confirmation(&self) -> ConfirmationConfig {
        self.confirmation
    }
}

impl<C: ExecutionContext> PendingTransaction<C> {
    /// Polls until the transaction is mined.
    ///
    /// # Errors
    ///
    /// - [`MockCoreError::TransactionReverted`] if the receipt reports failure
    /// - [`MockCoreError::ConfirmationTimeout`] if `max_attempts` is set and
    ///   exhausted
    /// - Any error returned by the execution context while polling
    pub async fn get_receipt(&self) -> Result<Receipt> {
        let span = spans::wait_for_receipt(self.tx_hash, self.confirmation.max_attempts);
        self.poll_receipt().instrument(span).await
    }

    async fn poll_receipt(&self) -> Result<Receipt> {
        let started = self.clock.now();
        let mut attempts: u32 = 0;

        loop {
            attempts = attempts.saturating_add(1);

            if let Some(receipt) = self.context.get_transaction_receipt(self.tx_hash).await? {
                tracing::Span::current().record("attempts", attempts);

                if !receipt.status {
                    let err = MockCoreError::TransactionReverted {
                        tx_hash: self.tx_hash,
                    };
                    spans::record_error(&err);
                    error!(
                        tx_hash = %self.tx_hash,
                        block_number = ?receipt.block_number,
                        event = "transaction_reverted"
                    );
                    return Err(err);
                }

                info!(
                    tx_hash = %self.tx_hash,
                    block_number = ?receipt.block_number,
                    gas_used = receipt.gas_used,
                    attempts = attempts,
                    elapsed_ms = self.clock.now().duration_since(started).as_millis() as u64,
                    event = "transaction_mined"
                );
                return Ok(receipt);
            }

            if self
                .confirmation
                .max_attempts
                .is_some_and(|max| attempts >= max)
            {
                let err = MockCoreError::ConfirmationTimeout {
                    tx_hash: self.tx_hash,
                    attempts,
                };
                spans::record_error(&err);
                error!(
                    tx_hash = %self.tx_hash,
                    attempts = attempts,
                    event = "confirmation_timeout"
                );
                return Err(err);
            }

            debug!(
                tx_hash = %self.tx_hash,
                attempt = attempts,
                poll_interval_ms = self.confirmation.poll_interval.as_millis() as u64,
                event = "receipt_pending"
            );
            self.clock.sleep(self.confirmation.poll_interval).await;
        }
    }
}

/// A submitted deployment.
///
/// `H` is the handle type produced once the contract is mined; the generic
/// factory yields a [`Contract`], typed bindings yield their own wrapper.
pub struct PendingDeployment<C, H = Contract<C>> {
    pending: PendingTransaction<C>,
    interface: Interface,
    handle: PhantomData<fn() -> H>,
}

impl<C: fmt::Debug, H> fmt::Debug for PendingDeployment<C, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingDeployment")
            .field("pending", &self.pending)
            .field("contract", &self.interface.name())
            .finish()
    }
}

impl<C> PendingDeployment<C> {
    pub(crate) fn new(pending: PendingTransaction<C>, interface: Interface) -> Self {
        Self {
            pending,
            interface,
            handle: PhantomData,
        }
    }
}

impl<C, H> PendingDeployment<C, H> {
    /// Hash of the deployment transaction.
    pub fn tx_hash(&self) -> TxHash {
        self.pending.tx_hash()
    }

    /// The underlying pending transaction.
    pub fn transaction(&self) -> &PendingTransaction<C> {
        &self.pending
    }

    /// Changes the handle type returned by [`deployed`](Self::deployed).
    pub fn with_handle<H2>(self) -> PendingDeployment<C, H2> {
        PendingDeployment {
            pending: self.pending,
            interface: self.interface,
            handle: PhantomData,
        }
    }
}

impl<C, H> PendingDeployment<C, H>
where
    C: ExecutionContext,
    H: From<Contract<C>>,
{
    /// Waits for the deployment to be mined and returns a handle bound to the
    /// created address and the deploying context.
    ///
    /// # Errors
    ///
    /// [`MockCoreError::ContractNotDeployed`] if the receipt carries no
    /// contract address, plus everything
    /// [`PendingTransaction::get_receipt`] can return.
    pub async fn deployed(self) -> Result<H> {
        let receipt = self.pending.get_receipt().await?;
        let address = self.contract_address(&receipt)?;

        let PendingTransaction {
            context,
            clock,
            confirmation,
            ..
        } = self.pending;

        let contract = Contract::new(address, self.interface, context)
            .with_shared_clock(clock)
            .with_confirmation(confirmation);
        Ok(H::from(contract))
    }

    fn contract_address(&self, receipt: &Receipt) -> Result<Address> {
        let Some(address) = receipt.contract_address else {
            error!(
                tx_hash = %receipt.transaction_hash,
                contract = %self.interface.name(),
                event = "deployment_missing_address"
            );
            return Err(MockCoreError::ContractNotDeployed {
                tx_hash: receipt.transaction_hash,
            });
        };

        info!(
            contract = %self.interface.name(),
            contract_address = %address,
            tx_hash = %receipt.transaction_hash,
            event = "contract_deployed"
        );
        Ok(address)
    }
}
