//! Contract factories and handles.
//!
//! A [`ContractFactory`] pairs a compiled [`Artifact`] with an
//! [`ExecutionContext`]. It builds deployment transactions, deploys new
//! instances and binds [`Contract`] handles to existing ones. Everything here
//! is generic over the artifact; typed bindings such as
//! [`MockCoreFactory`](crate::MockCoreFactory) are thin wrappers on top.

mod config;
mod contract;
mod overrides;
mod pending;

pub use config::{ConfirmationConfig, DEFAULT_POLL_INTERVAL, DEVNET_POLL_INTERVAL};
pub use contract::Contract;
pub use overrides::TxOverrides;
pub use pending::{PendingDeployment, PendingTransaction};

use std::fmt;
use std::sync::Arc;

use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::JsonAbi;
use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, Bytes};
use alloy_rpc_types::TransactionRequest;
use tracing::{error, info, Instrument};

use crate::artifact::Artifact;
use crate::error::{MockCoreError, Result};
use crate::interface::Interface;
use crate::providers::TokioClock;
use crate::spans;
use crate::traits::{Clock, ExecutionContext};

/// Deploys and attaches to instances of one compiled contract.
///
/// # Example
///
/// ```rust,no_run
/// use mock_core_rs::{ContractFactory, TxOverrides};
/// use mock_core_rs::contracts::mock_core;
/// use mock_core_rs::providers::read_only_http;
///
/// # async fn example() -> mock_core_rs::Result<()> {
/// let artifact = mock_core::artifact();
/// let context = read_only_http("http://localhost:8545".parse().unwrap());
/// let factory = ContractFactory::new(artifact, context);
///
/// // Inspect the deployment without sending it
/// let tx = factory.get_deploy_transaction(&TxOverrides::default())?;
/// assert!(tx.to.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ContractFactory<C> {
    interface: Interface,
    context: C,
    clock: Arc<dyn Clock>,
    confirmation: ConfirmationConfig,
}

impl<C: fmt::Debug> fmt::Debug for ContractFactory<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractFactory")
            .field("contract", &self.interface.name())
            .field("context", &self.context)
            .field("confirmation", &self.confirmation)
            .finish_non_exhaustive()
    }
}

impl<C> ContractFactory<C> {
    pub fn new(artifact: Arc<Artifact>, context: C) -> Self {
        Self {
            interface: Interface::new(artifact),
            context,
            clock: Arc::new(TokioClock),
            confirmation: ConfirmationConfig::default(),
        }
    }

    /// Uses `clock` when waiting for receipts of deployments (and of
    /// transactions sent through handles this factory creates).
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_confirmation(mut self, confirmation: ConfirmationConfig) -> Self {
        self.confirmation = confirmation;
        self
    }

    pub fn interface(&self) -> &Interface {
        &self.interface
    }

    pub fn abi(&self) -> &JsonAbi {
        self.interface.abi()
    }

    /// Init code deployed by [`deploy`](Self::deploy), without constructor
    /// arguments.
    pub fn bytecode(&self) -> &Bytes {
        self.interface.artifact().bytecode()
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn confirmation(&self) -> ConfirmationConfig {
        self.confirmation
    }

    /// Builds the creation transaction for a contract whose constructor takes
    /// no arguments. Nothing is sent.
    pub fn get_deploy_transaction(&self, overrides: &TxOverrides) -> Result<TransactionRequest> {
        self.get_deploy_transaction_with_args(&[], overrides)
    }

    /// Builds the creation transaction: no recipient, init code followed by
    /// the encoded constructor arguments, `overrides` applied. Nothing is
    /// sent.
    ///
    /// # Errors
    ///
    /// - [`MockCoreError::ConstructorArguments`] on an argument count mismatch
    /// - [`MockCoreError::InvalidOverrides`] if value is attached and the
    ///   constructor is not payable
    pub fn get_deploy_transaction_with_args(
        &self,
        args: &[DynSolValue],
        overrides: &TxOverrides,
    ) -> Result<TransactionRequest> {
        if overrides.carries_value() && !self.interface.constructor_is_payable() {
            return Err(MockCoreError::InvalidOverrides(format!(
                "{} constructor is not payable",
                self.interface.name()
            )));
        }

        let init_code = self.interface.encode_deploy(args)?;
        Ok(overrides.apply(TransactionRequest::default().with_deploy_code(init_code)))
    }

    /// A handle to an existing instance at `address`, bound to this factory's
    /// context. No request is made.
    pub fn attach(&self, address: Address) -> Contract<C>
    where
        C: Clone,
    {
        Contract::new(address, self.interface.clone(), self.context.clone())
            .with_shared_clock(Arc::clone(&self.clock))
            .with_confirmation(self.confirmation)
    }

    /// A factory for the same artifact acting through `context`.
    pub fn connect<C2>(&self, context: C2) -> ContractFactory<C2> {
        ContractFactory {
            interface: self.interface.clone(),
            context,
            clock: Arc::clone(&self.clock),
            confirmation: self.confirmation,
        }
    }
}

impl<C> ContractFactory<C>
where
    C: ExecutionContext + Clone,
{
    /// Submits a deployment of a contract whose constructor takes no
    /// arguments.
    ///
    /// The returned [`PendingDeployment`] resolves to a handle once the
    /// transaction is mined.
    ///
    /// # Errors
    ///
    /// - [`MockCoreError::ReadOnlyContext`] if the context has no signer; no
    ///   request is made in that case
    /// - [`MockCoreError::Submission`] if the context fails to submit
    pub async fn deploy(&self, overrides: TxOverrides) -> Result<PendingDeployment<C>> {
        self.deploy_with_args(&[], overrides).await
    }

    /// Submits a deployment with constructor arguments.
    pub async fn deploy_with_args(
        &self,
        args: &[DynSolValue],
        overrides: TxOverrides,
    ) -> Result<PendingDeployment<C>> {
        let span = spans::deploy(
            self.interface.name(),
            self.context.signer(),
            self.bytecode().len(),
        );
        self.submit_deployment(args, overrides)
            .instrument(span)
            .await
    }

    async fn submit_deployment(
        &self,
        args: &[DynSolValue],
        overrides: TxOverrides,
    ) -> Result<PendingDeployment<C>> {
        let Some(signer) = self.context.signer() else {
            spans::record_error_with_context(
                "ReadOnlyContext",
                "deployment through a read-only context",
                Some(self.interface.name()),
            );
            error!(
                contract = %self.interface.name(),
                event = "deploy_refused_read_only_context"
            );
            return Err(MockCoreError::ReadOnlyContext { operation: "deploy" });
        };

        let mut tx = self
            .get_deploy_transaction_with_args(args, &overrides)
            .inspect_err(spans::record_error)?;
        if tx.from.is_none() {
            tx = tx.with_from(signer);
        }

        let tx_hash = self.context.send_transaction(tx).await.inspect_err(|e| {
            spans::record_error(e);
            error!(
                contract = %self.interface.name(),
                error = %e,
                event = "deployment_submission_failed"
            );
        })?;

        tracing::Span::current().record("tx_hash", tracing::field::display(tx_hash));
        info!(
            contract = %self.interface.name(),
            tx_hash = %tx_hash,
            event = "deployment_submitted"
        );

        let pending = PendingTransaction::new(
            tx_hash,
            self.context.clone(),
            Arc::clone(&self.clock),
            self.confirmation,
        );
        Ok(PendingDeployment::new(pending, self.interface.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeClock, FakeExecutionContext};
    use alloy_primitives::{address, TxKind, U256};

    const CONSTRUCTED: &str = r#"{
        "contractName": "Vault",
        "abi": [
            {"type": "constructor", "inputs": [{"name": "cap", "type": "uint256"}], "stateMutability": "nonpayable"}
        ],
        "bytecode": "0x6001"
    }"#;

    fn vault_factory(context: FakeExecutionContext) -> ContractFactory<FakeExecutionContext> {
        let artifact = Arc::new(Artifact::from_json(CONSTRUCTED, "Vault").unwrap());
        ContractFactory::new(artifact, context).with_clock(FakeClock::new())
    }

    #[test]
    fn test_deploy_transaction_encodes_constructor_args() {
        let factory = vault_factory(FakeExecutionContext::read_only());

        let tx = factory
            .get_deploy_transaction_with_args(
                &[DynSolValue::Uint(U256::from(9), 256)],
                &TxOverrides::default(),
            )
            .unwrap();

        assert_eq!(tx.to, Some(TxKind::Create));
        let input = tx.input.input().unwrap();
        assert_eq!(input.len(), 2 + 32);
        assert_eq!(&input[..2], &[0x60, 0x01]);
        assert_eq!(input[33], 9);
    }

    #[test]
    fn test_value_rejected_for_non_payable_constructor() {
        let factory = vault_factory(FakeExecutionContext::read_only());
        let overrides = TxOverrides::builder().value(U256::from(1)).build();

        let result = factory
            .get_deploy_transaction_with_args(&[DynSolValue::Uint(U256::from(1), 256)], &overrides);

        assert!(matches!(result, Err(MockCoreError::InvalidOverrides(_))));
    }

    #[tokio::test]
    async fn test_deploy_with_args_resolves_to_created_address() {
        let deployer = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");
        let context = FakeExecutionContext::with_signer(deployer);
        let factory = vault_factory(context.clone());

        let pending = factory
            .deploy_with_args(&[DynSolValue::Uint(U256::from(100), 256)], TxOverrides::default())
            .await
            .unwrap();
        let contract = pending.deployed().await.unwrap();

        assert_eq!(contract.address(), deployer.create(0));
        assert_eq!(contract.interface(), factory.interface());
        assert_eq!(context.sent_transactions()[0].from, Some(deployer));
    }

    #[test]
    fn test_connect_keeps_interface_and_swaps_context() {
        let factory = vault_factory(FakeExecutionContext::read_only());
        let signer = address!("70997970c51812dc3a010c7d01b50e0d17dc79c8");

        let connected = factory.connect(FakeExecutionContext::with_signer(signer));

        assert_eq!(connected.interface(), factory.interface());
        assert_eq!(connected.context().signer(), Some(signer));
        assert_eq!(factory.context().signer(), None);
    }
}
