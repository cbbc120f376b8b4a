//! MockCore contract bindings and wrapper
//!
//! MockCore is a stand-in for the messaging core contract used in local and
//! test deployments. It exposes the same read surface (`localDomain`,
//! `nonces`, the message queue and tree accessors) and a `dispatch` entry
//! point that emits `Enqueue` and `Dispatch` events.

use std::sync::{Arc, LazyLock};

use alloy_json_abi::JsonAbi;
use alloy_network::Ethereum;
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::{sol, SolEvent};
use tracing::{debug, info};
use MockCore::MockCoreInstance;

use crate::artifact::Artifact;
use crate::error::Result;
use crate::factory::{
    ConfirmationConfig, Contract, ContractFactory, PendingDeployment, PendingTransaction,
    TxOverrides,
};
use crate::interface::Interface;
use crate::providers::AlloyContext;
use crate::receipt::Receipt;
use crate::traits::{Clock, ExecutionContext};

sol!(
    #[allow(clippy::too_many_arguments)]
    #[allow(missing_docs)]
    #[sol(rpc)]
    MockCore,
    "abis/MockCore.json"
);

const ARTIFACT_JSON: &str = include_str!("../../abis/MockCore.json");

static ARTIFACT: LazyLock<Arc<Artifact>> = LazyLock::new(|| {
    Arc::new(
        Artifact::from_json(ARTIFACT_JSON, "MockCore")
            .expect("bundled MockCore artifact is valid"),
    )
});

/// The bundled MockCore artifact: ABI in compiler order plus init code.
pub fn artifact() -> Arc<Artifact> {
    Arc::clone(&ARTIFACT)
}

/// Deploys and attaches to MockCore instances.
///
/// # Example
///
/// ```rust,no_run
/// use mock_core_rs::{MockCoreFactory, TxOverrides};
/// use mock_core_rs::providers::AlloyContext;
/// use alloy_provider::ProviderBuilder;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = ProviderBuilder::new().connect_anvil_with_wallet();
/// let factory = MockCoreFactory::new(AlloyContext::with_wallet(provider));
///
/// let core = factory.deploy(TxOverrides::default()).await?.deployed().await?;
/// assert_eq!(core.local_domain().await?, 5);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockCoreFactory<C> {
    inner: ContractFactory<C>,
}

impl<C> MockCoreFactory<C> {
    pub fn new(context: C) -> Self {
        Self {
            inner: ContractFactory::new(artifact(), context),
        }
    }

    pub fn with_clock(self, clock: impl Clock + 'static) -> Self {
        Self {
            inner: self.inner.with_clock(clock),
        }
    }

    pub fn with_confirmation(self, confirmation: ConfirmationConfig) -> Self {
        Self {
            inner: self.inner.with_confirmation(confirmation),
        }
    }

    /// The interface descriptor, without needing a factory instance.
    pub fn create_interface() -> Interface {
        Interface::new(artifact())
    }

    /// MockCore init code.
    pub fn bytecode() -> Bytes {
        ARTIFACT.bytecode().clone()
    }

    pub fn abi() -> JsonAbi {
        ARTIFACT.abi().clone()
    }

    pub fn interface(&self) -> &Interface {
        self.inner.interface()
    }

    pub fn context(&self) -> &C {
        self.inner.context()
    }

    /// The generic factory underneath.
    pub fn inner(&self) -> &ContractFactory<C> {
        &self.inner
    }

    /// Builds the creation transaction without sending it.
    pub fn get_deploy_transaction(&self, overrides: &TxOverrides) -> Result<TransactionRequest> {
        self.inner.get_deploy_transaction(overrides)
    }

    /// A handle to an existing MockCore at `address`. No request is made.
    pub fn attach(&self, address: Address) -> MockCoreContract<C>
    where
        C: Clone,
    {
        MockCoreContract::from(self.inner.attach(address))
    }

    /// A factory acting through `context`.
    pub fn connect<C2>(&self, context: C2) -> MockCoreFactory<C2> {
        MockCoreFactory {
            inner: self.inner.connect(context),
        }
    }

    /// A handle to the MockCore at `address` acting through `context`.
    pub fn connect_to(address: Address, context: C) -> MockCoreContract<C> {
        MockCoreContract::new(address, context)
    }
}

impl<C> MockCoreFactory<C>
where
    C: ExecutionContext + Clone,
{
    /// Submits a MockCore deployment.
    ///
    /// MockCore's constructor takes no arguments.
    pub async fn deploy(
        &self,
        overrides: TxOverrides,
    ) -> Result<PendingDeployment<C, MockCoreContract<C>>> {
        Ok(self.inner.deploy(overrides).await?.with_handle())
    }
}

/// A handle to a deployed MockCore.
#[derive(Debug, Clone)]
pub struct MockCoreContract<C> {
    contract: Contract<C>,
}

impl<C> From<Contract<C>> for MockCoreContract<C> {
    fn from(contract: Contract<C>) -> Self {
        Self { contract }
    }
}

impl<C> MockCoreContract<C> {
    /// Create a new MockCoreContract.
    pub fn new(address: Address, context: C) -> Self {
        debug!(
            contract_address = %address,
            event = "mock_core_contract_initialized"
        );
        Self {
            contract: Contract::new(address, MockCoreFactory::<C>::create_interface(), context),
        }
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }

    pub fn interface(&self) -> &Interface {
        self.contract.interface()
    }

    pub fn context(&self) -> &C {
        self.contract.context()
    }

    /// The generic handle underneath.
    pub fn inner(&self) -> &Contract<C> {
        &self.contract
    }

    /// The same MockCore acting through `context`.
    pub fn connect<C2>(&self, context: C2) -> MockCoreContract<C2> {
        MockCoreContract {
            contract: self.contract.connect(context),
        }
    }

    /// A MockCore handle at another address.
    pub fn attach(&self, address: Address) -> Self
    where
        C: Clone,
    {
        Self {
            contract: self.contract.attach(address),
        }
    }

    /// `Dispatch` events emitted by this contract in `receipt`.
    pub fn dispatch_events(&self, receipt: &Receipt) -> Result<Vec<MockCore::Dispatch>> {
        receipt
            .logs_matching(self.address(), MockCore::Dispatch::SIGNATURE_HASH)
            .map(|log| Ok(MockCore::Dispatch::decode_log_data(&log.data)?))
            .collect()
    }

    /// `Enqueue` events emitted by this contract in `receipt`.
    pub fn enqueue_events(&self, receipt: &Receipt) -> Result<Vec<MockCore::Enqueue>> {
        receipt
            .logs_matching(self.address(), MockCore::Enqueue::SIGNATURE_HASH)
            .map(|log| Ok(MockCore::Enqueue::decode_log_data(&log.data)?))
            .collect()
    }
}

impl<C: ExecutionContext> MockCoreContract<C> {
    pub async fn max_message_body_bytes(&self) -> Result<U256> {
        self.contract
            .call(MockCore::MAX_MESSAGE_BODY_BYTESCall {})
            .await
    }

    /// Number of leaves in the message tree.
    pub async fn count(&self) -> Result<U256> {
        self.contract.call(MockCore::countCall {}).await
    }

    pub async fn home(&self) -> Result<Address> {
        self.contract.call(MockCore::homeCall {}).await
    }

    pub async fn is_replica(&self, replica: Address) -> Result<bool> {
        self.contract.call(MockCore::isReplicaCall(replica)).await
    }

    /// Domain identifier of the chain this core lives on.
    pub async fn local_domain(&self) -> Result<u32> {
        self.contract.call(MockCore::localDomainCall {}).await
    }

    /// Next message nonce towards `destination`.
    pub async fn nonces(&self, destination: u32) -> Result<u32> {
        self.contract.call(MockCore::noncesCall(destination)).await
    }

    pub async fn queue_contains(&self, item: B256) -> Result<bool> {
        self.contract
            .call(MockCore::queueContainsCall { _item: item })
            .await
    }

    pub async fn queue_end(&self) -> Result<B256> {
        self.contract.call(MockCore::queueEndCall {}).await
    }

    pub async fn queue_length(&self) -> Result<U256> {
        self.contract.call(MockCore::queueLengthCall {}).await
    }

    /// Current root of the message tree.
    pub async fn root(&self) -> Result<B256> {
        self.contract.call(MockCore::rootCall {}).await
    }

    pub async fn tree(&self) -> Result<U256> {
        self.contract.call(MockCore::treeCall {}).await
    }

    /// Create the transaction request for the `dispatch` function without
    /// sending it.
    pub fn dispatch_transaction(
        &self,
        destination: u32,
        recipient: B256,
        body: Bytes,
        overrides: &TxOverrides,
    ) -> Result<TransactionRequest> {
        let body_len = body.len();
        let tx = self.contract.transaction_request(
            &MockCore::dispatchCall {
                _destination: destination,
                _recipient: recipient,
                _body: body,
            },
            overrides,
        )?;

        info!(
            contract_address = %self.address(),
            destination = destination,
            recipient = %recipient,
            body_len = body_len,
            event = "dispatch_transaction_created"
        );
        Ok(tx)
    }

    /// Sends a message towards `destination`.
    pub async fn dispatch(
        &self,
        destination: u32,
        recipient: B256,
        body: Bytes,
        overrides: TxOverrides,
    ) -> Result<PendingTransaction<C>>
    where
        C: Clone,
    {
        self.contract
            .send(
                MockCore::dispatchCall {
                    _destination: destination,
                    _recipient: recipient,
                    _body: body,
                },
                overrides,
            )
            .await
    }
}

impl<P> MockCoreContract<AlloyContext<P>>
where
    P: Provider<Ethereum> + Clone,
{
    /// The alloy-generated instance for this address, for callers that want
    /// alloy's call builders directly.
    ///
    /// Most users will want the typed methods on this handle instead.
    pub fn instance(&self) -> MockCoreInstance<P> {
        MockCoreInstance::new(self.address(), self.context().inner().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeExecutionContext;
    use alloy_primitives::{address, Selector};
    use alloy_sol_types::SolCall;
    use rstest::rstest;

    #[rstest]
    #[case("count()", [0x06, 0x66, 0x1a, 0xbd])]
    #[case("queueContains(bytes32)", [0x2b, 0xef, 0x28, 0x92])]
    #[case("isReplica(address)", [0x51, 0x90, 0xbc, 0x53])]
    #[case("MAX_MESSAGE_BODY_BYTES()", [0x52, 0x2a, 0xe0, 0x02])]
    #[case("localDomain()", [0x8d, 0x36, 0x38, 0xf4])]
    #[case("home()", [0x9f, 0xa9, 0x2f, 0x9d])]
    #[case("queueLength()", [0xab, 0x91, 0xc7, 0xb0])]
    #[case("nonces(uint32)", [0xb9, 0x5a, 0x20, 0x01])]
    #[case("root()", [0xeb, 0xf0, 0xc7, 0x17])]
    #[case("queueEnd()", [0xf6, 0xd1, 0x61, 0x02])]
    #[case("dispatch(uint32,bytes32,bytes)", [0xfa, 0x31, 0xde, 0x01])]
    #[case("tree()", [0xfd, 0x54, 0xb2, 0x28])]
    fn test_selectors_match_dispatcher(#[case] signature: &str, #[case] expected: [u8; 4]) {
        let interface = MockCoreFactory::<FakeExecutionContext>::create_interface();
        assert_eq!(interface.selector(signature).unwrap(), Selector::from(expected));
    }

    #[test]
    fn test_generated_bindings_agree_with_artifact() {
        let interface = MockCoreFactory::<FakeExecutionContext>::create_interface();

        assert_eq!(MockCore::BYTECODE, MockCoreFactory::<FakeExecutionContext>::bytecode());
        assert_eq!(
            interface.selector("dispatch").unwrap(),
            Selector::from(MockCore::dispatchCall::SELECTOR)
        );
        assert_eq!(
            interface.event_topic("Dispatch").unwrap(),
            MockCore::Dispatch::SIGNATURE_HASH
        );
        assert_eq!(
            interface.event_topic("Enqueue").unwrap(),
            MockCore::Enqueue::SIGNATURE_HASH
        );
    }

    #[test]
    fn test_function_signatures_in_compiler_order() {
        let signatures = MockCoreFactory::<FakeExecutionContext>::create_interface()
            .function_signatures()
            .join("\n");

        insta::assert_snapshot!(signatures, @r"
        MAX_MESSAGE_BODY_BYTES()
        count()
        dispatch(uint32,bytes32,bytes)
        home()
        isReplica(address)
        localDomain()
        nonces(uint32)
        queueContains(bytes32)
        queueEnd()
        queueLength()
        root()
        tree()
        ");
    }

    #[test]
    fn test_interface_reproduces_artifact_abi() {
        let raw: serde_json::Value = serde_json::from_str(ARTIFACT_JSON).unwrap();
        let interface = MockCoreFactory::<FakeExecutionContext>::create_interface();

        assert_eq!(serde_json::to_value(interface.entries()).unwrap(), raw["abi"]);
        assert_eq!(artifact().abi_json().unwrap(), raw["abi"]);
    }

    #[test]
    fn test_dispatch_transaction_targets_contract() {
        let signer = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");
        let core_address = address!("5fbdb2315678afecb367f032d93f642f64180aa3");
        let core = MockCoreContract::new(core_address, FakeExecutionContext::with_signer(signer));

        let tx = core
            .dispatch_transaction(
                1000,
                B256::repeat_byte(0x01),
                Bytes::from_static(b"hello"),
                &TxOverrides::default(),
            )
            .unwrap();

        assert_eq!(tx.to, Some(core_address.into()));
        assert_eq!(tx.from, Some(signer));
        let input = tx.input.input().unwrap();
        assert_eq!(&input[..4], MockCore::dispatchCall::SELECTOR.as_slice());
    }

    #[test]
    fn test_value_rejected_for_dispatch() {
        let core = MockCoreContract::new(
            Address::repeat_byte(0x05),
            FakeExecutionContext::with_signer(Address::repeat_byte(0x01)),
        );
        let overrides = TxOverrides::builder().value(U256::from(1)).build();

        let result = core.dispatch_transaction(1, B256::ZERO, Bytes::new(), &overrides);

        assert!(matches!(
            result,
            Err(crate::MockCoreError::InvalidOverrides(_))
        ));
    }
}
