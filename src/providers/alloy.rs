//! Alloy-based execution context implementation.

use alloy_json_rpc::RpcError;
use alloy_network::Ethereum;
use alloy_primitives::{Address, Bytes, TxHash};
use alloy_provider::{Provider, ProviderBuilder, WalletProvider};
use alloy_rpc_types::TransactionRequest;
use alloy_transport::TransportError;
use async_trait::async_trait;
use tracing::{debug, instrument, trace, warn};
use url::Url;

use crate::error::{MockCoreError, Result};
use crate::receipt::Receipt;
use crate::traits::ExecutionContext;

/// Production execution context wrapping Alloy's [`Provider`] trait.
///
/// The same provider type can back a signer or a read-only context; the
/// difference is whether a sender address is attached. Providers built with a
/// wallet filler should use [`AlloyContext::with_wallet`] or
/// [`AlloyContext::with_signer`]; plain HTTP/WS providers should use
/// [`AlloyContext::read_only`].
///
/// # Examples
///
/// ```rust,no_run
/// use mock_core_rs::providers::AlloyContext;
/// use alloy_provider::ProviderBuilder;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = ProviderBuilder::new().connect_http("http://localhost:8545".parse()?);
/// let context = AlloyContext::read_only(provider);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AlloyContext<P>
where
    P: Provider<Ethereum> + Clone,
{
    provider: P,
    signer: Option<Address>,
}

impl<P> AlloyContext<P>
where
    P: Provider<Ethereum> + Clone,
{
    /// Creates a query-only context. State-changing operations issued through
    /// it fail with [`MockCoreError::ReadOnlyContext`].
    pub fn read_only(provider: P) -> Self {
        debug!(event = "read_only_context_created");
        Self {
            provider,
            signer: None,
        }
    }

    /// Creates a signing context that submits transactions from `signer`.
    ///
    /// The provider is expected to be able to sign for `signer`, either
    /// through a wallet filler or because the node manages the account.
    pub fn with_signer(provider: P, signer: Address) -> Self {
        debug!(signer = %signer, event = "signer_context_created");
        Self {
            provider,
            signer: Some(signer),
        }
    }

    /// Returns a reference to the underlying Alloy provider.
    pub fn inner(&self) -> &P {
        &self.provider
    }
}

impl<P> AlloyContext<P>
where
    P: Provider<Ethereum> + WalletProvider + Clone,
{
    /// Creates a signing context from a wallet-enabled provider, sending from
    /// its default signer.
    pub fn with_wallet(provider: P) -> Self {
        let signer = provider.default_signer_address();
        Self::with_signer(provider, signer)
    }
}

/// Creates a read-only context over plain HTTP.
pub fn read_only_http(url: Url) -> AlloyContext<impl Provider<Ethereum> + Clone> {
    AlloyContext::read_only(ProviderBuilder::new().connect_http(url))
}

/// Maps an `eth_call` failure. JSON-RPC error responses are the node
/// reporting a failed execution; anything else is a transport problem.
fn call_error(err: TransportError) -> MockCoreError {
    match err {
        RpcError::ErrorResp(payload) => {
            let data = payload.as_revert_data();
            let reason = data
                .as_deref()
                .and_then(|d| alloy_sol_types::decode_revert_reason(d))
                .unwrap_or_else(|| payload.message.to_string());
            MockCoreError::Execution { reason, data }
        }
        other => MockCoreError::Rpc(other),
    }
}

#[async_trait]
impl<P> ExecutionContext for AlloyContext<P>
where
    P: Provider<Ethereum> + Clone,
{
    fn signer(&self) -> Option<Address> {
        self.signer
    }

    #[instrument(skip_all)]
    async fn call(&self, tx: TransactionRequest) -> Result<Bytes> {
        trace!("Executing eth_call");
        self.provider.call(tx).await.map_err(call_error)
    }

    #[instrument(skip_all)]
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash> {
        if self.signer.is_none() {
            warn!(event = "send_refused_read_only_context");
            return Err(MockCoreError::ReadOnlyContext {
                operation: "send a transaction",
            });
        }

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(MockCoreError::Submission)?;
        let tx_hash = *pending.tx_hash();

        debug!(tx_hash = %tx_hash, "Transaction accepted by node");
        Ok(tx_hash)
    }

    #[instrument(skip(self), fields(tx_hash = %tx_hash))]
    async fn get_transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>> {
        trace!("Fetching transaction receipt");
        let receipt = self.provider.get_transaction_receipt(tx_hash).await?;

        if receipt.is_some() {
            debug!("Transaction receipt found");
        } else {
            debug!("Transaction receipt not found");
        }

        Ok(receipt.map(Receipt::from))
    }

    #[instrument(skip(self), fields(address = %address))]
    async fn get_code_at(&self, address: Address) -> Result<Bytes> {
        trace!("Fetching contract code");
        Ok(self.provider.get_code_at(address).await?)
    }
}
