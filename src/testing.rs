//! Test utilities and fake implementations for exercising contract bindings
//!
//! [`FakeExecutionContext`] stands in for a node and a signer at once: it
//! answers calls from canned responses, "mines" submitted transactions into
//! receipts, and records every request it sees. [`FakeClock`] makes receipt
//! polling instant.
//!
//! Clones of a fake share state, so a test can hand one clone to the code
//! under test and inspect another.

use alloy_primitives::{keccak256, Address, Bytes, Log, LogData, Selector, TxHash, TxKind};
use alloy_rpc_types::TransactionRequest;
use alloy_transport::TransportErrorKind;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::{MockCoreError, Result};
use crate::receipt::Receipt;
use crate::traits::{Clock, ExecutionContext};

// ============================================================================
// Fake Execution Context
// ============================================================================

#[derive(Debug, Clone)]
enum CallResponse {
    Return(Bytes),
    Revert(String),
}

#[derive(Debug)]
struct MinedTransaction {
    receipt: Receipt,
    polls_until_mined: usize,
}

#[derive(Debug, Default)]
struct FakeChain {
    code: HashMap<Address, Bytes>,
    call_responses: HashMap<(Address, Selector), CallResponse>,
    logs_on_send: HashMap<Selector, Vec<LogData>>,
    transactions: HashMap<TxHash, MinedTransaction>,
    nonces: HashMap<Address, u64>,
    sent: Vec<TransactionRequest>,
    submission_failure: Option<String>,
    revert_transactions: bool,
    omit_contract_address: bool,
    pending_polls: usize,
    block_number: u64,
    requests: usize,
}

/// A fake execution context backed by an in-memory chain.
///
/// This allows testing scenarios like:
/// - Deployments mined after several polls
/// - Submission failures from the signer
/// - Reverted transactions and reverting calls
/// - Calls to addresses without code
/// - Read-only contexts issuing no requests
#[derive(Clone, Debug)]
pub struct FakeExecutionContext {
    signer: Option<Address>,
    chain: Arc<Mutex<FakeChain>>,
}

impl FakeExecutionContext {
    /// A signing context sending from `signer`.
    pub fn with_signer(signer: Address) -> Self {
        Self {
            signer: Some(signer),
            chain: Arc::default(),
        }
    }

    /// A context without a signer.
    pub fn read_only() -> Self {
        Self {
            signer: None,
            chain: Arc::default(),
        }
    }

    /// A read-only view of the same chain.
    pub fn as_read_only(&self) -> Self {
        Self {
            signer: None,
            chain: Arc::clone(&self.chain),
        }
    }

    /// A context on the same chain that sends from `signer`.
    pub fn as_signer(&self, signer: Address) -> Self {
        Self {
            signer: Some(signer),
            chain: Arc::clone(&self.chain),
        }
    }

    /// Place runtime code at `address`.
    pub fn set_code(&self, address: Address, code: impl Into<Bytes>) {
        self.chain.lock().unwrap().code.insert(address, code.into());
    }

    /// Make calls of `selector` on `address` return `output`.
    pub fn set_call_response(&self, address: Address, selector: Selector, output: impl Into<Bytes>) {
        self.chain
            .lock()
            .unwrap()
            .call_responses
            .insert((address, selector), CallResponse::Return(output.into()));
    }

    /// Make calls of `selector` on `address` revert with `reason`.
    pub fn set_call_revert(&self, address: Address, selector: Selector, reason: &str) {
        self.chain
            .lock()
            .unwrap()
            .call_responses
            .insert((address, selector), CallResponse::Revert(reason.to_string()));
    }

    /// Attach `log` to the receipt of every transaction calling `selector`.
    /// The log is emitted by the transaction's recipient.
    pub fn emit_on_send(&self, selector: Selector, log: LogData) {
        self.chain
            .lock()
            .unwrap()
            .logs_on_send
            .entry(selector)
            .or_default()
            .push(log);
    }

    /// Make every submission fail with a transport error carrying `message`.
    pub fn fail_submissions(&self, message: &str) {
        self.chain.lock().unwrap().submission_failure = Some(message.to_string());
    }

    /// Mine subsequent transactions with a failed status.
    pub fn revert_transactions(&self, revert: bool) {
        self.chain.lock().unwrap().revert_transactions = revert;
    }

    /// Leave `contract_address` empty on receipts of creation transactions.
    pub fn omit_contract_address(&self, omit: bool) {
        self.chain.lock().unwrap().omit_contract_address = omit;
    }

    /// Number of receipt polls answered with "pending" before a submitted
    /// transaction shows up as mined.
    pub fn set_pending_polls(&self, polls: usize) {
        self.chain.lock().unwrap().pending_polls = polls;
    }

    /// Every transaction submitted so far, in order.
    pub fn sent_transactions(&self) -> Vec<TransactionRequest> {
        self.chain.lock().unwrap().sent.clone()
    }

    /// Total number of requests (calls, submissions, receipt and code
    /// lookups) made through any clone sharing this chain.
    pub fn request_count(&self) -> usize {
        self.chain.lock().unwrap().requests
    }

    /// Code currently stored at `address`.
    pub fn code_at(&self, address: Address) -> Bytes {
        self.chain
            .lock()
            .unwrap()
            .code
            .get(&address)
            .cloned()
            .unwrap_or_default()
    }
}

fn selector_of(input: &[u8]) -> Option<Selector> {
    input.get(..4).map(Selector::from_slice)
}

fn transaction_hash(sender: Address, nonce: u64) -> TxHash {
    keccak256([sender.as_slice(), &nonce.to_be_bytes()].concat())
}

#[async_trait]
impl ExecutionContext for FakeExecutionContext {
    fn signer(&self) -> Option<Address> {
        self.signer
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes> {
        let mut chain = self.chain.lock().unwrap();
        chain.requests += 1;

        let Some(TxKind::Call(to)) = tx.to else {
            return Err(MockCoreError::Execution {
                reason: "call without recipient".to_string(),
                data: None,
            });
        };

        // Like the EVM, a call to an account without code succeeds with no
        // output.
        if !chain.code.contains_key(&to) {
            return Ok(Bytes::new());
        }

        let input = tx.input.input().cloned().unwrap_or_default();
        let response = selector_of(&input).and_then(|s| chain.call_responses.get(&(to, s)));
        match response {
            Some(CallResponse::Return(output)) => Ok(output.clone()),
            Some(CallResponse::Revert(reason)) => Err(MockCoreError::Execution {
                reason: reason.clone(),
                data: None,
            }),
            None => Err(MockCoreError::Execution {
                reason: "execution reverted".to_string(),
                data: None,
            }),
        }
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash> {
        let mut chain = self.chain.lock().unwrap();
        chain.requests += 1;

        let Some(signer) = self.signer else {
            return Err(MockCoreError::ReadOnlyContext {
                operation: "send a transaction",
            });
        };
        if let Some(message) = &chain.submission_failure {
            return Err(MockCoreError::Submission(TransportErrorKind::custom_str(
                message,
            )));
        }

        let sender = tx.from.unwrap_or(signer);
        let next_nonce = chain.nonces.get(&sender).copied().unwrap_or_default();
        let nonce = tx.nonce.unwrap_or(next_nonce);
        chain.nonces.insert(sender, nonce.max(next_nonce) + 1);

        let tx_hash = transaction_hash(sender, nonce);
        let input = tx.input.input().cloned().unwrap_or_default();
        let status = !chain.revert_transactions;

        let (contract_address, logs) = match tx.to {
            Some(TxKind::Call(to)) => {
                let logs = selector_of(&input)
                    .and_then(|s| chain.logs_on_send.get(&s))
                    .map(|logs| {
                        logs.iter()
                            .map(|data| Log {
                                address: to,
                                data: data.clone(),
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                (None, logs)
            }
            _ => {
                let created = sender.create(nonce);
                if status {
                    chain.code.insert(created, input.clone());
                }
                let reported = (!chain.omit_contract_address).then_some(created);
                (reported, Vec::new())
            }
        };

        chain.block_number += 1;
        let receipt = Receipt {
            transaction_hash: tx_hash,
            status,
            contract_address,
            block_number: Some(chain.block_number),
            gas_used: 21_000 + 16 * input.len() as u64,
            logs: if status { logs } else { Vec::new() },
        };
        let polls_until_mined = chain.pending_polls;
        chain.transactions.insert(
            tx_hash,
            MinedTransaction {
                receipt,
                polls_until_mined,
            },
        );
        chain.sent.push(tx);

        Ok(tx_hash)
    }

    async fn get_transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>> {
        let mut chain = self.chain.lock().unwrap();
        chain.requests += 1;

        let Some(mined) = chain.transactions.get_mut(&tx_hash) else {
            return Ok(None);
        };
        if mined.polls_until_mined > 0 {
            mined.polls_until_mined -= 1;
            return Ok(None);
        }
        Ok(Some(mined.receipt.clone()))
    }

    async fn get_code_at(&self, address: Address) -> Result<Bytes> {
        let mut chain = self.chain.lock().unwrap();
        chain.requests += 1;
        Ok(chain.code.get(&address).cloned().unwrap_or_default())
    }
}

// ============================================================================
// Fake Clock
// ============================================================================

/// A fake clock that allows fast-forwarding time in tests.
///
/// This enables testing long confirmation waits without actually waiting.
#[derive(Clone, Debug)]
pub struct FakeClock {
    current_time: Arc<Mutex<Instant>>,
    sleep_log: Arc<Mutex<Vec<Duration>>>,
}

impl Default for FakeClock {
    fn default() -> Self {
        Self {
            current_time: Arc::new(Mutex::new(Instant::now())),
            sleep_log: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fast-forward the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut time = self.current_time.lock().unwrap();
        *time += duration;
    }

    /// Get the total time "slept" by this clock
    pub fn total_sleep_time(&self) -> Duration {
        self.sleep_log.lock().unwrap().iter().sum()
    }

    /// Get the number of times sleep was called
    pub fn sleep_count(&self) -> usize {
        self.sleep_log.lock().unwrap().len()
    }
}

#[async_trait]
impl Clock for FakeClock {
    async fn sleep(&self, duration: Duration) {
        self.sleep_log.lock().unwrap().push(duration);
        self.advance(duration);
    }

    fn now(&self) -> Instant {
        *self.current_time.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_network::TransactionBuilder;
    use alloy_primitives::address;

    const DEPLOYER: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

    #[tokio::test]
    async fn test_fake_clock_tracks_sleep_calls() {
        let clock = FakeClock::new();
        let start = clock.now();

        clock.sleep(Duration::from_secs(4)).await;
        clock.sleep(Duration::from_secs(4)).await;

        assert_eq!(clock.sleep_count(), 2);
        assert_eq!(clock.total_sleep_time(), Duration::from_secs(8));
        assert_eq!(clock.now().duration_since(start), Duration::from_secs(8));
    }

    #[tokio::test]
    async fn test_creation_places_code_at_derived_address() {
        let context = FakeExecutionContext::with_signer(DEPLOYER);

        let first = context
            .send_transaction(TransactionRequest::default().with_deploy_code(vec![0x60, 0x80]))
            .await
            .unwrap();
        let second = context
            .send_transaction(TransactionRequest::default().with_deploy_code(vec![0x60, 0x80]))
            .await
            .unwrap();

        assert_ne!(first, second);
        let receipt = context.get_transaction_receipt(first).await.unwrap().unwrap();
        assert_eq!(receipt.contract_address, Some(DEPLOYER.create(0)));
        assert!(!context.code_at(DEPLOYER.create(1)).is_empty());
    }

    #[tokio::test]
    async fn test_pending_polls_delay_receipt() {
        let context = FakeExecutionContext::with_signer(DEPLOYER);
        context.set_pending_polls(2);

        let tx_hash = context
            .send_transaction(TransactionRequest::default().with_deploy_code(vec![0x00]))
            .await
            .unwrap();

        assert!(context.get_transaction_receipt(tx_hash).await.unwrap().is_none());
        assert!(context.get_transaction_receipt(tx_hash).await.unwrap().is_none());
        assert!(context.get_transaction_receipt(tx_hash).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_read_only_view_shares_chain() {
        let context = FakeExecutionContext::with_signer(DEPLOYER);
        let viewer = context.as_read_only();
        let target = Address::repeat_byte(0x33);

        context.set_code(target, vec![0xfe]);

        assert_eq!(viewer.get_code_at(target).await.unwrap().as_ref(), &[0xfe]);
        assert!(viewer.is_read_only());
        assert_eq!(context.request_count(), 1);
    }

    #[tokio::test]
    async fn test_call_without_code_returns_empty_output() {
        let context = FakeExecutionContext::read_only();
        let tx = TransactionRequest::default()
            .with_to(Address::repeat_byte(0x44))
            .with_input(vec![0x06, 0x66, 0x1a, 0xbd]);

        let output = context.call(tx).await.unwrap();

        assert!(output.is_empty());
    }
}
