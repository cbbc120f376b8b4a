//! Network-agnostic transaction receipts.
//!
//! The adapter only needs a handful of receipt fields: the hash, the status,
//! the created contract address and the emitted logs. [`Receipt`] carries
//! exactly those so execution contexts other than Alloy's (and test fakes)
//! can produce one without assembling a full RPC receipt envelope.

use alloy_network::ReceiptResponse;
use alloy_primitives::{Address, Log, TxHash, B256};
use alloy_rpc_types::TransactionReceipt;

/// A mined transaction as seen by the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: TxHash,
    /// Whether the transaction executed successfully.
    pub status: bool,
    /// Address of the contract created by a deployment transaction.
    pub contract_address: Option<Address>,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub logs: Vec<Log>,
}

impl Receipt {
    /// Logs emitted by `address` whose first topic is `topic0`.
    pub fn logs_matching(&self, address: Address, topic0: B256) -> impl Iterator<Item = &Log> {
        self.logs.iter().filter(move |log| {
            log.address == address && log.data.topics().first() == Some(&topic0)
        })
    }
}

impl From<TransactionReceipt> for Receipt {
    fn from(receipt: TransactionReceipt) -> Self {
        let status = ReceiptResponse::status(&receipt);
        let logs = receipt
            .inner
            .logs()
            .iter()
            .map(|log| log.inner.clone())
            .collect();

        Self {
            transaction_hash: receipt.transaction_hash,
            status,
            contract_address: receipt.contract_address,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            logs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, Bytes, LogData};

    fn log(emitter: Address, topic0: B256) -> Log {
        Log {
            address: emitter,
            data: LogData::new_unchecked(vec![topic0], Bytes::new()),
        }
    }

    #[test]
    fn test_logs_matching_filters_by_address_and_topic() {
        let core = address!("1000000000000000000000000000000000000001");
        let other = address!("2000000000000000000000000000000000000002");
        let wanted = B256::repeat_byte(0xaa);
        let unwanted = B256::repeat_byte(0xbb);

        let receipt = Receipt {
            transaction_hash: TxHash::repeat_byte(1),
            status: true,
            contract_address: None,
            block_number: Some(7),
            gas_used: 21_000,
            logs: vec![
                log(core, wanted),
                log(other, wanted),
                log(core, unwanted),
                log(core, wanted),
            ],
        };

        assert_eq!(receipt.logs_matching(core, wanted).count(), 2);
        assert_eq!(receipt.logs_matching(other, unwanted).count(), 0);
    }
}
