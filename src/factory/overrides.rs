use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, U256};
use alloy_rpc_types::TransactionRequest;
use bon::Builder;

/// Caller-supplied transaction fields for deployments and state-changing
/// calls.
///
/// Every field is optional; unset fields are left for the execution context
/// (or the node) to fill in. The recipient and calldata are owned by the
/// adapter and cannot be overridden.
///
/// # Example
///
/// ```rust
/// use mock_core_rs::TxOverrides;
///
/// let overrides = TxOverrides::builder()
///     .gas_limit(1_500_000)
///     .nonce(7)
///     .build();
/// assert_eq!(overrides.gas_limit, Some(1_500_000));
/// ```
#[derive(Builder, Clone, Debug, Default, PartialEq, Eq)]
pub struct TxOverrides {
    /// Sender, defaults to the context's signer.
    pub from: Option<Address>,
    pub gas_limit: Option<u64>,
    /// Legacy gas price in wei.
    pub gas_price: Option<u128>,
    pub max_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
    pub nonce: Option<u64>,
    /// Wei sent along; only valid for payable targets.
    pub value: Option<U256>,
    pub chain_id: Option<u64>,
}

impl TxOverrides {
    /// Whether a non-zero value is attached.
    pub fn carries_value(&self) -> bool {
        self.value.is_some_and(|value| !value.is_zero())
    }

    /// Copies the set fields onto `tx`.
    pub(crate) fn apply(&self, mut tx: TransactionRequest) -> TransactionRequest {
        if let Some(from) = self.from {
            tx = tx.with_from(from);
        }
        if let Some(gas_limit) = self.gas_limit {
            tx = tx.with_gas_limit(gas_limit);
        }
        if let Some(gas_price) = self.gas_price {
            tx = tx.with_gas_price(gas_price);
        }
        if let Some(max_fee) = self.max_fee_per_gas {
            tx = tx.with_max_fee_per_gas(max_fee);
        }
        if let Some(priority_fee) = self.max_priority_fee_per_gas {
            tx = tx.with_max_priority_fee_per_gas(priority_fee);
        }
        if let Some(nonce) = self.nonce {
            tx = tx.with_nonce(nonce);
        }
        if let Some(value) = self.value {
            tx = tx.with_value(value);
        }
        if let Some(chain_id) = self.chain_id {
            tx = tx.with_chain_id(chain_id);
        }
        tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_overrides_leave_request_untouched() {
        let tx = TxOverrides::default().apply(TransactionRequest::default());
        assert_eq!(tx, TransactionRequest::default());
    }

    #[test]
    fn test_overrides_are_applied() {
        let sender = Address::repeat_byte(0x42);
        let overrides = TxOverrides::builder()
            .from(sender)
            .gas_limit(900_000)
            .max_fee_per_gas(30_000_000_000)
            .max_priority_fee_per_gas(1_000_000_000)
            .nonce(3)
            .chain_id(31_337)
            .build();

        let tx = overrides.apply(TransactionRequest::default());

        assert_eq!(tx.from, Some(sender));
        assert_eq!(tx.gas, Some(900_000));
        assert_eq!(tx.max_fee_per_gas, Some(30_000_000_000));
        assert_eq!(tx.max_priority_fee_per_gas, Some(1_000_000_000));
        assert_eq!(tx.nonce, Some(3));
        assert_eq!(tx.chain_id, Some(31_337));
        assert_eq!(tx.value, None);
    }

    #[test]
    fn test_zero_value_does_not_count_as_value() {
        let overrides = TxOverrides::builder().value(U256::ZERO).build();
        assert!(!overrides.carries_value());

        let overrides = TxOverrides::builder().value(U256::from(1)).build();
        assert!(overrides.carries_value());
    }
}
