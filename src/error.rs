use alloy_json_rpc::RpcError;
use alloy_primitives::{Bytes, Selector, TxHash};
use alloy_transport::{TransportError, TransportErrorKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MockCoreError {
    /// The execution context rejected a transaction. The transport error is
    /// passed through untouched.
    #[error("Transaction submission failed: {0}")]
    Submission(#[source] TransportError),

    #[error("Execution failed: {reason}")]
    Execution { reason: String, data: Option<Bytes> },

    #[error("Read-only context cannot {operation}: connect a signer first")]
    ReadOnlyContext { operation: &'static str },

    #[error("Contract not deployed: receipt for {tx_hash} has no contract address")]
    ContractNotDeployed { tx_hash: TxHash },

    #[error("Transaction {tx_hash} reverted")]
    TransactionReverted { tx_hash: TxHash },

    #[error("Transaction {tx_hash} not mined after {attempts} attempts")]
    ConfirmationTimeout { tx_hash: TxHash, attempts: u32 },

    #[error("Unknown function: {name}")]
    UnknownFunction { name: String },

    #[error("Ambiguous function {name}: use one of {candidates:?}")]
    AmbiguousFunction {
        name: String,
        candidates: Vec<String>,
    },

    #[error("Unknown event: {name}")]
    UnknownEvent { name: String },

    #[error("Ambiguous event {name}: use one of {candidates:?}")]
    AmbiguousEvent {
        name: String,
        candidates: Vec<String>,
    },

    #[error("Duplicate selector {selector} shared by {first} and {second}")]
    DuplicateSelector {
        selector: Selector,
        first: String,
        second: String,
    },

    #[error("Constructor expects {expected} arguments, got {got}")]
    ConstructorArguments { expected: usize, got: usize },

    #[error("Invalid overrides: {0}")]
    InvalidOverrides(String),

    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError<TransportErrorKind>),

    #[error("ABI encoding/decoding error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("Dynamic ABI error: {0}")]
    DynAbi(#[from] alloy_dyn_abi::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Hex conversion error: {0}")]
    Hex(#[from] alloy_primitives::hex::FromHexError),
}

impl MockCoreError {
    /// The variant name, as recorded in `error.type` span attributes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Submission(_) => "Submission",
            Self::Execution { .. } => "Execution",
            Self::ReadOnlyContext { .. } => "ReadOnlyContext",
            Self::ContractNotDeployed { .. } => "ContractNotDeployed",
            Self::TransactionReverted { .. } => "TransactionReverted",
            Self::ConfirmationTimeout { .. } => "ConfirmationTimeout",
            Self::UnknownFunction { .. } => "UnknownFunction",
            Self::AmbiguousFunction { .. } => "AmbiguousFunction",
            Self::UnknownEvent { .. } => "UnknownEvent",
            Self::AmbiguousEvent { .. } => "AmbiguousEvent",
            Self::DuplicateSelector { .. } => "DuplicateSelector",
            Self::ConstructorArguments { .. } => "ConstructorArguments",
            Self::InvalidOverrides(_) => "InvalidOverrides",
            Self::InvalidArtifact(_) => "InvalidArtifact",
            Self::Rpc(_) => "Rpc",
            Self::Abi(_) => "Abi",
            Self::DynAbi(_) => "DynAbi",
            Self::Json(_) => "Json",
            Self::Hex(_) => "Hex",
        }
    }

    /// Returns `true` for failures that originate from the chain executing a
    /// call: reverts, missing code, or a mismatched interface.
    pub fn is_execution_failure(&self) -> bool {
        matches!(self, Self::Execution { .. })
    }

    /// Returns `true` when the execution context refused or failed to submit a
    /// transaction.
    pub fn is_submission_failure(&self) -> bool {
        matches!(self, Self::Submission(_))
    }
}

pub type Result<T> = std::result::Result<T, MockCoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(MockCoreError::ReadOnlyContext { operation: "deploy" }, "ReadOnlyContext")]
    #[case(
        MockCoreError::Submission(TransportErrorKind::custom_str("nonce too low")),
        "Submission"
    )]
    #[case(
        MockCoreError::Execution { reason: "execution reverted".into(), data: None },
        "Execution"
    )]
    #[case(MockCoreError::InvalidOverrides("not payable".into()), "InvalidOverrides")]
    fn test_kind_is_variant_name(#[case] error: MockCoreError, #[case] expected: &str) {
        assert_eq!(error.kind(), expected);
    }
}
