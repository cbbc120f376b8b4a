//! OpenTelemetry span helpers for contract operations
//!
//! Span names are static (`mock_core_rs.<operation>`) and carry structured
//! attributes only, so they can be exported to any OpenTelemetry backend
//! without high-cardinality names.
//!
//! # Usage
//!
//! The factory and contract handles instrument their own futures with these
//! spans. They are public for callers that wrap the adapter in their own
//! operations and want matching span names.
//!
//! # Example
//!
//! ```rust,no_run
//! use mock_core_rs::spans;
//! use alloy_primitives::TxHash;
//! use tracing::Instrument;
//!
//! # async fn example() {
//! let span = spans::wait_for_receipt(TxHash::ZERO, Some(30));
//! async {
//!     // custom confirmation logic
//! }
//! .instrument(span)
//! .await;
//! # }
//! ```

use alloy_primitives::{Address, TxHash};
use tracing::Span;

use crate::error::MockCoreError;

/// Create span for a contract deployment.
///
/// Parent: Caller's operation span, if any
/// Children: mock_core_rs.wait_for_receipt, execution context RPC spans
#[inline]
pub fn deploy(contract: &str, signer: Option<Address>, init_code_len: usize) -> Span {
    tracing::info_span!(
        "mock_core_rs.deploy",
        contract = contract,
        signer = ?signer,
        init_code_bytes = init_code_len,
        tx_hash = tracing::field::Empty,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for a read-only contract call.
///
/// Parent: Caller's operation span, if any
/// Children: Execution context RPC spans
#[inline]
pub fn call(contract: &str, function: &str, address: &Address) -> Span {
    tracing::debug_span!(
        "mock_core_rs.call",
        contract = contract,
        function = function,
        address = %address,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for submitting a state-changing contract call.
///
/// Parent: Caller's operation span, if any
/// Children: Execution context RPC spans
#[inline]
pub fn send_transaction(contract: &str, function: &str, address: &Address) -> Span {
    tracing::info_span!(
        "mock_core_rs.send_transaction",
        contract = contract,
        function = function,
        address = %address,
        tx_hash = tracing::field::Empty,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.source = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for polling a transaction receipt.
///
/// Parent: mock_core_rs.deploy or the caller's operation span
/// Children: Execution context RPC spans (one per poll)
#[inline]
pub fn wait_for_receipt(tx_hash: TxHash, max_attempts: Option<u32>) -> Span {
    tracing::debug_span!(
        "mock_core_rs.wait_for_receipt",
        tx_hash = %tx_hash,
        max_attempts = ?max_attempts,
        attempts = tracing::field::Empty,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Record error attributes on the current span.
///
/// Follows OpenTelemetry semantic conventions for error tracking:
/// - error.type: The error variant, from [`MockCoreError::kind`]
/// - error.message: Human-readable error message
/// - error.source: The underlying cause, when there is one
pub fn record_error(error: &MockCoreError) {
    let current_span = tracing::Span::current();
    current_span.record("error.type", error.kind());
    current_span.record("error.message", error.to_string());
    current_span.record("otel.status_code", "ERROR");

    if let Some(source) = std::error::Error::source(error) {
        current_span.record("error.source", source.to_string());
    }
}

/// Record error attributes with custom context on the current span.
///
/// # Example
///
/// ```rust,no_run
/// use mock_core_rs::spans;
///
/// spans::record_error_with_context(
///     "ReadOnlyContext",
///     "deploy requires a signer",
///     Some("context was created with AlloyContext::read_only"),
/// );
/// ```
pub fn record_error_with_context(
    error_type: &str,
    error_message: &str,
    additional_context: Option<&str>,
) {
    let current_span = tracing::Span::current();
    current_span.record("error.type", error_type);
    current_span.record("error.message", error_message);
    current_span.record("otel.status_code", "ERROR");

    if let Some(context) = additional_context {
        current_span.record("error.context", context);
    }
}
