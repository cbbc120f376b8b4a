//! Contract bindings
//!
//! Typed wrappers over the generic [`ContractFactory`](crate::ContractFactory)
//! and [`Contract`](crate::Contract), one per bundled artifact. Each module
//! also carries the `sol!`-generated types for its contract.
//!
//! - [`MockCoreFactory`](mock_core::MockCoreFactory), [`MockCoreContract`](mock_core::MockCoreContract)

pub mod mock_core;
