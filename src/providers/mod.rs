//! Production implementations of the adapter's trait abstractions.
//!
//! This module provides the "real" implementations of the traits defined in
//! [`crate::traits`] that talk to actual nodes and the system clock.
//!
//! Applications will typically use these, while test code uses the fakes in
//! [`crate::testing`].

mod alloy;
mod tokio_clock;

pub use self::alloy::{read_only_http, AlloyContext};
pub use self::tokio_clock::TokioClock;
