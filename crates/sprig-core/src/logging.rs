#![forbid(unsafe_code)]

//! Logging and tracing support.
//!
//! Re-exports of the `tracing` macros so downstream crates log through a
//! single path. Installing a subscriber is left to the host application.

pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
