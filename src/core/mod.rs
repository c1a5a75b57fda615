//! Core Module - Access decision logic
//!
//! Address validation, the threshold decision, the per-caller throttle and
//! the pipeline tying them to the balance oracle.

pub mod address;
pub mod decision;
pub mod throttle;
pub mod verifier;

pub use address::*;
pub use decision::*;
pub use throttle::*;
pub use verifier::*;
