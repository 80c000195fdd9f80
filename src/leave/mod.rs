//! Leave-request lifecycle and exit-pass verification.

pub mod balance;
pub mod lifecycle;
pub mod pass_token;
pub mod report;
pub mod validation;
pub mod verifier;

pub use lifecycle::LeaveLifecycle;
pub use verifier::{PassVerifier, VerificationResult};
