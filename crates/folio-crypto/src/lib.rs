//! Folio Crypto Library
//!
//! Random secrets and session tokens, the process-wide rotating signing
//! secret, and the time-limited unsubscribe tokens signed with it.
//!
//! Nothing here is persisted: a restart generates a fresh secret and every
//! outstanding token stops verifying.

pub mod keys;
pub mod rotation;
pub mod token;

pub use rotation::RotatingSecret;
pub use token::{TokenError, TokenSigner, UnsubscribePayload};
