//! Core relay logic for MailRelay
//!
//! Provides the relay client, its configuration, and the error taxonomy the
//! HTTP layer maps to responses.

mod error;
mod relay;
mod settings;

pub use error::{RelayError, RelayResult};
pub use relay::{EmailRequest, MailRelay, MailRelayClient, SendResult};
pub use settings::{AuthKind, RelayConfig};
