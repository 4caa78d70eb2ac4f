//! HTTP front end for MailRelay
//!
//! Exposes `POST /send-email` (and `/api/send-email`) in front of a
//! [`mailrelay_core::MailRelay`].

mod error;
mod routes;
mod serve;

pub use error::ApiError;
pub use routes::{router, AppState, Recipients, SendEmailBody, SendEmailResponse};
pub use serve::serve;
