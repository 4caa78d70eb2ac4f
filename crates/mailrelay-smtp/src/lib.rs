//! SMTP implementation for MailRelay
//!
//! Provides email submission via SMTP with XOAUTH2 or app-password login,
//! bounded by a connect/socket timeout.

mod client;
mod error;
mod message;

pub use client::{
    deliver, SendReceipt, SmtpAuth, SmtpClient, SmtpSession, Transport, DEFAULT_TIMEOUT,
};
pub use error::{SmtpError, SmtpResult};
pub use message::{build_lettre_message, OutgoingMessage};
