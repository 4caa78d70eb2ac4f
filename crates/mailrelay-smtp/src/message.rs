//! Outgoing message model and conversion to lettre

use crate::{SmtpError, SmtpResult};
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::{Address, Message};

/// Email message to send
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    /// From address
    pub from: String,
    /// From display name
    pub from_name: Option<String>,
    /// To addresses
    pub to: Vec<String>,
    /// Subject line
    pub subject: String,
    /// Plain text body
    pub text_body: Option<String>,
    /// HTML body
    pub html_body: Option<String>,
    /// Message-ID header, generated at send time when absent
    pub message_id: Option<String>,
}

impl OutgoingMessage {
    /// Create a new message builder
    pub fn new(from: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            from_name: None,
            to: Vec::new(),
            subject: subject.into(),
            text_body: None,
            html_body: None,
            message_id: None,
        }
    }

    /// Set the from display name
    pub fn from_name(mut self, name: impl Into<String>) -> Self {
        self.from_name = Some(name.into());
        self
    }

    /// Add a To recipient
    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.to.push(address.into());
        self
    }

    /// Set the plain text body
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.text_body = Some(body.into());
        self
    }

    /// Set the HTML body
    pub fn html(mut self, body: impl Into<String>) -> Self {
        self.html_body = Some(body.into());
        self
    }

    /// Check that the message has a recipient, a subject and a body
    pub fn validate(&self) -> SmtpResult<()> {
        let mut missing = Vec::new();
        if !self.to.iter().any(|to| !to.trim().is_empty()) {
            missing.push("recipient");
        }
        if self.subject.trim().is_empty() {
            missing.push("subject");
        }
        if non_blank(&self.html_body).is_none() && non_blank(&self.text_body).is_none() {
            missing.push("body");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SmtpError::InvalidMessage(format!(
                "missing {}",
                missing.join(", ")
            )))
        }
    }

    /// Assign a fresh Message-ID under the sender's domain
    ///
    /// Every call yields a new identifier; identical content sent twice is two
    /// distinct messages.
    pub fn assign_message_id(&mut self) -> SmtpResult<&str> {
        let from = self.sender()?;
        let id = format!("<{}@{}>", uuid::Uuid::new_v4(), from.domain());
        Ok(self.message_id.insert(id).as_str())
    }

    /// Parse the sender address
    pub fn sender(&self) -> SmtpResult<Address> {
        let from = self.from.trim();
        if from.is_empty() {
            return Err(SmtpError::InvalidSender("no sender configured".to_string()));
        }
        from.parse()
            .map_err(|e| SmtpError::InvalidSender(format!("{}: {}", self.from, e)))
    }
}

fn non_blank(value: &Option<String>) -> Option<&String> {
    value.as_ref().filter(|v| !v.trim().is_empty())
}

fn parse_mailbox(address: &str) -> SmtpResult<Mailbox> {
    address
        .trim()
        .parse()
        .map_err(|e| SmtpError::InvalidAddress(format!("{}: {}", address, e)))
}

/// Build a lettre Message from OutgoingMessage
pub fn build_lettre_message(msg: &OutgoingMessage) -> SmtpResult<Message> {
    msg.validate()?;

    let from_mailbox = Mailbox::new(msg.from_name.clone(), msg.sender()?);

    let mut builder = Message::builder()
        .from(from_mailbox)
        .subject(msg.subject.trim())
        .message_id(msg.message_id.clone());

    for to in msg.to.iter().filter(|to| !to.trim().is_empty()) {
        builder = builder.to(parse_mailbox(to)?);
    }

    let message = match (non_blank(&msg.text_body), non_blank(&msg.html_body)) {
        (Some(text), Some(html)) => {
            builder.multipart(MultiPart::alternative_plain_html(text.clone(), html.clone()))
        }
        (None, Some(html)) => builder.singlepart(SinglePart::html(html.clone())),
        (Some(text), None) => builder.singlepart(SinglePart::plain(text.clone())),
        (None, None) => {
            return Err(SmtpError::InvalidMessage("missing body".to_string()));
        }
    }
    .map_err(|e| SmtpError::MessageBuildError(e.to_string()))?;

    Ok(message)
}
