use std::fmt::Debug;

use parking_lot::RwLock;

use crate::factory::error::BoxError;

/// An outgoing message waiting for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

pub trait MessageSender: Send + Sync + Debug {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), BoxError>;
}

pub trait SmsSender: Send + Sync + Debug {
    fn send_sms(&self, mobile: &str, message: &str) -> Result<(), BoxError>;
}

/// Message sender that queues messages in an outbox.
#[derive(Debug, Default)]
pub struct HttpMessageSender {
    outbox: RwLock<Vec<OutboundMessage>>,
}

impl HttpMessageSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outbox(&self) -> Vec<OutboundMessage> {
        self.outbox.read().clone()
    }
}

impl MessageSender for HttpMessageSender {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), BoxError> {
        if recipient.trim().is_empty() {
            return Err("message has no recipient".into());
        }
        self.outbox.write().push(OutboundMessage {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// SMS sender rendering an endpoint template per message.
///
/// In the template `{0}` is the mobile number and `{1}` the message text.
/// Rendered request URLs are queued in an outbox.
#[derive(Debug)]
pub struct HttpSmsSender {
    endpoint_template: String,
    outbox: RwLock<Vec<String>>,
}

impl HttpSmsSender {
    pub fn new(endpoint_template: impl Into<String>) -> Self {
        Self {
            endpoint_template: endpoint_template.into(),
            outbox: RwLock::new(Vec::new()),
        }
    }

    pub fn endpoint_template(&self) -> &str {
        &self.endpoint_template
    }

    /// The request URL for one message.
    pub fn request_url(&self, mobile: &str, message: &str) -> String {
        self.endpoint_template
            .replace("{0}", mobile)
            .replace("{1}", message)
    }

    pub fn outbox(&self) -> Vec<String> {
        self.outbox.read().clone()
    }
}

impl SmsSender for HttpSmsSender {
    fn send_sms(&self, mobile: &str, message: &str) -> Result<(), BoxError> {
        if mobile.trim().is_empty() {
            return Err("sms has no mobile number".into());
        }
        let url = self.request_url(mobile.trim(), message);
        log::debug!("Queued sms request {}", url);
        self.outbox.write().push(url);
        Ok(())
    }
}
