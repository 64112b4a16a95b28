use async_trait::async_trait;
use thiserror::Error;

/// Failure modes for SMS dispatch.
#[derive(Debug, Error)]
pub enum SmsError {
    /// No provider credentials are configured.
    #[error("SMS is not configured")]
    NotConfigured,
    /// The provider rejected the dispatch.
    #[error("{0}")]
    Provider(String),
}

/// Successful dispatch receipt.
#[derive(Debug, Clone)]
pub struct SmsOutcome {
    /// Provider message identifier.
    pub message_sid: String,
    /// Recipient phone number.
    pub to: String,
}

/// Outbound SMS collaborator. The server builds the message body;
/// transport belongs to the implementation.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<SmsOutcome, SmsError>;
}

/// Sender used when no provider is wired in; every dispatch fails with
/// [`SmsError::NotConfigured`].
pub struct UnconfiguredSms;

#[async_trait]
impl SmsSender for UnconfiguredSms {
    async fn send(&self, _to: &str, _body: &str) -> Result<SmsOutcome, SmsError> {
        Err(SmsError::NotConfigured)
    }
}

/// Default message sent to the buyer when the agent supplies none.
pub fn default_feedback_message(buyer_name: &str, address: &str, public_url: &str) -> String {
    format!(
        "Hi {buyer_name}! Here's the link to provide feedback on your showing at {address}: {public_url}"
    )
}
