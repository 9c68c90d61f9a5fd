use crate::domain::value::{MessageId, StatusCode, UnixTimestamp};

/// Status line of the most recent gateway response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerStatus {
    pub code: StatusCode,
    /// Remainder of the status line after the code, trimmed.
    pub message: String,
}

/// One inbound reply from a `CHECKREPLY2.0` listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRecord {
    /// Present only when the session runs in message-id mode.
    pub message_id: Option<MessageId>,
    /// Sender of the reply, as reported by the gateway.
    pub phone_number: String,
    pub received_at: UnixTimestamp,
    pub text: String,
}
