use crate::domain::segmenter::{SplitPolicy, segment};
use crate::domain::validation::ValidationError;
use crate::domain::value::{MessageId, MessageText, PhoneNumber};

/// Validity period sent when the caller does not pick one; the gateway reads it as "maximum".
pub const DEFAULT_VALIDITY_PERIOD: u32 = 169;

/// Per-message fields other than the recipient and the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageOptions {
    /// Echoed back in replies when message-id mode is on. Sent as `0` when absent.
    pub message_id: Option<MessageId>,
    /// Delay before delivery, in seconds.
    pub delay: u32,
    /// Passed through verbatim to the gateway.
    pub validity_period: u32,
    pub delivery_report: bool,
}

impl Default for MessageOptions {
    fn default() -> Self {
        Self {
            message_id: None,
            delay: 0,
            validity_period: DEFAULT_VALIDITY_PERIOD,
            delivery_report: false,
        }
    }
}

/// One message line of a `MESSAGES2.0` batch.
///
/// Only [`Outbox::add`] creates these, so the phone number is normalized and the
/// text fits the configured [`SplitPolicy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    phone_number: PhoneNumber,
    text: MessageText,
    options: MessageOptions,
}

impl OutboundMessage {
    pub fn phone_number(&self) -> &PhoneNumber {
        &self.phone_number
    }

    pub fn text(&self) -> &MessageText {
        &self.text
    }

    pub fn options(&self) -> &MessageOptions {
        &self.options
    }
}

/// Pending outbound messages, in insertion order.
///
/// Sending does not clear the outbox; call [`Outbox::clear`] when the batch is done.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    policy: SplitPolicy,
    messages: Vec<OutboundMessage>,
}

impl Outbox {
    pub fn new(policy: SplitPolicy) -> Self {
        Self {
            policy,
            messages: Vec::new(),
        }
    }

    pub fn policy(&self) -> SplitPolicy {
        self.policy
    }

    /// Validate, normalize and segment one message.
    ///
    /// Every fragment produced by the split policy becomes its own
    /// [`OutboundMessage`] with the same phone number and options. Nothing is
    /// added when validation fails.
    pub fn add(
        &mut self,
        phone_number: impl AsRef<str>,
        text: impl Into<String>,
        options: MessageOptions,
    ) -> Result<(), ValidationError> {
        let phone_number = PhoneNumber::normalize(phone_number)?;
        let text = MessageText::new(text)?;

        let fragments = segment(text.as_str(), self.policy)
            .into_iter()
            .map(|fragment| OutboundMessage {
                phone_number: phone_number.clone(),
                text: MessageText::from_fragment(fragment),
                options,
            });

        self.messages.extend(fragments);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[OutboundMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
