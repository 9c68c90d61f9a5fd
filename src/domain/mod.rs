//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod response;
mod segmenter;
mod validation;
mod value;

pub use request::{DEFAULT_VALIDITY_PERIOD, MessageOptions, OutboundMessage, Outbox};
pub use response::{ReplyRecord, ServerStatus};
pub use segmenter::{SEGMENT_MAX_CHARS, SplitPolicy, TRUNCATE_CHARS, segment};
pub use validation::ValidationError;
pub use value::{
    KnownStatusCode, MessageId, MessageText, Password, PhoneNumber, StatusCode, UnixTimestamp,
    Username,
};
