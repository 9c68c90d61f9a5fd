//! Typed Rust client for the M4U SMSMASTER text-line SMS gateway.
//!
//! The crate is split the same way the protocol is: a domain layer of strong
//! types (phone numbers, message text, long-message segmentation, the outbox),
//! a transport layer for the line protocol and the HTML wrapper the gateway
//! answers with, and a small client layer driving one exchange per call.
//!
//! ```rust,no_run
//! use m4u::{Credentials, M4uClient, MessageOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), m4u::M4uError> {
//!     let mut client = M4uClient::builder(Credentials::new("user", "...")?).build()?;
//!     let mut outbox = client.outbox();
//!     outbox.add("+61 412 345 678", "hello", MessageOptions::default())?;
//!     client.send_outbox(&outbox).await?;
//!     let credits = client.credits_remaining().await?;
//!     println!("{credits} credits left");
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{Credentials, GatewayConfig, M4uClient, M4uClientBuilder, M4uError};
pub use domain::{
    KnownStatusCode, MessageId, MessageOptions, MessageText, OutboundMessage, Outbox,
    PhoneNumber, ReplyRecord, ServerStatus, SplitPolicy, StatusCode, UnixTimestamp,
    ValidationError, segment,
};
pub use transport::CodecError;
