//! Transport layer: M4U wire framing and HTML response scraping.

mod codec;
mod html;

pub use codec::{
    CodecError, Command, decode_response, encode_request, parse_credits_response,
    parse_reply_listing,
};
pub use html::{BodyExtractor, ExtractedBody, HtmlBodyExtractor};
