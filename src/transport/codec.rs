//! M4U line protocol: request framing and response grammar.

use crate::client::Credentials;
use crate::domain::{
    MessageId, OutboundMessage, Password, ReplyRecord, ServerStatus, StatusCode, UnixTimestamp,
    Username,
};

const LINE_END: &str = "\r\n";
const SENTINEL: &str = ".";
const PROTOCOL_MAGIC: &str = "m4u";
const PROTOCOL_VERSION: &str = "PHP1.0";
const MESSAGE_ID_MARKER: char = '#';

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("response does not start with a status line: {line:?}")]
    MissingStatusLine { line: String },

    #[error("malformed reply line: {line:?}")]
    MalformedReply { line: String },

    #[error("malformed credits line: {line:?}")]
    MalformedCredits { line: String },
}

/// Commands understood by the gateway.
#[derive(Debug, Clone, Copy)]
pub enum Command<'a> {
    SendMessages(&'a [OutboundMessage]),
    CheckReplies,
    ConfirmReceived,
    CreditsRemaining,
}

impl Command<'_> {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::SendMessages(_) => "MESSAGES2.0",
            Self::CheckReplies => "CHECKREPLY2.0",
            Self::ConfirmReceived => "CONFIRM_RECEIVED",
            Self::CreditsRemaining => "MESSAGES",
        }
    }
}

/// Full request payload: authentication header followed by the command body.
pub fn encode_request(credentials: &Credentials, command: &Command<'_>) -> String {
    let mut payload = String::new();
    push_line(&mut payload, PROTOCOL_MAGIC);

    payload.push_str(Username::FIELD);
    payload.push('=');
    payload.push_str(credentials.username().as_str());
    if credentials.use_message_id() {
        payload.push(MESSAGE_ID_MARKER);
    }
    payload.push_str(LINE_END);

    push_line(
        &mut payload,
        &format!("{}={}", Password::FIELD, credentials.password().as_str()),
    );
    push_line(&mut payload, &format!("VER={PROTOCOL_VERSION}"));
    payload.push_str(&encode_command(command));
    payload
}

/// Command body, terminated by the sentinel line.
pub fn encode_command(command: &Command<'_>) -> String {
    let mut body = String::new();
    push_line(&mut body, command.keyword());

    if let Command::SendMessages(messages) = command {
        for message in messages.iter() {
            push_line(&mut body, &encode_message_line(message));
        }
    }

    push_line(&mut body, SENTINEL);
    body
}

fn encode_message_line(message: &OutboundMessage) -> String {
    let options = message.options();
    format!(
        "{} {} {} {} {} {}",
        options.message_id.map_or(0, MessageId::value),
        message.phone_number(),
        options.delay,
        options.validity_period,
        u8::from(options.delivery_report),
        message.text().as_str(),
    )
}

fn push_line(buffer: &mut String, line: &str) {
    buffer.push_str(line);
    buffer.push_str(LINE_END);
}

/// Parse the status line that opens every response body.
///
/// The line must be `<digits><whitespace><message>`.
pub fn decode_response(body_text: &str) -> Result<ServerStatus, CodecError> {
    let line = body_text.trim().lines().next().unwrap_or_default();
    let missing = || CodecError::MissingStatusLine {
        line: line.to_owned(),
    };

    let digits_end = line
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(line.len());
    let (digits, rest) = line.split_at(digits_end);
    if digits.is_empty() || !rest.starts_with(char::is_whitespace) {
        return Err(missing());
    }
    let code = digits.parse::<i32>().map_err(|_| missing())?;

    Ok(ServerStatus {
        code: StatusCode::new(code),
        message: rest.trim().to_owned(),
    })
}

/// Parse the replies between the status line and the trailing sentinel.
///
/// Reply lines are `<messageId> <phone> <timestamp> <text>` in message-id mode
/// and `<phone> <timestamp> <text>` otherwise. Lines are split on LF with any
/// CR dropped, since HTML parsers normalize CRLF.
pub fn parse_reply_listing(
    body_text: &str,
    use_message_id: bool,
) -> Result<Vec<ReplyRecord>, CodecError> {
    let mut rows = body_text
        .trim()
        .lines()
        .skip(1)
        .map(|line| line.trim_end_matches('\r'))
        .collect::<Vec<_>>();
    if rows.last().is_some_and(|line| line.trim() == SENTINEL) {
        rows.pop();
    }

    rows.into_iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| parse_reply_line(line, use_message_id))
        .collect()
}

fn parse_reply_line(line: &str, use_message_id: bool) -> Result<ReplyRecord, CodecError> {
    let malformed = || CodecError::MalformedReply {
        line: line.to_owned(),
    };

    let mut rest = line;
    let message_id = if use_message_id {
        let (id, tail) = split_field(rest).ok_or_else(malformed)?;
        rest = tail;
        Some(MessageId::new(id.parse().map_err(|_| malformed())?))
    } else {
        None
    };

    let (phone_number, tail) = split_field(rest).ok_or_else(malformed)?;
    let (timestamp, tail) = split_field(tail).ok_or_else(malformed)?;
    let received_at = UnixTimestamp::new(timestamp.parse().map_err(|_| malformed())?);
    let text = tail
        .strip_prefix(char::is_whitespace)
        .filter(|text| !text.is_empty())
        .ok_or_else(malformed)?;

    Ok(ReplyRecord {
        message_id,
        phone_number: phone_number.to_owned(),
        received_at,
        text: text.to_owned(),
    })
}

/// Next whitespace-delimited field and the remainder, which starts with the delimiter.
fn split_field(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    let end = input.find(char::is_whitespace)?;
    Some(input.split_at(end))
}

/// Credits reported by a `MESSAGES` query, from a `<n> OK <credits>` status line.
///
/// `None` when the overall code is not 100 or the line does not carry a credit count.
pub fn parse_credits_response(status: &ServerStatus) -> Option<u64> {
    if !status.code.is_ok() {
        return None;
    }

    let rest = status.message.strip_prefix("OK")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start();
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..digits_end].parse().ok()
}
