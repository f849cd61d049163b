// RKSOK — Wire Protocol Types
//
// Request/response framing for RKSOK/1.0. Requests and responses are UTF-8
// text terminated by an empty line (`\r\n\r\n`); the command and status words
// are fixed Cyrillic tokens and are matched byte-for-byte.

use std::fmt;

use super::GatewayError;

/// Protocol identifier carried in every envelope.
pub const PROTOCOL: &str = "РКСОК/1.0";

/// Line separator inside a frame.
pub const CRLF: &str = "\r\n";

/// Frame terminator.
pub const TERMINATOR: &[u8] = b"\r\n\r\n";

/// Query word sent to the approval authority ahead of the forwarded frame.
pub const APPROVAL_QUERY: &str = "АМОЖНА?";

/// Authority status word for an approved request.
pub const APPROVED: &str = "МОЖНА";

/// Authority status word for a denied request.
pub const NOT_APPROVED: &str = "НИЛЬЗЯ";

/// Longest accepted record name, in characters.
pub const MAX_NAME_CHARS: usize = 30;

// ─── Verbs and statuses ─────────────────────────────────────────────────────

/// A request operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Fetch,
    Write,
    Delete,
}

impl Verb {
    pub const ALL: [Verb; 3] = [Verb::Fetch, Verb::Write, Verb::Delete];

    /// The command word on the wire.
    pub fn token(self) -> &'static str {
        match self {
            Verb::Fetch => "ОТДОВАЙ",
            Verb::Write => "ЗОПИШИ",
            Verb::Delete => "УДОЛИ",
        }
    }

    /// Exact token match; no case folding or trimming.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|verb| verb.token() == token)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Status word of a gateway response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Ok,
    NotFound,
    IncorrectRequest,
}

impl ResponseStatus {
    pub fn token(self) -> &'static str {
        match self {
            ResponseStatus::Ok => "НОРМАЛДЫКС",
            ResponseStatus::NotFound => "НИНАШОЛ",
            ResponseStatus::IncorrectRequest => "НИПОНЯЛ",
        }
    }
}

// ─── Requests ────────────────────────────────────────────────────────────────

/// A parsed and validated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    verb: Verb,
    name: String,
    payload: String,
}

impl Message {
    pub fn new(verb: Verb, name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            verb,
            name: name.into(),
            payload: payload.into(),
        }
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Render the request as a wire frame.
    pub fn to_frame(&self) -> String {
        let mut frame = format!("{} {} {}{}", self.verb.token(), self.name, PROTOCOL, CRLF);
        if !self.payload.is_empty() {
            frame.push_str(&self.payload);
            frame.push_str(CRLF);
        }
        frame.push_str(CRLF);
        frame
    }
}

/// Parse frame text into a [`Message`].
///
/// The request line is `<VERB> <NAME> <MARKER>`: the verb ends at the first
/// whitespace character and the marker starts after the last one, so the name
/// may itself contain spaces. The marker is only a positional anchor and its
/// content is not checked. Everything after the first CRLF, minus the
/// terminator, is the payload. Checks run in a fixed order: structure, verb,
/// empty name, name length.
pub fn parse_request(frame: &str) -> Result<Message, GatewayError> {
    let body = frame.strip_suffix("\r\n\r\n").unwrap_or(frame);
    let (request_line, payload) = body.split_once(CRLF).unwrap_or((body, ""));

    let (command, rest) = split_at_first_whitespace(request_line).ok_or_else(|| {
        GatewayError::MalformedRequest("request line has no name field".to_string())
    })?;
    let (name, marker) = split_at_last_whitespace(rest).ok_or_else(|| {
        GatewayError::MalformedRequest("request line has no protocol marker".to_string())
    })?;
    if marker.is_empty() {
        return Err(GatewayError::MalformedRequest(
            "protocol marker is empty".to_string(),
        ));
    }

    let verb = Verb::from_token(command).ok_or_else(|| {
        GatewayError::MalformedRequest(format!("unknown command {:?}", command))
    })?;

    validate_name(name)?;

    Ok(Message::new(verb, name, payload))
}

/// Reject empty, blank, and over-long names.
pub fn validate_name(name: &str) -> Result<(), GatewayError> {
    if name.trim().is_empty() {
        return Err(GatewayError::EmptyName);
    }
    let chars = name.chars().count();
    if chars > MAX_NAME_CHARS {
        return Err(GatewayError::MalformedRequest(format!(
            "name is {} characters, limit is {}",
            chars, MAX_NAME_CHARS
        )));
    }
    Ok(())
}

fn split_at_first_whitespace(s: &str) -> Option<(&str, &str)> {
    s.char_indices()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, c)| (&s[..i], &s[i + c.len_utf8()..]))
}

fn split_at_last_whitespace(s: &str) -> Option<(&str, &str)> {
    s.char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, c)| (&s[..i], &s[i + c.len_utf8()..]))
}

// ─── Responses ───────────────────────────────────────────────────────────────

/// What the gateway writes back on a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Success, with the stored payload for fetches.
    Ok(Option<String>),
    NotFound,
    IncorrectRequest,
    /// The authority's denial, passed through untouched.
    Verbatim(String),
}

impl Response {
    /// Serialize to the exact bytes sent to the client.
    pub fn encode(&self) -> String {
        match self {
            Response::Ok(Some(payload)) => format!(
                "{} {}{}{}{}{}",
                ResponseStatus::Ok.token(),
                PROTOCOL,
                CRLF,
                payload,
                CRLF,
                CRLF
            ),
            Response::Ok(None) => envelope(ResponseStatus::Ok),
            Response::NotFound => envelope(ResponseStatus::NotFound),
            Response::IncorrectRequest => envelope(ResponseStatus::IncorrectRequest),
            Response::Verbatim(text) => text.clone(),
        }
    }

    /// Status of a gateway-built response; `None` for pass-through text.
    pub fn status(&self) -> Option<ResponseStatus> {
        match self {
            Response::Ok(_) => Some(ResponseStatus::Ok),
            Response::NotFound => Some(ResponseStatus::NotFound),
            Response::IncorrectRequest => Some(ResponseStatus::IncorrectRequest),
            Response::Verbatim(_) => None,
        }
    }
}

impl From<ResponseStatus> for Response {
    fn from(status: ResponseStatus) -> Self {
        match status {
            ResponseStatus::Ok => Response::Ok(None),
            ResponseStatus::NotFound => Response::NotFound,
            ResponseStatus::IncorrectRequest => Response::IncorrectRequest,
        }
    }
}

fn envelope(status: ResponseStatus) -> String {
    format!("{} {}{}{}", status.token(), PROTOCOL, CRLF, CRLF)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
