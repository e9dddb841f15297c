//! Status extraction from raw hub responses.
//!
//! Responses are not parsed. The status code is read from a fixed position,
//! assuming the reply starts with `HTTP/1.1 ` so that the three digits sit at
//! bytes 9 to 11. A reply too short to hold them yields [`Status::Unknown`].
//! A reply with a different prefix gives a meaningless code.

use heapless::String;

const STATUS_START: usize = 9;
const STATUS_END: usize = 12;

/// Outcome of a request as reported by the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Three characters found where the status code should be.
    Code(String<3>),
    /// No usable reply, either because nothing arrived in time or the reply
    /// was too short.
    Unknown,
}

impl Status {
    /// Extract the status from a raw response.
    pub fn from_response(raw: &[u8]) -> Self {
        if raw.len() <= STATUS_END {
            return Status::Unknown;
        }
        core::str::from_utf8(&raw[STATUS_START..STATUS_END])
            .ok()
            .and_then(|code| String::try_from(code).ok())
            .map_or(Status::Unknown, Status::Code)
    }

    /// The code text, or `"unknown"`.
    pub fn as_str(&self) -> &str {
        match self {
            Status::Code(code) => code.as_str(),
            Status::Unknown => "unknown",
        }
    }

    /// The code as a number, if it is one.
    pub fn code(&self) -> Option<u16> {
        match self {
            Status::Code(code) => code.parse().ok(),
            Status::Unknown => None,
        }
    }

    /// Whether the hub reported a 2xx status.
    pub fn is_success(&self) -> bool {
        matches!(self.code(), Some(200..=299))
    }
}

impl core::fmt::Display for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.as_str())
    }
}
