//! IoT hub client over HTTP/1.1.
//!
//! This module implements the device side of a cloud IoT hub's HTTP
//! interface for devices that only have a raw TCP link and a few hundred
//! bytes of buffer to spare. It covers:
//!
//! - parsing the device connection string ([`credentials`])
//! - generating and caching shared access signature tokens ([`token`])
//! - framing the publish and device-bound requests ([`request`])
//! - driving the link with connection reuse, bounded writes and polled
//!   reads ([`session`])
//! - reading the status code out of a raw response ([`response`])
//!
//! [`HubClient`] ties these together.
//!
//! # Wire format
//!
//! A publish is an HTTP `POST` to
//! `/devices/<id>/messages/events?api-version=2016-11-14` with a
//! `Content-Length` framed body. A pull is an HTTP `GET` to
//! `/devices/<id>/messages/devicebound?api-version=2016-11-14` with
//! `Connection: close`. Both carry an
//! `Authorization: SharedAccessSignature sr=...&sig=...&se=...` header.
//!
//! ```rust,no_run
//! use iothub_lite::network::application::hub::{Config, HubClient};
//! # use iothub_lite::network::{Close, Connect, Connection, Read, Write};
//! # use iothub_lite::time::{Clock, Delay};
//! # struct Modem;
//! # struct Link;
//! # impl Connection for Link {}
//! # impl Read for Link {
//! #     type Error = ();
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl Write for Link {
//! #     type Error = ();
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl Close for Link {
//! #     type Error = ();
//! #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl Connect for Modem {
//! #     type Connection = Link;
//! #     type Error = ();
//! #     fn connect(&mut self, _remote: &str) -> Result<Link, ()> { Ok(Link) }
//! # }
//! # struct Rtc;
//! # impl Clock for Rtc {
//! #     fn now(&self) -> u64 { 1_700_000_000 }
//! #     fn is_set(&self) -> bool { true }
//! # }
//! # struct Spin;
//! # impl Delay for Spin { fn delay_ms(&mut self, _ms: u32) {} }
//!
//! let config = Config {
//!     route_id: Some("telemetry"),
//!     ..Config::default()
//! };
//! let mut hub = HubClient::new(
//!     Modem,
//!     Rtc,
//!     Spin,
//!     "HostName=myhub.example.net;DeviceId=dev1;SharedAccessKey=a2V5MTI=",
//!     config,
//! )?;
//!
//! // Large payloads can be streamed in pieces.
//! hub.publish_begin(25)?;
//! hub.publish_data(b"{\"reading\":")?;
//! hub.publish_data(b"[1,2,3,4,5,6]}")?;
//! let status = hub.publish_end();
//!
//! let message = hub.pull_device_bound_message()?;
//! if message.status.is_success() {
//!     // message.raw holds the response as received
//! }
//! # Ok::<(), iothub_lite::network::application::hub::Error>(())
//! ```

/// Connection string parsing.
pub mod credentials;

/// Shared access signature tokens.
pub mod token;

/// HTTP request framing.
pub mod request;

/// Link session management.
pub mod session;

/// Response status extraction.
pub mod response;

/// The hub client.
pub mod client;

pub use client::{HubClient, PullResponse};
pub use credentials::Credentials;
pub use response::Status;
pub use token::AccessToken;

/// Default TCP port of the hub.
pub const DEFAULT_PORT: u16 = 443;

/// Default token lifetime in seconds.
pub const DEFAULT_TOKEN_LIFETIME_SECONDS: u64 = 5 * 60;

/// Default time to let the link settle after a fresh connect, in milliseconds.
pub const DEFAULT_SETTLE_DELAY_MS: u32 = 1000;

/// Default pause before each read attempt, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 50;

/// Default number of read attempts before a response is declared unknown.
pub const DEFAULT_POLL_ATTEMPTS: u8 = 10;

/// Maximum length of a message route id.
pub const MAX_ROUTE_ID_LEN: usize = 64;

/// Errors reported by the hub client.
///
/// Every variant is an expected condition on a constrained device with an
/// unreliable link; callers typically log it and retry on the next cycle.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// The clock has never been set, so no token can be generated.
    ClockNotSet,
    /// The shared access key is not valid base64.
    InvalidKey,
    /// The transport failed to open a connection.
    Connect,
    /// Data was written while no connection was open.
    NotConnected,
    /// A write to the transport failed. Part of the request may have been sent.
    Write,
    /// Request text or a configured value does not fit its fixed-size buffer.
    BufferOverflow,
}

impl Error {
    /// Short human readable description, suitable as a status sentinel.
    pub fn as_str(&self) -> &'static str {
        match self {
            Error::ClockNotSet => "Time not set",
            Error::InvalidKey => "Invalid shared access key",
            Error::Connect => "Error connecting to hub",
            Error::NotConnected => "Not connected",
            Error::Write => "Error writing to hub",
            Error::BufferOverflow => "Request too large",
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::ClockNotSet => defmt::write!(f, "ClockNotSet"),
            Error::InvalidKey => defmt::write!(f, "InvalidKey"),
            Error::Connect => defmt::write!(f, "Connect"),
            Error::NotConnected => defmt::write!(f, "NotConnected"),
            Error::Write => defmt::write!(f, "Write"),
            Error::BufferOverflow => defmt::write!(f, "BufferOverflow"),
        }
    }
}

/// Options for configuring the hub client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config<'a> {
    /// TCP port of the hub.
    pub port: u16,
    /// Value of the `iothub-app-route-id` header on published messages.
    /// The header is left out when `None`.
    pub route_id: Option<&'a str>,
    /// Lifetime of a generated token, in seconds.
    pub token_lifetime_seconds: u64,
    /// Wait after a fresh connect before the link is used, in milliseconds.
    pub settle_delay_ms: u32,
    /// Pause before each read attempt, in milliseconds.
    pub poll_interval_ms: u32,
    /// Number of read attempts before giving up on a response.
    pub poll_attempts: u8,
}

impl Default for Config<'_> {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            route_id: None,
            token_lifetime_seconds: DEFAULT_TOKEN_LIFETIME_SECONDS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            poll_attempts: DEFAULT_POLL_ATTEMPTS,
        }
    }
}
