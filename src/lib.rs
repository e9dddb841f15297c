//! # iothub-lite - IoT hub client for constrained devices
//!
//! A small Rust client that lets an embedded device talk to a cloud IoT message
//! hub over plain HTTP/1.1 on top of any TCP-capable link, such as a cellular
//! modem. It is designed for `no_std` targets with tiny, fixed-size buffers.
//!
//! ## Features
//!
//! - **Connection strings**: device identity and signing key are taken from a
//!   `HostName=...;DeviceId=...;SharedAccessKey=...` string
//! - **SAS tokens**: HMAC-SHA256 signed, time-limited tokens, cached and
//!   renewed on demand
//! - **Hand-framed HTTP**: exact request text for publishing telemetry and
//!   pulling device-bound messages, with no general HTTP stack
//! - **Flaky-link friendly**: connection reuse, bounded 200-byte writes,
//!   polled reads with a fixed retry budget
//!
//! ## Usage
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! iothub-lite = "0.1.0"
//! ```
//!
//! ### Publishing telemetry
//!
//! ```rust,no_run
//! use iothub_lite::network::application::hub::{Config, HubClient};
//! use iothub_lite::network::{Close, Connect, Connection, Read, Write};
//! use iothub_lite::time::{Clock, Delay};
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
//! let mut hub = HubClient::new(
//!     Modem,
//!     Rtc,
//!     Spin,
//!     "HostName=myhub.example.net;DeviceId=dev1;SharedAccessKey=a2V5MTI=",
//!     Config::default(),
//! )?;
//!
//! let status = hub.publish(br#"{"temperature":23.5}"#)?;
//! # Ok::<(), iothub_lite::network::application::hub::Error>(())
//! ```
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support, including a `TcpStream` based
//!   connector and a system clock
//! - `defmt`: Enable defmt logging support for embedded debugging

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

// Must come first so the logging macros are visible to every module.
mod fmt;

/// Network abstraction layer and the hub protocol client.
///
/// Contains the transport traits the client is generic over, along with the
/// application-layer hub implementation.
pub mod network;

/// Time sources used for token expiry and blocking waits.
pub mod time;
