//! Transport abstractions for the hub client.
//!
//! The client does not own a TCP stack. Instead it drives whatever link the
//! device has (a cellular modem's socket commands, smoltcp, `std::net`) through
//! the small set of blocking traits defined here.
//!
//! A [`Connect`] implementation opens a [`Connection`] to a `host:port`
//! remote. A connection is something that can be read from, written to and
//! closed.

#![deny(unsafe_code)]

/// Common error type for transport implementations
pub mod error;

/// Application-layer protocols built on the transport traits
pub mod application;

/// `std::net::TcpStream` backed transport
#[cfg(feature = "std")]
pub mod tcp;

/// Re-exports of common traits
pub mod prelude {
    pub use super::{Close, Connect, Connection, Read, Write};
}

/// Reading side of a connection.
pub trait Read {
    /// Associated error type
    type Error: core::fmt::Debug;

    /// Read whatever bytes are available into `buf`.
    ///
    /// Returns `Ok(0)` when nothing has arrived yet. Callers poll, so an
    /// implementation should not block indefinitely waiting for data.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Writing side of a connection.
pub trait Write {
    /// Associated error type
    type Error: core::fmt::Debug;

    /// Write bytes from `buf`, returning how many were accepted.
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any data buffered by the transport
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Closing a connection.
pub trait Close {
    /// Associated error type
    type Error: core::fmt::Debug;

    /// Close the connection, consuming it
    fn close(self) -> Result<(), Self::Error>;
}

/// An open, bidirectional connection.
pub trait Connection: Read + Write + Close {}

/// Something that can open connections, such as a modem or a network stack.
pub trait Connect {
    /// Associated connection type
    type Connection: Connection;
    /// Associated error type
    type Error: core::fmt::Debug;

    /// Open a connection to `remote`, given as `host:port`.
    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error>;
}
