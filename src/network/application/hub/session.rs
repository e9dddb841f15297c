//! A single reusable link to the hub.
//!
//! The session opens at most one connection and keeps it across requests.
//! Outbound data is written in segments of at most [`MAX_SEGMENT_LEN`]
//! bytes. Inbound data is polled into one fixed receive buffer owned by the
//! session, so a response is truncated to [`RECEIVE_BUFFER_SIZE`] bytes.
//!
//! Connection state only changes as a result of transport calls. A failed
//! write or read drops the connection, and the next request reconnects.

use super::Error;
use crate::network::{Close, Connect, Read, Write};
use crate::time::Delay;

/// Size of the receive buffer.
pub const RECEIVE_BUFFER_SIZE: usize = 512;

/// Largest segment handed to the transport in a single write.
pub const MAX_SEGMENT_LEN: usize = 200;

/// Connection state and receive buffer for one hub.
pub struct Session<C: Connect> {
    connector: C,
    connection: Option<C::Connection>,
    buffer: [u8; RECEIVE_BUFFER_SIZE],
}

impl<C: Connect> core::fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

impl<C: Connect> Session<C> {
    /// Create a disconnected session.
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            connection: None,
            buffer: [0; RECEIVE_BUFFER_SIZE],
        }
    }

    /// Whether a connection is currently open.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// The connector used to open connections.
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Open a connection to `remote` unless one is already open.
    ///
    /// A fresh connection is given `settle_delay_ms` before it is used,
    /// since the link layer may still be coming up when the transport
    /// reports success.
    pub fn connect<D: Delay>(
        &mut self,
        remote: &str,
        settle_delay_ms: u32,
        delay: &mut D,
    ) -> Result<(), Error> {
        if self.connection.is_some() {
            trace!("reusing open connection");
            return Ok(());
        }

        debug!("connecting to {}", remote);
        let connection = self.connector.connect(remote).map_err(|_| {
            warn!("connect to {} failed", remote);
            Error::Connect
        })?;

        delay.delay_ms(settle_delay_ms);
        self.connection = Some(connection);
        Ok(())
    }

    /// Write `data` in segments of at most [`MAX_SEGMENT_LEN`] bytes.
    ///
    /// Stops at the first failed segment. Segments already written stay
    /// written, and the connection is dropped.
    pub fn write_chunked(&mut self, data: &[u8]) -> Result<(), Error> {
        let connection = self.connection.as_mut().ok_or(Error::NotConnected)?;

        let result = data
            .chunks(MAX_SEGMENT_LEN)
            .try_for_each(|segment| write_segment(connection, segment))
            .and_then(|()| connection.flush().map_err(|_| Error::Write));

        if result.is_err() {
            warn!("write of {} bytes failed, dropping connection", data.len());
            self.disconnect();
        }
        result
    }

    /// Poll for a response.
    ///
    /// Makes up to `attempts` reads, waiting `interval_ms` before each, and
    /// returns the first non-empty one. Returns an empty slice if nothing
    /// arrives, if there is no connection, or if a read fails (which also
    /// drops the connection).
    pub fn poll_read<D: Delay>(&mut self, delay: &mut D, interval_ms: u32, attempts: u8) -> &[u8] {
        let mut received = 0;

        for attempt in 0..attempts {
            let Some(connection) = self.connection.as_mut() else {
                break;
            };

            delay.delay_ms(interval_ms);
            match connection.read(&mut self.buffer) {
                Ok(0) => trace!("no data on attempt {}", attempt),
                Ok(n) => {
                    received = n.min(RECEIVE_BUFFER_SIZE);
                    break;
                }
                Err(_) => {
                    warn!("read failed, dropping connection");
                    self.disconnect();
                    break;
                }
            }
        }

        debug!("received {} bytes", received);
        &self.buffer[..received]
    }

    /// Close the connection, if one is open.
    pub fn disconnect(&mut self) {
        if let Some(connection) = self.connection.take() {
            if connection.close().is_err() {
                warn!("close failed");
            }
            debug!("disconnected");
        }
    }
}

fn write_segment<W: Write>(connection: &mut W, mut segment: &[u8]) -> Result<(), Error> {
    while !segment.is_empty() {
        match connection.write(segment) {
            Ok(0) | Err(_) => return Err(Error::Write),
            Ok(n) => segment = &segment[n.min(segment.len())..],
        }
    }
    Ok(())
}
