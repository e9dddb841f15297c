use super::credentials::{Credentials, MAX_HOST_LEN};
use super::request::{self, Endpoints};
use super::response::Status;
use super::session::{RECEIVE_BUFFER_SIZE, Session};
use super::token::{AccessToken, TokenGenerator};
use super::{Config, Error, MAX_ROUTE_ID_LEN};
use crate::network::Connect;
use crate::time::{Clock, Delay};
use core::fmt::Write;
use heapless::String;

const REMOTE_CAPACITY: usize = MAX_HOST_LEN + 6;

/// Reply to a device-bound message request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullResponse {
    /// Status read from the reply.
    pub status: Status,
    /// The reply as received, status line and headers included. Truncated to
    /// the receive buffer size, and to the last complete UTF-8 character.
    pub raw: String<RECEIVE_BUFFER_SIZE>,
}

impl PullResponse {
    fn from_raw(raw: &[u8]) -> Self {
        let text = match core::str::from_utf8(raw) {
            Ok(text) => text,
            Err(e) => core::str::from_utf8(&raw[..e.valid_up_to()]).unwrap_or(""),
        };
        Self {
            status: Status::from_response(raw),
            raw: String::try_from(text).unwrap_or_default(),
        }
    }
}

/// A client for one device on one hub.
///
/// Owns the link session, the device credentials and the current access
/// token. All operations block until done and take `&mut self`, so only one
/// request is ever in flight.
pub struct HubClient<C: Connect, K: Clock, D: Delay> {
    session: Session<C>,
    clock: K,
    delay: D,
    credentials: Credentials,
    endpoints: Endpoints,
    tokens: TokenGenerator,
    route_id: Option<String<MAX_ROUTE_ID_LEN>>,
    port: u16,
    settle_delay_ms: u32,
    poll_interval_ms: u32,
    poll_attempts: u8,
}

impl<C: Connect, K: Clock, D: Delay> core::fmt::Debug for HubClient<C, K, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HubClient")
            .field("session", &self.session)
            .field("credentials", &self.credentials)
            .field("endpoints", &self.endpoints)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

impl<C: Connect, K: Clock, D: Delay> HubClient<C, K, D> {
    /// Create a client from a connection string.
    ///
    /// The connection string is parsed leniently; missing fields are left
    /// empty and only show up as failed requests later. Fails with
    /// [`Error::BufferOverflow`] if the route id is longer than
    /// [`MAX_ROUTE_ID_LEN`].
    pub fn new(
        connector: C,
        clock: K,
        delay: D,
        connection_string: &str,
        config: Config<'_>,
    ) -> Result<Self, Error> {
        let credentials = Credentials::parse(connection_string);
        let endpoints = Endpoints::new(credentials.device_id())?;
        let route_id = config
            .route_id
            .map(|id| String::try_from(id).map_err(|_| Error::BufferOverflow))
            .transpose()?;

        info!(
            "hub client for device {} on {}",
            credentials.device_id(),
            credentials.host()
        );

        Ok(Self {
            session: Session::new(connector),
            clock,
            delay,
            credentials,
            endpoints,
            tokens: TokenGenerator::new(config.token_lifetime_seconds),
            route_id,
            port: config.port,
            settle_delay_ms: config.settle_delay_ms,
            poll_interval_ms: config.poll_interval_ms,
            poll_attempts: config.poll_attempts,
        })
    }

    /// Send `payload` as a device-to-cloud message and return the hub's
    /// status.
    ///
    /// A reply that never arrives is [`Status::Unknown`], not an error.
    pub fn publish(&mut self, payload: &[u8]) -> Result<Status, Error> {
        self.publish_begin(payload.len())?;
        self.publish_data(payload)?;
        Ok(self.publish_end())
    }

    /// Start a message whose body is `content_length` bytes long.
    ///
    /// Renews the token if needed, connects if needed, and sends the request
    /// head. The body must follow through [`publish_data`](Self::publish_data)
    /// and add up to exactly `content_length` bytes.
    pub fn publish_begin(&mut self, content_length: usize) -> Result<(), Error> {
        let remote = remote(self.credentials.host(), self.port)?;
        let token = self.tokens.ensure_valid(&self.credentials, &self.clock)?;
        self.session
            .connect(&remote, self.settle_delay_ms, &mut self.delay)?;

        let request = request::publish(
            self.endpoints.publish(),
            self.credentials.host(),
            token.as_str(),
            self.route_id.as_deref(),
            content_length,
        )?;
        debug!("publishing {} bytes", content_length);
        self.session.write_chunked(request.as_bytes())
    }

    /// Send part of the body of a message started with
    /// [`publish_begin`](Self::publish_begin).
    pub fn publish_data(&mut self, data: &[u8]) -> Result<(), Error> {
        self.session.write_chunked(data)
    }

    /// Finish a message and wait for the hub's status.
    ///
    /// If no reply arrives in time the connection is dropped, so a late reply
    /// cannot be mistaken for the status of the next request.
    pub fn publish_end(&mut self) -> Status {
        let raw = self
            .session
            .poll_read(&mut self.delay, self.poll_interval_ms, self.poll_attempts);
        let status = Status::from_response(raw);
        if raw.is_empty() {
            warn!("no reply from hub, dropping connection");
            self.session.disconnect();
        }
        info!("publish status {}", status);
        status
    }

    /// Fetch the next device-bound message.
    ///
    /// The request asks the hub to close the connection after replying, so
    /// the session is disconnected afterwards.
    pub fn pull_device_bound_message(&mut self) -> Result<PullResponse, Error> {
        let remote = remote(self.credentials.host(), self.port)?;
        let token = self.tokens.ensure_valid(&self.credentials, &self.clock)?;
        self.session
            .connect(&remote, self.settle_delay_ms, &mut self.delay)?;

        let request = request::device_bound(
            self.endpoints.device_bound(),
            self.credentials.host(),
            token.as_str(),
        )?;
        self.session.write_chunked(request.as_bytes())?;

        let raw = self
            .session
            .poll_read(&mut self.delay, self.poll_interval_ms, self.poll_attempts);
        let response = PullResponse::from_raw(raw);
        self.session.disconnect();

        info!("device-bound status {}", response.status);
        Ok(response)
    }

    /// Return a token that is valid now, renewing it if it has expired.
    pub fn ensure_valid_token(&mut self) -> Result<&AccessToken, Error> {
        self.tokens.ensure_valid(&self.credentials, &self.clock)
    }

    /// Device credentials parsed from the connection string.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Endpoint paths of this device.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Whether a connection to the hub is open.
    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// The connector used to reach the hub.
    pub fn connector(&self) -> &C {
        self.session.connector()
    }

    /// Close the connection to the hub, if open.
    pub fn disconnect(&mut self) {
        self.session.disconnect();
    }
}

fn remote(host: &str, port: u16) -> Result<String<REMOTE_CAPACITY>, Error> {
    let mut remote = String::new();
    write!(remote, "{}:{}", host, port)
        .map_err(|_| Error::BufferOverflow)?;
    Ok(remote)
}
