//! Hand-framed HTTP/1.1 requests for the hub's device endpoints.
//!
//! Only `Content-Length` framing is produced. The request text built here is
//! the head of the request; a publish body follows it on the wire.

use super::Error;
use super::token::DEVICES_PATH;
use core::fmt::Write;
use heapless::String;

/// Capacity of an endpoint path.
pub const PATH_CAPACITY: usize = 256;

/// Capacity of the request head text.
pub const REQUEST_CAPACITY: usize = 1536;

/// Request head text.
pub type RequestText = String<REQUEST_CAPACITY>;

const API_VERSION: &str = "api-version=2016-11-14";
const PUBLISH_SUFFIX: &str = "/messages/events";
const DEVICE_BOUND_SUFFIX: &str = "/messages/devicebound";
const CONTENT_TYPE: &str = "application/atom+xml;type=entry;charset=utf-8";
const ROUTE_HEADER: &str = "iothub-app-route-id";

/// The two endpoints a device talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    publish: String<PATH_CAPACITY>,
    device_bound: String<PATH_CAPACITY>,
}

impl Endpoints {
    /// Derive the endpoint paths for `device_id`.
    pub fn new(device_id: &str) -> Result<Self, Error> {
        Ok(Self {
            publish: endpoint(device_id, PUBLISH_SUFFIX)?,
            device_bound: endpoint(device_id, DEVICE_BOUND_SUFFIX)?,
        })
    }

    /// Path device-to-cloud messages are posted to.
    pub fn publish(&self) -> &str {
        &self.publish
    }

    /// Path device-bound messages are fetched from.
    pub fn device_bound(&self) -> &str {
        &self.device_bound
    }
}

fn endpoint(device_id: &str, suffix: &str) -> Result<String<PATH_CAPACITY>, Error> {
    let mut path = String::new();
    write!(path, "{}{}{}?{}", DEVICES_PATH, device_id, suffix, API_VERSION)
        .map_err(|_| Error::BufferOverflow)?;
    Ok(path)
}

/// Head of a publish request announcing a body of `content_length` bytes.
///
/// The `iothub-app-route-id` header is only written when `route_id` is set.
pub fn publish(
    path: &str,
    host: &str,
    token: &str,
    route_id: Option<&str>,
    content_length: usize,
) -> Result<RequestText, Error> {
    let mut request = RequestText::new();
    write!(
        request,
        "POST {} HTTP/1.1\r\n\
         Host: {}\r\n\
         Authorization: SharedAccessSignature {}\r\n\
         Content-Type: {}\r\n",
        path, host, token, CONTENT_TYPE
    )
    .map_err(|_| Error::BufferOverflow)?;

    if let Some(route_id) = route_id {
        write!(request, "{}: {}\r\n", ROUTE_HEADER, route_id)
            .map_err(|_| Error::BufferOverflow)?;
    }

    write!(request, "Content-Length: {}\r\n\r\n", content_length)
        .map_err(|_| Error::BufferOverflow)?;
    Ok(request)
}

/// A device-bound message request. Asks the hub to close the connection
/// after replying.
pub fn device_bound(path: &str, host: &str, token: &str) -> Result<RequestText, Error> {
    let mut request = RequestText::new();
    write!(
        request,
        "GET {} HTTP/1.1\r\n\
         Host: {}\r\n\
         Authorization: SharedAccessSignature {}\r\n\
         Connection: close\r\n\r\n",
        path, host, token
    )
    .map_err(|_| Error::BufferOverflow)?;
    Ok(request)
}
