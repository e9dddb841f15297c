//! Device credentials taken from a hub connection string.
//!
//! A connection string looks like
//! `HostName=<host>;DeviceId=<id>;SharedAccessKey=<base64 key>`. Fields are
//! picked by position, not by key name: the first field is always the host,
//! the second the device id and the third the shared key. Anything missing
//! or too long for its buffer comes back empty rather than as an error.

use heapless::String;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Maximum length of the hub host name.
pub const MAX_HOST_LEN: usize = 128;

/// Maximum length of the device id.
pub const MAX_DEVICE_ID_LEN: usize = 128;

/// Maximum length of the base64 shared access key.
pub const MAX_KEY_LEN: usize = 128;

const FIELD_SEPARATOR: char = ';';
const VALUE_SEPARATOR: char = '=';

/// Return the `index`-th `separator` delimited field of `data`.
///
/// The last field runs to the end of input. An index past the last field
/// yields an empty string.
///
/// ```
/// use iothub_lite::network::application::hub::credentials::split_by_index;
///
/// assert_eq!(split_by_index("a;b;c", ';', 1), "b");
/// assert_eq!(split_by_index("a;b;c", ';', 2), "c");
/// assert_eq!(split_by_index("a;b;c", ';', 3), "");
/// ```
pub fn split_by_index(data: &str, separator: char, index: usize) -> &str {
    data.split(separator).nth(index).unwrap_or("")
}

/// Value part of a `Key=Value` field, split at the first `=`.
///
/// Base64 padding in the value is kept intact.
fn value_of(field: &str) -> &str {
    field.splitn(2, VALUE_SEPARATOR).nth(1).unwrap_or("")
}

fn field_value<const N: usize>(connection_string: &str, index: usize) -> String<N> {
    let value = value_of(split_by_index(connection_string, FIELD_SEPARATOR, index));
    String::try_from(value).unwrap_or_default()
}

/// The base64 shared access key.
///
/// The key bytes are wiped when the value is dropped, and `Debug` output
/// never shows them.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedKey {
    bytes: [u8; MAX_KEY_LEN],
    len: usize,
}

impl SharedKey {
    fn new(key: &str) -> Self {
        let mut bytes = [0u8; MAX_KEY_LEN];
        let len = if key.len() <= MAX_KEY_LEN {
            bytes[..key.len()].copy_from_slice(key.as_bytes());
            key.len()
        } else {
            0
        };
        Self { bytes, len }
    }

    /// The key as base64 text.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Returns `true` if no key was present.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl core::fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SharedKey")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// Identity and signing key of a device.
#[derive(Debug, Clone)]
pub struct Credentials {
    host: String<MAX_HOST_LEN>,
    device_id: String<MAX_DEVICE_ID_LEN>,
    shared_key: SharedKey,
}

impl Credentials {
    /// Parse a connection string.
    ///
    /// Never fails: missing fields are left empty.
    pub fn parse(connection_string: &str) -> Self {
        let key = value_of(split_by_index(connection_string, FIELD_SEPARATOR, 2));
        Self {
            host: field_value(connection_string, 0),
            device_id: field_value(connection_string, 1),
            shared_key: SharedKey::new(key),
        }
    }

    /// Host name of the hub.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Device id.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Shared access key used to sign tokens.
    pub fn shared_key(&self) -> &SharedKey {
        &self.shared_key
    }
}
