//! Shared access signature (SAS) tokens.
//!
//! A token grants access to the device's endpoints on the hub until its
//! expiry time. It has the form
//!
//! ```text
//! sr=<scope>&sig=<signature>&se=<expiry>
//! ```
//!
//! where `<scope>` is the percent-encoded host followed by the
//! percent-encoded `/devices/` prefix and the raw device id, `<expiry>` is a
//! Unix timestamp in seconds, and `<signature>` is the percent-encoded base64
//! of `HMAC-SHA256(key, scope + "\n" + expiry)` keyed with the base64-decoded
//! shared access key.
//!
//! The scope is signed exactly as it appears in the token. The hub checks
//! the signature against that same text, so it must not be normalised.

use super::Error;
use super::credentials::{Credentials, MAX_DEVICE_ID_LEN, MAX_HOST_LEN, MAX_KEY_LEN};
use crate::time::Clock;
use base64ct::{Base64, Encoding};
use core::fmt::Write;
use heapless::String;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Path prefix shared by all device endpoints.
pub const DEVICES_PATH: &str = "/devices/";

/// Capacity of the signed scope.
pub const SCOPE_CAPACITY: usize = 3 * MAX_HOST_LEN + 3 * DEVICES_PATH.len() + MAX_DEVICE_ID_LEN;

/// Capacity of a complete token value.
pub const TOKEN_CAPACITY: usize = 768;

const DECODED_KEY_CAPACITY: usize = MAX_KEY_LEN / 4 * 3;
const SIGNATURE_BASE64_LEN: usize = 44;
const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Percent-encode `input` into `out`.
///
/// ASCII letters and digits are copied as-is. Every other byte becomes `%`
/// followed by two lowercase hex digits.
///
/// ```
/// use heapless::String;
/// use iothub_lite::network::application::hub::token::percent_encode;
///
/// let mut out: String<16> = String::new();
/// percent_encode("a b", &mut out).unwrap();
/// assert_eq!(out, "a%20b");
/// ```
pub fn percent_encode<const N: usize>(input: &str, out: &mut String<N>) -> Result<(), Error> {
    for &byte in input.as_bytes() {
        if byte.is_ascii_alphanumeric() {
            out.push(byte as char).map_err(|_| Error::BufferOverflow)?;
        } else {
            out.push('%').map_err(|_| Error::BufferOverflow)?;
            out.push(HEX_DIGITS[usize::from(byte >> 4)] as char)
                .map_err(|_| Error::BufferOverflow)?;
            out.push(HEX_DIGITS[usize::from(byte & 0x0f)] as char)
                .map_err(|_| Error::BufferOverflow)?;
        }
    }
    Ok(())
}

/// A signed token and the time it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String<TOKEN_CAPACITY>,
    expires_at: u64,
}

impl AccessToken {
    /// The token text, as used after `SharedAccessSignature ` in the
    /// `Authorization` header.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Expiry as seconds since the Unix epoch.
    pub fn expires_at(&self) -> u64 {
        self.expires_at
    }

    /// Whether the token has expired at time `now`.
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at
    }
}

/// Builds access tokens and keeps the current one until it expires.
#[derive(Debug)]
pub struct TokenGenerator {
    lifetime_seconds: u64,
    current: Option<AccessToken>,
}

impl TokenGenerator {
    /// Create a generator issuing tokens valid for `lifetime_seconds`.
    pub fn new(lifetime_seconds: u64) -> Self {
        Self {
            lifetime_seconds,
            current: None,
        }
    }

    /// The cached token, if one has been generated.
    pub fn current(&self) -> Option<&AccessToken> {
        self.current.as_ref()
    }

    /// Return a token that is valid now, generating a new one if there is
    /// none yet or the cached one has expired.
    ///
    /// Fails with [`Error::ClockNotSet`] if `clock` has never been set. The
    /// cached token is only replaced once its successor is fully built.
    pub fn ensure_valid<K: Clock>(
        &mut self,
        credentials: &Credentials,
        clock: &K,
    ) -> Result<&AccessToken, Error> {
        if !clock.is_set() {
            warn!("clock not set, cannot sign token");
            return Err(Error::ClockNotSet);
        }

        let now = clock.now();
        let token = match self.current.take() {
            Some(token) if !token.is_expired(now) => token,
            previous => {
                let expires_at = now.saturating_add(self.lifetime_seconds);
                match generate(credentials, expires_at) {
                    Ok(token) => {
                        debug!("generated token expiring at {}", expires_at);
                        token
                    }
                    Err(e) => {
                        self.current = previous;
                        return Err(e);
                    }
                }
            }
        };

        Ok(&*self.current.insert(token))
    }
}

/// The scope a token is valid for.
pub fn scope(credentials: &Credentials) -> Result<String<SCOPE_CAPACITY>, Error> {
    let mut scope = String::new();
    percent_encode(credentials.host(), &mut scope)?;
    percent_encode(DEVICES_PATH, &mut scope)?;
    scope
        .push_str(credentials.device_id())
        .map_err(|_| Error::BufferOverflow)?;
    Ok(scope)
}

/// Sign a token for `credentials` that expires at `expires_at`.
///
/// A missing or oversized shared key is stored empty and fails with
/// [`Error::InvalidKey`] here rather than signing with an empty key.
pub fn generate(credentials: &Credentials, expires_at: u64) -> Result<AccessToken, Error> {
    if credentials.shared_key().is_empty() {
        return Err(Error::InvalidKey);
    }
    let scope = scope(credentials)?;

    let mut expiry: String<20> = String::new();
    write!(expiry, "{}", expires_at)
        .map_err(|_| Error::BufferOverflow)?;

    let mut key = Zeroizing::new([0u8; DECODED_KEY_CAPACITY]);
    let key = Base64::decode(credentials.shared_key().as_bytes(), &mut key[..])
        .map_err(|_| Error::InvalidKey)?;

    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|_| Error::InvalidKey)?;
    mac.update(scope.as_bytes());
    mac.update(b"\n");
    mac.update(expiry.as_bytes());
    let signature = mac.finalize().into_bytes();

    let mut encoded = [0u8; SIGNATURE_BASE64_LEN];
    let encoded = Base64::encode(&signature, &mut encoded)
        .map_err(|_| Error::BufferOverflow)?;

    let mut value: String<TOKEN_CAPACITY> = String::new();
    value.push_str("sr=").map_err(|_| Error::BufferOverflow)?;
    value.push_str(&scope).map_err(|_| Error::BufferOverflow)?;
    value.push_str("&sig=").map_err(|_| Error::BufferOverflow)?;
    percent_encode(encoded, &mut value)?;
    value.push_str("&se=").map_err(|_| Error::BufferOverflow)?;
    value.push_str(&expiry).map_err(|_| Error::BufferOverflow)?;

    Ok(AccessToken { value, expires_at })
}
