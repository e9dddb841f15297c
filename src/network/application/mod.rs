//! # Application Layer Protocols
//!
//! Application layer (OSI Layer 7) clients built on the transport traits in
//! [`crate::network`].
//!
//! ## Available Protocols
//!
//! - **[`hub`]**: HTTP/1.1 client for a cloud IoT message hub, authenticated
//!   with shared access signature tokens
//!
//! ## Design Principles
//!
//! - **Connection Agnostic**: Work with any type implementing [`Connect`](crate::network::Connect)
//! - **No-std Compatible**: No heap allocation, `heapless` strings throughout
//! - **Resource Conscious**: Fixed-size buffers and bounded writes
//! - **Explicit Results**: Every failure is an error value, never a panic

/// IoT hub client.
///
/// Publishes device-to-cloud messages and pulls device-bound messages over
/// hand-framed HTTP/1.1.
pub mod hub;
