//! The `client` module defines the two views of a joined client.
//!
//! - [`Connection`]: the hub-owned record with the producer end of the
//!   bounded outbound queue.
//! - [`ConnectionHandle`]: what the transport pumps hold to submit messages
//!   and to unregister.

pub mod connection;
pub mod handle;

pub use connection::{Connection, ConnectionId, Outbound};
pub use handle::{ConnectionHandle, Registration};
