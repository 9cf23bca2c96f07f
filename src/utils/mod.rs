//! The `utils` module provides definitions shared across the `chathub`
//! application: the error taxonomy and the logging bootstrap.

pub mod error;
pub mod logging;

pub use error::{AuthError, Error, ErrorCause, HubError, Result, StoreError};
