//! Per-connection protocol sessions for QTGP.
//!
//! A [`ConnectionSession`] pairs one connection with one protocol state
//! machine and dispatches inbound messages against it:
//!
//! ```text
//!   inbound Message ──► ConnectionSession::handle_message
//!                            │  (precondition + transitions,
//!                            │   atomic under the state lock)
//!                            ▼
//!                  Ok(Some(reply)) | Ok(None) | Err(SessionError)
//! ```
//!
//! The caller owns the transport: it writes the reply (if any) and
//! decides connection teardown when dispatch reports an undefined
//! transition.

mod error;
mod session;

pub use error::SessionError;
pub use session::ConnectionSession;
