//! # pses-session
//!
//! Client side of the PowerShell Editor Services session handshake: the
//! editor launches the backend out of band, hands it a session file path,
//! and polls that path until the backend publishes which named-pipe
//! endpoints it bound. This crate owns the session record wire format and
//! the polling rendezvous; spawning the backend and opening the pipes are
//! the caller's job, with `pses-paths` supplying both sides' pipe-address
//! convention.

pub mod errors;
pub mod rendezvous;
pub mod types;

pub use errors::SessionFileError;
pub use rendezvous::{
    CancelHandle, CancelSignal, DeleteOutcome, SessionFile, WaitConfig, cancellation,
};
pub use types::{SessionDetails, SessionStatus};
