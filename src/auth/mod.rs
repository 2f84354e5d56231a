//! Authentication
//!
//! Session state plus the single-flight refresh gate that every outgoing
//! request funnels through when its access token has expired.

mod session;
mod gate;

pub use session::{AuthSession, SessionStatus};
pub use gate::{CredentialRefresher, GateStatus, RefreshGate};
