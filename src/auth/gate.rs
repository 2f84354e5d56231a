//! Single-Flight Credential Refresh
//!
//! Any number of requests may find their access token expired at once.
//! The first one runs the refresh; everyone arriving while it is in flight
//! queues a waiter and is handed the same result, in FIFO order.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::session::AuthSession;
use crate::domain::{DomainError, DomainResult, TokenPair};

/// Exchanges the long-lived credential for a new token pair
#[async_trait]
pub trait CredentialRefresher: Send + Sync {
    async fn refresh_credential(&self, refresh_token: &str) -> DomainResult<TokenPair>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    Idle,
    Refreshing,
}

type Waiter = oneshot::Sender<DomainResult<String>>;

#[derive(Default)]
struct GateState {
    in_flight: bool,
    waiters: VecDeque<Waiter>,
    round_trips: u64,
    last_refreshed_at: Option<DateTime<Utc>>,
}

/// One per application session; shared by every request task
pub struct RefreshGate {
    session: Arc<AuthSession>,
    refresher: Arc<dyn CredentialRefresher>,
    // Never held across an await.
    state: Mutex<GateState>,
}

impl RefreshGate {
    pub fn new(session: Arc<AuthSession>, refresher: Arc<dyn CredentialRefresher>) -> Self {
        Self {
            session,
            refresher,
            state: Mutex::new(GateState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> GateStatus {
        if self.state().in_flight {
            GateStatus::Refreshing
        } else {
            GateStatus::Idle
        }
    }

    /// Number of refresh round trips issued so far
    pub fn round_trips(&self) -> u64 {
        self.state().round_trips
    }

    pub fn queued(&self) -> usize {
        self.state().waiters.len()
    }

    pub fn last_refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.state().last_refreshed_at
    }

    /// Obtain a fresh access token, joining the in-flight refresh if there
    /// is one. A failed refresh clears the session.
    pub async fn recover(&self) -> DomainResult<String> {
        let queued = {
            let mut state = self.state();
            if state.in_flight {
                let (tx, rx) = oneshot::channel();
                state.waiters.push_back(tx);
                Some(rx)
            } else {
                state.in_flight = true;
                state.round_trips += 1;
                None
            }
        };

        if let Some(rx) = queued {
            debug!("credential refresh in flight, waiting");
            return rx
                .await
                .unwrap_or_else(|_| Err(DomainError::AuthRefreshFailed("refresh was abandoned".to_string())));
        }

        let mut flight = InFlight { gate: self, settled: false };
        let outcome = self.refresh_once().await;
        flight.settle(&outcome);
        outcome
    }

    async fn refresh_once(&self) -> DomainResult<String> {
        let result = match self.session.refresh_token().await {
            Ok(Some(refresh_token)) => {
                info!("refreshing access credential");
                match self.refresher.refresh_credential(&refresh_token).await {
                    Ok(tokens) => self.session.rotate(&tokens).await.map(|_| tokens.token),
                    Err(e) => Err(e),
                }
            }
            Ok(None) => Err(DomainError::AuthRefreshFailed("no refresh credential stored".to_string())),
            Err(e) => Err(e),
        };

        match result {
            Ok(token) => {
                info!("access credential refreshed");
                Ok(token)
            }
            Err(e) => {
                warn!("credential refresh failed, signing out: {}", e);
                self.session.clear().await;
                Err(match e {
                    DomainError::AuthRefreshFailed(_) => e,
                    other => DomainError::AuthRefreshFailed(other.to_string()),
                })
            }
        }
    }
}

/// Marks the gate busy while the leader refreshes. If the leader's future is
/// dropped mid-refresh, the gate reopens and queued waiters are rejected.
struct InFlight<'a> {
    gate: &'a RefreshGate,
    settled: bool,
}

impl InFlight<'_> {
    fn release(&mut self, refreshed: bool) -> VecDeque<Waiter> {
        self.settled = true;
        let mut state = self.gate.state();
        state.in_flight = false;
        if refreshed {
            state.last_refreshed_at = Some(Utc::now());
        }
        std::mem::take(&mut state.waiters)
    }

    fn settle(&mut self, outcome: &DomainResult<String>) {
        let waiters = self.release(outcome.is_ok());
        debug!(waiters = waiters.len(), "releasing queued requests");
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("credential refresh abandoned");
            drop(self.release(false));
        }
    }
}
