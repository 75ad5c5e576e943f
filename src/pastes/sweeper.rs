// src/pastes/sweeper.rs
//! Background deletion of expired pastes and OAuth login states

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::common::helpers::now_millis;
use crate::common::ApiError;
use crate::storage::{OAuthStateStore, PasteStore};

/// Rows removed by one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub pastes: u64,
    pub states: u64,
}

pub struct ExpirySweeper {
    pastes: Arc<dyn PasteStore>,
    states: Arc<dyn OAuthStateStore>,
    interval: Duration,
}

impl ExpirySweeper {
    pub fn new(
        pastes: Arc<dyn PasteStore>,
        states: Arc<dyn OAuthStateStore>,
        interval: Duration,
    ) -> Self {
        Self {
            pastes,
            states,
            interval,
        }
    }

    pub async fn run_once(&self) -> Result<SweepReport, ApiError> {
        let started = Instant::now();
        let now = now_millis();

        let pastes = self.pastes.delete_expired_pastes(now).await?;
        let states = self.states.delete_expired_states(now).await?;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if pastes > 0 || states > 0 {
            info!(pastes, states, elapsed_ms, "Expired rows swept");
        } else {
            debug!(elapsed_ms, "Sweep found nothing to delete");
        }

        Ok(SweepReport { pastes, states })
    }

    /// Sweeps on every tick until the task is aborted. A failed sweep is
    /// logged and the next tick tries again.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if let Err(e) = self.run_once().await {
                    error!(error = %e, "Expiry sweep failed");
                }
            }
        })
    }
}
