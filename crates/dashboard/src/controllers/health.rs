use std::time::{Duration, Instant};

use api_types::{
    Timestamp,
    health::{HealthResponse, ProbeResponse},
};

use crate::client::ClientResult;

pub const FALLBACK_SERVICE: &str = "customer-loader-backend";
pub const FALLBACK_VERSION: &str = "1.0.0";
pub const NOT_READY: &str = "NOT_READY";
pub const NOT_ALIVE: &str = "NOT_ALIVE";

/// Periodic health check with a manual override.
///
/// The interval keeps firing whether or not a check is in flight; a manual
/// refresh issues one extra check without moving the next scheduled one.
/// Both feed the same published status.
#[derive(Debug)]
pub struct HealthPoller {
    interval: Duration,
    next_due: Option<Instant>,
    loading: bool,
    status: Option<HealthResponse>,
    last_refresh: Option<Timestamp>,
    generation: u64,
    applied: u64,
}

impl HealthPoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
            loading: false,
            status: None,
            last_refresh: None,
            generation: 0,
            applied: 0,
        }
    }

    /// Arms the schedule and returns the generation of the immediate check.
    pub fn start(&mut self, now: Instant) -> u64 {
        self.next_due = Some(now + self.interval);
        self.issue()
    }

    /// Returns the generation of a scheduled check when one is due.
    pub fn tick(&mut self, now: Instant) -> Option<u64> {
        let due = self.next_due?;
        if now < due {
            return None;
        }
        let mut next = due + self.interval;
        // After a long stall fire once, not once per missed interval.
        while next <= now {
            next += self.interval;
        }
        self.next_due = Some(next);
        Some(self.issue())
    }

    pub fn manual_refresh(&mut self) -> u64 {
        self.issue()
    }

    /// Publishes the outcome of check `generation`. A failure publishes the
    /// DOWN fallback. Completions older than the last applied one are
    /// ignored.
    pub fn complete(&mut self, generation: u64, result: ClientResult<HealthResponse>) -> bool {
        if generation < self.applied {
            return false;
        }
        self.applied = generation;
        if generation == self.generation {
            self.loading = false;
        }
        self.status = Some(match result {
            Ok(health) => health,
            Err(err) => {
                tracing::debug!("health check degraded to DOWN: {err}");
                HealthResponse::down(FALLBACK_SERVICE, FALLBACK_VERSION)
            }
        });
        self.last_refresh = Some(Timestamp::now());
        true
    }

    pub fn stop(&mut self) {
        self.next_due = None;
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn status(&self) -> Option<&HealthResponse> {
        self.status.as_ref()
    }

    pub fn last_refresh(&self) -> Option<&Timestamp> {
        self.last_refresh.as_ref()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn issue(&mut self) -> u64 {
        self.generation += 1;
        self.loading = true;
        self.generation
    }
}

/// Which probe a completion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Readiness,
    Liveness,
}

/// State of the health screen: the health poller plus the readiness and
/// liveness probes, all refreshed together.
#[derive(Debug)]
pub struct HealthMonitor {
    poller: HealthPoller,
    readiness: Option<ProbeResponse>,
    liveness: Option<ProbeResponse>,
}

impl HealthMonitor {
    pub fn new(interval: Duration) -> Self {
        Self {
            poller: HealthPoller::new(interval),
            readiness: None,
            liveness: None,
        }
    }

    pub fn poller(&self) -> &HealthPoller {
        &self.poller
    }

    pub fn start(&mut self, now: Instant) -> u64 {
        self.poller.start(now)
    }

    pub fn tick(&mut self, now: Instant) -> Option<u64> {
        self.poller.tick(now)
    }

    pub fn manual_refresh(&mut self) -> u64 {
        self.poller.manual_refresh()
    }

    pub fn complete_health(
        &mut self,
        generation: u64,
        result: ClientResult<HealthResponse>,
    ) -> bool {
        self.poller.complete(generation, result)
    }

    pub fn complete_probe(&mut self, probe: Probe, result: ClientResult<ProbeResponse>) {
        match probe {
            Probe::Readiness => {
                self.readiness =
                    Some(result.unwrap_or_else(|_| ProbeResponse::degraded(NOT_READY)));
            }
            Probe::Liveness => {
                self.liveness = Some(result.unwrap_or_else(|_| ProbeResponse::degraded(NOT_ALIVE)));
            }
        }
    }

    pub fn readiness(&self) -> Option<&ProbeResponse> {
        self.readiness.as_ref()
    }

    pub fn liveness(&self) -> Option<&ProbeResponse> {
        self.liveness.as_ref()
    }
}
