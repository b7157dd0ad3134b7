//! Engine readiness gating.
//!
//! Merge and split refuse to run until the PDF and archive engines are
//! confirmed available. The gate polls a probe at a fixed interval; if the
//! engines do not show up before the timeout, one fallback acquisition is
//! attempted. The outcome is settled once and never re-evaluated.
//!
//! # Examples
//!
//! ```
//! use pdfmaster::readiness::{LinkedEngines, ReadinessGate, ReadinessStatus};
//!
//! # async fn example() {
//! let gate = ReadinessGate::default();
//! assert_eq!(gate.wait(&LinkedEngines).await, ReadinessStatus::Ready);
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Availability of the engines as seen by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessStatus {
    /// Still waiting for the engines.
    Loading,
    /// Engines are available.
    Ready,
    /// Engines never showed up, fallback included.
    Unavailable,
}

impl fmt::Display for ReadinessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Unavailable => "unavailable",
        };
        f.write_str(label)
    }
}

/// Timing of the readiness poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessOptions {
    /// Delay between two availability checks.
    pub poll_interval: Duration,
    /// How long to poll before trying the fallback.
    pub timeout: Duration,
}

impl Default for ReadinessOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Something that can tell whether the engines are usable.
pub trait EngineProbe: Send + Sync {
    /// Check whether the engines are available right now.
    fn is_available(&self) -> bool;

    /// Try once to make the engines available by other means.
    ///
    /// Returns true if the attempt succeeded.
    fn acquire_fallback(&self) -> impl Future<Output = bool> + Send;
}

/// Probe for engines linked into the binary. Always available.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkedEngines;

impl EngineProbe for LinkedEngines {
    fn is_available(&self) -> bool {
        true
    }

    async fn acquire_fallback(&self) -> bool {
        true
    }
}

/// One-shot readiness gate.
#[derive(Debug, Default)]
pub struct ReadinessGate {
    options: ReadinessOptions,
    settled: OnceCell<ReadinessStatus>,
}

impl ReadinessGate {
    /// Create an unsettled gate.
    pub fn new(options: ReadinessOptions) -> Self {
        Self {
            options,
            settled: OnceCell::new(),
        }
    }

    /// Create a gate that is already settled as ready.
    pub fn ready() -> Self {
        Self {
            options: ReadinessOptions::default(),
            settled: OnceCell::new_with(Some(ReadinessStatus::Ready)),
        }
    }

    /// Current status without waiting.
    pub fn status(&self) -> ReadinessStatus {
        self.settled
            .get()
            .copied()
            .unwrap_or(ReadinessStatus::Loading)
    }

    /// Check whether the gate settled as ready.
    pub fn is_ready(&self) -> bool {
        self.status() == ReadinessStatus::Ready
    }

    /// Settle the gate using `probe`, or return the settled status.
    ///
    /// Concurrent callers share a single poll, so the fallback runs at most
    /// once per gate.
    pub async fn wait<P: EngineProbe>(&self, probe: &P) -> ReadinessStatus {
        *self
            .settled
            .get_or_init(|| settle(probe, &self.options))
            .await
    }
}

async fn settle<P: EngineProbe>(probe: &P, options: &ReadinessOptions) -> ReadinessStatus {
    let polling = async {
        let mut ticker = tokio::time::interval(options.poll_interval);
        loop {
            ticker.tick().await;
            if probe.is_available() {
                return;
            }
        }
    };

    if tokio::time::timeout(options.timeout, polling).await.is_ok() {
        log::debug!("PDF engines available");
        return ReadinessStatus::Ready;
    }

    log::warn!(
        "PDF engines not available after {:?}, trying fallback",
        options.timeout
    );

    if probe.acquire_fallback().await && probe.is_available() {
        ReadinessStatus::Ready
    } else {
        ReadinessStatus::Unavailable
    }
}
