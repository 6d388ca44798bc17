//! Synthetic bar generator.

use chrono::Utc;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{self, JoinHandle};
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use trading_core::types::Bar;

use crate::EventBus;

/// Maximum extra wick above/below the body, as a fraction of price.
const WICK_FRACTION: f64 = 0.01;

/// Generator configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Time between bars
    pub interval: Duration,
    /// Maximum relative close-to-open move per bar
    pub volatility: f64,
    /// Open of the first bar
    pub base_price: f64,
    /// Lower bound of the volume draw (inclusive)
    pub volume_min: f64,
    /// Upper bound of the volume draw (exclusive)
    pub volume_max: f64,
    /// Seed for reproducible series; entropy when `None`
    pub seed: Option<u64>,
    /// How long `stop` waits for the loop to exit
    pub stop_timeout: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            volatility: 0.02,
            base_price: 50000.0,
            volume_min: 1000.0,
            volume_max: 6000.0,
            seed: None,
            stop_timeout: Duration::from_secs(2),
        }
    }
}

/// Random-walk bar synthesis.
///
/// Each bar opens at the previous close and moves by a uniform draw in
/// `[-volatility, volatility)`. Wicks extend up to 1% beyond the body.
#[derive(Debug, Clone)]
pub struct RandomWalk {
    rng: ChaCha8Rng,
    price: f64,
    volatility: f64,
    volume_min: f64,
    volume_max: f64,
}

impl RandomWalk {
    /// Create a walk from the generator configuration.
    pub fn new(config: &GeneratorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            rng,
            price: config.base_price,
            volatility: config.volatility,
            volume_min: config.volume_min,
            volume_max: config.volume_max,
        }
    }

    /// Open price of the next bar.
    pub fn price(&self) -> f64 {
        self.price
    }

    /// Produce the next bar and advance the walk to its close.
    pub fn next_bar(&mut self, timestamp: i64) -> Bar {
        let change = (self.rng.gen::<f64>() - 0.5) * 2.0 * self.volatility;
        let open = self.price;
        let close = open * (1.0 + change);

        let high = open.max(close) * (1.0 + self.rng.gen::<f64>() * WICK_FRACTION);
        let low = open.min(close) * (1.0 - self.rng.gen::<f64>() * WICK_FRACTION);
        let volume = if self.volume_max > self.volume_min {
            self.rng.gen_range(self.volume_min..self.volume_max)
        } else {
            self.volume_min
        };

        self.price = close;
        Bar::new(timestamp, open, high, low, close, volume)
    }
}

/// Lifecycle state of a [`BarGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    Stopped,
    Running,
}

impl fmt::Display for GeneratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorState::Stopped => write!(f, "STOPPED"),
            GeneratorState::Running => write!(f, "RUNNING"),
        }
    }
}

struct RunningTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Publishes one synthetic bar per interval on a background task.
///
/// Each bar is generated and delivered on Tokio's blocking pool while the
/// loop waits, so slow subscribers never hold up the runtime's timers and
/// `stop` keeps its deadline. Every subscriber finishes with a bar before the
/// next one is generated. Shutdown is only observed between bars; a bar being
/// delivered is always delivered in full, even by a detached loop.
///
/// The walk is shared by every loop this generator starts, and its lock is
/// held through delivery: a restarted loop continues from the last close and
/// waits for a detached loop's in-flight bar before publishing its own.
pub struct BarGenerator {
    config: GeneratorConfig,
    bus: Arc<EventBus>,
    walk: Arc<Mutex<RandomWalk>>,
    task: Option<RunningTask>,
    bars_published: Arc<AtomicU64>,
}

impl BarGenerator {
    /// Create a stopped generator publishing to `bus`.
    pub fn new(config: GeneratorConfig, bus: Arc<EventBus>) -> Self {
        Self {
            walk: Arc::new(Mutex::new(RandomWalk::new(&config))),
            config,
            bus,
            task: None,
            bars_published: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> GeneratorState {
        match &self.task {
            Some(task) if !task.handle.is_finished() => GeneratorState::Running,
            _ => GeneratorState::Stopped,
        }
    }

    /// Total bars published since creation.
    pub fn bars_published(&self) -> u64 {
        self.bars_published.load(Ordering::Relaxed)
    }

    /// Start the loop. Returns `false` if it is already running.
    ///
    /// The first bar is published immediately. Must be called from within a
    /// Tokio runtime.
    pub fn start(&mut self) -> bool {
        if self.state() == GeneratorState::Running {
            debug!("Bar generator already running");
            return false;
        }

        let (shutdown, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run_loop(
            self.walk.clone(),
            self.config.interval,
            self.bus.clone(),
            self.bars_published.clone(),
            shutdown_rx,
        ));

        info!(interval_ms = self.config.interval.as_millis() as u64, "Bar generator started");
        self.task = Some(RunningTask { shutdown, handle });
        true
    }

    /// Signal the loop to exit and wait up to the configured timeout.
    ///
    /// The generator is `Stopped` afterwards whether or not the loop exited in
    /// time. Stopping a stopped generator does nothing.
    pub async fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            debug!("Bar generator already stopped");
            return;
        };

        // Fails only if the loop already exited
        let _ = task.shutdown.send(true);

        match timeout(self.config.stop_timeout, task.handle).await {
            Ok(Ok(())) => {
                info!(bars_published = self.bars_published(), "Bar generator stopped");
            }
            Ok(Err(e)) => {
                error!(error = %e, "Bar generator task failed");
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.config.stop_timeout.as_millis() as u64,
                    "Bar generator did not stop in time, detaching"
                );
            }
        }
    }
}

impl Drop for BarGenerator {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.shutdown.send(true);
        }
    }
}

async fn run_loop(
    walk: Arc<Mutex<RandomWalk>>,
    period: Duration,
    bus: Arc<EventBus>,
    bars_published: Arc<AtomicU64>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {}
        }

        let walk = walk.clone();
        let bus = bus.clone();
        let delivery = task::spawn_blocking(move || {
            let mut walk = walk.lock().unwrap_or_else(PoisonError::into_inner);
            let bar = walk.next_bar(Utc::now().timestamp_millis());
            let report = bus.publish(&bar);
            (bar, report)
        });

        match delivery.await {
            Ok((bar, report)) => {
                bars_published.fetch_add(1, Ordering::Relaxed);
                debug!(
                    timestamp = bar.timestamp,
                    close = bar.close,
                    delivered = report.delivered,
                    failed = report.failures.len(),
                    "Bar published"
                );
            }
            Err(e) => {
                error!(error = %e, "Bar delivery failed");
                break;
            }
        }
    }
}
