//! Timer-driven ticking of a running simulation.
//!
//! The driver is bound to a single run: it stops on its own once that run
//! converges or is superseded, so a stale timer never touches the simulator
//! after the state machine has moved on. At most one driver ticks a run;
//! spawning another one takes over and the previous task exits.

use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::simulator::{RunId, RunSummary, SharedSimulator, TickOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverExit {
    Converged(RunSummary),
    /// The run was left (or replaced) through some other transition, or a
    /// newer driver took it over.
    Superseded,
    Cancelled,
}

pub struct RunDriver {
    run_id: RunId,
    shutdown_tx: broadcast::Sender<()>,
    handle: JoinHandle<DriverExit>,
}

impl RunDriver {
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the driver task to stop by itself.
    pub async fn join(self) -> DriverExit {
        self.handle.await.unwrap_or(DriverExit::Cancelled)
    }

    /// Stops ticking. No tick starts after this returns.
    pub async fn cancel(self) -> DriverExit {
        // Err only if the task already exited and dropped its receiver.
        let _ = self.shutdown_tx.send(());
        self.handle.await.unwrap_or(DriverExit::Cancelled)
    }
}

/// Starts a run if none is active and spawns a task ticking it every `period`.
pub async fn spawn_run(simulator: SharedSimulator, period: Duration) -> RunDriver {
    let (run_id, generation) = {
        let mut sim = simulator.lock().await;
        let run_id = sim.request_run();
        (run_id, sim.claim_driver())
    };
    let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);

    let handle = tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    debug!(run = run_id, "tick driver cancelled");
                    return DriverExit::Cancelled;
                }
                _ = ticker.tick() => {
                    let mut sim = simulator.lock().await;
                    if !sim.drives(run_id, generation) {
                        debug!(run = run_id, generation, "run no longer owned, stopping tick driver");
                        return DriverExit::Superseded;
                    }
                    if let Some(TickOutcome::Converged(summary)) = sim.advance() {
                        info!(run = run_id, rounds = summary.rounds, "tick driver finished");
                        return DriverExit::Converged(summary);
                    }
                }
            }
        }
    });

    RunDriver {
        run_id,
        shutdown_tx,
        handle,
    }
}
