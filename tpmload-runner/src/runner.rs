//! Virtual-user execution -- task spawning, pacing, and shutdown.
//!
//! The runner owns the run envelope the original deployment delegated to
//! the load-testing harness: it spawns `vus` concurrent virtual users,
//! each looping the scenario iteration body, bounded by an iteration
//! count and/or a wall-clock duration, and wired to a shared
//! [`CancellationToken`] for graceful shutdown.
//!
//! # Shutdown semantics
//!
//! Cancellation (ctrl-c or duration expiry) lets the in-flight request
//! finish, skips the remaining endpoints of the current pass and the
//! think-time pause, and joins all users. Nothing is force-aborted.

use std::sync::Arc;
use std::time::Duration;

use metrics::gauge;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use tpmload_core::config::LoadConfig;
use tpmload_core::metrics::ACTIVE_VUS;
use tpmload_scenario::{Scenario, StatsSnapshot};

/// Execute the full load run and return the final statistics snapshot.
///
/// Returns when every virtual user has finished (iteration budget spent,
/// duration elapsed, or `cancel` fired). On return the token is cancelled
/// so auxiliary tasks tied to it wind down as well.
pub async fn run(
    scenario: Arc<Scenario>,
    load: &LoadConfig,
    cancel: CancellationToken,
) -> StatsSnapshot {
    info!(
        vus = load.vus,
        iterations = load.iterations,
        duration_secs = load.duration_secs,
        pause_secs = load.pause_secs,
        "starting load run"
    );

    // Duration cap: cancel the whole run when the wall clock expires.
    if load.duration_secs > 0 {
        let cancel = cancel.clone();
        let duration = Duration::from_secs(load.duration_secs);
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(duration) => {
                    info!("run duration elapsed, signalling shutdown");
                    cancel.cancel();
                }
                _ = cancel.cancelled() => {}
            }
        });
    }

    let mut users = Vec::with_capacity(load.vus as usize);
    for vu in 0..load.vus {
        let scenario = Arc::clone(&scenario);
        let cancel = cancel.clone();
        let iterations = load.iterations;
        let pause = Duration::from_secs(load.pause_secs);

        users.push(tokio::spawn(async move {
            gauge!(ACTIVE_VUS).increment(1.0);
            debug!(vu, "virtual user started");

            let mut completed: u64 = 0;
            loop {
                if cancel.is_cancelled() {
                    break;
                }

                scenario.run_iteration(&cancel).await;
                completed += 1;

                if iterations > 0 && completed >= iterations {
                    break;
                }

                // Think time between iterations; skipped on shutdown.
                if !pause.is_zero() {
                    tokio::select! {
                        _ = tokio::time::sleep(pause) => {}
                        _ = cancel.cancelled() => break,
                    }
                }
            }

            debug!(vu, completed, "virtual user finished");
            gauge!(ACTIVE_VUS).decrement(1.0);
        }));
    }

    for user in users {
        if let Err(e) = user.await {
            error!(error = %e, "virtual user task failed");
        }
    }

    // The run is over; release the duration watcher.
    cancel.cancel();

    let snapshot = scenario.snapshot();
    info!(
        iterations = snapshot.iterations,
        requests = snapshot.total_requests(),
        checks_passed = snapshot.total_passed(),
        checks_failed = snapshot.total_failed(),
        transport_errors = snapshot.total_transport_errors(),
        "load run complete"
    );
    snapshot
}
