//! End-of-run summary report.
//!
//! Renders the final [`StatsSnapshot`] either as a human-readable table
//! (one row per enabled endpoint) or as machine-readable JSON. Check
//! failures appear here and in the per-request log lines only; they never
//! change the process exit code.

use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

use tpmload_scenario::{EndpointStats, StatsSnapshot};

use crate::cli::OutputFormat;

/// Serializable run report for `--output json`.
#[derive(Debug, Serialize)]
struct RunReport<'a> {
    run_id: &'a str,
    elapsed_secs: f64,
    iterations: u64,
    total_requests: u64,
    checks_passed: u64,
    checks_failed: u64,
    transport_errors: u64,
    endpoints: &'a [EndpointStats],
}

/// Print the end-of-run summary in the requested format.
pub fn print_summary(
    run_id: &str,
    snapshot: &StatsSnapshot,
    elapsed: Duration,
    output: OutputFormat,
) -> Result<()> {
    match output {
        OutputFormat::Text => {
            print_text(run_id, snapshot, elapsed);
            Ok(())
        }
        OutputFormat::Json => print_json(run_id, snapshot, elapsed),
    }
}

fn print_text(run_id: &str, snapshot: &StatsSnapshot, elapsed: Duration) {
    println!(
        "run {} finished in {:.1}s — {} iterations",
        run_id,
        elapsed.as_secs_f64(),
        snapshot.iterations
    );
    println!(
        "{:<36} {:>9} {:>9} {:>9} {:>10}",
        "Endpoint", "Requests", "Passed", "Failed", "Transport"
    );
    println!("{}", "-".repeat(76));

    for endpoint in snapshot.endpoints.iter().filter(|e| e.enabled) {
        println!(
            "{:<36} {:>9} {:>9} {:>9} {:>10}",
            endpoint.label,
            endpoint.requests,
            endpoint.checks_passed,
            endpoint.checks_failed,
            endpoint.transport_errors
        );
    }

    println!("{}", "-".repeat(76));
    println!(
        "{:<36} {:>9} {:>9} {:>9} {:>10}",
        "Total",
        snapshot.total_requests(),
        snapshot.total_passed(),
        snapshot.total_failed(),
        snapshot.total_transport_errors()
    );

    let disabled = snapshot.endpoints.iter().filter(|e| !e.enabled).count();
    if disabled > 0 {
        println!("({disabled} disabled endpoints not exercised)");
    }
}

fn print_json(run_id: &str, snapshot: &StatsSnapshot, elapsed: Duration) -> Result<()> {
    let report = RunReport {
        run_id,
        elapsed_secs: elapsed.as_secs_f64(),
        iterations: snapshot.iterations,
        total_requests: snapshot.total_requests(),
        checks_passed: snapshot.total_passed(),
        checks_failed: snapshot.total_failed(),
        transport_errors: snapshot.total_transport_errors(),
        endpoints: &snapshot.endpoints,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
