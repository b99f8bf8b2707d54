//! Build-phase to commit-status mapping.
//!
//! Only a handful of phase transitions are worth reporting; every other
//! `(phase, status)` pair maps to "no report" so intermediate phases produce
//! no visible status noise.

use crate::models::event::BuildPhaseEvent;
use crate::models::status::Outcome;

/// Phase transition table. Pairs absent here produce no report.
const PHASES: &[(&str, &str, Outcome, &str)] = &[
    ("SUBMITTED", "SUCCEEDED", Outcome::Pending, "Provisioning"),
    ("INSTALL", "FAILED", Outcome::Error, "Provisioning failed"),
    ("INSTALL", "SUCCEEDED", Outcome::Pending, "Build running"),
    ("BUILD", "FAILED", Outcome::Failure, "Build failed"),
    ("BUILD", "FAULT", Outcome::Error, "Build errored"),
    ("BUILD", "STOPPED", Outcome::Error, "Build stopped"),
    ("BUILD", "TIMED_OUT", Outcome::Error, "Build timed out"),
];

/// Map a completed phase to a normalized outcome, or `None` for no report.
///
/// A FINALIZING phase with no failed prior phase marks the whole build
/// successful, overriding the table.
pub fn map_phase(event: &BuildPhaseEvent) -> Option<(Outcome, &'static str)> {
    if event.completed_phase == "FINALIZING" && all_phases_succeeded(event) {
        return Some((Outcome::Success, "Build successful"));
    }

    PHASES
        .iter()
        .find(|(phase, status, _, _)| {
            *phase == event.completed_phase && *status == event.completed_phase_status
        })
        .map(|&(_, _, outcome, description)| (outcome, description))
}

/// A phase counts as settled when it is the COMPLETED marker or finished
/// with SUCCEEDED status.
fn all_phases_succeeded(event: &BuildPhaseEvent) -> bool {
    !event.additional_information.phases.iter().any(|prev| {
        prev.phase_type != "COMPLETED" && prev.phase_status.as_deref() != Some("SUCCEEDED")
    })
}

/// Map a pipeline execution state change to a normalized outcome.
pub fn map_execution_state(state: &str) -> Option<(Outcome, &'static str)> {
    match state {
        "STARTED" => Some((Outcome::Pending, "Pipeline started")),
        "RESUMED" => Some((Outcome::Pending, "Pipeline resumed")),
        "SUPERSEDED" => Some((Outcome::Pending, "Pipeline superseded")),
        "SUCCEEDED" => Some((Outcome::Success, "Pipeline succeeded")),
        "FAILED" => Some((Outcome::Failure, "Pipeline failed")),
        "CANCELED" => Some((Outcome::Error, "Pipeline canceled")),
        _ => None,
    }
}
