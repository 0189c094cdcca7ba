/// Events emitted while advancing the simulation.
/// The host consumes these for display/sound; the run controller reacts to
/// the terminal ones for scoring and progression.

use crate::domain::command::Command;
use crate::sim::run::FinalSummary;

#[derive(Clone, Debug, PartialEq)]
pub enum SimEvent {
    /// One instruction executed on a tick that is (so far) non-terminal.
    CommandExecuted { cycle: u64, line_number: u32, command: Command },
    /// The attempt ended in a terminal failure.
    ArrayFailed { title: &'static str, detail: String },
    /// The packet reached the exit; per-array cost attached.
    ArrayCleared { cycles: u64, instructions: u64 },
    /// The controller loaded the next array after a clear.
    ArrayAdvanced { index: usize, name: String },
    /// Final array breached: the whole run is scored.
    RunComplete(FinalSummary),
}
