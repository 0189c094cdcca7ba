/// Headless engine for a scripted packet-delivery puzzle.
///
/// A payload written in a three-instruction language (MOV, WAIT, GOTO)
/// pilots a packet `[S]` across a grid of firewalls toward an exit node
/// `[E]`, while a warden `[W]` walks a fixed patrol one step per cycle.
/// The engine steps the simulation, keeps the execution trace, times the
/// run and ranks finished runs on a bounded leaderboard.
///
/// No rendering lives here. A front end supplies payload text, calls
/// `RunController::advance` every frame and draws whatever state it reads
/// back.

pub mod config;
pub mod domain;
pub mod sim;

pub use config::EngineConfig;
pub use domain::command::{parse_line, Command, Direction};
pub use sim::engine::{Engine, Failure, FailureKind, Status};
pub use sim::event::SimEvent;
pub use sim::leaderboard::{Leaderboard, LeaderboardEntry};
pub use sim::level::{embedded_arrays, parse_pack, scan_arrays, Level, LevelError};
pub use sim::run::{FinalSummary, RunController, RunTotals};
pub use sim::trace::TraceLog;
