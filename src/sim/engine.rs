/// The simulation engine (VM) state.
///
/// One `Engine` value owns every mutable field of an attempt: program
/// counter, cycle count, packet and warden positions, patrol index, and
/// status. It is constructed per array and handed by reference to the
/// rendering collaborator; nothing here is global.
///
/// Status is one-directional per attempt:
///   Editing → Running → {Failed, Succeeded}
/// and leaves a terminal state only through `reset` (or, at the controller
/// level, an array advance). Failures are *state*, never `Err`s crossing
/// the engine boundary.

use crate::domain::cell::Pos;
use crate::domain::script::Script;
use crate::sim::level::Level;

/// Spec-level failure taxonomy: text that never parsed, or a legal
/// instruction with an illegal effect.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FailureKind {
    Parse,
    Runtime,
}

/// A terminal failure: short machine title for the status line, plus a
/// human-readable detail for the console log.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Failure {
    pub kind: FailureKind,
    pub title: &'static str,
    pub detail: String,
}

impl Failure {
    pub fn syntax(detail: impl Into<String>) -> Self {
        Failure { kind: FailureKind::Parse, title: "SYNTAX ERROR", detail: detail.into() }
    }

    pub fn runtime(detail: impl Into<String>) -> Self {
        Failure { kind: FailureKind::Runtime, title: "RUNTIME ERROR", detail: detail.into() }
    }

    pub fn collision(detail: impl Into<String>) -> Self {
        Failure { kind: FailureKind::Runtime, title: "PACKET COLLISION", detail: detail.into() }
    }

    pub fn finished(detail: impl Into<String>) -> Self {
        Failure { kind: FailureKind::Runtime, title: "EXECUTION FINISHED", detail: detail.into() }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum Status {
    Editing,
    Running,
    Failed(Failure),
    Succeeded,
}

pub struct Engine {
    pub level: Level,
    /// Snapshot taken at run start; editor churn never reaches it.
    pub script: Script,
    pub pc: usize,
    pub cycle: u64,
    pub player: Pos,
    pub warden: Pos,
    pub patrol_index: usize,
    pub status: Status,
}

impl Engine {
    pub fn new(level: Level) -> Self {
        let start = level.start;
        let warden = level.warden_path.first().copied().unwrap_or(Pos::new(0, 0));
        Engine {
            level,
            script: Script::empty(),
            pc: 0,
            cycle: 0,
            player: start,
            warden,
            patrol_index: 0,
            status: Status::Editing,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == Status::Running
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, Status::Failed(_) | Status::Succeeded)
    }

    /// Begin a run from the given editor buffer.
    ///
    /// Only legal while Editing; any other status rejects the request with
    /// no state change; a finished attempt must be reset first.
    pub fn start(&mut self, lines: &[String]) -> bool {
        if self.status != Status::Editing {
            return false;
        }
        self.script = Script::snapshot(lines);
        self.pc = 0;
        self.cycle = 0;
        self.player = self.level.start;
        self.patrol_index = 0;
        self.warden = self.level.warden_path.first().copied().unwrap_or(Pos::new(0, 0));
        self.status = Status::Running;
        true
    }

    /// Restore the array start and return to Editing.
    /// The script snapshot is kept for display until the next `start`.
    pub fn reset(&mut self) {
        self.pc = 0;
        self.cycle = 0;
        self.player = self.level.start;
        self.patrol_index = 0;
        self.warden = self.level.warden_path.first().copied().unwrap_or(Pos::new(0, 0));
        self.status = Status::Editing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::embedded_arrays;

    fn lines(script: &[&str]) -> Vec<String> {
        script.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn new_engine_is_editing_at_level_start() {
        let level = embedded_arrays().remove(0);
        let e = Engine::new(level);
        assert_eq!(e.status, Status::Editing);
        assert_eq!(e.player, e.level.start);
        assert_eq!(e.warden, e.level.warden_path[0]);
        assert_eq!(e.cycle, 0);
    }

    #[test]
    fn start_snapshots_and_runs() {
        let level = embedded_arrays().remove(0);
        let mut e = Engine::new(level);
        assert!(e.start(&lines(&["MOV RIGHT"])));
        assert_eq!(e.status, Status::Running);
        assert_eq!(e.script.len(), 1);
    }

    #[test]
    fn start_rejected_while_running() {
        let level = embedded_arrays().remove(0);
        let mut e = Engine::new(level);
        assert!(e.start(&lines(&["WAIT"])));
        assert!(!e.start(&lines(&["MOV RIGHT"])));
        assert_eq!(e.script.len(), 1);
    }

    #[test]
    fn reset_returns_to_editing() {
        let level = embedded_arrays().remove(0);
        let mut e = Engine::new(level);
        e.start(&lines(&["WAIT"]));
        e.status = Status::Succeeded;
        e.reset();
        assert_eq!(e.status, Status::Editing);
        assert_eq!(e.player, e.level.start);
        assert_eq!(e.pc, 0);
    }
}
