/// Orchestrates a full run across every loaded array.
///
/// One `RunController` owns the engine, the shared trace, the wall-clock
/// timer and the totals that feed the TCS. Cycles and instructions commit
/// to the totals only when an array is cleared, so a failed attempt costs
/// wall-clock time and nothing else.
///
/// TCS (Total Composite Score) = elapsed wall-clock seconds + total cycles
/// across all cleared arrays. Lower is better.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::EngineConfig;
use crate::sim::clock::TickClock;
use crate::sim::engine::{Engine, Status};
use crate::sim::event::SimEvent;
use crate::sim::leaderboard::{Leaderboard, LeaderboardEntry};
use crate::sim::level::{Level, LevelError};
use crate::sim::step::tick;
use crate::sim::trace::TraceLog;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub cycles: u64,
    pub instructions: u64,
}

/// Emitted once, when the last array is cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalSummary {
    pub elapsed_seconds: f64,
    pub total_cycles: u64,
    pub total_instructions: u64,
    pub tcs: f64,
    pub prior_best_tcs: Option<f64>,
}

pub struct RunController {
    levels: Vec<Level>,
    level_idx: usize,
    engine: Engine,
    trace: TraceLog,
    clock: TickClock,
    totals: RunTotals,
    leaderboard: Leaderboard,
    identity: String,
    timer_start: Option<Instant>,
    summary: Option<FinalSummary>,
    config: EngineConfig,
}

impl RunController {
    pub fn new(
        levels: Vec<Level>,
        identity: impl Into<String>,
        config: EngineConfig,
    ) -> Result<Self, LevelError> {
        let first = levels.first().cloned().ok_or(LevelError::NoArrays)?;
        let mut trace = TraceLog::new(config.trace_cap);
        for line in &first.readme {
            trace.push(line.clone());
        }
        Ok(RunController {
            levels,
            level_idx: 0,
            engine: Engine::new(first),
            trace,
            clock: TickClock::new(config.tick_interval),
            totals: RunTotals::default(),
            leaderboard: Leaderboard::seeded(config.leaderboard_cap),
            identity: identity.into(),
            timer_start: None,
            summary: None,
            config,
        })
    }

    /// Swap in a table loaded from disk in place of the seeded defaults.
    pub fn replace_leaderboard(&mut self, board: Leaderboard) {
        self.leaderboard = board;
    }

    /// The run timer starts at the first edit, not the first execution.
    pub fn note_edit(&mut self, now: Instant) {
        if self.summary.is_none() {
            self.timer_start.get_or_insert(now);
        }
    }

    /// Snapshots the payload and launches the current array. Rejected while
    /// an attempt is still running or after it has ended, so a failed run
    /// must be reset explicitly first.
    pub fn request_run(&mut self, lines: &[String], now: Instant) -> bool {
        if !self.engine.start(lines) {
            return false;
        }
        self.timer_start.get_or_insert(now);
        self.clock.arm(now);
        self.trace
            .push(format!(">> EXECUTING PAYLOAD ON {}.", self.engine.level.name));
        true
    }

    /// Clears a failed (or running) attempt back to the editor. The payload,
    /// the timer and the committed totals survive.
    pub fn reset_attempt(&mut self) {
        self.engine.reset();
        self.clock.disarm();
    }

    /// Back to array one with totals, timer and trace zeroed. The
    /// leaderboard is not run state and survives.
    pub fn reset_run(&mut self) {
        self.level_idx = 0;
        self.engine = Engine::new(self.levels[0].clone());
        self.trace = TraceLog::new(self.config.trace_cap);
        for line in &self.levels[0].readme {
            self.trace.push(line.clone());
        }
        self.clock.disarm();
        self.totals = RunTotals::default();
        self.timer_start = None;
        self.summary = None;
    }

    /// Drives the simulation forward if the tick window has opened. Call
    /// every frame; at most one cycle executes per call.
    pub fn advance(&mut self, now: Instant) -> Vec<SimEvent> {
        if !self.engine.is_running() || !self.clock.should_tick(now) {
            return vec![];
        }

        let mut events = tick(&mut self.engine, &mut self.trace);

        if matches!(self.engine.status, Status::Failed(_)) {
            self.clock.disarm();
        }

        let cleared = events.iter().find_map(|ev| match ev {
            SimEvent::ArrayCleared { cycles, instructions } => Some((*cycles, *instructions)),
            _ => None,
        });
        if let Some((cycles, instructions)) = cleared {
            self.totals.cycles += cycles;
            self.totals.instructions += instructions;
            self.clock.disarm();

            if self.level_idx + 1 < self.levels.len() {
                self.level_idx += 1;
                let next = self.levels[self.level_idx].clone();
                self.trace.push("".to_string());
                self.trace.push(format!(">> ARRAY CLEARED. LINKING {}.", next.name));
                for line in &next.readme {
                    self.trace.push(line.clone());
                }
                events.push(SimEvent::ArrayAdvanced {
                    index: self.level_idx,
                    name: next.name.clone(),
                });
                self.engine = Engine::new(next);
            } else {
                events.push(SimEvent::RunComplete(self.finalize(now)));
            }
        }

        events
    }

    fn finalize(&mut self, now: Instant) -> FinalSummary {
        let elapsed = self.elapsed_seconds(now);
        let tcs = elapsed + self.totals.cycles as f64;
        let prior_best = self.leaderboard.best_for(&self.identity);
        self.leaderboard.record(LeaderboardEntry {
            identity: self.identity.clone(),
            elapsed_seconds: elapsed,
            total_cycles: self.totals.cycles,
            total_instructions: self.totals.instructions,
            tcs,
        });
        info!(identity = %self.identity, tcs, "run complete");
        let summary = FinalSummary {
            elapsed_seconds: elapsed,
            total_cycles: self.totals.cycles,
            total_instructions: self.totals.instructions,
            tcs,
            prior_best_tcs: prior_best,
        };
        self.summary = Some(summary.clone());
        summary
    }

    pub fn elapsed_seconds(&self, now: Instant) -> f64 {
        if let Some(summary) = &self.summary {
            return summary.elapsed_seconds;
        }
        match self.timer_start {
            Some(start) => now.saturating_duration_since(start).as_secs_f64(),
            None => 0.0,
        }
    }

    /// Projected score if the run ended right now, counting cycles spent on
    /// the attempt in flight. A failed attempt's cycles are not counted;
    /// only wall-clock time keeps accruing until the reset.
    pub fn current_tcs(&self, now: Instant) -> f64 {
        if let Some(summary) = &self.summary {
            return summary.tcs;
        }
        let live = if self.engine.is_running() { self.engine.cycle } else { 0 };
        self.elapsed_seconds(now) + (self.totals.cycles + live) as f64
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn trace(&self) -> &TraceLog {
        &self.trace
    }

    pub fn level(&self) -> &Level {
        &self.engine.level
    }

    pub fn level_index(&self) -> usize {
        self.level_idx
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn totals(&self) -> RunTotals {
        self.totals
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn summary(&self) -> Option<&FinalSummary> {
        self.summary.as_ref()
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }
}

/// mm:ss.t rendering for the run timer.
pub fn format_time(seconds: f64) -> String {
    let minutes = (seconds / 60.0).floor() as u64;
    let rest = seconds - minutes as f64 * 60.0;
    format!("{:02}:{:04.1}", minutes, rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use crate::sim::engine::FailureKind;
    use crate::sim::level::embedded_arrays;

    fn instant_config() -> EngineConfig {
        EngineConfig {
            tick_interval: Duration::ZERO,
            ..EngineConfig::default()
        }
    }

    fn controller() -> RunController {
        RunController::new(embedded_arrays(), "tester", instant_config()).unwrap()
    }

    fn lines(script: &[&str]) -> Vec<String> {
        script.iter().map(|s| s.to_string()).collect()
    }

    // Hand-checked clears for the three stock arrays.
    const SOLUTION_1: &[&str] = &[
        "MOV RIGHT", "MOV RIGHT", "WAIT", "MOV DOWN", "MOV DOWN", "MOV RIGHT",
    ];
    const SOLUTION_2: &[&str] = &[
        "MOV DOWN", "MOV DOWN", "MOV RIGHT", "MOV RIGHT", "MOV RIGHT",
        "MOV DOWN", "MOV RIGHT",
    ];
    const SOLUTION_3: &[&str] = &[
        "MOV RIGHT", "MOV DOWN", "MOV DOWN", "MOV RIGHT", "MOV RIGHT",
        "WAIT", "MOV RIGHT", "MOV RIGHT", "MOV DOWN",
    ];

    fn drive_to_events(c: &mut RunController, now: Instant) -> Vec<SimEvent> {
        let mut all = vec![];
        for _ in 0..200 {
            let events = c.advance(now);
            let done = !c.engine().is_running();
            all.extend(events);
            if done {
                break;
            }
        }
        all
    }

    #[test]
    fn empty_array_list_is_rejected() {
        assert!(matches!(
            RunController::new(vec![], "tester", instant_config()),
            Err(LevelError::NoArrays)
        ));
    }

    #[test]
    fn full_run_clears_all_three_arrays_and_scores() {
        let mut c = controller();
        let start = Instant::now();

        assert!(c.request_run(&lines(SOLUTION_1), start));
        let events = drive_to_events(&mut c, start);
        assert!(events
            .iter()
            .any(|e| matches!(e, SimEvent::ArrayAdvanced { index: 1, .. })));
        assert_eq!(c.totals(), RunTotals { cycles: 6, instructions: 6 });

        assert!(c.request_run(&lines(SOLUTION_2), start));
        drive_to_events(&mut c, start);
        assert_eq!(c.level_index(), 2);
        assert_eq!(c.totals(), RunTotals { cycles: 13, instructions: 13 });

        let end = start + Duration::from_secs(90);
        assert!(c.request_run(&lines(SOLUTION_3), end));
        let events = drive_to_events(&mut c, end);
        assert_eq!(c.totals(), RunTotals { cycles: 22, instructions: 22 });

        let summary = match events.iter().find_map(|e| match e {
            SimEvent::RunComplete(s) => Some(s.clone()),
            _ => None,
        }) {
            Some(s) => s,
            None => panic!("no RunComplete event"),
        };
        assert!(summary.elapsed_seconds >= 90.0);
        assert_eq!(summary.total_cycles, 22);
        assert_eq!(summary.tcs, summary.elapsed_seconds + 22.0);
        assert_eq!(summary.prior_best_tcs, None);
        assert_eq!(c.leaderboard().best_for("tester"), Some(summary.tcs));
    }

    #[test]
    fn failed_attempt_commits_nothing() {
        let mut c = controller();
        let now = Instant::now();
        assert!(c.request_run(&lines(&["MOV LEFT"]), now));
        drive_to_events(&mut c, now);

        match &c.engine().status {
            Status::Failed(f) => assert_eq!(f.kind, FailureKind::Runtime),
            other => panic!("expected Failed, got {other:?}"),
        }
        assert_eq!(c.totals(), RunTotals::default());
        assert_eq!(c.level_index(), 0);
    }

    #[test]
    fn run_is_rejected_while_failed_until_reset() {
        let mut c = controller();
        let now = Instant::now();
        c.request_run(&lines(&["MOV LEFT"]), now);
        drive_to_events(&mut c, now);

        assert!(!c.request_run(&lines(SOLUTION_1), now));
        c.reset_attempt();
        assert!(c.request_run(&lines(SOLUTION_1), now));
    }

    #[test]
    fn reset_attempt_keeps_totals_and_timer() {
        let mut c = controller();
        let start = Instant::now();
        c.request_run(&lines(SOLUTION_1), start);
        drive_to_events(&mut c, start);
        c.request_run(&lines(&["MOV LEFT"]), start);
        drive_to_events(&mut c, start);

        c.reset_attempt();
        assert_eq!(c.totals(), RunTotals { cycles: 6, instructions: 6 });
        let later = start + Duration::from_secs(10);
        assert!(c.elapsed_seconds(later) >= 10.0);
    }

    #[test]
    fn reset_run_zeroes_everything() {
        let mut c = controller();
        let start = Instant::now();
        c.request_run(&lines(SOLUTION_1), start);
        drive_to_events(&mut c, start);

        c.reset_run();
        assert_eq!(c.level_index(), 0);
        assert_eq!(c.totals(), RunTotals::default());
        assert_eq!(c.elapsed_seconds(start + Duration::from_secs(5)), 0.0);
        assert!(c.summary().is_none());
    }

    #[test]
    fn timer_starts_at_first_edit() {
        let mut c = controller();
        let t0 = Instant::now();
        c.note_edit(t0);
        c.note_edit(t0 + Duration::from_secs(30)); // does not restart
        let t1 = t0 + Duration::from_secs(60);
        assert!((c.elapsed_seconds(t1) - 60.0).abs() < 0.5);
    }

    #[test]
    fn current_tcs_drops_a_dead_attempts_cycles() {
        let mut c = controller();
        let now = Instant::now();
        c.request_run(&lines(&["MOV LEFT"]), now);
        drive_to_events(&mut c, now);
        assert!(matches!(c.engine().status, Status::Failed(_)));

        // The failed tick cost wall-clock time only.
        assert_eq!(c.current_tcs(now), c.elapsed_seconds(now));
        c.reset_attempt();
        assert_eq!(c.current_tcs(now), c.elapsed_seconds(now));
    }

    #[test]
    fn current_tcs_counts_the_attempt_in_flight() {
        let mut c = controller();
        let now = Instant::now();
        c.request_run(&lines(&["WAIT", "WAIT", "WAIT", "WAIT"]), now);
        c.advance(now);
        c.advance(now);
        let tcs = c.current_tcs(now);
        assert!(tcs >= 2.0, "two live cycles count, got {tcs}");
    }

    #[test]
    fn formats_the_run_timer() {
        assert_eq!(format_time(0.0), "00:00.0");
        assert_eq!(format_time(75.35), "01:15.3");
        assert_eq!(format_time(600.0), "10:00.0");
    }
}
