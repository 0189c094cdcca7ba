/// Bounded best-times table, ranked by ascending TCS.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CAP: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub identity: String,
    pub elapsed_seconds: f64,
    pub total_cycles: u64,
    pub total_instructions: u64,
    pub tcs: f64,
}

#[derive(Debug, Clone)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
    cap: usize,
}

impl Leaderboard {
    pub fn new(cap: usize) -> Self {
        Leaderboard { entries: Vec::new(), cap: cap.max(1) }
    }

    /// The table as shipped, already populated with house times.
    pub fn seeded(cap: usize) -> Self {
        let mut board = Leaderboard::new(cap);
        for (identity, elapsed_seconds, total_cycles, total_instructions, tcs) in [
            ("glyphis", 64.2, 45, 24, 109.2),
            ("rain", 72.8, 49, 26, 121.8),
            ("jaxkando", 85.5, 55, 29, 140.5),
            ("uncle-am", 99.0, 64, 32, 163.0),
        ] {
            board.entries.push(LeaderboardEntry {
                identity: identity.to_string(),
                elapsed_seconds,
                total_cycles,
                total_instructions,
                tcs,
            });
        }
        board.entries.truncate(board.cap);
        board
    }

    /// Records a finished run. An identity holds at most one row; a new
    /// result replaces it only when the TCS improves. Returns whether the
    /// table changed.
    pub fn record(&mut self, entry: LeaderboardEntry) -> bool {
        match self.entries.iter_mut().find(|e| e.identity == entry.identity) {
            Some(existing) => {
                if entry.tcs >= existing.tcs {
                    return false;
                }
                *existing = entry;
            }
            None => self.entries.push(entry),
        }
        // Stable sort keeps earlier arrivals ahead on exact ties.
        self.entries.sort_by(|a, b| a.tcs.total_cmp(&b.tcs));
        self.entries.truncate(self.cap);
        true
    }

    pub fn best_for(&self, identity: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.identity == identity)
            .map(|e| e.tcs)
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Leaderboard {
    fn default() -> Self {
        Leaderboard::seeded(DEFAULT_CAP)
    }
}
