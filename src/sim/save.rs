/// Persist the leaderboard between sessions.
///
/// ## File format:
///   Key-value lines in scores.dat. One `entry=` line per row:
///
/// ```text
/// entry=identity,elapsed_seconds,total_cycles,total_instructions,tcs
/// ```
///
/// Identities may not contain commas. Malformed lines are skipped with a
/// warning rather than discarding the whole file.

use std::path::PathBuf;

use tracing::warn;

use crate::sim::leaderboard::{Leaderboard, LeaderboardEntry};

const SCORES_FILE: &str = "scores.dat";

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

fn save_dir() -> PathBuf {
    // 1. Try exe directory (works for local/portable installs)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            // Check if writable (system installs like /usr/games/ won't be)
            let test_path = parent.join(".write_test_simulacra");
            if std::fs::write(&test_path, "").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home (~/.local/share/simulacra-core) for system installs
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/simulacra-core");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. Fallback to CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn scores_path() -> PathBuf {
    save_dir().join(SCORES_FILE)
}

// ══════════════════════════════════════════════════════════════
// Public operations
// ══════════════════════════════════════════════════════════════

pub fn save_scores(board: &Leaderboard) -> Result<(), String> {
    let content = serialize(board);
    let path = scores_path();
    std::fs::write(&path, content)
        .map_err(|e| format!("Saving scores failed: {}", e))
}

/// Loads the stored table, or None when no file exists yet. The caller falls
/// back to the seeded defaults in that case.
pub fn load_scores(cap: usize) -> Option<Leaderboard> {
    let candidates = [scores_path(), PathBuf::from(SCORES_FILE)];
    for path in &candidates {
        if let Ok(content) = std::fs::read_to_string(path) {
            return Some(parse_scores(&content, cap));
        }
    }
    None
}

pub fn delete_scores() {
    let _ = std::fs::remove_file(scores_path());
    let _ = std::fs::remove_file(SCORES_FILE);
}

// ══════════════════════════════════════════════════════════════
// Serialization
// ══════════════════════════════════════════════════════════════

fn serialize(board: &Leaderboard) -> String {
    let mut out = String::with_capacity(256);
    for e in board.entries() {
        out.push_str(&format!(
            "entry={},{},{},{},{}\n",
            e.identity, e.elapsed_seconds, e.total_cycles, e.total_instructions, e.tcs
        ));
    }
    out
}

fn parse_scores(content: &str, cap: usize) -> Leaderboard {
    let mut board = Leaderboard::new(cap);
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.strip_prefix("entry=").and_then(parse_entry) {
            Some(entry) => {
                board.record(entry);
            }
            None => warn!(line, "skipping malformed score line"),
        }
    }
    board
}

fn parse_entry(val: &str) -> Option<LeaderboardEntry> {
    let p: Vec<&str> = val.split(',').collect();
    if p.len() < 5 {
        return None;
    }
    Some(LeaderboardEntry {
        identity: p[0].trim().to_string(),
        elapsed_seconds: p[1].trim().parse().ok()?,
        total_cycles: p[2].trim().parse().ok()?,
        total_instructions: p[3].trim().parse().ok()?,
        tcs: p[4].trim().parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_the_text_format() {
        let mut board = Leaderboard::new(10);
        board.record(LeaderboardEntry {
            identity: "rain".to_string(),
            elapsed_seconds: 99.8,
            total_cycles: 22,
            total_instructions: 22,
            tcs: 121.8,
        });
        let text = serialize(&board);
        assert_eq!(text, "entry=rain,99.8,22,22,121.8\n");

        let loaded = parse_scores(&text, 10);
        assert_eq!(loaded.entries(), board.entries());
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let text = "entry=good,10,5,5,15\nentry=short,1\ngarbage\nentry=bad,x,y,z,w\n";
        let board = parse_scores(text, 10);
        assert_eq!(board.len(), 1);
        assert_eq!(board.best_for("good"), Some(15.0));
    }

    #[test]
    fn loaded_entries_respect_the_cap() {
        let mut text = String::new();
        for i in 0..8 {
            text.push_str(&format!("entry=p{i},{0},1,1,{0}\n", 100 + i));
        }
        let board = parse_scores(&text, 4);
        assert_eq!(board.len(), 4);
    }
}
