/// Ring-buffered console log.
///
/// The engine appends one line per non-terminal tick, plus failure banners
/// and progression notices. Oldest lines drop once the cap is reached; the
/// log collaborator only ever renders the tail anyway.

use std::collections::VecDeque;

#[derive(Clone, Debug)]
pub struct TraceLog {
    lines: VecDeque<String>,
    cap: usize,
    total: u64,
}

impl TraceLog {
    pub fn new(cap: usize) -> Self {
        TraceLog {
            lines: VecDeque::with_capacity(cap.min(128)),
            cap: cap.max(1),
            total: 0,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() == self.cap {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
        self.total += 1;
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines still retained, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Count of lines ever pushed, including dropped ones.
    /// Lets a polling host print only what it hasn't seen.
    pub fn total_pushed(&self) -> u64 {
        self.total
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let mut log = TraceLog::new(10);
        log.push("a");
        log.push("b");
        let lines: Vec<&str> = log.iter().collect();
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn drops_oldest_at_cap() {
        let mut log = TraceLog::new(3);
        for line in ["1", "2", "3", "4", "5"] {
            log.push(line);
        }
        let lines: Vec<&str> = log.iter().collect();
        assert_eq!(lines, vec!["3", "4", "5"]);
        assert_eq!(log.len(), 3);
        assert_eq!(log.total_pushed(), 5);
    }

    #[test]
    fn zero_cap_still_holds_one_line() {
        let mut log = TraceLog::new(0);
        log.push("only");
        assert_eq!(log.last(), Some("only"));
    }
}
