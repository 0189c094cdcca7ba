/// The run-time script snapshot.
///
/// Taken from the editor's buffer the moment a run starts, so later edits
/// never affect an in-flight simulation. Line numbers are synthesized from
/// position (line at index i is number (i+1)*10), and the GOTO index is
/// built once here, not recomputed every tick. A GOTO to a number with no
/// line is legal to *write*; resolving it fails at run time.

use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct Script {
    lines: Vec<String>,
    index: HashMap<u32, usize>,
}

impl Script {
    /// Snapshot the editor buffer and build the line-number index.
    pub fn snapshot(lines: &[String]) -> Self {
        let lines: Vec<String> = lines.to_vec();
        let index = lines
            .iter()
            .enumerate()
            .map(|(i, _)| (Self::line_number(i), i))
            .collect();
        Script { lines, index }
    }

    pub fn empty() -> Self {
        Script { lines: Vec::new(), index: HashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Synthesized number of the line at `pc`: 10, 20, 30...
    pub fn line_number(pc: usize) -> u32 {
        (pc as u32 + 1) * 10
    }

    pub fn line(&self, pc: usize) -> Option<&str> {
        self.lines.get(pc).map(String::as_str)
    }

    /// Buffer position of the line numbered `target`, if it exists.
    pub fn resolve_goto(&self, target: u32) -> Option<usize> {
        self.index.get(&target).copied()
    }

    /// Count of lines that are neither blank nor comment-only.
    /// This is what a cleared array charges to the run's instruction total.
    pub fn instruction_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|line| {
                let content = match line.find("//") {
                    Some(idx) => &line[..idx],
                    None => line.as_str(),
                };
                !content.trim().is_empty()
            })
            .count()
    }
}
