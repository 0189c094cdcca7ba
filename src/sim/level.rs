/// Array (level) definitions: embedded defaults + pack loading.
///
/// ## Sources (priority order):
///   1. `.sim` pack files in the configured arrays directory
///   2. Built-in embedded arrays
///
/// ## Pack format (`.sim`):
///   ```text
///   # TEST_ARRAY_01
///   ! OPERATIVE:
///   ! Guide the packet [S] to [E].
///   > 1,1 2,1
///   S...
///   #..#
///   ...E
///   ---
///   // PAYLOAD.SIM - ARRAY 01
///   MOV RIGHT
///   ===
///   # TEST_ARRAY_02
///   ...
///   ```
///
/// Arrays are separated by a line containing only `===`. Within an array:
/// `# ` starts the name (only before the first grid row; after that a
/// `# `-prefixed line is a grid row), `! ` lines are README text, the `>`
/// line is the warden patrol (ordered `x,y` pairs, cyclic), grid rows
/// follow, and everything after `---` is the initial payload, verbatim.
///
/// ## Grid legend:
///   '.' / ' ' = empty     '#' = firewall
///   'S' = packet start    'E' = exit
///
/// Ragged grid rows are padded to the widest row.

use std::path::Path;

use thiserror::Error;
use tracing::warn;

use crate::domain::cell::{Cell, Grid, Pos};

/// One array: immutable once loaded.
#[derive(Clone, Debug)]
pub struct Level {
    pub name: String,
    pub readme: Vec<String>,
    pub grid: Grid,
    pub start: Pos,
    pub end: Pos,
    pub warden_path: Vec<Pos>,
    pub initial_script: Vec<String>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LevelError {
    #[error("array '{0}' has no grid rows")]
    EmptyGrid(String),
    #[error("array '{0}' has no packet start ('S') cell")]
    MissingStart(String),
    #[error("array '{0}' has no exit ('E') cell")]
    MissingExit(String),
    #[error("array '{0}' has an empty warden patrol")]
    EmptyPatrol(String),
    #[error("array '{0}' patrol step ({1}, {2}) is outside the grid")]
    PatrolOutOfBounds(String, i32, i32),
    #[error("malformed patrol entry '{0}' (expected x,y)")]
    BadPatrolEntry(String),
    #[error("no arrays available")]
    NoArrays,
}

// ══════════════════════════════════════════════════════════════
// Construction & validation
// ══════════════════════════════════════════════════════════════

/// Build a validated array from grid row text plus metadata.
/// Shared by the pack parser and the embedded definitions.
fn build_level(
    name: &str,
    readme: &[&str],
    rows: &[String],
    patrol: &[(i32, i32)],
    payload: &[String],
) -> Result<Level, LevelError> {
    if rows.is_empty() {
        return Err(LevelError::EmptyGrid(name.to_string()));
    }

    let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    let mut cells = vec![vec![Cell::Empty; width]; rows.len()];
    let mut start = None;
    let mut end = None;

    for (y, row) in rows.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            match ch {
                '#' => cells[y][x] = Cell::Firewall,
                'E' => {
                    cells[y][x] = Cell::Exit;
                    if end.is_none() {
                        end = Some(Pos::new(x as i32, y as i32));
                    }
                }
                'S' => start = Some(Pos::new(x as i32, y as i32)),
                _ => {}
            }
        }
    }

    let start = start.ok_or_else(|| LevelError::MissingStart(name.to_string()))?;
    let end = end.ok_or_else(|| LevelError::MissingExit(name.to_string()))?;

    if patrol.is_empty() {
        return Err(LevelError::EmptyPatrol(name.to_string()));
    }

    let grid = Grid::new(cells);
    let mut warden_path = Vec::with_capacity(patrol.len());
    for &(x, y) in patrol {
        let p = Pos::new(x, y);
        if !grid.in_bounds(p) {
            return Err(LevelError::PatrolOutOfBounds(name.to_string(), x, y));
        }
        warden_path.push(p);
    }

    Ok(Level {
        name: name.to_string(),
        readme: readme.iter().map(|s| s.to_string()).collect(),
        grid,
        start,
        end,
        warden_path,
        initial_script: payload.to_vec(),
    })
}

// ══════════════════════════════════════════════════════════════
// Pack parsing
// ══════════════════════════════════════════════════════════════

/// Parse a `.sim` pack: one or more arrays separated by `===` lines.
pub fn parse_pack(text: &str) -> Result<Vec<Level>, LevelError> {
    let mut levels = Vec::new();
    let mut section = String::new();

    for line in text.lines() {
        if line.trim() == "===" {
            if !section.trim().is_empty() {
                levels.push(parse_array(&section)?);
            }
            section.clear();
        } else {
            section.push_str(line);
            section.push('\n');
        }
    }
    if !section.trim().is_empty() {
        levels.push(parse_array(&section)?);
    }

    Ok(levels)
}

fn parse_array(text: &str) -> Result<Level, LevelError> {
    let mut name = String::new();
    let mut readme: Vec<String> = Vec::new();
    let mut patrol: Vec<(i32, i32)> = Vec::new();
    let mut rows: Vec<String> = Vec::new();
    let mut payload: Vec<String> = Vec::new();
    let mut in_payload = false;

    for line in text.lines() {
        if in_payload {
            payload.push(line.to_string());
            continue;
        }
        if line.trim() == "---" {
            in_payload = true;
        } else if let Some(rest) = line.strip_prefix("# ") {
            // `# ` is the name only before the grid starts. A later line
            // like "# .E" is a legal row (firewall, empty, empty, exit)
            // and must not be eaten as a second name.
            if name.is_empty() && rows.is_empty() {
                name = rest.trim().to_string();
            } else {
                rows.push(line.to_string());
            }
        } else if let Some(rest) = line.strip_prefix('!') {
            readme.push(rest.strip_prefix(' ').unwrap_or(rest).to_string());
        } else if let Some(rest) = line.strip_prefix('>') {
            for pair in rest.split_whitespace() {
                let (x, y) = pair
                    .split_once(',')
                    .and_then(|(a, b)| Some((a.parse::<i32>().ok()?, b.parse::<i32>().ok()?)))
                    .ok_or_else(|| LevelError::BadPatrolEntry(pair.to_string()))?;
                patrol.push((x, y));
            }
        } else if !line.trim().is_empty() {
            rows.push(line.to_string());
        }
    }

    // Trailing blank payload lines carry no meaning; drop them.
    while payload.last().map_or(false, |l| l.trim().is_empty()) {
        payload.pop();
    }

    if name.is_empty() {
        name = "UNNAMED_ARRAY".to_string();
    }

    // Pad ragged rows so the grid is rectangular.
    let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    for row in &mut rows {
        let len = row.chars().count();
        if len < width {
            row.extend(std::iter::repeat('.').take(width - len));
        }
    }

    let readme_refs: Vec<&str> = readme.iter().map(String::as_str).collect();
    build_level(&name, &readme_refs, &rows, &patrol, &payload)
}

// ══════════════════════════════════════════════════════════════
// Directory loading
// ══════════════════════════════════════════════════════════════

/// Load all arrays from `.sim` files in `dir` (sorted by filename).
/// Unreadable or malformed files are skipped with a warning. Falls back to
/// the embedded arrays when the directory yields nothing.
pub fn scan_arrays(dir: &Path) -> Vec<Level> {
    let mut files: Vec<_> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().map_or(false, |e| e == "sim"))
            .collect(),
        Err(_) => Vec::new(),
    };
    files.sort();

    let mut levels = Vec::new();
    for path in files {
        match std::fs::read_to_string(&path) {
            Ok(text) => match parse_pack(&text) {
                Ok(parsed) => levels.extend(parsed),
                Err(e) => warn!("skipping {}: {e}", path.display()),
            },
            Err(e) => warn!("could not read {}: {e}", path.display()),
        }
    }

    if levels.is_empty() {
        embedded_arrays()
    } else {
        levels
    }
}

// ══════════════════════════════════════════════════════════════
// Embedded arrays
// ══════════════════════════════════════════════════════════════

const BASE_README: &[&str] = &[
    "OPERATIVE:",
    "",
    "This is the SIMULACRA_CORE. It tests payload",
    "logic against hostile networks.",
    "",
    "OBJECTIVE: Guide the packet [S] to [E] without",
    "triggering the Warden.",
    "TIMER: Starts when you edit PAYLOAD.SIM and runs",
    "until the third array is breached.",
    "SCORE: Time Cycle Score (seconds + total cycles).",
    "Lower is better.",
    "",
    "COMMANDS: MOV <UP|DOWN|LEFT|RIGHT>",
    "          WAIT",
    "          GOTO <LINE_NUM>",
    "          // (Comment)",
    "-glyphis",
];

/// The three stock arrays shipped with the game.
pub fn embedded_arrays() -> Vec<Level> {
    let defs: [(&str, &[&str], &[&str], &[(i32, i32)], &[&str]); 3] = [
        (
            "TEST_ARRAY_01",
            BASE_README,
            &[
                "S...",
                "#..#",
                "...E",
            ],
            &[(1, 1), (2, 1)],
            &[
                "// PAYLOAD.SIM - ARRAY 01",
                "// STATUS: BROKEN",
                "",
                "MOV RIGHT",
                "MOV RIGHT",
                "MOV DOWN",
                "MOV RIGHT",
                "GOTO 80",
            ],
        ),
        (
            "TEST_ARRAY_02",
            &[
                "OPERATIVE:",
                "",
                "ARRAY 02 extends the lattice.",
                "Central columns are patrolled by the Warden.",
                "Stagger your waits and loops.",
                "",
                "Remember: the timer is still running.",
                "",
                "-glyphis",
            ],
            &[
                "S....",
                ".#.#.",
                ".....",
                "#.#.E",
            ],
            &[(2, 0), (2, 1), (2, 2), (2, 1)],
            &[
                "// PAYLOAD.SIM - ARRAY 02",
                "// STATUS: BROKEN",
                "",
                "MOV RIGHT",
                "MOV RIGHT",
                "MOV DOWN",
                "WAIT",
                "MOV RIGHT",
                "GOTO 40",
            ],
        ),
        (
            "TEST_ARRAY_03",
            &[
                "OPERATIVE:",
                "",
                "Final array. Split corridors, double backs.",
                "Warden sweeps a long loop. Watch the cadence.",
                "",
                "Deliver the payload and seal the run.",
                "",
                "-glyphis",
            ],
            &[
                "S..#..",
                "#..#.#",
                "......",
                ".##.#E",
            ],
            &[
                (2, 0), (2, 1), (2, 2), (3, 2), (4, 2), (4, 1),
                (4, 2), (3, 2), (2, 2), (1, 2), (1, 1), (2, 1),
            ],
            &[
                "// PAYLOAD.SIM - ARRAY 03",
                "// STATUS: BROKEN",
                "",
                "MOV RIGHT",
                "MOV DOWN",
                "MOV RIGHT",
                "MOV UP",
                "MOV RIGHT",
                "GOTO 60",
            ],
        ),
    ];

    defs.iter()
        .filter_map(|(name, readme, rows, patrol, payload)| {
            let rows: Vec<String> = rows.iter().map(|s| s.to_string()).collect();
            let payload: Vec<String> = payload.iter().map(|s| s.to_string()).collect();
            match build_level(name, readme, &rows, patrol, &payload) {
                Ok(level) => Some(level),
                Err(e) => {
                    warn!("embedded array '{name}' rejected: {e}");
                    None
                }
            }
        })
        .collect()
}
