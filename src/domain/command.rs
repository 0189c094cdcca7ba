/// The SIM_BASIC instruction set and its parser.
///
/// One source line parses to exactly one `Command`. The parser is pure:
/// identical text always yields an equal `Command`, with no dependence on
/// engine state. Malformed text still parses, to `Command::Error`, so
/// that the engine, not the parser, decides when a bad line matters.

/// Movement direction (unit vector, y grows downward).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Command {
    Mov(Direction),
    Wait,
    Goto(u32),
    /// Text that parses to nothing legal. Carries the diagnostic message.
    Error(String),
}

/// Parse one line of SIM_BASIC.
///
/// A trailing `//` comment is stripped first; matching is case-insensitive.
/// A line that is empty after stripping is a `Wait`: blank lines and pure
/// comments still cost a cycle.
pub fn parse_line(line: &str) -> Command {
    let content = match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    };
    let cmd = content.trim().to_uppercase();

    if cmd.is_empty() {
        return Command::Wait;
    }

    let parts: Vec<&str> = cmd.split_whitespace().collect();

    match parts[0] {
        "MOV" => {
            if parts.len() != 2 {
                return Command::Error("MOV requires 1 argument".to_string());
            }
            match parts[1] {
                "UP" => Command::Mov(Direction::Up),
                "DOWN" => Command::Mov(Direction::Down),
                "LEFT" => Command::Mov(Direction::Left),
                "RIGHT" => Command::Mov(Direction::Right),
                other => Command::Error(format!("Unknown MOV direction '{other}'")),
            }
        }
        "WAIT" if parts.len() == 1 => Command::Wait,
        "GOTO" => {
            if parts.len() != 2 {
                return Command::Error("GOTO requires 1 argument".to_string());
            }
            let target = parts[1];
            if target.chars().all(|c| c.is_ascii_digit()) {
                match target.parse::<u32>() {
                    Ok(n) => Command::Goto(n),
                    Err(_) => Command::Error("GOTO target must be a line number".to_string()),
                }
            } else {
                Command::Error("GOTO target must be a line number".to_string())
            }
        }
        _ => Command::Error(format!("Unknown command '{cmd}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_line_is_wait() {
        assert_eq!(parse_line(""), Command::Wait);
        assert_eq!(parse_line("   "), Command::Wait);
    }

    #[test]
    fn pure_comment_is_wait() {
        assert_eq!(parse_line("// PAYLOAD.SIM - ARRAY 01"), Command::Wait);
        assert_eq!(parse_line("   // indented comment"), Command::Wait);
    }

    #[test]
    fn trailing_comment_is_stripped() {
        assert_eq!(parse_line("WAIT // stall one cycle"), Command::Wait);
        assert_eq!(
            parse_line("MOV RIGHT // toward the exit"),
            Command::Mov(Direction::Right)
        );
    }

    #[test]
    fn mov_all_directions() {
        assert_eq!(parse_line("MOV UP"), Command::Mov(Direction::Up));
        assert_eq!(parse_line("MOV DOWN"), Command::Mov(Direction::Down));
        assert_eq!(parse_line("MOV LEFT"), Command::Mov(Direction::Left));
        assert_eq!(parse_line("MOV RIGHT"), Command::Mov(Direction::Right));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(parse_line("mov right"), Command::Mov(Direction::Right));
        assert_eq!(parse_line("Wait"), Command::Wait);
        assert_eq!(parse_line("goto 40"), Command::Goto(40));
    }

    #[test]
    fn mov_bad_arity() {
        assert!(matches!(parse_line("MOV"), Command::Error(_)));
        assert!(matches!(parse_line("MOV UP DOWN"), Command::Error(_)));
    }

    #[test]
    fn mov_bad_direction_quotes_token() {
        match parse_line("MOV NORTH") {
            Command::Error(msg) => assert!(msg.contains("'NORTH'")),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn goto_parses_number() {
        assert_eq!(parse_line("GOTO 80"), Command::Goto(80));
        assert_eq!(parse_line("GOTO 0"), Command::Goto(0));
    }

    #[test]
    fn goto_rejects_non_numeric_targets() {
        assert!(matches!(parse_line("GOTO"), Command::Error(_)));
        assert!(matches!(parse_line("GOTO END"), Command::Error(_)));
        assert!(matches!(parse_line("GOTO -10"), Command::Error(_)));
        assert!(matches!(parse_line("GOTO 10 20"), Command::Error(_)));
    }

    #[test]
    fn unknown_command_quotes_text() {
        match parse_line("JMP 40") {
            Command::Error(msg) => assert!(msg.contains("'JMP 40'")),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn wait_with_argument_is_unknown() {
        assert!(matches!(parse_line("WAIT 3"), Command::Error(_)));
    }

    #[test]
    fn parsing_is_idempotent() {
        for line in ["MOV LEFT", " goto 30 // loop", "???", "", "WAIT"] {
            assert_eq!(parse_line(line), parse_line(line));
        }
    }
}
