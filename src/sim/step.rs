/// The tick function: advances a running attempt by one cycle.
///
/// Per-tick order:
///   1. cycle += 1
///   2. Program overrun check
///   3. Collision check (pre-move)
///   4. Delivery check (pre-move)
///   5. Parse the line at the program counter
///   6. Execute (MOV / WAIT / GOTO)
///   7. Advance the warden exactly once
///   8. Collision + delivery re-check (post-move)
///   9. Trace entry if still running
///
/// The double check in 3–4 and 8 is load-bearing: either actor's move alone
/// can create or resolve an overlap, so a single check per tick would miss
/// collisions the warden creates by stepping onto the packet's new cell.
/// The warden advances once per tick whether the instruction was MOV, WAIT,
/// or GOTO; that coupling is the puzzle's timing dimension.

use crate::domain::command::{parse_line, Command};
use crate::domain::script::Script;
use crate::sim::engine::{Engine, Failure, Status};
use crate::sim::event::SimEvent;
use crate::sim::trace::TraceLog;

pub fn tick(engine: &mut Engine, trace: &mut TraceLog) -> Vec<SimEvent> {
    if !engine.is_running() {
        return vec![];
    }

    let mut events: Vec<SimEvent> = Vec::new();
    engine.cycle += 1;

    // ── 1. Program overrun ──
    if engine.pc >= engine.script.len() {
        fail(engine, trace, &mut events,
            Failure::finished("Payload ended without reaching [E]."));
        return events;
    }

    let line_number = Script::line_number(engine.pc);

    // ── 2. Pre-move collision / delivery ──
    if engine.player == engine.warden {
        fail(engine, trace, &mut events, intercepted(engine));
        return events;
    }
    if engine.player == engine.level.end {
        succeed(engine, &mut events);
        return events;
    }

    // ── 3. Parse and execute ──
    let line = engine.script.line(engine.pc).unwrap_or("");
    let command = parse_line(line);
    let mut next_pc = engine.pc + 1;

    match &command {
        Command::Error(msg) => {
            fail(engine, trace, &mut events,
                Failure::syntax(format!("L{line_number}: {msg}")));
            return events;
        }
        Command::Mov(dir) => {
            let (dx, dy) = dir.delta();
            let candidate = engine.player.offset(dx, dy);
            match engine.level.grid.at(candidate) {
                None => {
                    fail(engine, trace, &mut events,
                        Failure::runtime("Packet moved out of bounds."));
                    return events;
                }
                Some(cell) if cell.is_firewall() => {
                    fail(engine, trace, &mut events,
                        Failure::runtime(format!(
                            "Packet collided with firewall at ({}, {}).",
                            candidate.x, candidate.y
                        )));
                    return events;
                }
                Some(_) => engine.player = candidate,
            }
        }
        Command::Wait => {}
        Command::Goto(target) => match engine.script.resolve_goto(*target) {
            Some(idx) => next_pc = idx,
            None => {
                fail(engine, trace, &mut events,
                    Failure::runtime(format!("GOTO target '{target}' not found.")));
                return events;
            }
        },
    }

    engine.pc = next_pc;
    events.push(SimEvent::CommandExecuted {
        cycle: engine.cycle,
        line_number,
        command: command.clone(),
    });

    // ── 4. Warden advance (always exactly once on a non-terminal tick) ──
    engine.patrol_index = (engine.patrol_index + 1) % engine.level.warden_path.len();
    engine.warden = engine.level.warden_path[engine.patrol_index];

    // ── 5. Post-move collision / delivery ──
    if engine.player == engine.warden {
        fail(engine, trace, &mut events, intercepted(engine));
        return events;
    }
    if engine.player == engine.level.end {
        succeed(engine, &mut events);
        return events;
    }

    // ── 6. Trace ──
    trace.push(format!(
        "CYCLE {} (L{}): [S] {}. [W] -> ({}, {}).",
        engine.cycle,
        line_number,
        describe(&command),
        engine.warden.x,
        engine.warden.y
    ));

    events
}

fn intercepted(engine: &Engine) -> Failure {
    Failure::collision(format!(
        "Intercepted by [W] at ({}, {}).",
        engine.player.x, engine.player.y
    ))
}

fn describe(command: &Command) -> String {
    match command {
        Command::Mov(dir) => format!("MOV {}", dir.name()),
        Command::Wait => "WAIT".to_string(),
        Command::Goto(n) => format!("GOTO {n}"),
        Command::Error(_) => "ERROR".to_string(),
    }
}

/// Terminal failure: record in status, bannered in the trace, surfaced as
/// an event. Never swallowed.
fn fail(engine: &mut Engine, trace: &mut TraceLog, events: &mut Vec<SimEvent>, failure: Failure) {
    trace.push("");
    trace.push(format!("--- {} ---", failure.title));
    trace.push(failure.detail.clone());
    trace.push("Awaiting reset.");
    events.push(SimEvent::ArrayFailed {
        title: failure.title,
        detail: failure.detail.clone(),
    });
    engine.status = Status::Failed(failure);
}

fn succeed(engine: &mut Engine, events: &mut Vec<SimEvent>) {
    engine.status = Status::Succeeded;
    events.push(SimEvent::ArrayCleared {
        cycles: engine.cycle,
        instructions: engine.script.instruction_count() as u64,
    });
}
