/// Headless command-line runner.
///
/// Feeds payload files to the engine and streams the execution trace to
/// stdout. Useful for testing payloads without a front end:
///
///   simulacra-core --identity rain --script p1.sim --script p2.sim --script p3.sim
///
/// Each `--script` file is the payload for the next array in sequence.
/// With no scripts, the loaded arrays and their readmes are listed.

use std::process::ExitCode;
use std::time::{Duration, Instant};

use tracing::error;
use tracing_subscriber::EnvFilter;

use simulacra_core::config::EngineConfig;
use simulacra_core::sim::event::SimEvent;
use simulacra_core::sim::level::scan_arrays;
use simulacra_core::sim::run::{format_time, RunController};
use simulacra_core::sim::save;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

struct CliArgs {
    identity: String,
    scripts: Vec<String>,
    fast: bool,
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = CliArgs {
        identity: "operator".to_string(),
        scripts: vec![],
        fast: false,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--identity" => {
                args.identity = it.next().ok_or("--identity needs a value")?;
            }
            "--script" => {
                args.scripts.push(it.next().ok_or("--script needs a file")?);
            }
            "--fast" => args.fast = true,
            "--help" | "-h" => {
                return Err("usage: simulacra-core [--identity NAME] [--fast] \
                            [--script FILE]..."
                    .to_string());
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(args)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args() {
        Ok(a) => a,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let mut config = EngineConfig::load();
    if args.fast {
        config.tick_interval = Duration::ZERO;
    }
    let leaderboard_cap = config.leaderboard_cap;

    let levels = scan_arrays(&config.arrays_dir);
    let mut controller = match RunController::new(levels, args.identity, config) {
        Ok(c) => c,
        Err(e) => {
            error!("no runnable arrays: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(board) = save::load_scores(leaderboard_cap) {
        controller.replace_leaderboard(board);
    }

    if args.scripts.is_empty() {
        println!("Loaded arrays:");
        for line in controller.trace().iter() {
            println!("  {line}");
        }
        println!("Pass --script FILE (once per array) to run payloads.");
        return ExitCode::SUCCESS;
    }

    let mut printed: u64 = controller.trace().total_pushed();
    let mut complete = false;

    'run: for path in args.scripts {
        let lines: Vec<String> = match std::fs::read_to_string(&path) {
            Ok(text) => text.lines().map(|l| l.to_string()).collect(),
            Err(e) => {
                error!("cannot read {path}: {e}");
                return ExitCode::FAILURE;
            }
        };

        println!("== {} ==", controller.level().name);
        if !controller.request_run(&lines, Instant::now()) {
            error!("engine refused to start (not in editing state)");
            return ExitCode::FAILURE;
        }

        loop {
            let events = controller.advance(Instant::now());
            printed = flush_trace(&controller, printed);

            for event in &events {
                match event {
                    SimEvent::ArrayAdvanced { .. } => continue 'run,
                    SimEvent::RunComplete(summary) => {
                        println!();
                        println!("RUN COMPLETE for {}", controller.identity());
                        println!("  time          {}", format_time(summary.elapsed_seconds));
                        println!("  cycles        {}", summary.total_cycles);
                        println!("  instructions  {}", summary.total_instructions);
                        println!("  TCS           {:.1}", summary.tcs);
                        if let Some(best) = summary.prior_best_tcs {
                            println!("  prior best    {best:.1}");
                        }
                        complete = true;
                        break 'run;
                    }
                    _ => {}
                }
            }

            if controller.engine().is_terminal() {
                break 'run;
            }
            std::thread::sleep(FRAME_SLEEP);
        }
    }

    flush_trace(&controller, printed);

    if complete {
        println!();
        println!("LEADERBOARD");
        for (rank, entry) in controller.leaderboard().entries().iter().enumerate() {
            println!("  {:2}. {:<12} {:8.1}", rank + 1, entry.identity, entry.tcs);
        }
        if let Err(e) = save::save_scores(controller.leaderboard()) {
            error!("{e}");
        }
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Prints trace lines pushed since the last flush. Returns the new high
/// water mark.
fn flush_trace(controller: &RunController, printed: u64) -> u64 {
    let trace = controller.trace();
    let total = trace.total_pushed();
    let fresh = (total - printed) as usize;
    let kept = trace.len();
    for line in trace.iter().skip(kept.saturating_sub(fresh)) {
        println!("{line}");
    }
    total
}
