//! REPSYNC trace replay
//!
//! Feeds two recorded landmark traces (front and side camera) through a
//! counting session in timestamp order and prints the result.
//!
//! Usage: `rep-replay <front.jsonl> <side.jsonl> [--config cfg.json] [--json-logs]`
//!
//! Each trace line is `{"seq": 12, "t_ms": 400, "landmarks": [...]}`, with
//! `"landmarks": null` for frames where no person was detected.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use serde::Deserialize;

use repsync_core::{FrameSeq, Landmark, PoseFrame, RepError, RepResult, SessionTime, StreamId};
use repsync_runtime::{init_logging, LogConfig, Session, SessionConfig, SyncOutcome};
use repsync_time::ManualClock;

#[derive(Debug, Deserialize)]
struct TraceLine {
    seq: u64,
    t_ms: u64,
    #[serde(default)]
    landmarks: Option<Vec<Landmark>>,
}

struct Args {
    front: PathBuf,
    side: PathBuf,
    config: Option<PathBuf>,
    json_logs: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut positional = Vec::new();
    let mut config = None;
    let mut json_logs = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            "--json-logs" => json_logs = true,
            "-h" | "--help" => return Err(String::new()),
            other if other.starts_with("--") => return Err(format!("unknown flag {}", other)),
            other => positional.push(PathBuf::from(other)),
        }
    }

    let [front, side]: [PathBuf; 2] = positional
        .try_into()
        .map_err(|_| "expected exactly two trace files".to_string())?;
    Ok(Args { front, side, config, json_logs })
}

/// Load one trace as (time, stream, frame) entries
fn load_trace(path: &Path, stream: StreamId) -> RepResult<Vec<(SessionTime, StreamId, PoseFrame)>> {
    let text = fs::read_to_string(path)
        .map_err(|e| RepError::Io(format!("{}: {}", path.display(), e)))?;

    let mut entries = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parsed: TraceLine = serde_json::from_str(line)
            .map_err(|e| RepError::Parse(format!("{}:{}: {}", path.display(), n + 1, e)))?;
        let frame = PoseFrame {
            seq: FrameSeq::new(parsed.seq),
            landmarks: parsed.landmarks,
        };
        entries.push((SessionTime::from_millis(parsed.t_ms), stream, frame));
    }
    Ok(entries)
}

fn run(args: Args) -> RepResult<()> {
    let log = if args.json_logs { LogConfig::json() } else { LogConfig::default() };
    init_logging(&log)?;

    let config = match &args.config {
        Some(path) => SessionConfig::from_json_file(path)?,
        None => SessionConfig::default(),
    };

    let mut timeline = load_trace(&args.front, StreamId::Front)?;
    timeline.extend(load_trace(&args.side, StreamId::Side)?);
    // Stable: equal timestamps keep front before side
    timeline.sort_by_key(|(at, _, _)| *at);

    let clock = Arc::new(ManualClock::new());
    let session = Session::new(config, clock.clone())?;

    let mut rejected = 0u64;
    for (at, stream, frame) in timeline {
        clock.set(at);
        match session.update(stream, frame) {
            Ok(outcome) => {
                if let Some(SyncOutcome::Counted { phase, counts }) = outcome.sync {
                    println!(
                        "{:>8.3}s  {:<10} event {:>3}  reps {:>3}",
                        at.as_secs_f64(),
                        phase.label(),
                        counts.phase_events,
                        counts.repetitions,
                    );
                }
            }
            Err(e) => {
                rejected += 1;
                tracing::warn!(stream = %stream, error = %e, "frame rejected");
            }
        }
    }

    let snapshot = session.snapshot();
    println!();
    println!("Phase events: {}", snapshot.counts.phase_events);
    println!("Repetitions:  {}", snapshot.counts.repetitions);
    for summary in &snapshot.streams {
        println!(
            "{:<6} frames {:>5}  gaps {:>4}  stale {:>4}  malformed {:>4}",
            summary.stream.label(),
            summary.stats.frames,
            summary.stats.gaps,
            summary.stats.stale,
            summary.stats.malformed,
        );
    }
    if rejected > 0 {
        println!("Rejected frames: {}", rejected);
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            if !msg.is_empty() {
                eprintln!("error: {}", msg);
            }
            eprintln!("usage: rep-replay <front.jsonl> <side.jsonl> [--config cfg.json] [--json-logs]");
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
