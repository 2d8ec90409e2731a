//! Trim-and-respond loop runs: config mapping, source selection, event output.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use eyre::WrapErr;
use setpoint_core::error::Result;
use setpoint_core::{ControlLoop, CycleEvent, ResetError, ScheduleCfg, TrimRespondController};
use setpoint_core::scheduler::RecvTimeoutError;
use setpoint_sources::{Range, ReplaySource, SyntheticSource};
use setpoint_traits::{MonotonicClock, ReadingSource};

use crate::cli::LoopArgs;
use crate::error_fmt::{CONFIG_CONTEXT, SOURCE_CONTEXT};

/// How long the consumer waits for an event before re-checking Ctrl-C.
const EVENT_POLL: Duration = Duration::from_millis(100);

fn build_source(cfg: &setpoint_config::LoopCfg, args: &LoopArgs) -> Result<Box<dyn ReadingSource + Send>> {
    if let Some(path) = &args.replay {
        let src = ReplaySource::from_csv(path)
            .map_err(eyre::Report::new)
            .wrap_err_with(|| format!("{SOURCE_CONTEXT}: replay {}", path.display()))?
            .looped(args.loop_replay);
        tracing::info!(frames = src.len(), looped = args.loop_replay, "replaying fixture");
        return Ok(Box::new(src));
    }

    let syn = &cfg.synthetic;
    let readings = Range::new(syn.low, syn.high)
        .map_err(eyre::Report::new)
        .wrap_err(CONFIG_CONTEXT)?;
    let condition = syn
        .condition
        .map(|(lo, hi)| Range::new(lo, hi))
        .transpose()
        .map_err(eyre::Report::new)
        .wrap_err(CONFIG_CONTEXT)?;
    Ok(Box::new(match args.seed {
        Some(seed) => SyntheticSource::with_seed(syn.devices, readings, condition, seed),
        None => SyntheticSource::new(syn.devices, readings, condition),
    }))
}

/// Run one loop until `--cycles`, Ctrl-C, or the replay runs out.
pub fn run_loop(
    name: &'static str,
    cfg: &setpoint_config::LoopCfg,
    args: &LoopArgs,
    json: bool,
    shutdown: &Arc<AtomicBool>,
) -> Result<()> {
    let controller = TrimRespondController::try_from(cfg)
        .map_err(ResetError::from)
        .map_err(eyre::Report::new)
        .wrap_err(CONFIG_CONTEXT)?;
    let mut schedule = ScheduleCfg::from(&cfg.schedule);
    schedule.max_cycles = args.cycles;
    if args.no_delay {
        schedule.initial_delay = Duration::ZERO;
    }
    let source = build_source(cfg, args)?;

    tracing::info!(
        loop_name = name,
        setpoint = controller.setpoint(),
        min = controller.min(),
        max = controller.ceiling().upper(),
        max_step = controller.cfg().max_step,
        interval_ms = cfg.schedule.interval_ms,
        initial_delay_ms = setpoint_core::util::millis(schedule.initial_delay),
        "starting"
    );
    let lp = ControlLoop::spawn(controller, source, schedule, MonotonicClock::new())?;

    let mut faults = 0u64;
    let mut stopping = false;
    loop {
        // Keep draining after Ctrl-C so every cycle that ran is printed.
        if !stopping && shutdown.load(Ordering::Relaxed) {
            tracing::info!(loop_name = name, "interrupted");
            lp.request_stop();
            stopping = true;
        }
        match lp.next_timeout(EVENT_POLL) {
            Ok(ev) => {
                if ev.outcome.is_err() {
                    faults += 1;
                }
                println!("{}", format_event(name, &ev, json));
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    let cycles = lp.cycles();
    let controller = lp.stop()?;
    if json {
        println!(
            "{}",
            serde_json::json!({
                "loop": name,
                "event": "stopped",
                "cycles": cycles,
                "faults": faults,
                "setpoint": controller.setpoint(),
            })
        );
    } else {
        println!(
            "{name}: stopped after {cycles} cycles ({faults} faults), setpoint {:.3}",
            controller.setpoint()
        );
    }
    Ok(())
}

pub fn format_event(name: &str, ev: &CycleEvent, json: bool) -> String {
    match (&ev.outcome, json) {
        (Ok(r), true) => serde_json::json!({
            "loop": name,
            "cycle": ev.cycle,
            "requests": r.tally.request_count,
            "ignored": r.tally.ignored,
            "max_remaining": r.tally.max_remaining,
            "discarded": r.tally.discarded,
            "condition": r.condition,
            "effective_max": r.effective_max,
            "previous_setpoint": r.adjustment.previous_setpoint,
            "setpoint": r.adjustment.new_setpoint,
            "adjustment": r.adjustment.adjustment,
            "direction": r.adjustment.direction.as_str(),
        })
        .to_string(),
        (Ok(r), false) => {
            let max_remaining = r
                .tally
                .max_remaining
                .map_or_else(|| "none".to_string(), |m| format!("{m:.2}"));
            let condition = r
                .condition
                .map(|c| format!(" condition={c:.1} max={:.2}", r.effective_max))
                .unwrap_or_default();
            format!(
                "{name} cycle {}: requests={} max_remaining={max_remaining}{condition} setpoint {:.3} -> {:.3} ({})",
                ev.cycle,
                r.tally.request_count,
                r.adjustment.previous_setpoint,
                r.adjustment.new_setpoint,
                r.adjustment.direction,
            )
        }
        (Err(e), true) => serde_json::json!({
            "loop": name,
            "cycle": ev.cycle,
            "error": e.to_string(),
        })
        .to_string(),
        (Err(e), false) => format!("{name} cycle {}: skipped ({e})", ev.cycle),
    }
}
