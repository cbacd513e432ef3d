use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use autoscroll_core::sim::{SimulatedHost, Simulation};
use autoscroll_core::{AppConfig, AutoScroll, Callbacks, EventKind};

use super::ScrollOverrides;

#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Viewport height in pixels
    #[arg(long, default_value_t = 400.0)]
    pub client_height: f64,
    /// Total content height in pixels
    #[arg(long, default_value_t = 2000.0)]
    pub content_height: f64,
    /// Simulated time in milliseconds
    #[arg(long, default_value_t = 10_000.0)]
    pub duration: f64,
    /// Frames per second
    #[arg(long, default_value_t = Simulation::DEFAULT_FPS)]
    pub fps: f64,
    /// Inject an event, e.g. `1500:wheel` (repeatable). `visibilitychange`
    /// toggles the hidden flag.
    #[arg(long = "event", value_parser = parse_scheduled)]
    pub events: Vec<ScheduledEvent>,
    /// Report a reduced-motion preference
    #[arg(long)]
    pub reduced_motion: bool,
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
    #[command(flatten)]
    pub overrides: ScrollOverrides,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledEvent {
    pub at_ms: f64,
    pub kind: EventKind,
}

fn parse_scheduled(value: &str) -> Result<ScheduledEvent, String> {
    let (at, kind) = value
        .split_once(':')
        .ok_or_else(|| format!("expected MS:EVENT, got '{}'", value))?;
    let at_ms: f64 = at
        .trim()
        .parse()
        .map_err(|_| format!("invalid time '{}'", at))?;
    let kind: EventKind = kind.parse().map_err(|e: autoscroll_core::Error| e.to_string())?;
    Ok(ScheduledEvent { at_ms, kind })
}

/// Observable transition, timestamped on the virtual clock
#[derive(Debug, Clone, Serialize)]
pub struct Transition {
    pub at_ms: f64,
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub duration_ms: f64,
    pub frames: usize,
    pub scroll_top: f64,
    pub max_scroll: f64,
    pub direction: String,
    pub started: bool,
    pub paused: bool,
    pub reached_end: bool,
    pub reached_top: bool,
    pub transitions: Vec<Transition>,
}

pub fn run(config: &AppConfig, args: SimulateArgs) -> Result<()> {
    let mut scroll = config.scroll.clone();
    args.overrides.apply(&mut scroll);
    scroll.validate()?;

    let report = simulate(scroll, &args);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for transition in &report.transitions {
        println!("{:>10.1}ms  {}", transition.at_ms, transition.kind);
    }
    println!();
    println!("Frames:      {}", report.frames);
    println!(
        "Position:    {:.0}/{:.0}px",
        report.scroll_top, report.max_scroll
    );
    println!("Direction:   {}", report.direction);
    println!("Paused:      {}", report.paused);
    println!(
        "Edges:       end={} top={}",
        report.reached_end, report.reached_top
    );

    Ok(())
}

/// Run a simulation to completion and collect its report
pub fn simulate(config: autoscroll_core::AutoScrollConfig, args: &SimulateArgs) -> Report {
    let mut host = SimulatedHost::new(args.client_height, args.content_height);
    host.reduced_motion = args.reduced_motion;

    let transitions: Rc<RefCell<Vec<Transition>>> = Rc::default();
    let clock = host.clock_handle();
    let record = |label: &'static str| {
        let transitions = Rc::clone(&transitions);
        let clock = Rc::clone(&clock);
        move || {
            transitions.borrow_mut().push(Transition {
                at_ms: clock.get(),
                kind: label.to_string(),
            })
        }
    };

    let callbacks = Callbacks::default()
        .on_start(record("start"))
        .on_pause(record("pause"))
        .on_resume(record("resume"))
        .on_reach_end(record("reach end"))
        .on_reach_top(record("reach top"))
        .on_direction_change({
            let transitions = Rc::clone(&transitions);
            let clock = Rc::clone(&clock);
            move |direction| {
                transitions.borrow_mut().push(Transition {
                    at_ms: clock.get(),
                    kind: format!("direction {}", direction),
                })
            }
        });

    let engine = AutoScroll::new(config, callbacks);
    let mut sim = Simulation::with_fps(engine, host, args.fps);
    sim.mount();

    let mut events = args.events.clone();
    events.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));

    for event in events.iter().filter(|e| e.at_ms <= args.duration) {
        let wait = event.at_ms - sim.now();
        if wait > 0.0 {
            sim.advance(wait);
        }
        if event.kind == EventKind::VisibilityChange {
            let hidden = !sim.host.hidden;
            sim.set_hidden(hidden);
        } else {
            sim.dispatch(event.kind);
        }
    }

    let remaining = args.duration - sim.now();
    if remaining > 0.0 {
        sim.advance(remaining);
    }

    let owner = sim.host.owner.as_ref();
    let report = Report {
        duration_ms: sim.now(),
        frames: sim.host.frames_requested(),
        scroll_top: owner.map(|o| o.scroll_top).unwrap_or(0.0),
        max_scroll: owner.map(|o| o.max_scroll()).unwrap_or(0.0),
        direction: sim.engine.current_direction().to_string(),
        started: sim.engine.has_started(),
        paused: sim.engine.paused(),
        reached_end: sim.engine.reached_end(),
        reached_top: sim.engine.reached_top(),
        transitions: transitions.borrow().clone(),
    };

    sim.unmount();
    report
}

#[cfg(test)]
mod tests {
    use autoscroll_core::AutoScrollConfig;

    use super::*;

    fn args(events: Vec<ScheduledEvent>) -> SimulateArgs {
        SimulateArgs {
            client_height: 400.0,
            content_height: 1000.0,
            duration: 8000.0,
            fps: 60.0,
            events,
            reduced_motion: false,
            json: false,
            overrides: ScrollOverrides::default(),
        }
    }

    fn kinds(report: &Report) -> Vec<&str> {
        report.transitions.iter().map(|t| t.kind.as_str()).collect()
    }

    #[test]
    fn test_parse_scheduled() {
        assert_eq!(
            parse_scheduled("1500:wheel"),
            Ok(ScheduledEvent {
                at_ms: 1500.0,
                kind: EventKind::Wheel
            })
        );
        assert!(parse_scheduled("wheel").is_err());
        assert!(parse_scheduled("soon:wheel").is_err());
        assert!(parse_scheduled("10:hover").is_err());
    }

    #[test]
    fn test_runs_to_the_end() {
        let config = AutoScrollConfig {
            acceleration_time: 0.0,
            ..AutoScrollConfig::new(100.0)
        };
        let report = simulate(config, &args(vec![]));

        assert_eq!(kinds(&report), vec!["start", "reach end"]);
        assert!(report.reached_end);
        assert!(report.scroll_top >= report.max_scroll - 1.0);
    }

    #[test]
    fn test_injected_pause_and_resume() {
        let events = vec![
            ScheduledEvent {
                at_ms: 2000.0,
                kind: EventKind::MouseLeave,
            },
            ScheduledEvent {
                at_ms: 1000.0,
                kind: EventKind::Wheel,
            },
        ];
        let report = simulate(AutoScrollConfig::new(50.0), &args(events));

        assert_eq!(kinds(&report)[..3], ["start", "pause", "resume"]);
        assert!(!report.paused);
        assert_eq!(report.transitions[1].at_ms, 1000.0);
    }

    #[test]
    fn test_visibility_toggle_is_silent() {
        let events = vec![ScheduledEvent {
            at_ms: 500.0,
            kind: EventKind::VisibilityChange,
        }];
        let report = simulate(AutoScrollConfig::new(50.0), &args(events));

        assert!(report.paused);
        assert_eq!(kinds(&report), vec!["start"]);
    }
}
