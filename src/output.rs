//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! # Simulate
//!
//! ```text
//! 001 load @ 500px → zone 480
//!     img#hero: applied http://placehold.it/480x480
//!     div#banner: applied http://placehold.it/480x480
//! 002 resize @ 400px → zone 360
//!     img#hero: kept (served 480)
//!     div#banner: kept (served 480)
//!
//! Final state
//!     img#hero: http://placehold.it/480x480 (max zone 480)
//!     div#banner: url(http://placehold.it/480x480) (max zone 480)
//!
//! 2 passes, 2 writes, 2 swaps
//! ```

use crate::config::Config;
use crate::element::{Element, ManagedElement};
use crate::scene::Replay;
use crate::swapper::{ElementOutcome, PassReport};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn outcome_line(label: &str, outcome: &ElementOutcome) -> String {
    match outcome {
        ElementOutcome::Kept { served } => format!("{label}: kept (served {served})"),
        ElementOutcome::Applied { url, written: true } => format!("{label}: applied {url}"),
        ElementOutcome::Applied {
            url,
            written: false,
        } => format!("{label}: unchanged {url}"),
        ElementOutcome::Failed(err) => format!("{label}: failed: {err}"),
    }
}

/// Format one pass: a header plus one line per element, then diagnostics.
pub fn format_pass(index: usize, report: &PassReport, labels: &[String]) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} @ {}px → zone {}",
        format_index(index),
        report.signal.trigger,
        report.signal.width,
        report.zone
    )];
    for (i, outcome) in report.outcomes.iter().enumerate() {
        let label = labels.get(i).map(String::as_str).unwrap_or("?");
        lines.push(format!("{}{}", indent(1), outcome_line(label, outcome)));
    }
    for (i, diagnostic) in &report.diagnostics {
        let label = labels.get(*i).map(String::as_str).unwrap_or("?");
        lines.push(format!("{}warning: {label}: {diagnostic}", indent(1)));
    }
    lines
}

/// Format the whole replay: every pass, final element state, totals.
pub fn format_replay(replay: &Replay, elements: &[Element]) -> Vec<String> {
    let labels: Vec<String> = elements.iter().map(|e| e.label()).collect();
    let mut lines = Vec::new();

    for (i, report) in replay.passes.iter().enumerate() {
        lines.extend(format_pass(i + 1, report, &labels));
    }

    lines.push(String::new());
    lines.push("Final state".to_string());
    for element in elements {
        let rendered = element.rendered().unwrap_or("(nothing)");
        let line = match element.state.max_served_zone {
            Some(zone) => format!("{}: {rendered} (max zone {zone})", element.label()),
            None => format!("{}: {rendered}", element.label()),
        };
        lines.push(format!("{}{}", indent(1), line));
    }

    let writes: usize = replay.passes.iter().map(PassReport::writes).sum();
    lines.push(String::new());
    lines.push(format!(
        "{} passes, {} writes, {} swaps",
        replay.passes.len(),
        writes,
        replay.swaps.len()
    ));
    lines
}

/// Format a config summary for `check`.
pub fn format_config_summary(config: &Config) -> Vec<String> {
    let zones: Vec<String> = config.breakpoints.iter().map(u32::to_string).collect();
    vec![
        format!("Zones: {}", zones.join(", ")),
        format!("Strategy: {}", config.strategy.name()),
        format!("Upsize only: {}", config.upsize_only),
        format!("Maintain aspect: {}", config.maintain_aspect),
        format!("Protocol: {}", config.protocol),
    ]
}

pub fn print_replay(replay: &Replay, elements: &[Element]) {
    for line in format_replay(replay, elements) {
        println!("{}", line);
    }
}

pub fn print_config_summary(config: &Config) {
    for line in format_config_summary(config) {
        println!("{}", line);
    }
}
