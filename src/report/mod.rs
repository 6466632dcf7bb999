//! Solve reports for the CLI frontend.
//!
//! Writes a [`SolveResult`] either as a human-readable text table or as JSON.

use std::io::{self, Write};

use crate::circuit::CircuitModel;
use crate::error::{BreadboardError, Result};
use crate::solver::SolveResult;

fn report_error(e: impl std::fmt::Display) -> BreadboardError {
    BreadboardError::ReportError {
        message: e.to_string(),
    }
}

/// Format a value with an SI prefix, e.g. `19.72 mA`.
pub fn format_si(value: f64, unit: &str) -> String {
    const PREFIXES: [(f64, &str); 7] = [
        (1e9, "G"),
        (1e6, "M"),
        (1e3, "k"),
        (1.0, ""),
        (1e-3, "m"),
        (1e-6, "u"),
        (1e-9, "n"),
    ];

    if value == 0.0 || !value.is_finite() {
        return format!("{} {}", value, unit);
    }
    let magnitude = value.abs();
    let (scale, prefix) = PREFIXES
        .iter()
        .copied()
        .find(|(scale, _)| magnitude >= *scale)
        .unwrap_or((1e-12, "p"));
    format!("{:.4} {}{}", value / scale, prefix, unit)
}

/// Write a text report.
pub fn write_text<W: Write>(out: &mut W, model: &CircuitModel, result: &SolveResult) -> Result<()> {
    write_text_inner(out, model, result).map_err(report_error)
}

fn write_text_inner<W: Write>(out: &mut W, model: &CircuitModel, result: &SolveResult) -> io::Result<()> {
    if !result.is_solved() {
        let reason = result
            .failure_reason
            .map(|r| r.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        writeln!(out, "status: unsolved ({})", reason)?;
        return Ok(());
    }

    writeln!(
        out,
        "status: solved ({} pass{}, {})",
        result.iterations,
        if result.iterations == 1 { "" } else { "es" },
        if result.converged { "converged" } else { "not converged" }
    )?;
    if let Some(reference) = result.reference {
        writeln!(out, "reference: {}", reference)?;
    }

    writeln!(out)?;
    writeln!(out, "nodes:")?;
    for node in &result.nodes {
        let members: Vec<String> = node.terminals.iter().map(|t| model.terminal_label(*t)).collect();
        let voltage = result.voltage(node.id).unwrap_or(0.0);
        writeln!(out, "  {:<5} {:>14}  {}", node.id.to_string(), format_si(voltage, "V"), members.join(" "))?;
    }

    writeln!(out)?;
    writeln!(out, "currents:")?;
    for component in model.components() {
        if let Some(current) = result.current(component.name()) {
            writeln!(out, "  {:<8} {:>14}", component.name(), format_si(current, "A"))?;
        }
    }

    if !result.led_states.is_empty() {
        writeln!(out)?;
        writeln!(out, "leds:")?;
        for (name, state) in &result.led_states {
            let brightness = result.led_brightness.get(name).copied().unwrap_or(0.0);
            let state = match state {
                crate::components::LedState::On => "on",
                crate::components::LedState::Leak => "off",
            };
            writeln!(out, "  {:<8} {:<4} {:>5.1}%", name, state, brightness * 100.0)?;
        }
    }

    Ok(())
}

/// Write the result as pretty-printed JSON.
pub fn write_json<W: Write>(out: &mut W, result: &SolveResult) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, result).map_err(report_error)?;
    writeln!(out).map_err(report_error)
}

/// Print a report to stdout.
pub fn print_report(model: &CircuitModel, result: &SolveResult, json: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        write_json(&mut out, result)?;
    } else {
        write_text(&mut out, model, result)?;
    }
    out.flush().map_err(report_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::parse;
    use crate::solver::solve;

    fn led_circuit() -> CircuitModel {
        let ast = parse(
            "V1 9\nR1 330\nLED1 red\n.connect V1:a R1:a\n.connect R1:b LED1:a\n.connect LED1:b V1:b\n",
        )
        .unwrap();
        CircuitModel::from_ast(ast).unwrap()
    }

    #[test]
    fn test_format_si() {
        assert_eq!(format_si(0.0197, "A"), "19.7000 mA");
        assert_eq!(format_si(-9.0, "V"), "-9.0000 V");
        assert_eq!(format_si(9e6, "A"), "9.0000 MA");
        assert_eq!(format_si(0.0, "V"), "0 V");
    }

    #[test]
    fn test_text_report() {
        let model = led_circuit();
        let result = solve(&model);
        let mut out = Vec::new();
        write_text(&mut out, &model, &result).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("status: solved (2 passes, converged)"));
        assert!(text.contains("V1:a R1:a"));
        assert!(text.contains("LED1     on"));
    }

    #[test]
    fn test_unsolved_report() {
        let model = CircuitModel::new();
        let mut out = Vec::new();
        write_text(&mut out, &model, &solve(&model)).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "status: unsolved (no complete network)\n");
    }

    #[test]
    fn test_json_report() {
        let model = led_circuit();
        let mut out = Vec::new();
        write_json(&mut out, &solve(&model)).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["led_states"]["LED1"], "on");
        assert!(value["element_currents"]["R1"].as_f64().unwrap() > 0.0);
        assert!(value["node_voltages"]["0"].is_number());
    }
}
