use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use super::ScenarioResult;

#[allow(clippy::cast_precision_loss)]
fn success_rate(results: &[ScenarioResult]) -> f64 {
    let passed = results.iter().filter(|r| r.passed).count();
    (passed as f64 / results.len().max(1) as f64) * 100.0
}

/// # Errors
///
/// Returns an error if the writer fails.
pub fn generate_console_report(
    writer: &mut dyn Write,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(
        writer,
        "{}",
        "📊 Logic Test Results Summary".bright_cyan().bold()
    )?;
    writeln!(writer, "{}", "==============================".cyan())?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();
    let failed_tests = total_tests - passed_tests;

    writeln!(writer, "Total scenario runs: {total_tests}")?;
    writeln!(writer, "Passed: {}", passed_tests.to_string().green())?;
    writeln!(writer, "Failed: {}", failed_tests.to_string().red())?;
    writeln!(writer, "Success rate: {:.1}%", success_rate(results))?;
    writeln!(writer, "Total time: {total_duration:?}")?;
    writeln!(writer)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };

        writeln!(
            writer,
            "{} {} (seed {})",
            status,
            result.scenario_name.bold(),
            result.seed
        )?;
        writeln!(
            writer,
            "   Iterations: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(
            writer,
            "   Changes: {} applied, {} rejected, {} invalidations",
            result.changes_applied, result.changes_rejected, result.invalidations
        )?;
        writeln!(writer, "   Average time: {:?}", result.average_duration)?;

        if !result.failures.is_empty() {
            writeln!(writer, "   Failures:")?;
            for failure in &result.failures {
                writeln!(writer, "     • {}", failure.red())?;
            }
        }
        writeln!(writer)?;
    }

    let fastest = results.iter().min_by_key(|r| r.average_duration);
    let slowest = results.iter().max_by_key(|r| r.average_duration);
    if let (Some(fastest), Some(slowest)) = (fastest, slowest) {
        writeln!(
            writer,
            "{}",
            "⚡ Performance Summary".bright_yellow().bold()
        )?;
        writeln!(writer, "{}", "=====================".yellow())?;
        writeln!(
            writer,
            "Fastest: {} ({:?})",
            fastest.scenario_name.green(),
            fastest.average_duration
        )?;
        writeln!(
            writer,
            "Slowest: {} ({:?})",
            slowest.scenario_name.yellow(),
            slowest.average_duration
        )?;
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if serialization or the writer fails.
pub fn generate_json_report(writer: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(results)?;
    writeln!(writer, "{json_output}")?;
    Ok(())
}

/// # Errors
///
/// Returns an error if the writer fails.
pub fn generate_markdown_report(writer: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    writeln!(writer, "# Charforge Logic Test Results\n")?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();

    writeln!(writer, "## Summary\n")?;
    writeln!(writer, "- **Total scenario runs**: {total_tests}")?;
    writeln!(writer, "- **Passed**: {passed_tests}")?;
    writeln!(writer, "- **Failed**: {}", total_tests - passed_tests)?;
    writeln!(
        writer,
        "- **Success rate**: {:.1}%\n",
        success_rate(results)
    )?;

    writeln!(writer, "## Detailed Results\n")?;
    writeln!(
        writer,
        "| Scenario | Seed | Iterations | Applied | Rejected | Invalidations |"
    )?;
    writeln!(writer, "|---|---|---|---|---|---|")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(
            writer,
            "| {} {} | {} | {}/{} | {} | {} | {} |",
            status,
            result.scenario_name,
            result.seed,
            result.successful_iterations,
            result.iterations_run,
            result.changes_applied,
            result.changes_rejected,
            result.invalidations
        )?;
    }

    let failed: Vec<_> = results.iter().filter(|r| !r.failures.is_empty()).collect();
    if !failed.is_empty() {
        writeln!(writer, "\n## Failures\n")?;
        for result in failed {
            writeln!(
                writer,
                "### {} (seed {})\n",
                result.scenario_name,
                result.seed
            )?;
            for failure in &result.failures {
                writeln!(writer, "- {failure}")?;
            }
            writeln!(writer)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: "Class Gating".to_string(),
            seed: 7,
            passed,
            iterations_run: 2,
            successful_iterations: if passed { 2 } else { 1 },
            changes_applied: 6,
            changes_rejected: 0,
            invalidations: 2,
            failures: if passed {
                Vec::new()
            } else {
                vec!["class should be cleared".to_string()]
            },
            average_duration: Duration::from_micros(40),
            performance_data: vec![Duration::from_micros(40)],
        }
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn console_report_lists_failures() {
        let out = render(|w| generate_console_report(w, &[result(false)], Duration::ZERO));
        assert!(out.contains("Class Gating"));
        assert!(out.contains("class should be cleared"));
        assert!(out.contains("Performance Summary"));
    }

    #[test]
    fn console_report_handles_empty_results() {
        let out = render(|w| generate_console_report(w, &[], Duration::ZERO));
        assert!(out.contains("Success rate: 0.0%"));
        assert!(!out.contains("Performance Summary"));
    }

    #[test]
    fn json_report_is_parseable() {
        let out = render(|w| generate_json_report(w, &[result(true)]));
        let parsed: Vec<ScenarioResult> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0].seed, 7);
    }

    #[test]
    fn markdown_report_has_table_and_failures() {
        let out = render(|w| generate_markdown_report(w, &[result(true), result(false)]));
        assert!(out.contains("# Charforge Logic Test Results"));
        assert!(out.contains("| ✅ Class Gating | 7 | 2/2 | 6 | 0 | 2 |"));
        assert!(out.contains("## Failures"));
    }
}
