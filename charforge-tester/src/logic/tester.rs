use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::logic::build_tester::{BuildPlan, BuildSummary, BuildTester};
use crate::scenario::TestScenario;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub changes_applied: usize,
    pub changes_rejected: usize,
    pub invalidations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

#[derive(Debug, Default)]
struct IterationTally {
    successes: usize,
    applied: usize,
    rejected: usize,
    invalidations: usize,
    failures: Vec<String>,
    performance_data: Vec<Duration>,
}

pub struct LogicTester {
    tester: BuildTester,
}

impl LogicTester {
    pub const fn new(tester: BuildTester) -> Self {
        Self { tester }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for &seed in seeds {
            if self.tester.verbose() {
                println!(
                    "🧪 Testing scenario: {} (seed: {})",
                    scenario.name.bright_white(),
                    seed
                );
            }

            results.push(self.run_single_scenario(scenario, seed, iterations));
        }

        results
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let tally = self.run_plan_iterations(&scenario.plan, seed, iterations);

        let average_duration = if tally.performance_data.is_empty() {
            Duration::ZERO
        } else {
            tally.performance_data.iter().sum::<Duration>()
                / u32::try_from(tally.performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            seed,
            passed: tally.failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: tally.successes,
            changes_applied: tally.applied,
            changes_rejected: tally.rejected,
            invalidations: tally.invalidations,
            failures: tally.failures,
            average_duration,
            performance_data: tally.performance_data,
        }
    }

    fn run_plan_iterations(
        &self,
        plan: &BuildPlan,
        seed: u64,
        iterations: usize,
    ) -> IterationTally {
        let mut tally = IterationTally::default();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            let summary = self.tester.run_plan(plan, iteration_seed);
            tally.applied += summary.applied();
            tally.rejected += summary.rejected();
            tally.invalidations += summary.invalidations();

            if let Some(err) = evaluate_expectations(plan, &summary) {
                tally.failures.push(format!(
                    "Iteration {} (seed {}, {} changes, {} rejected): {}",
                    i + 1,
                    summary.seed,
                    summary.reports.len(),
                    summary.rejected(),
                    err
                ));

                if self.tester.verbose() {
                    println!(
                        "  ❌ Iteration {}/{} failed: {}",
                        i + 1,
                        iterations,
                        err.red()
                    );
                }
            } else {
                tally.successes += 1;
                let duration = start_time.elapsed();
                tally.performance_data.push(duration);

                if self.tester.verbose() {
                    println!(
                        "  ✅ Iteration {}/{} passed ({duration:?}) applied:{} invalidations:{}",
                        i + 1,
                        iterations,
                        summary.applied(),
                        summary.invalidations()
                    );
                }
            }
        }

        tally
    }
}

fn evaluate_expectations(plan: &BuildPlan, summary: &BuildSummary) -> Option<String> {
    if let Some(violation) = &summary.violation {
        return Some(format!("invariant violated at {violation}"));
    }
    for expectation in &plan.expectations {
        if let Err(err) = expectation.evaluate(summary) {
            return Some(err.to_string());
        }
    }
    None
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_micros().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let micros = u128::deserialize(deserializer)?;
        Ok(Duration::from_micros(u64::try_from(micros).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let micros: Vec<u128> = durations.iter().map(Duration::as_micros).collect();
        micros.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let micros_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(micros_vec
            .into_iter()
            .map(|m| Duration::from_micros(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::TesterAssets;
    use crate::scenario::get_scenario;
    use std::sync::Arc;

    fn logic_tester() -> LogicTester {
        let assets = Arc::new(TesterAssets::load_default().unwrap());
        LogicTester::new(BuildTester::new(assets, false))
    }

    #[test]
    fn runs_one_result_per_seed() {
        let scenario = get_scenario("class-gating").unwrap();
        let results = logic_tester().run_scenario(&scenario, &[1, 2, 3], 2);
        assert_eq!(results.len(), 3);
        assert!(
            results
                .iter()
                .all(|r| r.passed && r.successful_iterations == 2)
        );
        assert_eq!(results[1].seed, 2);
    }

    #[test]
    fn failing_expectation_is_recorded() {
        let scenario = TestScenario::new(
            "Always Fails",
            BuildPlan::new(vec![]).with_expectation(|_: &BuildSummary| -> anyhow::Result<()> {
                anyhow::bail!("nope")
            }),
        );
        let results = logic_tester().run_scenario(&scenario, &[5], 3);
        assert!(!results[0].passed);
        assert_eq!(results[0].failures.len(), 3);
        assert!(results[0].failures[0].contains("nope"));
    }

    #[test]
    fn result_serializes_durations_as_micros() {
        let result = ScenarioResult {
            scenario_name: "x".to_string(),
            seed: 1,
            passed: true,
            iterations_run: 1,
            successful_iterations: 1,
            changes_applied: 0,
            changes_rejected: 0,
            invalidations: 0,
            failures: Vec::new(),
            average_duration: Duration::from_micros(1500),
            performance_data: vec![Duration::from_micros(1500)],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["average_duration"], 1500);
        let back: ScenarioResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.performance_data, vec![Duration::from_micros(1500)]);
    }
}
