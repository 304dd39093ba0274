use anyhow::{Context, Result};
use log::debug;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use charforge_core::{
    Catalog, ChangeReport, CharacterSession, FieldChange, Selection, check_invariants,
};

use super::walk::ChangeGenerator;

const DEFAULT_CATALOG: &str = include_str!("../../../charforge-core/tests/data/catalog.json");

/// Catalog shared by every scenario run.
#[derive(Debug, Clone)]
pub struct TesterAssets {
    catalog: Arc<Catalog>,
    generator: ChangeGenerator,
}

impl TesterAssets {
    /// Bundled demo catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled catalog fails validation.
    pub fn load_default() -> Result<Self> {
        let catalog =
            Catalog::from_json(DEFAULT_CATALOG).context("bundled catalog is invalid")?;
        Ok(Self::from_catalog(catalog))
    }

    /// Catalog read from a JSON file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not hold a valid catalog.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let catalog = Catalog::from_json(&json)
            .with_context(|| format!("failed to load catalog from {}", path.display()))?;
        Ok(Self::from_catalog(catalog))
    }

    #[must_use]
    pub fn from_catalog(catalog: Catalog) -> Self {
        let generator = ChangeGenerator::new(&catalog);
        Self {
            catalog: Arc::new(catalog),
            generator,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

/// Assertion hook run after a build completes.
type BuildExpectationFn = Arc<dyn Fn(&BuildSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct BuildExpectation(BuildExpectationFn);

impl std::fmt::Debug for BuildExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildExpectation").finish()
    }
}

impl BuildExpectation {
    #[must_use]
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&BuildSummary) -> Result<()> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// # Errors
    ///
    /// Returns the expectation's failure.
    pub fn evaluate(&self, summary: &BuildSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for BuildExpectation
where
    F: Fn(&BuildSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

/// Scripted changes, optionally followed by a seeded random walk.
#[derive(Debug, Clone, Default)]
pub struct BuildPlan {
    pub steps: Vec<FieldChange>,
    pub random_steps: usize,
    pub expectations: Vec<BuildExpectation>,
}

impl BuildPlan {
    #[must_use]
    pub fn new(steps: Vec<FieldChange>) -> Self {
        Self {
            steps,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_random_steps(mut self, random_steps: usize) -> Self {
        self.random_steps = random_steps;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<BuildExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Outcome of one plan run.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub seed: u64,
    pub selection: Selection,
    pub reports: Vec<ChangeReport>,
    /// First invariant violation, with the step that caused it.
    pub violation: Option<String>,
}

impl BuildSummary {
    #[must_use]
    pub fn applied(&self) -> usize {
        self.reports.iter().filter(|report| report.applied).count()
    }

    #[must_use]
    pub fn rejected(&self) -> usize {
        self.reports.len() - self.applied()
    }

    #[must_use]
    pub fn invalidations(&self) -> usize {
        self.reports
            .iter()
            .map(|report| report.invalidated.len())
            .sum()
    }

    /// Report for the scripted step at `index`.
    #[must_use]
    pub fn report(&self, index: usize) -> Option<&ChangeReport> {
        self.reports.get(index)
    }
}

#[derive(Debug, Clone)]
pub struct BuildTester {
    verbose: bool,
    assets: Arc<TesterAssets>,
}

impl BuildTester {
    pub const fn new(assets: Arc<TesterAssets>, verbose: bool) -> Self {
        Self { verbose, assets }
    }

    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    /// Drive a fresh session through the plan, checking invariants after
    /// every change.
    pub fn run_plan(&self, plan: &BuildPlan, seed: u64) -> BuildSummary {
        let mut session = CharacterSession::new(Arc::clone(&self.assets.catalog));
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut reports = Vec::with_capacity(plan.steps.len() + plan.random_steps);
        let mut violation = None;

        let random = std::iter::repeat_with(|| self.assets.generator.next_change(&mut rng))
            .take(plan.random_steps);
        for (step, change) in plan.steps.iter().cloned().chain(random).enumerate() {
            let label = format!("{change:?}");
            let report = session.apply(change);
            if self.verbose {
                let status = if report.applied {
                    "applied"
                } else {
                    "rejected"
                };
                println!("    step {step}: {label} {status} {:?}", report.invalidated);
            }
            reports.push(report);
            if let Err(err) = check_invariants(session.selection(), session.catalog()) {
                debug!("seed {seed} step {step} broke invariants: {err}");
                violation = Some(format!("step {step} ({label}): {err}"));
                break;
            }
        }

        BuildSummary {
            seed,
            selection: session.into_selection(),
            reports,
            violation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tester() -> BuildTester {
        BuildTester::new(Arc::new(TesterAssets::load_default().unwrap()), false)
    }

    #[test]
    fn default_assets_load_bundled_catalog() {
        let assets = TesterAssets::load_default().unwrap();
        assert!(!assets.catalog().is_empty());
    }

    #[test]
    fn from_path_reports_missing_file() {
        let err = TesterAssets::from_path(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read"));
    }

    #[test]
    fn scripted_steps_are_reported_in_order() {
        let plan = BuildPlan::new(vec![
            FieldChange::SetLevel(5),
            FieldChange::SetClass(Some("warrior".to_string())),
            FieldChange::SetClass(Some("unknown".to_string())),
        ]);
        let summary = tester().run_plan(&plan, 1);
        assert_eq!(summary.reports.len(), 3);
        assert_eq!(summary.applied(), 2);
        assert_eq!(summary.rejected(), 1);
        assert!(summary.violation.is_none());
        assert_eq!(summary.selection.class_id.as_deref(), Some("warrior"));
    }

    #[test]
    fn random_walk_is_reproducible() {
        let plan = BuildPlan::default().with_random_steps(200);
        let tester = tester();
        let first = tester.run_plan(&plan, 77);
        let second = tester.run_plan(&plan, 77);
        assert_eq!(first.selection, second.selection);
        assert_eq!(first.reports, second.reports);
        assert!(first.violation.is_none(), "{:?}", first.violation);
    }
}
