pub mod build_tester;
pub mod reports;
pub mod tester;
pub mod walk;

pub use build_tester::{BuildPlan, BuildSummary, BuildTester, TesterAssets};
pub use tester::*;
