pub mod analysis;
pub mod execution;

pub use analysis::{project_duplicates, AnalysisCoordinator, AnalysisReport, AnalysisVerdict};
pub use execution::{
    derive_target_id, ExecutionOrchestrator, ExecutionReport, COMPLETION_LINE,
};
