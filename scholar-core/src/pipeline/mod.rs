//! The research pipeline: a fixed, linear sequence of stages threading one
//! [`WorkflowState`] from topic to report.

pub mod orchestrator;
pub mod stages;
pub mod state;

pub use orchestrator::{NoOpCallback, Pipeline, PipelineCallback};
pub use stages::{AnalyzeStage, FormatStage, SearchStage, Stage, SummarizeStage, ValidateStage};
pub use state::{PipelinePhase, StateUpdate, WorkflowState};
