//! Sequential orchestration of the stages over one [`WorkflowState`].

use super::stages::{AnalyzeStage, FormatStage, SearchStage, Stage, SummarizeStage, ValidateStage};
use super::state::{PipelinePhase, WorkflowState};
use crate::brain::LlmProvider;
use crate::research::document::SearchProvider;
use crate::research::report::ReportRenderer;
use std::sync::Arc;
use tracing::{info, warn};

/// Observer for pipeline progress.
pub trait PipelineCallback: Send + Sync {
    /// Called on entering `phase`, including the terminal phase.
    fn on_phase_change(&self, phase: PipelinePhase, progress: f32);
    /// Called when a stage failed and its degraded output was used instead.
    fn on_stage_degraded(&self, phase: PipelinePhase, error: &str);
}

/// Callback that ignores every event.
pub struct NoOpCallback;

impl PipelineCallback for NoOpCallback {
    fn on_phase_change(&self, _phase: PipelinePhase, _progress: f32) {}
    fn on_stage_degraded(&self, _phase: PipelinePhase, _error: &str) {}
}

/// Runs stages one after another, merging each stage's output into the state.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    callback: Arc<dyn PipelineCallback>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self {
            stages,
            callback: Arc::new(NoOpCallback),
        }
    }

    /// search → analyze → validate → summarize → format.
    pub fn standard(
        search_tiers: Vec<Arc<dyn SearchProvider>>,
        max_results: usize,
        llm: Arc<dyn LlmProvider>,
        renderer: Arc<dyn ReportRenderer>,
    ) -> Self {
        Self::new(vec![
            Box::new(SearchStage::new(search_tiers, max_results)),
            Box::new(AnalyzeStage),
            Box::new(ValidateStage),
            Box::new(SummarizeStage::new(llm)),
            Box::new(FormatStage::new(renderer)),
        ])
    }

    pub fn with_callback(mut self, callback: Arc<dyn PipelineCallback>) -> Self {
        self.callback = callback;
        self
    }

    pub fn phases(&self) -> Vec<PipelinePhase> {
        self.stages.iter().map(|s| s.phase()).collect()
    }

    /// Run every stage for `topic`.
    ///
    /// Always returns a terminal state: a stage error is logged and replaced
    /// by that stage's recovery output.
    pub async fn run(&self, topic: &str) -> WorkflowState {
        let mut state = WorkflowState::new(topic);
        info!(run_id = %state.run_id, topic, "Starting research pipeline");

        for stage in &self.stages {
            let phase = stage.phase();
            self.enter(&mut state, phase);

            let update = match stage.run(&state).await {
                Ok(update) => update,
                Err(e) => {
                    let message = e.to_string();
                    warn!(phase = %phase, error = %message, "Stage failed, using degraded output");
                    state.degraded_stages.push(phase);
                    self.callback.on_stage_degraded(phase, &message);
                    stage.recover(&state, &e)
                }
            };
            state.apply(update);
        }

        self.enter(&mut state, PipelinePhase::Terminal);
        info!(
            run_id = %state.run_id,
            documents = state.documents().len(),
            degraded = state.degraded_stages.len(),
            report = ?state.report_path,
            "Research pipeline finished"
        );
        state
    }

    fn enter(&self, state: &mut WorkflowState, phase: PipelinePhase) {
        state.enter(phase);
        self.callback.on_phase_change(phase, phase.progress());
    }
}
