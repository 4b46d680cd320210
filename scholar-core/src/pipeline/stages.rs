//! The five pipeline stages.
//!
//! Each stage reads the accumulated [`WorkflowState`] and returns only the
//! fields it produces. `recover` supplies the degraded output used when `run`
//! fails, so a failing stage never stops the pipeline.

use super::state::{PipelinePhase, StateUpdate, WorkflowState};
use crate::brain::LlmProvider;
use crate::error::{RenderError, Result, ScholarError};
use crate::research::analysis::{AnalysisResult, analyze_documents};
use crate::research::document::{Document, SearchProvider};
use crate::research::prompt::{build_summary_prompt, summary_placeholder};
use crate::research::report::{FormattedReport, ReportDocument, ReportRenderer};
use crate::research::validation::{validate, validate_counts};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

/// One step of the pipeline.
#[async_trait]
pub trait Stage: Send + Sync {
    fn phase(&self) -> PipelinePhase;

    async fn run(&self, state: &WorkflowState) -> Result<StateUpdate>;

    /// Degraded output substituted when `run` returns `error`.
    fn recover(&self, state: &WorkflowState, error: &ScholarError) -> StateUpdate;
}

/// Retrieves documents through an ordered list of search tiers.
///
/// Tiers are tried in order; the first one returning at least one document
/// wins. When every tier errors or comes back empty the stage yields a single
/// placeholder document.
pub struct SearchStage {
    tiers: Vec<Arc<dyn SearchProvider>>,
    max_results: usize,
}

impl SearchStage {
    pub fn new(tiers: Vec<Arc<dyn SearchProvider>>, max_results: usize) -> Self {
        Self { tiers, max_results }
    }

    fn fallback(topic: &str) -> Vec<Document> {
        if topic.trim().is_empty() {
            Vec::new()
        } else {
            vec![Document::placeholder(topic)]
        }
    }
}

#[async_trait]
impl Stage for SearchStage {
    fn phase(&self) -> PipelinePhase {
        PipelinePhase::Search
    }

    async fn run(&self, state: &WorkflowState) -> Result<StateUpdate> {
        let topic = state.topic.trim();
        if topic.is_empty() {
            warn!("Empty topic, skipping search");
            return Ok(StateUpdate::documents(Vec::new()));
        }

        for tier in &self.tiers {
            match tier.search(topic, self.max_results).await {
                Ok(mut documents) => {
                    documents.truncate(self.max_results);
                    if documents.is_empty() {
                        warn!(provider = tier.name(), "Search returned no results");
                        continue;
                    }
                    info!(
                        provider = tier.name(),
                        documents = documents.len(),
                        "Search complete"
                    );
                    return Ok(StateUpdate::documents(documents));
                }
                Err(e) => warn!(provider = tier.name(), error = %e, "Search tier failed"),
            }
        }

        warn!(topic, "All search tiers failed, using placeholder document");
        Ok(StateUpdate::documents(Self::fallback(topic)))
    }

    fn recover(&self, state: &WorkflowState, _error: &ScholarError) -> StateUpdate {
        StateUpdate::documents(Self::fallback(&state.topic))
    }
}

/// Runs the lexical analyzer over the retrieved documents.
pub struct AnalyzeStage;

#[async_trait]
impl Stage for AnalyzeStage {
    fn phase(&self) -> PipelinePhase {
        PipelinePhase::Analyze
    }

    async fn run(&self, state: &WorkflowState) -> Result<StateUpdate> {
        Ok(StateUpdate::analysis(analyze_documents(
            state.documents(),
            &state.topic,
        )))
    }

    fn recover(&self, _state: &WorkflowState, _error: &ScholarError) -> StateUpdate {
        StateUpdate::analysis(AnalysisResult::no_content())
    }
}

/// Checks source and theme counts against the sufficiency thresholds.
pub struct ValidateStage;

#[async_trait]
impl Stage for ValidateStage {
    fn phase(&self) -> PipelinePhase {
        PipelinePhase::Validate
    }

    async fn run(&self, state: &WorkflowState) -> Result<StateUpdate> {
        let analysis = state
            .analysis
            .clone()
            .unwrap_or_else(AnalysisResult::no_content);
        Ok(StateUpdate::validation(validate(
            &analysis,
            state.documents(),
        )))
    }

    fn recover(&self, state: &WorkflowState, _error: &ScholarError) -> StateUpdate {
        StateUpdate::validation(validate_counts(state.documents().len(), 0))
    }
}

/// Asks the LLM for the structured narrative.
pub struct SummarizeStage {
    llm: Arc<dyn LlmProvider>,
}

impl SummarizeStage {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Stage for SummarizeStage {
    fn phase(&self) -> PipelinePhase {
        PipelinePhase::Summarize
    }

    async fn run(&self, state: &WorkflowState) -> Result<StateUpdate> {
        let prompt = build_summary_prompt(&state.topic, state.documents());
        let summary = self.llm.generate(&prompt).await?;
        info!(
            model = self.llm.model_name(),
            chars = summary.chars().count(),
            "Generated summary"
        );
        Ok(StateUpdate::summary(summary))
    }

    fn recover(&self, state: &WorkflowState, _error: &ScholarError) -> StateUpdate {
        StateUpdate::summary(summary_placeholder(&state.topic))
    }
}

/// Structures the narrative and hands the report to a renderer.
pub struct FormatStage {
    renderer: Arc<dyn ReportRenderer>,
}

impl FormatStage {
    pub fn new(renderer: Arc<dyn ReportRenderer>) -> Self {
        Self { renderer }
    }
}

#[async_trait]
impl Stage for FormatStage {
    fn phase(&self) -> PipelinePhase {
        PipelinePhase::Format
    }

    async fn run(&self, state: &WorkflowState) -> Result<StateUpdate> {
        let documents = state.documents().to_vec();
        let analysis = state
            .analysis
            .clone()
            .unwrap_or_else(AnalysisResult::no_content);
        let validation = state
            .validation
            .clone()
            .unwrap_or_else(|| validate_counts(documents.len(), analysis.themes.len()));
        let summary = state.summary();

        let report = FormattedReport::new(
            &state.topic,
            summary,
            &analysis,
            &validation,
            documents.len(),
        );
        let document = ReportDocument::new(&state.topic, summary, analysis, validation, documents);
        info!(
            renderer = self.renderer.name(),
            sections = document.sections.len(),
            "Rendering report"
        );

        let renderer = Arc::clone(&self.renderer);
        let path = tokio::task::spawn_blocking(move || renderer.render(&document))
            .await
            .map_err(|e| RenderError::Layout {
                message: format!("renderer task failed: {e}"),
            })??;

        info!(path = %path.display(), "Report written");
        Ok(StateUpdate::report(report, Some(path)))
    }

    fn recover(&self, state: &WorkflowState, error: &ScholarError) -> StateUpdate {
        let cause = match error {
            ScholarError::Render(inner) => inner.to_string(),
            other => other.to_string(),
        };
        error!(topic = %state.topic, error = %cause, "Report formatting failed, returning degraded report");
        StateUpdate::report(
            FormattedReport::degraded(
                &state.topic,
                state.summary(),
                state.themes(),
                state.documents().len(),
                &cause,
            ),
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::MockLlmProvider;
    use crate::error::SearchError;
    use crate::research::validation::DocumentQuality;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct FixedSearch {
        name: &'static str,
        outcome: std::result::Result<usize, ()>,
        calls: Mutex<usize>,
    }

    impl FixedSearch {
        fn returning(name: &'static str, n: usize) -> Arc<Self> {
            Arc::new(Self { name, outcome: Ok(n), calls: Mutex::new(0) })
        }

        fn failing(name: &'static str) -> Arc<Self> {
            Arc::new(Self { name, outcome: Err(()), calls: Mutex::new(0) })
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    fn tier(search: &Arc<FixedSearch>) -> Arc<dyn SearchProvider> {
        search.clone()
    }

    #[async_trait]
    impl SearchProvider for FixedSearch {
        fn name(&self) -> &str {
            self.name
        }

        async fn search(
            &self,
            query: &str,
            _max_results: usize,
        ) -> std::result::Result<Vec<Document>, SearchError> {
            *self.calls.lock().unwrap() += 1;
            match self.outcome {
                Ok(n) => Ok((0..n)
                    .map(|i| {
                        Document::from_search_hit(
                            query,
                            Some(format!("{} {i}", self.name).as_str()),
                            &format!("https://{}.org/{i}", self.name),
                            "content about memory safety and memory models",
                        )
                    })
                    .collect()),
                Err(()) => Err(SearchError::Request {
                    provider: self.name.to_string(),
                    message: "unreachable".into(),
                }),
            }
        }
    }

    struct PathRenderer;

    impl ReportRenderer for PathRenderer {
        fn name(&self) -> &str {
            "test"
        }

        fn render(&self, report: &ReportDocument) -> std::result::Result<PathBuf, RenderError> {
            Ok(PathBuf::from(format!("/tmp/{}.txt", report.topic)))
        }
    }

    #[tokio::test]
    async fn test_search_first_tier_wins() {
        let primary = FixedSearch::returning("primary", 3);
        let secondary = FixedSearch::returning("secondary", 2);
        let stage = SearchStage::new(vec![tier(&primary), tier(&secondary)], 5);

        let update = stage.run(&WorkflowState::new("rust")).await.unwrap();
        let docs = update.documents.unwrap();
        assert_eq!(docs.len(), 3);
        assert!(docs[0].title.starts_with("primary"));
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_search_falls_through_empty_and_failing_tiers() {
        let failing = FixedSearch::failing("primary");
        let empty = FixedSearch::returning("secondary", 0);
        let last = FixedSearch::returning("tertiary", 2);
        let stage = SearchStage::new(vec![tier(&failing), tier(&empty), tier(&last)], 5);

        let docs = stage.run(&WorkflowState::new("rust")).await.unwrap().documents.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(failing.calls(), 1);
        assert_eq!(empty.calls(), 1);
    }

    #[tokio::test]
    async fn test_search_truncates_to_max_results() {
        let stage = SearchStage::new(vec![tier(&FixedSearch::returning("big", 9))], 4);
        let docs = stage.run(&WorkflowState::new("rust")).await.unwrap().documents.unwrap();
        assert_eq!(docs.len(), 4);
    }

    #[tokio::test]
    async fn test_zero_max_results_falls_back_to_placeholder() {
        let primary = FixedSearch::returning("primary", 3);
        let stage = SearchStage::new(vec![tier(&primary)], 0);
        let docs = stage.run(&WorkflowState::new("rust")).await.unwrap().documents.unwrap();
        assert_eq!(primary.calls(), 1);
        assert_eq!(docs.len(), 1);
        assert!(docs[0].is_placeholder());
    }

    #[tokio::test]
    async fn test_search_placeholder_when_all_tiers_fail() {
        let stage = SearchStage::new(
            vec![tier(&FixedSearch::failing("a")), tier(&FixedSearch::failing("b"))],
            5,
        );
        let docs = stage.run(&WorkflowState::new("rust")).await.unwrap().documents.unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].is_placeholder());
    }

    #[tokio::test]
    async fn test_blank_topic_contacts_no_provider() {
        let primary = FixedSearch::returning("primary", 3);
        let stage = SearchStage::new(vec![tier(&primary)], 5);
        let docs = stage.run(&WorkflowState::new("   ")).await.unwrap().documents.unwrap();
        assert!(docs.is_empty());
        assert_eq!(primary.calls(), 0);
    }

    #[tokio::test]
    async fn test_analyze_and_validate() {
        let mut state = WorkflowState::new("rust");
        state.apply(StateUpdate::documents(vec![Document::placeholder("rust"); 3]));

        let analysis = AnalyzeStage.run(&state).await.unwrap().analysis.unwrap();
        assert_eq!(analysis.num_sources, 3);
        state.apply(StateUpdate::analysis(analysis));

        let validation = ValidateStage.run(&state).await.unwrap().validation.unwrap();
        assert!(validation.has_sufficient_sources);
        assert_eq!(validation.document_quality, DocumentQuality::Good);
    }

    #[tokio::test]
    async fn test_summarize_uses_llm_text() {
        let stage = SummarizeStage::new(Arc::new(MockLlmProvider::with_response("  # Introduction\nbody  ")));
        let update = stage.run(&WorkflowState::new("rust")).await.unwrap();
        assert_eq!(update.summary.as_deref(), Some("# Introduction\nbody"));
    }

    #[tokio::test]
    async fn test_summarize_failure_recovers_with_placeholder() {
        let stage = SummarizeStage::new(Arc::new(MockLlmProvider::failing()));
        let state = WorkflowState::new("rust");
        let err = stage.run(&state).await.unwrap_err();
        assert!(matches!(err, ScholarError::Llm(_)));
        let update = stage.recover(&state, &err);
        assert_eq!(update.summary, Some(summary_placeholder("rust")));
    }

    #[tokio::test]
    async fn test_format_renders_in_blocking_task() {
        let stage = FormatStage::new(Arc::new(PathRenderer));
        let mut state = WorkflowState::new("rust");
        state.apply(StateUpdate::summary("# Introduction\ntext"));

        let update = stage.run(&state).await.unwrap();
        assert_eq!(update.report_path, Some(PathBuf::from("/tmp/rust.txt")));
        let report = update.report.unwrap();
        assert_eq!(report.title, "Research Report: rust");
        assert_eq!(report.summary_length, 19);
        assert!(report.error.is_none());
    }

    #[test]
    fn test_format_recover_reports_inner_cause() {
        let stage = FormatStage::new(Arc::new(PathRenderer));
        let state = WorkflowState::new("rust");
        let err = ScholarError::Render(RenderError::Layout { message: "boom".into() });
        let update = stage.recover(&state, &err);
        assert!(update.report_path.is_none());
        assert_eq!(
            update.report.unwrap().error.as_deref(),
            Some("PDF generation failed: Layout failed: boom")
        );
    }
}
