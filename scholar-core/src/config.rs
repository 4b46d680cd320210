//! Configuration system for Scholar.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> overrides.
//! Configuration is loaded from `~/.config/scholar/config.toml` and/or `.scholar/config.toml`
//! in the workspace directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for a research run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScholarConfig {
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub report: ReportConfig,
}

impl ScholarConfig {
    /// Validate every section and collect the warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = self.llm.validate();
        warnings.extend(self.search.validate());
        warnings.extend(self.report.validate());
        warnings
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
    }
}

/// LLM provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name: "gemini" or "openai" (any OpenAI-compatible endpoint).
    pub provider: String,
    /// Model identifier (e.g., "gemini-2.5-flash", "gpt-4o-mini").
    pub model: String,
    /// Environment variable name containing the API key.
    pub api_key_env: String,
    /// Optional base URL override for the API endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Maximum tokens to generate in a response.
    pub max_tokens: usize,
    /// Default temperature for generation.
    pub temperature: f32,
    /// HTTP timeout for a single completion, in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            base_url: None,
            max_tokens: 4096,
            temperature: 0.7,
            timeout_secs: 120,
        }
    }
}

impl LlmConfig {
    /// Validate this LLM config and return any warnings.
    ///
    /// Returns an empty Vec if the config is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !matches!(self.provider.as_str(), "gemini" | "openai") {
            warnings.push(format!(
                "unknown LLM provider '{}'; expected 'gemini' or 'openai'",
                self.provider
            ));
        }
        if self.temperature < 0.0 || self.temperature > 2.0 {
            warnings.push(format!(
                "temperature ({}) is outside the typical range 0.0-2.0",
                self.temperature
            ));
        }
        if self.max_tokens == 0 {
            warnings.push("max_tokens is 0; the model cannot produce a summary".to_string());
        }
        warnings
    }
}

/// Web search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of documents requested from each provider.
    pub max_results: usize,
    /// Environment variable holding the Tavily API key.
    pub tavily_api_key_env: String,
    /// Optional Tavily endpoint override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tavily_base_url: Option<String>,
    /// Whether DuckDuckGo instant answers are tried after Tavily.
    pub enable_duckduckgo: bool,
    /// HTTP timeout for a single search request, in seconds.
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            tavily_api_key_env: "TAVILY_API_KEY".to_string(),
            tavily_base_url: None,
            enable_duckduckgo: true,
            timeout_secs: 15,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.max_results == 0 {
            warnings.push(
                "search.max_results is 0; only the placeholder document will be used".to_string(),
            );
        } else if self.max_results > 20 {
            warnings.push(format!(
                "search.max_results ({}) is above the provider limit of 20",
                self.max_results
            ));
        }
        warnings
    }
}

/// Output format produced by the format stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Pdf,
    Markdown,
}

impl ReportFormat {
    /// File extension used for reports in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Markdown => "md",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Pdf => write!(f, "pdf"),
            ReportFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(ReportFormat::Pdf),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            other => Err(format!("unknown report format '{other}'")),
        }
    }
}

/// Report rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory receiving generated reports.
    pub output_dir: PathBuf,
    /// Output format.
    pub format: ReportFormat,
    /// Font family file prefix (e.g. `LiberationSans` for `LiberationSans-Regular.ttf`).
    pub font_name: String,
    /// Directories searched, in order, for the font family.
    #[serde(default)]
    pub font_dirs: Vec<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("outputs"),
            format: ReportFormat::Pdf,
            font_name: "LiberationSans".to_string(),
            font_dirs: vec![
                PathBuf::from("fonts"),
                PathBuf::from("/usr/share/fonts/truetype/liberation"),
                PathBuf::from("/usr/share/fonts/liberation"),
                PathBuf::from("/Library/Fonts"),
            ],
        }
    }
}

impl ReportConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.format == ReportFormat::Pdf && self.font_dirs.is_empty() {
            warnings.push(
                "report.font_dirs is empty; PDF rendering will fall back to a degraded report"
                    .to_string(),
            );
        }
        warnings
    }
}

/// Availability of one API key referenced by the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyStatus {
    pub service: &'static str,
    pub env_var: String,
    pub present: bool,
}

/// Report which API keys referenced by `config` are present in the environment.
///
/// Missing keys are not fatal: the search stage falls back to the next tier
/// and the summarize stage substitutes a placeholder narrative.
pub fn check_api_keys(config: &ScholarConfig) -> Vec<KeyStatus> {
    let status = |service: &'static str, env_var: &str| KeyStatus {
        service,
        env_var: env_var.to_string(),
        present: std::env::var(env_var).is_ok_and(|v| !v.trim().is_empty()),
    };
    vec![
        status("tavily", &config.search.tavily_api_key_env),
        status("llm", &config.llm.api_key_env),
    ]
}

/// Load configuration with layered merging.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `SCHOLAR_`)
/// 3. Workspace-local config (`.scholar/config.toml`)
/// 4. User config (`~/.config/scholar/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&ScholarConfig>,
) -> Result<ScholarConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(ScholarConfig::default()));

    if let Some(user_config) = user_config_path()
        && user_config.exists()
    {
        figment = figment.merge(Toml::file(&user_config));
    }

    if let Some(ws) = workspace {
        let ws_config = ws.join(".scholar").join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // SCHOLAR_LLM__MODEL, SCHOLAR_SEARCH__MAX_RESULTS, etc.
    figment = figment.merge(Env::prefixed("SCHOLAR_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    figment.extract().map_err(Box::new)
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("dev", "scholar", "scholar")
}

/// Location of the user-level config file, if a home directory is known.
pub fn user_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Directory for rolling log files, if a home directory is known.
pub fn log_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join("logs"))
}
