//! # Generator Configuration
//!
//! Document defaults, per-project overrides and resolver/classifier knobs.
//! Loaded from YAML or JSON; every field has a default.

use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Document-level settings that a project may override.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectOverrides {
    /// Document title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Document description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// API version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Host (`api.example.com:8080`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Base path (`/v1`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    /// Transfer schemes (`http`, `https`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemes: Option<Vec<String>>,
}

/// The fully resolved document settings for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSettings {
    /// Document title.
    pub title: String,
    /// Document description.
    pub description: Option<String>,
    /// API version.
    pub version: String,
    /// Host.
    pub host: String,
    /// Base path.
    pub base_path: String,
    /// Transfer schemes.
    pub schemes: Vec<String>,
}

/// Top-level generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Default document title; the project name when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Default document description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default API version.
    pub version: String,
    /// Default host.
    pub host: String,
    /// Default base path.
    pub base_path: String,
    /// Default transfer schemes.
    pub schemes: Vec<String>,
    /// Overrides keyed by project name.
    pub projects: IndexMap<String, ProjectOverrides>,
    /// Ancestors whose qualified name starts with one of these are not flattened.
    pub platform_prefixes: Vec<String>,
    /// Parameter types supplied by the framework rather than the caller.
    pub injected_types: Vec<String>,
    /// Recursion limit of the example materializer.
    pub example_depth: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            version: "1.0".to_string(),
            host: "localhost".to_string(),
            base_path: "/".to_string(),
            schemes: vec!["http".to_string()],
            projects: IndexMap::new(),
            platform_prefixes: vec!["java.lang.".to_string(), "java.util.".to_string()],
            injected_types: [
                "HttpServletRequest",
                "HttpServletResponse",
                "HttpSession",
                "ServerHttpRequest",
                "ServerHttpResponse",
                "ServerWebExchange",
                "BindingResult",
                "Model",
                "ModelMap",
                "Principal",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            example_depth: crate::example::DEFAULT_DEPTH,
        }
    }
}

impl GeneratorConfig {
    /// Parses a configuration from YAML (or JSON).
    pub fn from_yaml(content: &str) -> AppResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| AppError::General(format!("Invalid generator config: {}", e)))
    }

    /// Loads a configuration file.
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Defaults merged with the overrides of `project`.
    pub fn settings_for(&self, project: &str) -> DocumentSettings {
        let o = self.projects.get(project).cloned().unwrap_or_default();
        DocumentSettings {
            title: o
                .title
                .or_else(|| self.title.clone())
                .unwrap_or_else(|| project.to_string()),
            description: o.description.or_else(|| self.description.clone()),
            version: o.version.unwrap_or_else(|| self.version.clone()),
            host: o.host.unwrap_or_else(|| self.host.clone()),
            base_path: o.base_path.unwrap_or_else(|| self.base_path.clone()),
            schemes: o.schemes.unwrap_or_else(|| self.schemes.clone()),
        }
    }

    /// Whether a parameter type is injected by the framework.
    pub fn is_injected(&self, type_name: &str) -> bool {
        let simple = crate::frontend::type_ref::simple_name(type_name);
        self.injected_types
            .iter()
            .any(|t| t == type_name || t == simple)
    }
}
