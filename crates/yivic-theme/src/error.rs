//! Error types for theme resolution.
//!
//! Copyright (c) 2025 Yivic
//!
//! Asset and path resolution never fails; these errors cover the few places
//! where rendering cannot proceed at all.

use thiserror::Error;
use yivic_config::ConfigError;
use yivic_runtime::RuntimeError;

#[derive(Debug, Error)]
pub enum ThemeError {
    /// The application was created without a base path.
    #[error("Theme application basePath is required.")]
    MissingBasePath,

    /// The theme context was requested before the application was bootstrapped.
    #[error("Theme application is not bootstrapped. Call bootstrap() first.")]
    NotBootstrapped,

    /// No view file matched in any search path.
    #[error("View [{name}] not found.{}", format_searched(.searched))]
    ViewNotFound { name: String, searched: Vec<String> },

    /// The view name is empty or tries to leave the search paths.
    #[error("Invalid view name: {0:?}")]
    InvalidViewName(String),

    /// The templating engine failed to render a view.
    #[error("Render error: {0}")]
    Render(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

fn format_searched(searched: &[String]) -> String {
    if searched.is_empty() {
        " No view paths are configured.".to_string()
    } else {
        format!(" Searched: {}", searched.join(", "))
    }
}

pub type Result<T> = std::result::Result<T, ThemeError>;
