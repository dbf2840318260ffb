//! Error types for the Lanes CLI.

use std::{io, path::PathBuf};

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use lanes::LanesError;

/// Failures of a CLI run, rendered through miette.
#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("I/O error: {0}")]
    #[diagnostic(code(lanes::io))]
    Io(#[from] io::Error),

    #[error("Missing configuration file: {}", .0.display())]
    #[diagnostic(
        code(lanes::config::missing),
        help("check the path passed with --config")
    )]
    MissingConfig(PathBuf),

    #[error("Invalid {what}: {message}")]
    #[diagnostic(code(lanes::toml))]
    Toml {
        what: &'static str,
        message: String,
        #[source_code]
        src: String,
        #[label("here")]
        span: Option<SourceSpan>,
    },

    #[error("Invalid scenario: {0}")]
    #[diagnostic(code(lanes::scenario))]
    Scenario(String),

    #[error("Layout error: {0}")]
    #[diagnostic(code(lanes::layout))]
    Layout(#[from] LanesError),
}

impl CliError {
    /// Wraps a TOML error, keeping the source so the report can point at it.
    pub fn toml(what: &'static str, src: &str, err: &toml::de::Error) -> Self {
        Self::Toml {
            what,
            message: err.message().to_string(),
            src: src.to_string(),
            span: err.span().map(SourceSpan::from),
        }
    }
}
