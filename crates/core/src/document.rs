// SPDX-License-Identifier: MIT

//! Flow document loading (JSON or YAML; ambient concern, see
//! SPEC_FULL.md §3). No schema validation is performed here — that is
//! an explicit non-goal (spec §1) — only `serde`'s structural checks,
//! the same division of labor as `oj_runbook::parser::Format`.

use crate::flow::Flow;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Parse a flow document in the given format.
pub fn parse_flow(content: &str, format: DocumentFormat) -> Result<Flow, DocumentError> {
    match format {
        DocumentFormat::Json => Ok(serde_json::from_str(content)?),
        DocumentFormat::Yaml => Ok(serde_yaml::from_str(content)?),
    }
}
