//! SARIF (Static Analysis Results Interchange Format) output renderer.
//!
//! Converts lint results to SARIF 2.1.0 for code scanning integrations.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use lint_todo_domain::relative_path;
use lint_todo_types::{Diagnostic, LintResult, Severity};

const SARIF_SCHEMA: &str = "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
const SARIF_VERSION: &str = "2.1.0";
const STYLELINT_INFO_URI: &str = "https://stylelint.io";

#[derive(Debug, Clone, Serialize)]
pub struct SarifReport {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub version: String,
    pub runs: Vec<SarifRun>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SarifTool {
    pub driver: SarifDriver,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifDriver {
    pub name: String,
    pub information_uri: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<SarifRule>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRule {
    pub id: String,
    pub default_configuration: SarifRuleConfiguration,
}

#[derive(Debug, Clone, Serialize)]
pub struct SarifRuleConfiguration {
    pub level: SarifLevel,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifResult {
    pub rule_id: String,
    pub level: SarifLevel,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
    pub partial_fingerprints: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SarifLevel {
    Error,
    Warning,
    Note,
    None,
}

impl From<Severity> for SarifLevel {
    fn from(s: Severity) -> Self {
        match s {
            Severity::Error => SarifLevel::Error,
            Severity::Warning => SarifLevel::Warning,
            Severity::Todo => SarifLevel::Note,
            Severity::Off => SarifLevel::None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SarifMessage {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifLocation {
    pub physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifPhysicalLocation {
    pub artifact_location: SarifArtifactLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<SarifRegion>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifArtifactLocation {
    pub uri: String,
    pub uri_base_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRegion {
    pub start_line: u32,
    pub start_column: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column: Option<u32>,
}

/// Builds a SARIF report; paths are made relative to `cwd`.
pub fn render_sarif(results: &[LintResult], cwd: &Path) -> SarifReport {
    let mut rules = BTreeMap::new();
    let mut sarif_results = Vec::new();

    for result in results {
        let uri = relative_path(cwd, result.source.as_deref().unwrap_or(""));
        for d in &result.warnings {
            let rule_id = d.rule.clone().unwrap_or_default();
            rules.entry(rule_id.clone()).or_insert_with(|| SarifRule {
                id: rule_id.clone(),
                default_configuration: SarifRuleConfiguration {
                    level: d.severity.into(),
                },
            });
            sarif_results.push(diagnostic_to_sarif_result(d, rule_id, &uri));
        }
    }

    SarifReport {
        schema: SARIF_SCHEMA.to_string(),
        version: SARIF_VERSION.to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "stylelint".to_string(),
                    information_uri: STYLELINT_INFO_URI.to_string(),
                    rules: rules.into_values().collect(),
                },
            },
            results: sarif_results,
        }],
    }
}

pub fn render_sarif_json(results: &[LintResult], cwd: &Path) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&render_sarif(results, cwd))
}

fn diagnostic_to_sarif_result(d: &Diagnostic, rule_id: String, uri: &str) -> SarifResult {
    let mut fingerprints = BTreeMap::new();
    fingerprints.insert(
        "primaryLocationLineHash".to_string(),
        format!("{}:{}:{}", rule_id, uri, d.line),
    );

    SarifResult {
        rule_id,
        level: d.severity.into(),
        message: SarifMessage {
            text: d.text.clone(),
        },
        locations: vec![SarifLocation {
            physical_location: SarifPhysicalLocation {
                artifact_location: SarifArtifactLocation {
                    uri: uri.to_string(),
                    uri_base_id: "%SRCROOT%".to_string(),
                },
                region: d.has_position().then(|| SarifRegion {
                    start_line: d.line,
                    start_column: d.column.max(1),
                    end_line: d.end_line,
                    end_column: d.end_column,
                }),
            },
        }],
        partial_fingerprints: fingerprints,
    }
}
