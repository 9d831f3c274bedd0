//! Rule catalogue: the enumerated value sets and patterns the validator checks against.
//!
//! The catalogue is plain data. [`RuleCatalog::default`] describes ODCS
//! v3.1.0; callers may start from it and apply [`CatalogOverrides`] (loaded
//! from a file by the parser crate) or build a fixture catalogue in tests.

use crate::{ContractError, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::LazyLock;

const UUID_PATTERN: &str =
    r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$";

const SEMVER_PATTERN: &str = r"^(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)(?:-((?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*))*))?(?:\+([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$";

static DEFAULT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(UUID_PATTERN).expect("UUID pattern compiles"));

static DEFAULT_VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SEMVER_PATTERN).expect("semver pattern compiles"));

/// An enumerated set of accepted values.
pub type ValueSet = BTreeSet<String>;

fn set(values: &[&str]) -> ValueSet {
    values.iter().map(|v| v.to_string()).collect()
}

/// Constant data driving every enumeration and pattern rule.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    pub api_versions: ValueSet,
    pub kinds: ValueSet,
    pub statuses: ValueSet,
    pub logical_types: ValueSet,
    pub classifications: ValueSet,
    pub server_environments: ValueSet,
    pub server_types: ValueSet,
    pub support_tools: ValueSet,
    pub quality_types: ValueSet,
    pub quality_dimensions: ValueSet,
    pub quality_severities: ValueSet,
    pub library_metrics: ValueSet,
    pub authoritative_definition_types: ValueSet,
    /// Definition types only legal on the contract root
    pub root_only_definition_types: ValueSet,
    pub sla_drivers: ValueSet,
    /// Pattern the contract `id` must match
    pub id_pattern: Regex,
    /// Pattern the contract `version` must match
    pub version_pattern: Regex,
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self {
            api_versions: set(&["v3.1.0"]),
            kinds: set(&["DataContract"]),
            statuses: set(&["proposed", "draft", "active", "deprecated", "retired"]),
            logical_types: set(&[
                "object",
                "array",
                "string",
                "number",
                "integer",
                "boolean",
                "date",
                "timestamp",
                "time",
            ]),
            classifications: set(&["public", "restricted", "confidential"]),
            server_environments: set(&["prod", "staging", "dev", "uat", "qa"]),
            server_types: set(&[
                "api",
                "athena",
                "azure",
                "bigquery",
                "clickhouse",
                "cloudsql",
                "custom",
                "databricks",
                "db2",
                "denodo",
                "dremio",
                "duckdb",
                "glue",
                "hive",
                "impala",
                "informix",
                "kafka",
                "kinesis",
                "local",
                "mysql",
                "oracle",
                "postgres",
                "postgresql",
                "presto",
                "pubsub",
                "redshift",
                "s3",
                "sftp",
                "snowflake",
                "sqlserver",
                "synapse",
                "trino",
                "vertica",
                "zen",
            ]),
            support_tools: set(&[
                "email",
                "slack",
                "teams",
                "discord",
                "ticket",
                "googlechat",
                "other",
            ]),
            quality_types: set(&["library", "sql", "custom", "text"]),
            quality_dimensions: set(&[
                "accuracy",
                "completeness",
                "conformity",
                "consistency",
                "coverage",
                "timeliness",
                "uniqueness",
            ]),
            quality_severities: set(&["error", "warning"]),
            library_metrics: set(&[
                "nullValues",
                "missingValues",
                "invalidValues",
                "duplicateValues",
                "rowCount",
            ]),
            authoritative_definition_types: set(&[
                "businessDefinition",
                "transformationImplementation",
                "videoTutorial",
                "tutorial",
                "implementation",
                "canonicalUrl",
            ]),
            root_only_definition_types: set(&["canonicalUrl"]),
            sla_drivers: set(&["regulatory", "analytics", "operational"]),
            id_pattern: DEFAULT_ID_PATTERN.clone(),
            version_pattern: DEFAULT_VERSION_PATTERN.clone(),
        }
    }
}

impl RuleCatalog {
    /// Applies overrides on top of this catalogue.
    ///
    /// Every set present in `overrides` replaces the corresponding set.
    /// Patterns are compiled here; a pattern that does not compile is an error.
    pub fn with_overrides(mut self, overrides: CatalogOverrides) -> Result<Self> {
        let CatalogOverrides {
            api_versions,
            kinds,
            statuses,
            logical_types,
            classifications,
            server_environments,
            server_types,
            support_tools,
            quality_types,
            quality_dimensions,
            quality_severities,
            library_metrics,
            authoritative_definition_types,
            root_only_definition_types,
            sla_drivers,
            id_pattern,
            version_pattern,
        } = overrides;

        replace(&mut self.api_versions, api_versions);
        replace(&mut self.kinds, kinds);
        replace(&mut self.statuses, statuses);
        replace(&mut self.logical_types, logical_types);
        replace(&mut self.classifications, classifications);
        replace(&mut self.server_environments, server_environments);
        replace(&mut self.server_types, server_types);
        replace(&mut self.support_tools, support_tools);
        replace(&mut self.quality_types, quality_types);
        replace(&mut self.quality_dimensions, quality_dimensions);
        replace(&mut self.quality_severities, quality_severities);
        replace(&mut self.library_metrics, library_metrics);
        replace(
            &mut self.authoritative_definition_types,
            authoritative_definition_types,
        );
        replace(
            &mut self.root_only_definition_types,
            root_only_definition_types,
        );
        replace(&mut self.sla_drivers, sla_drivers);

        if let Some(pattern) = id_pattern {
            self.id_pattern = compile("idPattern", &pattern)?;
        }
        if let Some(pattern) = version_pattern {
            self.version_pattern = compile("versionPattern", &pattern)?;
        }

        Ok(self)
    }
}

fn replace(target: &mut ValueSet, values: Option<Vec<String>>) {
    if let Some(values) = values {
        *target = values.into_iter().collect();
    }
}

fn compile(name: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| ContractError::InvalidPattern {
        name: name.to_string(),
        message: e.to_string(),
    })
}

/// Partial catalogue read from a configuration file.
///
/// ```yaml
/// statuses: [draft, active, retired]
/// serverEnvironments: [prod, dev, sandbox]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CatalogOverrides {
    pub api_versions: Option<Vec<String>>,
    pub kinds: Option<Vec<String>>,
    pub statuses: Option<Vec<String>>,
    pub logical_types: Option<Vec<String>>,
    pub classifications: Option<Vec<String>>,
    pub server_environments: Option<Vec<String>>,
    pub server_types: Option<Vec<String>>,
    pub support_tools: Option<Vec<String>>,
    pub quality_types: Option<Vec<String>>,
    pub quality_dimensions: Option<Vec<String>>,
    pub quality_severities: Option<Vec<String>>,
    pub library_metrics: Option<Vec<String>>,
    pub authoritative_definition_types: Option<Vec<String>>,
    pub root_only_definition_types: Option<Vec<String>>,
    pub sla_drivers: Option<Vec<String>>,
    pub id_pattern: Option<String>,
    pub version_pattern: Option<String>,
}

/// Formats a value set for messages: `{a, b, c}`.
pub fn describe_set(values: &ValueSet) -> String {
    let joined = values.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
    format!("{{{joined}}}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_patterns() {
        let catalog = RuleCatalog::default();
        assert!(catalog
            .id_pattern
            .is_match("53581432-6c55-4ba2-a65f-72344a91553a"));
        assert!(!catalog.id_pattern.is_match("my-contract"));
        assert!(catalog.version_pattern.is_match("1.0.0"));
        assert!(catalog.version_pattern.is_match("2.1.0-rc.1+build.5"));
        assert!(!catalog.version_pattern.is_match("1.0"));
        assert!(!catalog.version_pattern.is_match("01.0.0"));
    }

    #[test]
    fn test_overrides_replace_sets() {
        let overrides = CatalogOverrides {
            statuses: Some(vec!["draft".to_string(), "sandbox".to_string()]),
            ..Default::default()
        };
        let catalog = RuleCatalog::default().with_overrides(overrides).unwrap();
        assert!(catalog.statuses.contains("sandbox"));
        assert!(!catalog.statuses.contains("active"));
        assert!(catalog.classifications.contains("public"));
    }

    #[test]
    fn test_quality_types_override_from_document() {
        let document = serde_json::json!({"qualityTypes": ["library", "great-expectations"]});
        let overrides: CatalogOverrides = serde_json::from_value(document).unwrap();
        let catalog = RuleCatalog::default().with_overrides(overrides).unwrap();
        assert!(catalog.quality_types.contains("great-expectations"));
        assert!(!catalog.quality_types.contains("sql"));
    }

    #[test]
    fn test_invalid_override_pattern() {
        let overrides = CatalogOverrides {
            id_pattern: Some("([a-z".to_string()),
            ..Default::default()
        };
        let err = RuleCatalog::default().with_overrides(overrides).unwrap_err();
        assert!(matches!(err, ContractError::InvalidPattern { ref name, .. } if name == "idPattern"));
    }

    #[test]
    fn test_describe_set() {
        let catalog = RuleCatalog::default();
        assert_eq!(
            describe_set(&catalog.quality_severities),
            "{error, warning}"
        );
    }
}
