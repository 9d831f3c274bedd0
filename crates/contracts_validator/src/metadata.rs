//! Metadata validation.
//!
//! Covers the flat records around the schema: servers, SLA properties,
//! team, roles, support channels, custom properties and authoritative
//! definitions (wherever they are declared).

use crate::checks::{check_enum, quality_rules, require};
use contracts_core::{
    child_path, index_path, AuthoritativeDefinition, Contract, ContractValidator, CustomProperty,
    Diagnostic, DiagnosticCode, ResolvedEndpoint, Role, RuleCatalog, ValidationContext,
};

/// Validates contract metadata sections.
pub struct MetadataValidator;

/// Declared authoritative definitions and custom properties of one entity.
struct Annotations<'a> {
    path: String,
    root: bool,
    definitions: Option<&'a [AuthoritativeDefinition]>,
    custom_properties: Option<&'a [CustomProperty]>,
}

impl MetadataValidator {
    /// Creates a new metadata validator.
    pub fn new() -> Self {
        Self
    }

    pub fn check(&self, contract: &Contract, catalog: &RuleCatalog) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        self.check_servers(contract, catalog, &mut diagnostics);
        self.check_sla(contract, catalog, &mut diagnostics);
        self.check_team(contract, &mut diagnostics);
        self.check_roles(contract.roles.as_deref(), "roles", &mut diagnostics);
        self.check_support(contract, catalog, &mut diagnostics);

        for annotations in annotations(contract) {
            self.check_annotations(&annotations, catalog, &mut diagnostics);
        }

        diagnostics
    }

    fn check_servers(&self, contract: &Contract, catalog: &RuleCatalog, out: &mut Vec<Diagnostic>) {
        for (i, server) in contract.servers.iter().flatten().enumerate() {
            let path = index_path("servers", i);
            require(&server.server, &path, "server", out);
            require(&server.server_type, &path, "type", out);
            check_enum(server.server_type.as_deref(), &catalog.server_types, &path, "type", out);
            check_enum(
                server.environment.as_deref(),
                &catalog.server_environments,
                &path,
                "environment",
                out,
            );
            self.check_roles(server.roles.as_deref(), &child_path(&path, "roles"), out);
        }
    }

    fn check_sla(&self, contract: &Contract, catalog: &RuleCatalog, out: &mut Vec<Diagnostic>) {
        for (i, sla) in contract.sla_properties.iter().flatten().enumerate() {
            let path = index_path("slaProperties", i);
            require(&sla.property, &path, "property", out);
            require(&sla.value, &path, "value", out);
            check_enum(sla.driver.as_deref(), &catalog.sla_drivers, &path, "driver", out);
        }
    }

    fn check_team(&self, contract: &Contract, out: &mut Vec<Diagnostic>) {
        let Some(team) = &contract.team else {
            return;
        };
        // report against the shape the author actually wrote
        let base = if team.legacy_list { "team" } else { "team.members" };
        for (i, member) in team.members.iter().flatten().enumerate() {
            require(&member.username, &index_path(base, i), "username", out);
        }
    }

    fn check_roles(&self, roles: Option<&[Role]>, base: &str, out: &mut Vec<Diagnostic>) {
        for (i, role) in roles.unwrap_or_default().iter().enumerate() {
            require(&role.role, &index_path(base, i), "role", out);
        }
    }

    fn check_support(&self, contract: &Contract, catalog: &RuleCatalog, out: &mut Vec<Diagnostic>) {
        for (i, channel) in contract.support.iter().flatten().enumerate() {
            let path = index_path("support", i);
            require(&channel.channel, &path, "channel", out);
            check_enum(channel.tool.as_deref(), &catalog.support_tools, &path, "tool", out);
        }
    }

    fn check_annotations(
        &self,
        annotations: &Annotations<'_>,
        catalog: &RuleCatalog,
        out: &mut Vec<Diagnostic>,
    ) {
        let definitions_path = child_path(&annotations.path, "authoritativeDefinitions");
        for (i, definition) in annotations.definitions.unwrap_or_default().iter().enumerate() {
            let path = index_path(&definitions_path, i);
            require(&definition.url, &path, "url", out);
            require(&definition.definition_type, &path, "type", out);

            let Some(kind) = definition.definition_type.as_deref() else {
                continue;
            };
            check_enum(
                Some(kind),
                &catalog.authoritative_definition_types,
                &path,
                "type",
                out,
            );
            if !annotations.root && catalog.root_only_definition_types.contains(kind) {
                out.push(Diagnostic::field(
                    DiagnosticCode::RootOnlyDefinitionType,
                    child_path(&path, "type"),
                    format!("authoritative definition type '{kind}' is only allowed at the contract root"),
                ));
            }
        }

        let custom_path = child_path(&annotations.path, "customProperties");
        for (i, custom) in annotations.custom_properties.unwrap_or_default().iter().enumerate() {
            let path = index_path(&custom_path, i);
            require(&custom.property, &path, "property", out);
            require(&custom.value, &path, "value", out);
        }
    }
}

/// Every entity that may declare authoritative definitions or custom properties.
fn annotations(contract: &Contract) -> Vec<Annotations<'_>> {
    let mut out = vec![Annotations {
        path: String::new(),
        root: true,
        definitions: contract.authoritative_definitions.as_deref(),
        custom_properties: contract.custom_properties.as_deref(),
    }];

    if let Some(description) = &contract.description {
        out.push(Annotations {
            path: "description".to_string(),
            root: true,
            definitions: description.authoritative_definitions.as_deref(),
            custom_properties: description.custom_properties.as_deref(),
        });
    }

    for (i, object) in contract.schema_objects().iter().enumerate() {
        let path = format!("schema[{i}]");
        for (j, relationship) in object.relationships().iter().enumerate() {
            out.push(Annotations {
                path: index_path(&child_path(&path, "relationships"), j),
                root: false,
                definitions: None,
                custom_properties: relationship.custom_properties.as_deref(),
            });
        }
        out.push(Annotations {
            path,
            root: false,
            definitions: object.authoritative_definitions.as_deref(),
            custom_properties: object.custom_properties.as_deref(),
        });
    }

    for property in contract.properties() {
        for (j, relationship) in property.property.relationships().iter().enumerate() {
            out.push(Annotations {
                path: index_path(&child_path(&property.path, "relationships"), j),
                root: false,
                definitions: None,
                custom_properties: relationship.custom_properties.as_deref(),
            });
        }
        out.push(Annotations {
            path: property.path,
            root: false,
            definitions: property.property.authoritative_definitions.as_deref(),
            custom_properties: property.property.custom_properties.as_deref(),
        });
    }

    for (path, rule) in quality_rules(contract) {
        out.push(Annotations {
            path,
            root: false,
            definitions: rule.authoritative_definitions.as_deref(),
            custom_properties: rule.custom_properties.as_deref(),
        });
    }

    for (i, server) in contract.servers.iter().flatten().enumerate() {
        let path = index_path("servers", i);
        for (j, role) in server.roles.iter().flatten().enumerate() {
            out.push(Annotations {
                path: index_path(&child_path(&path, "roles"), j),
                root: false,
                definitions: None,
                custom_properties: role.custom_properties.as_deref(),
            });
        }
        out.push(Annotations {
            path,
            root: false,
            definitions: None,
            custom_properties: server.custom_properties.as_deref(),
        });
    }

    for (i, role) in contract.roles.iter().flatten().enumerate() {
        out.push(Annotations {
            path: index_path("roles", i),
            root: false,
            definitions: None,
            custom_properties: role.custom_properties.as_deref(),
        });
    }

    out
}

impl Default for MetadataValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ContractValidator for MetadataValidator {
    fn name(&self) -> &'static str {
        "metadata"
    }

    fn validate(
        &self,
        contract: &Contract,
        _endpoints: &[ResolvedEndpoint],
        context: &ValidationContext,
    ) -> Vec<Diagnostic> {
        self.check(contract, &context.catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts_core::build_contract;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn check(document: Value) -> Vec<Diagnostic> {
        let built = build_contract(&document).unwrap();
        MetadataValidator::new().check(&built.contract, &RuleCatalog::default())
    }

    fn paths(diagnostics: &[Diagnostic]) -> Vec<&str> {
        diagnostics.iter().map(|d| d.path.as_str()).collect()
    }

    #[test]
    fn test_valid_metadata() {
        let diagnostics = check(json!({
            "servers": [{"server": "prod", "type": "postgres", "environment": "prod",
                         "roles": [{"role": "reader"}]}],
            "slaProperties": [{"property": "latency", "value": 4, "unit": "d", "driver": "analytics"}],
            "team": {"name": "sales", "members": [{"username": "ceastwood"}]},
            "roles": [{"role": "analyst", "access": "read"}],
            "support": [{"channel": "#sales", "tool": "slack"}],
            "authoritativeDefinitions": [{"url": "https://example.com/c", "type": "canonicalUrl"}],
            "customProperties": [{"property": "owner", "value": "sales"}]
        }));
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn test_server_rules() {
        let diagnostics = check(json!({
            "servers": [{"type": "teradata", "environment": "production"}]
        }));
        assert_eq!(
            paths(&diagnostics),
            vec!["servers[0].server", "servers[0].type", "servers[0].environment"]
        );
    }

    #[test]
    fn test_sla_team_support() {
        let diagnostics = check(json!({
            "slaProperties": [{"property": "retention", "driver": "legal"}],
            "team": [{"role": "owner"}],
            "support": [{"tool": "pager"}]
        }));
        assert_eq!(
            paths(&diagnostics),
            vec![
                "slaProperties[0].value",
                "slaProperties[0].driver",
                "team[0].username",
                "support[0].channel",
                "support[0].tool",
            ]
        );
    }

    #[test]
    fn test_root_only_definition_type() {
        let diagnostics = check(json!({"schema": [{
            "name": "t", "logicalType": "object",
            "properties": [{"name": "id", "authoritativeDefinitions": [
                {"url": "https://example.com/id", "type": "canonicalUrl"}
            ]}]
        }]}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::RootOnlyDefinitionType);
        assert_eq!(
            diagnostics[0].path,
            "schema[0].properties[0].authoritativeDefinitions[0].type"
        );
    }

    #[test]
    fn test_custom_properties_everywhere() {
        let diagnostics = check(json!({
            "quality": [{"metric": "rowCount", "mustBe": 1, "customProperties": [{"property": "x"}]}],
            "schema": [{"name": "t", "logicalType": "object", "properties": [{"name": "a"}],
                        "customProperties": [{"value": 1}]}]
        }));
        assert_eq!(
            paths(&diagnostics),
            vec![
                "schema[0].customProperties[0].property",
                "quality[0].customProperties[0].value",
            ]
        );
    }
}
