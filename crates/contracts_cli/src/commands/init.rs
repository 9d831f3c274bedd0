use anyhow::{bail, Context, Result};
use chrono::{SecondsFormat, Utc};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::output;

const MINIMAL_TEMPLATE: &str = r#"apiVersion: v3.1.0
kind: DataContract
id: {id}
version: 1.0.0
status: draft
schema:
  - name: {table}
    logicalType: object
    description: Describe the table
    properties:
      - name: id
        logicalType: integer
        primaryKey: true
        required: true
        description: Primary key
"#;

const FULL_TEMPLATE: &str = r##"# ODCS v3.1.0 Data Contract
# Generated: {timestamp}

apiVersion: v3.1.0
kind: DataContract
id: {id}
version: 1.0.0
status: draft

name: {name}
domain: {domain}
dataProduct: {table}
tags: []

description:
  purpose: Describe the intended use of this data
  limitations: Document any constraints or limitations
  usage: Describe recommended usage patterns

schema:
  - name: {table}
    id: {table}_tbl
    logicalType: object
    physicalType: table
    description: Describe the table
    dataGranularityDescription: One row per record
    properties:
      - name: id
        id: {table}_id_col
        logicalType: integer
        physicalType: bigint
        primaryKey: true
        primaryKeyPosition: 1
        required: true
        unique: true
        description: Unique identifier
        classification: public

# quality:
#   - type: library
#     metric: rowCount
#     mustBeGreaterThan: 0
#     dimension: completeness
#     severity: error

# servers:
#   - server: my-database
#     type: postgres
#     environment: dev

# slaProperties:
#   - property: latency
#     value: 24
#     unit: d

# team:
#   name: data-team
#   members:
#     - username: owner@company.com
#       role: Owner
#       dateIn: "{date}"

# support:
#   - channel: "#data-help"
#     tool: slack

contractCreatedTs: "{timestamp}"
"##;

pub async fn execute(
    output_path: &Path,
    name: Option<&str>,
    domain: Option<&str>,
    minimal: bool,
    force: bool,
) -> Result<()> {
    if output_path.exists() && !force {
        bail!(
            "File already exists: {} (use --force to overwrite)",
            output_path.display()
        );
    }

    let table = table_name(output_path);
    let now = Utc::now();
    let template = if minimal { MINIMAL_TEMPLATE } else { FULL_TEMPLATE };

    let default_name = title_case(&table);
    let content = template
        .replace("{id}", &uuid_v4())
        .replace("{table}", &table)
        .replace("{name}", &quoted(name.unwrap_or(&default_name)))
        .replace("{domain}", &quoted(domain.unwrap_or("unassigned")))
        .replace("{timestamp}", &now.to_rfc3339_opts(SecondsFormat::Secs, true))
        .replace("{date}", &now.format("%Y-%m-%d").to_string());

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(output_path, content)
        .with_context(|| format!("Failed to write to file: {}", output_path.display()))?;

    info!(minimal, "scaffold written");
    output::print_success(&format!("Contract written to: {}", output_path.display()));
    Ok(())
}

/// Random (version 4) UUID in its canonical hyphenated form.
fn uuid_v4() -> String {
    let mut bytes: [u8; 16] = rand::random();
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// `orders-daily.odcs.yaml` → `orders_daily`
fn table_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .replace(".odcs", "");
    let table: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if table.trim_matches('_').is_empty() {
        "my_table".to_string()
    } else {
        table
    }
}

fn title_case(table: &str) -> String {
    table
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Double-quoted YAML scalar.
fn quoted(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_uuid_v4_shape() {
        let id = uuid_v4();
        assert_eq!(id.len(), 36);
        assert_eq!(&id[14..15], "4");
        assert!(matches!(&id[19..20], "8" | "9" | "a" | "b"));
        assert_ne!(id, uuid_v4());
    }

    #[test]
    fn test_table_name() {
        assert_eq!(table_name(Path::new("orders-daily.odcs.yaml")), "orders_daily");
        assert_eq!(table_name(Path::new("dir/My Sales.yaml")), "My_Sales");
        assert_eq!(table_name(Path::new("-.yaml")), "my_table");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("orders_daily"), "Orders Daily");
    }
}
