//! Small checks shared by the rule areas.

use contracts_core::{
    child_path, describe_set, index_path, Contract, Diagnostic, DiagnosticCode, QualityRule,
    ValueSet,
};

/// Reports `field` as missing under `path` when `value` is absent.
pub(crate) fn require<T>(value: &Option<T>, path: &str, field: &str, out: &mut Vec<Diagnostic>) {
    if value.is_none() {
        out.push(Diagnostic::missing(child_path(path, field), field));
    }
}

/// Reports a value outside an enumerated set. Absent values pass.
pub(crate) fn check_enum(
    value: Option<&str>,
    allowed: &ValueSet,
    path: &str,
    field: &str,
    out: &mut Vec<Diagnostic>,
) {
    let Some(value) = value else {
        return;
    };
    if !allowed.contains(value) {
        out.push(Diagnostic::field(
            DiagnosticCode::InvalidValue,
            child_path(path, field),
            format!(
                "'{field}' must be one of {}, found '{value}'",
                describe_set(allowed)
            ),
        ));
    }
}

/// Every quality rule of a contract with its document path.
pub(crate) fn quality_rules(contract: &Contract) -> Vec<(String, &QualityRule)> {
    let mut out = Vec::new();
    collect_rules("", contract.quality.as_deref(), &mut out);
    for (i, object) in contract.schema_objects().iter().enumerate() {
        collect_rules(&format!("schema[{i}]"), object.quality.as_deref(), &mut out);
    }
    for property in contract.properties() {
        collect_rules(&property.path, property.property.quality.as_deref(), &mut out);
    }
    out
}

fn collect_rules<'a>(
    base: &str,
    rules: Option<&'a [QualityRule]>,
    out: &mut Vec<(String, &'a QualityRule)>,
) {
    let list = child_path(base, "quality");
    for (i, rule) in rules.unwrap_or_default().iter().enumerate() {
        out.push((index_path(&list, i), rule));
    }
}
