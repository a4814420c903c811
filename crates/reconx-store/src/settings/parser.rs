//! Settings parser with validation
//!
//! Parses YAML and validates schema version and non-empty values

use super::format_v1::SettingsV1;
use crate::errors::{settings_validation, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Parse a settings file from a path
///
/// # Errors
///
/// `ERR_INVALID_SETTINGS` when the file is unreadable, not valid YAML, or
/// fails validation.
pub fn parse_settings_file(path: &Path) -> Result<SettingsV1> {
    let content = fs::read_to_string(path).map_err(|e| {
        settings_validation(&format!(
            "Failed to read settings file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_settings_str(&content)
}

/// Parse settings from a string
///
/// # Errors
///
/// See [`parse_settings_file`].
pub fn parse_settings_str(content: &str) -> Result<SettingsV1> {
    let settings: SettingsV1 = serde_yaml::from_str(content)
        .map_err(|e| settings_validation(&format!("YAML parse error: {}", e)))?;

    validate_settings(&settings)?;

    Ok(settings)
}

fn require_non_empty<'a, I>(field: &str, values: I) -> Result<()>
where
    I: IntoIterator<Item = &'a String>,
{
    for (index, value) in values.into_iter().enumerate() {
        if value.trim().is_empty() {
            return Err(settings_validation(&format!(
                "{}[{}] must not be empty",
                field, index
            )));
        }
    }
    Ok(())
}

fn require_optional(field: &str, value: &Option<String>) -> Result<()> {
    match value {
        Some(v) if v.trim().is_empty() => Err(settings_validation(&format!(
            "{} must not be empty when set",
            field
        ))),
        _ => Ok(()),
    }
}

/// Validate a parsed settings value
///
/// Values are opaque strings: only emptiness is checked, duplicates are
/// allowed and collapse during reconciliation.
fn validate_settings(settings: &SettingsV1) -> Result<()> {
    if settings.schema_version != 1 {
        return Err(settings_validation(&format!(
            "Unsupported schema_version: {}. Expected 1",
            settings.schema_version
        )));
    }

    require_optional("android.package_name", &settings.android.package_name)?;
    require_non_empty("deep_links.domains", &settings.deep_links.domains)?;

    let ios = &settings.ios;
    require_optional("ios.bundle_id", &ios.bundle_id)?;
    require_optional("ios.product_name", &ios.product_name)?;
    require_optional("ios.attribution_endpoint", &ios.attribution_endpoint)?;
    if let Some(frameworks) = &ios.frameworks {
        require_non_empty("ios.frameworks.name", frameworks.iter().map(|f| &f.name))?;
    }

    if let Some(ids) = &settings.skadnetwork.identifiers {
        require_non_empty("skadnetwork.identifiers", ids)?;
    }

    let symbols = &settings.symbols;
    require_non_empty("symbols.define", &symbols.define)?;
    require_non_empty("symbols.remove", &symbols.remove)?;

    let defined: HashSet<&String> = symbols.define.iter().collect();
    if let Some(both) = symbols.remove.iter().find(|s| defined.contains(s)) {
        return Err(settings_validation(&format!(
            "Symbol {} is listed in both symbols.define and symbols.remove",
            both
        )));
    }

    let needs_backend = !symbols.define.is_empty() || !symbols.remove.is_empty();
    if needs_backend && symbols.response_files.is_empty() {
        return Err(settings_validation(
            "symbols.response_files is required when symbols are defined or removed",
        ));
    }

    Ok(())
}
