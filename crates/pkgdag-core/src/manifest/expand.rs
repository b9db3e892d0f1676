//! Subpackage range expansion and `${{...}}` substitutions.

use super::{PackageConfig, ParseError, Subpackage};

pub const RANGE_KEY: &str = "${{range.key}}";
pub const RANGE_VALUE: &str = "${{range.value}}";
pub const PACKAGE_NAME: &str = "${{package.name}}";
pub const PACKAGE_VERSION: &str = "${{package.version}}";
pub const PACKAGE_EPOCH: &str = "${{package.epoch}}";

/// Expand every ranged subpackage against its data table and apply package
/// substitutions to all subpackage names.
///
/// A subpackage with `range: foo` produces one subpackage per item of the
/// data table named `foo`. The returned list is sorted by name so the order
/// does not depend on mapping iteration order.
///
/// # Errors
///
/// [`ParseError`] if a subpackage names a data table that does not exist
/// or an expanded name is empty.
pub fn expand_subpackages(config: &PackageConfig) -> Result<Vec<Subpackage>, ParseError> {
    let mut expanded = Vec::with_capacity(config.subpackages.len());

    for sp in &config.subpackages {
        let Some(range) = sp.range.as_deref().filter(|r| !r.is_empty()) else {
            expanded.push(Subpackage {
                name: substitute_package(&sp.name, config),
                range: None,
                pipeline: sp.pipeline.clone(),
            });
            continue;
        };

        let table = config
            .data
            .iter()
            .find(|d| d.name == range)
            .ok_or_else(|| ParseError::UnknownRange {
                package: config.package.name.clone(),
                subpackage: sp.name.clone(),
                range: range.to_string(),
            })?;

        for (key, value) in &table.items {
            let name = sp.name.replace(RANGE_KEY, key).replace(RANGE_VALUE, value);
            expanded.push(Subpackage {
                name: substitute_package(&name, config),
                range: None,
                pipeline: sp.pipeline.clone(),
            });
        }
    }

    if expanded.iter().any(|sp| sp.name.trim().is_empty()) {
        return Err(ParseError::EmptySubpackage {
            package: config.package.name.clone(),
        });
    }

    expanded.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(expanded)
}

/// Replace `${{package.name}}`, `${{package.version}}` and
/// `${{package.epoch}}` with the values from `config`.
#[must_use]
pub fn substitute_package(template: &str, config: &PackageConfig) -> String {
    if !template.contains("${{") {
        return template.to_string();
    }
    template
        .replace(PACKAGE_NAME, &config.package.name)
        .replace(PACKAGE_VERSION, &config.package.version)
        .replace(PACKAGE_EPOCH, &config.package.epoch)
}
