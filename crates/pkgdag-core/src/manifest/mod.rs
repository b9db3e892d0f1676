//! Package configuration documents.
//!
//! One YAML document describes one origin package: its name, version and
//! epoch, the packages that must be installed in its build environment, the
//! pipeline steps of its build, the subpackages the build also produces,
//! and the virtual names it provides.
//!
//! [`PackageConfig::from_slice`] parses and normalizes a document:
//!
//! - `package.name` must be present and non-empty.
//! - Ranged subpackages are expanded against their `data` table and all
//!   subpackage names receive `${{package.*}}` substitutions.
//! - Subpackages are sorted by name.
//! - Empty requirement, subpackage or provided names are rejected.
//!
//! Unknown fields are ignored, so full build files load unchanged.

pub(crate) mod de;
pub mod expand;

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use tracing::debug;

use crate::pipeline::PipelineCatalog;

/// Errors from parsing a single package document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("malformed document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("no package name")]
    MissingName,

    #[error("empty package name in environment packages for {package:?}")]
    EmptyRequirement { package: String },

    #[error("empty subpackage name for {package:?}")]
    EmptySubpackage { package: String },

    #[error("subpackage {subpackage:?} of {package:?} ranges over unknown data table {range:?}")]
    UnknownRange {
        package: String,
        subpackage: String,
        range: String,
    },

    #[error("empty provided name {entry:?} in {package:?}")]
    EmptyProvides { package: String, entry: String },
}

/// A parsed, normalized package configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PackageConfig {
    #[serde(default, deserialize_with = "de::or_default")]
    pub package: PackageMeta,
    #[serde(default, deserialize_with = "de::or_default")]
    pub environment: Environment,
    #[serde(default, deserialize_with = "de::or_default")]
    pub pipeline: Vec<PipelineStep>,
    #[serde(default, deserialize_with = "de::or_default")]
    pub subpackages: Vec<Subpackage>,
    #[serde(default, deserialize_with = "de::or_default")]
    pub data: Vec<DataTable>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PackageMeta {
    #[serde(default, deserialize_with = "de::string")]
    pub name: String,
    #[serde(default, deserialize_with = "de::string")]
    pub version: String,
    #[serde(default, deserialize_with = "de::string")]
    pub epoch: String,
    #[serde(default, deserialize_with = "de::or_default")]
    pub dependencies: PackageDependencies,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PackageDependencies {
    /// Virtual names, each `name` or `name=version`.
    #[serde(default, deserialize_with = "de::or_default")]
    pub provides: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Environment {
    #[serde(default, deserialize_with = "de::or_default")]
    pub contents: Contents,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Contents {
    /// Packages installed into the build environment.
    #[serde(default, deserialize_with = "de::or_default")]
    pub packages: Vec<String>,
}

/// One build pipeline step. Only the fields the graph engine reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PipelineStep {
    #[serde(default)]
    pub uses: Option<String>,
    #[serde(default, deserialize_with = "de::string_map")]
    pub with: BTreeMap<String, String>,
    /// Nested steps.
    #[serde(default, deserialize_with = "de::or_default")]
    pub pipeline: Vec<Self>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Subpackage {
    #[serde(default, deserialize_with = "de::string")]
    pub name: String,
    /// Name of a `data` table to expand over. Always `None` after loading.
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default, deserialize_with = "de::or_default")]
    pub pipeline: Vec<PipelineStep>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DataTable {
    #[serde(default, deserialize_with = "de::string")]
    pub name: String,
    #[serde(default, deserialize_with = "de::scalar_map")]
    pub items: BTreeMap<String, String>,
}

/// A remote source fetched by a `uses: fetch` step.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FetchUri {
    pub uri: String,
    pub expected_sha256: Option<String>,
    pub expected_sha512: Option<String>,
}

impl PackageConfig {
    /// Parse and normalize one package document.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] for malformed YAML, a missing name, or any
    /// empty requirement / subpackage / provided name.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ParseError> {
        let mut config: Self = serde_yaml::from_slice(bytes)?;
        config.normalize()?;
        Ok(config)
    }

    fn normalize(&mut self) -> Result<(), ParseError> {
        if self.package.name.trim().is_empty() {
            return Err(ParseError::MissingName);
        }

        if self
            .environment
            .contents
            .packages
            .iter()
            .any(|p| p.trim().is_empty())
        {
            return Err(ParseError::EmptyRequirement {
                package: self.package.name.clone(),
            });
        }

        for entry in &self.package.dependencies.provides {
            if provided_name(entry).trim().is_empty() {
                return Err(ParseError::EmptyProvides {
                    package: self.package.name.clone(),
                    entry: entry.clone(),
                });
            }
        }

        self.subpackages = expand::expand_subpackages(self)?;
        Ok(())
    }

    /// The origin package name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.package.name
    }

    /// Names of all subpackages, sorted.
    pub fn subpackage_names(&self) -> impl Iterator<Item = &str> {
        self.subpackages.iter().map(|sp| sp.name.as_str())
    }

    /// Names this package provides, without their `=version` suffix.
    #[must_use]
    pub fn provided_names(&self) -> Vec<String> {
        self.package
            .dependencies
            .provides
            .iter()
            .map(|entry| provided_name(entry).to_string())
            .collect()
    }

    /// Every package that must be built before this one.
    ///
    /// The union of the build environment's packages and the `needs` of
    /// every catalog pipeline referenced by `uses`, including steps nested
    /// inside other steps and steps of subpackage pipelines. Sorted and
    /// deduplicated.
    #[must_use]
    pub fn requirements(&self, catalog: &PipelineCatalog) -> Vec<String> {
        let mut reqs: BTreeSet<String> = self.environment.contents.packages.iter().cloned().collect();

        for uses in self.uses() {
            let Some(needs) = catalog.needs_of(uses) else {
                debug!(package = %self.package.name, uses, "pipeline not in catalog");
                continue;
            };
            reqs.extend(needs);
        }

        reqs.into_iter().collect()
    }

    /// Every `uses` reference in the package's and subpackages' pipelines.
    fn uses(&self) -> BTreeSet<&str> {
        let mut stack: Vec<&PipelineStep> = self.pipeline.iter().collect();
        stack.extend(self.subpackages.iter().flat_map(|sp| sp.pipeline.iter()));

        let mut found = BTreeSet::new();
        while let Some(step) = stack.pop() {
            if let Some(uses) = step.uses.as_deref() {
                found.insert(uses);
            }
            stack.extend(step.pipeline.iter());
        }
        found
    }

    /// Sources fetched by `uses: fetch` steps, in pipeline order, with
    /// `${{package.name}}` / `${{package.version}}` substituted in the URI.
    #[must_use]
    pub fn fetch_uris(&self) -> Vec<FetchUri> {
        let mut uris = Vec::new();
        let mut stack: Vec<&PipelineStep> = self.pipeline.iter().rev().collect();

        while let Some(step) = stack.pop() {
            if step.uses.as_deref() == Some("fetch") {
                let non_empty = |key: &str| step.with.get(key).filter(|v| !v.is_empty()).cloned();
                uris.push(FetchUri {
                    uri: expand::substitute_package(
                        step.with.get("uri").map_or("", String::as_str),
                        self,
                    ),
                    expected_sha256: non_empty("expected-sha256"),
                    expected_sha512: non_empty("expected-sha512"),
                });
            }
            stack.extend(step.pipeline.iter().rev());
        }

        uris
    }
}

impl std::str::FromStr for PackageConfig {
    type Err = ParseError;

    fn from_str(doc: &str) -> Result<Self, Self::Err> {
        Self::from_slice(doc.as_bytes())
    }
}

/// The name part of a `name=version` provides entry.
fn provided_name(entry: &str) -> &str {
    entry.split_once('=').map_or(entry, |(name, _)| name).trim()
}
