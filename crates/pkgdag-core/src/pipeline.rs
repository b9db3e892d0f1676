//! Reusable pipeline definitions.
//!
//! A package step like `uses: autoconf/make` refers to a pipeline defined in
//! `<pipeline_dir>/autoconf/make.yaml`. Those documents may declare
//! `needs.packages`, which become build-time requirements of every package
//! that uses them. Pipelines may themselves `use` other pipelines; needs are
//! resolved through the whole chain.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Component, Path};

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::GraphError;
use crate::manifest::de;
use crate::manifest::{ParseError, PipelineStep};
use crate::source::DocumentSource;

/// What the graph engine needs to know about one pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineDef {
    /// Packages the pipeline needs installed.
    pub needs: BTreeSet<String>,
    /// Other pipelines it uses.
    pub uses: BTreeSet<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPipeline {
    #[serde(default, deserialize_with = "de::or_default")]
    needs: RawNeeds,
    #[serde(default, deserialize_with = "de::or_default")]
    pipeline: Vec<PipelineStep>,
}

#[derive(Debug, Default, Deserialize)]
struct RawNeeds {
    #[serde(default, deserialize_with = "de::or_default")]
    packages: Vec<String>,
}

/// Named pipeline definitions, keyed by their `uses:` name.
#[derive(Debug, Clone, Default)]
pub struct PipelineCatalog {
    pipelines: BTreeMap<String, PipelineDef>,
}

impl PipelineCatalog {
    /// Register (or replace) a pipeline.
    pub fn insert<N, U>(&mut self, name: impl Into<String>, needs: N, uses: U)
    where
        N: IntoIterator,
        N::Item: Into<String>,
        U: IntoIterator,
        U::Item: Into<String>,
    {
        self.pipelines.insert(
            name.into(),
            PipelineDef {
                needs: needs.into_iter().map(Into::into).collect(),
                uses: uses.into_iter().map(Into::into).collect(),
            },
        );
    }

    /// Parse one pipeline document.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] for malformed YAML or an empty need.
    pub fn parse(name: &str, bytes: &[u8]) -> Result<PipelineDef, ParseError> {
        let raw: RawPipeline = serde_yaml::from_slice(bytes)?;
        if raw.needs.packages.iter().any(|p| p.trim().is_empty()) {
            return Err(ParseError::EmptyRequirement {
                package: name.to_string(),
            });
        }

        let mut uses = BTreeSet::new();
        let mut stack: Vec<&PipelineStep> = raw.pipeline.iter().collect();
        while let Some(step) = stack.pop() {
            if let Some(u) = step.uses.as_deref() {
                uses.insert(u.to_string());
            }
            stack.extend(step.pipeline.iter());
        }

        Ok(PipelineDef {
            needs: raw.needs.packages.into_iter().collect(),
            uses,
        })
    }

    /// Load every pipeline document from `source`.
    ///
    /// A document at `autoconf/make.yaml` is registered as `autoconf/make`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Io`] if the source cannot be read and
    /// [`GraphError::Load`] if a document does not parse.
    #[instrument(skip_all)]
    pub fn load(source: &impl DocumentSource, suffix: &str) -> Result<Self, GraphError> {
        let mut catalog = Self::default();
        for doc in source.documents()? {
            let name = pipeline_name(&doc.path, suffix);
            let def = Self::parse(&name, &doc.bytes).map_err(|source| GraphError::Load {
                path: doc.path.clone(),
                source,
            })?;
            catalog.pipelines.insert(name, def);
        }
        debug!(pipelines = catalog.len(), "loaded pipeline catalog");
        Ok(catalog)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PipelineDef> {
        self.pipelines.get(name)
    }

    /// All packages needed by `name` and every pipeline it transitively
    /// uses. `None` if `name` is not in the catalog.
    #[must_use]
    pub fn needs_of(&self, name: &str) -> Option<BTreeSet<String>> {
        self.pipelines.get(name)?;

        let mut needs = BTreeSet::new();
        let mut visited = HashSet::new();
        let mut stack = vec![name];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(def) = self.pipelines.get(current) else {
                debug!(pipeline = current, "nested pipeline not in catalog");
                continue;
            };
            needs.extend(def.needs.iter().cloned());
            stack.extend(def.uses.iter().map(String::as_str));
        }
        Some(needs)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}

/// `autoconf/make.yaml` -> `autoconf/make`, always with `/` separators.
fn pipeline_name(path: &Path, suffix: &str) -> String {
    let joined = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    joined
        .strip_suffix(suffix)
        .map_or_else(|| joined.clone(), str::to_string)
}
