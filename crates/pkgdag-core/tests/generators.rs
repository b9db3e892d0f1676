//! Proptest strategies producing sets of package documents.

#![allow(dead_code)]

use pkgdag_core::source::MemorySource;
use proptest::prelude::*;

/// One generated package: its name, subpackages, requirements and provides.
#[derive(Debug, Clone)]
pub struct GenPackage {
    pub name: String,
    pub subpackages: Vec<String>,
    pub requires: Vec<String>,
    pub provides: Vec<String>,
}

impl GenPackage {
    pub fn to_yaml(&self) -> String {
        let mut doc = format!(
            "package:\n  name: {}\n  version: 1.0.0\n  epoch: 0\n",
            self.name
        );
        if !self.provides.is_empty() {
            doc.push_str("  dependencies:\n    provides:\n");
            for p in &self.provides {
                doc.push_str(&format!("      - {p}=1.0.0\n"));
            }
        }
        if !self.requires.is_empty() {
            doc.push_str("environment:\n  contents:\n    packages:\n");
            for r in &self.requires {
                doc.push_str(&format!("      - {r}\n"));
            }
        }
        if !self.subpackages.is_empty() {
            doc.push_str("subpackages:\n");
            for s in &self.subpackages {
                doc.push_str(&format!("  - name: {s}\n"));
            }
        }
        doc
    }
}

/// Every name a generated requirement may point at.
fn requirement_pool(count: usize) -> Vec<String> {
    let mut pool = Vec::new();
    for i in 0..count {
        pool.push(format!("p{i}"));
        pool.push(format!("p{i}-dev"));
        pool.push(format!("virt{i}"));
    }
    pool.extend(["ext-a", "ext-b"].map(String::from));
    pool
}

/// Between 1 and `max` packages with random, often cyclic, requirements.
pub fn arb_packages(max: usize) -> impl Strategy<Value = Vec<GenPackage>> {
    (1..=max).prop_flat_map(|count| {
        let pool = requirement_pool(count);
        let per_package = (
            any::<bool>(),
            proptest::sample::subsequence(pool.clone(), 0..=4),
            proptest::option::of(0..count),
        );
        proptest::collection::vec(per_package, count).prop_map(move |specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (has_dev, requires, provides))| GenPackage {
                    name: format!("p{i}"),
                    subpackages: if has_dev { vec![format!("p{i}-dev")] } else { vec![] },
                    requires,
                    provides: provides.map(|k| vec![format!("virt{k}")]).unwrap_or_default(),
                })
                .collect()
        })
    })
}

/// Documents keyed `<prefix><name>.yaml`.
pub fn source_for(packages: &[GenPackage], prefix: &str) -> MemorySource {
    packages
        .iter()
        .map(|p| (format!("{prefix}{}.yaml", p.name), p.to_yaml()))
        .collect()
}

/// Same packages, file names chosen so lexical order is reversed.
pub fn reversed_source_for(packages: &[GenPackage]) -> MemorySource {
    let total = packages.len();
    packages
        .iter()
        .enumerate()
        .map(|(i, p)| (format!("{:04}.yaml", total - i), p.to_yaml()))
        .collect()
}
