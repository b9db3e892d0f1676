use std::fmt;
use std::path::PathBuf;

use crate::manifest::ParseError;

/// Errors raised while building or querying a package [`Graph`].
///
/// Construction errors (`Load`, `Io`, `DuplicateName`, `Validation`) abort
/// the whole build: no partial graph is ever returned. `NotFound` is local
/// to the query that produced it and never invalidates the graph.
///
/// [`Graph`]: crate::graph::Graph
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A document could not be parsed into a package config.
    #[error("unable to load {path}: {source}")]
    Load {
        /// Path of the offending document, relative to its source.
        path: PathBuf,
        /// The underlying parse failure.
        #[source]
        source: ParseError,
    },

    /// A document or directory could not be read.
    #[error("unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Two documents (or a document and a subpackage) claim the same name.
    #[error("duplicate package config for {name:?}: declared in {first} and {second}")]
    DuplicateName {
        name: String,
        /// Where the name was first declared.
        first: String,
        /// Where the conflicting declaration was found.
        second: String,
    },

    /// Post-build validation found edges that break graph invariants.
    #[error("graph validation failed: {}", .problems.join("; "))]
    Validation { problems: Vec<String> },

    /// A query referenced a package name that is not in the graph.
    #[error("package {name:?} not found in graph")]
    NotFound { name: String },

    /// The sorter found a cycle. The builder should make this impossible.
    #[error("dependency cycle among {} packages: {}", .remaining.len(), .remaining.join(", "))]
    Cycle { remaining: Vec<String> },
}

impl GraphError {
    pub(crate) fn not_found(name: &str) -> Self {
        Self::NotFound {
            name: name.to_string(),
        }
    }

    /// Return the machine-readable error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Load { .. } => ErrorCode::MalformedConfig,
            Self::Io { .. } => ErrorCode::SourceUnreadable,
            Self::DuplicateName { .. } => ErrorCode::DuplicateName,
            Self::Validation { .. } => ErrorCode::InvalidGraph,
            Self::NotFound { .. } => ErrorCode::PackageNotFound,
            Self::Cycle { .. } => ErrorCode::CycleDetected,
        }
    }
}

/// Machine-readable error codes for scripts and CI wrappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    MalformedConfig,
    SourceUnreadable,
    DuplicateName,
    SettingsParseError,
    PackageNotFound,
    InvalidGraph,
    CycleDetected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MalformedConfig => "E1001",
            Self::SourceUnreadable => "E1002",
            Self::DuplicateName => "E1003",
            Self::SettingsParseError => "E1004",
            Self::PackageNotFound => "E2001",
            Self::InvalidGraph => "E2002",
            Self::CycleDetected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::MalformedConfig => "Package config could not be parsed",
            Self::SourceUnreadable => "Package config source could not be read",
            Self::DuplicateName => "Package name declared more than once",
            Self::SettingsParseError => "Settings file parse error",
            Self::PackageNotFound => "Package not found",
            Self::InvalidGraph => "Dependency graph failed validation",
            Self::CycleDetected => "Dependency cycle survived graph construction",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::MalformedConfig => {
                Some("Check package.name, subpackage names and environment packages are non-empty.")
            }
            Self::SourceUnreadable => Some("Check the --dir path exists and is readable."),
            Self::DuplicateName => {
                Some("Rename or remove one of the conflicting packages or subpackages.")
            }
            Self::SettingsParseError => Some("Fix syntax in pkgdag.toml and retry."),
            Self::PackageNotFound => Some("Run `pkgdag text` without arguments to list packages."),
            Self::InvalidGraph | Self::CycleDetected => {
                Some("This is a bug in graph construction; report it with the input configs.")
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::MalformedConfig,
            ErrorCode::SourceUnreadable,
            ErrorCode::DuplicateName,
            ErrorCode::SettingsParseError,
            ErrorCode::PackageNotFound,
            ErrorCode::InvalidGraph,
            ErrorCode::CycleDetected,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::DuplicateName.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn duplicate_name_message_names_both_sources() {
        let err = GraphError::DuplicateName {
            name: "dup".into(),
            first: "a.yaml".into(),
            second: "b.yaml".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("\"dup\""), "{msg}");
        assert!(msg.contains("a.yaml") && msg.contains("b.yaml"), "{msg}");
        assert_eq!(err.code(), ErrorCode::DuplicateName);
    }

    #[test]
    fn validation_message_joins_all_problems() {
        let err = GraphError::Validation {
            problems: vec!["\"a\" -> \"b\": \"b\" not found".into(), "cycle".into()],
        };
        assert_eq!(
            err.to_string(),
            "graph validation failed: \"a\" -> \"b\": \"b\" not found; cycle"
        );
    }
}
