//! End-to-end graph construction from fixture directories on disk.

use std::fs;
use std::path::Path;

use pkgdag_core::graph::Registration;
use pkgdag_core::pipeline::PipelineCatalog;
use pkgdag_core::source::DirSource;
use pkgdag_core::{ErrorCode, Graph, GraphBuilder, GraphError};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn write(dir: &Path, rel: &str, body: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(path, body).expect("write fixture");
}

/// A small distribution: a toolchain that needs itself, a library with a
/// ranged set of subpackages and a provides-alias, and an application.
fn distro(dir: &Path) {
    write(
        dir,
        "gcc.yaml",
        r"
package:
  name: gcc
  version: 13.2.0
  epoch: 4
environment:
  contents:
    packages: [gcc, binutils, make]
subpackages:
  - name: libstdc++
  - name: gcc-doc
",
    );
    write(
        dir,
        "openssl.yaml",
        r#"
package:
  name: openssl
  version: 3.1.4
  epoch: "0"
  dependencies:
    provides:
      - libcrypto3=3.1.4
environment:
  contents:
    packages: [gcc, perl]
data:
  - name: engines
    items:
      afalg: "Linux AF_ALG engine"
      padlock: "VIA PadLock engine"
subpackages:
  - name: "openssl-engine-${{range.key}}"
    range: engines
  - name: openssl-dev
"#,
    );
    write(
        dir,
        "curl.yaml",
        r"
package:
  name: curl
  version: 8.4.0
  epoch: 1
environment:
  contents:
    packages: [libcrypto3, openssl-dev, gcc]
",
    );
    write(dir, "README.md", "not a package");
}

fn build_dir(dir: &Path) -> Result<Graph, GraphError> {
    Graph::build(&DirSource::new(dir))
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn builds_a_small_distribution() {
    let tmp = tempfile::tempdir().expect("tempdir");
    distro(tmp.path());
    let graph = build_dir(tmp.path()).expect("builds");

    assert_eq!(
        graph.nodes(),
        vec![
            "binutils",
            "curl",
            "gcc",
            "gcc-doc",
            "libcrypto3",
            "libstdc++",
            "make",
            "openssl",
            "openssl-dev",
            "openssl-engine-afalg",
            "openssl-engine-padlock",
            "perl",
        ]
    );
    assert_eq!(
        graph.dependencies_of("curl").expect("known"),
        vec!["gcc", "libcrypto3", "openssl-dev"]
    );
    assert_eq!(graph.dependencies_of("libcrypto3").expect("known"), vec!["openssl"]);
    assert_eq!(
        graph.dependencies_of("openssl-engine-afalg").expect("known"),
        vec!["openssl"]
    );
    assert!(graph.is_subpackage("openssl-engine-padlock"));
}

#[test]
fn self_hosting_toolchain_is_bootstrapped() {
    let tmp = tempfile::tempdir().expect("tempdir");
    distro(tmp.path());
    let graph = build_dir(tmp.path()).expect("builds");

    let warnings = graph.bootstrap_warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].package, "gcc");
    assert_eq!(warnings[0].requirement, "gcc");
    assert_eq!(
        graph.dependencies_of("gcc").expect("known"),
        vec!["binutils", "make"]
    );
}

#[test]
fn build_order_puts_requirements_first() {
    let tmp = tempfile::tempdir().expect("tempdir");
    distro(tmp.path());
    let graph = build_dir(tmp.path()).expect("builds");

    let order = graph.build_order().expect("acyclic");
    let pos = |name: &str| order.iter().position(|n| n == name).expect("present");
    assert!(pos("gcc") < pos("openssl"));
    assert!(pos("openssl") < pos("openssl-dev"));
    assert!(pos("openssl-dev") < pos("curl"));
    assert_eq!(order.first().map(String::as_str), Some("perl"));
    assert_eq!(order.last().map(String::as_str), Some("curl"));
}

#[test]
fn targets_follow_origin_version() {
    let tmp = tempfile::tempdir().expect("tempdir");
    distro(tmp.path());
    let graph = build_dir(tmp.path()).expect("builds");

    assert_eq!(
        graph.make_target("libstdc++", "aarch64").expect("registered"),
        "packages/aarch64/libstdc++-13.2.0-r4.apk"
    );
    assert_eq!(
        graph.make_target("libcrypto3", "x86_64").expect("registered"),
        "packages/x86_64/openssl-3.1.4-r0.apk"
    );
    let err = graph.make_target("perl", "x86_64").expect_err("external");
    assert_eq!(err.code(), ErrorCode::PackageNotFound);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn duplicate_documents_abort_the_build() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write(tmp.path(), "a.yaml", "package: { name: dup }");
    write(tmp.path(), "b.yaml", "package: { name: dup }");

    let err = build_dir(tmp.path()).expect_err("duplicate");
    let msg = err.to_string();
    assert!(msg.contains("a.yaml") && msg.contains("b.yaml"), "{msg}");
    assert_eq!(err.code(), ErrorCode::DuplicateName);
}

#[test]
fn empty_requirement_aborts_the_build() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write(tmp.path(), "ok.yaml", "package: { name: ok }");
    write(
        tmp.path(),
        "bad.yaml",
        "package: { name: bad }\nenvironment: { contents: { packages: [''] } }\n",
    );

    let err = build_dir(tmp.path()).expect_err("empty requirement");
    assert_eq!(err.code(), ErrorCode::MalformedConfig);
    assert!(err.to_string().contains("bad.yaml"), "{err}");
}

#[test]
fn unknown_roots_are_not_found() {
    let tmp = tempfile::tempdir().expect("tempdir");
    distro(tmp.path());
    let graph = build_dir(tmp.path()).expect("builds");

    let err = graph
        .subgraph_with_roots(["curl", "nonexistent"])
        .expect_err("unknown root");
    assert!(matches!(err, GraphError::NotFound { ref name } if name == "nonexistent"));

    // The failed query leaves the graph usable.
    assert_eq!(graph.sorted().expect("acyclic").len(), graph.node_count());
}

#[test]
fn missing_directory_is_unreadable() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let err = build_dir(&tmp.path().join("missing")).expect_err("no dir");
    assert_eq!(err.code(), ErrorCode::SourceUnreadable);
}

// ---------------------------------------------------------------------------
// Subgraphs, aliases, catalogs
// ---------------------------------------------------------------------------

#[test]
fn roots_subgraph_of_curl() {
    let tmp = tempfile::tempdir().expect("tempdir");
    distro(tmp.path());
    let graph = build_dir(tmp.path()).expect("builds");

    let sub = graph.subgraph_with_roots(["curl"]).expect("known");
    assert_eq!(
        sub.nodes(),
        vec!["binutils", "curl", "gcc", "libcrypto3", "make", "openssl", "openssl-dev", "perl"]
    );
    assert!(matches!(sub.registration("libcrypto3"), Some(Registration::Alias { .. })));
    assert_eq!(
        sub.make_target("openssl-dev", "x86_64").expect("copied registration"),
        "packages/x86_64/openssl-dev-3.1.4-r0.apk"
    );
}

#[test]
fn leaves_subgraph_of_openssl() {
    let tmp = tempfile::tempdir().expect("tempdir");
    distro(tmp.path());
    let graph = build_dir(tmp.path()).expect("builds");

    let sub = graph.subgraph_with_leaves(["openssl"]).expect("known");
    assert_eq!(
        sub.nodes(),
        vec![
            "curl",
            "libcrypto3",
            "openssl",
            "openssl-dev",
            "openssl-engine-afalg",
            "openssl-engine-padlock",
        ]
    );
    assert!(sub.edges().contains(&("curl".to_string(), "openssl-dev".to_string())));
}

#[test]
fn literal_package_shadows_alias_regardless_of_file_order() {
    for (provider, literal) in [("a-busybox.yaml", "z-sh.yaml"), ("z-busybox.yaml", "a-sh.yaml")] {
        let tmp = tempfile::tempdir().expect("tempdir");
        write(tmp.path(), provider, "package: { name: busybox, dependencies: { provides: [sh] } }");
        write(tmp.path(), literal, "package: { name: sh, version: '5.2', epoch: 1 }");

        let graph = build_dir(tmp.path()).expect("builds");
        assert_eq!(
            graph.make_target("sh", "x86_64").expect("registered"),
            "packages/x86_64/sh-5.2-r1.apk"
        );
    }
}

#[test]
fn pipeline_catalog_from_disk_adds_needs() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let pkgs = tmp.path().join("os");
    let pipes = tmp.path().join("pipelines");
    write(&pipes, "autoconf/make.yaml", "needs:\n  packages: [make]\npipeline:\n  - uses: autoconf/configure\n");
    write(&pipes, "autoconf/configure.yaml", "needs:\n  packages: [autoconf, automake]\n");
    write(&pkgs, "hello.yaml", "package: { name: hello }\npipeline:\n  - uses: autoconf/make\n");

    let catalog = PipelineCatalog::load(&DirSource::new(&pipes).recursive(), ".yaml").expect("catalog");
    let graph = GraphBuilder::new()
        .with_catalog(catalog)
        .build(&DirSource::new(&pkgs))
        .expect("builds");

    assert_eq!(
        graph.dependencies_of("hello").expect("known"),
        vec!["autoconf", "automake", "make"]
    );
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn concurrent_builds_agree() {
    let tmp = tempfile::tempdir().expect("tempdir");
    distro(tmp.path());

    let hashes: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| build_dir(tmp.path()).expect("builds").content_hash()))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("thread finished"))
            .collect()
    });

    assert!(hashes.windows(2).all(|w| w[0] == w[1]), "{hashes:?}");
}
