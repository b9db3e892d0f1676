//! Build target naming.

/// Architecture used when none is configured.
pub const DEFAULT_ARCH: &str = "x86_64";

/// Render the artifact path of one package build.
///
/// ```
/// use pkgdag_core::target::target_path;
/// assert_eq!(
///     target_path("foo", "1.2.3", "0", "x86_64"),
///     "packages/x86_64/foo-1.2.3-r0.apk"
/// );
/// ```
#[must_use]
pub fn target_path(name: &str, version: &str, epoch: &str, arch: &str) -> String {
    format!("packages/{arch}/{name}-{version}-r{epoch}.apk")
}

/// Map Go/Docker style architecture names onto the ones used in artifact
/// paths. Unknown names pass through unchanged.
#[must_use]
pub fn normalize_arch(arch: &str) -> &str {
    match arch {
        "amd64" => "x86_64",
        "arm64" => "aarch64",
        other => other,
    }
}
