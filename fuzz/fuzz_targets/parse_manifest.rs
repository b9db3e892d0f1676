#![no_main]

use libfuzzer_sys::fuzz_target;
use pkgdag_core::PackageConfig;
use pkgdag_core::pipeline::PipelineCatalog;

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = PackageConfig::from_slice(data) {
        let _ = config.subpackage_names().count();
        let _ = config.provided_names();
        let _ = config.requirements(&PipelineCatalog::default());
        let _ = config.fetch_uris();
    }
});
