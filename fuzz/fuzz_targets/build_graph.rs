#![no_main]

use libfuzzer_sys::fuzz_target;
use pkgdag_core::Graph;
use pkgdag_core::source::MemorySource;

// Split the input on NUL into documents; any graph that builds must sort.
fuzz_target!(|data: &[u8]| {
    let source: MemorySource = data
        .split(|&b| b == 0)
        .enumerate()
        .map(|(i, doc)| (format!("{i:04}.yaml"), doc.to_vec()))
        .collect();
    if let Ok(graph) = Graph::build(&source) {
        assert!(graph.sorted().is_ok());
        assert!(graph.validate().is_ok());
    }
});
