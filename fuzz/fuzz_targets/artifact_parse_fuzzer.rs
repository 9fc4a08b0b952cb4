//! Fuzz target for reading transition artifacts
//!
//! # Invariants
//!
//! - NEVER panic on malformed artifact text
//! - Every parsed row has the width of the first row
//! - Parsed edges render back to rows of the input

#![no_main]

use boolnet_runner::parse_transitions;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|text: &str| {
    let Ok(edges) = parse_transitions(text) else {
        return;
    };

    if let Some(first) = edges.first() {
        let width = first.from.len();
        for edge in &edges {
            assert_eq!(edge.from.len(), width);
            assert_eq!(edge.to.len(), width);
        }
    }

    let rows: Vec<&str> = text.lines().skip(1).filter(|row| !row.is_empty()).collect();
    assert_eq!(rows.len(), edges.len());
    for (row, edge) in rows.iter().zip(&edges) {
        assert_eq!(*row, edge.to_string());
    }
});
