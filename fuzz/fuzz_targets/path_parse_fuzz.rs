//! Fuzz test for the path grammar's parse/join round trip.
//!
//! This fuzz target feeds arbitrary byte sequences through `Path::parse`
//! to find:
//! - Panics or crashes on malformed escape sequences
//! - Infinite loops in token splitting
//! - Normalization that doesn't converge (re-parsing the wire form
//!   shouldn't change the token sequence)

#![no_main]

use aac_memory_core::Path;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let parsed = Path::parse(input);

        // Parsing should never panic, even on malformed `~`/`/` escapes.
        let wire = parsed.to_wire();

        // Re-parsing the normalized wire form must be a fixed point.
        let reparsed = Path::parse(&wire);
        assert_eq!(
            parsed.tokens(),
            reparsed.tokens(),
            "normalization should be idempotent for input {input:?}"
        );

        // Root always has zero tokens and wire form "/".
        if parsed.is_root() {
            assert_eq!(wire, "/");
        }
    }
});
