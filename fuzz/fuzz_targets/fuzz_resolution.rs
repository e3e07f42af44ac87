//! Fuzz testing for client address normalization and allow-list parsing.
//!
//! Both run on untrusted input: header values come from clients and range
//! lists from operator configuration. Neither may panic, and a normalized
//! address must always round-trip through the allow-list check.
//!
//! # Running the Fuzz Tests
//!
//! ```bash
//! cargo +nightly install cargo-fuzz
//! cargo +nightly fuzz run fuzz_resolution -- -max_total_time=60
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use ip_guard::AllowList;
use ip_guard::middleware::normalize_candidate;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    // Header value path
    if let Some(ip) = normalize_candidate(s) {
        let everything = AllowList::parse(&["0.0.0.0/0", "::/0"]).unwrap_or_default();
        assert!(everything.contains(ip));
    }

    // Configuration path: treat the input as a comma-separated range list
    let entries: Vec<&str> = s.split(',').collect();
    if let Ok(list) = AllowList::parse(&entries) {
        assert!(list.len() == entries.len());
        let _ = list.is_allowed(s);
    }
});
