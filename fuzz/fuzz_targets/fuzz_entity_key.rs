#![no_main]

use libfuzzer_sys::fuzz_target;
use mocksmith::domain::value_objects::EntityKey;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data) {
        if let Ok(key) = raw.parse::<EntityKey>() {
            // A key that parses never names a parent directory
            assert!(!key.slug().as_str().split('/').any(|s| s == ".."));
            let _ = key.matches_selector(raw);
        }
    }
});
