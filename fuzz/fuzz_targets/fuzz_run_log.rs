#![no_main]

use libfuzzer_sys::fuzz_target;
use mocksmith::domain::entities::{LatestState, RunLog};

fuzz_target!(|data: &[u8]| {
    // Run logs are read back from disk on every run; a corrupt one must not panic
    if let Ok(log) = serde_json::from_slice::<RunLog>(data) {
        let _ = LatestState::replay([log]);
    }
});
