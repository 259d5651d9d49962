#![no_main]

use libfuzzer_sys::fuzz_target;
use mocksmith::domain::services::route_registry;
use mocksmith::domain::value_objects::Slug;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let _ = route_registry::parse_entries(content);
        if let Ok(slug) = Slug::normalize("home") {
            let _ = route_registry::merge(Some(content), &slug, None);
        }
    }
});
