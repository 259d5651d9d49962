#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(html) = std::str::from_utf8(data) {
        // Mockup markup comes from designers' tools; parsing must never panic
        let _ = mocksmith::infrastructure::collaborators::markup_parser::parse_html(html);
    }
});
