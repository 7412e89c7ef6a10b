#![no_main]

use libfuzzer_sys::fuzz_target;
use marker_callers::config::AnalysisConfig;
use marker_callers::source::CaptureFile;

fuzz_target!(|data: &[u8]| {
    // Any capture that parses must analyze without panicking
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(capture) = CaptureFile::from_json_str(input) {
            let config = AnalysisConfig::default();
            let _ = marker_callers::analyze(&capture, &config);
        }
    }
});
