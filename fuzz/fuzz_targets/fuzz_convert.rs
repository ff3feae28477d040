#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Full pipeline: ZIP extraction -> part parsing -> resolution -> emission
    let config = bambu3mf::ConvertConfig::default();
    let _ = bambu3mf::convert(Cursor::new(data), Cursor::new(Vec::new()), &[], &config);
});
