#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Part parser on arbitrary XML, bypassing the ZIP layer
    if let Ok(xml) = std::str::from_utf8(data) {
        let _ = bambu3mf::parser::parse_part("3D/3dmodel.model", xml);
    }
});
