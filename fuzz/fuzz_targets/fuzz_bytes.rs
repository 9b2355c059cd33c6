#![no_main]
use libfuzzer_sys::fuzz_target;
use xmlcursor::XmlCursor;

fuzz_target!(|data: &[u8]| {
    // Encoding detection followed by a full walk. Should never panic.
    if let Ok(mut cursor) = XmlCursor::from_bytes(data) {
        while cursor.read() {}
    }
    if let Ok(mut cursor) = XmlCursor::create_with_label(data, "Shift_JIS") {
        while cursor.read() {}
    }
});
