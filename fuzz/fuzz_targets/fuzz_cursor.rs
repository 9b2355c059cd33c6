#![no_main]
use libfuzzer_sys::fuzz_target;
use xmlcursor::{CursorOptions, XmlCursor, XmlNodeType};

fuzz_target!(|data: &[u8]| {
    let Some((&ops, rest)) = data.split_first() else {
        return;
    };
    let Ok(s) = std::str::from_utf8(rest) else {
        return;
    };

    // Plain walk: every node, every attribute. Should never panic.
    let mut cursor = XmlCursor::with_options(s, CursorOptions::default().max_depth(64));
    while cursor.read() {
        let _ = (cursor.name(), cursor.value(), cursor.namespace_uri());
        while cursor.move_to_next_attribute() {
            let _ = (cursor.local_name(), cursor.prefix());
            if cursor.read_attribute_value() {
                let _ = (cursor.value(), cursor.depth());
            }
        }
        cursor.move_to_element();
    }

    // Mixed navigation driven by the leading byte.
    let mut cursor = XmlCursor::new(s);
    let mut step = 0u32;
    while cursor.read_element() && step < 10_000 {
        step += 1;
        match (u32::from(ops) + step) % 6 {
            0 => {
                let _ = cursor.skip();
            }
            1 => {
                let _ = cursor.read_inner_xml();
            }
            2 => {
                let _ = cursor.read_outer_xml();
            }
            3 => {
                let _ = cursor.read_string();
            }
            4 => {
                let name = cursor.name().unwrap_or_default().to_string();
                while cursor.read_element_until(&name) {}
            }
            _ => {
                if cursor.move_to_first_attribute() {
                    let _ = cursor.read_outer_xml();
                }
            }
        }
        if cursor.node_type() == XmlNodeType::None {
            break;
        }
    }
    cursor.close();
});
