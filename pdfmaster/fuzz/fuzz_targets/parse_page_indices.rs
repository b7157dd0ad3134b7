#![no_main]

use libfuzzer_sys::fuzz_target;
use pdfmaster::parse_page_indices;

fuzz_target!(|data: (String, u16)| {
    let (spec, total) = data;
    let total = usize::from(total);

    let indices = parse_page_indices(&spec, total);

    // Every index points at an existing page, and no page is listed twice
    assert!(indices.iter().all(|&index| index < total));
    assert!(indices.windows(2).all(|pair| pair[0] < pair[1]));
});
