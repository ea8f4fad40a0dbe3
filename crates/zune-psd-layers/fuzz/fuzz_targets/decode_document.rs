#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    use zune_psd_layers::zune_core::bytestream::ZCursor;
    let data = ZCursor::new(data);

    let mut decoder = zune_psd_layers::PSDDocumentDecoder::new(data);
    if let Ok(document) = decoder.decode() {
        // every layer must resolve to an in-range parent
        for index in 0..document.layers().len() {
            let _ = document.parent(index);
        }
    }
});
