#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let packed = huff::encode(data).unwrap();
    let decoded = huff::decode(&packed[..]).unwrap();
    assert_eq!(data, &decoded[..]);
});
