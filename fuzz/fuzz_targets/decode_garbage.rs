#![no_main]
use libfuzzer_sys::fuzz_target;

// Arbitrary bytes must produce an error or some output, never a panic.
fuzz_target!(|data: &[u8]| {
    let _ = huff::decode(data);
});
