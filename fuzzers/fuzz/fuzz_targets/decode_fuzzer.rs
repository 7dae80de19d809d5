#![no_main]
use libfuzzer_sys::fuzz_target;
use utf8stream::{report, BufferedStream, ByteBuffer, Direction, Report};

fuzz_target!(|data: &[u8]| {
    let mut s = BufferedStream::from_buffer(ByteBuffer::from_slice(data), Direction::In, "fuzz");
    match report(&mut s) {
        Report::Completed(counts) => assert!(counts.chars <= data.len() as u64),
        Report::Failed(f) => {
            assert!(std::str::from_utf8(data).is_err());
            assert!(f.byte_position >= 1 && f.byte_position <= data.len() as u64);
        }
    }
});
