use honggfuzz::fuzz;
use utf8stream::{report, BufferedStream, ByteBuffer, Direction, Report};

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            let mut s = BufferedStream::from_buffer(ByteBuffer::from_slice(data), Direction::In, "fuzz");
            let valid = std::str::from_utf8(data).is_ok();
            if let Report::Failed(_) = report(&mut s) {
                assert!(!valid, "decoder rejected valid UTF-8");
            }
        });
    }
}
