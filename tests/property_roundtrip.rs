use proptest::prelude::*;
use utf8stream::*;

use test_harness::{read_all, write_all, TestHarness};

/// Decodes `bytes` until end of input or the first error.
fn decode(bytes: &[u8]) -> Result<Vec<Codepoint>> {
    let mut s = BufferedStream::from_buffer(ByteBuffer::from_slice(bytes), Direction::In, "prop");
    let mut out = Vec::new();
    codepoints(&mut s).process_all(|cp| {
        out.push(cp);
        Ok(())
    })?;
    Ok(out)
}

proptest! {
    #[test]
    fn valid_utf8_decodes_like_std(ref text in any::<String>()) {
        let decoded = decode(text.as_bytes()).unwrap();
        let expected: Vec<Codepoint> = text.chars().map(Codepoint::from).collect();
        prop_assert_eq!(decoded, expected);
    }

    #[test]
    fn decoder_errors_imply_invalid_utf8(ref data in proptest::collection::vec(any::<u8>(), 0..256)) {
        if decode(data).is_err() {
            prop_assert!(std::str::from_utf8(data).is_err());
        }
    }

    #[test]
    fn decoding_arbitrary_bytes_terminates(ref data in proptest::collection::vec(any::<u8>(), 0..512)) {
        // Keep decoding past errors; every call consumes at least one byte.
        let mut s = BufferedStream::from_buffer(ByteBuffer::from_slice(data), Direction::In, "prop");
        let mut calls = 0usize;
        loop {
            calls += 1;
            prop_assert!(calls <= data.len() + 1);
            match next_codepoint(&mut s) {
                Ok(None) => break,
                Ok(Some(cp)) => prop_assert!(cp <= MAX_CODEPOINT),
                Err(e) => prop_assert!(e.is_decode()),
            }
        }
        prop_assert_eq!(s.consumed(), data.len() as u64);
    }

    #[test]
    fn report_counts_match_std(ref text in "[a-zé€😀\r\n]{0,200}") {
        let mut s = BufferedStream::from_buffer(ByteBuffer::from_slice(text.as_bytes()), Direction::In, "prop");
        let Report::Completed(c) = report(&mut s) else {
            return Err(TestCaseError::fail("valid text failed to decode"));
        };
        prop_assert_eq!(c.chars, text.chars().count() as u64);
        let crlf = text.matches("\r\n").count() as u64;
        prop_assert_eq!(c.crlf, crlf);
        prop_assert_eq!(c.lf, text.matches('\n').count() as u64 - crlf);
        prop_assert_eq!(c.cr, text.matches('\r').count() as u64 - crlf);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn file_round_trip_any_capacity(
        ref data in proptest::collection::vec(any::<u8>(), 0..4096),
        write_cap in 1usize..64,
        read_cap in 1usize..64,
    ) {
        let h = TestHarness::new();
        write_all(h.writer_with_capacity(write_cap), data);
        let back = read_all(h.reader_with_capacity(read_cap));
        prop_assert_eq!(&back, data);
    }
}
