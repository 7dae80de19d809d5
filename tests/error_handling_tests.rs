use std::io::ErrorKind;
use utf8stream::*;

use test_harness::TestHarness;

#[test]
fn test_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = BufferedStream::open_read(dir.path().join("nope.txt")).unwrap_err();
    match err {
        Error::Io(f) => {
            assert_eq!(f.kind(), ErrorKind::NotFound);
            assert!(!f.message().is_empty());
        }
        other => panic!("Expected Io error, got {other:?}"),
    }
}

#[test]
fn test_open_directory_for_writing() {
    let dir = tempfile::tempdir().unwrap();
    let result = BufferedStream::open(dir.path(), OpenFlags::WRONLY, 0);
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_operations_after_close() {
    let h = TestHarness::new();
    let mut w = h.writer();
    w.putc(b'a').unwrap();
    w.close().unwrap();
    assert!(w.is_closed());

    assert_eq!(w.putc(b'b'), Err(Error::stream_closed("putc")));
    assert_eq!(w.getc(), Err(Error::stream_closed("getc")));
    assert_eq!(w.flush(), Err(Error::stream_closed("flush")));
    assert_eq!(w.close(), Err(Error::AlreadyClosed));
    assert_eq!(h.contents(), b"a");
}

#[test]
fn test_closed_check_precedes_direction_check() {
    let h = TestHarness::new();
    let mut r = h.reader();
    r.close().unwrap();
    let err = r.putc(b'x').unwrap_err();
    assert_eq!(err.to_string(), "putc: stream is closed");
}

#[test]
fn test_memory_flush_is_a_no_op() {
    let mut s = BufferedStream::from_buffer(ByteBuffer::with_capacity(2), Direction::Out, "sink");
    s.putc(b'1').unwrap();
    s.flush().unwrap();
    s.flush().unwrap();
    assert_eq!(s.buffer().filled(), b"1");
}

#[test]
fn test_out_of_space_is_not_sticky_state_damage() {
    let mut s = BufferedStream::from_buffer(ByteBuffer::with_capacity(1), Direction::Out, "sink");
    s.putc(b'1').unwrap();
    assert_eq!(s.putc(b'2'), Err(Error::OutOfSpace));
    assert_eq!(s.putc(b'3'), Err(Error::OutOfSpace));
    assert_eq!(s.buffer().filled(), b"1");
    s.close().unwrap();
}

#[test]
fn test_decode_errors_are_classified() {
    let cases: &[(&[u8], &str)] = &[
        (&[0x80], "invalid start byte decoding UTF-8 (0x80)"),
        (&[0xFE], "invalid start byte decoding UTF-8 (0xfe)"),
        (&[0xE2, 0x28, 0xA1], "invalid continuation byte decoding UTF-8 (byte #2)"),
        (&[0xF0, 0x90, 0x8D], "premature EOF decoding UTF-8 (byte #4)"),
        (&[0xF4, 0x90, 0x80, 0x80], "invalid unicode codepoint (0x110000)"),
    ];
    for (bytes, message) in cases {
        let mut s = BufferedStream::from_buffer(ByteBuffer::from_slice(bytes), Direction::In, "buf");
        let err = next_codepoint(&mut s).unwrap_err();
        assert!(err.is_decode(), "{err:?}");
        assert_eq!(err.to_string(), *message);
    }
}

#[test]
fn test_decoder_resumes_after_an_error() {
    // The offending bytes are consumed; decoding continues behind them.
    let mut s = BufferedStream::from_buffer(ByteBuffer::from_slice(b"\xC3A!"), Direction::In, "buf");
    assert_eq!(
        next_codepoint(&mut s),
        Err(Error::InvalidContinuationByte { index: 2 })
    );
    assert_eq!(next_codepoint(&mut s), Ok(Some(u32::from(b'!'))));
    assert_eq!(next_codepoint(&mut s), Ok(None));
}

#[test]
fn test_report_failure_keeps_stream_open() {
    let h = TestHarness::new();
    h.set_contents(b"ok\n\xFF tail");
    let mut s = h.reader();
    let r = report(&mut s);
    assert!(r.is_failure());
    assert!(!s.is_closed());
    let Report::Failed(f) = r else { unreachable!() };
    assert_eq!(f.byte_position, 4);
    assert_eq!(f.line, 2);
    assert_eq!(f.column, 1);
    s.close().unwrap();
}
