#![no_main]
//! Drives file-backed streams through a descriptor whose behavior per
//! syscall comes from the fuzz input: interrupted calls, hard failures,
//! and short transfers.
use libfuzzer_sys::fuzz_target;
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use utf8stream::{BufferedStream, Descriptor, Direction, Error};

struct ScriptedDescriptor<'a> {
    script: &'a [u8],
    step: usize,
    interrupted: bool,
    input: Vec<u8>,
    pos: usize,
    output: Rc<RefCell<Vec<u8>>>,
}

enum Step {
    Interrupted,
    Fail,
    Limit(usize),
}

impl<'a> ScriptedDescriptor<'a> {
    fn new(script: &'a [u8], input: Vec<u8>) -> Self {
        Self {
            script,
            step: 0,
            interrupted: false,
            input,
            pos: 0,
            output: Rc::default(),
        }
    }

    fn step(&mut self) -> Step {
        let Some(&b) = self.script.get(self.step % self.script.len().max(1)) else {
            return Step::Limit(usize::MAX);
        };
        self.step += 1;
        // never interrupt twice in a row, so every call eventually completes
        let interrupted = std::mem::replace(&mut self.interrupted, false);
        match b {
            0..=31 if !interrupted => {
                self.interrupted = true;
                Step::Interrupted
            }
            32 => Step::Fail,
            _ => Step::Limit(usize::from(b).max(1)),
        }
    }
}

impl Descriptor for ScriptedDescriptor<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let limit = match self.step() {
            Step::Interrupted => return Err(io::ErrorKind::Interrupted.into()),
            Step::Fail => return Err(io::Error::from_raw_os_error(5)),
            Step::Limit(n) => n,
        };
        let rest = &self.input[self.pos..];
        let n = rest.len().min(buf.len()).min(limit);
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let limit = match self.step() {
            Step::Interrupted => return Err(io::ErrorKind::Interrupted.into()),
            Step::Fail => return Err(io::Error::from_raw_os_error(28)),
            Step::Limit(n) => n,
        };
        let n = buf.len().min(limit);
        self.output.borrow_mut().extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn close(&mut self) -> io::Result<()> {
        match self.step() {
            Step::Interrupted => Err(io::ErrorKind::Interrupted.into()),
            _ => Ok(()),
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let [cap, script_len, rest @ ..] = data else {
        return;
    };
    let capacity = usize::from(*cap % 64) + 1;
    let (script, payload) = rest.split_at(usize::from(*script_len).min(rest.len()));

    // write path
    let d = ScriptedDescriptor::new(script, Vec::new());
    let written = Rc::clone(&d.output);
    let mut out = BufferedStream::from_descriptor_with_capacity(d, Direction::Out, "fuzz", capacity);
    let mut failed: Option<Error> = None;
    for &b in payload {
        if let Err(e) = out.putc(b) {
            // once latched, the same error comes back
            if let Some(prev) = &failed {
                assert_eq!(prev, &e);
            }
            failed = Some(e);
        }
    }
    let closed = out.close();
    assert!(out.is_closed());
    if failed.is_none() && closed.is_ok() {
        // nothing is lost or duplicated when every flush succeeded
        assert_eq!(&written.borrow()[..], payload);
    }

    // read path
    let d = ScriptedDescriptor::new(script, payload.to_vec());
    let mut input = BufferedStream::from_descriptor_with_capacity(d, Direction::In, "fuzz", capacity);
    let mut got = Vec::new();
    let mut error = None;
    loop {
        match input.getc() {
            Ok(Some(b)) => got.push(b),
            Ok(None) => break,
            Err(e) => {
                assert_eq!(input.getc(), Err(e.clone()));
                error = Some(e);
                break;
            }
        }
    }
    assert_eq!(&payload[..got.len()], &got[..]);
    if error.is_none() {
        assert_eq!(got.len(), payload.len());
        assert_eq!(input.getc(), Ok(None));
    }
    let _ = input.close();
});
