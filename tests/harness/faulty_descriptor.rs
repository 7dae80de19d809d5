use std::cell::{Cell, RefCell};
use std::io::{Error, ErrorKind, Result};
use std::rc::Rc;
use utf8stream::Descriptor;

/// Syscall counts, shared with the test after the descriptor has been moved
/// into a stream.
#[derive(Default)]
pub struct Calls {
    pub reads: Cell<usize>,
    pub writes: Cell<usize>,
    pub closes: Cell<usize>,
}

pub enum FaultMode {
    None,
    /// Reads and writes move at most one byte per call.
    OneByteChunks,
    /// Every n-th call of each kind fails with `Interrupted`.
    InterruptedEvery(usize),
    /// The n-th read and all later ones fail.
    ReadErrorAt(usize),
    /// The n-th write and all later ones fail.
    WriteErrorAt(usize),
    /// Writes accept nothing.
    WriteZero,
    CloseError,
    /// The first close is interrupted, the retry succeeds.
    CloseInterruptedOnce,
}

/// An in-memory descriptor that injects faults and counts calls.
pub struct FaultyDescriptor {
    input: Vec<u8>,
    pos: usize,
    output: Rc<RefCell<Vec<u8>>>,
    calls: Rc<Calls>,
    mode: FaultMode,
}

impl FaultyDescriptor {
    pub fn new(input: impl Into<Vec<u8>>, mode: FaultMode) -> Self {
        Self {
            input: input.into(),
            pos: 0,
            output: Rc::default(),
            calls: Rc::default(),
            mode,
        }
    }

    #[allow(dead_code)]
    pub fn calls(&self) -> Rc<Calls> {
        Rc::clone(&self.calls)
    }

    #[allow(dead_code)]
    pub fn output(&self) -> Rc<RefCell<Vec<u8>>> {
        Rc::clone(&self.output)
    }
}

fn bump(counter: &Cell<usize>) -> usize {
    let n = counter.get() + 1;
    counter.set(n);
    n
}

impl Descriptor for FaultyDescriptor {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = bump(&self.calls.reads);
        let limit = match self.mode {
            FaultMode::InterruptedEvery(k) if k != 0 && n % k == 0 => {
                return Err(Error::from(ErrorKind::Interrupted));
            }
            FaultMode::ReadErrorAt(k) if n >= k => {
                return Err(Error::new(ErrorKind::Other, "simulated read failure"));
            }
            FaultMode::OneByteChunks => 1,
            _ => buf.len(),
        };
        let rest = &self.input[self.pos..];
        let take = rest.len().min(buf.len()).min(limit);
        buf[..take].copy_from_slice(&rest[..take]);
        self.pos += take;
        Ok(take)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let n = bump(&self.calls.writes);
        let limit = match self.mode {
            FaultMode::InterruptedEvery(k) if k != 0 && n % k == 0 => {
                return Err(Error::from(ErrorKind::Interrupted));
            }
            FaultMode::WriteErrorAt(k) if n >= k => {
                return Err(Error::new(ErrorKind::BrokenPipe, "simulated write failure"));
            }
            FaultMode::WriteZero => 0,
            FaultMode::OneByteChunks => 1,
            _ => buf.len(),
        };
        let take = buf.len().min(limit);
        self.output.borrow_mut().extend_from_slice(&buf[..take]);
        Ok(take)
    }

    fn close(&mut self) -> Result<()> {
        let n = bump(&self.calls.closes);
        match self.mode {
            FaultMode::CloseError => Err(Error::new(ErrorKind::Other, "simulated close failure")),
            FaultMode::CloseInterruptedOnce if n == 1 => Err(Error::from(ErrorKind::Interrupted)),
            FaultMode::InterruptedEvery(k) if k != 0 && n % k == 0 => {
                Err(Error::from(ErrorKind::Interrupted))
            }
            _ => Ok(()),
        }
    }
}
