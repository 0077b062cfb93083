//! Host test doubles
//!
//! Steppers and the clock write into one shared [`Journal`], so a test
//! can check the exact interleaving of moves, releases and waits.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::string::{String, ToString};
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;
use tally_hal::{ByteStore, CellAddress, MemoryStore, StoreError};

use crate::traits::{CoilStepper, CountDisplay, DisplayError, Snapshot, StepperError};

/// Which actuator an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motor {
    A,
    B,
}

/// One observable hardware action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Step(Motor, i32),
    Release(Motor),
    WaitMs(u32),
}

/// Shared, ordered record of hardware actions
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Entry>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: Entry) {
        self.0.borrow_mut().push(entry);
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Only the motion entries, waits dropped
    pub fn motion(&self) -> Vec<Entry> {
        self.entries()
            .into_iter()
            .filter(|e| !matches!(e, Entry::WaitMs(_)))
            .collect()
    }
}

/// Clock that advances instantly and remembers how long it was asked to wait
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    elapsed_ns: Rc<Cell<u64>>,
    journal: Option<Journal>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock that also journals millisecond waits
    pub fn journaled(journal: &Journal) -> Self {
        Self {
            elapsed_ns: Rc::default(),
            journal: Some(journal.clone()),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns.get() / 1_000_000
    }

    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_ns.get() / 1_000
    }

    fn advance(&self, ns: u64) {
        self.elapsed_ns.set(self.elapsed_ns.get() + ns);
    }
}

impl DelayNs for VirtualClock {
    async fn delay_ns(&mut self, ns: u32) {
        self.advance(u64::from(ns));
    }

    async fn delay_us(&mut self, us: u32) {
        self.advance(u64::from(us) * 1_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.advance(u64::from(ms) * 1_000_000);
        if let Some(journal) = &self.journal {
            journal.push(Entry::WaitMs(ms));
        }
    }
}

/// Stepper that journals its moves and can be told to fail
#[derive(Debug)]
pub struct MockStepper {
    motor: Motor,
    journal: Journal,
    energized: bool,
    position: i32,
    moves: usize,
    fail_on_move: Option<usize>,
}

impl MockStepper {
    pub fn new(motor: Motor, journal: &Journal) -> Self {
        Self {
            motor,
            journal: journal.clone(),
            energized: false,
            position: 0,
            moves: 0,
            fail_on_move: None,
        }
    }

    /// Make the `n`th move (0-based) fail after energizing the coils
    pub fn fail_on_move(mut self, n: usize) -> Self {
        self.fail_on_move = Some(n);
        self
    }

    pub fn position(&self) -> i32 {
        self.position
    }
}

impl CoilStepper for MockStepper {
    async fn step(&mut self, steps: i32) -> Result<(), StepperError> {
        let attempt = self.moves;
        self.moves += 1;
        self.energized = true;

        if self.fail_on_move == Some(attempt) {
            return Err(StepperError::PinFault);
        }

        self.position += steps;
        self.journal.push(Entry::Step(self.motor, steps));
        Ok(())
    }

    fn release(&mut self) -> Result<(), StepperError> {
        self.energized = false;
        self.journal.push(Entry::Release(self.motor));
        Ok(())
    }

    fn is_energized(&self) -> bool {
        self.energized
    }
}

/// Display that keeps everything it was asked to draw
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub greetings: Vec<String>,
    pub shown: Vec<Snapshot>,
    pub fail_greet: bool,
    pub fail_show: bool,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<Snapshot> {
        self.shown.last().copied()
    }
}

impl CountDisplay for RecordingDisplay {
    async fn greet(&mut self, greeting: &str) -> Result<(), DisplayError> {
        if self.fail_greet {
            return Err(DisplayError::Communication);
        }
        self.greetings.push(greeting.to_string());
        Ok(())
    }

    async fn show(&mut self, snapshot: Snapshot) -> Result<(), DisplayError> {
        if self.fail_show {
            return Err(DisplayError::Communication);
        }
        self.shown.push(snapshot);
        Ok(())
    }
}

/// Memory store with switchable read and write faults
#[derive(Debug)]
pub struct FlakyStore {
    inner: MemoryStore<4>,
    fail_reads: bool,
    fail_writes: bool,
}

impl FlakyStore {
    /// Store whose lifetime cell holds `lifetime`
    pub fn new(lifetime: u8) -> Self {
        Self {
            inner: MemoryStore::with_cells([lifetime, 0, 0, 0]),
            fail_reads: false,
            fail_writes: false,
        }
    }

    pub fn fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn lifetime(&self) -> u8 {
        self.inner.cell(CellAddress::LIFETIME_COUNT).unwrap_or_default()
    }

    pub fn writes(&self) -> u32 {
        self.inner.writes()
    }
}

impl ByteStore for FlakyStore {
    async fn read(&mut self, address: CellAddress) -> Result<u8, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Device);
        }
        self.inner.read(address).await
    }

    async fn write_if_changed(&mut self, address: CellAddress, value: u8) -> Result<bool, StoreError> {
        if self.fail_writes {
            return Err(StoreError::Device);
        }
        self.inner.write_if_changed(address, value).await
    }
}
