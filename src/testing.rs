//! Recording fakes for the hardware and collaborators, host tests only.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::convert::Infallible;
use std::rc::Rc;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::spi::{self, ErrorKind, SpiBus};

use crate::config::Timing;
use crate::framebuffer::BlobStore;
use crate::gd7965::driver::Gd7965;
use crate::lifecycle::{Clock, Panel, PowerControl};

/// Everything the fake hardware observed, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Cs(bool),
    Dc(bool),
    Rst(bool),
    Write(Vec<u8>),
    Read(usize),
    DelayMs(u32),
}

type Log = Rc<RefCell<Vec<Event>>>;

/// Shared state behind one set of fake panel lines
#[derive(Default)]
pub struct Hardware {
    log: Log,
    fail_writes: Rc<Cell<bool>>,
    writes_left: Rc<Cell<Option<usize>>>,
    read_bytes: Rc<RefCell<VecDeque<u8>>>,
    busy_levels: Rc<RefCell<VecDeque<bool>>>,
    busy_reads: Rc<Cell<usize>>,
}

pub type FakeGd7965 = Gd7965<FakeBus, FakePin, FakePin, FakePin, FakeBusy, FakeDelay>;

impl Hardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bus(&self) -> FakeBus {
        FakeBus {
            log: self.log.clone(),
            fail_writes: self.fail_writes.clone(),
            writes_left: self.writes_left.clone(),
            read_bytes: self.read_bytes.clone(),
        }
    }

    pub fn cs(&self) -> FakePin {
        FakePin::new(self.log.clone(), Event::Cs)
    }

    pub fn dc(&self) -> FakePin {
        FakePin::new(self.log.clone(), Event::Dc)
    }

    pub fn rst(&self) -> FakePin {
        FakePin::new(self.log.clone(), Event::Rst)
    }

    pub fn busy(&self) -> FakeBusy {
        FakeBusy {
            levels: self.busy_levels.clone(),
            reads: self.busy_reads.clone(),
        }
    }

    pub fn delay(&self) -> FakeDelay {
        FakeDelay {
            log: self.log.clone(),
        }
    }

    /// Driver wired to this hardware, already through `init`
    pub fn driver(&self, timing: Timing) -> FakeGd7965 {
        let mut driver = Gd7965::new(
            self.bus(),
            self.cs(),
            self.dc(),
            self.rst(),
            self.busy(),
            self.delay(),
            timing,
        );
        driver.init().unwrap();
        self.clear();
        driver
    }

    pub fn events(&self) -> Vec<Event> {
        self.log.borrow().clone()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Let `count` more bus writes through, then fail every one after
    pub fn fail_writes_after(&self, count: usize) {
        self.writes_left.set(Some(count));
    }

    pub fn queue_read(&self, bytes: &[u8]) {
        self.read_bytes.borrow_mut().extend(bytes);
    }

    /// Seven byte answer to the revision command ending in `code`
    pub fn queue_revision(&self, code: u8) {
        self.queue_read(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00, code]);
    }

    /// Busy line levels returned by the next reads, `true` is idle
    pub fn queue_busy(&self, levels: &[bool]) {
        self.busy_levels.borrow_mut().extend(levels);
    }

    pub fn busy_reads(&self) -> usize {
        self.busy_reads.get()
    }

    /// Total time spent in delays
    pub fn delayed_ms(&self) -> u32 {
        self.log
            .borrow()
            .iter()
            .map(|e| match e {
                Event::DelayMs(ms) => *ms,
                _ => 0,
            })
            .sum()
    }

    /// Command bytes paired with the data that followed them
    pub fn commands(&self) -> Vec<(u8, Vec<u8>)> {
        let mut out: Vec<(u8, Vec<u8>)> = Vec::new();
        let mut data_phase = false;
        for event in self.log.borrow().iter() {
            match event {
                Event::Dc(high) => data_phase = *high,
                Event::Write(bytes) if !data_phase => {
                    out.extend(bytes.iter().map(|&b| (b, Vec::new())));
                }
                Event::Write(bytes) => {
                    if let Some((_, data)) = out.last_mut() {
                        data.extend_from_slice(bytes);
                    }
                }
                _ => {}
            }
        }
        out
    }

    pub fn command_codes(&self) -> Vec<u8> {
        self.commands().into_iter().map(|(code, _)| code).collect()
    }
}

pub struct FakeBus {
    log: Log,
    fail_writes: Rc<Cell<bool>>,
    writes_left: Rc<Cell<Option<usize>>>,
    read_bytes: Rc<RefCell<VecDeque<u8>>>,
}

impl spi::ErrorType for FakeBus {
    type Error = ErrorKind;
}

impl SpiBus for FakeBus {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(Event::Read(words.len()));
        let mut queued = self.read_bytes.borrow_mut();
        for word in words.iter_mut() {
            *word = queued.pop_front().unwrap_or(0);
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        if self.fail_writes.get() {
            return Err(ErrorKind::Other);
        }
        match self.writes_left.get() {
            Some(0) => return Err(ErrorKind::Other),
            Some(n) => self.writes_left.set(Some(n - 1)),
            None => {}
        }
        self.log.borrow_mut().push(Event::Write(words.to_vec()));
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        self.write(write)?;
        self.read(read)
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        let outgoing = words.to_vec();
        self.transfer(words, &outgoing)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

pub struct FakePin {
    log: Log,
    event: fn(bool) -> Event,
}

impl FakePin {
    fn new(log: Log, event: fn(bool) -> Event) -> Self {
        Self { log, event }
    }
}

impl digital::ErrorType for FakePin {
    type Error = Infallible;
}

impl OutputPin for FakePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push((self.event)(false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push((self.event)(true));
        Ok(())
    }
}

/// Busy input, reads high (idle) once the queued levels run out
pub struct FakeBusy {
    levels: Rc<RefCell<VecDeque<bool>>>,
    reads: Rc<Cell<usize>>,
}

impl digital::ErrorType for FakeBusy {
    type Error = Infallible;
}

impl InputPin for FakeBusy {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.reads.set(self.reads.get() + 1);
        Ok(self.levels.borrow_mut().pop_front().unwrap_or(true))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

pub struct FakeDelay {
    log: Log,
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_ms(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.log.borrow_mut().push(Event::DelayMs(ms));
    }
}

/// Blob store whose operations can be made to fail
#[derive(Default)]
pub struct FlakyStore {
    pub blobs: HashMap<String, Vec<u8>>,
    pub fail_open: bool,
    pub fail_write: bool,
    pub fail_commit: bool,
    pub commits: usize,
}

impl BlobStore for FlakyStore {
    type Error = &'static str;

    fn blob_len(&mut self, key: &str) -> Result<Option<usize>, Self::Error> {
        if self.fail_open {
            return Err("open failed");
        }
        Ok(self.blobs.get(key).map(Vec::len))
    }

    fn read_blob(&mut self, key: &str, buf: &mut [u8]) -> Result<(), Self::Error> {
        let blob = self.blobs.get(key).ok_or("not found")?;
        buf.copy_from_slice(blob);
        Ok(())
    }

    fn write_blob(&mut self, key: &str, data: &[u8]) -> Result<(), Self::Error> {
        if self.fail_open {
            return Err("open failed");
        }
        if self.fail_write {
            return Err("write failed");
        }
        self.blobs.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), Self::Error> {
        if self.fail_commit {
            return Err("commit failed");
        }
        self.commits += 1;
        Ok(())
    }
}

/// Panel stand-in recording which operations ran
#[derive(Default)]
pub struct FakePanel {
    pub calls: Rc<RefCell<Vec<&'static str>>>,
    pub transferred: Rc<RefCell<Vec<Vec<u8>>>>,
    pub failing: Option<&'static str>,
}

impl FakePanel {
    fn record(&mut self, op: &'static str) -> Result<(), String> {
        self.calls.borrow_mut().push(op);
        if self.failing == Some(op) {
            return Err(format!("{} failed", op));
        }
        Ok(())
    }
}

impl Panel for FakePanel {
    type Error = String;

    fn init(&mut self) -> Result<(), Self::Error> {
        self.record("init")
    }

    fn configure(&mut self) -> Result<(), Self::Error> {
        self.record("configure")
    }

    fn transfer(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        self.transferred.borrow_mut().push(frame.to_vec());
        self.record("transfer")
    }

    fn refresh(&mut self) -> Result<(), Self::Error> {
        self.record("refresh")
    }

    fn low_power_mode(&mut self) -> Result<(), Self::Error> {
        self.record("low_power_mode")
    }
}

#[derive(Default)]
pub struct FakePower {
    pub suspends: Rc<Cell<usize>>,
}

impl PowerControl for FakePower {
    type Error = Infallible;

    fn suspend(&mut self) -> Result<(), Self::Error> {
        self.suspends.set(self.suspends.get() + 1);
        Ok(())
    }
}

/// Clock that only moves when told to, or when the loop sleeps
#[derive(Default, Clone)]
pub struct FakeClock {
    now: Rc<Cell<Duration>>,
}

impl FakeClock {
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}
