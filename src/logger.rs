//! `log` backend keeping the latest operator messages for telemetry replay.

use core::fmt::{self, Write};

use hal::clock::Clock;
use heapless::{Deque, String};
use log::{Log, Metadata, Record};

pub const LINE_LENGTH: usize = 96;
pub const MAX_LINES: usize = 16;

pub type Line = String<LINE_LENGTH>;

/// Bounded ring of log lines, the oldest line is dropped when full
pub struct LogRing<const N: usize> {
    lines: spin::Mutex<Deque<Line, N>>,
}

impl<const N: usize> LogRing<N> {
    pub const fn new() -> Self {
        Self { lines: spin::Mutex::new(Deque::new()) }
    }

    pub fn push(&self, line: Line) {
        let mut lines = self.lines.lock();
        if lines.is_full() {
            lines.pop_front();
        }
        lines.push_back(line).ok();
    }

    /// Oldest line not yet consumed
    pub fn pop(&self) -> Option<Line> {
        self.lines.lock().pop_front()
    }

    pub fn for_each(&self, mut f: impl FnMut(&str)) {
        self.lines.lock().iter().for_each(|line| f(line.as_str()))
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static RING: LogRing<MAX_LINES> = LogRing::new();
static CLOCK: spin::Mutex<Option<&'static dyn Clock>> = spin::Mutex::new(None);

/// Keeps whatever fits and drops the rest
struct Truncating<'a>(&'a mut Line);

impl<'a> Write for Truncating<'a> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            self.0.push(c).map_err(|_| fmt::Error)?;
        }
        Ok(())
    }
}

fn format_line(millis: u32, record: &Record) -> Line {
    let mut line = Line::new();
    let mut writer = Truncating(&mut line);
    let (seconds, millis) = (millis / 1000, millis % 1000);
    match record.target() {
        "PTUN" => write!(writer, "[{:5}.{:03}] PTUN {}", seconds, millis, record.args()).ok(),
        _ => write!(writer, "[{:5}.{:03}] {}", seconds, millis, record.args()).ok(),
    };
    line
}

pub struct Logger;

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let millis = match *CLOCK.lock() {
            Some(clock) => clock.now().ticks(),
            None => 0,
        };
        let line = format_line(millis, record);
        #[cfg(any(test, feature = "std"))]
        println!("{}", line);
        RING.push(line);
    }

    fn flush(&self) {}
}

static LOGGER: Logger = Logger;

pub fn get() -> &'static LogRing<MAX_LINES> {
    &RING
}

pub fn init(clock: &'static dyn Clock, level: log::LevelFilter) {
    *CLOCK.lock() = Some(clock);
    log::set_max_level(level);
    log::set_logger(&LOGGER).ok();
}

mod test {
    #[test]
    fn test_format_line() {
        use log::{Level, Record};

        use super::{format_line, LINE_LENGTH};

        let line = format_line(
            12345,
            &Record::builder()
                .args(format_args!("Tuning: saved"))
                .level(Level::Info)
                .target("fw_attitude::tuning")
                .build(),
        );
        assert_eq!(line.as_str(), "[   12.345] Tuning: saved");

        let line = format_line(
            7,
            &Record::builder().args(format_args!("101 50 {:.5}", 0.16)).target("PTUN").build(),
        );
        assert_eq!(line.as_str(), "[    0.007] PTUN 101 50 0.16000");

        let long = "x".repeat(200);
        let line = format_line(0, &Record::builder().args(format_args!("{}", long)).build());
        assert!(line.len() <= LINE_LENGTH);
        assert!(line.starts_with("[    0.000] xxx"));
    }

    #[test]
    fn test_ring_drops_oldest() {
        use super::{Line, LogRing};

        let ring = LogRing::<3>::new();
        for i in 0..5 {
            let mut line = Line::new();
            core::fmt::Write::write_fmt(&mut line, format_args!("line {}", i)).unwrap();
            ring.push(line);
        }
        assert_eq!(ring.len(), 3);
        let mut lines = std::vec::Vec::new();
        ring.for_each(|line| lines.push(std::string::String::from(line)));
        assert_eq!(lines, ["line 2", "line 3", "line 4"]);
        assert_eq!(ring.pop().unwrap().as_str(), "line 2");
        assert_eq!(ring.len(), 2);
    }

    #[test]
    #[serial_test::serial]
    fn test_logger() {
        use hal::clock::ManualClock;

        static CLOCK: ManualClock = ManualClock::new(0);

        super::init(&CLOCK, log::LevelFilter::Info);
        CLOCK.set(61_250);
        info!("AutoTune: roll started {}", 0x5eed);
        debug!("not recorded {}", 0x5eed);

        let mut found = 0;
        super::get().for_each(|line| {
            if line.contains("24301") {
                assert_eq!(line, "[   61.250] AutoTune: roll started 24301");
                found += 1;
            }
        });
        assert_eq!(found, 1);
    }
}
