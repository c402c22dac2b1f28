//! Transmitter driven in-flight tuning.
//!
//! A knob channel is mapped onto one parameter of the selected tuning set,
//! relative to the value it had when the knob last crossed its mid-point.
//! A selector switch steps through the set, re-centers or commits. Live
//! changes stay uncommitted until saved and are reverted from the persisted
//! values otherwise.

pub mod config;
pub mod directory;
pub mod plane;
pub mod selector;

#[cfg(not(feature = "std"))]
use micromath::F32Ext;

use hal::clock::{Clock, Millis};
use hal::receiver::{PulseWidth, Receiver};

pub use config::TuningConfig;
use directory::{Directory, ParmId, Parms, Selection};
use selector::{Gesture, Selector};

/// Knob updates are processed at 10Hz at most
const CHECK_INTERVAL_MS: u32 = 100;
/// A longer gap makes the current knob position the reference again
const STALE_INPUT_MS: u32 = 500;
const NOISE_THRESHOLD: f32 = 0.01;
const DEAD_ZONE: f32 = 0.02;
const ERROR_WARNING_INTERVAL_MS: u32 = 2000;

pub type FlightMode = u8;

/// Vehicle specific access to the tunable parameters
pub trait TuningTarget {
    fn directory(&self) -> &'static Directory;
    /// `None` for a parameter the vehicle does not have
    fn get_value(&self, parm: ParmId) -> Option<f32>;
    /// Live value only
    fn set_value(&self, parm: ParmId, value: f32);
    fn save_value(&self, parm: ParmId);
    /// Back to the persisted value
    fn reload_value(&self, parm: ParmId);

    /// Oscillation measure of the controller the parameter belongs to
    fn controller_error(&self, _parm: ParmId) -> f32 {
        0.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum State {
    Idle,
    WaitCenter,
    Active,
}

/// Logged as PTUN whenever the knob moves a parameter
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct TuningEvent {
    pub time_ms: u32,
    pub set: i16,
    pub parm: ParmId,
    pub value: f32,
    pub center: f32,
}

#[derive(Copy, Clone, Debug)]
struct Session {
    set: i16,
    parms: Parms,
    index: usize,
    parm: ParmId,
    center_value: f32,
    /// Bit per index in `parms`, set when the live value differs from the persisted one
    need_revert: u32,
    mid_point_wait: bool,
}

impl Session {
    fn new(set: i16, parms: Parms, parm: ParmId) -> Self {
        Self { set, parms, index: 0, parm, center_value: 0.0, need_revert: 0, mid_point_wait: true }
    }

    fn re_center(&mut self, target: &dyn TuningTarget) {
        if let Some(value) = target.get_value(self.parm) {
            self.center_value = value;
        }
        self.mid_point_wait = true;
    }

    fn flagged(&self) -> impl Iterator<Item = ParmId> + '_ {
        (0..self.parms.len())
            .filter(move |&i| self.need_revert & bit(i) != 0)
            .filter_map(move |i| self.parms.get(i))
    }

    fn revert(&mut self, target: &dyn TuningTarget) -> bool {
        if self.need_revert == 0 {
            return false;
        }
        self.flagged().for_each(|parm| target.reload_value(parm));
        self.need_revert = 0;
        true
    }
}

fn bit(index: usize) -> u32 {
    1u32.checked_shl(index as u32).unwrap_or(0)
}

fn normalize(pulse: PulseWidth, min: i16, max: i16) -> Option<f32> {
    if max <= min {
        return None;
    }
    let ratio = (pulse as f32 - min as f32) / (max as f32 - min as f32);
    Some((ratio * 2.0 - 1.0).max(-1.0).min(1.0))
}

fn lerp(low: f32, high: f32, ratio: f32) -> f32 {
    low + (high - low) * ratio
}

pub struct Tuner<'a> {
    config: &'a TuningConfig,
    target: &'a dyn TuningTarget,
    receiver: &'a dyn Receiver,
    clock: &'a dyn Clock,
    session: Option<Session>,
    selector: Selector,
    set_position: Option<usize>,
    flight_mode: Option<FlightMode>,
    last_check: Option<u32>,
    last_channel_value: f32,
    last_error_warning: Option<u32>,
    rejected: Option<i16>,
    last_event: Option<TuningEvent>,
}

impl<'a> Tuner<'a> {
    pub fn new(
        config: &'a TuningConfig,
        target: &'a dyn TuningTarget,
        receiver: &'a dyn Receiver,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            config,
            target,
            receiver,
            clock,
            session: None,
            selector: Selector::new(),
            set_position: None,
            flight_mode: None,
            last_check: None,
            last_channel_value: 0.0,
            last_error_warning: None,
            rejected: None,
            last_event: None,
        }
    }

    /// Called once per radio frame
    pub fn on_radio_frame(&mut self, flight_mode: FlightMode) {
        let parmset = self.parmset();
        if self.config.channel.get() == 0 || parmset <= 0 {
            if self.session.is_some() {
                self.stop();
                self.session = None;
                info!("Tuning: disabled");
            }
            self.flight_mode = Some(flight_mode);
            return;
        }

        if self.flight_mode != Some(flight_mode) {
            if self.flight_mode.is_some() {
                self.on_mode_change();
            }
            self.flight_mode = Some(flight_mode);
        }

        let now = self.clock.now().ticks();
        let elapsed = self.last_check.map(|last| now.wrapping_sub(last));
        if elapsed.map_or(false, |elapsed| elapsed < CHECK_INTERVAL_MS) {
            return;
        }
        self.last_check = Some(now);

        let pulse = match self.read_channel(self.config.channel.get()) {
            Some(pulse) => pulse,
            None => return,
        };
        if !self.select(parmset) {
            return;
        }
        self.check_selector(now);

        let (min, max) = (self.config.channel_min.get(), self.config.channel_max.get());
        let value = match normalize(pulse, min, max) {
            Some(value) => value,
            None => return,
        };
        if elapsed.map_or(true, |elapsed| elapsed > STALE_INPUT_MS) {
            self.last_channel_value = value;
        }

        self.check_controller_error(now);

        if (value - self.last_channel_value).abs() < NOISE_THRESHOLD {
            return;
        }
        self.apply(value, now);
    }

    fn apply(&mut self, value: f32, now: u32) {
        let target = self.target;
        let session = match self.session.as_mut() {
            Some(session) => session,
            None => return,
        };
        if session.mid_point_wait {
            let last = self.last_channel_value;
            if (value > DEAD_ZONE && last > 0.0) || (value < -DEAD_ZONE && last < 0.0) {
                return;
            }
            session.mid_point_wait = false;
            if let Some(center) = target.get_value(session.parm) {
                session.center_value = center;
            }
            info!("Tuning: mid-point {}", target.directory().name(session.parm));
        }
        self.last_channel_value = value;

        let range = self.config.effective_range();
        let center = session.center_value;
        let new_value = if value > 0.0 {
            lerp(center, center * range, value)
        } else {
            lerp(center / range, center, value + 1.0)
        };
        session.need_revert |= bit(session.index);
        target.set_value(session.parm, new_value);

        let event = TuningEvent {
            time_ms: now,
            set: session.set,
            parm: session.parm,
            value: new_value,
            center,
        };
        info!(
            target: "PTUN",
            "{} {} {} {:.5} {:.5}",
            event.time_ms,
            event.set,
            event.parm,
            event.value,
            event.center
        );
        self.last_event = Some(event);
    }

    fn parmset(&mut self) -> i16 {
        let channel = self.config.set_selector.get();
        if channel == 0 {
            return self.config.parmset.get();
        }
        if let Some(pulse) = self.read_channel(channel) {
            let position = selector::third(pulse);
            if self.set_position != Some(position) {
                self.set_position = Some(position);
                debug!("Tuning: set selector at {}", position);
            }
        }
        self.config.parmset_for(self.set_position.unwrap_or(0))
    }

    fn read_channel(&self, channel: u8) -> Option<PulseWidth> {
        if channel == 0 || !self.receiver.has_valid_input() {
            return None;
        }
        let index = channel as usize - 1;
        if index >= self.receiver.num_channel() {
            return None;
        }
        Some(self.receiver.get_channel(index))
    }

    /// Returns whether there is a session to drive with `parmset`
    fn select(&mut self, parmset: i16) -> bool {
        if self.session.map_or(false, |session| session.set == parmset) {
            return true;
        }
        let directory = self.target.directory();
        let reason = match directory.resolve(parmset) {
            Selection::Parms(parms) => match parms.get(0) {
                Some(parm) if self.target.get_value(parm).is_some() => {
                    self.enter(parmset, parms, parm);
                    return true;
                }
                _ => "unknown parameter",
            },
            Selection::EmptySet => "empty set",
            Selection::UnknownSet => "unknown set",
            Selection::Disabled => return false,
        };
        if self.rejected != Some(parmset) {
            warn!("Tuning: rejected parameter set {}, {}", parmset, reason);
            self.rejected = Some(parmset);
        }
        false
    }

    fn enter(&mut self, parmset: i16, parms: Parms, parm: ParmId) {
        if let Some(mut previous) = self.session.take() {
            if previous.revert(self.target) {
                info!("Tuning: reverted set {}", previous.set);
            }
        }
        let mut session = Session::new(parmset, parms, parm);
        session.re_center(self.target);
        self.session = Some(session);
        self.rejected = None;
        info!("Tuning: started {}", self.target.directory().name(parm));
    }

    fn on_mode_change(&mut self) {
        let target = self.target;
        let mode_revert = self.config.mode_revert.get();
        if let Some(session) = self.session.as_mut() {
            if mode_revert && session.revert(target) {
                info!("Tuning: reverted");
            }
            session.re_center(target);
        }
    }

    fn check_selector(&mut self, now: u32) {
        let pulse = match self.read_channel(self.config.selector.get()) {
            Some(pulse) => pulse,
            None => return,
        };
        let pending = self.session.map_or(false, |session| session.need_revert != 0);
        match self.selector.update(pulse, Millis::millis(now), pending) {
            Some(Gesture::NextParameter) => self.next_parameter(),
            Some(Gesture::ReCenter) => {
                self.re_center();
                if let Some(name) = self.current_name() {
                    info!("Tuning: re-centered {}", name);
                }
            }
            Some(Gesture::Commit) => self.commit(),
            None => (),
        }
    }

    fn check_controller_error(&mut self, now: u32) {
        let parm = match self.session {
            Some(session) => session.parm,
            None => return,
        };
        let error = self.target.controller_error(parm);
        if !(error > self.config.error_threshold.get()) {
            return;
        }
        let due = self.last_error_warning.map_or(true, |last| {
            now.wrapping_sub(last) > ERROR_WARNING_INTERVAL_MS
        });
        if due {
            warn!("Tuning: error {:.2}", error);
            self.last_error_warning = Some(now);
        }
    }

    /// Moves to the next parameter of the set, wrapping to the first
    pub fn next_parameter(&mut self) {
        let target = self.target;
        if let Some(session) = self.session.as_mut() {
            let index = (session.index + 1) % session.parms.len().max(1);
            if let Some(parm) = session.parms.get(index) {
                session.index = index;
                session.parm = parm;
                session.re_center(target);
                info!("Tuning: started {}", target.directory().name(parm));
            }
        }
    }

    /// Makes the current value the knob's mid-point value
    pub fn re_center(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.re_center(self.target);
        }
    }

    /// Persists every changed parameter of the set
    pub fn commit(&mut self) {
        let target = self.target;
        if let Some(session) = self.session.as_mut() {
            session.flagged().for_each(|parm| target.save_value(parm));
            session.need_revert = 0;
            session.re_center(target);
            info!("Tuning: saved");
        }
    }

    /// Discards every uncommitted change of the set
    pub fn revert(&mut self) {
        let target = self.target;
        if let Some(session) = self.session.as_mut() {
            if session.revert(target) {
                info!("Tuning: reverted");
            }
            session.re_center(target);
        }
    }

    /// Leaving tuning, e.g. on landing, uncommitted changes are reverted
    pub fn stop(&mut self) {
        self.revert()
    }

    pub fn state(&self) -> State {
        match self.session {
            None => State::Idle,
            Some(session) if session.mid_point_wait => State::WaitCenter,
            Some(_) => State::Active,
        }
    }

    pub fn current_set(&self) -> Option<i16> {
        self.session.map(|session| session.set)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.session.map(|session| session.index)
    }

    pub fn current_parm(&self) -> Option<ParmId> {
        self.session.map(|session| session.parm)
    }

    pub fn current_name(&self) -> Option<&'static str> {
        self.current_parm().map(|parm| self.target.directory().name(parm))
    }

    pub fn current_value(&self) -> Option<f32> {
        self.current_parm().and_then(|parm| self.target.get_value(parm))
    }

    pub fn center_value(&self) -> Option<f32> {
        self.session.map(|session| session.center_value)
    }

    pub fn need_revert(&self) -> u32 {
        self.session.map_or(0, |session| session.need_revert)
    }

    pub fn last_event(&self) -> Option<&TuningEvent> {
        self.last_event.as_ref()
    }

    pub fn last_error_warning(&self) -> Option<Millis> {
        self.last_error_warning.map(Millis::millis)
    }
}

#[cfg(test)]
mod test {
    use core::cell::Cell;

    use hal::clock::ManualClock;
    use hal::receiver::{PulseWidth, Receiver};

    use super::directory::{Directory, ParmId, TuningName, TuningSet};
    use super::{State, Tuner, TuningConfig, TuningTarget};
    use crate::params::{MemoryStorage, Param};

    const KNOB: u8 = 6;
    const SELECTOR: u8 = 7;
    const SET_SELECTOR: u8 = 8;

    static DIRECTORY: Directory = Directory {
        sets: &[
            TuningSet { set: 1, parms: &[1, 2, 3] },
            TuningSet { set: 2, parms: &[4] },
            TuningSet { set: 3, parms: &[] },
        ],
        names: &[
            TuningName { parm: 1, name: "P" },
            TuningName { parm: 2, name: "I" },
            TuningName { parm: 3, name: "D" },
            TuningName { parm: 4, name: "FF" },
        ],
    };

    #[derive(Debug)]
    struct Radio(Cell<[PulseWidth; 8]>);

    impl Radio {
        fn set(&self, channel: u8, pulse: PulseWidth) {
            let mut channels = self.0.get();
            channels[channel as usize - 1] = pulse;
            self.0.set(channels);
        }
    }

    impl Receiver for Radio {
        fn has_valid_input(&self) -> bool {
            true
        }

        fn num_channel(&self) -> usize {
            8
        }

        fn get_channel(&self, index: usize) -> PulseWidth {
            self.0.get()[index]
        }
    }

    struct Target {
        params: [Param<f32>; 4],
        storage: MemoryStorage,
        error: Cell<f32>,
    }

    impl Target {
        fn param(&self, parm: ParmId) -> Option<&Param<f32>> {
            self.params.get((parm as usize).checked_sub(1)?)
        }
    }

    impl TuningTarget for Target {
        fn directory(&self) -> &'static Directory {
            &DIRECTORY
        }

        fn get_value(&self, parm: ParmId) -> Option<f32> {
            self.param(parm).map(|p| p.get())
        }

        fn set_value(&self, parm: ParmId, value: f32) {
            if let Some(p) = self.param(parm) {
                p.set(value)
            }
        }

        fn save_value(&self, parm: ParmId) {
            if let Some(p) = self.param(parm) {
                p.save(&self.storage)
            }
        }

        fn reload_value(&self, parm: ParmId) {
            if let Some(p) = self.param(parm) {
                p.reload()
            }
        }

        fn controller_error(&self, _: ParmId) -> f32 {
            self.error.get()
        }
    }

    struct Rig {
        config: TuningConfig,
        target: Target,
        radio: Radio,
        clock: ManualClock,
    }

    impl Rig {
        fn new(parmset: i16) -> Self {
            let config = TuningConfig::default();
            config.channel.set(KNOB);
            config.selector.set(SELECTOR);
            config.parmset.set(parmset);
            let target = Target {
                params: [
                    Param::new("P", 1.0),
                    Param::new("I", 0.5),
                    Param::new("D", 0.25),
                    Param::new("FF", 0.8),
                ],
                storage: MemoryStorage::new(),
                error: Cell::new(0.0),
            };
            let radio = Radio(Cell::new([1500; 8]));
            radio.set(SELECTOR, 1000);
            Self { config, target, radio, clock: ManualClock::new(10_000) }
        }

        fn tuner(&self) -> Tuner<'_> {
            Tuner::new(&self.config, &self.target, &self.radio, &self.clock)
        }

        fn value(&self, parm: ParmId) -> f32 {
            self.target.get_value(parm).unwrap()
        }
    }

    fn frame(rig: &Rig, tuner: &mut Tuner, mode: u8) {
        rig.clock.advance(100);
        tuner.on_radio_frame(mode);
    }

    fn knob(rig: &Rig, tuner: &mut Tuner, pulse: PulseWidth) {
        rig.radio.set(KNOB, pulse);
        frame(rig, tuner, 0);
    }

    fn press(rig: &Rig, tuner: &mut Tuner) {
        rig.radio.set(SELECTOR, 1900);
        frame(rig, tuner, 0);
        frame(rig, tuner, 0);
        rig.radio.set(SELECTOR, 1000);
        frame(rig, tuner, 0);
    }

    /// Selects the set and moves the knob through the mid-point
    fn activate(rig: &Rig, tuner: &mut Tuner) {
        knob(rig, tuner, 1500);
        knob(rig, tuner, 1400);
        knob(rig, tuner, 1500);
        assert_eq!(tuner.state(), State::Active);
    }

    #[test]
    fn test_wait_center() {
        let rig = Rig::new(101);
        let mut tuner = rig.tuner();
        assert_eq!(tuner.state(), State::Idle);

        knob(&rig, &mut tuner, 1900);
        assert_eq!(tuner.state(), State::WaitCenter);
        assert_eq!(tuner.current_name(), Some("P"));
        for pulse in [1950, 2000, 1800, 1600, 1560] {
            knob(&rig, &mut tuner, pulse);
            assert_eq!(tuner.state(), State::WaitCenter);
            assert_eq!(rig.value(1), 1.0);
            assert_eq!(tuner.need_revert(), 0);
        }

        knob(&rig, &mut tuner, 1500);
        assert_eq!(tuner.state(), State::Active);
        assert_eq!(rig.value(1), 1.0);
        knob(&rig, &mut tuner, 2000);
        assert_eq!(rig.value(1), 2.0);
        knob(&rig, &mut tuner, 1000);
        assert_eq!(rig.value(1), 0.5);
        assert_eq!(tuner.need_revert(), 0b1);

        let event = tuner.last_event().unwrap();
        assert_eq!((event.set, event.parm, event.value, event.center), (101, 1, 0.5, 1.0));
    }

    #[test]
    fn test_selector_advances_and_wraps() {
        let rig = Rig::new(101);
        let mut tuner = rig.tuner();
        knob(&rig, &mut tuner, 1500);
        assert_eq!(tuner.current_index(), Some(0));

        press(&rig, &mut tuner);
        assert_eq!(tuner.current_index(), Some(1));
        assert_eq!(tuner.current_name(), Some("I"));
        press(&rig, &mut tuner);
        assert_eq!(tuner.current_index(), Some(2));
        press(&rig, &mut tuner);
        assert_eq!(tuner.current_index(), Some(0));
        assert_eq!(tuner.state(), State::WaitCenter);

        for _ in 0..100 {
            tuner.next_parameter();
            assert!(tuner.current_index().unwrap() < 3);
        }
    }

    #[test]
    fn test_new_parameter_waits_for_center() {
        let rig = Rig::new(101);
        let mut tuner = rig.tuner();
        activate(&rig, &mut tuner);
        knob(&rig, &mut tuner, 1800);
        let tuned = rig.value(1);

        press(&rig, &mut tuner);
        knob(&rig, &mut tuner, 1900);
        assert_eq!(rig.value(2), 0.5);
        assert_eq!(rig.value(1), tuned);
        knob(&rig, &mut tuner, 1500);
        knob(&rig, &mut tuner, 2000);
        assert_eq!(rig.value(2), 1.0);
        assert_eq!(tuner.need_revert(), 0b11);
    }

    #[test]
    fn test_commit_then_revert() {
        let rig = Rig::new(101);
        let mut tuner = rig.tuner();
        activate(&rig, &mut tuner);
        knob(&rig, &mut tuner, 2000);
        assert_eq!(rig.value(1), 2.0);

        tuner.commit();
        assert_eq!(tuner.need_revert(), 0);
        assert_eq!(rig.target.params[0].persisted(), 2.0);
        tuner.revert();
        assert_eq!(rig.value(1), 2.0);
        assert_eq!(tuner.center_value(), Some(2.0));
    }

    #[test]
    fn test_repeated_revert() {
        let rig = Rig::new(101);
        let mut tuner = rig.tuner();
        activate(&rig, &mut tuner);
        knob(&rig, &mut tuner, 1750);
        press(&rig, &mut tuner);
        knob(&rig, &mut tuner, 1500);
        knob(&rig, &mut tuner, 1250);
        assert_ne!(rig.value(1), 1.0);
        assert_ne!(rig.value(2), 0.5);

        tuner.revert();
        assert_eq!((rig.value(1), rig.value(2)), (1.0, 0.5));
        tuner.revert();
        assert_eq!((rig.value(1), rig.value(2)), (1.0, 0.5));
        assert_eq!(rig.target.storage.writes(), 0);
    }

    #[test]
    fn test_mode_change_keeps_uncommitted() {
        let rig = Rig::new(101);
        let mut tuner = rig.tuner();
        activate(&rig, &mut tuner);
        knob(&rig, &mut tuner, 2000);

        frame(&rig, &mut tuner, 5);
        assert_eq!(tuner.state(), State::WaitCenter);
        assert_eq!(rig.value(1), 2.0);
        assert_eq!(tuner.need_revert(), 0b1);

        frame(&rig, &mut tuner, 0);
        assert_eq!(rig.value(1), 2.0);
        tuner.revert();
        assert_eq!(rig.value(1), 1.0);
    }

    #[test]
    fn test_mode_change_reverts_when_configured() {
        let rig = Rig::new(101);
        rig.config.mode_revert.set(true);
        let mut tuner = rig.tuner();
        activate(&rig, &mut tuner);
        knob(&rig, &mut tuner, 2000);

        frame(&rig, &mut tuner, 5);
        assert_eq!(rig.value(1), 1.0);
        assert_eq!(tuner.need_revert(), 0);
        assert_eq!(tuner.state(), State::WaitCenter);
    }

    #[test]
    fn test_hold_commits() {
        let rig = Rig::new(101);
        let mut tuner = rig.tuner();
        activate(&rig, &mut tuner);
        knob(&rig, &mut tuner, 2000);

        rig.radio.set(SELECTOR, 1900);
        for _ in 0..52 {
            frame(&rig, &mut tuner, 0);
        }
        assert_eq!(tuner.need_revert(), 0);
        assert_eq!(rig.target.params[0].persisted(), 2.0);
        rig.radio.set(SELECTOR, 1000);
        frame(&rig, &mut tuner, 0);
        assert_eq!(tuner.current_index(), Some(0));
    }

    #[test]
    fn test_set_change_reverts_previous() {
        let rig = Rig::new(101);
        let mut tuner = rig.tuner();
        activate(&rig, &mut tuner);
        knob(&rig, &mut tuner, 2000);

        rig.config.parmset.set(102);
        frame(&rig, &mut tuner, 0);
        assert_eq!(rig.value(1), 1.0);
        assert_eq!(tuner.current_set(), Some(102));
        assert_eq!(tuner.current_name(), Some("FF"));
        assert_eq!(tuner.need_revert(), 0);
        assert_eq!(tuner.state(), State::WaitCenter);
    }

    #[test]
    fn test_rejected_sets() {
        let rig = Rig::new(103);
        let mut tuner = rig.tuner();
        knob(&rig, &mut tuner, 1500);
        assert_eq!(tuner.state(), State::Idle);

        rig.config.parmset.set(101);
        knob(&rig, &mut tuner, 1500);
        knob(&rig, &mut tuner, 1400);
        knob(&rig, &mut tuner, 1500);
        knob(&rig, &mut tuner, 2000);
        assert_eq!(tuner.state(), State::Active);

        rig.config.parmset.set(142);
        knob(&rig, &mut tuner, 1000);
        assert_eq!(tuner.current_set(), Some(101));
        assert_eq!(tuner.state(), State::Active);
        assert_eq!(rig.value(1), 2.0);
        assert_eq!(tuner.need_revert(), 0b1);
    }

    #[test]
    fn test_single_parameter() {
        let rig = Rig::new(3);
        let mut tuner = rig.tuner();
        activate(&rig, &mut tuner);
        knob(&rig, &mut tuner, 2000);
        assert_eq!(rig.value(3), 0.5);
        press(&rig, &mut tuner);
        assert_eq!(tuner.current_parm(), Some(3));
    }

    #[test]
    fn test_disable_reverts() {
        let rig = Rig::new(101);
        let mut tuner = rig.tuner();
        activate(&rig, &mut tuner);
        knob(&rig, &mut tuner, 2000);

        rig.config.channel.set(0);
        frame(&rig, &mut tuner, 0);
        assert_eq!(tuner.state(), State::Idle);
        assert_eq!(rig.value(1), 1.0);
    }

    #[test]
    fn test_update_rate_limited() {
        let rig = Rig::new(101);
        let mut tuner = rig.tuner();
        activate(&rig, &mut tuner);
        rig.radio.set(KNOB, 2000);
        rig.clock.advance(50);
        tuner.on_radio_frame(0);
        assert_eq!(rig.value(1), 1.0);
        rig.clock.advance(50);
        tuner.on_radio_frame(0);
        assert_eq!(rig.value(1), 2.0);
    }

    #[test]
    fn test_stale_input() {
        let rig = Rig::new(101);
        let mut tuner = rig.tuner();
        activate(&rig, &mut tuner);
        tuner.re_center();
        rig.radio.set(KNOB, 1900);
        rig.clock.advance(1000);
        tuner.on_radio_frame(0);
        // after a long gap the knob position is the new reference, still waiting
        assert_eq!(tuner.state(), State::WaitCenter);
        assert_eq!(rig.value(1), 1.0);
    }

    #[test]
    fn test_range_clamped() {
        let rig = Rig::new(101);
        rig.config.range.set(0.5);
        let mut tuner = rig.tuner();
        activate(&rig, &mut tuner);
        knob(&rig, &mut tuner, 2000);
        assert!((rig.value(1) - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_set_selector() {
        let rig = Rig::new(101);
        rig.config.set_selector.set(SET_SELECTOR);
        rig.config.parmset2.set(102);
        rig.config.parmset3.set(3);
        let mut tuner = rig.tuner();

        rig.radio.set(SET_SELECTOR, 1000);
        knob(&rig, &mut tuner, 1500);
        assert_eq!(tuner.current_set(), Some(101));
        rig.radio.set(SET_SELECTOR, 1500);
        knob(&rig, &mut tuner, 1500);
        assert_eq!(tuner.current_set(), Some(102));
        rig.radio.set(SET_SELECTOR, 2000);
        knob(&rig, &mut tuner, 1500);
        assert_eq!(tuner.current_set(), Some(3));
    }

    #[test]
    fn test_controller_error_warning() {
        let rig = Rig::new(101);
        let mut tuner = rig.tuner();
        knob(&rig, &mut tuner, 1500);
        assert_eq!(tuner.last_error_warning(), None);

        rig.target.error.set(0.5);
        frame(&rig, &mut tuner, 0);
        let first = tuner.last_error_warning().unwrap();
        for _ in 0..10 {
            frame(&rig, &mut tuner, 0);
        }
        assert_eq!(tuner.last_error_warning(), Some(first));
        for _ in 0..15 {
            frame(&rig, &mut tuner, 0);
        }
        assert!(tuner.last_error_warning().unwrap() > first);
    }

    #[test]
    fn test_plane() {
        use crate::config::Parameters;
        use crate::tuning::plane::PlaneTuning;

        let parameters = Parameters::default();
        let storage = MemoryStorage::new();
        let plane = PlaneTuning::new(&parameters, &storage);
        let radio = Radio(Cell::new([1500; 8]));
        let clock = ManualClock::new(0);
        parameters.tuning.channel.set(KNOB);
        parameters.tuning.parmset.set(123);

        let mut tuner = Tuner::new(&parameters.tuning, &plane, &radio, &clock);
        for pulse in [1500, 1400, 1500, 2000] {
            radio.set(KNOB, pulse);
            clock.advance(100);
            tuner.on_radio_frame(0);
        }
        assert_eq!(tuner.current_name(), Some("RLL_P"));
        assert!((parameters.roll.rate.p.get() - 0.16).abs() < 1e-6);
        tuner.commit();
        assert_eq!(hal::persist::Persist::read(&storage, "RLL_RATE_P"), Some(0.16f32.to_bits()));
    }
}
