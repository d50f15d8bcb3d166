//! Typed, memoized sensor cells.
//!
//! A value answers one question about the world ("my health", "current
//! target") and caches the answer for its check interval. Calculators
//! receive the owning [`Values`] registry so they can build on other
//! values.
//!
//! Persistence goes through [`ValueCodec`]. A value without a save codec
//! is not persistable and is skipped when the bot state is written out.

use std::collections::VecDeque;
use std::fmt::{Debug, Display};
use std::str::FromStr;

use crate::interval::{CheckInterval, RateGate};
use crate::values::Values;

/// A typed value cell.
pub trait Value: Send {
    type Output: Clone + Send + 'static;

    /// Current value, recomputed if the check interval has elapsed.
    fn get(&mut self, values: &mut Values) -> Self::Output;

    /// Last computed value. Never forces a recompute once one has happened.
    fn lazy_get(&mut self, values: &mut Values) -> Self::Output;

    /// Same freshness rules as [`get`](Self::get), but hands out the cell.
    fn ref_get(&mut self, values: &mut Values) -> &mut Self::Output;

    fn set(&mut self, value: Self::Output);

    /// Drop the memo; the next `get` recomputes.
    fn reset(&mut self) {}

    fn update(&mut self) {}

    /// Diagnostic text, `None` when the value has no readable form.
    fn format(&self) -> Option<String>;

    /// Persisted form, `None` when the value is not persistable.
    fn save(&self) -> Option<String> {
        None
    }

    /// Restore from [`save`](Self::save) output. Returns `false` if rejected.
    fn load(&mut self, _text: &str) -> bool {
        false
    }
}

/// String codec for a value type.
pub struct ValueCodec<T> {
    format: Option<fn(&T) -> String>,
    save: Option<fn(&T) -> String>,
    load: Option<fn(&str) -> Option<T>>,
}

impl<T> Clone for ValueCodec<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ValueCodec<T> {}

impl<T> ValueCodec<T> {
    /// Neither readable nor persistable.
    pub fn opaque() -> Self {
        Self {
            format: None,
            save: None,
            load: None,
        }
    }

    pub fn with_format(format: fn(&T) -> String) -> Self {
        Self {
            format: Some(format),
            save: None,
            load: None,
        }
    }

    pub fn persisted(mut self, save: fn(&T) -> String, load: fn(&str) -> Option<T>) -> Self {
        self.save = Some(save);
        self.load = Some(load);
        self
    }

    pub fn format(&self, value: &T) -> Option<String> {
        self.format.map(|format| format(value))
    }

    pub fn save(&self, value: &T) -> Option<String> {
        self.save.map(|save| save(value))
    }

    pub fn load(&self, text: &str) -> Option<T> {
        self.load.and_then(|load| load(text))
    }
}

fn display_text<T: Display>(value: &T) -> String {
    value.to_string()
}

fn debug_text<T: Debug>(value: &T) -> String {
    format!("{value:?}")
}

fn parse_text<T: FromStr>(text: &str) -> Option<T> {
    text.trim().parse().ok()
}

impl<T: Display> ValueCodec<T> {
    pub fn display() -> Self {
        Self::with_format(display_text::<T>)
    }
}

impl<T: Debug> ValueCodec<T> {
    pub fn debug() -> Self {
        Self::with_format(debug_text::<T>)
    }
}

impl<T: Display + FromStr> ValueCodec<T> {
    /// Readable and persisted through `Display`/`FromStr`.
    pub fn text() -> Self {
        Self::with_format(display_text::<T>).persisted(display_text::<T>, parse_text::<T>)
    }
}

impl<T> Default for ValueCodec<T> {
    fn default() -> Self {
        Self::opaque()
    }
}

type Calculator<T> = Box<dyn FnMut(&mut Values, Option<&str>) -> T + Send>;

/// Lazily recomputed value, cached for its check interval.
pub struct CalculatedValue<T> {
    gate: RateGate,
    once: bool,
    value: T,
    qualifier: Option<String>,
    calculate: Calculator<T>,
    codec: ValueCodec<T>,
}

impl<T: Clone + Send + 'static> CalculatedValue<T> {
    /// `check_interval` uses the source convention of [`CheckInterval::from_source`].
    pub fn new<F>(initial: T, check_interval: u32, calculate: F) -> Self
    where
        F: FnMut(&mut Values, Option<&str>) -> T + Send + 'static,
    {
        Self {
            gate: RateGate::new(CheckInterval::from_source(check_interval)),
            once: false,
            value: initial,
            qualifier: None,
            calculate: Box::new(calculate),
            codec: ValueCodec::opaque(),
        }
    }

    /// Computed on first access and then only after [`Value::reset`].
    pub fn once<F>(initial: T, calculate: F) -> Self
    where
        F: FnMut(&mut Values, Option<&str>) -> T + Send + 'static,
    {
        Self {
            once: true,
            ..Self::new(initial, 0, calculate)
        }
    }

    pub fn with_codec(mut self, codec: ValueCodec<T>) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_qualifier(mut self, qualifier: Option<&str>) -> Self {
        self.qualifier = qualifier.map(str::to_string);
        self
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    fn refresh(&mut self, values: &mut Values) -> bool {
        let now = values.env().now_ms();
        let due = if self.once {
            !self.gate.has_run() && self.gate.try_pass(now)
        } else {
            self.gate.try_pass(now)
        };

        if due {
            self.value = (self.calculate)(values, self.qualifier.as_deref());
        }
        due
    }
}

impl<T: Clone + Send + 'static> Value for CalculatedValue<T> {
    type Output = T;

    fn get(&mut self, values: &mut Values) -> T {
        self.refresh(values);
        self.value.clone()
    }

    fn lazy_get(&mut self, values: &mut Values) -> T {
        if !self.gate.has_run() {
            return self.get(values);
        }
        self.value.clone()
    }

    fn ref_get(&mut self, values: &mut Values) -> &mut T {
        self.refresh(values);
        &mut self.value
    }

    fn set(&mut self, value: T) {
        self.value = value;
    }

    fn reset(&mut self) {
        self.gate.reset();
    }

    fn format(&self) -> Option<String> {
        self.codec.format(&self.value)
    }

    fn save(&self) -> Option<String> {
        self.codec.save(&self.value)
    }

    fn load(&mut self, text: &str) -> bool {
        match self.codec.load(text) {
            Some(value) => {
                self.value = value;
                true
            }
            None => false,
        }
    }
}

/// Explicit cell with a default restored on reset.
pub struct ManualSetValue<T> {
    value: T,
    default: T,
    codec: ValueCodec<T>,
}

impl<T: Clone + Send + 'static> ManualSetValue<T> {
    pub fn new(default: T) -> Self {
        Self {
            value: default.clone(),
            default,
            codec: ValueCodec::opaque(),
        }
    }

    pub fn with_codec(mut self, codec: ValueCodec<T>) -> Self {
        self.codec = codec;
        self
    }
}

impl<T: Clone + Send + 'static> Value for ManualSetValue<T> {
    type Output = T;

    fn get(&mut self, _values: &mut Values) -> T {
        self.value.clone()
    }

    fn lazy_get(&mut self, _values: &mut Values) -> T {
        self.value.clone()
    }

    fn ref_get(&mut self, _values: &mut Values) -> &mut T {
        &mut self.value
    }

    fn set(&mut self, value: T) {
        self.value = value;
    }

    fn reset(&mut self) {
        self.value = self.default.clone();
    }

    fn format(&self) -> Option<String> {
        self.codec.format(&self.value)
    }

    fn save(&self) -> Option<String> {
        self.codec.save(&self.value)
    }

    fn load(&mut self, text: &str) -> bool {
        match self.codec.load(text) {
            Some(value) => {
                self.value = value;
                true
            }
            None => false,
        }
    }
}

/// Calculated value that also tracks when it last *changed*.
///
/// A new result counts as a change only if it differs from the last
/// recorded one and at least `min_change_interval_ms` have passed since
/// that recording. Noisy calculations therefore cannot flap faster than
/// the dwell time.
pub struct MemoryCalculatedValue<T> {
    inner: CalculatedValue<T>,
    last_value: Option<T>,
    last_change_ms: Option<u64>,
    min_change_interval_ms: u64,
    now_ms: u64,
}

impl<T: Clone + PartialEq + Send + 'static> MemoryCalculatedValue<T> {
    pub fn new<F>(initial: T, check_interval: u32, min_change_interval_ms: u64, calculate: F) -> Self
    where
        F: FnMut(&mut Values, Option<&str>) -> T + Send + 'static,
    {
        Self {
            inner: CalculatedValue::new(initial, check_interval, calculate),
            last_value: None,
            last_change_ms: None,
            min_change_interval_ms,
            now_ms: 0,
        }
    }

    pub fn with_codec(mut self, codec: ValueCodec<T>) -> Self {
        self.inner = self.inner.with_codec(codec);
        self
    }

    pub fn with_qualifier(mut self, qualifier: Option<&str>) -> Self {
        self.inner = self.inner.with_qualifier(qualifier);
        self
    }

    fn update_change(&mut self) -> bool {
        let Some(last) = self.last_change_ms else {
            self.last_change_ms = Some(self.now_ms);
            self.last_value = Some(self.inner.value.clone());
            return false;
        };
        let dwelling = self.now_ms.saturating_sub(last) < self.min_change_interval_ms;
        let unchanged = self.last_value.as_ref() == Some(&self.inner.value);
        if dwelling || unchanged {
            return false;
        }

        self.last_change_ms = Some(self.now_ms);
        self.last_value = Some(self.inner.value.clone());
        true
    }

    /// Refresh and report whether a change was recorded.
    pub fn observe(&mut self, values: &mut Values) -> (T, bool) {
        self.now_ms = values.env().now_ms();
        let value = self.inner.get(values);
        let changed = self.update_change();
        (value, changed)
    }

    /// Timestamp of the last recorded change.
    pub fn last_change_on(&mut self, values: &mut Values) -> u64 {
        self.observe(values);
        self.last_change_ms.unwrap_or(self.now_ms)
    }

    /// Milliseconds since the last recorded change.
    pub fn last_change_delay(&mut self, values: &mut Values) -> u64 {
        let changed_on = self.last_change_on(values);
        self.now_ms.saturating_sub(changed_on)
    }
}

impl<T: Clone + PartialEq + Send + 'static> Value for MemoryCalculatedValue<T> {
    type Output = T;

    fn get(&mut self, values: &mut Values) -> T {
        self.observe(values).0
    }

    fn lazy_get(&mut self, _values: &mut Values) -> T {
        self.inner.value.clone()
    }

    fn ref_get(&mut self, values: &mut Values) -> &mut T {
        self.observe(values);
        &mut self.inner.value
    }

    fn set(&mut self, value: T) {
        self.inner.set(value);
        self.update_change();
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.last_value = None;
        self.last_change_ms = None;
    }

    fn format(&self) -> Option<String> {
        self.inner.format()
    }

    fn save(&self) -> Option<String> {
        self.inner.save()
    }

    fn load(&mut self, text: &str) -> bool {
        self.inner.load(text)
    }
}

/// [`MemoryCalculatedValue`] that keeps the most recent changes.
pub struct LogCalculatedValue<T> {
    inner: MemoryCalculatedValue<T>,
    log: VecDeque<(T, u64)>,
    log_length: usize,
}

impl<T: Clone + PartialEq + Send + 'static> LogCalculatedValue<T> {
    pub const DEFAULT_LOG_LENGTH: usize = 10;

    pub fn new<F>(initial: T, check_interval: u32, min_change_interval_ms: u64, calculate: F) -> Self
    where
        F: FnMut(&mut Values, Option<&str>) -> T + Send + 'static,
    {
        Self {
            inner: MemoryCalculatedValue::new(
                initial,
                check_interval,
                min_change_interval_ms,
                calculate,
            ),
            log: VecDeque::new(),
            log_length: Self::DEFAULT_LOG_LENGTH,
        }
    }

    pub fn with_log_length(mut self, log_length: usize) -> Self {
        self.log_length = log_length.max(1);
        self
    }

    pub fn with_codec(mut self, codec: ValueCodec<T>) -> Self {
        self.inner = self.inner.with_codec(codec);
        self
    }

    /// Recorded changes, oldest first, with their timestamps.
    pub fn value_log(&self) -> impl Iterator<Item = &(T, u64)> {
        self.log.iter()
    }

    fn record(&mut self, value: &T) {
        self.log.push_back((value.clone(), self.inner.now_ms));
        while self.log.len() > self.log_length {
            self.log.pop_front();
        }
    }
}

impl<T: Clone + PartialEq + Send + 'static> Value for LogCalculatedValue<T> {
    type Output = T;

    fn get(&mut self, values: &mut Values) -> T {
        let (value, changed) = self.inner.observe(values);
        if changed {
            self.record(&value);
        }
        value
    }

    fn lazy_get(&mut self, values: &mut Values) -> T {
        self.inner.lazy_get(values)
    }

    fn ref_get(&mut self, values: &mut Values) -> &mut T {
        let (value, changed) = self.inner.observe(values);
        if changed {
            self.record(&value);
        }
        &mut self.inner.inner.value
    }

    fn set(&mut self, value: T) {
        self.inner.set(value);
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.log.clear();
    }

    fn format(&self) -> Option<String> {
        self.inner.format()
    }

    fn save(&self) -> Option<String> {
        self.inner.save()
    }

    fn load(&mut self, text: &str) -> bool {
        self.inner.load(text)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

    use bot_world::{EmptyWorld, ManualClock, ObjectGuid};

    use super::*;
    use crate::env::BotEnv;

    fn values(clock: &Arc<ManualClock>) -> Values {
        let env = BotEnv::new(ObjectGuid::new(7), Arc::new(EmptyWorld)).with_clock(clock.clone());
        Values::new(env)
    }

    fn counting(counter: &Arc<AtomicUsize>) -> impl FnMut(&mut Values, Option<&str>) -> usize + Send + 'static {
        let counter = Arc::clone(counter);
        move |_, _| counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    #[test]
    fn calculated_value_is_cached_within_interval() {
        let clock = Arc::new(ManualClock::new(1_000));
        let mut values = values(&clock);
        let calls = Arc::new(AtomicUsize::new(0));
        let mut value = CalculatedValue::new(0, 3, counting(&calls));

        assert_eq!(value.get(&mut values), 1);
        clock.advance(2_999);
        assert_eq!(value.get(&mut values), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(1);
        assert_eq!(value.get(&mut values), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn every_tick_value_always_recomputes() {
        let clock = Arc::new(ManualClock::new(0));
        let mut values = values(&clock);
        let calls = Arc::new(AtomicUsize::new(0));
        let mut value = CalculatedValue::new(0, 1, counting(&calls));

        value.get(&mut values);
        value.get(&mut values);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn lazy_get_never_forces_after_first_compute() {
        let clock = Arc::new(ManualClock::new(0));
        let mut values = values(&clock);
        let calls = Arc::new(AtomicUsize::new(0));
        let mut value = CalculatedValue::new(0, 1, counting(&calls));

        assert_eq!(value.lazy_get(&mut values), 1);
        assert_eq!(value.lazy_get(&mut values), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reset_forces_recompute() {
        let clock = Arc::new(ManualClock::new(0));
        let mut values = values(&clock);
        let calls = Arc::new(AtomicUsize::new(0));
        let mut value = CalculatedValue::new(0, 60, counting(&calls));

        value.get(&mut values);
        value.reset();
        assert_eq!(value.get(&mut values), 2);
    }

    #[test]
    fn once_value_ignores_time() {
        let clock = Arc::new(ManualClock::new(0));
        let mut values = values(&clock);
        let calls = Arc::new(AtomicUsize::new(0));
        let mut value = CalculatedValue::once(0, counting(&calls));

        value.get(&mut values);
        clock.advance(1_000_000);
        value.get(&mut values);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn ref_get_allows_in_place_accumulation() {
        let clock = Arc::new(ManualClock::new(0));
        let mut values = values(&clock);
        let mut value = CalculatedValue::new(Vec::<u32>::new(), 10, |_, _| vec![1]);

        value.ref_get(&mut values).push(2);
        assert_eq!(value.get(&mut values), vec![1, 2]);
    }

    #[test]
    fn manual_value_resets_to_default() {
        let clock = Arc::new(ManualClock::new(0));
        let mut values = values(&clock);
        let mut value = ManualSetValue::new(5u32).with_codec(ValueCodec::text());

        value.set(9);
        assert_eq!(value.get(&mut values), 9);
        assert_eq!(value.save().as_deref(), Some("9"));
        value.reset();
        assert_eq!(value.get(&mut values), 5);
        assert!(value.load("12"));
        assert_eq!(value.get(&mut values), 12);
        assert!(!value.load("twelve"));
    }

    #[test]
    fn opaque_values_do_not_persist() {
        let value = ManualSetValue::new(1u8);
        assert_eq!(value.save(), None);
        assert_eq!(value.format(), None);
    }

    #[test]
    fn memory_value_respects_dwell_time() {
        let clock = Arc::new(ManualClock::new(10_000));
        let mut values = values(&clock);
        let reading = Arc::new(AtomicU32::new(1));
        let source = Arc::clone(&reading);
        let mut value =
            MemoryCalculatedValue::new(0, 1, 500, move |_, _| source.load(Ordering::SeqCst));

        let (_, changed) = value.observe(&mut values);
        assert!(!changed, "first observation starts the dwell window");

        clock.advance(500);
        let (_, changed) = value.observe(&mut values);
        assert!(!changed, "same reading after the window is not a change");

        reading.store(2, Ordering::SeqCst);
        clock.advance(100);
        let (current, changed) = value.observe(&mut values);
        assert_eq!(current, 2);
        assert!(changed);

        reading.store(3, Ordering::SeqCst);
        clock.advance(100);
        let (current, changed) = value.observe(&mut values);
        assert_eq!(current, 3);
        assert!(!changed, "change inside dwell window is suppressed");

        clock.advance(400);
        let (_, changed) = value.observe(&mut values);
        assert!(changed);
        assert_eq!(value.last_change_delay(&mut values), 0);

        clock.advance(700);
        assert_eq!(value.last_change_delay(&mut values), 700);
    }

    #[test]
    fn log_value_keeps_bounded_history() {
        let clock = Arc::new(ManualClock::new(0));
        let mut values = values(&clock);
        let reading = Arc::new(AtomicU32::new(0));
        let source = Arc::clone(&reading);
        let mut value = LogCalculatedValue::new(0, 1, 0, move |_, _| {
            source.fetch_add(1, Ordering::SeqCst)
        })
        .with_log_length(3);

        for _ in 0..5 {
            clock.advance(10);
            value.get(&mut values);
        }

        let logged: Vec<u32> = value.value_log().map(|(v, _)| *v).collect();
        assert_eq!(logged, vec![2, 3, 4]);

        value.reset();
        assert_eq!(value.value_log().count(), 0);
    }
}
