//! Typewriter-style text reveal with typing ticks.
//!
//! [`Animator::reveal`] feeds a growing prefix of the text to a sink, one
//! character per step, and plays a short tick for every visible character.
//! A reveal is never cancelled from outside: once started it runs to the end
//! of the text. Overlapping reveals are counted, and a reveal whose task is
//! dropped still stops counting.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::sound::{Beeper, Tone};

/// Per-character delay used for headlines.
pub const HEADLINE_DELAY: Duration = Duration::from_millis(15);

/// Per-character delay used for poems.
pub const POEM_DELAY: Duration = Duration::from_millis(24);

const TICK_BASE_HZ: f32 = 1050.0;
const TICK_JITTER_HZ: f32 = 200.0;
const TICK_DURATION: Duration = Duration::from_millis(12);
const TICK_VOLUME: f32 = 0.03;

pub struct Animator {
    beeper: Arc<dyn Beeper>,
    sound: Arc<AtomicBool>,
    reduced_motion: bool,
    /// Number of reveals in progress.
    active: AtomicUsize,
}

/// Counts one reveal for as long as it lives.
struct BusyGuard<'a>(&'a AtomicUsize);

impl<'a> BusyGuard<'a> {
    fn enter(active: &'a AtomicUsize) -> Self {
        active.fetch_add(1, Ordering::AcqRel);
        BusyGuard(active)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl Animator {
    /// `sound` is read on every tick, so toggling it takes effect mid-reveal.
    pub fn new(beeper: Arc<dyn Beeper>, sound: Arc<AtomicBool>, reduced_motion: bool) -> Self {
        Self {
            beeper,
            sound,
            reduced_motion,
            active: AtomicUsize::new(0),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.active.load(Ordering::Acquire) > 0
    }

    /// Reveal `text` into `sink`, waiting `delay` after each character.
    pub async fn reveal<F>(&self, mut sink: F, text: &str, delay: Duration)
    where
        F: FnMut(&str),
    {
        let _guard = BusyGuard::enter(&self.active);

        sink("");
        if self.reduced_motion {
            sink(text);
            return;
        }

        let mut shown = String::with_capacity(text.len());
        for ch in text.chars() {
            shown.push(ch);
            sink(&shown);
            if !ch.is_whitespace() && self.sound.load(Ordering::Relaxed) {
                self.beeper.beep(tick());
            }
            tokio::time::sleep(delay).await;
        }
    }
}

fn tick() -> Tone {
    let jitter = rand::thread_rng().gen_range(0.0..TICK_JITTER_HZ);
    Tone {
        frequency_hz: TICK_BASE_HZ + jitter,
        duration: TICK_DURATION,
        volume: TICK_VOLUME,
    }
}
