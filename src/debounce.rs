//! Keystroke Debouncing

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// Runs only the last of a burst of calls, once `ms` have passed quietly
#[derive(Clone, Copy)]
pub struct Debouncer {
    generation: StoredValue<u64>,
    ms: u32,
}

impl Debouncer {
    pub fn new(ms: u32) -> Self {
        Self {
            generation: StoredValue::new(0),
            ms,
        }
    }

    pub fn run(&self, f: impl FnOnce() + 'static) {
        let generation = self.generation;
        let ms = self.ms;
        generation.update_value(|g| *g += 1);
        let mine = generation.get_value();
        spawn_local(async move {
            TimeoutFuture::new(ms).await;
            if generation.try_with_value(|g| *g == mine).unwrap_or(false) {
                f();
            }
        });
    }
}
