use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::input::{InputBus, KeyBinding, KeyEvent, PassThrough, Subscription};
use crate::surface::{RenderSurface, SharedSurface};
use crate::timer::{TimerHandle, TimerQueue};

use super::config::LoopConfig;
use super::state::{LoopState, LoopStats};

/// Clocks and pause flag mutated by the tick and key handlers.
#[derive(Debug, Default)]
struct Pump {
    life_duration: Duration,
    state: LoopState,
    ticks: u64,
}

/// Frame loop controller.
///
/// Created once the surface is ready; ticking starts immediately and runs until
/// [`stop`](Self::stop). The loop shares the surface with the host but never
/// creates or releases it.
///
/// Per tick, in order:
/// 1. life duration advances by the tick interval;
/// 2. if running, the surface is advanced by the tick interval;
/// 3. the surface is drawn, paused or not.
pub struct FrameLoop<S: RenderSurface + 'static> {
    interval: Duration,
    toggle_key: KeyBinding,
    pump: Rc<RefCell<Pump>>,
    surface: SharedSurface<S>,

    timers: TimerQueue,
    input: InputBus,
    timer: Option<TimerHandle>,
    subscription: Option<Subscription>,
}

impl<S: RenderSurface + 'static> FrameLoop<S> {
    /// Starts ticking `surface` on `timers` and listening for the toggle key on `input`.
    pub fn start(
        config: LoopConfig,
        surface: SharedSurface<S>,
        timers: &TimerQueue,
        input: &InputBus,
    ) -> Result<Self> {
        Self::start_at(Instant::now(), config, surface, timers, input)
    }

    /// Like [`start`](Self::start) with the first tick due at `origin + interval`.
    pub fn start_at(
        origin: Instant,
        config: LoopConfig,
        surface: SharedSurface<S>,
        timers: &TimerQueue,
        input: &InputBus,
    ) -> Result<Self> {
        config.validate().context("invalid frame loop configuration")?;

        let LoopConfig {
            tick_interval: interval,
            toggle_key,
        } = config;

        let pump = Rc::new(RefCell::new(Pump::default()));

        let timer = {
            let pump = pump.clone();
            let surface = surface.clone();
            timers.schedule_from(origin, interval, move || on_tick::<S>(&pump, &surface, interval))?
        };

        let subscription = {
            let pump = pump.clone();
            input.subscribe(move |event| on_key(&pump, toggle_key, event))
        };

        log::info!(
            "frame loop started: every {:.3}ms ({:.1} Hz), pause on {}",
            interval.as_secs_f64() * 1000.0,
            1.0 / interval.as_secs_f64(),
            toggle_key,
        );

        Ok(Self {
            interval,
            toggle_key,
            pump,
            surface,
            timers: timers.clone(),
            input: input.clone(),
            timer: Some(timer),
            subscription: Some(subscription),
        })
    }

    /// Cancels ticking and stops listening for keys.
    ///
    /// No tick runs after this returns. Calling it again does nothing.
    pub fn stop(&mut self) {
        let timer = self.timer.take();
        let subscription = self.subscription.take();

        if timer.is_none() && subscription.is_none() {
            return;
        }

        if let Some(timer) = timer {
            self.timers.cancel(timer);
        }
        if let Some(subscription) = subscription {
            self.input.unsubscribe(subscription);
        }

        log::info!("frame loop stopped: {}", self.stats());
    }

    /// True between `start` and `stop`.
    pub fn is_active(&self) -> bool {
        self.timer.is_some()
    }

    /// Flips between running and paused, as the toggle key does.
    pub fn toggle_pause(&mut self) {
        toggle(&self.pump);
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.is_paused() != paused {
            toggle(&self.pump);
        }
    }

    pub fn state(&self) -> LoopState {
        self.pump.borrow().state
    }

    pub fn is_paused(&self) -> bool {
        self.state().is_paused()
    }

    pub fn life_duration(&self) -> Duration {
        self.pump.borrow().life_duration
    }

    pub fn render_duration(&self) -> Duration {
        self.surface.borrow().render_duration()
    }

    pub fn tick_count(&self) -> u64 {
        self.pump.borrow().ticks
    }

    pub fn surface(&self) -> &SharedSurface<S> {
        &self.surface
    }

    pub fn stats(&self) -> LoopStats {
        let pump = self.pump.borrow();
        LoopStats {
            ticks: pump.ticks,
            life_duration: pump.life_duration,
            render_duration: self.render_duration(),
            state: pump.state,
        }
    }
}

impl<S: RenderSurface + 'static> Drop for FrameLoop<S> {
    fn drop(&mut self) {
        if self.is_active() {
            log::warn!("frame loop dropped without stop(); cancelling");
            self.stop();
        }
    }
}

impl<S: RenderSurface + 'static> std::fmt::Debug for FrameLoop<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameLoop")
            .field("interval", &self.interval)
            .field("toggle_key", &self.toggle_key)
            .field("pump", &*self.pump.borrow())
            .field("active", &self.is_active())
            .finish()
    }
}

fn on_tick<S: RenderSurface>(pump: &RefCell<Pump>, surface: &RefCell<S>, interval: Duration) {
    let running = {
        let mut pump = pump.borrow_mut();
        pump.life_duration += interval;
        pump.ticks += 1;
        log::trace!("tick {} life {:?} {:?}", pump.ticks, pump.life_duration, pump.state);
        pump.state == LoopState::Running
    };

    // Loop state is not borrowed while the surface draws.
    let mut surface = surface.borrow_mut();
    if running {
        surface.advance(interval);
    }
    surface.draw();
}

fn on_key(pump: &RefCell<Pump>, toggle_key: KeyBinding, event: &KeyEvent) -> PassThrough {
    // Every key-down toggles, auto-repeat included.
    if toggle_key.matches(event) {
        toggle(pump);
    }
    PassThrough::Forward
}

fn toggle(pump: &RefCell<Pump>) {
    let mut pump = pump.borrow_mut();
    pump.state = pump.state.toggled();
    match pump.state {
        LoopState::Paused => log::info!("paused at {:.3}s", pump.life_duration.as_secs_f64()),
        LoopState::Running => log::info!("resumed at {:.3}s", pump.life_duration.as_secs_f64()),
    }
}
