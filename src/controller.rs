// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Animation controller
//!
//! Each tick asks the engine for a fresh batch, rolls it into the
//! history, resets the orbit every `reset_interval` frames, and hands
//! the visible points to a surface.  Everything happens on the calling
//! thread; the pacer decides when the next tick runs.

use log::{debug, info, warn};
use rand::Rng;

use crate::config::Settings;
use crate::engine::Engine;
use crate::error::Error;
use crate::history::{Batch, FrameHistory};
use crate::surface::{Frame, Surface};
use crate::timer::Pacer;

/// Lifecycle of a controller.  `Stopped` is final.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    /// Configured, not yet ticking.
    Idle,
    /// Producing frames.
    Running,
    /// Finished; no more frames.
    Stopped,
}

/// Frames rendered since the last parameter reset.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameCounter(usize);

impl FrameCounter {
    /// The current count.
    pub fn get(self) -> usize {
        self.0
    }

    fn increment(&mut self) {
        self.0 += 1;
    }

    fn zero(&mut self) {
        self.0 = 0;
    }
}

/// Owns the engine, the history and the random source, and runs the
/// per-frame state machine.
pub struct Controller<R> {
    settings: Settings,
    engine: Engine,
    history: FrameHistory,
    counter: FrameCounter,
    frames: u64,
    resets: u64,
    state: State,
    rng: R,
}

impl<R: Rng> Controller<R> {
    /// Validates `settings` and initialises the engine, either with the
    /// explicit parameters in the settings or with ones drawn from
    /// `rng`.  A bad configuration is refused here, so a controller
    /// that exists can always start.
    pub fn new(settings: Settings, mut rng: R) -> Result<Self, Error> {
        settings.validate()?;
        let engine = match settings.params {
            Some(params) => {
                let start = settings.start.position(&mut rng, &settings.range);
                Engine::new(params, start)
            }
            None => Engine::random(&mut rng, &settings.range, &settings.start),
        }
        .with_variant(settings.variant);
        let history = FrameHistory::new(settings.history);
        Ok(Controller {
            settings,
            engine,
            history,
            counter: FrameCounter::default(),
            frames: 0,
            resets: 0,
            state: State::Idle,
            rng,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Frames since the last reset.
    pub fn counter(&self) -> FrameCounter {
        self.counter
    }

    /// Frames rendered since start.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Parameter resets performed since start.
    pub fn resets(&self) -> u64 {
        self.resets
    }

    /// The engine, for inspection.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The retained batches.
    pub fn history(&self) -> &FrameHistory {
        &self.history
    }

    /// The settings the controller was built with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Moves from `Idle` to `Running`.  Starting a running controller
    /// does nothing; a stopped one cannot be restarted.
    pub fn start(&mut self) -> Result<(), Error> {
        match self.state {
            State::Idle => {
                info!(
                    "starting {} map with {}",
                    self.engine.variant(),
                    self.engine.params()
                );
                self.state = State::Running;
                Ok(())
            }
            State::Running => Ok(()),
            State::Stopped => Err(Error::NotRunning),
        }
    }

    /// Moves to `Stopped`.
    pub fn stop(&mut self) {
        self.state = State::Stopped;
    }

    /// Produces and draws one frame.  Returns the state after the
    /// tick, which is `Stopped` if the surface failed.
    pub fn tick<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<State, Error> {
        if self.state != State::Running {
            return Err(Error::NotRunning);
        }

        self.frames += 1;
        let interval = self.settings.reset_interval;
        if interval > 0 && self.counter.get() + 1 >= interval {
            self.reset()?;
        } else {
            let batch = self.engine.step_batch(self.settings.iterations)?;
            self.history.push(Batch::from(batch));
            self.counter.increment();
        }

        let frame = self.frame();
        debug!("frame {}: {} points", frame.number, frame.points.len());
        if let Err(e) = surface.draw(&frame) {
            warn!("stopping at frame {}: {}", frame.number, e);
            self.stop();
        }
        Ok(self.state)
    }

    // Starts a new orbit and replaces the whole history with its first
    // batch, so nothing from the old parameters is drawn under it.  The
    // old orbit is not stepped on a reset tick.
    fn reset(&mut self) -> Result<(), Error> {
        let params = self
            .engine
            .randomize(&mut self.rng, &self.settings.range, &self.settings.start);
        self.counter.zero();
        self.history.clear();
        self.resets += 1;
        info!("frame {}: new parameters {}", self.frames, params);
        let batch = self.engine.step_batch(self.settings.iterations)?;
        self.history.push(Batch::from(batch));
        Ok(())
    }

    /// The visible frame built from the current history.
    pub fn frame(&self) -> Frame {
        Frame {
            number: self.frames,
            params: self.engine.params(),
            points: self.history.flatten(),
            layers: self.history.layers(self.settings.opacity),
        }
    }

    /// Starts the controller and ticks it at the pacer's rate until the
    /// surface stops or `limit` frames have been drawn, then stops it.
    /// Returns the number of frames drawn.
    pub fn run<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        pacer: &mut Pacer,
        limit: Option<u64>,
    ) -> Result<u64, Error> {
        self.start()?;
        while self.state == State::Running {
            if limit.map_or(false, |limit| self.frames >= limit) {
                break;
            }
            pacer.wait();
            self.tick(surface)?;
        }
        self.stop();
        info!(
            "stopped after {} frames ({} resets) at {:.1} fps",
            self.frames,
            self.resets,
            pacer.observed_fps()
        );
        Ok(self.frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Params;
    use crate::error::SurfaceError;
    use crate::planes::Point;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Keeps every frame it is given, and closes after `capacity`.
    struct Recorder {
        frames: Vec<Frame>,
        capacity: usize,
    }

    impl Recorder {
        fn new() -> Self {
            Recorder {
                frames: Vec::new(),
                capacity: usize::max_value(),
            }
        }

        fn closing_after(capacity: usize) -> Self {
            Recorder {
                frames: Vec::new(),
                capacity,
            }
        }
    }

    impl Surface for Recorder {
        fn draw(&mut self, frame: &Frame) -> Result<(), SurfaceError> {
            if self.frames.len() >= self.capacity {
                return Err(SurfaceError::Closed);
            }
            self.frames.push(frame.clone());
            Ok(())
        }
    }

    fn settings(iterations: usize, history: usize, reset_interval: usize) -> Settings {
        Settings {
            iterations,
            history,
            reset_interval,
            ..Settings::default()
        }
    }

    fn running(settings: Settings) -> Controller<StdRng> {
        let mut controller = Controller::new(settings, StdRng::seed_from_u64(42)).unwrap();
        controller.start().unwrap();
        controller
    }

    #[test]
    fn starts_idle_and_runs_once_started() {
        let mut controller = Controller::new(Settings::default(), StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(controller.state(), State::Idle);
        assert!(controller.tick(&mut Recorder::new()).is_err());
        controller.start().unwrap();
        assert_eq!(controller.state(), State::Running);
        controller.start().unwrap();
        assert_eq!(controller.state(), State::Running);
    }

    #[test]
    fn bad_settings_never_build_a_controller() {
        let bad = settings(0, 10, 10);
        match Controller::new(bad, StdRng::seed_from_u64(1)) {
            Err(Error::Configuration(_)) => {}
            Err(e) => panic!("unexpected error {}", e),
            Ok(_) => panic!("zero iterations accepted"),
        }
    }

    #[test]
    fn history_stays_within_depth() {
        let mut controller = running(settings(50, 4, 0));
        let mut surface = Recorder::new();
        for _ in 0..20 {
            controller.tick(&mut surface).unwrap();
            assert!(controller.history().len() <= 4);
        }
        assert_eq!(controller.history().len(), 4);
        assert_eq!(surface.frames.last().unwrap().points.len(), 200);
        assert_eq!(controller.counter().get(), 20);
    }

    #[test]
    fn depth_zero_shows_only_the_latest_batch() {
        let mut controller = running(settings(30, 0, 0));
        let mut surface = Recorder::new();
        for _ in 0..5 {
            let expected = controller.engine().clone().step_batch(30).unwrap();
            controller.tick(&mut surface).unwrap();
            assert_eq!(controller.history().len(), 1);
            assert_eq!(surface.frames.last().unwrap().points, expected);
        }
    }

    #[test]
    fn ticks_continue_one_orbit() {
        let mut controller = running(settings(25, 3, 0));
        let mut twin = controller.engine().clone();
        let mut surface = Recorder::new();
        for _ in 0..3 {
            controller.tick(&mut surface).unwrap();
        }
        assert_eq!(surface.frames[2].points, twin.step_batch(75).unwrap());
    }

    #[test]
    fn reset_interval_starts_a_fresh_orbit() {
        let mut controller = running(settings(40, 10, 3));
        assert_eq!(controller.settings().reset_interval, 3);
        let mut surface = Recorder::new();
        let before = controller.engine().params();
        let mut old_orbit = controller.engine().clone();

        controller.tick(&mut surface).unwrap();
        controller.tick(&mut surface).unwrap();
        assert_eq!(controller.counter().get(), 2);
        assert_eq!(controller.history().len(), 2);

        controller.tick(&mut surface).unwrap();
        assert_eq!(controller.counter().get(), 0);
        assert_eq!(controller.resets(), 1);
        assert_eq!(controller.history().len(), 1);
        assert_ne!(controller.engine().params(), before);

        // The reset frame holds only the first batch of the new orbit.
        let params = controller.engine().params();
        let mut fresh = Engine::new(params, Point(0.0, 0.0));
        let first = fresh.step_batch(40).unwrap();
        assert_eq!(surface.frames[2].points, first);
        assert_eq!(surface.frames[2].params, params);
        assert_eq!(controller.engine().state(), *first.last().unwrap());

        // The old orbit's third batch was never computed or drawn.
        let skipped = old_orbit.step_batch(120).unwrap().split_off(80);
        assert!(surface.frames[2].points.iter().all(|p| !skipped.contains(p)));

        controller.tick(&mut surface).unwrap();
        assert_eq!(controller.counter().get(), 1);
        assert_eq!(controller.history().len(), 2);
    }

    #[test]
    fn zero_interval_never_resets() {
        let mut controller = running(settings(10, 2, 0));
        let params = controller.engine().params();
        let mut surface = Recorder::new();
        for _ in 0..30 {
            controller.tick(&mut surface).unwrap();
        }
        assert_eq!(controller.resets(), 0);
        assert_eq!(controller.engine().params(), params);
        assert_eq!(controller.counter().get(), 30);
    }

    #[test]
    fn explicit_params_are_used() {
        let settings = Settings {
            params: Some(Params::new(1.0, 1.0, 0.0)),
            iterations: 2,
            ..Settings::default()
        };
        let mut controller = running(settings);
        let mut surface = Recorder::new();
        controller.tick(&mut surface).unwrap();
        assert_eq!(
            surface.frames[0].points,
            vec![Point(0.0, 1.0), Point(1.0, 1.0)]
        );
    }

    #[test]
    fn newest_layer_is_drawn_at_full_opacity() {
        let mut controller = running(settings(10, 5, 0));
        let mut surface = Recorder::new();
        for _ in 0..3 {
            controller.tick(&mut surface).unwrap();
        }
        let layers = &surface.frames[2].layers;
        assert_eq!(layers.len(), 3);
        assert_eq!(layers[2].opacity, 0.3);
        assert!(layers[0].opacity < layers[1].opacity);
    }

    #[test]
    fn surface_failure_stops_the_animation() {
        let mut controller = running(settings(10, 2, 0));
        let mut surface = Recorder::closing_after(2);
        assert_eq!(controller.tick(&mut surface).unwrap(), State::Running);
        assert_eq!(controller.tick(&mut surface).unwrap(), State::Running);
        assert_eq!(controller.tick(&mut surface).unwrap(), State::Stopped);
        match controller.tick(&mut surface) {
            Err(Error::NotRunning) => {}
            other => panic!("ticked after stop: {:?}", other.map(|_| ())),
        }
        assert!(controller.start().is_err());
    }

    #[test]
    fn run_stops_at_the_frame_limit() {
        let mut controller =
            Controller::new(settings(10, 2, 3), StdRng::seed_from_u64(3)).unwrap();
        let mut surface = Recorder::new();
        let mut pacer = Pacer::new(1000.0).unwrap();
        assert_eq!(controller.run(&mut surface, &mut pacer, Some(7)).unwrap(), 7);
        assert_eq!(surface.frames.len(), 7);
        assert_eq!(controller.state(), State::Stopped);
        assert_eq!(controller.resets(), 2);
    }

    #[test]
    fn run_stops_when_the_surface_closes() {
        let mut controller =
            Controller::new(settings(10, 2, 0), StdRng::seed_from_u64(3)).unwrap();
        let mut surface = Recorder::closing_after(4);
        let mut pacer = Pacer::new(1000.0).unwrap();
        assert_eq!(controller.run(&mut surface, &mut pacer, None).unwrap(), 5);
        assert_eq!(surface.frames.len(), 4);
    }
}
