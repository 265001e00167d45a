// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Frame pacing.

use log::debug;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::Error;

/// The time between frames at `fps` frames per second.  Refuses
/// rates that are not positive, and rates so low the period cannot be
/// represented.
pub fn period_for(fps: f64) -> Result<Duration, Error> {
    let secs = 1.0 / fps;
    if !(fps > 0.0) || !fps.is_finite() || !(secs < u64::max_value() as f64) {
        return Err(Error::Configuration(format!(
            "frame rate must be a positive number, not {}",
            fps
        )));
    }
    Ok(Duration::from_secs_f64(secs))
}

/// Sleeps between ticks so they land one period apart.  A tick that
/// overruns pushes every later deadline back instead of bunching the
/// following ticks together, so a slow machine just sees a lower frame
/// rate.
#[derive(Debug)]
pub struct Pacer {
    period: Duration,
    deadline: Option<Instant>,
    started: Option<Instant>,
    ticks: u64,
    overruns: u64,
}

impl Pacer {
    /// A pacer for `fps` frames per second.  `fps` must be positive
    /// and finite.
    pub fn new(fps: f64) -> Result<Self, Error> {
        Ok(Pacer {
            period: period_for(fps)?,
            deadline: None,
            started: None,
            ticks: 0,
            overruns: 0,
        })
    }

    /// Time between frames.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Blocks until the next frame is due.  The first call returns at
    /// once and arms the timer.
    pub fn wait(&mut self) {
        let now = Instant::now();
        let deadline = match self.deadline {
            None => {
                self.started = Some(now);
                now
            }
            Some(deadline) if deadline > now => {
                thread::sleep(deadline - now);
                deadline
            }
            Some(deadline) => {
                self.overruns += 1;
                debug!("frame {} ran {:?} over", self.ticks, now - deadline);
                now
            }
        };
        self.deadline = Some(deadline + self.period);
        self.ticks += 1;
    }

    /// Number of completed waits.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// How many frames missed their deadline.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Frames per second actually achieved since the first wait.
    pub fn observed_fps(&self) -> f64 {
        match self.started {
            Some(started) if self.ticks > 1 => {
                let elapsed = started.elapsed().as_secs_f64();
                if elapsed > 0.0 {
                    (self.ticks - 1) as f64 / elapsed
                } else {
                    0.0
                }
            }
            _ => 0.0,
        }
    }
}
