#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Hopalong renderer
//!
//! Barry Martin's Hopalong attractor is a two dimensional map that
//! hops a point around the plane according to three parameters.  A
//! single orbit, plotted point by point, draws concentric rings and
//! lattices of dots whose shape changes completely with the parameters.
//!
//! This crate animates it.  Every frame the engine advances the orbit
//! by a fixed number of iterations, the controller keeps the last few
//! batches on screen, fading the older ones, and every so often throws
//! the parameters away and starts a new orbit.  Frames go to a
//! `Surface`; the bundled ones write numbered PPM files or discard the
//! image.

pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod history;
pub mod planes;
pub mod surface;
pub mod timer;

pub use config::Settings;
pub use controller::{Controller, FrameCounter, State};
pub use engine::{Engine, ParamRange, Params, Start, Variant};
pub use error::{Error, SurfaceError};
pub use history::{Batch, FrameHistory, Layer};
pub use planes::Point;
pub use surface::{Discard, Frame, PpmSequence, Surface};
pub use timer::Pacer;
