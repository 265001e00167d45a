// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors raised by the engine, the controller and the rendering
//! surfaces.

use failure::Fail;
use std::io;

/// Everything that can go wrong while configuring or animating an
/// attractor.
#[derive(Debug, Fail)]
pub enum Error {
    /// An option value is out of range.  Raised before the animation
    /// starts; the controller never enters `Running`.
    #[fail(display = "invalid configuration: {}", _0)]
    Configuration(String),

    /// A caller broke an API contract, such as asking the engine for
    /// zero iterations.
    #[fail(display = "invalid argument: {}", _0)]
    InvalidArgument(String),

    /// The controller was ticked while not `Running`.
    #[fail(display = "the animation is not running")]
    NotRunning,

    /// The rendering surface could not take a frame.
    #[fail(display = "rendering surface failed: {}", _0)]
    Surface(#[cause] SurfaceError),
}

/// Failures of a rendering surface.  Any of these stops the animation.
#[derive(Debug, Fail)]
pub enum SurfaceError {
    /// The surface has been shut down and accepts no more frames.
    #[fail(display = "surface closed")]
    Closed,

    /// Writing the frame out failed.
    #[fail(display = "{}", _0)]
    Io(#[cause] io::Error),
}

impl From<io::Error> for SurfaceError {
    fn from(e: io::Error) -> Self {
        SurfaceError::Io(e)
    }
}

impl From<SurfaceError> for Error {
    fn from(e: SurfaceError) -> Self {
        Error::Surface(e)
    }
}
