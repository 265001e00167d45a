// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Animation settings, their defaults, and the parsers the command
//! line uses to build them.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::engine::{ParamRange, Params, Start, Variant};
use crate::error::Error;
use crate::planes::Point;
use crate::timer::period_for;

/// Everything the controller, pacer and surface need to know.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// Engine iterations per frame.  Positive.
    pub iterations: usize,
    /// Batches kept on screen.  Zero shows only the newest.
    pub history: usize,
    /// Frames between parameter resets.  Zero never resets.
    pub reset_interval: usize,
    /// Target frames per second.  Positive.
    pub fps: f64,
    /// Parameters of the first orbit; drawn from `range` when absent.
    pub params: Option<Params>,
    /// Where random parameters are drawn from.
    pub range: ParamRange,
    /// Where each orbit starts.
    pub start: Start,
    /// Which map to iterate.
    pub variant: Variant,
    /// Seed for the random source; entropy when absent.
    pub seed: Option<u64>,
    /// Opacity of the newest batch, in (0, 1].
    pub opacity: f32,
    /// Frame width and height in pixels.
    pub size: (usize, usize),
    /// Directory frames are written to; headless when absent.
    pub output: Option<PathBuf>,
    /// Stop after this many frames; run until the surface stops when
    /// absent.
    pub frames: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            iterations: 1_000,
            history: 10,
            reset_interval: 10,
            fps: 25.0,
            params: None,
            range: ParamRange::default(),
            start: Start::default(),
            variant: Variant::default(),
            seed: None,
            opacity: 0.3,
            size: (800, 800),
            output: None,
            frames: None,
        }
    }
}

impl Settings {
    /// Checks every constraint.  Settings that pass can start an
    /// animation; settings that fail never will.
    pub fn validate(&self) -> Result<(), Error> {
        if self.iterations == 0 {
            return Err(Error::Configuration(
                "iterations per frame must be positive".to_string(),
            ));
        }
        check_rate(self.fps)?;
        check_opacity(self.opacity)?;
        ParamRange::new(self.range.low(), self.range.high())?;
        if let Some(p) = self.params {
            if !(p.a.is_finite() && p.b.is_finite() && p.c.is_finite()) {
                return Err(Error::Configuration(format!(
                    "parameters {} are not finite",
                    p
                )));
            }
        }
        if let Start::Fixed(p) = self.start {
            if !p.is_finite() {
                return Err(Error::Configuration(format!(
                    "start position {},{} is not finite",
                    p.0, p.1
                )));
            }
        }
        check_size(self.size)?;
        Ok(())
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "niters={} nhist={} nreset={} fps={} period={:.4}s range={},{} variant={}",
            self.iterations,
            self.history,
            self.reset_interval,
            self.fps,
            1.0 / self.fps,
            self.range.low(),
            self.range.high(),
            self.variant
        )
    }
}

/// Given a string and a separator, returns the two values
/// separated by the separator.
pub fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

/// Parses a whole number, refusing negatives, and zero unless
/// `allow_zero`.
pub fn parse_count(name: &str, s: &str, allow_zero: bool) -> Result<usize, Error> {
    let n = i64::from_str(s.trim())
        .map_err(|_| Error::Configuration(format!("{} '{}' is not a whole number", name, s)))?;
    if n < 0 || (n == 0 && !allow_zero) {
        let want = if allow_zero { "zero or more" } else { "at least one" };
        return Err(Error::Configuration(format!(
            "{} must be {}, not {}",
            name, want, n
        )));
    }
    Ok(n as usize)
}

fn check_rate(fps: f64) -> Result<f64, Error> {
    period_for(fps).map(|_| fps)
}

fn check_opacity(opacity: f32) -> Result<f32, Error> {
    if opacity > 0.0 && opacity <= 1.0 {
        Ok(opacity)
    } else {
        Err(Error::Configuration(format!(
            "opacity must be in (0, 1], not {}",
            opacity
        )))
    }
}

/// Parses a positive frame rate.
pub fn parse_rate(s: &str) -> Result<f64, Error> {
    let fps = f64::from_str(s.trim())
        .map_err(|_| Error::Configuration(format!("frame rate '{}' is not a number", s)))?;
    check_rate(fps)
}

/// Parses an opacity in (0, 1].
pub fn parse_opacity(s: &str) -> Result<f32, Error> {
    let opacity = f32::from_str(s.trim())
        .map_err(|_| Error::Configuration(format!("opacity '{}' is not a number", s)))?;
    check_opacity(opacity)
}

/// Parses `low,high` into a parameter range.
pub fn parse_range(s: &str) -> Result<ParamRange, Error> {
    match parse_pair::<f64>(s, ',') {
        Some((low, high)) => ParamRange::new(low, high),
        None => Err(Error::Configuration(format!(
            "could not parse parameter range '{}'",
            s
        ))),
    }
}

/// Parses `x,y` into a point.
pub fn parse_point(s: &str) -> Result<Point, Error> {
    match parse_pair::<f64>(s, ',') {
        Some((x, y)) if x.is_finite() && y.is_finite() => Ok(Point(x, y)),
        _ => Err(Error::Configuration(format!(
            "could not parse start position '{}'",
            s
        ))),
    }
}

/// Parses `a,b,c` into explicit parameters.
pub fn parse_params(s: &str) -> Result<Params, Error> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| f64::from_str(v.trim()))
        .collect::<Result<_, _>>()
        .map_err(|_| Error::Configuration(format!("could not parse parameters '{}'", s)))?;
    match values.as_slice() {
        &[a, b, c] if values.iter().all(|v| v.is_finite()) => Ok(Params::new(a, b, c)),
        _ => Err(Error::Configuration(format!(
            "parameters '{}' must be three finite numbers a,b,c",
            s
        ))),
    }
}

/// Parses `WIDTHxHEIGHT` into a non-empty frame size.  Each side must
/// fit in a `u16`.
pub fn parse_size(s: &str) -> Result<(usize, usize), Error> {
    match parse_pair::<u16>(s, 'x') {
        Some((w, h)) => check_size((usize::from(w), usize::from(h))),
        None => Err(Error::Configuration(format!(
            "could not parse frame size '{}'; each side must be 1 to {}",
            s,
            u16::max_value()
        ))),
    }
}

fn check_size(size: (usize, usize)) -> Result<(usize, usize), Error> {
    let max = usize::from(u16::max_value());
    if size.0 == 0 || size.1 == 0 || size.0 > max || size.1 > max {
        return Err(Error::Configuration(format!(
            "frame size {}x{} must be 1 to {} pixels on each side",
            size.0, size.1, max
        )));
    }
    Ok(size)
}
