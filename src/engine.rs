// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Hopalong attractor engine
//!
//! Barry Martin's "Hopalong" map takes a point (x, y) and three
//! parameters (a, b, c) and hops to
//!
//! ```text
//! x' = y - sign(x) * sqrt(|b*x - c|)
//! y' = a - x
//! ```
//!
//! Iterated a few thousand times from the origin, the orbit traces
//! out rings of dots whose shape depends entirely on (a, b, c).  The
//! absolute value under the root keeps the map total over the reals,
//! so no combination of parameters or positions can make it fail.

use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::planes::Point;

/// The three parameters that shape the orbit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Params {
    /// Offset of the y recurrence.
    pub a: f64,
    /// Scale applied to x under the root.
    pub b: f64,
    /// Shift applied to x under the root.
    pub c: f64,
}

impl Params {
    /// Bundles explicit parameters.
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Params { a, b, c }
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a={:.4} b={:.4} c={:.4}", self.a, self.b, self.c)
    }
}

/// The closed interval random parameters are drawn from.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ParamRange {
    low: f64,
    high: f64,
}

impl ParamRange {
    /// Requires finite bounds with `low < high`.
    pub fn new(low: f64, high: f64) -> Result<Self, Error> {
        if !low.is_finite() || !high.is_finite() || !(low < high) {
            return Err(Error::Configuration(format!(
                "parameter range {},{} must be finite with the lower bound first",
                low, high
            )));
        }
        Ok(ParamRange { low, high })
    }

    /// Lower bound.
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Upper bound.
    pub fn high(&self) -> f64 {
        self.high
    }

    fn uniform(&self) -> Uniform<f64> {
        Uniform::new_inclusive(self.low, self.high)
    }

    /// Draws a, b and c independently and uniformly from the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Params {
        let u = self.uniform();
        Params {
            a: u.sample(rng),
            b: u.sample(rng),
            c: u.sample(rng),
        }
    }

    /// Draws a position with both coordinates uniform in the range.
    pub fn sample_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        let u = self.uniform();
        Point(u.sample(rng), u.sample(rng))
    }
}

impl Default for ParamRange {
    fn default() -> Self {
        ParamRange {
            low: -10.0,
            high: 10.0,
        }
    }
}

/// Where an orbit begins after initialisation or a reset.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Start {
    /// Always the same position.
    Fixed(Point),
    /// A fresh position drawn from the parameter range every time.
    Random,
}

impl Start {
    /// Resolves the start position, drawing from `range` when random.
    pub fn position<R: Rng + ?Sized>(&self, rng: &mut R, range: &ParamRange) -> Point {
        match *self {
            Start::Fixed(p) => p,
            Start::Random => range.sample_point(rng),
        }
    }
}

impl Default for Start {
    fn default() -> Self {
        Start::Fixed(Point(0.0, 0.0))
    }
}

/// The family of maps `x' = y + f(x)`, `y' = a - x`.  Only the
/// choice of f differs.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Variant {
    /// `f(x) = -sign(x) * sqrt(|b*x - c|)`, Martin's original.
    Classic,
    /// `f(x) = sign(x) * sqrt(|b*x - c|)`
    Positive,
    /// `f(x) = sqrt(|b*x - c|)`
    Additive,
    /// `f(x) = sin(b*x - c)`
    Sinusoidal,
    /// `f(x) = |b*x|`
    Gingerbread,
}

impl Variant {
    /// Every variant, in the order they are listed on the command line.
    pub const ALL: [Variant; 5] = [
        Variant::Classic,
        Variant::Positive,
        Variant::Additive,
        Variant::Sinusoidal,
        Variant::Gingerbread,
    ];

    /// The command line name of the variant.
    pub fn name(self) -> &'static str {
        match self {
            Variant::Classic => "classic",
            Variant::Positive => "positive",
            Variant::Additive => "additive",
            Variant::Sinusoidal => "sinusoidal",
            Variant::Gingerbread => "gingerbread",
        }
    }

    #[inline]
    fn offset(self, x: f64, b: f64, c: f64) -> f64 {
        match self {
            Variant::Classic => -sign(x) * (b * x - c).abs().sqrt(),
            Variant::Positive => sign(x) * (b * x - c).abs().sqrt(),
            Variant::Additive => (b * x - c).abs().sqrt(),
            Variant::Sinusoidal => (b * x - c).sin(),
            Variant::Gingerbread => (b * x).abs(),
        }
    }
}

impl Default for Variant {
    fn default() -> Self {
        Variant::Classic
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .iter()
            .cloned()
            .find(|v| v.name() == s)
            .ok_or_else(|| Error::Configuration(format!("unknown map variant '{}'", s)))
    }
}

/// -1, 0 or +1.  Zero, of either sign, maps to 0 so an orbit sitting
/// on the y axis takes no horizontal offset.
#[inline]
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Holds the parameters and the current position of one orbit, and
/// advances it in batches.
#[derive(Clone, Debug)]
pub struct Engine {
    params: Params,
    start: Point,
    state: Point,
    variant: Variant,
}

impl Engine {
    /// Initialises the engine at `start` with the classic map.
    pub fn new(params: Params, start: Point) -> Self {
        Engine {
            params,
            start,
            state: start,
            variant: Variant::Classic,
        }
    }

    /// Initialises the engine with parameters drawn from `range`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, range: &ParamRange, start: &Start) -> Self {
        let params = range.sample(rng);
        let start = start.position(rng, range);
        Engine::new(params, start)
    }

    /// Switches to another member of the map family.  The position is
    /// left alone.
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Current parameters.
    pub fn params(&self) -> Params {
        self.params
    }

    /// Current position: the last point returned by `step_batch`, or
    /// the start position if nothing has been stepped since the last
    /// reset.
    pub fn state(&self) -> Point {
        self.state
    }

    /// The position the orbit returns to on reset.
    pub fn start(&self) -> Point {
        self.start
    }

    /// The selected map.
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// One hop of the map from `p`.
    #[inline]
    pub fn hop(&self, p: Point) -> Point {
        let Params { a, b, c } = self.params;
        Point(p.1 + self.variant.offset(p.0, b, c), a - p.0)
    }

    /// Applies the map `n` times and returns every resulting point,
    /// not including the position the batch started from.  The engine
    /// is left at the last point, so consecutive batches continue the
    /// same orbit.
    pub fn step_batch(&mut self, n: usize) -> Result<Vec<Point>, Error> {
        if n == 0 {
            return Err(Error::InvalidArgument(
                "a batch needs at least one iteration".to_string(),
            ));
        }
        let mut points = Vec::with_capacity(n);
        let mut p = self.state;
        for _ in 0..n {
            p = self.hop(p);
            points.push(p);
        }
        self.state = p;
        Ok(points)
    }

    /// Installs explicit parameters and returns the orbit to the start
    /// position.
    pub fn reset(&mut self, params: Params) {
        self.params = params;
        self.state = self.start;
    }

    /// Installs parameters and a new start position.
    pub fn reset_at(&mut self, params: Params, start: Point) {
        self.start = start;
        self.reset(params);
    }

    /// Draws fresh parameters (and, for a random start, a fresh start
    /// position) and begins a new orbit.  Returns the new parameters.
    pub fn randomize<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        range: &ParamRange,
        start: &Start,
    ) -> Params {
        let params = range.sample(rng);
        let start = start.position(rng, range);
        self.reset_at(params, start);
        params
    }
}
