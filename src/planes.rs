// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the Point type produced by the attractor, and the
//! PlaneMapper struct, which describes a relationship between a
//! rectangle on the integral plane with an origin at 0,0 and a
//! rectangle on the real plane with an arbitrary pair of corners
//! defining the leftlower and rightupper corners of the real plane.

use itertools::{Itertools, MinMaxResult};

use crate::error::Error;

/// Fraction of each extent added around a fitted view, so the outermost
/// points do not sit on the frame edge.
const MARGIN: f64 = 0.05;

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// A location on the real plane: x, then y.  Every iteration of the
/// attractor produces one of these.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point(pub f64, pub f64);

impl Point {
    /// True when both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.0.is_finite() && self.1.is_finite()
    }
}

/// Describes the x, y of a pixel in the integral plane.  Row zero is
/// the top of the image.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// Maps points on a rectangle of the real plane onto the pixels of an
/// integral plane.  Larger y values land on smaller rows, so the image
/// reads the way a plot does.
#[derive(Debug)]
pub struct PlaneMapper {
    /// The right-upper hand corner of the integral cartesian plane.
    /// The left-lower is assumed to be at 0,0
    pub integral_plane: IntegralPlane,
    /// The left-lower corner of the real plane.
    pub leftlower: Point,
    /// The right-upper corner of the real plane.
    pub rightupper: Point,
    // The ratio mapping the width and height, respectively, of the two
    // different planes.
    grid_factors: (f64, f64),
}

impl PlaneMapper {
    /// Constructor.  Takes the size of the integral plane, and two
    /// points describing the real plane.
    pub fn new(
        width: usize,
        height: usize,
        leftlower: Point,
        rightupper: Point,
    ) -> Result<PlaneMapper, Error> {
        if !(rightupper.0 > leftlower.0) {
            return Err(Error::InvalidArgument(
                "The left lower corner is not to the left of the right upper corner.".to_string(),
            ));
        }

        if !(rightupper.1 > leftlower.1) {
            return Err(Error::InvalidArgument(
                "The left lower corner is not lower than the right upper corner".to_string(),
            ));
        }

        let grid_factors = (
            (width as f64) / (rightupper.0 - leftlower.0),
            (height as f64) / (rightupper.1 - leftlower.1),
        );

        Ok(PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            leftlower,
            rightupper,
            grid_factors,
        })
    }

    /// Builds a mapper whose real rectangle encloses every finite point
    /// in `points`, padded by a small margin.  A cloud with no extent
    /// along an axis is widened to a unit interval around it, and an
    /// empty cloud maps the unit box around the origin.
    pub fn fit(width: usize, height: usize, points: &[Point]) -> Result<PlaneMapper, Error> {
        let finite = || points.iter().filter(|p| p.is_finite());
        let (x0, x1) = extent(finite().map(|p| p.0).minmax());
        let (y0, y1) = extent(finite().map(|p| p.1).minmax());
        PlaneMapper::new(width, height, Point(x0, y0), Point(x1, y1))
    }

    /// The total number of points in the integral grid.  Used to
    /// calculate memory needs.
    pub fn len(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// Describes that the integral plane is of a size.
    pub fn is_empty(&self) -> bool {
        self.integral_plane.0 == 0 || self.integral_plane.1 == 0
    }

    /// Given a point on the real plane, map it to the pixel that
    /// contains it, or None if it falls outside the integral plane.
    pub fn point_to_pixel(&self, point: &Point) -> Option<Pixel> {
        let left = (point.0 - self.leftlower.0) * self.grid_factors.0;
        let top = (self.rightupper.1 - point.1) * self.grid_factors.1;
        let IntegralPlane(width, height) = self.integral_plane;
        if self.is_empty()
            || !(left >= 0.0 && left <= width as f64)
            || !(top >= 0.0 && top <= height as f64)
        {
            return None;
        }
        // The right and lower edges belong to the last column and row.
        Some(Pixel(
            (left as usize).min(width - 1),
            (top as usize).min(height - 1),
        ))
    }

    /// Maps a point straight to its linear offset from the root of
    /// the image buffer in memory.
    pub fn point_to_offset(&self, point: &Point) -> Option<usize> {
        self.point_to_pixel(point)
            .map(|Pixel(left, top)| top * self.integral_plane.0 + left)
    }
}

fn extent(range: MinMaxResult<f64>) -> (f64, f64) {
    let (lo, hi) = match range {
        MinMaxResult::NoElements => (0.0, 0.0),
        MinMaxResult::OneElement(v) => (v, v),
        MinMaxResult::MinMax(lo, hi) => (lo, hi),
    };
    let span = hi - lo;
    if !(span > f64::EPSILON * lo.abs().max(hi.abs()).max(1.0)) {
        return (lo - 0.5, hi + 0.5);
    }
    (lo - span * MARGIN, hi + span * MARGIN)
}
