// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Rendering surfaces.  The controller hands each finished frame to a
//! `Surface`; what the surface does with it (write it to disk, throw
//! it away) is its own business.

use image::pnm::PNMEncoder;
use image::pnm::{PNMSubtype, SampleEncoding};
use image::ColorType;
use num::clamp;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::engine::Params;
use crate::error::{Error, SurfaceError};
use crate::history::Layer;
use crate::planes::{Point, PlaneMapper};

/// Everything visible in one frame.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Frames rendered since start, counting from one.
    pub number: u64,
    /// The parameters of the orbit being drawn.
    pub params: Params,
    /// Every retained point, oldest batch first.
    pub points: Vec<Point>,
    /// Where each batch sits in `points`, and its opacity.
    pub layers: Vec<Layer>,
}

/// Something frames can be drawn on.
pub trait Surface {
    /// Draws one frame.  An error means the surface is unusable and
    /// the animation should stop.
    fn draw(&mut self, frame: &Frame) -> Result<(), SurfaceError>;
}

// Stops sampled from matplotlib's "plasma" colormap.
const PLASMA: [[f32; 3]; 5] = [
    [13.0, 8.0, 135.0],
    [126.0, 3.0, 168.0],
    [204.0, 71.0, 120.0],
    [248.0, 149.0, 64.0],
    [240.0, 249.0, 33.0],
];

/// Colour for position `t` in [0, 1] along the plasma gradient.
pub fn plasma(t: f32) -> [f32; 3] {
    let t = clamp(t, 0.0, 1.0) * (PLASMA.len() - 1) as f32;
    let i = (t as usize).min(PLASMA.len() - 2);
    let f = t - i as f32;
    let (lo, hi) = (PLASMA[i], PLASMA[i + 1]);
    [
        lo[0] + (hi[0] - lo[0]) * f,
        lo[1] + (hi[1] - lo[1]) * f,
        lo[2] + (hi[2] - lo[2]) * f,
    ]
}

/// An RGB raster on a black background.  Each frame is fitted to the
/// extent of its points, then every batch is blended in, oldest first,
/// at its layer's opacity.  Within a batch, points run along the plasma
/// gradient in the order they were produced.
#[derive(Debug)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<f32>,
}

impl Canvas {
    /// A black canvas of the given size.  Both sides must be non-zero
    /// and fit in a `u16`.
    pub fn new(width: usize, height: usize) -> Result<Self, Error> {
        let max = usize::from(u16::max_value());
        let samples = width.checked_mul(height).and_then(|n| n.checked_mul(3));
        match samples {
            Some(samples) if samples > 0 && width <= max && height <= max => Ok(Canvas {
                width,
                height,
                pixels: vec![0.0; samples],
            }),
            _ => Err(Error::Configuration(format!(
                "frame size {}x{} must be 1 to {} pixels on each side",
                width, height, max
            ))),
        }
    }

    /// Width and height in pixels.
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Clears the canvas and draws `frame` on it.
    pub fn paint(&mut self, frame: &Frame) {
        for p in self.pixels.iter_mut() {
            *p = 0.0;
        }
        let plane = match PlaneMapper::fit(self.width, self.height, &frame.points) {
            Ok(plane) => plane,
            Err(_) => return,
        };
        for layer in &frame.layers {
            let alpha = clamp(layer.opacity, 0.0, 1.0);
            let span = layer.len.saturating_sub(1).max(1) as f32;
            let points = match frame.points.get(layer.offset..layer.offset + layer.len) {
                Some(points) => points,
                None => continue,
            };
            for (i, point) in points.iter().enumerate() {
                if let Some(offset) = plane.point_to_offset(point) {
                    let colour = plasma(i as f32 / span);
                    let px = &mut self.pixels[offset * 3..offset * 3 + 3];
                    for (channel, c) in px.iter_mut().zip(colour.iter()) {
                        *channel += (c - *channel) * alpha;
                    }
                }
            }
        }
    }

    /// The canvas as packed 8-bit RGB, row by row from the top.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .map(|v| clamp(v.round(), 0.0, 255.0) as u8)
            .collect()
    }
}

/// Writes every frame to `<dir>/frame_NNNNNN.ppm` as a binary pixmap.
#[derive(Debug)]
pub struct PpmSequence {
    dir: PathBuf,
    canvas: Canvas,
    written: u64,
}

impl PpmSequence {
    /// Creates `dir` if needed.
    pub fn new<P: AsRef<Path>>(dir: P, width: usize, height: usize) -> Result<Self, Error> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| Error::Surface(SurfaceError::Io(e)))?;
        Ok(PpmSequence {
            dir,
            canvas: Canvas::new(width, height)?,
            written: 0,
        })
    }

    /// The file a frame is written to.
    pub fn path_for(&self, number: u64) -> PathBuf {
        self.dir.join(format!("frame_{:06}.ppm", number))
    }

    /// Number of frames written so far.
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl Surface for PpmSequence {
    fn draw(&mut self, frame: &Frame) -> Result<(), SurfaceError> {
        self.canvas.paint(frame);
        let (width, height) = self.canvas.size();
        let pixels = self.canvas.to_rgb8();
        let output = BufWriter::new(File::create(self.path_for(frame.number))?);
        let mut encoder =
            PNMEncoder::new(output).with_subtype(PNMSubtype::Pixmap(SampleEncoding::Binary));
        encoder.encode(
            &pixels[..],
            width as u32,
            height as u32,
            ColorType::RGB(8),
        )?;
        self.written += 1;
        Ok(())
    }
}

/// Rasterises frames and throws them away.  Useful for timing the
/// animation with no display attached.
#[derive(Debug)]
pub struct Discard {
    canvas: Canvas,
}

impl Discard {
    /// A discarding surface of the given size.
    pub fn new(width: usize, height: usize) -> Result<Self, Error> {
        Ok(Discard {
            canvas: Canvas::new(width, height)?,
        })
    }
}

impl Surface for Discard {
    fn draw(&mut self, frame: &Frame) -> Result<(), SurfaceError> {
        self.canvas.paint(frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn frame(points: Vec<Point>, opacity: f32) -> Frame {
        let len = points.len();
        Frame {
            number: 1,
            params: Params::new(1.0, 1.0, 0.0),
            points,
            layers: vec![Layer {
                offset: 0,
                len,
                opacity,
            }],
        }
    }

    #[test]
    fn plasma_endpoints() {
        assert_eq!(plasma(0.0), PLASMA[0]);
        assert_eq!(plasma(1.0), PLASMA[4]);
        assert_eq!(plasma(7.0), PLASMA[4]);
        assert_eq!(plasma(-1.0), PLASMA[0]);
    }

    #[test]
    fn canvas_rejects_empty_and_oversized_sizes() {
        assert!(Canvas::new(0, 10).is_err());
        assert!(Canvas::new(65536, 2).is_err());
        assert!(Canvas::new(usize::max_value(), usize::max_value()).is_err());
    }

    #[test]
    fn fully_opaque_points_take_their_colour() {
        let mut canvas = Canvas::new(4, 4).unwrap();
        canvas.paint(&frame(vec![Point(0.0, 0.0), Point(1.0, 1.0)], 1.0));
        let rgb = canvas.to_rgb8();
        // The first point lands bottom left, the last top right.
        let bottom_left = 12 * 3;
        let top_right = 3 * 3;
        assert_eq!(&rgb[bottom_left..bottom_left + 3], &[13, 8, 135]);
        assert_eq!(&rgb[top_right..top_right + 3], &[240, 249, 33]);
        assert_eq!(rgb.iter().filter(|&&v| v != 0).count(), 6);
    }

    #[test]
    fn faint_layers_blend_towards_black() {
        let mut canvas = Canvas::new(2, 2).unwrap();
        canvas.paint(&frame(vec![Point(0.0, 0.0)], 0.5));
        let rgb = canvas.to_rgb8();
        assert!(rgb.iter().any(|&v| v > 0));
        assert!(rgb.iter().all(|&v| v <= 68));
    }

    #[test]
    fn ppm_sequence_writes_numbered_pixmaps() {
        let dir = tempfile::tempdir().unwrap();
        let mut surface = PpmSequence::new(dir.path().join("frames"), 8, 6).unwrap();
        surface
            .draw(&frame(vec![Point(0.0, 0.0), Point(1.0, 2.0)], 0.3))
            .unwrap();
        assert_eq!(surface.written(), 1);

        let mut bytes = Vec::new();
        File::open(surface.path_for(1))
            .unwrap()
            .read_to_end(&mut bytes)
            .unwrap();
        assert!(bytes.starts_with(b"P6"));
        assert!(bytes.len() > 8 * 6 * 3);
    }

    #[test]
    fn ppm_sequence_reports_io_failures() {
        let dir = tempfile::tempdir().unwrap();
        let mut surface = PpmSequence::new(dir.path(), 2, 2).unwrap();
        drop(dir);
        match surface.draw(&frame(vec![Point(0.0, 0.0)], 1.0)) {
            Err(SurfaceError::Io(_)) => {}
            other => panic!("expected an io failure, got {:?}", other),
        }
    }
}
