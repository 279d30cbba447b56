//! Shape silhouettes and the alpha buffer they are rasterized into.
//!
//! A pixel `(px, py)` of a mask covers the world square of side `pixel` whose
//! top-left corner is `origin + (px, py) × pixel`; coverage is decided by
//! sampling the pixel center.

#[cfg(test)]
#[path = "raster_test.rs"]
mod raster_test;

use std::path::Path;

use image::{GrayImage, Luma};
use kurbo::{BezPath, Circle, Shape as _};

use crate::doc::{Body, DrawableObject, ShapeKind};
use crate::geom::{self, Bounds, Point, Transform};

/// Fully opaque alpha.
const OPAQUE: u8 = 255;

/// Minimum stroke thickness used when filling a `line` shape.
const MIN_LINE_FILL: f64 = 4.0;

/// Local-space outline of a filled shape.
#[derive(Debug, Clone)]
enum Outline {
    /// Axis-aligned box given by half extents.
    Box { half_w: f64, half_h: f64 },
    Circle(Circle),
    Path(BezPath),
    /// Nothing to fill (e.g. a polygon without vertices).
    Empty,
}

/// The filled region of a shape object, in its local space, plus its placement.
#[derive(Debug, Clone)]
pub struct Silhouette {
    outline: Outline,
    bounds: Option<Bounds>,
    transform: Transform,
}

impl Silhouette {
    /// Silhouette of a shape object. Strokes and text have none.
    #[must_use]
    pub fn of(obj: &DrawableObject) -> Option<Self> {
        let Body::Shape { shape, width, height, points } = &obj.body else {
            return None;
        };
        let width = width.max(0.0);
        let height = height.max(0.0);
        let outline = match shape {
            ShapeKind::Rect => Outline::Box { half_w: width / 2.0, half_h: height / 2.0 },
            ShapeKind::Circle => Outline::Circle(Circle::new((0.0, 0.0), width.max(height) / 2.0)),
            ShapeKind::Triangle => closed_path(&[
                Point::new(0.0, -height / 2.0),
                Point::new(width / 2.0, height / 2.0),
                Point::new(-width / 2.0, height / 2.0),
            ]),
            ShapeKind::Polygon => closed_path(points),
            ShapeKind::Line => {
                Outline::Box { half_w: width / 2.0, half_h: obj.line_width.max(MIN_LINE_FILL) / 2.0 }
            }
        };
        let bounds = match &outline {
            Outline::Box { half_w, half_h } => Some(Bounds::centered(*half_w, *half_h)),
            Outline::Circle(c) => Some(Bounds::centered(c.radius, c.radius)),
            Outline::Path(path) => {
                let r = path.bounding_box();
                Some(Bounds { min_x: r.x0, min_y: r.y0, max_x: r.x1, max_y: r.y1 })
            }
            Outline::Empty => None,
        };
        Some(Self { outline, bounds, transform: obj.transform() })
    }

    /// Whether a local point is inside the filled region.
    #[must_use]
    pub fn contains_local(&self, p: Point) -> bool {
        let kp = kurbo::Point::new(p.x, p.y);
        match &self.outline {
            Outline::Box { half_w, half_h } => p.x.abs() <= *half_w && p.y.abs() <= *half_h,
            Outline::Circle(c) => c.contains(kp),
            Outline::Path(path) => path.contains(kp),
            Outline::Empty => false,
        }
    }

    /// Whether a world point is inside the filled region.
    #[must_use]
    pub fn contains_world(&self, p: Point) -> bool {
        self.contains_local(self.transform.to_local(p))
    }

    /// Axis-aligned world box around the transformed local outline box.
    #[must_use]
    pub fn world_bounds(&self) -> Option<Bounds> {
        let local = self.bounds?;
        Bounds::from_points(local.corners().map(|c| self.transform.to_world(c)))
    }
}

fn closed_path(points: &[Point]) -> Outline {
    let Some((first, rest)) = points.split_first() else {
        return Outline::Empty;
    };
    let mut path = BezPath::new();
    path.move_to((first.x, first.y));
    for p in rest {
        path.line_to((p.x, p.y));
    }
    path.close_path();
    Outline::Path(path)
}

/// Pixel window of a mask in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    /// World position of the top-left corner of pixel `(0, 0)`.
    pub origin: Point,
    pub width: u32,
    pub height: u32,
    /// World units covered by one pixel side.
    pub pixel: f64,
}

impl Window {
    /// Window covering `bounds` grown by `padding`, or `None` when it would
    /// be empty or non-finite.
    ///
    /// Pixels are one world unit wide unless that would exceed `max_pixels`,
    /// in which case the pixel size grows until the grid fits.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    #[must_use]
    pub fn around(bounds: &Bounds, padding: f64, max_pixels: u64) -> Option<Self> {
        let padded = bounds.padded(padding);
        let (w, h) = (padded.width(), padded.height());
        if !w.is_finite() || !h.is_finite() || w.ceil() < 1.0 || h.ceil() < 1.0 {
            return None;
        }

        let budget = max_pixels.max(1) as f64;
        let mut pixel = 1.0_f64;
        if w.ceil() * h.ceil() > budget {
            pixel = (w * h / budget).sqrt().max(1.0);
        }
        let grid = |pixel: f64| ((w / pixel).ceil().max(1.0), (h / pixel).ceil().max(1.0));
        let (mut cols, mut rows) = grid(pixel);
        while cols * rows > budget || cols > f64::from(u32::MAX) || rows > f64::from(u32::MAX) {
            pixel *= 1.25;
            (cols, rows) = grid(pixel);
        }
        Some(Self { origin: Point::new(padded.min_x, padded.min_y), width: cols as u32, height: rows as u32, pixel })
    }

    /// World position of the center of pixel `(px, py)`.
    #[must_use]
    pub fn pixel_center(&self, px: u32, py: u32) -> Point {
        Point::new(
            self.origin.x + (f64::from(px) + 0.5) * self.pixel,
            self.origin.y + (f64::from(py) + 0.5) * self.pixel,
        )
    }
}

/// Single-channel alpha buffer backing one subtraction.
pub struct AlphaMask {
    window: Window,
    image: GrayImage,
}

impl AlphaMask {
    /// Fill the silhouette opaquely into a fresh buffer covering `window`.
    #[must_use]
    pub fn rasterize(silhouette: &Silhouette, window: Window) -> Self {
        let mut image = GrayImage::new(window.width, window.height);
        for py in 0..window.height {
            for px in 0..window.width {
                if silhouette.contains_world(window.pixel_center(px, py)) {
                    image.put_pixel(px, py, Luma([OPAQUE]));
                }
            }
        }
        Self { window, image }
    }

    /// Remove alpha under a round-capped, round-joined brush of
    /// `brush_width` following the world polyline `points`.
    ///
    /// Returns how many previously non-transparent pixels were cleared.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn subtract_polyline(&mut self, points: &[Point], brush_width: f64) -> usize {
        let Some(reach) = Bounds::from_points(points.iter().copied()) else {
            return 0;
        };
        let radius = brush_width / 2.0;
        let reach = reach.padded(radius + 1.0);
        let o = self.window.origin;
        let p = self.window.pixel;
        let x0 = ((reach.min_x - o.x) / p).floor().max(0.0) as u32;
        let y0 = ((reach.min_y - o.y) / p).floor().max(0.0) as u32;
        let x1 = (((reach.max_x - o.x) / p).ceil().max(0.0) as u32).min(self.window.width);
        let y1 = (((reach.max_y - o.y) / p).ceil().max(0.0) as u32).min(self.window.height);

        let mut cleared = 0;
        for py in y0..y1 {
            for px in x0..x1 {
                if self.image.get_pixel(px, py)[0] == 0 {
                    continue;
                }
                if geom::distance_to_polyline(self.window.pixel_center(px, py), points) <= radius {
                    self.image.put_pixel(px, py, Luma([0]));
                    cleared += 1;
                }
            }
        }
        cleared
    }

    #[must_use]
    pub fn window(&self) -> Window {
        self.window
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.window.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.window.height
    }

    /// Alpha of pixel `(px, py)`; zero outside the buffer.
    #[must_use]
    pub fn alpha(&self, px: u32, py: u32) -> u8 {
        if px < self.window.width && py < self.window.height {
            self.image.get_pixel(px, py)[0]
        } else {
            0
        }
    }

    /// Number of pixels with non-zero alpha.
    #[must_use]
    pub fn coverage(&self) -> usize {
        self.image.pixels().filter(|p| p[0] > 0).count()
    }

    /// Write the buffer as an 8-bit grayscale PNG.
    ///
    /// # Errors
    ///
    /// Returns the encoder or I/O error if the file cannot be written.
    pub fn save_png(&self, path: &Path) -> Result<(), image::ImageError> {
        self.image.save_with_format(path, image::ImageFormat::Png)
    }
}
