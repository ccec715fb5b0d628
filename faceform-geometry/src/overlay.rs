//! Annotated visualizations of the symmetry and shape analyses.
//!
//! Line thickness and marker size follow the image resolution so overlays
//! read the same on a 300px thumbnail and a 4000px photo:
//!
//! ```text
//! base           = max(min(w, h) / 250, 1)
//! axis thickness = max(2 * base, 3)
//! line thickness = max(base, 2)
//! marker radius  = max(min(w, h) / 100, 3)
//! ```

use crate::error::Result;
use crate::landmarks::{FivePointSet, LandmarkSet, Point};
use crate::shape::{MeasurementPoints, Span};
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use log::debug;
use serde::{Deserialize, Serialize};

/// Colors are RGB triples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    pub landmark_color: [u8; 3],
    pub axis_color: [u8; 3],
    pub level_color: [u8; 3],
    pub mirror_color: [u8; 3],
    pub offset_color: [u8; 3],
    pub marker_color: [u8; 3],
    pub height_color: [u8; 3],
    pub cheekbone_color: [u8; 3],
    pub forehead_color: [u8; 3],
    pub jaw_color: [u8; 3],
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            landmark_color: [255, 0, 0],
            axis_color: [255, 255, 0],
            level_color: [0, 255, 0],
            mirror_color: [255, 0, 255],
            offset_color: [0, 255, 255],
            marker_color: [0, 0, 255],
            height_color: [0, 255, 255],
            cheekbone_color: [255, 0, 255],
            forehead_color: [255, 255, 0],
            jaw_color: [0, 255, 0],
        }
    }
}

impl RenderStyle {
    pub fn span_color(&self, span: Span) -> Rgb<u8> {
        Rgb(match span {
            Span::Height => self.height_color,
            Span::Cheekbone => self.cheekbone_color,
            Span::Forehead => self.forehead_color,
            Span::Jaw => self.jaw_color,
        })
    }
}

/// Resolution-dependent stroke sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scale {
    pub axis_thickness: u32,
    pub line_thickness: u32,
    pub marker_radius: i32,
    pub landmark_radius: i32,
}

impl Scale {
    pub fn for_dimensions(width: u32, height: u32) -> Self {
        let min_dim = width.min(height);
        let base = (min_dim / 250).max(1);
        let marker_radius = ((min_dim / 100) as i32).max(3);
        Self {
            axis_thickness: (base * 2).max(3),
            line_thickness: base.max(2),
            marker_radius,
            landmark_radius: (marker_radius / 2).max(2),
        }
    }
}

/// What to draw on top of the landmark markers.
#[derive(Debug, Clone, Copy)]
pub enum Overlay<'a> {
    Symmetry(&'a FivePointSet),
    Shape(&'a MeasurementPoints),
}

/// Render onto a copy of `image`; the source buffer is left untouched.
pub fn render_overlay(
    image: &RgbImage,
    landmarks: &LandmarkSet,
    overlay: Overlay<'_>,
    style: &RenderStyle,
) -> RgbImage {
    let mut canvas = image.clone();
    render_overlay_in_place(&mut canvas, landmarks, overlay, style);
    canvas
}

/// Render directly into `image`.
pub fn render_overlay_in_place(
    image: &mut RgbImage,
    landmarks: &LandmarkSet,
    overlay: Overlay<'_>,
    style: &RenderStyle,
) {
    let scale = Scale::for_dimensions(image.width(), image.height());
    debug!(
        "rendering {}x{} overlay with {:?}",
        image.width(),
        image.height(),
        scale
    );

    draw_landmarks(image, landmarks, scale, style);
    match overlay {
        Overlay::Symmetry(five) => draw_symmetry(image, five, scale, style),
        Overlay::Shape(points) => draw_shape(image, points, scale, style),
    }
}

/// Draw only the landmark markers, for analyses that produced no geometry.
pub fn render_landmarks(image: &RgbImage, landmarks: &LandmarkSet, style: &RenderStyle) -> RgbImage {
    let mut canvas = image.clone();
    let scale = Scale::for_dimensions(canvas.width(), canvas.height());
    draw_landmarks(&mut canvas, landmarks, scale, style);
    canvas
}

fn draw_landmarks(image: &mut RgbImage, landmarks: &LandmarkSet, scale: Scale, style: &RenderStyle) {
    let color = Rgb(style.landmark_color);
    for p in landmarks.iter() {
        draw_marker(image, *p, scale.landmark_radius, color);
    }
}

/// Axis, eye and mouth level lines, then per eye and mouth point:
/// - a horizontal segment from the point to the x where its counterpart
///   would sit if mirrored about the axis, kept at the point's own height;
/// - a vertical segment from the point to the counterpart's height.
fn draw_symmetry(image: &mut RgbImage, five: &FivePointSet, scale: Scale, style: &RenderStyle) {
    let center_x = five.center_x();
    let bottom = image.height().saturating_sub(1) as f32;
    draw_thick_line(
        image,
        Point::new(center_x, 0.0),
        Point::new(center_x, bottom),
        scale.axis_thickness,
        Rgb(style.axis_color),
    );

    let level_color = Rgb(style.level_color);
    for (left, right) in [
        (five.left_eye(), five.right_eye()),
        (five.left_mouth(), five.right_mouth()),
    ] {
        let y = left.midpoint(&right).y;
        draw_thick_line(
            image,
            Point::new(left.x, y),
            Point::new(right.x, y),
            scale.line_thickness,
            level_color,
        );
    }

    let pairs = [
        (five.left_eye(), five.right_eye()),
        (five.right_eye(), five.left_eye()),
        (five.left_mouth(), five.right_mouth()),
        (five.right_mouth(), five.left_mouth()),
    ];
    for (point, counterpart) in pairs {
        let mirrored_x = 2.0 * center_x - counterpart.x;
        draw_thick_line(
            image,
            point,
            Point::new(mirrored_x, point.y),
            scale.line_thickness,
            Rgb(style.mirror_color),
        );
        draw_thick_line(
            image,
            point,
            Point::new(point.x, counterpart.y),
            scale.line_thickness,
            Rgb(style.offset_color),
        );
    }

    let marker_color = Rgb(style.marker_color);
    for (point, _) in pairs {
        draw_marker(image, point, scale.marker_radius, marker_color);
    }
}

fn draw_shape(image: &mut RgbImage, points: &MeasurementPoints, scale: Scale, style: &RenderStyle) {
    for span in Span::ALL {
        let Some(pair) = points.get(&span) else {
            debug!("no {:?} span to draw", span);
            continue;
        };
        let color = style.span_color(span);
        draw_thick_line(image, pair.start, pair.end, scale.line_thickness, color);
        draw_marker(image, pair.start, scale.marker_radius, color);
        draw_marker(image, pair.end, scale.marker_radius, color);
    }
}

/// Filled circle, skipped when it cannot touch the image.
fn draw_marker(image: &mut RgbImage, center: Point, radius: i32, color: Rgb<u8>) {
    let (x, y) = center.to_pixel();
    let (w, h) = (image.width() as i32, image.height() as i32);
    if x < -radius || y < -radius || x > w + radius || y > h + radius {
        return;
    }
    draw_filled_circle_mut(image, (x, y), radius, color);
}

/// Liang-Barsky clip of a segment to `[min, max]` on both axes, in f64 so
/// far-off endpoints keep sub-pixel accuracy once clipped.
fn clip_segment(start: Point, end: Point, min: f64, max: (f64, f64)) -> Option<(Point, Point)> {
    let (x0, y0) = (start.x as f64, start.y as f64);
    let (dx, dy) = (end.x as f64 - x0, end.y as f64 - y0);
    if !(x0.is_finite() && y0.is_finite() && dx.is_finite() && dy.is_finite()) {
        return None;
    }

    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for (p, q) in [(-dx, x0 - min), (dx, max.0 - x0), (-dy, y0 - min), (dy, max.1 - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| Point::new((x0 + t * dx) as f32, (y0 + t * dy) as f32);
    Some((at(t0), at(t1)))
}

/// Parallel 1px segments offset across the minor axis of the line.
/// The segment is first clipped to the image plus a `thickness` margin;
/// segments shorter than half a pixel are skipped.
fn draw_thick_line(image: &mut RgbImage, start: Point, end: Point, thickness: u32, color: Rgb<u8>) {
    if start.distance(&end) < 0.5 {
        return;
    }
    let horizontal = (end.x - start.x).abs() >= (end.y - start.y).abs();
    let pad = thickness as f64;
    let max = (image.width() as f64 - 1.0 + pad, image.height() as f64 - 1.0 + pad);
    let Some((start, end)) = clip_segment(start, end, -pad, max) else {
        return;
    };
    let first = -((thickness as i32 - 1) / 2);
    for k in first..first + thickness as i32 {
        let k = k as f32;
        let (s, e) = if horizontal {
            ((start.x, start.y + k), (end.x, end.y + k))
        } else {
            ((start.x + k, start.y), (end.x + k, end.y))
        };
        draw_line_segment_mut(image, s, e, color);
    }
}

/// Serialize an annotated image. Failure is fatal for the request.
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality).encode_image(image)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::MeasurementPair;
    use rstest::rstest;

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    fn five() -> FivePointSet {
        FivePointSet::new([
            Point::new(70.0, 80.0),
            Point::new(130.0, 84.0),
            Point::new(100.0, 110.0),
            Point::new(75.0, 150.0),
            Point::new(125.0, 150.0),
        ])
    }

    fn spans() -> MeasurementPoints {
        let mut points = MeasurementPoints::new();
        points.insert(
            Span::Height,
            MeasurementPair::new(Point::new(20.0, 10.0), Point::new(20.0, 190.0)),
        );
        points.insert(
            Span::Cheekbone,
            MeasurementPair::new(Point::new(40.0, 60.0), Point::new(180.0, 60.0)),
        );
        points.insert(
            Span::Forehead,
            MeasurementPair::new(Point::new(40.0, 100.0), Point::new(180.0, 100.0)),
        );
        points.insert(
            Span::Jaw,
            MeasurementPair::new(Point::new(40.0, 140.0), Point::new(180.0, 140.0)),
        );
        points
    }

    #[rstest]
    #[case(100, 100, 3, 2, 3, 2)]
    #[case(640, 480, 3, 2, 4, 2)]
    #[case(1000, 800, 6, 3, 8, 4)]
    #[case(4000, 3000, 24, 12, 30, 15)]
    fn scale_follows_resolution(
        #[case] w: u32,
        #[case] h: u32,
        #[case] axis: u32,
        #[case] line: u32,
        #[case] marker: i32,
        #[case] landmark: i32,
    ) {
        let scale = Scale::for_dimensions(w, h);
        assert_eq!(scale.axis_thickness, axis);
        assert_eq!(scale.line_thickness, line);
        assert_eq!(scale.marker_radius, marker);
        assert_eq!(scale.landmark_radius, landmark);
    }

    #[test]
    fn symmetry_overlay_draws_axis_on_a_copy() {
        let source = RgbImage::new(200, 200);
        let style = RenderStyle::default();
        let out = render_overlay(&source, &LandmarkSet::default(), Overlay::Symmetry(&five()), &style);

        assert_eq!(out.dimensions(), source.dimensions());
        assert!(source.pixels().all(|p| *p == BLACK));
        assert_eq!(*out.get_pixel(100, 0), Rgb(style.axis_color));
        assert_eq!(*out.get_pixel(100, 199), Rgb(style.axis_color));
        // marker over the left eye
        assert_eq!(*out.get_pixel(70, 80), Rgb(style.marker_color));
    }

    #[test]
    fn landmarks_are_drawn_under_overlays() {
        let mut image = RgbImage::new(200, 200);
        let style = RenderStyle::default();
        let landmarks: LandmarkSet = vec![Point::new(10.0, 190.0), Point::new(100.0, 5.0)].into();
        render_overlay_in_place(&mut image, &landmarks, Overlay::Symmetry(&five()), &style);

        assert_eq!(*image.get_pixel(10, 190), Rgb(style.landmark_color));
        // covered by the symmetry axis
        assert_eq!(*image.get_pixel(100, 5), Rgb(style.axis_color));
    }

    #[test]
    fn shape_overlay_draws_every_span() {
        let style = RenderStyle::default();
        let out = render_overlay(
            &RgbImage::new(200, 200),
            &LandmarkSet::default(),
            Overlay::Shape(&spans()),
            &style,
        );
        assert_eq!(out.dimensions(), (200, 200));
        assert_eq!(*out.get_pixel(20, 120), style.span_color(Span::Height));
        assert_eq!(*out.get_pixel(110, 60), style.span_color(Span::Cheekbone));
        assert_eq!(*out.get_pixel(110, 100), style.span_color(Span::Forehead));
        assert_eq!(*out.get_pixel(110, 140), style.span_color(Span::Jaw));
    }

    #[test]
    fn shape_overlay_skips_missing_span() {
        let style = RenderStyle::default();
        let mut points = spans();
        points.remove(&Span::Jaw);

        let out = render_overlay(
            &RgbImage::new(200, 200),
            &LandmarkSet::default(),
            Overlay::Shape(&points),
            &style,
        );
        assert_eq!(*out.get_pixel(110, 140), BLACK);
        assert_eq!(*out.get_pixel(40, 140), BLACK);
        assert_eq!(*out.get_pixel(180, 140), BLACK);
        assert_eq!(*out.get_pixel(110, 60), style.span_color(Span::Cheekbone));
        assert_eq!(*out.get_pixel(20, 120), style.span_color(Span::Height));
    }

    #[test]
    fn offscreen_geometry_is_clipped() {
        let style = RenderStyle::default();
        let far = FivePointSet::new([Point::new(-500.0, -500.0); 5]);
        let out = render_overlay(&RgbImage::new(50, 40), &LandmarkSet::default(), Overlay::Symmetry(&far), &style);
        assert_eq!(out.dimensions(), (50, 40));
    }

    #[test]
    fn symmetry_overlay_draws_levels_and_deviations() {
        // eyes at different heights, mouth corners off-center
        let five = FivePointSet::new([
            Point::new(60.0, 80.0),
            Point::new(130.0, 90.0),
            Point::new(95.0, 120.0),
            Point::new(70.0, 150.0),
            Point::new(125.0, 156.0),
        ]);
        let style = RenderStyle::default();
        let out = render_overlay(&RgbImage::new(200, 200), &LandmarkSet::default(), Overlay::Symmetry(&five), &style);

        // eye level at y=85, mouth level at y=153
        assert_eq!(*out.get_pixel(110, 85), Rgb(style.level_color));
        assert_eq!(*out.get_pixel(110, 153), Rgb(style.level_color));
        // left mouth corner towards the mirrored right corner at x=65
        assert_eq!(*out.get_pixel(66, 150), Rgb(style.mirror_color));
        // left eye down to the right eye's height
        assert_eq!(*out.get_pixel(60, 88), Rgb(style.offset_color));
    }

    #[test]
    fn far_away_geometry_does_not_overflow() {
        let style = RenderStyle::default();
        let landmarks: LandmarkSet = vec![Point::new(3.0e9, 10.0), Point::new(-3.0e9, -3.0e9)].into();
        let five = FivePointSet::new([
            Point::new(-4.0e7, 80.0),
            Point::new(130.0, 84.0),
            Point::new(100.0, 110.0),
            Point::new(75.0, 150.0),
            Point::new(125.0, 150.0),
        ]);
        let out = render_overlay(&RgbImage::new(200, 200), &landmarks, Overlay::Symmetry(&five), &style);

        assert_eq!(out.dimensions(), (200, 200));
        // the eye level line still crosses the visible part of the image
        assert_eq!(*out.get_pixel(0, 82), Rgb(style.level_color));
        assert_eq!(*out.get_pixel(110, 82), Rgb(style.level_color));
        assert_eq!(*out.get_pixel(199, 10), BLACK);
    }

    #[test]
    fn clipping_keeps_inside_segments() {
        let (s, e) = clip_segment(Point::new(-1.0e7, 5.0), Point::new(50.0, 5.0), -2.0, (101.0, 101.0))
            .unwrap();
        assert_eq!(s, Point::new(-2.0, 5.0));
        assert_eq!(e, Point::new(50.0, 5.0));
        assert!(clip_segment(Point::new(-50.0, -50.0), Point::new(-10.0, -60.0), -2.0, (101.0, 101.0)).is_none());
    }

    #[test]
    fn jpeg_roundtrip_keeps_dimensions() {
        let image = RgbImage::from_pixel(64, 48, Rgb([120, 80, 40]));
        let bytes = encode_jpeg(&image, 90).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }
}
