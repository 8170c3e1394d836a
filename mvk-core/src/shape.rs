/// Planar shapes built from glyph outlines: contours, winding and holes
use nalgebra::{Point2, Vector2};

use crate::font::PathCommand;

pub type Contour = Vec<Point2<f32>>;

/// A filled region: one outer contour and the holes cut out of it
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub outer: Contour,
    pub holes: Vec<Contour>,
}

/// Signed area, positive for counter-clockwise contours
pub fn signed_area(contour: &[Point2<f32>]) -> f32 {
    let n = contour.len();
    let mut sum = 0.0;
    for i in 0..n {
        let p = contour[i];
        let q = contour[(i + 1) % n];
        sum += p.x * q.y - q.x * p.y;
    }
    sum * 0.5
}

/// Even-odd point in polygon test
pub fn contains(contour: &[Point2<f32>], point: &Point2<f32>) -> bool {
    let n = contour.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let a = contour[i];
        let b = contour[j];
        if (a.y > point.y) != (b.y > point.y) {
            let x = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if point.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Turn outline commands into closed polylines.
///
/// Points are mapped through `scale` and `offset`; each curve is subdivided
/// into `curve_segments` pieces. Repeated points and the closing duplicate are
/// dropped, as are contours with fewer than three points.
pub fn flatten(
    commands: &[PathCommand],
    scale: f32,
    offset: Vector2<f32>,
    curve_segments: u32,
) -> Vec<Contour> {
    let segments = curve_segments.max(1);
    let map = |p: Point2<f32>| Point2::new(p.x * scale, p.y * scale) + offset;

    let mut contours = Vec::new();
    let mut current: Contour = Vec::new();
    let mut cursor = Point2::origin();

    for command in commands {
        match *command {
            PathCommand::MoveTo(p) => {
                contours.push(std::mem::take(&mut current));
                cursor = map(p);
                current.push(cursor);
            }
            PathCommand::LineTo(p) => {
                cursor = map(p);
                current.push(cursor);
            }
            PathCommand::QuadTo { ctrl, to } => {
                let (start, ctrl, to) = (cursor, map(ctrl), map(to));
                for i in 1..=segments {
                    let t = i as f32 / segments as f32;
                    let u = 1.0 - t;
                    current.push(Point2::from(
                        start.coords * (u * u) + ctrl.coords * (2.0 * u * t) + to.coords * (t * t),
                    ));
                }
                cursor = to;
            }
            PathCommand::CubicTo { ctrl1, ctrl2, to } => {
                let (start, c1, c2, to) = (cursor, map(ctrl1), map(ctrl2), map(to));
                for i in 1..=segments {
                    let t = i as f32 / segments as f32;
                    let u = 1.0 - t;
                    current.push(Point2::from(
                        start.coords * (u * u * u)
                            + c1.coords * (3.0 * u * u * t)
                            + c2.coords * (3.0 * u * t * t)
                            + to.coords * (t * t * t),
                    ));
                }
                cursor = to;
            }
        }
    }
    contours.push(current);

    contours
        .into_iter()
        .map(dedup_closed)
        .filter(|c| c.len() >= 3 && signed_area(c).abs() > f32::EPSILON)
        .collect()
}

fn dedup_closed(mut contour: Contour) -> Contour {
    const EPS: f32 = 1e-6;
    contour.dedup_by(|a, b| (*a - *b).norm() < EPS);
    while contour.len() > 1 && (contour[0] - contour[contour.len() - 1]).norm() < EPS {
        contour.pop();
    }
    contour
}

/// Group contours into shapes.
///
/// The winding of the largest contour marks solids; contours wound the other
/// way are holes and belong to the smallest solid containing them. Holes with
/// no enclosing solid are dropped. Outer contours come back counter-clockwise,
/// holes clockwise.
pub fn build_shapes(contours: Vec<Contour>) -> Vec<Shape> {
    let Some(largest) = contours
        .iter()
        .map(|c| signed_area(c))
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
    else {
        return Vec::new();
    };
    let solid_is_ccw = largest > 0.0;

    let (solids, holes): (Vec<_>, Vec<_>) = contours
        .into_iter()
        .partition(|c| (signed_area(c) > 0.0) == solid_is_ccw);

    let mut shapes: Vec<Shape> = solids
        .into_iter()
        .map(|mut outer| {
            if signed_area(&outer) < 0.0 {
                outer.reverse();
            }
            Shape {
                outer,
                holes: Vec::new(),
            }
        })
        .collect();

    for mut hole in holes {
        let probe = hole[0];
        let owner = shapes
            .iter_mut()
            .filter(|s| contains(&s.outer, &probe))
            .min_by(|a, b| signed_area(&a.outer).total_cmp(&signed_area(&b.outer)));
        match owner {
            Some(shape) => {
                if signed_area(&hole) > 0.0 {
                    hole.reverse();
                }
                shape.holes.push(hole);
            }
            None => log::debug!("dropping hole contour outside every solid"),
        }
    }

    shapes
}
