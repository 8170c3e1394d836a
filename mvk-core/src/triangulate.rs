/// Ear-clipping triangulation of shapes with holes
use nalgebra::Point2;

use crate::shape::Shape;

/// Triangulate a shape whose outer contour is counter-clockwise and holes clockwise.
///
/// Returns the merged point list and counter-clockwise index triples into it.
/// Holes are stitched into the outer contour through bridge edges, so bridge
/// endpoints appear twice in the point list.
pub fn triangulate(shape: &Shape) -> (Vec<Point2<f32>>, Vec<[usize; 3]>) {
    let mut polygon = shape.outer.clone();

    // Rightmost holes first, so later bridges can't be blocked by earlier ones
    let mut holes: Vec<&Vec<Point2<f32>>> = shape.holes.iter().filter(|h| h.len() >= 3).collect();
    holes.sort_by(|a, b| max_x(b).total_cmp(&max_x(a)));

    for (index, hole) in holes.iter().enumerate() {
        polygon = bridge_hole(&polygon, hole, &holes[index + 1..]);
    }

    let triangles = clip_ears(&polygon);
    (polygon, triangles)
}

fn max_x(contour: &[Point2<f32>]) -> f32 {
    contour.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max)
}

/// Splice `hole` into `polygon` through the closest mutually visible vertex pair
fn bridge_hole(
    polygon: &[Point2<f32>],
    hole: &[Point2<f32>],
    pending: &[&Vec<Point2<f32>>],
) -> Vec<Point2<f32>> {
    let (hole_start, _) = hole
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.x.total_cmp(&b.1.x))
        .unwrap_or((0, &hole[0]));
    let m = hole[hole_start];

    let mut candidates: Vec<usize> = (0..polygon.len()).collect();
    candidates.sort_by(|&a, &b| {
        (polygon[a] - m)
            .norm_squared()
            .total_cmp(&(polygon[b] - m).norm_squared())
    });

    let visible = |target: usize| {
        let p = polygon[target];
        !crosses_any(&m, &p, polygon) && !crosses_any(&m, &p, hole) && pending.iter().all(|h| !crosses_any(&m, &p, h))
    };
    let bridge = candidates
        .iter()
        .copied()
        .find(|&i| visible(i))
        .unwrap_or(candidates[0]);

    let mut merged = Vec::with_capacity(polygon.len() + hole.len() + 2);
    merged.extend_from_slice(&polygon[..=bridge]);
    merged.extend(hole[hole_start..].iter().chain(hole[..=hole_start].iter()));
    merged.extend_from_slice(&polygon[bridge..]);
    merged
}

/// Whether segment `a`-`b` properly crosses any edge of `contour`.
/// Edges sharing an endpoint with the segment don't count.
fn crosses_any(a: &Point2<f32>, b: &Point2<f32>, contour: &[Point2<f32>]) -> bool {
    let n = contour.len();
    (0..n).any(|i| {
        let c = contour[i];
        let d = contour[(i + 1) % n];
        if same(&c, a) || same(&c, b) || same(&d, a) || same(&d, b) {
            return false;
        }
        segments_cross(a, b, &c, &d)
    })
}

fn same(a: &Point2<f32>, b: &Point2<f32>) -> bool {
    (a - b).norm_squared() < 1e-12
}

fn cross(o: &Point2<f32>, a: &Point2<f32>, b: &Point2<f32>) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn segments_cross(a: &Point2<f32>, b: &Point2<f32>, c: &Point2<f32>, d: &Point2<f32>) -> bool {
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

fn inside_triangle(p: &Point2<f32>, a: &Point2<f32>, b: &Point2<f32>, c: &Point2<f32>) -> bool {
    cross(a, b, p) >= 0.0 && cross(b, c, p) >= 0.0 && cross(c, a, p) >= 0.0
}

/// Clip ears off a counter-clockwise, possibly weakly simple polygon
fn clip_ears(polygon: &[Point2<f32>]) -> Vec<[usize; 3]> {
    let mut remaining: Vec<usize> = (0..polygon.len()).collect();
    let mut triangles = Vec::with_capacity(polygon.len().saturating_sub(2));
    let mut misses = 0;
    let mut i = 0;

    while remaining.len() > 3 {
        let n = remaining.len();
        let (prev, curr, next) = (remaining[(i + n - 1) % n], remaining[i % n], remaining[(i + 1) % n]);

        // After a full lap without an ear the polygon is degenerate; clip anyway
        if is_ear(polygon, &remaining, prev, curr, next) || misses >= n {
            triangles.push([prev, curr, next]);
            remaining.remove(i % n);
            misses = 0;
            i %= remaining.len();
        } else {
            misses += 1;
            i = (i + 1) % n;
        }
    }

    if remaining.len() == 3 {
        triangles.push([remaining[0], remaining[1], remaining[2]]);
    }
    triangles
}

fn is_ear(polygon: &[Point2<f32>], remaining: &[usize], prev: usize, curr: usize, next: usize) -> bool {
    let (a, b, c) = (&polygon[prev], &polygon[curr], &polygon[next]);
    if cross(a, b, c) <= 0.0 {
        return false;
    }
    !remaining.iter().any(|&k| {
        let p = &polygon[k];
        k != prev
            && k != curr
            && k != next
            && !same(p, a)
            && !same(p, b)
            && !same(p, c)
            && inside_triangle(p, a, b, c)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::signed_area;
    use approx::assert_relative_eq;

    fn triangulated_area(points: &[Point2<f32>], triangles: &[[usize; 3]]) -> f32 {
        triangles
            .iter()
            .map(|t| signed_area(&[points[t[0]], points[t[1]], points[t[2]]]))
            .sum()
    }

    #[test]
    fn convex_square() {
        let shape = Shape {
            outer: vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 1.0),
            ],
            holes: vec![],
        };
        let (points, triangles) = triangulate(&shape);
        assert_eq!(triangles.len(), 2);
        assert_relative_eq!(triangulated_area(&points, &triangles), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn concave_l_shape() {
        let shape = Shape {
            outer: vec![
                Point2::new(0.0, 0.0),
                Point2::new(2.0, 0.0),
                Point2::new(2.0, 1.0),
                Point2::new(1.0, 1.0),
                Point2::new(1.0, 2.0),
                Point2::new(0.0, 2.0),
            ],
            holes: vec![],
        };
        let (points, triangles) = triangulate(&shape);
        assert_eq!(triangles.len(), 4);
        for t in &triangles {
            assert!(signed_area(&[points[t[0]], points[t[1]], points[t[2]]]) > 0.0);
        }
        assert_relative_eq!(triangulated_area(&points, &triangles), 3.0, epsilon = 1e-5);
    }

    #[test]
    fn square_with_hole() {
        let shape = Shape {
            outer: vec![
                Point2::new(0.0, 0.0),
                Point2::new(4.0, 0.0),
                Point2::new(4.0, 4.0),
                Point2::new(0.0, 4.0),
            ],
            holes: vec![vec![
                Point2::new(1.0, 1.0),
                Point2::new(1.0, 3.0),
                Point2::new(3.0, 3.0),
                Point2::new(3.0, 1.0),
            ]],
        };
        let (points, triangles) = triangulate(&shape);
        assert_eq!(points.len(), 10);
        assert_eq!(triangles.len(), 8);
        assert_relative_eq!(triangulated_area(&points, &triangles), 12.0, epsilon = 1e-4);
        // Nothing covers the hole's center
        let center = Point2::new(2.0, 2.0);
        for t in &triangles {
            let (a, b, c) = (&points[t[0]], &points[t[1]], &points[t[2]]);
            let strictly_inside = cross(a, b, &center) > 1e-6
                && cross(b, c, &center) > 1e-6
                && cross(c, a, &center) > 1e-6;
            assert!(!strictly_inside);
        }
    }
}
