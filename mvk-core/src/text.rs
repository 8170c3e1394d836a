/// Extruded 3D text geometry from typeface fonts
use nalgebra::{Point2, Point3, Vector2, Vector3};

use crate::font::Font;
use crate::geometry::{Mesh, Triangle, Vertex};
use crate::shape::{build_shapes, flatten, Shape};
use crate::triangulate::triangulate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextOptions {
    /// Em size in scene units
    pub size: f32,
    /// Extrusion along +Z
    pub depth: f32,
    /// Subdivisions per curve segment
    pub curve_segments: u32,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            size: 100.0,
            depth: 50.0,
            curve_segments: 12,
        }
    }
}

/// Lay out `text` and return the filled shapes of every glyph.
///
/// Baseline starts at the origin; `\n` starts a new line below. Characters
/// missing from the font are skipped.
pub fn layout_shapes(font: &Font, text: &str, size: f32, curve_segments: u32) -> Vec<Shape> {
    let scale = font.scale(size);
    let line_height = font.line_height(size);
    let mut offset = Vector2::new(0.0, 0.0);
    let mut shapes = Vec::new();

    for c in text.chars() {
        if c == '\n' {
            offset.x = 0.0;
            offset.y -= line_height;
            continue;
        }
        let Some(glyph) = font.glyph(c) else {
            log::warn!("character {c:?} does not exist in font {:?}", font.family);
            continue;
        };
        let contours = flatten(&glyph.outline, scale, offset, curve_segments);
        shapes.extend(build_shapes(contours));
        offset.x += glyph.advance * scale;
    }

    shapes
}

/// Build extruded text: front cap at `z = depth`, back cap at `z = 0`, and side walls
pub fn text_mesh(font: &Font, text: &str, options: &TextOptions) -> Mesh {
    let shapes = layout_shapes(font, text, options.size, options.curve_segments);
    let mut mesh = Mesh::new();
    for shape in &shapes {
        mesh.append(extrude(shape, options.depth));
    }
    mesh
}

/// Extrude one shape along +Z
pub fn extrude(shape: &Shape, depth: f32) -> Mesh {
    let (points, triangles) = triangulate(shape);
    let mut mesh = Mesh::with_capacity(triangles.len() * 2);

    let at = |p: Point2<f32>, z: f32, normal: Vector3<f32>| {
        Vertex::from_parts(Point3::new(p.x, p.y, z), normal)
    };
    let front = Vector3::z();
    let back = -Vector3::z();

    for &[a, b, c] in &triangles {
        mesh.add_triangle(Triangle::new(
            at(points[a], depth, front),
            at(points[b], depth, front),
            at(points[c], depth, front),
        ));
        mesh.add_triangle(Triangle::new(
            at(points[a], 0.0, back),
            at(points[c], 0.0, back),
            at(points[b], 0.0, back),
        ));
    }

    // Outer contour is counter-clockwise and holes clockwise, so the
    // right-hand normal of every edge faces away from the solid.
    for contour in std::iter::once(&shape.outer).chain(shape.holes.iter()) {
        let n = contour.len();
        for i in 0..n {
            let p = contour[i];
            let q = contour[(i + 1) % n];
            let edge = q - p;
            if edge.norm() < f32::EPSILON {
                continue;
            }
            let normal = Vector3::new(edge.y, -edge.x, 0.0).normalize();
            let (p0, q0) = (at(p, 0.0, normal), at(q, 0.0, normal));
            let (p1, q1) = (at(p, depth, normal), at(q, depth, normal));
            mesh.add_triangle(Triangle::new(p0, q0, q1));
            mesh.add_triangle(Triangle::new(p0, q1, p1));
        }
    }

    mesh
}
