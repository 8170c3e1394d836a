/// Geometry primitives for 3D rendering
use nalgebra::{Point3, Vector3};
use std::f32::consts::TAU;

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, nx: f32, ny: f32, nz: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: Vector3::new(nx, ny, nz),
        }
    }

    pub fn from_parts(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// A triangle face defined by three vertices, counter-clockwise when seen from the front
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's vertices
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).normalize()
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Bounds {
    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Procedural torus lying in the XY plane, centered on the origin.
    ///
    /// `radius` is the distance from the center to the middle of the tube,
    /// `tube` the tube radius. Normals point away from the tube's center line.
    pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        let radial = radial_segments.max(2) as usize;
        let tubular = tubular_segments.max(3) as usize;

        // (tubular + 1) x (radial + 1) grid; the seam columns/rows are duplicated
        let mut grid = Vec::with_capacity((radial + 1) * (tubular + 1));
        for j in 0..=radial {
            let v = j as f32 / radial as f32 * TAU;
            for i in 0..=tubular {
                let u = i as f32 / tubular as f32 * TAU;
                let (sin_u, cos_u) = u.sin_cos();
                let (sin_v, cos_v) = v.sin_cos();

                let position = Point3::new(
                    (radius + tube * cos_v) * cos_u,
                    (radius + tube * cos_v) * sin_u,
                    tube * sin_v,
                );
                let center = Point3::new(radius * cos_u, radius * sin_u, 0.0);
                grid.push(Vertex::from_parts(position, (position - center).normalize()));
            }
        }

        let mut mesh = Self::with_capacity(2 * radial * tubular);
        let row = tubular + 1;
        for j in 1..=radial {
            for i in 1..=tubular {
                let a = grid[row * j + i - 1];
                let b = grid[row * (j - 1) + i - 1];
                let c = grid[row * (j - 1) + i];
                let d = grid[row * j + i];

                mesh.add_triangle(Triangle::new(a, b, d));
                mesh.add_triangle(Triangle::new(b, c, d));
            }
        }

        mesh
    }

    /// Bounding box of all vertices, `None` for an empty mesh
    pub fn bounds(&self) -> Option<Bounds> {
        let mut vertices = self.triangles.iter().flat_map(|t| t.vertices.iter());
        let first = vertices.next()?.position;
        let mut bounds = Bounds {
            min: first,
            max: first,
        };
        for vertex in vertices {
            bounds.min = bounds.min.inf(&vertex.position);
            bounds.max = bounds.max.sup(&vertex.position);
        }
        Some(bounds)
    }

    pub fn translate(&mut self, offset: Vector3<f32>) {
        for triangle in &mut self.triangles {
            for vertex in &mut triangle.vertices {
                vertex.position += offset;
            }
        }
    }

    /// Move the mesh so its bounding box is centered on the local origin.
    /// Returns the applied offset.
    pub fn center(&mut self) -> Vector3<f32> {
        let offset = match self.bounds() {
            Some(bounds) => -bounds.center().coords,
            None => Vector3::zeros(),
        };
        self.translate(offset);
        offset
    }

    pub fn append(&mut self, other: Mesh) {
        self.triangles.extend(other.triangles);
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}
