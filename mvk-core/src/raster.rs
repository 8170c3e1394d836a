//! Software rasterizer: draws a [`Scene`] into an RGBA frame.

use nalgebra::{Matrix4, Point3, Vector3};

use crate::geometry::Triangle;
use crate::material::{Material, Side};
use crate::projection::{Camera, ScreenPoint};
use crate::scene::{Lighting, MeshDraw, Scene};
use crate::shading::{shade, SurfacePoint};

/// Capability that shows a finished frame on some surface
pub trait Present {
    type Error: std::error::Error + Send + Sync + 'static;

    fn present(&mut self, frame: &Frame) -> Result<(), Self::Error>;
}

/// Linear RGBA pixels with premultiplied alpha, row-major, top row first
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    pixels: Vec<[f32; 4]>,
}

impl Frame {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0.0; 4]; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> [f32; 4] {
        self.pixels[y * self.width + x]
    }

    /// Straight (non-premultiplied) color and alpha of a pixel
    pub fn straight(&self, x: usize, y: usize) -> ([f32; 3], f32) {
        let [r, g, b, a] = self.pixel(x, y);
        if a <= f32::EPSILON {
            return ([0.0; 3], 0.0);
        }
        ([r / a, g / a, b / a], a)
    }

    fn fill(&mut self, value: [f32; 4]) {
        self.pixels.fill(value);
    }

    /// 8-bit sRGB RGBA bytes, straight alpha, as canvas `ImageData` expects
    pub fn to_rgba8(&self) -> Vec<u8> {
        let encode = |c: f32| (c.clamp(0.0, 1.0).powf(1.0 / 2.2) * 255.0).round() as u8;
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for y in 0..self.height {
            for x in 0..self.width {
                let ([r, g, b], a) = self.straight(x, y);
                bytes.extend_from_slice(&[
                    encode(r),
                    encode(g),
                    encode(b),
                    (a.clamp(0.0, 1.0) * 255.0).round() as u8,
                ]);
            }
        }
        bytes
    }
}

/// A vertex after the model transform and projection
#[derive(Debug, Clone, Copy)]
struct Projected {
    screen: ScreenPoint,
    world: Point3<f32>,
    normal: Vector3<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Facing {
    Front,
    Back,
}

pub struct Rasterizer {
    frame: Frame,
    depth: Vec<f32>,
    clear_color: [f32; 4],
}

impl Rasterizer {
    /// Rasterizer with a transparent black clear color
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            frame: Frame::new(width, height),
            depth: vec![f32::INFINITY; width * height],
            clear_color: [0.0; 4],
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn width(&self) -> usize {
        self.frame.width
    }

    pub fn height(&self) -> usize {
        self.frame.height
    }

    /// Draw every mesh of `scene` as seen by `camera`.
    ///
    /// Opaque meshes are drawn first. Transmissive meshes are then blended
    /// over them; double-sided ones draw their back faces before their fronts.
    pub fn render(&mut self, scene: &Scene, camera: &Camera) -> &Frame {
        self.frame.fill(self.clear_color);
        self.depth.fill(f32::INFINITY);

        let view_projection = camera.view_projection();
        let lighting = scene.lighting();
        let draws = scene.mesh_draws();

        for draw in draws.iter().filter(|d| !d.material.is_transmissive()) {
            self.draw_mesh(draw, &view_projection, camera, &lighting, None);
        }
        for draw in draws.iter().filter(|d| d.material.is_transmissive()) {
            if draw.material.side() == Side::Double {
                self.draw_mesh(draw, &view_projection, camera, &lighting, Some(Facing::Back));
                self.draw_mesh(draw, &view_projection, camera, &lighting, Some(Facing::Front));
            } else {
                self.draw_mesh(draw, &view_projection, camera, &lighting, None);
            }
        }

        &self.frame
    }

    fn draw_mesh(
        &mut self,
        draw: &MeshDraw<'_>,
        view_projection: &Matrix4<f32>,
        camera: &Camera,
        lighting: &Lighting,
        only: Option<Facing>,
    ) {
        for triangle in &draw.mesh.triangles {
            let Some(projected) = self.project(triangle, &draw.world, view_projection) else {
                continue;
            };
            self.fill_triangle(&projected, draw.material, camera, lighting, only);
        }
    }

    fn project(
        &self,
        triangle: &Triangle,
        world: &Matrix4<f32>,
        view_projection: &Matrix4<f32>,
    ) -> Option<[Projected; 3]> {
        let mut out = [None; 3];
        for (slot, vertex) in out.iter_mut().zip(&triangle.vertices) {
            let world_position = world.transform_point(&vertex.position);
            let screen = Camera::project_to_screen(
                view_projection,
                &world_position,
                self.width(),
                self.height(),
            )?;
            if !(-1.0..=1.0).contains(&screen.depth) {
                return None;
            }
            *slot = Some(Projected {
                screen,
                world: world_position,
                normal: world.transform_vector(&vertex.normal),
            });
        }
        Some([out[0]?, out[1]?, out[2]?])
    }

    fn fill_triangle(
        &mut self,
        [a, b, c]: &[Projected; 3],
        material: &Material,
        camera: &Camera,
        lighting: &Lighting,
        only: Option<Facing>,
    ) {
        let edge = |p: &ScreenPoint, q: &ScreenPoint, x: f32, y: f32| {
            (q.x - p.x) * (y - p.y) - (q.y - p.y) * (x - p.x)
        };
        let area = edge(&a.screen, &b.screen, c.screen.x, c.screen.y);
        if area.abs() < f32::EPSILON {
            return;
        }

        // Raster y points down, so counter-clockwise faces have negative area here
        let facing = if area < 0.0 { Facing::Front } else { Facing::Back };
        let drawn = match material.side() {
            Side::Front => facing == Facing::Front,
            Side::Back => facing == Facing::Back,
            Side::Double => true,
        };
        if !drawn || only.is_some_and(|f| f != facing) {
            return;
        }

        let width = self.width();
        let height = self.height();
        let min_x = a.screen.x.min(b.screen.x).min(c.screen.x).floor().max(0.0) as usize;
        let min_y = a.screen.y.min(b.screen.y).min(c.screen.y).floor().max(0.0) as usize;
        let max_x = (a.screen.x.max(b.screen.x).max(c.screen.x).ceil().max(0.0) as usize).min(width);
        let max_y = (a.screen.y.max(b.screen.y).max(c.screen.y).ceil().max(0.0) as usize).min(height);

        for y in min_y..max_y {
            for x in min_x..max_x {
                let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(&b.screen, &c.screen, px, py) / area;
                let w1 = edge(&c.screen, &a.screen, px, py) / area;
                let w2 = edge(&a.screen, &b.screen, px, py) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let index = y * width + x;
                let depth = w0 * a.screen.depth + w1 * b.screen.depth + w2 * c.screen.depth;
                if depth >= self.depth[index] {
                    continue;
                }

                // Perspective-correct weights for world-space attributes
                let (p0, p1, p2) = (w0 / a.screen.w, w1 / b.screen.w, w2 / c.screen.w);
                let sum = p0 + p1 + p2;
                let (p0, p1, p2) = (p0 / sum, p1 / sum, p2 / sum);
                let world = Point3::from(a.world.coords * p0 + b.world.coords * p1 + c.world.coords * p2);
                let mut normal = (a.normal * p0 + b.normal * p1 + c.normal * p2)
                    .try_normalize(f32::EPSILON)
                    .unwrap_or_else(Vector3::z);
                if facing == Facing::Back {
                    normal = -normal;
                }
                let view = (camera.position - world)
                    .try_normalize(f32::EPSILON)
                    .unwrap_or_else(Vector3::z);

                let fragment = shade(material, lighting, &SurfacePoint { normal, view });
                self.frame.pixels[index] = fragment.blend_over(self.frame.pixels[index]);
                self.depth[index] = depth;
            }
        }
    }
}
