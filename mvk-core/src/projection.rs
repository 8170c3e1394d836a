/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};

use crate::config::CameraConfig;

/// Logical size of the drawing surface, used for the aspect ratio and pointer coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// A vertex after projection: raster position, NDC depth and clip-space w
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
    pub w: f32,
}

/// Perspective camera looking at a fixed target
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Camera on the +Z axis at `config.distance`, looking at the origin
    pub fn new(config: &CameraConfig, viewport: Viewport) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, config.distance),
            target: Point3::origin(),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: config.fov_degrees.to_radians(),
            aspect: viewport.aspect(),
            near: config.near,
            far: config.far,
        }
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a world-space point into a `width` x `height` raster.
    ///
    /// Returns `None` for points behind the near plane. Points outside the
    /// raster are still returned; the rasterizer clips them.
    pub fn project_to_screen(
        view_projection: &Matrix4<f32>,
        point: &Point3<f32>,
        width: usize,
        height: usize,
    ) -> Option<ScreenPoint> {
        let clip = view_projection * point.to_homogeneous();

        // Prevent division by near-zero depth values
        if clip.w < 1e-5 {
            return None;
        }

        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let ndc_z = clip.z / clip.w;

        Some(ScreenPoint {
            x: (ndc_x + 1.0) * 0.5 * width as f32,
            y: (1.0 - ndc_y) * 0.5 * height as f32,
            depth: ndc_z,
            w: clip.w,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> Camera {
        Camera::new(&CameraConfig::default(), Viewport::new(800.0, 600.0))
    }

    #[test]
    fn test_camera_creation() {
        let camera = camera();
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        assert_relative_eq!(camera.fov, std::f32::consts::FRAC_PI_4, epsilon = 1e-6);
        assert_eq!(camera.position, Point3::new(0.0, 0.0, 60.0));
    }

    #[test]
    fn origin_projects_to_raster_center() {
        let vp = camera().view_projection();
        let p = Camera::project_to_screen(&vp, &Point3::origin(), 80, 60).unwrap();
        assert_relative_eq!(p.x, 40.0, epsilon = 1e-3);
        assert_relative_eq!(p.y, 30.0, epsilon = 1e-3);
        assert_relative_eq!(p.w, 60.0, epsilon = 1e-3);
    }

    #[test]
    fn up_is_towards_the_top_row() {
        let vp = camera().view_projection();
        let p = Camera::project_to_screen(&vp, &Point3::new(0.0, 10.0, 0.0), 80, 60).unwrap();
        assert!(p.y < 30.0);
    }

    #[test]
    fn points_behind_the_camera_are_rejected() {
        let vp = camera().view_projection();
        assert!(Camera::project_to_screen(&vp, &Point3::new(0.0, 0.0, 100.0), 80, 60).is_none());
    }

    #[test]
    fn degenerate_viewport_falls_back_to_square() {
        assert_eq!(Viewport::new(10.0, 0.0).aspect(), 1.0);
    }
}
