//! Per-pixel shading of the scene's materials.
//!
//! The physical model is a cheap stand-in for a full PBR pipeline: Lambert
//! diffuse, normalized Blinn-Phong specular and Schlick Fresnel. Transmission
//! is expressed as reduced coverage plus a tint applied to whatever is
//! already behind the surface.

use nalgebra::Vector3;
use std::f32::consts::{FRAC_1_PI, PI, TAU};

use crate::material::{BasicMaterial, Color, Material, PhysicalMaterial};
use crate::scene::Lighting;

/// Thickness at which transmitted light takes the full base color
const FULL_TINT_THICKNESS: f32 = 5.0;
/// Dispersion value that produces the strongest fringe
const MAX_DISPERSION: f32 = 5.0;
const MAX_SHININESS: f32 = 2048.0;

/// Shaded surface sample, ready to blend into the frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    /// Emitted and reflected light, already weighted by coverage
    pub radiance: Color,
    /// Coverage
    pub alpha: f32,
    /// Filter applied to the light coming from behind the surface
    pub transmittance: Color,
}

impl Fragment {
    pub fn opaque(color: Color) -> Self {
        Self {
            radiance: color,
            alpha: 1.0,
            transmittance: Color::BLACK,
        }
    }

    /// Composite this fragment over a premultiplied RGBA destination
    pub fn blend_over(&self, dst: [f32; 4]) -> [f32; 4] {
        let pass = 1.0 - self.alpha;
        [
            self.radiance.r + dst[0] * pass * self.transmittance.r,
            self.radiance.g + dst[1] * pass * self.transmittance.g,
            self.radiance.b + dst[2] * pass * self.transmittance.b,
            self.alpha + dst[3] * pass,
        ]
    }
}

/// Surface geometry at the shaded point, in world space
#[derive(Debug, Clone, Copy)]
pub struct SurfacePoint {
    /// Unit normal, facing the viewer for the side being drawn
    pub normal: Vector3<f32>,
    /// Unit vector from the surface towards the camera
    pub view: Vector3<f32>,
}

pub fn shade(material: &Material, lighting: &Lighting, surface: &SurfacePoint) -> Fragment {
    match material {
        Material::Physical(m) => shade_physical(m, lighting, surface),
        Material::Basic(m) => shade_basic(m),
    }
}

pub fn shade_basic(material: &BasicMaterial) -> Fragment {
    Fragment::opaque(material.color)
}

/// Schlick's approximation, per channel
fn schlick(f0: Color, cos_theta: f32) -> Color {
    let k = (1.0 - cos_theta.clamp(0.0, 1.0)).powi(5);
    Color::new(
        f0.r + (1.0 - f0.r) * k,
        f0.g + (1.0 - f0.g) * k,
        f0.b + (1.0 - f0.b) * k,
    )
}

/// Blinn-Phong exponent for a perceptual roughness
fn shininess(roughness: f32) -> f32 {
    let a = roughness.clamp(0.0, 1.0).powi(2);
    (2.0 / (a * a).max(1e-6) - 2.0).clamp(1.0, MAX_SHININESS)
}

/// Fully saturated color for a hue in turns
fn hue(turns: f32) -> Color {
    let h = turns.rem_euclid(1.0) * 6.0;
    let x = 1.0 - ((h % 2.0) - 1.0).abs();
    match h as u32 {
        0 => Color::new(1.0, x, 0.0),
        1 => Color::new(x, 1.0, 0.0),
        2 => Color::new(0.0, 1.0, x),
        3 => Color::new(0.0, x, 1.0),
        4 => Color::new(x, 0.0, 1.0),
        _ => Color::new(1.0, 0.0, x),
    }
}

pub fn shade_physical(material: &PhysicalMaterial, lighting: &Lighting, surface: &SurfacePoint) -> Fragment {
    let n = surface.normal;
    let v = surface.view;
    let n_dot_v = n.dot(&v).max(0.0);

    let metal = material.metalness.clamp(0.0, 1.0);
    let transmission = material.transmission.clamp(0.0, 1.0);
    let base = material.color;
    let diffuse_weight = (1.0 - metal) * (1.0 - transmission);

    let ior = material.ior.max(1.0);
    let dielectric_f0 = ((ior - 1.0) / (ior + 1.0)).powi(2);
    let specular_f0 = material
        .specular_color
        .scale(dielectric_f0 * material.specular_intensity)
        .lerp(base, metal);
    let exponent = shininess(material.roughness);
    let normalization = (exponent + 8.0) / (8.0 * PI);

    let mut radiance = lighting.ambient.mul(base).scale(diffuse_weight);
    for &(l, light) in &lighting.directional {
        let n_dot_l = n.dot(&l);
        if n_dot_l <= 0.0 {
            continue;
        }
        radiance = radiance.add(base.mul(light).scale(n_dot_l * FRAC_1_PI * diffuse_weight));

        let h = (l + v).normalize();
        let n_dot_h = n.dot(&h).max(0.0);
        let fresnel = schlick(specular_f0, v.dot(&h));
        let lobe = normalization * n_dot_h.powf(exponent) * n_dot_l;
        radiance = radiance.add(fresnel.mul(light).scale(lobe));
    }

    // Reflection wins over transmission at grazing angles
    let view_fresnel = dielectric_f0 + (1.0 - dielectric_f0) * (1.0 - n_dot_v).powi(5);
    let alpha = (material.opacity * (1.0 - transmission * (1.0 - view_fresnel))).clamp(0.0, 1.0);

    if material.dispersion > 0.0 && transmission > 0.0 {
        let strength = (material.dispersion / MAX_DISPERSION).min(1.0) * (1.0 - n_dot_v) * transmission;
        let angle = n.y.atan2(n.x) / TAU + n_dot_v;
        radiance = radiance.add(hue(angle).scale(0.5 * strength));
    }

    let tint = (material.thickness / FULL_TINT_THICKNESS).clamp(0.0, 1.0);
    let transmittance = Color::WHITE.lerp(base, tint).scale(transmission);

    Fragment {
        radiance: radiance.scale(material.opacity.clamp(0.0, 1.0)),
        alpha,
        transmittance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Side;
    use crate::params::MaterialParams;
    use approx::assert_relative_eq;

    fn facing() -> SurfacePoint {
        SurfacePoint {
            normal: Vector3::z(),
            view: Vector3::z(),
        }
    }

    fn lit() -> Lighting {
        Lighting {
            ambient: Color::WHITE,
            directional: vec![(Vector3::new(0.0, 2.0, 3.0).normalize(), Color::new(4.0, 4.0, 4.0))],
        }
    }

    fn opaque_plastic() -> PhysicalMaterial {
        let mut m = PhysicalMaterial::from_params(&MaterialParams::default(), Side::Double);
        m.transmission = 0.0;
        m.dispersion = 0.0;
        m.roughness = 0.5;
        m
    }

    #[test]
    fn basic_material_is_flat_and_opaque() {
        let fragment = shade(
            &Material::Basic(BasicMaterial {
                color: Color::new(0.2, 0.4, 0.6),
                side: Side::Front,
            }),
            &lit(),
            &facing(),
        );
        assert_eq!(fragment, Fragment::opaque(Color::new(0.2, 0.4, 0.6)));
        assert_eq!(fragment.blend_over([1.0, 1.0, 1.0, 1.0]), [0.2, 0.4, 0.6, 1.0]);
    }

    #[test]
    fn opaque_dielectric_is_fully_covering() {
        let fragment = shade_physical(&opaque_plastic(), &lit(), &facing());
        assert_relative_eq!(fragment.alpha, 1.0);
        assert_eq!(fragment.transmittance, Color::BLACK);
        assert!(fragment.radiance.luminance() > 1.0);
    }

    #[test]
    fn transmission_lowers_coverage_head_on() {
        let glass = PhysicalMaterial::from_params(&MaterialParams::default(), Side::Double);
        let fragment = shade_physical(&glass, &lit(), &facing());
        // F0 for ior 1.6 is about 0.053
        assert_relative_eq!(fragment.alpha, 0.0533, epsilon = 1e-3);
        assert_eq!(fragment.transmittance, Color::WHITE);
    }

    #[test]
    fn grazing_angles_reflect_more() {
        let glass = PhysicalMaterial::from_params(&MaterialParams::default(), Side::Double);
        let grazing = SurfacePoint {
            normal: Vector3::z(),
            view: Vector3::new(0.99, 0.0, 0.141).normalize(),
        };
        let head_on = shade_physical(&glass, &lit(), &facing());
        let edge = shade_physical(&glass, &lit(), &grazing);
        assert!(edge.alpha > head_on.alpha);
    }

    #[test]
    fn thickness_tints_transmitted_light() {
        let mut glass = PhysicalMaterial::from_params(&MaterialParams::default(), Side::Double);
        glass.color = Color::new(1.0, 0.0, 0.0);
        glass.thickness = 5.0;
        assert_eq!(shade_physical(&glass, &lit(), &facing()).transmittance, Color::new(1.0, 0.0, 0.0));
        glass.thickness = 0.0;
        assert_eq!(shade_physical(&glass, &lit(), &facing()).transmittance, Color::WHITE);
    }

    #[test]
    fn unlit_back_side_gets_only_ambient() {
        let material = opaque_plastic();
        let away = SurfacePoint {
            normal: -Vector3::z(),
            view: -Vector3::z(),
        };
        let lighting = Lighting {
            ambient: Color::new(0.1, 0.1, 0.1),
            ..lit()
        };
        let fragment = shade_physical(&material, &lighting, &away);
        assert_relative_eq!(fragment.radiance.r, 0.1, epsilon = 1e-6);
    }

    #[test]
    fn hue_wheel_primaries() {
        assert_eq!(hue(0.0), Color::new(1.0, 0.0, 0.0));
        assert_relative_eq!(hue(1.0 / 3.0).g, 1.0, epsilon = 1e-5);
        assert_relative_eq!(hue(2.0 / 3.0).b, 1.0, epsilon = 1e-5);
    }
}
