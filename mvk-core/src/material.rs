/// Surface materials: the physically-based glass and the unlit basic material
use crate::params::MaterialParams;

/// Linear RGB color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// From a packed `0xRRGGBB` value
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn to_hex(self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// Parse `#rrggbb`, as produced by HTML color inputs
    pub fn from_css_hex(css: &str) -> Option<Self> {
        let digits = css.strip_prefix('#')?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self::from_hex)
    }

    pub fn to_css_hex(self) -> String {
        format!("#{:06x}", self.to_hex())
    }

    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor)
    }

    pub fn mul(self, other: Color) -> Self {
        Self::new(self.r * other.r, self.g * other.g, self.b * other.b)
    }

    pub fn add(self, other: Color) -> Self {
        Self::new(self.r + other.r, self.g + other.g, self.b + other.b)
    }

    pub fn lerp(self, other: Color, t: f32) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    /// Rec. 709 relative luminance
    pub fn luminance(self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }
}

/// Which faces of a mesh are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Front,
    Back,
    Double,
}

/// Physically-based material; fields mirror the tunable parameter set
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalMaterial {
    pub color: Color,
    pub transmission: f32,
    pub opacity: f32,
    pub metalness: f32,
    pub roughness: f32,
    pub ior: f32,
    pub thickness: f32,
    pub specular_intensity: f32,
    pub specular_color: Color,
    pub dispersion: f32,
    pub side: Side,
}

impl PhysicalMaterial {
    pub fn from_params(params: &MaterialParams, side: Side) -> Self {
        Self {
            color: params.color,
            transmission: params.transmission,
            opacity: params.opacity,
            metalness: params.metalness,
            roughness: params.roughness,
            ior: params.ior,
            thickness: params.thickness,
            specular_intensity: params.specular_intensity,
            specular_color: params.specular_color,
            dispersion: params.dispersion,
            side,
        }
    }
}

/// Unlit flat-colored material
#[derive(Debug, Clone, PartialEq)]
pub struct BasicMaterial {
    pub color: Color,
    pub side: Side,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Physical(PhysicalMaterial),
    Basic(BasicMaterial),
}

impl Material {
    pub fn side(&self) -> Side {
        match self {
            Material::Physical(m) => m.side,
            Material::Basic(m) => m.side,
        }
    }

    /// Whether the material lets light through and must be blended over the opaque pass
    pub fn is_transmissive(&self) -> bool {
        match self {
            Material::Physical(m) => m.transmission > 0.0 || m.opacity < 1.0,
            Material::Basic(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip_of_named_colors() {
        assert_eq!(Color::from_hex(0xffffff), Color::WHITE);
        assert_eq!(Color::from_hex(0x000000), Color::BLACK);
        assert_eq!(Color::from_hex(0x3366cc).to_hex(), 0x3366cc);
    }

    #[test]
    fn css_hex_parsing() {
        assert_eq!(Color::from_css_hex("#ff0000"), Some(Color::new(1.0, 0.0, 0.0)));
        assert_eq!(Color::from_css_hex("ff0000"), None);
        assert_eq!(Color::from_css_hex("#ff00"), None);
        assert_eq!(Color::from_css_hex("#gg0000"), None);
        assert_eq!(Color::from_css_hex("#+12345"), None);
        assert_eq!(Color::new(0.0, 1.0, 0.0).to_css_hex(), "#00ff00");
    }

    #[test]
    fn glass_defaults_are_transmissive_and_double_sided() {
        let glass = Material::Physical(PhysicalMaterial::from_params(
            &MaterialParams::default(),
            Side::Double,
        ));
        assert!(glass.is_transmissive());
        assert_eq!(glass.side(), Side::Double);

        let label = Material::Basic(BasicMaterial {
            color: Color::WHITE,
            side: Side::Front,
        });
        assert!(!label.is_transmissive());
    }
}
