//! The tunable material parameter set and its field addressing.

use std::fmt;
use std::str::FromStr;

use crate::error::PanelError;
use crate::material::{Color, PhysicalMaterial};

/// One field of [`MaterialParams`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamField {
    Color,
    Transmission,
    Opacity,
    Metalness,
    Roughness,
    Ior,
    Thickness,
    SpecularIntensity,
    SpecularColor,
    Dispersion,
}

impl ParamField {
    pub const ALL: [ParamField; 10] = [
        ParamField::Color,
        ParamField::Transmission,
        ParamField::Opacity,
        ParamField::Metalness,
        ParamField::Roughness,
        ParamField::Ior,
        ParamField::Thickness,
        ParamField::SpecularIntensity,
        ParamField::SpecularColor,
        ParamField::Dispersion,
    ];

    /// Display name, also used as the HTML control id
    pub fn name(self) -> &'static str {
        match self {
            ParamField::Color => "color",
            ParamField::Transmission => "transmission",
            ParamField::Opacity => "opacity",
            ParamField::Metalness => "metalness",
            ParamField::Roughness => "roughness",
            ParamField::Ior => "ior",
            ParamField::Thickness => "thickness",
            ParamField::SpecularIntensity => "specularIntensity",
            ParamField::SpecularColor => "specularColor",
            ParamField::Dispersion => "dispersion",
        }
    }

    pub fn is_color(self) -> bool {
        matches!(self, ParamField::Color | ParamField::SpecularColor)
    }

    /// Copy this field's current value from the store into the live material
    pub fn apply(self, params: &MaterialParams, material: &mut PhysicalMaterial) {
        match self {
            ParamField::Color => material.color = params.color,
            ParamField::Transmission => material.transmission = params.transmission,
            ParamField::Opacity => material.opacity = params.opacity,
            ParamField::Metalness => material.metalness = params.metalness,
            ParamField::Roughness => material.roughness = params.roughness,
            ParamField::Ior => material.ior = params.ior,
            ParamField::Thickness => material.thickness = params.thickness,
            ParamField::SpecularIntensity => {
                material.specular_intensity = params.specular_intensity
            }
            ParamField::SpecularColor => material.specular_color = params.specular_color,
            ParamField::Dispersion => material.dispersion = params.dispersion,
        }
    }
}

impl fmt::Display for ParamField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParamField {
    type Err = PanelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| PanelError::UnknownName(s.to_string()))
    }
}

/// A value held by a parameter field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Number(f32),
    Color(Color),
}

impl ParamValue {
    pub fn as_number(self) -> Option<f32> {
        match self {
            ParamValue::Number(n) => Some(n),
            ParamValue::Color(_) => None,
        }
    }

    pub fn as_color(self) -> Option<Color> {
        match self {
            ParamValue::Color(c) => Some(c),
            ParamValue::Number(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(n) => write!(f, "{n:.2}"),
            ParamValue::Color(c) => f.write_str(&c.to_css_hex()),
        }
    }
}

/// Mutable record of the glass material's tunable parameters
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialParams {
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
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            color: Color::from_hex(0xffffff),
            transmission: 1.3,
            opacity: 1.0,
            metalness: 0.0,
            roughness: 0.0,
            ior: 1.6,
            thickness: 5.0,
            specular_intensity: 1.0,
            specular_color: Color::from_hex(0xffffff),
            dispersion: 5.0,
        }
    }
}

impl MaterialParams {
    pub fn get(&self, field: ParamField) -> ParamValue {
        match field {
            ParamField::Color => ParamValue::Color(self.color),
            ParamField::SpecularColor => ParamValue::Color(self.specular_color),
            ParamField::Transmission => ParamValue::Number(self.transmission),
            ParamField::Opacity => ParamValue::Number(self.opacity),
            ParamField::Metalness => ParamValue::Number(self.metalness),
            ParamField::Roughness => ParamValue::Number(self.roughness),
            ParamField::Ior => ParamValue::Number(self.ior),
            ParamField::Thickness => ParamValue::Number(self.thickness),
            ParamField::SpecularIntensity => ParamValue::Number(self.specular_intensity),
            ParamField::Dispersion => ParamValue::Number(self.dispersion),
        }
    }

    /// Write a field; the value kind must match the field
    pub fn set(&mut self, field: ParamField, value: ParamValue) -> Result<(), PanelError> {
        match (field, value) {
            (ParamField::Color, ParamValue::Color(c)) => self.color = c,
            (ParamField::SpecularColor, ParamValue::Color(c)) => self.specular_color = c,
            (ParamField::Transmission, ParamValue::Number(n)) => self.transmission = n,
            (ParamField::Opacity, ParamValue::Number(n)) => self.opacity = n,
            (ParamField::Metalness, ParamValue::Number(n)) => self.metalness = n,
            (ParamField::Roughness, ParamValue::Number(n)) => self.roughness = n,
            (ParamField::Ior, ParamValue::Number(n)) => self.ior = n,
            (ParamField::Thickness, ParamValue::Number(n)) => self.thickness = n,
            (ParamField::SpecularIntensity, ParamValue::Number(n)) => self.specular_intensity = n,
            (ParamField::Dispersion, ParamValue::Number(n)) => self.dispersion = n,
            (field, _) => {
                return Err(PanelError::KindMismatch {
                    field,
                    expected: if field.is_color() { "color" } else { "numeric" },
                })
            }
        }
        Ok(())
    }
}
