//! Live-tweak panel bound to the material parameter store.
//!
//! Controls are declared once in [`MATERIAL_CONTROLS`] and registered by a
//! single routine; front-ends render them however suits their surface.

use crate::error::PanelError;
use crate::material::Color;
use crate::params::{MaterialParams, ParamField, ParamValue};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlKind {
    Number { min: f32, max: f32, step: f32 },
    Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSpec {
    pub field: ParamField,
    pub kind: ControlKind,
}

const fn number(field: ParamField, min: f32, max: f32, step: f32) -> ControlSpec {
    ControlSpec {
        field,
        kind: ControlKind::Number { min, max, step },
    }
}

const fn color(field: ParamField) -> ControlSpec {
    ControlSpec {
        field,
        kind: ControlKind::Color,
    }
}

/// Controls of the glass material, in panel order. Opacity has no control.
pub const MATERIAL_CONTROLS: [ControlSpec; 9] = [
    color(ParamField::Color),
    number(ParamField::Transmission, 0.0, 1.5, 0.01),
    number(ParamField::Metalness, 0.0, 1.0, 0.01),
    number(ParamField::Roughness, 0.0, 1.0, 0.01),
    number(ParamField::Ior, 1.0, 2.0, 0.01),
    number(ParamField::Thickness, 0.0, 5.0, 0.01),
    number(ParamField::SpecularIntensity, 0.0, 1.0, 0.01),
    color(ParamField::SpecularColor),
    number(ParamField::Dispersion, 0.0, 5.0, 0.01),
];

/// Palette a color control cycles through when nudged
pub const SWATCHES: [Color; 8] = [
    Color::new(1.0, 1.0, 1.0),
    Color::new(0.55, 0.85, 1.0),
    Color::new(0.6, 1.0, 0.75),
    Color::new(1.0, 0.95, 0.55),
    Color::new(1.0, 0.6, 0.35),
    Color::new(1.0, 0.45, 0.7),
    Color::new(0.7, 0.55, 1.0),
    Color::new(0.25, 0.25, 0.3),
];

/// One bound control and the value it currently shows
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    spec: ControlSpec,
    value: ParamValue,
}

impl Control {
    pub fn spec(&self) -> ControlSpec {
        self.spec
    }

    pub fn field(&self) -> ParamField {
        self.spec.field
    }

    pub fn value(&self) -> ParamValue {
        self.value
    }

    /// Validate a candidate value: kinds must match, numbers must be finite
    /// and are clamped to the range
    pub fn accept(&self, value: ParamValue) -> Result<ParamValue, PanelError> {
        match (self.spec.kind, value) {
            (ControlKind::Number { .. }, ParamValue::Number(n)) if !n.is_finite() => {
                Err(PanelError::NotFinite {
                    field: self.spec.field,
                    value: n,
                })
            }
            (ControlKind::Number { min, max, .. }, ParamValue::Number(n)) => {
                Ok(ParamValue::Number(n.clamp(min, max)))
            }
            (ControlKind::Color, ParamValue::Color(c)) => Ok(ParamValue::Color(c)),
            (ControlKind::Number { .. }, ParamValue::Color(_)) => Err(PanelError::KindMismatch {
                field: self.spec.field,
                expected: "numeric",
            }),
            (ControlKind::Color, ParamValue::Number(_)) => Err(PanelError::KindMismatch {
                field: self.spec.field,
                expected: "color",
            }),
        }
    }

    /// The value one step away in `direction` (sign only): numbers move along
    /// the step grid, colors cycle through [`SWATCHES`].
    pub fn nudged(&self, direction: i32) -> ParamValue {
        let direction = direction.signum();
        match (self.spec.kind, self.value) {
            (ControlKind::Number { min, max, step }, ParamValue::Number(n)) => {
                let steps = ((n - min) / step).round() as i64 + direction as i64;
                ParamValue::Number((min + steps as f32 * step).clamp(min, max))
            }
            (_, ParamValue::Color(c)) => {
                let len = SWATCHES.len() as i32;
                let next = match SWATCHES.iter().position(|s| *s == c) {
                    Some(i) => (i as i32 + direction).rem_euclid(len),
                    None => 0,
                };
                ParamValue::Color(SWATCHES[next as usize])
            }
            (ControlKind::Color, value) => value,
        }
    }
}

/// Set of controls bound to one parameter store
#[derive(Debug, Clone, Default)]
pub struct Panel {
    controls: Vec<Control>,
    open: bool,
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every control in [`MATERIAL_CONTROLS`], then open the panel
    pub fn bind(store: &MaterialParams) -> Self {
        let mut panel = Self::new();
        for spec in MATERIAL_CONTROLS {
            panel.register(store, spec);
        }
        panel.open();
        panel
    }

    /// Create one control showing the store's current value for `spec.field`.
    /// Registering the same field again replaces the earlier control.
    pub fn register(&mut self, store: &MaterialParams, spec: ControlSpec) -> &Control {
        let control = Control {
            spec,
            value: store.get(spec.field),
        };
        let index = match self.controls.iter().position(|c| c.field() == spec.field) {
            Some(index) => {
                self.controls[index] = control;
                index
            }
            None => {
                self.controls.push(control);
                self.controls.len() - 1
            }
        };
        &self.controls[index]
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn control(&self, field: ParamField) -> Result<&Control, PanelError> {
        self.controls
            .iter()
            .find(|c| c.field() == field)
            .ok_or(PanelError::NoControl(field))
    }

    /// Record a committed value on its control so the widget shows it
    pub(crate) fn show(&mut self, field: ParamField, value: ParamValue) {
        if let Some(control) = self.controls.iter_mut().find(|c| c.field() == field) {
            control.value = value;
        }
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}
