/// Keyboard-driven view of the material panel
use mvk_core::{ControlKind, Panel, ParamField};

#[derive(Debug, Default)]
pub struct PanelView {
    selected: usize,
}

impl PanelView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the selection by `delta` rows, wrapping around
    pub fn select(&mut self, delta: i32, panel: &Panel) {
        let count = panel.controls().len() as i32;
        if count == 0 {
            return;
        }
        self.selected = (self.selected as i32 + delta).rem_euclid(count) as usize;
    }

    pub fn selected(&self, panel: &Panel) -> Option<ParamField> {
        panel.controls().get(self.selected).map(|c| c.field())
    }

    /// Overlay text: a title and one row per control. Empty while the panel is closed.
    pub fn lines(&self, panel: &Panel) -> Vec<String> {
        if !panel.is_open() {
            return Vec::new();
        }
        let mut lines = vec!["Material  [tab] select  [</>] adjust  [p] hide".to_string()];
        for (index, control) in panel.controls().iter().enumerate() {
            let marker = if index == self.selected { '>' } else { ' ' };
            let range = match control.spec().kind {
                ControlKind::Number { min, max, .. } => format!("[{min}..{max}]"),
                ControlKind::Color => "[swatch]".to_string(),
            };
            lines.push(format!(
                "{marker} {:<18} {:>8} {range:>10}",
                control.field().name(),
                control.value().to_string()
            ));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvk_core::MaterialParams;

    #[test]
    fn selection_wraps() {
        let panel = Panel::bind(&MaterialParams::default());
        let mut view = PanelView::new();
        assert_eq!(view.selected(&panel), Some(ParamField::Color));
        view.select(-1, &panel);
        assert_eq!(view.selected(&panel), Some(ParamField::Dispersion));
        view.select(2, &panel);
        assert_eq!(view.selected(&panel), Some(ParamField::Transmission));
    }

    #[test]
    fn lines_list_controls_and_hide_when_closed() {
        let mut panel = Panel::bind(&MaterialParams::default());
        let view = PanelView::new();
        let lines = view.lines(&panel);
        assert_eq!(lines.len(), 10);
        assert!(lines[1].starts_with("> color"));
        assert!(lines.iter().any(|l| l.contains("ior") && l.contains("1.60")));

        panel.toggle();
        assert!(view.lines(&panel).is_empty());
    }
}
