//! HTML rendition of the material panel.
//!
//! One `<input>` per control, built from the same control table the
//! terminal uses. Every `input` event commits through the render context.

use mvk_core::{Color, CommitError, ControlKind, Panel, ParamField, ParamValue};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

use crate::canvas::SurfaceError;
use crate::SharedContext;

const PANEL_STYLE: &str = "position:fixed;top:8px;right:8px;padding:6px 10px;\
    background:rgba(20,20,24,0.85);color:#eee;font:12px monospace;border-radius:4px";

/// Parse an input element's value for a control of `kind`
pub fn parse_value(kind: ControlKind, raw: &str) -> Option<ParamValue> {
    match kind {
        ControlKind::Number { .. } => raw
            .trim()
            .parse::<f32>()
            .ok()
            .filter(|n| n.is_finite())
            .map(ParamValue::Number),
        ControlKind::Color => Color::from_css_hex(raw.trim()).map(ParamValue::Color),
    }
}

/// Attribute-ready string for a control's current value
pub fn format_value(value: ParamValue) -> String {
    match value {
        ParamValue::Number(n) => n.to_string(),
        ParamValue::Color(c) => c.to_css_hex(),
    }
}

/// Build the panel markup under `<body>` and wire every control to `ctx`
pub fn mount(document: &Document, ctx: &SharedContext) -> Result<(), JsValue> {
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;

    let root = document.create_element("div")?;
    root.set_id("panel");
    root.set_attribute("style", PANEL_STYLE)?;

    let title = document.create_element("div")?;
    title.set_text_content(Some("Material ▾"));
    title.set_attribute("style", "cursor:pointer;font-weight:bold;margin-bottom:4px")?;
    root.append_child(&title)?;

    let rows = document
        .create_element("div")?
        .dyn_into::<HtmlElement>()
        .map_err(JsValue::from)?;
    root.append_child(&rows)?;

    let panel: Panel = ctx.borrow().panel().clone();
    for control in panel.controls() {
        let row = control_row(document, ctx, control.field(), control.spec().kind, control.value())?;
        rows.append_child(&row)?;
    }

    let toggle = {
        let ctx = ctx.clone();
        let rows = rows.clone();
        Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            let open = {
                let mut ctx = ctx.borrow_mut();
                ctx.panel_mut().toggle();
                ctx.panel().is_open()
            };
            let display = if open { "block" } else { "none" };
            if let Err(err) = rows.style().set_property("display", display) {
                log::warn!("failed to toggle panel: {err:?}");
            }
        })
    };
    title.add_event_listener_with_callback("click", toggle.as_ref().unchecked_ref())?;
    toggle.forget();

    body.append_child(&root)?;
    log::info!("panel mounted with {} controls", panel.controls().len());
    Ok(())
}

fn control_row(
    document: &Document,
    ctx: &SharedContext,
    field: ParamField,
    kind: ControlKind,
    value: ParamValue,
) -> Result<Element, JsValue> {
    let row = document.create_element("label")?;
    row.set_attribute("style", "display:flex;justify-content:space-between;gap:8px")?;

    let name = document.create_element("span")?;
    name.set_text_content(Some(field.name()));
    row.append_child(&name)?;

    let input = document
        .create_element("input")?
        .dyn_into::<HtmlInputElement>()
        .map_err(JsValue::from)?;
    input.set_id(field.name());
    match kind {
        ControlKind::Number { min, max, step } => {
            input.set_type("range");
            input.set_min(&min.to_string());
            input.set_max(&max.to_string());
            input.set_step(&step.to_string());
        }
        ControlKind::Color => input.set_type("color"),
    }
    input.set_value(&format_value(value));
    row.append_child(&input)?;

    let on_input = {
        let ctx = ctx.clone();
        let input = input.clone();
        Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            let Some(value) = parse_value(kind, &input.value()) else {
                log::warn!("ignoring unparsable {field} value {:?}", input.value());
                return;
            };
            let result = ctx.borrow_mut().commit(field, value);
            match result {
                Ok(stored) => input.set_value(&format_value(stored)),
                Err(CommitError::Panel(err)) => log::warn!("panel rejected edit: {err}"),
                Err(CommitError::Present(SurfaceError(reason))) => {
                    log::error!("render after {field} edit failed: {reason}")
                }
            }
        })
    };
    input.add_event_listener_with_callback("input", on_input.as_ref().unchecked_ref())?;
    on_input.forget();

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RANGE: ControlKind = ControlKind::Number {
        min: 0.0,
        max: 1.0,
        step: 0.01,
    };

    #[test]
    fn parses_range_and_color_inputs() {
        assert_eq!(parse_value(RANGE, "0.75"), Some(ParamValue::Number(0.75)));
        assert_eq!(parse_value(RANGE, "abc"), None);
        assert_eq!(parse_value(RANGE, "NaN"), None);
        assert_eq!(parse_value(RANGE, "inf"), None);
        assert_eq!(
            parse_value(ControlKind::Color, "#ff0000"),
            Some(ParamValue::Color(Color::new(1.0, 0.0, 0.0)))
        );
        assert_eq!(parse_value(ControlKind::Color, "0.5"), None);
    }

    #[test]
    fn formats_values_for_inputs() {
        assert_eq!(format_value(ParamValue::Number(1.5)), "1.5");
        assert_eq!(format_value(ParamValue::Color(Color::WHITE)), "#ffffff");
    }
}
