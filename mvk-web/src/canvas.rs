/// Presents frames on a `<canvas>` through its 2D context
use mvk_core::{Frame, Present};
use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

/// A browser API call failed; carries the debug form of the thrown value
#[derive(Debug, thiserror::Error)]
#[error("canvas error: {0}")]
pub struct SurfaceError(pub String);

impl From<JsValue> for SurfaceError {
    fn from(value: JsValue) -> Self {
        SurfaceError(format!("{value:?}"))
    }
}

impl From<SurfaceError> for JsValue {
    fn from(err: SurfaceError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub struct CanvasPresenter {
    context: CanvasRenderingContext2d,
}

impl CanvasPresenter {
    /// Bind to `canvas`, whose backing store is resized to the raster and
    /// stretched over `css_width` x `css_height` pixels on the page
    pub fn new(
        canvas: &HtmlCanvasElement,
        raster_width: u32,
        raster_height: u32,
        css_width: f64,
        css_height: f64,
    ) -> Result<Self, SurfaceError> {
        canvas.set_width(raster_width);
        canvas.set_height(raster_height);
        let style = canvas.style();
        style.set_property("width", &format!("{css_width}px"))?;
        style.set_property("height", &format!("{css_height}px"))?;

        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| SurfaceError("2d context unavailable".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(JsValue::from)?;

        Ok(Self { context })
    }
}

impl Present for CanvasPresenter {
    type Error = SurfaceError;

    fn present(&mut self, frame: &Frame) -> Result<(), SurfaceError> {
        let bytes = frame.to_rgba8();
        let image = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(&bytes[..]),
            frame.width() as u32,
            frame.height() as u32,
        )?;
        self.context.put_image_data(&image, 0.0, 0.0)?;
        Ok(())
    }
}
