/// MVK Web - the glass torus demo in the browser
///
/// Renders into `<canvas id="canvas">` with the core software rasterizer,
/// mounts the material panel as HTML inputs, fetches the label font and
/// drives frames with `requestAnimationFrame`.

use std::cell::RefCell;
use std::rc::Rc;

use mvk_core::{Font, FontError, FrameLoop, RenderContext, SceneConfig, StopToken, Viewport};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{HtmlCanvasElement, MouseEvent, Response, Window};

pub mod canvas;
pub mod panel;

pub use canvas::{CanvasPresenter, SurfaceError};

/// Id of the drawing surface in the host page
pub const CANVAS_ID: &str = "canvas";
/// Label font, relative to the server root (the repository checkout)
pub const FONT_URL: &str = "/assets/fonts/mavericks_block.typeface.json";
/// Window pixels per raster pixel along each axis
pub const RASTER_DIVISOR: u32 = 2;

pub type SharedContext = Rc<RefCell<RenderContext<CanvasPresenter>>>;

/// Raster size for a window, never smaller than one pixel
pub fn raster_size(width: f64, height: f64, divisor: u32) -> (u32, u32) {
    let divisor = f64::from(divisor.max(1));
    let scale = |v: f64| ((v / divisor).floor() as u32).max(1);
    (scale(width), scale(height))
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| JsValue::from_str("missing #canvas element"))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(JsValue::from)?;

    let width = window.inner_width()?.as_f64().unwrap_or(800.0);
    let height = window.inner_height()?.as_f64().unwrap_or(600.0);
    let (raster_width, raster_height) = raster_size(width, height, RASTER_DIVISOR);
    let presenter = CanvasPresenter::new(&canvas, raster_width, raster_height, width, height)?;

    let ctx: SharedContext = Rc::new(RefCell::new(RenderContext::new(
        SceneConfig::default(),
        Viewport::new(width as f32, height as f32),
        raster_width as usize,
        raster_height as usize,
        presenter,
    )));

    panel::mount(&document, &ctx)?;
    listen_pointer(&canvas, &ctx)?;
    load_label(&ctx);
    run_frames(&window, ctx)
}

fn listen_pointer(canvas: &HtmlCanvasElement, ctx: &SharedContext) -> Result<(), JsValue> {
    let ctx = ctx.clone();
    let on_move = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
        ctx.borrow_mut()
            .pointer_moved(event.client_x() as f32, event.client_y() as f32);
    });
    canvas.add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref())?;
    on_move.forget();
    Ok(())
}

/// Fetch the font in the background; the label appears whenever it lands
fn load_label(ctx: &SharedContext) {
    let ctx = ctx.clone();
    spawn_local(async move {
        let result = fetch_font(FONT_URL).await;
        ctx.borrow_mut().resolve_font(result);
    });
}

async fn fetch_font(url: &str) -> Result<Font, FontError> {
    let fail = |reason: JsValue| FontError::Fetch {
        url: url.to_string(),
        reason: format!("{reason:?}"),
    };

    let window = web_sys::window().ok_or_else(|| fail(JsValue::from_str("no window")))?;
    let response: Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(fail)?
        .dyn_into()
        .map_err(fail)?;
    if !response.ok() {
        return Err(fail(JsValue::from_str(&format!("HTTP {}", response.status()))));
    }

    let text = JsFuture::from(response.text().map_err(fail)?)
        .await
        .map_err(fail)?;
    let json = text
        .as_string()
        .ok_or_else(|| fail(JsValue::from_str("body is not text")))?;
    Font::from_json(&json)
}

fn request_animation_frame(window: &Window, callback: &Closure<dyn FnMut()>) -> Result<i32, JsValue> {
    let function: &js_sys::Function = callback.as_ref().unchecked_ref();
    window.request_animation_frame(function)
}

/// Step one frame per animation frame, for the life of the page
fn run_frames(window: &Window, ctx: SharedContext) -> Result<(), JsValue> {
    let mut frame_loop = FrameLoop::new(StopToken::new());
    let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let scheduled = callback.clone();
    let frame_window = window.clone();

    *callback.borrow_mut() = Some(Closure::new(move || {
        let stepped = {
            let mut ctx = ctx.borrow_mut();
            frame_loop.step(&mut *ctx)
        };
        if let Err(err) = stepped {
            log::error!("frame {} failed: {err}", frame_loop.frames());
        }
        if let Some(next) = scheduled.borrow().as_ref() {
            if let Err(err) = request_animation_frame(&frame_window, next) {
                log::error!("failed to schedule frame: {err:?}");
            }
        }
    }));

    if let Some(first) = callback.borrow().as_ref() {
        request_animation_frame(window, first)?;
    }
    Ok(())
}
