use std::convert::Infallible;
use std::path::Path;

use approx::assert_relative_eq;
use mvk_core::font::PendingFont;
use mvk_core::text::{text_mesh, TextOptions};
use mvk_core::{
    Font, FontError, Frame, FrameDriver, FrameLoop, LabelState, ParamField, ParamValue, Present,
    RenderContext, SceneConfig, StopToken, Viewport,
};

const FONT_ASSET: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../assets/fonts/mavericks_block.typeface.json"
);

#[derive(Default)]
struct Recorder {
    frames: usize,
    last_alpha_sum: f32,
}

impl Present for Recorder {
    type Error = Infallible;

    fn present(&mut self, frame: &Frame) -> Result<(), Infallible> {
        self.frames += 1;
        self.last_alpha_sum = frame.pixels().iter().map(|p| p[3]).sum();
        Ok(())
    }
}

/// Polls a pending font from frame `deliver_at` on, stops after `frames`
struct ScriptedHost {
    frames: u64,
    deliver_at: u64,
    font: Option<PendingFont>,
    seen: u64,
}

impl ScriptedHost {
    fn new(frames: u64, deliver_at: u64, font: Option<PendingFont>) -> Self {
        Self {
            frames,
            deliver_at,
            font,
            seen: 0,
        }
    }
}

impl FrameDriver<Recorder> for ScriptedHost {
    fn await_frame(
        &mut self,
        ctx: &mut RenderContext<Recorder>,
        stop: &StopToken,
    ) -> Result<(), Infallible> {
        if self.seen == self.frames {
            stop.stop();
            return Ok(());
        }
        if self.seen >= self.deliver_at {
            if let Some(result) = self.font.as_mut().and_then(PendingFont::try_take) {
                ctx.resolve_font(result);
            }
        }
        self.seen += 1;
        Ok(())
    }
}

fn context_with(config: SceneConfig) -> RenderContext<Recorder> {
    RenderContext::new(config, Viewport::new(640.0, 480.0), 64, 48, Recorder::default())
}

fn context() -> RenderContext<Recorder> {
    context_with(SceneConfig::default())
}

fn asset_font() -> Font {
    Font::load(Path::new(FONT_ASSET)).expect("bundled font parses")
}

#[test]
fn transmission_edit_reads_back_and_renders_once() {
    let mut ctx = context();
    ctx.commit(ParamField::Transmission, ParamValue::Number(0.75))
        .unwrap();
    assert_eq!(ctx.material().unwrap().transmission, 0.75);
    assert_eq!(ctx.render_count(), 1);
    assert_eq!(ctx.presenter().frames, 1);
}

#[test]
fn every_control_applies_to_the_live_material() {
    let mut ctx = context();
    let mut renders = 0;
    for field in ParamField::ALL.into_iter().filter(|f| !f.is_color()) {
        if ctx.panel().control(field).is_err() {
            continue;
        }
        ctx.commit(field, ParamValue::Number(0.5)).unwrap();
        renders += 1;
        assert_eq!(ctx.render_count(), renders);
    }
    let material = ctx.material().unwrap();
    assert_eq!(material.metalness, 0.5);
    assert_eq!(material.roughness, 0.5);
    assert_eq!(material.thickness, 0.5);
    assert_eq!(material.specular_intensity, 0.5);
    assert_eq!(material.dispersion, 0.5);
    // ior's range starts at 1
    assert_eq!(material.ior, 1.0);
    // opacity has no control and keeps its default
    assert_eq!(material.opacity, 1.0);
}

#[test]
fn hundred_frames_spin_two_radians() {
    let mut ctx = context();
    let mut frame_loop = FrameLoop::new(StopToken::new());
    frame_loop
        .run(&mut ctx, &mut ScriptedHost::new(100, 0, None))
        .unwrap();
    assert_eq!(frame_loop.frames(), 100);
    assert_relative_eq!(ctx.torus_rotation().x, 2.0, epsilon = 1e-4);
    assert_eq!(ctx.presenter().frames, 100);
}

#[test]
fn pointer_events_do_not_accumulate_across_frames() {
    let mut ctx = context();
    let mut frame_loop = FrameLoop::new(StopToken::new());
    for _ in 0..5 {
        ctx.pointer_moved(320.0, 240.0);
        frame_loop.step(&mut ctx).unwrap();
    }
    let rotation = ctx.group_rotation();
    assert_relative_eq!(rotation.x, 2.4);
    assert_relative_eq!(rotation.y, 3.2);
}

#[test]
fn font_resolving_before_or_after_loop_start_adds_one_label() {
    for deliver_at in [0, 1, 7, 30] {
        let mut ctx = context();
        let pending = PendingFont::settled(Ok(asset_font()));
        FrameLoop::new(StopToken::new())
            .run(&mut ctx, &mut ScriptedHost::new(40, deliver_at, Some(pending)))
            .unwrap();
        assert_eq!(ctx.scene().mesh_count(), 2, "delivered at frame {deliver_at}");
        assert!(matches!(ctx.label_state(), LabelState::Inserted(_)));
    }
}

#[test]
fn font_resolved_during_setup_then_again_is_ignored() {
    let mut ctx = context();
    assert!(ctx.resolve_font(Ok(asset_font())).is_some());
    FrameLoop::new(StopToken::new())
        .run(
            &mut ctx,
            &mut ScriptedHost::new(10, 0, Some(PendingFont::settled(Ok(asset_font())))),
        )
        .unwrap();
    assert_eq!(ctx.scene().mesh_count(), 2);
}

#[test]
fn rejected_font_never_adds_a_label() {
    let mut ctx = context();
    let pending = PendingFont::settled(Err(FontError::Empty));
    FrameLoop::new(StopToken::new())
        .run(&mut ctx, &mut ScriptedHost::new(20, 3, Some(pending)))
        .unwrap();
    assert_eq!(ctx.label_state(), LabelState::Failed);
    assert_eq!(ctx.scene().mesh_count(), 1);
    assert!(ctx.scene().find("torus").is_some());
    assert!(ctx.scene().find("directional-light").is_some());
    assert!(ctx.scene().find("ambient-light").is_some());
}

#[test]
fn font_that_never_resolves_leaves_scene_unchanged() {
    let mut ctx = context();
    FrameLoop::new(StopToken::new())
        .run(&mut ctx, &mut ScriptedHost::new(50, 0, None))
        .unwrap();
    assert_eq!(ctx.label_state(), LabelState::Pending);
    assert_eq!(ctx.scene().mesh_count(), 1);
}

#[test]
fn missing_font_file_degrades_to_no_label() {
    let mut ctx = context();
    let mut pending = PendingFont::spawn("does/not/exist.typeface.json").unwrap();
    let result = loop {
        if let Some(result) = pending.try_take() {
            break result;
        }
        std::thread::yield_now();
    };
    assert!(ctx.resolve_font(result).is_none());
    assert_eq!(ctx.label_state(), LabelState::Failed);
}

#[test]
fn bundled_font_covers_the_label() {
    let font = asset_font();
    for c in "MAVERICKS ".chars() {
        assert!(font.glyph(c).is_some(), "missing glyph {c:?}");
    }

    let mut mesh = text_mesh(
        &font,
        "MAVERICKS",
        &TextOptions {
            size: 10.0,
            depth: 1.0,
            curve_segments: 12,
        },
    );
    assert!(!mesh.is_empty());
    mesh.center();
    let bounds = mesh.bounds().unwrap();
    assert_relative_eq!(bounds.center().coords.norm(), 0.0, epsilon = 1e-3);
    assert_relative_eq!(bounds.size().z, 1.0, epsilon = 1e-5);
    assert_relative_eq!(bounds.size().y, 7.0, epsilon = 1e-4);
    assert!(bounds.size().x > 50.0 && bounds.size().x < 70.0);
}

#[test]
fn rendered_torus_leaves_its_hole_clear() {
    let mut ctx = context();
    ctx.render().unwrap();
    let frame = ctx.frame();
    assert_eq!(frame.pixel(32, 24), [0.0; 4]);
    assert!((0..64).any(|x| frame.pixel(x, 24)[3] > 0.0));
    assert_eq!(frame.pixel(0, 0), [0.0; 4]);
    assert!(ctx.presenter().last_alpha_sum > 0.0);
}

#[test]
fn config_overrides_motion() {
    let config = SceneConfig::from_json(r#"{ "motion": { "spin_per_frame": 0.05 } }"#).unwrap();
    let mut ctx = context_with(config);
    let mut frame_loop = FrameLoop::new(StopToken::new());
    for _ in 0..10 {
        frame_loop.step(&mut ctx).unwrap();
    }
    assert_relative_eq!(ctx.torus_rotation().x, 0.5, epsilon = 1e-5);
    assert_eq!(ctx.config().motion.pointer_divisor, 100.0);
}
