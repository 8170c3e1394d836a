//! The per-frame loop, decoupled from the host's scheduling primitive.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::context::RenderContext;
use crate::raster::Present;

/// Shared cancellation flag; clones observe the same flag
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Host side of the loop: waits until the next frame is due and feeds
/// pending host events (pointer, keys, asset results) into the context.
pub trait FrameDriver<P: Present> {
    fn await_frame(&mut self, ctx: &mut RenderContext<P>, stop: &StopToken) -> Result<(), P::Error>;
}

pub struct FrameLoop {
    stop: StopToken,
    frames: u64,
}

impl FrameLoop {
    pub fn new(stop: StopToken) -> Self {
        Self { stop, frames: 0 }
    }

    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    /// Frames stepped so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run exactly one frame: spin the torus and render
    pub fn step<P: Present>(&mut self, ctx: &mut RenderContext<P>) -> Result<(), P::Error> {
        ctx.tick()?;
        self.frames += 1;
        Ok(())
    }

    /// Step frames as the driver paces them until the stop token fires
    pub fn run<P, D>(&mut self, ctx: &mut RenderContext<P>, driver: &mut D) -> Result<(), P::Error>
    where
        P: Present,
        D: FrameDriver<P>,
    {
        log::info!("frame loop started");
        while !self.stop.is_stopped() {
            driver.await_frame(ctx, &self.stop)?;
            if self.stop.is_stopped() {
                break;
            }
            self.step(ctx)?;
        }
        log::info!("frame loop stopped after {} frames", self.frames);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::projection::Viewport;
    use crate::raster::Frame;
    use std::convert::Infallible;

    struct Discard;

    impl Present for Discard {
        type Error = Infallible;

        fn present(&mut self, _frame: &Frame) -> Result<(), Infallible> {
            Ok(())
        }
    }

    /// Stops the loop after a fixed number of frames
    struct FrameQuota(u64);

    impl FrameDriver<Discard> for FrameQuota {
        fn await_frame(&mut self, _ctx: &mut RenderContext<Discard>, stop: &StopToken) -> Result<(), Infallible> {
            if self.0 == 0 {
                stop.stop();
            } else {
                self.0 -= 1;
            }
            Ok(())
        }
    }

    fn context() -> RenderContext<Discard> {
        RenderContext::new(SceneConfig::default(), Viewport::new(8.0, 8.0), 8, 8, Discard)
    }

    #[test]
    fn stop_token_is_shared_between_clones() {
        let token = StopToken::new();
        let clone = token.clone();
        assert!(!clone.is_stopped());
        token.stop();
        assert!(clone.is_stopped());
    }

    #[test]
    fn run_steps_until_stopped() {
        let mut ctx = context();
        let mut frame_loop = FrameLoop::new(StopToken::new());
        frame_loop.run(&mut ctx, &mut FrameQuota(25)).unwrap();
        assert_eq!(frame_loop.frames(), 25);
        assert_eq!(ctx.render_count(), 25);
        assert!(frame_loop.stop_token().is_stopped());
    }

    #[test]
    fn pre_stopped_loop_renders_nothing() {
        let mut ctx = context();
        let stop = StopToken::new();
        stop.stop();
        FrameLoop::new(stop).run(&mut ctx, &mut FrameQuota(10)).unwrap();
        assert_eq!(ctx.render_count(), 0);
    }

    #[test]
    fn step_is_deterministic() {
        let mut ctx = context();
        let mut frame_loop = FrameLoop::new(StopToken::new());
        let start = ctx.torus_rotation().x;
        for _ in 0..10 {
            frame_loop.step(&mut ctx).unwrap();
        }
        assert!((ctx.torus_rotation().x - start - 0.2).abs() < 1e-5);
    }
}
