/// Terminal front-end: the glass torus demo rendered as colored ASCII
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self},
};
use mvk_core::{FrameLoop, PendingFont, RenderContext, SceneConfig, StopToken, Viewport};
use std::io::{self, stdout, Stdout};

pub mod driver;
pub mod panel_view;
pub mod renderer;

pub use driver::{CellSize, TerminalDriver};
pub use panel_view::PanelView;
pub use renderer::AsciiRenderer;

/// Main application struct for the terminal demo
pub struct TerminalApp {
    ctx: RenderContext<AsciiRenderer<Stdout>>,
    driver: TerminalDriver,
    frame_loop: FrameLoop,
}

impl TerminalApp {
    /// Size the scene to the current terminal; one raster pixel per cell
    pub fn new(config: SceneConfig, font: PendingFont, fps: u32, cell: CellSize) -> io::Result<Self> {
        let (columns, rows) = terminal::size()?;
        let viewport = Viewport::new(
            f32::from(columns) * cell.width,
            f32::from(rows) * cell.height,
        );

        let ctx = RenderContext::new(
            config,
            viewport,
            usize::from(columns),
            usize::from(rows),
            AsciiRenderer::new(stdout()),
        );

        Ok(Self {
            ctx,
            driver: TerminalDriver::new(fps, cell, font),
            frame_loop: FrameLoop::new(StopToken::new()),
        })
    }

    /// Token that ends [`run`](Self::run) when stopped
    pub fn stop_token(&self) -> StopToken {
        self.frame_loop.stop_token()
    }

    pub fn frames(&self) -> u64 {
        self.frame_loop.frames()
    }

    /// Take over the terminal and run until quit. The terminal is restored
    /// even when the loop fails.
    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        let result = execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture
        )
        .and_then(|()| self.main_loop());

        // Cleanup
        let restored = execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )
        .and(terminal::disable_raw_mode());

        result.and(restored)
    }

    fn main_loop(&mut self) -> io::Result<()> {
        self.frame_loop.run(&mut self.ctx, &mut self.driver)
    }
}
