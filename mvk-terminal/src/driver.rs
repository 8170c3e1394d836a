/// Frame pacing and input dispatch for the terminal host
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use mvk_core::{CommitError, FrameDriver, PendingFont, RenderContext, StopToken};
use std::io::{self, Write};
use std::time::{Duration, Instant};

use crate::panel_view::PanelView;
use crate::renderer::AsciiRenderer;

/// Logical pixel size of one terminal cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSize {
    pub width: f32,
    pub height: f32,
}

pub struct TerminalDriver {
    frame_time: Duration,
    next_frame: Instant,
    font: Option<PendingFont>,
    cell: CellSize,
    panel_view: PanelView,
    last_fps_update: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalDriver {
    pub fn new(fps: u32, cell: CellSize, font: PendingFont) -> Self {
        let now = Instant::now();
        Self {
            frame_time: Duration::from_secs_f64(1.0 / f64::from(fps.max(1))),
            next_frame: now,
            font: Some(font),
            cell,
            panel_view: PanelView::new(),
            last_fps_update: now,
            frame_count: 0,
            fps: 0.0,
        }
    }

    /// Hand a finished font load to the context; the loader is dropped afterwards
    fn poll_font<W: Write>(&mut self, ctx: &mut RenderContext<AsciiRenderer<W>>) {
        let Some(pending) = self.font.as_mut() else {
            return;
        };
        if let Some(result) = pending.try_take() {
            ctx.resolve_font(result);
            self.font = None;
        }
    }

    fn sync_overlay<W: Write>(&self, ctx: &mut RenderContext<AsciiRenderer<W>>) {
        let lines = self.panel_view.lines(ctx.panel());
        let label = if self.font.is_some() { " | loading font" } else { "" };
        let status = format!("MVK Terminal | FPS: {:.1}{label} | Mouse=Rotate Q=Quit", self.fps);
        let presenter = ctx.presenter_mut();
        presenter.set_overlay(lines);
        presenter.set_status(status);
    }

    fn handle_key<W: Write>(
        &mut self,
        key: KeyEvent,
        ctx: &mut RenderContext<AsciiRenderer<W>>,
        stop: &StopToken,
    ) -> io::Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => stop.stop(),
            KeyCode::Char('p') => ctx.panel_mut().toggle(),
            KeyCode::Tab | KeyCode::Down => self.panel_view.select(1, ctx.panel()),
            KeyCode::BackTab | KeyCode::Up => self.panel_view.select(-1, ctx.panel()),
            KeyCode::Left | KeyCode::Right if ctx.panel().is_open() => {
                let direction = if key.code == KeyCode::Left { -1 } else { 1 };
                if let Some(field) = self.panel_view.selected(ctx.panel()) {
                    // Refresh first so the commit's render shows the new value
                    self.sync_overlay(ctx);
                    match ctx.nudge(field, direction) {
                        Ok(value) => log::debug!("{field} nudged to {value}"),
                        Err(CommitError::Panel(err)) => log::warn!("panel rejected edit: {err}"),
                        Err(CommitError::Present(err)) => return Err(err),
                    }
                }
            }
            _ => {}
        }
        self.sync_overlay(ctx);
        Ok(())
    }

    fn handle_mouse<W: Write>(&self, mouse: MouseEvent, ctx: &mut RenderContext<AsciiRenderer<W>>) {
        if let MouseEventKind::Moved | MouseEventKind::Drag(_) = mouse.kind {
            ctx.pointer_moved(
                f32::from(mouse.column) * self.cell.width,
                f32::from(mouse.row) * self.cell.height,
            );
        }
    }

    fn update_fps(&mut self) {
        self.frame_count += 1;
        let now = Instant::now();
        let elapsed = now - self.last_fps_update;
        if elapsed.as_secs() >= 1 {
            self.fps = self.frame_count as f32 / elapsed.as_secs_f32();
            self.frame_count = 0;
            self.last_fps_update = now;
        }
    }
}

impl<W: Write> FrameDriver<AsciiRenderer<W>> for TerminalDriver {
    fn await_frame(
        &mut self,
        ctx: &mut RenderContext<AsciiRenderer<W>>,
        stop: &StopToken,
    ) -> io::Result<()> {
        self.poll_font(ctx);
        self.sync_overlay(ctx);

        // Dispatch input until the next frame is due
        loop {
            let remaining = self.next_frame.saturating_duration_since(Instant::now());
            if !event::poll(remaining)? {
                break;
            }
            match event::read()? {
                Event::Key(key) => self.handle_key(key, ctx, stop)?,
                Event::Mouse(mouse) => self.handle_mouse(mouse, ctx),
                _ => {}
            }
            if stop.is_stopped() {
                return Ok(());
            }
        }

        let now = Instant::now();
        self.next_frame += self.frame_time;
        if self.next_frame < now {
            // Fell behind; pace from here rather than bursting to catch up
            self.next_frame = now + self.frame_time;
        }
        self.update_fps();
        Ok(())
    }
}
