//! Main Application
//!
//! The App drives one [`AvatarEngine`] from terminal input:
//! - mouse motion becomes the pointer sample
//! - typed input sets the typing flag
//! - Enter submits to the simulated [`Responder`]
//! - Ctrl+A toggles the pending-alert flag
//! - Esc or Ctrl+C quits
//!
//! Every frame tick builds a [`HostSignal`], ticks the engine, delivers the
//! engine's due frame callbacks (the tick is the display refresh), and
//! renders the particle, face and status layers.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;
use ratatui::Terminal;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use visage_core::{
    ActivityMonitor, AvatarEngine, EngineConfig, FrameDescription, HostSignal, Pointer, Viewport,
};

use crate::canvas::BufferCanvas;
use crate::compositor::{Compositor, LayerId};
use crate::driver::TickFrameDriver;
use crate::face::FaceView;
use crate::responder::Responder;
use crate::theme;

/// Approximate pixels per terminal cell, for rescaling particle speeds
const CELL_PIXELS: f32 = 8.0;

/// Main application state
pub struct App {
    // === Core State ===
    /// Is the app still running?
    running: bool,
    /// The avatar engine
    engine: AvatarEngine<TickFrameDriver>,
    /// Derives the idle flag from input activity
    activity: ActivityMonitor,
    /// Simulated response backend
    responder: Responder,

    // === UI Components ===
    /// The layered compositor
    compositor: Compositor,
    /// Layer assignments
    layers: AppLayers,

    // === Input State ===
    /// User input buffer
    input_buffer: String,
    /// Last mouse position in cells
    pointer: Pointer,
    /// Pending alert flag
    has_alert: bool,

    // === Misc State ===
    /// Mount time
    started: Instant,
    /// Time between frame ticks
    frame_interval: Duration,
    /// Terminal size
    size: (u16, u16),
    /// Most recent frame
    last_frame: Option<FrameDescription>,
}

/// Layer IDs for UI regions
struct AppLayers {
    particles: LayerId,
    face: LayerId,
    status: LayerId,
}

/// Screen regions for a terminal size
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppLayout {
    /// Everything above the status line
    pub particles: Rect,
    /// Centered face, twice as wide as tall so it reads square
    pub face: Rect,
    /// Bottom line
    pub status: Rect,
}

impl AppLayout {
    /// Compute the layout for a terminal of `width` x `height` cells
    pub fn new(width: u16, height: u16) -> Self {
        let stage_height = height.saturating_sub(1);
        let face_height = stage_height.min(width / 2);
        let face_width = face_height * 2;
        Self {
            particles: Rect::new(0, 0, width, stage_height),
            face: Rect::new(
                (width - face_width) / 2,
                (stage_height - face_height) / 2,
                face_width,
                face_height,
            ),
            status: Rect::new(0, stage_height, width, height.min(1)),
        }
    }
}

impl App {
    /// Create an App for a terminal of the given size
    pub fn new(mut config: EngineConfig, size: (u16, u16), now: Instant) -> Self {
        config.ambient = config.ambient.per_cell(CELL_PIXELS);
        config.stream = config.stream.per_cell(CELL_PIXELS);

        let area = Rect::new(0, 0, size.0, size.1);
        let layout = AppLayout::new(size.0, size.1);
        let mut compositor = Compositor::new(area);
        let layers = AppLayers {
            particles: compositor.create_layer(layout.particles, 0),
            face: compositor.create_layer(layout.face, 10),
            status: compositor.create_layer(layout.status, 20),
        };

        let responder = match config.seed {
            Some(seed) => Responder::with_seed(seed),
            None => Responder::new(),
        };

        Self {
            running: true,
            activity: ActivityMonitor::new(config.idle_timeout, now),
            frame_interval: config.frame_interval(),
            engine: AvatarEngine::with_config(config, TickFrameDriver::new()),
            responder,
            compositor,
            layers,
            input_buffer: String::new(),
            pointer: Pointer::new(f32::from(size.0) / 2.0, f32::from(size.1) / 2.0),
            has_alert: false,
            started: now,
            size,
            last_frame: None,
        }
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();
        let mut ticker = tokio::time::interval(self.frame_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        tracing::info!(frame_interval = ?self.frame_interval, "Starting avatar surface");

        while self.running {
            tokio::select! {
                biased;

                // Terminal events - highest priority
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event, Instant::now()),
                        Some(Err(e)) => tracing::warn!(error = %e, "Terminal event error"),
                        None => self.running = false,
                    }
                }

                // Frame tick - this is the display refresh
                _ = ticker.tick() => {
                    self.update(Instant::now());
                    self.render(terminal)?;
                }
            }
        }

        self.engine.teardown();
        Ok(())
    }

    /// Handle one terminal event
    pub fn handle_event(&mut self, event: Event, now: Instant) {
        match event {
            // Only handle Press events (not Release or Repeat)
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key, now),
            Event::Mouse(mouse) => self.handle_mouse(mouse, now),
            Event::Resize(w, h) => self.handle_resize(w, h),
            _ => {}
        }
    }

    /// Handle keyboard input
    fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        self.activity.record(now);
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Esc => self.running = false,
            KeyCode::Char('c') if ctrl => self.running = false,
            KeyCode::Char('a') if ctrl => {
                self.has_alert = !self.has_alert;
                tracing::debug!(alert = self.has_alert, "Toggled alert");
            }
            KeyCode::Enter => {
                if !self.input_buffer.trim().is_empty() && self.responder.submit(&self.input_buffer, now) {
                    self.input_buffer.clear();
                }
            }
            KeyCode::Char(c) if !ctrl && !alt => self.input_buffer.push(c),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            _ => {}
        }
    }

    /// Handle mouse input
    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                self.pointer = Pointer::new(
                    f32::from(mouse.column) + 0.5,
                    f32::from(mouse.row) + 0.5,
                );
                self.activity.record(now);
            }
            MouseEventKind::Down(_) | MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                self.activity.record(now);
            }
            _ => {}
        }
    }

    /// Handle terminal resize
    pub fn handle_resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
        self.compositor.resize(Rect::new(0, 0, width, height));

        let layout = AppLayout::new(width, height);
        self.compositor.place_layer(self.layers.particles, layout.particles);
        self.compositor.place_layer(self.layers.face, layout.face);
        self.compositor.place_layer(self.layers.status, layout.status);
    }

    /// The host signal as of `now`
    pub fn signal(&self, now: Instant) -> HostSignal {
        HostSignal {
            is_typing: !self.input_buffer.trim().is_empty(),
            is_responding: self.responder.is_responding(),
            is_idle: self.activity.is_idle(now),
            emotion_hint: self.responder.tone().map(str::to_string),
            has_alert: self.has_alert,
            pointer: self.pointer,
        }
    }

    /// Advance everything to `now` and redraw the layers
    pub fn update(&mut self, now: Instant) {
        self.responder.poll(now);

        let signal = self.signal(now);
        let viewport = Viewport::new(f32::from(self.size.0), f32::from(self.size.1));
        let frame = self.engine.tick(&signal, viewport, now);

        for handle in self.engine.driver_mut().due() {
            match self.compositor.layer_buffer_mut(self.layers.particles) {
                Some(buffer) => {
                    let mut canvas = BufferCanvas::new(buffer);
                    self.engine.on_frame(handle, now, Some(&mut canvas));
                }
                None => {
                    self.engine.on_frame(handle, now, None);
                }
            }
        }

        self.compositor
            .set_visible(self.layers.particles, frame.particles_active);
        if !frame.particles_active {
            if let Some(buffer) = self.compositor.layer_buffer_mut(self.layers.particles) {
                buffer.reset();
            }
        }

        let time = now.saturating_duration_since(self.started).as_secs_f32();
        if let Some(buffer) = self.compositor.layer_buffer_mut(self.layers.face) {
            buffer.reset();
            let area = buffer.area;
            FaceView::new(&frame, time).render(area, buffer);
        }

        self.render_status(&frame);
        self.last_frame = Some(frame);
    }

    /// Render the status line
    fn render_status(&mut self, frame: &FrameDescription) {
        let Some(buf) = self.compositor.layer_buffer_mut(self.layers.status) else {
            return;
        };
        buf.reset();
        let area = buf.area;

        let mut spans = vec![
            Span::styled(format!(" {} · {}", frame.mode, frame.emotion), Style::default().fg(theme::STATUS_ACCENT)),
        ];
        if self.has_alert {
            spans.push(Span::styled(" ● alert", Style::default().fg(theme::ALERT_RED)));
        }
        spans.push(Span::styled(" │ ", Style::default().fg(theme::STATUS_TEXT)));

        let used: usize = spans.iter().map(|s| s.content.width()).sum();
        let room = usize::from(area.width).saturating_sub(used + 1);
        if self.input_buffer.is_empty() {
            let hint = "type to talk · Enter send · Ctrl+A alert · Esc quit";
            spans.push(Span::styled(fit_tail(hint, room).to_string(), Style::default().fg(theme::STATUS_TEXT)));
        } else {
            spans.push(Span::styled(
                fit_tail(&self.input_buffer, room).to_string(),
                Style::default().fg(theme::INPUT_TEXT),
            ));
        }

        Line::from(spans).render(area, buf);
    }

    /// Composite the layers onto the terminal
    fn render(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> anyhow::Result<()> {
        terminal.draw(|f| {
            let output = self.compositor.composite();
            let area = f.area();
            let buf = f.buffer_mut();

            for y in 0..area.height.min(output.area.height) {
                for x in 0..area.width.min(output.area.width) {
                    if let (Some(src), Some(dst)) = (output.cell((x, y)), buf.cell_mut((x, y))) {
                        *dst = src.clone();
                    }
                }
            }
        })?;

        Ok(())
    }

    /// Whether the app should keep running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The most recent frame
    pub fn last_frame(&self) -> Option<&FrameDescription> {
        self.last_frame.as_ref()
    }

    /// Whether the particle loop is running
    pub fn is_animating(&self) -> bool {
        self.engine.is_animating()
    }

    /// Current input text
    pub fn input(&self) -> &str {
        &self.input_buffer
    }

    /// Composite the layers without a terminal
    pub fn composite(&mut self) -> &ratatui::buffer::Buffer {
        self.compositor.composite()
    }
}

/// The longest suffix of `text` that fits in `width` columns
fn fit_tail(text: &str, width: usize) -> &str {
    if text.width() <= width {
        return text;
    }
    let mut used = 0;
    let mut start = text.len();
    for (idx, ch) in text.char_indices().rev() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = idx;
    }
    &text[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use visage_core::{EmotionTag, ExpressiveMode};

    fn app(now: Instant) -> App {
        App::new(EngineConfig::default().with_seed(9), (80, 24), now)
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn mode_of(app: &App) -> Option<(ExpressiveMode, EmotionTag)> {
        app.last_frame().map(|f| (f.mode, f.emotion))
    }

    #[test]
    fn test_layout_keeps_face_square() {
        let layout = AppLayout::new(80, 24);
        assert_eq!(layout.face, Rect::new(17, 0, 46, 23));
        assert_eq!(layout.status, Rect::new(0, 23, 80, 1));

        let narrow = AppLayout::new(20, 40);
        assert_eq!(narrow.face.width, 20);
        assert_eq!(narrow.face.height, 10);
    }

    #[test]
    fn test_layout_survives_tiny_terminal() {
        let layout = AppLayout::new(0, 0);
        assert_eq!(layout.face.area(), 0);
        assert_eq!(layout.status.height, 0);
    }

    #[test]
    fn test_typing_then_submit() {
        let start = Instant::now();
        let mut app = app(start);

        for c in "hi".chars() {
            app.handle_event(key(KeyCode::Char(c)), start);
        }
        app.update(start);
        assert_eq!(mode_of(&app), Some((ExpressiveMode::Typing, EmotionTag::Curious)));

        app.handle_event(key(KeyCode::Enter), start);
        assert_eq!(app.input(), "");
        app.update(start);
        assert_eq!(mode_of(&app).map(|(m, _)| m), Some(ExpressiveMode::Responding));

        // Longest simulated response is 4.5 s
        let later = start + Duration::from_millis(4_600);
        app.update(later);
        assert_eq!(mode_of(&app).map(|(m, _)| m), Some(ExpressiveMode::Idle));
        assert!(app.signal(later).emotion_hint.is_some());
    }

    #[test]
    fn test_whitespace_input_is_not_typing() {
        let start = Instant::now();
        let mut app = app(start);
        app.handle_event(key(KeyCode::Char(' ')), start);
        assert!(!app.signal(start).is_typing);

        app.handle_event(key(KeyCode::Enter), start);
        app.update(start);
        assert_eq!(mode_of(&app).map(|(m, _)| m), Some(ExpressiveMode::Idle));
    }

    #[test]
    fn test_idle_draws_particles() {
        let start = Instant::now();
        let mut app = app(start);
        app.update(start);

        let idle = start + Duration::from_secs(6);
        let mut drew = false;
        for i in 0..90 {
            app.update(idle + Duration::from_millis(i * 33));
            let out = app.composite();
            // Anything outside the face region is a particle or the status line
            drew |= (0..23u16).any(|y| (0..17u16).any(|x| out[(x, y)].symbol() != " "));
        }
        assert_eq!(mode_of(&app).map(|(m, _)| m), Some(ExpressiveMode::Background));
        assert!(drew);
    }

    #[test]
    fn test_activity_leaves_background() {
        let start = Instant::now();
        let mut app = app(start);
        let idle = start + Duration::from_secs(6);
        app.update(idle);
        assert_eq!(mode_of(&app).map(|(m, _)| m), Some(ExpressiveMode::Background));

        app.handle_event(
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Moved,
                column: 79,
                row: 12,
                modifiers: KeyModifiers::NONE,
            }),
            idle,
        );
        app.update(idle);
        assert_eq!(mode_of(&app).map(|(m, _)| m), Some(ExpressiveMode::Idle));

        // Gaze eases back to the pointer once the hand-off completes
        app.update(idle + Duration::from_secs(1));
        assert!(app.last_frame().is_some_and(|f| f.head.tilt.rotate_y > 9.0));
    }

    #[test]
    fn test_alert_toggle_turns_background_serious() {
        let start = Instant::now();
        let mut app = app(start);
        app.handle_event(ctrl('a'), start);
        assert!(app.signal(start).has_alert);

        app.update(start + Duration::from_secs(6));
        assert_eq!(mode_of(&app), Some((ExpressiveMode::Background, EmotionTag::Serious)));

        app.handle_event(ctrl('a'), start);
        assert!(!app.signal(start).has_alert);
    }

    #[test]
    fn test_modified_chars_are_not_typed() {
        let now = Instant::now();
        let mut app = app(now);
        app.handle_event(ctrl('b'), now);
        app.handle_event(Event::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT)), now);
        assert_eq!(app.input(), "");

        app.handle_event(Event::Key(KeyEvent::new(KeyCode::Char('X'), KeyModifiers::SHIFT)), now);
        assert_eq!(app.input(), "X");
    }

    #[test]
    fn test_quit_keys() {
        let now = Instant::now();
        let mut app = app(now);
        app.handle_event(key(KeyCode::Esc), now);
        assert!(!app.is_running());

        let mut app = self::app(now);
        app.handle_event(ctrl('c'), now);
        assert!(!app.is_running());
    }

    #[test]
    fn test_resize_moves_layers() {
        let now = Instant::now();
        let mut app = app(now);
        app.handle_resize(120, 40);
        app.update(now);
        assert_eq!(app.composite().area, Rect::new(0, 0, 120, 40));
    }

    #[test]
    fn test_fit_tail() {
        assert_eq!(fit_tail("hello", 10), "hello");
        assert_eq!(fit_tail("hello", 3), "llo");
        assert_eq!(fit_tail("日本語", 4), "本語");
        assert_eq!(fit_tail("abc", 0), "");
    }
}
