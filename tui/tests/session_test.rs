//! Scripted Session Tests
//!
//! Drive the App through a whole session without a terminal: events go in
//! through `handle_event`, time advances by explicit instants, and frames
//! come back through `last_frame` and `composite`.

use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use pretty_assertions::assert_eq;

use visage_core::{EngineConfig, ExpressiveMode, MouthShape};
use visage_tui::App;

const FRAME: Duration = Duration::from_millis(33);

fn press(app: &mut App, code: KeyCode, now: Instant) {
    app.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)), now);
}

fn run_for(app: &mut App, from: Instant, length: Duration) -> Instant {
    let mut now = from;
    while now < from + length {
        app.update(now);
        now += FRAME;
    }
    now
}

fn mode(app: &App) -> ExpressiveMode {
    app.last_frame().map_or(ExpressiveMode::Idle, |f| f.mode)
}

#[test]
fn test_full_session() {
    let start = Instant::now();
    let mut app = App::new(EngineConfig::default().with_seed(77), (100, 30), start);

    // Settles idle, no particles
    let now = run_for(&mut app, start, Duration::from_secs(1));
    assert_eq!(mode(&app), ExpressiveMode::Idle);
    assert!(!app.is_animating());

    // Typing shows the hand and a flat mouth
    for c in "what now".chars() {
        press(&mut app, KeyCode::Char(c), now);
    }
    app.update(now);
    let frame = app.last_frame().cloned();
    assert_eq!(frame.as_ref().map(|f| f.mouth.shape), Some(MouthShape::Typing));
    assert!(frame.is_some_and(|f| f.hand.is_visible()));

    // Submitting starts a response
    press(&mut app, KeyCode::Enter, now);
    let now = run_for(&mut app, now, Duration::from_secs(1));
    assert_eq!(mode(&app), ExpressiveMode::Responding);

    // Response finishes, then nobody touches anything
    let now = run_for(&mut app, now, Duration::from_secs(9));
    assert_eq!(mode(&app), ExpressiveMode::Background);
    assert!(app.is_animating());

    // Pointer motion wakes the avatar and stops the particle loop
    app.handle_event(
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Moved,
            column: 10,
            row: 3,
            modifiers: KeyModifiers::NONE,
        }),
        now,
    );
    app.update(now);
    assert_eq!(mode(&app), ExpressiveMode::Idle);
    assert!(!app.is_animating());
}

#[test]
fn test_status_line_shows_mode_and_input() {
    let start = Instant::now();
    let mut app = App::new(EngineConfig::default().with_seed(3), (80, 10), start);
    press(&mut app, KeyCode::Char('o'), start);
    press(&mut app, KeyCode::Char('k'), start);
    app.update(start);

    let out = app.composite();
    let status: String = (0..80u16).map(|x| out[(x, 9)].symbol().to_string()).collect();
    assert!(status.contains("typing"), "{status}");
    assert!(status.contains("ok"), "{status}");
}

#[test]
fn test_backspace_back_to_idle() {
    let start = Instant::now();
    let mut app = App::new(EngineConfig::default(), (80, 24), start);
    press(&mut app, KeyCode::Char('x'), start);
    press(&mut app, KeyCode::Backspace, start);
    app.update(start);
    assert_eq!(app.input(), "");
    assert_eq!(mode(&app), ExpressiveMode::Idle);
}
