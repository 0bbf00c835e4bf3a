use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use std::time::Duration;

const MAX_EVENTS_PER_POLL: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Key { code: KeyCode, mods: KeyModifiers },
    Click { col: u16, row: u16 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    SelectNext,
    SelectPrev,
    ToggleDetails,
    NextSystem,
    TogglePause,
    Faster,
    Slower,
    ResetClock,
    Click { col: u16, row: u16 },
}

/// Drains pending terminal events without blocking longer than `timeout`.
pub fn collect_input_nonblocking(timeout: Duration) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();
    let mut wait = timeout;
    while event::poll(wait)? {
        wait = Duration::ZERO;
        match event::read()? {
            Event::Key(k) if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat => {
                out.push(InputEvent::Key { code: k.code, mods: k.modifiers });
            }
            Event::Mouse(m) if m.kind == MouseEventKind::Down(MouseButton::Left) => {
                out.push(InputEvent::Click { col: m.column, row: m.row });
            }
            _ => {}
        }
        if out.len() >= MAX_EVENTS_PER_POLL {
            break;
        }
    }
    Ok(out)
}

pub fn map_event_to_action(ev: InputEvent) -> Option<Action> {
    let (code, mods) = match ev {
        InputEvent::Click { col, row } => return Some(Action::Click { col, row }),
        InputEvent::Key { code, mods } => (code, mods),
    };
    if code == KeyCode::Char('c') && mods.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Right | KeyCode::Tab => Some(Action::SelectNext),
        KeyCode::Left | KeyCode::BackTab => Some(Action::SelectPrev),
        KeyCode::Enter => Some(Action::ToggleDetails),
        KeyCode::Char('s') | KeyCode::Char('S') => Some(Action::NextSystem),
        KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Char(' ') => Some(Action::TogglePause),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::Faster),
        KeyCode::Char('-') | KeyCode::Char('_') => Some(Action::Slower),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(Action::ResetClock),
        _ => None,
    }
}
