use crate::app::InputMode;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

const WHEEL_STEP: isize = 3;
const PAGE_STEP: isize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextPanel,
    PrevPanel,
    FocusPanel(usize),
    Down,
    Up,
    Select,
    ClearSelection,
    NextOption,
    PrevOption,
    ScrollDetail(isize),
    Refresh,
    ToggleHelp,
    CloseHelp,
    Click { column: u16, row: u16 },
}

pub fn map_key(mode: InputMode, key: KeyEvent) -> Option<Action> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }
    match mode {
        InputMode::Normal => map_normal_mode_key(key),
        InputMode::Help => map_help_mode_key(key),
    }
}

fn map_normal_mode_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Tab => Some(Action::NextPanel),
        KeyCode::BackTab => Some(Action::PrevPanel),
        KeyCode::Char(c @ '1'..='5') if key.modifiers.is_empty() => c
            .to_digit(10)
            .map(|digit| Action::FocusPanel(digit as usize - 1)),
        KeyCode::Char('j') | KeyCode::Down => Some(Action::Down),
        KeyCode::Char('k') | KeyCode::Up => Some(Action::Up),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Action::Select),
        KeyCode::Esc => Some(Action::ClearSelection),
        KeyCode::Char(']') | KeyCode::Char('l') | KeyCode::Right => Some(Action::NextOption),
        KeyCode::Char('[') | KeyCode::Char('h') | KeyCode::Left => Some(Action::PrevOption),
        KeyCode::PageDown => Some(Action::ScrollDetail(PAGE_STEP)),
        KeyCode::PageUp => Some(Action::ScrollDetail(-PAGE_STEP)),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Action::ScrollDetail(PAGE_STEP))
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Action::ScrollDetail(-PAGE_STEP))
        }
        KeyCode::Char('r') | KeyCode::F(5) => Some(Action::Refresh),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        _ => None,
    }
}

fn map_help_mode_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Enter => Some(Action::CloseHelp),
        _ => None,
    }
}

pub fn map_mouse(mouse: MouseEvent) -> Option<Action> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Action::Click {
            column: mouse.column,
            row: mouse.row,
        }),
        MouseEventKind::ScrollDown => Some(Action::ScrollDetail(WHEEL_STEP)),
        MouseEventKind::ScrollUp => Some(Action::ScrollDetail(-WHEEL_STEP)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, map_key, map_mouse};
    use crate::app::InputMode;
    use crossterm::event::{
        KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    };

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn normal_mode_maps_quit() {
        assert_eq!(
            map_key(InputMode::Normal, key(KeyCode::Char('q'))),
            Some(Action::Quit)
        );
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(InputMode::Help, ctrl_c), Some(Action::Quit));
    }

    #[test]
    fn brackets_cycle_secondary_options() {
        assert_eq!(
            map_key(InputMode::Normal, key(KeyCode::Char(']'))),
            Some(Action::NextOption)
        );
        assert_eq!(
            map_key(InputMode::Normal, key(KeyCode::Char('['))),
            Some(Action::PrevOption)
        );
    }

    #[test]
    fn tab_and_digits_move_focus() {
        assert_eq!(
            map_key(InputMode::Normal, key(KeyCode::Tab)),
            Some(Action::NextPanel)
        );
        assert_eq!(
            map_key(InputMode::Normal, key(KeyCode::BackTab)),
            Some(Action::PrevPanel)
        );
        assert_eq!(
            map_key(InputMode::Normal, key(KeyCode::Char('1'))),
            Some(Action::FocusPanel(0))
        );
        assert_eq!(
            map_key(InputMode::Normal, key(KeyCode::Char('5'))),
            Some(Action::FocusPanel(4))
        );
        assert_eq!(map_key(InputMode::Normal, key(KeyCode::Char('6'))), None);
    }

    #[test]
    fn help_mode_only_closes_or_quits() {
        assert_eq!(
            map_key(InputMode::Help, key(KeyCode::Esc)),
            Some(Action::CloseHelp)
        );
        assert_eq!(map_key(InputMode::Help, key(KeyCode::Char('j'))), None);
    }

    #[test]
    fn mouse_left_click_and_wheel() {
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 12,
            row: 3,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            map_mouse(click),
            Some(Action::Click { column: 12, row: 3 })
        );

        let wheel = MouseEvent {
            kind: MouseEventKind::ScrollUp,
            ..click
        };
        assert_eq!(map_mouse(wheel), Some(Action::ScrollDetail(-3)));
    }
}
