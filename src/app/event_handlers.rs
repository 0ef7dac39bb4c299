use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{App, ui_helpers};

impl App {
    /// Returns true when the app should exit.
    pub(super) fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => return true,
            KeyCode::Char('c') if ctrl => return true,
            KeyCode::Char('?') => {
                self.show_help = !self.show_help;
                return false;
            }
            KeyCode::Char('t') | KeyCode::Char('T') => {
                self.set_timeline(self.timeline.next());
                return false;
            }
            KeyCode::Char('l') | KeyCode::Char('L') => {
                self.show_legend = !self.show_legend;
                return false;
            }
            _ => {}
        }

        if self.snapshot.activities.is_empty() {
            return false;
        }

        if self.in_single_view() {
            self.handle_single_key(key);
        } else {
            self.handle_overview_key(key);
        }
        false
    }

    fn handle_overview_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::Enter => self.open_single(self.selected_index),
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                self.open_single(index);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll = self.scroll.saturating_add(1);
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_add(10);
            }
            _ => {}
        }
    }

    fn handle_single_key(&mut self, key: KeyEvent) {
        let count = self.snapshot.activities.len();

        match key.code {
            KeyCode::Tab | KeyCode::Esc => self.open_all(),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_index = ui_helpers::wrap_prev_index(self.selected_index, count);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected_index = ui_helpers::wrap_next_index(self.selected_index, count);
            }
            KeyCode::Left | KeyCode::Char('a') => self.move_cursor(-1, 0),
            KeyCode::Right | KeyCode::Char('d') => self.move_cursor(1, 0),
            KeyCode::Char('w') => self.move_cursor(0, -1),
            KeyCode::Char('s') => self.move_cursor(0, 1),
            KeyCode::Home => self.reset_cursor(),
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                self.open_single(index);
            }
            _ => {}
        }
    }

    /// Blank cells are never selected.
    fn move_cursor(&mut self, week_delta: isize, day_delta: isize) {
        let Some(current) = self.cursor else {
            self.reset_cursor();
            return;
        };

        let grid = &self.snapshot.grid;
        if let Some((week, day)) =
            ui_helpers::step_cell(current, week_delta, day_delta, grid.weeks())
            && grid.cell(week, day).is_some()
        {
            self.cursor = Some((week, day));
        }
    }
}
