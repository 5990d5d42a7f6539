#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusTarget {
    #[default]
    Market,
    Portfolio,
}

#[derive(Debug, Default)]
pub struct App {
    focus: FocusTarget,
    pub selected_listing: usize,
    pub selected_owned: usize,
    pub board_open: bool,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> FocusTarget {
        self.focus
    }

    pub fn set_focus(&mut self, focus: FocusTarget) {
        self.focus = focus;
    }

    pub fn next_focus(&mut self) {
        self.focus = match self.focus {
            FocusTarget::Market => FocusTarget::Portfolio,
            FocusTarget::Portfolio => FocusTarget::Market,
        };
    }

    pub fn toggle_board(&mut self) {
        self.board_open = !self.board_open;
    }

    /// Moves the focused selection by `delta`, wrapping at both ends.
    pub fn move_selection(&mut self, delta: isize, len: usize) {
        if len == 0 {
            return;
        }
        let selected = match self.focus {
            FocusTarget::Market => &mut self.selected_listing,
            FocusTarget::Portfolio => &mut self.selected_owned,
        };
        *selected = (*selected as isize + delta).rem_euclid(len as isize) as usize;
    }

    pub fn clamp_listing_selection(&mut self, len: usize) {
        self.selected_listing = clamp(self.selected_listing, len);
    }

    pub fn clamp_owned_selection(&mut self, len: usize) {
        self.selected_owned = clamp(self.selected_owned, len);
    }
}

fn clamp(selected: usize, len: usize) -> usize {
    if len == 0 { 0 } else { selected.min(len - 1) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_wraps() {
        let mut app = App::new();
        app.move_selection(-1, 4);
        assert_eq!(app.selected_listing, 3);
        app.move_selection(1, 4);
        assert_eq!(app.selected_listing, 0);

        app.next_focus();
        app.move_selection(2, 3);
        assert_eq!(app.selected_owned, 2);
        assert_eq!(app.selected_listing, 0);
    }

    #[test]
    fn clamping_follows_list_length() {
        let mut app = App::new();
        app.selected_owned = 5;
        app.clamp_owned_selection(2);
        assert_eq!(app.selected_owned, 1);
        app.clamp_owned_selection(0);
        assert_eq!(app.selected_owned, 0);
    }
}
