#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Song-select menu navigation.

use keyfall_core::Key;

/// Menu state tracking which song card is highlighted.
#[derive(Debug, Default)]
pub struct SongSelect {
    highlight: usize,
}

impl SongSelect {
    /// Creates a menu with the first song highlighted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the highlighted song card.
    #[must_use]
    pub const fn highlight(&self) -> usize {
        self.highlight
    }

    /// Applies a menu key for a library of `song_count` songs.
    ///
    /// Arrow keys move the highlight and wrap at both ends. Returns the
    /// highlighted index when the selection is confirmed. Keys are ignored while
    /// the library is empty.
    pub fn handle_key(&mut self, key: Key, song_count: usize) -> Option<usize> {
        if song_count == 0 {
            return None;
        }
        self.highlight = self.highlight.min(song_count - 1);

        match key {
            Key::MenuUp => {
                self.highlight = (self.highlight + song_count - 1) % song_count;
                None
            }
            Key::MenuDown => {
                self.highlight = (self.highlight + 1) % song_count;
                None
            }
            Key::Confirm => Some(self.highlight),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_wraps_in_both_directions() {
        let mut menu = SongSelect::new();

        assert_eq!(menu.handle_key(Key::MenuUp, 3), None);
        assert_eq!(menu.highlight(), 2);
        assert_eq!(menu.handle_key(Key::MenuDown, 3), None);
        assert_eq!(menu.highlight(), 0);
        assert_eq!(menu.handle_key(Key::MenuDown, 3), None);
        assert_eq!(menu.handle_key(Key::Confirm, 3), Some(1));
    }

    #[test]
    fn empty_library_ignores_keys() {
        let mut menu = SongSelect::new();
        assert_eq!(menu.handle_key(Key::Confirm, 0), None);
        assert_eq!(menu.handle_key(Key::MenuUp, 0), None);
        assert_eq!(menu.highlight(), 0);
    }

    #[test]
    fn highlight_is_clamped_when_the_library_shrinks() {
        let mut menu = SongSelect::new();
        for _ in 0..4 {
            let _ = menu.handle_key(Key::MenuDown, 5);
        }
        assert_eq!(menu.handle_key(Key::Confirm, 2), Some(1));
    }
}
