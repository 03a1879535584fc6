//! Single-line text input with horizontal scrolling and tab completion.
//!
//! The value is stored as chars; `cursor` and `offset` are char indices.
//! `offset` is the first visible char and always satisfies
//! `offset <= cursor` with the cells between them fitting in the field,
//! leaving one column for the cursor at the end of the value.

use crate::drawable::Drawable;
use crate::input::{EscapeKey, Key, BACKSPACE, DELETE, ENTER, ESC, TAB};
use crate::renderer::{char_width, chars_width, string_width};
use crate::types::{Color, ColorPair};

/// Text of the field.
pub const FIELD_COLOR: ColorPair = ColorPair::new(Color::Black, Color::Cyan);
/// Completion tail shown after the typed text.
pub const SUGGESTION_COLOR: ColorPair = ColorPair::new(Color::White, Color::Cyan);

/// Returns completion candidates for the current value.
pub type Suggester = Box<dyn Fn(&str) -> Vec<String>>;

/// What a key did to the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEvent {
    /// Move focus to the next field.
    Forward,
    /// Move focus to the previous field.
    Backward,
    /// Modal field accepted its value.
    Confirm,
    /// Modal field was dismissed.
    Cancel,
    /// Value or cursor changed; redraw.
    Update,
}

pub struct InputField {
    row: u16,
    col: u16,
    length: u16,
    modal: bool,
    enter_to_confirm: bool,
    active: bool,

    value: Vec<char>,
    cursor: usize,
    offset: usize,
    limit: usize,
    charset: Option<String>,

    suggester: Option<Suggester>,
    suggestion: Option<String>,
}

impl InputField {
    /// Empty field of `length` columns at (row, col).
    pub fn new(row: u16, col: u16, length: u16) -> Self {
        Self {
            row,
            col,
            length,
            modal: false,
            enter_to_confirm: false,
            active: false,
            value: Vec::new(),
            cursor: 0,
            offset: 0,
            limit: usize::MAX,
            charset: None,
            suggester: None,
            suggestion: None,
        }
    }

    /// Modal fields answer ESC with Cancel and Enter with Confirm, and never
    /// hand focus to a sibling.
    pub fn modal(mut self, modal: bool) -> Self {
        self.modal = modal;
        self
    }

    /// Enter confirms even when a suggestion is showing.
    pub fn enter_to_confirm(mut self, yes: bool) -> Self {
        self.enter_to_confirm = yes;
        self
    }

    /// Maximum number of chars.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Only chars in `charset` are accepted.
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    pub fn suggester(mut self, suggester: impl Fn(&str) -> Vec<String> + 'static) -> Self {
        self.suggester = Some(Box::new(suggester));
        self
    }

    /// Initial value, cursor at its end.
    pub fn with_value(mut self, value: &str) -> Self {
        self.set_value(value);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn value(&self) -> String {
        self.value.iter().collect()
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Position of the field inside its window.
    #[inline]
    pub fn position(&self) -> (u16, u16) {
        (self.row, self.col)
    }

    #[inline]
    pub fn length(&self) -> u16 {
        self.length
    }

    pub fn set_geometry(&mut self, row: u16, col: u16, length: u16) {
        self.row = row;
        self.col = col;
        self.length = length;
        self.fit_offset();
    }

    /// Replace the value, cursor at the end. Chars outside the charset are
    /// dropped and the rest truncated to the limit.
    pub fn set_value(&mut self, value: &str) {
        self.value = value
            .chars()
            .filter(|&ch| self.accepts(ch))
            .take(self.limit)
            .collect();
        self.cursor = self.value.len();
        self.offset = 0;
        self.fit_offset();
        self.update_suggestion();
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Insert `ch` at the cursor if the limit and charset allow it.
    pub fn insert(&mut self, ch: char) -> bool {
        if self.value.len() >= self.limit || !self.accepts(ch) {
            return false;
        }
        self.value.insert(self.cursor, ch);
        self.cursor += 1;
        self.fit_offset();
        self.update_suggestion();
        true
    }

    fn accepts(&self, ch: char) -> bool {
        !ch.is_control() && self.charset.as_ref().is_none_or(|set| set.contains(ch))
    }

    /// Remove the char before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        self.value.remove(self.cursor);
        self.fit_offset();
        self.update_suggestion();
    }

    /// Remove the char under the cursor; at the end, the last char.
    pub fn delete(&mut self) {
        if self.value.is_empty() {
            return;
        }
        if self.cursor == self.value.len() {
            self.backspace();
            return;
        }
        self.value.remove(self.cursor);
        self.fit_offset();
        self.update_suggestion();
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
        self.fit_offset();
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.len());
        self.fit_offset();
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
        self.fit_offset();
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.len();
        self.fit_offset();
    }

    /// Replace the value with the current suggestion.
    pub fn confirm_suggestion(&mut self) {
        if let Some(suggestion) = self.suggestion.take() {
            self.set_value(&suggestion);
        }
    }

    // =========================================================================
    // Key handling
    // =========================================================================

    /// Apply `key`. `None` means the key is not for this field.
    pub fn handle_key(&mut self, key: &Key) -> Option<FieldEvent> {
        match key {
            Key::Rune(ch) => {
                self.insert(*ch);
                Some(FieldEvent::Update)
            }
            Key::Escape(escape) => self.handle_escape(escape),
            Key::Control(code) => self.handle_control(*code),
            Key::Mouse(_) => None,
        }
    }

    fn handle_escape(&mut self, key: &EscapeKey) -> Option<FieldEvent> {
        match key {
            EscapeKey::Down if !self.modal => Some(self.leave(FieldEvent::Forward)),
            EscapeKey::Up | EscapeKey::BackTab if !self.modal => {
                Some(self.leave(FieldEvent::Backward))
            }
            EscapeKey::Left => {
                self.move_left();
                Some(FieldEvent::Update)
            }
            EscapeKey::Right => {
                if self.cursor == self.value.len() && self.suggestion.is_some() {
                    self.confirm_suggestion();
                } else {
                    self.move_right();
                }
                Some(FieldEvent::Update)
            }
            EscapeKey::Home | EscapeKey::PageUp => {
                self.move_home();
                Some(FieldEvent::Update)
            }
            EscapeKey::End | EscapeKey::PageDown => {
                self.move_end();
                Some(FieldEvent::Update)
            }
            EscapeKey::Delete => {
                if self.cursor < self.value.len() {
                    self.value.remove(self.cursor);
                    self.fit_offset();
                    self.update_suggestion();
                }
                Some(FieldEvent::Update)
            }
            _ => None,
        }
    }

    fn handle_control(&mut self, code: u8) -> Option<FieldEvent> {
        match code {
            ESC if self.modal => Some(self.leave(FieldEvent::Cancel)),
            TAB => self.complete(),
            BACKSPACE => {
                self.backspace();
                Some(FieldEvent::Update)
            }
            DELETE => {
                self.delete();
                Some(FieldEvent::Update)
            }
            ENTER => {
                if !self.enter_to_confirm && self.suggestion.is_some() {
                    self.confirm_suggestion();
                    return Some(FieldEvent::Update);
                }
                let event = if self.modal {
                    FieldEvent::Confirm
                } else {
                    FieldEvent::Forward
                };
                Some(self.leave(event))
            }
            _ => None,
        }
    }

    /// Tab: extend to the common prefix of all candidates, cycle through
    /// them, or move focus on when there is nothing left to complete.
    fn complete(&mut self) -> Option<FieldEvent> {
        let candidates = self.candidates();
        let value = self.value();

        match candidates.len() {
            0 => self.focus_forward(),
            1 if candidates[0] == value => self.focus_forward(),
            1 => {
                self.set_value(&candidates[0]);
                Some(FieldEvent::Update)
            }
            _ => {
                let prefix = common_prefix(&candidates);
                if prefix.chars().count() > self.value.len() {
                    self.set_value(&prefix);
                } else {
                    let next = self
                        .suggestion
                        .as_ref()
                        .and_then(|s| candidates.iter().position(|c| c == s))
                        .map_or(0, |i| (i + 1) % candidates.len());
                    self.suggestion = Some(candidates[next].clone());
                }
                Some(FieldEvent::Update)
            }
        }
    }

    fn focus_forward(&mut self) -> Option<FieldEvent> {
        if self.modal {
            return None;
        }
        Some(self.leave(FieldEvent::Forward))
    }

    fn leave(&mut self, event: FieldEvent) -> FieldEvent {
        self.active = false;
        event
    }

    fn candidates(&self) -> Vec<String> {
        match &self.suggester {
            Some(suggester) if !self.value.is_empty() => suggester(&self.value()),
            _ => Vec::new(),
        }
    }

    /// First candidate that would change the value.
    fn update_suggestion(&mut self) {
        let value = self.value();
        self.suggestion = self.candidates().into_iter().find(|c| *c != value);
    }

    // =========================================================================
    // Scrolling
    // =========================================================================

    /// Move `offset` the minimum amount that keeps the cursor in view.
    fn fit_offset(&mut self) {
        let room = self.length.saturating_sub(1) as usize;
        if self.cursor < self.offset {
            self.offset = self.cursor;
        }
        while self.offset < self.cursor
            && chars_width(&self.value[self.offset..self.cursor]) > room
        {
            self.offset += 1;
        }
    }

    /// Columns from the first visible char to the cursor.
    fn cells_to_cursor(&self) -> u16 {
        chars_width(&self.value[self.offset..self.cursor]) as u16
    }

    /// Visible part of the value and its width in columns.
    fn visible(&self) -> (String, u16) {
        let mut text = String::new();
        let mut used = 0u16;
        for &ch in &self.value[self.offset..] {
            let w = char_width(ch);
            if used + w > self.length {
                break;
            }
            text.push(ch);
            used += w;
        }
        (text, used)
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    /// Draw the visible value, the suggestion tail while active, and pad the
    /// rest of the field.
    pub fn draw<D: Drawable>(&self, drawable: &mut D) {
        let (row, col) = (self.row, self.col);
        let (text, mut used) = self.visible();

        drawable.with_color(FIELD_COLOR, |d| {
            d.move_print(row, col, &text);
        });

        if self.active {
            if let Some(suggestion) = &self.suggestion {
                let mut tail = String::new();
                for ch in suggestion.chars().skip(self.value.len()) {
                    let w = char_width(ch);
                    if used + w > self.length {
                        break;
                    }
                    tail.push(ch);
                    used += w;
                }
                let at = col + used - string_width(&tail) as u16;
                drawable.with_color(SUGGESTION_COLOR, |d| {
                    d.move_print(row, at, &tail);
                });
            }
        }

        if used < self.length {
            drawable.with_color(FIELD_COLOR, |d| {
                d.line(row, col + used, ' ', self.length - used);
            });
        }
    }

    /// Rest the hardware cursor at the edit position.
    pub fn set_cursor<D: Drawable + ?Sized>(&self, drawable: &mut D) {
        drawable.move_to(self.row, self.col + self.cells_to_cursor());
    }
}

/// Longest char-wise prefix shared by every string.
pub fn common_prefix(strings: &[String]) -> String {
    let Some((first, rest)) = strings.split_first() else {
        return String::new();
    };
    let mut len = first.chars().count();
    for s in rest {
        len = first
            .chars()
            .zip(s.chars())
            .take(len)
            .take_while(|(a, b)| a == b)
            .count();
    }
    first.chars().take(len).collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawable::Screen;

    fn type_str(field: &mut InputField, text: &str) {
        for ch in text.chars() {
            field.handle_key(&Key::Rune(ch));
        }
    }

    fn colors() -> Vec<String> {
        vec!["red".into(), "green".into(), "grey".into(), "greyish".into()]
    }

    fn suggest(value: &str) -> Vec<String> {
        colors().into_iter().filter(|c| c.starts_with(value)).collect()
    }

    #[test]
    fn test_insert_respects_limit_and_charset() {
        let mut field = InputField::new(0, 0, 10).limit(3).charset("0123456789");
        type_str(&mut field, "1a2b34");
        assert_eq!(field.value(), "123");
        assert_eq!(field.cursor(), 3);
    }

    #[test]
    fn test_suggestions_obey_charset() {
        let mut field = InputField::new(0, 0, 10)
            .limit(4)
            .charset("0123456789")
            .suggester(|_| vec!["1a2b3c4d5".to_string()]);
        type_str(&mut field, "9");
        field.handle_key(&Key::Control(TAB));
        assert_eq!(field.value(), "1234");

        let field = InputField::new(0, 0, 10).charset("0123456789").with_value("4x2");
        assert_eq!(field.value(), "42");
        assert_eq!(field.cursor(), 2);
    }

    #[test]
    fn test_editing_in_the_middle() {
        let mut field = InputField::new(0, 0, 10);
        type_str(&mut field, "abd");
        field.handle_key(&Key::Escape(EscapeKey::Left));
        field.handle_key(&Key::Rune('c'));
        assert_eq!(field.value(), "abcd");
        assert_eq!(field.cursor(), 3);

        field.handle_key(&Key::Control(BACKSPACE));
        assert_eq!(field.value(), "abd");
        field.handle_key(&Key::Escape(EscapeKey::Home));
        field.handle_key(&Key::Control(DELETE));
        assert_eq!(field.value(), "bd");
        field.handle_key(&Key::Escape(EscapeKey::End));
        field.handle_key(&Key::Control(DELETE));
        assert_eq!(field.value(), "b");
    }

    #[test]
    fn test_offset_keeps_cursor_visible() {
        let mut field = InputField::new(0, 0, 4);
        type_str(&mut field, "abcdef");
        assert_eq!(field.cursor(), 6);
        assert_eq!(field.offset(), 3);
        assert_eq!(field.cells_to_cursor(), 3);

        field.handle_key(&Key::Escape(EscapeKey::Home));
        assert_eq!(field.offset(), 0);
    }

    #[test]
    fn test_offset_accounts_for_wide_chars() {
        let mut field = InputField::new(0, 0, 5);
        type_str(&mut field, "日本語");
        // 6 columns of text, 4 columns of room before the cursor.
        assert_eq!(field.offset(), 1);
        assert_eq!(field.cells_to_cursor(), 4);
    }

    #[test]
    fn test_modal_keys() {
        let mut field = InputField::new(0, 0, 10).modal(true).enter_to_confirm(true);
        field.set_active(true);
        assert_eq!(field.handle_key(&Key::Escape(EscapeKey::Down)), None);
        assert_eq!(field.handle_key(&Key::Control(TAB)), None);
        assert_eq!(field.handle_key(&Key::Control(ENTER)), Some(FieldEvent::Confirm));
        assert!(!field.is_active());
        assert_eq!(field.handle_key(&Key::Control(ESC)), Some(FieldEvent::Cancel));
    }

    #[test]
    fn test_focus_keys() {
        let mut field = InputField::new(0, 0, 10);
        assert_eq!(field.handle_key(&Key::Escape(EscapeKey::Down)), Some(FieldEvent::Forward));
        assert_eq!(field.handle_key(&Key::Escape(EscapeKey::Up)), Some(FieldEvent::Backward));
        assert_eq!(field.handle_key(&Key::Escape(EscapeKey::BackTab)), Some(FieldEvent::Backward));
        assert_eq!(field.handle_key(&Key::Control(TAB)), Some(FieldEvent::Forward));
        assert_eq!(field.handle_key(&Key::Control(ENTER)), Some(FieldEvent::Forward));
        assert_eq!(field.handle_key(&Key::Control(ESC)), None);
    }

    #[test]
    fn test_tab_completes_common_prefix_then_cycles() {
        let mut field = InputField::new(0, 0, 10).suggester(suggest);
        type_str(&mut field, "g");
        assert_eq!(field.suggestion(), Some("green"));

        assert_eq!(field.handle_key(&Key::Control(TAB)), Some(FieldEvent::Update));
        assert_eq!(field.value(), "gre");
        assert_eq!(field.suggestion(), Some("green"));

        field.handle_key(&Key::Control(TAB));
        assert_eq!(field.value(), "gre");
        assert_eq!(field.suggestion(), Some("grey"));

        field.handle_key(&Key::Control(TAB));
        assert_eq!(field.suggestion(), Some("greyish"));
        field.handle_key(&Key::Control(TAB));
        assert_eq!(field.suggestion(), Some("green"));
    }

    #[test]
    fn test_single_candidate_completes_then_moves_on() {
        let mut field = InputField::new(0, 0, 10).suggester(suggest);
        type_str(&mut field, "r");
        assert_eq!(field.handle_key(&Key::Control(TAB)), Some(FieldEvent::Update));
        assert_eq!(field.value(), "red");
        assert_eq!(field.handle_key(&Key::Control(TAB)), Some(FieldEvent::Forward));
    }

    #[test]
    fn test_right_and_enter_accept_suggestion() {
        let mut field = InputField::new(0, 0, 10).suggester(suggest);
        type_str(&mut field, "re");
        field.handle_key(&Key::Escape(EscapeKey::Right));
        assert_eq!(field.value(), "red");

        let mut field = InputField::new(0, 0, 10).suggester(suggest);
        type_str(&mut field, "gree");
        assert_eq!(field.handle_key(&Key::Control(ENTER)), Some(FieldEvent::Update));
        assert_eq!(field.value(), "green");
    }

    #[test]
    fn test_common_prefix() {
        assert_eq!(common_prefix(&[]), "");
        assert_eq!(common_prefix(&["abc".into()]), "abc");
        assert_eq!(common_prefix(&["grey".into(), "green".into()]), "gre");
        assert_eq!(common_prefix(&["a".into(), "abc".into(), "b".into()]), "");
        assert_eq!(common_prefix(&["日本".into(), "日曜".into()]), "日");
    }

    #[test]
    fn test_draw_pads_and_shows_suggestion_tail() {
        let mut screen = Screen::with_output(1, 8, Box::new(std::io::sink()));
        let mut field = InputField::new(0, 1, 6).suggester(suggest);
        field.set_active(true);
        type_str(&mut field, "gre");
        field.draw(&mut screen);
        field.set_cursor(&mut screen);

        assert_eq!(screen.row_text(0), " green  ");
        assert_eq!(screen.cell(0, 1).unwrap().color, Some(FIELD_COLOR));
        assert_eq!(screen.cell(0, 4).unwrap().color, Some(SUGGESTION_COLOR));
        assert_eq!(screen.cell(0, 6).unwrap().color, Some(FIELD_COLOR));
        assert_eq!(screen.cell(0, 7).unwrap().color, None);
        assert_eq!(screen.cursor(), Some((0, 4)));
    }
}
