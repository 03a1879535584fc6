//! Scrollable, pageable, selectable list.
//!
//! Items are kept in order; the selection is a set of identities, so it
//! survives [`List::set_items`] as long as the same identity is still present,
//! wherever it moved to.
//!
//! Scroll invariant, maintained by every mutation:
//! `offset <= cursor < offset + rows` and `offset <= max(0, len - rows)`.

use crate::drawable::Drawable;
use crate::input::{EscapeKey, Key};
use crate::types::{Attr, Identifiable};

/// Renders one item. Receives the item, the usable width and a printer
/// taking a column offset and text.
pub type Formatter<T> = Box<dyn Fn(&T, u16, &mut dyn FnMut(u16, &str))>;

pub struct List<T> {
    items: Vec<T>,
    cursor: usize,
    offset: usize,
    selection: Vec<i64>,
    rows: usize,
    formatter: Formatter<T>,

    pub margin_top: u16,
    pub margin_bottom: u16,
    pub margin_left: u16,
    pub margin_right: u16,
}

impl<T: Identifiable> List<T> {
    /// Empty list showing `rows` items at a time.
    pub fn new(rows: usize, formatter: Formatter<T>) -> Self {
        Self {
            items: Vec::new(),
            cursor: 0,
            offset: 0,
            selection: Vec::new(),
            rows,
            formatter,
            margin_top: 0,
            margin_bottom: 0,
            margin_left: 0,
            margin_right: 0,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Cursor index, `None` when the list is empty.
    #[inline]
    pub fn cursor(&self) -> Option<usize> {
        (!self.items.is_empty()).then_some(self.cursor)
    }

    /// Index of the first visible item.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn visible_rows(&self) -> usize {
        self.rows
    }

    /// Selected identities in selection order.
    #[inline]
    pub fn selection(&self) -> &[i64] {
        &self.selection
    }

    pub fn is_selected(&self, id: i64) -> bool {
        self.selection.contains(&id)
    }

    /// Item under the cursor.
    pub fn current(&self) -> Option<&T> {
        self.items.get(self.cursor)
    }

    /// Selected items if there are any, else the item under the cursor.
    pub fn get_selection(&self) -> Vec<&T> {
        if self.selection.is_empty() {
            return self.current().into_iter().collect();
        }
        self.selection
            .iter()
            .filter_map(|id| self.items.iter().find(|item| item.id() == *id))
            .collect()
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Change the number of visible rows.
    pub fn set_visible_rows(&mut self, rows: usize) {
        self.rows = rows;
        self.update_offset();
    }

    /// Size the visible rows to `drawable` minus the vertical margins.
    pub fn fit<D: Drawable + ?Sized>(&mut self, drawable: &D) {
        let rows = drawable
            .height()
            .saturating_sub(self.margin_top + self.margin_bottom);
        self.set_visible_rows(rows as usize);
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Move the cursor one step in the sign of `direction`.
    pub fn move_cursor(&mut self, direction: i32) {
        if self.items.is_empty() {
            return;
        }
        if direction < 0 {
            self.cursor = self.cursor.saturating_sub(1);
        } else if direction > 0 {
            self.cursor = (self.cursor + 1).min(self.items.len() - 1);
        }
        self.update_offset();
    }

    /// Move cursor and offset by one page in the sign of `direction`.
    pub fn page(&mut self, direction: i32) {
        if self.items.is_empty() {
            return;
        }
        let rows = self.page_rows();
        if direction < 0 {
            self.offset = self.offset.saturating_sub(rows);
            self.cursor = self.cursor.saturating_sub(rows);
        } else if direction > 0 {
            self.offset = (self.offset + rows).min(self.max_offset());
            self.cursor = (self.cursor + rows).min(self.items.len() - 1);
        }
        self.update_offset();
    }

    /// Standard list keys: arrows step, PageUp/PageDown page, Home/End jump.
    ///
    /// Returns true if the key was consumed.
    pub fn navigate(&mut self, key: &Key) -> bool {
        match key {
            Key::Escape(EscapeKey::Up) => self.move_cursor(-1),
            Key::Escape(EscapeKey::Down) => self.move_cursor(1),
            Key::Escape(EscapeKey::PageUp) => self.page(-1),
            Key::Escape(EscapeKey::PageDown) => self.page(1),
            Key::Escape(EscapeKey::Home) => {
                self.cursor = 0;
                self.update_offset();
            }
            Key::Escape(EscapeKey::End) => {
                self.cursor = self.items.len().saturating_sub(1);
                self.update_offset();
            }
            _ => return false,
        }
        true
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Toggle the item under the cursor.
    pub fn select(&mut self) {
        let Some(id) = self.current().map(Identifiable::id) else {
            return;
        };
        match self.selection.iter().position(|s| *s == id) {
            Some(pos) => {
                self.selection.remove(pos);
            }
            None => self.selection.push(id),
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn select_all(&mut self) {
        self.selection = self.items.iter().map(Identifiable::id).collect();
    }

    pub fn invert_selection(&mut self) {
        self.selection = self
            .items
            .iter()
            .map(Identifiable::id)
            .filter(|id| !self.selection.contains(id))
            .collect();
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Replace the items, keeping the selection by identity.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        let items = &self.items;
        self.selection.retain(|id| items.iter().any(|item| item.id() == *id));
        self.cursor = self.cursor.min(self.items.len().saturating_sub(1));
        self.update_offset();
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    /// Draw the visible items into `drawable` and blank the unused rows.
    ///
    /// The cursor row is reversed and selected rows are bold.
    pub fn draw<D: Drawable>(&self, drawable: &mut D) {
        let rows = drawable.height().saturating_sub(self.margin_bottom);
        let width = drawable
            .width()
            .saturating_sub(self.margin_left + self.margin_right);
        let x = self.margin_left;
        let mut y = self.margin_top;

        for (index, item) in self.items.iter().enumerate().skip(self.offset) {
            if y >= rows {
                break;
            }

            let mut attrs = Attr::NONE;
            if index == self.cursor {
                attrs |= Attr::REVERSED;
            }
            if self.is_selected(item.id()) {
                attrs |= Attr::BOLD;
            }

            drawable.with_attributes(attrs, |d| {
                d.line(y, x, ' ', width);
                (self.formatter)(item, width, &mut |col, text| {
                    if col < width {
                        d.move_print(y, x + col, text);
                    }
                });
            });
            y += 1;
        }

        for row in y..rows {
            drawable.line(row, x, ' ', width);
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    #[inline]
    fn page_rows(&self) -> usize {
        self.rows.max(1)
    }

    #[inline]
    fn max_offset(&self) -> usize {
        self.items.len().saturating_sub(self.page_rows())
    }

    /// Re-derive the offset so the cursor row is visible.
    fn update_offset(&mut self) {
        let rows = self.page_rows();
        if self.cursor >= self.offset + rows {
            self.offset = self.cursor + 1 - rows;
        } else if self.cursor < self.offset {
            self.offset = self.cursor;
        }
        self.offset = self.offset.min(self.max_offset());
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawable::Screen;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: i64,
        name: String,
    }

    impl Identifiable for Item {
        fn id(&self) -> i64 {
            self.id
        }
    }

    fn items(ids: &[i64]) -> Vec<Item> {
        ids.iter()
            .map(|&id| Item {
                id,
                name: format!("item{id}"),
            })
            .collect()
    }

    fn list(rows: usize) -> List<Item> {
        List::new(
            rows,
            Box::new(|item: &Item, _width: u16, print: &mut dyn FnMut(u16, &str)| {
                print(0, &item.name)
            }),
        )
    }

    fn assert_scroll_invariant(list: &List<Item>) {
        if let Some(cursor) = list.cursor() {
            let rows = list.visible_rows().max(1);
            assert!(list.offset() <= cursor, "offset {} > cursor {}", list.offset(), cursor);
            assert!(cursor < list.offset() + rows);
        }
        assert!(list.offset() <= list.len().saturating_sub(list.visible_rows().max(1)));
    }

    #[test]
    fn test_step_scrolling() {
        let mut list = list(10);
        list.set_items(items(&(0..25).collect::<Vec<_>>()));

        for _ in 0..9 {
            list.move_cursor(1);
        }
        assert_eq!(list.cursor(), Some(9));
        assert_eq!(list.offset(), 0);

        list.move_cursor(1);
        assert_eq!(list.cursor(), Some(10));
        assert_eq!(list.offset(), 1);
        assert_scroll_invariant(&list);
    }

    #[test]
    fn test_cursor_clamps_at_ends() {
        let mut list = list(3);
        list.set_items(items(&[1, 2]));
        list.move_cursor(-1);
        assert_eq!(list.cursor(), Some(0));
        list.move_cursor(1);
        list.move_cursor(1);
        assert_eq!(list.cursor(), Some(1));
    }

    #[test]
    fn test_page_moves_by_visible_rows() {
        let mut list = list(4);
        list.set_items(items(&(0..10).collect::<Vec<_>>()));

        list.page(1);
        assert_eq!(list.cursor(), Some(4));
        assert_eq!(list.offset(), 4);
        assert_scroll_invariant(&list);

        list.page(1);
        assert_eq!(list.cursor(), Some(8));
        assert_eq!(list.offset(), 6);
        assert_scroll_invariant(&list);

        list.page(-1);
        assert_eq!(list.cursor(), Some(4));
        assert_eq!(list.offset(), 2);
        assert_scroll_invariant(&list);
    }

    #[test]
    fn test_selection_survives_reorder() {
        let mut list = list(5);
        list.set_items(items(&[1, 2, 3, 4]));
        list.move_cursor(1);
        list.select();
        list.move_cursor(1);
        list.move_cursor(1);
        list.select();
        assert_eq!(list.selection(), &[2, 4]);

        list.set_items(items(&[4, 3, 1]));
        assert_eq!(list.selection(), &[4]);
        assert_eq!(list.cursor(), Some(2));
        let selected: Vec<i64> = list.get_selection().iter().map(|i| i.id).collect();
        assert_eq!(selected, vec![4]);
    }

    #[test]
    fn test_select_toggles() {
        let mut list = list(5);
        list.set_items(items(&[7]));
        list.select();
        assert!(list.is_selected(7));
        list.select();
        assert!(!list.is_selected(7));
    }

    #[test]
    fn test_get_selection_falls_back_to_cursor() {
        let mut list = list(5);
        assert!(list.get_selection().is_empty());
        list.set_items(items(&[1, 2, 3]));
        list.move_cursor(1);
        let selected: Vec<i64> = list.get_selection().iter().map(|i| i.id).collect();
        assert_eq!(selected, vec![2]);
    }

    #[test]
    fn test_select_all_and_invert() {
        let mut list = list(5);
        list.set_items(items(&[1, 2, 3]));
        list.select();
        list.invert_selection();
        assert_eq!(list.selection(), &[2, 3]);
        list.select_all();
        assert_eq!(list.selection(), &[1, 2, 3]);
        list.clear_selection();
        assert!(list.selection().is_empty());
    }

    #[test]
    fn test_shrinking_items_clamps_cursor() {
        let mut list = list(3);
        list.set_items(items(&(0..10).collect::<Vec<_>>()));
        list.page(1);
        list.page(1);
        list.set_items(items(&[0, 1]));
        assert_eq!(list.cursor(), Some(1));
        assert_eq!(list.offset(), 0);

        list.set_items(Vec::new());
        assert_eq!(list.cursor(), None);
        assert_eq!(list.offset(), 0);
    }

    #[test]
    fn test_draw_styles_rows() {
        let mut screen = Screen::with_output(4, 8, Box::new(std::io::sink()));
        let mut list = list(4);
        list.set_items(items(&[1, 2]));
        list.move_cursor(1);
        list.select_all();
        list.fit(&screen);
        list.draw(&mut screen);

        assert_eq!(screen.row_text(0), "item1   ");
        assert_eq!(screen.cell(0, 0).unwrap().attrs, Attr::BOLD);
        assert_eq!(screen.cell(1, 7).unwrap().attrs, Attr::BOLD | Attr::REVERSED);
        assert_eq!(screen.row_text(2), "        ");
        assert_eq!(screen.cell(2, 0).unwrap().attrs, Attr::NONE);
    }
}
