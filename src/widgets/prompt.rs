//! Centered modal dialog with a title and a single input field.
//!
//! ```text
//! lqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqk
//! x Speed limit: 120                x
//! xqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqx
//! x RETURN - Confirm | ESC - Cancel x
//! mqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqj
//! ```
//!
//! The dialog is a [`Panel`]: open it with [`Context::open`] or
//! [`WindowManager::add_window`](crate::manager::WindowManager::add_window).
//! While it is on top, keys go to its field. Confirm and cancel hand the
//! [`Context`] to the owner's callbacks, which decide whether to close it.

use std::num::ParseIntError;

use crate::drawable::{Drawable, Screen, WindowId};
use crate::input::Key;
use crate::manager::{Context, Panel, WidgetId};
use crate::renderer::string_width;
use crate::widgets::input_field::{FieldEvent, InputField, Suggester};

/// Reminder printed on the bottom line.
pub const CONTROLS: &str = "RETURN - Confirm | ESC - Cancel";

const HEIGHT: u16 = 5;
const FIELD: WidgetId = WidgetId(0);
const DEFAULT_LIMIT: usize = 20;

type ConfirmFn = Box<dyn FnMut(&str, &mut Context<'_>)>;
type CancelFn = Box<dyn FnMut(&mut Context<'_>)>;

// =============================================================================
// Geometry
// =============================================================================

/// `(height, width, row, col)` of a prompt centered in a parent of the given
/// size.
pub fn measure(parent: (u16, u16), title: &str, limit: usize) -> (u16, u16, u16, u16) {
    let title_width = string_width(title);
    let width = (4 + title_width + 1 + limit + 1).max(string_width(CONTROLS) + 4);
    let width = width.min(u16::MAX as usize) as u16;
    let (parent_height, parent_width) = parent;
    let row = parent_height.saturating_sub(HEIGHT) / 2;
    let col = parent_width.saturating_sub(width) / 2;
    (HEIGHT, width, row, col)
}

// =============================================================================
// Builder
// =============================================================================

pub struct PromptBuilder {
    title: String,
    parent: Option<WindowId>,
    limit: usize,
    charset: Option<String>,
    initial: String,
    suggester: Option<Suggester>,
    on_confirm: Option<ConfirmFn>,
    on_cancel: Option<CancelFn>,
}

impl PromptBuilder {
    /// Center inside `parent` instead of the whole screen.
    pub fn parent(mut self, parent: WindowId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    pub fn initial(mut self, value: impl Into<String>) -> Self {
        self.initial = value.into();
        self
    }

    /// Completion candidates for the field; Tab completes.
    pub fn suggester(mut self, f: impl Fn(&str) -> Vec<String> + 'static) -> Self {
        self.suggester = Some(Box::new(f));
        self
    }

    /// Called with the value on Enter. Without one, Enter closes the prompt.
    pub fn on_confirm(mut self, f: impl FnMut(&str, &mut Context<'_>) + 'static) -> Self {
        self.on_confirm = Some(Box::new(f));
        self
    }

    /// Called on ESC. Without one, ESC closes the prompt.
    pub fn on_cancel(mut self, f: impl FnMut(&mut Context<'_>) + 'static) -> Self {
        self.on_cancel = Some(Box::new(f));
        self
    }

    /// Allocate the dialog's window and build the panel.
    pub fn build(self, screen: &mut Screen) -> Prompt {
        let parent_size = parent_size(screen, self.parent);
        let (height, width, row, col) = measure(parent_size, &self.title, self.limit);
        let window = screen.sub_window(self.parent, row, col, height, width);

        let field_col = 2 + string_width(&self.title) as u16 + 1;
        let mut field = InputField::new(1, field_col, self.limit as u16 + 1)
            .modal(true)
            .enter_to_confirm(true)
            .limit(self.limit);
        if let Some(charset) = self.charset {
            field = field.charset(charset);
        }
        if let Some(suggester) = self.suggester {
            field = field.suggester(suggester);
        }
        let field = field.with_value(&self.initial);

        Prompt {
            title: self.title,
            parent: self.parent,
            window,
            limit: self.limit,
            field,
            on_confirm: self.on_confirm.unwrap_or_else(|| Box::new(close_on_confirm)),
            on_cancel: self.on_cancel.unwrap_or_else(|| Box::new(close_on_cancel)),
        }
    }
}

// =============================================================================
// Prompt
// =============================================================================

pub struct Prompt {
    title: String,
    parent: Option<WindowId>,
    window: WindowId,
    limit: usize,
    field: InputField,
    on_confirm: ConfirmFn,
    on_cancel: CancelFn,
}

impl Prompt {
    pub fn builder(title: impl Into<String>) -> PromptBuilder {
        PromptBuilder {
            title: title.into(),
            parent: None,
            limit: DEFAULT_LIMIT,
            charset: None,
            initial: String::new(),
            suggester: None,
            on_confirm: None,
            on_cancel: None,
        }
    }

    #[inline]
    pub fn window(&self) -> WindowId {
        self.window
    }

    #[inline]
    pub fn field(&self) -> &InputField {
        &self.field
    }

    pub fn value(&self) -> String {
        self.field.value()
    }
}

impl Panel for Prompt {
    fn draw(&mut self, screen: &mut Screen) {
        let mut canvas = screen.window(self.window);
        let width = canvas.width();

        canvas.erase();
        canvas.draw_box();
        canvas.move_print(1, 2, &format!("{} ", self.title));
        self.field.draw(&mut canvas);
        canvas.hline(2, 1, width.saturating_sub(2));

        let inner = width.saturating_sub(4);
        let controls = string_width(CONTROLS) as u16;
        canvas.move_print(3, 2 + inner.saturating_sub(controls) / 2, CONTROLS);

        self.field.set_cursor(&mut canvas);
    }

    fn resize(&mut self, screen: &mut Screen) {
        let parent_size = parent_size(screen, self.parent);
        let (height, width, row, col) = measure(parent_size, &self.title, self.limit);
        screen.resize_window(self.window, height, width);
        screen.move_window(self.window, row, col);
        screen.refresh_window(self.window);
    }

    fn set_active(&mut self, active: bool, ctx: &mut Context<'_>) {
        self.field.set_active(active);
        ctx.screen().set_cursor_visible(active);
        if active {
            ctx.push_reader(FIELD);
        } else {
            ctx.pop_reader(FIELD);
        }
    }

    fn on_input(&mut self, _key: &Key, _ctx: &mut Context<'_>) {}

    fn on_widget_input(&mut self, widget: WidgetId, key: &Key, ctx: &mut Context<'_>) {
        if widget != FIELD {
            return;
        }
        match self.field.handle_key(key) {
            Some(FieldEvent::Confirm) => {
                let value = self.field.value();
                (self.on_confirm)(&value, ctx);
                self.field.set_active(true);
            }
            Some(FieldEvent::Cancel) => {
                (self.on_cancel)(ctx);
                self.field.set_active(true);
            }
            Some(_) => {}
            None => return,
        }
        ctx.request_redraw();
    }

    fn on_close(&mut self, screen: &mut Screen) {
        screen.detach(self.window);
    }
}

fn close_on_confirm(_value: &str, ctx: &mut Context<'_>) {
    ctx.close_self();
}

fn close_on_cancel(ctx: &mut Context<'_>) {
    ctx.close_self();
}

fn parent_size(screen: &Screen, parent: Option<WindowId>) -> (u16, u16) {
    match parent.and_then(|p| screen.window_rect(p)) {
        Some((_, _, height, width)) => (height, width),
        None => (screen.height(), screen.width()),
    }
}

// =============================================================================
// Integer prompt
// =============================================================================

/// Prompt for a non-negative integer of up to six digits.
///
/// `value` is pre-filled when `show_value` is set and it is positive. An empty
/// answer is 0. The prompt closes itself before either callback runs.
pub fn int_prompt(
    screen: &mut Screen,
    parent: Option<WindowId>,
    title: &str,
    value: i64,
    show_value: bool,
    mut on_finish: impl FnMut(i64, &mut Context<'_>) + 'static,
    mut on_error: impl FnMut(ParseIntError, &mut Context<'_>) + 'static,
) -> Prompt {
    let mut builder = Prompt::builder(title).limit(6).charset("0123456789");
    if let Some(parent) = parent {
        builder = builder.parent(parent);
    }
    if show_value && value > 0 {
        builder = builder.initial(value.to_string());
    }
    builder
        .on_confirm(move |text, ctx| {
            ctx.close_self();
            if text.is_empty() {
                on_finish(0, ctx);
                return;
            }
            match text.parse::<i64>() {
                Ok(n) => on_finish(n, ctx),
                Err(e) => on_error(e, ctx),
            }
        })
        .build(screen)
}

// =============================================================================
// Tests
// =============================================================================
