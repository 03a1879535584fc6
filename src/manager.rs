//! Window manager - the single render and control authority.
//!
//! # Architecture
//!
//! ```text
//! stdin reader ──┐
//! pollers ───────┼─→ mpsc<Event> ─→ WindowManager::run
//! SIGWINCH ──────┘                     │
//!                                      ├─ Key    → top of the reader stack
//!                                      ├─ Redraw → compose panels, flush
//!                                      └─ Resize → refresh screen, resize panels
//! ```
//!
//! Panels never touch the manager directly. While a panel callback runs it
//! receives a [`Context`]; requests made through it (open/close panels, push
//! or pop readers) are queued and applied in order once the callback returns.
//!
//! Redraw requests are coalesced: any number of requests made before the loop
//! gets to them produce one physical flush.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use crate::drawable::{Drawable, Screen};
use crate::error::{Error, Result};
use crate::input::{Key, CTRL_C};

// =============================================================================
// Events
// =============================================================================

/// Everything the render loop reacts to.
#[derive(Debug)]
pub enum Event {
    /// Recompose and flush.
    Redraw,
    /// A decoded key from the input reader.
    Key(Key),
    /// The terminal changed size.
    Resize,
    /// Leave the run loop.
    Exit,
    /// The input stream is gone.
    Fatal(Error),
}

/// Cloneable, `Send` handle for talking to the render loop from any thread.
#[derive(Debug, Clone)]
pub struct ManagerHandle {
    tx: Sender<Event>,
    redraw_pending: Arc<AtomicBool>,
}

impl ManagerHandle {
    /// Ask for a redraw. Requests made before the loop services the pending
    /// one are merged into it.
    pub fn request_redraw(&self) {
        if !self.redraw_pending.swap(true, Ordering::AcqRel) {
            let _ = self.tx.send(Event::Redraw);
        }
    }

    pub fn request_exit(&self) {
        let _ = self.tx.send(Event::Exit);
    }

    /// Mark a pending resize; it is handled with the next redraw.
    pub fn request_resize(&self) {
        let _ = self.tx.send(Event::Resize);
    }

    /// Deliver a key. Returns false once the loop has gone away.
    pub fn send_key(&self, key: Key) -> bool {
        self.tx.send(Event::Key(key)).is_ok()
    }

    /// Report an unrecoverable input failure.
    pub fn send_fatal(&self, error: Error) {
        let _ = self.tx.send(Event::Fatal(error));
    }
}

// =============================================================================
// Panels
// =============================================================================

/// Identifies a panel for the lifetime of the manager. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId(u64);

/// Panel-chosen tag for a sub-widget that can take input (e.g. a field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId(pub u32);

/// A top-level window managed by the [`WindowManager`].
pub trait Panel {
    /// Draw into the screen's target buffer.
    fn draw(&mut self, screen: &mut Screen);

    /// The screen changed size; recompute geometry.
    fn resize(&mut self, _screen: &mut Screen) {}

    /// A full-screen panel hides everything beneath it.
    fn is_full_screen(&self) -> bool {
        false
    }

    /// Gained or lost the top of the stack. Start or stop pollers here.
    fn set_active(&mut self, _active: bool, _ctx: &mut Context<'_>) {}

    /// Input while the panel itself is the top reader.
    fn on_input(&mut self, key: &Key, ctx: &mut Context<'_>);

    /// Input for a sub-widget this panel pushed with [`Context::push_reader`].
    fn on_widget_input(&mut self, _widget: WidgetId, key: &Key, ctx: &mut Context<'_>) {
        self.on_input(key, ctx);
    }

    /// The panel has been removed; release its windows.
    fn on_close(&mut self, _screen: &mut Screen) {}
}

/// An entry on the input-routing stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Reader {
    panel: PanelId,
    widget: Option<WidgetId>,
}

enum Command {
    Open(PanelId, Box<dyn Panel>),
    Close(PanelId),
    PushReader(Reader),
    PopReader(Reader),
    Exit,
}

// =============================================================================
// Context
// =============================================================================

/// What a panel may do from inside one of its callbacks.
pub struct Context<'a> {
    screen: &'a mut Screen,
    handle: &'a ManagerHandle,
    panel: PanelId,
    commands: &'a mut VecDeque<Command>,
    next_id: &'a mut u64,
}

impl Context<'_> {
    /// The panel this callback belongs to.
    #[inline]
    pub fn panel_id(&self) -> PanelId {
        self.panel
    }

    #[inline]
    pub fn screen(&mut self) -> &mut Screen {
        self.screen
    }

    /// Handle for background threads.
    pub fn handle(&self) -> ManagerHandle {
        self.handle.clone()
    }

    pub fn request_redraw(&self) {
        self.handle.request_redraw();
    }

    pub fn request_exit(&mut self) {
        self.commands.push_back(Command::Exit);
    }

    /// Push a panel on top of the stack once this callback returns.
    pub fn open(&mut self, panel: Box<dyn Panel>) -> PanelId {
        let id = PanelId(*self.next_id);
        *self.next_id += 1;
        self.commands.push_back(Command::Open(id, panel));
        id
    }

    pub fn close(&mut self, panel: PanelId) {
        self.commands.push_back(Command::Close(panel));
    }

    pub fn close_self(&mut self) {
        self.commands.push_back(Command::Close(self.panel));
    }

    /// Route input to `widget` of this panel until it is popped.
    pub fn push_reader(&mut self, widget: WidgetId) {
        self.commands.push_back(Command::PushReader(Reader {
            panel: self.panel,
            widget: Some(widget),
        }));
    }

    pub fn pop_reader(&mut self, widget: WidgetId) {
        self.commands.push_back(Command::PopReader(Reader {
            panel: self.panel,
            widget: Some(widget),
        }));
    }
}

// =============================================================================
// WindowManager
// =============================================================================

/// Owns the panel stack, the input-routing stack and the Screen.
pub struct WindowManager {
    screen: Screen,
    panels: Vec<(PanelId, Box<dyn Panel>)>,
    readers: Vec<Reader>,
    commands: VecDeque<Command>,
    handle: ManagerHandle,
    events: Receiver<Event>,
    resize_pending: bool,
    running: bool,
    next_id: u64,
}

impl WindowManager {
    pub fn new(screen: Screen) -> Self {
        let (tx, events) = mpsc::channel();
        Self {
            screen,
            panels: Vec::new(),
            readers: Vec::new(),
            commands: VecDeque::new(),
            handle: ManagerHandle {
                tx,
                redraw_pending: Arc::new(AtomicBool::new(false)),
            },
            events,
            resize_pending: false,
            running: true,
            next_id: 0,
        }
    }

    /// Handle for the input reader, pollers and signal watcher.
    pub fn handle(&self) -> ManagerHandle {
        self.handle.clone()
    }

    #[inline]
    pub fn screen(&mut self) -> &mut Screen {
        &mut self.screen
    }

    /// Id of the top panel.
    pub fn top(&self) -> Option<PanelId> {
        self.panels.last().map(|(id, _)| *id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.panels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Panel ids bottom to top.
    pub fn panel_ids(&self) -> Vec<PanelId> {
        self.panels.iter().map(|(id, _)| *id).collect()
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    // =========================================================================
    // Stack operations
    // =========================================================================

    /// Deactivate the current top, push `panel` and activate it.
    pub fn add_window(&mut self, panel: Box<dyn Panel>) -> PanelId {
        let id = PanelId(self.next_id);
        self.next_id += 1;
        self.push_panel(id, panel);
        self.apply_commands();
        id
    }

    /// Remove a panel and all of its readers. Only the top panel is deactivated.
    pub fn remove_window(&mut self, id: PanelId) {
        self.pop_panel(id);
        self.apply_commands();
    }

    fn push_panel(&mut self, id: PanelId, panel: Box<dyn Panel>) {
        if let Some(top) = self.top() {
            self.dispatch(top, |p, ctx| p.set_active(false, ctx));
        }
        log::debug!("opening panel {:?} (stack depth {})", id, self.panels.len() + 1);
        self.panels.push((id, panel));
        self.readers.push(Reader {
            panel: id,
            widget: None,
        });
        self.dispatch(id, |p, ctx| p.set_active(true, ctx));
        self.handle.request_redraw();
    }

    fn pop_panel(&mut self, id: PanelId) {
        let Some(index) = self.panels.iter().position(|(pid, _)| *pid == id) else {
            return;
        };
        // Panels below the top were deactivated when covered.
        let was_top = index + 1 == self.panels.len();
        if was_top {
            self.dispatch(id, |p, ctx| p.set_active(false, ctx));
        }
        let (_, mut panel) = self.panels.remove(index);
        panel.on_close(&mut self.screen);
        self.readers.retain(|r| r.panel != id);
        log::debug!("closed panel {:?} (stack depth {})", id, self.panels.len());

        if was_top {
            if let Some(top) = self.top() {
                self.dispatch(top, |p, ctx| p.set_active(true, ctx));
            }
        }
        self.handle.request_redraw();
    }

    /// Run `f` on a panel with a fresh Context.
    fn dispatch<F>(&mut self, id: PanelId, f: F)
    where
        F: FnOnce(&mut dyn Panel, &mut Context<'_>),
    {
        let Some((_, panel)) = self.panels.iter_mut().find(|(pid, _)| *pid == id) else {
            return;
        };
        let mut ctx = Context {
            screen: &mut self.screen,
            handle: &self.handle,
            panel: id,
            commands: &mut self.commands,
            next_id: &mut self.next_id,
        };
        f(panel.as_mut(), &mut ctx);
    }

    fn apply_commands(&mut self) {
        while let Some(command) = self.commands.pop_front() {
            match command {
                Command::Open(id, panel) => self.push_panel(id, panel),
                Command::Close(id) => self.pop_panel(id),
                Command::PushReader(reader) => {
                    if self.panels.iter().any(|(id, _)| *id == reader.panel) {
                        self.readers.push(reader);
                    }
                }
                Command::PopReader(reader) => {
                    if let Some(pos) = self.readers.iter().rposition(|r| *r == reader) {
                        self.readers.remove(pos);
                    }
                }
                Command::Exit => self.running = false,
            }
        }
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Deliver a key to the top of the input-routing stack.
    pub fn handle_key(&mut self, key: Key) {
        if key.is_control(CTRL_C) {
            log::debug!("interrupt requested");
            self.running = false;
            return;
        }

        let Some(reader) = self.readers.last().copied() else {
            return;
        };
        match reader.widget {
            Some(widget) => {
                self.dispatch(reader.panel, |p, ctx| p.on_widget_input(widget, &key, ctx))
            }
            None => self.dispatch(reader.panel, |p, ctx| p.on_input(&key, ctx)),
        }
        self.apply_commands();
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Flag a resize for the next redraw.
    pub fn mark_resized(&mut self) {
        self.resize_pending = true;
    }

    /// Compose every visible panel into the target buffer.
    ///
    /// Panels below the highest full-screen panel are skipped.
    pub fn draw_all(&mut self) {
        self.screen.erase();
        let start = self
            .panels
            .iter()
            .rposition(|(_, p)| p.is_full_screen())
            .unwrap_or(0);
        for (_, panel) in &mut self.panels[start..] {
            panel.draw(&mut self.screen);
        }
    }

    /// Handle a pending resize, compose and flush.
    pub fn redraw(&mut self) -> Result<()> {
        self.handle.redraw_pending.store(false, Ordering::Release);

        if self.resize_pending {
            self.resize_pending = false;
            self.screen.refresh()?;
            self.resize_panels();
            self.draw_all();
            return self.screen.redraw();
        }

        self.draw_all();
        self.screen.flush()
    }

    /// Tell every panel the screen changed size.
    pub fn resize_panels(&mut self) {
        log::debug!(
            "resizing {} panels to {}x{}",
            self.panels.len(),
            self.screen.height(),
            self.screen.width()
        );
        for (_, panel) in &mut self.panels {
            panel.resize(&mut self.screen);
        }
    }

    // =========================================================================
    // Run loop
    // =========================================================================

    /// Service events until exit is requested or input fails.
    pub fn run(&mut self) -> Result<()> {
        self.redraw()?;
        while self.running {
            let Ok(event) = self.events.recv() else {
                break;
            };
            self.handle_event(event)?;
        }
        log::debug!("window manager stopped");
        Ok(())
    }

    /// Apply one event. Fatal input errors are returned.
    pub fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Redraw => self.redraw()?,
            Event::Key(key) => self.handle_key(key),
            Event::Resize => {
                self.mark_resized();
                self.handle.request_redraw();
            }
            Event::Exit => self.running = false,
            Event::Fatal(error) => {
                log::error!("input failed: {}", error);
                self.running = false;
                return Err(error);
            }
        }
        Ok(())
    }

    /// Drain already-queued events without blocking.
    pub fn process_pending(&mut self) -> Result<()> {
        while self.running {
            let Ok(event) = self.events.try_recv() else {
                break;
            };
            self.handle_event(event)?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
