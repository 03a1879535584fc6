//! Directory browser built from cellpane panels.
//!
//! A full-screen list of the entries in a directory, refreshed by a
//! background poller. `/` opens a filter prompt with name completion, `p`
//! changes the poll interval, F5 re-reads now, space selects, `q` or Ctrl-C quits.
//!
//! ```sh
//! cargo run --example panels -- --dir /tmp --log-level trace
//! ```

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use cellpane::widgets::int_prompt;
use cellpane::{
    Attr, Color, ColorPair, Config, Context, Drawable, EscapeKey, Identifiable, InputReader, Key,
    List, ManagerHandle, Panel, Prompt, RepeatingWorker, Screen, Terminal, WindowId,
    WindowManager, WorkerList,
};
use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "panels", about = "cellpane directory browser demo")]
struct Args {
    /// Directory to list
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file (the terminal is the display)
    #[arg(long, default_value = "cellpane.log")]
    log_file: PathBuf,

    #[arg(long, default_value = "debug")]
    log_level: LevelFilter,
}

fn main() -> cellpane::Result<()> {
    let args = Args::parse();

    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = fs::File::create(&args.log_file) {
        let _ = WriteLogger::init(args.log_level, log_config, log_file);
    }

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    log::info!("listing {}", args.dir.display());

    let mut terminal = Terminal::enter(&config.terminal)?;
    let mut wm = WindowManager::new(Screen::init()?);

    let handle = wm.handle();
    let _input = InputReader::spawn(handle.clone(), &config.input)?;
    cellpane::watch_resize(handle.clone())?;

    let browser = Browser::new(wm.screen(), handle, args.dir, config.workers.poll_interval());
    wm.add_window(Box::new(browser));

    let result = wm.run();
    terminal.restore()?;
    if let Err(e) = &result {
        log::error!("exiting: {e}");
    }
    result
}

// =============================================================================
// Entries
// =============================================================================

#[derive(Debug, Clone)]
struct Entry {
    id: i64,
    name: String,
    size: u64,
    is_dir: bool,
}

impl Identifiable for Entry {
    fn id(&self) -> i64 {
        self.id
    }
}

fn read_entries(dir: &Path) -> std::io::Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let meta = entry.metadata()?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        entries.push(Entry {
            id: hasher.finish() as i64,
            name,
            size: meta.len(),
            is_dir: meta.is_dir(),
        });
    }
    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
    Ok(entries)
}

fn format_entry(entry: &Entry, width: u16, print: &mut dyn FnMut(u16, &str)) {
    let marker = if entry.is_dir { "/" } else { "" };
    print(1, &format!("{}{}", entry.name, marker));
    if !entry.is_dir {
        let size = format!("{:>10}", entry.size);
        print(width.saturating_sub(11), &size);
    }
}

// =============================================================================
// Browser panel
// =============================================================================

/// Results of prompts, applied when the browser is back on top.
enum Action {
    Filter(String),
    Interval(u64),
}

const ERROR_COLOR: ColorPair = ColorPair::new(Color::White, Color::Red);

struct Browser {
    window: WindowId,
    dir: PathBuf,
    list: List<Entry>,
    entries: Vec<Entry>,
    filter: String,
    error: Option<String>,

    handle: ManagerHandle,
    interval: Duration,
    workers: WorkerList,
    updates: Receiver<Result<Vec<Entry>, String>>,
    updates_tx: Sender<Result<Vec<Entry>, String>>,
    actions: Receiver<Action>,
    actions_tx: Sender<Action>,
}

impl Browser {
    fn new(screen: &mut Screen, handle: ManagerHandle, dir: PathBuf, interval: Duration) -> Self {
        let window = screen.sub_window(None, 0, 0, screen.height(), screen.width());
        let mut list = List::new(0, Box::new(format_entry));
        list.margin_top = 1;
        list.margin_bottom = 1;
        list.fit(&screen.window(window));

        let (updates_tx, updates) = mpsc::channel();
        let (actions_tx, actions) = mpsc::channel();
        let mut browser = Self {
            window,
            dir,
            list,
            entries: Vec::new(),
            filter: String::new(),
            error: None,
            handle,
            interval,
            workers: WorkerList::new(),
            updates,
            updates_tx,
            actions,
            actions_tx,
        };
        browser.rebuild_workers();
        browser
    }

    fn rebuild_workers(&mut self) {
        self.workers.stop();
        let mut workers = WorkerList::new();

        let dir = self.dir.clone();
        let tx = self.updates_tx.clone();
        let handle = self.handle.clone();
        workers.push(
            RepeatingWorker::new(self.interval, move || {
                let update = read_entries(&dir).map_err(|e| format!("{}: {}", dir.display(), e));
                if tx.send(update).is_ok() {
                    handle.request_redraw();
                }
            })
            .named("panels-poller"),
        );
        self.workers = workers;
    }

    /// Apply poller results. Only the render loop calls this.
    fn drain_updates(&mut self) {
        let mut changed = false;
        while let Ok(update) = self.updates.try_recv() {
            match update {
                Ok(entries) => {
                    self.entries = entries;
                    self.error = None;
                    changed = true;
                }
                Err(e) => {
                    log::warn!("poll failed: {e}");
                    self.error = Some(e);
                }
            }
        }
        if changed {
            self.apply_filter();
        }
    }

    fn apply_filter(&mut self) {
        let visible = self
            .entries
            .iter()
            .filter(|e| e.name.contains(&self.filter))
            .cloned()
            .collect();
        self.list.set_items(visible);
    }

    fn drain_actions(&mut self) {
        while let Ok(action) = self.actions.try_recv() {
            match action {
                Action::Filter(filter) => {
                    log::debug!("filter set to {filter:?}");
                    self.filter = filter;
                    self.apply_filter();
                }
                Action::Interval(secs) => {
                    self.interval = Duration::from_secs(secs.max(1));
                    log::debug!("poll interval set to {:?}", self.interval);
                    self.rebuild_workers();
                }
            }
        }
    }

    fn open_filter(&mut self, ctx: &mut Context<'_>) {
        let names: Vec<String> = self.entries.iter().map(|e| e.name.clone()).collect();
        let tx = self.actions_tx.clone();
        let prompt = Prompt::builder("Filter")
            .parent(self.window)
            .limit(30)
            .initial(self.filter.clone())
            .suggester(move |value| {
                names
                    .iter()
                    .filter(|n| n.starts_with(value))
                    .cloned()
                    .collect()
            })
            .on_confirm(move |value, ctx| {
                let _ = tx.send(Action::Filter(value.to_string()));
                ctx.close_self();
            })
            .build(ctx.screen());
        ctx.open(Box::new(prompt));
    }

    fn open_interval(&mut self, ctx: &mut Context<'_>) {
        let tx = self.actions_tx.clone();
        let prompt = int_prompt(
            ctx.screen(),
            Some(self.window),
            "Poll seconds",
            self.interval.as_secs() as i64,
            true,
            move |secs, _ctx| {
                let _ = tx.send(Action::Interval(secs.max(1) as u64));
            },
            |e, _ctx| log::warn!("bad interval: {e}"),
        );
        ctx.open(Box::new(prompt));
    }
}

impl Panel for Browser {
    fn draw(&mut self, screen: &mut Screen) {
        self.drain_updates();

        let mut canvas = screen.window(self.window);
        let (height, width) = (canvas.height(), canvas.width());
        canvas.erase();

        canvas.with_attributes(Attr::REVERSED, |c| {
            c.line(0, 0, ' ', width);
            c.move_print(0, 1, &self.dir.display().to_string());
        });

        self.list.draw(&mut canvas);

        let status_row = height.saturating_sub(1);
        match &self.error {
            Some(error) => canvas.with_color(ERROR_COLOR, |c| {
                c.line(status_row, 0, ' ', width);
                c.move_print(status_row, 1, error);
            }),
            None => {
                let status = format!(
                    "{} entries, {} selected | filter: {:?} | every {}s | / filter  p interval  q quit",
                    self.list.len(),
                    self.list.selection().len(),
                    self.filter,
                    self.interval.as_secs(),
                );
                canvas.with_attributes(Attr::BOLD, |c| {
                    c.move_print(status_row, 1, &status);
                });
            }
        }
    }

    fn resize(&mut self, screen: &mut Screen) {
        screen.resize_window(self.window, screen.height(), screen.width());
        self.list.fit(&screen.window(self.window));
    }

    fn is_full_screen(&self) -> bool {
        true
    }

    fn set_active(&mut self, active: bool, ctx: &mut Context<'_>) {
        if active {
            self.drain_actions();
            ctx.screen().set_cursor_visible(false);
            if let Err(e) = self.workers.start() {
                self.error = Some(format!("poller: {e}"));
            }
        } else {
            self.workers.stop();
        }
    }

    fn on_input(&mut self, key: &Key, ctx: &mut Context<'_>) {
        if self.list.navigate(key) {
            ctx.request_redraw();
            return;
        }
        match key {
            Key::Rune(' ') => {
                self.list.select();
                self.list.move_cursor(1);
            }
            Key::Rune('a') => self.list.select_all(),
            Key::Rune('i') => self.list.invert_selection(),
            Key::Rune('c') => self.list.clear_selection(),
            Key::Rune('/') => self.open_filter(ctx),
            Key::Rune('p') => self.open_interval(ctx),
            Key::Rune('q') => ctx.request_exit(),
            Key::Escape(EscapeKey::F(5)) => {
                self.rebuild_workers();
                if let Err(e) = self.workers.start() {
                    self.error = Some(format!("poller: {e}"));
                }
            }
            _ => return,
        }
        ctx.request_redraw();
    }

    fn on_close(&mut self, screen: &mut Screen) {
        self.workers.stop();
        screen.detach(self.window);
    }
}
