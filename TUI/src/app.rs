use std::time::Duration;

use chrono::Local;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};
use log::{debug, info, warn};
use ratatui::layout::Rect;
use reqwest::Client;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::action::Action;
use crate::bubble::BubbleField;
use crate::citation::{format_citation, CitationStyle, PageMetadata};
use crate::clipboard::{sanitize_paste, ClipboardProvider};
use crate::config::{Config, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::fetch::{build_client, fetch_metadata};
use crate::fluid::FluidGrid;
use crate::layout::ViewLayout;
use crate::ui_state::UIState;

/// Metadata delivered by a finished fetch task.
struct FetchResult {
    id: u64,
    metadata: PageMetadata,
}

/// The fetch currently in flight. Style is captured when the request starts.
struct PendingFetch {
    id: u64,
    url: String,
    style: String,
    task: JoinHandle<()>,
}

pub struct App {
    pub ui: UIState,
    pub config: Config,
    pub fluid: FluidGrid,
    pub bubbles: BubbleField,
    pub animation_frame: usize,
    pub animation_tick: u64,
    pub should_quit: bool,
    status_expires_at: u64,
    clipboard: Box<dyn ClipboardProvider>,
    runtime: Handle,
    client: Client,
    results_tx: UnboundedSender<FetchResult>,
    results_rx: UnboundedReceiver<FetchResult>,
    pending: Option<PendingFetch>,
    next_request_id: u64,
}

impl App {
    pub fn new(config: Config, runtime: Handle, clipboard: Box<dyn ClipboardProvider>) -> Self {
        let fluid = FluidGrid::new(config.grid_size, config.grid_size, config.viscosity, config.initial_fill);
        let bubbles = BubbleField::new(config.bubble_count, CANVAS_WIDTH, CANVAS_HEIGHT);
        let client = build_client(Duration::from_secs(config.fetch_timeout_secs), &config.user_agent);
        let (results_tx, results_rx) = mpsc::unbounded_channel();

        if CitationStyle::from_name(&config.default_style).is_none() {
            warn!("unknown default style {:?}", config.default_style);
        }

        Self {
            ui: UIState::new(config.default_style.clone()),
            fluid,
            bubbles,
            animation_frame: 0,
            animation_tick: 0,
            should_quit: false,
            status_expires_at: 0,
            clipboard,
            runtime,
            client,
            results_tx,
            results_rx,
            pending: None,
            next_request_id: 0,
            config,
        }
    }

    /// Advance animation one frame and pick up finished fetches.
    pub fn tick(&mut self) {
        self.animation_tick += 1;
        self.animation_frame = (self.animation_frame + 1) % self.config.animation_frame_mod;

        self.poll_fetch();
        self.bubbles.update();
        self.fluid.step();

        if self.ui.status_message.is_some() && self.animation_tick >= self.status_expires_at {
            self.ui.status_message = None;
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.ui.status_message = Some(message.into());
        self.status_expires_at = self.animation_tick + self.config.status_timeout_ticks;
    }

    pub fn handle_event(&mut self, event: Event, area: Rect) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse, area),
            Event::Paste(text) => {
                if self.ui.input_focused {
                    self.ui.input.push_str(&sanitize_paste(&text));
                }
            }
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.dispatch(Action::Quit);
            return;
        }

        if !self.ui.input_focused {
            if key.code == KeyCode::Esc {
                self.dispatch(Action::Quit);
            }
            return;
        }

        match key.code {
            KeyCode::Esc => self.dispatch(Action::BlurInput),
            KeyCode::Enter => self.dispatch(Action::Generate),
            KeyCode::Tab => self.dispatch(Action::CycleStyle),
            KeyCode::Backspace => {
                self.ui.input.pop();
            }
            KeyCode::Char('v') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(text) = self.clipboard.get_text() {
                    self.ui.input.push_str(&sanitize_paste(&text));
                }
            }
            KeyCode::Char(c)
                if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.ui.input.push(c);
            }
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, area: Rect) {
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                if let Some((x, y)) = self.grid_cell(mouse.column, mouse.row, area) {
                    self.fluid.disturb(x, y, self.config.mouse_influence);
                }
            }
            MouseEventKind::Down(_) => {
                self.ui.mouse_down = true;
                if let Some((x, y)) = self.grid_cell(mouse.column, mouse.row, area) {
                    self.fluid.set(x, y, self.config.press_value);
                }
                for action in ViewLayout::new(area).hit_test(mouse.column, mouse.row) {
                    self.dispatch(action);
                }
            }
            MouseEventKind::Up(_) => {
                self.ui.mouse_down = false;
            }
            _ => {}
        }
    }

    fn grid_cell(&self, col: u16, row: u16, area: Rect) -> Option<(usize, usize)> {
        let col = col.checked_sub(area.x)?;
        let row = row.checked_sub(area.y)?;
        self.fluid.cell_at(col, row, area.width, area.height)
    }

    pub fn dispatch(&mut self, action: Action) {
        debug!("action {:?}", action);
        match action {
            Action::FocusInput => self.ui.input_focused = true,
            Action::BlurInput => self.ui.input_focused = false,
            Action::Paste => {
                // Failed or empty reads leave an empty field
                self.ui.input = self
                    .clipboard
                    .get_text()
                    .map(|text| sanitize_paste(&text))
                    .unwrap_or_default();
            }
            Action::Generate => self.start_fetch(),
            Action::CycleStyle => {
                let next = CitationStyle::from_name(&self.ui.style)
                    .map(CitationStyle::next)
                    .unwrap_or(CitationStyle::Apa);
                self.ui.style = next.name().to_string();
                self.set_status(format!("Style: {}", self.ui.style));
            }
            Action::CopyCitation => {
                if self.ui.citation.is_empty() {
                    return;
                }
                let citation = self.ui.citation.clone();
                if self.clipboard.set_text(&citation) {
                    self.set_status("Citation copied");
                } else {
                    self.set_status("Clipboard unavailable");
                }
            }
            Action::Clear => {
                self.cancel_fetch();
                self.ui.input.clear();
                self.ui.citation.clear();
            }
            Action::Quit => self.should_quit = true,
        }
    }

    pub fn is_fetching(&self) -> bool {
        self.pending.is_some()
    }

    fn start_fetch(&mut self) {
        // Fetched and cited exactly as typed
        let url = self.ui.input.clone();
        if url.trim().is_empty() {
            self.set_status("Enter a URL first");
            return;
        }

        self.cancel_fetch();

        self.next_request_id += 1;
        let id = self.next_request_id;
        let client = self.client.clone();
        let tx = self.results_tx.clone();
        let task_url = url.clone();

        let task = self.runtime.spawn(async move {
            let metadata = fetch_metadata(&client, &task_url).await;
            // Receiver only goes away with the app
            let _ = tx.send(FetchResult { id, metadata });
        });

        info!("fetching {} (request {})", url, id);
        self.pending = Some(PendingFetch {
            id,
            url,
            style: self.ui.style.clone(),
            task,
        });
        self.ui.is_loading = true;
    }

    fn cancel_fetch(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!("cancelling request {}", pending.id);
            pending.task.abort();
        }
        self.ui.is_loading = false;
    }

    /// Apply finished fetches. Results from cancelled requests are dropped.
    pub fn poll_fetch(&mut self) {
        while let Ok(result) = self.results_rx.try_recv() {
            let is_current = self.pending.as_ref().is_some_and(|p| p.id == result.id);
            if !is_current {
                debug!("dropping stale result for request {}", result.id);
                continue;
            }
            let Some(pending) = self.pending.take() else {
                continue;
            };

            self.ui.citation = format_citation(&result.metadata, &pending.url, &pending.style, &Local::now());
            self.ui.is_loading = false;
            if result.metadata == PageMetadata::invalid_url() {
                self.set_status("Could not fetch page");
            } else {
                self.set_status("Citation ready");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crossterm::event::{KeyEventState, MouseButton};

    fn app_with(clipboard: MemoryClipboard, runtime: Handle) -> App {
        let config = Config {
            fetch_timeout_secs: 3,
            ..Config::default()
        };
        App::new(config, runtime, Box::new(clipboard))
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn ctrl(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    const AREA: Rect = Rect {
        x: 0,
        y: 0,
        width: 100,
        height: 30,
    };

    fn click(app: &mut App, rect: Rect) {
        let (x, y) = (rect.x + rect.width / 2, rect.y + rect.height / 2);
        app.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), x, y), AREA);
        app.handle_event(mouse(MouseEventKind::Up(MouseButton::Left), x, y), AREA);
    }

    async fn wait_for_fetch(app: &mut App) {
        for _ in 0..600 {
            app.tick();
            if !app.is_fetching() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("fetch did not finish");
    }

    #[tokio::test]
    async fn test_typing_requires_focus() {
        let mut app = app_with(MemoryClipboard::default(), Handle::current());
        app.handle_event(key(KeyCode::Char('x')), AREA);
        assert_eq!(app.ui.input, "");

        click(&mut app, ViewLayout::new(AREA).input);
        assert!(app.ui.input_focused);

        for c in "ab".chars() {
            app.handle_event(key(KeyCode::Char(c)), AREA);
        }
        app.handle_event(key(KeyCode::Backspace), AREA);
        app.handle_event(key(KeyCode::Char('c')), AREA);
        assert_eq!(app.ui.input, "ac");

        app.handle_event(key(KeyCode::Backspace), AREA);
        app.handle_event(key(KeyCode::Backspace), AREA);
        app.handle_event(key(KeyCode::Backspace), AREA);
        assert_eq!(app.ui.input, "");
    }

    #[tokio::test]
    async fn test_click_outside_input_blurs() {
        let mut app = app_with(MemoryClipboard::default(), Handle::current());
        click(&mut app, ViewLayout::new(AREA).input);
        assert!(app.ui.input_focused);
        click(&mut app, ViewLayout::new(AREA).citation);
        assert!(!app.ui.input_focused);
        assert!(!app.ui.mouse_down);
    }

    #[tokio::test]
    async fn test_paste_button_replaces_input() {
        let clipboard = MemoryClipboard::with_text(" https://www.example.com/article\0 ");
        let mut app = app_with(clipboard, Handle::current());
        app.ui.input = "old".to_string();
        click(&mut app, ViewLayout::new(AREA).paste);
        assert_eq!(app.ui.input, "https://www.example.com/article");
    }

    #[tokio::test]
    async fn test_paste_button_with_empty_clipboard_clears_input() {
        let mut app = app_with(MemoryClipboard::default(), Handle::current());
        app.ui.input = "old".to_string();
        click(&mut app, ViewLayout::new(AREA).paste);
        assert_eq!(app.ui.input, "");
    }

    #[tokio::test]
    async fn test_ctrl_v_and_bracketed_paste_append() {
        let mut app = app_with(MemoryClipboard::with_text("example.com"), Handle::current());
        app.ui.input_focused = true;
        app.handle_event(key(KeyCode::Char('a')), AREA);
        app.handle_event(ctrl('v'), AREA);
        app.handle_event(Event::Paste("/x\n".to_string()), AREA);
        assert_eq!(app.ui.input, "aexample.com/x");
    }

    #[tokio::test]
    async fn test_copy_and_clear() {
        let clipboard = MemoryClipboard::default();
        let mut app = app_with(clipboard.clone(), Handle::current());
        let layout = ViewLayout::new(AREA);

        click(&mut app, layout.copy);
        assert_eq!(clipboard.text(), None);

        app.ui.citation = "Jane Doe. (2022). My Title.".to_string();
        click(&mut app, layout.copy);
        assert_eq!(clipboard.text().as_deref(), Some("Jane Doe. (2022). My Title."));
        assert_eq!(app.ui.status_message.as_deref(), Some("Citation copied"));

        app.ui.input = "https://example.com".to_string();
        click(&mut app, layout.clear);
        assert_eq!(app.ui.input, "");
        assert_eq!(app.ui.citation, "");
    }

    #[tokio::test]
    async fn test_cycle_style() {
        let mut app = app_with(MemoryClipboard::default(), Handle::current());
        assert_eq!(app.ui.style, "MLA");
        click(&mut app, ViewLayout::new(AREA).style);
        assert_eq!(app.ui.style, "Chicago");
        app.ui.input_focused = true;
        app.handle_event(key(KeyCode::Tab), AREA);
        assert_eq!(app.ui.style, "APA");

        app.ui.style = "Harvard".to_string();
        app.dispatch(Action::CycleStyle);
        assert_eq!(app.ui.style, "APA");
    }

    #[tokio::test]
    async fn test_generate_with_empty_input_does_nothing() {
        let mut app = app_with(MemoryClipboard::default(), Handle::current());
        click(&mut app, ViewLayout::new(AREA).generate);
        assert!(!app.is_fetching());
        assert_eq!(app.ui.citation, "");
        assert_eq!(app.ui.status_message.as_deref(), Some("Enter a URL first"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_enter_generates_sentinel_citation_for_unreachable_host() {
        let mut app = app_with(MemoryClipboard::default(), Handle::current());
        app.ui.input_focused = true;
        app.ui.input = "http://127.0.0.1:1/x".to_string();

        app.handle_event(key(KeyCode::Enter), AREA);
        assert!(app.is_fetching());
        assert!(app.ui.is_loading);

        wait_for_fetch(&mut app).await;

        assert!(!app.ui.is_loading);
        assert!(
            app.ui
                .citation
                .starts_with("Unknown. \"Invalid URL.\" Unknown, Unknown, http://127.0.0.1:1/x. Accessed "),
            "{}",
            app.ui.citation
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_style_is_captured_at_request_time() {
        let mut app = app_with(MemoryClipboard::default(), Handle::current());
        app.ui.style = "Chicago".to_string();
        app.ui.input = "http://127.0.0.1:1/x".to_string();
        app.dispatch(Action::Generate);
        app.ui.style = "APA".to_string();

        wait_for_fetch(&mut app).await;

        assert_eq!(
            app.ui.citation,
            "Unknown. \"Invalid URL.\" Unknown. Unknown. http://127.0.0.1:1/x."
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_url_is_cited_as_typed() {
        let mut app = app_with(MemoryClipboard::default(), Handle::current());
        app.ui.style = "Chicago".to_string();
        app.ui.input = "  http://127.0.0.1:1/x".to_string();
        app.dispatch(Action::Generate);

        wait_for_fetch(&mut app).await;

        assert_eq!(
            app.ui.citation,
            "Unknown. \"Invalid URL.\" Unknown. Unknown.   http://127.0.0.1:1/x."
        );
    }

    #[tokio::test]
    async fn test_blank_input_does_not_fetch() {
        let mut app = app_with(MemoryClipboard::default(), Handle::current());
        app.ui.input = "   ".to_string();
        app.dispatch(Action::Generate);
        assert!(!app.is_fetching());
        assert_eq!(app.ui.status_message.as_deref(), Some("Enter a URL first"));
    }

    #[tokio::test]
    async fn test_any_button_press_disturbs_and_hits() {
        let mut app = app_with(MemoryClipboard::default(), Handle::current());
        app.handle_event(mouse(MouseEventKind::Down(MouseButton::Right), 50, 15), AREA);
        assert_eq!(app.fluid.value(50, 50), Some(1.0));
        assert!(app.ui.mouse_down);
        app.handle_event(mouse(MouseEventKind::Up(MouseButton::Right), 50, 15), AREA);
        assert!(!app.ui.mouse_down);

        let (x, y) = {
            let input = ViewLayout::new(AREA).input;
            (input.x + 1, input.y + 1)
        };
        app.handle_event(mouse(MouseEventKind::Down(MouseButton::Middle), x, y), AREA);
        assert!(app.ui.input_focused);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_clear_cancels_pending_fetch() {
        let mut app = app_with(MemoryClipboard::default(), Handle::current());
        app.ui.input = "http://127.0.0.1:1/x".to_string();
        app.dispatch(Action::Generate);
        app.dispatch(Action::Clear);
        assert!(!app.is_fetching());
        assert!(!app.ui.is_loading);

        for _ in 0..20 {
            app.tick();
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(app.ui.citation, "");
    }

    #[tokio::test]
    async fn test_pointer_disturbs_interior_only() {
        let mut app = app_with(MemoryClipboard::default(), Handle::current());
        let before = app.fluid.value(50, 50).unwrap();

        // Column 50 of 100 and row 15 of 30 both map to grid cell 50.
        app.handle_event(mouse(MouseEventKind::Moved, 50, 15), AREA);
        let moved = app.fluid.value(50, 50).unwrap();
        assert!((moved - before - 0.7).abs() < 1e-6);

        app.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 50, 15), AREA);
        assert_eq!(app.fluid.value(50, 50), Some(1.0));
        assert!(app.ui.mouse_down);

        // Corner maps to a border cell: untouched.
        app.handle_event(mouse(MouseEventKind::Moved, 0, 0), AREA);
        assert_eq!(app.fluid.value(0, 0), Some(0.05));
    }

    #[tokio::test]
    async fn test_quit_keys() {
        let mut app = app_with(MemoryClipboard::default(), Handle::current());
        app.ui.input_focused = true;
        app.handle_event(key(KeyCode::Esc), AREA);
        assert!(!app.ui.input_focused);
        assert!(!app.should_quit);
        app.handle_event(key(KeyCode::Esc), AREA);
        assert!(app.should_quit);

        let mut app = app_with(MemoryClipboard::default(), Handle::current());
        app.ui.input_focused = true;
        app.handle_event(ctrl('c'), AREA);
        assert!(app.should_quit);
        assert_eq!(app.ui.input, "");
    }

    #[tokio::test]
    async fn test_status_message_expires() {
        let mut app = app_with(MemoryClipboard::default(), Handle::current());
        app.set_status("hello");
        for _ in 0..app.config.status_timeout_ticks - 1 {
            app.tick();
        }
        assert!(app.ui.status_message.is_some());
        app.tick();
        assert!(app.ui.status_message.is_none());
    }
}
