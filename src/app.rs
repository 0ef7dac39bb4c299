use std::{io, time::Duration};

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::{
    cli::Snapshot,
    constants::TIME_SETTINGS,
    view::{GlyphMode, Timeline},
};

mod event_handlers;
mod render_views;
mod ui_helpers;

#[derive(Clone, Copy, Debug)]
pub struct UiOptions {
    pub timeline: Timeline,
    pub show_legend: bool,
    pub glyph_mode: GlyphMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ViewMode {
    AllActivities,
    SingleActivity,
}

struct App {
    snapshot: Snapshot,
    timeline: Timeline,
    glyph_mode: GlyphMode,
    view_mode: ViewMode,
    selected_index: usize,
    cursor: Option<(usize, usize)>,
    show_legend: bool,
    show_help: bool,
    scroll: u16,
}

impl App {
    fn new(snapshot: Snapshot, options: UiOptions) -> Self {
        let mut app = Self {
            snapshot,
            timeline: options.timeline,
            glyph_mode: options.glyph_mode,
            view_mode: ViewMode::AllActivities,
            selected_index: 0,
            cursor: None,
            show_legend: options.show_legend,
            show_help: false,
            scroll: 0,
        };
        app.reset_cursor();
        app
    }

    fn in_single_view(&self) -> bool {
        matches!(self.view_mode, ViewMode::SingleActivity)
    }

    fn open_single(&mut self, index: usize) {
        if index < self.snapshot.activities.len() {
            self.selected_index = index;
            self.view_mode = ViewMode::SingleActivity;
            self.scroll = 0;
        }
    }

    fn open_all(&mut self) {
        self.view_mode = ViewMode::AllActivities;
        self.scroll = 0;
    }

    fn reset_cursor(&mut self) {
        self.cursor = self.snapshot.grid.position_of(self.snapshot.today);
    }

    fn set_timeline(&mut self, timeline: Timeline) {
        self.timeline = timeline;
        self.snapshot.rebuild_grid(timeline);
        self.reset_cursor();
        debug!(timeline = timeline.label(), weeks = self.snapshot.grid.weeks(), "rebuilt grid");
    }
}

pub fn run_ui(snapshot: Snapshot, options: UiOptions) -> Result<(), io::Error> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(snapshot, options);
    let poll_rate = Duration::from_millis(TIME_SETTINGS.poll_ms);
    let mut render_needed = true;

    let result = loop {
        if render_needed {
            if let Err(e) = terminal.draw(|f| app.draw_frame(f)) {
                break Err(e);
            }
            render_needed = false;
        }

        match event::poll(poll_rate) {
            Ok(false) => {}
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if app.handle_key(key) {
                        break Ok(());
                    }
                    render_needed = true;
                }
                Ok(Event::Resize(_, _)) => render_needed = true,
                Ok(_) => {}
                Err(e) => break Err(e),
            },
            Err(e) => break Err(e),
        }
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
