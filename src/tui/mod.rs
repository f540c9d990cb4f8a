//! Interactive picker.
//!
//! The event loop doubles as the cooperative scheduler for the index
//! lifecycle: every turn performs exactly one FSM step, then polls input
//! with a short timeout and redraws. Indexing a huge repository therefore
//! never blocks typing or cursor movement for more than one chunk.

mod app;
mod ui;

use crate::fsm::FuzzyFinder;
use anyhow::Result;
use app::App;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

pub use app::DEFAULT_MAX_RESULTS;

/// Run the picker until the user selects a path or quits.
/// Returns the selected path, if any.
pub fn run(finder: FuzzyFinder, initial_query: Option<String>, debug: bool) -> Result<Option<String>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(finder, initial_query, debug);
    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.map(|()| app.selection)
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    <B as ratatui::backend::Backend>::Error: Send + Sync + 'static,
{
    loop {
        // One cooperative scheduling turn per loop iteration
        app.on_tick();

        terminal.draw(|f| ui::draw(f, app))?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        // Press only: Windows reports both press and release
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('q')) => return Ok(()),
            (KeyModifiers::CONTROL, KeyCode::Char('o')) => app.show_more(),
            (KeyModifiers::CONTROL, KeyCode::Char('n') | KeyCode::Char('j')) => app.move_focus(1),
            (KeyModifiers::CONTROL, KeyCode::Char('p') | KeyCode::Char('k')) => app.move_focus(-1),
            (KeyModifiers::NONE | KeyModifiers::SHIFT, code) => match code {
                KeyCode::Esc => {
                    if app.query.is_empty() {
                        return Ok(());
                    }
                    app.clear_query();
                }
                KeyCode::Enter => {
                    app.select_focused();
                    if app.selection.is_some() {
                        return Ok(());
                    }
                }
                KeyCode::Down | KeyCode::Tab => app.move_focus(1),
                KeyCode::Up | KeyCode::BackTab => app.move_focus(-1),
                KeyCode::PageDown => app.move_focus(10),
                KeyCode::PageUp => app.move_focus(-10),
                KeyCode::Char(c) => app.push_query_char(c),
                KeyCode::Backspace => app.pop_query_char(),
                _ => {}
            },
            _ => {}
        }
    }
}
