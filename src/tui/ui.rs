use crate::fsm::FsmStateKind;
use crate::output::{plural, position_runs};
use crate::search::executor::FileMatch;
use crate::tui::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Query input
            Constraint::Min(5),    // Results
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    draw_query_input(f, app, chunks[0]);
    draw_results(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);
}

fn draw_query_input(f: &mut Frame, app: &App, area: Rect) {
    let input = Paragraph::new(app.query.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Fuzzy file (Enter: select, Ctrl+O: more results, Esc: quit) "),
        );

    f.render_widget(input, area);
    f.set_cursor_position((area.x + app.query.len() as u16 + 1, area.y + 1));
}

fn draw_results(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = match app.state_kind() {
        FsmStateKind::Empty | FsmStateKind::Downloading => {
            vec![ListItem::new(
                "Downloading file list... usually fast, and cached for next time",
            )]
        }
        FsmStateKind::Failed => {
            let message = format!("Error: {}", app.error_message().unwrap_or("unknown"));
            vec![ListItem::new(message).style(Style::default().fg(Color::Red))]
        }
        FsmStateKind::Indexing | FsmStateKind::Ready => match &app.result {
            Some(result) if result.results_count() > 0 => {
                let mut items: Vec<ListItem> = result
                    .matches
                    .iter()
                    .enumerate()
                    .map(|(i, m)| result_item(m, i == app.focus_index))
                    .collect();
                if !result.is_complete && app.state_kind() == FsmStateKind::Ready {
                    items.push(
                        ListItem::new("(...truncated, Ctrl+O shows more results)")
                            .style(Style::default().fg(Color::DarkGray)),
                    );
                }
                items
            }
            _ => vec![ListItem::new(format!("No files matching '{}'", app.query))],
        },
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Results ({}) ", app.results_count())),
    );

    f.render_widget(list, area);
}

/// One result row with its matched bytes highlighted
fn result_item(file_match: &FileMatch, focused: bool) -> ListItem<'_> {
    let text = &file_match.text;
    let highlight = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let mut spans: Vec<Span> = Vec::new();
    let mut cursor = 0usize;
    for (start, end) in position_runs(&file_match.positions, text.len()) {
        if start > cursor {
            spans.push(Span::raw(&text[cursor..start]));
        }
        spans.push(Span::styled(&text[start..end], highlight));
        cursor = end;
    }
    if cursor < text.len() {
        spans.push(Span::raw(&text[cursor..]));
    }

    let style = if focused {
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    ListItem::new(Line::from(spans)).style(style)
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let footer = if app.debug {
        match &app.result {
            Some(result) => format!(
                "{:.0}% fp | {:.1}ms | {} candidates | filter fp est {:.2}%",
                result.false_positive_ratio * 100.0,
                result.elapsed.as_secs_f64() * 1000.0,
                result.candidate_count,
                app.estimated_false_positive_rate() * 100.0,
            ),
            None => String::from("no results yet"),
        }
    } else {
        let results = match &app.result {
            Some(result) => plural("result", result.results_count(), result.is_complete),
            None => plural("result", 0, true),
        };
        match app.progress() {
            Some((indexed, total)) => format!(
                "{} | indexing {}/{} ({}%)",
                results,
                indexed,
                total,
                if total == 0 { 100 } else { indexed * 100 / total },
            ),
            None => format!(
                "{} | {}",
                results,
                plural("total file", app.total_file_count(), true)
            ),
        }
    };

    let status = Paragraph::new(footer).style(Style::default().fg(Color::Cyan));
    f.render_widget(status, area);
}
