//! Result formatting for one-shot searches.

use crate::search::executor::{FileMatch, FuzzySearchResult};
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// `"3 results"`, `"1 result"`, `"500+ results"` when truncated/incomplete
pub fn plural(what: &str, count: usize, is_complete: bool) -> String {
    format!(
        "{}{} {}{}",
        count,
        if is_complete { "" } else { "+" },
        what,
        if count == 1 { "" } else { "s" }
    )
}

/// Print ranked matches with the matched bytes highlighted, followed by a
/// summary line (and a metrics line in debug mode).
pub fn print_matches(result: &FuzzySearchResult, color: bool, debug: bool) -> io::Result<()> {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);

    for file_match in &result.matches {
        print_match_line(&mut stdout, file_match)?;
    }

    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
    writeln!(
        stdout,
        "{} / {}",
        plural("result", result.results_count(), result.is_complete),
        plural("total file", result.total_file_count, true),
    )?;
    stdout.reset()?;

    if debug {
        writeln!(
            stdout,
            "{} candidates, {:.0}% filter false positives, {:.1}ms",
            result.candidate_count,
            result.false_positive_ratio * 100.0,
            result.elapsed.as_secs_f64() * 1000.0,
        )?;
    }

    Ok(())
}

/// One path with its matched byte runs highlighted
fn print_match_line(stdout: &mut StandardStream, file_match: &FileMatch) -> io::Result<()> {
    let text = &file_match.text;
    let mut cursor = 0usize;

    for (start, end) in position_runs(&file_match.positions, text.len()) {
        if start > cursor {
            write!(stdout, "{}", &text[cursor..start])?;
        }
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
        write!(stdout, "{}", &text[start..end])?;
        stdout.reset()?;
        cursor = end;
    }

    if cursor < text.len() {
        write!(stdout, "{}", &text[cursor..])?;
    }
    writeln!(stdout)
}

/// Coalesce sorted byte offsets into half-open `[start, end)` runs,
/// discarding anything past the text length.
pub fn position_runs(positions: &[u32], len: usize) -> Vec<(usize, usize)> {
    let mut runs: Vec<(usize, usize)> = Vec::new();

    for &pos in positions {
        let pos = pos as usize;
        if pos >= len {
            continue;
        }
        match runs.last_mut() {
            Some((_, end)) if *end == pos => *end = pos + 1,
            _ => runs.push((pos, pos + 1)),
        }
    }
    runs
}
