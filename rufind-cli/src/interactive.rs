//! Interactive fuzzy front end.
//!
//! On a real terminal this runs a raw-mode line editor where Tab cycles
//! through completion suggestions drawn from the session's pre-indexed
//! paths. When stdin is not a terminal (pipes, scripts, tests) it falls
//! back to a plain line reader with the same query semantics.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use colored::Colorize;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType},
    tty::IsTty,
};
use rufind::InteractiveSession;

use crate::output::render_preview;

const PROMPT: &str = "rufind> ";

pub fn run(session: &InteractiveSession, use_color: bool) -> Result<()> {
    let banner = "Entering interactive fuzzy mode (Ctrl-C to exit)...";
    if use_color {
        println!("{}", banner.cyan());
    } else {
        println!("{}", banner);
    }

    if io::stdin().is_tty() {
        raw_loop(session, use_color)
    } else {
        plain_loop(session, use_color)
    }
}

fn plain_loop(session: &InteractiveSession, use_color: bool) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{}", PROMPT);
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        run_query(session, query, use_color);
    }
    Ok(())
}

fn raw_loop(session: &InteractiveSession, use_color: bool) -> Result<()> {
    loop {
        let Some(query) = read_query(session)? else {
            break;
        };
        let query = query.trim().to_string();
        if query.is_empty() {
            continue;
        }
        run_query(session, &query, use_color);
    }
    Ok(())
}

/// Previews up to the session's limit of records for one query
fn run_query(session: &InteractiveSession, query: &str, use_color: bool) {
    match session.run_query(query) {
        Ok(records) if records.is_empty() => {
            let message = "No matches found.";
            if use_color {
                println!("{}", message.red());
            } else {
                println!("{}", message);
            }
        }
        Ok(records) => {
            for record in &records {
                println!("{}", render_preview(record, use_color));
            }
        }
        // A bad query pattern is reported, not fatal to the session
        Err(err) => eprintln!("{}", err),
    }
    println!();
}

/// Reads one query line in raw mode. Returns `None` when the user quits
/// with Ctrl-C or Esc.
fn read_query(session: &InteractiveSession) -> Result<Option<String>> {
    enable_raw_mode()?;
    let result = edit_line(session);
    disable_raw_mode()?;
    println!();
    result
}

fn edit_line(session: &InteractiveSession) -> Result<Option<String>> {
    let mut stdout = io::stdout();
    let mut buffer = String::new();
    // While Tab-cycling, remember the text typed before completion started
    // and the index of the suggestion currently shown
    let mut completion: Option<(String, usize)> = None;

    redraw(&mut stdout, &buffer)?;
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(None);
            }
            KeyCode::Esc => return Ok(None),
            KeyCode::Enter => return Ok(Some(buffer)),
            KeyCode::Backspace => {
                buffer.pop();
                completion = None;
            }
            KeyCode::Tab => {
                let (seed, next) = match completion.take() {
                    Some((seed, index)) => (seed, index + 1),
                    None => (buffer.clone(), 0),
                };
                let suggestions = session.suggestions(&seed);
                if !suggestions.is_empty() {
                    let index = next % suggestions.len();
                    buffer = suggestions[index].to_string();
                    completion = Some((seed, index));
                }
            }
            KeyCode::Char(ch) => {
                buffer.push(ch);
                completion = None;
            }
            _ => {}
        }
        redraw(&mut stdout, &buffer)?;
    }
}

fn redraw(stdout: &mut io::Stdout, buffer: &str) -> Result<()> {
    execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    print!("{}{}", PROMPT, buffer);
    stdout.flush()?;
    Ok(())
}
