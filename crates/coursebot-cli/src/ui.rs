//! Interactive prompt utilities

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use std::io::{self, IsTerminal, Write};
use coursebot_core::Result;

const PROMPT: &str = "ask>";

/// Display startup banner for a course
pub fn display_banner(course: &str, engine: &str) {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = std::cmp::min(60, terminal_width.saturating_sub(4)).max(40);
    let inner = banner_width - 2;

    let top_border = format!("┌{}┐", "─".repeat(inner));
    let bottom_border = format!("└{}┘", "─".repeat(inner));
    let empty_line = format!("│{}│", " ".repeat(inner));

    println!();
    println!("{}", top_border.blue());
    println!("{}", empty_line.blue());

    let lines = [
        format!("coursebot • {}", course),
        String::new(),
        "Ask about the syllabus or lecture content.".to_string(),
        "Answers cite the source PDF page.".to_string(),
        String::new(),
        format!("engine: {}", engine),
    ];

    for line in lines {
        let width = line.chars().count();
        let content = format!("│  {}{}│", line, " ".repeat(inner.saturating_sub(width + 2)));
        println!("{}", content.blue());
    }

    println!("{}", empty_line.blue());
    println!("{}", bottom_border.blue());
    println!();
    println!(
        "{}",
        "💡 Tip: Type a question in natural language, or 'help' for commands".dimmed()
    );
    println!();
}

/// Handle input with question history navigation
pub async fn handle_input_with_history(history: &mut Vec<String>) -> Result<String> {
    // Piped input is read line by line without raw mode
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok("exit".to_string());
        }
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(input);
    }

    enable_raw_mode()?;
    let result = read_line_raw(history);
    disable_raw_mode()?;
    println!();
    result
}

fn read_line_raw(history: &mut Vec<String>) -> Result<String> {
    let mut input = String::new();
    let mut history_index: Option<usize> = None;

    print!("{} ", PROMPT.green().bold());
    io::stdout().flush()?;

    loop {
        if let Event::Key(key_event) = event::read()? {
            match key_event.code {
                KeyCode::Enter => {
                    let input = input.trim().to_string();
                    if !input.is_empty() {
                        history.push(input.clone());
                    }
                    return Ok(input);
                }
                KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok("exit".to_string());
                }
                KeyCode::Char(c) => {
                    input.push(c);
                    redraw(&input)?;
                }
                KeyCode::Backspace => {
                    input.pop();
                    redraw(&input)?;
                }
                KeyCode::Up => {
                    if !history.is_empty() {
                        let new_index = match history_index {
                            None => history.len() - 1,
                            Some(idx) if idx > 0 => idx - 1,
                            Some(idx) => idx,
                        };
                        history_index = Some(new_index);
                        input = history[new_index].clone();
                        redraw(&input)?;
                    }
                }
                KeyCode::Down => {
                    if let Some(idx) = history_index {
                        if idx + 1 < history.len() {
                            history_index = Some(idx + 1);
                            input = history[idx + 1].clone();
                        } else {
                            history_index = None;
                            input.clear();
                        }
                        redraw(&input)?;
                    }
                }
                KeyCode::Esc => return Ok(String::new()),
                _ => {}
            }
        }
    }
}

fn redraw(input: &str) -> Result<()> {
    print!("\r\x1b[2K{} {}", PROMPT.green().bold(), input);
    io::stdout().flush()?;
    Ok(())
}

/// Display help message
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!("  {} - Ask a question about the course", "question".green());
    println!("  {} - Write an HTML citation report for the last answer", "save <file>".green());
    println!("  {} - Show this help message", "help".green());
    println!("  {} - Exit the application", "exit/quit".green());
    println!();
    println!("{}", "Examples:".bold());
    println!("  What are the grading policies?");
    println!("  What is ecosystem ecology?");
    println!("  What does the I=PAT equation describe?");
}
