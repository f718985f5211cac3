//! Interactive session: one engine kept alive across many commands

use anyhow::Result;
use clap::Parser;
use smash_core::Engine;
use std::io::{self, BufRead, Write};
use tracing::debug;

use crate::commands::{self, Command};
use crate::render;

/// One line typed at the session prompt
#[derive(Parser, Debug)]
#[command(name = "smash", no_binary_name = true, disable_version_flag = true)]
struct SessionLine {
    #[command(subcommand)]
    command: Command,
}

/// Split a line into words. Double or single quotes group words; there
/// are no escapes.
pub fn split_line(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_word = false;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(current);
    }

    words
}

pub fn run(engine: &mut Engine) -> Result<()> {
    println!("Bug Smasher session. Type 'help' for commands, 'quit' to leave.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("smash> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let words = split_line(&line);

        match words.first().map(String::as_str) {
            None => continue,
            Some("quit") | Some("exit") => break,
            _ => {}
        }

        // Close lapsed undo windows and pick up a date rollover before
        // acting on the command.
        let mut pending = engine.tick();
        pending.extend(engine.spawn_due_habits_today());
        if !pending.is_empty() {
            render::events(engine, &pending);
        }

        let parsed = match SessionLine::try_parse_from(&words) {
            Ok(parsed) => parsed,
            Err(e) => {
                // Help and usage errors alike
                let _ = e.print();
                continue;
            }
        };

        debug!(command = ?parsed.command, "Session command");
        if let Err(e) = commands::execute(engine, parsed.command) {
            println!("Error: {:#}", e);
        }
    }

    Ok(())
}
