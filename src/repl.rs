// ABOUTME: Interactive prompt for Lambdora

use crate::config;
use crate::error;
use crate::highlighter::LambHelper;
use crate::session::{is_silent, Session};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use std::path::PathBuf;

fn history_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(config::HISTORY_FILE))
}

/// Run the interactive loop until `exit`/`quit` or end of input.
pub fn run(session: &Session) -> rustyline::Result<()> {
    let rl_config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<LambHelper, DefaultHistory> = Editor::with_config(rl_config)?;
    rl.set_helper(Some(LambHelper::new()));

    let history = history_path();
    if let Some(path) = &history {
        let _ = rl.load_history(path);
    }

    println!("{}", config::WELCOME_MESSAGE);
    println!("{}", config::WELCOME_FOOTER);

    loop {
        match rl.readline(config::PROMPT) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match line {
                    "exit" | "quit" => {
                        println!("Goodbye.");
                        break;
                    }
                    "help" => {
                        println!("{}", config::HELP_TEXT);
                        continue;
                    }
                    "clear" => {
                        print!("\x1b[2J\x1b[H");
                        continue;
                    }
                    _ => {}
                }

                match session.run_expr(line, "<repl>") {
                    Ok(value) => {
                        if !is_silent(&value) {
                            println!("=> {value}");
                        }
                    }
                    Err(err) => eprintln!("{}", error::render(&err)),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("\nGoodbye.");
                break;
            }
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    if let Some(path) = &history {
        let _ = rl.save_history(path);
    }

    Ok(())
}
