//! Input line parsing
//!
//! Lines starting with `/` are client commands; everything else is a turn.

use crate::dice::DEFAULT_SIDES;

pub const HELP_TEXT: &str = "Commands: /roll [sides]  /character  /end (forget this session)  /quit  /help";

/// What one input line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A conversation turn, passed through untouched
    Say(String),
    Roll { sides: u32 },
    Character,
    /// Close the session and discard its stored transcript
    End,
    /// Exit, keeping the transcript for the next run
    Quit,
    Help,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Command::Say(line.to_string());
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        match name {
            "roll" => match parts.next() {
                None => Command::Roll {
                    sides: DEFAULT_SIDES,
                },
                Some(arg) => arg
                    .trim_start_matches(['d', 'D'])
                    .parse()
                    .map_or_else(|_| Command::Unknown(trimmed.to_string()), |sides| {
                        Command::Roll { sides }
                    }),
            },
            "character" | "sheet" => Command::Character,
            "end" => Command::End,
            "quit" | "exit" => Command::Quit,
            "help" | "?" => Command::Help,
            _ => Command::Unknown(trimmed.to_string()),
        }
    }
}
