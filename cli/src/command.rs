use std::str::FromStr;

use sweeper_core::Coord2;
use thiserror::Error;

/// One line of player input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Reveal(Coord2),
    Flag(Coord2),
    NewGame,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("")]
    Empty,
    #[error("Unknown command `{0}`, type `h` for help")]
    Unknown(String),
    #[error("`{0}` expects a row and a column")]
    MissingCoords(String),
    #[error("`{0}` is not a valid row or column")]
    InvalidNumber(String),
    #[error("Too many arguments for `{0}`")]
    TrailingInput(String),
}

pub const HELP: &str = "\
Commands:
  r ROW COL   reveal a cell
  f ROW COL   place or remove a flag
  n           start a new game
  h           show this help
  q           quit";

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(CommandError::Empty);
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "r" | "reveal" => Self::Reveal(parse_coords(name, &mut words)?),
            "f" | "flag" => Self::Flag(parse_coords(name, &mut words)?),
            "n" | "new" => Self::NewGame,
            "h" | "help" | "?" => Self::Help,
            "q" | "quit" | "exit" => Self::Quit,
            _ => return Err(CommandError::Unknown(name.to_string())),
        };

        if words.next().is_some() {
            return Err(CommandError::TrailingInput(name.to_string()));
        }
        Ok(command)
    }
}

fn parse_coords<'a>(
    name: &str,
    words: &mut impl Iterator<Item = &'a str>,
) -> Result<Coord2, CommandError> {
    let mut next = || -> Result<u8, CommandError> {
        let word = words
            .next()
            .ok_or_else(|| CommandError::MissingCoords(name.to_string()))?;
        word.parse()
            .map_err(|_| CommandError::InvalidNumber(word.to_string()))
    };
    Ok((next()?, next()?))
}
