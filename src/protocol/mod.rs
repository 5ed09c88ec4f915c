//! Line protocol spoken between players and the server.
//!
//! Every client line is one [`Command`]; every command produces one
//! [`Reply`], which the connection handler turns into zero or more lines.

use std::str::FromStr;

use crate::{error::ProtocolError, logic::BOOM};

pub const HELP_MESSAGE: &str = "USAGE\n\
look: display the latest state of the board\n\
help: display this message\n\
bye: exit the game\n\
dig X Y: dig the location (X,Y) on the board\n\
flag X Y: flag the location (X,Y) on the board\n\
deflag X Y: remove the flag from location (X,Y) on the board";

pub fn hello_message(players: usize, width: usize, height: usize) -> String {
    format!(
        "Welcome to Minesweeper. Players: {} including you. Board: {} columns by {} rows. Type 'help' for help.",
        players, width, height
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Look,
    Help,
    Bye,
    Dig { x: i64, y: i64 },
    Flag { x: i64, y: i64 },
    Deflag { x: i64, y: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Board(String),
    Boom,
    Help,
    Bye,
}

impl Reply {
    /// Text to put on the wire, or `None` when the connection should just
    /// be closed.
    pub fn text(&self) -> Option<&str> {
        match self {
            Reply::Board(rendering) => Some(rendering.as_str()),
            Reply::Boom => Some(BOOM),
            Reply::Help => Some(HELP_MESSAGE),
            Reply::Bye => None,
        }
    }
}

/// Parses `-?[0-9]+`. Integers too large for `i64` saturate, which keeps
/// them off the board.
fn parse_coordinate(token: &str) -> Option<i64> {
    let digits = token.strip_prefix('-').unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(token.parse().unwrap_or(if token.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    }))
}

impl FromStr for Command {
    type Err = ProtocolError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let unrecognized = || ProtocolError::UnrecognizedCommand(line.to_string());
        let tokens: Vec<&str> = line.split(' ').collect();

        match tokens.as_slice() {
            ["look"] => Ok(Command::Look),
            ["help"] => Ok(Command::Help),
            ["bye"] => Ok(Command::Bye),
            [action, x, y] => {
                let x = parse_coordinate(x).ok_or_else(unrecognized)?;
                let y = parse_coordinate(y).ok_or_else(unrecognized)?;
                match *action {
                    "dig" => Ok(Command::Dig { x, y }),
                    "flag" => Ok(Command::Flag { x, y }),
                    "deflag" => Ok(Command::Deflag { x, y }),
                    _ => Err(unrecognized()),
                }
            }
            _ => Err(unrecognized()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_every_command() {
        assert_eq!("look".parse::<Command>().unwrap(), Command::Look);
        assert_eq!("help".parse::<Command>().unwrap(), Command::Help);
        assert_eq!("bye".parse::<Command>().unwrap(), Command::Bye);
        assert_eq!(
            "dig 3 4".parse::<Command>().unwrap(),
            Command::Dig { x: 3, y: 4 }
        );
        assert_eq!(
            "flag 0 12".parse::<Command>().unwrap(),
            Command::Flag { x: 0, y: 12 }
        );
        assert_eq!(
            "deflag 7 0".parse::<Command>().unwrap(),
            Command::Deflag { x: 7, y: 0 }
        );
    }

    #[test]
    fn test_negative_and_huge_coordinates_are_accepted() {
        assert_eq!(
            "dig -1 -20".parse::<Command>().unwrap(),
            Command::Dig { x: -1, y: -20 }
        );
        assert_eq!(
            "flag 99999999999999999999999 -99999999999999999999999"
                .parse::<Command>()
                .unwrap(),
            Command::Flag {
                x: i64::MAX,
                y: i64::MIN
            }
        );
    }

    #[test]
    fn test_rejects_lines_outside_the_grammar() {
        for line in [
            "",
            "LOOK",
            "look ",
            " look",
            "dig",
            "dig 1",
            "dig 1 2 3",
            "dig  1 2",
            "dig 1 2 ",
            "dig a b",
            "dig +1 2",
            "dig - 2",
            "dig 1.5 2",
            "dug 1 2",
            "Flag 1 2",
            "bye bye",
            "dig\t1\t2",
        ] {
            assert!(
                matches!(
                    line.parse::<Command>(),
                    Err(ProtocolError::UnrecognizedCommand(_))
                ),
                "{line:?} should not parse"
            );
        }
    }

    #[test]
    fn test_reply_text() {
        assert_eq!(Reply::Boom.text(), Some("BOOM!"));
        assert_eq!(Reply::Bye.text(), None);
        assert_eq!(Reply::Board("- -".into()).text(), Some("- -"));

        let help = Reply::Help.text().unwrap();
        assert_eq!(help.lines().count(), 7);
        assert!(help.starts_with("USAGE\n"));
    }

    #[test]
    fn test_hello_message() {
        assert_eq!(
            hello_message(3, 10, 10),
            "Welcome to Minesweeper. Players: 3 including you. Board: 10 columns by 10 rows. Type 'help' for help."
        );
    }
}
