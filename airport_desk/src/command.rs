use std::path::PathBuf;

use nom::{
    Finish, IResult, Parser,
    branch::alt,
    bytes::complete::{tag_no_case, take_till1},
    character::complete::{space0, space1, u32},
    combinator::{all_consuming, eof, opt, peek, rest, value},
    sequence::{delimited, preceded, terminated},
};
use runway_allocator::RunwayId;

use crate::error::{ApplicationError, ApplicationResult};

/// One operator action typed at the desk. Missing arguments parse as empty so
/// the desk can say which one is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Register { flight: String, city: String },
    Arrive { flight: String },
    Land {
        flight: String,
        runway: Option<RunwayId>,
    },
    Board { flight: String, city: String },
    TakeOff { flight: String },
    Arrivals,
    Departures,
    Show,
    Runways,
    Save(Option<PathBuf>),
    Load(Option<PathBuf>),
    Export(Option<PathBuf>),
    Help,
    Quit,
    ExitWithoutSaving,
}

pub(crate) const HELP: &str = "\
register <flight> <city>   register an inbound flight and its origin
arrive <flight>            flight asks to land, gets a runway or circles
land <flight> <runway>     confirm the flight landed on its runway
board <flight> <city>      announce boarding towards the destination
takeoff <flight>           flight left, next circling flight gets the runway
arrivals | departures      show one board
show                       show both boards
runways                    show runway occupancy and the waiting queue
save [file] | load [file]  store or restore the airport state
export [file]              write both boards as an HTML page
help                       this text
quit                       leave, saving first when autosave is on
exit!                      leave without saving";

pub(crate) fn parse_command(line: &str) -> ApplicationResult<Command> {
    all_consuming(delimited(space0, nom_command, space0))
        .parse(line)
        .finish()
        .map(|(_, command)| command)
        .map_err(|_| ApplicationError::CommandError(line.trim().to_string()))
}

fn nom_command(input: &str) -> IResult<&str, Command> {
    alt((
        preceded(keyword("register"), (argument, free_text))
            .map(|(flight, city)| Command::Register { flight, city }),
        preceded(keyword("arrive"), argument).map(|flight| Command::Arrive { flight }),
        preceded(keyword("land"), (argument, opt(preceded(space1, u32))))
            .map(|(flight, runway)| Command::Land { flight, runway }),
        preceded(keyword("board"), (argument, free_text))
            .map(|(flight, city)| Command::Board { flight, city }),
        preceded(keyword("takeoff"), argument).map(|flight| Command::TakeOff { flight }),
        value(Command::Arrivals, keyword("arrivals")),
        value(Command::Departures, keyword("departures")),
        value(Command::Show, keyword("show")),
        value(Command::Runways, keyword("runways")),
        preceded(keyword("save"), free_text).map(|path| Command::Save(optional_path(path))),
        preceded(keyword("load"), free_text).map(|path| Command::Load(optional_path(path))),
        preceded(keyword("export"), free_text).map(|path| Command::Export(optional_path(path))),
        value(Command::Help, keyword("help")),
        value(Command::Quit, keyword("quit")),
        value(Command::ExitWithoutSaving, keyword("exit!")),
    ))
    .parse(input)
}

/// Matches `name` only as a whole word.
fn keyword<'a>(
    name: &'static str,
) -> impl Parser<&'a str, Output = &'a str, Error = nom::error::Error<&'a str>> {
    terminated(tag_no_case(name), peek(alt((space1, eof))))
}

fn argument(input: &str) -> IResult<&str, String> {
    opt(preceded(space1, take_till1(char::is_whitespace)))
        .map(|word: Option<&str>| word.unwrap_or_default().to_string())
        .parse(input)
}

fn free_text(input: &str) -> IResult<&str, String> {
    opt(preceded(space1, rest))
        .map(|text: Option<&str>| text.unwrap_or_default().trim().to_string())
        .parse(input)
}

fn optional_path(text: String) -> Option<PathBuf> {
    (!text.is_empty()).then(|| PathBuf::from(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flight_commands() {
        assert_eq!(
            parse_command("register AB1 Paris").unwrap(),
            Command::Register {
                flight: "AB1".into(),
                city: "Paris".into()
            }
        );
        assert_eq!(
            parse_command("  REGISTER  AB1   Rio de Janeiro  ").unwrap(),
            Command::Register {
                flight: "AB1".into(),
                city: "Rio de Janeiro".into()
            }
        );
        assert_eq!(
            parse_command("arrive CD2").unwrap(),
            Command::Arrive {
                flight: "CD2".into()
            }
        );
        assert_eq!(
            parse_command("land CD2 1").unwrap(),
            Command::Land {
                flight: "CD2".into(),
                runway: Some(1)
            }
        );
        assert_eq!(
            parse_command("board CD2 Rome").unwrap(),
            Command::Board {
                flight: "CD2".into(),
                city: "Rome".into()
            }
        );
        assert_eq!(
            parse_command("takeoff CD2 ").unwrap(),
            Command::TakeOff {
                flight: "CD2".into()
            }
        );
    }

    #[test]
    fn test_missing_arguments_parse_as_empty() {
        assert_eq!(
            parse_command("register AB1").unwrap(),
            Command::Register {
                flight: "AB1".into(),
                city: String::new()
            }
        );
        assert_eq!(
            parse_command("arrive").unwrap(),
            Command::Arrive {
                flight: String::new()
            }
        );
        assert_eq!(
            parse_command("land AB1").unwrap(),
            Command::Land {
                flight: "AB1".into(),
                runway: None
            }
        );
    }

    #[test]
    fn test_keywords_match_whole_words() {
        assert_eq!(parse_command("arrivals").unwrap(), Command::Arrivals);
        assert_eq!(parse_command("departures").unwrap(), Command::Departures);
        assert_eq!(parse_command("show").unwrap(), Command::Show);
        assert_eq!(parse_command("runways").unwrap(), Command::Runways);
        assert_eq!(parse_command("help").unwrap(), Command::Help);
        assert_eq!(parse_command("quit").unwrap(), Command::Quit);
        assert_eq!(parse_command("exit!").unwrap(), Command::ExitWithoutSaving);
        assert!(parse_command("arrivalsx").is_err());
        assert!(parse_command("quit now").is_err());
    }

    #[test]
    fn test_state_commands() {
        assert_eq!(parse_command("save").unwrap(), Command::Save(None));
        assert_eq!(
            parse_command("load /tmp/my airport.json").unwrap(),
            Command::Load(Some(PathBuf::from("/tmp/my airport.json")))
        );
        assert_eq!(
            parse_command("export board.html").unwrap(),
            Command::Export(Some(PathBuf::from("board.html")))
        );
    }

    #[test]
    fn test_garbage() {
        assert!(matches!(
            parse_command("land AB1 north"),
            Err(ApplicationError::CommandError(line)) if line == "land AB1 north"
        ));
        assert!(parse_command("fly away").is_err());
        assert!(parse_command("").is_err());
    }
}
