use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use runway_allocator::{Airport, ArrivalClearance, RunwayId, SnapshotError};
use tracing::{info, warn};

use crate::{
    board::{BoardKind, render_board, render_html, render_runways},
    command::{Command, HELP, parse_command},
    config::DeskConfig,
    error::{ApplicationError, ApplicationResult},
};

const DEFAULT_EXPORT_FILE: &str = "board.html";

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Reply {
    Message(String),
    Exit,
}

/// The operator's console: turns commands into airport operations and the
/// results into text.
#[derive(Debug)]
pub(crate) struct Desk {
    airport: Airport,
    state_file: PathBuf,
    autosave_on_exit: bool,
}

impl Desk {
    pub fn open(config: &DeskConfig) -> ApplicationResult<Self> {
        let state_file = config.state_file_path();
        let airport = if config.restore_on_start() {
            match Airport::load_from_path(&state_file) {
                Ok(airport) => airport,
                Err(SnapshotError::IoError(e)) if e.kind() == io::ErrorKind::NotFound => {
                    warn!(?state_file, "No saved state to restore, opening a new airport");
                    Airport::new(config.runway_count())?
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            Airport::new(config.runway_count())?
        };
        Ok(Self {
            airport,
            state_file,
            autosave_on_exit: config.autosave_on_exit(),
        })
    }

    #[cfg(test)]
    pub fn airport(&self) -> &Airport {
        &self.airport
    }

    /// Reads commands until `quit`, `exit!` or end of input. Failed commands
    /// are reported and the desk keeps going.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> ApplicationResult<()> {
        writeln!(
            output,
            "Airport open with {} runways. Type `help` for commands.",
            self.airport.runway_count()
        )?;
        let mut lines = input.lines();
        loop {
            write!(output, "> ")?;
            output.flush()?;
            let Some(line) = lines.next().transpose()? else {
                writeln!(output)?;
                self.execute(Command::Quit)?;
                return Ok(());
            };
            if line.trim().is_empty() {
                continue;
            }
            match parse_command(&line).and_then(|cmd| self.execute(cmd)) {
                Ok(Reply::Message(message)) => writeln!(output, "{message}")?,
                Ok(Reply::Exit) => return Ok(()),
                Err(e) => {
                    warn!(command = line.trim(), "{e}");
                    writeln!(output, "Error: {e}")?;
                }
            }
        }
    }

    pub fn execute(&mut self, command: Command) -> ApplicationResult<Reply> {
        let message = match command {
            Command::Register { flight, city } => {
                let flight = required(&flight, "Flight number")?;
                let city = required(&city, "City of origin")?;
                self.airport.register_flight(flight, city)?;
                format!("Flight {flight} from {city} registered")
            }
            Command::Arrive { flight } => {
                let flight = required(&flight, "Flight number")?;
                match self.airport.request_arrival(flight)? {
                    ArrivalClearance::Cleared(runway) => {
                        format!("Message for flight {flight}: your runway is {runway}")
                    }
                    ArrivalClearance::Queued { position } => format!(
                        "Message for flight {flight}: no free runway, hold (number {position} in line)"
                    ),
                }
            }
            Command::Land { flight, runway } => {
                let flight = required(&flight, "Flight number")?;
                let runway: RunwayId =
                    runway.ok_or(ApplicationError::MissingInput("Runway number"))?;
                self.airport.confirm_landing(flight, runway)?;
                format!("Flight {flight} landed on runway {runway}")
            }
            Command::Board { flight, city } => {
                let flight = required(&flight, "Flight number")?;
                let city = required(&city, "Destination")?;
                self.airport.ready_for_departure(flight, city)?;
                format!("Boarding announced for flight {flight} to {city}")
            }
            Command::TakeOff { flight } => {
                let flight = required(&flight, "Flight number")?;
                match self.airport.process_takeoff(flight)? {
                    Some(next) => format!(
                        "Flight {flight} removed from the system\nNext to land: {} on runway {}",
                        next.flight_id(),
                        next.runway().unwrap_or_default()
                    ),
                    None => format!("Flight {flight} removed from the system"),
                }
            }
            Command::Arrivals => render_board(BoardKind::Arrivals, &self.airport),
            Command::Departures => render_board(BoardKind::Departures, &self.airport),
            Command::Show => format!(
                "{}\n\n{}",
                render_board(BoardKind::Arrivals, &self.airport),
                render_board(BoardKind::Departures, &self.airport)
            ),
            Command::Runways => render_runways(&self.airport),
            Command::Save(path) => {
                let path = path.unwrap_or_else(|| self.state_file.clone());
                self.airport.save_to_path(&path)?;
                format!("State saved to {}", path.display())
            }
            Command::Load(path) => {
                let path = path.unwrap_or_else(|| self.state_file.clone());
                self.airport = Airport::load_from_path(&path)?;
                format!(
                    "State loaded from {} ({} flights, {} runways)",
                    path.display(),
                    self.airport.flights().count(),
                    self.airport.runway_count()
                )
            }
            Command::Export(path) => {
                let path = path.unwrap_or_else(|| self.default_export_path());
                fs::write(&path, render_html(&self.airport)?)?;
                info!(?path, "board exported");
                format!("Board written to {}", path.display())
            }
            Command::Help => HELP.to_string(),
            Command::Quit => {
                if self.autosave_on_exit {
                    self.airport.save_to_path(&self.state_file)?;
                }
                return Ok(Reply::Exit);
            }
            Command::ExitWithoutSaving => return Ok(Reply::Exit),
        };
        Ok(Reply::Message(message))
    }

    fn default_export_path(&self) -> PathBuf {
        self.state_file
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(DEFAULT_EXPORT_FILE)
    }
}

fn required<'a>(value: &'a str, what: &'static str) -> ApplicationResult<&'a str> {
    if value.trim().is_empty() {
        Err(ApplicationError::MissingInput(what))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use runway_allocator::{AirportError, FlightStatus};
    use tracing_test::traced_test;

    use super::*;

    fn desk_in(dir: &Path) -> Desk {
        Desk::open(&DeskConfig::new_for_test(dir)).unwrap()
    }

    fn execute_line(desk: &mut Desk, line: &str) -> ApplicationResult<Reply> {
        desk.execute(parse_command(line)?)
    }

    fn run_script(desk: &mut Desk, script: &str) -> String {
        let mut output = Vec::new();
        desk.run(Cursor::new(script), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_scripted_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut desk = desk_in(dir.path());
        let output = run_script(
            &mut desk,
            "register AB1 Paris\narrive AB1\nregister CD2 Rome\narrive CD2\n\nland CD2 1\nland AB1 1\nboard AB1 Rome\ntakeoff AB1\nexit!\n",
        );

        let replies = [
            "Flight AB1 from Paris registered",
            "Message for flight AB1: your runway is 1",
            "Message for flight CD2: no free runway, hold (number 1 in line)",
            "Error: Flight CD2 has not been cleared to a runway",
            "Flight AB1 landed on runway 1",
            "Boarding announced for flight AB1 to Rome",
            "Next to land: CD2 on runway 1",
        ];
        for reply in replies {
            assert!(output.contains(reply), "{reply:?} missing from {output}");
        }

        let cd2 = desk.airport().flight("CD2").unwrap();
        assert_eq!(cd2.status(), FlightStatus::Waiting);
        assert_eq!(cd2.runway(), Some(1));
        assert!(!dir.path().join("airport.json").exists());
    }

    #[test]
    #[traced_test]
    fn test_failures_are_reported_not_retried() {
        let dir = tempfile::tempdir().unwrap();
        let mut desk = desk_in(dir.path());
        let output = run_script(&mut desk, "arrive ZZ9\nregister AB1\nfly\nshow\n");

        assert!(output.contains("Error: Flight ZZ9 is not registered"));
        assert!(output.contains("Error: City of origin must not be empty"));
        assert!(output.contains("Error: Could not understand command: fly"));
        assert!(output.contains("Arrivals (0)"));
        assert!(logs_contain("Flight ZZ9 is not registered"));
        assert_eq!(desk.airport().flights().count(), 0);
    }

    #[test]
    fn test_engine_errors_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let mut desk = desk_in(dir.path());
        execute_line(&mut desk, "register AB1 Paris").unwrap();
        let error = execute_line(&mut desk, "register AB1 Rome").unwrap_err();
        assert!(matches!(
            error,
            ApplicationError::AirportError(AirportError::DuplicateFlight(_))
        ));
        assert!(matches!(
            execute_line(&mut desk, "land AB1"),
            Err(ApplicationError::MissingInput("Runway number"))
        ));
    }

    #[test]
    fn test_save_load_and_restore() {
        let dir = tempfile::tempdir().unwrap();
        let mut desk = desk_in(dir.path());
        run_script(
            &mut desk,
            "register AB1 Paris\narrive AB1\nregister CD2 Rome\narrive CD2\nsave\nexit!\n",
        );
        let saved = desk.airport().clone();
        assert!(dir.path().join("airport.json").exists());

        let mut other = desk_in(dir.path());
        assert_eq!(
            other.execute(Command::Load(None)).unwrap(),
            Reply::Message(format!(
                "State loaded from {} (2 flights, 1 runways)",
                dir.path().join("airport.json").display()
            ))
        );
        assert_eq!(other.airport(), &saved);

        let config = DeskConfig::new_for_test(dir.path()).restoring();
        let restored = Desk::open(&config).unwrap();
        assert_eq!(restored.airport(), &saved);
        assert_eq!(restored.airport().waiting_queue().front(), Some("CD2"));
    }

    #[test]
    fn test_restore_without_saved_state_opens_new_airport() {
        let dir = tempfile::tempdir().unwrap();
        let config = DeskConfig::new_for_test(dir.path()).restoring();
        let desk = Desk::open(&config).unwrap();
        assert_eq!(desk.airport().runway_count(), 1);
        assert_eq!(desk.airport().flights().count(), 0);
    }

    #[test]
    fn test_quit_autosaves_and_end_of_input_quits() {
        let dir = tempfile::tempdir().unwrap();
        let mut desk = Desk {
            autosave_on_exit: true,
            ..desk_in(dir.path())
        };
        run_script(&mut desk, "register AB1 Paris\n");
        let state_file = dir.path().join("airport.json");
        let saved = Airport::load_from_path(&state_file).unwrap();
        assert_eq!(&saved, desk.airport());
    }

    #[test]
    fn test_export_html() {
        let dir = tempfile::tempdir().unwrap();
        let mut desk = desk_in(dir.path());
        execute_line(&mut desk, "register AB1 Paris").unwrap();
        desk.execute(Command::Export(None)).unwrap();
        let html = fs::read_to_string(dir.path().join("board.html")).unwrap();
        assert!(html.contains("<td>AB1</td>"));
    }
}
