use askama::Template;
use itertools::Itertools;
use runway_allocator::{Airport, Flight};

use crate::error::ApplicationResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BoardRow {
    pub flight: String,
    pub city: String,
    pub status: String,
    pub runway: String, // "2", "queue #1" or "-"
}

impl BoardRow {
    fn from_flight(flight: &Flight, airport: &Airport) -> Self {
        let queue_position = airport.waiting_queue().position(flight.flight_id());
        let runway = match (flight.runway(), queue_position) {
            (Some(runway), _) => runway.to_string(),
            (None, Some(position)) => format!("queue #{position}"),
            (None, None) => "-".to_string(),
        };
        Self {
            flight: flight.flight_id().to_string(),
            city: flight.city().to_string(),
            status: flight.status().to_string(),
            runway,
        }
    }

    fn cells(&self) -> [&str; 4] {
        [&self.flight, &self.city, &self.status, &self.runway]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BoardKind {
    Arrivals,
    Departures,
}

impl BoardKind {
    fn title(self) -> &'static str {
        match self {
            Self::Arrivals => "Arrivals",
            Self::Departures => "Departures",
        }
    }

    fn headers(self) -> [&'static str; 4] {
        match self {
            Self::Arrivals => ["Flight", "From", "Status", "Runway"],
            Self::Departures => ["Flight", "To", "Status", "Runway"],
        }
    }

    pub fn rows(self, airport: &Airport) -> Vec<BoardRow> {
        let flights: Box<dyn Iterator<Item = &Flight> + '_> = match self {
            Self::Arrivals => Box::new(airport.arrivals()),
            Self::Departures => Box::new(airport.departures()),
        };
        flights
            .sorted_by(|a, b| a.flight_id().cmp(b.flight_id()))
            .map(|flight| BoardRow::from_flight(flight, airport))
            .collect()
    }
}

pub(crate) fn render_board(kind: BoardKind, airport: &Airport) -> String {
    let rows = kind.rows(airport);
    let headers = kind.headers();
    let widths: Vec<usize> = (0..headers.len())
        .map(|column| {
            rows.iter()
                .map(|row| row.cells()[column].chars().count())
                .chain(std::iter::once(headers[column].len()))
                .max()
                .unwrap_or_default()
        })
        .collect();
    let format_line = |cells: [&str; 4]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![
        format!("{} ({})", kind.title(), rows.len()),
        format_line(headers),
        widths.iter().map(|width| "-".repeat(*width)).join("  "),
    ];
    if rows.is_empty() {
        lines.push("(none)".to_string());
    }
    lines.extend(rows.iter().map(|row| format_line(row.cells())));
    lines.join("\n")
}

pub(crate) fn render_runways(airport: &Airport) -> String {
    let holders = airport
        .flights()
        .filter_map(|flight| flight.runway().map(|runway| (runway, flight.flight_id())))
        .collect::<std::collections::HashMap<_, _>>();
    let runways = airport
        .runways()
        .iter()
        .map(|runway| match holders.get(&runway.id()) {
            Some(flight) => format!("Runway {}: {flight}", runway.id()),
            None => format!("Runway {}: free", runway.id()),
        })
        .join("\n");
    let queue = if airport.waiting_queue().is_empty() {
        "nobody".to_string()
    } else {
        airport.waiting_queue().iter().join(", ")
    };
    format!("{runways}\nCircling: {queue}")
}

#[derive(Template)]
#[template(path = "board.html")]
struct BoardTemplate<'a> {
    runway_count: usize,
    free_runways: usize,
    arrivals: &'a [BoardRow],
    departures: &'a [BoardRow],
}

pub(crate) fn render_html(airport: &Airport) -> ApplicationResult<String> {
    let arrivals = BoardKind::Arrivals.rows(airport);
    let departures = BoardKind::Departures.rows(airport);
    let template = BoardTemplate {
        runway_count: airport.runway_count(),
        free_runways: airport.runways().free_count(),
        arrivals: &arrivals,
        departures: &departures,
    };
    Ok(template.render()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_airport() -> Airport {
        let mut airport = Airport::new(1).unwrap();
        airport.register_flight("ZZ9", "Paris").unwrap();
        airport.register_flight("AB1", "Rome").unwrap();
        airport.register_flight("CD2", "Oslo").unwrap();
        airport.request_arrival("AB1").unwrap();
        airport.request_arrival("ZZ9").unwrap();
        airport.confirm_landing("AB1", 1).unwrap();
        airport.ready_for_departure("AB1", "Rio de Janeiro").unwrap();
        airport
    }

    #[test]
    fn test_rows_are_sorted_and_show_queue_position() {
        let airport = sample_airport();
        let arrivals = BoardKind::Arrivals.rows(&airport);
        assert_eq!(
            arrivals,
            [
                BoardRow {
                    flight: "CD2".into(),
                    city: "Oslo".into(),
                    status: "DUE".into(),
                    runway: "-".into(),
                },
                BoardRow {
                    flight: "ZZ9".into(),
                    city: "Paris".into(),
                    status: "WAITING".into(),
                    runway: "queue #1".into(),
                },
            ]
        );
        let departures = BoardKind::Departures.rows(&airport);
        assert_eq!(departures.len(), 1);
        assert_eq!(departures[0].city, "Rio de Janeiro");
        assert_eq!(departures[0].runway, "1");
    }

    #[test]
    fn test_text_board() {
        let airport = sample_airport();
        let board = render_board(BoardKind::Departures, &airport);
        let expected = "\
Departures (1)
Flight  To              Status     Runway
------  --------------  ---------  ------
AB1     Rio de Janeiro  DEPARTING  1";
        assert_eq!(board, expected);

        let empty = render_board(BoardKind::Arrivals, &Airport::new(1).unwrap());
        assert!(empty.ends_with("(none)"));
    }

    #[test]
    fn test_runway_overview() {
        let mut airport = Airport::new(2).unwrap();
        airport.register_flight("AB1", "Rome").unwrap();
        airport.request_arrival("AB1").unwrap();
        assert_eq!(
            render_runways(&airport),
            "Runway 1: AB1\nRunway 2: free\nCircling: nobody"
        );
    }

    #[test]
    fn test_html_board() {
        let html = render_html(&sample_airport()).unwrap();
        assert!(html.contains("<td>Rio de Janeiro</td>"));
        assert!(html.contains("queue #1"));
        assert!(html.contains("0 of 1 runways free"));
    }
}
