//! Table models.

pub mod airport;
pub mod jet;

pub use airport::{airport_columns, airport_exists, airports, find_airport, load_jets, Airport, AirportR};
pub use jet::{find_jet, jet_columns, jet_exists, jets, Jet};
