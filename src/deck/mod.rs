pub mod rules;
pub mod session;

pub use rules::{resolve_zone, DeckZones, Rejection, TypeBreakdown, ZoneLimits, ZoneList};
pub use session::DeckSession;
