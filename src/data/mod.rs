//! JSON data files: party roster, bestiary and skill catalog.

pub mod bestiary;
pub mod loader;
pub mod raw;

pub use bestiary::Bestiary;
pub use loader::{load_party, load_skills, parse_party, parse_skills};
