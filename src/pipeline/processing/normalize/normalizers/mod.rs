pub mod date;
pub mod elevation;
pub mod region;

pub use date::{normalize_date, NormalizedDate};
pub use elevation::elevation_to_meters;
pub use region::{title_case, StateTable};
