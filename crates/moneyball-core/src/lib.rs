// Library root: data access and the scouting splits aggregator. No HTTP here;
// the web crate builds pages on top of these modules.

pub mod config;
pub mod db;
pub mod overview;
pub mod palette;
pub mod quotes;
pub mod splits;
