#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

//! Loader for line-oriented, directive-based unit sheets.
//!
//! Loading is a two-stage transform: [`sheet::RawSheet`] classifies every
//! directive line into scalar fields, the armor table, and the raw
//! critical grid; [`builder::parse_unit`] then derives the tech
//! configuration and runs the [`crits::CritResolver`] to turn each grid
//! cell into mounted equipment on the assembled
//! [`Unit`](mekbay_data::unit::Unit).

pub mod builder;
pub mod catalog;
pub mod crits;
pub mod cursor;
pub mod sheet;
pub mod tech;

pub use builder::{load_unit, parse_unit};
pub use catalog::{catalog_from_toml, load_catalog};
pub use tech::TechError;
