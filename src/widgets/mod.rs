//! Reusable UI widgets for ProfileOxide

mod range_input;
mod selection_filter;

pub use range_input::{is_bounded, RangeInput};
pub use selection_filter::SelectionFilter;
