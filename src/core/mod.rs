pub mod pips;
pub mod sizing;

pub use sizing::{size_position, ConversionContext, SizingResult};
