pub mod inputs;
pub mod instrument;

pub use inputs::{Direction, DisplayMode, ExecutionMode, PriceLevels, RiskSpec, SizerInputs};
pub use instrument::{Instrument, InstrumentClass};
