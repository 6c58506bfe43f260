use crate::models::{Direction, Instrument};

/// Which side of the entry a derived price sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSide {
    Stop,
    Target,
}

/// Absolute distance between two prices, in points for the instrument.
pub fn pip_distance(instrument: &Instrument, a: f64, b: f64) -> f64 {
    (a - b).abs() * instrument.scalar()
}

/// Inverse of `pip_distance`: derive a stop or target price from a
/// point distance. A long's stop sits below entry and its target
/// above; shorts mirror that.
pub fn offset_price(
    instrument: &Instrument,
    entry: f64,
    points: f64,
    direction: Direction,
    side: PriceSide,
) -> f64 {
    let delta = points * instrument.pip_size();
    let below = matches!(
        (direction, side),
        (Direction::Long, PriceSide::Stop) | (Direction::Short, PriceSide::Target)
    );
    if below {
        entry - delta
    } else {
        entry + delta
    }
}
