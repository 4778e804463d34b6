//! Splitting journey descriptions into station pairs.

/// Separator between the two station names of a rail journey.
pub const RAIL_DELIMITER: &str = " to ";

/// Whether a journey description names a start and an end station.
///
/// Bus journeys, top-ups and similar entries lack the delimiter.
pub fn is_rail_journey(action: &str) -> bool {
    action.contains(RAIL_DELIMITER)
}

/// Split a rail journey description at the first delimiter.
///
/// With `strict` set, a description containing the delimiter more than once
/// is rejected (`None`), since the station boundary is then ambiguous.
/// Without it, everything after the first delimiter is the end station.
/// Returns `None` for descriptions that are not rail journeys at all.
pub fn split_stations(action: &str, strict: bool) -> Option<(&str, &str)> {
    let (start, end) = action.split_once(RAIL_DELIMITER)?;
    if strict && end.contains(RAIL_DELIMITER) {
        return None;
    }
    Some((start, end))
}
