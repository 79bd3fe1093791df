//! Deduplicate and order raw points into a [`MeasurementSeries`].

use crate::model::{MeasurementPoint, MeasurementSeries};
use std::collections::HashMap;

/// Remove exact duplicate (frequency, amplitude) pairs and sort ascending by
/// frequency.
///
/// The first occurrence keeps its position, the last occurrence supplies the
/// value. The sort is stable, so points sharing a frequency keep their
/// first-seen order.
pub fn normalize(raw: impl IntoIterator<Item = MeasurementPoint>) -> MeasurementSeries {
    let mut slots: HashMap<(u64, u64), usize> = HashMap::new();
    let mut unique: Vec<MeasurementPoint> = Vec::new();

    for point in raw {
        match slots.get(&point.identity()) {
            Some(&slot) => unique[slot] = point,
            None => {
                slots.insert(point.identity(), unique.len());
                unique.push(point);
            }
        }
    }

    unique.sort_by(|a, b| a.frequency.total_cmp(&b.frequency));
    MeasurementSeries::from_sorted(unique)
}
