use rand::Rng;
use rand::seq::SliceRandom;

use super::model::Dataset;

/// Shuffle and cut a dataset into a training and a test part.
///
/// The training part gets `round(len * ratio)` rows. `ratio` is clamped
/// to `[0, 1]`.
pub fn train_test_split<R: Rng + ?Sized>(dataset: &Dataset, ratio: f64, rng: &mut R) -> (Dataset, Dataset) {
    let mut rows = dataset.rows().to_vec();
    rows.shuffle(rng);

    let ratio = ratio.clamp(0.0, 1.0);
    let train_len = ((rows.len() as f64) * ratio).round() as usize;
    let test = rows.split_off(train_len.min(rows.len()));

    log::debug!("split {} rows into {} train / {} test", dataset.len(), rows.len(), test.len());
    (Dataset::from_rows(rows), Dataset::from_rows(test))
}
