use serde_json::json;

use crate::models::{HistogramChart, ResultTable};

pub const RATING_BIN_COUNT: usize = 10;

/// Unit-width bins `[k, k+1)`; the last bin also holds 10.0.
#[must_use]
pub fn rating_bin(rating: f64) -> Option<usize> {
    if !rating.is_finite() || !(0.0..=10.0).contains(&rating) {
        return None;
    }
    Some((rating.floor() as usize).min(RATING_BIN_COUNT - 1))
}

#[must_use]
pub fn bin_label(index: usize) -> String {
    format!("{} - {}", index, index + 1)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingHistogram {
    pub counts: [u64; RATING_BIN_COUNT],
    pub out_of_range: u64,
}

impl RatingHistogram {
    pub fn from_ratings(ratings: impl IntoIterator<Item = f64>) -> Self {
        let mut histogram = Self::default();
        for rating in ratings {
            match rating_bin(rating) {
                Some(index) => histogram.counts[index] += 1,
                None => histogram.out_of_range += 1,
            }
        }
        histogram
    }

    #[must_use]
    pub fn frequency_table(&self) -> ResultTable {
        let rows = self
            .counts
            .iter()
            .enumerate()
            .map(|(index, count)| vec![json!(bin_label(index)), json!(count)])
            .collect();
        ResultTable::new(vec!["Bin Range".to_string(), "Frequency".to_string()], rows)
    }

    #[must_use]
    pub fn chart(&self) -> HistogramChart {
        HistogramChart {
            title: "Histogram of Movie Ratings".to_string(),
            x_label: "Rating".to_string(),
            y_label: "Frequency".to_string(),
            bin_edges: (0..=RATING_BIN_COUNT).map(|edge| edge as f64).collect(),
            counts: self.counts.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RATING_BIN_COUNT, RatingHistogram, bin_label, rating_bin};

    #[test]
    fn every_rating_on_the_scale_lands_in_exactly_one_bin() {
        for tenths in 0..=100_u32 {
            let rating = f64::from(tenths) / 10.0;
            let bin = rating_bin(rating).expect("ratings in 0..=10 are binned");
            assert!(bin < RATING_BIN_COUNT);
            assert!(rating >= bin as f64, "rating {rating} below bin {bin}");
            if bin < RATING_BIN_COUNT - 1 {
                assert!(rating < (bin + 1) as f64, "rating {rating} above bin {bin}");
            }
        }
    }

    #[test]
    fn bin_edges_follow_lower_inclusive_boundaries() {
        assert_eq!(rating_bin(0.0), Some(0));
        assert_eq!(rating_bin(0.99), Some(0));
        assert_eq!(rating_bin(1.0), Some(1));
        assert_eq!(rating_bin(9.0), Some(9));
        assert_eq!(rating_bin(10.0), Some(9));
        assert_eq!(rating_bin(-0.1), None);
        assert_eq!(rating_bin(10.5), None);
        assert_eq!(rating_bin(f64::NAN), None);
    }

    #[test]
    fn histogram_counts_and_labels_cover_all_bins() {
        let histogram = RatingHistogram::from_ratings([0.0, 5.5, 5.9, 10.0, 11.0]);
        assert_eq!(histogram.counts, [1, 0, 0, 0, 0, 2, 0, 0, 0, 1]);
        assert_eq!(histogram.out_of_range, 1);

        let table = histogram.frequency_table();
        assert_eq!(table.rows.len(), RATING_BIN_COUNT);
        assert_eq!(bin_label(0), "0 - 1");
        assert_eq!(bin_label(9), "9 - 10");
        assert_eq!(histogram.chart().bin_edges.len(), RATING_BIN_COUNT + 1);
    }
}
