//! Sufficient statistics of the rows reaching a node,
//! gathered per (feature, bin).
use super::binning::{FeatureBins, TreePoint};
use super::impurity::{Impurity, ImpurityCalculator};


/// A flat table of statistics.
/// The statistics of bin `b` of feature `f` start at
/// `offsets[f] + b * stat_size`.
#[derive(Debug, Clone)]
pub(crate) struct StatsAggregator {
    impurity: Impurity,
    stat_size: usize,
    offsets: Vec<usize>,
    stats: Vec<f64>,
    node: Vec<f64>,
}


impl StatsAggregator {
    /// Construct an all-zero aggregator.
    pub(crate) fn new(
        impurity: Impurity,
        stat_size: usize,
        bins: &[FeatureBins],
    ) -> Self
    {
        let mut offsets = Vec::with_capacity(bins.len() + 1);
        let mut offset = 0;
        for b in bins {
            offsets.push(offset);
            offset += b.len() * stat_size;
        }
        offsets.push(offset);

        Self {
            impurity,
            stat_size,
            offsets,
            stats: vec![0f64; offset],
            node: vec![0f64; stat_size],
        }
    }


    /// Add `point` to the statistics.
    #[inline]
    pub(crate) fn update(&mut self, point: &TreePoint) {
        let label = point.label;
        for (f, &bin) in point.bins.iter().enumerate() {
            let start = self.offsets[f] + bin * self.stat_size;
            add_label(self.impurity, &mut self.stats[start..start + self.stat_size], label);
        }
        add_label(self.impurity, &mut self.node, label);
    }


    /// Combine two aggregators over the same bins.
    pub(crate) fn merge(mut self, other: Self) -> Self {
        assert_eq!(self.stats.len(), other.stats.len());
        self.stats.iter_mut()
            .zip(other.stats)
            .for_each(|(s, o)| { *s += o; });
        self.node.iter_mut()
            .zip(other.node)
            .for_each(|(s, o)| { *s += o; });
        self
    }


    /// Returns the statistics of all the rows.
    pub(crate) fn node_calculator(&self) -> ImpurityCalculator {
        ImpurityCalculator::new(self.impurity, self.node.clone())
    }


    /// Returns the statistics of each bin of `feature`.
    pub(crate) fn feature_calculators(&self, feature: usize)
        -> Vec<ImpurityCalculator>
    {
        let start = self.offsets[feature];
        let end = self.offsets[feature + 1];
        self.stats[start..end]
            .chunks(self.stat_size)
            .map(|stats| ImpurityCalculator::new(self.impurity, stats.to_vec()))
            .collect()
    }
}


#[inline]
fn add_label(impurity: Impurity, stats: &mut [f64], label: f64) {
    match impurity {
        Impurity::Variance => {
            stats[0] += 1.0;
            stats[1] += label;
            stats[2] += label * label;
        },
        Impurity::Gini | Impurity::Entropy => {
            stats[label as usize] += 1.0;
        },
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn bins() -> Vec<FeatureBins> {
        vec![
            FeatureBins::Continuous { thresholds: vec![0.5] },
            FeatureBins::Categorical { arity: 3, unordered: true },
        ]
    }

    #[test]
    fn test_update_and_merge() {
        let bins = bins();
        let mut a = StatsAggregator::new(Impurity::Gini, 2, &bins);
        let mut b = StatsAggregator::new(Impurity::Gini, 2, &bins);

        a.update(&TreePoint { label: 1.0, bins: vec![0, 2] });
        a.update(&TreePoint { label: 0.0, bins: vec![1, 2] });
        b.update(&TreePoint { label: 1.0, bins: vec![0, 0] });

        let merged = a.merge(b);

        let node = merged.node_calculator();
        assert_eq!(vec![1.0, 2.0], node.stats().to_vec());

        let result = merged.feature_calculators(0)
            .into_iter()
            .map(|c| c.stats().to_vec())
            .collect::<Vec<_>>();
        let expect = vec![vec![0.0, 2.0], vec![1.0, 0.0]];
        assert_eq!(expect, result, "expected {expect:?}, got {result:?}.");

        let result = merged.feature_calculators(1)
            .into_iter()
            .map(|c| c.stats().to_vec())
            .collect::<Vec<_>>();
        let expect = vec![vec![0.0, 1.0], vec![0.0, 0.0], vec![1.0, 1.0]];
        assert_eq!(expect, result, "expected {expect:?}, got {result:?}.");
    }

    #[test]
    fn test_variance_stats() {
        let bins = vec![FeatureBins::Continuous { thresholds: vec![] }];
        let mut agg = StatsAggregator::new(Impurity::Variance, 3, &bins);
        agg.update(&TreePoint { label: 2.0, bins: vec![0] });
        agg.update(&TreePoint { label: 4.0, bins: vec![0] });

        let result = agg.node_calculator().stats().to_vec();
        let expect = vec![2.0, 6.0, 20.0];
        assert_eq!(expect, result, "expected {expect:?}, got {result:?}.");
    }
}
