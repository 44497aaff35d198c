//! External clustering scores: how well a clustering matches reference classes.
//!
//! Every score is invariant to renaming the cluster ids, so DBSCAN's discovery
//! order and k-means' arbitrary centroid order compare fairly. Drop DBSCAN's
//! noise points with [`without_noise`] before scoring if they should not count.

use crate::cluster::NOISE;
use crate::error::{Error, Result};
use ndarray::Array1;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Non-empty cells of the (class, cluster) contingency table plus its margins.
struct Contingency {
    n_samples: usize,
    cells: Vec<(usize, usize, usize)>,
    class_totals: Vec<usize>,
    cluster_totals: Vec<usize>,
}

impl Contingency {
    fn new<A, B>(labels_true: &Array1<A>, labels_pred: &Array1<B>) -> Result<Self>
    where
        A: Copy + Eq + Hash,
        B: Copy + Eq + Hash,
    {
        check_lengths(labels_true.len(), labels_pred.len())?;

        let mut classes: HashMap<A, usize> = HashMap::new();
        let mut clusters: HashMap<B, usize> = HashMap::new();
        let mut cell_counts: HashMap<(usize, usize), usize> = HashMap::new();
        for (&class, &cluster) in labels_true.iter().zip(labels_pred.iter()) {
            let next = classes.len();
            let class_idx = *classes.entry(class).or_insert(next);
            let next = clusters.len();
            let cluster_idx = *clusters.entry(cluster).or_insert(next);
            *cell_counts.entry((class_idx, cluster_idx)).or_insert(0) += 1;
        }

        let mut class_totals = vec![0; classes.len()];
        let mut cluster_totals = vec![0; clusters.len()];
        let mut cells = Vec::with_capacity(cell_counts.len());
        for ((class_idx, cluster_idx), count) in cell_counts {
            class_totals[class_idx] += count;
            cluster_totals[cluster_idx] += count;
            cells.push((class_idx, cluster_idx, count));
        }

        Ok(Self {
            n_samples: labels_true.len(),
            cells,
            class_totals,
            cluster_totals,
        })
    }

    fn entropy(&self, totals: &[usize]) -> f64 {
        let n = self.n_samples as f64;
        totals
            .iter()
            .filter(|&&count| count > 0)
            .map(|&count| {
                let p = count as f64 / n;
                -p * p.ln()
            })
            .sum()
    }

    fn mutual_information(&self) -> f64 {
        let n = self.n_samples as f64;
        self.cells
            .iter()
            .map(|&(class_idx, cluster_idx, count)| {
                let count = count as f64;
                let expected =
                    self.class_totals[class_idx] as f64 * self.cluster_totals[cluster_idx] as f64;
                count / n * (n * count / expected).ln()
            })
            .sum()
    }
}

fn check_lengths(n_true: usize, n_pred: usize) -> Result<()> {
    if n_true != n_pred {
        return Err(Error::DimensionMismatch {
            expected: n_true,
            found: n_pred,
        });
    }
    if n_true == 0 {
        return Err(Error::EmptyInput);
    }
    Ok(())
}

fn pairs(count: usize) -> f64 {
    let count = count as f64;
    count * (count - 1.0) / 2.0
}

fn sum_of_squares(counts: impl Iterator<Item = usize>) -> f64 {
    counts.map(|count| (count as f64) * (count as f64)).sum()
}

/// Homogeneity, completeness and V-measure in one pass.
///
/// Homogeneity is 1 when every cluster holds a single class, completeness is 1
/// when every class sits in a single cluster, and V-measure is their harmonic
/// mean.
pub fn homogeneity_completeness_v_measure<A, B>(
    labels_true: &Array1<A>,
    labels_pred: &Array1<B>,
) -> Result<(f64, f64, f64)>
where
    A: Copy + Eq + Hash,
    B: Copy + Eq + Hash,
{
    let table = Contingency::new(labels_true, labels_pred)?;
    let entropy_classes = table.entropy(&table.class_totals);
    let entropy_clusters = table.entropy(&table.cluster_totals);
    let mutual_information = table.mutual_information();

    let homogeneity = if entropy_classes == 0.0 {
        1.0
    } else {
        mutual_information / entropy_classes
    };
    let completeness = if entropy_clusters == 0.0 {
        1.0
    } else {
        mutual_information / entropy_clusters
    };
    let v_measure = if homogeneity + completeness == 0.0 {
        0.0
    } else {
        2.0 * homogeneity * completeness / (homogeneity + completeness)
    };

    Ok((homogeneity, completeness, v_measure))
}

pub fn homogeneity_score<A, B>(labels_true: &Array1<A>, labels_pred: &Array1<B>) -> Result<f64>
where
    A: Copy + Eq + Hash,
    B: Copy + Eq + Hash,
{
    homogeneity_completeness_v_measure(labels_true, labels_pred).map(|(h, _, _)| h)
}

pub fn completeness_score<A, B>(labels_true: &Array1<A>, labels_pred: &Array1<B>) -> Result<f64>
where
    A: Copy + Eq + Hash,
    B: Copy + Eq + Hash,
{
    homogeneity_completeness_v_measure(labels_true, labels_pred).map(|(_, c, _)| c)
}

pub fn v_measure_score<A, B>(labels_true: &Array1<A>, labels_pred: &Array1<B>) -> Result<f64>
where
    A: Copy + Eq + Hash,
    B: Copy + Eq + Hash,
{
    homogeneity_completeness_v_measure(labels_true, labels_pred).map(|(_, _, v)| v)
}

/// Rand index adjusted for chance: 1 for identical partitions, around 0 for
/// random ones, negative when agreement is below chance.
pub fn adjusted_rand_score<A, B>(labels_true: &Array1<A>, labels_pred: &Array1<B>) -> Result<f64>
where
    A: Copy + Eq + Hash,
    B: Copy + Eq + Hash,
{
    let table = Contingency::new(labels_true, labels_pred)?;

    let index: f64 = table.cells.iter().map(|&(_, _, count)| pairs(count)).sum();
    let sum_classes: f64 = table.class_totals.iter().map(|&count| pairs(count)).sum();
    let sum_clusters: f64 = table.cluster_totals.iter().map(|&count| pairs(count)).sum();
    let total = pairs(table.n_samples);

    // Both partitions a single cluster, or both all singletons.
    if total == 0.0 || (sum_classes == sum_clusters && (sum_classes == 0.0 || sum_classes == total))
    {
        return Ok(1.0);
    }

    let expected = sum_classes * sum_clusters / total;
    let max_index = (sum_classes + sum_clusters) / 2.0;
    Ok((index - expected) / (max_index - expected))
}

/// Geometric mean of pairwise precision and recall.
pub fn fowlkes_mallows_score<A, B>(labels_true: &Array1<A>, labels_pred: &Array1<B>) -> Result<f64>
where
    A: Copy + Eq + Hash,
    B: Copy + Eq + Hash,
{
    let table = Contingency::new(labels_true, labels_pred)?;
    let n = table.n_samples as f64;

    let tk = sum_of_squares(table.cells.iter().map(|&(_, _, count)| count)) - n;
    let pk = sum_of_squares(table.class_totals.iter().copied()) - n;
    let qk = sum_of_squares(table.cluster_totals.iter().copied()) - n;

    if tk == 0.0 {
        return Ok(0.0);
    }
    Ok((tk / pk).sqrt() * (tk / qk).sqrt())
}

/// Majority reference class of every predicted cluster; ties go to the smallest class.
pub fn cluster_class_mapping<A, B>(
    labels_true: &Array1<A>,
    labels_pred: &Array1<B>,
) -> Result<BTreeMap<B, A>>
where
    A: Copy + Ord,
    B: Copy + Ord,
{
    check_lengths(labels_true.len(), labels_pred.len())?;

    let mut counts: BTreeMap<B, BTreeMap<A, usize>> = BTreeMap::new();
    for (&class, &cluster) in labels_true.iter().zip(labels_pred.iter()) {
        *counts.entry(cluster).or_default().entry(class).or_insert(0) += 1;
    }

    let mapping = counts
        .into_iter()
        .filter_map(|(cluster, classes)| {
            let mut best: Option<(A, usize)> = None;
            for (class, count) in classes {
                if best.is_none_or(|(_, top)| count > top) {
                    best = Some((class, count));
                }
            }
            best.map(|(class, _)| (cluster, class))
        })
        .collect();

    Ok(mapping)
}

/// Fraction of points whose class equals the majority class of their cluster.
pub fn mapped_accuracy<A, B>(labels_true: &Array1<A>, labels_pred: &Array1<B>) -> Result<f64>
where
    A: Copy + Ord,
    B: Copy + Ord,
{
    let mapping = cluster_class_mapping(labels_true, labels_pred)?;
    let correct = labels_true
        .iter()
        .zip(labels_pred.iter())
        .filter(|&(class, cluster)| mapping.get(cluster) == Some(class))
        .count();

    Ok(correct as f64 / labels_true.len() as f64)
}

/// Drops every point DBSCAN labelled as noise from both label arrays.
pub fn without_noise<A: Copy>(
    labels_true: &Array1<A>,
    labels_pred: &Array1<i64>,
) -> Result<(Array1<A>, Array1<i64>)> {
    if labels_true.len() != labels_pred.len() {
        return Err(Error::DimensionMismatch {
            expected: labels_true.len(),
            found: labels_pred.len(),
        });
    }

    let (kept_true, kept_pred): (Vec<A>, Vec<i64>) = labels_true
        .iter()
        .zip(labels_pred.iter())
        .filter(|&(_, &cluster)| cluster != NOISE)
        .map(|(&class, &cluster)| (class, cluster))
        .unzip();

    Ok((Array1::from(kept_true), Array1::from(kept_pred)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-10,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_perfect_match_under_relabeling() {
        let y_true = array![0, 0, 1, 1, 2];
        let y_pred = array![7i64, 7, 3, 3, NOISE];

        let (h, c, v) = homogeneity_completeness_v_measure(&y_true, &y_pred).unwrap();
        assert_close(h, 1.0);
        assert_close(c, 1.0);
        assert_close(v, 1.0);
        assert_close(adjusted_rand_score(&y_true, &y_pred).unwrap(), 1.0);
        assert_close(fowlkes_mallows_score(&y_true, &y_pred).unwrap(), 1.0);
        assert_close(mapped_accuracy(&y_true, &y_pred).unwrap(), 1.0);
    }

    #[test]
    fn test_homogeneity_and_completeness() {
        let y_true = array![0, 0, 1, 2];
        let y_pred = array![0usize, 0, 1, 1];

        assert_close(homogeneity_score(&y_true, &y_pred).unwrap(), 2.0 / 3.0);
        assert_close(completeness_score(&y_true, &y_pred).unwrap(), 1.0);
        assert_close(v_measure_score(&y_true, &y_pred).unwrap(), 0.8);
    }

    #[test]
    fn test_single_cluster_is_complete_not_homogeneous() {
        let y_true = array![0, 0, 1, 1];
        let y_pred = array![0usize, 0, 0, 0];

        let (h, c, v) = homogeneity_completeness_v_measure(&y_true, &y_pred).unwrap();
        assert_close(h, 0.0);
        assert_close(c, 1.0);
        assert_close(v, 0.0);
    }

    #[test]
    fn test_adjusted_rand_score() {
        let y_true = array![0, 0, 1, 1];

        assert_close(adjusted_rand_score(&y_true, &array![0, 0, 1, 2]).unwrap(), 4.0 / 7.0);
        assert_close(adjusted_rand_score(&y_true, &array![0, 1, 0, 1]).unwrap(), -0.5);
    }

    #[test]
    fn test_adjusted_rand_score_degenerate() {
        let singletons = array![0, 1, 2];
        assert_close(adjusted_rand_score(&singletons, &array![5, 6, 7]).unwrap(), 1.0);

        let single = array![4, 4, 4];
        assert_close(adjusted_rand_score(&single, &array![1, 1, 1]).unwrap(), 1.0);
        assert_close(adjusted_rand_score(&array![3], &array![9]).unwrap(), 1.0);
    }

    #[test]
    fn test_fowlkes_mallows_score() {
        let y_true = array![0, 0, 1, 1];

        assert_close(
            fowlkes_mallows_score(&y_true, &array![0, 0, 1, 2]).unwrap(),
            (0.5f64).sqrt(),
        );
        assert_close(fowlkes_mallows_score(&y_true, &array![0, 1, 2, 3]).unwrap(), 0.0);
    }

    #[test]
    fn test_cluster_class_mapping() {
        let y_true = array![1, 1, 2, 2, 2, 3];
        let y_pred = array![0usize, 0, 0, 1, 1, 1];

        let mapping = cluster_class_mapping(&y_true, &y_pred).unwrap();
        assert_eq!(mapping.get(&0), Some(&1));
        assert_eq!(mapping.get(&1), Some(&2));
        assert_close(mapped_accuracy(&y_true, &y_pred).unwrap(), 4.0 / 6.0);
    }

    #[test]
    fn test_cluster_class_mapping_tie_goes_to_smallest_class() {
        let y_true = array![5, 3, 5, 3];
        let y_pred = array![0usize, 0, 0, 0];

        let mapping = cluster_class_mapping(&y_true, &y_pred).unwrap();
        assert_eq!(mapping.get(&0), Some(&3));
    }

    #[test]
    fn test_without_noise() {
        let y_true = array![1, 2, 3];
        let y_pred = array![0, NOISE, 1];

        let (kept_true, kept_pred) = without_noise(&y_true, &y_pred).unwrap();
        assert_eq!(kept_true, array![1, 3]);
        assert_eq!(kept_pred, array![0i64, 1]);
    }

    #[test]
    fn test_length_mismatch_and_empty() {
        let y_true = array![0, 1];
        let y_pred = array![0, 1, 1];

        assert_eq!(
            adjusted_rand_score(&y_true, &y_pred),
            Err(Error::DimensionMismatch { expected: 2, found: 3 })
        );
        assert!(without_noise(&y_true, &array![0i64]).is_err());

        let empty: Array1<i32> = Array1::from(vec![]);
        assert_eq!(v_measure_score(&empty, &empty), Err(Error::EmptyInput));
    }
}
