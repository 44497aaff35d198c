use crate::error::{Error, Result};
use crate::{Matrix, Vector};
use ndarray::{Array1, Axis};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Normal;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Isotropic Gaussian blobs around fixed centres.
///
/// Rows are grouped by centre; the returned labels hold each row's centre index.
#[derive(Clone, Debug)]
pub struct Blobs {
    centers: Matrix,
    n_samples_per_center: usize,
    std_dev: f64,
    random_state: Option<u64>,
}

impl Blobs {
    pub fn new(centers: Matrix) -> Self {
        Self {
            centers,
            n_samples_per_center: 100,
            std_dev: 1.0,
            random_state: None,
        }
    }

    pub fn n_samples_per_center(mut self, n: usize) -> Self {
        self.n_samples_per_center = n;
        self
    }

    pub fn std_dev(mut self, std_dev: f64) -> Self {
        self.std_dev = std_dev;
        self
    }

    pub fn random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    pub fn n_samples(&self) -> usize {
        self.centers.nrows() * self.n_samples_per_center
    }

    pub fn n_features(&self) -> usize {
        self.centers.ncols()
    }

    pub fn generate(&self) -> Result<(Matrix, Array1<usize>)> {
        if self.centers.nrows() == 0 || self.centers.ncols() == 0 {
            return Err(Error::EmptyInput);
        }
        if self.n_samples_per_center == 0 {
            return Err(Error::invalid("n_samples_per_center", "must be at least 1"));
        }
        if !(self.std_dev >= 0.0 && self.std_dev.is_finite()) {
            return Err(Error::invalid(
                "std_dev",
                format!("must be non-negative and finite, got {}", self.std_dev),
            ));
        }
        let noise = Normal::new(0.0, self.std_dev)
            .map_err(|err| Error::invalid("std_dev", err.to_string()))?;

        let mut rng = match self.random_state {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let shape = (self.n_samples_per_center, self.n_features());
        let mut features = Matrix::zeros((self.n_samples(), self.n_features()));
        for (center, mut block) in self
            .centers
            .rows()
            .into_iter()
            .zip(features.axis_chunks_iter_mut(Axis(0), self.n_samples_per_center))
        {
            block.assign(&Matrix::random_using(shape, noise, &mut rng));
            block += &center;
        }

        let labels = (0..self.centers.nrows())
            .flat_map(|k| std::iter::repeat_n(k, self.n_samples_per_center))
            .collect();

        Ok((features, labels))
    }
}

/// Per-feature min-max rescaling of `x` into `[0, 1]`; constant columns map to 0.
pub fn min_max_scale(x: &Matrix) -> Matrix {
    let lo: Vector = x.fold_axis(Axis(0), f64::INFINITY, |&acc, &v| acc.min(v));
    let hi: Vector = x.fold_axis(Axis(0), f64::NEG_INFINITY, |&acc, &v| acc.max(v));
    let range = (&hi - &lo).mapv(|r| if r > 0.0 { r } else { 1.0 });

    let mut scaled = x - &lo;
    scaled /= &range;
    scaled
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_blobs_shapes() {
        let blobs = Blobs::new(array![[0.0, 0.0], [5.0, 5.0], [10.0, 0.0]])
            .n_samples_per_center(20)
            .random_state(1);
        let (x, labels) = blobs.generate().unwrap();

        assert_eq!(blobs.n_samples(), 60);
        assert_eq!(x.shape(), &[60, 2]);
        assert_eq!(labels.len(), 60);
        assert_eq!(labels[0], 0);
        assert_eq!(labels[20], 1);
        assert_eq!(labels[59], 2);
    }

    #[test]
    fn test_blobs_zero_spread_repeats_centers() {
        let (x, _) = Blobs::new(array![[1.0, -1.0], [4.0, 2.0]])
            .n_samples_per_center(3)
            .std_dev(0.0)
            .random_state(7)
            .generate()
            .unwrap();

        for i in 0..3 {
            assert_eq!(x.row(i).to_vec(), vec![1.0, -1.0]);
            assert_eq!(x.row(i + 3).to_vec(), vec![4.0, 2.0]);
        }
    }

    #[test]
    fn test_blobs_reproducible() {
        let blobs = Blobs::new(array![[0.0], [3.0]]).random_state(99);
        assert_eq!(blobs.generate().unwrap(), blobs.generate().unwrap());
    }

    #[test]
    fn test_blobs_invalid() {
        assert_eq!(
            Blobs::new(Matrix::zeros((0, 2))).generate(),
            Err(Error::EmptyInput)
        );
        assert!(Blobs::new(array![[0.0]]).std_dev(-1.0).generate().is_err());
        assert!(Blobs::new(array![[0.0]]).n_samples_per_center(0).generate().is_err());
    }

    #[test]
    fn test_min_max_scale() {
        let x = array![[0.0, 5.0, 2.0], [10.0, 5.0, 4.0], [5.0, 5.0, 3.0]];
        let scaled = min_max_scale(&x);

        assert_eq!(scaled.column(0).to_vec(), vec![0.0, 1.0, 0.5]);
        assert_eq!(scaled.column(1).to_vec(), vec![0.0, 0.0, 0.0]);
        assert_eq!(scaled.column(2).to_vec(), vec![0.0, 1.0, 0.5]);
    }
}
