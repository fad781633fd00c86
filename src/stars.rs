use ndarray::{Array2, ArrayView1, Axis};

/// Point mass lenses used to generate a map
#[derive(Debug, Clone)]
pub struct Stars {
    /// whether the star field is rectangular or circular
    pub rectangular: bool,
    /// corner of the star field, centered at the origin
    pub corner: [f64; 2],
    /// Einstein radius of a unit mass point lens
    pub theta_star: f64,
    // rows of (x1, x2, mass)
    stars: Array2<f64>,
}
impl Stars {
    pub fn new(rectangular: bool, corner: [f64; 2], theta_star: f64, stars: Array2<f64>) -> Self {
        Self {
            rectangular,
            corner,
            theta_star,
            stars,
        }
    }
    pub fn num_stars(&self) -> usize {
        self.stars.nrows()
    }
    /// Star positions and masses as `(x1, x2, m)` rows
    pub fn stars(&self) -> &Array2<f64> {
        &self.stars
    }
    fn masses(&self) -> ArrayView1<'_, f64> {
        self.stars.index_axis(Axis(1), 2)
    }
    fn mean_of(&self, f: impl Fn(f64) -> f64) -> f64 {
        self.masses().iter().map(|&m| f(m)).sum::<f64>() / self.num_stars() as f64
    }
    pub fn mean_mass_actual(&self) -> f64 {
        self.mean_of(|m| m)
    }
    pub fn mean_mass2_actual(&self) -> f64 {
        self.mean_of(|m| m * m)
    }
    pub fn mean_mass2_ln_mass_actual(&self) -> f64 {
        self.mean_of(|m| m * m * m.ln())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn mass_moments() {
        let stars = Stars::new(
            true,
            [10., 10.],
            1.,
            array![[0., 0., 1.], [1., -1., 2.], [-3., 2., 0.5]],
        );
        assert_eq!(stars.num_stars(), 3);
        assert_relative_eq!(stars.mean_mass_actual(), 3.5 / 3.);
        assert_relative_eq!(stars.mean_mass2_actual(), 5.25 / 3.);
        assert_relative_eq!(
            stars.mean_mass2_ln_mass_actual(),
            (4. * 2f64.ln() + 0.25 * 0.5f64.ln()) / 3.
        );
    }
}
