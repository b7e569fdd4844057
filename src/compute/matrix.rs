//! Dense symmetric coefficient matrix.

/// Square matrix of pairwise objective terms, stored row-major.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoefficientMatrix {
    dim: usize,
    values: Vec<f64>,
}

impl CoefficientMatrix {
    /// Zero-filled `dim x dim` matrix.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            values: vec![0.0; dim * dim],
        }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.dim + j]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.values[i * self.dim + j] = value;
    }

    /// Write `value` to both `(i, j)` and `(j, i)`.
    #[inline]
    pub fn set_symmetric(&mut self, i: usize, j: usize, value: f64) {
        self.set(i, j, value);
        self.set(j, i, value);
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.dim..(i + 1) * self.dim]
    }

    /// Copy of column `j`.
    pub fn column(&self, j: usize) -> Vec<f64> {
        (0..self.dim).map(|i| self.get(i, j)).collect()
    }

    /// Write `column` back to column `j` and mirror it into row `j`.
    pub fn restore_column(&mut self, j: usize, column: &[f64]) {
        for (i, &value) in column.iter().enumerate() {
            self.set_symmetric(i, j, value);
        }
    }

    /// `Σ_{i <= j} M[i][j]`, summed row by row.
    pub fn upper_triangle_sum(&self) -> f64 {
        let mut sum = 0.0;
        for i in 0..self.dim {
            for j in i..self.dim {
                sum += self.get(i, j);
            }
        }
        sum
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.dim).all(|i| (i + 1..self.dim).all(|j| self.get(i, j) == self.get(j, i)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let m = CoefficientMatrix::new(3);
        assert_eq!(m.dim(), 3);
        assert!(m.row(2).iter().all(|&v| v == 0.0));
        assert_eq!(m.upper_triangle_sum(), 0.0);
    }

    #[test]
    fn test_symmetric_writes() {
        let mut m = CoefficientMatrix::new(3);
        m.set_symmetric(0, 2, 4.0);
        m.set(1, 1, 1.5);
        assert_eq!(m.get(2, 0), 4.0);
        assert!(m.is_symmetric());
        assert_eq!(m.upper_triangle_sum(), 5.5);

        m.set(1, 2, 1.0);
        assert!(!m.is_symmetric());
    }

    #[test]
    fn test_restore_column() {
        let mut m = CoefficientMatrix::new(3);
        m.set_symmetric(0, 1, 2.0);
        m.set_symmetric(1, 1, 3.0);
        m.set_symmetric(1, 2, 5.0);
        let saved = m.clone();
        let column = m.column(1);

        m.set_symmetric(0, 1, -1.0);
        m.set_symmetric(1, 2, -1.0);
        m.restore_column(1, &column);
        assert_eq!(m, saved);
    }
}
