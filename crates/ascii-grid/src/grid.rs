//! Dense row-major raster.

use flo2d_common::GridDimensions;

/// Default no-data sentinel.
pub const DEFAULT_NODATA: f64 = -9999.0;

/// Round to two decimal places, ties to even.
///
/// Ties are decided on the shortest decimal text of `value`, so `0.125`
/// rounds to `0.12` and `0.375` to `0.38` even though neither is exact in
/// binary.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    // Display never uses exponent notation for floats.
    let text = value.abs().to_string();
    let Some((whole, frac)) = text.split_once('.') else {
        return value;
    };
    let digits = frac.as_bytes();
    if digits.len() <= 2 {
        return value;
    }
    let Some(mut cents) = whole
        .parse::<u64>()
        .ok()
        .and_then(|w| w.checked_mul(100))
        .map(|w| w + u64::from(digits[0] - b'0') * 10 + u64::from(digits[1] - b'0'))
    else {
        return value;
    };

    let round_up = match digits[2] {
        b'6'..=b'9' => true,
        b'5' => digits[3..].iter().any(|d| *d != b'0') || cents % 2 == 1,
        _ => false,
    };
    if round_up {
        cents += 1;
    }

    let rounded = cents as f64 / 100.0;
    if value.is_sign_negative() && cents > 0 {
        -rounded
    } else {
        rounded
    }
}

/// Raster addressed `[row][col]`, row 0 northernmost.
///
/// Every cell starts as the no-data sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cols: usize,
    rows: usize,
    nodata: f64,
    data: Vec<f64>,
}

impl Grid {
    pub fn new(dimensions: GridDimensions, nodata: f64) -> Self {
        Self {
            cols: dimensions.cols,
            rows: dimensions.rows,
            nodata,
            data: vec![nodata; dimensions.len()],
        }
    }

    pub(crate) fn from_parts(cols: usize, rows: usize, nodata: f64, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), cols * rows);
        Self {
            cols,
            rows,
            nodata,
            data,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn dimensions(&self) -> GridDimensions {
        GridDimensions {
            cols: self.cols,
            rows: self.rows,
        }
    }

    pub fn nodata(&self) -> f64 {
        self.nodata
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: f64) {
        if row < self.rows && col < self.cols {
            self.data[row * self.cols + col] = value;
        }
    }

    /// One row of values, west to east.
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn is_nodata(&self, value: f64) -> bool {
        value == self.nodata
    }

    /// Number of cells holding a value.
    pub fn populated(&self) -> usize {
        self.data.iter().filter(|v| !self.is_nodata(**v)).count()
    }

    pub fn values(&self) -> &[f64] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_nodata() {
        let grid = Grid::new(GridDimensions { cols: 3, rows: 2 }, DEFAULT_NODATA);
        assert_eq!(grid.values().len(), 6);
        assert_eq!(grid.populated(), 0);
        assert_eq!(grid.get(1, 2), Some(-9999.0));
        assert_eq!(grid.get(2, 0), None);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.456), 0.46);
        assert_eq!(round2(1.0), 1.0);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-0.125), -0.12);
        assert_eq!(round2(0.1251), 0.13);
        assert_eq!(round2(0.296), 0.3);
        assert_eq!(round2(0.004), 0.0);
        assert!(round2(-0.001).is_sign_positive());
        assert_eq!(round2(0.09999999999999964), 0.1);
    }
}
