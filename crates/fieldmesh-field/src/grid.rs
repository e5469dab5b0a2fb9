//! Dense 3D lattices: scalar fields and validity masks.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::error::{FieldError, Result};

/// A dense, fixed-shape 3D array indexed by lattice coordinates `(x, y, z)`.
///
/// Samples are stored row-major: `x` varies slowest, `z` fastest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "GridData<T>",
    bound(deserialize = "T: Deserialize<'de>")
)]
pub struct Grid3<T> {
    shape: [usize; 3],
    data: Vec<T>,
}

/// Unchecked wire form of [`Grid3`]; the length is verified on conversion.
#[derive(Deserialize)]
struct GridData<T> {
    shape: [usize; 3],
    data: Vec<T>,
}

impl<T> TryFrom<GridData<T>> for Grid3<T> {
    type Error = FieldError;

    fn try_from(raw: GridData<T>) -> Result<Self> {
        Self::from_vec(raw.shape, raw.data)
    }
}

/// A dense 3D array of floating-point samples.
pub type ScalarField = Grid3<f64>;

/// A same-shape boolean array; `true` marks cells an agent may occupy.
pub type ValidityMask = Grid3<bool>;

impl<T: Clone> Grid3<T> {
    /// Create a grid with every cell set to `value`.
    pub fn filled(shape: [usize; 3], value: T) -> Self {
        Self {
            shape,
            data: vec![value; shape[0] * shape[1] * shape[2]],
        }
    }

    /// Create a grid by evaluating `f` at every lattice coordinate.
    pub fn from_fn(shape: [usize; 3], mut f: impl FnMut(usize, usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(shape[0] * shape[1] * shape[2]);
        for x in 0..shape[0] {
            for y in 0..shape[1] {
                for z in 0..shape[2] {
                    data.push(f(x, y, z));
                }
            }
        }
        Self { shape, data }
    }
}

impl<T> Grid3<T> {
    /// Wrap row-major `data` with the given shape.
    pub fn from_vec(shape: [usize; 3], data: Vec<T>) -> Result<Self> {
        let expected = shape[0] * shape[1] * shape[2];
        if data.len() != expected {
            return Err(FieldError::DataLength {
                shape,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Wrap row-major `data` described by an arbitrary-rank shape.
    ///
    /// Fails unless the shape has exactly three axes.
    pub fn from_shape_vec(shape: &[usize], data: Vec<T>) -> Result<Self> {
        match *shape {
            [nx, ny, nz] => Self::from_vec([nx, ny, nz], data),
            _ => Err(FieldError::NotThreeDimensional {
                shape: shape.to_vec(),
            }),
        }
    }

    /// Grid shape `[nx, ny, nz]`.
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat index of `(x, y, z)`.
    #[inline]
    pub fn offset(&self, x: usize, y: usize, z: usize) -> usize {
        (x * self.shape[1] + y) * self.shape[2] + z
    }

    /// Lattice coordinate of a flat index.
    #[inline]
    pub fn coords(&self, offset: usize) -> [usize; 3] {
        let z = offset % self.shape[2];
        let y = (offset / self.shape[2]) % self.shape[1];
        let x = offset / (self.shape[1] * self.shape[2]);
        [x, y, z]
    }

    /// Checked access.
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<&T> {
        if x < self.shape[0] && y < self.shape[1] && z < self.shape[2] {
            Some(&self.data[self.offset(x, y, z)])
        } else {
            None
        }
    }

    /// Row-major view of all samples.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable row-major view of all samples.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the grid, returning its samples.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Map every sample into a new same-shape grid.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid3<U> {
        Grid3 {
            shape: self.shape,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T> Index<[usize; 3]> for Grid3<T> {
    type Output = T;

    fn index(&self, [x, y, z]: [usize; 3]) -> &T {
        &self.data[self.offset(x, y, z)]
    }
}

impl<T> IndexMut<[usize; 3]> for Grid3<T> {
    fn index_mut(&mut self, [x, y, z]: [usize; 3]) -> &mut T {
        let i = self.offset(x, y, z);
        &mut self.data[i]
    }
}

impl ScalarField {
    /// Smallest sample, or `None` for an empty field.
    pub fn min_value(&self) -> Option<f64> {
        self.data.iter().copied().reduce(f64::min)
    }

    /// Largest sample, or `None` for an empty field.
    pub fn max_value(&self) -> Option<f64> {
        self.data.iter().copied().reduce(f64::max)
    }

    /// Build a 3D field by repeating a 2D `width × depth` pattern along z.
    ///
    /// `pattern` is row-major over `(x, y)`.
    pub fn extrude_pattern(
        pattern: &[f64],
        width: usize,
        depth: usize,
        height_samples: usize,
    ) -> Result<Self> {
        if pattern.len() != width * depth {
            return Err(FieldError::DataLength {
                shape: [width, depth, 1],
                expected: width * depth,
                actual: pattern.len(),
            });
        }
        Ok(Self::from_fn([width, depth, height_samples], |x, y, _| {
            pattern[x * depth + y]
        }))
    }
}

impl ValidityMask {
    /// A mask with every cell valid.
    pub fn full(shape: [usize; 3]) -> Self {
        Self::filled(shape, true)
    }

    /// Number of valid cells.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// Coordinates of every valid cell, in lattice order.
    pub fn cells(&self) -> Vec<[usize; 3]> {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, &v)| v)
            .map(|(i, _)| self.coords(i))
            .collect()
    }

    /// Convert to a scalar field with `inside` on valid cells and `outside` elsewhere.
    pub fn to_field(&self, inside: f64, outside: f64) -> ScalarField {
        self.map(|&v| if v { inside } else { outside })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_roundtrip() {
        let grid = ScalarField::filled([3, 4, 5], 0.0);
        for i in 0..grid.len() {
            let [x, y, z] = grid.coords(i);
            assert_eq!(grid.offset(x, y, z), i);
        }
    }

    #[test]
    fn test_from_shape_vec_rejects_non_3d() {
        let err = ScalarField::from_shape_vec(&[4, 4], vec![0.0; 16]).unwrap_err();
        assert!(matches!(err, FieldError::NotThreeDimensional { .. }));
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        let err = ScalarField::from_vec([2, 2, 2], vec![0.0; 7]).unwrap_err();
        assert!(matches!(err, FieldError::DataLength { expected: 8, actual: 7, .. }));
    }

    #[test]
    fn test_deserialize_checks_length() {
        let ok: ScalarField = toml::from_str("shape = [1, 1, 2]\ndata = [0.5, 1.5]").unwrap();
        assert_eq!(ok[[0, 0, 1]], 1.5);
        let short = toml::from_str::<ScalarField>("shape = [1, 1, 2]\ndata = [0.5]");
        assert!(short.is_err());
    }

    #[test]
    fn test_index_row_major() {
        let grid = ScalarField::from_fn([2, 3, 4], |x, y, z| (x * 100 + y * 10 + z) as f64);
        assert_eq!(grid[[1, 2, 3]], 123.0);
        assert_eq!(grid.as_slice()[1], 1.0);
        assert!(grid.get(2, 0, 0).is_none());
    }

    #[test]
    fn test_mask_cells_and_count() {
        let mut mask = ValidityMask::filled([2, 2, 2], false);
        mask[[0, 1, 1]] = true;
        mask[[1, 0, 0]] = true;
        assert_eq!(mask.count(), 2);
        assert_eq!(mask.cells(), vec![[0, 1, 1], [1, 0, 0]]);
    }

    #[test]
    fn test_extrude_pattern() {
        let pattern = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let field = ScalarField::extrude_pattern(&pattern, 2, 3, 4).unwrap();
        assert_eq!(field.shape(), [2, 3, 4]);
        for z in 0..4 {
            assert_eq!(field[[1, 2, z]], 6.0);
            assert_eq!(field[[0, 1, z]], 2.0);
        }
        assert!(ScalarField::extrude_pattern(&pattern, 4, 4, 2).is_err());
    }

    #[test]
    fn test_min_max() {
        let field = ScalarField::from_fn([2, 2, 2], |x, y, z| (x + y + z) as f64);
        assert_eq!(field.min_value(), Some(0.0));
        assert_eq!(field.max_value(), Some(3.0));
    }
}
