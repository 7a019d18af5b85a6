use std::fmt;

use crate::error::VisualError;

/// Row/column extent of a 2D array.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

impl Shape {
    #[inline]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Shape of a 1D sequence viewed as a column.
    #[inline]
    pub const fn column(len: usize) -> Self {
        Self { rows: len, cols: 1 }
    }

    #[inline]
    pub const fn len(self) -> usize {
        self.rows * self.cols
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.rows, self.cols)
    }
}

/// Dense row-major 2D array.
#[derive(Debug, Clone, PartialEq)]
pub struct Array2<T> {
    data: Vec<T>,
    shape: Shape,
}

impl<T> Array2<T> {
    /// Wraps `data` as a `rows × cols` array.
    ///
    /// Fails with `InvalidValue` when the element count does not match.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self, VisualError> {
        let shape = Shape::new(rows, cols);
        if data.len() != shape.len() {
            return Err(VisualError::InvalidValue {
                attribute: "array",
                reason: format!("{} elements cannot fill shape {shape}", data.len()),
            });
        }
        Ok(Self { data, shape })
    }

    /// An array with no rows and `cols` columns.
    pub fn empty(cols: usize) -> Self {
        Self { data: Vec::new(), shape: Shape::new(0, cols) }
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.shape.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.shape.cols
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Row `i`. Panics when out of range, like slice indexing.
    #[inline]
    pub fn row(&self, i: usize) -> &[T] {
        let cols = self.shape.cols;
        &self.data[i * cols..(i + 1) * cols]
    }

    pub fn iter_rows(&self) -> impl ExactSizeIterator<Item = &[T]> + '_ {
        (0..self.shape.rows).map(move |i| self.row(i))
    }
}

impl<T: Copy, const N: usize> From<&[[T; N]]> for Array2<T> {
    fn from(rows: &[[T; N]]) -> Self {
        Self {
            data: rows.iter().flatten().copied().collect(),
            shape: Shape::new(rows.len(), N),
        }
    }
}

impl<T: Copy, const N: usize> From<Vec<[T; N]>> for Array2<T> {
    fn from(rows: Vec<[T; N]>) -> Self {
        Self::from(rows.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_checks_element_count() {
        assert!(Array2::from_vec(2, 3, vec![0.0f32; 6]).is_ok());
        assert!(matches!(
            Array2::from_vec(2, 3, vec![0.0f32; 5]),
            Err(VisualError::InvalidValue { .. })
        ));
    }

    #[test]
    fn rows_are_row_major() {
        let a = Array2::from(vec![[1, 2], [3, 4], [5, 6]]);
        assert_eq!(a.shape(), Shape::new(3, 2));
        assert_eq!(a.row(1), &[3, 4]);
        let collected: Vec<&[i32]> = a.iter_rows().collect();
        assert_eq!(collected.len(), 3);
    }

    #[test]
    fn zero_column_rows_are_empty_slices() {
        let a: Array2<f32> = Array2::from_vec(4, 0, Vec::new()).unwrap();
        assert_eq!(a.iter_rows().count(), 4);
        assert!(a.row(3).is_empty());
    }

    #[test]
    fn shape_display() {
        assert_eq!(Shape::new(100, 3).to_string(), "(100, 3)");
    }
}
