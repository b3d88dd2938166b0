//! Shapes, extents and subscripts.
//!
//! [`Shape`] is an ordered list of non-negative integers, one per dimension. The same type is used
//! for array extents, window counts, window offsets and element subscripts.
//!
//! ## Arithmetic
//! `+`, `-`, `*` and `/` work elementwise between shapes of equal rank, or broadcast a scalar
//! `usize` over every component. The operator traits panic on a rank mismatch; use the
//! `checked_*` methods to get an [`ArrayError::ShapeMismatch`] instead.
//!
//! ## Comparison
//! The `all_*` comparisons mean "true for every component". They are *not* a total or partial
//! order: `{1, 5}` is neither `all_le` nor `all_gt` `{2, 3}`.
//!
//! ## The empty shape
//! A rank-0 shape doubles as the "unspecified" sentinel in the I/O APIs, and as the extent of a
//! scalar (which holds exactly one element, `nelms() == 1`).
use std::{fmt, ops};

use smallvec::SmallVec;

use crate::error::ArrayError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Shape(SmallVec<[usize; 4]>);

impl Shape {
    /// The empty (rank-0) shape.
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// A rank-`rank` shape with every component set to `value`.
    pub fn filled(rank: usize, value: usize) -> Self {
        Self(smallvec::smallvec![value; rank])
    }

    pub fn zeros(rank: usize) -> Self {
        Self::filled(rank, 0)
    }

    pub fn ones(rank: usize) -> Self {
        Self::filled(rank, 1)
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the rank-0 "unspecified" shape.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn fill(&mut self, value: usize) {
        self.0.iter_mut().for_each(|v| *v = value);
    }

    /// Number of elements spanned by this extent (the product of all components).
    ///
    /// The empty shape spans exactly one element.
    ///
    /// # Panics
    /// Panics if the product overflows `usize`; see [`Self::checked_nelms`].
    pub fn nelms(&self) -> usize {
        match self.checked_nelms() {
            Ok(n) => n,
            Err(e) => panic!("invalid shape {self}: {e}"),
        }
    }

    pub fn checked_nelms(&self) -> Result<usize, ArrayError> {
        self.0
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or(ArrayError::ShapeOverflow)
    }

    /// Sum of the pairwise products, e.g. `strides.dot(subscript)` flattens a subscript.
    pub fn dot(&self, other: &Shape) -> Result<usize, ArrayError> {
        self.check_rank(other)?;
        self.0
            .iter()
            .zip(other.0.iter())
            .try_fold(0usize, |acc, (&a, &b)| acc.checked_add(a.checked_mul(b)?))
            .ok_or(ArrayError::ShapeOverflow)
    }

    /// Row-major strides of this extent, in elements: `strides[last] = 1` and
    /// `strides[i] = strides[i + 1] * self[i + 1]`.
    pub fn strides(&self) -> Shape {
        let rank = self.rank();
        let mut strides = Shape::zeros(rank);
        if rank > 0 {
            strides.0[rank - 1] = 1;
            for i in (0..rank - 1).rev() {
                strides.0[i] = strides.0[i + 1] * self.0[i + 1];
            }
        }
        strides
    }

    pub fn checked_add(&self, rhs: &Shape) -> Result<Shape, ArrayError> {
        self.zip_with(rhs, usize::checked_add)
    }

    pub fn checked_sub(&self, rhs: &Shape) -> Result<Shape, ArrayError> {
        self.zip_with(rhs, usize::checked_sub)
    }

    pub fn checked_mul(&self, rhs: &Shape) -> Result<Shape, ArrayError> {
        self.zip_with(rhs, usize::checked_mul)
    }

    pub fn checked_div(&self, rhs: &Shape) -> Result<Shape, ArrayError> {
        self.zip_with(rhs, usize::checked_div)
    }

    pub fn all_lt(&self, rhs: &Shape) -> Result<bool, ArrayError> {
        self.all(rhs, |a, b| a < b)
    }

    pub fn all_le(&self, rhs: &Shape) -> Result<bool, ArrayError> {
        self.all(rhs, |a, b| a <= b)
    }

    pub fn all_gt(&self, rhs: &Shape) -> Result<bool, ArrayError> {
        self.all(rhs, |a, b| a > b)
    }

    pub fn all_ge(&self, rhs: &Shape) -> Result<bool, ArrayError> {
        self.all(rhs, |a, b| a >= b)
    }

    fn check_rank(&self, rhs: &Shape) -> Result<(), ArrayError> {
        if self.rank() != rhs.rank() {
            return Err(ArrayError::ShapeMismatch {
                lhs: self.rank(),
                rhs: rhs.rank(),
            });
        }
        Ok(())
    }

    fn all(&self, rhs: &Shape, f: impl Fn(usize, usize) -> bool) -> Result<bool, ArrayError> {
        self.check_rank(rhs)?;
        Ok(self.0.iter().zip(rhs.0.iter()).all(|(&a, &b)| f(a, b)))
    }

    fn zip_with(
        &self,
        rhs: &Shape,
        f: impl Fn(usize, usize) -> Option<usize>,
    ) -> Result<Shape, ArrayError> {
        self.check_rank(rhs)?;
        self.0
            .iter()
            .zip(rhs.0.iter())
            .map(|(&a, &b)| f(a, b).ok_or(ArrayError::ShapeOverflow))
            .collect()
    }
}

impl ops::Deref for Shape {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl ops::DerefMut for Shape {
    fn deref_mut(&mut self) -> &mut [usize] {
        &mut self.0
    }
}

impl FromIterator<usize> for Shape {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<&[usize]> for Shape {
    fn from(value: &[usize]) -> Self {
        Self(SmallVec::from_slice(value))
    }
}

impl From<Vec<usize>> for Shape {
    fn from(value: Vec<usize>) -> Self {
        Self(SmallVec::from_vec(value))
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(value: [usize; N]) -> Self {
        Self(value.into_iter().collect())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, v) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "}}")
    }
}

macro_rules! impl_shape_op {
    ($trait:ident, $method:ident, $checked:ident) => {
        impl ops::$trait<&Shape> for &Shape {
            type Output = Shape;

            fn $method(self, rhs: &Shape) -> Shape {
                match self.$checked(rhs) {
                    Ok(shape) => shape,
                    Err(e) => panic!("invalid shape arithmetic {self} and {rhs}: {e}"),
                }
            }
        }

        impl ops::$trait<Shape> for Shape {
            type Output = Shape;

            fn $method(self, rhs: Shape) -> Shape {
                ops::$trait::$method(&self, &rhs)
            }
        }

        impl ops::$trait<usize> for &Shape {
            type Output = Shape;

            fn $method(self, rhs: usize) -> Shape {
                self.0.iter().map(|&v| ops::$trait::$method(v, rhs)).collect()
            }
        }

        impl ops::$trait<usize> for Shape {
            type Output = Shape;

            fn $method(self, rhs: usize) -> Shape {
                ops::$trait::$method(&self, rhs)
            }
        }
    };
}

impl_shape_op!(Add, add, checked_add);
impl_shape_op!(Sub, sub, checked_sub);
impl_shape_op!(Mul, mul, checked_mul);
impl_shape_op!(Div, div, checked_div);
