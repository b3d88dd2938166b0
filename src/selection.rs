//! Hyperslab selections over an extent.
//!
//! A [`Selection`] is a set of disjoint rectangular blocks inside an extent. Blocks are
//! combined with the set operators of [`Mode`]; [`Selection::offset`] shifts the whole
//! selection without changing its shape, and [`Selection::is_valid`] tells whether the shifted
//! blocks still fit in the extent.
use smallvec::SmallVec;

use crate::{dataset::DataSet, error::ArrayError, host::HostAdapter, shape::Shape};

/// Named whole-extent selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    None,
    All,
}

/// How a new hyperslab combines with the existing selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Replace the selection.
    #[default]
    Set,
    /// Union.
    Or,
    /// Intersection.
    And,
    /// Symmetric difference.
    Xor,
    /// Elements of the new hyperslab that are not selected yet.
    NotA,
    /// Selected elements that are not in the new hyperslab.
    NotB,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Block {
    start: Shape,
    count: Shape,
}

impl Block {
    fn end(&self, dim: usize) -> usize {
        self.start[dim] + self.count[dim]
    }

    fn intersect(&self, other: &Block) -> Option<Block> {
        let mut start = Shape::zeros(self.start.rank());
        let mut count = Shape::zeros(self.start.rank());
        for d in 0..self.start.rank() {
            let lo = self.start[d].max(other.start[d]);
            let hi = self.end(d).min(other.end(d));
            if lo >= hi {
                return None;
            }
            start[d] = lo;
            count[d] = hi - lo;
        }
        Some(Block { start, count })
    }

    /// `self \ other` as disjoint blocks.
    fn subtract(&self, other: &Block) -> Vec<Block> {
        let Some(common) = self.intersect(other) else {
            return vec![self.clone()];
        };
        let mut pieces = Vec::new();
        let mut rest = self.clone();
        for d in 0..rest.start.rank() {
            if rest.start[d] < common.start[d] {
                let mut below = rest.clone();
                below.count[d] = common.start[d] - rest.start[d];
                pieces.push(below);
            }
            if common.end(d) < rest.end(d) {
                let mut above = rest.clone();
                above.start[d] = common.end(d);
                above.count[d] = rest.end(d) - common.end(d);
                pieces.push(above);
            }
            rest.start[d] = common.start[d];
            rest.count[d] = common.count[d];
        }
        pieces
    }
}

fn subtract_all(blocks: &[Block], other: &[Block]) -> Vec<Block> {
    other.iter().fold(blocks.to_vec(), |acc, cut| {
        acc.iter().flat_map(|b| b.subtract(cut)).collect()
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    extent: Shape,
    blocks: Vec<Block>,
    shift: SmallVec<[i64; 4]>,
}

impl Selection {
    /// Select everything in `extent`.
    pub fn new(extent: Shape) -> Self {
        let mut selection = Self {
            shift: smallvec::smallvec![0; extent.rank()],
            extent,
            blocks: Vec::new(),
        };
        selection.select_preset(Preset::All);
        selection
    }

    /// Select everything in the shape of a host value.
    pub fn for_value<T: HostAdapter + ?Sized>(value: &T) -> Self {
        Self::new(value.shape())
    }

    /// Select everything in the current extent of a dataset.
    pub fn for_target<D: DataSet + ?Sized>(target: &D) -> Result<Self, ArrayError> {
        Ok(Self::new(target.extent()?))
    }

    pub fn extent(&self) -> &Shape {
        &self.extent
    }

    pub fn rank(&self) -> usize {
        self.extent.rank()
    }

    pub fn select_preset(&mut self, preset: Preset) -> &mut Self {
        self.blocks.clear();
        if preset == Preset::All && self.extent.nelms() > 0 {
            self.blocks.push(Block {
                start: Shape::zeros(self.extent.rank()),
                count: self.extent.clone(),
            });
        }
        self
    }

    /// Combine the hyperslab `count` at `start` with the current selection.
    ///
    /// A hyperslab with a zero component selects nothing.
    pub fn select(&mut self, count: &Shape, start: &Shape, mode: Mode) -> Result<&mut Self, ArrayError> {
        for shape in [count, start] {
            if shape.rank() != self.rank() {
                return Err(ArrayError::ShapeMismatch {
                    lhs: self.rank(),
                    rhs: shape.rank(),
                });
            }
        }
        start.checked_add(count)?;

        let new: Vec<Block> = if count.iter().any(|&c| c == 0) {
            Vec::new()
        } else {
            vec![Block {
                start: start.clone(),
                count: count.clone(),
            }]
        };
        let old = std::mem::take(&mut self.blocks);

        self.blocks = match mode {
            Mode::Set => new,
            Mode::Or => {
                let added = subtract_all(&new, &old);
                let mut blocks = old;
                blocks.extend(added);
                blocks
            }
            Mode::And => old
                .iter()
                .flat_map(|a| new.iter().filter_map(move |b| a.intersect(b)))
                .collect(),
            Mode::Xor => {
                let mut blocks = subtract_all(&old, &new);
                blocks.extend(subtract_all(&new, &old));
                blocks
            }
            Mode::NotA => subtract_all(&new, &old),
            Mode::NotB => subtract_all(&old, &new),
        };
        Ok(self)
    }

    /// Shift the selection by `delta` (replacing any earlier shift).
    pub fn offset(&mut self, delta: &[i64]) -> Result<&mut Self, ArrayError> {
        if delta.len() != self.rank() {
            return Err(ArrayError::ShapeMismatch {
                lhs: self.rank(),
                rhs: delta.len(),
            });
        }
        self.shift = SmallVec::from_slice(delta);
        Ok(self)
    }

    pub fn num_elements(&self) -> usize {
        self.blocks.iter().map(|b| b.count.nelms()).sum()
    }

    /// Whether every shifted block lies inside the extent.
    pub fn is_valid(&self) -> bool {
        self.blocks.iter().all(|b| self.shifted(b).is_some())
    }

    /// Inclusive `(start, end)` corners of the shifted selection.
    pub fn bounds(&self) -> Result<(Shape, Shape), ArrayError> {
        let (start, end) = self.raw_bounds()?;
        let shift_one = |v: &Shape| -> Result<Shape, ArrayError> {
            v.iter()
                .zip(self.shift.iter())
                .map(|(&x, &s)| {
                    usize::try_from(x as i64 + s).map_err(|_| ArrayError::OutOfBounds {
                        index: v.clone(),
                        extent: self.extent.clone(),
                    })
                })
                .collect()
        };
        Ok((shift_one(&start)?, shift_one(&end)?))
    }

    /// Size of the bounding box, `(end - start) + 1` per dimension.
    pub fn size(&self) -> Result<Shape, ArrayError> {
        let (start, end) = self.raw_bounds()?;
        Ok(&(&end - &start) + 1)
    }

    /// The shifted `(count, start)` blocks, in selection order.
    ///
    /// # Errors
    /// [`ArrayError::OutOfBounds`] if the selection is not valid.
    pub fn hyperslabs(&self) -> Result<Vec<(Shape, Shape)>, ArrayError> {
        self.blocks
            .iter()
            .map(|b| {
                self.shifted(b)
                    .map(|start| (b.count.clone(), start))
                    .ok_or_else(|| ArrayError::OutOfBounds {
                        index: &b.start + &b.count,
                        extent: self.extent.clone(),
                    })
            })
            .collect()
    }

    fn shifted(&self, block: &Block) -> Option<Shape> {
        (0..self.rank())
            .map(|d| {
                let start = usize::try_from(block.start[d] as i64 + self.shift[d]).ok()?;
                (start + block.count[d] <= self.extent[d]).then_some(start)
            })
            .collect()
    }

    fn raw_bounds(&self) -> Result<(Shape, Shape), ArrayError> {
        let first = self.blocks.first().ok_or(ArrayError::EmptySelection)?;
        let mut start = first.start.clone();
        let mut end = &(&first.start + &first.count) - 1;
        for block in &self.blocks[1..] {
            for d in 0..self.rank() {
                start[d] = start[d].min(block.start[d]);
                end[d] = end[d].max(block.end(d) - 1);
            }
        }
        Ok((start, end))
    }
}
