//! Axis permutations and the canonical channel-last/channel-first layouts.
//!
//! A permutation `perm` describes a Transpose: output axis `i` is taken from
//! input axis `perm[i]`.

/// Errors when building a [`Permutation`] from untrusted axis lists.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PermutationError {
    /// An axis index is negative or not below the rank.
    #[error("axis {axis} out of range for rank {rank}")]
    AxisOutOfRange { axis: i64, rank: usize },

    /// An axis index appears more than once.
    #[error("axis {0} appears more than once")]
    DuplicateAxis(usize),
}

/// A validated permutation of `[0, rank)` together with its inverse.
///
/// Both directions are computed once at construction and travel together.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Permutation {
    forward: Vec<usize>,
    inverse: Vec<usize>,
}

impl Permutation {
    /// Validates `forward` and precomputes its inverse.
    pub fn new(forward: Vec<usize>) -> Result<Self, PermutationError> {
        let rank = forward.len();
        let mut inverse = vec![usize::MAX; rank];
        for (i, &axis) in forward.iter().enumerate() {
            if axis >= rank {
                return Err(PermutationError::AxisOutOfRange {
                    axis: axis as i64,
                    rank,
                });
            }
            if inverse[axis] != usize::MAX {
                return Err(PermutationError::DuplicateAxis(axis));
            }
            inverse[axis] = i;
        }
        Ok(Self { forward, inverse })
    }

    /// Reads a `perm` attribute as stored on Transpose nodes.
    pub fn from_i64(perm: &[i64]) -> Result<Self, PermutationError> {
        let rank = perm.len();
        let forward = perm
            .iter()
            .map(|&axis| {
                usize::try_from(axis).map_err(|_| PermutationError::AxisOutOfRange { axis, rank })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(forward)
    }

    pub fn identity(rank: usize) -> Self {
        let forward: Vec<usize> = (0..rank).collect();
        Self {
            inverse: forward.clone(),
            forward,
        }
    }

    /// NHWC to NCHW for `rank`: `[0, rank-1, 1, ..., rank-2]`.
    ///
    /// Returns `None` for rank < 2, where no channel axis exists.
    pub fn channel_last_to_first(rank: usize) -> Option<Self> {
        let forward = channel_last_to_first_perm(rank)?;
        let inverse = invert_perm(&forward);
        Some(Self { forward, inverse })
    }

    /// NCHW to NHWC for `rank`, the inverse of
    /// [`channel_last_to_first`](Self::channel_last_to_first).
    pub fn channel_first_to_last(rank: usize) -> Option<Self> {
        Self::channel_last_to_first(rank).map(Self::inverted)
    }

    pub fn rank(&self) -> usize {
        self.forward.len()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.forward
    }

    pub fn inverse_slice(&self) -> &[usize] {
        &self.inverse
    }

    /// The inverse permutation, with this one as its inverse.
    pub fn inverted(self) -> Self {
        Self {
            forward: self.inverse,
            inverse: self.forward,
        }
    }

    pub fn is_identity(&self) -> bool {
        is_identity(&self.forward)
    }

    /// Reorders `items` the way a Transpose with this permutation reorders
    /// axes: `out[i] = items[perm[i]]`.
    ///
    /// # Panics
    ///
    /// Panics if `items.len() != self.rank()`.
    pub fn apply<T: Clone>(&self, items: &[T]) -> Vec<T> {
        permute(items, &self.forward)
    }

    /// The forward order as `i64`, for the `perm` attribute.
    pub fn to_i64(&self) -> Vec<i64> {
        self.forward.iter().map(|&axis| axis as i64).collect()
    }
}

/// `[0, rank-1, 1, 2, ..., rank-2]`, or `None` for rank < 2.
pub fn channel_last_to_first_perm(rank: usize) -> Option<Vec<usize>> {
    if rank < 2 {
        return None;
    }
    let mut perm = Vec::with_capacity(rank);
    perm.push(0);
    perm.push(rank - 1);
    perm.extend(1..rank - 1);
    Some(perm)
}

/// Inverse of a valid permutation.
pub fn invert_perm(perm: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; perm.len()];
    for (i, &axis) in perm.iter().enumerate() {
        inverse[axis] = i;
    }
    inverse
}

/// The single permutation equivalent to transposing by `first`, then by
/// `second`.
pub fn compose_perm(first: &[usize], second: &[usize]) -> Vec<usize> {
    second.iter().map(|&axis| first[axis]).collect()
}

pub fn is_identity(perm: &[usize]) -> bool {
    perm.iter().enumerate().all(|(i, &axis)| i == axis)
}

/// `out[i] = items[perm[i]]`.
pub fn permute<T: Clone>(items: &[T], perm: &[usize]) -> Vec<T> {
    assert_eq!(
        items.len(),
        perm.len(),
        "permute: {} items for a rank {} permutation",
        items.len(),
        perm.len()
    );
    perm.iter().map(|&axis| items[axis].clone()).collect()
}
