//! Point-correspondence data model and turn-taking edit protocol.
//!
//! A correspondence set is an ordered collection of left/right point pairs.
//! Points are appended in strict alternation (left, right, left, ...), so the
//! two sides never differ in length by more than one. Pair IDs are positional
//! and recomputed at save time; they are not stable identities.

use thiserror::Error;

/// A 2D point in original-image pixel space.
///
/// Never stored in scaled/device space; see [`crate::transform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One matched correspondence with its positional 1-based ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointPair {
    pub id: usize,
    pub left: Point,
    pub right: Point,
}

/// Which side accepts the next click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Turn {
    #[default]
    Left,
    Right,
}

/// Errors from store mutation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// A point was offered to the side whose turn it is not.
    #[error("not this side's turn")]
    WrongTurn,

    /// Pair index outside `[0, pair_count)`.
    #[error("pair index {index} out of range (have {count} pairs)")]
    IndexOutOfRange { index: usize, count: usize },
}

/// Ordered collection of point pairs with strict left/right alternation.
///
/// The turn flag is owned here and flipped only by `add_left`/`add_right`;
/// callers cannot desynchronize it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrespondenceStore {
    left: Vec<Point>,
    right: Vec<Point>,
    turn: Turn,
}

impl CorrespondenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from balanced point lists (loading a saved file).
    ///
    /// The turn resets to left since a persisted file is always balanced.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Point, Point)>) -> Self {
        let (left, right) = pairs.into_iter().unzip();
        Self {
            left,
            right,
            turn: Turn::Left,
        }
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    /// Number of completed pairs.
    pub fn pair_count(&self) -> usize {
        self.left.len().min(self.right.len())
    }

    /// Number of unmatched points (0 or 1 under the alternation invariant).
    pub fn pending_count(&self) -> usize {
        self.left.len().abs_diff(self.right.len())
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    pub fn left_points(&self) -> &[Point] {
        &self.left
    }

    pub fn right_points(&self) -> &[Point] {
        &self.right
    }

    /// Completed pairs with positional 1-based IDs.
    pub fn pairs(&self) -> impl Iterator<Item = PointPair> + '_ {
        self.left
            .iter()
            .zip(&self.right)
            .enumerate()
            .map(|(i, (&left, &right))| PointPair {
                id: i + 1,
                left,
                right,
            })
    }

    /// Append a point on the left side. Fails unless it is the left turn.
    pub fn add_left(&mut self, point: Point) -> Result<(), StoreError> {
        if self.turn != Turn::Left {
            return Err(StoreError::WrongTurn);
        }
        self.left.push(point);
        self.turn = Turn::Right;
        log::debug!("Added left point ({}, {})", point.x, point.y);
        Ok(())
    }

    /// Append a point on the right side. Fails unless it is the right turn.
    pub fn add_right(&mut self, point: Point) -> Result<(), StoreError> {
        if self.turn != Turn::Right {
            return Err(StoreError::WrongTurn);
        }
        self.right.push(point);
        self.turn = Turn::Left;
        log::debug!("Added right point ({}, {})", point.x, point.y);
        Ok(())
    }

    /// Undo the most recent addition.
    ///
    /// Removes from whichever side currently has more points; when the sides
    /// are balanced, removes the last completed pair from both. No-op on an
    /// empty store. Exact inverse of the most recent `add_*`.
    pub fn undo_last(&mut self) {
        use std::cmp::Ordering;

        match self.left.len().cmp(&self.right.len()) {
            Ordering::Greater => {
                self.left.pop();
                self.turn = Turn::Left;
            }
            Ordering::Less => {
                self.right.pop();
                self.turn = Turn::Right;
            }
            Ordering::Equal => {
                if self.left.pop().is_some() {
                    self.right.pop();
                }
                self.turn = Turn::Left;
            }
        }
    }

    /// Remove the pair at position `index` from both sides.
    pub fn delete_at(&mut self, index: usize) -> Result<(), StoreError> {
        let count = self.pair_count();
        if index >= count {
            return Err(StoreError::IndexOutOfRange { index, count });
        }
        self.left.remove(index);
        self.right.remove(index);
        log::debug!("Deleted pair at index {}", index);
        Ok(())
    }

    /// Value snapshot of both point lists, for unsaved-change detection.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            left: self.left.clone(),
            right: self.right.clone(),
        }
    }

    /// Pairwise value comparison against a snapshot.
    pub fn matches(&self, snapshot: &Snapshot) -> bool {
        self.left == snapshot.left && self.right == snapshot.right
    }
}

/// Value copy of a store's point lists taken at save/load time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    left: Vec<Point>,
    right: Vec<Point>,
}
