use serde::{Deserialize, Serialize};

use crate::position::Point;

/// A stored selection: where it started and where it ended, as [`Point`]s.
///
/// `start` is the anchor and `end` the focus, so a selection made
/// right-to-left has `start` after `end`. Use [`Selection::absolute_start`]
/// and [`Selection::absolute_end`] for document order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub start: Point,
    pub end: Point,
}

impl Selection {
    /// A selection from `start` to `end`, or a collapsed one at `start` when
    /// `end` is `None`.
    pub fn new(start: Point, end: Option<Point>) -> Self {
        Self {
            start,
            end: end.unwrap_or(start),
        }
    }

    pub fn collapsed(at: Point) -> Self {
        Self::new(at, None)
    }

    pub fn range(start: Point, end: Point) -> Self {
        Self::new(start, Some(end))
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// True when `start` comes after `end` in document order.
    pub fn is_backwards(&self) -> bool {
        self.start > self.end
    }

    /// The endpoint that comes first in document order.
    pub fn absolute_start(&self) -> Point {
        if self.is_backwards() {
            self.end
        } else {
            self.start
        }
    }

    /// The endpoint that comes last in document order.
    pub fn absolute_end(&self) -> Point {
        if self.is_backwards() {
            self.start
        } else {
            self.end
        }
    }

    /// Compares two possibly absent selections. Two absent selections are
    /// equal; an absent one never equals a present one.
    pub fn equals(first: Option<&Selection>, second: Option<&Selection>) -> bool {
        match (first, second) {
            (Some(a), Some(b)) => a == b,
            (None, None) => true,
            _ => false,
        }
    }
}
