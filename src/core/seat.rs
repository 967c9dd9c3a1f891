//! Seat identification and per-seat data storage.
//!
//! ## Seat
//!
//! One of the four fixed player identities. Seats are ordered by their
//! track entry offset, which is also the round-robin turn order.
//!
//! ## SeatMap
//!
//! Fixed-size per-seat storage with O(1) access, indexable by `Seat`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Number of seats around the board.
pub const SEAT_COUNT: usize = 4;

/// A player identity around the board.
///
/// Discriminants follow turn order: Blue, Red, Green, Yellow, then back to Blue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Seat {
    Blue = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
}

impl Seat {
    /// All seats in turn order.
    pub const ALL: [Seat; SEAT_COUNT] = [Seat::Blue, Seat::Red, Seat::Green, Seat::Yellow];

    /// Get the seat's index (0-based, turn order).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Get a seat from its index.
    ///
    /// ```
    /// use ludo_core::core::Seat;
    ///
    /// assert_eq!(Seat::from_index(3), Some(Seat::Yellow));
    /// assert_eq!(Seat::from_index(4), None);
    /// ```
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Seat> {
        match index {
            0 => Some(Seat::Blue),
            1 => Some(Seat::Red),
            2 => Some(Seat::Green),
            3 => Some(Seat::Yellow),
            _ => None,
        }
    }

    /// The seat that follows this one in fixed rotation order.
    #[must_use]
    pub const fn next(self) -> Seat {
        match self {
            Seat::Blue => Seat::Red,
            Seat::Red => Seat::Green,
            Seat::Green => Seat::Yellow,
            Seat::Yellow => Seat::Blue,
        }
    }

    /// Upper-case label used in status messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Seat::Blue => "BLUE",
            Seat::Red => "RED",
            Seat::Green => "GREEN",
            Seat::Yellow => "YELLOW",
        }
    }
}

impl std::fmt::Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Seat::Blue => "Blue",
            Seat::Red => "Red",
            Seat::Green => "Green",
            Seat::Yellow => "Yellow",
        };
        f.write_str(name)
    }
}

/// Per-seat data storage with O(1) access.
///
/// ## Example
///
/// ```
/// use ludo_core::core::{Seat, SeatMap};
///
/// let mut finished: SeatMap<u8> = SeatMap::with_value(0);
/// finished[Seat::Red] += 1;
/// assert_eq!(finished[Seat::Red], 1);
/// assert_eq!(finished[Seat::Blue], 0);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatMap<T> {
    data: [T; SEAT_COUNT],
}

impl<T> SeatMap<T> {
    /// Create a new SeatMap with values from a factory function.
    pub fn new(factory: impl Fn(Seat) -> T) -> Self {
        Self {
            data: Seat::ALL.map(factory),
        }
    }

    /// Create a new SeatMap with all entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self::new(|_| value.clone())
    }

    /// Get a reference to a seat's data.
    #[must_use]
    pub fn get(&self, seat: Seat) -> &T {
        &self.data[seat.index()]
    }

    /// Get a mutable reference to a seat's data.
    pub fn get_mut(&mut self, seat: Seat) -> &mut T {
        &mut self.data[seat.index()]
    }

    /// Iterate over (Seat, &T) pairs in turn order.
    pub fn iter(&self) -> impl Iterator<Item = (Seat, &T)> {
        Seat::ALL.into_iter().zip(self.data.iter())
    }
}

impl<T: Default> Default for SeatMap<T> {
    fn default() -> Self {
        Self::new(|_| T::default())
    }
}

impl<T> Index<Seat> for SeatMap<T> {
    type Output = T;

    fn index(&self, seat: Seat) -> &Self::Output {
        self.get(seat)
    }
}

impl<T> IndexMut<Seat> for SeatMap<T> {
    fn index_mut(&mut self, seat: Seat) -> &mut Self::Output {
        self.get_mut(seat)
    }
}
