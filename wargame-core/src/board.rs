//! Square grid geometry and board storage

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::MAX_DIM;
use crate::error::ParseError;
use crate::game::Player;
use crate::units::{Unit, UnitKind};

/// Row labels, one letter per row
const ROW_CHARS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Column labels, one hex digit per column
const COL_CHARS: &str = "0123456789abcdef";

/// Characters ignored when parsing coordinates
const SEPARATORS: &[char] = &[' ', ',', '.', ':', ';', '-', '_'];

/// Orthogonal steps in candidate order: up, left, down, right
pub const ORTHOGONAL: [(i8, i8); 4] = [(-1, 0), (0, -1), (1, 0), (0, 1)];

// ============================================================================
// COORDINATES
// ============================================================================

/// Board cell coordinate. Signed so neighbor arithmetic may leave the board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: i8,
    pub col: i8,
}

impl Coord {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    pub fn offset(&self, dr: i8, dc: i8) -> Coord {
        Coord::new(self.row + dr, self.col + dc)
    }

    /// Cells of the square block of radius `dist` centered here (row-major)
    pub fn iter_range(self, dist: i8) -> impl Iterator<Item = Coord> {
        (self.row - dist..=self.row + dist)
            .flat_map(move |row| (self.col - dist..=self.col + dist).map(move |col| Coord::new(row, col)))
    }

    /// Orthogonal neighbors: up, left, down, right
    pub fn iter_adjacent(self) -> impl Iterator<Item = Coord> {
        ORTHOGONAL.iter().map(move |&(dr, dc)| self.offset(dr, dc))
    }

    pub fn is_adjacent(&self, other: Coord) -> bool {
        (self.row - other.row).abs() + (self.col - other.col).abs() == 1
    }

    pub fn row_char(&self) -> char {
        label(ROW_CHARS, self.row)
    }

    pub fn col_char(&self) -> char {
        label(COL_CHARS, self.col)
    }

    fn from_chars(row: char, col: char) -> Result<Self, ParseError> {
        let row_index = ROW_CHARS
            .find(row.to_ascii_uppercase())
            .ok_or(ParseError::Row(row))?;
        let col_index = COL_CHARS
            .find(col.to_ascii_lowercase())
            .ok_or(ParseError::Column(col))?;
        Ok(Coord::new(row_index as i8, col_index as i8))
    }
}

fn label(chars: &str, index: i8) -> char {
    usize::try_from(index)
        .ok()
        .and_then(|i| chars.chars().nth(i))
        .unwrap_or('?')
}

fn strip_separators(s: &str) -> Vec<char> {
    s.trim().chars().filter(|c| !SEPARATORS.contains(c)).collect()
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row_char(), self.col_char())
    }
}

impl FromStr for Coord {
    type Err = ParseError;

    /// Parse `D2`-style text
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match strip_separators(s)[..] {
            [row, col] => Coord::from_chars(row, col),
            _ => Err(ParseError::Length {
                expected: 2,
                input: s.to_string(),
            }),
        }
    }
}

/// A source/destination pair. `src == dst` denotes self-destruct.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoordPair {
    pub src: Coord,
    pub dst: Coord,
}

impl CoordPair {
    pub const fn new(src: Coord, dst: Coord) -> Self {
        Self { src, dst }
    }

    pub const fn from_quad(row0: i8, col0: i8, row1: i8, col1: i8) -> Self {
        Self::new(Coord::new(row0, col0), Coord::new(row1, col1))
    }

    /// Rectangle covering a whole `dim`-sized board
    pub fn from_dim(dim: u8) -> Self {
        let md = dim as i8 - 1;
        Self::from_quad(0, 0, md, md)
    }

    pub fn is_self_destruct(&self) -> bool {
        self.src == self.dst
    }

    /// Cells of the rectangle spanned by src (top-left) and dst (bottom-right)
    pub fn iter_rectangle(self) -> impl Iterator<Item = Coord> {
        (self.src.row..=self.dst.row)
            .flat_map(move |row| (self.src.col..=self.dst.col).map(move |col| Coord::new(row, col)))
    }
}

impl fmt::Display for CoordPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.src, self.dst)
    }
}

impl FromStr for CoordPair {
    type Err = ParseError;

    /// Parse `A3 B2`-style text
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match strip_separators(s)[..] {
            [r0, c0, r1, c1] => Ok(CoordPair::new(
                Coord::from_chars(r0, c0)?,
                Coord::from_chars(r1, c1)?,
            )),
            _ => Err(ParseError::Length {
                expected: 4,
                input: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// Square grid of optional units, stored row-major
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    dim: u8,
    cells: Vec<Option<Unit>>,
}

impl Board {
    /// Empty board; dimensions past `MAX_DIM` are capped since they cannot be addressed
    pub fn empty(dim: u8) -> Self {
        let dim = dim.min(MAX_DIM);
        Self {
            dim,
            cells: vec![None; dim as usize * dim as usize],
        }
    }

    /// Starting layout: Defender in the top-left corner, Attacker mirrored bottom-right
    pub fn initial(dim: u8) -> Self {
        let mut board = Self::empty(dim);
        let md = board.dim as i8 - 1;

        let defender = [
            (0, 0, UnitKind::Command),
            (1, 0, UnitKind::Support),
            (0, 1, UnitKind::Support),
            (2, 0, UnitKind::Barrier),
            (0, 2, UnitKind::Barrier),
            (1, 1, UnitKind::Trooper),
        ];
        let attacker = [
            (md, md, UnitKind::Command),
            (md - 1, md, UnitKind::Striker),
            (md, md - 1, UnitKind::Striker),
            (md - 2, md, UnitKind::Trooper),
            (md, md - 2, UnitKind::Trooper),
            (md - 1, md - 1, UnitKind::Barrier),
        ];

        for (row, col, kind) in defender {
            board.set(Coord::new(row, col), Some(Unit::new(Player::Defender, kind)));
        }
        for (row, col, kind) in attacker {
            board.set(Coord::new(row, col), Some(Unit::new(Player::Attacker, kind)));
        }
        board
    }

    pub fn dim(&self) -> u8 {
        self.dim
    }

    pub fn is_valid(&self, coord: Coord) -> bool {
        let dim = self.dim as i8;
        (0..dim).contains(&coord.row) && (0..dim).contains(&coord.col)
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        self.is_valid(coord)
            .then(|| coord.row as usize * self.dim as usize + coord.col as usize)
    }

    /// Unit at `coord`; `None` when empty or off the board
    pub fn get(&self, coord: Coord) -> Option<Unit> {
        self.index(coord).and_then(|i| self.cells[i])
    }

    pub fn get_mut(&mut self, coord: Coord) -> Option<&mut Unit> {
        let i = self.index(coord)?;
        self.cells[i].as_mut()
    }

    /// Write a cell; no-op off the board. A dead unit leaves the cell empty.
    pub fn set(&mut self, coord: Coord, unit: Option<Unit>) {
        if let Some(i) = self.index(coord) {
            self.cells[i] = unit.filter(Unit::is_alive);
        }
    }

    pub fn is_empty(&self, coord: Coord) -> bool {
        self.get(coord).is_none()
    }

    /// Occupied cells in row-major order
    pub fn units(&self) -> impl Iterator<Item = (Coord, Unit)> + '_ {
        CoordPair::from_dim(self.dim)
            .iter_rectangle()
            .filter_map(move |coord| self.get(coord).map(|unit| (coord, unit)))
    }
}
