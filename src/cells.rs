use error_chain::bail;
use rand::Rng;
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

use crate::errors::*;

pub type CoordinateSmallVec = SmallVec<[Cartesian2DCoordinate; 4]>;
pub type DirectionSmallVec = SmallVec<[CompassPrimary; 4]>;

#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct Cartesian2DCoordinate {
    pub x: u32,
    pub y: u32,
}

impl Cartesian2DCoordinate {
    pub fn new(x: u32, y: u32) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate { x, y }
    }
}

impl From<(u32, u32)> for Cartesian2DCoordinate {
    fn from(x_y_pair: (u32, u32)) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate::new(x_y_pair.0, x_y_pair.1)
    }
}

impl fmt::Display for Cartesian2DCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Parses `x,y`, optionally wrapped in parentheses as written in maze files.
impl FromStr for Cartesian2DCoordinate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Cartesian2DCoordinate> {
        let trimmed = s.trim();
        let inner = if trimmed.starts_with('(') && trimmed.ends_with(')') {
            &trimmed[1..trimmed.len() - 1]
        } else {
            trimmed
        };

        let mut parts = inner.split(',');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(x), Some(y), None) => {
                let x = x.trim().parse::<u32>()?;
                let y = y.trim().parse::<u32>()?;
                Ok(Cartesian2DCoordinate::new(x, y))
            }
            _ => bail!("expected a coordinate as 'x,y', found '{}'", s),
        }
    }
}

/// The four sides of a square cell.
///
/// Each direction doubles as the bit of the cell's wall mask for the wall on that side
/// and as the single character move symbol used in solution paths.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub enum CompassPrimary {
    North,
    East,
    South,
    West,
}

impl CompassPrimary {
    /// Fixed checking order used by the generators and the solver.
    pub const ALL: [CompassPrimary; 4] = [CompassPrimary::North,
                                          CompassPrimary::East,
                                          CompassPrimary::South,
                                          CompassPrimary::West];

    #[inline]
    pub fn wall_bit(self) -> u8 {
        match self {
            CompassPrimary::North => 1,
            CompassPrimary::East => 2,
            CompassPrimary::South => 4,
            CompassPrimary::West => 8,
        }
    }

    #[inline]
    pub fn opposite(self) -> CompassPrimary {
        match self {
            CompassPrimary::North => CompassPrimary::South,
            CompassPrimary::East => CompassPrimary::West,
            CompassPrimary::South => CompassPrimary::North,
            CompassPrimary::West => CompassPrimary::East,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            CompassPrimary::North => 'N',
            CompassPrimary::East => 'E',
            CompassPrimary::South => 'S',
            CompassPrimary::West => 'W',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<CompassPrimary> {
        match symbol {
            'N' => Some(CompassPrimary::North),
            'E' => Some(CompassPrimary::East),
            'S' => Some(CompassPrimary::South),
            'W' => Some(CompassPrimary::West),
            _ => None,
        }
    }

    pub fn rand_direction<R: Rng>(rng: &mut R) -> CompassPrimary {
        CompassPrimary::ALL[rng.gen_range(0..CompassPrimary::ALL.len())]
    }
}

/// Creates a new coordinate offset 1 cell away in the given direction.
/// Returns None if the coordinate is not representable, which says nothing about whether it
/// lies on any particular grid.
pub fn offset_coordinate(coord: Cartesian2DCoordinate,
                         dir: CompassPrimary)
                         -> Option<Cartesian2DCoordinate> {
    let (x, y) = (coord.x, coord.y);
    match dir {
        CompassPrimary::North => y.checked_sub(1).map(|ny| Cartesian2DCoordinate::new(x, ny)),
        CompassPrimary::South => y.checked_add(1).map(|ny| Cartesian2DCoordinate::new(x, ny)),
        CompassPrimary::East => x.checked_add(1).map(|nx| Cartesian2DCoordinate::new(nx, y)),
        CompassPrimary::West => x.checked_sub(1).map(|nx| Cartesian2DCoordinate::new(nx, y)),
    }
}

/// The direction leading from `a` to `b` when they are 4-adjacent.
pub fn direction_between(a: Cartesian2DCoordinate,
                         b: Cartesian2DCoordinate)
                         -> Option<CompassPrimary> {
    CompassPrimary::ALL
        .iter()
        .cloned()
        .find(|dir| offset_coordinate(a, *dir) == Some(b))
}
