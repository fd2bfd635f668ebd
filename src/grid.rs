use error_chain::bail;
use std::fmt;

use crate::cells::{self, Cartesian2DCoordinate, CompassPrimary, CoordinateSmallVec};
use crate::errors::*;
use crate::units::{Height, Width};

/// Mask of a cell with all four walls standing.
pub const ENCLOSED: u8 = 15;

/// A rectangular grid of cells where each cell records which of its four walls are present
/// as a 4 bit mask (see `CompassPrimary::wall_bit`).
///
/// A passage between two neighbouring cells only exists when both cells have the wall facing
/// the other cleared. `open_between` is the only public operation that removes walls and always
/// updates both cells, so the two views of any shared wall cannot disagree.
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    masks: Vec<u8>,
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Grid :: width: {:?}, height: {:?}, masks: {:?}",
               self.width, self.height, self.masks)
    }
}

impl Grid {
    /// Creates a grid where every cell is fully enclosed. Both sides must be at least 1.
    pub fn new(width: Width, height: Height) -> Result<Grid> {
        let (Width(w), Height(h)) = (width, height);
        if w == 0 || h == 0 {
            bail!(ErrorKind::InvalidDimensions(w, h));
        }
        Ok(Grid {
            width: w,
            height: h,
            masks: vec![ENCLOSED; w as usize * h as usize],
        })
    }

    /// Rebuilds a grid from row-major wall masks, e.g. as read back from a maze file.
    pub fn from_masks(width: Width, height: Height, masks: Vec<u8>) -> Result<Grid> {
        let (Width(w), Height(h)) = (width, height);
        if w == 0 || h == 0 || masks.len() != w as usize * h as usize {
            bail!(ErrorKind::InvalidDimensions(w, h));
        }
        if let Some(index) = masks.iter().position(|&m| m > ENCLOSED) {
            bail!(ErrorKind::MalformedMazeFile(index / w as usize + 1,
                                               format!("wall mask {} is out of range",
                                                       masks[index])));
        }

        Ok(Grid {
            width: w,
            height: h,
            masks,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.masks.len()
    }

    /// All wall masks in row-major order.
    #[inline]
    pub fn masks(&self) -> &[u8] {
        &self.masks
    }

    /// The wall masks one row at a time, top to bottom.
    pub fn rows(&self) -> ::std::slice::Chunks<u8> {
        self.masks.chunks(self.width as usize)
    }

    #[inline]
    pub fn mask(&self, coord: Cartesian2DCoordinate) -> Option<u8> {
        self.grid_coordinate_to_index(coord).map(|index| self.masks[index])
    }

    /// Is the wall on the `direction` side of the cell present?
    ///
    /// Coordinates outside of the grid are reported as walled in.
    #[inline]
    pub fn has_wall(&self, coord: Cartesian2DCoordinate, direction: CompassPrimary) -> bool {
        self.mask(coord).map_or(true, |mask| mask & direction.wall_bit() != 0)
    }

    /// Is there a passage from the cell to its neighbour in `direction`?
    /// Openings in the outer boundary do not count, there is no neighbour to move into.
    pub fn is_open(&self, coord: Cartesian2DCoordinate, direction: CompassPrimary) -> bool {
        self.neighbour_at_direction(coord, direction).is_some() && !self.has_wall(coord, direction)
    }

    /// Remove the wall between two 4-adjacent cells, on both sides.
    pub fn open_between(&mut self,
                        a: Cartesian2DCoordinate,
                        b: Cartesian2DCoordinate)
                        -> Result<()> {
        let (a_index, b_index, dir) = self.adjacent_indices(a, b)?;
        self.masks[a_index] &= !dir.wall_bit();
        self.masks[b_index] &= !dir.opposite().wall_bit();
        Ok(())
    }

    /// Restore the wall between two 4-adjacent cells, on both sides.
    pub(crate) fn close_between(&mut self,
                                a: Cartesian2DCoordinate,
                                b: Cartesian2DCoordinate)
                                -> Result<()> {
        let (a_index, b_index, dir) = self.adjacent_indices(a, b)?;
        self.masks[a_index] |= dir.wall_bit();
        self.masks[b_index] |= dir.opposite().wall_bit();
        Ok(())
    }

    /// Clear a wall of a cell on the outer boundary of the grid.
    /// Returns false, changing nothing, if that side faces another grid cell.
    pub(crate) fn open_exterior_wall(&mut self,
                                     coord: Cartesian2DCoordinate,
                                     direction: CompassPrimary)
                                     -> bool {
        match self.grid_coordinate_to_index(coord) {
            Some(index) if self.neighbour_at_direction(coord, direction).is_none() => {
                self.masks[index] &= !direction.wall_bit();
                true
            }
            _ => false,
        }
    }

    /// Cells to the North, East, South or West of a cell, whether or not a passage connects them.
    pub fn neighbours(&self, coord: Cartesian2DCoordinate) -> CoordinateSmallVec {
        CompassPrimary::ALL
            .iter()
            .filter_map(|dir| self.neighbour_at_direction(coord, *dir))
            .collect()
    }

    pub fn neighbour_at_direction(&self,
                                  coord: Cartesian2DCoordinate,
                                  direction: CompassPrimary)
                                  -> Option<Cartesian2DCoordinate> {
        if !self.is_valid_coordinate(coord) {
            return None;
        }
        cells::offset_coordinate(coord, direction)
            .and_then(|neighbour_coord| if self.is_valid_coordinate(neighbour_coord) {
                Some(neighbour_coord)
            } else {
                None
            })
    }

    /// Is the grid coordinate valid for this grid - within the grid's dimensions
    #[inline]
    pub fn is_valid_coordinate(&self, coord: Cartesian2DCoordinate) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    /// Convert a grid coordinate to a one dimensional index in the range 0...grid.size().
    /// Returns None if the grid coordinate is invalid.
    #[inline]
    pub fn grid_coordinate_to_index(&self, coord: Cartesian2DCoordinate) -> Option<usize> {
        if self.is_valid_coordinate(coord) {
            Some(coord.y as usize * self.width as usize + coord.x as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn index_to_grid_coordinate(&self, index: usize) -> Cartesian2DCoordinate {
        let w = self.width as usize;
        Cartesian2DCoordinate::new((index % w) as u32, (index / w) as u32)
    }

    pub fn iter(&self) -> CellIter {
        CellIter {
            current_cell_number: 0,
            width: self.width as usize,
            cells_count: self.size(),
        }
    }

    pub fn iter_row(&self) -> RowIter {
        RowIter {
            current_row: 0,
            width: self.width,
            height: self.height,
        }
    }

    /// Number of interior walls that are open on both sides - the edges of the maze graph.
    pub fn passages_count(&self) -> usize {
        self.iter()
            .map(|coord| {
                [CompassPrimary::East, CompassPrimary::South]
                    .iter()
                    .filter(|dir| self.is_open(coord, **dir) && self.is_mirrored_open(coord, **dir))
                    .count()
            })
            .sum()
    }

    /// Neighbouring cell pairs whose shared wall is open on one side only.
    pub fn inconsistent_walls(&self) -> Vec<(Cartesian2DCoordinate, Cartesian2DCoordinate)> {
        let mut inconsistent = vec![];
        for coord in self.iter() {
            for dir in &[CompassPrimary::East, CompassPrimary::South] {
                if let Some(neighbour) = self.neighbour_at_direction(coord, *dir) {
                    let wall_here = self.has_wall(coord, *dir);
                    let wall_there = self.has_wall(neighbour, dir.opposite());
                    if wall_here != wall_there {
                        inconsistent.push((coord, neighbour));
                    }
                }
            }
        }
        inconsistent
    }

    fn is_mirrored_open(&self, coord: Cartesian2DCoordinate, direction: CompassPrimary) -> bool {
        self.neighbour_at_direction(coord, direction)
            .map_or(false,
                    |neighbour| !self.has_wall(neighbour, direction.opposite()))
    }

    fn adjacent_indices(&self,
                        a: Cartesian2DCoordinate,
                        b: Cartesian2DCoordinate)
                        -> Result<(usize, usize, CompassPrimary)> {
        let dir_opt = cells::direction_between(a, b);
        match (self.grid_coordinate_to_index(a), self.grid_coordinate_to_index(b), dir_opt) {
            (Some(a_index), Some(b_index), Some(dir)) => Ok((a_index, b_index, dir)),
            _ => bail!(ErrorKind::NotAdjacent(a, b)),
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub struct CellIter {
    current_cell_number: usize,
    width: usize,
    cells_count: usize,
}
impl Iterator for CellIter {
    type Item = Cartesian2DCoordinate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_cell_number < self.cells_count {
            let n = self.current_cell_number;
            self.current_cell_number += 1;
            Some(Cartesian2DCoordinate::new((n % self.width) as u32, (n / self.width) as u32))
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let lower_bound = self.cells_count - self.current_cell_number;
        let upper_bound = lower_bound;
        (lower_bound, Some(upper_bound))
    }
}
impl ExactSizeIterator for CellIter {} // default impl using size_hint()

impl<'a> IntoIterator for &'a Grid {
    type Item = Cartesian2DCoordinate;
    type IntoIter = CellIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Copy, Clone)]
pub struct RowIter {
    current_row: u32,
    width: u32,
    height: u32,
}
impl Iterator for RowIter {
    type Item = Vec<Cartesian2DCoordinate>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_row < self.height {
            let y = self.current_row;
            let coords = (0..self.width).map(|x| Cartesian2DCoordinate::new(x, y)).collect();
            self.current_row += 1;
            Some(coords)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.height - self.current_row) as usize;
        (remaining, Some(remaining))
    }
}
impl ExactSizeIterator for RowIter {}
