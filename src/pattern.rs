//! The decorative "42" block stamped into the middle of a maze before it is generated.

use bit_set::BitSet;
use error_chain::bail;
use lazy_static::lazy_static;

use crate::cells::Cartesian2DCoordinate;
use crate::errors::*;
use crate::grid::Grid;

/// Width of the pattern footprint, including its free margin.
pub const PATTERN_WIDTH: u32 = 9;
/// Height of the pattern footprint, including its free margin.
pub const PATTERN_HEIGHT: u32 = 7;

// '#' cells are excluded from the maze. The '.' ring around the glyph keeps it off the grid edge
// and leaves a corridor all the way around it.
const PATTERN_TEMPLATE: [&str; PATTERN_HEIGHT as usize] = [
    ".........",
    ".#.#.###.",
    ".#.#...#.",
    ".###.###.",
    "...#.#...",
    "...#.###.",
    ".........",
];

lazy_static! {
    static ref TEMPLATE_CELLS: Vec<Cartesian2DCoordinate> = PATTERN_TEMPLATE
        .iter()
        .enumerate()
        .flat_map(|(y, row)| {
            row.chars()
                .enumerate()
                .filter(|&(_, c)| c == '#')
                .map(move |(x, _)| Cartesian2DCoordinate::new(x as u32, y as u32))
        })
        .collect();
}

/// Cells permanently excluded from maze generation.
///
/// Membership is a bit per grid cell, mirroring how a mask image switches grid cells off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternCellSet {
    mask: BitSet,
    cells: Vec<Cartesian2DCoordinate>,
    width: u32,
    height: u32,
}

impl PatternCellSet {
    /// A set with no cells, for grids that do not carry a pattern.
    pub fn empty(width: u32, height: u32) -> PatternCellSet {
        PatternCellSet {
            mask: BitSet::new(),
            cells: vec![],
            width,
            height,
        }
    }

    /// The "42" pattern centred on a `width` x `height` grid.
    ///
    /// Grids smaller than the pattern footprint get an empty set, the pattern is never clipped.
    pub fn for_dimensions(width: u32, height: u32) -> PatternCellSet {
        if width < PATTERN_WIDTH || height < PATTERN_HEIGHT {
            return PatternCellSet::empty(width, height);
        }

        let offset_x = (width - PATTERN_WIDTH) / 2;
        let offset_y = (height - PATTERN_HEIGHT) / 2;
        let cells = TEMPLATE_CELLS.iter()
            .map(|c| Cartesian2DCoordinate::new(c.x + offset_x, c.y + offset_y));
        PatternCellSet::from_cells(width, height, cells)
    }

    /// A set from arbitrary cells. Cells outside of the grid dimensions are ignored.
    pub fn from_cells<I>(width: u32, height: u32, cells: I) -> PatternCellSet
        where I: IntoIterator<Item = Cartesian2DCoordinate>
    {
        let mut set = PatternCellSet::empty(width, height);
        set.mask.reserve_len(width as usize * height as usize);
        for coord in cells {
            if let Some(index) = set.bit_index(coord) {
                if set.mask.insert(index) {
                    set.cells.push(coord);
                }
            }
        }
        set
    }

    /// Is the given coordinate masked out of the maze?
    #[inline]
    pub fn is_masked(&self, coord: Cartesian2DCoordinate) -> bool {
        self.bit_index(coord).map_or(false, |index| self.mask.contains(index))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Pattern cells in the order the template lists them, row by row.
    #[inline]
    pub fn cells(&self) -> &[Cartesian2DCoordinate] {
        &self.cells
    }

    /// The raw membership bits, indexed row-major like the grid.
    pub fn as_bit_set(&self) -> &BitSet {
        &self.mask
    }

    /// Number of grid cells that take part in the maze.
    pub fn count_unmasked(&self) -> usize {
        self.width as usize * self.height as usize - self.len()
    }

    /// Stamp the pattern into the grid.
    ///
    /// Every wall between a pattern cell and a free neighbour is closed on both sides. Walls
    /// between two pattern cells are left closed too, so each pattern cell stays fully enclosed
    /// and the block reads as one solid shape.
    pub fn carve(&self, grid: &mut Grid) -> Result<()> {
        for &coord in &self.cells {
            for neighbour in grid.neighbours(coord).iter().cloned() {
                if !self.is_masked(neighbour) {
                    grid.close_between(coord, neighbour)?;
                }
            }
        }
        Ok(())
    }

    /// Check that every free cell can be reached from `start` without crossing the pattern.
    ///
    /// Fails with `DisconnectedRegion` holding the number of free cells cut off from `start`.
    pub fn check_free_region_connected(&self, start: Cartesian2DCoordinate) -> Result<()> {
        let start_index = match self.bit_index(start) {
            Some(index) if !self.mask.contains(index) => index,
            _ => bail!(ErrorKind::OutOfBounds(start)),
        };

        let w = self.width as usize;
        let h = self.height as usize;
        let mut reached = self.mask.clone();
        reached.insert(start_index);
        let mut reached_count = 1;
        let mut pending = vec![start_index];

        while let Some(index) = pending.pop() {
            let (x, y) = (index % w, index / w);
            let mut adjacent = [None; 4];
            if y > 0 {
                adjacent[0] = Some(index - w);
            }
            if x + 1 < w {
                adjacent[1] = Some(index + 1);
            }
            if y + 1 < h {
                adjacent[2] = Some(index + w);
            }
            if x > 0 {
                adjacent[3] = Some(index - 1);
            }
            for next in adjacent.iter().filter_map(|i| *i) {
                if reached.insert(next) {
                    reached_count += 1;
                    pending.push(next);
                }
            }
        }

        let unreachable = self.count_unmasked() - reached_count;
        if unreachable > 0 {
            bail!(ErrorKind::DisconnectedRegion(unreachable));
        }
        Ok(())
    }

    fn bit_index(&self, coord: Cartesian2DCoordinate) -> Option<usize> {
        if coord.x < self.width && coord.y < self.height {
            Some(coord.y as usize * self.width as usize + coord.x as usize)
        } else {
            None
        }
    }
}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::cells::CompassPrimary;
    use crate::grid::ENCLOSED;
    use crate::units::{Height, Width};

    fn gc(x: u32, y: u32) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate::new(x, y)
    }

    #[test]
    fn template_has_twenty_cells() {
        assert_eq!(TEMPLATE_CELLS.len(), 20);
        assert!(PATTERN_TEMPLATE.iter().all(|row| row.len() == PATTERN_WIDTH as usize));
        // margin row and column are free
        assert!(TEMPLATE_CELLS.iter().all(|c| c.x > 0 && c.y > 0));
        assert!(TEMPLATE_CELLS.iter().all(|c| c.x < PATTERN_WIDTH - 1 && c.y < PATTERN_HEIGHT - 1));
    }

    #[test]
    fn small_grids_get_no_pattern() {
        assert!(PatternCellSet::for_dimensions(8, 8).is_empty());
        assert!(PatternCellSet::for_dimensions(20, 6).is_empty());
        assert!(PatternCellSet::for_dimensions(8, 20).is_empty());
        assert_eq!(PatternCellSet::for_dimensions(8, 8).count_unmasked(), 64);
    }

    #[test]
    fn pattern_is_centred() {
        let exact = PatternCellSet::for_dimensions(PATTERN_WIDTH, PATTERN_HEIGHT);
        assert_eq!(exact.cells(), &TEMPLATE_CELLS[..]);

        let set = PatternCellSet::for_dimensions(10, 10);
        assert_eq!(set.len(), 20);
        assert_eq!(set.count_unmasked(), 80);
        // offset ((10 - 9) / 2, (10 - 7) / 2) = (0, 1); the top left stroke of the 4 is at (1, 1) in the template
        assert!(set.is_masked(gc(1, 2)));
        assert!(!set.is_masked(gc(1, 1)));
        assert!(!set.is_masked(gc(0, 0)));
        assert!(!set.is_masked(gc(9, 9)));
        assert!(!set.is_masked(gc(100, 100)));

        let wide = PatternCellSet::for_dimensions(30, 21);
        let min_x = wide.cells().iter().map(|c| c.x).min().unwrap();
        let min_y = wide.cells().iter().map(|c| c.y).min().unwrap();
        assert_eq!((min_x, min_y), (10 + 1, 7 + 1));
    }

    #[test]
    fn from_cells_ignores_duplicates_and_strays() {
        let set = PatternCellSet::from_cells(3, 3, vec![gc(1, 1), gc(1, 1), gc(5, 5)]);
        assert_eq!(set.cells(), &[gc(1, 1)]);
        assert_eq!(set.as_bit_set().len(), 1);
    }

    #[test]
    fn carving_closes_walls_towards_the_pattern() {
        let mut grid = Grid::new(Width(3), Height(3)).unwrap();
        for coord in grid.iter().collect::<Vec<_>>() {
            for neighbour in grid.neighbours(coord).iter().cloned() {
                grid.open_between(coord, neighbour).expect("open failed");
            }
        }
        assert_eq!(grid.passages_count(), 12);

        let set = PatternCellSet::from_cells(3, 3, vec![gc(1, 1)]);
        set.carve(&mut grid).expect("carve failed");

        assert_eq!(grid.mask(gc(1, 1)), Some(ENCLOSED));
        assert!(grid.has_wall(gc(1, 0), CompassPrimary::South));
        assert!(grid.has_wall(gc(0, 1), CompassPrimary::East));
        assert!(grid.has_wall(gc(2, 1), CompassPrimary::West));
        assert!(grid.has_wall(gc(1, 2), CompassPrimary::North));
        assert_eq!(grid.passages_count(), 8);
        assert!(grid.inconsistent_walls().is_empty());
    }

    #[test]
    fn shipped_pattern_keeps_free_cells_connected() {
        for &(w, h) in &[(9, 7), (10, 10), (11, 8), (25, 25), (40, 12)] {
            let set = PatternCellSet::for_dimensions(w, h);
            assert!(!set.is_empty());
            set.check_free_region_connected(gc(0, 0)).expect("free cells should be connected");
        }
    }

    #[test]
    fn walled_off_cells_are_reported() {
        // a wall down the middle column of a 5x3 grid leaves the right side unreachable
        let set = PatternCellSet::from_cells(5, 3, vec![gc(2, 0), gc(2, 1), gc(2, 2)]);
        match set.check_free_region_connected(gc(0, 0)) {
            Err(Error(ErrorKind::DisconnectedRegion(unreachable), _)) => assert_eq!(unreachable, 6),
            other => panic!("expected a disconnected region, got {:?}", other),
        }

        // the pocket cell at the corner
        let pocket = PatternCellSet::from_cells(3, 3, vec![gc(1, 0), gc(1, 1), gc(0, 1)]);
        match pocket.check_free_region_connected(gc(2, 2)) {
            Err(Error(ErrorKind::DisconnectedRegion(unreachable), _)) => assert_eq!(unreachable, 1),
            other => panic!("expected a disconnected region, got {:?}", other),
        }
    }

    #[test]
    fn connectivity_start_must_be_free() {
        let set = PatternCellSet::from_cells(3, 3, vec![gc(1, 1)]);
        assert!(set.check_free_region_connected(gc(1, 1)).is_err());
        assert!(set.check_free_region_connected(gc(3, 0)).is_err());
        assert!(set.check_free_region_connected(gc(0, 0)).is_ok());
    }
}
