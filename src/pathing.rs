use bit_set::BitSet;
use error_chain::bail;
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use crate::cells::{self, Cartesian2DCoordinate, CompassPrimary, CoordinateSmallVec};
use crate::errors::*;
use crate::grid::Grid;
use crate::grid_displays::GridDisplay;
use crate::utils::{self, FnvHashMap, FnvHashSet};

/// A route through the maze as a sequence of single cell moves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    moves: Vec<CompassPrimary>,
}

impl Path {
    pub fn new(moves: Vec<CompassPrimary>) -> Path {
        Path { moves }
    }

    #[inline]
    pub fn moves(&self) -> &[CompassPrimary] {
        &self.moves
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// The cells visited when following the path from `start`, `start` included.
    ///
    /// None if a move steps off the representable coordinate space. Whether the cells lie on a
    /// particular grid is for the caller to check.
    pub fn cells_from(&self, start: Cartesian2DCoordinate) -> Option<Vec<Cartesian2DCoordinate>> {
        let mut visited = Vec::with_capacity(self.moves.len() + 1);
        visited.push(start);
        let mut current = start;
        for &dir in &self.moves {
            current = cells::offset_coordinate(current, dir)?;
            visited.push(current);
        }
        Some(visited)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for dir in &self.moves {
            write!(f, "{}", dir.symbol())?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Path> {
        let mut moves = Vec::with_capacity(s.len());
        for (i, symbol) in s.trim_end().chars().enumerate() {
            match CompassPrimary::from_symbol(symbol) {
                Some(dir) => moves.push(dir),
                None => {
                    bail!(ErrorKind::InvalidPath(format!("unexpected move '{}' at position {}",
                                                         symbol,
                                                         i)))
                }
            }
        }
        Ok(Path::new(moves))
    }
}

fn open_neighbours(grid: &Grid, coord: Cartesian2DCoordinate) -> SmallVec<[(Cartesian2DCoordinate, CompassPrimary); 4]> {
    CompassPrimary::ALL
        .iter()
        .filter(|dir| grid.is_open(coord, **dir))
        .filter_map(|dir| grid.neighbour_at_direction(coord, *dir).map(|n| (n, *dir)))
        .collect()
}

/// Breadth first search for the fewest moves from `start` to `end`.
///
/// Directions are tried in `CompassPrimary::ALL` order, so among several equally short routes the
/// same one is always returned for the same grid. Returns None if either end is off the grid or
/// `end` cannot be reached.
pub fn shortest_path(grid: &Grid,
                     start: Cartesian2DCoordinate,
                     end: Cartesian2DCoordinate)
                     -> Option<Path> {
    let start_index = grid.grid_coordinate_to_index(start)?;
    let end_index = grid.grid_coordinate_to_index(end)?;

    // (previous cell index, move taken from it)
    let mut came_from: Vec<Option<(usize, CompassPrimary)>> = vec![None; grid.size()];
    let mut visited = BitSet::with_capacity(grid.size());
    let mut queue = VecDeque::new();
    visited.insert(start_index);
    queue.push_back(start);

    while let Some(coord) = queue.pop_front() {
        let index = grid.grid_coordinate_to_index(coord)?;
        if index == end_index {
            let mut moves = vec![];
            let mut current = index;
            while let Some((previous, dir)) = came_from[current] {
                moves.push(dir);
                current = previous;
            }
            moves.reverse();
            return Some(Path::new(moves));
        }

        for (neighbour, dir) in open_neighbours(grid, coord) {
            let neighbour_index = grid.grid_coordinate_to_index(neighbour)?;
            if visited.insert(neighbour_index) {
                came_from[neighbour_index] = Some((index, dir));
                queue.push_back(neighbour);
            }
        }
    }

    None
}

/// Flood fill step counts from a start cell to every cell reachable from it.
#[derive(Debug, Clone)]
pub struct Distances {
    start_coordinate: Cartesian2DCoordinate,
    distances: FnvHashMap<Cartesian2DCoordinate, u32>,
    max_distance: u32,
}

impl Distances {
    pub fn new(grid: &Grid, start_coordinate: Cartesian2DCoordinate) -> Option<Distances> {
        if !grid.is_valid_coordinate(start_coordinate) {
            return None;
        }

        let mut max = 0;
        let mut distances = utils::fnv_hashmap(grid.size());
        distances.insert(start_coordinate, 0);

        // Every step costs one, so the first time a cell is reached is its shortest distance and
        // the distances map doubles as the visited set.
        let mut frontier = vec![start_coordinate];
        while !frontier.is_empty() {
            let mut new_frontier = vec![];
            for cell_coord in &frontier {
                let distance_to_cell = distances.get(cell_coord).cloned().unwrap_or(0);
                if distance_to_cell > max {
                    max = distance_to_cell;
                }

                for (link_coordinate, _) in open_neighbours(grid, *cell_coord) {
                    if !distances.contains_key(&link_coordinate) {
                        distances.insert(link_coordinate, distance_to_cell + 1);
                        new_frontier.push(link_coordinate);
                    }
                }
            }
            frontier = new_frontier;
        }

        Some(Distances {
            start_coordinate,
            distances,
            max_distance: max,
        })
    }

    #[inline(always)]
    pub fn start(&self) -> Cartesian2DCoordinate {
        self.start_coordinate
    }

    #[inline(always)]
    pub fn max(&self) -> u32 {
        self.max_distance
    }

    #[inline(always)]
    pub fn distance_from_start_to(&self, coord: Cartesian2DCoordinate) -> Option<u32> {
        self.distances.get(&coord).cloned()
    }

    /// Number of cells reachable from the start, the start included.
    pub fn reachable_count(&self) -> usize {
        self.distances.len()
    }

    pub fn furthest_points_on_grid(&self) -> CoordinateSmallVec {
        let furthest_distance = self.max();
        let mut furthest = self.distances
            .iter()
            .filter(|&(_, distance)| *distance == furthest_distance)
            .map(|(coord, _)| *coord)
            .collect::<CoordinateSmallVec>();
        furthest.sort();
        furthest
    }
}

impl GridDisplay for Distances {
    fn render_cell_body(&self, coord: Cartesian2DCoordinate) -> String {
        if let Some(d) = self.distances.get(&coord) {
            // centre align, padding 3, lowercase hexadecimal
            format!("{:^3x}", d)
        } else {
            String::from("   ")
        }
    }
}

/// Marks the cells a path walks through, with `S` and `E` at its two ends.
#[derive(Debug)]
pub struct PathDisplay {
    start: Cartesian2DCoordinate,
    end: Cartesian2DCoordinate,
    on_path_coordinates: FnvHashSet<Cartesian2DCoordinate>,
}

impl PathDisplay {
    pub fn new(start: Cartesian2DCoordinate, path: &Path) -> PathDisplay {
        let cells = path.cells_from(start).unwrap_or_else(|| vec![start]);
        let end = cells.last().cloned().unwrap_or(start);
        let mut on_path_coordinates = utils::fnv_hashset(cells.len());
        on_path_coordinates.extend(cells);
        PathDisplay {
            start,
            end,
            on_path_coordinates,
        }
    }
}

impl GridDisplay for PathDisplay {
    fn render_cell_body(&self, coord: Cartesian2DCoordinate) -> String {
        if coord == self.start {
            String::from(" S ")
        } else if coord == self.end {
            String::from(" E ")
        } else if self.on_path_coordinates.contains(&coord) {
            String::from(" . ")
        } else {
            String::from("   ")
        }
    }
}
