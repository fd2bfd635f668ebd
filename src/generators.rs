use bit_set::BitSet;
use error_chain::bail;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

use crate::cells::{Cartesian2DCoordinate, CompassPrimary, CoordinateSmallVec, DirectionSmallVec};
use crate::errors::*;
use crate::grid::Grid;
use crate::pattern::PatternCellSet;

/// The spanning tree algorithm used to carve a maze.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Randomised depth first search with backtracking. Long winding corridors, few junctions.
    Dfs,
    /// Randomised Prim. Many short dead ends branching off frequent junctions.
    Prim,
}

impl Default for Algorithm {
    fn default() -> Algorithm {
        Algorithm::Dfs
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            Algorithm::Dfs => "dfs",
            Algorithm::Prim => "prim",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Algorithm> {
        match s.trim().to_lowercase().as_str() {
            "dfs" | "backtracker" => Ok(Algorithm::Dfs),
            "prim" => Ok(Algorithm::Prim),
            _ => bail!("unknown maze generation algorithm '{}', expected 'dfs' or 'prim'", s),
        }
    }
}

/// Bit set over grid indices with every pattern cell already marked, so generators never enter them.
fn pattern_seeded_visits(grid: &Grid, pattern: &PatternCellSet) -> BitSet {
    let mut visited = BitSet::with_capacity(grid.size());
    visited.union_with(pattern.as_bit_set());
    visited
}

fn unvisited_neighbours(grid: &Grid,
                        visited: &BitSet,
                        coord: Cartesian2DCoordinate)
                        -> CoordinateSmallVec {
    grid.neighbours(coord)
        .into_iter()
        .filter(|neighbour| {
            grid.grid_coordinate_to_index(*neighbour)
                .map_or(false, |index| !visited.contains(index))
        })
        .collect()
}

/// Apply the recursive backtracker (randomised depth first search) algorithm to a grid.
///
/// Starting at `start` a random walk carves into unvisited neighbours, pushing each new cell onto
/// a stack. When the walk reaches a cell with no unvisited neighbours it backtracks along the
/// stack until it finds one that has. Every free cell connected to `start` is visited exactly
/// once and the opened passages form a spanning tree: a perfect maze.
///
/// Returns the number of cells visited.
pub fn recursive_backtracker<R: Rng>(grid: &mut Grid,
                                     rng: &mut R,
                                     start: Cartesian2DCoordinate,
                                     pattern: &PatternCellSet)
                                     -> Result<usize> {
    let start_index = match grid.grid_coordinate_to_index(start) {
        Some(index) => index,
        None => bail!(ErrorKind::OutOfBounds(start)),
    };

    let mut visited = pattern_seeded_visits(grid, pattern);
    visited.insert(start_index);
    let mut visited_count = 1;
    let mut stack = vec![start];

    while let Some(&current) = stack.last() {
        let candidates = unvisited_neighbours(grid, &visited, current);
        if candidates.is_empty() {
            stack.pop();
            continue;
        }

        let next = candidates[rng.gen_range(0..candidates.len())];
        grid.open_between(current, next)?;
        if let Some(index) = grid.grid_coordinate_to_index(next) {
            visited.insert(index);
        }
        visited_count += 1;
        stack.push(next);
    }

    log::debug!("recursive backtracker visited {} of {} cells", visited_count, grid.size());
    Ok(visited_count)
}

/// A wall on the boundary of the carved region: `inner` is visited, `outer` was not when the
/// wall was added.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct FrontierWall {
    inner: Cartesian2DCoordinate,
    outer: Cartesian2DCoordinate,
    direction: CompassPrimary,
}

fn push_frontier(grid: &Grid,
                 visited: &BitSet,
                 inner: Cartesian2DCoordinate,
                 frontier: &mut Vec<FrontierWall>) {
    for &direction in CompassPrimary::ALL.iter() {
        if let Some(outer) = grid.neighbour_at_direction(inner, direction) {
            let outer_unvisited = grid.grid_coordinate_to_index(outer)
                .map_or(false, |index| !visited.contains(index));
            if outer_unvisited {
                frontier.push(FrontierWall {
                    inner,
                    outer,
                    direction,
                });
            }
        }
    }
}

/// Apply the randomised Prim algorithm to a grid.
///
/// The frontier holds every wall between the carved region and a cell outside of it. Each step
/// removes a uniformly random frontier wall; if the cell beyond it is still unvisited the wall is
/// opened and that cell's own frontier walls join the list. Produces a perfect maze like the
/// backtracker, with many more junctions and shorter dead ends.
///
/// Returns the number of cells visited.
pub fn prim<R: Rng>(grid: &mut Grid,
                    rng: &mut R,
                    start: Cartesian2DCoordinate,
                    pattern: &PatternCellSet)
                    -> Result<usize> {
    let start_index = match grid.grid_coordinate_to_index(start) {
        Some(index) => index,
        None => bail!(ErrorKind::OutOfBounds(start)),
    };

    let mut visited = pattern_seeded_visits(grid, pattern);
    visited.insert(start_index);
    let mut visited_count = 1;
    let mut frontier = Vec::with_capacity(grid.size());
    push_frontier(grid, &visited, start, &mut frontier);

    while !frontier.is_empty() {
        // frontier order carries no meaning
        let wall = frontier.swap_remove(rng.gen_range(0..frontier.len()));
        let outer_index = match grid.grid_coordinate_to_index(wall.outer) {
            Some(index) => index,
            None => continue,
        };
        if visited.contains(outer_index) {
            continue;
        }

        debug_assert_eq!(grid.neighbour_at_direction(wall.inner, wall.direction), Some(wall.outer));
        grid.open_between(wall.inner, wall.outer)?;
        visited.insert(outer_index);
        visited_count += 1;
        push_frontier(grid, &visited, wall.outer, &mut frontier);
    }

    log::debug!("prim visited {} of {} cells", visited_count, grid.size());
    Ok(visited_count)
}

/// The exterior facing sides of a cell, i.e. the grid edges it lies on.
pub fn exterior_sides(grid: &Grid, coord: Cartesian2DCoordinate) -> DirectionSmallVec {
    if !grid.is_valid_coordinate(coord) {
        return DirectionSmallVec::new();
    }
    CompassPrimary::ALL
        .iter()
        .cloned()
        .filter(|dir| grid.neighbour_at_direction(coord, *dir).is_none())
        .collect()
}

/// Knock the outer walls out of the entry and exit cells.
///
/// A cell on more than one edge (a corner, or any cell of a one cell wide grid) gets every one of
/// its exterior walls opened. Interior walls are never touched. Returns the number of walls opened.
pub fn open_boundary_walls(grid: &mut Grid,
                           entry: Cartesian2DCoordinate,
                           exit: Cartesian2DCoordinate)
                           -> usize {
    let mut opened = 0;
    for &coord in &[entry, exit] {
        for direction in exterior_sides(grid, coord) {
            if grid.has_wall(coord, direction) && grid.open_exterior_wall(coord, direction) {
                opened += 1;
            }
        }
    }
    opened
}

/// Number of braiding attempts made on a `width` x `height` grid.
#[inline]
pub fn braid_attempts(width: u32, height: u32) -> usize {
    width as usize * height as usize / 10
}

/// Add loops to a maze by knocking down random interior walls.
///
/// Makes `braid_attempts` tries, each picking a random cell off the outer ring and a random
/// direction. The wall is opened only if it stands between two non pattern cells; otherwise the
/// try is wasted, not repeated. Returns the number of walls actually opened.
pub fn braid<R: Rng>(grid: &mut Grid, rng: &mut R, pattern: &PatternCellSet) -> Result<usize> {
    let (w, h) = (grid.width(), grid.height());
    if w < 3 || h < 3 {
        log::debug!("{}x{} grid has no interior cells to braid", w, h);
        return Ok(0);
    }

    let attempts = braid_attempts(w, h);
    let mut opened = 0;
    for _ in 0..attempts {
        let coord = Cartesian2DCoordinate::new(rng.gen_range(1..w - 1), rng.gen_range(1..h - 1));
        let direction = CompassPrimary::rand_direction(rng);

        let neighbour = match grid.neighbour_at_direction(coord, direction) {
            Some(neighbour) => neighbour,
            None => continue,
        };
        if pattern.is_masked(coord) || pattern.is_masked(neighbour) ||
           !grid.has_wall(coord, direction) {
            continue;
        }

        grid.open_between(coord, neighbour)?;
        opened += 1;
    }

    log::debug!("braiding opened {} walls in {} attempts", opened, attempts);
    Ok(opened)
}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::units::{Height, Width};
    use crate::utils::seeded_rng;
    use quickcheck::{quickcheck, TestResult};

    fn gc(x: u32, y: u32) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate::new(x, y)
    }

    fn no_pattern(grid: &Grid) -> PatternCellSet {
        PatternCellSet::empty(grid.width(), grid.height())
    }

    #[test]
    fn algorithm_names() {
        assert_eq!("dfs".parse::<Algorithm>().unwrap(), Algorithm::Dfs);
        assert_eq!("DFS".parse::<Algorithm>().unwrap(), Algorithm::Dfs);
        assert_eq!(" Prim ".parse::<Algorithm>().unwrap(), Algorithm::Prim);
        assert!("kruskal".parse::<Algorithm>().is_err());
        assert_eq!(Algorithm::Prim.to_string().parse::<Algorithm>().unwrap(), Algorithm::Prim);
        assert_eq!(Algorithm::default(), Algorithm::Dfs);
    }

    #[test]
    fn backtracker_spans_the_grid() {
        let mut grid = Grid::new(Width(12), Height(9)).unwrap();
        let pattern = no_pattern(&grid);
        let mut rng = seeded_rng(7);
        let visited = recursive_backtracker(&mut grid, &mut rng, gc(0, 0), &pattern).unwrap();
        assert_eq!(visited, 12 * 9);
        assert_eq!(grid.passages_count(), 12 * 9 - 1);
        assert!(grid.inconsistent_walls().is_empty());
    }

    #[test]
    fn prim_spans_the_grid() {
        let mut grid = Grid::new(Width(12), Height(9)).unwrap();
        let pattern = no_pattern(&grid);
        let mut rng = seeded_rng(7);
        let visited = prim(&mut grid, &mut rng, gc(5, 5), &pattern).unwrap();
        assert_eq!(visited, 12 * 9);
        assert_eq!(grid.passages_count(), 12 * 9 - 1);
        assert!(grid.inconsistent_walls().is_empty());
    }

    #[test]
    fn generators_avoid_the_pattern() {
        for &use_prim in &[false, true] {
            let mut grid = Grid::new(Width(15), Height(11)).unwrap();
            let pattern = PatternCellSet::for_dimensions(15, 11);
            pattern.carve(&mut grid).unwrap();
            let mut rng = seeded_rng(99);
            let visited = if use_prim {
                prim(&mut grid, &mut rng, gc(0, 0), &pattern).unwrap()
            } else {
                recursive_backtracker(&mut grid, &mut rng, gc(0, 0), &pattern).unwrap()
            };

            let free_cells = 15 * 11 - pattern.len();
            assert_eq!(visited, free_cells);
            assert_eq!(grid.passages_count(), free_cells - 1);
            for &cell in pattern.cells() {
                assert_eq!(grid.mask(cell), Some(crate::grid::ENCLOSED));
            }
        }
    }

    #[test]
    fn generators_reject_starts_off_the_grid() {
        let mut grid = Grid::new(Width(3), Height(3)).unwrap();
        let pattern = no_pattern(&grid);
        let mut rng = seeded_rng(1);
        assert!(recursive_backtracker(&mut grid, &mut rng, gc(3, 0), &pattern).is_err());
        assert!(prim(&mut grid, &mut rng, gc(0, 3), &pattern).is_err());
        assert_eq!(grid.passages_count(), 0);
    }

    #[test]
    fn equal_seeds_carve_equal_mazes() {
        let carve = |seed, use_prim| {
            let mut grid = Grid::new(Width(20), Height(20)).unwrap();
            let pattern = no_pattern(&grid);
            let mut rng = seeded_rng(seed);
            if use_prim {
                prim(&mut grid, &mut rng, gc(0, 0), &pattern).unwrap();
            } else {
                recursive_backtracker(&mut grid, &mut rng, gc(0, 0), &pattern).unwrap();
            }
            grid
        };
        assert_eq!(carve(3, false), carve(3, false));
        assert_eq!(carve(3, true), carve(3, true));
        assert_ne!(carve(3, false), carve(4, false));
    }

    #[test]
    fn boundary_walls_at_corners_and_edges() {
        let mut grid = Grid::new(Width(4), Height(3)).unwrap();
        let opened = open_boundary_walls(&mut grid, gc(0, 0), gc(2, 2));
        assert_eq!(opened, 3);
        assert_eq!(grid.mask(gc(0, 0)), Some(2 | 4));
        assert_eq!(grid.mask(gc(2, 2)), Some(1 | 2 | 8));
        assert_eq!(grid.passages_count(), 0);

        // interior cells have no exterior sides
        let mut grid = Grid::new(Width(4), Height(3)).unwrap();
        assert_eq!(open_boundary_walls(&mut grid, gc(1, 1), gc(2, 1)), 0);
        assert!(exterior_sides(&grid, gc(1, 1)).is_empty());

        // a one cell wide grid opens three sides of an end cell
        let mut column = Grid::new(Width(1), Height(3)).unwrap();
        assert_eq!(open_boundary_walls(&mut column, gc(0, 0), gc(0, 2)), 6);
        assert_eq!(column.mask(gc(0, 0)), Some(4));
        assert_eq!(column.mask(gc(0, 2)), Some(1));
    }

    #[test]
    fn braiding_adds_loops() {
        let mut grid = Grid::new(Width(20), Height(20)).unwrap();
        let pattern = PatternCellSet::for_dimensions(20, 20);
        pattern.carve(&mut grid).unwrap();
        let mut rng = seeded_rng(5);
        let visited = recursive_backtracker(&mut grid, &mut rng, gc(0, 0), &pattern).unwrap();
        let tree_passages = grid.passages_count();
        assert_eq!(tree_passages, visited - 1);

        let opened = braid(&mut grid, &mut rng, &pattern).unwrap();
        assert!(opened > 0);
        assert!(opened <= braid_attempts(20, 20));
        assert_eq!(grid.passages_count(), tree_passages + opened);
        assert!(grid.inconsistent_walls().is_empty());
        for &cell in pattern.cells() {
            assert_eq!(grid.mask(cell), Some(crate::grid::ENCLOSED));
        }
    }

    #[test]
    fn braiding_tiny_grids_is_a_no_op() {
        let mut grid = Grid::new(Width(2), Height(9)).unwrap();
        let pattern = no_pattern(&grid);
        let mut rng = seeded_rng(5);
        assert_eq!(braid(&mut grid, &mut rng, &pattern).unwrap(), 0);
        assert_eq!(braid_attempts(9, 1), 0);
        assert_eq!(braid_attempts(10, 10), 10);
    }

    #[test]
    fn quickcheck_generated_mazes_are_spanning_trees() {
        fn p(w: u8, h: u8, seed: u64, use_prim: bool) -> TestResult {
            let (w, h) = (u32::from(w % 24) + 1, u32::from(h % 24) + 1);
            let mut grid = Grid::new(Width(w), Height(h)).unwrap();
            let pattern = PatternCellSet::for_dimensions(w, h);
            if pattern.carve(&mut grid).is_err() {
                return TestResult::failed();
            }
            let mut rng = seeded_rng(seed);
            let start = gc(0, 0);
            let visited = if use_prim {
                prim(&mut grid, &mut rng, start, &pattern)
            } else {
                recursive_backtracker(&mut grid, &mut rng, start, &pattern)
            };
            match visited {
                Ok(count) => {
                    TestResult::from_bool(count == pattern.count_unmasked() &&
                                          grid.passages_count() == count - 1 &&
                                          grid.inconsistent_walls().is_empty())
                }
                Err(_) => TestResult::failed(),
            }
        }
        quickcheck(p as fn(u8, u8, u64, bool) -> TestResult);
    }
}
