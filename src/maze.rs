//! A generated maze: the carved grid plus everything needed to replay, solve and save it.

use error_chain::bail;
use rand::rngs::SmallRng;
use std::fmt;
use std::io::Write;

use crate::cells::Cartesian2DCoordinate;
use crate::errors::*;
use crate::generators::{self, Algorithm};
use crate::grid::Grid;
use crate::pathing::{self, Path};
use crate::pattern::{PatternCellSet, PATTERN_HEIGHT, PATTERN_WIDTH};
use crate::serializer::{self, MazeFile};
use crate::units::{Height, Width};
use crate::utils;

/// Everything needed to build a maze. Use `MazeConfigBuilder` to fill in the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeConfig {
    pub width: u32,
    pub height: u32,
    pub entry: Cartesian2DCoordinate,
    pub exit: Cartesian2DCoordinate,
    pub algorithm: Algorithm,
    pub perfect: bool,
    /// Drawn at random when absent. The seed actually used is available from `Maze::seed`.
    pub seed: Option<u64>,
}

impl Default for MazeConfig {
    fn default() -> MazeConfig {
        MazeConfigBuilder::new().build()
    }
}

#[derive(Debug, Clone)]
pub struct MazeConfigBuilder {
    width: u32,
    height: u32,
    entry: Cartesian2DCoordinate,
    exit: Option<Cartesian2DCoordinate>,
    algorithm: Algorithm,
    perfect: bool,
    seed: Option<u64>,
}

impl Default for MazeConfigBuilder {
    fn default() -> MazeConfigBuilder {
        MazeConfigBuilder::new()
    }
}

impl MazeConfigBuilder {
    /// A 20x15 perfect maze carved depth first, entered top left and exited bottom right.
    pub fn new() -> MazeConfigBuilder {
        MazeConfigBuilder {
            width: 20,
            height: 15,
            entry: Cartesian2DCoordinate::new(0, 0),
            exit: None,
            algorithm: Algorithm::Dfs,
            perfect: true,
            seed: None,
        }
    }

    pub fn dimensions(mut self, width: Width, height: Height) -> MazeConfigBuilder {
        let (Width(w), Height(h)) = (width, height);
        self.width = w;
        self.height = h;
        self
    }

    pub fn entry(mut self, entry: Cartesian2DCoordinate) -> MazeConfigBuilder {
        self.entry = entry;
        self
    }

    /// Defaults to the bottom right cell.
    pub fn exit(mut self, exit: Cartesian2DCoordinate) -> MazeConfigBuilder {
        self.exit = Some(exit);
        self
    }

    pub fn algorithm(mut self, algorithm: Algorithm) -> MazeConfigBuilder {
        self.algorithm = algorithm;
        self
    }

    pub fn perfect(mut self, perfect: bool) -> MazeConfigBuilder {
        self.perfect = perfect;
        self
    }

    pub fn seed(mut self, seed: Option<u64>) -> MazeConfigBuilder {
        self.seed = seed;
        self
    }

    pub fn build(self) -> MazeConfig {
        let default_exit = Cartesian2DCoordinate::new(self.width.saturating_sub(1),
                                                      self.height.saturating_sub(1));
        MazeConfig {
            width: self.width,
            height: self.height,
            entry: self.entry,
            exit: self.exit.unwrap_or(default_exit),
            algorithm: self.algorithm,
            perfect: self.perfect,
            seed: self.seed,
        }
    }
}

/// Reject a configuration before any generation work starts.
/// Returns the pattern that fits the configured dimensions.
fn validate(config: &MazeConfig) -> Result<PatternCellSet> {
    let (w, h) = (config.width, config.height);
    if w == 0 || h == 0 || u64::from(w) * u64::from(h) < 2 {
        bail!(ErrorKind::InvalidDimensions(w, h));
    }

    for &coord in &[config.entry, config.exit] {
        if coord.x >= w || coord.y >= h {
            bail!(ErrorKind::OutOfBounds(coord));
        }
    }

    if config.entry == config.exit {
        bail!(ErrorKind::EntryExitCollision(config.entry));
    }

    let pattern = PatternCellSet::for_dimensions(w, h);
    if pattern.is_empty() {
        log::warn!("{}x{} grid is smaller than the {}x{} pattern, generating without it",
                   w, h, PATTERN_WIDTH, PATTERN_HEIGHT);
    }
    for &coord in &[config.entry, config.exit] {
        if pattern.is_masked(coord) {
            bail!(ErrorKind::EntryExitCollision(coord));
        }
    }

    pattern.check_free_region_connected(config.entry)?;
    Ok(pattern)
}

/// A fully generated maze.
///
/// Nothing outside of this module mutates the grid; a different maze is obtained with
/// `regenerate`, which leaves this one untouched.
pub struct Maze {
    grid: Grid,
    pattern: PatternCellSet,
    entry: Cartesian2DCoordinate,
    exit: Cartesian2DCoordinate,
    algorithm: Algorithm,
    perfect: bool,
    seed: u64,
    rng: SmallRng,
}

impl fmt::Debug for Maze {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
               "Maze :: {}x{}, entry: {}, exit: {}, algorithm: {}, perfect: {}, seed: {}, \
                pattern cells: {}",
               self.grid.width(),
               self.grid.height(),
               self.entry,
               self.exit,
               self.algorithm,
               self.perfect,
               self.seed,
               self.pattern.len())
    }
}

impl Maze {
    /// Validate the configuration then carve the pattern, generate the spanning tree, open the
    /// entry and exit to the outside and, for imperfect mazes, braid in some loops.
    pub fn new(config: MazeConfig) -> Result<Maze> {
        let pattern = validate(&config)?;
        let seed = config.seed.unwrap_or_else(utils::random_seed);
        log::info!("generating {}x{} maze with {}, seed {}",
                   config.width, config.height, config.algorithm, seed);

        let mut maze = Maze {
            grid: Grid::new(Width(config.width), Height(config.height))?,
            pattern,
            entry: config.entry,
            exit: config.exit,
            algorithm: config.algorithm,
            perfect: config.perfect,
            seed,
            rng: utils::seeded_rng(seed),
        };
        maze.generate()?;
        Ok(maze)
    }

    fn generate(&mut self) -> Result<()> {
        self.pattern.carve(&mut self.grid)?;

        let visited = match self.algorithm {
            Algorithm::Dfs => {
                generators::recursive_backtracker(&mut self.grid, &mut self.rng, self.entry, &self.pattern)?
            }
            Algorithm::Prim => generators::prim(&mut self.grid, &mut self.rng, self.entry, &self.pattern)?,
        };
        log::debug!("carved {} cells, {} pattern cells left out", visited, self.pattern.len());

        generators::open_boundary_walls(&mut self.grid, self.entry, self.exit);

        if !self.perfect {
            generators::braid(&mut self.grid, &mut self.rng, &self.pattern)?;
        }
        Ok(())
    }

    /// The configuration that reproduces this maze exactly.
    pub fn config(&self) -> MazeConfig {
        MazeConfig {
            width: self.grid.width(),
            height: self.grid.height(),
            entry: self.entry,
            exit: self.exit,
            algorithm: self.algorithm,
            perfect: self.perfect,
            seed: Some(self.seed),
        }
    }

    /// Read only view of the wall masks.
    #[inline]
    pub fn grid_snapshot(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn pattern_cells(&self) -> &PatternCellSet {
        &self.pattern
    }

    #[inline]
    pub fn entry(&self) -> Cartesian2DCoordinate {
        self.entry
    }

    #[inline]
    pub fn exit(&self) -> Cartesian2DCoordinate {
        self.exit
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[inline]
    pub fn is_perfect(&self) -> bool {
        self.perfect
    }

    /// Shortest route from entry to exit. Recomputed on every call, always with the same answer.
    ///
    /// `NoPathFound` is an ordinary outcome here, the caller decides whether the maze is usable.
    pub fn solve(&self) -> Result<Path> {
        pathing::shortest_path(&self.grid, self.entry, self.exit)
            .ok_or_else(|| ErrorKind::NoPathFound(self.entry, self.exit).into())
    }

    /// A new maze with the same settings, a fresh random seed unless one is given.
    pub fn regenerate(&self, new_seed: Option<u64>) -> Result<Maze> {
        let mut config = self.config();
        config.seed = new_seed;
        Maze::new(config)
    }

    /// Write the maze file: wall masks, entry, exit and the solution path (empty if unsolvable).
    pub fn serialize<W: Write>(&self, writer: W) -> Result<()> {
        let path = self.solution_or_empty()?;
        serializer::write_maze(writer, &self.grid, self.entry, self.exit, &path)
    }

    pub fn to_maze_file(&self) -> Result<MazeFile> {
        let path = self.solution_or_empty()?;
        Ok(MazeFile::new(self.grid.clone(), self.entry, self.exit, path))
    }

    fn solution_or_empty(&self) -> Result<Path> {
        match self.solve() {
            Ok(path) => Ok(path),
            Err(Error(ErrorKind::NoPathFound(entry, exit), _)) => {
                log::warn!("no path from {} to {}, saving an empty path", entry, exit);
                Ok(Path::default())
            }
            Err(e) => Err(e),
        }
    }
}
