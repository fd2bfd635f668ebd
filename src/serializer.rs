//! The maze file format.
//!
//! ```text
//! 0397
//! EC41
//!
//! (0,0)
//! (3,1)
//! ESEE
//! ```
//!
//! One uppercase hexadecimal digit per cell wall mask, one line per grid row, then a blank line,
//! the entry and exit coordinates and the solution path. The path line is empty when the maze
//! has no solution. Every line, the last included, ends with a newline.

use error_chain::bail;
use itertools::Itertools;
use std::io::Write;

use crate::cells::Cartesian2DCoordinate;
use crate::errors::*;
use crate::grid::Grid;
use crate::pathing::Path;
use crate::units::{Height, Width};

fn render(grid: &Grid,
          entry: Cartesian2DCoordinate,
          exit: Cartesian2DCoordinate,
          path: &Path)
          -> String {
    let rows = grid.rows()
        .map(|row| row.iter().map(|mask| format!("{:X}", mask)).join(""))
        .join("\n");
    format!("{}\n\n{}\n{}\n{}\n", rows, entry, exit, path)
}

/// Write a maze in the maze file format.
pub fn write_maze<W: Write>(mut writer: W,
                            grid: &Grid,
                            entry: Cartesian2DCoordinate,
                            exit: Cartesian2DCoordinate,
                            path: &Path)
                            -> Result<()> {
    writer.write_all(render(grid, entry, exit, path).as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// The contents of a maze file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeFile {
    grid: Grid,
    entry: Cartesian2DCoordinate,
    exit: Cartesian2DCoordinate,
    path: Path,
}

fn malformed(line: usize, reason: String) -> Error {
    ErrorKind::MalformedMazeFile(line, reason).into()
}

impl MazeFile {
    pub fn new(grid: Grid,
               entry: Cartesian2DCoordinate,
               exit: Cartesian2DCoordinate,
               path: Path)
               -> MazeFile {
        MazeFile {
            grid,
            entry,
            exit,
            path,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn entry(&self) -> Cartesian2DCoordinate {
        self.entry
    }

    pub fn exit(&self) -> Cartesian2DCoordinate {
        self.exit
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse maze file text. Hex digits may be in either case.
    ///
    /// Only the layout is checked here; `validate` checks that the contents make sense.
    pub fn parse(text: &str) -> Result<MazeFile> {
        let lines = text.lines().collect::<Vec<&str>>();
        let blank_index = match lines.iter().position(|line| line.trim().is_empty()) {
            Some(index) => index,
            None => {
                bail!(malformed(lines.len() + 1, String::from("missing blank line after the wall rows")))
            }
        };
        if blank_index == 0 {
            bail!(malformed(1, String::from("no wall rows")));
        }

        let width = lines[0].len();
        let mut masks = Vec::with_capacity(width * blank_index);
        for (i, row) in lines[..blank_index].iter().enumerate() {
            if row.len() != width {
                bail!(malformed(i + 1, format!("row has {} cells, expected {}", row.len(), width)));
            }
            for symbol in row.chars() {
                match symbol.to_digit(16) {
                    Some(mask) => masks.push(mask as u8),
                    None => bail!(malformed(i + 1, format!("'{}' is not a hexadecimal wall mask", symbol))),
                }
            }
        }
        let grid = Grid::from_masks(Width(width as u32), Height(blank_index as u32), masks)?;

        let coordinate_at = |index: usize, name: &str| -> Result<Cartesian2DCoordinate> {
            let line = lines.get(index)
                .ok_or_else(|| malformed(index + 1, format!("missing {} coordinate", name)))?;
            line.parse::<Cartesian2DCoordinate>()
                .map_err(|e| malformed(index + 1, format!("bad {} coordinate: {}", name, e)))
        };
        let entry = coordinate_at(blank_index + 1, "entry")?;
        let exit = coordinate_at(blank_index + 2, "exit")?;

        let path_index = blank_index + 3;
        let path = match lines.get(path_index) {
            Some(line) => {
                line.parse::<Path>()
                    .map_err(|e| malformed(path_index + 1, e.to_string()))?
            }
            None => Path::default(),
        };

        if let Some(extra) = lines.iter().skip(path_index + 1).position(|line| !line.trim().is_empty()) {
            bail!(malformed(path_index + extra + 2, String::from("unexpected text after the path")));
        }

        Ok(MazeFile::new(grid, entry, exit, path))
    }

    /// The file text, byte for byte what `write_maze` produces.
    pub fn to_text(&self) -> String {
        render(&self.grid, self.entry, self.exit, &self.path)
    }

    /// Mechanical checks for a maze file: walls agree on both sides, entry and exit are on the
    /// grid and a non empty path walks through open walls from the entry to the exit.
    pub fn validate(&self) -> Result<()> {
        if let Some(&(a, b)) = self.grid.inconsistent_walls().first() {
            bail!(ErrorKind::InconsistentWalls(a, b));
        }
        for &coord in &[self.entry, self.exit] {
            if !self.grid.is_valid_coordinate(coord) {
                bail!(ErrorKind::OutOfBounds(coord));
            }
        }
        if self.path.is_empty() {
            return Ok(());
        }

        let mut current = self.entry;
        for (i, &dir) in self.path.moves().iter().enumerate() {
            if !self.grid.is_open(current, dir) {
                bail!(ErrorKind::InvalidPath(format!("move {} '{}' from {} goes through a wall",
                                                     i + 1,
                                                     dir.symbol(),
                                                     current)));
            }
            current = match self.grid.neighbour_at_direction(current, dir) {
                Some(next) => next,
                None => bail!(ErrorKind::InvalidPath(format!("move {} leaves the grid", i + 1))),
            };
        }
        if current != self.exit {
            bail!(ErrorKind::InvalidPath(format!("path ends at {} instead of the exit {}",
                                                 current,
                                                 self.exit)));
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::generators::Algorithm;
    use crate::maze::{Maze, MazeConfigBuilder};
    use quickcheck::{quickcheck, TestResult};

    // 4x2, entry top left, exit bottom right, both opened to the outside
    const SAMPLE: &str = "0397\nEC41\n\n(0,0)\n(3,1)\nESEE\n";

    fn gc(x: u32, y: u32) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate::new(x, y)
    }

    fn malformed_line(result: Result<MazeFile>) -> usize {
        match result {
            Err(Error(ErrorKind::MalformedMazeFile(line, _), _)) => line,
            other => panic!("expected a malformed file error, got {:?}", other),
        }
    }

    #[test]
    fn parse_sample() {
        let file = MazeFile::parse(SAMPLE).unwrap();
        assert_eq!((file.grid().width(), file.grid().height()), (4, 2));
        assert_eq!(file.grid().masks(), &[0, 3, 9, 7, 14, 12, 4, 1]);
        assert_eq!(file.entry(), gc(0, 0));
        assert_eq!(file.exit(), gc(3, 1));
        assert_eq!(file.path().to_string(), "ESEE");
        file.validate().unwrap();
        assert_eq!(file.to_text(), SAMPLE);
    }

    #[test]
    fn write_matches_text() {
        let file = MazeFile::parse(SAMPLE).unwrap();
        let mut out = vec![];
        write_maze(&mut out, file.grid(), file.entry(), file.exit(), file.path()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), SAMPLE);
    }

    #[test]
    fn lowercase_and_crlf_are_accepted() {
        let text = "0397\r\nec41\r\n\r\n(0,0)\r\n(3,1)\r\nESEE\r\n";
        let file = MazeFile::parse(text).unwrap();
        assert_eq!(file.to_text(), SAMPLE);
    }

    #[test]
    fn empty_path_line() {
        let text = "0397\nEC41\n\n(0,0)\n(3,1)\n\n";
        let file = MazeFile::parse(text).unwrap();
        assert!(file.path().is_empty());
        assert_eq!(file.to_text(), text);
        file.validate().unwrap();

        // a file cut short after the exit reads as an empty path too
        let file = MazeFile::parse("0397\nEC41\n\n(0,0)\n(3,1)\n").unwrap();
        assert!(file.path().is_empty());
    }

    #[test]
    fn malformed_files() {
        assert_eq!(malformed_line(MazeFile::parse("0397\nEC41\n(0,0)\n(3,1)\nESEE\n")), 6);
        assert_eq!(malformed_line(MazeFile::parse("\n(0,0)\n(3,1)\n")), 1);
        assert_eq!(malformed_line(MazeFile::parse("0397\nEC4\n\n(0,0)\n(3,1)\nESEE\n")), 2);
        assert_eq!(malformed_line(MazeFile::parse("0397\nECG1\n\n(0,0)\n(3,1)\nESEE\n")), 2);
        assert_eq!(malformed_line(MazeFile::parse("0397\nEC41\n\n(0;0)\n(3,1)\nESEE\n")), 4);
        assert_eq!(malformed_line(MazeFile::parse("0397\nEC41\n\n(0,0)\n")), 5);
        assert_eq!(malformed_line(MazeFile::parse("0397\nEC41\n\n(0,0)\n(3,1)\nESXE\n")), 6);
        assert_eq!(malformed_line(MazeFile::parse("0397\nEC41\n\n(0,0)\n(3,1)\nESEE\n\nmore\n")), 8);
    }

    #[test]
    fn validation_failures() {
        let inconsistent = MazeFile::parse("0797\nEC41\n\n(0,0)\n(3,1)\n\n").unwrap();
        match inconsistent.validate() {
            Err(Error(ErrorKind::InconsistentWalls(a, b), _)) => assert_eq!((a, b), (gc(1, 0), gc(1, 1))),
            other => panic!("unexpected {:?}", other),
        }

        let outside = MazeFile::parse("0397\nEC41\n\n(0,0)\n(4,1)\n\n").unwrap();
        match outside.validate() {
            Err(Error(ErrorKind::OutOfBounds(coord), _)) => assert_eq!(coord, gc(4, 1)),
            other => panic!("unexpected {:?}", other),
        }

        let invalid_path = |path: &str| {
            let file = MazeFile::parse(&format!("0397\nEC41\n\n(0,0)\n(3,1)\n{}\n", path)).unwrap();
            match file.validate() {
                Err(Error(ErrorKind::InvalidPath(_), _)) => true,
                _ => false,
            }
        };
        assert!(invalid_path("EE"));
        assert!(invalid_path("ESE"));
        assert!(invalid_path("N"));
        assert!(!invalid_path("ESEE"));
        assert!(!invalid_path("ESEWEE"));
    }

    #[test]
    fn quickcheck_serialize_parse_serialize() {
        fn p(w: u8, h: u8, seed: u64, perfect: bool) -> TestResult {
            let (w, h) = (u32::from(w % 25) + 2, u32::from(h % 25) + 2);
            let config = MazeConfigBuilder::new()
                .dimensions(Width(w), Height(h))
                .algorithm(Algorithm::Prim)
                .perfect(perfect)
                .seed(Some(seed))
                .build();
            let maze = match Maze::new(config) {
                Ok(maze) => maze,
                Err(_) => return TestResult::failed(),
            };
            let mut out = vec![];
            if maze.serialize(&mut out).is_err() {
                return TestResult::failed();
            }
            let text = match String::from_utf8(out) {
                Ok(text) => text,
                Err(_) => return TestResult::failed(),
            };
            match MazeFile::parse(&text) {
                Ok(file) => TestResult::from_bool(file.to_text() == text && file.validate().is_ok()),
                Err(_) => TestResult::failed(),
            }
        }
        quickcheck(p as fn(u8, u8, u64, bool) -> TestResult);
    }
}
