//! Error types for maze construction, solving and (de)serialization.
//!
//! Other modules `use crate::errors::*;` to get the `Error`, `ErrorKind`,
//! `Result` and `ResultExt` types created by `error_chain!`.

use crate::cells::Cartesian2DCoordinate;
use error_chain::*;

error_chain! {

    foreign_links {
        Io(::std::io::Error);
        ParseInt(::std::num::ParseIntError);
    }

    errors {
        InvalidDimensions(width: u32, height: u32) {
            description("invalid maze dimensions")
            display("invalid maze dimensions {}x{}: both sides must be positive and hold at least 2 cells",
                    width, height)
        }

        OutOfBounds(coord: Cartesian2DCoordinate) {
            description("coordinate outside the grid")
            display("coordinate {} is outside the grid", coord)
        }

        EntryExitCollision(coord: Cartesian2DCoordinate) {
            description("entry and exit collide")
            display("entry/exit at {} is shared or lies inside the pattern", coord)
        }

        NotAdjacent(a: Cartesian2DCoordinate, b: Cartesian2DCoordinate) {
            description("cells are not adjacent")
            display("cells {} and {} are not 4-adjacent grid cells", a, b)
        }

        NoPathFound(entry: Cartesian2DCoordinate, exit: Cartesian2DCoordinate) {
            description("no path between entry and exit")
            display("no path from {} to {}", entry, exit)
        }

        DisconnectedRegion(unreachable: usize) {
            description("pattern splits the free cells")
            display("pattern leaves {} free cells unreachable from the entry", unreachable)
        }

        MalformedMazeFile(line: usize, reason: String) {
            description("malformed maze file")
            display("malformed maze file at line {}: {}", line, reason)
        }

        InconsistentWalls(a: Cartesian2DCoordinate, b: Cartesian2DCoordinate) {
            description("inconsistent walls")
            display("wall between {} and {} is open on one side only", a, b)
        }

        InvalidPath(reason: String) {
            description("invalid path")
            display("invalid path: {}", reason)
        }
    }
}
