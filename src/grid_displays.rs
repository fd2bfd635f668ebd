use std::fmt;

use crate::cells::{Cartesian2DCoordinate, CompassPrimary};
use crate::grid::Grid;
use crate::pattern::PatternCellSet;

pub trait GridDisplay {
    /// Render the contents of a grid cell as text.
    /// The String should be 3 glyphs long, padded if required.
    fn render_cell_body(&self, _: Cartesian2DCoordinate) -> String {
        String::from("   ")
    }
}

/// Fills pattern cells with a solid block, deferring every other cell to an optional inner display.
pub struct PatternDisplay<'a> {
    pattern: &'a PatternCellSet,
    inner: Option<&'a dyn GridDisplay>,
}

impl<'a> PatternDisplay<'a> {
    pub fn new(pattern: &'a PatternCellSet, inner: Option<&'a dyn GridDisplay>) -> PatternDisplay<'a> {
        PatternDisplay { pattern, inner }
    }
}

impl<'a> fmt::Debug for PatternDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PatternDisplay :: pattern cells: {}, inner display: {}",
               self.pattern.len(), self.inner.is_some())
    }
}

impl<'a> GridDisplay for PatternDisplay<'a> {
    fn render_cell_body(&self, coord: Cartesian2DCoordinate) -> String {
        if self.pattern.is_masked(coord) {
            String::from("███")
        } else if let Some(inner) = self.inner {
            inner.render_cell_body(coord)
        } else {
            String::from("   ")
        }
    }
}

/// Box drawing text rendering of a grid, one 3 glyph body per cell.
///
/// Every wall bit is drawn as it is stored, so openings in the outer boundary show up as gaps.
pub struct TextRender<'a> {
    grid: &'a Grid,
    display: Option<&'a dyn GridDisplay>,
}

impl<'a> TextRender<'a> {
    pub fn new(grid: &'a Grid) -> TextRender<'a> {
        TextRender {
            grid,
            display: None,
        }
    }

    pub fn with_display(grid: &'a Grid, display: &'a dyn GridDisplay) -> TextRender<'a> {
        TextRender {
            grid,
            display: Some(display),
        }
    }

    // The horizontal wall segment on grid line `y` above column `x`.
    fn horizontal_wall(&self, x: u32, y: u32) -> bool {
        let (w, h) = (self.grid.width(), self.grid.height());
        if x >= w || y > h {
            return false;
        }
        let below = y < h && self.grid.has_wall(Cartesian2DCoordinate::new(x, y), CompassPrimary::North);
        let above = y > 0 &&
                    self.grid.has_wall(Cartesian2DCoordinate::new(x, y - 1), CompassPrimary::South);
        below || above
    }

    // The vertical wall segment on grid line `x` left of row `y`.
    fn vertical_wall(&self, x: u32, y: u32) -> bool {
        let (w, h) = (self.grid.width(), self.grid.height());
        if y >= h || x > w {
            return false;
        }
        let right = x < w && self.grid.has_wall(Cartesian2DCoordinate::new(x, y), CompassPrimary::West);
        let left = x > 0 &&
                   self.grid.has_wall(Cartesian2DCoordinate::new(x - 1, y), CompassPrimary::East);
        right || left
    }

    fn corner(&self, x: u32, y: u32) -> &'static str {
        let show_left_section = x > 0 && self.horizontal_wall(x - 1, y);
        let show_right_section = self.horizontal_wall(x, y);
        let show_up_section = y > 0 && self.vertical_wall(x, y - 1);
        let show_down_section = self.vertical_wall(x, y);

        match (show_left_section, show_right_section, show_up_section, show_down_section) {
            (true, true, true, true) => WALL_LRUD,
            (true, true, true, false) => WALL_LRU,
            (true, true, false, true) => WALL_LRD,
            (true, false, true, true) => WALL_LUD,
            (false, true, true, true) => WALL_RUD,
            (true, true, false, false) => WALL_LR,
            (false, false, true, true) => WALL_UD,
            (false, true, true, false) => WALL_RU,
            (true, false, false, true) => WALL_LD,
            (true, false, true, false) => WALL_LU,
            (false, true, false, true) => WALL_RD,
            (true, false, false, false) => WALL_L,
            (false, true, false, false) => WALL_R,
            (false, false, true, false) => WALL_U,
            (false, false, false, true) => WALL_D,
            (false, false, false, false) => " ",
        }
    }
}

const WALL_L: &str = "╴";
const WALL_R: &str = "╶";
const WALL_U: &str = "╵";
const WALL_D: &str = "╷";
const WALL_LR_3: &str = "───";
const WALL_LR: &str = "─";
const WALL_UD: &str = "│";
const WALL_LD: &str = "┐";
const WALL_RU: &str = "└";
const WALL_LU: &str = "┘";
const WALL_RD: &str = "┌";
const WALL_LRU: &str = "┴";
const WALL_LRD: &str = "┬";
const WALL_LRUD: &str = "┼";
const WALL_RUD: &str = "├";
const WALL_LUD: &str = "┤";

impl<'a> fmt::Display for TextRender<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (w, h) = (self.grid.width(), self.grid.height());

        // Each grid line y is drawn as a row of corners and horizontal walls, followed by the
        // cells of row y (absent for the final, southern, line).
        for y in 0..=h {
            let mut line_render = String::new();
            for x in 0..=w {
                line_render.push_str(self.corner(x, y));
                if x < w {
                    line_render.push_str(if self.horizontal_wall(x, y) { WALL_LR_3 } else { "   " });
                }
            }
            writeln!(f, "{}", line_render.trim_end())?;

            if y == h {
                break;
            }

            let mut row_render = String::new();
            for x in 0..=w {
                row_render.push_str(if self.vertical_wall(x, y) { WALL_UD } else { " " });
                if x < w {
                    let coord = Cartesian2DCoordinate::new(x, y);
                    match self.display {
                        Some(displayer) => row_render.push_str(&displayer.render_cell_body(coord)),
                        None => row_render.push_str("   "),
                    }
                }
            }
            writeln!(f, "{}", row_render.trim_end())?;
        }
        Ok(())
    }
}
