use docopt::Docopt;
use mazegen::{
    cells::Cartesian2DCoordinate,
    generators::Algorithm,
    grid::{Grid, ENCLOSED},
    grid_displays::{GridDisplay, PatternDisplay, TextRender},
    maze::{Maze, MazeConfigBuilder},
    pathing::{Distances, PathDisplay},
    pattern::PatternCellSet,
    serializer::MazeFile,
    units::{Height, Width},
};
use serde_derive::Deserialize;
use std::{
    fs::{self, File},
    io::BufWriter,
};

const USAGE: &str = "Mazegen

Usage:
    mazegen_driver -h | --help
    mazegen_driver generate [--width=<w>] [--height=<h>] [--entry=<x,y>] [--exit=<x,y>] [--algorithm=<alg>] [--imperfect] [--seed=<n>] [--output=<path>] [--show | --show-distances]
    mazegen_driver check <file>
    mazegen_driver show <file> [--show-path]

Options:
    -h --help              Show this screen.
    --width=<w>            Number of cells across the maze [default: 20].
    --height=<h>           Number of cells down the maze [default: 15].
    --entry=<x,y>          Entry cell, 0 based from the top left [default: 0,0].
    --exit=<x,y>           Exit cell. The bottom right cell if not specified.
    --algorithm=<alg>      Maze generation algorithm, dfs or prim [default: dfs].
    --imperfect            Knock down extra walls so the maze has loops and more than one route.
    --seed=<n>             Random seed; the same seed and settings always give the same maze. Random if not specified.
    --output=<path>        Path of the maze file to write [default: maze.txt].
    --show                 Print the maze and its solution as text.
    --show-distances       Print the maze with the distance from the entry to every cell.
    --show-path            Draw the path stored in the maze file.
";
#[derive(Debug, Deserialize)]
struct MazeArgs {
    cmd_generate: bool,
    cmd_check: bool,
    cmd_show: bool,
    arg_file: String,
    flag_width: u32,
    flag_height: u32,
    flag_entry: String,
    flag_exit: Option<String>,
    flag_algorithm: String,
    flag_imperfect: bool,
    flag_seed: Option<u64>,
    flag_output: String,
    flag_show: bool,
    flag_show_distances: bool,
    flag_show_path: bool,
}

mod errors {
    use error_chain::*;
    error_chain! {

        links {
            Maze(::mazegen::errors::Error, ::mazegen::errors::ErrorKind);
        }

        foreign_links {
            DocOptFailure(::docopt::Error);
            Io(::std::io::Error);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: MazeArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;

    if args.cmd_generate {
        generate(&args)
    } else if args.cmd_check {
        check(&args.arg_file)
    } else if args.cmd_show {
        show(&args.arg_file, args.flag_show_path)
    } else {
        Ok(())
    }
}

fn generate(args: &MazeArgs) -> Result<()> {
    let entry = args.flag_entry.parse::<Cartesian2DCoordinate>()?;
    let algorithm = args.flag_algorithm.parse::<Algorithm>()?;
    let mut builder = MazeConfigBuilder::new()
        .dimensions(Width(args.flag_width), Height(args.flag_height))
        .entry(entry)
        .algorithm(algorithm)
        .perfect(!args.flag_imperfect)
        .seed(args.flag_seed);
    if let Some(ref exit) = args.flag_exit {
        builder = builder.exit(exit.parse::<Cartesian2DCoordinate>()?);
    }

    let maze = Maze::new(builder.build()).chain_err(|| "Failed to generate the maze")?;
    log::info!("seed {} (pass --seed={} to generate this maze again)", maze.seed(), maze.seed());

    let file = File::create(&args.flag_output)
        .chain_err(|| format!("Failed to create maze file {}", args.flag_output))?;
    maze.serialize(BufWriter::new(file))
        .chain_err(|| format!("Failed to write maze file {}", args.flag_output))?;
    log::info!("maze written to {}", args.flag_output);

    if args.flag_show_distances {
        let distances = Distances::new(maze.grid_snapshot(), maze.entry())
            .ok_or("Entry is not a cell of the maze.")?;
        println!("{}", render_text(maze.grid_snapshot(), maze.pattern_cells(), Some(&distances)));
    } else if args.flag_show {
        match maze.solve() {
            Ok(path) => {
                let display_path = PathDisplay::new(maze.entry(), &path);
                println!("{}", render_text(maze.grid_snapshot(), maze.pattern_cells(), Some(&display_path)));
            }
            Err(e) => {
                log::warn!("{}", e);
                println!("{}", render_text(maze.grid_snapshot(), maze.pattern_cells(), None));
            }
        }
    }

    Ok(())
}

fn check(file_path: &str) -> Result<()> {
    let maze_file = load_maze_file(file_path)?;
    maze_file.validate().chain_err(|| format!("{} failed validation", file_path))?;

    let grid = maze_file.grid();
    if maze_file.path().is_empty() {
        log::warn!("{} records no path from {} to {}", file_path, maze_file.entry(), maze_file.exit());
    }
    println!("{}: valid {}x{} maze, entry {}, exit {}, path of {} moves",
             file_path,
             grid.width(),
             grid.height(),
             maze_file.entry(),
             maze_file.exit(),
             maze_file.path().len());
    Ok(())
}

fn show(file_path: &str, show_path: bool) -> Result<()> {
    let maze_file = load_maze_file(file_path)?;
    let grid = maze_file.grid();

    // The file does not record the pattern, so take the pattern cells that are still walled in.
    let expected_pattern = PatternCellSet::for_dimensions(grid.width(), grid.height());
    let pattern = PatternCellSet::from_cells(grid.width(),
                                             grid.height(),
                                             expected_pattern.cells()
                                                 .iter()
                                                 .cloned()
                                                 .filter(|c| grid.mask(*c) == Some(ENCLOSED)));

    if show_path {
        let display_path = PathDisplay::new(maze_file.entry(), maze_file.path());
        println!("{}", render_text(grid, &pattern, Some(&display_path)));
    } else {
        println!("{}", render_text(grid, &pattern, None));
    }
    Ok(())
}

fn load_maze_file(file_path: &str) -> Result<MazeFile> {
    let text = fs::read_to_string(file_path)
        .chain_err(|| format!("Failed to read maze file {}", file_path))?;
    let maze_file = MazeFile::parse(&text).chain_err(|| format!("Failed to parse maze file {}", file_path))?;
    Ok(maze_file)
}

fn render_text(grid: &Grid, pattern: &PatternCellSet, overlay: Option<&dyn GridDisplay>) -> String {
    let display = PatternDisplay::new(pattern, overlay);
    TextRender::with_display(grid, &display).to_string()
}
