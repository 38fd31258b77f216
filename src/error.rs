/// Startup errors. The running simulation has none of its own: bad indices
/// are programming errors and panic, rejected moves and uses are values.

use std::path::PathBuf;

/// Failures while reading a map file. All are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// First record is not `width,height`.
    #[error("bad header: expected `width,height`, found {0:?}")]
    BadHeader(String),

    #[error("map is {width}x{height} tiles; each side must be 1..={max}")]
    BadDimensions { width: usize, height: usize, max: usize },

    #[error("{layer} layer ends after {found} of {expected} rows")]
    MissingRows { layer: &'static str, expected: usize, found: usize },

    #[error("{layer} layer row {row} has {found} cells, expected {expected}")]
    RowLength { layer: &'static str, row: usize, expected: usize, found: usize },

    #[error("{layer} layer row {row}: {text:?} is not a cell code")]
    BadCell { layer: &'static str, row: usize, text: String },

    #[error("collision row {row} col {col}: unknown code {code}")]
    UnknownCollision { row: usize, col: usize, code: u16 },

    #[error("rail row {row} col {col}: unknown code {code}")]
    UnknownRail { row: usize, col: usize, code: u16 },

    #[error("{0} unexpected rows after the rail layer")]
    TrailingRows(usize),

    /// Authored content (spawn, people, pads, landings, maze) reaches past
    /// the map edge.
    #[error("map is {width}x{height} tiles; the world needs at least {need_width}x{need_height}")]
    TooSmall { width: usize, height: usize, need_width: usize, need_height: usize },
}
