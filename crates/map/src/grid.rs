use glam::DVec2;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Glyph marking the player's spawn cell. It is open floor.
pub const START_MARKER: char = '@';

/// Glyphs that are open floor. Every other glyph is a wall.
pub const OPEN_GLYPHS: [char; 3] = [' ', '.', START_MARKER];

/// Lines starting with this character are comments.
const COMMENT_MARKER: char = ';';

/// Errors from loading or parsing a map.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("failed to read map {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("map has no header line")]
    MissingHeader,
    #[error("map header has {found} fields, expected 5 (width height start_x start_y start_dir)")]
    HeaderFields { found: usize },
    #[error("invalid {field} in map header: {value:?}")]
    InvalidField { field: &'static str, value: String },
    #[error("map dimensions must be positive, got {width}x{height}")]
    EmptyDimensions { width: usize, height: usize },
    #[error("map declares {declared} rows but only {found} were found")]
    MissingRows { declared: usize, found: usize },
    #[error("map row {row} has {len} cells, expected at least {width}")]
    ShortRow { row: usize, len: usize, width: usize },
    #[error("start position ({x}, {y}) is outside the {width}x{height} map")]
    StartOutOfBounds {
        x: f64,
        y: f64,
        width: usize,
        height: usize,
    },
    #[error("start position ({x}, {y}) lies inside a wall")]
    StartInWall { x: f64, y: f64 },
}

/// Immutable grid of cell glyphs with a declared spawn point.
///
/// Built once at startup and shared read-only (`Arc<GridMap>`) between the
/// simulation and the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMap {
    width: usize,
    height: usize,
    rows: Vec<Vec<char>>,
    start: DVec2,
    start_dir: f64,
}

impl GridMap {
    /// Read and parse a map file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let map = Self::parse(&text)?;
        tracing::info!(
            path = %path.display(),
            width = map.width,
            height = map.height,
            "map loaded"
        );
        Ok(map)
    }

    /// Parse map text: a `width height start_x start_y start_dir` header
    /// followed by `height` rows. Empty lines and `;` comments are skipped.
    pub fn parse(text: &str) -> Result<Self, MapError> {
        let mut lines = text
            .lines()
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.is_empty() && !line.starts_with(COMMENT_MARKER));

        let header = lines.next().ok_or(MapError::MissingHeader)?;
        let fields: Vec<&str> = header.split_whitespace().collect();
        if fields.len() < 5 {
            return Err(MapError::HeaderFields {
                found: fields.len(),
            });
        }
        let width: usize = parse_field("width", fields[0])?;
        let height: usize = parse_field("height", fields[1])?;
        let start_x: f64 = parse_field("start_x", fields[2])?;
        let start_y: f64 = parse_field("start_y", fields[3])?;
        let start_dir: f64 = parse_field("start_dir", fields[4])?;

        if width == 0 || height == 0 {
            return Err(MapError::EmptyDimensions { width, height });
        }

        let mut rows = Vec::new();
        for line in lines.by_ref().take(height) {
            let cells: Vec<char> = line.chars().collect();
            if cells.len() < width {
                return Err(MapError::ShortRow {
                    row: rows.len(),
                    len: cells.len(),
                    width,
                });
            }
            rows.push(cells[..width].to_vec());
        }
        if rows.len() < height {
            return Err(MapError::MissingRows {
                declared: height,
                found: rows.len(),
            });
        }

        let map = Self {
            width,
            height,
            rows,
            start: DVec2::new(start_x, start_y),
            start_dir,
        };
        map.check_start()?;
        Ok(map)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Declared spawn position, in cells.
    pub fn start(&self) -> DVec2 {
        self.start
    }

    /// Declared spawn facing, in radians.
    pub fn start_dir(&self) -> f64 {
        self.start_dir
    }

    /// Whether `(x, y)` names a cell inside the grid.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u64) < self.width as u64 && (y as u64) < self.height as u64
    }

    /// Raw glyph at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: i64, y: i64) -> Option<char> {
        if !self.contains(x, y) {
            return None;
        }
        Some(self.rows[y as usize][x as usize])
    }

    /// Whether `(x, y)` blocks movement. Cells outside the grid are walls.
    pub fn is_wall(&self, x: i64, y: i64) -> bool {
        self.get(x, y).is_none_or(is_wall_glyph)
    }

    pub fn is_start_marker(&self, x: i64, y: i64) -> bool {
        self.get(x, y) == Some(START_MARKER)
    }

    /// All cells in row-major order as `(x, y, glyph)`.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, char)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(y, row)| row.iter().enumerate().map(move |(x, &c)| (x, y, c)))
    }

    /// Number of wall cells.
    pub fn wall_count(&self) -> usize {
        self.cells().filter(|&(_, _, c)| is_wall_glyph(c)).count()
    }

    fn check_start(&self) -> Result<(), MapError> {
        let (x, y) = (self.start.x, self.start.y);
        let (cx, cy) = (x.floor() as i64, y.floor() as i64);
        if !x.is_finite() || !y.is_finite() || !self.contains(cx, cy) {
            return Err(MapError::StartOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        if self.is_wall(cx, cy) {
            return Err(MapError::StartInWall { x, y });
        }
        Ok(())
    }
}

impl FromStr for GridMap {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Whether a glyph blocks movement.
pub fn is_wall_glyph(c: char) -> bool {
    !OPEN_GLYPHS.contains(&c)
}

fn parse_field<T: FromStr>(field: &'static str, value: &str) -> Result<T, MapError> {
    value.parse().map_err(|_| MapError::InvalidField {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOM: &str = "\
; a small room
5 4 1.5 1.5 0.0

#####
#@..#

#. ##
#####
";

    fn ten_by_ten() -> String {
        let mut text = String::from("10 10 5 5 0.0\n");
        text.push_str("##########\n");
        for _ in 0..8 {
            text.push_str("#........#\n");
        }
        text.push_str("##########\n");
        text
    }

    #[test]
    fn parses_declared_dimensions() {
        let map = GridMap::parse(&ten_by_ten()).unwrap();
        assert_eq!(map.width(), 10);
        assert_eq!(map.height(), 10);
        assert_eq!(map.start(), DVec2::new(5.0, 5.0));
        assert_eq!(map.start_dir(), 0.0);
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let map = GridMap::parse(ROOM).unwrap();
        assert_eq!(map.height(), 4);
        assert_eq!(map.get(1, 1), Some('@'));
        assert_eq!(map.get(2, 2), Some(' '));
    }

    #[test]
    fn wall_classification() {
        let map = GridMap::parse(ROOM).unwrap();
        assert!(map.is_wall(0, 0));
        assert!(!map.is_wall(1, 1), "start marker is open floor");
        assert!(!map.is_wall(2, 1));
        assert!(!map.is_wall(2, 2), "space is open floor");
        assert!(map.is_wall(3, 2));
        assert!(map.is_start_marker(1, 1));
        assert!(!map.is_start_marker(2, 1));
    }

    #[test]
    fn outside_grid_is_wall() {
        let map = GridMap::parse(ROOM).unwrap();
        assert!(map.is_wall(-1, 1));
        assert!(map.is_wall(5, 1));
        assert!(map.is_wall(1, 4));
        assert_eq!(map.get(1, -1), None);
    }

    #[test]
    fn queries_are_stable() {
        let map = GridMap::parse(ROOM).unwrap();
        for (x, y, _) in map.cells() {
            let (x, y) = (x as i64, y as i64);
            let first = map.is_wall(x, y);
            for _ in 0..3 {
                assert_eq!(map.is_wall(x, y), first);
            }
        }
    }

    #[test]
    fn missing_rows_fail() {
        let text = "10 10 5 5 0.0\n##########\n#........#\n";
        let err = GridMap::parse(text).unwrap_err();
        assert!(matches!(
            err,
            MapError::MissingRows {
                declared: 10,
                found: 2
            }
        ));
    }

    #[test]
    fn huge_declared_height_is_missing_rows() {
        let text = "3 18446744073709551615 1 1 0\n###\n#.#\n###\n";
        let err = GridMap::parse(text).unwrap_err();
        assert!(matches!(
            err,
            MapError::MissingRows {
                declared: usize::MAX,
                found: 3
            }
        ));
    }

    #[test]
    fn short_header_fails() {
        let err = GridMap::parse("3 3 1 1\n###\n#.#\n###\n").unwrap_err();
        assert!(matches!(err, MapError::HeaderFields { found: 4 }));
    }

    #[test]
    fn empty_input_fails() {
        let err = GridMap::parse("; only a comment\n\n").unwrap_err();
        assert!(matches!(err, MapError::MissingHeader));
    }

    #[test]
    fn bad_number_fails() {
        let err = GridMap::parse("3 x 1 1 0\n###\n#.#\n###\n").unwrap_err();
        assert!(matches!(err, MapError::InvalidField { field: "height", .. }));
    }

    #[test]
    fn short_row_fails() {
        let err = GridMap::parse("3 3 1 1 0\n###\n#.\n###\n").unwrap_err();
        assert!(matches!(
            err,
            MapError::ShortRow {
                row: 1,
                len: 2,
                width: 3
            }
        ));
    }

    #[test]
    fn zero_dimensions_fail() {
        let err = GridMap::parse("0 3 1 1 0\n").unwrap_err();
        assert!(matches!(err, MapError::EmptyDimensions { .. }));
    }

    #[test]
    fn start_inside_wall_fails() {
        let err = GridMap::parse("3 3 0 0 0\n###\n#.#\n###\n").unwrap_err();
        assert!(matches!(err, MapError::StartInWall { .. }));
    }

    #[test]
    fn start_outside_grid_fails() {
        let err = GridMap::parse("3 3 7 1 0\n###\n#.#\n###\n").unwrap_err();
        assert!(matches!(err, MapError::StartOutOfBounds { .. }));
    }

    #[test]
    fn long_rows_are_truncated_and_extra_fields_ignored() {
        let map = GridMap::parse("3 3 1 1 0 trailing\n#####\n#.###\n###\n").unwrap();
        assert_eq!(map.cells().count(), 9);
        assert!(map.is_wall(2, 1));
    }

    #[test]
    fn crlf_input() {
        let map = GridMap::parse("3 3 1 1 0\r\n###\r\n#.#\r\n###\r\n").unwrap();
        assert!(!map.is_wall(1, 1));
        assert!(map.is_wall(2, 1));
    }

    #[test]
    fn wall_count_and_from_str() {
        let map: GridMap = "3 3 1 1 0\n###\n#.#\n###\n".parse().unwrap();
        assert_eq!(map.wall_count(), 8);
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.txt");
        std::fs::write(&path, ROOM).unwrap();
        let map = GridMap::load(&path).unwrap();
        assert_eq!(map.width(), 5);
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = GridMap::load("/definitely/not/here/map.txt").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here/map.txt"));
    }

    #[test]
    fn bundled_sample_map_parses() {
        let map = GridMap::parse(include_str!("../../../maps/map_00.txt")).unwrap();
        assert_eq!((map.width(), map.height()), (16, 12));
        assert!(map.is_start_marker(1, 1));
        assert!(!map.is_wall(1, 1));
    }
}
