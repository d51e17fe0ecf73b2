use mazeview_common::Pose;
use mazeview_map::GridMap;
use std::f64::consts::FRAC_PI_2;
use std::fmt::Write;

/// Renderer-agnostic interface.
///
/// A renderer reads the map and a pose snapshot and produces output. It
/// never mutates either.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&self, map: &GridMap, pose: &Pose) -> Self::Output;
}

/// Text renderer: the raw map with the player's cell replaced by a heading arrow.
///
/// Used by the CLI and in tests where no GPU is available.
#[derive(Debug, Default)]
pub struct AsciiRenderer {
    /// Print a pose summary line above the grid.
    pub header: bool,
}

impl AsciiRenderer {
    pub fn new() -> Self {
        Self { header: true }
    }
}

/// Arrow glyph for the nearest quarter turn. Map Y grows downward.
pub fn heading_glyph(dir: f64) -> char {
    let quarter = (dir / FRAC_PI_2).round() as i64;
    ['>', 'v', '<', '^'][quarter.rem_euclid(4) as usize]
}

impl Renderer for AsciiRenderer {
    type Output = String;

    fn render(&self, map: &GridMap, pose: &Pose) -> String {
        let mut out = String::new();
        if self.header {
            let _ = writeln!(
                out,
                "pose: x={:.2} y={:.2} dir={:.1}deg tilt={:.1}deg",
                pose.position.x,
                pose.position.y,
                pose.dir.to_degrees(),
                pose.tilt.to_degrees()
            );
        }

        let player = pose.cell();
        let arrow = heading_glyph(pose.dir);
        for y in 0..map.height() {
            for x in 0..map.width() {
                let (xi, yi) = (x as i64, y as i64);
                if (xi, yi) == player {
                    out.push(arrow);
                } else {
                    out.push(map.get(xi, yi).unwrap_or(' '));
                }
            }
            out.push('\n');
        }
        out
    }
}
