use crate::camera::{WALL_HEIGHT, to_world};
use glam::{Vec2, Vec3};
use mazeview_map::GridMap;

/// Which texture a quad is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Wall,
    Floor,
    Ceiling,
}

/// A textured quad in world space, corners in winding order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub corners: [Vec3; 4],
    pub uvs: [Vec2; 4],
}

/// Texture coordinates shared by every quad: v = 0 is the top of the image.
const QUAD_UVS: [Vec2; 4] = [
    Vec2::new(0.0, 1.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(0.0, 0.0),
];

impl Quad {
    fn new(corners: [Vec3; 4]) -> Self {
        Self {
            corners,
            uvs: QUAD_UVS,
        }
    }

    /// Split into two triangles, as `(position, uv)` pairs.
    pub fn triangles(&self) -> [(Vec3, Vec2); 6] {
        let v = |i: usize| (self.corners[i], self.uvs[i]);
        [v(0), v(1), v(2), v(2), v(3), v(0)]
    }
}

/// Static 3D geometry of a map: wall boxes, floor and ceiling tiles.
///
/// The map never changes, so this is built once and uploaded once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneGeometry {
    walls: Vec<Quad>,
    floors: Vec<Quad>,
    ceilings: Vec<Quad>,
}

impl SceneGeometry {
    /// Four side faces per wall cell; one floor and one ceiling tile per open cell.
    pub fn build(map: &GridMap) -> Self {
        let mut scene = Self::default();
        for (x, y, _) in map.cells() {
            let (x0, y0) = (x as f64, y as f64);
            let (x1, y1) = (x0 + 1.0, y0 + 1.0);
            if map.is_wall(x as i64, y as i64) {
                scene.walls.push(side(x0, y0, x1, y0));
                scene.walls.push(side(x0, y1, x1, y1));
                scene.walls.push(side(x0, y0, x0, y1));
                scene.walls.push(side(x1, y0, x1, y1));
            } else {
                scene.floors.push(tile(x0, y0, x1, y1, 0.0));
                scene.ceilings.push(tile(x0, y0, x1, y1, WALL_HEIGHT));
            }
        }
        tracing::debug!(
            walls = scene.walls.len(),
            floors = scene.floors.len(),
            ceilings = scene.ceilings.len(),
            "scene geometry built"
        );
        scene
    }

    pub fn quads(&self, surface: Surface) -> &[Quad] {
        match surface {
            Surface::Wall => &self.walls,
            Surface::Floor => &self.floors,
            Surface::Ceiling => &self.ceilings,
        }
    }

    pub fn quad_count(&self) -> usize {
        self.walls.len() + self.floors.len() + self.ceilings.len()
    }
}

/// Vertical face from `(ax, ay)` to `(bx, by)`, floor to wall top.
fn side(ax: f64, ay: f64, bx: f64, by: f64) -> Quad {
    Quad::new([
        to_world(ax, ay, 0.0),
        to_world(bx, by, 0.0),
        to_world(bx, by, WALL_HEIGHT),
        to_world(ax, ay, WALL_HEIGHT),
    ])
}

/// Horizontal tile covering one cell at height `z`.
fn tile(x0: f64, y0: f64, x1: f64, y1: f64, z: f32) -> Quad {
    Quad::new([
        to_world(x0, y0, z),
        to_world(x0, y1, z),
        to_world(x1, y1, z),
        to_world(x1, y0, z),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> GridMap {
        GridMap::parse("4 3 1.5 1.5 0\n####\n#@.#\n####\n").unwrap()
    }

    #[test]
    fn counts_per_surface() {
        let scene = SceneGeometry::build(&room());
        assert_eq!(scene.quads(Surface::Wall).len(), 10 * 4);
        assert_eq!(scene.quads(Surface::Floor).len(), 2);
        assert_eq!(scene.quads(Surface::Ceiling).len(), 2);
        assert_eq!(scene.quad_count(), 44);
    }

    #[test]
    fn floor_and_ceiling_heights() {
        let scene = SceneGeometry::build(&room());
        for quad in scene.quads(Surface::Floor) {
            assert!(quad.corners.iter().all(|c| c.z == 0.0));
        }
        for quad in scene.quads(Surface::Ceiling) {
            assert!(quad.corners.iter().all(|c| c.z == WALL_HEIGHT));
        }
    }

    #[test]
    fn start_cell_tile_covers_its_cell() {
        let scene = SceneGeometry::build(&room());
        let first = scene.quads(Surface::Floor)[0];
        let min = first.corners.iter().fold(Vec3::splat(f32::MAX), |a, c| a.min(*c));
        let max = first.corners.iter().fold(Vec3::splat(f32::MIN), |a, c| a.max(*c));
        assert_eq!(min.truncate(), Vec2::new(1.0, -2.0));
        assert_eq!(max.truncate(), Vec2::new(2.0, -1.0));
    }

    #[test]
    fn walls_span_floor_to_top() {
        let scene = SceneGeometry::build(&room());
        for quad in scene.quads(Surface::Wall) {
            let zs: Vec<f32> = quad.corners.iter().map(|c| c.z).collect();
            assert_eq!(zs, vec![0.0, 0.0, WALL_HEIGHT, WALL_HEIGHT]);
        }
    }

    #[test]
    fn triangles_reuse_corners() {
        let quad = tile(0.0, 0.0, 1.0, 1.0, 0.0);
        let tris = quad.triangles();
        assert_eq!(tris[0], tris[5]);
        assert_eq!(tris[2], tris[3]);
        assert_eq!(tris[2].1, Vec2::new(1.0, 0.0));
    }
}
