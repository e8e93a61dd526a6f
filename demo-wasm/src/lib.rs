use drape::{
    ClothConfig, NoOpStepObserver, Obstacle, ObstacleFamily, ObstacleId, ObstacleSet, Transform,
    Vec3, XpbdCloth,
};
use wasm_bindgen::prelude::*;

// ---- Cloth Demo ----

#[wasm_bindgen]
pub struct ClothDemo {
    cloth: XpbdCloth<f32>,
    world: ObstacleSet<f32>,
    ball: ObstacleId,
    pole: ObstacleId,
}

#[wasm_bindgen]
impl ClothDemo {
    #[wasm_bindgen(constructor)]
    pub fn new(segments_x: usize, segments_y: usize, width: f32, height: f32) -> Self {
        let config = ClothConfig::new()
            .with_segments(segments_x, segments_y)
            .with_size(width, height);
        let transform = Transform::from_translation(Vec3::new(0.0, height * 0.5, 0.0));
        let cloth = XpbdCloth::build(config, transform);

        let mut world = ObstacleSet::new();
        let ball = world.insert(
            ObstacleFamily::Sphere,
            Obstacle::new(Vec3::new(0.0, 0.0, 1.5), width * 0.15),
        );
        let pole = world.insert(
            ObstacleFamily::Circle,
            Obstacle::new(Vec3::new(width * 0.3, -height * 0.2, 0.0), width * 0.05),
        );

        ClothDemo { cloth, world, ball, pole }
    }

    pub fn update(&mut self, dt: f32) {
        self.cloth.tick(dt, &mut self.world, &mut NoOpStepObserver);
    }

    pub fn move_ball(&mut self, x: f32, y: f32, z: f32) {
        if let Some(ball) = self.world.get_mut(self.ball) {
            ball.center = Vec3::new(x, y, z);
        }
    }

    pub fn set_pole_enabled(&mut self, enabled: bool) {
        if let Some(pole) = self.world.get_mut(self.pole) {
            pole.enabled = enabled;
        }
    }

    /// Drag a pinned particle of the top row. Returns false if it is not pinned.
    pub fn move_pin(&mut self, col: usize, x: f32, y: f32, z: f32) -> bool {
        self.cloth.move_pin(col, 0, Vec3::new(x, y, z)).is_ok()
    }

    pub fn release(&mut self, col: usize) {
        let _ = self.cloth.unpin(col, 0);
    }

    pub fn set_stiffness(&mut self, stretch_compliance: f32, shear_compliance: f32) {
        let config = self
            .cloth
            .config()
            .clone()
            .with_compliance(stretch_compliance, shear_compliance);
        self.cloth.set_config(config);
        self.cloth.rebuild();
    }

    pub fn reset(&mut self) {
        self.cloth.rebuild();
    }

    /// Returns flat [x0, y0, z0, x1, ...] world positions in row-major order
    pub fn positions(&self) -> Vec<f32> {
        let pos = self.cloth.positions();
        let mut out = Vec::with_capacity(pos.len() * 3);
        for p in &pos {
            out.push(p.x);
            out.push(p.y);
            out.push(p.z);
        }
        out
    }

    /// Local-space mesh vertices, flat xyz
    pub fn vertices(&self) -> Vec<f32> {
        self.cloth.mesh().flat_vertices()
    }

    pub fn normals(&self) -> Vec<f32> {
        self.cloth.mesh().normals.iter().flat_map(|n| [n.x, n.y, n.z]).collect()
    }

    pub fn uvs(&self) -> Vec<f32> {
        self.cloth.mesh().uvs.iter().flat_map(|uv| [uv.x, uv.y]).collect()
    }

    pub fn indices(&self) -> Vec<u32> {
        self.cloth.mesh().indices.clone()
    }

    /// Returns [min_x, min_y, min_z, max_x, max_y, max_z]
    pub fn bounds(&self) -> Vec<f32> {
        let b = self.cloth.mesh().bounds;
        vec![b.min.x, b.min.y, b.min.z, b.max.x, b.max.y, b.max.z]
    }

    pub fn cols(&self) -> usize {
        self.cloth.columns()
    }

    pub fn rows(&self) -> usize {
        self.cloth.rows()
    }
}
