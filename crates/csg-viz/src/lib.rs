//! Rendering helpers for the CSG viewer.

use bsp_csg::{BooleanOp, Csg, CsgError, Mesh, Solid};
use macroquad::models::{draw_mesh, Mesh as DrawMesh, Vertex};
use macroquad::prelude::*;
use nalgebra::{Matrix4, Point3, Rotation3, Translation3, Vector3};
use tracing::debug;

/// Triangles per draw call; macroquad index buffers are `u16`.
const TRIANGLES_PER_BATCH: usize = u16::MAX as usize / 3;

/// Base colour for a submesh: the first operand is warm, the second cool.
pub fn submesh_color(submesh: usize) -> Color {
    match submesh {
        0 => Color::from_rgba(230, 140, 60, 255),
        1 => Color::from_rgba(70, 150, 230, 255),
        n => {
            let hue = (n as f32 * 0.618_034).fract();
            macroquad::color::hsl_to_rgb(hue, 0.6, 0.55)
        }
    }
}

/// Scales a colour by a simple headlight term so faces stay readable.
fn shade(color: Color, normal: &Vector3<f32>, light: &Vector3<f32>) -> Color {
    let intensity = 0.35 + 0.65 * normal.dot(light).max(0.0);
    Color::new(
        color.r * intensity,
        color.g * intensity,
        color.b * intensity,
        color.a,
    )
}

#[inline]
fn to_vec3(p: &Point3<f32>) -> Vec3 {
    vec3(p.x, p.y, p.z)
}

/// Draws every submesh of a CSG result with flat shading.
///
/// Triangles are unrolled rather than indexed so each face gets its own
/// shade, and split into batches that fit a `u16` index buffer.
pub fn draw_csg_mesh(mesh: &Mesh, light: &Vector3<f32>) {
    let light = light.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::y);

    for (submesh, indices) in mesh.submeshes.iter().enumerate() {
        let base = submesh_color(submesh);

        for batch in indices.chunks(TRIANGLES_PER_BATCH * 3) {
            let mut vertices = Vec::with_capacity(batch.len());
            for triangle in batch.chunks_exact(3) {
                let [a, b, c] = [0, 1, 2].map(|k| &mesh.positions[triangle[k] as usize]);
                let normal = (b - a).cross(&(c - a));
                let normal = normal.try_normalize(f32::EPSILON).unwrap_or(normal);
                let color = shade(base, &normal, &light);

                for p in [a, b, c] {
                    vertices.push(Vertex::new2(to_vec3(p), Vec2::ZERO, color));
                }
            }

            let indices = (0..vertices.len() as u16).collect();
            draw_mesh(&DrawMesh {
                vertices,
                indices,
                texture: None,
            });
        }
    }
}

/// Draws the triangle edges of a CSG result.
pub fn draw_csg_wireframe(mesh: &Mesh, color: Color) {
    for [a, b, c] in mesh.triangles() {
        let [a, b, c] = [a, b, c].map(|i| to_vec3(&mesh.positions[i as usize]));
        draw_line_3d(a, b, color);
        draw_line_3d(b, c, color);
        draw_line_3d(c, a, color);
    }
}

/// Two cubes combined with a selectable operation.
///
/// The second cube orbits the first; the result is recomputed only when
/// the operation or the placement changes.
pub struct Scene {
    pub op: BooleanOp,
    pub offset: Vector3<f32>,
    pub spin: f32,
    csg: Csg,
    base: Mesh,
    tool: Mesh,
    result: Mesh,
    dirty: bool,
}

impl Scene {
    pub fn new(csg: Csg) -> Self {
        Self {
            op: BooleanOp::Subtract,
            offset: Vector3::new(0.5, 0.5, 0.5),
            spin: 0.0,
            csg,
            base: Mesh::cuboid(Point3::origin(), Vector3::repeat(2.0)),
            tool: Mesh::cuboid(Point3::origin(), Vector3::repeat(1.6)),
            result: Mesh::default(),
            dirty: true,
        }
    }

    /// Selects the operation to display.
    pub fn set_op(&mut self, op: BooleanOp) {
        if self.op != op {
            self.op = op;
            self.dirty = true;
        }
    }

    /// Moves the second cube.
    pub fn set_placement(&mut self, offset: Vector3<f32>, spin: f32) {
        self.offset = offset;
        self.spin = spin;
        self.dirty = true;
    }

    /// World transform of the second cube.
    pub fn tool_transform(&self) -> Matrix4<f32> {
        let rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), self.spin);
        Translation3::from(self.offset).to_homogeneous() * rotation.to_homogeneous()
    }

    /// Returns the current result, recomputing it if needed.
    pub fn result(&mut self) -> Result<&Mesh, CsgError> {
        if self.dirty {
            let tool = Solid::new(&self.tool).with_transform(self.tool_transform());
            self.result = self.csg.apply(self.op, &Solid::new(&self.base), &tool)?;
            self.dirty = false;
            debug!(
                op = %self.op,
                triangles = self.result.triangle_count(),
                "Scene recomputed"
            );
        }
        Ok(&self.result)
    }
}

/// Simple orbit camera for 3D scene navigation.
pub struct OrbitCamera {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub target: Vec3,
    /// Multiplier for scroll wheel zoom
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitCamera {
    pub fn new(distance: f32, yaw: f32, pitch: f32) -> Self {
        Self {
            distance,
            yaw,
            pitch,
            target: Vec3::ZERO,
            zoom_speed: 0.5,
            min_distance: 2.0,
            max_distance: 30.0,
        }
    }

    /// Updates camera state from mouse drag, scroll and arrow keys.
    pub fn update(&mut self) {
        if is_mouse_button_down(MouseButton::Left) {
            let delta = mouse_delta_position();
            self.yaw -= delta.x * 2.0;
            self.pitch -= delta.y * 2.0;
        }

        let scroll = mouse_wheel().1;
        self.distance = (self.distance - scroll * self.zoom_speed)
            .clamp(self.min_distance, self.max_distance);

        if is_key_down(KeyCode::Left) {
            self.yaw += 0.02;
        }
        if is_key_down(KeyCode::Right) {
            self.yaw -= 0.02;
        }
        if is_key_down(KeyCode::Up) {
            self.pitch += 0.02;
        }
        if is_key_down(KeyCode::Down) {
            self.pitch -= 0.02;
        }

        // Stay off the poles
        self.pitch = self.pitch.clamp(-1.5, 1.5);
    }

    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + vec3(x, y, z)
    }

    /// Direction from the target towards the eye, used as a headlight.
    pub fn view_direction(&self) -> Vector3<f32> {
        let d = self.position() - self.target;
        Vector3::new(d.x, d.y, d.z)
    }

    pub fn to_camera3d(&self) -> Camera3D {
        Camera3D {
            position: self.position(),
            up: vec3(0.0, 1.0, 0.0),
            target: self.target,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operands_have_distinct_colors() {
        assert_ne!(submesh_color(0), submesh_color(1));
    }

    #[test]
    fn shading_never_goes_black() {
        let back = shade(WHITE, &Vector3::z(), &-Vector3::z());
        assert!(back.r > 0.3);
        let front = shade(WHITE, &Vector3::z(), &Vector3::z());
        assert!((front.r - 1.0).abs() < 1e-6);
    }

    #[test]
    fn scene_recomputes_on_change() {
        let mut scene = Scene::new(Csg::default());
        let subtracted = scene.result().expect("cubes are valid").volume();

        scene.set_op(BooleanOp::Union);
        let united = scene.result().expect("cubes are valid").volume();
        assert!(united > subtracted);

        scene.set_placement(Vector3::new(10.0, 0.0, 0.0), 0.0);
        scene.set_op(BooleanOp::Intersect);
        assert!(scene.result().expect("cubes are valid").is_empty());
    }

    #[test]
    fn camera_orbits_target() {
        let camera = OrbitCamera::new(5.0, 0.0, 0.0);
        assert!((camera.position() - vec3(0.0, 0.0, 5.0)).length() < 1e-5);
        assert!((camera.view_direction() - Vector3::new(0.0, 0.0, 5.0)).norm() < 1e-5);
    }
}
