use bsp_csg::{BooleanOp, Csg, CsgConfig};
use csg_viz::{OrbitCamera, Scene, draw_csg_mesh, draw_csg_wireframe};
use macroquad::prelude::*;
use nalgebra::Vector3;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[macroquad::main("BSP CSG")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut camera = OrbitCamera::new(7.0, 0.6, 0.5);
    let mut scene = Scene::new(Csg::new(CsgConfig::default()));
    let mut animate = false;
    let mut wireframe = false;
    let mut time = 0.0f32;

    loop {
        camera.update();

        if is_key_pressed(KeyCode::Key1) {
            scene.set_op(BooleanOp::Union);
        }
        if is_key_pressed(KeyCode::Key2) {
            scene.set_op(BooleanOp::Subtract);
        }
        if is_key_pressed(KeyCode::Key3) {
            scene.set_op(BooleanOp::Intersect);
        }
        if is_key_pressed(KeyCode::Space) {
            animate = !animate;
        }
        if is_key_pressed(KeyCode::W) {
            wireframe = !wireframe;
        }

        if animate {
            time += get_frame_time();
            let offset = Vector3::new(time.cos(), 0.4 * (time * 0.7).sin(), time.sin()) * 0.8;
            scene.set_placement(offset, time * 0.5);
        }

        clear_background(Color::from_rgba(25, 25, 30, 255));
        set_camera(&camera.to_camera3d());

        let light = camera.view_direction();
        let stats = match scene.result() {
            Ok(mesh) => {
                draw_csg_mesh(mesh, &light);
                if wireframe {
                    draw_csg_wireframe(mesh, Color::from_rgba(0, 0, 0, 160));
                }
                format!(
                    "{} triangles, {} vertices",
                    mesh.triangle_count(),
                    mesh.vertex_count()
                )
            }
            Err(e) => {
                error!(error = %e, "CSG failed");
                e.to_string()
            }
        };

        set_default_camera();
        draw_text(&format!("Operation: {}", scene.op), 20.0, 30.0, 26.0, WHITE);
        draw_text(&stats, 20.0, 55.0, 20.0, LIGHTGRAY);
        draw_text(
            "1/2/3: union/subtract/intersect  Space: animate  W: wireframe",
            20.0,
            screen_height() - 20.0,
            18.0,
            GRAY,
        );

        next_frame().await
    }
}
