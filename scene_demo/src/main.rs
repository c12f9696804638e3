//! Scene Graph Demo
//!
//! Headless walk through one scene graph frame loop:
//! - A ring of rocks spinning around a ship
//! - Lights and alpha states resolved down the tree
//! - Frustum culling into a logging renderer
//! - Picking along the view ray and ship/rock collision checks
//! - Saving the ring to RON and loading it back
//!
//! Pass a `.toml` or `.ron` scene config path as the first argument to
//! override the defaults.

use rust_scene::foundation::logging;
use rust_scene::prelude::*;
use rust_scene::scene::{AlphaState, Light, LightState};

// Ring layout
const NUM_ROCKS: usize = 12;
const RING_RADIUS: f32 = 8.0;
const RING_SPIN: f32 = 0.5; // radians per second

// Simulation
const FRAMES: usize = 5;
const FRAME_TIME: f32 = 1.0 / 60.0;

/// Writes every draw call to the log and keeps simple counts
#[derive(Default)]
struct LogRenderer {
    draws: usize,
    bounds: usize,
    ortho_passes: usize,
}

impl Renderer for LogRenderer {
    fn draw(&mut self, item: &DrawItem) {
        self.draws += 1;
        log::trace!(
            "draw {:<10} at {:?} ({} batch(es))",
            item.name,
            item.world.translation,
            item.batch_count
        );
    }

    fn draw_bounds(&mut self, key: SpatialKey, bound: &BoundingVolume) {
        self.bounds += 1;
        log::trace!("bound {key:?}: {} of volume {:.2}", bound.kind_name(), bound.volume());
    }

    fn set_ortho(&mut self) {
        self.ortho_passes += 1;
    }
}

/// Unit octahedron used for every rock and the ship
fn octahedron() -> SceneResult<GeometryBatch> {
    let vertices = vec![
        Vec3::x(),
        -Vec3::x(),
        Vec3::y(),
        -Vec3::y(),
        Vec3::z(),
        -Vec3::z(),
    ];
    let indices = vec![
        0, 2, 4, 2, 1, 4, 1, 3, 4, 3, 0, 4, //
        2, 0, 5, 1, 2, 5, 3, 1, 5, 0, 3, 5,
    ];
    GeometryBatch::from_indexed(vertices, indices)
}

fn load_config() -> SceneConfig {
    let Some(path) = std::env::args().nth(1) else {
        return SceneConfig::default();
    };
    match SceneConfig::load_from_file(&path) {
        Ok(config) => {
            log::info!("Loaded scene config from {path}");
            config
        }
        Err(e) => {
            log::warn!("Falling back to default scene config: {e}");
            SceneConfig::default()
        }
    }
}

struct DemoScene {
    graph: SceneGraph,
    root: SpatialKey,
    ship: SpatialKey,
    ring: SpatialKey,
}

impl DemoScene {
    fn build(config: SceneConfig) -> SceneResult<Self> {
        let mut graph = SceneGraph::with_config(config);
        let root = graph.create_node("field");

        let ship = graph.create_geometry("ship", Geometry::from_batch(octahedron()?));
        graph.attach_child(root, ship)?;
        graph.spatial_mut(ship)?.set_local_uniform_scale(1.5);

        let ring = graph.create_node("ring");
        graph.attach_child(root, ring)?;
        graph.spatial_mut(ring)?.add_controller(SpinController::new(Vec3::y(), RING_SPIN));

        for i in 0..NUM_ROCKS {
            #[allow(clippy::cast_precision_loss)]
            let angle = i as f32 / NUM_ROCKS as f32 * std::f32::consts::TAU;
            let rock = graph.create_geometry(format!("rock_{i:02}"), Geometry::from_batch(octahedron()?));
            graph.attach_child(ring, rock)?;
            let spatial = graph.spatial_mut(rock)?;
            spatial.set_local_translation(Vec3::new(angle.cos(), 0.0, angle.sin()) * RING_RADIUS);
            spatial.render_queue_mode = if i % 3 == 0 {
                RenderQueueMode::Transparent
            } else {
                RenderQueueMode::Opaque
            };
        }

        let hud = graph.create_geometry("hud", Geometry::from_batch(octahedron()?));
        graph.attach_child(root, hud)?;
        let spatial = graph.spatial_mut(hud)?;
        spatial.render_queue_mode = RenderQueueMode::Ortho;
        spatial.cull_mode = CullMode::Never;
        spatial.z_order = 1;

        graph.set_model_bound(root, BoundingVolume::sphere());
        graph.update_model_bound(root);

        graph.spatial_mut(root)?.set_render_state(RenderState::new(StateData::Light(LightState {
            lights: vec![
                Light::directional("sun", -Vec3::y(), Vec3::repeat(1.0)),
                Light::point("beacon", Vec3::new(0.0, 4.0, 0.0), Vec3::new(1.0, 0.6, 0.2)),
            ],
            two_sided: false,
        })));
        graph.spatial_mut(ring)?.set_render_state(RenderState::new(StateData::Alpha(AlphaState {
            blend: true,
            test_threshold: None,
        })));

        Ok(Self { graph, root, ship, ring })
    }

    fn run(&mut self, ctx: &RenderContext, camera: &mut Camera) -> SceneResult<()> {
        self.graph.update_geometric_state(self.root, 0.0, true)?;
        self.graph.update_render_state(self.root, ctx)?;

        for frame in 0..FRAMES {
            self.graph.update_geometric_state(self.root, FRAME_TIME, true)?;

            let mut renderer = LogRenderer::default();
            self.graph.draw(self.root, camera, ctx, &mut renderer)?;
            log::info!(
                "Frame {frame}: {} draws, {} bounds, {} ortho pass(es)",
                renderer.draws,
                renderer.bounds,
                renderer.ortho_passes
            );
        }
        Ok(())
    }

    fn report_queries(&self, camera: &Camera) {
        let mut picks = PickResults::new();
        let ray = Ray::new(camera.location, -camera.location);
        self.graph.find_pick(self.root, &ray, &mut picks);
        match picks.closest().and_then(|pick| Some((self.graph.get(pick.spatial)?, pick.distance))) {
            Some((spatial, distance)) => log::info!("View ray hits {} at {distance:.2}", spatial.name()),
            None => log::info!("View ray hits nothing"),
        }

        let mut collisions = CollisionResults::new();
        self.graph.find_collisions(self.ship, self.ring, &mut collisions);
        log::info!("Ship touches {} rock(s)", collisions.len());
    }

    fn round_trip_ring(&mut self) -> SceneResult<()> {
        let saved = self.graph.export_subtree(self.ring)?;
        let text = saved.to_ron()?;
        log::info!("Ring saved as {} bytes of RON", text.len());

        let copy = self.graph.import_subtree(&Capsule::from_ron(&text)?)?;
        self.graph.update_geometric_state(copy, 0.0, true)?;
        log::info!(
            "Loaded copy '{}' with {} rocks",
            self.graph.spatial(copy)?.name(),
            self.graph.child_count(copy)
        );
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_level(log::LevelFilter::Info);

    println!("=== Scene Graph Demo ===");
    println!("Set RUST_LOG=trace to see individual draw calls");
    println!();

    let mut scene = DemoScene::build(load_config())?;
    let ctx = RenderContext::new();
    let mut camera = Camera::perspective(Vec3::new(0.0, 6.0, 24.0), Vec3::zeros(), Vec3::y(), 60.0, 16.0 / 9.0, 0.1, 100.0)
        .ok_or("camera setup is degenerate")?;

    scene.run(&ctx, &mut camera)?;
    scene.report_queries(&camera);
    scene.round_trip_ring()?;
    Ok(())
}
