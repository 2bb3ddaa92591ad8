//! Quad demo application
//!
//! Loads a shader through the resource cache, builds a one-entity scene whose
//! component spins a quad, and drives it headless for a few seconds of
//! simulated time.

use std::path::PathBuf;
use std::rc::Rc;

use nalgebra::{Matrix4, Point3, Rotation3, Vector3};
use tusk_engine::foundation::logging::{self, LevelFilter};
use tusk_engine::graphics::make_quad;
use tusk_engine::prelude::*;

const CONFIG_PATH: &str = "quad_app.toml";
const CLEAR_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

/// Rotates at a fixed rate
struct Spinner {
    angle: f32,
    radians_per_second: f32,
}

impl Component for Spinner {
    fn start(&mut self, ctx: &mut ComponentContext<'_>) {
        log::info!("Spinner attached to {:?}", ctx.entity());
    }

    fn update(&mut self, _ctx: &mut ComponentContext<'_>, dt: f32) {
        self.angle = (self.angle + self.radians_per_second * dt) % std::f32::consts::TAU;
    }
}

#[derive(Default)]
struct QuadApp {
    spinner: Option<EntityId>,
    shader: Option<Rc<Shader>>,
    quad: Option<Mesh>,
}

impl Application for QuadApp {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        log::info!("Initializing quad demo...");

        let credits: Rc<String> = engine.resources.load("text", "credits.txt", "intro")?;
        log::info!("{}", credits.trim());
        engine.resources.clear_lifespan("intro")?;

        let world = engine.scenes.world_mut();
        let scene = world.create_scene("main");
        let root = world.create_named_entity("quad");
        world.spawn_component(
            root,
            Spinner {
                angle: 0.0,
                radians_per_second: 1.5,
            },
        )?;
        world.add_entity(scene, root)?;
        engine.scenes.set_scene(scene);
        self.spinner = Some(root);

        let shader: Rc<Shader> = engine
            .resources
            .load("shader", "shaders/main.shader", DEFAULT_LIFESPAN)?;
        shader.bind()?;

        let view = Matrix4::look_at_rh(
            &Point3::origin(),
            &Point3::new(0.0, 0.0, -1.0),
            &Vector3::y(),
        );
        shader.set_mat4("ViewMatrix", &view)?;

        let aspect = engine.config().window.aspect_ratio();
        let projection = Matrix4::new_perspective(aspect, 90f32.to_radians(), 0.01, 100.0);
        shader.set_mat4("ProjectionMatrix", &projection)?;

        self.quad = Some(make_quad(engine.backend(), 0.5)?);
        self.shader = Some(shader);
        Ok(())
    }

    fn render(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        engine.backend().borrow_mut().clear(CLEAR_COLOR);

        let (Some(shader), Some(quad)) = (&self.shader, &self.quad) else {
            return Ok(());
        };
        let angle = self
            .spinner
            .and_then(|id| engine.scenes.world().get_component::<Spinner>(id))
            .map_or(0.0, |spinner| spinner.angle);

        let model = Rotation3::from_axis_angle(&Vector3::z_axis(), angle).to_homogeneous();
        shader.set_mat4("ModelMatrix", &model)?;
        #[allow(clippy::cast_possible_truncation)]
        let time = engine.elapsed_time() as f32;
        shader.set_float("Time", time)?;
        quad.render(None)?;
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        log::info!(
            "Quad demo ran {:.2}s of simulated time ({} frames)",
            engine.elapsed_time(),
            engine.timer().frame_count()
        );
        self.quad = None;
        self.shader = None;
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_level(LevelFilter::Info);

    log::info!("Starting quad demo");

    let mut config = EngineConfig::load_or_default(CONFIG_PATH)?;
    if config.name == EngineConfig::default().name {
        config.name = "Quad".to_string();
    }
    if config.data_path.is_none() {
        config.data_path = Some(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("quad_data"));
    }

    let backend = HeadlessBackend::shared();
    let mut platform = HeadlessPlatform::new(1.0 / 60.0, 300);
    let mut app = QuadApp::default();

    Engine::run(config, backend.clone(), &mut platform, &mut app)?;

    let backend = backend.borrow();
    log::info!(
        "Quad demo finished: {} frames presented, {} draw calls",
        platform.presented(),
        backend.draw_calls().len()
    );
    Ok(())
}
