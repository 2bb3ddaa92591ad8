//! Core engine implementation

use std::rc::Rc;

use thiserror::Error;

use crate::{
    application::{AppError, Application},
    config::{ConfigError, EngineConfig},
    foundation::time::{FixedTimestep, Timer},
    graphics::{shader_handler, SharedBackend},
    platform::Platform,
    resources::{io, ResourceCache, ResourceError},
    scene::SceneManager,
};

/// Main engine struct
///
/// The engine owns the resource cache, the scene manager and the shared
/// graphics backend, and drives the fixed-timestep main loop.
pub struct Engine {
    /// Resource cache rooted at the configured data path
    pub resources: ResourceCache,

    /// Scene manager holding the world and the active scene
    pub scenes: SceneManager,

    /// Engine configuration
    config: EngineConfig,

    /// Graphics backend shared with shaders and meshes
    backend: SharedBackend,

    /// Frame timing
    timer: Timer,

    /// Simulation step accumulator
    step: FixedTimestep,

    /// Whether the engine should continue running
    running: bool,
}

impl Engine {
    /// Create a new engine instance
    ///
    /// Registers the built-in `"shader"` and `"text"` resource types.
    pub fn new(config: EngineConfig, backend: SharedBackend) -> Result<Self, EngineError> {
        log::info!("Initializing engine for '{}'...", config.name);

        let data_root = config.resolved_data_path();
        log::debug!("Resource data root: {}", data_root.display());

        let mut resources = ResourceCache::new(data_root);
        resources.register_type_handler("shader", shader_handler(Rc::clone(&backend)))?;
        resources.register_type_handler("text", io::text_handler())?;

        let step = FixedTimestep::from_frequency(config.update_frequency_hz);

        Ok(Self {
            resources,
            scenes: SceneManager::new(),
            config,
            backend,
            timer: Timer::new(),
            step,
            running: true,
        })
    }

    /// Run the engine main loop with the given application
    ///
    /// Each frame feeds the platform clock into the step accumulator, runs
    /// every due fixed step (`app.update` then the active scene), renders
    /// once, presents and polls events. The loop ends when the platform asks
    /// to close or [`Engine::quit`] was called.
    ///
    /// Teardown (`app.cleanup`, then the resource cache) runs even when
    /// initialization or the loop failed; the first error is returned.
    pub fn run<A, P>(
        config: EngineConfig,
        backend: SharedBackend,
        platform: &mut P,
        app: &mut A,
    ) -> Result<(), EngineError>
    where
        A: Application + ?Sized,
        P: Platform + ?Sized,
    {
        let mut engine = Self::new(config, backend)?;

        let result = engine.main_loop(platform, app);
        if let Err(e) = &result {
            log::error!("Main loop failed: {}", e);
        }

        let teardown = engine.shutdown(app);
        result.and(teardown)
    }

    fn main_loop<A, P>(&mut self, platform: &mut P, app: &mut A) -> Result<(), EngineError>
    where
        A: Application + ?Sized,
        P: Platform + ?Sized,
    {
        app.initialize(self)
            .map_err(|e| EngineError::application("initialize", e))?;

        #[allow(clippy::cast_possible_truncation)]
        let delta_time = self.step.step() as f32;

        log::info!("Starting main loop...");

        while self.running && !platform.should_close() {
            let frame_time = self.timer.tick(platform.time());
            self.step.accumulate(frame_time);

            while self.step.consume_step() {
                app.update(self, delta_time)
                    .map_err(|e| EngineError::application("update", e))?;
                self.scenes.update(delta_time);
            }

            app.render(self)
                .map_err(|e| EngineError::application("render", e))?;

            platform.present();
            platform.poll_events();
        }

        log::info!(
            "Main loop finished after {} frames, {} ticks",
            self.timer.frame_count(),
            self.step.ticks()
        );
        Ok(())
    }

    fn shutdown<A>(&mut self, app: &mut A) -> Result<(), EngineError>
    where
        A: Application + ?Sized,
    {
        log::info!("Shutting down...");
        app.cleanup(self);
        self.resources.cleanup()?;
        log::info!("Engine shutdown complete");
        Ok(())
    }

    /// Request engine shutdown at the end of the current frame
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the main loop will run another frame
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Engine configuration
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared graphics backend
    pub fn backend(&self) -> SharedBackend {
        Rc::clone(&self.backend)
    }

    /// Frame timer
    pub const fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Length of one simulation step in seconds
    pub const fn target_delta_time(&self) -> f64 {
        self.step.step()
    }

    /// Total simulated time in seconds
    pub const fn elapsed_time(&self) -> f64 {
        self.step.elapsed()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("resources", &self.resources)
            .field("scenes", &self.scenes)
            .field("config", &self.config)
            .field("step", &self.step)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Resource system error
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Application callback error
    #[error("Application error during {phase}: {source}")]
    Application {
        /// Lifecycle phase that failed
        phase: &'static str,
        /// Error returned by the application
        #[source]
        source: Box<AppError>,
    },
}

impl EngineError {
    fn application(phase: &'static str, source: AppError) -> Self {
        Self::Application {
            phase,
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::graphics::{make_quad, HeadlessBackend, Mesh, Shader};
    use crate::platform::HeadlessPlatform;
    use crate::scene::{Component, ComponentContext};

    /// Counts lifecycle calls and fails on request
    #[derive(Default)]
    struct Recorder {
        initialized: bool,
        updates: Vec<f32>,
        renders: usize,
        cleanups: usize,
        fail_update_at: Option<usize>,
    }

    impl Application for Recorder {
        fn initialize(&mut self, _engine: &mut Engine) -> Result<(), AppError> {
            self.initialized = true;
            Ok(())
        }

        fn update(&mut self, _engine: &mut Engine, delta_time: f32) -> Result<(), AppError> {
            if self.fail_update_at == Some(self.updates.len()) {
                return Err(AppError::Custom("boom".to_string()));
            }
            self.updates.push(delta_time);
            Ok(())
        }

        fn render(&mut self, _engine: &mut Engine) -> Result<(), AppError> {
            self.renders += 1;
            Ok(())
        }

        fn cleanup(&mut self, _engine: &mut Engine) {
            self.cleanups += 1;
        }
    }

    fn config(frequency: f64) -> EngineConfig {
        EngineConfig {
            data_path: Some(PathBuf::from("unused_data")),
            update_frequency_hz: frequency,
            ..EngineConfig::named("test")
        }
    }

    #[test]
    fn test_new_registers_builtin_types() {
        let engine = Engine::new(config(60.0), HeadlessBackend::shared()).unwrap();
        assert!(engine.resources.has_type_handler("shader"));
        assert!(engine.resources.has_type_handler("text"));
        assert_eq!(engine.resources.data_root(), Path::new("unused_data"));
    }

    #[test]
    fn test_fixed_step_loop() {
        // 0.25 s frames at 4 Hz: the first frame only sets the clock baseline
        let mut platform = HeadlessPlatform::new(0.25, 5);
        let mut app = Recorder::default();

        Engine::run(config(4.0), HeadlessBackend::shared(), &mut platform, &mut app).unwrap();

        assert!(app.initialized);
        assert_eq!(app.updates, vec![0.25; 4]);
        assert_eq!(app.renders, 5);
        assert_eq!(app.cleanups, 1);
        assert_eq!(platform.presented(), 5);
        assert_eq!(platform.polls(), 5);
    }

    #[test]
    fn test_long_frame_runs_several_steps() {
        let mut platform = HeadlessPlatform::new(0.5, 2);
        let mut app = Recorder::default();

        Engine::run(config(4.0), HeadlessBackend::shared(), &mut platform, &mut app).unwrap();

        assert_eq!(app.updates.len(), 2);
        assert_eq!(app.renders, 2);
    }

    #[test]
    fn test_teardown_runs_after_failure() {
        let mut platform = HeadlessPlatform::new(0.25, 10);
        let mut app = Recorder {
            fail_update_at: Some(2),
            ..Recorder::default()
        };

        let result = Engine::run(config(4.0), HeadlessBackend::shared(), &mut platform, &mut app);

        assert!(matches!(
            result,
            Err(EngineError::Application { phase: "update", .. })
        ));
        assert_eq!(app.updates.len(), 2);
        assert_eq!(app.cleanups, 1);
    }

    struct Quitter;

    impl Application for Quitter {
        fn initialize(&mut self, _engine: &mut Engine) -> Result<(), AppError> {
            Ok(())
        }

        fn render(&mut self, engine: &mut Engine) -> Result<(), AppError> {
            engine.quit();
            Ok(())
        }
    }

    #[test]
    fn test_quit_stops_after_current_frame() {
        let mut platform = HeadlessPlatform::new(0.25, 100);
        Engine::run(config(4.0), HeadlessBackend::shared(), &mut platform, &mut Quitter).unwrap();
        assert_eq!(platform.presented(), 1);
    }

    #[derive(Default)]
    struct Counter(usize);

    impl Component for Counter {
        fn update(&mut self, _ctx: &mut ComponentContext<'_>, _dt: f32) {
            self.0 += 1;
        }
    }

    /// Builds one scene and keeps a quad and shader alive until cleanup
    struct SceneApp {
        root: Option<crate::scene::EntityId>,
        ticks_seen: usize,
        quad: Option<Mesh>,
        shader: Option<Rc<Shader>>,
    }

    impl Application for SceneApp {
        fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
            let world = engine.scenes.world_mut();
            let scene = world.create_scene("main");
            let root = world.create_entity();
            world.spawn_component(root, Counter::default())?;
            world.add_entity(scene, root)?;
            engine.scenes.set_scene(scene);
            self.root = Some(root);

            self.quad = Some(make_quad(engine.backend(), 1.0)?);
            self.shader = Some(engine.resources.load("shader", "main.shader", "level")?);
            Ok(())
        }

        fn render(&mut self, engine: &mut Engine) -> Result<(), AppError> {
            engine.backend().borrow_mut().clear([0.0, 0.0, 0.0, 1.0]);
            if let (Some(shader), Some(quad)) = (&self.shader, &self.quad) {
                shader.bind()?;
                quad.render(None)?;
            }
            Ok(())
        }

        fn cleanup(&mut self, engine: &mut Engine) {
            if let Some(root) = self.root {
                self.ticks_seen = engine
                    .scenes
                    .world()
                    .get_component::<Counter>(root)
                    .map_or(0, |c| c.0);
            }
            self.quad = None;
            self.shader = None;
        }
    }

    #[test]
    fn test_scene_updates_and_resources_are_released() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.shader"), "### vertex\nV\n### fragment\nF\n").unwrap();

        let backend = HeadlessBackend::shared();
        let config = EngineConfig {
            data_path: Some(dir.path().to_path_buf()),
            update_frequency_hz: 4.0,
            ..EngineConfig::named("scene")
        };
        let mut platform = HeadlessPlatform::new(0.25, 4);
        let mut app = SceneApp {
            root: None,
            ticks_seen: 0,
            quad: None,
            shader: None,
        };

        Engine::run(config, backend.clone(), &mut platform, &mut app).unwrap();

        assert_eq!(app.ticks_seen, 3);
        let backend = backend.borrow();
        assert_eq!(backend.clears(), 4);
        assert_eq!(backend.draw_calls().len(), 4);
        assert_eq!(backend.live_meshes(), 0);
        assert_eq!(backend.live_programs(), 0);
    }
}
