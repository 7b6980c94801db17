use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SceneResult;

/// Default number of simulated steps.
pub const DEFAULT_STEPS: u32 = 100;
/// Default simulated seconds per step.
pub const DEFAULT_DT: f64 = 0.01;
/// Default gravity vector.
pub const DEFAULT_GRAVITY: [f64; 3] = [0.0, 0.0, -9.8];
/// Default camera position.
pub const DEFAULT_CAMERA_XYZ: [f64; 3] = [0.8317, -0.9817, 0.8];
/// Default camera heading, pitch and roll in degrees.
pub const DEFAULT_CAMERA_HPR: [f64; 3] = [121.0, -27.5, 0.0];
/// Default visualization window size.
pub const DEFAULT_WINDOW_SIZE: (u32, u32) = (750, 500);

/// How many steps the simulator runs before terminating itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepLimit {
    Bounded(u32),
    /// Run until the window is closed. Only legal in windowed mode; the
    /// process never terminates on its own and produces no telemetry.
    Forever,
}

impl StepLimit {
    /// Wire form: the bounded count, or -1 for an unbounded run.
    pub fn as_wire(self) -> i64 {
        match self {
            StepLimit::Bounded(steps) => i64::from(steps),
            StepLimit::Forever => -1,
        }
    }

    pub fn bounded(self) -> Option<u32> {
        match self {
            StepLimit::Bounded(steps) => Some(steps),
            StepLimit::Forever => None,
        }
    }
}

/// Camera placement: position plus heading/pitch/roll in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub xyz: [f64; 3],
    pub hpr: [f64; 3],
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            xyz: DEFAULT_CAMERA_XYZ,
            hpr: DEFAULT_CAMERA_HPR,
        }
    }
}

/// Process-level configuration for one scene session.
///
/// Passed explicitly to [`Scene::new`](crate::Scene::new); there is no
/// module-level default state. All values are serialized into the command
/// stream as `Parameter` commands when the scene is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Path to the simulator executable to spawn.
    pub executable: PathBuf,
    /// Number of simulated steps, or [`StepLimit::Forever`].
    pub steps: StepLimit,
    /// Simulated seconds per step.
    pub dt: f64,
    /// Gravity vector applied to the world.
    pub gravity: [f64; 3],
    /// Initial camera placement.
    pub camera: CameraPose,
    /// Visualization window size; irrelevant when headless.
    pub window_size: (u32, u32),
    /// Run without graphics.
    pub headless: bool,
    /// Start the simulation paused.
    pub paused: bool,
    /// Draw body textures.
    pub use_textures: bool,
    /// Draw shadows.
    pub draw_shadows: bool,
    /// Start with joints drawn on screen.
    pub draw_joints: bool,
    /// Capture frames to disk while running.
    pub capture: bool,
}

impl SimulatorConfig {
    /// Create a config targeting a specific simulator executable.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            steps: StepLimit::Bounded(DEFAULT_STEPS),
            dt: DEFAULT_DT,
            gravity: DEFAULT_GRAVITY,
            camera: CameraPose::default(),
            window_size: DEFAULT_WINDOW_SIZE,
            headless: false,
            paused: false,
            use_textures: true,
            draw_shadows: true,
            draw_joints: false,
            capture: false,
        }
    }

    /// Set a bounded step count.
    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = StepLimit::Bounded(steps);
        self
    }

    /// Run until the window is closed instead of for a fixed step count.
    pub fn run_forever(mut self) -> Self {
        self.steps = StepLimit::Forever;
        self
    }

    /// Set the simulated seconds per step.
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Set the gravity vector.
    pub fn with_gravity(mut self, gravity: [f64; 3]) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the initial camera placement.
    pub fn with_camera(mut self, camera: CameraPose) -> Self {
        self.camera = camera;
        self
    }

    /// Set the visualization window size.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    /// Run without graphics.
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Start the simulation paused.
    pub fn start_paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    /// Toggle body textures.
    pub fn with_textures(mut self, use_textures: bool) -> Self {
        self.use_textures = use_textures;
        self
    }

    /// Toggle shadow drawing.
    pub fn with_shadows(mut self, draw_shadows: bool) -> Self {
        self.draw_shadows = draw_shadows;
        self
    }

    /// Start with joints drawn on screen.
    pub fn with_drawn_joints(mut self, draw_joints: bool) -> Self {
        self.draw_joints = draw_joints;
        self
    }

    /// Capture frames to disk while running.
    pub fn with_capture(mut self, capture: bool) -> Self {
        self.capture = capture;
        self
    }

    /// Persist this config as JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> SceneResult<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Load a config persisted with [`write_json`](Self::write_json).
    pub fn read_json(path: impl AsRef<Path>) -> SceneResult<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = SimulatorConfig::new("/opt/sim/simulator");
        assert_eq!(config.steps, StepLimit::Bounded(DEFAULT_STEPS));
        assert_eq!(config.dt, DEFAULT_DT);
        assert_eq!(config.gravity, DEFAULT_GRAVITY);
        assert_eq!(config.camera.xyz, DEFAULT_CAMERA_XYZ);
        assert_eq!(config.window_size, DEFAULT_WINDOW_SIZE);
        assert!(!config.headless);
        assert!(config.use_textures);
    }

    #[test]
    fn step_limit_wire_form() {
        assert_eq!(StepLimit::Bounded(250).as_wire(), 250);
        assert_eq!(StepLimit::Forever.as_wire(), -1);
    }

    #[test]
    fn config_round_trips_through_json() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.json");
        let config = SimulatorConfig::new("/opt/sim/simulator")
            .with_steps(400)
            .with_dt(0.05)
            .headless(true)
            .with_gravity([0.0, 0.0, -1.0]);
        config.write_json(&path).expect("config should serialize");
        let loaded = SimulatorConfig::read_json(&path).expect("config should load");
        assert_eq!(loaded.steps, StepLimit::Bounded(400));
        assert_eq!(loaded.dt, 0.05);
        assert!(loaded.headless);
        assert_eq!(loaded.gravity, [0.0, 0.0, -1.0]);
        assert_eq!(loaded.executable, PathBuf::from("/opt/sim/simulator"));
    }
}
