//! Client library for describing rigid-body scenes and driving an external
//! physics simulator through a line-oriented pipe protocol.
//!
//! A [`Scene`] accumulates typed commands while you describe bodies, joints,
//! actuators, sensors and a neural controller; nothing touches the simulator
//! process until [`Scene::run`], which spawns the executable, streams the
//! commands over stdin, drains its output without risking pipe deadlock, and
//! decodes the telemetry into per-sensor time series.
//!
//! Typical usage:
//! ```no_run
//! use scene_pipe::{Axis, BoxSpec, JointRange, Scene, SimulatorConfig};
//!
//! let config = SimulatorConfig::new("/path/to/simulator")
//!     .with_steps(500)
//!     .headless(true);
//! let mut scene = Scene::new(config).expect("config should validate");
//!
//! let torso = scene.send_box(BoxSpec::default().with_position([0.0, 0.0, 1.0]))?;
//! let _hinge = scene.send_hinge_joint(
//!     torso,
//!     scene_pipe::Handle::WORLD,
//!     [0.0, 0.0, 1.0],
//!     [0.0, 1.0, 0.0],
//!     JointRange::Symmetric(0.7),
//! )?;
//! let height = scene.send_position_sensor(torso, Axis::Z)?;
//!
//! let report = scene.run()?;
//! if let Some(series) = report.sensor_data(height) {
//!     println!("final height: {:?}", series.values().last());
//! }
//! # Ok::<(), scene_pipe::SceneError>(())
//! ```

pub mod collision;
pub mod command;
pub mod config;
pub mod error;
pub mod registry;
pub mod scene;
pub mod telemetry;
pub mod transport;

pub use collision::CollisionTemplate;
pub use config::{CameraPose, SimulatorConfig, StepLimit};
pub use error::{SceneError, SceneResult};
pub use registry::{Category, Handle};
pub use scene::{
    Axis, BoxSpec, CameraTracking, ControlMode, CylinderSpec, Friction, JointRange,
    QuaternionComponent, RaySense, Scene, SimulationReport, SphereSpec,
};
pub use telemetry::{SensorSeries, Telemetry};
