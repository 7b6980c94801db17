mod actuators;
mod bodies;
mod joints;
mod network;
mod sensors;

use std::collections::BTreeMap;
use std::process::ExitStatus;

use crate::collision::{CollisionTemplate, CollisionTopology};
use crate::command::{Arg, Command, CommandBuffer, Value};
use crate::config::{SimulatorConfig, StepLimit};
use crate::error::{SceneError, SceneResult};
use crate::registry::{Category, EntityRegistry, Handle};
use crate::telemetry::{self, SensorSeries, Telemetry};
use crate::transport::{self, RunOptions};

pub use actuators::ControlMode;
pub use bodies::{BoxSpec, CylinderSpec, SphereSpec};
pub use joints::JointRange;
pub use sensors::{Axis, QuaternionComponent, RaySense};

/// How the camera relates to a tracked body during visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraTracking {
    None,
    Pan,
    Follow,
}

impl CameraTracking {
    fn as_wire(self) -> i64 {
        match self {
            CameraTracking::None => 0,
            CameraTracking::Pan => 1,
            CameraTracking::Follow => 2,
        }
    }
}

/// Surface friction model parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Friction {
    /// Encodes as -1.0 on the wire.
    Infinite,
    Finite(f64),
}

/// One scene session: describes entities, accumulates the command stream, and
/// drives a single simulator process run.
///
/// Construction never touches the process; commands only accumulate. The
/// session is single-owner and consumed by [`run`](Scene::run). Independent
/// scenes share no state and may run concurrently.
#[derive(Debug)]
pub struct Scene {
    config: SimulatorConfig,
    registry: EntityRegistry,
    topology: CollisionTopology,
    commands: CommandBuffer,
    // Sensor handle -> declared channel arity. The telemetry stream carries no
    // per-record channel count, so the decoder is driven by this table.
    sensor_channels: BTreeMap<Handle, usize>,
    current_space: String,
    current_group: String,
}

impl Scene {
    /// Create a session and seed the stream with the configuration parameters.
    ///
    /// The parameters go first so that later `Parameter` commands issued
    /// through scene methods override them.
    pub fn new(config: SimulatorConfig) -> SceneResult<Self> {
        ensure_positive("dt", config.dt)?;
        if config.steps == StepLimit::Bounded(0) {
            return Err(SceneError::invalid("steps", "bounded run needs at least one step"));
        }
        if config.window_size.0 == 0 || config.window_size.1 == 0 {
            return Err(SceneError::invalid("window_size", "window dimensions must be non-zero"));
        }

        let mut scene = Self {
            config,
            registry: EntityRegistry::new(),
            topology: CollisionTopology::new(),
            commands: CommandBuffer::new(),
            sensor_channels: BTreeMap::new(),
            current_space: "None".to_string(),
            current_group: "default".to_string(),
        };
        scene.send_config_parameters();
        Ok(scene)
    }

    fn send_config_parameters(&mut self) {
        let config = self.config.clone();
        self.send_parameter("EvalSteps", Value::Int(config.steps.as_wire()));
        self.send_parameter("DT", Value::Real(config.dt));
        self.send_parameter("DrawJoints", Value::Int(i64::from(config.draw_joints)));
        self.send_parameter("GravityX", Value::Real(config.gravity[0]));
        self.send_parameter("GravityY", Value::Real(config.gravity[1]));
        self.send_parameter("GravityZ", Value::Real(config.gravity[2]));
        self.send_parameter("CameraX", Value::Real(config.camera.xyz[0]));
        self.send_parameter("CameraY", Value::Real(config.camera.xyz[1]));
        self.send_parameter("CameraZ", Value::Real(config.camera.xyz[2]));
        self.send_parameter("CameraH", Value::Real(config.camera.hpr[0]));
        self.send_parameter("CameraP", Value::Real(config.camera.hpr[1]));
        self.send_parameter("CameraR", Value::Real(config.camera.hpr[2]));
        self.send_parameter("WindowWidth", Value::Int(i64::from(config.window_size.0)));
        self.send_parameter("WindowHeight", Value::Int(i64::from(config.window_size.1)));
        self.send_parameter("Capture", Value::Int(i64::from(config.capture)));
    }

    /// The session configuration.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Number of entities registered so far.
    pub fn num_entities(&self) -> usize {
        self.registry.len()
    }

    /// The accumulated command stream as text, for debugging.
    pub fn command_text(&self) -> &str {
        self.commands.as_str()
    }

    /// Space used when a body constructor is given no explicit space.
    pub fn set_current_space(&mut self, name: &str) -> SceneResult<()> {
        ensure_token("space", name)?;
        self.current_space = name.to_string();
        Ok(())
    }

    /// Collision group used when a body constructor is given no explicit group.
    pub fn set_current_collision_group(&mut self, name: &str) -> SceneResult<()> {
        ensure_token("collision_group", name)?;
        self.current_group = name.to_string();
        Ok(())
    }

    /// Override the gravity vector for this run.
    pub fn set_gravity(&mut self, x: f64, y: f64, z: f64) {
        self.send_parameter("GravityX", Value::Real(x));
        self.send_parameter("GravityY", Value::Real(y));
        self.send_parameter("GravityZ", Value::Real(z));
    }

    /// Place the camera and choose how it tracks `body`.
    pub fn set_camera(
        &mut self,
        xyz: [f64; 3],
        hpr: [f64; 3],
        tracking: CameraTracking,
        body: Handle,
    ) -> SceneResult<()> {
        self.registry.validate("body_to_track", body, Category::Body)?;
        self.send_parameter("CameraX", Value::Real(xyz[0]));
        self.send_parameter("CameraY", Value::Real(xyz[1]));
        self.send_parameter("CameraZ", Value::Real(xyz[2]));
        self.send_parameter("CameraH", Value::Real(hpr[0]));
        self.send_parameter("CameraP", Value::Real(hpr[1]));
        self.send_parameter("CameraR", Value::Real(hpr[2]));
        self.send_parameter("CameraTracking", Value::Int(tracking.as_wire()));
        self.send_parameter("CameraBody", Value::Int(i64::from(body.raw())));
        Ok(())
    }

    /// Set the friction model parameter.
    pub fn set_friction(&mut self, friction: Friction) -> SceneResult<()> {
        let mu = match friction {
            Friction::Infinite => -1.0,
            Friction::Finite(mu) => {
                ensure_non_negative("mu", mu)?;
                mu
            }
        };
        self.send_parameter("Friction", Value::Real(mu));
        Ok(())
    }

    /// Evaluation steps between network controller updates.
    pub fn set_network_update_interval(&mut self, steps: u32) -> SceneResult<()> {
        if steps == 0 {
            return Err(SceneError::invalid(
                "steps_between_updates",
                "must be at least 1",
            ));
        }
        self.send_parameter("NetworkUpdate", Value::Int(i64::from(steps)));
        Ok(())
    }

    /// Build the collision matrix from a template. May be called at most once.
    pub fn build_collision_matrix(&mut self, template: CollisionTemplate) -> SceneResult<()> {
        self.topology.build_matrix(template)
    }

    /// Allow members of the two named groups to collide.
    pub fn assign_collision(&mut self, group_a: &str, group_b: &str) -> SceneResult<()> {
        ensure_token("group_a", group_a)?;
        ensure_token("group_b", group_b)?;
        self.topology.assign(group_a, group_b);
        Ok(())
    }

    /// Forbid members of the two named groups from colliding.
    pub fn remove_collision(&mut self, group_a: &str, group_b: &str) -> SceneResult<()> {
        ensure_token("group_a", group_a)?;
        ensure_token("group_b", group_b)?;
        self.topology.remove(group_a, group_b);
        Ok(())
    }

    /// Run the simulation to completion and decode its telemetry.
    ///
    /// Conflicting run configurations are rejected before any process is
    /// spawned. The call blocks until the simulator exits; there is no
    /// cancellation beyond the scene's own step count.
    pub fn run(mut self) -> SceneResult<SimulationReport> {
        if self.config.headless && self.config.steps == StepLimit::Forever {
            return Err(SceneError::conflict(
                "cannot run forever in headless mode: the process would never terminate",
            ));
        }
        if self.config.headless && self.config.paused {
            return Err(SceneError::conflict(
                "cannot start paused in headless mode",
            ));
        }

        if let Some(matrix) = self.topology.finalize() {
            self.commands.append(matrix);
        }

        tracing::info!(
            commands = self.commands.len(),
            entities = self.registry.len(),
            sensors = self.sensor_channels.len(),
            "starting simulation"
        );

        let options = RunOptions {
            headless: self.config.headless,
            paused: self.config.paused,
            use_textures: self.config.use_textures,
            draw_shadows: self.config.draw_shadows,
        };
        let output = transport::run(&self.config.executable, options, self.commands.into_bytes())?;

        let diagnostics = transport::trim_banner(&output.stderr);
        let telemetry = telemetry::decode(&output.stdout, &self.sensor_channels)?;

        Ok(SimulationReport {
            telemetry,
            diagnostics,
            status: output.status,
        })
    }

    fn send_parameter(&mut self, name: &'static str, value: Value) {
        self.commands.append(
            Command::new("Parameter")
                .arg(Arg::text(name))
                .arg(Arg::Scalar(value)),
        );
    }

    /// Register a handle and append its entity command.
    fn register_and_send(&mut self, category: Category, command: Command) -> Handle {
        // Entity ids never travel on the wire; both ends count entity
        // commands in the same order.
        let handle = self.registry.register(category);
        self.commands.append(command);
        handle
    }

    /// Validate a reference in a role where the world sentinel is meaningless.
    fn require_entity(
        &self,
        parameter: &'static str,
        handle: Handle,
        expected: Category,
    ) -> SceneResult<()> {
        if handle.is_world() {
            return Err(SceneError::invalid(
                parameter,
                "the world sentinel is not valid here",
            ));
        }
        self.registry.validate(parameter, handle, expected)
    }

    fn resolve_space(&self, space: Option<&str>) -> SceneResult<String> {
        match space {
            Some(name) => {
                ensure_token("space", name)?;
                Ok(name.to_string())
            }
            None => Ok(self.current_space.clone()),
        }
    }

    fn resolve_group(&mut self, group: Option<&str>) -> SceneResult<usize> {
        let name = match group {
            Some(name) => {
                ensure_token("collision_group", name)?;
                name.to_string()
            }
            None => self.current_group.clone(),
        };
        Ok(self.topology.group_id(&name))
    }
}

/// Result of one completed simulator run. Read-only.
#[derive(Debug)]
pub struct SimulationReport {
    telemetry: Telemetry,
    diagnostics: String,
    status: ExitStatus,
}

impl SimulationReport {
    /// The decoded per-sensor time series.
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Series for one sensor handle, if the process reported it.
    pub fn sensor_data(&self, sensor: Handle) -> Option<&SensorSeries> {
        self.telemetry.get(sensor)
    }

    /// Time steps the process actually simulated.
    pub fn steps_completed(&self) -> usize {
        self.telemetry.steps()
    }

    /// The simulator's diagnostic output with the known banner trimmed.
    pub fn diagnostics(&self) -> &str {
        &self.diagnostics
    }

    pub fn exit_status(&self) -> ExitStatus {
        self.status
    }
}

pub(crate) fn ensure_positive(parameter: &'static str, value: f64) -> SceneResult<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(SceneError::invalid(
            parameter,
            format!("must be strictly positive, got {value}"),
        ))
    }
}

pub(crate) fn ensure_non_negative(parameter: &'static str, value: f64) -> SceneResult<()> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(SceneError::invalid(
            parameter,
            format!("must not be negative, got {value}"),
        ))
    }
}

pub(crate) fn ensure_non_zero(parameter: &'static str, vector: [f64; 3]) -> SceneResult<()> {
    if vector.iter().any(|&v| v != 0.0) {
        Ok(())
    } else {
        Err(SceneError::invalid(parameter, "must not be the zero vector"))
    }
}

pub(crate) fn ensure_color(parameter: &'static str, color: [f64; 3]) -> SceneResult<()> {
    if color.iter().all(|&c| (0.0..=1.0).contains(&c)) {
        Ok(())
    } else {
        Err(SceneError::invalid(
            parameter,
            format!("channels must lie in [0,1], got {color:?}"),
        ))
    }
}

pub(crate) fn ensure_fraction(parameter: &'static str, value: f64) -> SceneResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SceneError::invalid(
            parameter,
            format!("must lie in [0,1], got {value}"),
        ))
    }
}

/// Names travel as bare line tokens, so they must be single-line words.
pub(crate) fn ensure_token(parameter: &'static str, name: &str) -> SceneResult<()> {
    if name.is_empty() {
        return Err(SceneError::invalid(parameter, "must not be empty"));
    }
    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(SceneError::invalid(
            parameter,
            format!("must not contain whitespace, got {name:?}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatorConfig;

    fn scene() -> Scene {
        Scene::new(SimulatorConfig::new("/opt/sim/simulator")).expect("config should validate")
    }

    #[test]
    fn construction_seeds_config_parameters() {
        let scene = scene();
        let text = scene.command_text();
        assert!(text.starts_with("Parameter\nEvalSteps\n100\n"));
        assert!(text.contains("Parameter\nDT\n0.01\n"));
        assert!(text.contains("Parameter\nGravityZ\n-9.8\n"));
        assert!(text.contains("Parameter\nWindowWidth\n750\n"));
    }

    #[test]
    fn headless_forever_is_rejected_before_spawning() {
        let scene = Scene::new(
            SimulatorConfig::new("/nonexistent/simulator")
                .run_forever()
                .headless(true),
        )
        .expect("config should validate");
        let err = scene.run().expect_err("conflict should be detected");
        // A spawn failure here would mean the check ran too late.
        assert!(matches!(err, SceneError::ConfigurationConflict(_)));
    }

    #[test]
    fn paused_headless_is_rejected_before_spawning() {
        let scene = Scene::new(
            SimulatorConfig::new("/nonexistent/simulator")
                .headless(true)
                .start_paused(true),
        )
        .expect("config should validate");
        let err = scene.run().expect_err("conflict should be detected");
        assert!(matches!(err, SceneError::ConfigurationConflict(_)));
    }

    #[test]
    fn zero_dt_is_rejected_at_construction() {
        let err = Scene::new(SimulatorConfig::new("/opt/sim/simulator").with_dt(0.0))
            .expect_err("zero dt should fail");
        assert!(matches!(err, SceneError::InvalidArgument { parameter: "dt", .. }));
    }

    #[test]
    fn group_names_with_whitespace_are_rejected() {
        let mut scene = scene();
        let err = scene
            .assign_collision("left arm", "torso")
            .expect_err("multi-word group names cannot travel as line tokens");
        assert!(matches!(err, SceneError::InvalidArgument { .. }));
    }

    #[test]
    fn friction_infinite_encodes_as_negative_one() {
        let mut scene = scene();
        scene.set_friction(Friction::Infinite).expect("friction should send");
        assert!(scene.command_text().ends_with("Parameter\nFriction\n-1\n"));
    }
}
