use super::{ensure_non_zero, ensure_positive, Scene};
use crate::command::{Arg, Command};
use crate::error::{SceneError, SceneResult};
use crate::registry::{Category, Handle};

/// How a motorized joint interprets its motor-neuron input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    /// Input is a target position or angle.
    Positional,
    /// Input is a target actuation rate.
    Velocity,
}

impl ControlMode {
    fn as_wire(self) -> &'static str {
        match self {
            ControlMode::Positional => "positional",
            ControlMode::Velocity => "velocity",
        }
    }
}

impl Scene {
    /// Motorize a hinge joint.
    ///
    /// A negative `max_force` means unlimited torque.
    pub fn send_rotary_actuator(
        &mut self,
        joint: Handle,
        max_force: f64,
        speed: f64,
        control: ControlMode,
    ) -> SceneResult<Handle> {
        self.require_entity("joint_id", joint, Category::Joint)?;
        ensure_positive("speed", speed)?;
        let command = Command::new("Entity")
            .arg(Arg::text("RotaryActuator"))
            .arg(Arg::int(i64::from(joint.raw())))
            .arg(Arg::real(max_force))
            .arg(Arg::real(speed))
            .arg(Arg::text(control.as_wire()));
        Ok(self.register_and_send(Category::Actuator, command))
    }

    /// Motorize a slider joint.
    ///
    /// A negative `max_force` means unlimited force.
    pub fn send_linear_actuator(
        &mut self,
        joint: Handle,
        max_force: f64,
        speed: f64,
        control: ControlMode,
    ) -> SceneResult<Handle> {
        self.require_entity("joint_id", joint, Category::Joint)?;
        ensure_positive("speed", speed)?;
        let command = Command::new("Entity")
            .arg(Arg::text("LinearActuator"))
            .arg(Arg::int(i64::from(joint.raw())))
            .arg(Arg::real(max_force))
            .arg(Arg::real(speed))
            .arg(Arg::text(control.as_wire()));
        Ok(self.register_and_send(Category::Actuator, command))
    }

    /// Attach a thruster pushing on the body's center of mass.
    ///
    /// `force_range` maps motor-neuron output -1..+1 to applied force.
    pub fn send_thruster(
        &mut self,
        body: Handle,
        force_range: (f64, f64),
        direction: [f64; 3],
    ) -> SceneResult<Handle> {
        self.registry.validate("body_id", body, Category::Body)?;
        if force_range.1 < force_range.0 {
            return Err(SceneError::invalid(
                "force_range",
                format!(
                    "upper bound {} is below lower bound {}",
                    force_range.1, force_range.0
                ),
            ));
        }
        ensure_non_zero("direction", direction)?;
        let command = Command::new("Entity")
            .arg(Arg::text("ThrusterActuator"))
            .arg(Arg::int(i64::from(body.raw())))
            .arg(Arg::pair(force_range))
            .arg(Arg::vec3(direction));
        Ok(self.register_and_send(Category::Actuator, command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatorConfig;
    use crate::scene::{BoxSpec, JointRange};

    fn scene() -> Scene {
        Scene::new(SimulatorConfig::new("/opt/sim/simulator")).expect("config should validate")
    }

    #[test]
    fn rotary_actuator_references_a_joint() {
        let mut scene = scene();
        let body = scene.send_box(BoxSpec::default()).expect("box should register");
        let joint = scene
            .send_hinge_joint(body, Handle::WORLD, [0.0; 3], [0.0, 0.0, 1.0], JointRange::Free)
            .expect("hinge should register");
        let actuator = scene
            .send_rotary_actuator(joint, -1.0, 1.0, ControlMode::Positional)
            .expect("actuator should register");
        assert_eq!(actuator, Handle(2));
        assert!(scene
            .command_text()
            .contains("Entity\nRotaryActuator\n1\n-1\n1\npositional\n"));
    }

    #[test]
    fn actuator_on_a_body_handle_is_a_mismatch() {
        let mut scene = scene();
        let body = scene.send_box(BoxSpec::default()).expect("box should register");
        let err = scene
            .send_rotary_actuator(body, -1.0, 1.0, ControlMode::Velocity)
            .expect_err("body handle in a joint role should fail");
        assert!(matches!(
            err,
            SceneError::CategoryMismatch { parameter: "joint_id", .. }
        ));
    }

    #[test]
    fn thruster_range_must_be_ordered() {
        let mut scene = scene();
        let body = scene.send_box(BoxSpec::default()).expect("box should register");
        let err = scene
            .send_thruster(body, (10.0, 0.0), [0.0, 0.0, 1.0])
            .expect_err("inverted force range should fail");
        assert!(matches!(
            err,
            SceneError::InvalidArgument { parameter: "force_range", .. }
        ));
    }

    #[test]
    fn zero_speed_is_rejected() {
        let mut scene = scene();
        let body = scene.send_box(BoxSpec::default()).expect("box should register");
        let joint = scene
            .send_slider_joint(body, Handle::WORLD, [0.0, 0.0, 1.0], JointRange::Symmetric(0.25))
            .expect("slider should register");
        let err = scene
            .send_linear_actuator(joint, -1.0, 0.0, ControlMode::Positional)
            .expect_err("zero speed should fail");
        assert!(matches!(err, SceneError::InvalidArgument { parameter: "speed", .. }));
    }
}
