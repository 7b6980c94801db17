use super::Scene;
use crate::command::{Arg, Command};
use crate::error::SceneResult;
use crate::registry::{Category, Handle};

/// Position axis tracked by a position sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn as_wire(self) -> i64 {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Which reading a ray sensor reports: the hit distance or one color channel
/// of the hit body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaySense {
    Distance,
    Red,
    Green,
    Blue,
}

impl RaySense {
    fn as_wire(self) -> i64 {
        match self {
            RaySense::Distance => 0,
            RaySense::Red => 1,
            RaySense::Green => 2,
            RaySense::Blue => 3,
        }
    }
}

/// Component of the orientation quaternion reported by a quaternion sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuaternionComponent {
    W,
    X,
    Y,
    Z,
}

impl QuaternionComponent {
    fn as_wire(self) -> i64 {
        match self {
            QuaternionComponent::W => 0,
            QuaternionComponent::X => 1,
            QuaternionComponent::Y => 2,
            QuaternionComponent::Z => 3,
        }
    }
}

impl Scene {
    /// Track one position coordinate of a body. One channel.
    pub fn send_position_sensor(&mut self, body: Handle, axis: Axis) -> SceneResult<Handle> {
        self.require_entity("body_id", body, Category::Body)?;
        let command = Command::new("Entity")
            .arg(Arg::text("PositionSensor"))
            .arg(Arg::int(i64::from(body.raw())))
            .arg(Arg::int(axis.as_wire()));
        Ok(self.register_sensor(1, command))
    }

    /// Attach a sensor to a ray entity. One channel.
    pub fn send_ray_sensor(&mut self, ray: Handle, sense: RaySense) -> SceneResult<Handle> {
        self.require_entity("ray_id", ray, Category::Body)?;
        let command = Command::new("Entity")
            .arg(Arg::text("RaySensor"))
            .arg(Arg::int(i64::from(ray.raw())))
            .arg(Arg::int(sense.as_wire()));
        Ok(self.register_sensor(1, command))
    }

    /// Report 1 while the body touches anything, 0 otherwise. One channel.
    pub fn send_touch_sensor(&mut self, body: Handle) -> SceneResult<Handle> {
        self.require_entity("body_id", body, Category::Body)?;
        let command = Command::new("Entity")
            .arg(Arg::text("TouchSensor"))
            .arg(Arg::int(i64::from(body.raw())));
        Ok(self.register_sensor(1, command))
    }

    /// Track one component of the body's orientation quaternion. One channel.
    pub fn send_quaternion_sensor(
        &mut self,
        body: Handle,
        component: QuaternionComponent,
    ) -> SceneResult<Handle> {
        self.require_entity("body_id", body, Category::Body)?;
        let command = Command::new("Entity")
            .arg(Arg::text("QuaternionSensor"))
            .arg(Arg::int(i64::from(body.raw())))
            .arg(Arg::int(component.as_wire()));
        Ok(self.register_sensor(1, command))
    }

    /// Track the body's orientation as heading, pitch and roll. Three
    /// channels, one per angle.
    pub fn send_vestibular_sensor(&mut self, body: Handle) -> SceneResult<Handle> {
        self.require_entity("body_id", body, Category::Body)?;
        let command = Command::new("Entity")
            .arg(Arg::text("VestibularSensor"))
            .arg(Arg::int(i64::from(body.raw())));
        Ok(self.register_sensor(3, command))
    }

    /// Report the joint's angle or offset each step. One channel.
    pub fn send_proprioceptive_sensor(&mut self, joint: Handle) -> SceneResult<Handle> {
        self.require_entity("joint_id", joint, Category::Joint)?;
        let command = Command::new("Entity")
            .arg(Arg::text("ProprioceptiveSensor"))
            .arg(Arg::int(i64::from(joint.raw())));
        Ok(self.register_sensor(1, command))
    }

    /// Report 1 while the body is hit by some ray sensor. One channel.
    pub fn send_is_seen_sensor(&mut self, body: Handle) -> SceneResult<Handle> {
        self.require_entity("body_id", body, Category::Body)?;
        let command = Command::new("Entity")
            .arg(Arg::text("IsSeenSensor"))
            .arg(Arg::int(i64::from(body.raw())));
        Ok(self.register_sensor(1, command))
    }

    /// Report incident light at the body. One channel.
    pub fn send_light_sensor(&mut self, body: Handle) -> SceneResult<Handle> {
        self.require_entity("body_id", body, Category::Body)?;
        let command = Command::new("Entity")
            .arg(Arg::text("LightSensor"))
            .arg(Arg::int(i64::from(body.raw())));
        Ok(self.register_sensor(1, command))
    }

    /// Declared channel arity of a registered sensor.
    pub fn sensor_channels(&self, sensor: Handle) -> Option<usize> {
        self.sensor_channels.get(&sensor).copied()
    }

    /// Register a sensor handle and record its channel arity.
    ///
    /// The arity table is what lets the telemetry decoder consume the right
    /// number of channel-records per handle later; the output stream itself
    /// never says.
    fn register_sensor(&mut self, channels: usize, command: Command) -> Handle {
        let handle = self.register_and_send(Category::Sensor, command);
        self.sensor_channels.insert(handle, channels);
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatorConfig;
    use crate::error::SceneError;
    use crate::scene::BoxSpec;

    fn scene() -> Scene {
        Scene::new(SimulatorConfig::new("/opt/sim/simulator")).expect("config should validate")
    }

    #[test]
    fn sensors_record_their_channel_arity() {
        let mut scene = scene();
        let body = scene.send_box(BoxSpec::default()).expect("box should register");
        let touch = scene.send_touch_sensor(body).expect("touch should register");
        let vestibular = scene
            .send_vestibular_sensor(body)
            .expect("vestibular should register");
        assert_eq!(scene.sensor_channels(touch), Some(1));
        assert_eq!(scene.sensor_channels(vestibular), Some(3));
        assert_eq!(scene.sensor_channels(body), None);
    }

    #[test]
    fn position_sensor_encodes_body_and_axis() {
        let mut scene = scene();
        let body = scene.send_box(BoxSpec::default()).expect("box should register");
        scene
            .send_position_sensor(body, Axis::Z)
            .expect("sensor should register");
        assert!(scene.command_text().contains("Entity\nPositionSensor\n0\n2\n"));
    }

    #[test]
    fn sensor_on_the_world_is_rejected() {
        let mut scene = scene();
        let err = scene
            .send_touch_sensor(Handle::WORLD)
            .expect_err("world has no touch sensor");
        assert!(matches!(err, SceneError::InvalidArgument { parameter: "body_id", .. }));
    }

    #[test]
    fn proprioceptive_sensor_requires_a_joint() {
        let mut scene = scene();
        let body = scene.send_box(BoxSpec::default()).expect("box should register");
        let err = scene
            .send_proprioceptive_sensor(body)
            .expect_err("body handle in a joint role should fail");
        assert!(matches!(
            err,
            SceneError::CategoryMismatch { parameter: "joint_id", .. }
        ));
    }
}
