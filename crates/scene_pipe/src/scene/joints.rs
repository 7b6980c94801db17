use super::{ensure_non_negative, ensure_non_zero, ensure_positive, Scene};
use crate::command::{Arg, Command};
use crate::error::{SceneError, SceneResult};
use crate::registry::{Category, Handle};

/// Travel limits for a hinge or slider joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JointRange {
    /// No stops. Encodes as the (1, -1) sentinel the simulator recognizes.
    Free,
    /// Symmetric stops at (-limit, +limit).
    Symmetric(f64),
    /// Explicit stops; `hi` must not be below `lo`.
    Limits { lo: f64, hi: f64 },
}

impl JointRange {
    fn resolve(self, parameter: &'static str) -> SceneResult<(f64, f64)> {
        match self {
            JointRange::Free => Ok((1.0, -1.0)),
            JointRange::Symmetric(limit) => {
                ensure_non_negative(parameter, limit)?;
                Ok((-limit, limit))
            }
            JointRange::Limits { lo, hi } => {
                if hi < lo {
                    return Err(SceneError::invalid(
                        parameter,
                        format!("upper bound {hi} is below lower bound {lo}"),
                    ));
                }
                Ok((lo, hi))
            }
        }
    }
}

impl Scene {
    /// Describe a hinge joint rotating `body1` against `body2` about `axis`.
    ///
    /// Either side may be [`Handle::WORLD`] to hinge against a fixed point,
    /// but not both.
    pub fn send_hinge_joint(
        &mut self,
        body1: Handle,
        body2: Handle,
        anchor: [f64; 3],
        axis: [f64; 3],
        range: JointRange,
    ) -> SceneResult<Handle> {
        self.validate_joint_bodies(body1, body2)?;
        ensure_non_zero("axis", axis)?;
        let (lo, hi) = range.resolve("joint_range")?;
        let command = Command::new("Entity")
            .arg(Arg::text("HingeJoint"))
            .arg(Arg::int(i64::from(body1.raw())))
            .arg(Arg::int(i64::from(body2.raw())))
            .arg(Arg::vec3(anchor))
            .arg(Arg::vec3(axis))
            .arg(Arg::pair((lo, hi)));
        Ok(self.register_and_send(Category::Joint, command))
    }

    /// Describe a slider joint moving the bodies linearly along `axis`.
    ///
    /// Slider travel must be bounded; [`JointRange::Free`] is rejected.
    pub fn send_slider_joint(
        &mut self,
        body1: Handle,
        body2: Handle,
        axis: [f64; 3],
        range: JointRange,
    ) -> SceneResult<Handle> {
        self.validate_joint_bodies(body1, body2)?;
        ensure_non_zero("axis", axis)?;
        if range == JointRange::Free {
            return Err(SceneError::invalid(
                "joint_range",
                "slider joints cannot have unbounded travel",
            ));
        }
        let (lo, hi) = range.resolve("joint_range")?;
        let command = Command::new("Entity")
            .arg(Arg::text("SliderJoint"))
            .arg(Arg::int(i64::from(body1.raw())))
            .arg(Arg::int(i64::from(body2.raw())))
            .arg(Arg::vec3(axis))
            .arg(Arg::pair((lo, hi)));
        Ok(self.register_and_send(Category::Joint, command))
    }

    /// Describe a ball-and-socket joint anchored at `anchor`.
    pub fn send_ball_and_socket_joint(
        &mut self,
        body1: Handle,
        body2: Handle,
        anchor: [f64; 3],
    ) -> SceneResult<Handle> {
        self.validate_joint_bodies(body1, body2)?;
        let command = Command::new("Entity")
            .arg(Arg::text("BallAndSocketJoint"))
            .arg(Arg::int(i64::from(body1.raw())))
            .arg(Arg::int(i64::from(body2.raw())))
            .arg(Arg::vec3(anchor));
        Ok(self.register_and_send(Category::Joint, command))
    }

    /// Describe a universal joint rotating about two axes.
    pub fn send_universal_joint(
        &mut self,
        body1: Handle,
        body2: Handle,
        anchor: [f64; 3],
        axis1: [f64; 3],
        axis2: [f64; 3],
    ) -> SceneResult<Handle> {
        self.validate_joint_bodies(body1, body2)?;
        ensure_non_zero("axis1", axis1)?;
        ensure_non_zero("axis2", axis2)?;
        let command = Command::new("Entity")
            .arg(Arg::text("UniversalJoint"))
            .arg(Arg::int(i64::from(body1.raw())))
            .arg(Arg::int(i64::from(body2.raw())))
            .arg(Arg::vec3(anchor))
            .arg(Arg::vec3(axis1))
            .arg(Arg::vec3(axis2));
        Ok(self.register_and_send(Category::Joint, command))
    }

    /// Spring maintaining a resting distance between two point masses.
    pub fn send_point_mass_spring_joint(
        &mut self,
        body1: Handle,
        body2: Handle,
        resting_length: f64,
        stiffness: f64,
        damping: f64,
    ) -> SceneResult<Handle> {
        self.validate_joint_bodies(body1, body2)?;
        ensure_positive("resting_length", resting_length)?;
        ensure_positive("stiffness", stiffness)?;
        ensure_non_negative("damping", damping)?;
        let command = Command::new("Entity")
            .arg(Arg::text("PointMassSpringJoint"))
            .arg(Arg::int(i64::from(body1.raw())))
            .arg(Arg::int(i64::from(body2.raw())))
            .arg(Arg::real(resting_length))
            .arg(Arg::real(stiffness))
            .arg(Arg::real(damping));
        Ok(self.register_and_send(Category::Joint, command))
    }

    /// Linear spring with infinite rotational stiffness.
    pub fn send_linear_spring_joint(
        &mut self,
        body1: Handle,
        body2: Handle,
        resting_length: f64,
        stiffness: f64,
        damping: f64,
    ) -> SceneResult<Handle> {
        self.validate_joint_bodies(body1, body2)?;
        ensure_positive("resting_length", resting_length)?;
        ensure_positive("stiffness", stiffness)?;
        ensure_non_negative("damping", damping)?;
        let command = Command::new("Entity")
            .arg(Arg::text("LinearSpringJoint"))
            .arg(Arg::int(i64::from(body1.raw())))
            .arg(Arg::int(i64::from(body2.raw())))
            .arg(Arg::real(resting_length))
            .arg(Arg::real(stiffness))
            .arg(Arg::real(damping));
        Ok(self.register_and_send(Category::Joint, command))
    }

    /// Rotational spring pulling two axes into alignment.
    pub fn send_hinge_spring_joint(
        &mut self,
        body1: Handle,
        body2: Handle,
        stiffness: f64,
        axis1: [f64; 3],
        axis2: [f64; 3],
        damping: f64,
    ) -> SceneResult<Handle> {
        self.validate_joint_bodies(body1, body2)?;
        ensure_positive("stiffness", stiffness)?;
        ensure_non_zero("axis1", axis1)?;
        ensure_non_zero("axis2", axis2)?;
        ensure_non_negative("damping", damping)?;
        let command = Command::new("Entity")
            .arg(Arg::text("HingeSpringJoint"))
            .arg(Arg::int(i64::from(body1.raw())))
            .arg(Arg::int(i64::from(body2.raw())))
            .arg(Arg::real(stiffness))
            .arg(Arg::vec3(axis1))
            .arg(Arg::vec3(axis2))
            .arg(Arg::real(damping));
        Ok(self.register_and_send(Category::Joint, command))
    }

    /// Spring with both linear and rotational stiffness.
    pub fn send_universal_spring_joint(
        &mut self,
        body1: Handle,
        body2: Handle,
        resting_length: f64,
        linear_stiffness: f64,
        rotational_stiffness: f64,
    ) -> SceneResult<Handle> {
        self.validate_joint_bodies(body1, body2)?;
        ensure_positive("resting_length", resting_length)?;
        ensure_positive("linear_stiffness", linear_stiffness)?;
        ensure_positive("rotational_stiffness", rotational_stiffness)?;
        let command = Command::new("Entity")
            .arg(Arg::text("UniversalSpringJoint"))
            .arg(Arg::int(i64::from(body1.raw())))
            .arg(Arg::int(i64::from(body2.raw())))
            .arg(Arg::real(resting_length))
            .arg(Arg::real(linear_stiffness))
            .arg(Arg::real(rotational_stiffness));
        Ok(self.register_and_send(Category::Joint, command))
    }

    fn validate_joint_bodies(&self, body1: Handle, body2: Handle) -> SceneResult<()> {
        self.registry.validate("body1", body1, Category::Body)?;
        self.registry.validate("body2", body2, Category::Body)?;
        if body1.is_world() && body2.is_world() {
            return Err(SceneError::invalid("body1", "both bodies cannot be the world"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatorConfig;
    use crate::scene::BoxSpec;

    fn scene() -> Scene {
        Scene::new(SimulatorConfig::new("/opt/sim/simulator")).expect("config should validate")
    }

    #[test]
    fn hinge_against_the_world_succeeds() {
        let mut scene = scene();
        let body = scene.send_box(BoxSpec::default()).expect("box should register");
        let joint = scene
            .send_hinge_joint(
                body,
                Handle::WORLD,
                [0.0, 0.0, 0.0],
                [0.0, 0.0, 1.0],
                JointRange::Free,
            )
            .expect("world-anchored hinge should register");
        assert_eq!(joint, Handle(1));
        assert!(scene
            .command_text()
            .contains("Entity\nHingeJoint\n0\n-1\n0\n0\n0\n0\n0\n1\n1\n-1\n"));
    }

    #[test]
    fn both_world_sides_are_rejected() {
        let mut scene = scene();
        let err = scene
            .send_hinge_joint(
                Handle::WORLD,
                Handle::WORLD,
                [0.0, 0.0, 0.0],
                [0.0, 0.0, 1.0],
                JointRange::Free,
            )
            .expect_err("both-world hinge should fail");
        assert!(matches!(err, SceneError::InvalidArgument { parameter: "body1", .. }));
    }

    #[test]
    fn joint_referencing_a_non_body_is_a_category_mismatch() {
        let mut scene = scene();
        let body = scene.send_box(BoxSpec::default()).expect("box should register");
        let joint = scene
            .send_ball_and_socket_joint(body, Handle::WORLD, [0.0, 0.0, 1.0])
            .expect("joint should register");
        let err = scene
            .send_hinge_joint(body, joint, [0.0; 3], [0.0, 0.0, 1.0], JointRange::Free)
            .expect_err("joint handle in a body role should fail");
        assert!(matches!(
            err,
            SceneError::CategoryMismatch { parameter: "body2", .. }
        ));
    }

    #[test]
    fn inverted_limits_are_rejected() {
        let mut scene = scene();
        let body = scene.send_box(BoxSpec::default()).expect("box should register");
        let err = scene
            .send_hinge_joint(
                body,
                Handle::WORLD,
                [0.0; 3],
                [0.0, 0.0, 1.0],
                JointRange::Limits { lo: 0.5, hi: -0.5 },
            )
            .expect_err("inverted range should fail");
        assert!(matches!(
            err,
            SceneError::InvalidArgument { parameter: "joint_range", .. }
        ));
    }

    #[test]
    fn slider_travel_must_be_bounded() {
        let mut scene = scene();
        let body = scene.send_box(BoxSpec::default()).expect("box should register");
        let err = scene
            .send_slider_joint(body, Handle::WORLD, [0.0, 0.0, 1.0], JointRange::Free)
            .expect_err("free slider should fail");
        assert!(matches!(
            err,
            SceneError::InvalidArgument { parameter: "joint_range", .. }
        ));
    }

    #[test]
    fn symmetric_range_expands_to_signed_pair() {
        let mut scene = scene();
        let body = scene.send_box(BoxSpec::default()).expect("box should register");
        scene
            .send_slider_joint(body, Handle::WORLD, [0.0, 0.0, 1.0], JointRange::Symmetric(0.5))
            .expect("slider should register");
        assert!(scene
            .command_text()
            .contains("Entity\nSliderJoint\n0\n-1\n0\n0\n1\n-0.5\n0.5\n"));
    }
}
