use super::{ensure_color, ensure_non_zero, ensure_positive, Scene};
use crate::command::{Arg, Command};
use crate::error::{SceneError, SceneResult};
use crate::registry::{Category, Handle};

/// Description of a box body.
#[derive(Debug, Clone)]
pub struct BoxSpec {
    /// Global position of the body's center.
    pub position: [f64; 3],
    /// Global orientation of the body.
    pub orientation: [f64; 3],
    /// Length, width and height.
    pub sides: [f64; 3],
    pub density: f64,
    /// RGB, each channel in [0,1].
    pub color: [f64; 3],
    /// Space to place the body in; defaults to the scene's current space.
    pub space: Option<String>,
    /// Collision group; defaults to the scene's current group.
    pub collision_group: Option<String>,
}

impl Default for BoxSpec {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            orientation: [0.0, 0.0, 1.0],
            sides: [0.25, 0.25, 0.25],
            density: 1.0,
            color: [1.0, 1.0, 1.0],
            space: None,
            collision_group: None,
        }
    }
}

impl BoxSpec {
    pub fn with_position(mut self, position: [f64; 3]) -> Self {
        self.position = position;
        self
    }

    pub fn with_orientation(mut self, orientation: [f64; 3]) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_sides(mut self, sides: [f64; 3]) -> Self {
        self.sides = sides;
        self
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    pub fn with_color(mut self, color: [f64; 3]) -> Self {
        self.color = color;
        self
    }

    pub fn in_space(mut self, space: impl Into<String>) -> Self {
        self.space = Some(space.into());
        self
    }

    pub fn in_collision_group(mut self, group: impl Into<String>) -> Self {
        self.collision_group = Some(group.into());
        self
    }

    fn validate(&self) -> SceneResult<()> {
        for side in self.sides {
            ensure_positive("sides", side)?;
        }
        ensure_non_zero("orientation", self.orientation)?;
        ensure_positive("density", self.density)?;
        ensure_color("color", self.color)
    }
}

/// Description of a sphere body.
#[derive(Debug, Clone)]
pub struct SphereSpec {
    pub position: [f64; 3],
    pub orientation: [f64; 3],
    pub radius: f64,
    pub density: f64,
    pub color: [f64; 3],
    pub space: Option<String>,
    pub collision_group: Option<String>,
}

impl Default for SphereSpec {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            orientation: [0.0, 0.0, 1.0],
            radius: 0.25,
            density: 1.0,
            color: [1.0, 1.0, 1.0],
            space: None,
            collision_group: None,
        }
    }
}

impl SphereSpec {
    pub fn with_position(mut self, position: [f64; 3]) -> Self {
        self.position = position;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    pub fn with_color(mut self, color: [f64; 3]) -> Self {
        self.color = color;
        self
    }

    pub fn in_space(mut self, space: impl Into<String>) -> Self {
        self.space = Some(space.into());
        self
    }

    pub fn in_collision_group(mut self, group: impl Into<String>) -> Self {
        self.collision_group = Some(group.into());
        self
    }

    fn validate(&self) -> SceneResult<()> {
        ensure_non_zero("orientation", self.orientation)?;
        ensure_positive("radius", self.radius)?;
        ensure_positive("density", self.density)?;
        ensure_color("color", self.color)
    }
}

/// Description of a cylinder body.
#[derive(Debug, Clone)]
pub struct CylinderSpec {
    pub position: [f64; 3],
    /// Direction of the long axis.
    pub orientation: [f64; 3],
    pub length: f64,
    pub radius: f64,
    /// Rounded end caps; flat-ended cylinders are harder on collision
    /// detection.
    pub capped: bool,
    pub density: f64,
    pub color: [f64; 3],
    pub space: Option<String>,
    pub collision_group: Option<String>,
}

impl Default for CylinderSpec {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            orientation: [0.0, 0.0, 1.0],
            length: 0.5,
            radius: 0.05,
            capped: true,
            density: 1.0,
            color: [1.0, 1.0, 1.0],
            space: None,
            collision_group: None,
        }
    }
}

impl CylinderSpec {
    pub fn with_position(mut self, position: [f64; 3]) -> Self {
        self.position = position;
        self
    }

    pub fn with_orientation(mut self, orientation: [f64; 3]) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_length(mut self, length: f64) -> Self {
        self.length = length;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn capped(mut self, capped: bool) -> Self {
        self.capped = capped;
        self
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    pub fn with_color(mut self, color: [f64; 3]) -> Self {
        self.color = color;
        self
    }

    pub fn in_space(mut self, space: impl Into<String>) -> Self {
        self.space = Some(space.into());
        self
    }

    pub fn in_collision_group(mut self, group: impl Into<String>) -> Self {
        self.collision_group = Some(group.into());
        self
    }

    fn validate(&self) -> SceneResult<()> {
        ensure_non_zero("orientation", self.orientation)?;
        ensure_positive("length", self.length)?;
        ensure_positive("radius", self.radius)?;
        ensure_positive("density", self.density)?;
        ensure_color("color", self.color)
    }
}

impl Scene {
    /// Describe a box body.
    pub fn send_box(&mut self, spec: BoxSpec) -> SceneResult<Handle> {
        spec.validate()?;
        let space = self.resolve_space(spec.space.as_deref())?;
        let group = self.resolve_group(spec.collision_group.as_deref())?;
        let command = Command::new("Entity")
            .arg(Arg::text("Box"))
            .arg(Arg::vec3(spec.position))
            .arg(Arg::vec3(spec.orientation))
            .arg(Arg::vec3(spec.sides))
            .arg(Arg::real(spec.density))
            .arg(Arg::vec3(spec.color))
            .arg(Arg::text(space))
            .arg(Arg::int(group as i64));
        Ok(self.register_and_send(Category::Body, command))
    }

    /// Describe a sphere body.
    pub fn send_sphere(&mut self, spec: SphereSpec) -> SceneResult<Handle> {
        spec.validate()?;
        let space = self.resolve_space(spec.space.as_deref())?;
        let group = self.resolve_group(spec.collision_group.as_deref())?;
        let command = Command::new("Entity")
            .arg(Arg::text("Sphere"))
            .arg(Arg::vec3(spec.position))
            .arg(Arg::vec3(spec.orientation))
            .arg(Arg::real(spec.radius))
            .arg(Arg::real(spec.density))
            .arg(Arg::vec3(spec.color))
            .arg(Arg::text(space))
            .arg(Arg::int(group as i64));
        Ok(self.register_and_send(Category::Body, command))
    }

    /// Describe a cylinder body.
    pub fn send_cylinder(&mut self, spec: CylinderSpec) -> SceneResult<Handle> {
        spec.validate()?;
        let space = self.resolve_space(spec.space.as_deref())?;
        let group = self.resolve_group(spec.collision_group.as_deref())?;
        let command = Command::new("Entity")
            .arg(Arg::text("Cylinder"))
            .arg(Arg::vec3(spec.position))
            .arg(Arg::vec3(spec.orientation))
            .arg(Arg::real(spec.length))
            .arg(Arg::real(spec.radius))
            .arg(Arg::flag(spec.capped))
            .arg(Arg::real(spec.density))
            .arg(Arg::vec3(spec.color))
            .arg(Arg::text(space))
            .arg(Arg::int(group as i64));
        Ok(self.register_and_send(Category::Body, command))
    }

    /// Describe an empty composite body; geometry is attached afterwards with
    /// the `add_*_to_composite` calls.
    pub fn send_composite_body(
        &mut self,
        space: Option<&str>,
        collision_group: Option<&str>,
    ) -> SceneResult<Handle> {
        let space = self.resolve_space(space)?;
        let group = self.resolve_group(collision_group)?;
        let command = Command::new("Entity")
            .arg(Arg::text("Composite"))
            .arg(Arg::text(space))
            .arg(Arg::int(group as i64));
        Ok(self.register_and_send(Category::Body, command))
    }

    /// Attach box geometry to a composite body.
    ///
    /// Sub-geometries receive no handle of their own and inherit the
    /// composite's space and collision group, so the spec must leave both
    /// unset.
    pub fn add_box_to_composite(&mut self, composite: Handle, spec: BoxSpec) -> SceneResult<()> {
        self.require_entity("composite_id", composite, Category::Body)?;
        ensure_inherits_placement(spec.space.as_deref(), spec.collision_group.as_deref())?;
        spec.validate()?;
        let command = Command::new("Add")
            .arg(Arg::int(i64::from(composite.raw())))
            .arg(Arg::text("Geom"))
            .arg(Arg::text("Box"))
            .arg(Arg::vec3(spec.position))
            .arg(Arg::vec3(spec.orientation))
            .arg(Arg::vec3(spec.sides))
            .arg(Arg::real(spec.density))
            .arg(Arg::vec3(spec.color));
        self.commands.append(command);
        Ok(())
    }

    /// Attach sphere geometry to a composite body.
    pub fn add_sphere_to_composite(
        &mut self,
        composite: Handle,
        spec: SphereSpec,
    ) -> SceneResult<()> {
        self.require_entity("composite_id", composite, Category::Body)?;
        ensure_inherits_placement(spec.space.as_deref(), spec.collision_group.as_deref())?;
        spec.validate()?;
        let command = Command::new("Add")
            .arg(Arg::int(i64::from(composite.raw())))
            .arg(Arg::text("Geom"))
            .arg(Arg::text("Sphere"))
            .arg(Arg::vec3(spec.position))
            .arg(Arg::vec3(spec.orientation))
            .arg(Arg::real(spec.radius))
            .arg(Arg::real(spec.density))
            .arg(Arg::vec3(spec.color));
        self.commands.append(command);
        Ok(())
    }

    /// Attach cylinder geometry to a composite body.
    pub fn add_cylinder_to_composite(
        &mut self,
        composite: Handle,
        spec: CylinderSpec,
    ) -> SceneResult<()> {
        self.require_entity("composite_id", composite, Category::Body)?;
        ensure_inherits_placement(spec.space.as_deref(), spec.collision_group.as_deref())?;
        spec.validate()?;
        let command = Command::new("Add")
            .arg(Arg::int(i64::from(composite.raw())))
            .arg(Arg::text("Geom"))
            .arg(Arg::text("Cylinder"))
            .arg(Arg::vec3(spec.position))
            .arg(Arg::vec3(spec.orientation))
            .arg(Arg::real(spec.length))
            .arg(Arg::real(spec.radius))
            .arg(Arg::flag(spec.capped))
            .arg(Arg::real(spec.density))
            .arg(Arg::vec3(spec.color));
        self.commands.append(command);
        Ok(())
    }

    /// Describe a ray entity fixed to `body`; ray sensors attach to the
    /// returned handle.
    pub fn send_ray(
        &mut self,
        body: Handle,
        position: [f64; 3],
        direction: [f64; 3],
        max_length: f64,
    ) -> SceneResult<Handle> {
        self.registry.validate("body_id", body, Category::Body)?;
        ensure_non_zero("direction", direction)?;
        ensure_positive("max_length", max_length)?;
        let command = Command::new("Entity")
            .arg(Arg::text("Ray"))
            .arg(Arg::int(i64::from(body.raw())))
            .arg(Arg::vec3(position))
            .arg(Arg::vec3(direction))
            .arg(Arg::real(max_length));
        Ok(self.register_and_send(Category::Body, command))
    }

    /// Describe a terrain height map.
    ///
    /// `rows` is row-major with both dimensions at least 2; the receiver
    /// parses positionally, so the dimensions are framed explicitly ahead of
    /// the flattened heights.
    pub fn send_height_map(
        &mut self,
        rows: &[Vec<f64>],
        position: [f64; 3],
        size: (f64, f64),
        height_scale: f64,
    ) -> SceneResult<Handle> {
        let m = rows.len();
        let n = rows.first().map_or(0, Vec::len);
        if m < 2 || n < 2 {
            return Err(SceneError::invalid(
                "rows",
                format!("height map must be at least 2x2, got {m}x{n}"),
            ));
        }
        if rows.iter().any(|row| row.len() != n) {
            return Err(SceneError::invalid("rows", "height map rows must be equal length"));
        }
        ensure_positive("size", size.0)?;
        ensure_positive("size", size.1)?;
        ensure_positive("height_scale", height_scale)?;

        let heights = rows.iter().flatten().copied();
        let command = Command::new("Entity")
            .arg(Arg::text("HeightMap"))
            .arg(Arg::vec3(position))
            .arg(Arg::int(m as i64))
            .arg(Arg::int(n as i64))
            .arg(Arg::reals(heights))
            .arg(Arg::pair(size))
            .arg(Arg::real(height_scale))
            .arg(Arg::real(0.0)) // offset, unused with an explicit position
            .arg(Arg::real(1.0)) // minimum AABB thickness
            .arg(Arg::int(0)); // infinite wrap, unsupported
        Ok(self.register_and_send(Category::Generic, command))
    }

    /// Apply an impulse force to `body` at a given time step.
    pub fn add_impulse_to_body(
        &mut self,
        body: Handle,
        force: [f64; 3],
        time_step: u32,
    ) -> SceneResult<()> {
        self.registry.validate("body_id", body, Category::Body)?;
        ensure_non_zero("force", force)?;
        if let Some(steps) = self.config.steps.bounded() {
            if time_step >= steps {
                return Err(SceneError::invalid(
                    "time_step",
                    format!("step {time_step} is outside the {steps}-step run"),
                ));
            }
        }
        let command = Command::new("Add")
            .arg(Arg::int(i64::from(body.raw())))
            .arg(Arg::text("Impulse"))
            .arg(Arg::int(i64::from(time_step)))
            .arg(Arg::vec3(force));
        self.commands.append(command);
        Ok(())
    }

    /// Make `body` the scene's light emitter.
    pub fn send_light_source(&mut self, body: Handle) -> SceneResult<()> {
        self.require_entity("body_id", body, Category::Body)?;
        let command = Command::new("LightSource").arg(Arg::int(i64::from(body.raw())));
        self.commands.append(command);
        Ok(())
    }
}

fn ensure_inherits_placement(space: Option<&str>, group: Option<&str>) -> SceneResult<()> {
    if space.is_some() {
        return Err(SceneError::invalid(
            "space",
            "composite sub-geometries inherit the composite's space",
        ));
    }
    if group.is_some() {
        return Err(SceneError::invalid(
            "collision_group",
            "composite sub-geometries inherit the composite's collision group",
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
    fn box_encodes_kind_then_fields_then_placement() {
        let mut scene = scene();
        let handle = scene
            .send_box(BoxSpec::default().with_position([1.0, 2.0, 3.0]))
            .expect("box should register");
        assert_eq!(handle, Handle(0));
        assert!(scene.command_text().contains(
            "Entity\nBox\n1\n2\n3\n0\n0\n1\n0.25\n0.25\n0.25\n1\n1\n1\n1\nNone\n0\n"
        ));
    }

    #[test]
    fn non_positive_side_is_rejected() {
        let mut scene = scene();
        let err = scene
            .send_box(BoxSpec::default().with_sides([0.5, 0.0, 0.5]))
            .expect_err("zero side should fail");
        assert!(matches!(err, SceneError::InvalidArgument { parameter: "sides", .. }));
    }

    #[test]
    fn zero_orientation_is_rejected() {
        let mut scene = scene();
        let err = scene
            .send_cylinder(CylinderSpec::default().with_orientation([0.0, 0.0, 0.0]))
            .expect_err("zero orientation should fail");
        assert!(matches!(
            err,
            SceneError::InvalidArgument { parameter: "orientation", .. }
        ));
    }

    #[test]
    fn out_of_range_color_is_rejected() {
        let mut scene = scene();
        let err = scene
            .send_sphere(SphereSpec::default().with_color([1.5, 0.0, 0.0]))
            .expect_err("color channel above 1 should fail");
        assert!(matches!(err, SceneError::InvalidArgument { parameter: "color", .. }));
    }

    #[test]
    fn explicit_group_allocates_collision_index() {
        let mut scene = scene();
        scene
            .send_box(BoxSpec::default().in_collision_group("robot"))
            .expect("box should register");
        scene
            .send_sphere(SphereSpec::default().in_collision_group("prey"))
            .expect("sphere should register");
        // default group was never used, so indices start at the named ones
        assert!(scene.command_text().contains("None\n0\n"));
        assert!(scene.command_text().contains("None\n1\n"));
    }

    #[test]
    fn composite_sub_geometry_gets_no_handle() {
        let mut scene = scene();
        let composite = scene
            .send_composite_body(None, None)
            .expect("composite should register");
        let before = scene.num_entities();
        scene
            .add_box_to_composite(composite, BoxSpec::default())
            .expect("geometry should attach");
        assert_eq!(scene.num_entities(), before);
        assert!(scene.command_text().contains("Add\n0\nGeom\nBox\n"));
    }

    #[test]
    fn composite_sub_geometry_may_not_override_placement() {
        let mut scene = scene();
        let composite = scene
            .send_composite_body(None, None)
            .expect("composite should register");
        let err = scene
            .add_box_to_composite(composite, BoxSpec::default().in_collision_group("other"))
            .expect_err("sub-geometry placement should be rejected");
        assert!(matches!(
            err,
            SceneError::InvalidArgument { parameter: "collision_group", .. }
        ));
    }

    #[test]
    fn height_map_requires_rectangular_rows() {
        let mut scene = scene();
        let ragged = vec![vec![0.0, 1.0], vec![0.0]];
        let err = scene
            .send_height_map(&ragged, [0.0; 3], (10.0, 10.0), 1.0)
            .expect_err("ragged height map should fail");
        assert!(matches!(err, SceneError::InvalidArgument { parameter: "rows", .. }));
    }

    #[test]
    fn height_map_frames_dimensions_explicitly() {
        let mut scene = scene();
        let rows = vec![vec![0.0, 1.0], vec![2.0, 3.0]];
        let handle = scene
            .send_height_map(&rows, [0.0; 3], (10.0, 10.0), 1.0)
            .expect("height map should register");
        assert_eq!(handle, Handle(0));
        assert!(scene
            .command_text()
            .contains("Entity\nHeightMap\n0\n0\n0\n2\n2\n0\n1\n2\n3\n10\n10\n1\n"));
    }

    #[test]
    fn impulse_outside_bounded_run_is_rejected() {
        let mut scene = scene();
        let body = scene.send_box(BoxSpec::default()).expect("box should register");
        let err = scene
            .add_impulse_to_body(body, [0.0, 0.0, 5.0], 100)
            .expect_err("step 100 of a 100-step run is out of range");
        assert!(matches!(
            err,
            SceneError::InvalidArgument { parameter: "time_step", .. }
        ));
    }
}
