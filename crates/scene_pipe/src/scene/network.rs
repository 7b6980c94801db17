use super::{ensure_fraction, ensure_positive, Scene};
use crate::command::{Arg, Command};
use crate::error::{SceneError, SceneResult};
use crate::registry::{Category, Handle};

impl Scene {
    /// Neuron emitting a constant value.
    pub fn send_bias_neuron(&mut self, value: f64) -> SceneResult<Handle> {
        let command = Command::new("Entity")
            .arg(Arg::text("BiasNeuron"))
            .arg(Arg::real(value));
        Ok(self.register_and_send(Category::Neuron, command))
    }

    /// Input neuron reading one channel of a sensor each step.
    ///
    /// `channel` is checked against the arity the sensor declared at
    /// registration.
    pub fn send_sensor_neuron(&mut self, sensor: Handle, channel: usize) -> SceneResult<Handle> {
        self.require_entity("sensor_id", sensor, Category::Sensor)?;
        let channels = self
            .sensor_channels
            .get(&sensor)
            .copied()
            .ok_or(SceneError::UnknownHandle(sensor))?;
        if channel >= channels {
            return Err(SceneError::invalid(
                "channel",
                format!("sensor {sensor} has {channels} channel(s), got index {channel}"),
            ));
        }
        let command = Command::new("Entity")
            .arg(Arg::text("SensorNeuron"))
            .arg(Arg::int(i64::from(sensor.raw())))
            .arg(Arg::int(channel as i64));
        Ok(self.register_and_send(Category::Neuron, command))
    }

    /// Output neuron whose value drives an actuator each step.
    pub fn send_motor_neuron(
        &mut self,
        actuator: Handle,
        alpha: f64,
        tau: f64,
        starting_value: f64,
    ) -> SceneResult<Handle> {
        self.require_entity("actuator_id", actuator, Category::Actuator)?;
        ensure_positive("tau", tau)?;
        let command = Command::new("Entity")
            .arg(Arg::text("MotorNeuron"))
            .arg(Arg::int(i64::from(actuator.raw())))
            .arg(Arg::real(alpha))
            .arg(Arg::real(tau))
            .arg(Arg::real(starting_value));
        Ok(self.register_and_send(Category::Neuron, command))
    }

    /// Plain neuron between inputs and outputs.
    pub fn send_hidden_neuron(
        &mut self,
        alpha: f64,
        tau: f64,
        starting_value: f64,
    ) -> SceneResult<Handle> {
        ensure_positive("tau", tau)?;
        let command = Command::new("Entity")
            .arg(Arg::text("HiddenNeuron"))
            .arg(Arg::real(alpha))
            .arg(Arg::real(tau))
            .arg(Arg::real(starting_value));
        Ok(self.register_and_send(Category::Neuron, command))
    }

    /// Input neuron taking pre-specified values, one per step.
    ///
    /// The value count is framed explicitly ahead of the sequence; the
    /// simulator loops a list shorter than the run.
    pub fn send_user_neuron(&mut self, values: &[f64]) -> SceneResult<Handle> {
        if values.is_empty() {
            return Err(SceneError::invalid("values", "must not be empty"));
        }
        let command = Command::new("Entity")
            .arg(Arg::text("UserNeuron"))
            .arg(Arg::int(values.len() as i64))
            .arg(Arg::reals(values.iter().copied()));
        Ok(self.register_and_send(Category::Neuron, command))
    }

    /// Input neuron sampling `function` at each step's simulated time.
    ///
    /// Lowers to a user neuron with one value per step, so the run must be
    /// bounded.
    pub fn send_function_neuron(
        &mut self,
        function: impl Fn(f64) -> f64,
    ) -> SceneResult<Handle> {
        let steps = self.config.steps.bounded().ok_or_else(|| {
            SceneError::invalid("function", "cannot sample a function over an unbounded run")
        })?;
        let dt = self.config.dt;
        let values: Vec<f64> = (0..steps).map(|step| function(f64::from(step) * dt)).collect();
        self.send_user_neuron(&values)
    }

    /// Connect two neurons with a constant weight.
    pub fn send_synapse(
        &mut self,
        source: Handle,
        target: Handle,
        weight: f64,
    ) -> SceneResult<Handle> {
        self.send_developing_synapse(source, target, weight, weight, 0.0, 0.0)
    }

    /// Connect two neurons with a weight that ramps between two values.
    ///
    /// `start_time` and `end_time` are fractions in [0,1] of the evaluation
    /// duration. A start past the end clamps the end up to the start, giving a
    /// discrete single-step change rather than a negative-duration ramp.
    pub fn send_developing_synapse(
        &mut self,
        source: Handle,
        target: Handle,
        start_weight: f64,
        end_weight: f64,
        start_time: f64,
        end_time: f64,
    ) -> SceneResult<Handle> {
        self.require_entity("source_neuron_id", source, Category::Neuron)?;
        self.require_entity("target_neuron_id", target, Category::Neuron)?;
        ensure_fraction("start_time", start_time)?;
        ensure_fraction("end_time", end_time)?;
        let steps = self.config.steps.bounded().ok_or_else(|| {
            SceneError::invalid(
                "start_time",
                "cannot map development times over an unbounded run",
            )
        })?;

        let end_time = end_time.max(start_time);
        let last_step = f64::from(steps - 1);
        let start_step = (start_time * last_step).round() as i64;
        let end_step = (end_time * last_step).round() as i64;

        let command = Command::new("Entity")
            .arg(Arg::text("Synapse"))
            .arg(Arg::int(i64::from(source.raw())))
            .arg(Arg::int(i64::from(target.raw())))
            .arg(Arg::real(start_weight))
            .arg(Arg::real(end_weight))
            .arg(Arg::int(start_step))
            .arg(Arg::int(end_step));
        Ok(self.register_and_send(Category::Synapse, command))
    }
}
