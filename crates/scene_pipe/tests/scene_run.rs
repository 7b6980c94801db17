#![cfg(feature = "test-support")]

use std::path::PathBuf;

use scene_pipe::{Axis, BoxSpec, Scene, SimulatorConfig, SphereSpec};

fn fake_simulator_path() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_fake_simulator") {
        return PathBuf::from(path);
    }

    // Fallback to the workspace target directory.
    let mut path = std::env::current_exe().expect("current exe");
    path.pop(); // deps
    path.pop(); // debug or release
    path.push("fake_simulator");
    if cfg!(windows) {
        path.set_extension("exe");
    }
    path
}

#[test]
fn drives_fake_simulator_end_to_end() {
    let config = SimulatorConfig::new(fake_simulator_path())
        .with_steps(3)
        .headless(true);
    let mut scene = Scene::new(config).expect("config should validate");

    let body = scene
        .send_box(BoxSpec::default().with_position([0.0, 0.0, 1.0]))
        .expect("box should register");
    let touch = scene.send_touch_sensor(body).expect("touch should register");
    let vestibular = scene
        .send_vestibular_sensor(body)
        .expect("vestibular should register");

    let report = scene.run().expect("run should complete");
    assert!(report.exit_status().success());
    assert_eq!(report.steps_completed(), 3);

    let touch_series = report.sensor_data(touch).expect("touch series present");
    assert_eq!(touch_series.channels(), 1);
    assert_eq!(touch_series.values(), &[1000.0, 1001.0, 1002.0]);

    let vestibular_series = report
        .sensor_data(vestibular)
        .expect("vestibular series present");
    assert_eq!(vestibular_series.channels(), 3);
    assert_eq!(vestibular_series.channel(0), &[2000.0, 2001.0, 2002.0]);
    assert_eq!(vestibular_series.channel(1), &[2100.0, 2101.0, 2102.0]);
    assert_eq!(vestibular_series.channel(2), &[2200.0, 2201.0, 2202.0]);
    assert_eq!(vestibular_series.sample(1), vec![2001.0, 2101.0, 2201.0]);

    // The body itself reported no telemetry.
    assert!(report.sensor_data(body).is_none());

    // Headless mode reached the process as a positional flag, and the known
    // banner was cut from the diagnostics.
    assert!(report.diagnostics().contains("-blind"));
    assert!(!report.diagnostics().contains("Simulation test environment"));
    assert!(report.diagnostics().contains("sensors"));
}

#[test]
fn scene_without_sensors_yields_empty_telemetry() {
    let config = SimulatorConfig::new(fake_simulator_path())
        .with_steps(5)
        .headless(true);
    let mut scene = Scene::new(config).expect("config should validate");
    scene
        .send_sphere(SphereSpec::default())
        .expect("sphere should register");

    let report = scene.run().expect("run should complete");
    assert_eq!(report.steps_completed(), 5);
    assert!(report.telemetry().is_empty());
}

#[test]
fn collision_groups_do_not_disturb_telemetry() {
    let config = SimulatorConfig::new(fake_simulator_path())
        .with_steps(2)
        .headless(true);
    let mut scene = Scene::new(config).expect("config should validate");

    let robot = scene
        .send_box(BoxSpec::default().in_collision_group("robot"))
        .expect("box should register");
    scene
        .send_sphere(SphereSpec::default().in_collision_group("prey"))
        .expect("sphere should register");
    scene
        .assign_collision("robot", "prey")
        .expect("groups should connect");

    let height = scene
        .send_position_sensor(robot, Axis::Z)
        .expect("sensor should register");

    let report = scene.run().expect("run should complete");
    let series = report.sensor_data(height).expect("series present");
    assert_eq!(series.values(), &[2000.0, 2001.0]);
}
