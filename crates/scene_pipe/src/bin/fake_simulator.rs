//! Stand-in for the simulator executable, used by integration tests.
//!
//! Consumes the line protocol from stdin until the `Done` sentinel, assigns
//! entity ids by counting `Entity` commands the way the real simulator does,
//! and emits a deterministic telemetry stream: the step count, then for each
//! sensor its handle followed by `channels x steps` samples with value
//! `id * 1000 + channel * 100 + step`.

use std::io::{BufRead, Write};

fn sensor_channels(kind: &str) -> Option<usize> {
    match kind {
        "VestibularSensor" => Some(3),
        "PositionSensor" | "RaySensor" | "TouchSensor" | "QuaternionSensor"
        | "ProprioceptiveSensor" | "IsSeenSensor" | "LightSensor" => Some(1),
        _ => None,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let flags: Vec<String> = std::env::args().skip(1).collect();

    let stdin = std::io::stdin();
    let mut lines = Vec::new();
    for line in stdin.lock().lines() {
        let line = line?;
        if line == "Done" {
            break;
        }
        lines.push(line);
    }

    let mut steps: i64 = 0;
    let mut next_entity = 0i64;
    let mut sensors: Vec<(i64, usize)> = Vec::new();

    let mut index = 0;
    while index < lines.len() {
        match lines[index].as_str() {
            "Entity" => {
                let id = next_entity;
                next_entity += 1;
                if let Some(kind) = lines.get(index + 1) {
                    if let Some(channels) = sensor_channels(kind) {
                        sensors.push((id, channels));
                    }
                }
            }
            "Parameter" => {
                if lines.get(index + 1).map(String::as_str) == Some("EvalSteps") {
                    if let Some(value) = lines.get(index + 2) {
                        steps = value.parse()?;
                    }
                }
            }
            _ => {}
        }
        index += 1;
    }

    let stderr = std::io::stderr();
    let mut err = stderr.lock();
    writeln!(err, "fake simulator flags: {}", flags.join(" "))?;
    writeln!(err, "Simulation test environment v0.02")?;
    writeln!(err, "   drawstuff keyboard help text that callers never want")?;
    writeln!(err, "sideways and up.")?;
    writeln!(
        err,
        "parsed {} lines, {} entities, {} sensors",
        lines.len(),
        next_entity,
        sensors.len()
    )?;

    if steps < 0 {
        // Unbounded runs never report telemetry; a real simulator would block
        // in its render loop here.
        return Ok(());
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write!(out, "{steps}")?;
    for (id, channels) in sensors {
        write!(out, " {id}")?;
        for channel in 0..channels {
            for step in 0..steps {
                write!(out, " {}", id * 1000 + (channel as i64) * 100 + step)?;
            }
        }
    }
    writeln!(out, " Done")?;
    Ok(())
}
