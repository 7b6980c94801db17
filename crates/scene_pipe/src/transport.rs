use std::io::{Read, Write};
use std::path::Path;
use std::process::{Command as ProcessCommand, ExitStatus, Stdio};
use std::thread;

use crate::error::{SceneError, SceneResult};

/// Sentinel line terminating the command stream.
const DONE: &str = "Done\n";

/// Markers bounding the known visualization banner on stderr.
const BANNER_START: &str = "Simulation test environment v0.02";
const BANNER_END: &str = "sideways and up.";

/// Positional flags controlling how the simulator process runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub headless: bool,
    pub paused: bool,
    pub use_textures: bool,
    pub draw_shadows: bool,
}

impl RunOptions {
    fn flags(self) -> Vec<&'static str> {
        let mut flags = Vec::new();
        if self.headless {
            flags.push("-blind");
        }
        if self.paused {
            flags.push("-pause");
        }
        if !self.use_textures {
            flags.push("-notex");
        }
        if !self.draw_shadows {
            flags.push("-noshadow");
        }
        flags
    }
}

/// Everything the simulator process produced.
#[derive(Debug)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: ExitStatus,
}

/// Spawn the simulator, transfer the command stream, and collect all output.
///
/// The stream plus the terminating `Done` line is written on a dedicated
/// thread while stdout and stderr are drained on reader threads. The child may
/// fill an output pipe before it has consumed its whole input, so draining
/// concurrently with the write is required for forward progress on large
/// scenes, not an optimization. The call is synchronous: it returns only once
/// the child has exited and both output streams are exhausted.
pub fn run(executable: &Path, options: RunOptions, stream: Vec<u8>) -> SceneResult<ProcessOutput> {
    let mut child = ProcessCommand::new(executable)
        .args(options.flags())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| SceneError::spawn(format!("{}: {err}", executable.display())))?;

    tracing::info!(
        executable = %executable.display(),
        bytes = stream.len(),
        "simulator spawned"
    );

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| SceneError::spawn("failed to open simulator stdin"))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| SceneError::spawn("failed to capture simulator stdout"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| SceneError::spawn("failed to capture simulator stderr"))?;

    let writer = thread::spawn(move || -> std::io::Result<()> {
        let result = stdin
            .write_all(&stream)
            .and_then(|()| stdin.write_all(DONE.as_bytes()))
            .and_then(|()| stdin.flush());
        match result {
            // The child stopped listening; whatever it produced still gets
            // drained and reported.
            Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
            other => other,
        }
        // stdin drops here, closing the pipe.
    });
    let stdout_reader = spawn_drain(stdout);
    let stderr_reader = spawn_drain(stderr);

    let status = child.wait()?;

    writer
        .join()
        .map_err(|_| SceneError::spawn("simulator stdin writer panicked"))??;
    let stdout = join_drain(stdout_reader)?;
    let stderr = join_drain(stderr_reader)?;

    tracing::debug!(
        status = %status,
        stdout_bytes = stdout.len(),
        stderr_bytes = stderr.len(),
        "simulator exited"
    );

    Ok(ProcessOutput {
        stdout,
        stderr,
        status,
    })
}

fn spawn_drain<R: Read + Send + 'static>(mut reader: R) -> thread::JoinHandle<std::io::Result<String>> {
    thread::spawn(move || {
        let mut buffer = String::new();
        reader.read_to_string(&mut buffer)?;
        Ok(buffer)
    })
}

fn join_drain(handle: thread::JoinHandle<std::io::Result<String>>) -> SceneResult<String> {
    handle
        .join()
        .map_err(|_| SceneError::spawn("simulator output reader panicked"))?
        .map_err(SceneError::from)
}

/// Cut the visualization library's banner out of the diagnostic stream.
///
/// The banner is bounded by two known markers; anything outside them is the
/// simulator's own diagnostics and passes through untouched. Streams without
/// both markers are returned as-is.
pub fn trim_banner(stderr: &str) -> String {
    let Some(start) = stderr.find(BANNER_START) else {
        return stderr.to_string();
    };
    let Some(end_offset) = stderr[start..].find(BANNER_END) else {
        return stderr.to_string();
    };
    let end = start + end_offset + BANNER_END.len();
    format!("{}{}", &stderr[..start], &stderr[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_executable_is_a_spawn_failure() {
        let err = run(
            Path::new("/nonexistent/simulator"),
            RunOptions::default(),
            Vec::new(),
        )
        .expect_err("missing executable should not spawn");
        assert!(matches!(err, SceneError::ProcessSpawnFailure(_)));
    }

    #[test]
    fn banner_between_markers_is_removed() {
        let stderr = format!(
            "pre-banner line\n{BANNER_START}\ndrawstuff usage text\n{BANNER_END}\npost-banner line\n"
        );
        assert_eq!(
            trim_banner(&stderr),
            "pre-banner line\n\npost-banner line\n"
        );
    }

    #[test]
    fn stderr_without_banner_passes_through() {
        let stderr = "plain diagnostics\n";
        assert_eq!(trim_banner(stderr), stderr);
    }

    #[test]
    fn headless_run_options_map_to_positional_flags() {
        let options = RunOptions {
            headless: true,
            paused: false,
            use_textures: false,
            draw_shadows: true,
        };
        assert_eq!(options.flags(), vec!["-blind", "-notex"]);
    }
}
