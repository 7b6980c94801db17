#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use scene_pipe::transport::{run, RunOptions};

fn bare_options() -> RunOptions {
    RunOptions {
        headless: false,
        paused: false,
        use_textures: true,
        draw_shadows: true,
    }
}

#[test]
fn large_stream_echoes_through_cat_without_deadlock() {
    // Far beyond any OS pipe buffer: write-everything-then-read would wedge
    // here with the child blocked on a full stdout pipe.
    let stream = "UserNeuron\n0.123456789\n".repeat(100_000).into_bytes();

    let output = run(Path::new("/bin/cat"), bare_options(), stream.clone())
        .expect("cat should echo the stream");

    assert!(output.status.success());
    assert!(output.stdout.as_bytes().starts_with(&stream));
    assert!(output.stdout.ends_with("Done\n"));
    assert_eq!(output.stdout.len(), stream.len() + "Done\n".len());
}

#[test]
fn stderr_is_drained_alongside_stdout() {
    let dir = tempfile::tempdir().expect("temp dir");
    let script = dir.path().join("echo_stderr.sh");
    fs::write(&script, "#!/bin/sh\necho 'script diagnostics' >&2\ncat\n")
        .expect("script should write");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755))
        .expect("script should be executable");

    let output = run(&script, bare_options(), b"Parameter\nDT\n0.01\n".to_vec())
        .expect("script should run");

    assert!(output.status.success());
    assert!(output.stderr.contains("script diagnostics"));
    assert!(output.stdout.ends_with("Done\n"));
}
