//! Fire-and-forget launching of external programs.

use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, warn};

/// Run `command` through `shell -c`.
pub fn spawn_shell(shell: &str, command: &str) {
    let mut cmd = Command::new(shell);
    cmd.arg("-c").arg(command);
    launch(cmd, command);
}

/// Run a program directly, splitting `command` on whitespace.
pub fn spawn_program(command: &str) {
    let mut parts = command.split_whitespace();
    let Some(program) = parts.next() else {
        warn!("Refusing to launch an empty command");
        return;
    };
    let mut cmd = Command::new(program);
    cmd.args(parts);
    launch(cmd, command);
}

fn launch(mut cmd: Command, label: &str) {
    cmd.stdin(Stdio::null());
    match cmd.spawn() {
        Ok(mut child) => {
            debug!("Launched {:?} (pid {})", label, child.id());
            let label = label.to_string();
            // Reap the child so it never lingers as a zombie
            thread::spawn(move || match child.wait() {
                Ok(status) if !status.success() => {
                    warn!("{:?} exited with {}", label, status)
                }
                Ok(_) => {}
                Err(e) => warn!("Failed to wait for {:?}: {}", label, e),
            });
        }
        Err(e) => warn!("Failed to launch {:?}: {}", label, e),
    }
}
