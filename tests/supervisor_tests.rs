//! Supervisor behavior against real child processes.

use std::process::Command;

use autothemer::logger::Logger;
use autothemer::supervisor::{SpawnOutcome, SupervisedProcess, Supervisor};

#[test]
fn immediate_crash_is_reported_with_exit_code() {
    let logger = Logger::new(false);
    let supervisor = Supervisor::new(&logger);

    let child = Command::new("sh")
        .args(["-c", "exit 1"])
        .spawn()
        .expect("sh must be available");
    let mut proc = SupervisedProcess::adopt(child);

    assert_eq!(
        supervisor.observe_immediate_exit(&mut proc),
        SpawnOutcome::CrashedImmediately(1)
    );
}

#[test]
fn surviving_child_is_healthy() {
    let logger = Logger::new(false);
    let supervisor = Supervisor::new(&logger);

    let child = Command::new("sleep")
        .arg("5")
        .spawn()
        .expect("sleep must be available");
    let pid = child.id();
    let mut proc = SupervisedProcess::adopt(child);

    assert_eq!(
        supervisor.observe_immediate_exit(&mut proc),
        SpawnOutcome::Healthy
    );

    // Clean up the helper process.
    let _ = nix::sys::signal::kill(
        nix::unistd::Pid::from_raw(pid as i32),
        nix::sys::signal::Signal::SIGKILL,
    );
}

#[test]
fn ensure_stopped_without_a_scheduler_is_a_no_op() {
    let logger = Logger::new(false);
    let supervisor = Supervisor::new(&logger);

    // Must neither panic nor error with nothing to stop.
    supervisor.ensure_stopped();
}

#[test]
fn ensure_stopped_leaves_unrelated_processes_alone() {
    let logger = Logger::new(false);
    let supervisor = Supervisor::new(&logger);

    let mut bystander = Command::new("sleep")
        .arg("5")
        .spawn()
        .expect("sleep must be available");

    supervisor.ensure_stopped();

    // The bystander does not match the scheduler signature and must still
    // be running afterwards.
    assert!(bystander.try_wait().expect("try_wait must work").is_none());
    let _ = bystander.kill();
    let _ = bystander.wait();
}
