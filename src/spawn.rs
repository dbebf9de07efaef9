//! Fire-and-forget program launching and child reaping.

use std::process::Command;

use anyhow::Result;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

/// Launch a command line detached from the manager's process group, so
/// spawned programs survive a manager restart and never share its
/// controlling terminal.
pub fn spawn(cmd: &[String]) {
    let Some((program, args)) = cmd.split_first() else {
        tracing::warn!("Ignoring empty spawn command");
        return;
    };
    let result = {
        use std::os::unix::process::CommandExt;
        Command::new(program).args(args).process_group(0).spawn()
    };
    match result {
        Ok(child) => tracing::info!("Spawned {} (pid {})", program, child.id()),
        Err(e) => tracing::warn!("Failed to spawn {}: {}", program, e),
    }
}

extern "C" fn reap(_: libc::c_int) {
    // Async-signal-safe: waitpid only, no allocation or logging.
    unsafe {
        while libc::waitpid(-1, std::ptr::null_mut(), libc::WNOHANG) > 0 {}
    }
}

/// Install the child reaper so spawned programs never linger as zombies.
/// Also clears any inherited ignore disposition, which would otherwise
/// break `wait` in programs we spawn.
pub fn install_sigchld_reaper() -> Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(reap),
        SaFlags::SA_NOCLDSTOP | SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    unsafe {
        signal::sigaction(Signal::SIGCHLD, &action)?;
    }
    // Collect anything that exited before the handler was in place.
    unsafe {
        while libc::waitpid(-1, std::ptr::null_mut(), libc::WNOHANG) > 0 {}
    }
    Ok(())
}
