use clap_complete::Shell;

use super::CmdResult;

pub fn run(shell: Shell, cmd: &mut clap::Command) -> CmdResult {
    clap_complete::generate(shell, cmd, "sleeplog", &mut std::io::stdout());
    Ok(())
}
