use std::process::Command;

use insta_cmd::get_cargo_bin;

pub fn run_cli() -> Command {
    let mut cmd = Command::new(get_cargo_bin("sqlrun"));
    cmd.env_remove("DATABASE_URL")
        .env_remove("SQLRUN_LOG")
        .env("NO_COLOR", "1");
    cmd
}
