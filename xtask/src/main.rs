use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for crowdwalk")]
struct Cli {
    #[command(subcommand)]
    command: Task,
}

#[derive(Subcommand, Clone, Copy)]
enum Task {
    /// fmt, clippy, tests and docs, then a headless smoke run
    Ci,
    /// cargo fmt --check
    Fmt,
    /// cargo clippy with warnings denied
    Clippy,
    /// cargo test for the whole workspace
    Test,
    /// cargo doc without dependencies
    Doc,
    /// Run the sample headless for a few seconds with debug geometry on
    Smoke,
}

impl Task {
    fn cargo_args(self) -> &'static [&'static str] {
        match self {
            Task::Ci => &[],
            Task::Fmt => &["fmt", "--all", "--", "--check"],
            Task::Clippy => &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
            Task::Test => &["test", "--workspace"],
            Task::Doc => &["doc", "--workspace", "--no-deps"],
            Task::Smoke => &[
                "run", "-q", "-p", "crowdwalk-cli", "--", "--seed", "1", "run", "--frames",
                "300", "--debug",
            ],
        }
    }

    fn run(self) -> Result<()> {
        if let Task::Ci = self {
            for task in [Task::Fmt, Task::Clippy, Task::Test, Task::Doc, Task::Smoke] {
                task.run()?;
            }
            return Ok(());
        }

        let args = self.cargo_args();
        println!("==> cargo {}", args.join(" "));
        let status = Command::new("cargo").args(args).status()?;
        if !status.success() {
            anyhow::bail!("cargo {} failed", args[0]);
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    Cli::parse().command.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_runs_the_cli_with_debug_geometry() {
        let args = Task::Smoke.cargo_args();
        assert!(args.contains(&"crowdwalk-cli"));
        assert_eq!(args.last(), Some(&"--debug"));
    }
}
