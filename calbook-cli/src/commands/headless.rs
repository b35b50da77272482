use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::command::Command;
use crate::render::Render;
use crate::session::{Reply, Session};

pub fn run(session: &mut Session, file: &Path) -> Result<()> {
    let script = std::fs::File::open(file)
        .with_context(|| format!("Could not open command file {}", file.display()))?;
    let stdout = std::io::stdout();
    run_script(session, std::io::BufReader::new(script), &mut stdout.lock())
}

/// Execute commands line by line until `exit`. Blank lines and lines
/// starting with `#` are skipped. The first failing command stops the run.
pub fn run_script(session: &mut Session, script: impl BufRead, out: &mut impl Write) -> Result<()> {
    for (i, line) in script.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let context = || format!("line {}: {}", i + 1, trimmed);
        let command = Command::parse(trimmed).with_context(context)?;
        let reply = session.execute(command).with_context(context)?;

        if reply == Reply::Exit {
            return Ok(());
        }
        writeln!(out, "{}", reply.render())?;
    }

    bail!("Command file ended without `exit`")
}
