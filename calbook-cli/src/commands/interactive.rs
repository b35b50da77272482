use anyhow::Result;
use dialoguer::Input;
use owo_colors::OwoColorize;

use crate::command::Command;
use crate::render::Render;
use crate::session::{Reply, Session};

/// Prompt for commands until `exit`. A failing command prints its error and
/// the prompt comes back.
pub fn run(session: &mut Session) -> Result<()> {
    println!(
        "{}",
        format!(
            "calbook: calendars {}. Type a command, or exit to quit",
            session.registry().names().join(", ")
        )
        .dimmed()
    );

    loop {
        let line: String = Input::new()
            .with_prompt(session.active_name().cyan().to_string())
            .interact_text()?;

        match Command::parse(&line).and_then(|command| session.execute(command)) {
            Ok(Reply::Exit) => return Ok(()),
            Ok(reply) => println!("{}", reply.render()),
            Err(e) => eprintln!("  {}", format!("{:#}", e).red()),
        }
    }
}
