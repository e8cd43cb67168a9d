use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::client::SlipBackend;
use crate::presentation::intent::{Intent, HELP};
use crate::presentation::view::ViewModel;
use crate::workflow::{ResolveOutcome, SubmitOutcome, WorkflowSession};

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Run an interactive session until `quit` or end of input
pub async fn run_session<B, R, W>(session: &mut WorkflowSession<B>, input: R, out: &mut W) -> Result<()>
where
    B: SlipBackend,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    write!(out, "{}", view(session).render())?;
    writeln!(out, "Type 'help' for commands.")?;

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let intent = match line.parse::<Intent>() {
            Ok(intent) => intent,
            Err(e) => {
                writeln!(out, "{e}")?;
                continue;
            }
        };
        debug!(intent = ?intent, "Handling intent");

        if handle_intent(session, intent, out).await? == Flow::Quit {
            break;
        }
    }

    writeln!(out, "Bye.")?;
    Ok(())
}

fn view<B: SlipBackend>(session: &WorkflowSession<B>) -> ViewModel {
    ViewModel::from_state(session.state(), session.previews())
}

async fn handle_intent<B, W>(session: &mut WorkflowSession<B>, intent: Intent, out: &mut W) -> Result<Flow>
where
    B: SlipBackend,
    W: Write,
{
    match intent {
        Intent::SetIdentifier(text) => session.set_identifier(text)?,
        Intent::Clear => session.set_identifier("")?,
        Intent::Validate => {
            if !view(session).validate_enabled {
                writeln!(out, "Validate Student ID is disabled: enter a student ID first.")?;
                return Ok(Flow::Continue);
            }
            match session.resolve().await {
                Ok(ResolveOutcome::Resolved { .. }) | Ok(ResolveOutcome::Discarded) => {}
                Ok(ResolveOutcome::Failed(_)) => {
                    writeln!(
                        out,
                        "Could not verify student ID {}.",
                        session.state().identifier()
                    )?;
                }
                Err(e) => writeln!(out, "{e}")?,
            }
        }
        Intent::Choose(path) => {
            if !view(session).choose_enabled {
                writeln!(out, "Choose Slip Image is disabled: validate a student ID first.")?;
                return Ok(Flow::Continue);
            }
            if let Err(e) = session.choose_image_file(&path).await {
                writeln!(out, "{e}")?;
            }
        }
        Intent::Upload => {
            if !view(session).submit_enabled {
                writeln!(out, "Upload Slip is disabled: choose a slip image first.")?;
                return Ok(Flow::Continue);
            }
            match session.submit().await {
                Ok(SubmitOutcome::Accepted(_)) => writeln!(out, "Slip uploaded.")?,
                Ok(SubmitOutcome::Failed(_)) => {}
                Err(e) => writeln!(out, "{e}")?,
            }
        }
        Intent::Show => {}
        Intent::History => {
            for record in session.history() {
                writeln!(
                    out,
                    "{} {} -> {} ({})",
                    record.at.format("%H:%M:%S"),
                    record.from,
                    record.to,
                    record.event
                )?;
            }
            return Ok(Flow::Continue);
        }
        Intent::Help => {
            writeln!(out, "{HELP}")?;
            return Ok(Flow::Continue);
        }
        Intent::Quit => return Ok(Flow::Quit),
    }

    for alert in session.take_alerts() {
        writeln!(out, "!! {alert}")?;
    }
    write!(out, "{}", view(session).render())?;
    Ok(Flow::Continue)
}
