//! `homeval interactive` -- a line-oriented form over stdin.
//!
//! Each line is one command:
//!
//! ```text
//! sqft <n>        set square footage (empty means 0)
//! bedrooms <n>    set bedrooms (empty means 0)
//! submit          validate and request an estimate
//! history         show the prediction history
//! reload          retry a failed history load
//! show            show the form
//! help            list commands
//! quit            leave
//! ```

use std::io::{BufRead, Write};

use homeval_session::Session;
use time::OffsetDateTime;

use crate::render;
use crate::OutputFormat;

const HELP: &str = "commands: sqft <n>, bedrooms <n>, submit, history, reload, show, help, quit";

#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    SquareFootage(f64),
    Bedrooms(u32),
    Submit,
    History,
    Reload,
    Show,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, arg) = match line.split_once(char::is_whitespace) {
        Some((word, arg)) => (word, arg.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "sqft" | "square-footage" => Command::SquareFootage(parse_number(arg)?),
        "bedrooms" | "beds" => Command::Bedrooms(parse_count(arg)?),
        "submit" => Command::Submit,
        "history" => Command::History,
        "reload" => Command::Reload,
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{}' ({})", other, HELP)),
    };
    Ok(Some(command))
}

fn parse_number(arg: &str) -> Result<f64, String> {
    if arg.is_empty() {
        return Ok(0.0);
    }
    match arg.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(format!("'{}' is not a number", arg)),
    }
}

fn parse_count(arg: &str) -> Result<u32, String> {
    if arg.is_empty() {
        return Ok(0);
    }
    arg.parse::<u32>()
        .map_err(|_| format!("'{}' is not a whole number", arg))
}

/// Run commands from `input` against `session` until `quit` or end of input.
pub(crate) async fn drive<R, W>(
    session: &Session,
    input: R,
    mut out: W,
    output: OutputFormat,
) -> Result<(), String>
where
    R: BufRead,
    W: Write,
{
    let text = output == OutputFormat::Text;
    let io_err = |e: std::io::Error| format!("error writing output: {}", e);

    if text {
        writeln!(out, "{}", HELP).map_err(io_err)?;
    }

    for line in input.lines() {
        let line = line.map_err(|e| format!("error reading input: {}", e))?;
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(msg) => {
                writeln!(out, "{}", msg).map_err(io_err)?;
                continue;
            }
        };

        let reply = match command {
            Command::SquareFootage(n) => {
                session.set_square_footage(n);
                None
            }
            Command::Bedrooms(n) => {
                session.set_bedrooms(n);
                None
            }
            Command::Submit => {
                let outcome = session.submit().await;
                Some(if text {
                    render::outcome(&outcome)
                } else {
                    render::outcome_json(&outcome, &session.snapshot()).to_string()
                })
            }
            Command::History => Some(if text {
                render::history(&session.snapshot(), OffsetDateTime::now_utc())
            } else {
                serde_json::json!({
                    "history": session.snapshot().history,
                    "historyStatus": session.history_status(),
                })
                .to_string()
            }),
            Command::Reload => Some(match session.retry_history().await {
                Ok(_) if text => render::history(&session.snapshot(), OffsetDateTime::now_utc()),
                Ok(status) => serde_json::json!({ "historyStatus": status }).to_string(),
                Err(e) => e.to_string(),
            }),
            Command::Show => Some(if text {
                render::form(&session.snapshot().form)
            } else {
                serde_json::json!(session.snapshot().form).to_string()
            }),
            Command::Help => Some(HELP.to_string()),
            Command::Quit => break,
        };

        if let Some(reply) = reply {
            writeln!(out, "{}", reply).map_err(io_err)?;
        }
    }

    session.close();
    Ok(())
}
