//! Command-line parsing, kept apart from `main.rs` for testability.

use std::path::PathBuf;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Args {
    pub config: Option<PathBuf>,
    pub once: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Run(Args),
    Help(String),
}

fn usage(prog: &str) -> String {
    format!("Usage: {prog} [--config PATH|-c PATH] [--once]")
}

/// `Err` carries a message for stderr; the caller exits with status 2.
pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Command, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "nodeinfo_agent".into());
    let mut out = Args::default();

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help(usage(&prog))),
            "--config" | "-c" => match it.next() {
                Some(p) if !p.is_empty() => out.config = Some(PathBuf::from(p)),
                _ => return Err(format!("--config needs a path. {}", usage(&prog))),
            },
            "--once" => out.once = true,
            _ if arg.starts_with("--config=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    if v.is_empty() {
                        return Err(format!("--config needs a path. {}", usage(&prog)));
                    }
                    out.config = Some(PathBuf::from(v));
                }
            }
            _ => return Err(format!("Unexpected argument {arg:?}. {}", usage(&prog))),
        }
    }
    Ok(Command::Run(out))
}
