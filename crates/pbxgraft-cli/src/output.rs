use std::io::{self, IsTerminal, Write};
use std::sync::OnceLock;

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

static JSON_MODE: OnceLock<bool> = OnceLock::new();

pub fn init(json: bool) {
    let _ = JSON_MODE.set(json);
}

pub fn is_json() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}

pub fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    println!("{s}");
    Ok(())
}

pub fn stdout() -> StandardStream {
    let choice = if io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

fn tagged(tag: &str, color: Color, msg: &str) {
    let mut out = stdout();
    let _ = out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = write!(out, "{tag}");
    let _ = out.reset();
    let _ = writeln!(out, " {msg}");
}

pub fn success(msg: &str) {
    tagged("created", Color::Green, msg);
}

pub fn note(msg: &str) {
    tagged("note", Color::Cyan, msg);
}

pub fn warn(msg: &str) {
    tagged("warning", Color::Yellow, msg);
}

pub fn line(msg: &str) {
    let _ = writeln!(stdout(), "{msg}");
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorOut<'a> {
    ok: bool,
    error: String,
    causes: Vec<String>,
    exit_code: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<&'a str>,
}

/// Report a failed command, on stdout as JSON or on stderr as text.
pub fn failure(err: &anyhow::Error, exit_code: u8, hint: Option<&str>) {
    if is_json() {
        let out = ErrorOut {
            ok: false,
            error: err.to_string(),
            causes: err.chain().skip(1).map(|c| c.to_string()).collect(),
            exit_code,
            hint,
        };
        if print(&out).is_ok() {
            return;
        }
    }
    let mut e = StandardStream::stderr(if io::stderr().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    });
    let _ = e.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = write!(e, "error:");
    let _ = e.reset();
    let _ = writeln!(e, " {err:#}");
    if let Some(hint) = hint {
        let _ = writeln!(e, "  hint: {hint}");
    }
}
