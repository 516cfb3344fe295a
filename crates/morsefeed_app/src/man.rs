//! Roff source for `man 1 morsefeed`, rendered from the clap definition so the
//! page and `--help` list the same options.

use std::fmt::Write;

use clap::{Arg, Command};

const DESCRIPTION: &str = "\
Converts text and web pages for Morse code practice. Text can come from a file, \
standard input or a URL. Most punctuation and special characters are spelled out \
or removed, and HTML tags are filtered out of web pages. Output goes to a file, \
standard output, or directly to the mbeep player.";

const PLAYBACK: &str = "\
While mbeep is playing, type space to pause or resume, n to skip to the next \
linked page and q to quit. With \\fB\\-p\\fR the file position is saved on quit \
and playback resumes from there next time.";

pub fn render(command: &mut Command) -> String {
    command.build();
    let name = command.get_name().to_string();
    let mut page = String::new();

    let _ = writeln!(page, ".TH {name} 1");
    let _ = writeln!(page, ".SH NAME");
    match command.get_about() {
        Some(about) => {
            let _ = writeln!(page, "{name} \\- {}", escape(&about.to_string()));
        }
        None => {
            let _ = writeln!(page, "{name}");
        }
    }
    let _ = writeln!(page, ".SH SYNOPSIS");
    let _ = writeln!(page, "\\fB{name}\\fR [\\fIOPTIONS\\fR]");
    let _ = writeln!(page, ".SH DESCRIPTION");
    let _ = writeln!(page, "{DESCRIPTION}");
    let _ = writeln!(page, ".SH OPTIONS");
    for arg in command.get_arguments().filter(|arg| !arg.is_hide_set()) {
        let _ = writeln!(page, ".TP");
        let _ = writeln!(page, "{}", option_heading(arg));
        if let Some(help) = arg.get_help() {
            let _ = writeln!(page, "{}", escape(&help.to_string()));
        }
    }
    let _ = writeln!(page, ".SH PLAYBACK");
    let _ = writeln!(page, "{PLAYBACK}");
    let _ = writeln!(page, ".SH FILES");
    let _ = writeln!(page, ".TP");
    let _ = writeln!(page, ".I ~/.morsefeed");
    let _ = writeln!(page, "Saved file positions and option sets.");
    page
}

fn option_heading(arg: &Arg) -> String {
    let mut names = Vec::new();
    if let Some(short) = arg.get_short() {
        names.push(format!("\\fB\\-{short}\\fR"));
    }
    if let Some(long) = arg.get_long() {
        names.push(format!("\\fB\\-\\-{}\\fR", escape(long)));
    }
    let mut heading = names.join(", ");
    if let Some(values) = arg.get_value_names() {
        for value in values {
            let _ = write!(heading, " \\fI{value}\\fR");
        }
    }
    heading
}

fn escape(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('-', "\\-");
    if escaped.starts_with('.') || escaped.starts_with('\'') {
        format!("\\&{escaped}")
    } else {
        escaped
    }
}
