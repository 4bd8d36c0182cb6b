//! User-facing console output for the diagnostic binary.
//! Colors are enabled only when stdout is a TTY.

use owo_colors::OwoColorize;

fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

#[derive(Clone, Copy)]
enum Tag {
    Info,
    Warn,
    Error,
    Ok,
}

impl Tag {
    fn label(self) -> &'static str {
        match self {
            Tag::Info => "info:",
            Tag::Warn => "warn:",
            Tag::Error => "error:",
            Tag::Ok => "ok:",
        }
    }

    fn render(self, color: bool) -> String {
        if !color {
            return self.label().to_string();
        }
        match self {
            Tag::Info => self.label().cyan().bold().to_string(),
            Tag::Warn => self.label().yellow().bold().to_string(),
            Tag::Error => self.label().red().bold().to_string(),
            Tag::Ok => self.label().green().bold().to_string(),
        }
    }
}

fn emit(tag: Tag, msg: &str) {
    let line = format!("{} {}", tag.render(is_tty()), msg);
    match tag {
        Tag::Info | Tag::Ok => println!("{line}"),
        Tag::Warn | Tag::Error => eprintln!("{line}"),
    }
}

pub fn print_info(msg: &str) {
    emit(Tag::Info, msg);
}

pub fn print_warn(msg: &str) {
    emit(Tag::Warn, msg);
}

pub fn print_error(msg: &str) {
    emit(Tag::Error, msg);
}

pub fn print_success(msg: &str) {
    emit(Tag::Ok, msg);
}

/// Primary result line, unprefixed so scripts can consume it.
pub fn print_user(msg: &str) {
    println!("{msg}");
}

/// Section title for multi-part reports (drive info, descriptors).
pub fn print_heading(title: &str) {
    if is_tty() {
        println!("{}", title.bold().underline());
    } else {
        println!("{title}");
    }
}

/// Indented `label: value` line.
pub fn print_field(label: &str, value: impl std::fmt::Display) {
    if is_tty() {
        println!("  {:<22} {}", format!("{label}:").dimmed(), value);
    } else {
        println!("  {:<22} {}", format!("{label}:"), value);
    }
}
