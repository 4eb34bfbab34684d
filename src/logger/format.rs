//! Log formatting and console output with ANSI colors
//!
//! Handles:
//! - Colorized tag and level columns
//! - Local-time prefix
//! - Broken pipe handling for piped commands

use super::config::get_logger_config;
use super::levels::LogLevel;
use super::tags::LogTag;
use chrono::Local;
use colored::*;
use std::io::{stdout, ErrorKind, Write};

/// Log format widths for alignment
const TAG_WIDTH: usize = 10;
const LEVEL_WIDTH: usize = 7;

pub fn format_and_log(tag: LogTag, level: LogLevel, message: &str) {
    let time = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let line = if get_logger_config().use_colors {
        format!(
            "{} [{}] [{}] {}",
            time.dimmed(),
            format_tag(&tag),
            format_level(level),
            message
        )
    } else {
        format!(
            "{} [{:<tw$}] [{:<lw$}] {}",
            time,
            tag.to_plain_string(),
            level.as_str(),
            message,
            tw = TAG_WIDTH,
            lw = LEVEL_WIDTH
        )
    };

    print_stdout_safe(&line);
}

fn format_tag(tag: &LogTag) -> ColoredString {
    let label = format!("{:<width$}", tag.to_plain_string(), width = TAG_WIDTH);
    match tag {
        LogTag::System => label.bright_yellow().bold(),
        LogTag::Config => label.bright_white().bold(),
        LogTag::Cache => label.bright_cyan().bold(),
        LogTag::Store => label.bright_blue().bold(),
        LogTag::Filter => label.bright_magenta().bold(),
        LogTag::Webserver => label.bright_green().bold(),
        LogTag::Deps => label.dimmed(),
    }
}

fn format_level(level: LogLevel) -> ColoredString {
    let label = format!("{:<width$}", level.as_str(), width = LEVEL_WIDTH);
    match level {
        LogLevel::Error => label.bright_red().bold(),
        LogLevel::Warning => label.bright_yellow(),
        LogLevel::Info => label.normal(),
        LogLevel::Debug => label.cyan(),
        LogLevel::Verbose => label.dimmed(),
    }
}

/// Print to stdout, swallowing broken pipe errors (e.g. `minestats | head`)
fn print_stdout_safe(line: &str) {
    let mut out = stdout().lock();
    if let Err(e) = writeln!(out, "{}", line) {
        if e.kind() != ErrorKind::BrokenPipe {
            eprintln!("logger: failed to write to stdout: {}", e);
        }
    }
}
