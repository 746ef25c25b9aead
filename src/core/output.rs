//! Output formatting shared by every command.
//!
//! Errors are red, the command about to run is blue, secondary detail is
//! bright_black. Each block is separated from the shell prompt by a blank line.

use crate::core::classifier::BranchKind;
use crate::core::sync::UiStateSnapshot;
use colored::*;

/// ```text
///
/// ✕ Error: <message>
///
/// ```
pub fn print_error(message: &str) {
    eprintln!("\n{} {}\n", "✕ Error:".red(), message.white());
}

/// ```text
///
/// ✓ <message>
/// ```
pub fn print_success(message: &str) {
    println!("\n{} {}", "✓".green(), message.white());
}

pub fn print_info(message: &str) {
    println!("\n{}\n", message.white());
}

pub fn print_section_header(header: &str) {
    println!("\n{}:\n", header.white());
}

/// Echo a command line before it runs.
pub fn print_command(command_line: &str) {
    println!("{} {}", "$".bright_black(), command_line.blue());
}

/// Output captured from the workflow tool, dimmed and indented.
pub fn print_tool_output(text: &str) {
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        println!("  {}", line.bright_black());
    }
}

pub fn format_kind(kind: &BranchKind) -> ColoredString {
    match kind {
        BranchKind::Topic(name) => name.green(),
        BranchKind::Base(name) => name.blue(),
        BranchKind::Unknown => "unknown".bright_black(),
    }
}

/// Current branch and every flag, one per line.
pub fn print_snapshot(snapshot: &UiStateSnapshot) {
    print_section_header("Branch state");

    let branch = if snapshot.current.full_ref_name.is_empty() {
        "(none)".to_string()
    } else {
        snapshot.current.full_ref_name.clone()
    };
    println!(
        "{} {} {}{}{}",
        "Current:".white(),
        branch.blue(),
        "(".bright_black(),
        format_kind(snapshot.current_kind()),
        ")".bright_black()
    );
    println!();

    let flags = snapshot.flags();
    let width = flags.keys().map(String::len).max().unwrap_or(0);
    for (name, value) in &flags {
        let value = if *value {
            "true".green()
        } else {
            "false".bright_black()
        };
        println!("  {:<width$}  {}", name, value, width = width);
    }
    println!();
}
