//! Terminal styling helpers

use colored::*;

pub fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
pub fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
pub fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
pub fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }
pub fn warn(s: &str) -> ColoredString   { s.truecolor(230, 190, 90) }

const W: usize = 58; // box inner width

pub fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
pub fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
pub fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

pub fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {} {}{}{}", dim("│"), content, " ".repeat(pad.saturating_sub(2)), dim("│"));
}

pub fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len + 2);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {} {}{}{}{}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

pub fn line_box_empty() { line_box(""); }

/// Drop ANSI color escapes
pub fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

pub fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

pub fn kv(key: &str, val: &str) {
    println!("  {:<18} {}", muted(key), val.white());
}

pub fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

pub fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

pub fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

/// Wrap `text` to lines of at most `width` characters
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
