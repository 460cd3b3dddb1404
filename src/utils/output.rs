//! Terminal output for the `run` command: banner, config card, stage
//! spinners and status lines

use std::path::Path;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

const CARD_WIDTH: usize = 56;

pub fn print_banner(version: &str) {
    println!();
    println!(
        "    {} {}",
        style("qualprep").cyan().bold(),
        style(format!("v{}", version)).dim()
    );
    println!("    {}", style("Split, normalize and aggregate survey data").dim());
    println!();
}

/// Input, config and output paths followed by the stages that will run
pub fn print_config(input: &Path, config: &Path, output: &Path, stages: &[&str]) {
    let line = "─".repeat(CARD_WIDTH - 2);
    let width = CARD_WIDTH - 13;

    println!("    ┌{}┐", line);
    for (label, path) in [("Input", input), ("Config", config), ("Output", output)] {
        let shown = truncate_string(&path.display().to_string(), width - 1);
        println!("    │ {:<8} {:<width$}│", style(label).cyan(), shown, width = width);
    }
    println!("    ├{}┤", line);
    if stages.is_empty() {
        println!("    │ {:<52}│", style("no stages configured").yellow());
    }
    for (i, stage) in stages.iter().enumerate() {
        println!("    │ {}. {:<49}│", i + 1, truncate_string(stage, 48));
    }
    println!("    └{}┘", line);
}

pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {}",
        style(format!("[{}]", step_num)).cyan().bold(),
        style(title).bold()
    );
}

pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

pub fn print_info(message: &str) {
    println!("    {} {}", style("·").dim(), message);
}

pub fn print_warning(message: &str) {
    println!("    {} {}", style("!").yellow().bold(), style(message).yellow());
}

pub fn print_completion() {
    println!();
    println!("    {}", style("Preparation complete").green().bold());
    println!();
}

/// Spinner shown while a stage runs
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner) = ProgressStyle::default_spinner().template("    {spinner:.cyan} {msg}") {
        pb.set_style(spinner);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Stop a spinner, marking it done or done-with-warnings
pub fn finish_spinner(pb: &ProgressBar, message: &str, clean: bool) {
    let mark = if clean {
        style("✓").green().bold()
    } else {
        style("!").yellow().bold()
    };
    pb.finish_with_message(format!("{} {}", mark, message));
}

/// Keep the tail of `s`, which for paths is the part worth reading
fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_tail() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("/data/survey/2019.csv", 12), ".../2019.csv");
    }
}
