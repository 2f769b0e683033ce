use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn banner(title: &str, subtitle: &str) {
    println!("{} {}", Icons::BOWL, title.style(theme().title.clone()));
    if !subtitle.is_empty() {
        println!("   {}", subtitle.style(theme().faint.clone()));
    }
}

pub fn header(text: &str) {
    println!("{} {}", Icons::STATS, text.style(theme().title.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().ok.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().failure.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().caution.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().label.clone()),
        label.style(theme().faint.clone()),
        value
    );
}

pub fn section(title: &str) {
    println!();
    println!("━ {} ━", title.style(theme().title.clone()));
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().faint.clone()), value);
}
