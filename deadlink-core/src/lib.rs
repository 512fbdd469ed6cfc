use colored::Colorize;

pub mod crawl;
pub mod invoke;
pub mod report;
pub mod storage;

pub fn print_banner() {
    println!(
        "{} {}",
        "deadlink".bright_red().bold(),
        env!("CARGO_PKG_VERSION").bright_black()
    );
    println!("{}", "find every broken link on a site".bright_black());
    println!();
}
