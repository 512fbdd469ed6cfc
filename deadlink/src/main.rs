use colored::Colorize;
use deadlink::commands::command_argument_builder;
use deadlink::handlers::{EXIT_ERROR, handle_crawl, handle_invoke, init_logging};
use deadlink_core::print_banner;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    init_logging(quiet);

    // invoke prints a JSON response on stdout, keep it clean
    if !quiet && chosen_command.subcommand_name() != Some("invoke") {
        print_banner();
    }

    let outcome = match chosen_command.subcommand() {
        Some(("crawl", primary_command)) => handle_crawl(primary_command, quiet).await,
        Some(("invoke", primary_command)) => handle_invoke(primary_command).await,
        None => {
            // No subcommand provided, just show the banner
            return;
        }
        _ => unreachable!("clap should ensure we don't get here"),
    };

    match outcome {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            std::process::exit(EXIT_ERROR);
        }
    }
}
