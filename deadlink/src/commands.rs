use clap::{arg, command};
use url::Url;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("deadlink")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("deadlink")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner, progress and non-essential output")
                .required(false)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl a site from a start URL and report every link that returns an error \
                or cannot be reached.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The URL to start crawling from")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(-e --"exclude" <PATTERN>)
                        .required(false)
                        .help("Skip URLs containing this text (repeatable)")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(-m --"max-pages" <NUM>)
                        .required(false)
                        .help("Stop scheduling new batches once this many pages were visited")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("100"),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("How many URLs are fetched concurrently in one batch")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"deadline" <SECONDS>)
                        .required(false)
                        .help("Stop scheduling new batches after this many seconds")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--"referrers" <MODE>)
                        .required(false)
                        .help(
                            "How referring pages are listed: 'inbound' (pages linking to the URL) \
                        or 'visited' (first pages visited in the crawl)",
                        )
                        .value_parser(["inbound", "visited"])
                        .default_value("inbound"),
                )
                .arg(
                    arg!(-o --"output-dir" <PATH>)
                        .required(false)
                        .help("Directory the HTML report and JSON data are written to")
                        .default_value("reports"),
                )
                .arg(
                    arg!(--"no-save")
                        .required(false)
                        .help("Do not write report files")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Print the report to stdout in this format instead of the summary")
                        .value_parser(["text", "json", "csv", "html", "markdown", "md"]),
                ),
        )
        .subcommand(
            command!("invoke")
                .about(
                    "Run one crawl from a JSON event, falling back to START_URL, \
                EXCLUDE_PATTERNS, MAX_PAGES, CONCURRENCY and REPORT_DESTINATION.",
                )
                .arg(
                    arg!(-e --"event" <PATH>)
                        .required(false)
                        .help("Path to the JSON event file ('-' or omitted reads stdin)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
}
