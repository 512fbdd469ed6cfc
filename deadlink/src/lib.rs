pub mod commands;

// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    EXIT_BROKEN_LINKS, EXIT_CLEAN, EXIT_ERROR, crawl_config_from_args, handle_crawl,
    handle_invoke, init_logging, parse_event,
};

// Re-export crawl functionality from deadlink-core
pub use deadlink_core::crawl::{
    CrawlOptions, CrawlProgressCallback, execute_crawl, extract_url_path, generate_crawl_summary,
};
