use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "listwise",
    version,
    about = "filtered, sorted and paginated listings from a record service",
    long_about = "listwise fetches one page of documents, projects, books or categories from a record-listing service, applying search, field filters, a date range and sorting.\n\nExamples:\n  listwise -r documents -s report\n  listwise -r books -f overdue=true --sort-by dueDate --sort-order asc\n  listwise -r documents --start-date 2024-01-01 --end-date 2024-03-31 -p 2 -l 25\n\nTip: Use --config to persist the service URL and paging settings."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'r',
        long = "resource",
        value_name = "KIND",
        help_heading = "Input",
        help = "Resource to list: documents, projects, books or categories."
    )]
    pub resource: Option<String>,

    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.listwise/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write the default config file if it does not exist, then exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 's',
        long = "search",
        value_name = "TEXT",
        help_heading = "Filters",
        help = "Free-text search."
    )]
    pub search: Option<String>,

    #[arg(
        short = 'f',
        long = "filter",
        value_name = "KEY=VALUE",
        action = ArgAction::Append,
        help_heading = "Filters",
        help = "Field filter, e.g. category=3 or status=active (repeatable)."
    )]
    pub filter: Vec<String>,

    #[arg(
        long = "start-date",
        value_name = "YYYY-MM-DD",
        help_heading = "Filters",
        help = "Only records on or after this date."
    )]
    pub start_date: Option<String>,

    #[arg(
        long = "end-date",
        value_name = "YYYY-MM-DD",
        help_heading = "Filters",
        help = "Only records on or before this date."
    )]
    pub end_date: Option<String>,

    #[arg(
        long = "sort-by",
        value_name = "FIELD",
        help_heading = "Sorting",
        help = "Sort key (defaults to createdAt)."
    )]
    pub sort_by: Option<String>,

    #[arg(
        long = "sort-order",
        value_name = "ORDER",
        help_heading = "Sorting",
        help = "Sort direction: asc or desc (defaults to desc)."
    )]
    pub sort_order: Option<String>,

    #[arg(
        short = 'p',
        long = "page",
        value_name = "N",
        help_heading = "Paging",
        help = "Page to show (1-based)."
    )]
    pub page: Option<u32>,

    #[arg(
        short = 'l',
        long = "limit",
        value_name = "N",
        help_heading = "Paging",
        help = "Page size: 5, 10, 25 or 50."
    )]
    pub limit: Option<u32>,

    #[arg(
        long = "paging",
        value_name = "MODE",
        help_heading = "Paging",
        help = "Paging mode: local or delegated (overrides the resource default)."
    )]
    pub paging: Option<String>,

    #[arg(
        short = 'b',
        long = "base-url",
        value_name = "URL",
        help_heading = "Service",
        help = "Base URL of the record service."
    )]
    pub base_url: Option<String>,

    #[arg(
        long = "token-env",
        value_name = "VAR",
        help_heading = "Service",
        help = "Environment variable holding the bearer token."
    )]
    pub token_env: Option<String>,

    #[arg(
        short = 't',
        long = "timeout",
        value_name = "SECS",
        help_heading = "Service",
        help = "Request timeout in seconds."
    )]
    pub timeout: Option<usize>,

    #[arg(
        short = 'x',
        long = "proxy",
        value_name = "URL",
        help_heading = "Service",
        help = "HTTP proxy for all requests."
    )]
    pub proxy: Option<String>,

    #[arg(
        short = 'o',
        long = "format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format: text or json."
    )]
    pub format: Option<String>,

    #[arg(
        short = 'n',
        long = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,
}
