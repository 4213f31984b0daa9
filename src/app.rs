use std::sync::Arc;
use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde_json::Value;
use tokio::io::AsyncWriteExt;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::criteria::{DateRange, SortDirection, DEFAULT_SORT_KEY};
use crate::fetcher::{
    CredentialProvider, EnvCredentials, HttpRecordService, NoCredentials, ServiceOptions,
};
use crate::notify::ConsoleSink;
use crate::output::{self, OutputFormat, PageReport};
use crate::pagination::{PageSize, PagingMode};
use crate::resource::ResourceKind;
use crate::utils;
use crate::view::{Applied, ListView, ViewOptions};

const DEFAULT_BASE_URL: &str = "http://localhost:5000/api/";

#[derive(Clone, Debug)]
struct RunConfig {
    resource: ResourceKind,
    base_url: String,
    timeout: usize,
    proxy: Option<String>,
    token_env: Option<String>,
    paging: PagingMode,
    page_size: PageSize,
    page: u32,
    search: Option<String>,
    filters: Vec<(String, String)>,
    date_range: DateRange,
    sort: Option<(String, SortDirection)>,
    format: OutputFormat,
    no_color: bool,
    log_level: String,
}

fn log_level(verbose: u8, configured: Option<String>) -> String {
    match verbose {
        0 => configured
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| "warn".to_string()),
        1 => "info".to_string(),
        _ => "debug".to_string(),
    }
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let resource = match args.resource.as_deref() {
        Some(raw) => raw.parse::<ResourceKind>()?,
        None => ResourceKind::Documents,
    };

    let base_url = args
        .base_url
        .or(cfg.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let timeout = args.timeout.or(cfg.timeout).unwrap_or(10);
    let proxy = args.proxy.or(cfg.proxy.clone()).filter(|p| !p.trim().is_empty());
    let token_env = args
        .token_env
        .or(cfg.token_env.clone())
        .filter(|v| !v.trim().is_empty());

    let limit = args.limit.or(cfg.page_size).unwrap_or(10);
    let page_size =
        utils::parse_page_size(limit).map_err(|e| format!("invalid page size '{limit}': {e}"))?;

    let paging = match args.paging.as_deref() {
        Some(raw) => raw.parse::<PagingMode>()?,
        None => cfg
            .paging_for(resource)?
            .unwrap_or_else(|| resource.default_paging()),
    };

    let format_raw = args
        .format
        .or(cfg.output_format.clone())
        .unwrap_or_else(|| "text".to_string());
    let format = OutputFormat::parse(&format_raw)
        .ok_or_else(|| format!("invalid output format '{format_raw}', expected text or json"))?;

    let filters = utils::parse_filter_pairs(&args.filter)?;
    let date_range = DateRange::new(
        utils::parse_optional_date(args.start_date.as_deref())?,
        utils::parse_optional_date(args.end_date.as_deref())?,
    );

    let sort = if args.sort_by.is_some() || args.sort_order.is_some() {
        let key = args
            .sort_by
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| DEFAULT_SORT_KEY.to_string());
        let direction = args
            .sort_order
            .as_deref()
            .and_then(SortDirection::parse)
            .unwrap_or_default();
        Some((key, direction))
    } else {
        None
    };

    Ok(RunConfig {
        resource,
        base_url,
        timeout,
        proxy,
        token_env,
        paging,
        page_size,
        page: args.page.unwrap_or(1),
        search: args.search.filter(|s| !s.trim().is_empty()),
        filters,
        date_range,
        sort,
        format,
        no_color: args.no_color || cfg.no_color.unwrap_or(false),
        log_level: log_level(args.verbose, cfg.log_level),
    })
}

fn new_spinner(resource: ResourceKind) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(format!("fetching {resource}..."));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }

    let credentials: Arc<dyn CredentialProvider> = match run.token_env.as_deref() {
        Some(var) => Arc::new(EnvCredentials::new(var)),
        None => Arc::new(NoCredentials),
    };
    let service = HttpRecordService::new(
        &ServiceOptions {
            base_url: run.base_url.clone(),
            timeout_seconds: run.timeout,
            proxy: run.proxy.clone(),
        },
        credentials,
    )
    .map_err(|e| e.to_string())?;

    let mut view: ListView<HttpRecordService, Value> = ListView::new(
        run.resource,
        Arc::new(service),
        Arc::new(ConsoleSink),
        ViewOptions {
            paging: run.paging,
            page_size: run.page_size,
        },
    );

    if let Some(search) = run.search.as_deref() {
        view.set_search(search);
    }
    for (key, value) in run.filters.iter() {
        if !run.resource.filter_keys().contains(&key.as_str()) {
            log::warn!("'{key}' is not a known {} filter, sending it anyway", run.resource);
        }
        view.set_field_filter(key, value);
    }
    if !run.date_range.is_empty() {
        view.set_date_range(run.date_range);
    }
    if let Some((key, direction)) = run.sort.as_ref() {
        view.set_sort(key, *direction);
    }
    log::info!(
        "{} with {} active filter(s), {:?} paging, {} per page",
        run.resource,
        view.criteria().active_filter_count(),
        view.pager().mode(),
        view.pager().page_size()
    );

    let pb = new_spinner(run.resource);
    let mut applied = view.refresh().await;
    if applied == Applied::Updated && run.page > 1 {
        if !view.go_to_page(run.page) {
            pb.finish_and_clear();
            return Err(format!(
                "page {} is out of range (1-{})",
                run.page,
                view.pager().total_pages().max(1)
            ));
        }
        if let Some(again) = view.sync().await {
            applied = again;
        }
    }
    pb.finish_and_clear();

    if applied == Applied::Failed {
        return Err(format!("could not list {}", run.resource));
    }

    let report = PageReport {
        resource: run.resource,
        items: view.visible_items().to_vec(),
        pagination: view.page_result(),
        showing: view.pager().range_label(),
        pages: view.page_buttons(),
    };
    let rendered = output::render(&report, run.format);
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(&rendered)
        .await
        .map_err(|e| format!("failed to write output: {e}"))?;
    stdout
        .flush()
        .await
        .map_err(|e| format!("failed to write output: {e}"))?;
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    let user_config_path = args.config.clone().map(|p| config::expand_tilde(&p));
    let config_path = user_config_path.clone().or_else(config::default_config_path);

    if args.init_config {
        let path = config_path.ok_or_else(|| "could not determine config path".to_string())?;
        config::ensure_default_config_file(&path)?;
        println!(":: Config    : {}", path.display());
        return Ok(());
    }

    let cfg = match (user_config_path.as_ref(), config_path.as_ref()) {
        (Some(path), _) => config::load_config(path, false)?,
        (None, Some(path)) => config::load_config(path, true)?,
        (None, None) => ConfigFile::default(),
    };

    let run = build_run_config(args, cfg)?;

    let _logger = flexi_logger::Logger::try_with_env_or_str(&run.log_level)
        .map_err(|e| format!("invalid log level '{}': {e}", run.log_level))?
        .start()
        .map_err(|e| format!("failed to start logger: {e}"))?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
