use crate::cli::args::CliArgs;
use crate::criteria::{DateRange, SortDirection};
use crate::output::OutputFormat;
use crate::pagination::PagingMode;
use crate::resource::ResourceKind;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.resource.as_deref() {
        raw.parse::<ResourceKind>()?;
    }
    if let Some(limit) = args.limit {
        crate::utils::parse_page_size(limit)
            .map_err(|e| format!("invalid --limit '{limit}': {e}"))?;
    }
    if let Some(page) = args.page {
        if page == 0 {
            return Err("invalid --page, expected positive integer".to_string());
        }
    }
    if let Some(raw) = args.paging.as_deref() {
        raw.parse::<PagingMode>()
            .map_err(|e| format!("invalid --paging: {e}"))?;
    }
    if let Some(raw) = args.sort_order.as_deref() {
        if SortDirection::parse(raw).is_none() {
            return Err(format!("invalid --sort-order '{raw}', expected asc or desc"));
        }
    }
    if let Some(raw) = args.format.as_deref() {
        if OutputFormat::parse(raw).is_none() {
            return Err(format!("invalid --format '{raw}', expected text or json"));
        }
    }
    crate::utils::parse_filter_pairs(&args.filter).map_err(|e| format!("invalid --filter {e}"))?;

    let start = crate::utils::parse_optional_date(args.start_date.as_deref())
        .map_err(|e| format!("invalid --start-date: {e}"))?;
    let end = crate::utils::parse_optional_date(args.end_date.as_deref())
        .map_err(|e| format!("invalid --end-date: {e}"))?;
    if !DateRange::new(start, end).is_ordered() {
        return Err("--start-date must not be after --end-date".to_string());
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid --timeout, expected positive integer".to_string());
        }
    }
    Ok(())
}
