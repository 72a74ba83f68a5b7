use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use comfy_table::{Cell, CellAlignment, Table};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, info_span};

use aou_cli::config::SiteConfig;
use aou_cli::logging::redact_value;
use aou_cli::notify::{Notifier, RefreshStatus};
use aou_cli::refresh::{
    count_with_retention_date, output_sinks, today, transform_records, write_outputs,
};
use aou_ingest::{ApiClient, ApiSpec, PageProgress, fetch_all, records_from_json};
use aou_model::PMI_ID_COLUMN;
use aou_load::{Comparison, CsvSink, RecordSink, SqlScriptSink, TableName, compare, read_export};
use aou_transform::{ACTIVE_RETENTION_DATE, Catalog, PolicyVersion};

use crate::cli::{CompareArgs, RefreshArgs, TransformArgs};
use crate::summary::apply_table_style;
use crate::types::RunReport;

/// Runs a refresh, emailing its outcome when the site config asks for it.
///
/// Dry runs send no email. A failed send is logged and does not change the
/// refresh result.
pub fn run_refresh(args: &RefreshArgs) -> Result<RunReport> {
    let config = SiteConfig::load(&args.site_config)?;
    let notifier = match config.email()? {
        Some(settings) if !args.dry_run => Some(Notifier::smtp(&settings)),
        _ => None,
    };

    let result = refresh(&config, args);
    if let Some(notifier) = &notifier {
        let status = if result.is_ok() {
            RefreshStatus::Succeeded
        } else {
            RefreshStatus::Failed
        };
        notifier.notify_or_warn(status, today());
    }
    result
}

fn refresh(config: &SiteConfig, args: &RefreshArgs) -> Result<RunReport> {
    let started = Instant::now();
    let spec = ApiSpec::load(&args.api_spec)?;
    let table = config.table_name()?;
    let policy = config.retention_policy.policy();
    let as_of = args.as_of.unwrap_or_else(today);

    let span = info_span!("refresh", table = %table, awardee = %spec.awardee, %as_of);
    let _guard = span.enter();

    let url = spec.query().filters(config.filters()).first_page_url(&spec.base_url)?;
    let client = ApiClient::from_spec(&spec)?;

    let spinner = fetch_spinner();
    let fetch_start = Instant::now();
    let raw = fetch_all(&client, url.as_str(), args.maxrows, |progress: PageProgress| {
        spinner.set_message(format!(
            "page {} ({} records)",
            progress.page, progress.total_records
        ));
    });
    spinner.finish_and_clear();
    let raw = raw.context("fetch participant summaries")?;
    info!(
        records = raw.len(),
        duration_ms = fetch_start.elapsed().as_millis(),
        "fetch complete"
    );

    let records = transform_records(&raw, policy, as_of)?;
    let with_retention_date = count_with_retention_date(&records);

    let mut outputs = Vec::new();
    let mut job = None;
    if args.dry_run {
        info!("dry run; skipping load and job");
    } else {
        let mut sinks = output_sinks(config.load_format, &config.output_dir, &table);
        outputs = write_outputs(&mut sinks, &table, &records)?;
        if let Some(runner) = config.job_runner() {
            let outcome = runner
                .run()
                .with_context(|| format!("post-load job '{}'", runner.name()))?;
            job = Some(outcome);
        }
    }

    Ok(RunReport {
        target: table.to_string(),
        source: None,
        as_of,
        policy: policy.version(),
        fetched: raw.len(),
        transformed: records.len(),
        with_retention_date,
        outputs,
        job,
        dry_run: args.dry_run,
        elapsed: started.elapsed(),
    })
}

pub fn run_transform(args: &TransformArgs) -> Result<RunReport> {
    let started = Instant::now();
    let policy_version = PolicyVersion::from(args.policy);
    let as_of = args.as_of.unwrap_or_else(today);
    let table = TableName::parse(&args.table).context("--table")?;

    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("read input: {}", args.input.display()))?;
    let raw = records_from_json(&text)
        .with_context(|| format!("parse input: {}", args.input.display()))?;
    info!(records = raw.len(), input = %args.input.display(), "loaded saved records");

    let records = transform_records(&raw, policy_version.policy(), as_of)?;
    if let Some(first) = records.first() {
        tracing::trace!(
            participant = redact_value(first.get(PMI_ID_COLUMN).unwrap_or("")),
            retention_date = first.get(ACTIVE_RETENTION_DATE).unwrap_or(""),
            "first transformed record"
        );
    }

    let mut sinks: Vec<Box<dyn RecordSink>> = vec![Box::new(CsvSink::new(&args.output))];
    if let Some(sql) = &args.sql {
        sinks.push(Box::new(
            SqlScriptSink::new(sql).ensure_columns([ACTIVE_RETENTION_DATE]),
        ));
    }
    let outputs = write_outputs(&mut sinks, &table, &records)?;

    Ok(RunReport {
        target: table.to_string(),
        source: Some(args.input.clone()),
        as_of,
        policy: policy_version,
        fetched: raw.len(),
        transformed: records.len(),
        with_retention_date: count_with_retention_date(&records),
        outputs,
        job: None,
        dry_run: false,
        elapsed: started.elapsed(),
    })
}

pub fn run_columns() -> Result<()> {
    let catalog = Catalog::healthpro();
    catalog.validate()?;
    let mut table = Table::new();
    table.set_header(vec!["#", "Column", "Source", "Codec"]);
    apply_table_style(&mut table);
    if let Some(column) = table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }

    let rules = catalog.rules();
    for (index, column) in catalog.output_columns().into_iter().enumerate() {
        let (source, codec) = match rules.iter().find(|rule| rule.target == column) {
            Some(rule) => (rule.source.to_string(), rule.codec.name()),
            None => (derived_source(catalog, column), "derived"),
        };
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(column),
            Cell::new(source),
            Cell::new(codec),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn derived_source(catalog: &Catalog, column: &str) -> String {
    catalog
        .groups()
        .iter()
        .find(|group| group.status_target == column || group.time_target == column)
        .map(|group| {
            group
                .sources
                .iter()
                .map(|(status, _)| *status)
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .unwrap_or_else(|| "-".to_string())
}

pub fn run_compare(args: &CompareArgs) -> Result<Comparison> {
    let left = read_export(&args.left)?;
    let right = read_export(&args.right)?;
    let comparison = compare(&left, &right);
    info!(
        matched = comparison.matched,
        differing = comparison.differing.len(),
        only_left = comparison.only_left.len(),
        only_right = comparison.only_right.len(),
        "comparison complete"
    );
    Ok(comparison)
}

fn fetch_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} fetching participant summaries: {msg}")
    {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}
