//! Revenue report over a date range

use chrono::NaiveDate;
use miette::Result;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::commands::utils::{print_structured, Session};
use crate::cli::helpers::{parse_date, truncate_str};
use crate::cli::GlobalOpts;
use crate::core::store::RevenueReport;
use crate::core::{Action, Config, Reply};

use super::write_output;

#[derive(clap::Args, Debug)]
pub struct RevenueArgs {
    /// First day (YYYY-MM-DD, inclusive)
    #[arg(long, value_parser = parse_date)]
    pub from: NaiveDate,

    /// Last day (YYYY-MM-DD, inclusive)
    #[arg(long, value_parser = parse_date)]
    pub to: NaiveDate,

    /// List every delivered order in the range
    #[arg(long)]
    pub details: bool,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: RevenueArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let report = match session.dispatch(Action::GenerateReport {
        from: args.from,
        to: args.to,
    })? {
        Reply::Report(report) => report,
        other => return Err(miette::miette!("unexpected reply: {:?}", other)),
    };

    if print_structured(&report, session.format(global))? {
        return Ok(());
    }
    write_output(&render(&report, session.config(), args.details), args.output)
}

pub(crate) fn render(report: &RevenueReport, config: &Config, details: bool) -> String {
    let mut output = String::new();
    output.push_str("# Revenue Report\n\n");
    output.push_str(&format!(
        "Period: {} to {} (delivered orders only)\n\n",
        report.from, report.to
    ));

    let mut builder = Builder::default();
    builder.push_record(["Metric", "Value"]);
    builder.push_record(["Delivered orders".to_string(), report.order_count().to_string()]);
    builder.push_record(["Labor".to_string(), config.money(report.labor_total)]);
    builder.push_record(["Parts".to_string(), config.money(report.parts_total)]);
    builder.push_record(["Total".to_string(), config.money(report.total)]);
    output.push_str(&builder.build().with(Style::markdown()).to_string());
    output.push('\n');

    if details && !report.orders.is_empty() {
        output.push_str("\n## Orders\n\n");
        let mut builder = Builder::default();
        builder.push_record(["ID", "Date", "Car", "Description", "Labor", "Parts", "Total"]);
        for entry in &report.orders {
            builder.push_record([
                entry.order_id.to_string(),
                entry.created_at.format("%Y-%m-%d").to_string(),
                truncate_str(&entry.car, 24),
                truncate_str(&entry.description, 32),
                config.money(entry.labor_cost),
                config.money(entry.parts_total),
                config.money(entry.total()),
            ]);
        }
        output.push_str(&builder.build().with(Style::markdown()).to_string());
        output.push('\n');
    }

    output
}
