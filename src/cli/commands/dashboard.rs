//! `autoservice dashboard` command - Workshop overview

use chrono::NaiveDate;
use miette::Result;
use tabled::{builder::Builder, settings::Style};

use crate::cli::commands::utils::{print_structured, Session};
use crate::cli::helpers::{parse_date, today, truncate_str};
use crate::cli::GlobalOpts;
use crate::core::views::{self, DashboardView};
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct DashboardArgs {
    /// Reference day for the monthly revenue (YYYY-MM-DD, default today)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
}

pub fn run(args: DashboardArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let view = views::dashboard(session.app(), args.date.unwrap_or_else(today))?;

    if print_structured(&view, session.format(global))? {
        return Ok(());
    }
    print!("{}", render(&view, session.config()));
    Ok(())
}

/// Plain-text dashboard, shared with the interactive shell
pub fn render(view: &DashboardView, config: &Config) -> String {
    let dash = &view.dashboard;
    let mut out = String::new();

    out.push_str(&format!("Dashboard for {}\n\n", view.today));
    out.push_str(&format!("  In progress:   {}\n", dash.in_progress));
    out.push_str(&format!("  Ready:         {}\n", dash.ready));
    out.push_str(&format!(
        "  Revenue since {}: {}\n",
        dash.month_start,
        config.money(dash.month_revenue)
    ));

    out.push_str("\nRecent orders\n");
    if dash.recent_orders.is_empty() {
        out.push_str("  No orders yet.\n");
    } else {
        let mut builder = Builder::default();
        builder.push_record(["Date", "Car", "Description", "Status"]);
        for entry in &dash.recent_orders {
            builder.push_record([
                entry.created_at.format("%Y-%m-%d").to_string(),
                truncate_str(&entry.car, 24),
                truncate_str(&entry.description, 32),
                entry.status.label().to_string(),
            ]);
        }
        out.push_str(&builder.build().with(Style::rounded()).to_string());
        out.push('\n');
    }

    out.push_str("\nTop clients\n");
    if dash.top_clients.is_empty() {
        out.push_str("  No delivered orders yet.\n");
    } else {
        let mut builder = Builder::default();
        builder.push_record(["Client", "Revenue"]);
        for client in &dash.top_clients {
            builder.push_record([client.full_name.clone(), config.money(client.revenue)]);
        }
        out.push_str(&builder.build().with(Style::rounded()).to_string());
        out.push('\n');
    }

    if !dash.low_stock.is_empty() {
        out.push_str(&format!(
            "\nLow stock (at or below {})\n",
            config.low_stock_threshold()
        ));
        for part in &dash.low_stock {
            out.push_str(&format!("  [{}] {}: {} left\n", part.id, part.name, part.quantity));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::{ClientRevenue, Dashboard};
    use crate::entities::InventoryPart;

    fn view() -> DashboardView {
        DashboardView {
            today: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
            dashboard: Dashboard {
                in_progress: 1,
                ready: 2,
                month_revenue: 4100.0,
                month_start: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                recent_orders: Vec::new(),
                top_clients: vec![ClientRevenue {
                    client_id: 2,
                    full_name: "Petrov".to_string(),
                    revenue: 3000.0,
                }],
                low_stock: vec![InventoryPart {
                    id: 3,
                    name: "Bulb".to_string(),
                    article: None,
                    quantity: 1,
                    price: 50.0,
                }],
            },
        }
    }

    #[test]
    fn test_render_counts_and_panels() {
        let text = render(&view(), &Config::default());
        assert!(text.contains("In progress:   1"));
        assert!(text.contains("Revenue since 2024-06-01: 4100.00 ₽"));
        assert!(text.contains("No orders yet."));
        assert!(text.contains("Petrov"));
        assert!(text.contains("[3] Bulb: 1 left"));
    }
}
