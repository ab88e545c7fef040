//! Service history of a client or a car

use clap::ArgGroup;
use miette::Result;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::commands::utils::{print_structured, Session};
use crate::cli::helpers::truncate_str;
use crate::cli::GlobalOpts;
use crate::core::store::HistoryEntry;
use crate::core::Config;

use super::write_output;

#[derive(clap::Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["client", "car"])))]
pub struct HistoryArgs {
    /// Every order on every car of this client
    #[arg(long, short = 'c')]
    pub client: Option<i64>,

    /// Every order on this car
    #[arg(long)]
    pub car: Option<i64>,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: HistoryArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let store = session.app().store();

    let (title, entries) = match (args.client, args.car) {
        (Some(client_id), _) => {
            let client = store.get_client(client_id)?;
            (client.full_name, store.client_history(client_id)?)
        }
        (None, Some(car_id)) => {
            let car = store.get_car(car_id)?;
            (format!("{} ({})", car.title(), car.vin), store.car_history(car_id)?)
        }
        (None, None) => return Err(miette::miette!("either --client or --car is required")),
    };

    if print_structured(&entries, session.format(global))? {
        return Ok(());
    }
    write_output(&render(&title, &entries, session.config()), args.output)
}

fn render(title: &str, entries: &[HistoryEntry], config: &Config) -> String {
    let mut output = String::new();
    output.push_str(&format!("# Service History: {}\n\n", title));

    if entries.is_empty() {
        output.push_str("No orders recorded.\n");
        return output;
    }

    let mut builder = Builder::default();
    builder.push_record(["ID", "Date", "Car", "Description", "Status", "Total"]);
    for entry in entries {
        builder.push_record([
            entry.order_id.to_string(),
            entry.created_at.format("%Y-%m-%d").to_string(),
            truncate_str(&entry.car, 24),
            truncate_str(&entry.description, 32),
            entry.status.label().to_string(),
            config.money(entry.total()),
        ]);
    }
    output.push_str(&builder.build().with(Style::markdown()).to_string());

    let total: f64 = entries.iter().map(HistoryEntry::total).sum();
    output.push_str(&format!(
        "\n\n**Orders:** {} | **Total billed:** {}\n",
        entries.len(),
        config.money(total)
    ));
    output
}
