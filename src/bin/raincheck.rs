//! Command line surface over the raincheck library.

use chrono::Local;
use clap::{Parser, Subcommand};
use raincheck::{render_svg, DateRange, MonthlySummary, Raincheck, CITY_REGISTRY};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "raincheck",
    version,
    about = "Daily temperatures and monthly rainfall for Australian cities"
)]
struct Cli {
    /// Override the monthly aggregate store location.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Daily max temperatures over a date range
    Daily {
        city: String,
        /// Start date, YYYY-MM-DD
        start: String,
        /// End date, YYYY-MM-DD (not in the future)
        end: String,
        /// Write an SVG chart of the series to this path
        #[arg(long)]
        chart: Option<PathBuf>,
    },
    /// Monthly rainfall breakdown over a date range
    Summary {
        city: String,
        start: String,
        end: String,
    },
    /// Rainy days this month vs the same month last year
    Compare { city: String },
    /// Stored monthly aggregates, newest first
    History {
        #[arg(long)]
        city: Option<String>,
    },
    /// List the cities queries can target
    Cities,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let client = match cli.store {
        Some(path) => Raincheck::with_store_path(path).await?,
        None => Raincheck::new().await?,
    };

    match cli.command {
        Command::Daily {
            city,
            start,
            end,
            chart,
        } => {
            let today = Local::now().date_naive();
            let range = DateRange::parse(&start, &end, today)?;
            let series = client
                .daily_series()
                .city(&city)
                .range(range)
                .call()
                .await?;

            for point in series.iter() {
                match point.value {
                    Some(temp) => println!("{}  max {:>5.1} °C", point.date, temp),
                    None => println!("{}  no reading", point.date),
                }
            }
            if !series.is_complete_for(&range) {
                println!(
                    "note: {} of {} days returned data",
                    series.len(),
                    range.len_days()
                );
            }
            if let Some(path) = chart {
                let svg = render_svg(&city, &series)?;
                if svg.is_empty() {
                    println!("nothing to plot");
                } else {
                    std::fs::write(&path, svg)?;
                    println!("chart written to {}", path.display());
                }
            }
        }
        Command::Summary { city, start, end } => {
            let today = Local::now().date_naive();
            let range = DateRange::parse(&start, &end, today)?;
            let report = client.rainfall_report(&city, range).await?;

            for (month, rainy_days) in &report.monthly_breakdown {
                println!("{}  {:>2} rainy days", month, rainy_days);
            }
            println!(
                "total: {:.1} mm over {} rainy days",
                report.total_precipitation, report.total_rainy_days
            );
        }
        Command::Compare { city } => {
            let comparison = client.rain_comparison().city(&city).call().await?;
            println!("{}", comparison);
        }
        Command::History { city } => {
            let records = client.store().history(city.as_deref()).await?;
            if records.is_empty() {
                println!("no stored months");
            }
            for record in records {
                print_record(&record);
            }
        }
        Command::Cities => {
            for city in CITY_REGISTRY {
                println!(
                    "{:<10} ({:.2}, {:.2})",
                    city.display, city.coordinate.0, city.coordinate.1
                );
            }
        }
    }

    Ok(())
}

fn print_record(record: &MonthlySummary) {
    let max_temp = record
        .max_temp
        .map(|t| format!("{:.1} °C", t))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:<10} {}  {:>6.1} mm  {:>2} rainy days  max {}",
        record.city,
        record.month_key(),
        record.total_precipitation,
        record.rainy_days,
        max_temp
    );
}
