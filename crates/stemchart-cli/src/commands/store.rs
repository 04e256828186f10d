//! Store maintenance commands

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::store::FsChartStore;

fn open_store(charts_dir: Option<String>) -> Result<FsChartStore> {
    let dir = match charts_dir {
        Some(dir) => PathBuf::from(dir),
        None => FsChartStore::default_charts_dir()
            .context("no platform data directory; pass --charts-dir")?,
    };
    Ok(FsChartStore::new(dir))
}

/// Show store information
pub fn info(charts_dir: Option<String>) -> Result<ExitCode> {
    let store = open_store(charts_dir)?;

    println!("{}", "Chart Store".cyan().bold());

    let info = store.info()?;
    println!(
        "  {}: {}",
        "Charts directory".dimmed(),
        info.charts_dir.display()
    );
    println!("  {}: {}", "Chart count".dimmed(), info.entry_count);

    let size_kb = info.total_size_bytes as f64 / 1024.0;
    if size_kb >= 1024.0 {
        println!("  {}: {:.2} MB", "Total size".dimmed(), size_kb / 1024.0);
    } else {
        println!("  {}: {:.2} KB", "Total size".dimmed(), size_kb);
    }

    Ok(ExitCode::SUCCESS)
}

/// Remove all stored charts
pub fn clear(charts_dir: Option<String>) -> Result<ExitCode> {
    let store = open_store(charts_dir)?;

    println!("{}", "Clearing chart store...".cyan().bold());

    let count = store.clear()?;
    if count == 0 {
        println!("  {}", "Store is already empty".dimmed());
    } else {
        println!(
            "  {} Removed {} {}",
            "SUCCESS".green().bold(),
            count,
            if count == 1 { "chart" } else { "charts" }
        );
    }

    Ok(ExitCode::SUCCESS)
}
