mod amount;
mod chat;
mod clock;
mod db;
mod models;
mod run;

use anyhow::{Context, Result};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    let db_path = get_db_path()?;
    tracing::info!(path = %db_path.display(), "opening database");
    let mut db = db::Database::open(&db_path)?;

    match args.len() {
        0 | 1 => run::as_repl(&mut db),
        _ => run::as_cli(&args, &mut db),
    }
}

fn get_db_path() -> Result<std::path::PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "spendbot", "SpendBot")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join("spendbot.db"))
}
