use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use lafe_score::backend::build_backend;
use lafe_score::category::category_label;
use lafe_score::config::{AppConfig, BackendMode, load_env_files};
use lafe_score::store::SectionStore;

fn main() -> Result<()> {
    load_env_files();
    let mut config = AppConfig::from_env();
    if has_flag("--local") {
        config.backend = BackendMode::Local;
    }
    if let Some(path) = parse_db_path_arg() {
        config.backend = BackendMode::Local;
        config.cache_db = Some(path);
    }

    let backend = build_backend(&config).context("unable to open section backend")?;
    let mut store = SectionStore::new(backend, config.max_score);
    let groups = store
        .scoreboard()
        .map_err(|err| anyhow!("scoreboard fetch failed: {err}"))?;

    println!("Scoreboard ({})", store.backend_name());
    if groups.is_empty() {
        println!("no finished sections");
        return Ok(());
    }
    for group in &groups {
        println!("{} ({})", group.label, group.sections.len());
        for section in &group.sections {
            println!(
                "  {:<22} {:<16} {}",
                category_label(&section.category),
                section.id,
                section.headline()
            );
        }
    }
    let total: usize = groups.iter().map(|g| g.sections.len()).sum();
    println!("Total: {total} sections in {} days", groups.len());

    Ok(())
}

fn has_flag(flag: &str) -> bool {
    std::env::args().skip(1).any(|arg| arg == flag)
}

fn parse_db_path_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--db=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--db" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}
