//! CLI report entry point.
//!
//! # Usage
//! - `meejel_cli` prints the core version.
//! - `meejel_cli <db-path> [config.json]` also prints every instrument in the
//!   database with its level and principle weights. Logs go to `logs/` next
//!   to the database file at the configured `log_level`.

use meejel_core::db::open_db;
use meejel_core::{
    init_logging, load_config, CoreConfig, RubricService, SqliteRubricRepository,
};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("meejel_core version={}", meejel_core::core_version());

    let mut args = std::env::args().skip(1);
    let Some(db_path) = args.next() else {
        return ExitCode::SUCCESS;
    };
    let config_path = args.next();

    match print_report(&db_path, config_path.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_report(db_path: &str, config_path: Option<&str>) -> Result<(), Box<dyn Error>> {
    let config = match config_path {
        Some(path) => load_config(path)?,
        None => CoreConfig::default(),
    };

    let log_dir = log_dir_for(db_path)?;
    init_logging(&config.log_level, &log_dir.to_string_lossy())?;

    let conn = open_db(db_path)?;
    let repo = SqliteRubricRepository::try_new(&conn)?.with_evidence_policy(config.evidence_policy);
    let service = RubricService::new(repo, config.scoring_engine()?);

    for instrument in service.list_instruments(None)? {
        let report = service.instrument_report(instrument.uuid)?;
        println!(
            "instrument={} owner={} level={:.2}",
            instrument.name, instrument.owner, report.level
        );
        for item in &report.principles {
            println!(
                "  principle={} grade={} raw={:.2} weight={:.2}",
                item.principle.category.label(),
                item.principle.grade.label(),
                item.score.raw,
                item.score.weight
            );
        }
    }

    Ok(())
}

fn log_dir_for(db_path: &str) -> std::io::Result<PathBuf> {
    let path = Path::new(db_path);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let parent = absolute.parent().map_or_else(|| absolute.clone(), Path::to_path_buf);
    Ok(parent.join("logs"))
}
