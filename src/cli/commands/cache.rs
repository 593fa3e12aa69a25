//! Cache command - inspect or clear the on-disk caches

use super::token::format_age;
use crate::cli::args::{CacheAction, CacheArgs};
use crate::cli::factory::StorePaths;
use crate::config::Config;
use crate::credentials::TokenStore;
use crate::error::GeoMatrixResult;
use crate::geocode::GeoCache;
use crate::matrix::MatrixStore;
use crate::ui::{self, UiContext};
use chrono::{Duration, Utc};

/// Execute the cache command
pub fn execute(args: CacheArgs, config: &Config) -> GeoMatrixResult<()> {
    let paths = StorePaths::from_config(config);

    match args.action {
        CacheAction::Info => show_info(&paths, config),
        CacheAction::Clear { token, yes } => clear(&paths, token, yes),
    }
}

fn show_info(paths: &StorePaths, config: &Config) -> GeoMatrixResult<()> {
    let ctx = UiContext::detect();
    ui::key_value(&ctx, "Store", &paths.directory.display().to_string());

    ui::section(&ctx, "Matrix snapshot");
    match MatrixStore::new(paths.matrix.clone()).load() {
        Some(snapshot) => {
            let pending = snapshot.pending_pairs();
            ui::key_value(&ctx, "Locations", &snapshot.len().to_string());
            ui::key_value_status(&ctx, "Pending pairs", &pending.to_string(), pending == 0);
        }
        None => ui::key_value(&ctx, "Locations", "0 (no snapshot)"),
    }

    ui::section(&ctx, "Geocode cache");
    let geocode = GeoCache::open(paths.geocode.clone());
    ui::key_value(&ctx, "Entries", &geocode.len().to_string());

    ui::section(&ctx, "Token");
    match TokenStore::new(paths.token.clone()).load() {
        Some(token) => {
            let now = Utc::now();
            let max_age = Duration::days(config.credentials.token_max_age_days as i64);
            let fresh = token.is_fresh(now, max_age);
            ui::key_value_status(
                &ctx,
                "State",
                if fresh { "fresh" } else { "stale" },
                fresh,
            );
            ui::key_value(&ctx, "Age", &format_age(token.age(now)));
        }
        None => ui::key_value_status(&ctx, "State", "none", false),
    }

    Ok(())
}

fn clear(paths: &StorePaths, token: bool, yes: bool) -> GeoMatrixResult<()> {
    let ctx = UiContext::detect().with_auto_yes(yes);

    let prompt = if token {
        "Delete cached matrices, geocode results and the stored token?"
    } else {
        "Delete cached matrices and geocode results?"
    };
    if !ui::confirm(&ctx, prompt, false) {
        ui::step_warn_hint(&ctx, "Nothing deleted", "Pass --yes to skip the prompt");
        return Ok(());
    }

    MatrixStore::new(paths.matrix.clone()).clear()?;
    GeoCache::open(paths.geocode.clone()).clear()?;
    if token {
        TokenStore::new(paths.token.clone()).clear()?;
    }

    ui::step_ok_detail(&ctx, "Caches cleared", &paths.directory.display().to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::AuthToken;
    use crate::geo::Coordinate;
    use crate::matrix::CacheSnapshot;
    use tempfile::TempDir;

    fn config_in(temp: &TempDir) -> Config {
        let mut config = Config::default();
        config.store.directory = Some(temp.path().to_path_buf());
        config
    }

    fn populate(paths: &StorePaths) {
        let mut snapshot = CacheSnapshot::empty();
        snapshot.append(&[Coordinate::new(1.3, 103.8)]);
        MatrixStore::new(paths.matrix.clone()).save(&snapshot).unwrap();
        std::fs::write(&paths.geocode, "{}").unwrap();
        let now = Utc::now();
        TokenStore::new(paths.token.clone())
            .save(&AuthToken::new("t".into(), now, now + Duration::days(3)))
            .unwrap();
    }

    #[test]
    fn clear_keeps_token_by_default() {
        let temp = TempDir::new().unwrap();
        let paths = StorePaths::from_config(&config_in(&temp));
        populate(&paths);

        clear(&paths, false, true).unwrap();

        assert!(!paths.matrix.exists());
        assert!(!paths.geocode.exists());
        assert!(paths.token.exists());
    }

    #[test]
    fn clear_with_token_removes_everything() {
        let temp = TempDir::new().unwrap();
        let paths = StorePaths::from_config(&config_in(&temp));
        populate(&paths);

        clear(&paths, true, true).unwrap();
        assert!(!paths.token.exists());
    }

    #[test]
    fn info_on_empty_store() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        show_info(&StorePaths::from_config(&config), &config).unwrap();
    }
}
