//! Token command - show or refresh the access token

use crate::cli::args::TokenArgs;
use crate::cli::factory::Components;
use crate::config::Config;
use crate::credentials::AuthToken;
use crate::error::GeoMatrixResult;
use crate::matrix::BuildOptions;
use crate::ui::{self, UiContext};
use chrono::{DateTime, Duration, Utc};

/// Execute the token command
pub fn execute(args: TokenArgs, config: &Config) -> GeoMatrixResult<()> {
    let ctx = UiContext::detect();
    let components = Components::from_config(config, BuildOptions::default())?;
    let credentials = &components.credentials;

    if args.refresh {
        let token = credentials.refresh()?;
        ui::step_ok_detail(
            &ctx,
            "Token refreshed",
            &components.paths.token.display().to_string(),
        );
        describe(&ctx, &token, config, Utc::now());
        return Ok(());
    }

    match credentials.peek() {
        Some(token) => {
            describe(&ctx, &token, config, Utc::now());
            if !credentials.has_fresh_token() {
                ui::step_warn_hint(
                    &ctx,
                    "Stored token is stale",
                    "It is replaced on the next routing call, or run: geomatrix token --refresh",
                );
            }
        }
        None => ui::step_warn_hint(
            &ctx,
            "No stored token",
            "Run: geomatrix token --refresh",
        ),
    }
    Ok(())
}

fn describe(ctx: &UiContext, token: &AuthToken, config: &Config, now: DateTime<Utc>) {
    let max_age = Duration::days(config.credentials.token_max_age_days as i64);
    let fresh = token.is_fresh(now, max_age);

    ui::key_value(ctx, "Issued", &token.issued_at.to_rfc3339());
    ui::key_value_status(ctx, "Age", &format_age(token.age(now)), fresh);
    ui::key_value_status(
        ctx,
        "Expires",
        &token.expires_at.to_rfc3339(),
        now < token.expires_at,
    );
}

/// Compact `1d 4h` / `3h 12m` / `45s` rendering
pub(crate) fn format_age(age: Duration) -> String {
    let secs = age.num_seconds().max(0);
    let (days, hours, minutes) = (secs / 86_400, (secs % 86_400) / 3600, (secs % 3600) / 60);
    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_formatting() {
        assert_eq!(format_age(Duration::seconds(45)), "45s");
        assert_eq!(format_age(Duration::minutes(12)), "12m");
        assert_eq!(format_age(Duration::minutes(192)), "3h 12m");
        assert_eq!(format_age(Duration::hours(28)), "1d 4h");
        assert_eq!(format_age(Duration::seconds(-5)), "0s");
    }
}
