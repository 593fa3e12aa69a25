//! Matrix command - build and print a travel matrix

use super::resolve::resolve_all;
use crate::cli::args::{MatrixArgs, OutputFormat};
use crate::cli::factory::Components;
use crate::config::Config;
use crate::error::{GeoMatrixError, GeoMatrixResult};
use crate::geo::Coordinate;
use crate::matrix::{BuildOptions, BuildReport, CostMatrix, MatrixKind};
use crate::ui::{self, UiContext};
use serde::Serialize;

#[derive(Serialize)]
struct MatrixJson<'a> {
    kind: MatrixKind,
    ids: Vec<&'a str>,
    coordinates: Vec<Coordinate>,
    /// `null` marks unreachable or pending cells
    values: Vec<Vec<Option<f64>>>,
    report: &'a BuildReport,
}

/// Execute the matrix command
pub fn execute(args: MatrixArgs, config: &Config) -> GeoMatrixResult<()> {
    let ctx = UiContext::detect();
    let options = BuildOptions {
        retry_pending: args.retry_pending || config.matrix.retry_pending,
        progress: ctx.show_progress(),
    };
    let mut components = Components::from_config(config, options)?;

    let mut ids = Vec::new();
    let mut coordinates = Vec::new();
    for r in resolve_all(&mut components.geocoder, &args.ids)? {
        match (r.latitude, r.longitude) {
            (Some(lat), Some(lon)) => {
                coordinates.push(Coordinate::new(lat, lon));
                ids.push(r.id);
            }
            _ => ui::step_warn_hint(
                &ctx,
                &format!("Skipping '{}'", r.id),
                r.error.as_deref().unwrap_or("not found"),
            ),
        }
    }

    if coordinates.is_empty() {
        return Err(GeoMatrixError::User(
            "None of the identifiers could be resolved".to_string(),
        ));
    }

    let (matrices, report) = components.builder.get_matrices(&coordinates)?;
    let matrix = matrices.select(args.kind);

    match args.format {
        OutputFormat::Table => {
            print_table(&ids, matrix);
            print_report(&ctx, &report);
        }
        OutputFormat::Json => {
            let json = MatrixJson {
                kind: args.kind,
                ids: ids.iter().map(String::as_str).collect(),
                coordinates,
                values: matrix.to_values(),
                report: &report,
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}

fn print_table(ids: &[String], matrix: &CostMatrix) {
    let width = ids.iter().map(String::len).max().unwrap_or(0).max(8) + 2;

    print!("{:<width$}", "", width = width);
    for id in ids {
        print!("{:>width$}", id, width = width);
    }
    println!();

    for (id, row) in ids.iter().zip(matrix.rows()) {
        print!("{:<width$}", id, width = width);
        for cell in row {
            let text = match cell.value() {
                Some(v) => format!("{:.0}", v),
                None => cell.to_string(),
            };
            print!("{:>width$}", text, width = width);
        }
        println!();
    }
}

fn print_report(ctx: &UiContext, report: &BuildReport) {
    ui::section(ctx, "Build");
    ui::key_value(ctx, "New locations", &report.new_locations.to_string());
    ui::key_value(ctx, "Route calls", &report.calls.to_string());
    ui::key_value_status(ctx, "Failed calls", &report.failed.to_string(), report.failed == 0);
    ui::key_value(ctx, "Unreachable pairs", &report.unreachable.to_string());
    ui::key_value_status(
        ctx,
        "Pending pairs",
        &report.pending.to_string(),
        report.pending == 0,
    );
    if report.pending > 0 {
        ui::step_warn_hint(
            ctx,
            "Some pairs have no cost yet",
            "Run again with --retry-pending",
        );
    }
}
