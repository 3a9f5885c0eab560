//! Stage orchestration: boundary → admin units → street graph → amenities →
//! assignment → metrics → scores → persisted records.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::{
    admin::{load_admin_areas, resolve_boundary},
    amenity::load_amenities,
    assign::{assign_network, build_units},
    config::PipelineConfig,
    error::PipelineError,
    geom::Projector,
    io::{render_svg, write_stats_csv, write_units_geojson},
    metrics::MetricsEngine,
    network::StreetNetwork,
    provider::{NetworkMode, Provider, StreetGraphSource},
    record::{disambiguate_names, validate_records, UnitRecord},
};

/// Default SVG width in pixels.
pub const MAP_WIDTH: f64 = 1000.0;

/// Files written by a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutput {
    pub records: Vec<UnitRecord>,
    pub geojson_path: PathBuf,
    pub csv_path: PathBuf,
    /// `None` if the map could not be rendered.
    pub svg_path: Option<PathBuf>,
}

/// Run stages 1-6 and return one scored record per unit, ordered by `unit_id`,
/// with geometry back in lon/lat. Nothing is written to disk.
pub fn score_units<P>(provider: &P, config: &PipelineConfig) -> Result<Vec<UnitRecord>>
where P: Provider + ?Sized {
    info!("[pipeline] resolving boundary for {:?}", config.place);
    let boundary = resolve_boundary(provider, &config.place)?;
    let projector = Projector::new(config.crs, &boundary)?;
    info!("[pipeline] planar CRS: {}", projector.definition());

    let admin = load_admin_areas(provider, &boundary, &projector)?;
    if admin.units.is_empty() {
        return Err(PipelineError::NoUnits.into());
    }

    let graph = provider.street_graph(&boundary, NetworkMode::Walk)
        .map_err(PipelineError::StreetGraph)?;
    let network = StreetNetwork::from_graph(graph).project(&projector)?;
    info!("[pipeline] street network: {} nodes, {} edges", network.node_count(), network.edge_count());

    let amenities = load_amenities(provider, &boundary, &config.place, &projector)?;

    let units = build_units(admin.units, &admin.districts);
    let assignment = assign_network(units, &network);

    let engine = MetricsEngine::new(&network, &amenities, config.walk_buffer_m);
    let metrics = engine.compute_all(&assignment, config.parallel);
    let empty = metrics.iter().filter(|m| m.is_none()).count();
    if empty > 0 {
        info!("[pipeline] {empty} units have no street nodes and score 0");
    }

    assignment.units.into_iter().zip(&metrics)
        .map(|(unit, raw)| Ok::<_, anyhow::Error>(UnitRecord {
            unit_id: unit.unit_id,
            geometry: projector.inverse(&unit.geometry)
                .with_context(|| format!("[pipeline] Failed to unproject unit {}", unit.unit_id))?,
            kelurahan: unit.name,
            kecamatan: unit.district,
            metrics: config.policy.score_unit(raw.as_ref()),
        }))
        .collect()
}

/// Run the full pipeline and write the GeoJSON, CSV and SVG artifacts to `config.output_dir`.
pub fn run<P>(provider: &P, config: &PipelineConfig) -> Result<RunOutput>
where P: Provider + ?Sized {
    let mut records = score_units(provider, config)?;

    let renamed = disambiguate_names(&mut records);
    if renamed > 0 {
        warn!("[pipeline] renamed {renamed} units whose names repeat within a district");
    }
    validate_records(&records)?;

    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("[pipeline] Failed to create output directory {}", config.output_dir.display()))?;

    let geojson_path = config.geojson_path();
    write_units_geojson(&records, &geojson_path)?;
    let csv_path = config.csv_path();
    write_stats_csv(&records, &csv_path)?;

    let svg_path = config.svg_path();
    let svg_path = match render_svg(&records, &svg_path, MAP_WIDTH) {
        Ok(()) => Some(svg_path),
        Err(e) => {
            warn!("[pipeline] skipping map rendering: {e:#}");
            None
        }
    };

    info!("[pipeline] wrote {} units to {}", records.len(), config.output_dir.display());
    Ok(RunOutput { records, geojson_path, csv_path, svg_path })
}
