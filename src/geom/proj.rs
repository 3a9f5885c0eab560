use anyhow::{anyhow, Context, Result};
use geo::{BoundingRect, Coord, MapCoords, MultiPolygon};
use proj4rs::{proj::Proj as Proj4, transform::transform};

use crate::config::PlanarCrs;

/// Spherical lon/lat; Web Mercator treats WGS84 coordinates as lying on this sphere.
const SPHERE_GEOG: &str = "+proj=longlat +a=6378137 +b=6378137 +no_defs +type=crs";
const WEB_MERCATOR: &str = "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs +type=crs";
const WGS84_GEOG: &str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";

/// Forward (lon/lat → meters) and inverse transforms between WGS84 and a planar CRS.
pub struct Projector {
    geog: Proj4,
    planar: Proj4,
    definition: String,
}

impl std::fmt::Debug for Projector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Projector").field("definition", &self.definition).finish()
    }
}

impl Projector {
    /// Build the projector for `crs`. UTM picks its zone from the center of `extent` (lon/lat).
    pub fn new(crs: PlanarCrs, extent: &MultiPolygon<f64>) -> Result<Self> {
        let (geog, planar) = match crs {
            PlanarCrs::WebMercator => (SPHERE_GEOG.to_string(), WEB_MERCATOR.to_string()),
            PlanarCrs::Utm => {
                let center = extent.bounding_rect()
                    .map(|rect| rect.center())
                    .ok_or_else(|| anyhow!("[geom::proj] Cannot choose a UTM zone for an empty extent"))?;
                (WGS84_GEOG.to_string(), utm_proj4(center))
            }
        };

        Ok(Self {
            geog: Proj4::from_proj_string(&geog)
                .with_context(|| anyhow!("[geom::proj] failed to build source PROJ.4: {geog}"))?,
            planar: Proj4::from_proj_string(&planar)
                .with_context(|| anyhow!("[geom::proj] failed to build target PROJ.4: {planar}"))?,
            definition: planar,
        })
    }

    /// PROJ.4 definition of the planar CRS.
    #[inline] pub fn definition(&self) -> &str { &self.definition }

    /// Project a lon/lat coordinate (degrees) to planar meters.
    pub fn forward_coord(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        let mut point = (coord.x.to_radians(), coord.y.to_radians(), 0.0);
        transform(&self.geog, &self.planar, &mut point)
            .with_context(|| format!("[geom::proj] forward transform failed for ({}, {})", coord.x, coord.y))?;
        Ok(Coord { x: point.0, y: point.1 })
    }

    /// Unproject a planar coordinate (meters) back to lon/lat degrees.
    pub fn inverse_coord(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        let mut point = (coord.x, coord.y, 0.0);
        transform(&self.planar, &self.geog, &mut point)
            .with_context(|| format!("[geom::proj] inverse transform failed for ({}, {})", coord.x, coord.y))?;
        Ok(Coord { x: point.0.to_degrees(), y: point.1.to_degrees() })
    }

    /// Project any geometry from lon/lat to planar meters.
    pub fn forward<G>(&self, geometry: &G) -> Result<G::Output>
    where G: MapCoords<f64, f64> {
        geometry.try_map_coords(|coord| self.forward_coord(coord))
    }

    /// Unproject any geometry from planar meters to lon/lat.
    pub fn inverse<G>(&self, geometry: &G) -> Result<G::Output>
    where G: MapCoords<f64, f64> {
        geometry.try_map_coords(|coord| self.inverse_coord(coord))
    }
}

/// Build PROJ.4 string for the WGS84 UTM zone containing a lon/lat center.
fn utm_proj4(center: Coord<f64>) -> String {
    let zone = (((center.x + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u32;
    let south = if center.y >= 0.0 { "" } else { " +south" };
    format!("+proj=utm +zone={zone}{south} +datum=WGS84 +units=m +no_defs +type=crs")
}
