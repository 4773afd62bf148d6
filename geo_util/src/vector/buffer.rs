/*
This file is part of the Campus GIS Lab Tools
Copyright (C) 2022 Novel-T

The Campus GIS Lab Tools is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/
use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use gdal::Dataset;
use gdal::spatial_ref::SpatialRef;
use gdal::vector::{Geometry, LayerAccess, OGRwkbGeometryType};
use geos::Geom;
use log::{debug, info};

use crate::convert::{convert_gdal_to_geos, convert_geos_to_gdal};
use crate::vector::{create_output_layer, get_input_columns, into_multi, layer_spatial_ref,
                    write_mapped_features, UtmCache, UtmZone};

pub const DEFAULT_QUAD_SEGS: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinearUnit {
    Meters,
    Kilometers,
    Feet,
    Yards,
    Miles,
    /// Units of the layer's spatial reference
    Native,
}

impl LinearUnit {
    pub fn meters_per_unit(&self) -> Option<f64> {
        match self {
            LinearUnit::Meters => Some(1.0),
            LinearUnit::Kilometers => Some(1000.0),
            LinearUnit::Feet => Some(0.3048),
            LinearUnit::Yards => Some(0.9144),
            LinearUnit::Miles => Some(1609.344),
            LinearUnit::Native => None,
        }
    }
}

impl FromStr for LinearUnit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "m" | "meter" | "meters" | "metre" | "metres" => LinearUnit::Meters,
            "km" | "kilometer" | "kilometers" | "kilometre" | "kilometres" => LinearUnit::Kilometers,
            "ft" | "foot" | "feet" => LinearUnit::Feet,
            "yd" | "yard" | "yards" => LinearUnit::Yards,
            "mi" | "mile" | "miles" => LinearUnit::Miles,
            "" | "unknown" => LinearUnit::Native,
            other => bail!("Unknown linear unit {:?}", other),
        })
    }
}

impl fmt::Display for LinearUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LinearUnit::Meters => "Meters",
            LinearUnit::Kilometers => "Kilometers",
            LinearUnit::Feet => "Feet",
            LinearUnit::Yards => "Yards",
            LinearUnit::Miles => "Miles",
            LinearUnit::Native => "Unknown",
        };
        write!(f, "{}", s)
    }
}

/// A buffer radius such as `150 Meters`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferDistance {
    pub value: f64,
    pub unit: LinearUnit,
}

impl BufferDistance {
    pub fn new(value: f64, unit: LinearUnit) -> Self {
        BufferDistance { value, unit }
    }

    pub fn meters(&self) -> Option<f64> {
        self.unit.meters_per_unit().map(|m| m * self.value)
    }
}

impl FromStr for BufferDistance {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();

        //the unit may or may not be separated by a space, "150 meters" or "150m"
        let split_at = s.find(|c: char| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
            .unwrap_or_else(|| s.len());
        let (number, unit) = s.split_at(split_at);

        let value: f64 = number.trim().parse()
            .map_err(|_| anyhow!("Invalid buffer distance {:?}, expected e.g. \"150 meters\"", s))?;

        if !value.is_finite() || value <= 0.0 {
            bail!("Buffer distance must be positive, got {:?}", s);
        }

        let unit = unit.parse::<LinearUnit>()
            .with_context(|| format!("Invalid buffer distance {:?}", s))?;

        Ok(BufferDistance { value, unit })
    }
}

impl fmt::Display for BufferDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            LinearUnit::Native => write!(f, "{}", self.value),
            unit => write!(f, "{} {}", self.value, unit),
        }
    }
}

/// How a layer's geometries get buffered
enum BufferStrategy {
    /// Buffer width in the layer's own units
    Direct(f64),
    /// Geographic layer, buffer each feature in meters in its UTM zone
    Utm { meters: f64, cache: UtmCache },
}

impl BufferStrategy {
    fn for_layer(srs: Option<&SpatialRef>, distance: &BufferDistance) -> Result<BufferStrategy> {
        let meters = match distance.meters() {
            Some(m) => m,
            None => return Ok(BufferStrategy::Direct(distance.value)),
        };

        let srs = match srs {
            Some(srs) => srs,
            None => bail!("Cannot buffer by {} a layer without spatial reference, use a distance without unit", distance),
        };

        if srs.is_geographic() {
            return Ok(BufferStrategy::Utm { meters, cache: UtmCache::new(srs.clone()) });
        }

        let meters_per_unit = srs.linear_units();
        if meters_per_unit <= 0.0 {
            bail!("Spatial reference has no usable linear unit");
        }

        Ok(BufferStrategy::Direct(meters / meters_per_unit))
    }

    fn buffer(&mut self, geom: &Geometry, quad_segs: i32) -> Result<Geometry> {
        match self {
            BufferStrategy::Direct(width) => buffer_with_geos(geom, *width, quad_segs),
            BufferStrategy::Utm { meters, cache } => {
                let env = geom.envelope();
                let utm_zone = UtmZone::find_utm(
                    (env.MinX + env.MaxX) / 2.0,
                    (env.MinY + env.MaxY) / 2.0)?;

                let utm_trans = cache.get(utm_zone)?;

                let geom_meters = geom.transform(&utm_trans.transform_to_meters)?;
                let buffered = buffer_with_geos(&geom_meters, *meters, quad_segs)?;

                Ok(buffered.transform(&utm_trans.transform_to_source)?)
            }
        }
    }
}

pub fn buffer_with_geos(geom: &Geometry, width: f64, quad_segs: i32) -> Result<Geometry> {
    let shape = convert_gdal_to_geos(geom)?;
    let buffered = shape.buffer(width, quad_segs)?;
    convert_geos_to_gdal(&buffered)
}

/// Buffers every feature of the layer, attributes are kept.  The output is a multi polygon layer.
pub fn buffer_layer(src: &Dataset, src_layer: &str, dst: &mut Dataset, dst_layer: &str,
                    distance: &BufferDistance, quad_segs: i32) -> Result<u64> {
    let mut input = src.layer_by_name(src_layer)
        .with_context(|| format!("Layer {} not found", src_layer))?;

    let srs = layer_spatial_ref(&input);
    let mut strategy = BufferStrategy::for_layer(srs.as_ref(), distance)?;

    if let BufferStrategy::Direct(width) = &strategy {
        debug!("Buffering {} by {} layer units", src_layer, width);
    }

    let columns = get_input_columns(&input);
    let output = create_output_layer(dst, dst_layer, srs.as_ref(),
                                     OGRwkbGeometryType::wkbMultiPolygon, &columns)?;

    let count = write_mapped_features(&mut input, &output, &columns, true, |g| {
        let buffered = strategy.buffer(g, quad_segs)?;
        into_multi(&buffered, 2)
    })?;

    info!("Buffered {} features of {} by {}", count, src_layer, distance);

    Ok(count)
}
