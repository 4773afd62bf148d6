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
use anyhow::{bail, Context, Result};
use gdal::vector::{Feature, FieldValue, Layer, LayerAccess};

use crate::census::density;
use crate::util::ProgressReporter;

/// Attribute table columns a tract is read from
#[derive(Debug, Clone, PartialEq)]
pub struct TractColumns {
    pub geoid: String,
    pub population: String,
    pub land_area: String,
}

impl Default for TractColumns {
    fn default() -> Self {
        TractColumns {
            geoid: "GeoId".to_string(),
            population: "Pop".to_string(),
            land_area: "ALAND".to_string(),
        }
    }
}

/// One census tract row.  The geometry is never looked at here.
#[derive(Debug, Clone, PartialEq)]
pub struct CensusTract<G> {
    geoid: String,
    population: u64,
    //square meters
    land_area_m2: f64,
    geometry: G,
}

/// Tract with its geometry kept as WKB, which can be shared between threads
pub type WkbTract = CensusTract<Vec<u8>>;

impl<G> CensusTract<G> {
    pub fn new<S: Into<String>>(geoid: S, population: u64, land_area_m2: f64, geometry: G) -> Result<Self> {
        let geoid = geoid.into();

        if !land_area_m2.is_finite() || land_area_m2 < 0.0 {
            bail!("Tract {} has an invalid land area: {}", geoid, land_area_m2);
        }

        Ok(CensusTract {
            geoid,
            population,
            land_area_m2,
            geometry,
        })
    }

    pub fn geoid(&self) -> &str {
        &self.geoid
    }

    pub fn population(&self) -> u64 {
        self.population
    }

    pub fn land_area_m2(&self) -> f64 {
        self.land_area_m2
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    pub fn population_density(&self) -> f64 {
        density(self.population, self.land_area_m2)
    }
}

pub fn tract_from_feature(feature: &Feature, columns: &TractColumns) -> Result<WkbTract> {
    let geoid = match feature.field(&columns.geoid)? {
        Some(FieldValue::StringValue(s)) => s,
        Some(FieldValue::IntegerValue(i)) => i.to_string(),
        Some(FieldValue::Integer64Value(i)) => i.to_string(),
        Some(other) => bail!("Column {} is not an identifier: {:?}", columns.geoid, other),
        None => bail!("Column {} is empty for feature {:?}", columns.geoid, feature.fid()),
    };

    let population = field_as_count(feature, &columns.population)
        .with_context(|| format!("Reading population of tract {}", geoid))?;

    let land_area_m2 = field_as_real(feature, &columns.land_area)
        .with_context(|| format!("Reading land area of tract {}", geoid))?;

    let geometry = match feature.geometry() {
        Some(g) => g.wkb()?,
        None => bail!("Tract {} has no geometry", geoid),
    };

    CensusTract::new(geoid, population, land_area_m2, geometry)
}

/// Reads every feature of the layer as a tract
pub fn read_tracts(layer: &mut Layer, columns: &TractColumns) -> Result<Vec<WkbTract>> {
    let mut progress = ProgressReporter::new(layer.feature_count());
    let mut tracts = Vec::new();

    for (idx, feature) in layer.features().enumerate() {
        tracts.push(tract_from_feature(&feature, columns)?);
        progress.tick(idx as u64 + 1);
    }

    Ok(tracts)
}

fn field_as_count(feature: &Feature, name: &str) -> Result<u64> {
    let value = match feature.field(name)? {
        Some(FieldValue::IntegerValue(v)) => v as i64,
        Some(FieldValue::Integer64Value(v)) => v,
        Some(FieldValue::RealValue(v)) if v.fract() == 0.0 => v as i64,
        Some(FieldValue::StringValue(s)) => s.trim().parse::<i64>()
            .with_context(|| format!("Column {} is not a number: {:?}", name, s))?,
        Some(other) => bail!("Column {} is not a count: {:?}", name, other),
        None => bail!("Column {} is empty", name),
    };

    if value < 0 {
        bail!("Column {} is negative: {}", name, value);
    }

    Ok(value as u64)
}

fn field_as_real(feature: &Feature, name: &str) -> Result<f64> {
    Ok(match feature.field(name)? {
        Some(FieldValue::IntegerValue(v)) => v as f64,
        Some(FieldValue::Integer64Value(v)) => v as f64,
        Some(FieldValue::RealValue(v)) => v,
        Some(FieldValue::StringValue(s)) => s.trim().parse::<f64>()
            .with_context(|| format!("Column {} is not a number: {:?}", name, s))?,
        Some(other) => bail!("Column {} is not numeric: {:?}", name, other),
        None => bail!("Column {} is empty", name),
    })
}
