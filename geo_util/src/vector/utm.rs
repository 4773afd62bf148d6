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
use std::collections::HashMap;
use std::fmt;

use anyhow::{bail, Result};
use gdal::spatial_ref::{CoordTransform, SpatialRef};

use crate::vector::{set_traditional_axis_order, spatial_ref_from_epsg};

/// A WGS 84 UTM zone, used to work in meters around a geographic feature
#[derive(Eq, PartialEq, Hash, Copy, Clone, Debug)]
pub struct UtmZone {
    zone: u8,
    is_north: bool
}

impl UtmZone {
    pub fn find_utm(x_lon: f64, y_lat: f64) -> Result<UtmZone> {
        if !(-180.0..=180.0).contains(&x_lon) || !(-90.0..=90.0).contains(&y_lat) {
            bail!("Not a longitude/latitude: ({}, {})", x_lon, y_lat);
        }

        //180 belongs to zone 60
        let zone = (((x_lon + 180.0) / 6.0).floor() as u8 + 1).min(60);

        Ok(UtmZone {
            zone,
            is_north: y_lat >= 0.0
        })
    }

    pub fn zone(&self) -> u8 {
        self.zone
    }

    pub fn is_north(&self) -> bool {
        self.is_north
    }

    pub fn epsg_code(&self) -> u32 {
        let base = if self.is_north { 32600 } else { 32700 };
        base + self.zone as u32
    }

    pub fn spatial_ref(&self) -> Result<SpatialRef> {
        spatial_ref_from_epsg(self.epsg_code())
    }
}

impl fmt::Display for UtmZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UTM zone {}{}", self.zone, if self.is_north {"N"} else {"S"})
    }
}

pub struct UtmTransformations {
    pub transform_to_meters: CoordTransform,
    pub transform_to_source: CoordTransform
}

/// Transformations between a source spatial reference and the UTM zones seen so far
pub struct UtmCache {
    cache: HashMap<UtmZone, UtmTransformations>,
    source_sr: SpatialRef
}

impl UtmCache {
    pub fn new(source_sr: SpatialRef) -> UtmCache {
        set_traditional_axis_order(&source_sr);
        UtmCache {
            cache: Default::default(),
            source_sr
        }
    }

    pub fn get(&mut self, utm_zone: UtmZone) -> Result<&UtmTransformations> {
        if !self.cache.contains_key(&utm_zone) {
            let sr_meters = utm_zone.spatial_ref()?;

            let transformations = UtmTransformations {
                transform_to_meters: CoordTransform::new(&self.source_sr, &sr_meters)?,
                transform_to_source: CoordTransform::new(&sr_meters, &self.source_sr)?,
            };

            self.cache.insert(utm_zone, transformations);
        }

        Ok(&self.cache[&utm_zone])
    }
}
