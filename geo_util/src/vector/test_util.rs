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
use anyhow::Result;
use gdal::{Dataset, DriverManager};
use gdal::vector::{Feature, FieldValue, Geometry, LayerAccess, OGRFieldType, OGRwkbGeometryType};

use crate::vector::{create_output_layer, spatial_ref_from_epsg, InputColumnInfo, DRIVER_NAME_MEMORY};

pub fn memory_dataset() -> Dataset {
    DriverManager::get_driver_by_name(DRIVER_NAME_MEMORY).unwrap()
        .create_vector_only("").unwrap()
}

/// Builds a layer from WKT rows, `epsg_code` 0 means no spatial reference.
///
/// The geometry type is the one of the first row with a geometry, an empty WKT leaves the feature without one.
pub fn build_test_layer(ds: &mut Dataset, layer_name: &str, epsg_code: u32,
                        fields: &[(&str, OGRFieldType::Type)],
                        rows: &[(&str, Vec<FieldValue>)]) -> Result<()>
{
    let srs = if epsg_code == 0 {
        None
    } else {
        Some(spatial_ref_from_epsg(epsg_code)?)
    };

    let geom_type = match rows.iter().find(|(wkt, _)| !wkt.is_empty()) {
        Some((wkt, _)) => Geometry::from_wkt(wkt)?.geometry_type(),
        None => OGRwkbGeometryType::wkbUnknown,
    };

    let columns: Vec<InputColumnInfo> = fields.iter()
        .map(|(name, ogr_type)| InputColumnInfo::new(*name, *ogr_type))
        .collect();

    let layer = create_output_layer(ds, layer_name, srs.as_ref(), geom_type, &columns)?;

    for (wkt, values) in rows.iter() {
        assert_eq!(values.len(), columns.len());

        let mut ft = Feature::new(layer.defn())?;
        if !wkt.is_empty() {
            ft.set_geometry(Geometry::from_wkt(wkt)?)?;
        }
        for (ci, value) in columns.iter().zip(values.iter()) {
            ft.set_field(&ci.name, value)?;
        }
        ft.create(&layer)?;
    }

    Ok(())
}
