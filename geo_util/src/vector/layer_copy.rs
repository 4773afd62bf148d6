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
use anyhow::{Context, Result};
use gdal::Dataset;
use gdal::spatial_ref::SpatialRef;
use gdal::vector::{Feature, Geometry, Layer, LayerAccess, OGRwkbGeometryType};
use gdal::LayerOptions;
use log::{debug, info};

use crate::util::{quote_sql_string, ProgressReporter};
use crate::vector::{add_columns_to_layer, delete_layer, get_input_columns, layer_exists,
                    layer_geometry_type, layer_spatial_ref, read_field_values, set_field_values,
                    InputColumnInfo};

/// Creates a layer, replacing any layer of the same name
pub fn create_output_layer<'a>(
    dataset: &'a mut Dataset,
    layer_name: &str,
    srs: Option<&SpatialRef>,
    geom_type: OGRwkbGeometryType::Type,
    columns: &[InputColumnInfo],
) -> Result<Layer<'a>> {
    if layer_exists(dataset, layer_name) {
        debug!("Overwriting layer {}", layer_name);
        delete_layer(dataset, layer_name)?;
    }

    let layer = dataset.create_layer(LayerOptions {
        name: layer_name,
        srs,
        ty: geom_type,
        options: None,
    }).with_context(|| format!("Cannot create layer {}", layer_name))?;

    add_columns_to_layer(&layer, columns)?;

    Ok(layer)
}

/// Writes every input feature to the output with the same attributes.
///
/// `map_geometry` decides the output geometry, returning None skips the feature.
/// Features without geometry are copied as is when `copy_null_geometry` is set, skipped otherwise.
pub fn write_mapped_features<F>(
    input: &mut Layer,
    output: &Layer,
    columns: &[InputColumnInfo],
    copy_null_geometry: bool,
    mut map_geometry: F,
) -> Result<u64>
    where F: FnMut(&Geometry) -> Result<Option<Geometry>>
{
    let mut progress = ProgressReporter::new(input.feature_count());
    let mut count = 0;

    for (idx, input_feature) in input.features().enumerate() {
        let geometry = match input_feature.geometry() {
            Some(g) => match map_geometry(g)? {
                Some(mapped) => Some(mapped),
                None => continue,
            },
            None if copy_null_geometry => None,
            None => continue,
        };

        let mut ft = Feature::new(output.defn())?;
        if let Some(g) = geometry {
            ft.set_geometry(g)?;
        }

        let values = read_field_values(&input_feature, columns)?;
        set_field_values(&mut ft, columns, &values)?;

        ft.create(output)?;
        count += 1;

        progress.tick(idx as u64 + 1);
    }

    Ok(count)
}

/// Copies a layer (schema, spatial reference and features) into `dst`
pub fn copy_features(src: &Dataset, src_layer: &str, dst: &mut Dataset, dst_layer: &str) -> Result<u64> {
    let mut input = src.layer_by_name(src_layer)
        .with_context(|| format!("Layer {} not found", src_layer))?;

    let count = copy_layer_contents(&mut input, dst, dst_layer)?;

    info!("Copied {} features from {} to {}", count, src_layer, dst_layer);

    Ok(count)
}

fn copy_layer_contents(input: &mut Layer, dst: &mut Dataset, dst_layer: &str) -> Result<u64> {
    let columns = get_input_columns(input);
    let srs = layer_spatial_ref(input);
    let geom_type = layer_geometry_type(input);

    let output = create_output_layer(dst, dst_layer, srs.as_ref(), geom_type, &columns)?;

    write_mapped_features(input, &output, &columns, true, |g| Ok(Some(g.clone())))
}

/// Copies the features matching the attribute filter, returns how many were copied
pub fn select_features(src: &Dataset, src_layer: &str, where_clause: &str,
                       dst: &mut Dataset, dst_layer: &str) -> Result<u64> {
    let mut input = src.layer_by_name(src_layer)
        .with_context(|| format!("Layer {} not found", src_layer))?;

    input.set_attribute_filter(where_clause)
        .with_context(|| format!("Invalid filter {:?} on {}", where_clause, src_layer))?;

    let result = copy_layer_contents(&mut input, dst, dst_layer);

    input.clear_attribute_filter();

    result
}

/// True if at least one feature matches the attribute filter
pub fn any_feature_matches(src: &Dataset, src_layer: &str, where_clause: &str) -> Result<bool> {
    let mut input = src.layer_by_name(src_layer)
        .with_context(|| format!("Layer {} not found", src_layer))?;

    input.set_attribute_filter(where_clause)
        .with_context(|| format!("Invalid filter {:?} on {}", where_clause, src_layer))?;

    let found = input.features().next().is_some();

    input.clear_attribute_filter();

    Ok(found)
}

/// `field = 'value'` with the value quoted for OGR SQL
pub fn where_equals(field: &str, value: &str) -> String {
    format!("{} = {}", field, quote_sql_string(value))
}
