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
use std::os::raw::c_int;
use std::path::Path;

use anyhow::{bail, Context, Result};
use gdal::{Dataset, DatasetOptions, DriverManager, GdalOpenFlags};
use gdal::vector::LayerAccess;
use log::{debug, info};

pub const DRIVER_NAME_FILEGDB: &str = "OpenFileGDB";
pub const DRIVER_NAME_GPKG: &str = "GPKG";
pub const DRIVER_NAME_GEOJSON: &str = "GeoJSON";
pub const DRIVER_NAME_SHAPEFILE: &str = "ESRI Shapefile";
pub const DRIVER_NAME_FLATGEOBUF: &str = "FlatGeobuf";
pub const DRIVER_NAME_MEMORY: &str = "Memory";

/// OGR driver used to create a workspace, chosen from its extension
pub fn driver_name_for_path(path: &Path) -> &'static str {
    let extension = path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "gdb" => DRIVER_NAME_FILEGDB,
        "gpkg" => DRIVER_NAME_GPKG,
        "geojson" | "json" => DRIVER_NAME_GEOJSON,
        "shp" => DRIVER_NAME_SHAPEFILE,
        "fgb" => DRIVER_NAME_FLATGEOBUF,
        _ => DRIVER_NAME_GPKG,
    }
}

pub fn open_workspace<P: AsRef<Path>>(path: P, update: bool) -> Result<Dataset> {
    let path = path.as_ref();

    let mut open_flags = GdalOpenFlags::GDAL_OF_VECTOR;
    if update {
        open_flags |= GdalOpenFlags::GDAL_OF_UPDATE;
    }

    let options = DatasetOptions {
        open_flags,
        ..DatasetOptions::default()
    };

    Dataset::open_ex(path, options)
        .with_context(|| format!("Cannot open workspace {}", path.display()))
}

/// Opens the workspace for update, creating it first if the path does not exist.
///
/// Returns true as the second value when the workspace was created.
pub fn create_workspace_if_absent<P: AsRef<Path>>(path: P) -> Result<(Dataset, bool)> {
    let path = path.as_ref();

    if path.exists() {
        debug!("Workspace {} already exists", path.display());
        return Ok((open_workspace(path, true)?, false));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            bail!("Cannot create workspace {}, folder {} does not exist", path.display(), parent.display());
        }
    }

    let driver_name = driver_name_for_path(path);
    info!("Creating workspace {} with driver {}", path.display(), driver_name);

    let driver = DriverManager::get_driver_by_name(driver_name)?;
    let dataset = driver.create_vector_only(path)
        .with_context(|| format!("Cannot create workspace {}", path.display()))?;

    Ok((dataset, true))
}

/// In memory dataset for intermediate layers
pub fn scratch_workspace() -> Result<Dataset> {
    let driver = DriverManager::get_driver_by_name(DRIVER_NAME_MEMORY)?;
    Ok(driver.create_vector_only("scratch")?)
}

pub fn list_layers(dataset: &Dataset) -> Vec<String> {
    dataset.layers().map(|l| l.name()).collect()
}

pub fn layer_exists(dataset: &Dataset, layer_name: &str) -> bool {
    dataset.layer_by_name(layer_name).is_ok()
}

fn layer_index(dataset: &Dataset, layer_name: &str) -> Option<usize> {
    dataset.layers().position(|l| l.name() == layer_name)
}

pub fn delete_layer(dataset: &mut Dataset, layer_name: &str) -> Result<()> {
    let idx = match layer_index(dataset, layer_name) {
        Some(idx) => idx,
        None => bail!("Layer {} does not exist", layer_name),
    };

    let rv = unsafe {
        gdal_sys::GDALDatasetDeleteLayer(dataset.c_dataset(), idx as c_int)
    };

    if rv != gdal_sys::OGRErr::OGRERR_NONE {
        bail!("Unable to delete layer {}, OGR error {}", layer_name, rv);
    }

    debug!("Deleted layer {}", layer_name);

    Ok(())
}

/// Deletes every layer whose name is not in `layers_to_keep`, returns the deleted names
pub fn delete_layers_except<S: AsRef<str>>(dataset: &mut Dataset, layers_to_keep: &[S]) -> Result<Vec<String>> {
    let to_delete: Vec<String> = list_layers(dataset)
        .into_iter()
        .filter(|name| !layers_to_keep.iter().any(|k| k.as_ref() == name))
        .collect();

    for name in to_delete.iter() {
        delete_layer(dataset, name)?;
    }

    Ok(to_delete)
}
