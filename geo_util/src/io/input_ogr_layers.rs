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
use serde::{Deserialize, Serialize};
use std::fmt;
use anyhow::{Result, bail, Context};
use gdal::Dataset;
use gdal::vector::LayerAccess;

/// A layer inside an OGR dataset (file, geodatabase, ...)
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct InputOgrLayer {
    pub ogr_conn_str: String,

    //if empty will be set to the layer name if the dataset has 1 layer (like GeoJSON) with try_set_empty_layer_name
    #[serde(default)]
    pub layer_name: String,

    #[serde(rename="ogr_filter")]
    pub attribute_filter: Option<String>,
}

impl InputOgrLayer {
    pub fn new<S: Into<String>>(ogr_conn_str: S, layer_name: S) -> Self {
        InputOgrLayer {
            ogr_conn_str: ogr_conn_str.into(),
            layer_name: layer_name.into(),
            attribute_filter: None,
        }
    }

    pub fn try_set_empty_layer_name(&mut self) -> Result<()> {
        if !self.layer_name.is_empty() {
            return Ok(());
        }

        let dataset = self.open()?;

        let layer_count = dataset.layer_count();

        if layer_count != 1 {
            bail!("No layer name and layer count is {} for dataset {}.  Must be 1 to know layer name", layer_count, &self.ogr_conn_str);
        }

        self.layer_name = dataset.layer(0)?.name();

        Ok(())
    }

    pub fn open(&self) -> Result<Dataset> {
        Dataset::open(&self.ogr_conn_str)
            .with_context(|| format!("Cannot open {}", self.ogr_conn_str))
    }
}

impl fmt::Display for InputOgrLayer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Layer: {:?} ogr conn: {}",
               self.layer_name,
               self.ogr_conn_str
        )?;
        if let Some(filter) = &self.attribute_filter {
            write!(f, " filter: {}", filter)?;
        }
        Ok(())
    }
}
