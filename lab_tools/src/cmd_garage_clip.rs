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
use std::io;
use std::path::PathBuf;

use anyhow::Result;
use log::{debug, warn};
use structopt::StructOpt;

use crate::garage_clip_params::{GarageClipConfig, GarageClipParams};
use geo_util::io::get_sub_dir;
use geo_util::vector::{any_feature_matches, buffer_layer, clip_layer, copy_features, create_workspace_if_absent,
                       import_csv_points, open_workspace, scratch_workspace, select_features,
                       spatial_ref_from_epsg, where_equals, DEFAULT_QUAD_SEGS};

const STRUCTURES_LAYER: &str = "Structures";
const SELECTED_GARAGE_LAYER: &str = "selected_garage";
const GARAGE_BUFFER_LAYER: &str = "garage_buffer";
const CLIPPED_STRUCTURES_LAYER: &str = "clipped_structures";
const GARAGE_CSV_EPSG: u32 = 4326;

#[derive(StructOpt)]
pub struct GarageClipArgs {
    #[structopt(parse(from_os_str), long, help="TOML file with the parameters, command line values take precedence")]
    config: Option<PathBuf>,

    #[structopt(long, help="Fail instead of asking for missing parameters")]
    no_prompt: bool,

    #[structopt(flatten)]
    params: GarageClipParams,
}

pub fn garage_clip(args: &GarageClipArgs) -> Result<()> {
    let file_params = match &args.config {
        Some(path) => GarageClipParams::from_toml_file(path)?,
        None => GarageClipParams::default(),
    };

    let mut params = file_params.merge(args.params.clone());

    if !args.no_prompt {
        let stdin = io::stdin();
        params.prompt_missing(stdin.lock(), io::stdout())?;
    }

    let config = params.validate()?;

    run_garage_clip(&config)
}

fn import_garages(config: &GarageClipConfig, gdb: &mut gdal::Dataset) -> Result<u64> {
    let srs = spatial_ref_from_epsg(GARAGE_CSV_EPSG)?;
    import_csv_points(&config.garage_csv, gdb, &config.garage_layer_name, "X", "Y", Some(&srs))
}

pub fn run_garage_clip(config: &GarageClipConfig) -> Result<()> {
    let (mut gdb, created) = create_workspace_if_absent(&config.gdb_path)?;
    if created {
        println!("Geodatabase created at: {}", config.gdb_path.display());
    } else {
        println!("Geodatabase already exists at: {}", config.gdb_path.display());
    }

    match import_garages(config, &mut gdb) {
        Ok(count) => {
            debug!("{} garages imported", count);
            println!("Garage CSV imported successfully to {}", config.gdb_path.display());
        }
        Err(e) => {
            warn!("Garage import failed: {:?}", e);
            println!("Error importing CSV: {:#}", e);
        }
    }

    let campus = open_workspace(&config.campus_gdb, false)?;
    let where_clause = where_equals("BldgName", &config.selected_garage_name);

    if !any_feature_matches(&campus, STRUCTURES_LAYER, &where_clause)? {
        println!("Garage '{}' not found.", config.selected_garage_name);
        return Ok(());
    }

    //selected features go through a scratch layer so the buffer can read while writing to the gdb
    let mut selected_ds = scratch_workspace()?;
    select_features(&campus, STRUCTURES_LAYER, &where_clause, &mut selected_ds, SELECTED_GARAGE_LAYER)?;
    copy_features(&selected_ds, SELECTED_GARAGE_LAYER, &mut gdb, SELECTED_GARAGE_LAYER)?;
    println!("Selected garage: {}", config.selected_garage_name);

    let mut buffer_ds = scratch_workspace()?;
    buffer_layer(&selected_ds, SELECTED_GARAGE_LAYER, &mut buffer_ds, GARAGE_BUFFER_LAYER,
                 &config.buffer_radius, DEFAULT_QUAD_SEGS)?;
    copy_features(&buffer_ds, GARAGE_BUFFER_LAYER, &mut gdb, GARAGE_BUFFER_LAYER)?;
    println!("Buffer created at: {}", get_sub_dir(&config.gdb_path, GARAGE_BUFFER_LAYER).display());

    clip_layer(&campus, STRUCTURES_LAYER, &buffer_ds, GARAGE_BUFFER_LAYER, &mut gdb, CLIPPED_STRUCTURES_LAYER)?;
    println!("Clip completed. Output saved at: {}", get_sub_dir(&config.gdb_path, CLIPPED_STRUCTURES_LAYER).display());

    println!("Process completed successfully.");

    Ok(())
}

#[cfg(test)]
mod garage_clip_tests {
    use super::*;
    use std::fs;
    use gdal::spatial_ref::SpatialRef;
    use gdal::vector::{Feature, FieldDefn, Geometry, LayerAccess, OGRFieldType, OGRwkbGeometryType};
    use gdal::LayerOptions;
    use geo_util::vector::{layer_exists, BufferDistance, LinearUnit};

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(uuid::Uuid::new_v4().to_string());
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_campus(path: &PathBuf) {
        let (mut ds, _) = create_workspace_if_absent(path).unwrap();
        let srs = SpatialRef::from_epsg(32614).unwrap();
        let layer = ds.create_layer(LayerOptions {
            name: STRUCTURES_LAYER,
            srs: Some(&srs),
            ty: OGRwkbGeometryType::wkbPolygon,
            options: None,
        }).unwrap();
        FieldDefn::new("BldgName", OGRFieldType::OFTString).unwrap().add_to_layer(&layer).unwrap();

        for (name, wkt) in [
            ("Northside Parking Garage", "POLYGON ((0 0,0 50,50 50,50 0,0 0))"),
            ("Neighbour", "POLYGON ((100 0,100 50,150 50,150 0,100 0))"),
            ("Far Away", "POLYGON ((5000 0,5000 50,5050 50,5050 0,5000 0))"),
        ].iter() {
            let mut ft = Feature::new(layer.defn()).unwrap();
            ft.set_geometry(Geometry::from_wkt(wkt).unwrap()).unwrap();
            ft.set_field_string("BldgName", name).unwrap();
            ft.create(&layer).unwrap();
        }
    }

    fn config(dir: &PathBuf, garage_name: &str) -> GarageClipConfig {
        let campus_gdb = dir.join("Campus.gpkg");
        write_campus(&campus_gdb);
        GarageClipConfig {
            gdb_path: dir.join("Lab5.gpkg"),
            garage_csv: dir.join("garages.csv"),
            garage_layer_name: "garages".to_string(),
            campus_gdb,
            selected_garage_name: garage_name.to_string(),
            buffer_radius: BufferDistance::new(75.0, LinearUnit::Meters),
        }
    }

    #[test]
    fn test_garage_clip() {
        let dir = temp_dir();
        let config = config(&dir, "Northside Parking Garage");
        fs::write(&config.garage_csv, "Name,X,Y\nNorthside,-96.34,30.62\n").unwrap();

        run_garage_clip(&config).unwrap();

        let gdb = open_workspace(&config.gdb_path, false).unwrap();
        for layer in ["garages", SELECTED_GARAGE_LAYER, GARAGE_BUFFER_LAYER, CLIPPED_STRUCTURES_LAYER].iter() {
            assert!(layer_exists(&gdb, layer), "{}", layer);
        }
        assert_eq!(gdb.layer_by_name(SELECTED_GARAGE_LAYER).unwrap().feature_count(), 1);

        //the neighbour is 50m away so partly inside the 75m buffer
        let mut clipped = gdb.layer_by_name(CLIPPED_STRUCTURES_LAYER).unwrap();
        let names: Vec<String> = clipped.features()
            .map(|f| f.field_as_string_by_name("BldgName").unwrap().unwrap())
            .collect();
        assert_eq!(names, vec!["Northside Parking Garage", "Neighbour"]);
    }

    #[test]
    fn test_missing_csv_does_not_stop_processing() {
        let dir = temp_dir();
        let config = config(&dir, "Northside Parking Garage");

        run_garage_clip(&config).unwrap();

        let gdb = open_workspace(&config.gdb_path, false).unwrap();
        assert!(!layer_exists(&gdb, "garages"));
        assert!(layer_exists(&gdb, CLIPPED_STRUCTURES_LAYER));
    }

    #[test]
    fn test_garage_not_found() {
        let dir = temp_dir();
        let config = config(&dir, "O'Connor Garage");

        run_garage_clip(&config).unwrap();

        let gdb = open_workspace(&config.gdb_path, false).unwrap();
        assert!(!layer_exists(&gdb, SELECTED_GARAGE_LAYER));
    }
}
