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
use std::path::PathBuf;

use anyhow::{Context, Result};
use gdal::vector::{Feature, FieldValue, Geometry, Layer, LayerAccess, OGRFieldType};
use itertools::Itertools;
use log::{info, warn};
use structopt::StructOpt;

use geo_util::census::{read_tracts, tract_densities, TractColumns};
use geo_util::io::{path_stem, InputOgrLayer};
use geo_util::vector::{create_output_layer, create_workspace_if_absent, field_type_name, field_value_to_string,
                       get_input_columns, layer_geometry_type, layer_spatial_ref, read_field_values,
                       set_field_values, InputColumnInfo};

const MAX_CELL_WIDTH: usize = 30;

#[derive(StructOpt)]
pub struct TractDensityArgs {
    #[structopt(long, help="Vector dataset with the census tracts")]
    in_ogr_conn: String,

    #[structopt(long, default_value = "", help="Can be empty if the dataset has only 1 layer")]
    in_ogr_layer: String,

    #[structopt(long, help="OGR attribute filter on the tracts")]
    filter: Option<String>,

    #[structopt(long, default_value = "GeoId")]
    geoid_column: String,

    #[structopt(long, default_value = "Pop")]
    population_column: String,

    #[structopt(long, default_value = "ALAND", help="Land area in square meters")]
    land_area_column: String,

    #[structopt(long, default_value = "Pop_Den_new")]
    density_column: String,

    #[structopt(long, default_value = "5")]
    preview_rows: usize,

    #[structopt(parse(from_os_str), long, help="If set, tracts with their density are written there")]
    out_ogr_conn: Option<PathBuf>,

    #[structopt(long, help="Defaults to the output file name")]
    out_ogr_layer: Option<String>,
}

/// A few rows of a layer as text, with an optional extra computed column
struct LayerPreview {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl LayerPreview {
    fn read(layer: &mut Layer, columns: &[InputColumnInfo], num_rows: usize,
            extra_column: Option<(&str, &[f64])>) -> Result<Self> {
        let mut headers = columns.iter().map(|c| c.name.clone()).collect_vec();
        if let Some((name, _)) = extra_column {
            headers.push(name.to_string());
        }
        headers.push("geometry".to_string());

        let mut rows = Vec::new();
        for (idx, feature) in layer.features().take(num_rows).enumerate() {
            let mut row = read_field_values(&feature, columns)?
                .iter()
                .map(field_value_to_string)
                .collect_vec();
            if let Some((_, values)) = extra_column {
                row.push(values[idx].to_string());
            }
            row.push(match feature.geometry() {
                Some(g) => g.wkt()?,
                None => "None".to_string(),
            });
            rows.push(row.into_iter().map(|c| truncate(&c)).collect());
        }

        Ok(LayerPreview { headers, rows })
    }

    fn print(&self) {
        let widths = self.headers.iter().enumerate().map(|(col, h)| {
            self.rows.iter().map(|r| r[col].chars().count()).fold(h.chars().count(), usize::max)
        }).collect_vec();

        let format_row = |cells: &[String], idx: &str| -> String {
            let cells = cells.iter().zip(widths.iter())
                .map(|(c, w)| format!("{:>width$}", c, width = w))
                .join("  ");
            format!("{:<4}{}", idx, cells)
        };

        println!("{}", format_row(&self.headers, ""));
        for (idx, row) in self.rows.iter().enumerate() {
            println!("{}", format_row(row, &idx.to_string()));
        }
    }
}

fn truncate(s: &str) -> String {
    if s.chars().count() <= MAX_CELL_WIDTH {
        return s.to_string();
    }
    format!("{}...", s.chars().take(MAX_CELL_WIDTH - 3).collect::<String>())
}

fn print_layer_summary(layer: &mut Layer, columns: &[InputColumnInfo], num_rows: usize) -> Result<()> {
    LayerPreview::read(layer, columns, num_rows, None)?.print();

    let names = columns.iter().map(|c| format!("'{}'", c.name))
        .chain(std::iter::once("'geometry'".to_string()))
        .join(", ");
    println!("Index([{}], dtype='object')", names);

    println!("({}, {})", layer.feature_count(), columns.len() + 1);

    let name_width = columns.iter().map(|c| c.name.len()).max().unwrap_or(0).max("geometry".len());
    for c in columns.iter() {
        println!("{:<width$} {}", c.name, field_type_name(c.ogr_type), width = name_width);
    }
    println!("{:<width$} {}", "geometry", "geometry", width = name_width);

    Ok(())
}

pub fn tract_density(args: &TractDensityArgs) -> Result<()> {
    let mut input = InputOgrLayer::new(args.in_ogr_conn.as_str(), args.in_ogr_layer.as_str());
    input.attribute_filter = args.filter.clone();
    input.try_set_empty_layer_name()?;

    info!("Reading tracts from {}", input);

    let dataset = input.open()?;
    let mut layer = dataset.layer_by_name(&input.layer_name)
        .with_context(|| format!("Layer {} not found", input.layer_name))?;

    if let Some(filter) = &input.attribute_filter {
        layer.set_attribute_filter(filter)
            .with_context(|| format!("Invalid filter {:?}", filter))?;
    }

    let columns = get_input_columns(&layer);

    print_layer_summary(&mut layer, &columns, args.preview_rows)?;

    let tract_columns = TractColumns {
        geoid: args.geoid_column.clone(),
        population: args.population_column.clone(),
        land_area: args.land_area_column.clone(),
    };

    let tracts = read_tracts(&mut layer, &tract_columns)?;
    let densities = tract_densities(&tracts);

    for t in tracts.iter().filter(|t| t.land_area_m2() <= 0.0) {
        warn!("Tract {} has no land area, its density is set to 0", t.geoid());
    }

    //an existing density column is replaced by the recomputed values
    let kept_columns = columns.iter()
        .filter(|c| !c.name.eq_ignore_ascii_case(&args.density_column))
        .cloned()
        .collect_vec();
    if kept_columns.len() != columns.len() {
        info!("Column {} already exists in {}, its values are replaced", args.density_column, input);
    }

    println!();
    LayerPreview::read(&mut layer, &kept_columns, args.preview_rows,
                       Some((&args.density_column, &densities)))?.print();

    let out_path = match &args.out_ogr_conn {
        Some(p) => p,
        None => return Ok(()),
    };

    let out_layer_name = match &args.out_ogr_layer {
        Some(name) => name.clone(),
        None => path_stem(out_path).with_context(|| format!("No layer name for {}", out_path.display()))?,
    };

    let (mut out_ds, _) = create_workspace_if_absent(out_path)?;

    let mut out_columns = kept_columns.clone();
    out_columns.push(InputColumnInfo::new(args.density_column.as_str(), OGRFieldType::OFTReal));

    let srs = layer_spatial_ref(&layer);
    let output = create_output_layer(&mut out_ds, &out_layer_name, srs.as_ref(),
                                     layer_geometry_type(&layer), &out_columns)?;

    for ((feature, tract), density) in layer.features().zip(tracts.iter()).zip(densities.iter()) {
        let mut values = read_field_values(&feature, &kept_columns)?;
        values.push(Some(FieldValue::RealValue(*density)));

        let mut ft = Feature::new(output.defn())?;
        ft.set_geometry(Geometry::from_wkb(tract.geometry())?)?;
        set_field_values(&mut ft, &out_columns, &values)?;
        ft.create(&output)?;
    }

    println!("{} tracts written to {} layer {}", tracts.len(), out_path.display(), out_layer_name);

    Ok(())
}

#[cfg(test)]
mod tract_density_tests {
    use super::*;
    use gdal::Dataset;
    use gdal::spatial_ref::SpatialRef;
    use gdal::LayerOptions;
    use geo_util::vector::{add_columns_to_layer, open_workspace};

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(uuid::Uuid::new_v4().to_string());
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    fn write_tracts(path: &PathBuf) {
        let (mut ds, _) = create_workspace_if_absent(path).unwrap();
        let srs = SpatialRef::from_epsg(4326).unwrap();
        let layer = ds.create_layer(LayerOptions {
            name: "data",
            srs: Some(&srs),
            ty: gdal::vector::OGRwkbGeometryType::wkbPolygon,
            options: None,
        }).unwrap();
        add_columns_to_layer(&layer, &[
            InputColumnInfo::new("GeoId", OGRFieldType::OFTString),
            InputColumnInfo::new("Pop", OGRFieldType::OFTInteger),
            InputColumnInfo::new("ALAND", OGRFieldType::OFTReal),
        ]).unwrap();

        for (geoid, pop, aland) in [("A", 1000, 2_000_000.0), ("B", 0, 500_000.0), ("C", 5000, 0.0)].iter() {
            let mut ft = Feature::new(layer.defn()).unwrap();
            ft.set_geometry(Geometry::from_wkt("POLYGON ((0 0,0 1,1 1,1 0,0 0))").unwrap()).unwrap();
            ft.set_field_string("GeoId", geoid).unwrap();
            ft.set_field_integer("Pop", *pop).unwrap();
            ft.set_field_double("ALAND", *aland).unwrap();
            ft.create(&layer).unwrap();
        }
    }

    fn args(in_path: &PathBuf, out_path: Option<PathBuf>) -> TractDensityArgs {
        TractDensityArgs {
            in_ogr_conn: in_path.to_str().unwrap().to_string(),
            in_ogr_layer: "".to_string(),
            filter: None,
            geoid_column: "GeoId".to_string(),
            population_column: "Pop".to_string(),
            land_area_column: "ALAND".to_string(),
            density_column: "Pop_Den_new".to_string(),
            preview_rows: 5,
            out_ogr_conn: out_path,
            out_ogr_layer: None,
        }
    }

    #[test]
    fn test_tract_density_output() {
        let in_path = temp_path("data.geojson");
        write_tracts(&in_path);
        let out_path = temp_path("out.gpkg");

        tract_density(&args(&in_path, Some(out_path.clone()))).unwrap();

        let ds: Dataset = open_workspace(&out_path, false).unwrap();
        let mut layer = ds.layer_by_name("out").unwrap();
        let densities: Vec<f64> = layer.features().map(|f| {
            match f.field("Pop_Den_new").unwrap() {
                Some(FieldValue::RealValue(v)) => v,
                other => panic!("{:?}", other),
            }
        }).collect();

        assert_eq!(densities, vec![500.0, 0.0, 0.0]);
    }

    #[test]
    fn test_filter_and_existing_column() {
        let in_path = temp_path("data.geojson");
        write_tracts(&in_path);

        let mut a = args(&in_path, None);
        a.filter = Some("Pop > 0".to_string());
        tract_density(&a).unwrap();

        a.density_column = "pop".to_string();
        assert!(tract_density(&a).is_ok());
    }

    fn read_densities(path: &PathBuf, layer_name: &str) -> (Vec<String>, Vec<f64>) {
        let ds: Dataset = open_workspace(path, false).unwrap();
        let mut layer = ds.layer_by_name(layer_name).unwrap();
        let names = get_input_columns(&layer).into_iter().map(|c| c.name).collect();
        let densities = layer.features().map(|f| {
            match f.field("Pop_Den_new").unwrap() {
                Some(FieldValue::RealValue(v)) => v,
                other => panic!("{:?}", other),
            }
        }).collect();
        (names, densities)
    }

    #[test]
    fn test_rerun_on_own_output_replaces_density() {
        let in_path = temp_path("data.geojson");
        write_tracts(&in_path);
        let first_path = temp_path("first.gpkg");
        tract_density(&args(&in_path, Some(first_path.clone()))).unwrap();

        let second_path = temp_path("second.gpkg");
        let mut a = args(&first_path, Some(second_path.clone()));
        a.in_ogr_layer = "first".to_string();
        tract_density(&a).unwrap();

        let (names, densities) = read_densities(&second_path, "second");
        assert_eq!(names, vec!["GeoId", "Pop", "ALAND", "Pop_Den_new"]);
        assert_eq!(densities, vec![500.0, 0.0, 0.0]);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short"), "short");
        let long = "x".repeat(40);
        assert_eq!(truncate(&long).chars().count(), MAX_CELL_WIDTH);
        assert!(truncate(&long).ends_with("..."));
    }
}
