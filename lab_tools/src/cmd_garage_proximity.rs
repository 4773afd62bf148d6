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
use log::info;
use structopt::StructOpt;

use geo_util::vector::{buffer_layer, copy_features, create_workspace_if_absent, delete_layers_except,
                       import_csv_points, intersect_layers, open_workspace, reproject_layer,
                       scratch_workspace, spatial_ref_from_epsg, spatial_reference_name, BufferDistance};

const GARAGES_LAYER: &str = "GaragePoints";
const PROJECTED_STRUCTURES_LAYER: &str = "Structures_Projected";
const BUFFERED_LAYER: &str = "garages_buffered";
const INTERSECTION_LAYER: &str = "intersection";

#[derive(StructOpt)]
pub struct GarageProximityArgs {
    #[structopt(parse(from_os_str), long, help="Campus geodatabase, layers not kept are deleted from it")]
    input_gdb: PathBuf,

    #[structopt(parse(from_os_str), long)]
    garage_csv: PathBuf,

    #[structopt(parse(from_os_str), long, help="Created if it does not exist")]
    output_gdb: PathBuf,

    #[structopt(long, default_value = "GaragePoints,LandUse,Structures,Trees", use_delimiter = true)]
    keep_layer: Vec<String>,

    #[structopt(long, default_value = "Structures")]
    structures_layer: String,

    #[structopt(long, default_value = "X")]
    x_field: String,

    #[structopt(long, default_value = "Y")]
    y_field: String,

    #[structopt(long, default_value = "4326", help="Spatial reference of the CSV coordinates")]
    csv_epsg: u32,

    #[structopt(long, default_value = "4326", help="Structures are re-projected to this")]
    target_epsg: u32,

    #[structopt(long, default_value = "150 Meters")]
    buffer_radius: BufferDistance,

    #[structopt(long, default_value = "8")]
    quad_segs: i32,
}

pub fn garage_proximity(args: &GarageProximityArgs) -> Result<()> {
    let mut input_ds = open_workspace(&args.input_gdb, true)?;

    let deleted = delete_layers_except(&mut input_ds, &args.keep_layer)?;
    for name in deleted.iter() {
        println!("Deleted layer {}", name);
    }

    let (mut output_ds, created) = create_workspace_if_absent(&args.output_gdb)?;
    if created {
        info!("Created {}", args.output_gdb.display());
    }

    let csv_srs = spatial_ref_from_epsg(args.csv_epsg)?;
    let mut garages_ds = scratch_workspace()?;
    import_csv_points(&args.garage_csv, &mut garages_ds, GARAGES_LAYER,
                      &args.x_field, &args.y_field, Some(&csv_srs))
        .with_context(|| format!("Importing {}", args.garage_csv.display()))?;

    println!("Before Re-Projection...");
    println!("garages layer spatial reference: {}.", spatial_reference_name(&garages_ds, GARAGES_LAYER)?);
    println!("{} layer spatial reference: {}.", args.structures_layer,
             spatial_reference_name(&input_ds, &args.structures_layer)?);

    let target_srs = spatial_ref_from_epsg(args.target_epsg)?;
    let mut structures_ds = scratch_workspace()?;
    reproject_layer(&input_ds, &args.structures_layer, &mut structures_ds, PROJECTED_STRUCTURES_LAYER, &target_srs)?;

    println!("After Re-Projection...");
    println!("garages layer spatial reference: {}.", spatial_reference_name(&garages_ds, GARAGES_LAYER)?);
    println!("re-projected {} layer spatial reference: {}.", args.structures_layer,
             spatial_reference_name(&structures_ds, PROJECTED_STRUCTURES_LAYER)?);

    let mut buffered_ds = scratch_workspace()?;
    buffer_layer(&garages_ds, GARAGES_LAYER, &mut buffered_ds, BUFFERED_LAYER,
                 &args.buffer_radius, args.quad_segs)?;

    let mut intersection_ds = scratch_workspace()?;
    intersect_layers(&buffered_ds, BUFFERED_LAYER, &structures_ds, PROJECTED_STRUCTURES_LAYER,
                     &mut intersection_ds, INTERSECTION_LAYER)?;

    let exports = [
        (&garages_ds, GARAGES_LAYER, "garages"),
        (&input_ds, args.structures_layer.as_str(), "Structure"),
        (&buffered_ds, BUFFERED_LAYER, BUFFERED_LAYER),
        (&intersection_ds, INTERSECTION_LAYER, INTERSECTION_LAYER),
    ];

    for (src_ds, src_layer, output_name) in exports.iter() {
        let count = copy_features(src_ds, src_layer, &mut output_ds, output_name)?;
        info!("Exported {} features to {}", count, output_name);
    }

    println!("Feature layers have been successfully exported to the output GDB.");

    Ok(())
}
