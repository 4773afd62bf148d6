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
use log::LevelFilter;
use simple_logger::SimpleLogger;
use structopt::StructOpt;

use crate::cmd_garage_clip::{garage_clip, GarageClipArgs};
use crate::cmd_garage_proximity::{garage_proximity, GarageProximityArgs};
use crate::cmd_tract_density::{tract_density, TractDensityArgs};

mod cmd_garage_clip;
mod cmd_garage_proximity;
mod cmd_tract_density;
mod garage_clip_params;

#[derive(StructOpt)]
struct Cli {

    #[structopt(long, default_value = "Warn")]
    log_level: LevelFilter,

    #[structopt(subcommand)]
    cmd: Command
}

#[derive(StructOpt)]
enum Command {
    #[structopt(help="Computes the population density (per square km) of census tracts")]
    TractDensity(TractDensityArgs),

    #[structopt(help="Cleans up the campus geodatabase, buffers garages and intersects them with structures")]
    GarageProximity(GarageProximityArgs),

    #[structopt(help="Selects a garage, buffers it and clips the campus structures with the buffer")]
    GarageClip(GarageClipArgs),
}

fn run() -> Result<()> {
    let args = Cli::from_args();

    SimpleLogger::new().with_level(args.log_level).init()?;

    match &args.cmd {
        Command::TractDensity(r) => {
            tract_density(r)?;
        }
        Command::GarageProximity(r) => {
            garage_proximity(r)?;
        }
        Command::GarageClip(r) => {
            garage_clip(r)?;
        }
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}
