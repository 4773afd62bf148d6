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
use rayon::prelude::*;

use crate::census::CensusTract;

pub const SQUARE_METERS_PER_SQUARE_KM: f64 = 1_000_000.0;

/// Population per square kilometer, with the land area given in square meters.
///
/// A tract without land area has a density of 0, no error is raised.
pub fn density(population: u64, land_area_m2: f64) -> f64 {
    let area_km2 = land_area_m2 / SQUARE_METERS_PER_SQUARE_KM;

    if area_km2 > 0.0 {
        population as f64 / area_km2
    } else {
        0.0
    }
}

/// Density of every tract, in the same order as the input.
pub fn tract_densities<G: Sync>(tracts: &[CensusTract<G>]) -> Vec<f64> {
    tracts.par_iter()
        .map(|t| t.population_density())
        .collect()
}

#[cfg(test)]
mod density_tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn test_density_formula() {
        assert!(approx_eq!(f64, density(1000, 2_000_000.0), 500.0, ulps = 2));
        assert!(approx_eq!(f64, density(3, 1_500_000.0), 2.0, ulps = 2));
        assert!(approx_eq!(f64, density(7, 250.0), 28_000.0, ulps = 2));

        for (population, area) in [(1u64, 1.0), (12_345, 987_654.3), (4_000_000, 1e10)].iter() {
            let expected = *population as f64 / (*area / 1e6);
            assert!(approx_eq!(f64, density(*population, *area), expected, ulps = 4));
        }
    }

    #[test]
    fn test_zero_population() {
        assert_eq!(density(0, 500_000.0), 0.0);
        assert_eq!(density(0, 1.0), 0.0);
    }

    #[test]
    fn test_zero_area_is_zero_density() {
        assert_eq!(density(5000, 0.0), 0.0);
        assert_eq!(density(0, 0.0), 0.0);
        assert_eq!(density(u64::MAX, 0.0), 0.0);
    }

    #[test]
    fn test_monotonic_in_population() {
        let area = 3_250_000.0;
        let mut last = density(0, area);
        for population in (0..10_000).step_by(37) {
            let d = density(population, area);
            assert!(d >= last, "{} < {} at population {}", d, last, population);
            last = d;
        }
    }

    #[test]
    fn test_tract_densities_keeps_order() {
        let tracts = vec![
            CensusTract::new("a", 1000, 2_000_000.0, ()).unwrap(),
            CensusTract::new("b", 0, 500_000.0, ()).unwrap(),
            CensusTract::new("c", 5000, 0.0, ()).unwrap(),
            CensusTract::new("d", 250, 1_000_000.0, ()).unwrap(),
        ];

        let densities = tract_densities(&tracts);

        assert_eq!(densities.len(), 4);
        assert!(approx_eq!(f64, densities[0], 500.0, ulps = 2));
        assert_eq!(densities[1], 0.0);
        assert_eq!(densities[2], 0.0);
        assert!(approx_eq!(f64, densities[3], 250.0, ulps = 2));
    }
}
