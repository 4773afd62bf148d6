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
use gdal_sys::OGREnvelope as Envelope;
use rstar::{AABB, RTreeObject};

pub type Coord = f64;

/// Envelope of a feature loaded in memory, `feature_idx` indexes the loaded features
#[derive(Clone, Debug)]
pub struct RTreeIndexObject {
    pub feature_idx: usize,
    pub envelope: AABB<[Coord; 2]>,
}

impl RTreeIndexObject {
    pub fn new(feature_idx: usize, env: &Envelope) -> Self {
        RTreeIndexObject {
            feature_idx,
            envelope: envelope_to_aabb(env),
        }
    }
}

pub fn envelope_to_aabb(env: &Envelope) -> AABB<[Coord; 2]> {
    AABB::from_corners([env.MinX, env.MinY], [env.MaxX, env.MaxY])
}

/// Rstar requires this implementation to know how to index it
impl RTreeObject for RTreeIndexObject {
    type Envelope = AABB<[Coord; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl PartialEq for RTreeIndexObject {
  fn eq(&self, other: &Self) -> bool {
      self.feature_idx == other.feature_idx
  }
}
impl Eq for RTreeIndexObject {}

#[cfg(test)]
mod rtree_tests {
    use super::*;
    use gdal::vector::Geometry;
    use rstar::RTree;

    #[test]
    fn test_locate_intersecting() {
        let wkts = [
            "POLYGON ((0 0,0 1,1 1,1 0,0 0))",
            "POLYGON ((5 5,5 6,6 6,6 5,5 5))",
            "POINT (0.5 3)",
        ];
        let objects = wkts.iter().enumerate()
            .map(|(i, w)| RTreeIndexObject::new(i, &Geometry::from_wkt(w).unwrap().envelope()))
            .collect();
        let tree = RTree::bulk_load(objects);

        let query = envelope_to_aabb(&Geometry::from_wkt("LINESTRING (0.5 0.5,0.5 4)").unwrap().envelope());
        let mut found: Vec<usize> = tree.locate_in_envelope_intersecting(&query).map(|o| o.feature_idx).collect();
        found.sort_unstable();

        assert_eq!(found, vec![0, 2]);
    }
}
