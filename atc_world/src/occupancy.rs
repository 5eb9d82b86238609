/*
 * Copyright © 2025, United States Government, as represented by the Administrator of 
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::collections::BTreeMap;
use serde::{Serialize,Deserialize};
use crate::{aircraft::AircraftView, topology::AirportTopology};

/// which aircraft are physically on which runway. Aircraft in `Landing` or `LineUp` occupy their assigned
/// runway, any other aircraft on the ground occupies every runway whose footprint contains its position
/// (which covers both directions of the same strip). Occupant lists are sorted by callsign
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq,Default)]
#[serde(transparent)]
pub struct RunwayOccupancy {
    runways: BTreeMap<String,Vec<String>>,
}

impl RunwayOccupancy {
    pub fn compute (aircraft: &[AircraftView], topology: &AirportTopology, margin_ft: f64)->Self {
        let mut runways: BTreeMap<String,Vec<String>> = topology.runway_names().map(|n| (n.to_string(), Vec::new())).collect();

        for ac in aircraft {
            if ac.status.occupies_assigned_runway() {
                if let Some(occupants) = ac.assigned_runway.as_ref().and_then(|rwy| runways.get_mut(rwy)) {
                    occupants.push( ac.callsign.clone());
                }
            }

            if ac.status.is_on_ground() {
                if let Some(pos) = &ac.position {
                    for rwy in topology.runways().filter(|r| r.contains( pos, margin_ft)) {
                        if let Some(occupants) = runways.get_mut(&rwy.name) {
                            occupants.push( ac.callsign.clone());
                        }
                    }
                }
            }
        }

        for occupants in runways.values_mut() {
            occupants.sort();
            occupants.dedup();
        }

        RunwayOccupancy { runways }
    }

    pub fn occupants (&self, runway: &str)->&[String] {
        self.runways.get(runway).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn is_clear (&self, runway: &str)->bool { self.occupants(runway).is_empty() }

    pub fn is_occupied_by (&self, runway: &str, callsign: &str)->bool {
        self.occupants(runway).iter().any(|cs| cs == callsign)
    }

    pub fn occupied (&self)->impl Iterator<Item=(&str,&[String])> {
        self.runways.iter().filter(|(_,v)| !v.is_empty()).map(|(k,v)| (k.as_str(), v.as_slice()))
    }

    /// all runways occupied by the given aircraft
    pub fn runways_of (&self, callsign: &str)->Vec<&str> {
        self.runways.iter().filter(|(_,v)| v.iter().any(|cs| cs == callsign)).map(|(k,_)| k.as_str()).collect()
    }
}
