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

use std::fmt;
use serde::{Serialize,Deserialize};
use geo::Line;
use uom::si::{f64::Length, length::{foot,nautical_mile}};
use atc_common::{
    angle::Angle360,
    geo::{Position, Wind, wind_components},
    geo_constants::{METERS_PER_FOOT, METERS_PER_NM},
    uom::{feet, ser_length_as_feet, de_length_from_feet}
};

fn default_width ()->Length { feet(150.0) }

/// a runway direction with its threshold. Runways are pure value objects - occupancy is tracked by the world model.
/// Note that we treat the (magnetic) heading as true course for geometric computations, i.e. we ignore variation
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct Runway {
    pub name: String,
    pub heading: Angle360,

    #[serde(rename="length_ft", serialize_with="ser_length_as_feet", deserialize_with="de_length_from_feet")]
    pub length: Length,

    #[serde(rename="width_ft", serialize_with="ser_length_as_feet", deserialize_with="de_length_from_feet", default="default_width")]
    pub width: Length,

    pub threshold: Position,
}

impl Runway {
    pub fn new (name: impl ToString, heading_deg: f64, length_ft: f64, width_ft: f64, threshold: Position)->Self {
        Runway {
            name: name.to_string(),
            heading: Angle360::from_degrees(heading_deg),
            length: feet(length_ft),
            width: feet(width_ft),
            threshold
        }
    }

    pub fn length_ft (&self)->f64 { self.length.get::<foot>() }
    pub fn width_ft (&self)->f64 { self.width.get::<foot>() }
    pub fn length_nm (&self)->f64 { self.length.get::<nautical_mile>() }

    /// signed headwind component: `wind_speed * cos(wind_direction - heading)`. Negative values are tailwinds
    pub fn headwind_component (&self, wind_direction: Angle360, wind_speed_kn: f64)->f64 {
        wind_components( wind_direction, wind_speed_kn, self.heading).0
    }

    /// signed crosswind component, positive if wind comes from the right
    pub fn crosswind_component (&self, wind_direction: Angle360, wind_speed_kn: f64)->f64 {
        wind_components( wind_direction, wind_speed_kn, self.heading).1
    }

    pub fn headwind_for (&self, wind: &Wind)->f64 { self.headwind_component( wind.direction, wind.speed_kn) }

    pub fn is_into_wind (&self, wind: &Wind)->bool { self.headwind_for(wind) >= 0.0 }

    pub fn reciprocal_heading (&self)->Angle360 { self.heading.reciprocal() }

    /// the departure end of the runway
    pub fn far_end (&self)->Position {
        self.threshold.destination( self.heading, self.length_nm())
    }

    pub fn centerline (&self)->Line {
        Line::new( self.threshold.coord(), self.far_end().coord())
    }

    /// is `pos` within the runway footprint, extended by `margin_ft` on all sides
    pub fn contains (&self, pos: &Position, margin_ft: f64)->bool {
        let margin_nm = margin_ft * METERS_PER_FOOT / METERS_PER_NM;
        let half_width_nm = self.width.get::<nautical_mile>() / 2.0;
        let (along, cross) = pos.offset_from( &self.threshold, self.heading);

        along >= -margin_nm && along <= self.length_nm() + margin_nm && cross.abs() <= half_width_nm + margin_nm
    }

    /// distance of `pos` to the runway threshold in nautical miles
    pub fn threshold_distance_nm (&self, pos: &Position)->f64 {
        self.threshold.distance_nm(pos)
    }
}

impl fmt::Display for Runway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Runway( {}, hdg: {}, length: {:.0}ft )", self.name, self.heading, self.length_ft())
    }
}
