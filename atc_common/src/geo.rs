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
#![allow(non_snake_case)]

/// this module provides the geodesy and kinematics we need for separation computations: great circle
/// distances/bearings between positions, ground velocities derived from timestamped samples and
/// straight line (constant track and speed) extrapolation of positions.
/// Positions wrap a [geo](https://docs.rs/geo/latest/geo/index.html) `Point` (x = longitude, y = latitude degrees)
/// so that they can be handed to `geo` algorithms without copying. Distances are computed on a sphere with
/// the mean earth radius, which is accurate enough for the few nautical miles that matter around an airport.

use std::fmt;
use std::time::Duration;
use serde::{Serialize,Deserialize};

use geo::{Coord, Point};

use uom::si::f64::{Length,Velocity};
use uom::si::length::foot;

use crate::{sin, sin2, cos, asin, atan2, sqrt, rad, deg};
use crate::angle::{normalize_180, Angle360, Latitude, Longitude};
use crate::datetime::EpochMillis;
use crate::errors::{CommonError, Result, invalid_position};
use crate::geo_constants::{MEAN_EARTH_RADIUS_NM, SECS_PER_HOUR};
use crate::uom::{knots, nautical_miles};

/* #region Position ***********************************************************************************************/

/// immutable geodetic position given as latitude/longitude degrees and altitude in feet.
/// Construction validates input - there is no way to obtain a Position with NaN or out-of-range coordinates
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
#[serde(try_from = "PositionRecord", into = "PositionRecord")]
pub struct Position {
    point: Point,
    alt_ft: f64
}

impl Position {
    pub fn new (lat_deg: f64, lon_deg: f64, alt_ft: f64)->Result<Self> {
        if !lat_deg.is_finite() || lat_deg < -90.0 || lat_deg > 90.0 {
            return Err( invalid_position!("latitude {lat_deg} not within [-90..90]"))
        }
        if !lon_deg.is_finite() || lon_deg < -180.0 || lon_deg > 180.0 {
            return Err( invalid_position!("longitude {lon_deg} not within [-180..180]"))
        }
        if !alt_ft.is_finite() {
            return Err( invalid_position!("altitude {alt_ft} is not a number"))
        }
        Ok( Position { point: Point::new( lon_deg, lat_deg), alt_ft })
    }

    /// surface position (altitude 0ft)
    pub fn from_lat_lon_degrees (lat_deg: f64, lon_deg: f64)->Result<Self> {
        Position::new( lat_deg, lon_deg, 0.0)
    }

    pub fn with_altitude_ft (&self, alt_ft: f64)->Position {
        let alt_ft = if alt_ft.is_finite() { alt_ft } else { self.alt_ft };
        Position { point: self.point, alt_ft }
    }

    #[inline] pub fn latitude(&self) -> Latitude { Latitude::from_degrees( self.point.y()) }
    #[inline] pub fn longitude(&self) -> Longitude { Longitude::from_degrees( self.point.x()) }
    #[inline] pub fn altitude(&self) -> Length { Length::new::<foot>(self.alt_ft) }

    #[inline] pub fn lat_deg(&self) -> f64 { self.point.y() }
    #[inline] pub fn lon_deg(&self) -> f64 { self.point.x() }
    #[inline] pub fn altitude_ft(&self) -> f64 { self.alt_ft }

    pub fn point (&self)->&Point { &self.point }
    pub fn coord (&self)->Coord { self.point.0 }

    /// great circle (haversine) distance in nautical miles. This is symmetric and 0 for identical positions
    pub fn distance_nm (&self, other: &Position)->f64 {
        let φ1 = rad( self.lat_deg());
        let φ2 = rad( other.lat_deg());
        let Δφ = φ2 - φ1;
        let Δλ = rad( normalize_180( other.lon_deg() - self.lon_deg()));

        let a = (sin2( Δφ/2.0) + cos(φ1) * cos(φ2) * sin2( Δλ/2.0)).clamp( 0.0, 1.0);
        let c = 2.0 * atan2( sqrt(a), sqrt(1.0 - a));
        MEAN_EARTH_RADIUS_NM * c
    }

    pub fn distance (&self, other: &Position)->Length {
        nautical_miles( self.distance_nm(other))
    }

    /// initial great circle bearing from self to `other`
    pub fn bearing_to (&self, other: &Position)->Angle360 {
        let φ1 = rad( self.lat_deg());
        let φ2 = rad( other.lat_deg());
        let Δλ = rad( other.lon_deg() - self.lon_deg());

        let y = sin(Δλ) * cos(φ2);
        let x = cos(φ1) * sin(φ2) - sin(φ1) * cos(φ2) * cos(Δλ);
        Angle360::from_degrees( deg( atan2(y, x)))
    }

    /// the position reached after travelling `dist_nm` along the great circle with initial `bearing`.
    /// Altitude is kept
    pub fn destination (&self, bearing: Angle360, dist_nm: f64)->Position {
        if dist_nm == 0.0 { return *self }

        let δ = dist_nm / MEAN_EARTH_RADIUS_NM;
        let θ = bearing.radians();
        let φ1 = rad( self.lat_deg());
        let λ1 = rad( self.lon_deg());

        let sin_φ2 = (sin(φ1) * cos(δ) + cos(φ1) * sin(δ) * cos(θ)).clamp( -1.0, 1.0);
        let φ2 = asin( sin_φ2);
        let λ2 = λ1 + atan2( sin(θ) * sin(δ) * cos(φ1), cos(δ) - sin(φ1) * sin_φ2);

        Position { point: Point::new( normalize_180( deg(λ2)), deg(φ2)), alt_ft: self.alt_ft }
    }

    /// (along-track, cross-track) distances in nautical miles of self relative to an axis through `origin`
    /// with direction `axis`. Cross-track is positive to the right of the axis.
    /// This uses a flat earth approximation around origin, i.e. is only meant for short distances
    pub fn offset_from (&self, origin: &Position, axis: Angle360)->(f64,f64) {
        let d = origin.distance_nm(self);
        if d == 0.0 { return (0.0, 0.0) }

        let rel = rad( origin.bearing_to(self).degrees() - axis.degrees());
        (d * cos(rel), d * sin(rel))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.5},{:.5},{:.0}ft]", self.lat_deg(), self.lon_deg(), self.alt_ft)
    }
}

/// the serialized form of a Position. We accept "lat"|"latitude", "lon"|"longitude" and "alt"|"altitude" (feet)
#[derive(Debug,Clone,Copy,Serialize,Deserialize)]
struct PositionRecord {
    #[serde(alias="latitude")] lat: f64,
    #[serde(alias="longitude")] lon: f64,
    #[serde(alias="altitude", default)] alt: f64,
}

impl TryFrom<PositionRecord> for Position {
    type Error = CommonError;
    fn try_from (r: PositionRecord)->Result<Position> { Position::new( r.lat, r.lon, r.alt) }
}

impl From<Position> for PositionRecord {
    fn from (p: Position)->Self { PositionRecord { lat: p.lat_deg(), lon: p.lon_deg(), alt: p.alt_ft } }
}

/* #endregion Position */


/* #region GroundVelocity *****************************************************************************************/

/// horizontal velocity vector given as ground speed (knots) and true track
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct GroundVelocity {
    pub speed_kn: f64,
    pub track: Angle360,
}

impl GroundVelocity {
    pub fn zero ()->Self { GroundVelocity { speed_kn: 0.0, track: Angle360::from_degrees(0.0) } }

    pub fn from_speed_track (speed_kn: f64, track: Angle360)->Self {
        if speed_kn.is_finite() && speed_kn > 0.0 {
            GroundVelocity { speed_kn, track }
        } else {
            GroundVelocity::zero()
        }
    }

    /// derive the velocity from two timestamped samples (p1 being the older one).
    /// Returns a zero vector if the samples are not strictly ordered in time
    pub fn from_samples (p1: &Position, t1: EpochMillis, p2: &Position, t2: EpochMillis)->Self {
        let dt = t2.secs_since(t1);
        if dt <= 0.0 { return GroundVelocity::zero() }

        let d = p1.distance_nm(p2);
        if d == 0.0 { return GroundVelocity::zero() }

        GroundVelocity::from_speed_track( d * SECS_PER_HOUR / dt, p1.bearing_to(p2))
    }

    #[inline] pub fn is_zero (&self)->bool { self.speed_kn <= f64::EPSILON }

    pub fn speed (&self)->Velocity { knots(self.speed_kn) }

    /// (east,north) components in knots
    pub fn components_kn (&self)->(f64,f64) {
        (self.speed_kn * self.track.sin(), self.speed_kn * self.track.cos())
    }
}

impl Default for GroundVelocity {
    fn default()->Self { GroundVelocity::zero() }
}

impl fmt::Display for GroundVelocity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}kn@{}", self.speed_kn, self.track)
    }
}

/// straight line extrapolation with constant track and speed. This explicitly does not follow any
/// (taxi or approach) path. A zero velocity returns the position unchanged
pub fn predict_position (pos: &Position, vel: &GroundVelocity, dt: Duration)->Position {
    if vel.is_zero() || dt.is_zero() {
        *pos
    } else {
        pos.destination( vel.track, vel.speed_kn * dt.as_secs_f64() / SECS_PER_HOUR)
    }
}

/* #endregion GroundVelocity */


/* #region Wind ***************************************************************************************************/

/// wind given as direction it is blowing *from* and speed in knots
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct Wind {
    pub direction: Angle360,
    #[serde(alias="speed")]
    pub speed_kn: f64,
}

impl Wind {
    pub fn new (direction_deg: f64, speed_kn: f64)->Self {
        Wind { direction: Angle360::from_degrees(direction_deg), speed_kn: if speed_kn.is_finite() { speed_kn.max(0.0) } else { 0.0 } }
    }

    pub fn calm ()->Self { Wind::new( 0.0, 0.0) }

    /// (headwind,crosswind) components for a given heading - see [`wind_components`]
    pub fn components_for (&self, heading: Angle360)->(f64,f64) {
        wind_components( self.direction, self.speed_kn, heading)
    }
}

impl Default for Wind {
    fn default()->Self { Wind::calm() }
}

impl fmt::Display for Wind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:.0}kn", self.direction, self.speed_kn)
    }
}

/// resolve a wind into (headwind,crosswind) components relative to `heading`.
/// Headwind is positive into the nose, negative for tailwinds. Crosswind is positive from the right
pub fn wind_components (wind_from: Angle360, wind_speed_kn: f64, heading: Angle360)->(f64,f64) {
    let a = rad( wind_from.degrees() - heading.degrees());
    (wind_speed_kn * cos(a), wind_speed_kn * sin(a))
}

/* #endregion Wind */
