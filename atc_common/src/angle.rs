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

//! typed angles for geodetic coordinates and directions. All angles are kept in degrees and normalized on
//! construction, the kind parameter determines the range:
//!
//! | type         | range          | used for                                       |
//! |--------------|----------------|------------------------------------------------|
//! | `Latitude`   | [-90..90]      | geodetic latitude                              |
//! | `Longitude`  | [-180..180]    | geodetic longitude                             |
//! | `Angle180`   | [-180..180]    | signed turns and heading differences           |
//! | `Angle360`   | [0..360)       | headings, tracks, bearings, wind directions    |

use std::{cmp, fmt, marker::PhantomData, ops};
use serde::{Serialize, Deserialize, Serializer, Deserializer, de};

#[inline]
pub fn normalize_90 (d: f64)->f64 {
    let x = d % 360.0;
    if x < -90.0 { -180.0 - x } else if x > 90.0 { 180.0 - x } else { x }
}

#[inline]
pub fn normalize_180 (d: f64)->f64 {
    let x = d % 360.0;
    if x < -180.0 { x + 360.0 } else if x > 180.0 { x - 360.0 } else { x }
}

#[inline]
pub fn normalize_360 (d: f64)->f64 {
    let x = d % 360.0;
    if x < 0.0 { x + 360.0 } else { x }
}

/// signed smallest difference `to - from` in degrees, within [-180..180]
#[inline]
pub fn angle_diff (from: f64, to: f64)->f64 { normalize_180( to - from) }

pub trait AngleKind {
    const NAME: &'static str;
    const MIN: f64;
    const MAX: f64;

    fn normalize (deg: f64)->f64;

    fn fmt_display (deg: f64, f: &mut fmt::Formatter<'_>)->fmt::Result { write!(f, "{deg:.1}°") }
}

#[derive(Debug,Clone,Copy)]
pub struct LatitudeKind;
impl AngleKind for LatitudeKind {
    const NAME: &'static str = "Latitude";
    const MIN: f64 = -90.0;
    const MAX: f64 = 90.0;
    fn normalize (deg: f64)->f64 { normalize_90(deg) }
}

#[derive(Debug,Clone,Copy)]
pub struct LongitudeKind;
impl AngleKind for LongitudeKind {
    const NAME: &'static str = "Longitude";
    const MIN: f64 = -180.0;
    const MAX: f64 = 180.0;
    fn normalize (deg: f64)->f64 { normalize_180(deg) }
}

#[derive(Debug,Clone,Copy)]
pub struct RelativeKind;
impl AngleKind for RelativeKind {
    const NAME: &'static str = "Angle180";
    const MIN: f64 = -180.0;
    const MAX: f64 = 180.0;
    fn normalize (deg: f64)->f64 { normalize_180(deg) }
}

#[derive(Debug,Clone,Copy)]
pub struct DirectionKind;
impl AngleKind for DirectionKind {
    const NAME: &'static str = "Angle360";
    const MIN: f64 = 0.0;
    const MAX: f64 = 360.0;
    fn normalize (deg: f64)->f64 { normalize_360(deg) }

    // the way directions are spoken and written in ATC ("heading 090")
    fn fmt_display (deg: f64, f: &mut fmt::Formatter<'_>)->fmt::Result { write!(f, "{:03.0}", deg) }
}

#[derive(Clone,Copy)]
pub struct NormalizedAngle<K> where K: AngleKind {
    value: f64,
    kind: PhantomData<K>,
}

pub type Latitude = NormalizedAngle<LatitudeKind>;
pub type Longitude = NormalizedAngle<LongitudeKind>;
pub type Angle180 = NormalizedAngle<RelativeKind>;
pub type Angle360 = NormalizedAngle<DirectionKind>;

impl<K> NormalizedAngle<K> where K: AngleKind {
    #[inline]
    pub fn from_degrees (deg: f64)->Self {
        NormalizedAngle { value: K::normalize(deg), kind: PhantomData }
    }

    #[inline] pub fn degrees (&self)->f64 { self.value }
    #[inline] pub fn radians (&self)->f64 { self.value.to_radians() }

    #[inline] pub fn sin (&self)->f64 { self.radians().sin() }
    #[inline] pub fn cos (&self)->f64 { self.radians().cos() }
}

impl Angle180 {
    /// unsigned size of the angle
    pub fn magnitude (&self)->f64 { self.value.abs() }
}

impl Angle360 {
    /// the opposite direction (e.g. runway reciprocal)
    pub fn reciprocal (&self)->Angle360 { Angle360::from_degrees( self.value + 180.0) }

    /// signed smallest angle to turn from self to `other`
    pub fn diff_to (&self, other: &Angle360)->Angle180 { Angle180::from_degrees( angle_diff( self.value, other.value)) }

    /// is `other` within `tolerance_deg` of self (turning either way)
    pub fn is_within (&self, other: &Angle360, tolerance_deg: f64)->bool {
        self.diff_to(other).magnitude() <= tolerance_deg
    }

    /// do self and `other` describe the same line, i.e. are they equal or opposite within `tolerance_deg`
    pub fn is_aligned_with (&self, other: &Angle360, tolerance_deg: f64)->bool {
        self.is_within( other, tolerance_deg) || self.is_within( &other.reciprocal(), tolerance_deg)
    }
}

impl<K> From<NormalizedAngle<K>> for f64 where K: AngleKind {
    fn from (a: NormalizedAngle<K>)->Self { a.value }
}

impl<K> fmt::Display for NormalizedAngle<K> where K: AngleKind {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result { K::fmt_display( self.value, f) }
}

impl<K> fmt::Debug for NormalizedAngle<K> where K: AngleKind {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result { write!(f, "{}({})", K::NAME, self.value) }
}

impl<K> cmp::PartialEq for NormalizedAngle<K> where K: AngleKind {
    fn eq (&self, other: &Self)->bool { self.value == other.value }
}

impl<K> cmp::PartialOrd for NormalizedAngle<K> where K: AngleKind {
    fn partial_cmp (&self, other: &Self)->Option<cmp::Ordering> { self.value.partial_cmp(&other.value) }
}

// only same-kind arithmetic, the result is normalized again
impl<K> ops::Add for NormalizedAngle<K> where K: AngleKind {
    type Output = Self;
    fn add (self, rhs: Self)->Self { NormalizedAngle::from_degrees( self.value + rhs.value) }
}

impl<K> ops::Sub for NormalizedAngle<K> where K: AngleKind {
    type Output = Self;
    fn sub (self, rhs: Self)->Self { NormalizedAngle::from_degrees( self.value - rhs.value) }
}

//--- serde support. Angles are plain degree numbers, out of range input is rejected instead of normalized

impl<K> Serialize for NormalizedAngle<K> where K: AngleKind {
    fn serialize<S> (&self, serializer: S)->Result<S::Ok, S::Error> where S: Serializer {
        serializer.serialize_f64( self.value)
    }
}

struct DegreesVisitor<K>(PhantomData<K>);

impl<'de,K> de::Visitor<'de> for DegreesVisitor<K> where K: AngleKind {
    type Value = NormalizedAngle<K>;

    fn expecting (&self, f: &mut fmt::Formatter)->fmt::Result {
        write!(f, "{} degrees within [{}..{}]", K::NAME, K::MIN, K::MAX)
    }

    fn visit_f64<E> (self, v: f64)->Result<Self::Value,E> where E: de::Error {
        if v >= K::MIN && v <= K::MAX {
            Ok( NormalizedAngle::from_degrees(v))
        } else {
            Err( E::custom( format!("{} out of range: {}", K::NAME, v)))
        }
    }

    // config files often use integer degrees (runway headings)
    fn visit_i64<E> (self, v: i64)->Result<Self::Value,E> where E: de::Error { self.visit_f64( v as f64) }
    fn visit_u64<E> (self, v: u64)->Result<Self::Value,E> where E: de::Error { self.visit_f64( v as f64) }
}

impl<'de,K> Deserialize<'de> for NormalizedAngle<K> where K: AngleKind {
    fn deserialize<D> (deserializer: D)->Result<Self, D::Error> where D: Deserializer<'de> {
        deserializer.deserialize_f64( DegreesVisitor::<K>(PhantomData))
    }
}
