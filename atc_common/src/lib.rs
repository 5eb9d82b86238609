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
#![allow(unused,uncommon_codepoints)]

//! leaf utilities shared by the tower crates: typed angles, spherical geodesy and kinematics, bounded
//! position traces, epoch-millis timestamps, uom helpers and RON config support

pub mod errors;
pub mod collections;
pub mod datetime;
pub mod angle;
pub mod geo_constants;
pub mod geo;
pub mod uom;
pub mod ron;

// math sugar so that the geodesy formulas read like their textbook versions
#[inline(always)] pub fn sin (x: f64)->f64 { x.sin() }
#[inline(always)] pub fn sin2 (x: f64)->f64 { let s = x.sin(); s*s }
#[inline(always)] pub fn cos (x: f64)->f64 { x.cos() }
#[inline(always)] pub fn asin (x: f64)->f64 { x.asin() }
#[inline(always)] pub fn atan2 (y: f64, x: f64)->f64 { y.atan2(x) }
#[inline(always)] pub fn sqrt (x: f64)->f64 { x.sqrt() }
#[inline(always)] pub fn deg (rad: f64)->f64 { rad.to_degrees() }
#[inline(always)] pub fn rad (deg: f64)->f64 { deg.to_radians() }

/// for use in `#[serde(skip_serializing_if="atc_common::is_none")]`
#[inline] pub fn is_none<T> (opt: &Option<T>)->bool { opt.is_none() }

/// running min/max/mean of a sample series (e.g. tick durations). Stats of an empty series are NaN
#[derive(Debug,Clone,Copy,serde::Serialize)]
pub struct MinMaxAvg {
    pub n: usize,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl MinMaxAvg {
    pub fn new ()->Self { MinMaxAvg { n: 0, min: f64::NAN, max: f64::NAN, avg: f64::NAN } }

    pub fn add (&mut self, x: f64) {
        self.n += 1;
        if self.n == 1 {
            self.min = x;
            self.max = x;
            self.avg = x;
        } else {
            self.min = self.min.min(x);
            self.max = self.max.max(x);
            self.avg += (x - self.avg) / self.n as f64;
        }
    }

    pub fn is_empty (&self)->bool { self.n == 0 }
}

impl Default for MinMaxAvg {
    fn default ()->Self { MinMaxAvg::new() }
}
