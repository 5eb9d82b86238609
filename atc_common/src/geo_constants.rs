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

/// common geodetic constants that should be consistent through all tower computations

/// mean earth radius in meters
pub const MEAN_EARTH_RADIUS: f64 = 6371000.0;

/// international nautical mile in meters
pub const METERS_PER_NM: f64 = 1852.0;

/// mean earth radius in nautical miles
pub const MEAN_EARTH_RADIUS_NM: f64 = MEAN_EARTH_RADIUS / METERS_PER_NM;

pub const METERS_PER_FOOT: f64 = 0.3048;

pub const SECS_PER_HOUR: f64 = 3600.0;
