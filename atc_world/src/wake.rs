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
use strum::IntoStaticStr;
use crate::config::ConflictRules;

/// ICAO wake turbulence category, derived from the aircraft type designator
#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,Hash,PartialOrd,Ord,IntoStaticStr)]
#[serde(rename_all="lowercase")]
#[strum(serialize_all="lowercase")]
pub enum WakeCategory {
    Light,
    Medium,
    Heavy,
}

// super heavies (A388) are treated as heavy since we do not have a separate minimum for them
const HEAVY_TYPES: &[&str] = &[
    "A306", "A30B", "A310", "A332", "A333", "A338", "A339", "A342", "A343", "A345", "A346", "A359", "A35K", "A388",
    "B744", "B748", "B74S", "B752", "B753", "B762", "B763", "B764", "B772", "B773", "B77L", "B77W", "B778", "B779",
    "B788", "B789", "B78X", "MD11", "DC10", "IL96", "C17", "C5M", "AN12", "AN22", "A124", "A400", "K35R", "KC10",
];

const MEDIUM_TYPES: &[&str] = &[
    "A318", "A319", "A320", "A321", "A19N", "A20N", "A21N", "BCS1", "BCS3",
    "B712", "B732", "B733", "B734", "B735", "B736", "B737", "B738", "B739", "B37M", "B38M", "B39M",
    "E170", "E175", "E190", "E195", "E290", "E295", "CRJ2", "CRJ7", "CRJ9", "CRJX", "AT45", "AT72", "AT76",
    "DH8A", "DH8B", "DH8C", "DH8D", "MD82", "MD83", "MD88", "MD90", "F100", "RJ85", "SF34", "C130", "GLF5", "GLEX",
];

const LIGHT_TYPES: &[&str] = &[
    "C150", "C152", "C162", "C172", "C182", "C206", "C208", "C210", "C310", "C340", "C510", "C525",
    "P28A", "P28B", "PA28", "PA32", "PA34", "PA44", "PA46", "SR20", "SR22", "BE20", "BE33", "BE35", "BE36", "BE58",
    "DA40", "DA42", "DA62", "M20P", "TBM7", "TBM9", "PC12", "E50P", "E55P", "GA8",
];

impl WakeCategory {
    pub fn name (&self)->&'static str { self.into() }

    /// map a type code to its wake category. The code can carry an explicit category suffix as in flight
    /// strips ("B744/H", "C172/L"), which takes precedence over the type table. Unknown types yield `None`
    pub fn from_type_code (code: &str)->Option<WakeCategory> {
        let code = code.trim().to_uppercase();
        if code.is_empty() { return None }

        if let Some((_, suffix)) = code.split_once('/') {
            match suffix.trim() {
                "H" | "J" => return Some(WakeCategory::Heavy),
                "M" => return Some(WakeCategory::Medium),
                "L" => return Some(WakeCategory::Light),
                _ => {}
            }
        }

        let designator = code.split('/').next().unwrap_or("").trim();
        if HEAVY_TYPES.contains(&designator) { Some(WakeCategory::Heavy) }
        else if MEDIUM_TYPES.contains(&designator) { Some(WakeCategory::Medium) }
        else if LIGHT_TYPES.contains(&designator) { Some(WakeCategory::Light) }
        else { None }
    }
}

impl fmt::Display for WakeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// required wake turbulence separation in nautical miles for a given pair, or `None` if no wake specific
/// minimum applies (non-heavy leader). The heavier aircraft of the pair is taken to be the leader, which is the
/// conservative assumption if we do not know the in-trail order
pub fn wake_minimum_nm (a: WakeCategory, b: WakeCategory, rules: &ConflictRules)->Option<f64> {
    let (leader, follower) = if a >= b { (a,b) } else { (b,a) };

    match (leader, follower) {
        (WakeCategory::Heavy, WakeCategory::Heavy) => Some(rules.wake_heavy_heavy_nm),
        (WakeCategory::Heavy, WakeCategory::Medium) => Some(rules.wake_heavy_medium_nm),
        (WakeCategory::Heavy, WakeCategory::Light) => Some(rules.wake_heavy_light_nm),
        _ => None
    }
}
