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

use serde::{Serialize,Deserialize};
use tracing::warn;
use atc_common::{angle::Angle360, datetime::EpochMillis, geo::{Position, Wind}, is_none};
use crate::{errors::{AtcError, Result, invalid_observation}, status::AircraftStatus};

/// a single aircraft as extracted by the perception layer. All fields except callsign and lat/lon are optional
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct AircraftObservation {
    pub callsign: String,

    #[serde(default, alias="aircraft_type", skip_serializing_if="is_none")]
    pub type_code: Option<String>,

    #[serde(alias="latitude")]
    pub lat: f64,

    #[serde(alias="longitude")]
    pub lon: f64,

    #[serde(default, alias="altitude")]
    pub altitude_ft: f64,

    #[serde(default, skip_serializing_if="is_none")]
    pub heading: Option<f64>,

    #[serde(default, skip_serializing_if="is_none")]
    pub speed: Option<f64>, // knots

    #[serde(default, skip_serializing_if="is_none")]
    pub status: Option<AircraftStatus>, // hint, subject to transition rules

    #[serde(default, skip_serializing_if="is_none")]
    pub runway: Option<String>,
}

impl AircraftObservation {
    pub fn new (callsign: impl ToString, lat: f64, lon: f64, altitude_ft: f64)->Self {
        AircraftObservation {
            callsign: callsign.to_string(),
            type_code: None,
            lat, lon, altitude_ft,
            heading: None,
            speed: None,
            status: None,
            runway: None
        }
    }

    pub fn with_type (mut self, type_code: impl ToString)->Self { self.type_code = Some(type_code.to_string()); self }
    pub fn with_status (mut self, status: AircraftStatus)->Self { self.status = Some(status); self }
    pub fn with_runway (mut self, runway: impl ToString)->Self { self.runway = Some(runway.to_string()); self }
    pub fn with_heading (mut self, heading: f64)->Self { self.heading = Some(heading); self }
    pub fn with_speed (mut self, speed: f64)->Self { self.speed = Some(speed); self }

    /// the normalized registry key of this observation
    pub fn callsign_key (&self)->String { self.callsign.trim().to_uppercase() }

    pub fn position (&self)->Result<Position> {
        Ok( Position::new( self.lat, self.lon, self.altitude_ft)?)
    }

    /// check the observation can go into the registry. Returns the validated position
    pub fn validate (&self)->Result<Position> {
        if self.callsign_key().is_empty() {
            return Err( invalid_observation!("observation without callsign"))
        }
        let pos = self.position()?;

        if let Some(hdg) = self.heading {
            if !hdg.is_finite() { return Err( invalid_observation!("{} has invalid heading {}", self.callsign, hdg)) }
        }
        if let Some(spd) = self.speed {
            if !spd.is_finite() || spd < 0.0 { return Err( invalid_observation!("{} has invalid speed {}", self.callsign, spd)) }
        }
        Ok(pos)
    }

    pub fn reported_heading (&self)->Option<Angle360> {
        self.heading.filter(|h| h.is_finite()).map( Angle360::from_degrees)
    }
}

/// one frame worth of perception output
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct PerceptionSnapshot {
    pub timestamp: EpochMillis,

    #[serde(default)]
    pub aircraft: Vec<AircraftObservation>,

    #[serde(default, skip_serializing_if="is_none")]
    pub wind: Option<Wind>,

    #[serde(default, skip_serializing_if="Vec::is_empty")]
    pub active_runways: Vec<String>,

    /// number of entries that could not be parsed at all
    #[serde(skip)]
    pub malformed: usize,
}

// the lenient parse form - entries are parsed individually
#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(default="EpochMillis::now")]
    timestamp: EpochMillis,
    #[serde(default)]
    aircraft: Vec<serde_json::Value>,
    #[serde(default)]
    wind: Option<serde_json::Value>,
    #[serde(default)]
    active_runways: Vec<serde_json::Value>,
}

impl PerceptionSnapshot {
    pub fn new (timestamp: EpochMillis)->Self {
        PerceptionSnapshot { timestamp, aircraft: Vec::new(), wind: None, active_runways: Vec::new(), malformed: 0 }
    }

    pub fn with_aircraft (mut self, obs: AircraftObservation)->Self { self.aircraft.push(obs); self }
    pub fn with_wind (mut self, wind: Wind)->Self { self.wind = Some(wind); self }
    pub fn with_active_runways (mut self, runways: &[&str])->Self {
        self.active_runways = runways.iter().map(|r| r.to_string()).collect();
        self
    }

    /// parse a snapshot from JSON. Only a syntactically broken document is an error, malformed aircraft (or wind,
    /// or runway) entries are skipped and counted in `malformed`
    pub fn from_json (input: &str)->Result<Self> {
        let raw: RawSnapshot = serde_json::from_str(input)?;
        let mut malformed = 0;

        let mut aircraft: Vec<AircraftObservation> = Vec::with_capacity( raw.aircraft.len());
        for v in raw.aircraft {
            match serde_json::from_value::<AircraftObservation>(v) {
                Ok(obs) => aircraft.push(obs),
                Err(e) => {
                    warn!("skipping malformed aircraft observation: {e}");
                    malformed += 1;
                }
            }
        }

        let wind = match raw.wind {
            Some(v) => match serde_json::from_value::<Wind>(v) {
                Ok(wind) => Some(wind),
                Err(e) => {
                    warn!("ignoring malformed wind: {e}");
                    malformed += 1;
                    None
                }
            }
            None => None
        };

        let mut active_runways: Vec<String> = Vec::with_capacity( raw.active_runways.len());
        for v in raw.active_runways {
            match v {
                serde_json::Value::String(rwy) => active_runways.push(rwy),
                other => {
                    warn!("ignoring malformed active runway {other}");
                    malformed += 1;
                }
            }
        }

        Ok( PerceptionSnapshot { timestamp: raw.timestamp, aircraft, wind, active_runways, malformed })
    }

    pub fn to_json (&self)->Result<String> { Ok( serde_json::to_string(self)?) }
}
