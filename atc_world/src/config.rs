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

use std::{path::Path, time::Duration};
use serde::{Serialize,Deserialize};
use atc_common::{datetime::{millis,secs}, ron::{from_ron_str, load_ron_file}};
use crate::errors::{AtcError, Result, config_error};

/// separation standards and prediction parameters used by the conflict detector
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(default)]
pub struct ConflictRules {
    pub horizontal_separation_nm: f64, // standard radar separation
    pub warning_factor: f64, // separations below this multiple of the applicable minimum are warnings

    pub wake_heavy_heavy_nm: f64,
    pub wake_heavy_medium_nm: f64,
    pub wake_heavy_light_nm: f64,

    pub prediction_horizon: Duration,
    pub prediction_step: Duration,
}

impl Default for ConflictRules {
    fn default()->Self {
        ConflictRules {
            horizontal_separation_nm: 3.0,
            warning_factor: 1.5,
            wake_heavy_heavy_nm: 4.0,
            wake_heavy_medium_nm: 5.0,
            wake_heavy_light_nm: 6.0,
            prediction_horizon: secs(120),
            prediction_step: secs(10),
        }
    }
}

/// upper bound for horizon/step, each step extrapolates every airborne pair
pub const MAX_PREDICTION_STEPS: usize = 10_000;

impl ConflictRules {
    pub fn validate (&self)->Result<()> {
        if !(self.horizontal_separation_nm > 0.0) {
            return Err( config_error!("horizontal separation has to be positive: {}", self.horizontal_separation_nm))
        }
        if !(self.warning_factor >= 1.0) {
            return Err( config_error!("warning factor has to be >= 1: {}", self.warning_factor))
        }
        for (name,v) in [("heavy-heavy", self.wake_heavy_heavy_nm), ("heavy-medium", self.wake_heavy_medium_nm), ("heavy-light", self.wake_heavy_light_nm)] {
            if !(v >= 0.0) { return Err( config_error!("{name} wake minimum has to be non-negative: {v}")) }
        }
        if self.prediction_step.is_zero() {
            return Err( config_error!("prediction step cannot be zero"))
        }
        let n = self.prediction_horizon.as_secs_f64() / self.prediction_step.as_secs_f64();
        if n > MAX_PREDICTION_STEPS as f64 {
            return Err( config_error!("too many prediction steps: {:?} horizon / {:?} step > {}",
                                      self.prediction_horizon, self.prediction_step, MAX_PREDICTION_STEPS))
        }
        Ok(())
    }

    /// number of lookahead steps within the prediction horizon, never more than [`MAX_PREDICTION_STEPS`]
    pub fn prediction_steps (&self)->usize {
        if self.prediction_step.is_zero() { 0 } else {
            let n = (self.prediction_horizon.as_secs_f64() / self.prediction_step.as_secs_f64()).floor();
            n.min( MAX_PREDICTION_STEPS as f64) as usize
        }
    }
}

/// settings of the world model registry
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub max_history: usize, // max number of position samples we keep per aircraft
    pub max_missed_ticks: u32, // aircraft not observed for more consecutive ticks get evicted
    pub frame_budget: Duration, // ticks taking longer are reported as overruns
    pub threshold_region_nm: f64, // radius around runway thresholds that triggers OnApproach -> Landing
    pub airborne_altitude_ft: f64, // first observations above are inferred to be airborne
    pub taxi_speed_kn: f64, // first observations on the ground above this speed are inferred to be taxiing
    pub runway_margin_ft: f64, // lateral margin added to runway half width for occupancy tests
    pub rules: ConflictRules,
}

impl Default for WorldConfig {
    fn default()->Self {
        WorldConfig {
            max_history: 20,
            max_missed_ticks: 3,
            frame_budget: millis(100),
            threshold_region_nm: 0.5,
            airborne_altitude_ft: 100.0,
            taxi_speed_kn: 3.0,
            runway_margin_ft: 50.0,
            rules: ConflictRules::default(),
        }
    }
}

impl WorldConfig {
    pub fn from_ron (input: &str)->Result<Self> {
        let config: WorldConfig = from_ron_str(input).map_err(|e| config_error!("invalid world config: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>> (path: P)->Result<Self> {
        let path = path.as_ref();
        let config: WorldConfig = load_ron_file(path).map_err(|e| config_error!("failed to load {path:?}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate (&self)->Result<()> {
        if self.max_history < 2 {
            return Err( config_error!("max_history has to be at least 2 to derive velocities: {}", self.max_history))
        }
        if !(self.threshold_region_nm >= 0.0) {
            return Err( config_error!("threshold region cannot be negative: {}", self.threshold_region_nm))
        }
        self.rules.validate()
    }
}
