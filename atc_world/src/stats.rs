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

use std::{fmt, time::Duration};
use serde::Serialize;
use atc_common::{MinMaxAvg, datetime::EpochMillis, is_none};
use crate::conflict::{ConflictKind, ConflictReport, ReportStatus, Severity};

/// per session counters, accumulated by the world model and returned on shutdown
#[derive(Serialize,Debug,Clone)]
pub struct SessionStats {
    pub started: EpochMillis,
    #[serde(skip_serializing_if="is_none")]
    pub ended: Option<EpochMillis>,

    pub ticks: u64,
    pub overruns: u64,
    pub tick_millis: MinMaxAvg,

    pub observations: u64,
    pub observations_skipped: u64,

    pub aircraft_seen: u64,
    pub aircraft_evicted: u64,
    pub aircraft_removed: u64,
    pub peak_aircraft: usize,

    pub illegal_transitions: u64,
    pub commands: u64,
    pub landings: u64,
    pub takeoffs: u64,

    pub new_conflicts: u64,
    pub critical_conflicts: u64,
    pub separation_losses: u64,
    pub runway_incursions: u64,

    #[serde(skip_serializing_if="is_none")]
    pub min_separation_nm: Option<f64>,
}

impl SessionStats {
    pub fn new (started: EpochMillis)->Self {
        SessionStats {
            started,
            ended: None,
            ticks: 0,
            overruns: 0,
            tick_millis: MinMaxAvg::new(),
            observations: 0,
            observations_skipped: 0,
            aircraft_seen: 0,
            aircraft_evicted: 0,
            aircraft_removed: 0,
            peak_aircraft: 0,
            illegal_transitions: 0,
            commands: 0,
            landings: 0,
            takeoffs: 0,
            new_conflicts: 0,
            critical_conflicts: 0,
            separation_losses: 0,
            runway_incursions: 0,
            min_separation_nm: None,
        }
    }

    pub fn record_tick (&mut self, elapsed: Duration, overrun: bool, n_aircraft: usize) {
        self.ticks += 1;
        self.tick_millis.add( elapsed.as_secs_f64() * 1000.0);
        if overrun { self.overruns += 1 }
        if n_aircraft > self.peak_aircraft { self.peak_aircraft = n_aircraft }
    }

    pub fn record_separation (&mut self, d: f64) {
        match self.min_separation_nm {
            Some(min) if min <= d => {}
            _ => self.min_separation_nm = Some(d)
        }
    }

    /// count conflicts when they first show up
    pub fn record_reports (&mut self, reports: &[ConflictReport]) {
        for r in reports.iter().filter(|r| r.status == ReportStatus::New) {
            self.new_conflicts += 1;
            if r.conflict.severity == Severity::Critical { self.critical_conflicts += 1 }
            match r.conflict.kind {
                ConflictKind::SeparationLoss | ConflictKind::WakeTurbulence => self.separation_losses += 1,
                ConflictKind::RunwayIncursion => self.runway_incursions += 1,
                ConflictKind::PredictedSeparationLoss => {}
            }
        }
    }

    pub fn duration_secs (&self)->Option<f64> {
        self.ended.map(|end| end.secs_since( self.started))
    }
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "session {} - {}", self.started, self.ended.map(|e| e.to_string()).unwrap_or("ongoing".to_string()))?;
        write!(f, "  ticks: {} ({} overruns", self.ticks, self.overruns)?;
        if !self.tick_millis.is_empty() {
            write!(f, ", {:.1}/{:.1}/{:.1} ms min/avg/max", self.tick_millis.min, self.tick_millis.avg, self.tick_millis.max)?;
        }
        writeln!(f, ")")?;
        writeln!(f, "  observations: {} ({} skipped)", self.observations, self.observations_skipped)?;
        writeln!(f, "  aircraft: {} seen, {} evicted, {} removed, {} peak", self.aircraft_seen, self.aircraft_evicted, self.aircraft_removed, self.peak_aircraft)?;
        writeln!(f, "  operations: {} landings, {} takeoffs, {} commands, {} illegal transitions", self.landings, self.takeoffs, self.commands, self.illegal_transitions)?;
        write!(f, "  conflicts: {} ({} critical, {} separation losses, {} runway incursions)", self.new_conflicts, self.critical_conflicts, self.separation_losses, self.runway_incursions)?;
        if let Some(d) = self.min_separation_nm { write!(f, "\n  min separation: {d:.2}nm")?; }
        Ok(())
    }
}
