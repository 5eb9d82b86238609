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

//! separation, wake turbulence, runway incursion and predictive conflict detection.
//! Detection is a pure function of the current aircraft views and runway occupancy that produces a fresh,
//! deterministically ordered list of conflicts each tick. The [`ConflictTracker`] correlates these lists across
//! ticks by subject identity

use std::{cmp::Reverse, collections::BTreeMap, fmt, time::Duration};
use serde::{Serialize,Deserialize};
use strum::IntoStaticStr;
use itertools::Itertools;
use tracing::{debug,info,warn};
use atc_common::{datetime::EpochMillis, is_none};
use crate::{
    aircraft::AircraftView,
    config::ConflictRules,
    occupancy::RunwayOccupancy,
    wake::wake_minimum_nm
};

/* #region conflict records ***************************************************************************************/

#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,Hash,PartialOrd,Ord,IntoStaticStr)]
#[serde(rename_all="snake_case")]
#[strum(serialize_all="snake_case")]
pub enum ConflictKind {
    SeparationLoss,
    PredictedSeparationLoss,
    RunwayIncursion,
    WakeTurbulence,
}

impl ConflictKind {
    /// separation loss and wake turbulence describe the same current-distance condition of a pair and can turn
    /// into each other between ticks, so they are tracked as one conflict
    fn track_class (&self)->u8 {
        match self {
            ConflictKind::SeparationLoss | ConflictKind::WakeTurbulence => 0,
            ConflictKind::PredictedSeparationLoss => 1,
            ConflictKind::RunwayIncursion => 2,
        }
    }
}

#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,Hash,PartialOrd,Ord,IntoStaticStr)]
#[serde(rename_all="snake_case")]
#[strum(serialize_all="snake_case")]
pub enum Severity {
    Advisory,
    Warning,
    Critical,
}

impl Severity {
    pub fn name (&self)->&'static str { self.into() }
}

/// what a conflict is about. Aircraft pairs are stored in callsign order so that (a,b) and (b,a) are the same subject
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq,Eq,Hash,PartialOrd,Ord)]
#[serde(tag="type", rename_all="snake_case")]
pub enum ConflictSubject {
    AircraftPair { a: String, b: String },
    AircraftRunway { aircraft: String, runway: String },
}

impl ConflictSubject {
    pub fn pair (x: &str, y: &str)->Self {
        if x <= y {
            ConflictSubject::AircraftPair { a: x.to_string(), b: y.to_string() }
        } else {
            ConflictSubject::AircraftPair { a: y.to_string(), b: x.to_string() }
        }
    }

    pub fn runway (aircraft: &str, runway: &str)->Self {
        ConflictSubject::AircraftRunway { aircraft: aircraft.to_string(), runway: runway.to_string() }
    }

    /// the (first) aircraft callsign
    pub fn primary (&self)->&str {
        match self {
            ConflictSubject::AircraftPair{a,..} => a.as_str(),
            ConflictSubject::AircraftRunway{aircraft,..} => aircraft.as_str()
        }
    }

    /// the second aircraft callsign or the runway name
    pub fn secondary (&self)->&str {
        match self {
            ConflictSubject::AircraftPair{b,..} => b.as_str(),
            ConflictSubject::AircraftRunway{runway,..} => runway.as_str()
        }
    }

    pub fn involves (&self, callsign: &str)->bool {
        match self {
            ConflictSubject::AircraftPair{a,b} => a == callsign || b == callsign,
            ConflictSubject::AircraftRunway{aircraft,..} => aircraft == callsign
        }
    }
}

impl fmt::Display for ConflictSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictSubject::AircraftPair{a,b} => write!(f, "{a}/{b}"),
            ConflictSubject::AircraftRunway{aircraft,runway} => write!(f, "{aircraft}@{runway}")
        }
    }
}

/// a detected conflict. These are values that are recomputed every tick, they are never updated in place
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct Conflict {
    pub subject: ConflictSubject,
    pub kind: ConflictKind,
    pub severity: Severity,

    #[serde(skip_serializing_if="is_none", default)]
    pub distance_nm: Option<f64>, // current distance

    #[serde(skip_serializing_if="is_none", default)]
    pub required_nm: Option<f64>, // applicable separation minimum

    #[serde(skip_serializing_if="is_none", default)]
    pub predicted_nm: Option<f64>, // distance at predicted loss of separation

    #[serde(skip_serializing_if="is_none", default)]
    pub time_to_loss: Option<Duration>,

    #[serde(skip_serializing_if="is_none", default)]
    pub occupant: Option<String>, // runway occupant for incursions

    pub timestamp: EpochMillis,
    pub description: String,
}

impl Conflict {
    pub fn is_critical (&self)->bool { self.severity == Severity::Critical }

    /// does this conflict concern the given aircraft, either as subject or as runway occupant
    pub fn involves (&self, callsign: &str)->bool {
        self.subject.involves(callsign) || self.occupant.as_deref() == Some(callsign)
    }

    /// identity of a conflict across ticks
    pub fn track_key (&self)->(ConflictSubject,u8) { (self.subject.clone(), self.kind.track_class()) }

    fn order_cmp (&self, other: &Conflict)->std::cmp::Ordering {
        (Reverse(self.severity), self.subject.primary(), self.subject.secondary(), self.kind)
            .cmp( &(Reverse(other.severity), other.subject.primary(), other.subject.secondary(), other.kind))
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity.name(), self.description)
    }
}

/// sort conflicts into their canonical order: severity descending, then subject callsign(s), then kind
pub fn sort_conflicts (conflicts: &mut [Conflict]) {
    conflicts.sort_by(|a,b| a.order_cmp(b));
}

/// human readable multi-line summary of a conflict list
pub fn summarize<'a> (conflicts: impl IntoIterator<Item=&'a Conflict>)->String {
    let by_severity = conflicts.into_iter().into_group_map_by(|c| c.severity);
    if by_severity.is_empty() { return "no conflicts".to_string() }

    let mut lines: Vec<String> = Vec::new();
    if let Some(critical) = by_severity.get(&Severity::Critical) {
        lines.push( format!("CRITICAL: {} conflicts", critical.len()));
        for c in critical { lines.push( format!("  - {}", c.description)) }
    }
    if let Some(warning) = by_severity.get(&Severity::Warning) {
        lines.push( format!("WARNING: {} conflicts", warning.len()));
        for c in warning { lines.push( format!("  - {}", c.description)) }
    }
    if let Some(advisory) = by_severity.get(&Severity::Advisory) {
        lines.push( format!("ADVISORY: {} predictions", advisory.len()));
    }
    lines.join("\n")
}

/* #endregion conflict records */


/* #region detector ***********************************************************************************************/

#[derive(Debug,Clone,Default)]
pub struct ConflictDetector {
    rules: ConflictRules,
}

impl ConflictDetector {
    pub fn new (rules: ConflictRules)->Self { ConflictDetector { rules } }

    pub fn rules (&self)->&ConflictRules { &self.rules }

    /// run all conflict rules on the given aircraft and runway occupancy. The result is sorted canonically. A pair
    /// that is still compliant but predicted to lose separation can have both a current and a predicted conflict
    pub fn detect (&self, aircraft: &[AircraftView], occupancy: &RunwayOccupancy, now: EpochMillis)->Vec<Conflict> {
        let mut conflicts: Vec<Conflict> = Vec::new();

        let mut airborne: Vec<&AircraftView> = aircraft.iter().filter(|ac| ac.is_airborne() && ac.position.is_some()).collect();
        airborne.sort_by(|a,b| a.callsign.cmp(&b.callsign));

        for (a,b) in airborne.iter().tuple_combinations() {
            self.check_pair( a, b, now, &mut conflicts);
        }

        conflicts.extend( self.check_runways( aircraft, occupancy, now));

        sort_conflicts( &mut conflicts);
        conflicts
    }

    /// the effective separation minimum for a pair and the wake minimum if one applies. Wake minimums are only
    /// known if both categories are
    pub fn required_separation (&self, a: &AircraftView, b: &AircraftView)->(f64,Option<f64>) {
        let wake = match (a.wake, b.wake) {
            (Some(wa), Some(wb)) => wake_minimum_nm( wa, wb, &self.rules),
            _ => None
        };
        (self.rules.horizontal_separation_nm.max( wake.unwrap_or(0.0)), wake)
    }

    fn check_pair (&self, a: &AircraftView, b: &AircraftView, now: EpochMillis, conflicts: &mut Vec<Conflict>) {
        let Some(d) = a.distance_nm(b) else { return };
        let (m, wake) = self.required_separation( a, b);

        conflicts.extend( self.check_separation( a, b, d, m, wake, now));
        if d >= m {
            conflicts.extend( self.check_prediction( a, b, d, m, now));
        }
    }

    fn check_separation (&self, a: &AircraftView, b: &AircraftView, d: f64, m: f64, wake: Option<f64>, now: EpochMillis)->Option<Conflict> {
        let h = self.rules.horizontal_separation_nm;
        if d >= m * self.rules.warning_factor { return None }

        let severity = if d < m { Severity::Critical } else { Severity::Warning };
        let is_wake = wake.is_some_and(|w| w > h) && d >= h;

        let (kind, description) = if is_wake {
            let (leader, follower) = if a.wake >= b.wake { (a,b) } else { (b,a) };
            (ConflictKind::WakeTurbulence,
             format!("wake turbulence: {} too close behind {} ({:.1}nm, need {:.1}nm)", follower.callsign, leader.callsign, d, m))
        } else {
            (ConflictKind::SeparationLoss,
             format!("separation: {} and {} are {:.2}nm apart (min: {:.1}nm)", a.callsign, b.callsign, d, m))
        };

        Some( Conflict {
            subject: ConflictSubject::pair( &a.callsign, &b.callsign),
            kind,
            severity,
            distance_nm: Some(d),
            required_nm: Some(m),
            predicted_nm: None,
            time_to_loss: None,
            occupant: None,
            timestamp: now,
            description
        })
    }

    /// extrapolate both aircraft in prediction steps and report the first step at which they are predicted
    /// to be closer than the applicable minimum
    fn check_prediction (&self, a: &AircraftView, b: &AircraftView, d: f64, m: f64, now: EpochMillis)->Option<Conflict> {
        if a.velocity.is_zero() && b.velocity.is_zero() { return None }

        let horizon = self.rules.prediction_horizon;
        for k in 1..=self.rules.prediction_steps() {
            let Some(t) = u32::try_from(k).ok().and_then(|k| self.rules.prediction_step.checked_mul(k)) else { return None };
            let (Some(pa), Some(pb)) = (a.predict(t), b.predict(t)) else { return None };
            let dp = pa.distance_nm(&pb);

            if dp < m {
                let severity = if t <= horizon / 4 { Severity::Critical }
                               else if t <= horizon / 2 { Severity::Warning }
                               else { Severity::Advisory };

                return Some( Conflict {
                    subject: ConflictSubject::pair( &a.callsign, &b.callsign),
                    kind: ConflictKind::PredictedSeparationLoss,
                    severity,
                    distance_nm: Some(d),
                    required_nm: Some(m),
                    predicted_nm: Some(dp),
                    time_to_loss: Some(t),
                    occupant: None,
                    timestamp: now,
                    description: format!("predicted in {}s: {} and {} will be {:.2}nm apart (min: {:.1}nm)", t.as_secs(), a.callsign, b.callsign, dp, m)
                })
            }
        }
        None
    }

    /// runway incursions: every occupied runway is checked for additional occupants and for aircraft that are
    /// inbound to or hold an unused clearance for it. These are critical regardless of distance
    fn check_runways (&self, aircraft: &[AircraftView], occupancy: &RunwayOccupancy, now: EpochMillis)->Vec<Conflict> {
        let mut conflicts: Vec<Conflict> = Vec::new();
        let by_callsign: BTreeMap<&str,&AircraftView> = aircraft.iter().map(|ac| (ac.callsign.as_str(), ac)).collect();

        for (rwy, occupants) in occupancy.occupied() {
            let Some(first) = occupants.first() else { continue };
            let first_ac = by_callsign.get(first.as_str());

            let mut intruders: Vec<&str> = occupants.iter().skip(1).map(|cs| cs.as_str()).collect();
            for ac in aircraft {
                if !occupants.contains(&ac.callsign) && (ac.is_inbound_to(rwy) || ac.is_cleared_for(rwy)) {
                    intruders.push( ac.callsign.as_str());
                }
            }
            intruders.sort();
            intruders.dedup();

            for cs in intruders {
                let distance_nm = match (by_callsign.get(cs), first_ac) {
                    (Some(a), Some(b)) => a.distance_nm(b),
                    _ => None
                };

                conflicts.push( Conflict {
                    subject: ConflictSubject::runway( cs, rwy),
                    kind: ConflictKind::RunwayIncursion,
                    severity: Severity::Critical,
                    distance_nm,
                    required_nm: None,
                    predicted_nm: None,
                    time_to_loss: None,
                    occupant: Some(first.clone()),
                    timestamp: now,
                    description: format!("runway incursion on {rwy}: {cs} while occupied by {first}")
                });
            }
        }
        conflicts
    }
}

/// smallest current distance between any two airborne aircraft
pub fn min_airborne_separation (aircraft: &[AircraftView])->Option<f64> {
    aircraft.iter()
        .filter(|ac| ac.is_airborne())
        .tuple_combinations()
        .filter_map(|(a,b)| a.distance_nm(b))
        .min_by(|a,b| a.total_cmp(b))
}

/* #endregion detector */


/* #region tracker ************************************************************************************************/

#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,Hash,IntoStaticStr)]
#[serde(rename_all="snake_case")]
#[strum(serialize_all="snake_case")]
pub enum ReportStatus {
    New,
    Ongoing,
    Resolved,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct ConflictReport {
    pub status: ReportStatus,
    pub first_detected: EpochMillis,
    pub conflict: Conflict,
}

/// the reports produced by correlating a new conflict list with the previous ones
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq,Default)]
pub struct TrackerUpdate {
    pub reports: Vec<ConflictReport>,  // new and ongoing, in canonical conflict order
    pub resolved: Vec<ConflictReport>, // reported once, in subject order
}

impl TrackerUpdate {
    pub fn new_conflicts (&self)->impl Iterator<Item=&ConflictReport> {
        self.reports.iter().filter(|r| r.status == ReportStatus::New)
    }
}

#[derive(Debug,Clone)]
struct ActiveConflict {
    conflict: Conflict,
    first_detected: EpochMillis,
}

/// correlates conflict lists across ticks by subject identity. Current and predicted separation conflicts of the
/// same pair are tracked independently
#[derive(Debug,Clone,Default)]
pub struct ConflictTracker {
    active: BTreeMap<(ConflictSubject,u8),ActiveConflict>,
}

impl ConflictTracker {
    pub fn new ()->Self { ConflictTracker { active: BTreeMap::new() } }

    pub fn update (&mut self, conflicts: Vec<Conflict>)->TrackerUpdate {
        let mut previous = std::mem::take( &mut self.active);
        let mut reports: Vec<ConflictReport> = Vec::with_capacity( conflicts.len());

        for conflict in conflicts {
            let key = conflict.track_key();
            if self.active.contains_key(&key) { continue } // duplicate in the same tick
            let subject = &conflict.subject;

            let (status, first_detected) = match previous.remove(&key) {
                Some(prev) => {
                    if prev.conflict.kind != conflict.kind || prev.conflict.severity != conflict.severity {
                        debug!("conflict {} changed to {:?}/{}", subject, conflict.kind, conflict.severity.name());
                    }
                    (ReportStatus::Ongoing, prev.first_detected)
                }
                None => {
                    if conflict.is_critical() { warn!("new conflict {}", conflict) } else { info!("new conflict {}", conflict) }
                    (ReportStatus::New, conflict.timestamp)
                }
            };

            reports.push( ConflictReport { status, first_detected, conflict: conflict.clone() });
            self.active.insert( key, ActiveConflict { conflict, first_detected });
        }

        // whatever is left from the previous tick is resolved
        let resolved: Vec<ConflictReport> = previous.into_values().map(|ac| {
            info!("resolved conflict {}", ac.conflict.subject);
            ConflictReport { status: ReportStatus::Resolved, first_detected: ac.first_detected, conflict: ac.conflict }
        }).collect();

        TrackerUpdate { reports, resolved }
    }

    pub fn len (&self)->usize { self.active.len() }
    pub fn is_empty (&self)->bool { self.active.is_empty() }

    pub fn active (&self)->Vec<&Conflict> {
        let mut list: Vec<&Conflict> = self.active.values().map(|ac| &ac.conflict).collect();
        list.sort_by(|a,b| a.order_cmp(b));
        list
    }

    pub fn conflicts_for (&self, callsign: &str)->Vec<&Conflict> {
        self.active().into_iter().filter(|c| c.involves(callsign)).collect()
    }

    pub fn has_critical (&self)->bool { self.active.values().any(|ac| ac.conflict.is_critical()) }

    pub fn summary (&self)->String { summarize( self.active()) }

    pub fn clear (&mut self) { self.active.clear() }
}

/* #endregion tracker */
