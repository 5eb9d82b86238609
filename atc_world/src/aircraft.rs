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
use serde::{Serialize,Deserialize};
use strum::IntoStaticStr;
use atc_common::{
    angle::Angle360,
    collections::RingBuffer,
    datetime::EpochMillis,
    geo::{GroundVelocity, Position, predict_position},
    is_none
};
use crate::{
    status::{AircraftStatus, StatusRequest, Transition, evaluate_transition},
    wake::WakeCategory
};

/// a timestamped position observation
#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq)]
pub struct Sample {
    pub position: Position,
    pub time: EpochMillis,
}

#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,Hash,IntoStaticStr)]
#[serde(rename_all="snake_case")]
#[strum(serialize_all="snake_case")]
pub enum ClearanceKind {
    Land,
    Takeoff,
    LineUp,
    Taxi,
    Pushback,
    GoAround,
}

/// the last clearance issued to an aircraft
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct Clearance {
    pub kind: ClearanceKind,
    #[serde(skip_serializing_if="is_none", default)]
    pub runway: Option<String>,
    #[serde(skip_serializing_if="is_none", default)]
    pub target_node: Option<String>,
    pub issued: EpochMillis,
}

impl Clearance {
    pub fn new (kind: ClearanceKind, runway: Option<String>, target_node: Option<String>, issued: EpochMillis)->Self {
        Clearance { kind, runway, target_node, issued }
    }

    /// the runway this clearance permits to enter, if any
    pub fn runway_entry (&self)->Option<&str> {
        match self.kind {
            ClearanceKind::Land | ClearanceKind::Takeoff | ClearanceKind::LineUp => self.runway.as_deref(),
            _ => None
        }
    }
}

impl fmt::Display for Clearance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind: &'static str = self.kind.into();
        write!(f, "{kind}")?;
        if let Some(rwy) = &self.runway { write!(f, " rwy {rwy}")?; }
        if let Some(node) = &self.target_node { write!(f, " to {node}")?; }
        Ok(())
    }
}

/// the persistent track of an aircraft, keyed by callsign. Aircraft are owned by the world model registry and
/// only exposed as immutable [`AircraftView`] records
#[derive(Debug,Clone)]
pub struct Aircraft {
    callsign: String,
    type_code: Option<String>,
    wake: Option<WakeCategory>,

    samples: RingBuffer<Sample>, // bounded position trace, oldest samples get evicted

    status: AircraftStatus,
    heading: Option<Angle360>, // as reported, not derived
    speed_kn: Option<f64>,     // as reported, not derived

    assigned_runway: Option<String>,
    clearance: Option<Clearance>,

    first_seen: EpochMillis,
    last_seen: EpochMillis,
    missed_ticks: u32,
}

impl Aircraft {
    pub fn new (callsign: impl ToString, type_code: Option<String>, status: AircraftStatus, position: Position, time: EpochMillis, max_history: usize)->Self {
        let wake = type_code.as_deref().and_then( WakeCategory::from_type_code);
        let mut samples = RingBuffer::new( max_history);
        samples.push( Sample { position, time });

        Aircraft {
            callsign: callsign.to_string(),
            type_code,
            wake,
            samples,
            status,
            heading: None,
            speed_kn: None,
            assigned_runway: None,
            clearance: None,
            first_seen: time,
            last_seen: time,
            missed_ticks: 0,
        }
    }

    pub fn callsign (&self)->&str { self.callsign.as_str() }
    pub fn type_code (&self)->Option<&str> { self.type_code.as_deref() }
    pub fn wake_category (&self)->Option<WakeCategory> { self.wake }
    pub fn status (&self)->AircraftStatus { self.status }
    pub fn heading (&self)->Option<Angle360> { self.heading }
    pub fn speed_kn (&self)->Option<f64> { self.speed_kn }
    pub fn assigned_runway (&self)->Option<&str> { self.assigned_runway.as_deref() }
    pub fn clearance (&self)->Option<&Clearance> { self.clearance.as_ref() }
    pub fn first_seen (&self)->EpochMillis { self.first_seen }
    pub fn last_seen (&self)->EpochMillis { self.last_seen }
    pub fn missed_ticks (&self)->u32 { self.missed_ticks }

    pub fn samples (&self)->&RingBuffer<Sample> { &self.samples }
    pub fn n_samples (&self)->usize { self.samples.len() }

    pub fn last_sample (&self)->Option<&Sample> { self.samples.last() }

    /// the most recent observed position. Aircraft are only created from valid observations so there
    /// always is one, the Option is for the (theoretical) case of a cleared trace
    pub fn position (&self)->Option<&Position> { self.samples.last().map(|s| &s.position) }

    /// add a new sample. Samples that are older than the last one are ignored (returning false), samples
    /// with the same timestamp replace the last one
    pub fn push_sample (&mut self, position: Position, time: EpochMillis)->bool {
        if let Some(last) = self.samples.last() {
            if time < last.time { return false }
            if time == last.time {
                self.samples.replace_last( Sample { position, time });
                self.last_seen = time;
                return true
            }
        }
        self.samples.push( Sample { position, time });
        self.last_seen = time;
        true
    }

    /// velocity derived from the two most recent samples. Tracks with a single sample are not moving
    pub fn velocity (&self)->GroundVelocity {
        match self.samples.last_two() {
            Some((s1,s2)) => GroundVelocity::from_samples( &s1.position, s1.time, &s2.position, s2.time),
            None => GroundVelocity::zero()
        }
    }

    /// straight line extrapolation of the current position
    pub fn predict (&self, dt: Duration)->Option<Position> {
        self.position().map(|p| predict_position( p, &self.velocity(), dt))
    }

    pub fn separation_nm (&self, other: &Aircraft)->Option<f64> {
        match (self.position(), other.position()) {
            (Some(p1), Some(p2)) => Some( p1.distance_nm(p2)),
            _ => None
        }
    }

    //--- registry mutators

    pub(crate) fn set_reported (&mut self, heading: Option<Angle360>, speed_kn: Option<f64>) {
        if heading.is_some() { self.heading = heading }
        if speed_kn.is_some() { self.speed_kn = speed_kn }
    }

    /// type codes can show up late (e.g. strip read after radar label). A known wake category is kept if the
    /// new code does not map to one
    pub(crate) fn set_type_code (&mut self, type_code: &str) {
        if self.type_code.as_deref() != Some(type_code) {
            self.type_code = Some(type_code.to_string());
            if let Some(wake) = WakeCategory::from_type_code(type_code) { self.wake = Some(wake) }
        }
    }

    pub(crate) fn assign_runway (&mut self, runway: Option<String>) { self.assigned_runway = runway }

    pub(crate) fn set_clearance (&mut self, clearance: Option<Clearance>) { self.clearance = clearance }

    pub(crate) fn reset_missed (&mut self) { self.missed_ticks = 0 }

    pub(crate) fn mark_missed (&mut self)->u32 {
        self.missed_ticks += 1;
        self.missed_ticks
    }

    /// evaluate a status request against the current status and apply it if it is a legal change.
    /// The caller is responsible for handling `Remove` and reporting rejections
    pub fn apply_request (&mut self, request: StatusRequest)->Transition {
        let transition = evaluate_transition( self.status, request);
        if let Transition::Changed{to,..} = transition {
            self.status = to;
        }
        transition
    }

    pub fn view (&self)->AircraftView {
        AircraftView {
            callsign: self.callsign.clone(),
            type_code: self.type_code.clone(),
            wake: self.wake,
            status: self.status,
            position: self.position().copied(),
            velocity: self.velocity(),
            heading: self.heading,
            speed_kn: self.speed_kn,
            assigned_runway: self.assigned_runway.clone(),
            clearance: self.clearance.clone(),
            first_seen: self.first_seen,
            last_seen: self.last_seen,
            missed_ticks: self.missed_ticks,
            n_samples: self.samples.len(),
        }
    }
}

impl fmt::Display for Aircraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "Aircraft( cs: {}, status: {}", self.callsign, self.status)?;
        if let Some(tc) = &self.type_code { write!( f, ", type: {tc}")?; }
        if let Some(p) = self.position() { write!( f, ", pos: {p}")?; }
        if self.samples.len() > 1 { write!( f, ", vel: {}, n_pos: {}", self.velocity(), self.samples.len())?; }
        if let Some(rwy) = &self.assigned_runway { write!( f, ", rwy: {rwy}")?; }
        if let Some(clr) = &self.clearance { write!( f, ", clr: {clr}")?; }
        write!( f, ", time: {} )", self.last_seen)
    }
}

/// immutable record of an aircraft as published in world snapshots and consumed by the conflict detector
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct AircraftView {
    pub callsign: String,
    #[serde(skip_serializing_if="is_none", default)]
    pub type_code: Option<String>,
    #[serde(skip_serializing_if="is_none", default)]
    pub wake: Option<WakeCategory>,
    pub status: AircraftStatus,
    pub position: Option<Position>,
    pub velocity: GroundVelocity,
    #[serde(skip_serializing_if="is_none", default)]
    pub heading: Option<Angle360>,
    #[serde(skip_serializing_if="is_none", default)]
    pub speed_kn: Option<f64>,
    #[serde(skip_serializing_if="is_none", default)]
    pub assigned_runway: Option<String>,
    #[serde(skip_serializing_if="is_none", default)]
    pub clearance: Option<Clearance>,
    pub first_seen: EpochMillis,
    pub last_seen: EpochMillis,
    pub missed_ticks: u32,
    pub n_samples: usize,
}

impl AircraftView {
    pub fn is_airborne (&self)->bool { self.status.is_airborne() }

    pub fn predict (&self, dt: Duration)->Option<Position> {
        self.position.as_ref().map(|p| predict_position( p, &self.velocity, dt))
    }

    pub fn distance_nm (&self, other: &AircraftView)->Option<f64> {
        match (&self.position, &other.position) {
            (Some(p1), Some(p2)) => Some( p1.distance_nm(p2)),
            _ => None
        }
    }

    /// does this aircraft hold a clearance to enter (land on, take off from, line up on) the given runway which
    /// it has not used yet. Clearances of aircraft that already departed or vacated are spent
    pub fn is_cleared_for (&self, runway: &str)->bool {
        use AircraftStatus::*;
        match &self.clearance {
            Some(clr) if clr.runway_entry() == Some(runway) => match clr.kind {
                ClearanceKind::Land => matches!( self.status, Arriving | OnApproach | Landing),
                _ => matches!( self.status, AtGate | Pushback | TaxiOut | LineUp)
            },
            _ => false
        }
    }

    /// is this aircraft approaching or landing on the given runway
    pub fn is_inbound_to (&self, runway: &str)->bool {
        matches!( self.status, AircraftStatus::OnApproach | AircraftStatus::Landing)
            && self.assigned_runway.as_deref() == Some(runway)
    }
}
