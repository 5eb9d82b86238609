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

/// the closed set of aircraft phases and the transition rule between them.
/// Phases are ordered along the canonical arrival -> turnaround -> departure sequence. Only transitions to
/// adjacent phases (in either direction, e.g. a go-around from `Landing` back to `OnApproach`) are legal.
/// Removal of an aircraft is not a phase but a universal request that is always legal

use std::fmt;
use serde::{Serialize,Deserialize};
use strum::{EnumIter, IntoStaticStr};

#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,Hash,PartialOrd,Ord,EnumIter,IntoStaticStr)]
#[serde(rename_all="snake_case")]
#[strum(serialize_all="snake_case")]
pub enum AircraftStatus {
    Arriving,
    OnApproach,
    Landing,
    TaxiIn,
    AtGate,
    Pushback,
    TaxiOut,
    LineUp,
    Departing,
}

impl AircraftStatus {
    /// position in the canonical phase ordering
    pub fn ordinal (&self)->usize { *self as usize }

    pub fn name (&self)->&'static str { self.into() }

    pub fn is_airborne (&self)->bool {
        matches!( self, AircraftStatus::Arriving | AircraftStatus::OnApproach | AircraftStatus::Departing)
    }

    pub fn is_on_ground (&self)->bool { !self.is_airborne() }

    /// phases in which an aircraft with an assigned runway is physically on that runway
    pub fn occupies_assigned_runway (&self)->bool {
        matches!( self, AircraftStatus::Landing | AircraftStatus::LineUp)
    }

    pub fn is_adjacent_to (&self, other: &AircraftStatus)->bool {
        self.ordinal().abs_diff( other.ordinal()) == 1
    }

    /// is a transition from self to `target` legal. Staying in the same phase is a legal no-op
    pub fn can_transition_to (&self, target: &AircraftStatus)->bool {
        self == target || self.is_adjacent_to(target)
    }

    pub fn next (&self)->Option<AircraftStatus> {
        use AircraftStatus::*;
        match self {
            Arriving => Some(OnApproach),
            OnApproach => Some(Landing),
            Landing => Some(TaxiIn),
            TaxiIn => Some(AtGate),
            AtGate => Some(Pushback),
            Pushback => Some(TaxiOut),
            TaxiOut => Some(LineUp),
            LineUp => Some(Departing),
            Departing => None
        }
    }
}

impl fmt::Display for AircraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// a requested status change, coming from commands, perception hints or geometric facts
#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq)]
pub enum StatusRequest {
    To(AircraftStatus),
    Removed
}

/// outcome of evaluating a [`StatusRequest`] against a current status
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum Transition {
    Unchanged,
    Changed{ from: AircraftStatus, to: AircraftStatus },
    Remove,
    Rejected{ from: AircraftStatus, to: AircraftStatus },
}

pub fn evaluate_transition (current: AircraftStatus, request: StatusRequest)->Transition {
    match request {
        StatusRequest::Removed => Transition::Remove,
        StatusRequest::To(target) => {
            if target == current {
                Transition::Unchanged
            } else if current.is_adjacent_to(&target) {
                Transition::Changed{ from: current, to: target }
            } else {
                Transition::Rejected{ from: current, to: target }
            }
        }
    }
}
