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
use crate::{
    aircraft::{Clearance, ClearanceKind},
    status::{AircraftStatus, StatusRequest}
};
use atc_common::datetime::EpochMillis;

/// controller instructions as issued by the reasoning layer. Each command maps to a clearance and/or runway
/// assignment plus at most one status request, which is subject to the normal transition rules
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(tag="command", rename_all="snake_case")]
pub enum Command {
    ClearToLand { runway: String },
    ClearForTakeoff { runway: String },
    LineUpAndWait { runway: String },
    Taxi { to_node: String },
    Pushback,
    GoAround,
    AssignRunway { runway: String },
    Remove,
}

impl Command {
    /// the runway this command refers to, which has to exist in the topology
    pub fn runway (&self)->Option<&str> {
        match self {
            Command::ClearToLand{runway} | Command::ClearForTakeoff{runway} | Command::LineUpAndWait{runway} | Command::AssignRunway{runway} => Some(runway.as_str()),
            _ => None
        }
    }

    /// the clearance this command issues (if any)
    pub fn clearance (&self, issued: EpochMillis)->Option<Clearance> {
        let rwy = self.runway().map(|r| r.to_string());
        match self {
            Command::ClearToLand{..} => Some( Clearance::new( ClearanceKind::Land, rwy, None, issued)),
            Command::ClearForTakeoff{..} => Some( Clearance::new( ClearanceKind::Takeoff, rwy, None, issued)),
            Command::LineUpAndWait{..} => Some( Clearance::new( ClearanceKind::LineUp, rwy, None, issued)),
            Command::Taxi{to_node} => Some( Clearance::new( ClearanceKind::Taxi, None, Some(to_node.clone()), issued)),
            Command::Pushback => Some( Clearance::new( ClearanceKind::Pushback, None, None, issued)),
            Command::GoAround => Some( Clearance::new( ClearanceKind::GoAround, None, None, issued)),
            Command::AssignRunway{..} | Command::Remove => None
        }
    }

    /// the status change implied by this command for an aircraft in `current` status
    pub fn status_request (&self, current: AircraftStatus)->Option<StatusRequest> {
        use AircraftStatus::*;
        match self {
            Command::ClearToLand{..} => if current == Arriving { Some( StatusRequest::To(OnApproach)) } else { None },
            Command::ClearForTakeoff{..} => Some( StatusRequest::To(Departing)),
            Command::LineUpAndWait{..} => Some( StatusRequest::To(LineUp)),
            Command::Taxi{..} => match current {
                Landing => Some( StatusRequest::To(TaxiIn)),
                Pushback => Some( StatusRequest::To(TaxiOut)),
                _ => None
            },
            Command::Pushback => Some( StatusRequest::To(Pushback)),
            Command::GoAround => if current == Landing { Some( StatusRequest::To(OnApproach)) } else { None },
            Command::AssignRunway{..} => None,
            Command::Remove => Some( StatusRequest::Removed),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::ClearToLand{runway} => write!(f, "cleared to land runway {runway}"),
            Command::ClearForTakeoff{runway} => write!(f, "cleared for takeoff runway {runway}"),
            Command::LineUpAndWait{runway} => write!(f, "line up and wait runway {runway}"),
            Command::Taxi{to_node} => write!(f, "taxi to {to_node}"),
            Command::Pushback => write!(f, "pushback approved"),
            Command::GoAround => write!(f, "go around"),
            Command::AssignRunway{runway} => write!(f, "expect runway {runway}"),
            Command::Remove => write!(f, "remove"),
        }
    }
}
