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

#![allow(unused)]

//! tower situational awareness: aircraft registry with phase state machine, airport ground topology,
//! separation / wake / runway incursion / predictive conflict detection and the per-frame world model

pub mod errors;
pub mod config;
pub mod status;
pub mod wake;
pub mod runway;
pub mod topology;
pub mod aircraft;
pub mod command;
pub mod occupancy;
pub mod conflict;
pub mod perception;
pub mod fuzzy;
pub mod stats;
pub mod world;

pub use errors::{AtcError, Result};
pub use config::{ConflictRules, WorldConfig};
pub use status::{AircraftStatus, StatusRequest, Transition};
pub use wake::WakeCategory;
pub use runway::Runway;
pub use topology::{AirportTopology, PathResult, Route, TopologyConfig};
pub use aircraft::{Aircraft, AircraftView, Clearance, ClearanceKind};
pub use command::Command;
pub use occupancy::RunwayOccupancy;
pub use conflict::{Conflict, ConflictDetector, ConflictKind, ConflictReport, ConflictSubject, ConflictTracker, ReportStatus, Severity};
pub use perception::{AircraftObservation, PerceptionSnapshot};
pub use fuzzy::{CallsignMatch, CallsignMatcher};
pub use stats::SessionStats;
pub use world::{WorldModel, WorldSnapshot};
