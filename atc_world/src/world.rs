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

//! the world model - the single owner of the aircraft registry.
//! Each [`WorldModel::tick`] ingests one perception snapshot, updates the registry, runs the conflict detector
//! and publishes an immutable [`WorldSnapshot`]. Mutation only happens inside `&mut self` calls, the published
//! snapshots are the only state that is visible to the outside

use std::{collections::{BTreeMap,HashSet}, fmt::Write as FmtWrite, sync::Arc, time::{Duration, Instant}};
use serde::{Serialize,Deserialize};
use tracing::{debug,info,warn};
use atc_common::{datetime::EpochMillis, geo::{Position, Wind}, ron::to_typed_compact_ron};
use crate::{
    aircraft::{Aircraft, AircraftView},
    command::Command,
    config::WorldConfig,
    conflict::{summarize, min_airborne_separation, Conflict, ConflictDetector, ConflictReport, ConflictTracker},
    errors::{AtcError, Result},
    fuzzy::{CallsignMatch, CallsignMatcher},
    occupancy::RunwayOccupancy,
    perception::{AircraftObservation, PerceptionSnapshot},
    stats::SessionStats,
    status::{AircraftStatus, StatusRequest, Transition},
    topology::{AirportTopology, PathResult}
};

/* #region WorldSnapshot ******************************************************************************************/

/// the immutable world state published at the end of each tick
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub timestamp: EpochMillis,
    pub aircraft: Vec<AircraftView>,     // sorted by callsign
    pub conflicts: Vec<ConflictReport>,  // new and ongoing, canonical conflict order
    pub resolved: Vec<ConflictReport>,   // conflicts that disappeared in this tick
    pub occupancy: RunwayOccupancy,
    pub wind: Wind,
    pub active_runways: Vec<String>,
    pub summary: String,
    pub tick_duration: Duration,
    pub overrun: bool,
}

impl WorldSnapshot {
    pub fn empty (timestamp: EpochMillis)->Self {
        WorldSnapshot {
            tick: 0,
            timestamp,
            aircraft: Vec::new(),
            conflicts: Vec::new(),
            resolved: Vec::new(),
            occupancy: RunwayOccupancy::default(),
            wind: Wind::calm(),
            active_runways: Vec::new(),
            summary: String::new(),
            tick_duration: Duration::ZERO,
            overrun: false
        }
    }

    pub fn aircraft (&self, callsign: &str)->Option<&AircraftView> {
        self.aircraft.iter().find(|ac| ac.callsign == callsign)
    }

    pub fn contains (&self, callsign: &str)->bool { self.aircraft(callsign).is_some() }

    pub fn conflict_list (&self)->impl Iterator<Item=&Conflict> { self.conflicts.iter().map(|r| &r.conflict) }

    pub fn has_critical (&self)->bool { self.conflict_list().any(|c| c.is_critical()) }

    pub fn is_runway_clear (&self, runway: &str)->bool { self.occupancy.is_clear(runway) }

    pub fn to_json (&self)->Result<String> { Ok( serde_json::to_string(self)?) }

    /// single line RON record, e.g. for research logs
    pub fn to_ron (&self)->Result<String> { Ok( to_typed_compact_ron(self)?) }
}

/* #endregion WorldSnapshot */


/* #region WorldModel *********************************************************************************************/

pub struct WorldModel {
    config: WorldConfig,
    topology: Arc<AirportTopology>,
    detector: ConflictDetector,
    tracker: ConflictTracker,
    matcher: CallsignMatcher,

    registry: BTreeMap<String,Aircraft>,
    wind: Wind,
    active_runways: Vec<String>,
    occupancy: RunwayOccupancy,

    last_snapshot: Arc<WorldSnapshot>,
    stats: SessionStats,
}

impl WorldModel {
    pub fn new (config: WorldConfig, topology: Arc<AirportTopology>)->Result<Self> {
        config.validate()?;
        let detector = ConflictDetector::new( config.rules.clone());
        let now = EpochMillis::now();
        info!("starting world model for {}", topology.airport());

        Ok( WorldModel {
            config,
            topology,
            detector,
            tracker: ConflictTracker::new(),
            matcher: CallsignMatcher::default(),
            registry: BTreeMap::new(),
            wind: Wind::calm(),
            active_runways: Vec::new(),
            occupancy: RunwayOccupancy::default(),
            last_snapshot: Arc::new( WorldSnapshot::empty(now)),
            stats: SessionStats::new(now),
        })
    }

    pub fn with_matcher (mut self, matcher: CallsignMatcher)->Self {
        self.matcher = matcher;
        self
    }

    /// process one perception snapshot and publish the resulting world state. This never fails - invalid
    /// observations are skipped, illegal status hints are ignored and overruns are only reported
    pub fn tick (&mut self, input: &PerceptionSnapshot)->Arc<WorldSnapshot> {
        let start = Instant::now();
        let now = input.timestamp;
        let tick = self.last_snapshot.tick + 1;

        self.update_environment( input);

        self.stats.observations += input.aircraft.len() as u64;
        self.stats.observations_skipped += input.malformed as u64;

        let mut seen: HashSet<String> = HashSet::new();
        for obs in &input.aircraft {
            match obs.validate() {
                Ok(pos) => {
                    let key = obs.callsign_key();
                    self.ingest( &key, obs, pos, now);
                    seen.insert(key);
                }
                Err(e) => {
                    warn!("skipping observation of '{}': {}", obs.callsign, e);
                    self.stats.observations_skipped += 1;
                }
            }
        }

        self.evict_missing( &seen);

        let aircraft: Vec<AircraftView> = self.registry.values().map(|ac| ac.view()).collect();
        self.occupancy = RunwayOccupancy::compute( &aircraft, &self.topology, self.config.runway_margin_ft);

        let conflicts = self.detector.detect( &aircraft, &self.occupancy, now);
        if let Some(d) = min_airborne_separation( &aircraft) { self.stats.record_separation(d) }

        let update = self.tracker.update( conflicts);
        self.stats.record_reports( &update.reports);

        let summary = self.situation_summary( &aircraft);

        let tick_duration = start.elapsed();
        let overrun = tick_duration > self.config.frame_budget;
        if overrun {
            warn!("tick {} exceeded frame budget: {:?} > {:?}", tick, tick_duration, self.config.frame_budget);
        }
        self.stats.record_tick( tick_duration, overrun, aircraft.len());

        let snapshot = Arc::new( WorldSnapshot {
            tick,
            timestamp: now,
            aircraft,
            conflicts: update.reports,
            resolved: update.resolved,
            occupancy: self.occupancy.clone(),
            wind: self.wind,
            active_runways: self.active_runways.clone(),
            summary,
            tick_duration,
            overrun
        });
        debug!("tick {}: {} aircraft, {} conflicts", tick, snapshot.aircraft.len(), snapshot.conflicts.len());

        self.last_snapshot = snapshot.clone();
        snapshot
    }

    fn update_environment (&mut self, input: &PerceptionSnapshot) {
        if let Some(wind) = input.wind {
            self.wind = wind;
        }

        let mut active: Vec<String> = Vec::new();
        for rwy in &input.active_runways {
            if self.topology.has_runway(rwy) {
                if !active.contains(rwy) { active.push( rwy.clone()) }
            } else {
                warn!("ignoring unknown active runway {}", rwy);
            }
        }

        if active.is_empty() {
            active = self.topology.best_runways_for_wind( &self.wind).iter().map(|r| r.name.clone()).collect();
        }

        if active != self.active_runways {
            info!("active runways: {:?}", active);
            self.active_runways = active;
        }
    }

    /// create or update the registry entry for a valid observation
    fn ingest (&mut self, key: &str, obs: &AircraftObservation, pos: Position, now: EpochMillis) {
        let runway_hint = obs.runway.as_ref().filter(|rwy| {
            let known = self.topology.has_runway(rwy);
            if !known { debug!("ignoring unknown runway {} for {}", rwy, key) }
            known
        }).cloned();

        match self.registry.get_mut(key) {
            Some(ac) => {
                if !ac.push_sample( pos, now) {
                    debug!("ignoring out of order sample for {}", key);
                }
                ac.reset_missed();
                ac.set_reported( obs.reported_heading(), obs.speed);
                if let Some(tc) = &obs.type_code { ac.set_type_code(tc) }
                if runway_hint.is_some() { ac.assign_runway( runway_hint) }

                if let Some(hint) = obs.status {
                    apply_status_request( ac, StatusRequest::To(hint), &mut self.stats);
                }
            }
            None => {
                let status = obs.status.unwrap_or_else(|| self.infer_status( obs));
                let mut ac = Aircraft::new( key, obs.type_code.clone(), status, pos, now, self.config.max_history);
                ac.set_reported( obs.reported_heading(), obs.speed);
                ac.assign_runway( runway_hint);

                info!("new aircraft {}", ac);
                self.stats.aircraft_seen += 1;
                self.registry.insert( key.to_string(), ac);
            }
        }

        self.check_threshold_region( key);
    }

    /// initial status of aircraft we see for the first time without status hint
    fn infer_status (&self, obs: &AircraftObservation)->AircraftStatus {
        if obs.altitude_ft > self.config.airborne_altitude_ft {
            AircraftStatus::Arriving
        } else if obs.speed.is_some_and(|spd| spd > self.config.taxi_speed_kn) {
            AircraftStatus::TaxiIn
        } else {
            AircraftStatus::AtGate
        }
    }

    /// OnApproach -> Landing once the aircraft is within the threshold region of its (or any) runway
    fn check_threshold_region (&mut self, key: &str) {
        let Some(ac) = self.registry.get_mut(key) else { return };
        if ac.status() != AircraftStatus::OnApproach { return }
        let Some(pos) = ac.position().copied() else { return };
        let region = self.config.threshold_region_nm;

        let runway = match ac.assigned_runway().and_then(|rwy| self.topology.runway(rwy)) {
            Some(rwy) => (rwy.threshold_distance_nm(&pos) <= region).then(|| rwy.name.clone()),
            None => self.topology.runways()
                .map(|r| (r, r.threshold_distance_nm(&pos)))
                .filter(|(_,d)| *d <= region)
                .min_by(|(_,a),(_,b)| a.total_cmp(b))
                .map(|(r,_)| r.name.clone())
        };

        if let Some(rwy) = runway {
            if ac.assigned_runway() != Some(rwy.as_str()) {
                info!("{} assigned to runway {} on entering threshold region", key, rwy);
                ac.assign_runway( Some(rwy));
            }
            apply_status_request( ac, StatusRequest::To(AircraftStatus::Landing), &mut self.stats);
        }
    }

    fn evict_missing (&mut self, seen: &HashSet<String>) {
        let max_missed = self.config.max_missed_ticks;
        let mut evicted: Vec<String> = Vec::new();

        for (cs,ac) in self.registry.iter_mut() {
            if !seen.contains(cs) && ac.mark_missed() > max_missed {
                evicted.push( cs.clone());
            }
        }

        for cs in evicted {
            self.registry.remove(&cs);
            self.stats.aircraft_evicted += 1;
            info!("evicted {} after {} missed ticks", cs, max_missed + 1);
        }
    }

    fn situation_summary (&self, aircraft: &[AircraftView])->String {
        let mut s = String::with_capacity(512);
        let n_airborne = aircraft.iter().filter(|ac| ac.is_airborne()).count();

        let _ = writeln!( s, "aircraft: {} ({} airborne)", aircraft.len(), n_airborne);
        let _ = writeln!( s, "active runways: {}", if self.active_runways.is_empty() { "none".to_string() } else { self.active_runways.join(", ") });
        let _ = writeln!( s, "wind: {}", self.wind);

        let mut by_status: BTreeMap<AircraftStatus,usize> = BTreeMap::new();
        for ac in aircraft { *by_status.entry(ac.status).or_default() += 1 }
        for (status,n) in by_status {
            let _ = writeln!( s, "  {}: {}", status, n);
        }

        s.push_str( &summarize( self.tracker.active()));
        s
    }

    //--- commands and explicit transitions

    /// apply a controller command to an aircraft. Referenced runways and nodes have to exist. The implied status
    /// change is subject to the transition rules - an illegal one is logged and ignored, the clearance is still
    /// recorded. Returns the status transition the command caused
    pub fn apply_command (&mut self, callsign: &str, command: &Command)->Result<Transition> {
        let key = callsign.trim().to_uppercase();
        if !self.registry.contains_key(&key) { return Err( AtcError::UnknownAircraft(callsign.to_string())) }

        if let Some(rwy) = command.runway() {
            if !self.topology.has_runway(rwy) { return Err( AtcError::UnknownRunway(rwy.to_string())) }
        }
        if let Command::Taxi{to_node} = command {
            if !self.topology.has_node(to_node) { return Err( AtcError::UnknownNode(to_node.clone())) }
        }

        let now = self.last_snapshot.timestamp;
        let Some(ac) = self.registry.get_mut(&key) else { return Err( AtcError::UnknownAircraft(callsign.to_string())) };
        self.stats.commands += 1;
        info!("{}: {}", key, command);

        if let Some(rwy) = command.runway() { ac.assign_runway( Some(rwy.to_string())) }
        if let Some(clearance) = command.clearance(now) { ac.set_clearance( Some(clearance)) }

        let transition = match command.status_request( ac.status()) {
            Some(request) => apply_status_request( ac, request, &mut self.stats),
            None => Transition::Unchanged
        };

        if transition == Transition::Remove { self.remove(&key) }
        Ok(transition)
    }

    /// explicitly request a status change. Illegal requests are not errors, they are ignored and reported
    /// as `Transition::Rejected`
    pub fn request_transition (&mut self, callsign: &str, request: StatusRequest)->Result<Transition> {
        let key = callsign.trim().to_uppercase();
        let Some(ac) = self.registry.get_mut(&key) else { return Err( AtcError::UnknownAircraft(callsign.to_string())) };

        let transition = apply_status_request( ac, request, &mut self.stats);
        if transition == Transition::Remove { self.remove(&key) }
        Ok(transition)
    }

    fn remove (&mut self, key: &str) {
        if self.registry.remove(key).is_some() {
            self.stats.aircraft_removed += 1;
            info!("removed {}", key);
        }
    }

    //--- queries

    pub fn config (&self)->&WorldConfig { &self.config }
    pub fn topology (&self)->&Arc<AirportTopology> { &self.topology }
    pub fn snapshot (&self)->Arc<WorldSnapshot> { self.last_snapshot.clone() }
    pub fn stats (&self)->&SessionStats { &self.stats }
    pub fn wind (&self)->Wind { self.wind }
    pub fn active_runways (&self)->&[String] { self.active_runways.as_slice() }

    pub fn len (&self)->usize { self.registry.len() }
    pub fn is_empty (&self)->bool { self.registry.is_empty() }

    pub fn callsigns (&self)->Vec<&str> { self.registry.keys().map(|k| k.as_str()).collect() }

    pub fn aircraft (&self, callsign: &str)->Option<AircraftView> {
        self.registry.get( &callsign.trim().to_uppercase()).map(|ac| ac.view())
    }

    pub fn aircraft_by_status (&self, status: AircraftStatus)->Vec<AircraftView> {
        self.registry.values().filter(|ac| ac.status() == status).map(|ac| ac.view()).collect()
    }

    /// the `n` aircraft closest to the given one as (callsign, distance_nm), closest first
    pub fn closest_aircraft (&self, callsign: &str, n: usize)->Result<Vec<(String,f64)>> {
        let key = callsign.trim().to_uppercase();
        let target = self.registry.get(&key).ok_or_else(|| AtcError::UnknownAircraft(callsign.to_string()))?;

        let mut list: Vec<(String,f64)> = self.registry.values()
            .filter(|ac| ac.callsign() != key)
            .filter_map(|ac| target.separation_nm(ac).map(|d| (ac.callsign().to_string(), d)))
            .collect();
        list.sort_by(|(ca,a),(cb,b)| a.total_cmp(b).then_with(|| ca.cmp(cb)));
        list.truncate(n);
        Ok(list)
    }

    /// is the runway unoccupied as of the last tick
    pub fn is_runway_clear (&self, runway: &str)->Result<bool> {
        if !self.topology.has_runway(runway) { return Err( AtcError::UnknownRunway(runway.to_string())) }
        Ok( self.occupancy.is_clear(runway))
    }

    pub fn conflicts_for (&self, callsign: &str)->Vec<Conflict> {
        self.tracker.conflicts_for( &callsign.trim().to_uppercase()).into_iter().cloned().collect()
    }

    pub fn has_critical_conflicts (&self)->bool { self.tracker.has_critical() }

    /// map a (possibly garbled) callsign reading onto a tracked aircraft. This is a read-only lookup
    pub fn resolve_callsign (&self, text: &str)->Option<CallsignMatch> {
        let known = self.callsigns();
        self.matcher.match_callsign( text, &known)
    }

    /// taxi route from the ground node closest to the aircraft to the given node
    pub fn taxi_route (&self, callsign: &str, to_node: &str)->Result<PathResult> {
        let key = callsign.trim().to_uppercase();
        let ac = self.registry.get(&key).ok_or_else(|| AtcError::UnknownAircraft(callsign.to_string()))?;
        let pos = ac.position().ok_or_else(|| AtcError::UnknownAircraft(callsign.to_string()))?;
        let from = self.topology.closest_node(pos).ok_or_else(|| AtcError::UnknownNode(to_node.to_string()))?;
        self.topology.shortest_path( &from.id, to_node)
    }

    /// end the session and return its statistics
    pub fn shutdown (self)->SessionStats {
        let mut stats = self.stats;
        stats.ended = Some( self.last_snapshot.timestamp.max( stats.started));
        info!("world model for {} shut down:\n{}", self.topology.airport(), stats);
        stats
    }
}

/// evaluate and apply a status request, logging illegal requests and counting operations
fn apply_status_request (ac: &mut Aircraft, request: StatusRequest, stats: &mut SessionStats)->Transition {
    let transition = ac.apply_request( request);
    match transition {
        Transition::Changed{from,to} => {
            info!("{}: {} -> {}", ac.callsign(), from, to);
            match (from,to) {
                (AircraftStatus::Landing, AircraftStatus::TaxiIn) => stats.landings += 1,
                (AircraftStatus::LineUp, AircraftStatus::Departing) => stats.takeoffs += 1,
                _ => {}
            }
        }
        Transition::Rejected{from,to} => {
            warn!("{}: ignoring illegal transition {} -> {}", ac.callsign(), from, to);
            stats.illegal_transitions += 1;
        }
        Transition::Unchanged | Transition::Remove => {}
    }
    transition
}

/* #endregion WorldModel */
