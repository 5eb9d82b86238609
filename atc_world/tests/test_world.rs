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

use std::{sync::Arc, time::Duration};
use atc_common::{angle::Angle360, datetime::EpochMillis, geo::{Position, Wind}};
use atc_world::{
    command::Command, config::WorldConfig, conflict::{ConflictKind, ConflictSubject, ReportStatus, Severity},
    errors::AtcError, perception::*, status::*, topology::AirportTopology, world::*
};

fn init_logging () {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn ktst ()->Arc<AirportTopology> { Arc::new( AirportTopology::load("configs/ktst.ron").unwrap()) }

fn world ()->WorldModel {
    init_logging();
    WorldModel::new( WorldConfig::default(), ktst()).unwrap()
}

fn t (secs: i64)->EpochMillis { EpochMillis::from_secs(secs) }

/// observation at a given bearing/distance from a topology node
fn obs_near (topo: &AirportTopology, callsign: &str, node: &str, bearing: f64, dist_nm: f64, alt_ft: f64)->AircraftObservation {
    let p = topo.node(node).unwrap().position.destination( Angle360::from_degrees(bearing), dist_nm);
    AircraftObservation::new( callsign, p.lat_deg(), p.lon_deg(), alt_ft)
}

#[test]
fn test_basic_tick () {
    let mut world = world();
    let topo = world.topology().clone();

    let input = PerceptionSnapshot::new( t(1000))
        .with_aircraft( obs_near( &topo, " ual123 ", "27_threshold", 90.0, 8.0, 3000.0).with_type("B738"))
        .with_aircraft( obs_near( &topo, "SWA9", "gate_a1", 0.0, 0.0, 10.0))
        .with_aircraft( obs_near( &topo, "DAL7", "a2", 0.0, 0.0, 10.0).with_speed(15.0));

    let snap = world.tick( &input);
    println!("{}", snap.summary);

    assert_eq!( snap.tick, 1);
    assert_eq!( snap.timestamp, t(1000));
    let callsigns: Vec<&str> = snap.aircraft.iter().map(|ac| ac.callsign.as_str()).collect();
    assert_eq!( callsigns, vec!["DAL7", "SWA9", "UAL123"]);

    assert_eq!( snap.aircraft("UAL123").unwrap().status, AircraftStatus::Arriving);
    assert_eq!( snap.aircraft("SWA9").unwrap().status, AircraftStatus::AtGate);
    assert_eq!( snap.aircraft("DAL7").unwrap().status, AircraftStatus::TaxiIn);
    assert!( snap.conflicts.is_empty());
    assert_eq!( snap.active_runways, vec!["09", "27", "18", "36"]); // calm

    // queries are case insensitive
    assert_eq!( world.aircraft("ual123").unwrap().type_code.as_deref(), Some("B738"));
    assert_eq!( world.len(), 3);
    assert_eq!( world.aircraft_by_status( AircraftStatus::AtGate).len(), 1);

    let snap2 = world.tick( &PerceptionSnapshot::new( t(1001)).with_wind( Wind::new( 270.0, 10.0)));
    assert_eq!( snap2.tick, 2);
    assert_eq!( snap2.active_runways, vec!["27"]);
    assert_eq!( snap.tick, 1); // published snapshots are immutable

    let snap3 = world.tick( &PerceptionSnapshot::new( t(1002)).with_active_runways( &["09", "99"]));
    assert_eq!( snap3.active_runways, vec!["09"]);
    assert_eq!( snap3.wind, Wind::new( 270.0, 10.0)); // last reported wind is kept
}

#[test]
fn test_status_hints () {
    let mut world = world();
    let topo = world.topology().clone();
    let gate = || obs_near( &topo, "SWA9", "gate_a1", 0.0, 0.0, 10.0);

    world.tick( &PerceptionSnapshot::new( t(0)).with_aircraft( gate()));
    assert_eq!( world.aircraft("SWA9").unwrap().status, AircraftStatus::AtGate);

    // illegal hint is ignored
    world.tick( &PerceptionSnapshot::new( t(1)).with_aircraft( gate().with_status( AircraftStatus::Departing)));
    assert_eq!( world.aircraft("SWA9").unwrap().status, AircraftStatus::AtGate);
    assert_eq!( world.stats().illegal_transitions, 1);

    world.tick( &PerceptionSnapshot::new( t(2)).with_aircraft( gate().with_status( AircraftStatus::Pushback)));
    assert_eq!( world.aircraft("SWA9").unwrap().status, AircraftStatus::Pushback);

    // explicit requests
    assert_eq!( world.request_transition( "SWA9", StatusRequest::To(AircraftStatus::LineUp)).unwrap(),
                Transition::Rejected{ from: AircraftStatus::Pushback, to: AircraftStatus::LineUp });
    assert!( matches!( world.request_transition( "NOPE", StatusRequest::Removed), Err(AtcError::UnknownAircraft(_))));
    assert_eq!( world.request_transition( "swa9", StatusRequest::Removed).unwrap(), Transition::Remove);
    assert!( world.is_empty());
    assert_eq!( world.stats().aircraft_removed, 1);
}

#[test]
fn test_eviction () {
    let mut world = world(); // max_missed_ticks: 3
    let topo = world.topology().clone();

    world.tick( &PerceptionSnapshot::new( t(0)).with_aircraft( obs_near( &topo, "SWA9", "gate_a1", 0.0, 0.0, 10.0)));
    for i in 1..=3 {
        let snap = world.tick( &PerceptionSnapshot::new( t(i)));
        assert!( snap.contains("SWA9"), "evicted too early in tick {}", snap.tick);
        assert_eq!( snap.aircraft("SWA9").unwrap().missed_ticks, i as u32);
    }
    let snap = world.tick( &PerceptionSnapshot::new( t(4)));
    assert!( !snap.contains("SWA9"));
    assert_eq!( world.stats().aircraft_evicted, 1);

    // a re-appearing aircraft resets its missed count
    world.tick( &PerceptionSnapshot::new( t(5)).with_aircraft( obs_near( &topo, "DAL7", "ramp", 0.0, 0.0, 10.0)));
    world.tick( &PerceptionSnapshot::new( t(6)));
    world.tick( &PerceptionSnapshot::new( t(7)).with_aircraft( obs_near( &topo, "DAL7", "ramp", 0.0, 0.0, 10.0)));
    assert_eq!( world.aircraft("DAL7").unwrap().missed_ticks, 0);
}

#[test]
fn test_evicted_aircraft_leave_conflict_evaluation () {
    let mut world = world(); // max_missed_ticks: 3
    let topo = world.topology().clone();
    let aal1 = || obs_near( &topo, "AAL1", "36_threshold", 180.0, 10.0, 5000.0);
    let baw2 = || obs_near( &topo, "BAW2", "36_threshold", 180.0, 12.0, 5000.0);

    let snap = world.tick( &PerceptionSnapshot::new( t(0)).with_aircraft( aal1()).with_aircraft( baw2()));
    assert_eq!( snap.conflicts.len(), 1);
    assert_eq!( snap.conflicts[0].status, ReportStatus::New);
    assert_eq!( snap.conflicts[0].conflict.subject, ConflictSubject::pair( "AAL1", "BAW2"));

    // BAW2 is no longer observed but its last position is still evaluated until it is evicted
    for i in 1..=3 {
        let snap = world.tick( &PerceptionSnapshot::new( t(i)).with_aircraft( aal1()));
        assert_eq!( snap.aircraft("BAW2").unwrap().missed_ticks, i as u32);
        assert_eq!( snap.conflicts.len(), 1);
        assert_eq!( snap.conflicts[0].status, ReportStatus::Ongoing);
        assert!( snap.resolved.is_empty());
    }

    let snap = world.tick( &PerceptionSnapshot::new( t(4)).with_aircraft( aal1()));
    println!("{}", snap.summary);
    assert!( !snap.contains("BAW2"));
    assert!( snap.conflicts.is_empty());
    assert_eq!( snap.resolved.len(), 1);
    assert_eq!( snap.resolved[0].status, ReportStatus::Resolved);
    assert_eq!( snap.resolved[0].conflict.subject, ConflictSubject::pair( "AAL1", "BAW2"));

    let snap = world.tick( &PerceptionSnapshot::new( t(5)).with_aircraft( aal1()));
    assert!( snap.conflicts.is_empty());
    assert!( snap.resolved.is_empty());
    assert!( world.conflicts_for("AAL1").is_empty());
    assert_eq!( world.stats().aircraft_evicted, 1);
    assert_eq!( world.stats().new_conflicts, 1);
}

#[test]
fn test_invalid_observations () {
    let mut world = world();
    let input = PerceptionSnapshot::new( t(0))
        .with_aircraft( AircraftObservation::new( "BAD1", 95.0, -122.0, 0.0))
        .with_aircraft( AircraftObservation::new( "", 37.0, -122.0, 0.0))
        .with_aircraft( AircraftObservation::new( "BAD2", f64::NAN, -122.0, 0.0))
        .with_aircraft( AircraftObservation::new( "OK1", 36.997, -121.9875, 0.0));

    let snap = world.tick( &input);
    assert_eq!( snap.aircraft.len(), 1);
    assert!( snap.contains("OK1"));
    assert_eq!( world.stats().observations, 4);
    assert_eq!( world.stats().observations_skipped, 3);
}

#[test]
fn test_threshold_region () {
    let mut world = world();
    let topo = world.topology().clone();

    let input = PerceptionSnapshot::new( t(0))
        .with_aircraft( obs_near( &topo, "ARR1", "27_threshold", 90.0, 0.3, 200.0).with_status( AircraftStatus::OnApproach));
    let snap = world.tick( &input);

    let ac = snap.aircraft("ARR1").unwrap();
    assert_eq!( ac.status, AircraftStatus::Landing);
    assert_eq!( ac.assigned_runway.as_deref(), Some("27"));
    assert!( !snap.is_runway_clear("27"));
    assert!( !world.is_runway_clear("27").unwrap());
    assert!( world.is_runway_clear("36").unwrap());
    assert!( matches!( world.is_runway_clear("99"), Err(AtcError::UnknownRunway(_))));

    // vacating counts as landing
    assert_eq!( world.apply_command( "ARR1", &Command::Taxi{ to_node: "b_exit".to_string() }).unwrap(),
                Transition::Changed{ from: AircraftStatus::Landing, to: AircraftStatus::TaxiIn });
    assert_eq!( world.stats().landings, 1);
}

#[test]
fn test_commands () {
    let mut world = world();
    let topo = world.topology().clone();

    world.tick( &PerceptionSnapshot::new( t(10))
        .with_aircraft( obs_near( &topo, "UAL1", "27_threshold", 90.0, 10.0, 4000.0))
        .with_aircraft( obs_near( &topo, "SWA2", "gate_a2", 0.0, 0.0, 10.0)));

    let tr = world.apply_command( "UAL1", &Command::ClearToLand{ runway: "27".to_string() }).unwrap();
    assert_eq!( tr, Transition::Changed{ from: AircraftStatus::Arriving, to: AircraftStatus::OnApproach });
    let ac = world.aircraft("UAL1").unwrap();
    assert_eq!( ac.assigned_runway.as_deref(), Some("27"));
    assert_eq!( ac.clearance.as_ref().unwrap().issued, t(10));
    assert!( ac.is_cleared_for("27"));

    // rejected transition still records the clearance
    let tr = world.apply_command( "SWA2", &Command::ClearForTakeoff{ runway: "27".to_string() }).unwrap();
    assert_eq!( tr, Transition::Rejected{ from: AircraftStatus::AtGate, to: AircraftStatus::Departing });
    assert!( world.aircraft("SWA2").unwrap().is_cleared_for("27"));
    assert_eq!( world.stats().illegal_transitions, 1);

    assert!( matches!( world.apply_command( "UAL1", &Command::ClearToLand{ runway: "04".to_string() }), Err(AtcError::UnknownRunway(_))));
    assert!( matches!( world.apply_command( "SWA2", &Command::Taxi{ to_node: "nowhere".to_string() }), Err(AtcError::UnknownNode(_))));
    assert!( matches!( world.apply_command( "XXX", &Command::Pushback), Err(AtcError::UnknownAircraft(_))));

    assert_eq!( world.apply_command( "SWA2", &Command::Pushback).unwrap(),
                Transition::Changed{ from: AircraftStatus::AtGate, to: AircraftStatus::Pushback });
    assert_eq!( world.apply_command( "SWA2", &Command::Remove).unwrap(), Transition::Remove);
    assert!( world.aircraft("SWA2").is_none());
    assert_eq!( world.stats().commands, 4);
}

#[test]
fn test_separation_conflict_lifecycle () {
    let mut world = world();
    let topo = world.topology().clone();

    let pair = |ts: i64, d: f64| PerceptionSnapshot::new( t(ts))
        .with_aircraft( obs_near( &topo, "AAL1", "36_threshold", 180.0, 10.0, 5000.0))
        .with_aircraft( obs_near( &topo, "BAW2", "36_threshold", 180.0, 10.0 + d, 5000.0));

    let snap = world.tick( &pair( 0, 2.0));
    println!("{}", snap.summary);
    assert_eq!( snap.conflicts.len(), 1);
    let report = &snap.conflicts[0];
    assert_eq!( report.status, ReportStatus::New);
    assert_eq!( report.conflict.kind, ConflictKind::SeparationLoss);
    assert_eq!( report.conflict.severity, Severity::Critical);
    assert!( snap.has_critical());
    assert!( world.has_critical_conflicts());
    assert_eq!( world.conflicts_for("baw2").len(), 1);

    let snap = world.tick( &pair( 1, 2.0));
    assert_eq!( snap.conflicts[0].status, ReportStatus::Ongoing);
    assert_eq!( snap.conflicts[0].first_detected, t(0));

    // BAW2 jumps away, which also makes both tracks diverge
    let snap = world.tick( &pair( 2, 40.0));
    assert!( snap.conflicts.is_empty());
    assert_eq!( snap.resolved.len(), 1);
    assert_eq!( snap.resolved[0].conflict.subject, ConflictSubject::pair( "AAL1", "BAW2"));
    assert!( !world.has_critical_conflicts());

    let snap = world.tick( &pair( 3, 40.0));
    assert!( snap.resolved.is_empty());

    let stats = world.stats();
    assert_eq!( stats.new_conflicts, 1);
    assert_eq!( stats.critical_conflicts, 1);
    assert_eq!( stats.separation_losses, 1);
    assert!( (stats.min_separation_nm.unwrap() - 2.0).abs() < 1e-3);
}

#[test]
fn test_runway_incursion () {
    let mut world = world();
    let topo = world.topology().clone();

    let input = PerceptionSnapshot::new( t(0))
        .with_aircraft( obs_near( &topo, "DEP1", "27_threshold", 0.0, 0.0, 10.0).with_status( AircraftStatus::LineUp).with_runway("27"))
        .with_aircraft( obs_near( &topo, "ARR2", "27_threshold", 90.0, 4.0, 1200.0).with_status( AircraftStatus::OnApproach).with_runway("27"));

    let snap = world.tick( &input);
    println!("{}", snap.summary);

    let conflicts: Vec<_> = snap.conflict_list().collect();
    assert_eq!( conflicts.len(), 1);
    assert_eq!( conflicts[0].kind, ConflictKind::RunwayIncursion);
    assert_eq!( conflicts[0].subject, ConflictSubject::runway( "ARR2", "27"));
    assert_eq!( conflicts[0].occupant.as_deref(), Some("DEP1"));
    assert_eq!( world.conflicts_for("DEP1").len(), 1);
    assert_eq!( world.stats().runway_incursions, 1);

    // once DEP1 departs the runway is clear again
    world.apply_command( "DEP1", &Command::ClearForTakeoff{ runway: "27".to_string() }).unwrap();
    let departed = obs_near( &topo, "DEP1", "27_threshold", 270.0, 3.0, 1500.0);
    let snap = world.tick( &PerceptionSnapshot::new( t(30)).with_aircraft( departed)
        .with_aircraft( obs_near( &topo, "ARR2", "27_threshold", 90.0, 3.0, 1000.0)));
    assert_eq!( snap.aircraft("DEP1").unwrap().status, AircraftStatus::Departing);
    assert!( snap.is_runway_clear("27"));
    assert!( !snap.conflict_list().any(|c| c.kind == ConflictKind::RunwayIncursion));
    assert_eq!( snap.resolved.len(), 1);
    assert_eq!( world.stats().takeoffs, 1);
}

#[test]
fn test_queries () {
    let mut world = world();
    let topo = world.topology().clone();

    world.tick( &PerceptionSnapshot::new( t(0))
        .with_aircraft( obs_near( &topo, "UAL123", "gate_a1", 0.0, 0.0, 10.0))
        .with_aircraft( obs_near( &topo, "DAL456", "gate_a2", 0.0, 0.0, 10.0))
        .with_aircraft( obs_near( &topo, "SWA789", "a4", 0.0, 0.0, 10.0)));

    let closest = world.closest_aircraft( "UAL123", 5).unwrap();
    println!("{closest:?}");
    assert_eq!( closest.len(), 2);
    assert_eq!( closest[0].0, "DAL456");
    assert!( closest[0].1 < closest[1].1);
    assert!( world.closest_aircraft( "NOPE", 1).is_err());

    let m = world.resolve_callsign("UAL1Z3").unwrap();
    assert_eq!( m.matched, "UAL123");
    assert!( world.resolve_callsign("XYZ").is_none());

    let res = world.taxi_route( "UAL123", "27_threshold").unwrap();
    let route = res.route().unwrap();
    println!("{route}");
    assert_eq!( route.from, "gate_a1");
    assert_eq!( route.destination(), "27_threshold");
}

#[test]
fn test_overrun () {
    init_logging();
    let config = WorldConfig { frame_budget: Duration::ZERO, ..WorldConfig::default() };
    let mut world = WorldModel::new( config, ktst()).unwrap();

    let snap = world.tick( &PerceptionSnapshot::new( t(0)).with_aircraft( AircraftObservation::new( "OK1", 36.997, -121.9875, 0.0)));
    assert!( snap.overrun);
    assert!( snap.tick_duration > Duration::ZERO);
    assert_eq!( world.stats().overruns, 1);
}

#[test]
fn test_snapshot_serialization () {
    let mut world = world();
    let topo = world.topology().clone();
    let snap = world.tick( &PerceptionSnapshot::new( t(0))
        .with_aircraft( obs_near( &topo, "AAL1", "36_threshold", 180.0, 10.0, 5000.0))
        .with_aircraft( obs_near( &topo, "BAW2", "36_threshold", 180.0, 12.0, 5000.0)));

    let json = snap.to_json().unwrap();
    println!("{json}");
    let parsed: WorldSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!( parsed.tick, snap.tick);
    assert_eq!( parsed.aircraft.len(), 2);
    assert_eq!( parsed.conflicts.len(), 1);
    assert_eq!( parsed.conflicts[0].conflict.subject, snap.conflicts[0].conflict.subject);

    assert!( snap.to_ron().is_ok());
}

#[test]
fn test_shutdown () {
    let mut world = world();
    world.tick( &PerceptionSnapshot::new( EpochMillis::now()));
    world.tick( &PerceptionSnapshot::new( EpochMillis::now()));

    let stats = world.shutdown();
    println!("{stats}");
    assert_eq!( stats.ticks, 2);
    assert!( stats.ended.unwrap() >= stats.started);
    assert!( stats.duration_secs().unwrap() >= 0.0);
}
