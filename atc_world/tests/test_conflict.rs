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

use std::time::Duration;
use atc_common::{angle::Angle360, datetime::EpochMillis, geo::{GroundVelocity, Position}};
use atc_world::{
    aircraft::AircraftView, config::ConflictRules, conflict::*, occupancy::RunwayOccupancy, status::AircraftStatus,
    topology::AirportTopology, wake::WakeCategory
};

fn origin ()->Position { Position::new( 37.2, -122.1, 3000.0).unwrap() }

fn view (callsign: &str, type_code: Option<&str>, status: AircraftStatus, position: Position, speed_kn: f64, track_deg: f64)->AircraftView {
    AircraftView {
        callsign: callsign.to_string(),
        type_code: type_code.map(|s| s.to_string()),
        wake: type_code.and_then( WakeCategory::from_type_code),
        status,
        position: Some(position),
        velocity: GroundVelocity::from_speed_track( speed_kn, Angle360::from_degrees(track_deg)),
        heading: None,
        speed_kn: None,
        assigned_runway: None,
        clearance: None,
        first_seen: EpochMillis::from_secs(0),
        last_seen: EpochMillis::from_secs(0),
        missed_ticks: 0,
        n_samples: 2,
    }
}

/// two stationary airborne aircraft `d` nm apart
fn pair_at (d: f64, type_a: Option<&str>, type_b: Option<&str>)->Vec<AircraftView> {
    let p0 = origin();
    let p1 = p0.destination( Angle360::from_degrees(90.0), d);
    vec![
        view( "AAL1", type_a, AircraftStatus::OnApproach, p0, 0.0, 0.0),
        view( "BAW2", type_b, AircraftStatus::Arriving, p1, 0.0, 0.0),
    ]
}

fn detect (aircraft: &[AircraftView])->Vec<Conflict> {
    ConflictDetector::default().detect( aircraft, &RunwayOccupancy::default(), EpochMillis::from_secs(100))
}

#[test]
fn test_separation_levels () {
    let cs = detect( &pair_at( 2.0, None, None));
    println!("{cs:#?}");
    assert_eq!( cs.len(), 1);
    let c = &cs[0];
    assert_eq!( c.kind, ConflictKind::SeparationLoss);
    assert_eq!( c.severity, Severity::Critical);
    assert_eq!( c.subject, ConflictSubject::pair( "BAW2", "AAL1"));
    assert_eq!( c.subject.primary(), "AAL1");
    assert!( (c.distance_nm.unwrap() - 2.0).abs() < 1e-6);
    assert_eq!( c.required_nm, Some(3.0));

    let cs = detect( &pair_at( 4.0, None, None));
    assert_eq!( cs.len(), 1);
    assert_eq!( cs[0].severity, Severity::Warning);

    assert!( detect( &pair_at( 5.0, None, None)).is_empty());
}

#[test]
fn test_exact_minimum_is_not_a_loss () {
    let aircraft = pair_at( 3.0, None, None);
    let d = aircraft[0].distance_nm(&aircraft[1]).unwrap();

    let rules = ConflictRules { horizontal_separation_nm: d, ..ConflictRules::default() };
    let cs = ConflictDetector::new(rules).detect( &aircraft, &RunwayOccupancy::default(), EpochMillis::from_secs(0));
    println!("{cs:?}");
    assert_eq!( cs.len(), 1);
    assert_eq!( cs[0].severity, Severity::Warning);
}

#[test]
fn test_ground_aircraft_are_not_separated () {
    let mut aircraft = pair_at( 0.5, None, None);
    aircraft[1].status = AircraftStatus::TaxiIn;
    assert!( detect( &aircraft).is_empty());
}

#[test]
fn test_wake_turbulence () {
    let cs = detect( &pair_at( 5.0, Some("B744"), Some("C172")));
    println!("{cs:#?}");
    assert_eq!( cs.len(), 1);
    assert_eq!( cs[0].kind, ConflictKind::WakeTurbulence);
    assert_eq!( cs[0].severity, Severity::Critical);
    assert_eq!( cs[0].required_nm, Some(6.0));
    assert!( cs[0].description.contains("BAW2 too close behind AAL1"));

    let cs = detect( &pair_at( 8.0, Some("C172"), Some("B744")));
    assert_eq!( cs.len(), 1);
    assert_eq!( cs[0].kind, ConflictKind::WakeTurbulence);
    assert_eq!( cs[0].severity, Severity::Warning);

    // below the radar minimum this is a plain separation loss
    let cs = detect( &pair_at( 2.0, Some("B744"), Some("C172")));
    assert_eq!( cs[0].kind, ConflictKind::SeparationLoss);

    // unknown types only get the radar minimum
    assert!( detect( &pair_at( 5.0, Some("B744"), Some("ZZZZ"))).is_empty());
    // medium leader has no wake minimum
    assert!( detect( &pair_at( 5.0, Some("A320"), Some("C172"))).is_empty());
}

/// two aircraft `d` nm apart flying towards each other with `speed_kn` each
fn converging (d: f64, speed_kn: f64)->Vec<AircraftView> {
    let p0 = origin();
    let p1 = p0.destination( Angle360::from_degrees(90.0), d);
    vec![
        view( "AAL1", None, AircraftStatus::Arriving, p0, speed_kn, 90.0),
        view( "BAW2", None, AircraftStatus::Arriving, p1, speed_kn, 270.0),
    ]
}

#[test]
fn test_prediction () {
    // closing at 480kn from 10nm: 2nm apart after 60s
    let cs = detect( &converging( 10.0, 240.0));
    println!("{cs:#?}");
    assert_eq!( cs.len(), 1);
    let c = &cs[0];
    assert_eq!( c.kind, ConflictKind::PredictedSeparationLoss);
    assert_eq!( c.time_to_loss, Some(Duration::from_secs(60)));
    assert_eq!( c.severity, Severity::Warning);
    assert!( c.predicted_nm.unwrap() < 3.0);
    assert!( (c.distance_nm.unwrap() - 10.0).abs() < 1e-6);

    let cs = detect( &converging( 10.0, 480.0));
    assert_eq!( cs[0].time_to_loss, Some(Duration::from_secs(30)));
    assert_eq!( cs[0].severity, Severity::Critical);

    let cs = detect( &converging( 10.0, 120.0));
    assert_eq!( cs[0].time_to_loss, Some(Duration::from_secs(110)));
    assert_eq!( cs[0].severity, Severity::Advisory);

    // diverging
    let mut aircraft = converging( 10.0, 240.0);
    aircraft[0].velocity = GroundVelocity::from_speed_track( 240.0, Angle360::from_degrees(270.0));
    aircraft[1].velocity = GroundVelocity::from_speed_track( 240.0, Angle360::from_degrees(90.0));
    assert!( detect( &aircraft).is_empty());

    // too slow to close in within the horizon
    assert!( detect( &converging( 10.0, 60.0)).is_empty());
}

#[test]
fn test_prediction_inside_warning_band () {
    // 4nm apart is a current warning, closing at 80kn they are below 3nm after 50s
    let cs = detect( &converging( 4.0, 40.0));
    println!("{cs:#?}");
    let kinds: Vec<(ConflictKind,Severity)> = cs.iter().map(|c| (c.kind, c.severity)).collect();
    assert_eq!( kinds, vec![
        (ConflictKind::SeparationLoss, Severity::Warning),
        (ConflictKind::PredictedSeparationLoss, Severity::Warning),
    ]);
    assert_eq!( cs[0].time_to_loss, None);
    assert_eq!( cs[1].time_to_loss, Some(Duration::from_secs(50)));
    assert_eq!( cs[0].subject, cs[1].subject);

    // once separation is lost there is nothing left to predict
    let cs = detect( &converging( 2.0, 40.0));
    assert_eq!( cs.len(), 1);
    assert_eq!( cs[0].kind, ConflictKind::SeparationLoss);
    assert_eq!( cs[0].severity, Severity::Critical);
}

#[test]
fn test_runway_incursion () {
    let topo = AirportTopology::load("configs/ktst.ron").unwrap();
    let rwy27 = topo.runway("27").unwrap();

    let mut dep = view( "DEP1", Some("B738"), AircraftStatus::LineUp, rwy27.threshold, 0.0, 0.0);
    dep.assigned_runway = Some("27".to_string());

    let approach = rwy27.threshold.destination( rwy27.reciprocal_heading(), 4.0).with_altitude_ft(1200.0);
    let mut arr = view( "ARR2", Some("A320"), AircraftStatus::OnApproach, approach, 140.0, 270.0);
    arr.assigned_runway = Some("27".to_string());

    let aircraft = vec![ dep, arr];
    let occupancy = RunwayOccupancy::compute( &aircraft, &topo, 50.0);
    let cs = ConflictDetector::default().detect( &aircraft, &occupancy, EpochMillis::from_secs(0));
    println!("{cs:#?}");

    assert_eq!( cs.len(), 1);
    let c = &cs[0];
    assert_eq!( c.kind, ConflictKind::RunwayIncursion);
    assert_eq!( c.severity, Severity::Critical);
    assert_eq!( c.subject, ConflictSubject::runway( "ARR2", "27"));
    assert_eq!( c.occupant.as_deref(), Some("DEP1"));
    assert!( c.involves("DEP1") && c.involves("ARR2"));
    assert!( (c.distance_nm.unwrap() - 4.0).abs() < 1e-3);

    // nobody inbound, nobody else on the runway
    let cs = ConflictDetector::default().detect( &aircraft[..1], &RunwayOccupancy::compute( &aircraft[..1], &topo, 50.0), EpochMillis::from_secs(0));
    assert!( cs.is_empty());
}

#[test]
fn test_ordering () {
    let p0 = origin();
    let aircraft = vec![
        view( "ZZZ9", None, AircraftStatus::Arriving, p0.destination( Angle360::from_degrees(0.0), 20.0), 0.0, 0.0),
        view( "YYY8", None, AircraftStatus::Arriving, p0.destination( Angle360::from_degrees(0.0), 21.0), 0.0, 0.0), // critical
        view( "AAA1", None, AircraftStatus::Arriving, p0, 0.0, 0.0),
        view( "BBB2", None, AircraftStatus::Arriving, p0.destination( Angle360::from_degrees(90.0), 4.0), 0.0, 0.0), // warning
    ];
    let cs = detect( &aircraft);
    let subjects: Vec<String> = cs.iter().map(|c| c.subject.to_string()).collect();
    println!("{subjects:?}");
    assert_eq!( subjects, vec!["YYY8/ZZZ9", "AAA1/BBB2"]);

    let mut shuffled = cs.clone();
    shuffled.reverse();
    sort_conflicts( &mut shuffled);
    assert_eq!( shuffled, cs);

    let summary = summarize( &cs);
    println!("{summary}");
    assert!( summary.starts_with("CRITICAL: 1 conflicts"));
    assert!( summary.contains("WARNING: 1 conflicts"));
    assert_eq!( summarize( &Vec::<Conflict>::new()), "no conflicts");

    let d = min_airborne_separation( &aircraft).unwrap();
    assert!( (d - 1.0).abs() < 1e-6);
}

#[test]
fn test_tracker () {
    let mut tracker = ConflictTracker::new();

    let c1 = detect( &pair_at( 2.0, None, None));
    let upd = tracker.update( c1.clone());
    assert_eq!( upd.reports.len(), 1);
    assert_eq!( upd.reports[0].status, ReportStatus::New);
    assert_eq!( upd.new_conflicts().count(), 1);
    assert!( upd.resolved.is_empty());
    assert!( tracker.has_critical());

    // same subject, different severity: still the same conflict
    let mut c2 = detect( &pair_at( 4.0, None, None));
    for c in &mut c2 { c.timestamp = EpochMillis::from_secs(101) }
    let upd = tracker.update( c2);
    assert_eq!( upd.reports[0].status, ReportStatus::Ongoing);
    assert_eq!( upd.reports[0].first_detected, EpochMillis::from_secs(100));
    assert_eq!( upd.reports[0].conflict.severity, Severity::Warning);
    assert!( !tracker.has_critical());
    assert_eq!( tracker.conflicts_for("AAL1").len(), 1);
    assert!( tracker.conflicts_for("XYZ").is_empty());

    let upd = tracker.update( Vec::new());
    assert!( upd.reports.is_empty());
    assert_eq!( upd.resolved.len(), 1);
    assert_eq!( upd.resolved[0].status, ReportStatus::Resolved);
    assert!( tracker.is_empty());
    println!("{}", tracker.summary());

    // resolved conflicts are only reported once
    let upd = tracker.update( Vec::new());
    assert!( upd.resolved.is_empty());

    // and come back as new
    let upd = tracker.update( c1);
    assert_eq!( upd.reports[0].status, ReportStatus::New);
}

#[test]
fn test_tracker_keeps_current_and_predicted_apart () {
    let mut tracker = ConflictTracker::new();

    let upd = tracker.update( detect( &converging( 4.0, 40.0)));
    assert_eq!( upd.reports.len(), 2);
    assert_eq!( upd.new_conflicts().count(), 2);
    assert_eq!( tracker.len(), 2);
    assert_eq!( tracker.conflicts_for("BAW2").len(), 2);

    // the predicted loss goes away while the current warning stays
    let upd = tracker.update( detect( &pair_at( 4.0, None, None)));
    assert_eq!( upd.reports.len(), 1);
    assert_eq!( upd.reports[0].status, ReportStatus::Ongoing);
    assert_eq!( upd.reports[0].conflict.kind, ConflictKind::SeparationLoss);
    assert_eq!( upd.resolved.len(), 1);
    assert_eq!( upd.resolved[0].conflict.kind, ConflictKind::PredictedSeparationLoss);
}
