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

use atc_common::{angle::Angle360, geo::{Position, Wind}, ron::from_ron_str};
use atc_world::runway::Runway;

fn runway_27 ()->Runway {
    Runway::new( "27", 270.0, 9000.0, 150.0, Position::new( 37.0, -121.96909, 10.0).unwrap())
}

#[test]
fn test_wind_components () {
    let rwy = runway_27();

    let hw = rwy.headwind_component( Angle360::from_degrees(270.0), 12.0);
    println!("aligned wind: {hw:.2}");
    assert!( (hw - 12.0).abs() < 1e-9);

    let hw = rwy.headwind_component( Angle360::from_degrees(90.0), 12.0);
    println!("reversed wind: {hw:.2}");
    assert!( (hw + 12.0).abs() < 1e-9);

    let xw = rwy.crosswind_component( Angle360::from_degrees(0.0), 12.0);
    println!("crosswind from north: {xw:.2}");
    assert!( (xw - 12.0).abs() < 1e-9);

    assert!( rwy.is_into_wind( &Wind::new( 240.0, 10.0)));
    assert!( !rwy.is_into_wind( &Wind::new( 120.0, 10.0)));
    assert_eq!( rwy.reciprocal_heading().degrees(), 90.0);
}

#[test]
fn test_geometry () {
    let rwy = runway_27();
    let far_end = rwy.far_end();
    let len_nm = rwy.threshold.distance_nm(&far_end);
    println!("{rwy}: far end {far_end}, {len_nm:.4}nm");
    assert!( (len_nm - rwy.length_nm()).abs() < 1e-9);
    assert!( (rwy.length_nm() - 9000.0 * 0.3048 / 1852.0).abs() < 1e-9);

    assert!( rwy.contains( &rwy.threshold, 0.0));
    assert!( rwy.contains( &far_end, 1.0));

    let mid = rwy.threshold.destination( rwy.heading, rwy.length_nm() / 2.0);
    let right_30m = mid.destination( Angle360::from_degrees(0.0), 30.0 / 1852.0);
    let right_100m = mid.destination( Angle360::from_degrees(0.0), 100.0 / 1852.0);
    assert!( !rwy.contains( &right_30m, 0.0));  // half width is ~23m
    assert!( rwy.contains( &right_30m, 50.0));  // plus ~15m margin
    assert!( !rwy.contains( &right_100m, 50.0));

    let short = rwy.threshold.destination( rwy.reciprocal_heading(), 0.5);
    assert!( !rwy.contains( &short, 50.0));
}

#[test]
fn test_runway_serde () {
    let input = r#"(name: "09", heading: 90.0, length_ft: 9000.0, threshold: (lat: 37.0, lon: -122.0))"#;
    let rwy: Runway = from_ron_str(input).unwrap();
    println!("{rwy:?}");
    assert_eq!( rwy.name, "09");
    assert_eq!( rwy.heading.degrees(), 90.0);
    assert_eq!( rwy.length_ft(), 9000.0);
    assert!( (rwy.width_ft() - 150.0).abs() < 1e-9); // default

    let json = serde_json::to_string(&rwy).unwrap();
    println!("{json}");
    let rwy1: Runway = serde_json::from_str(&json).unwrap();
    assert_eq!( rwy1.name, rwy.name);
    assert!( (rwy1.length_ft() - rwy.length_ft()).abs() < 1e-6);
}
