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

use atc_common::{angle::*, datetime::EpochMillis};

#[test]
fn test_normalized_angles () {
    let a = Angle360::from_degrees(-90.0);
    println!("-90 -> {a}");
    assert_eq!( a.degrees(), 270.0);
    assert_eq!( Angle360::from_degrees(450.0).degrees(), 90.0);

    assert_eq!( Angle360::from_degrees(270.0).reciprocal().degrees(), 90.0);
    assert_eq!( Angle360::from_degrees(10.0).reciprocal().degrees(), 190.0);

    let d = Angle360::from_degrees(350.0).diff_to( &Angle360::from_degrees(10.0));
    println!("350 -> 10 = {d}");
    assert_eq!( d.degrees(), 20.0);

    assert_eq!( Longitude::from_degrees(200.0).degrees(), -160.0);
}

#[test]
fn test_angle_serde () {
    let a: Angle360 = serde_json::from_str("270").unwrap();
    assert_eq!( a.degrees(), 270.0);

    let a: Angle360 = serde_json::from_str("45.5").unwrap();
    assert_eq!( a.degrees(), 45.5);

    let res = serde_json::from_str::<Angle360>("400.0");
    println!("out of range: {res:?}");
    assert!( res.is_err());
}

#[test]
fn test_epoch_millis () {
    let t0 = EpochMillis::new( 1_700_000_000_000);
    let t1 = EpochMillis::new( 1_700_000_002_500);
    println!("{t0} .. {t1}");
    assert_eq!( t1.secs_since(t0), 2.5);
    assert!( t0 < t1);
    assert_eq!( t0 + std::time::Duration::from_millis(2500), t1);
}

#[test]
fn test_heading_tolerances () {
    let rwy27 = Angle360::from_degrees(270.0);
    let hdg = Angle360::from_degrees(262.0);

    let d = rwy27.diff_to(&hdg);
    println!("270 -> 262 = {d}, magnitude {}", d.magnitude());
    assert_eq!( d.degrees(), -8.0);
    assert_eq!( d.magnitude(), 8.0);

    assert!( rwy27.is_within( &hdg, 10.0));
    assert!( !rwy27.is_within( &hdg, 5.0));

    // aligned means parallel in either direction
    let rwy09 = Angle360::from_degrees(90.0);
    assert!( rwy27.is_aligned_with( &rwy09, 1.0));
    assert!( rwy27.is_aligned_with( &Angle360::from_degrees(85.0), 10.0));
    assert!( !rwy27.is_aligned_with( &Angle360::from_degrees(360.0), 15.0));

    assert_eq!( Angle360::from_degrees(5.0).diff_to( &Angle360::from_degrees(355.0)).degrees(), -10.0);
}
