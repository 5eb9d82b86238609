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

/// module with utility functions for RON serialization/deserialization, which is the format we use for
/// configuration files (airport topologies, world model settings) and compact research log records

use std::{fs, path::Path};
use lazy_static::lazy_static;
use ron::ser::PrettyConfig;
use serde::{Serialize,de::DeserializeOwned};
use crate::errors::Result;

lazy_static! {
    // typed single line records, built once since to_string_pretty consumes its PrettyConfig
    static ref TYPED_COMPACT_RON: PrettyConfig = PrettyConfig::new()
        .struct_names(true)
        .compact_structs(true)
        .compact_maps(true)
        .compact_arrays(true)
        .separator("");
}

/// serialize as one line that still carries struct names, e.g. `WorldSnapshot(tick:3,...)`
pub fn to_typed_compact_ron<T: Serialize> (v: &T)->Result<String> {
    Ok( ron::ser::to_string_pretty( v, TYPED_COMPACT_RON.clone())? )
}

/// multi line RON as we use it for topology and world config files
pub fn to_pretty_ron<T: Serialize> (v: &T)->Result<String> {
    Ok( ron::ser::to_string_pretty( v, PrettyConfig::new().struct_names(true))? )
}

pub fn from_ron_str<T: DeserializeOwned> (s: &str)->Result<T> {
    Ok( ron::from_str(s)? )
}

/// read and parse a RON config file. Callers add the file context to errors
pub fn load_ron_file<T: DeserializeOwned> (path: impl AsRef<Path>)->Result<T> {
    let input = fs::read_to_string( path.as_ref())?;
    from_ron_str( &input)
}
