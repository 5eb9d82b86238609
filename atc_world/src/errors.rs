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

use thiserror::Error;
use atc_common::errors::CommonError;

pub type Result<T> = std::result::Result<T,AtcError>;

#[derive(Error,Debug)]
pub enum AtcError {

    #[error("invalid position {0}")]
    InvalidPosition(String),

    #[error("unknown node {0}")]
    UnknownNode(String),

    #[error("unknown runway {0}")]
    UnknownRunway(String),

    #[error("unknown aircraft {0}")]
    UnknownAircraft(String),

    #[error("config error {0}")]
    ConfigError(String),

    #[error("invalid observation {0}")]
    InvalidObservation(String),

    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("JSON error {0}")]
    JsonError( #[from] serde_json::Error),

    #[error("common error {0}")]
    CommonError(CommonError),
}

// we want geodesy errors to keep their kind, everything else is opaque
impl From<CommonError> for AtcError {
    fn from (e: CommonError)->Self {
        match e {
            CommonError::InvalidPosition(msg) => AtcError::InvalidPosition(msg),
            CommonError::IOError(e) => AtcError::IOError(e),
            CommonError::JsonError(e) => AtcError::JsonError(e),
            other => AtcError::CommonError(other)
        }
    }
}

macro_rules! config_error {
    ($fmt:literal $(, $arg:expr )* ) => {
        AtcError::ConfigError( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use config_error;

macro_rules! invalid_observation {
    ($fmt:literal $(, $arg:expr )* ) => {
        AtcError::InvalidObservation( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use invalid_observation;
