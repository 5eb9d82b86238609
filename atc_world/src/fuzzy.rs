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

//! matching of noisy (OCR) callsign and runway readings against known values.
//! This is a stand-alone utility - it never looks into or modifies the aircraft registry

use std::fmt;
use serde::{Serialize,Deserialize};
use strum::IntoStaticStr;
use tracing::debug;

/// classic Levenshtein edit distance over chars
pub fn levenshtein (a: &str, b: &str)->usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() { return b.len() }
    if b.is_empty() { return a.len() }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur: Vec<usize> = vec![0; b.len() + 1];

    for (i,ca) in a.iter().enumerate() {
        cur[0] = i + 1;
        for (j,cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            cur[j+1] = (prev[j+1] + 1).min( cur[j] + 1).min( prev[j] + cost);
        }
        std::mem::swap( &mut prev, &mut cur);
    }
    prev[b.len()]
}

fn lcs_len (a: &[char], b: &[char])->usize {
    let mut prev: Vec<usize> = vec![0; b.len() + 1];
    let mut cur: Vec<usize> = vec![0; b.len() + 1];

    for ca in a {
        for (j,cb) in b.iter().enumerate() {
            cur[j+1] = if ca == cb { prev[j] + 1 } else { prev[j+1].max( cur[j]) };
        }
        std::mem::swap( &mut prev, &mut cur);
    }
    prev[b.len()]
}

fn char_similarity (a: &[char], b: &[char])->f64 {
    let total = a.len() + b.len();
    if total == 0 { return 100.0 }
    let indel = total - 2 * lcs_len( a, b);
    100.0 * (1.0 - indel as f64 / total as f64)
}

/// normalized indel similarity in the range [0..100], 100 meaning identical
pub fn similarity (a: &str, b: &str)->f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    char_similarity( &a, &b)
}

/// best similarity of the shorter string against all equally long windows of the longer one. This handles
/// truncated readings
pub fn partial_similarity (a: &str, b: &str)->f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a,b) } else { (b,a) };
    if short.is_empty() { return if long.is_empty() { 100.0 } else { 0.0 } }

    long.windows( short.len())
        .map(|w| char_similarity( &short, w))
        .fold( 0.0, f64::max)
}

/// map characters that OCR commonly confuses onto a canonical representative (the digit)
pub fn ocr_normalize (text: &str)->String {
    text.trim().to_uppercase().chars().map(|c| match c {
        'O' => '0',
        'I' | 'L' | '|' => '1',
        'S' => '5',
        'B' => '8',
        'G' => '6',
        'Z' => '2',
        c => c
    }).collect()
}

fn clean (text: &str)->String { text.trim().to_uppercase() }

#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,Hash,IntoStaticStr)]
#[serde(rename_all="snake_case")]
#[strum(serialize_all="snake_case")]
pub enum MatchMethod {
    Exact,
    OcrCorrection,
    Fuzzy,
    Partial,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct CallsignMatch {
    pub matched: String, // as given in the known list
    pub input: String,
    pub confidence: f64,
    pub method: MatchMethod,
}

impl fmt::Display for CallsignMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method: &'static str = self.method.into();
        write!(f, "'{}' -> {} ({}, {:.0}%)", self.input, self.matched, method, self.confidence)
    }
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(default)]
pub struct CallsignMatcher {
    pub fuzzy_threshold: f64,
    pub partial_threshold: f64,
    pub ocr_confidence: f64,
    pub runway_threshold: f64,
}

impl Default for CallsignMatcher {
    fn default()->Self {
        CallsignMatcher { fuzzy_threshold: 85.0, partial_threshold: 70.0, ocr_confidence: 90.0, runway_threshold: 75.0 }
    }
}

impl CallsignMatcher {
    pub fn new ()->Self { CallsignMatcher::default() }

    /// match a reading against known callsigns, trying exact, OCR normalized, fuzzy and partial matches in
    /// that order. Ties are resolved by the smaller edit distance and then lexicographically
    pub fn match_callsign<S: AsRef<str>> (&self, text: &str, known: &[S])->Option<CallsignMatch> {
        let input = clean(text);
        if input.is_empty() || known.is_empty() { return None }

        if let Some(cs) = known.iter().map(|s| s.as_ref()).find(|cs| clean(cs) == input) {
            return Some( self.mk_match( cs, text, 100.0, MatchMethod::Exact))
        }

        let normalized = ocr_normalize(&input);
        if let Some(cs) = Self::best_by( known, |cs| (ocr_normalize(cs) == normalized).then(|| 100.0), &input) {
            return Some( self.mk_match( cs, text, self.ocr_confidence, MatchMethod::OcrCorrection))
        }

        if let Some((cs,score)) = Self::best_scored( known, |cs| similarity( &input, &clean(cs)), &input) {
            if score >= self.fuzzy_threshold {
                return Some( self.mk_match( cs, text, score, MatchMethod::Fuzzy))
            }
        }

        if let Some((cs,score)) = Self::best_scored( known, |cs| partial_similarity( &input, &clean(cs)), &input) {
            if score >= self.partial_threshold {
                return Some( self.mk_match( cs, text, score, MatchMethod::Partial))
            }
        }

        debug!("no callsign match for '{}'", text);
        None
    }

    /// match a runway reading ("O4L", "ZZR") against the available runway names
    pub fn match_runway<S: AsRef<str>> (&self, text: &str, runways: &[S])->Option<CallsignMatch> {
        let input = clean(text);
        if input.is_empty() || runways.is_empty() { return None }

        if let Some(rwy) = runways.iter().map(|s| s.as_ref()).find(|r| clean(r) == input) {
            return Some( self.mk_match( rwy, text, 100.0, MatchMethod::Exact))
        }

        let normalized = ocr_normalize(&input);
        if let Some(rwy) = Self::best_by( runways, |r| (ocr_normalize(r) == normalized).then(|| 100.0), &input) {
            return Some( self.mk_match( rwy, text, self.ocr_confidence, MatchMethod::OcrCorrection))
        }

        match Self::best_scored( runways, |r| similarity( &input, &clean(r)), &input) {
            Some((rwy,score)) if score >= self.runway_threshold => Some( self.mk_match( rwy, text, score, MatchMethod::Fuzzy)),
            _ => None
        }
    }

    /// the `n` best fuzzy candidates with their scores, best first
    pub fn best_matches<S: AsRef<str>> (&self, text: &str, known: &[S], n: usize)->Vec<(String,f64)> {
        let input = clean(text);
        let mut scored: Vec<(String,f64)> = known.iter().map(|s| (s.as_ref().to_string(), similarity( &input, &clean(s.as_ref())))).collect();
        scored.sort_by(|(a,sa),(b,sb)| sb.total_cmp(sa).then_with(|| a.cmp(b)));
        scored.truncate(n);
        scored
    }

    fn mk_match (&self, matched: &str, input: &str, confidence: f64, method: MatchMethod)->CallsignMatch {
        let m = CallsignMatch { matched: matched.to_string(), input: input.to_string(), confidence, method };
        debug!("matched {}", m);
        m
    }

    fn best_by<'a,S: AsRef<str>> (known: &'a [S], score: impl Fn(&str)->Option<f64>, input: &str)->Option<&'a str> {
        Self::best_scored( known, |cs| score(cs).unwrap_or(-1.0), input)
            .and_then(|(cs,s)| (s >= 0.0).then_some(cs))
    }

    /// highest scoring candidate, ties resolved by edit distance to `input` and then by name
    fn best_scored<'a,S: AsRef<str>> (known: &'a [S], score: impl Fn(&str)->f64, input: &str)->Option<(&'a str,f64)> {
        known.iter()
            .map(|s| { let cs = s.as_ref(); (cs, score(cs)) })
            .min_by(|(a,sa),(b,sb)| {
                sb.total_cmp(sa)
                    .then_with(|| levenshtein( input, &clean(a)).cmp( &levenshtein( input, &clean(b))))
                    .then_with(|| a.cmp(b))
            })
    }
}
