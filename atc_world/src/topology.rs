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

//! the airport ground network as an owned adjacency list graph.
//! Nodes are named ground points (runway thresholds, taxiway intersections, gates ..), edges carry a distance,
//! the taxiway or runway identifier they belong to and a directionality flag. Topologies are immutable after
//! load - derived topologies (e.g. with a closed taxiway) are new values

use std::{cmp::Ordering, collections::{BTreeMap,BTreeSet,BinaryHeap,HashSet}, fmt, path::Path};
use serde::{Serialize,Deserialize};
use strum::IntoStaticStr;
use tracing::{debug,info,warn};
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use atc_common::{
    angle::Angle360,
    geo::{Position, Wind},
    geo_constants::METERS_PER_NM,
    ron::{from_ron_str, load_ron_file, to_pretty_ron}
};
use crate::{errors::{AtcError, Result, config_error}, runway::Runway};

/* #region config *************************************************************************************************/

#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,Hash,IntoStaticStr)]
#[serde(rename_all="snake_case")]
#[strum(serialize_all="snake_case")]
pub enum NodeKind {
    RunwayThreshold,
    RunwayEntry,
    RunwayExit,
    HoldShort,
    Intersection,
    Ramp,
    Gate,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct NodeConfig {
    pub id: String,
    pub position: Position,
    pub kind: NodeKind,

    #[serde(default, skip_serializing_if="Vec::is_empty")]
    pub runways: Vec<String>, // runways accessible from this node
}

fn default_bidirectional()->bool { true }

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct EdgeConfig {
    pub from: String,
    pub to: String,
    pub distance_m: f64,
    pub label: String, // taxiway or runway identifier

    #[serde(default="default_bidirectional")]
    pub bidirectional: bool,
}

/// the serializable description of an airport ground network
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct TopologyConfig {
    pub airport: String,

    #[serde(default)]
    pub runways: Vec<Runway>,

    #[serde(default)]
    pub nodes: Vec<NodeConfig>,

    #[serde(default)]
    pub edges: Vec<EdgeConfig>,
}

impl TopologyConfig {
    pub fn from_ron (input: &str)->Result<Self> {
        from_ron_str(input).map_err(|e| config_error!("invalid topology: {e}"))
    }

    pub fn from_json (input: &str)->Result<Self> {
        serde_json::from_str(input).map_err(|e| config_error!("invalid topology: {e}"))
    }

    /// load from a file, which is parsed as JSON if it has a ".json" extension and as RON otherwise
    pub fn load<P: AsRef<Path>> (path: P)->Result<Self> {
        let path = path.as_ref();
        if path.extension().is_some_and(|ext| ext == "json") {
            let input = std::fs::read_to_string(path)?;
            Self::from_json(&input)
        } else {
            load_ron_file(path).map_err(|e| config_error!("failed to load topology {path:?}: {e}"))
        }
    }

    pub fn to_ron (&self)->Result<String> { Ok( to_pretty_ron(self)? ) }

    pub fn to_json (&self)->Result<String> { Ok( serde_json::to_string_pretty(self)? ) }
}

/* #endregion config */


/* #region graph elements *****************************************************************************************/

#[derive(Serialize,Debug,Clone,PartialEq)]
pub struct Node {
    pub id: String,
    pub position: Position,
    pub kind: NodeKind,
    pub runways: Vec<String>,
}

#[derive(Serialize,Debug,Clone,PartialEq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub distance_m: f64,
    pub label: String,
    pub bidirectional: bool,
}

/// a directed traversal option out of a node
#[derive(Debug,Clone)]
struct Link {
    to: String,
    distance_m: f64,
    edge: usize,
}

/// result of a successful path query. `nodes` are the nodes entered after leaving the start node in traversal
/// order (i.e. the start is not included), `labels` the taxiway/runway identifiers of the traversed edges.
/// A route from a node to itself is empty and has zero length
#[derive(Serialize,Debug,Clone,PartialEq)]
pub struct Route {
    pub from: String,
    pub nodes: Vec<String>,
    pub labels: Vec<String>,
    pub distance_m: f64,
}

impl Route {
    pub fn empty (from: &str)->Self {
        Route { from: from.to_string(), nodes: Vec::new(), labels: Vec::new(), distance_m: 0.0 }
    }

    pub fn is_empty (&self)->bool { self.nodes.is_empty() }
    pub fn hops (&self)->usize { self.nodes.len() }
    pub fn destination (&self)->&str { self.nodes.last().map(|s| s.as_str()).unwrap_or( self.from.as_str()) }

    /// the taxi instruction form of a route, e.g. "A B C" with consecutive duplicate labels merged
    pub fn taxi_labels (&self)->Vec<&str> {
        let mut labels: Vec<&str> = self.labels.iter().map(|s| s.as_str()).collect();
        labels.dedup();
        labels
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.from)?;
        for id in &self.nodes { write!(f, " -> {id}")?; }
        write!(f, " ({:.0}m)", self.distance_m)
    }
}

/// outcome of a path query between two known nodes. Not finding a path is a normal result, not an error
#[derive(Serialize,Debug,Clone,PartialEq)]
pub enum PathResult {
    Found(Route),
    Unreachable,
}

impl PathResult {
    pub fn route (&self)->Option<&Route> {
        match self {
            PathResult::Found(route) => Some(route),
            PathResult::Unreachable => None
        }
    }

    pub fn is_reachable (&self)->bool { matches!( self, PathResult::Found(_)) }
}

/// Dijkstra queue entry. Entries are totally ordered by (distance, hops, node sequence) so that equal length
/// paths are resolved deterministically. Ordering is reversed to turn the BinaryHeap into a min-heap
struct Candidate {
    distance_m: f64,
    path: Vec<String>,
    labels: Vec<String>,
}

impl Candidate {
    fn key_cmp (&self, other: &Self)->Ordering {
        self.distance_m.total_cmp(&other.distance_m)
            .then_with(|| self.path.len().cmp(&other.path.len()))
            .then_with(|| self.path.cmp(&other.path))
    }
}

impl PartialEq for Candidate {
    fn eq (&self, other: &Self)->bool { self.key_cmp(other) == Ordering::Equal }
}
impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp (&self, other: &Self)->Option<Ordering> { Some(self.cmp(other)) }
}
impl Ord for Candidate {
    fn cmp (&self, other: &Self)->Ordering { other.key_cmp(self) }
}

/* #endregion graph elements */


/* #region AirportTopology ****************************************************************************************/

#[derive(Debug,Clone)]
pub struct AirportTopology {
    airport: String,
    runways: BTreeMap<String,Runway>,
    nodes: BTreeMap<String,Node>,
    edges: Vec<Edge>,
    adjacency: BTreeMap<String,Vec<Link>>,
}

const PARALLEL_TOLERANCE_DEG: f64 = 15.0;

pub fn threshold_node_id (runway: &str)->String { format!("{runway}_threshold") }

impl AirportTopology {

    /// build the graph from a topology description. Fails with `ConfigError` if the description contains
    /// duplicate ids, references undefined nodes or runways, or has invalid edge distances
    pub fn from_config (config: TopologyConfig)->Result<Self> {
        let TopologyConfig { airport, runways: runway_list, nodes: node_list, edges: edge_list } = config;

        let mut runways: BTreeMap<String,Runway> = BTreeMap::new();
        for rwy in runway_list {
            if rwy.name.is_empty() { return Err( config_error!("runway without name in {airport}")) }
            if !(rwy.length_ft() > 0.0) { return Err( config_error!("runway {} has invalid length {}", rwy.name, rwy.length_ft())) }
            if runways.contains_key(&rwy.name) { return Err( config_error!("duplicate runway {}", rwy.name)) }
            runways.insert( rwy.name.clone(), rwy);
        }

        let mut nodes: BTreeMap<String,Node> = BTreeMap::new();
        for nc in node_list {
            if nodes.contains_key(&nc.id) { return Err( config_error!("duplicate node {}", nc.id)) }
            for rwy in &nc.runways {
                if !runways.contains_key(rwy) { return Err( config_error!("node {} references unknown runway {}", nc.id, rwy)) }
            }
            nodes.insert( nc.id.clone(), Node { id: nc.id, position: nc.position, kind: nc.kind, runways: nc.runways });
        }

        // every runway gets a threshold node unless the description has its own
        for rwy in runways.values() {
            let id = threshold_node_id(&rwy.name);
            match nodes.get_mut(&id) {
                Some(node) => {
                    if !node.runways.contains(&rwy.name) { node.runways.push( rwy.name.clone()) }
                }
                None => {
                    nodes.insert( id.clone(), Node {
                        id, position: rwy.threshold, kind: NodeKind::RunwayThreshold, runways: vec![rwy.name.clone()]
                    });
                }
            }
        }

        let mut edges: Vec<Edge> = Vec::with_capacity( edge_list.len());
        for ec in edge_list {
            if !nodes.contains_key(&ec.from) { return Err( config_error!("edge {} references undefined node {}", ec.label, ec.from)) }
            if !nodes.contains_key(&ec.to) { return Err( config_error!("edge {} references undefined node {}", ec.label, ec.to)) }
            if !ec.distance_m.is_finite() || ec.distance_m < 0.0 {
                return Err( config_error!("edge {} {}->{} has invalid distance {}", ec.label, ec.from, ec.to, ec.distance_m))
            }
            edges.push( Edge { from: ec.from, to: ec.to, distance_m: ec.distance_m, label: ec.label, bidirectional: ec.bidirectional });
        }

        let topology = Self::assemble( airport, runways, nodes, edges);
        info!("loaded topology for {}: {} runways, {} nodes, {} edges", topology.airport, topology.runways.len(), topology.nodes.len(), topology.edges.len());
        Ok(topology)
    }

    pub fn from_ron (input: &str)->Result<Self> { Self::from_config( TopologyConfig::from_ron(input)?) }

    pub fn from_json (input: &str)->Result<Self> { Self::from_config( TopologyConfig::from_json(input)?) }

    pub fn load<P: AsRef<Path>> (path: P)->Result<Self> { Self::from_config( TopologyConfig::load(path)?) }

    fn assemble (airport: String, runways: BTreeMap<String,Runway>, nodes: BTreeMap<String,Node>, edges: Vec<Edge>)->Self {
        let mut adjacency: BTreeMap<String,Vec<Link>> = nodes.keys().map(|id| (id.clone(), Vec::new())).collect();

        for (i,e) in edges.iter().enumerate() {
            if let Some(links) = adjacency.get_mut(&e.from) {
                links.push( Link { to: e.to.clone(), distance_m: e.distance_m, edge: i });
            }
            if e.bidirectional {
                if let Some(links) = adjacency.get_mut(&e.to) {
                    links.push( Link { to: e.from.clone(), distance_m: e.distance_m, edge: i });
                }
            }
        }

        AirportTopology { airport, runways, nodes, edges, adjacency }
    }

    /// the description this topology was built from (with generated threshold nodes made explicit)
    pub fn to_config (&self)->TopologyConfig {
        TopologyConfig {
            airport: self.airport.clone(),
            runways: self.runways.values().cloned().collect(),
            nodes: self.nodes.values().map(|n| NodeConfig {
                id: n.id.clone(), position: n.position, kind: n.kind, runways: n.runways.clone()
            }).collect(),
            edges: self.edges.iter().map(|e| EdgeConfig {
                from: e.from.clone(), to: e.to.clone(), distance_m: e.distance_m, label: e.label.clone(), bidirectional: e.bidirectional
            }).collect()
        }
    }

    //--- accessors

    pub fn airport (&self)->&str { self.airport.as_str() }

    pub fn runway (&self, name: &str)->Option<&Runway> { self.runways.get(name) }
    pub fn has_runway (&self, name: &str)->bool { self.runways.contains_key(name) }
    pub fn runways (&self)->impl Iterator<Item=&Runway> { self.runways.values() }
    pub fn runway_names (&self)->impl Iterator<Item=&str> { self.runways.keys().map(|k| k.as_str()) }

    pub fn node (&self, id: &str)->Option<&Node> { self.nodes.get(id) }
    pub fn has_node (&self, id: &str)->bool { self.nodes.contains_key(id) }
    pub fn nodes (&self)->impl Iterator<Item=&Node> { self.nodes.values() }
    pub fn node_count (&self)->usize { self.nodes.len() }

    pub fn edges (&self)->&[Edge] { self.edges.as_slice() }
    pub fn edge_count (&self)->usize { self.edges.len() }

    /// ids of nodes directly reachable from `id`, honoring edge direction
    pub fn neighbors (&self, id: &str)->Vec<&str> {
        let mut ids: Vec<&str> = self.adjacency.get(id).map(|links| links.iter().map(|l| l.to.as_str()).collect()).unwrap_or_default();
        ids.sort();
        ids.dedup();
        ids
    }

    //--- path queries

    /// shortest path between two named nodes over non-negative edge weights, honoring edge direction.
    /// Paths of equal length are ordered by number of edges, then by their node id sequence.
    /// Unknown endpoints are errors, missing connections are a normal `PathResult::Unreachable`
    pub fn shortest_path (&self, from: &str, to: &str)->Result<PathResult> {
        if !self.nodes.contains_key(from) { return Err( AtcError::UnknownNode(from.to_string())) }
        if !self.nodes.contains_key(to) { return Err( AtcError::UnknownNode(to.to_string())) }

        if from == to { return Ok( PathResult::Found( Route::empty(from))) }

        let mut settled: HashSet<String> = HashSet::new();
        let mut queue: BinaryHeap<Candidate> = BinaryHeap::new();
        queue.push( Candidate { distance_m: 0.0, path: vec![from.to_string()], labels: Vec::new() });

        while let Some(cand) = queue.pop() {
            let Some(current) = cand.path.last().cloned() else { continue };
            if !settled.insert( current.clone()) { continue }

            if current == to {
                let Candidate { distance_m, mut path, labels } = cand;
                path.remove(0);
                return Ok( PathResult::Found( Route { from: from.to_string(), nodes: path, labels, distance_m }))
            }

            if let Some(links) = self.adjacency.get(&current) {
                for link in links {
                    if settled.contains(&link.to) { continue }

                    let mut path = cand.path.clone();
                    path.push( link.to.clone());
                    let mut labels = cand.labels.clone();
                    labels.push( self.edges[link.edge].label.clone());

                    queue.push( Candidate { distance_m: cand.distance_m + link.distance_m, path, labels });
                }
            }
        }

        debug!("no path from {} to {}", from, to);
        Ok(PathResult::Unreachable)
    }

    /// all nodes that belong to a taxiway or runway identifier, i.e. endpoints of edges with that label
    /// and (for runways) nodes that give access to it
    pub fn nodes_on (&self, label: &str)->BTreeSet<&str> {
        let mut ids: BTreeSet<&str> = BTreeSet::new();
        for e in self.edges.iter().filter(|e| e.label == label) {
            ids.insert( e.from.as_str());
            ids.insert( e.to.as_str());
        }
        for n in self.nodes.values().filter(|n| n.runways.iter().any(|r| r == label)) {
            ids.insert( n.id.as_str());
        }
        ids
    }

    /// sorted ids of the nodes where the taxiways/runways `a` and `b` meet
    pub fn intersections (&self, a: &str, b: &str)->Vec<String> {
        let on_b = self.nodes_on(b);
        self.nodes_on(a).into_iter().filter(|id| on_b.contains(id)).map(|id| id.to_string()).collect()
    }

    //--- runway selection

    /// the runways with the maximum headwind component for the given wind, longest first (then by name).
    /// With calm winds all runways qualify
    pub fn best_runways_for_wind (&self, wind: &Wind)->Vec<&Runway> {
        let max_headwind = self.runways.values().map(|r| r.headwind_for(wind)).fold( f64::NEG_INFINITY, f64::max);
        if !max_headwind.is_finite() { return Vec::new() }

        let mut best: Vec<&Runway> = self.runways.values().filter(|r| (r.headwind_for(wind) - max_headwind).abs() < 1e-6).collect();
        best.sort_by(|a,b| b.length_ft().total_cmp(&a.length_ft()).then_with(|| a.name.cmp(&b.name)));
        best
    }

    /// all runways without a tailwind component, best headwind first (ties by length, then name)
    pub fn active_runways_for_wind (&self, wind: &Wind)->Vec<&Runway> {
        let mut active: Vec<(&Runway,f64)> = self.runways.values().map(|r| (r, r.headwind_for(wind))).filter(|(_,hw)| *hw >= -1e-6).collect();
        active.sort_by(|(ra,ha),(rb,hb)| {
            hb.total_cmp(ha).then_with(|| rb.length_ft().total_cmp(&ra.length_ft())).then_with(|| ra.name.cmp(&rb.name))
        });
        active.into_iter().map(|(r,_)| r).collect()
    }

    /// the runway whose heading is closest to `heading_deg` if it is within `tolerance_deg`
    pub fn runway_by_heading (&self, heading_deg: f64, tolerance_deg: f64)->Option<&Runway> {
        let hdg = Angle360::from_degrees(heading_deg);
        self.runways.values()
            .filter(|r| r.heading.is_within( &hdg, tolerance_deg))
            .map(|r| (r, r.heading.diff_to(&hdg).magnitude()))
            .min_by(|(_,a),(_,b)| a.total_cmp(b))
            .map(|(r,_)| r)
    }

    /// names of runways whose centerlines geometrically cross the given one. Parallel runways and the reciprocal
    /// direction of the same strip are never reported
    pub fn crossing_runways (&self, name: &str)->Result<Vec<String>> {
        let rwy = self.runways.get(name).ok_or_else(|| AtcError::UnknownRunway(name.to_string()))?;
        let centerline = rwy.centerline();

        Ok( self.runways.values()
            .filter(|other| other.name != rwy.name)
            .filter(|other| !rwy.heading.is_aligned_with( &other.heading, PARALLEL_TOLERANCE_DEG))
            .filter(|other| matches!( line_intersection( centerline, other.centerline()), Some(LineIntersection::SinglePoint{..})))
            .map(|other| other.name.clone())
            .collect()
        )
    }

    //--- spatial queries

    /// nodes within `radius_m` meters of `pos`, closest first
    pub fn nodes_near (&self, pos: &Position, radius_m: f64)->Vec<&Node> {
        let mut near: Vec<(&Node,f64)> = self.nodes.values()
            .map(|n| (n, n.position.distance_nm(pos) * METERS_PER_NM))
            .filter(|(_,d)| *d <= radius_m)
            .collect();
        near.sort_by(|(na,a),(nb,b)| a.total_cmp(b).then_with(|| na.id.cmp(&nb.id)));
        near.into_iter().map(|(n,_)| n).collect()
    }

    pub fn closest_node (&self, pos: &Position)->Option<&Node> {
        self.nodes.values().min_by(|a,b| a.position.distance_nm(pos).total_cmp( &b.position.distance_nm(pos)))
    }

    /// sorted ids of all nodes that are part of the runway occupancy zone
    pub fn runway_zone (&self, name: &str)->Result<Vec<String>> {
        if !self.runways.contains_key(name) { return Err( AtcError::UnknownRunway(name.to_string())) }
        Ok( self.nodes.values().filter(|n| n.runways.iter().any(|r| r == name)).map(|n| n.id.clone()).collect() )
    }

    /// the runway (if any) whose footprint contains `pos`
    pub fn runway_at (&self, pos: &Position, margin_ft: f64)->Option<&Runway> {
        self.runways.values().find(|r| r.contains( pos, margin_ft))
    }

    //--- structural checks and derived topologies

    /// check for structural problems that do not prevent loading (isolated nodes, disconnected parts).
    /// Returns a list of human readable issues, which is empty for a well formed network
    pub fn validate (&self)->Vec<String> {
        let mut issues: Vec<String> = Vec::new();

        let mut connected: HashSet<&str> = HashSet::new();
        for e in &self.edges {
            connected.insert( e.from.as_str());
            connected.insert( e.to.as_str());
        }
        for id in self.nodes.keys().filter(|id| !connected.contains(id.as_str())) {
            issues.push( format!("node {id} is isolated"));
        }

        let n_components = self.weak_components().len();
        if n_components > 1 {
            issues.push( format!("graph has {n_components} disconnected components"));
        }

        for rwy in self.runways.keys() {
            if !self.nodes.contains_key( &threshold_node_id(rwy)) {
                issues.push( format!("runway {rwy} has no threshold node"));
            }
        }

        for issue in &issues { warn!("topology {}: {}", self.airport, issue) }
        issues
    }

    /// weakly connected components (edge direction ignored), each as sorted list of node ids
    pub fn weak_components (&self)->Vec<Vec<String>> {
        let mut undirected: BTreeMap<&str,Vec<&str>> = self.nodes.keys().map(|id| (id.as_str(), Vec::new())).collect();
        for e in &self.edges {
            if let Some(v) = undirected.get_mut(e.from.as_str()) { v.push( e.to.as_str()) }
            if let Some(v) = undirected.get_mut(e.to.as_str()) { v.push( e.from.as_str()) }
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut components: Vec<Vec<String>> = Vec::new();

        for start in undirected.keys() {
            if seen.contains(start) { continue }
            let mut component: Vec<String> = Vec::new();
            let mut stack: Vec<&str> = vec![*start];
            seen.insert(*start);

            while let Some(id) = stack.pop() {
                component.push( id.to_string());
                if let Some(next) = undirected.get(id) {
                    for n in next {
                        if seen.insert(*n) { stack.push(*n) }
                    }
                }
            }
            component.sort();
            components.push(component);
        }
        components
    }

    /// a new topology without the edges of the given taxiway (or runway) identifier
    pub fn with_closed_taxiway (&self, label: &str)->AirportTopology {
        let edges: Vec<Edge> = self.edges.iter().filter(|e| e.label != label).cloned().collect();
        let n_closed = self.edges.len() - edges.len();
        if n_closed == 0 {
            warn!("closing unknown taxiway {} in {}", label, self.airport);
        } else {
            info!("closed taxiway {} in {} ({} edges)", label, self.airport, n_closed);
        }
        Self::assemble( self.airport.clone(), self.runways.clone(), self.nodes.clone(), edges)
    }

    /// a new topology without the edge(s) connecting `a` and `b` in either direction
    pub fn without_edge (&self, a: &str, b: &str)->AirportTopology {
        let edges: Vec<Edge> = self.edges.iter()
            .filter(|e| !((e.from == a && e.to == b) || (e.from == b && e.to == a)))
            .cloned()
            .collect();
        Self::assemble( self.airport.clone(), self.runways.clone(), self.nodes.clone(), edges)
    }
}

impl fmt::Display for AirportTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AirportTopology( {}, runways: {}, nodes: {}, edges: {} )", self.airport, self.runways.len(), self.nodes.len(), self.edges.len())
    }
}

/* #endregion AirportTopology */
