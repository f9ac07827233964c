//! Evacuation route planning.
//!
//! Glues the pieces together for a caller holding a road graph, a rainfall
//! grid and a list of evacuation sites: snap the origin, resolve every site
//! to a road node, search for K alternatives to whichever site is cheapest
//! to reach, and rank them.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::RoutingOptions;
use crate::cost::{WeightOverlay, WeightPolicy};
use crate::dijkstra::{Exclusions, PathResult, Target, shortest_path};
use crate::error::RoutingError;
use crate::graph::{NodeId, RoadGraph};
use crate::locate::{Snap, nearest_node, snap};
use crate::rainfall::{Rainfall, RainfallIndex};
use crate::ranking::{RankedPath, rank_paths};
use crate::traits::EvacuationSite;
use crate::yen::{CancelToken, k_shortest_paths_with_policy};

/// An evacuation site resolved to its nearest road node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSite {
    pub id: String,
    pub name: String,
    pub district: Option<String>,
    pub node: NodeId,
}

/// A ranked route and the sites it leads to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvacuationRoute {
    pub ranked: RankedPath,
    /// Sites whose nearest node is this route's target.
    pub sites: Vec<ResolvedSite>,
}

/// Outcome of one planning call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteBatch {
    pub origin: NodeId,
    /// Metres between the requested origin and the snapped node.
    pub origin_snap_m: f64,
    pub routes: Vec<EvacuationRoute>,
}

impl RouteBatch {
    pub fn optimal(&self) -> Option<&EvacuationRoute> {
        self.routes.iter().find(|route| route.ranked.is_optimal)
    }
}

/// Resolves each site to its nearest road node. Sites that cannot be
/// resolved (empty graph) are dropped.
pub fn resolve_sites<S: EvacuationSite>(graph: &RoadGraph, sites: &[S]) -> Vec<ResolvedSite> {
    sites
        .iter()
        .filter_map(|site| {
            let (lat, lon) = site.location();
            let node = nearest_node(lat, lon, graph.nodes())?;
            Some(ResolvedSite {
                id: site.id().to_string(),
                name: site.name().to_string(),
                district: site.district().map(str::to_string),
                node,
            })
        })
        .collect()
}

fn rainfall_for<'a>(options: &RoutingOptions, index: &'a RainfallIndex) -> Rainfall<'a> {
    if options.simulation_mode {
        Rainfall::Manual(options.manual_rainfall_mm)
    } else {
        Rainfall::Live(index)
    }
}

fn cancel_token(options: &RoutingOptions) -> CancelToken {
    match options.deadline() {
        Some(timeout) => CancelToken::with_timeout(timeout),
        None => CancelToken::new(),
    }
}

/// Plans up to `options.k` ranked routes from `origin` to the evacuation
/// sites.
pub fn plan_evacuation<S: EvacuationSite>(
    graph: &RoadGraph,
    rainfall: &RainfallIndex,
    sites: &[S],
    origin: (f64, f64),
    options: &RoutingOptions,
) -> Result<RouteBatch, RoutingError> {
    plan_evacuation_with_cancel(graph, rainfall, sites, origin, options, &cancel_token(options))
}

/// [`plan_evacuation`] with a caller-held cancel token.
pub fn plan_evacuation_with_cancel<S: EvacuationSite>(
    graph: &RoadGraph,
    rainfall: &RainfallIndex,
    sites: &[S],
    origin: (f64, f64),
    options: &RoutingOptions,
    cancel: &CancelToken,
) -> Result<RouteBatch, RoutingError> {
    options.validate()?;
    if graph.is_empty() {
        return Err(RoutingError::EmptyGraph);
    }

    let (lat, lon) = origin;
    let Snap { node: start, distance_m } =
        snap(lat, lon, graph.nodes()).ok_or(RoutingError::OriginNotSnapped { lat, lon })?;

    let resolved = resolve_sites(graph, sites);
    if resolved.len() < sites.len() {
        warn!(
            resolved = resolved.len(),
            total = sites.len(),
            "some evacuation sites could not be resolved"
        );
    }
    let targets: BTreeSet<NodeId> = resolved.iter().map(|site| site.node).collect();
    if targets.is_empty() {
        return Err(RoutingError::NoSites);
    }

    let rain = rainfall_for(options, rainfall);
    let overlay = WeightOverlay::bake(graph, &rain, &options.weights);
    let policy = WeightPolicy::Baked {
        overlay: &overlay,
        rainfall: rain,
    };

    let paths = k_shortest_paths_with_policy(
        graph,
        start,
        &Target::Any(targets),
        options.k,
        &policy,
        cancel,
    );
    if paths.is_empty() {
        return Err(RoutingError::NoReachableSite(start));
    }

    let ranked = rank_paths(paths, graph, &rain, &overlay, &options.weights);
    let routes: Vec<EvacuationRoute> = ranked
        .into_iter()
        .map(|ranked| {
            let sites = resolved
                .iter()
                .filter(|site| site.node == ranked.path.target)
                .cloned()
                .collect();
            EvacuationRoute { ranked, sites }
        })
        .collect();

    info!(
        origin = %start,
        routes = routes.len(),
        requested = options.k,
        optimal = ?routes.iter().position(|route| route.ranked.is_optimal),
        simulation = options.simulation_mode,
        "evacuation routes planned"
    );

    Ok(RouteBatch {
        origin: start,
        origin_snap_m: distance_m,
        routes,
    })
}

/// Single-pair route under the plain risk-multiplier policy.
pub fn route_between(
    graph: &RoadGraph,
    rainfall: &RainfallIndex,
    from: NodeId,
    to: NodeId,
    options: &RoutingOptions,
) -> Result<PathResult, RoutingError> {
    options.validate()?;
    for node in [from, to] {
        if !graph.contains(node) {
            return Err(RoutingError::UnknownNode(node));
        }
    }

    let policy = WeightPolicy::RiskMultiplier(rainfall_for(options, rainfall));
    shortest_path(graph, from, &Target::Single(to), &Exclusions::new(), &policy)
        .ok_or(RoutingError::NoReachableSite(from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::RoadSegment;

    struct Site {
        id: &'static str,
        location: (f64, f64),
    }

    impl EvacuationSite for Site {
        fn id(&self) -> &str {
            self.id
        }

        fn name(&self) -> &str {
            self.id
        }

        fn location(&self) -> (f64, f64) {
            self.location
        }
    }

    fn line_graph() -> RoadGraph {
        RoadGraph::from_segments([
            RoadSegment {
                from: NodeId(1),
                to: NodeId(2),
                length: Some(100.0),
                geometry: vec![(14.600, 121.000), (14.601, 121.000)],
                ..RoadSegment::default()
            },
            RoadSegment {
                from: NodeId(2),
                to: NodeId(3),
                length: Some(100.0),
                geometry: vec![(14.601, 121.000), (14.602, 121.000)],
                ..RoadSegment::default()
            },
        ])
    }

    #[test]
    fn test_empty_graph() {
        let sites = [Site { id: "school", location: (14.6, 121.0) }];
        let err = plan_evacuation(
            &RoadGraph::new(),
            &RainfallIndex::default(),
            &sites,
            (14.6, 121.0),
            &RoutingOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RoutingError::EmptyGraph));
    }

    #[test]
    fn test_no_sites() {
        let sites: [Site; 0] = [];
        let err = plan_evacuation(
            &line_graph(),
            &RainfallIndex::default(),
            &sites,
            (14.6, 121.0),
            &RoutingOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RoutingError::NoSites));
    }

    #[test]
    fn test_routes_to_site_and_labels_it() {
        let sites = [Site { id: "gym", location: (14.6021, 121.0) }];
        let batch = plan_evacuation(
            &line_graph(),
            &RainfallIndex::default(),
            &sites,
            (14.6001, 121.0),
            &RoutingOptions::default(),
        )
        .expect("route planned");

        assert_eq!(batch.origin, NodeId(1));
        assert_eq!(batch.routes.len(), 1);
        let optimal = batch.optimal().expect("one optimal route");
        assert_eq!(optimal.ranked.path.target, NodeId(3));
        assert_eq!(optimal.sites[0].id, "gym");
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = RoutingOptions {
            k: 0,
            ..RoutingOptions::default()
        };
        let err = route_between(&line_graph(), &RainfallIndex::default(), NodeId(1), NodeId(3), &options)
            .unwrap_err();
        assert!(matches!(err, RoutingError::InvalidOptions(_)));
    }

    #[test]
    fn test_route_between_unknown_node() {
        let err = route_between(
            &line_graph(),
            &RainfallIndex::default(),
            NodeId(1),
            NodeId(77),
            &RoutingOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RoutingError::UnknownNode(NodeId(77))));
    }
}
