//! End-to-end scenarios for the weight space skeleton through the public API.
//!
//! Every scenario is small enough to be checked by hand: the expected
//! weights and weighted objective values are written out in the comments.

#![forbid(unsafe_code)]

use approx::assert_relative_eq;
use weight_space::prelude::*;

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Vertices as `(weight, weighted objective value)`, sorted by weight.
fn sorted_vertices(skeleton: &Skeleton) -> Vec<(Vec<f64>, f64)> {
    let mut vertices: Vec<_> = skeleton
        .vertices()
        .map(|(_, v)| (v.weight().to_vec(), v.weighted_objective_value()))
        .collect();
    vertices.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
    vertices
}

#[test]
fn boundary_scenario_hands_out_both_corners() {
    init_tracing();
    let mut skeleton = Skeleton::new(2, &[3.0, 5.0]).unwrap();

    assert_eq!(skeleton.number_of_vertices(), 2);
    assert_eq!(skeleton.number_of_edges(), 1);
    assert_eq!(
        sorted_vertices(&skeleton),
        vec![(vec![0.0, 1.0], 5.0), (vec![1.0, 0.0], 3.0)]
    );

    let mut handed_out = Vec::new();
    while skeleton.has_next_weight() {
        handed_out.push(skeleton.next_weight().unwrap().to_vec());
    }
    handed_out.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(handed_out, vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
    assert_eq!(
        skeleton.next_weight().unwrap_err(),
        SkeletonError::NoUntestedWeight
    );
}

#[test]
fn dominating_point_moves_both_corners() {
    init_tracing();
    let mut skeleton = SkeletonBuilder::new(&[3.0, 5.0])
        .originating_corner(0)
        .build()
        .unwrap();
    assert_eq!(skeleton.next_weight().unwrap(), &[0.0, 1.0]);

    // (1, 1) is better than (3, 5) at every weight.
    assert!(skeleton.is_extremal(&[1.0, 1.0]).unwrap());
    assert_eq!(skeleton.number_of_vertices(), 2);
    assert_eq!(skeleton.number_of_edges(), 1);
    assert_eq!(
        sorted_vertices(&skeleton),
        vec![(vec![0.0, 1.0], 1.0), (vec![1.0, 0.0], 1.0)]
    );
    for (_, vertex) in skeleton.vertices() {
        assert!(vertex.is_corner());
    }

    // The just-evaluated corner stays tested, the other one is reopened.
    let reopened: Vec<_> = skeleton.untested_weights().map(<[f64]>::to_vec).collect();
    assert_eq!(reopened, vec![vec![1.0, 0.0]]);
    assert!(skeleton.validate().is_ok());
}

#[test]
fn splitting_point_creates_intermediate_vertex() {
    init_tracing();
    let mut skeleton = SkeletonBuilder::new(&[3.0, 5.0])
        .originating_corner(0)
        .build()
        .unwrap();
    skeleton.next_weight().unwrap();

    // (5, 1) only beats (3, 5) near w = (0, 1). The two facets meet where
    // 3 w0 + 5 w1 = 5 w0 + w1, i.e. at w = (2/3, 1/3) with value 11/3.
    assert!(skeleton.is_extremal(&[5.0, 1.0]).unwrap());
    assert_eq!(skeleton.number_of_vertices(), 3);
    assert_eq!(skeleton.number_of_edges(), 2);
    assert!(skeleton.graph_is_valid());

    let vertices = sorted_vertices(&skeleton);
    assert_eq!(vertices[0], (vec![0.0, 1.0], 1.0));
    assert_relative_eq!(vertices[1].0[0], 2.0 / 3.0, epsilon = 1e-12);
    assert_relative_eq!(vertices[1].0[1], 1.0 / 3.0, epsilon = 1e-12);
    assert_relative_eq!(vertices[1].1, 11.0 / 3.0, epsilon = 1e-12);
    assert_eq!(vertices[2], (vec![1.0, 0.0], 3.0));

    let weight = skeleton.next_weight().unwrap().to_vec();
    assert_relative_eq!(weight[0], 2.0 / 3.0, epsilon = 1e-12);
    assert!(!skeleton.has_next_weight());

    // Both known points tie at the intermediate weight: nothing new.
    assert!(!skeleton.is_extremal(&[3.0, 5.0]).unwrap());
    assert!(!skeleton.is_extremal(&[5.0, 1.0]).unwrap());
    assert_eq!(
        skeleton.stats(),
        UpdateStats {
            new_vertices: 0,
            processed_vertices: 1
        }
    );
}

#[test]
fn three_objective_corner_cut() {
    init_tracing();
    let mut skeleton = Skeleton::new(3, &[2.0, 2.0, 2.0]).unwrap();
    assert_eq!(skeleton.number_of_vertices(), 3);
    assert_eq!(skeleton.number_of_edges(), 3);
    for (node, vertex) in skeleton.vertices() {
        assert_eq!(vertex.defining_facets().len(), 3);
        assert_eq!(skeleton.neighbors(node).len(), 2);
    }

    // (1, 3, 3) only improves on the first corner. It cuts the triangle
    // at the midpoints of the two edges leaving e_0.
    assert!(skeleton.is_extremal_thorough(&[1.0, 3.0, 3.0]).unwrap());
    assert_eq!(skeleton.number_of_vertices(), 5);
    assert_eq!(skeleton.number_of_edges(), 6);
    assert_eq!(
        skeleton.stats(),
        UpdateStats {
            new_vertices: 3,
            processed_vertices: 1
        }
    );
    skeleton.validate().unwrap();

    let vertices = sorted_vertices(&skeleton);
    let weights: Vec<_> = vertices.iter().map(|(w, _)| w.clone()).collect();
    assert_eq!(weights[0], vec![0.0, 0.0, 1.0]);
    assert_eq!(weights[1], vec![0.0, 1.0, 0.0]);
    for (actual, expected) in weights[2..4].iter().zip([[0.5, 0.0, 0.5], [0.5, 0.5, 0.0]]) {
        for (a, e) in actual.iter().zip(expected) {
            assert_relative_eq!(*a, e, epsilon = 1e-12);
        }
    }
    assert_eq!(weights[4], vec![1.0, 0.0, 0.0]);
    assert_relative_eq!(vertices[4].1, 1.0);
}

#[test]
fn ray_removes_corner_and_bounds_weight_space() {
    init_tracing();
    let mut skeleton = Skeleton::new(2, &[3.0, 5.0]).unwrap();

    // A ray along (1, 0) is never improving for non-negative weights.
    assert!(!skeleton.add_ray_thorough(&[1.0, 0.0]).unwrap());
    assert_eq!(skeleton.number_of_facets(), 3);

    // (-1, 2) is improving wherever w0 > 2 w1.
    assert!(skeleton.add_ray_thorough(&[-1.0, 2.0]).unwrap());
    let (_, ray) = skeleton.facets().last().unwrap();
    assert_eq!(ray.kind(), FacetKind::Ray);
    assert_relative_eq!(ray.objective_coefficient(), 0.0);

    let vertices = sorted_vertices(&skeleton);
    assert_eq!(vertices.len(), 2);
    assert_eq!(vertices[0], (vec![0.0, 1.0], 5.0));
    assert_relative_eq!(vertices[1].0[0], 2.0 / 3.0, epsilon = 1e-12);
    assert_relative_eq!(vertices[1].1, 11.0 / 3.0, epsilon = 1e-12);
    assert!(!vertices.iter().any(|(w, _)| w == &vec![1.0, 0.0]));
    skeleton.validate().unwrap();
}

#[test]
fn point_after_ray_moves_vertex_on_ray_facet() {
    init_tracing();
    let mut skeleton = Skeleton::new(2, &[3.0, 5.0]).unwrap();
    assert!(skeleton.add_ray_thorough(&[-1.0, 2.0]).unwrap());

    // (2, 6) improves on (3, 5) wherever w0 > 1/2. On the ray facet at
    // w = (2/3, 1/3) the value drops from 11/3 to 10/3; the two points tie
    // at w = (1/2, 1/2) with value 4.
    assert!(skeleton.is_extremal_thorough(&[2.0, 6.0]).unwrap());
    assert_eq!(
        skeleton.stats(),
        UpdateStats {
            new_vertices: 2,
            processed_vertices: 1
        }
    );
    assert_eq!(skeleton.number_of_vertices(), 3);
    assert_eq!(skeleton.number_of_edges(), 2);

    let vertices = sorted_vertices(&skeleton);
    assert_eq!(vertices[0], (vec![0.0, 1.0], 5.0));
    assert_relative_eq!(vertices[1].0[0], 0.5, epsilon = 1e-12);
    assert_relative_eq!(vertices[1].1, 4.0, epsilon = 1e-12);
    assert_relative_eq!(vertices[2].0[0], 2.0 / 3.0, epsilon = 1e-12);
    assert_relative_eq!(vertices[2].1, 10.0 / 3.0, epsilon = 1e-12);

    let on_ray = skeleton
        .vertices()
        .find(|(_, v)| (v.weight()[0] - 2.0 / 3.0).abs() < 1e-9)
        .map(|(node, _)| node)
        .unwrap();
    assert!(
        skeleton
            .untested_weights()
            .any(|w| (w[0] - 2.0 / 3.0).abs() < 1e-9)
    );
    assert_eq!(skeleton.neighbors(on_ray).len(), 1);
    skeleton.validate().unwrap();
}

#[test]
fn immediate_retention_frees_obsolete_vertices() {
    init_tracing();
    let config = SkeletonConfigBuilder::default()
        .retention(VertexRetention::Immediate)
        .build()
        .unwrap();
    let mut deferred = Skeleton::new(2, &[3.0, 5.0]).unwrap();
    let mut immediate = SkeletonBuilder::new(&[3.0, 5.0])
        .config(config)
        .build()
        .unwrap();

    for skeleton in [&mut deferred, &mut immediate] {
        skeleton.add_ray_thorough(&[-1.0, 2.0]).unwrap();
        assert_eq!(skeleton.number_of_vertices(), 2);
    }
    assert_eq!(deferred.number_of_allocated_vertices(), 3);
    assert_eq!(immediate.number_of_allocated_vertices(), 2);
    assert_eq!(sorted_vertices(&deferred), sorted_vertices(&immediate));
}

#[test]
fn find_obsolete_node_reports_without_cutting() {
    init_tracing();
    let skeleton = Skeleton::new(2, &[3.0, 5.0]).unwrap();
    let facet = Facet::from_point(&[5.0, 1.0]).unwrap();
    let node = skeleton.find_obsolete_node(&facet).unwrap().unwrap();
    assert_eq!(skeleton.vertex(node).unwrap().weight(), &[0.0, 1.0]);
    assert_eq!(skeleton.number_of_facets(), 3);

    let harmless = Facet::from_point(&[4.0, 6.0]).unwrap();
    assert_eq!(skeleton.find_obsolete_node(&harmless).unwrap(), None);

    let wrong = Facet::from_point(&[1.0, 1.0, 1.0]).unwrap();
    assert_eq!(
        skeleton.find_obsolete_node(&wrong).unwrap_err(),
        SkeletonError::DimensionMismatch {
            expected: 2,
            actual: 3
        }
    );
}

#[test]
fn tolerance_ignores_negligible_improvements() {
    init_tracing();
    let config = SkeletonConfigBuilder::default().epsilon(1e-6).build().unwrap();
    let mut skeleton = SkeletonBuilder::new(&[3.0, 5.0])
        .originating_corner(0)
        .config(config)
        .build()
        .unwrap();
    skeleton.next_weight().unwrap();

    assert!(!skeleton.is_extremal(&[3.0, 5.0 - 1e-8]).unwrap());
    assert_eq!(skeleton.number_of_facets(), 3);
    assert!(skeleton.is_extremal(&[3.0, 5.0 - 1e-3]).unwrap());
    assert_eq!(skeleton.number_of_facets(), 4);
}
