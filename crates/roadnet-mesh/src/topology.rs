//! Junction clustering and dead-end detection over curve endpoints.
//!
//! Only endpoints take part: two curves crossing mid-span do not form a
//! junction.

use roadnet_curve::{Curve, CurveEnd};
use roadnet_math::Point3;

/// Curves whose endpoints meet near a shared point.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionCluster<K> {
    /// Representative location of the junction.
    pub point: Point3,
    /// Member curves, in discovery order, each once.
    pub curves: Vec<K>,
}

/// A curve endpoint shared with no junction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreeEndpoint<K> {
    /// Owning curve.
    pub curve: K,
    /// Which end of the curve.
    pub end: CurveEnd,
    /// Location of the endpoint.
    pub point: Point3,
}

const ENDS: [CurveEnd; 2] = [CurveEnd::Start, CurveEnd::End];

fn within(a: &Point3, b: &Point3, threshold: f64) -> bool {
    (a - b).norm_squared() <= threshold * threshold
}

/// Group curves whose endpoints lie within `threshold` of each other.
///
/// Every pair of touching endpoints contributes the first curve's endpoint
/// as a candidate point. A candidate within `threshold` of an existing
/// cluster joins it; otherwise it starts a new cluster. Clusters come out
/// in discovery order.
pub fn find_clusters<K: Copy + Eq>(
    curves: &[(K, &dyn Curve)],
    threshold: f64,
) -> Vec<IntersectionCluster<K>> {
    let mut clusters: Vec<IntersectionCluster<K>> = Vec::new();
    for (i, (key_a, a)) in curves.iter().enumerate() {
        for (key_b, b) in &curves[i + 1..] {
            for end_a in ENDS {
                let pa = a.endpoint(end_a);
                if !ENDS.iter().any(|&end_b| within(&pa, &b.endpoint(end_b), threshold)) {
                    continue;
                }
                let cluster = match clusters.iter().position(|c| within(&pa, &c.point, threshold)) {
                    Some(idx) => &mut clusters[idx],
                    None => {
                        clusters.push(IntersectionCluster {
                            point: pa,
                            curves: Vec::new(),
                        });
                        let last = clusters.len() - 1;
                        &mut clusters[last]
                    }
                };
                for key in [*key_a, *key_b] {
                    if !cluster.curves.contains(&key) {
                        cluster.curves.push(key);
                    }
                }
            }
        }
    }
    clusters
}

/// Endpoints farther than `threshold` from every cluster point.
pub fn find_free_endpoints<K: Copy + Eq>(
    curves: &[(K, &dyn Curve)],
    clusters: &[IntersectionCluster<K>],
    threshold: f64,
) -> Vec<FreeEndpoint<K>> {
    let mut free = Vec::new();
    for (key, curve) in curves {
        for end in ENDS {
            let point = curve.endpoint(end);
            if clusters.iter().any(|c| within(&point, &c.point, threshold)) {
                continue;
            }
            free.push(FreeEndpoint {
                curve: *key,
                end,
                point,
            });
        }
    }
    free
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadnet_curve::PolylineCurve;

    fn line(a: (f64, f64), b: (f64, f64)) -> PolylineCurve {
        PolylineCurve::new(vec![Point3::new(a.0, a.1, 0.0), Point3::new(b.0, b.1, 0.0)]).unwrap()
    }

    #[test]
    fn test_shared_endpoint_forms_cluster() {
        let a = line((-100.0, 0.0), (0.0, 0.0));
        let b = line((3.0, 4.0), (100.0, 0.0));
        let c = line((53.0, 40.0), (200.0, 200.0));
        let curves: [(u32, &dyn Curve); 3] = [(0, &a), (1, &b), (2, &c)];

        let clusters = find_clusters(&curves, 10.0);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].point, Point3::origin());
        assert_eq!(clusters[0].curves, vec![0, 1]);

        let free = find_free_endpoints(&curves, &clusters, 1.0);
        let free_curves: Vec<(u32, CurveEnd)> = free.iter().map(|f| (f.curve, f.end)).collect();
        assert_eq!(
            free_curves,
            vec![
                (0, CurveEnd::Start),
                (1, CurveEnd::Start),
                (1, CurveEnd::End),
                (2, CurveEnd::Start),
                (2, CurveEnd::End),
            ]
        );
    }

    #[test]
    fn test_three_way_junction() {
        let a = line((0.0, 0.0), (-100.0, 0.0));
        let b = line((0.0, 0.0), (100.0, 0.0));
        let c = line((0.0, 100.0), (0.0, 2.0));
        let curves: [(u32, &dyn Curve); 3] = [(0, &a), (1, &b), (2, &c)];
        let clusters = find_clusters(&curves, 10.0);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].curves, vec![0, 1, 2]);
        let free = find_free_endpoints(&curves, &clusters, 1.0);
        // The end of `c` is 2 units off the cluster point: outside the tighter threshold.
        assert_eq!(free.len(), 4);
    }

    #[test]
    fn test_chain_forms_two_clusters() {
        let a = line((0.0, 0.0), (100.0, 0.0));
        let b = line((100.0, 0.0), (200.0, 0.0));
        let c = line((200.0, 0.0), (300.0, 0.0));
        let curves: [(u32, &dyn Curve); 3] = [(0, &a), (1, &b), (2, &c)];
        let clusters = find_clusters(&curves, 10.0);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].curves, vec![0, 1]);
        assert_eq!(clusters[1].curves, vec![1, 2]);
        assert_eq!(find_free_endpoints(&curves, &clusters, 1.0).len(), 2);
    }

    #[test]
    fn test_loop_of_two_curves_clusters_both_ends() {
        let a = line((0.0, 0.0), (100.0, 0.0));
        let b = PolylineCurve::new(vec![
            Point3::new(100.0, 0.0, 0.0),
            Point3::new(50.0, 50.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        ])
        .unwrap();
        let curves: [(u32, &dyn Curve); 2] = [(0, &a), (1, &b)];
        let clusters = find_clusters(&curves, 10.0);
        assert_eq!(clusters.len(), 2);
        assert!(find_free_endpoints(&curves, &clusters, 1.0).is_empty());
    }

    #[test]
    fn test_isolated_curves() {
        let a = line((0.0, 0.0), (100.0, 0.0));
        let curves: [(u32, &dyn Curve); 1] = [(0, &a)];
        assert!(find_clusters(&curves, 10.0).is_empty());
        assert_eq!(find_free_endpoints(&curves, &[], 1.0).len(), 2);
        let none: Vec<(u32, &dyn Curve)> = Vec::new();
        assert!(find_clusters(&none, 10.0).is_empty());
    }
}
