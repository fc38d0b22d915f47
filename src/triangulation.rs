//! Delaunay triangulation of scattered 2-D samples.
//!
//! Points are mapped into a unit-scaled local frame (uniform scale, so the
//! Delaunay property of the original coordinates is preserved) and bulk
//! loaded into a `spade` Delaunay triangulation. `spade` evaluates its
//! orientation and in-circle tests with exact predicates, so the triangles
//! tile the convex hull even when one axis spans orders of magnitude more
//! than the other.
//!
//! Point location for interpolation goes through a uniform bucket index over
//! triangle bounding boxes. A query point that lands in no triangle is outside
//! the convex hull of the samples.

use spade::{mitigate_underflow, DelaunayTriangulation, HasPosition, Point2, Triangulation as _};

/// Collinearity tolerance, relative to the bounding-box area.
const COLLINEAR_EPS: f64 = 1e-12;

/// Barycentric slack accepted for points on a triangle edge.
const EDGE_EPS: f64 = 1e-10;

const MAX_BUCKETS_PER_AXIS: usize = 256;

/// 2-D point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Twice the signed area of `(a, b, c)`; positive when counter-clockwise.
#[inline]
fn orient(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Returns the convex hull of `points` as indices in counter-clockwise order
/// (Andrew's monotone chain). Collinear boundary points are dropped, so a
/// hull with fewer than 3 vertices means the input is collinear.
pub fn convex_hull(points: &[Point]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        points[a]
            .x
            .total_cmp(&points[b].x)
            .then(points[a].y.total_cmp(&points[b].y))
    });
    order.dedup_by(|a, b| points[*a] == points[*b]);
    if order.len() < 3 {
        return order;
    }

    let (lo, hi) = bounds(points);
    let eps = COLLINEAR_EPS * (hi.x - lo.x) * (hi.y - lo.y);
    let mut hull: Vec<usize> = Vec::with_capacity(order.len() * 2);

    for pass in [order.clone(), order.iter().rev().copied().collect()] {
        let start = hull.len();
        for &i in &pass {
            while hull.len() >= start + 2
                && orient(
                    points[hull[hull.len() - 2]],
                    points[hull[hull.len() - 1]],
                    points[i],
                ) <= eps
            {
                hull.pop();
            }
            hull.push(i);
        }
        hull.pop();
    }

    if hull.len() < 3 {
        hull.truncate(2);
    }
    hull
}

/// Largest extent of the bounding box, or 1 for a single point.
fn frame_scale(points: &[Point]) -> f64 {
    let (min, max) = bounds(points);
    let s = (max.x - min.x).max(max.y - min.y);
    if s > 0.0 {
        s
    } else {
        1.0
    }
}

fn bounds(points: &[Point]) -> (Point, Point) {
    points.iter().fold(
        (
            Point::new(f64::INFINITY, f64::INFINITY),
            Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        ),
        |(lo, hi), p| {
            (
                Point::new(lo.x.min(p.x), lo.y.min(p.y)),
                Point::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        },
    )
}

// ── Triangulation ─────────────────────────────────────────────────────

/// Sample position carrying its index in the caller's point slice.
#[derive(Debug, Clone, Copy)]
struct Vertex {
    position: Point2<f64>,
    index: usize,
}

impl HasPosition for Vertex {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        self.position
    }
}

/// A triangle located by [`Triangulation::locate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    /// Index into [`Triangulation::triangles`].
    pub triangle: usize,
    /// Barycentric weights of the triangle's vertices, summing to 1.
    pub weights: [f64; 3],
}

/// Delaunay triangulation over a set of distinct points.
#[derive(Debug, Clone)]
pub struct Triangulation {
    origin: Point,
    scale: f64,
    local: Vec<Point>,
    triangles: Vec<[usize; 3]>,
    index: BucketIndex,
}

impl Triangulation {
    /// Triangulates distinct, non-collinear points.
    ///
    /// Returns `None` when no triangle can be formed (fewer than three
    /// points, all points collinear, or coordinates outside the range the
    /// exact predicates accept).
    ///
    /// ```
    /// use u_scatter::triangulation::{Point, Triangulation};
    ///
    /// let pts = [
    ///     Point::new(0.0, 0.0),
    ///     Point::new(1.0, 0.0),
    ///     Point::new(0.0, 1.0),
    ///     Point::new(1.0, 1.0),
    /// ];
    /// let tri = Triangulation::new(&pts).unwrap();
    /// assert_eq!(tri.triangles().len(), 2);
    /// assert!(tri.locate(Point::new(0.25, 0.5)).is_some());
    /// assert!(tri.locate(Point::new(1.5, 0.5)).is_none());
    /// ```
    pub fn new(points: &[Point]) -> Option<Self> {
        let n = points.len();
        if n < 3 {
            return None;
        }
        let (origin, _) = bounds(points);
        let scale = frame_scale(points);
        let local: Vec<Point> = points
            .iter()
            .map(|p| Point::new((p.x - origin.x) / scale, (p.y - origin.y) / scale))
            .collect();

        let triangles = delaunay(&local)?;
        if triangles.is_empty() {
            return None;
        }
        let index = BucketIndex::build(&local, &triangles);
        Some(Self {
            origin,
            scale,
            local,
            triangles,
            index,
        })
    }

    /// Vertex indices of each triangle, counter-clockwise.
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.local.len()
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty()
    }

    /// Maps an input-space point into the unit-scaled frame.
    #[inline]
    pub fn to_local(&self, p: Point) -> Point {
        Point::new((p.x - self.origin.x) / self.scale, (p.y - self.origin.y) / self.scale)
    }

    /// Vertex position in the unit-scaled frame.
    #[inline]
    pub fn local_point(&self, i: usize) -> Point {
        self.local[i]
    }

    /// Finds the triangle containing `p` (input-space coordinates).
    pub fn locate(&self, p: Point) -> Option<Location> {
        let q = self.to_local(p);
        self.index.candidates(q).iter().find_map(|&t| {
            let [a, b, c] = self.triangles[t];
            barycentric(self.local[a], self.local[b], self.local[c], q).map(|weights| Location {
                triangle: t,
                weights,
            })
        })
    }

    /// Sorted, de-duplicated Delaunay neighbours of every vertex.
    pub fn neighbors(&self) -> Vec<Vec<usize>> {
        let mut adj: Vec<Vec<usize>> = vec![Vec::new(); self.local.len()];
        for &[a, b, c] in &self.triangles {
            adj[a].extend([b, c]);
            adj[b].extend([a, c]);
            adj[c].extend([a, b]);
        }
        for list in &mut adj {
            list.sort_unstable();
            list.dedup();
        }
        adj
    }
}

/// Inner faces of the Delaunay triangulation of `local`, counter-clockwise.
///
/// The faces tile the convex hull exactly. `None` if a coordinate is
/// rejected by the insertion predicates.
fn delaunay(local: &[Point]) -> Option<Vec<[usize; 3]>> {
    let vertices: Vec<Vertex> = local
        .iter()
        .enumerate()
        .map(|(index, p)| Vertex {
            position: mitigate_underflow(Point2::new(p.x, p.y)),
            index,
        })
        .collect();
    let dt = DelaunayTriangulation::<Vertex>::bulk_load(vertices).ok()?;
    Some(
        dt.inner_faces()
            .map(|face| face.vertices().map(|v| v.data().index))
            .collect(),
    )
}

/// Barycentric weights of `q` in `(a, b, c)`, or `None` if outside.
fn barycentric(a: Point, b: Point, c: Point, q: Point) -> Option<[f64; 3]> {
    let det = (b.y - c.y) * (a.x - c.x) + (c.x - b.x) * (a.y - c.y);
    if det == 0.0 {
        return None;
    }
    let l1 = ((b.y - c.y) * (q.x - c.x) + (c.x - b.x) * (q.y - c.y)) / det;
    let l2 = ((c.y - a.y) * (q.x - c.x) + (a.x - c.x) * (q.y - c.y)) / det;
    let l3 = 1.0 - l1 - l2;
    (l1 >= -EDGE_EPS && l2 >= -EDGE_EPS && l3 >= -EDGE_EPS).then_some([l1, l2, l3])
}

// ── Bucket index ──────────────────────────────────────────────────────

/// Uniform grid over the unit-scaled frame mapping cells to the triangles
/// whose bounding boxes overlap them.
#[derive(Debug, Clone)]
struct BucketIndex {
    nx: usize,
    ny: usize,
    width: f64,
    height: f64,
    cells: Vec<Vec<usize>>,
}

impl BucketIndex {
    fn build(local: &[Point], triangles: &[[usize; 3]]) -> Self {
        let (_, hi) = bounds(local);
        let width = hi.x.max(f64::MIN_POSITIVE);
        let height = hi.y.max(f64::MIN_POSITIVE);
        let per_axis = ((triangles.len() as f64).sqrt().ceil() as usize).clamp(1, MAX_BUCKETS_PER_AXIS);
        let (nx, ny) = (per_axis, per_axis);
        let mut cells = vec![Vec::new(); nx * ny];

        let mut index = Self {
            nx,
            ny,
            width,
            height,
            cells: Vec::new(),
        };
        for (t, &[a, b, c]) in triangles.iter().enumerate() {
            let tri = [local[a], local[b], local[c]];
            let (lo, hi) = bounds(&tri);
            let (x0, y0) = index.cell_of(lo);
            let (x1, y1) = index.cell_of(hi);
            for cy in y0..=y1 {
                for cx in x0..=x1 {
                    cells[cy * nx + cx].push(t);
                }
            }
        }
        index.cells = cells;
        index
    }

    #[inline]
    fn cell_of(&self, p: Point) -> (usize, usize) {
        let fx = (p.x / self.width * self.nx as f64).floor();
        let fy = (p.y / self.height * self.ny as f64).floor();
        (
            (fx.max(0.0) as usize).min(self.nx - 1),
            (fy.max(0.0) as usize).min(self.ny - 1),
        )
    }

    fn candidates(&self, q: Point) -> &[usize] {
        let slack = EDGE_EPS;
        if q.x < -slack
            || q.y < -slack
            || q.x > self.width + slack
            || q.y > self.height + slack
            || !q.x.is_finite()
            || !q.y.is_finite()
        {
            return &[];
        }
        let (cx, cy) = self.cell_of(q);
        &self.cells[cy * self.nx + cx]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Eight hull points on a wobbly ring around a jittered interior lattice.
    fn ring_points(n: usize) -> Vec<Point> {
        let mut pts: Vec<Point> = (0..8)
            .map(|k| {
                let angle = k as f64 * std::f64::consts::FRAC_PI_4;
                let r = n as f64 + 0.3 * (k % 3) as f64;
                Point::new(r * angle.cos(), r * angle.sin())
            })
            .collect();
        let half = (n as f64 - 1.0) / 2.0;
        for i in 0..n {
            for j in 0..n {
                let jitter = ((i * 7 + j * 13) % 5) as f64 * 0.05;
                pts.push(Point::new(
                    (i as f64 - half) * 0.8 + jitter,
                    (j as f64 - half) * 0.8 - jitter * 0.5,
                ));
            }
        }
        pts
    }

    /// Pseudo-random points in `[0, sx] × [0, sy]`, hull corners included.
    fn stretched_points(n: usize, sx: f64, sy: f64) -> Vec<Point> {
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 11) as f64 / (1u64 << 53) as f64
        };
        (0..n).map(|_| Point::new(next() * sx, next() * sy)).collect()
    }

    fn area(tri: &Triangulation, t: [usize; 3]) -> f64 {
        orient(tri.local_point(t[0]), tri.local_point(t[1]), tri.local_point(t[2])) / 2.0
    }

    fn hull_area(tri: &Triangulation, hull: &[usize]) -> f64 {
        (0..hull.len())
            .map(|k| {
                let p = tri.local_point(hull[k]);
                let q = tri.local_point(hull[(k + 1) % hull.len()]);
                p.x * q.y - q.x * p.y
            })
            .sum::<f64>()
            / 2.0
    }

    /// Circumcentre and squared radius.
    fn circumcircle(a: Point, b: Point, c: Point) -> (Point, f64) {
        let (bx, by) = (b.x - a.x, b.y - a.y);
        let (cx, cy) = (c.x - a.x, c.y - a.y);
        let d = 2.0 * (bx * cy - by * cx);
        let b2 = bx * bx + by * by;
        let c2 = cx * cx + cy * cy;
        let ux = (cy * b2 - by * c2) / d;
        let uy = (bx * c2 - cx * b2) / d;
        (Point::new(a.x + ux, a.y + uy), ux * ux + uy * uy)
    }

    #[test]
    fn hull_of_square_with_interior_point() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
        ];
        let hull = convex_hull(&pts);
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&2));
    }

    #[test]
    fn hull_of_collinear_points() {
        let pts: Vec<Point> = (0..4).map(|i| Point::new(i as f64, 2.0 * i as f64 + 1.0)).collect();
        assert!(convex_hull(&pts).len() < 3);
        assert!(Triangulation::new(&pts).is_none());
    }

    #[test]
    fn hull_drops_collinear_edge_points() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(1.0, 1.0),
        ];
        assert_eq!(convex_hull(&pts).len(), 3);
    }

    #[test]
    fn triangle_count_matches_euler() {
        // For a triangulation of n points with h on the hull: 2n - 2 - h triangles.
        let pts = ring_points(6);
        let tri = Triangulation::new(&pts).unwrap();
        let h = convex_hull(&pts).len();
        assert_eq!(tri.triangles().len(), 2 * pts.len() - 2 - h);
    }

    #[test]
    fn triangles_are_ccw_and_cover_hull_area() {
        let pts = ring_points(5);
        let tri = Triangulation::new(&pts).unwrap();
        let mut total = 0.0;
        for &t in tri.triangles() {
            let a = area(&tri, t);
            assert!(a > 0.0);
            total += a;
        }
        let hull = convex_hull(&pts);
        assert!((total - hull_area(&tri, &hull)).abs() < 1e-9);
    }

    #[test]
    fn stretched_samples_cover_hull_area() {
        for (sx, sy) in [(1.0e5, 1.0), (1.0e6, 1.0), (1.0, 1.0e4), (3.0e9, 0.5)] {
            let pts = stretched_points(200, sx, sy);
            let tri = Triangulation::new(&pts).unwrap();
            let total: f64 = tri.triangles().iter().map(|&t| area(&tri, t)).sum();
            let expected = hull_area(&tri, &convex_hull(&pts));
            assert!(
                (total - expected).abs() <= 1e-9 * expected,
                "{sx} x {sy}: triangles cover {total}, hull is {expected}"
            );
        }
    }

    #[test]
    fn stretched_samples_locate_every_vertex() {
        let pts = stretched_points(200, 1.0e5, 1.0);
        let tri = Triangulation::new(&pts).unwrap();
        for p in &pts {
            assert!(tri.locate(*p).is_some(), "vertex {p:?} not located");
        }
    }

    #[test]
    fn empty_circumcircle_property() {
        let pts = ring_points(5);
        let tri = Triangulation::new(&pts).unwrap();
        let local: Vec<Point> = (0..tri.len()).map(|i| tri.local_point(i)).collect();
        for &t in tri.triangles() {
            let (c, r2) = circumcircle(local[t[0]], local[t[1]], local[t[2]]);
            for (i, p) in local.iter().enumerate() {
                if t.contains(&i) {
                    continue;
                }
                let d2 = (p.x - c.x).powi(2) + (p.y - c.y).powi(2);
                assert!(d2 >= r2 * (1.0 - 1e-9), "point {i} inside circumcircle of {t:?}");
            }
        }
    }

    #[test]
    fn locate_returns_weights_summing_to_one() {
        let pts = ring_points(4);
        let tri = Triangulation::new(&pts).unwrap();
        let loc = tri.locate(Point::new(1.3, 1.7)).unwrap();
        let sum: f64 = loc.weights.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!(loc.weights.iter().all(|&w| w >= -1e-10));
    }

    #[test]
    fn locate_sample_vertices() {
        let pts = ring_points(4);
        let tri = Triangulation::new(&pts).unwrap();
        for p in &pts {
            assert!(tri.locate(*p).is_some(), "vertex {p:?} not located");
        }
    }

    #[test]
    fn locate_outside_hull() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(0.0, 4.0),
            Point::new(1.0, 1.0),
        ];
        let tri = Triangulation::new(&pts).unwrap();
        // inside the bounding box, outside the hull
        assert!(tri.locate(Point::new(3.5, 3.5)).is_none());
        assert!(tri.locate(Point::new(-0.1, 1.0)).is_none());
        assert!(tri.locate(Point::new(0.5, 0.5)).is_some());
    }

    #[test]
    fn neighbors_are_symmetric() {
        let pts = ring_points(4);
        let tri = Triangulation::new(&pts).unwrap();
        let adj = tri.neighbors();
        for (i, list) in adj.iter().enumerate() {
            assert!(!list.is_empty());
            for &j in list {
                assert!(adj[j].contains(&i));
            }
        }
    }

    #[test]
    fn triangulation_is_deterministic() {
        let pts = ring_points(6);
        let a = Triangulation::new(&pts).unwrap();
        let b = Triangulation::new(&pts).unwrap();
        assert_eq!(a.triangles(), b.triangles());
    }
}
