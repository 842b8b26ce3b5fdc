//! Point quadtree used to accelerate the pairwise terms.
//!
//! Internal nodes carry the point count and centroid of everything below
//! them, which is what Barnes-Hut needs. Leaves hold one point, or several
//! when they coincide and the depth limit is reached.

use crate::float::Float;
use crate::vec::Vec2;

const MAX_DEPTH: usize = 24;

pub(crate) struct Node<F: Float> {
    pub min: Vec2<F>,
    pub size: F,
    pub children: [Option<usize>; 4],
    pub points: Vec<usize>,
    pub count: usize,
    pub centroid: Vec2<F>,
}

impl<F: Float> Node<F> {
    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    /// Whether this node's square overlaps the axis-aligned box of half-width
    /// `reach` around `center`.
    fn overlaps(&self, center: Vec2<F>, reach: F) -> bool {
        let max_x = self.min.x + self.size;
        let max_y = self.min.y + self.size;
        !(self.min.x > center.x + reach
            || max_x < center.x - reach
            || self.min.y > center.y + reach
            || max_y < center.y - reach)
    }
}

pub(crate) struct QuadTree<F: Float> {
    nodes: Vec<Node<F>>,
}

impl<F: Float> QuadTree<F> {
    /// Build over `points`; the tree stores indices into that slice.
    /// Non-finite points are left out.
    pub fn build(points: &[Vec2<F>]) -> Self {
        let ids: Vec<usize> = (0..points.len()).filter(|&i| points[i].is_finite()).collect();
        let mut tree = QuadTree { nodes: Vec::new() };
        let Some(&first) = ids.first() else {
            return tree;
        };

        let mut min = points[first];
        let mut max = points[first];
        for &i in &ids {
            let p = points[i];
            min = Vec2::new(min.x.min(p.x), min.y.min(p.y));
            max = Vec2::new(max.x.max(p.x), max.y.max(p.y));
        }
        let mut size = (max.x - min.x).max(max.y - min.y);
        if size == F::zero() {
            size = F::one();
        }

        tree.nodes.reserve(2 * ids.len());
        tree.insert(points, ids, min, size, 0);
        tree
    }

    fn insert(&mut self, points: &[Vec2<F>], ids: Vec<usize>, min: Vec2<F>, size: F, depth: usize) -> usize {
        let mut sum = Vec2::zero();
        for &i in &ids {
            sum += points[i];
        }
        let count = ids.len();
        let centroid = sum.scale(F::one() / F::from_f64(count as f64));

        let index = self.nodes.len();
        self.nodes.push(Node { min, size, children: [None; 4], points: Vec::new(), count, centroid });

        if count <= 1 || depth >= MAX_DEPTH {
            self.nodes[index].points = ids;
            return index;
        }

        let half = size * F::half();
        let mid = Vec2::new(min.x + half, min.y + half);
        let mut quadrants: [Vec<usize>; 4] = Default::default();
        for i in ids {
            let p = points[i];
            let q = usize::from(p.x >= mid.x) + 2 * usize::from(p.y >= mid.y);
            quadrants[q].push(i);
        }

        for (q, bucket) in quadrants.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            let child_min = Vec2::new(
                if q & 1 == 1 { mid.x } else { min.x },
                if q & 2 == 2 { mid.y } else { min.y },
            );
            let child = self.insert(points, bucket, child_min, half, depth + 1);
            self.nodes[index].children[q] = Some(child);
        }
        index
    }

    pub fn root(&self) -> Option<usize> {
        if self.nodes.is_empty() { None } else { Some(0) }
    }

    pub fn node(&self, index: usize) -> &Node<F> {
        &self.nodes[index]
    }

    /// Calls `f` with every point stored in a leaf that overlaps the box of
    /// half-width `reach` around `center`. Callers do their own exact distance test.
    pub fn for_each_near(&self, center: Vec2<F>, reach: F, mut f: impl FnMut(usize)) {
        let mut stack: Vec<usize> = self.root().into_iter().collect();
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if !node.overlaps(center, reach) {
                continue;
            }
            if node.is_leaf() {
                node.points.iter().for_each(|&i| f(i));
            } else {
                stack.extend(node.children.iter().flatten());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_points(n: usize) -> Vec<Vec2<f64>> {
        (0..n * n).map(|i| Vec2::new((i % n) as f64, (i / n) as f64)).collect()
    }

    #[test]
    fn root_aggregates_all_points() {
        let points = grid_points(4);
        let tree = QuadTree::build(&points);
        let root = tree.node(tree.root().expect("non-empty tree"));
        assert_eq!(root.count, 16);
        assert!((root.centroid.x - 1.5).abs() < 1e-12);
        assert!((root.centroid.y - 1.5).abs() < 1e-12);
    }

    #[test]
    fn every_point_lands_in_exactly_one_leaf() {
        let points = grid_points(5);
        let tree = QuadTree::build(&points);
        let mut seen = vec![0; points.len()];
        tree.for_each_near(Vec2::new(2.0, 2.0), 100.0, |i| seen[i] += 1);
        assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn range_query_skips_far_points() {
        let points = grid_points(10);
        let tree = QuadTree::build(&points);
        let mut found = Vec::new();
        tree.for_each_near(Vec2::new(0.0, 0.0), 1.0, |i| found.push(i));
        assert!(found.contains(&0));
        assert!(found.contains(&1));
        assert!(found.contains(&10));
        assert!(!found.contains(&99));
    }

    #[test]
    fn coincident_points_share_a_leaf() {
        let points = vec![Vec2::new(3.0f64, 3.0); 4];
        let tree = QuadTree::build(&points);
        let mut count = 0;
        tree.for_each_near(Vec2::new(3.0, 3.0), 0.5, |_| count += 1);
        assert_eq!(count, 4);
    }

    #[test]
    fn non_finite_points_are_skipped() {
        let points = vec![Vec2::new(0.0f64, 0.0), Vec2::new(f64::NAN, 1.0), Vec2::new(1.0, 1.0)];
        let tree = QuadTree::build(&points);
        let root = tree.node(tree.root().expect("non-empty tree"));
        assert_eq!(root.count, 2);
    }
}
