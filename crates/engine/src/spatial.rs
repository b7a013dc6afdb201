use crate::math::{Rect, Shape, Vec2};

/// Overlap-query service for collision and puzzle lookups. Backed by a flat
/// vector scan; pipe and block counts per map are small, and callers only
/// rely on the query contract, not on asymptotics. Queries are read-only and
/// safe to repeat within a tick.
#[derive(Debug, Default)]
pub struct SpatialIndex<V> {
    items: Vec<(V, Rect)>,
}

impl<V: Copy + PartialEq> SpatialIndex<V> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn insert(&mut self, value: V, bounds: Rect) {
        self.items.push((value, bounds));
    }

    pub fn remove(&mut self, value: &V) -> bool {
        let index = self.items.iter().position(|(item, _)| item == value);
        match index {
            Some(index) => {
                self.items.swap_remove(index);
                true
            }
            None => false,
        }
    }

    pub fn update(&mut self, value: &V, bounds: Rect) -> bool {
        for (item, item_bounds) in &mut self.items {
            if item == value {
                *item_bounds = bounds;
                return true;
            }
        }
        false
    }

    pub fn query<'a>(&'a self, shape: &'a Shape) -> impl Iterator<Item = (V, Rect)> + 'a {
        self.items
            .iter()
            .filter(move |(_, bounds)| shape.intersects_rect(bounds))
            .map(|(value, bounds)| (*value, *bounds))
    }

    pub fn query_rect(&self, rect: Rect) -> Vec<(V, Rect)> {
        self.query(&Shape::Rect(rect)).collect()
    }

    pub fn query_point(&self, point: Vec2) -> Vec<(V, Rect)> {
        self.items
            .iter()
            .filter(|(_, bounds)| bounds.contains_point(point))
            .map(|(value, bounds)| (*value, *bounds))
            .collect()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_with_two_cells() -> SpatialIndex<u32> {
        let mut index = SpatialIndex::new();
        index.insert(1, Rect::new(0.0, 0.0, 10.0, 10.0));
        index.insert(2, Rect::new(20.0, 0.0, 10.0, 10.0));
        index
    }

    #[test]
    fn rect_query_returns_overlapping_items_only() {
        let index = index_with_two_cells();
        let hits = index.query_rect(Rect::new(5.0, 5.0, 4.0, 4.0));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, 1);
    }

    #[test]
    fn circle_query_reaches_across_items() {
        let index = index_with_two_cells();
        let shape = Shape::Circle {
            center: Vec2::new(15.0, 5.0),
            radius: 6.0,
        };
        let hits: Vec<_> = index.query(&shape).collect();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn point_query_uses_containment() {
        let index = index_with_two_cells();
        assert_eq!(index.query_point(Vec2::new(25.0, 5.0)).len(), 1);
        assert!(index.query_point(Vec2::new(15.0, 5.0)).is_empty());
    }

    #[test]
    fn remove_and_update_report_membership() {
        let mut index = index_with_two_cells();
        assert!(index.update(&2, Rect::new(0.0, 20.0, 10.0, 10.0)));
        assert_eq!(index.query_point(Vec2::new(5.0, 25.0))[0].0, 2);
        assert!(index.remove(&2));
        assert!(!index.remove(&2));
        assert_eq!(index.len(), 1);
    }
}
