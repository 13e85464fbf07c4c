use proptest::prelude::*;
use voxlith_chunk::ChunkCoord;
use voxlith_runtime::{Viewer, WorkQueue};

fn coord() -> impl Strategy<Value = ChunkCoord> {
    (-6i32..6, -2i32..2, -6i32..6).prop_map(|(x, y, z)| ChunkCoord::new(x, y, z))
}

proptest! {
    #[test]
    fn drains_are_unique_and_priority_ordered(
        coords in proptest::collection::vec(coord(), 0..64),
        visible in proptest::collection::vec(coord(), 0..8),
        center in coord(),
    ) {
        let q = WorkQueue::new("prop");
        for &c in &coords {
            q.push(c);
        }
        let mut viewer = Viewer::at(center);
        viewer.visible.extend(visible.iter().copied());
        let batch = q.take_sorted(&viewer);
        let mut unique = coords.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(batch.len(), unique.len());
        prop_assert!(batch.windows(2).all(|w| viewer.priority(w[0]) <= viewer.priority(w[1])));
        prop_assert!(q.is_empty());
    }
}
