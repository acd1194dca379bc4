//! Tag index: the spatial query contract the kernel consumes.
//!
//! Entries keep insertion (encounter) order; nearest-neighbour selection is
//! a linear scan with a strict less-than comparison, so ties go to the first
//! entry encountered. No spatial indexing beyond this.

use contracts::Vec2;

#[derive(Debug, Clone, PartialEq)]
struct TagEntry {
    id: String,
    tag: String,
    position: Vec2,
}

#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    entries: Vec<TagEntry>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or reposition an entry. Ids are unique across tags; an
    /// existing id keeps its place in encounter order.
    pub fn add(&mut self, tag: &str, id: &str, position: Vec2) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == id) {
            entry.tag = tag.to_string();
            entry.position = position;
            return;
        }
        self.entries.push(TagEntry {
            id: id.to_string(),
            tag: tag.to_string(),
            position,
        });
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub fn get(&self, id: &str) -> Option<Vec2> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.position)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// All entries carrying `tag`, in encounter order.
    pub fn find_by_tag(&self, tag: &str) -> Vec<(&str, Vec2)> {
        self.entries
            .iter()
            .filter(|entry| entry.tag == tag)
            .map(|entry| (entry.id.as_str(), entry.position))
            .collect()
    }

    pub fn count(&self, tag: &str) -> usize {
        self.entries.iter().filter(|entry| entry.tag == tag).count()
    }

    /// Nearest entry with `tag` by Euclidean distance; strict `<` keeps the
    /// first minimum found.
    pub fn nearest(&self, tag: &str, from: Vec2) -> Option<(&str, Vec2)> {
        let mut closest: Option<(&str, Vec2)> = None;
        let mut closest_distance = f64::INFINITY;
        for (id, position) in self.find_by_tag(tag) {
            let distance = from.distance_to(position);
            if distance < closest_distance {
                closest_distance = distance;
                closest = Some((id, position));
            }
        }
        closest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_breaks_ties_by_encounter_order() {
        let mut index = TagIndex::new();
        // Distances from origin: 5, 2, 2, 8.
        index.add("ore", "a", Vec2::new(5.0, 0.0));
        index.add("ore", "b", Vec2::new(0.0, 2.0));
        index.add("ore", "c", Vec2::new(2.0, 0.0));
        index.add("ore", "d", Vec2::new(8.0, 0.0));

        let (id, _) = index.nearest("ore", Vec2::ZERO).expect("sites exist");
        assert_eq!(id, "b");
    }

    #[test]
    fn nearest_on_empty_tag_is_none() {
        let index = TagIndex::new();
        assert!(index.nearest("ore", Vec2::ZERO).is_none());
    }

    #[test]
    fn find_by_tag_filters_and_keeps_order() {
        let mut index = TagIndex::new();
        index.add("ore", "a", Vec2::new(1.0, 0.0));
        index.add("cart", "x", Vec2::new(2.0, 0.0));
        index.add("ore", "b", Vec2::new(3.0, 0.0));

        let ids: Vec<&str> = index.find_by_tag("ore").iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn remove_and_reinsert_moves_to_back_of_encounter_order() {
        let mut index = TagIndex::new();
        index.add("ore", "a", Vec2::new(1.0, 0.0));
        index.add("ore", "b", Vec2::new(1.0, 0.0));
        assert!(index.remove("a"));
        assert!(!index.remove("a"));
        index.add("ore", "a", Vec2::new(1.0, 0.0));

        let ids: Vec<&str> = index.find_by_tag("ore").iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn add_existing_id_repositions_in_place() {
        let mut index = TagIndex::new();
        index.add("ore", "a", Vec2::new(1.0, 0.0));
        index.add("ore", "b", Vec2::new(2.0, 0.0));
        index.add("ore", "a", Vec2::new(9.0, 0.0));

        assert_eq!(index.get("a"), Some(Vec2::new(9.0, 0.0)));
        let ids: Vec<&str> = index.find_by_tag("ore").iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
