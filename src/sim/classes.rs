//! Object class table
//!
//! Static, ordered list of mushroom classes. Merging two objects of class `i`
//! produces one object of class `i + 1`; the last class is terminal.

use serde::{Deserialize, Serialize};

/// Default edge length (px) of the square source art every class is drawn from
pub const SOURCE_ART_SIZE: f32 = 1024.0;

/// A single rank in the size/score progression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectClass {
    /// Texture key / display name
    pub name: String,
    /// Rendering scale relative to the source art
    pub visual_scale: f32,
    /// Points awarded when a fusion produces this class
    pub score_value: u64,
    /// Largest dimension of the source art in px
    #[serde(default = "default_source_size")]
    pub source_size: f32,
}

fn default_source_size() -> f32 {
    SOURCE_ART_SIZE
}

impl ObjectClass {
    pub fn new(name: &str, visual_scale: f32, score_value: u64) -> Self {
        Self {
            name: name.to_string(),
            visual_scale,
            score_value,
            source_size: SOURCE_ART_SIZE,
        }
    }

    /// Collision radius derived from a rendered extent: half of extent × scale
    #[inline]
    pub fn radius_for_extent(&self, extent: f32) -> f32 {
        extent * self.visual_scale / 2.0
    }

    /// Collision radius derived from the source art size
    pub fn collision_radius(&self) -> f32 {
        self.radius_for_extent(self.source_size)
    }
}

/// Ordered class table (index 0 = smallest)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassTable {
    classes: Vec<ObjectClass>,
}

impl Default for ClassTable {
    fn default() -> Self {
        let s = SOURCE_ART_SIZE;
        Self::new(vec![
            ObjectClass::new("enoki", 40.0 / s, 10),
            ObjectClass::new("shimeji", 50.0 / s, 20),
            ObjectClass::new("shiitake", 80.0 / s, 40),
            ObjectClass::new("eringi", 100.0 / s, 80),
            ObjectClass::new("matsutake", 150.0 / s, 160),
            ObjectClass::new("kikurage", 220.0 / s, 320),
            ObjectClass::new("mushroomstamps", 260.0 / s, 640),
        ])
    }
}

impl ClassTable {
    pub fn new(classes: Vec<ObjectClass>) -> Self {
        Self { classes }
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&ObjectClass> {
        self.classes.get(index)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Index of the terminal class
    pub fn max_index(&self) -> usize {
        self.classes.len().saturating_sub(1)
    }

    pub fn is_terminal(&self, index: usize) -> bool {
        index >= self.max_index()
    }

    /// Class produced by merging two objects of `index`, if any
    pub fn promotion(&self, index: usize) -> Option<usize> {
        if index < self.max_index() {
            Some(index + 1)
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectClass> {
        self.classes.iter()
    }

    /// True when score values and visual scales both strictly increase
    pub fn is_strictly_increasing(&self) -> bool {
        self.classes.windows(2).all(|w| {
            w[0].score_value < w[1].score_value && w[0].visual_scale < w[1].visual_scale
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scores_strictly_increase() {
        let table = ClassTable::default();
        assert_eq!(table.len(), 7);
        for i in 0..table.max_index() {
            let a = table.get(i).unwrap();
            let b = table.get(i + 1).unwrap();
            assert!(a.score_value < b.score_value, "class {i} vs {}", i + 1);
        }
        assert!(table.is_strictly_increasing());
    }

    #[test]
    fn test_radius_matches_rendered_diameter() {
        let table = ClassTable::default();
        let expected = [20.0, 25.0, 40.0, 50.0, 75.0, 110.0, 130.0];
        for (class, r) in table.iter().zip(expected) {
            assert!((class.collision_radius() - r).abs() < 1e-3, "{}", class.name);
        }
    }

    #[test]
    fn test_radius_follows_measured_extent() {
        let enoki = ObjectClass::new("enoki", 40.0 / 1024.0, 10);
        // Art replaced by a 2048px texture: radius doubles with it
        assert!((enoki.radius_for_extent(2048.0) - 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_promotion_stops_at_terminal() {
        let table = ClassTable::default();
        assert_eq!(table.promotion(0), Some(1));
        assert_eq!(table.promotion(5), Some(6));
        assert_eq!(table.promotion(6), None);
        assert!(table.is_terminal(6));
        assert!(!table.is_terminal(5));
    }
}
