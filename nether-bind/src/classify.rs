//! Animation representation classification

use serde::Serialize;

/// How the renderer has to animate the imported model
///
/// Decided once per import and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AnimationRepresentation {
    /// No bones and no animation tracks
    Static,
    /// Keyed hierarchy without bones: one synthetic bone per node
    Rigid,
    /// Bone records present: blended per-vertex skinning
    Skinned,
}

impl AnimationRepresentation {
    /// Classify from the deduplicated bone count and the number of animation tracks
    ///
    /// Bones always win: a bind-pose-only skinned mesh still goes through the
    /// weight pipeline.
    pub fn classify(bone_count: usize, animation_count: usize) -> Self {
        match (bone_count, animation_count) {
            (0, 0) => AnimationRepresentation::Static,
            (0, _) => AnimationRepresentation::Rigid,
            _ => AnimationRepresentation::Skinned,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AnimationRepresentation::Static => "static",
            AnimationRepresentation::Rigid => "rigid",
            AnimationRepresentation::Skinned => "skinned",
        }
    }
}

impl std::fmt::Display for AnimationRepresentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_table() {
        assert_eq!(AnimationRepresentation::classify(0, 0), AnimationRepresentation::Static);
        assert_eq!(AnimationRepresentation::classify(0, 3), AnimationRepresentation::Rigid);
        assert_eq!(AnimationRepresentation::classify(2, 0), AnimationRepresentation::Skinned);
        assert_eq!(AnimationRepresentation::classify(2, 5), AnimationRepresentation::Skinned);
    }

    #[test]
    fn test_display() {
        assert_eq!(AnimationRepresentation::Rigid.to_string(), "rigid");
    }
}
