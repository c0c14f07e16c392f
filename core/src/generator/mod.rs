use crate::*;
pub use random::*;

mod random;

/// Source of mine placements, asked once per round.
pub trait LayoutGenerator {
    fn generate(&mut self) -> MineLayout;
}

/// A fixed layout produces the same placement every round.
impl LayoutGenerator for MineLayout {
    fn generate(&mut self) -> MineLayout {
        self.clone()
    }
}
