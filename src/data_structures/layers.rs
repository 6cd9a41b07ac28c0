//! Layer masks for selective rendering.
//!
//! Every scene node and every scene pass carries a [`Layers`] mask. A pass only
//! draws the nodes whose mask shares at least one bit with its own, which is how
//! the compositor renders the background and the filtered figures separately.

/// A 32 bit membership mask. New masks are members of layer 0 only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Layers(u32);

impl Layers {
    pub const MAX: u8 = 31;

    /// A mask that is a member of `layer` only.
    pub fn only(layer: u8) -> Self {
        let mut layers = Self(0);
        layers.set(layer);
        layers
    }

    /// Replace all memberships with `layer`.
    pub fn set(&mut self, layer: u8) {
        self.0 = 1 << layer.min(Self::MAX);
    }

    #[cfg(test)]
    pub fn enable(&mut self, layer: u8) {
        self.0 |= 1 << layer.min(Self::MAX);
    }

    #[cfg(test)]
    pub fn disable(&mut self, layer: u8) {
        self.0 &= !(1 << layer.min(Self::MAX));
    }

    /// Whether `self` and `other` have at least one layer in common.
    pub fn test(&self, other: &Layers) -> bool {
        self.0 & other.0 != 0
    }

    #[cfg(test)]
    pub fn is_enabled(&self, layer: u8) -> bool {
        self.0 & (1 << layer.min(Self::MAX)) != 0
    }

    #[cfg(test)]
    pub fn mask(&self) -> u32 {
        self.0
    }
}

impl Default for Layers {
    fn default() -> Self {
        Self(1)
    }
}
