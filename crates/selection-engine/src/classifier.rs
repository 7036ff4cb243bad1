//! Node classification by capability probing
//!
//! A node's facets are whatever capabilities it answers for. Nothing here
//! switches on `NodeType`, so host node kinds added later are described as
//! soon as they expose the same capabilities.

use std::fmt;

use scene_graph::SceneNode;

/// A named optional attribute group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    Fills,
    Strokes,
    Effects,
    Text,
    Layout,
    Instance,
    VectorShape,
    Appearance,
    Children,
}

impl Facet {
    pub const ALL: [Facet; 9] = [
        Facet::Fills,
        Facet::Strokes,
        Facet::Effects,
        Facet::Text,
        Facet::Layout,
        Facet::Instance,
        Facet::VectorShape,
        Facet::Appearance,
        Facet::Children,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Facet::Fills => "fills",
            Facet::Strokes => "strokes",
            Facet::Effects => "effects",
            Facet::Text => "text",
            Facet::Layout => "layout",
            Facet::Instance => "instance",
            Facet::VectorShape => "vector",
            Facet::Appearance => "appearance",
            Facet::Children => "children",
        }
    }

    fn bit(self) -> u16 {
        1 << self as u16
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of facets, stored as a bit mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FacetSet {
    bits: u16,
}

impl FacetSet {
    /// Facets described by the light walker variant
    pub const LIGHT: FacetSet = FacetSet::from_bits(
        (1 << Facet::Fills as u16)
            | (1 << Facet::Text as u16)
            | (1 << Facet::Layout as u16)
            | (1 << Facet::Instance as u16)
            | (1 << Facet::Children as u16),
    );

    const fn from_bits(bits: u16) -> Self {
        Self { bits }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, facet: Facet) {
        self.bits |= facet.bit();
    }

    pub fn contains(&self, facet: Facet) -> bool {
        self.bits & facet.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn intersection(&self, other: FacetSet) -> FacetSet {
        FacetSet::from_bits(self.bits & other.bits)
    }

    pub fn iter(&self) -> impl Iterator<Item = Facet> + '_ {
        Facet::ALL.into_iter().filter(|facet| self.contains(*facet))
    }
}

impl FromIterator<Facet> for FacetSet {
    fn from_iter<I: IntoIterator<Item = Facet>>(iter: I) -> Self {
        let mut set = FacetSet::empty();
        for facet in iter {
            set.insert(facet);
        }
        set
    }
}

/// Determine which facets a node exposes.
///
/// A capability that throws on access still counts as exposed; the
/// extractor for it reports the failure.
pub fn classify(node: &dyn SceneNode) -> FacetSet {
    let mut set = FacetSet::empty();
    if node.fills().is_some() {
        set.insert(Facet::Fills);
    }
    if node.strokes().is_some() {
        set.insert(Facet::Strokes);
    }
    if node.effects().is_some() {
        set.insert(Facet::Effects);
    }
    if node.text().is_some() {
        set.insert(Facet::Text);
    }
    if node.layout().is_some() {
        set.insert(Facet::Layout);
    }
    if node.instance().is_some() {
        set.insert(Facet::Instance);
    }
    if node.vector().is_some() {
        set.insert(Facet::VectorShape);
    }
    if node.appearance().is_some() {
        set.insert(Facet::Appearance);
    }
    if node.children().is_some() {
        set.insert(Facet::Children);
    }
    set
}
