//! Structured block states and their mapping to the legacy numeric metadata.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;

use crate::ident::Identifier;


/// A structured block state: the block identifier and the value of each of its
/// properties. Property names and values are static strings because they always
/// come from a block layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockState {
    block: Identifier,
    properties: BTreeMap<&'static str, &'static str>,
}

impl BlockState {

    /// Create a block state without any property set.
    pub fn new(block: Identifier) -> Self {
        Self {
            block,
            properties: BTreeMap::new(),
        }
    }

    /// Set a property of this state and return it.
    pub fn with(mut self, name: &'static str, value: &'static str) -> Self {
        self.set(name, value);
        self
    }

    #[inline]
    pub fn set(&mut self, name: &'static str, value: &'static str) {
        self.properties.insert(name, value);
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&'static str> {
        self.properties.get(name).copied()
    }

    #[inline]
    pub fn block(&self) -> &Identifier {
        &self.block
    }

    /// Iterate over all properties, sorted by name.
    #[inline]
    pub fn properties(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.properties.iter().map(|(&name, &value)| (name, value))
    }

}


/// The mapping between structured block states and legacy metadata, this is consumed
/// by the stack codec for block-derived item stacks.
pub trait LegacyMapping: Send + Sync {

    /// Compute the legacy metadata of the given state, this is always in `0..=32767`
    /// and deterministic, even for states unknown to the mapping.
    fn meta_from_state(&self, state: &BlockState) -> i16;

    /// Find the block state for the given block and legacy metadata. Returning none
    /// is expected for metadata that has no structured equivalent.
    fn state_from_meta(&self, block: &Identifier, meta: i16) -> Option<BlockState>;

}


/// Layout of a single property inside the legacy metadata.
#[derive(Debug, Clone, Copy)]
pub struct PropertyLayout {
    /// Name of the property.
    pub name: &'static str,
    /// Index of the first bit of this property in the metadata.
    pub shift: u8,
    /// Number of bits used by this property.
    pub bits: u8,
    /// All values of the property, the index of a value is its encoded value.
    pub values: &'static [&'static str],
}

impl PropertyLayout {

    #[inline]
    fn mask(self) -> u16 {
        ((1u16 << self.bits) - 1) << self.shift
    }

}

/// A legacy mapping table where each block has a list of properties packed into the
/// legacy metadata as bit fields.
#[derive(Debug, Default)]
pub struct LegacyStateTable {
    blocks: HashMap<Identifier, Vec<PropertyLayout>>,
}

impl LegacyStateTable {

    pub fn new() -> Self {
        Self::default()
    }

    /// Register the property layout of a block, replacing any previous layout. The
    /// properties must fit in the 15 positive bits of the metadata and not overlap.
    pub fn register(&mut self, block: Identifier, properties: Vec<PropertyLayout>) {

        let mut used = 0u16;
        for prop in &properties {
            debug_assert!(prop.bits > 0 && prop.shift + prop.bits <= 15, "property {} out of range", prop.name);
            debug_assert!(prop.values.len() <= 1 << prop.bits, "property {} has too many values", prop.name);
            debug_assert!(used & prop.mask() == 0, "property {} overlaps", prop.name);
            used |= prop.mask();
        }

        self.blocks.insert(block, properties);

    }

    /// Return the property layouts of a block, if registered.
    pub fn layout(&self, block: &Identifier) -> Option<&[PropertyLayout]> {
        self.blocks.get(block).map(Vec::as_slice)
    }

    /// Enumerate every state representable by the given block, empty if the block is
    /// unknown. States are sorted by the value index of the first property, then the
    /// next ones.
    pub fn states(&self, block: &Identifier) -> Vec<BlockState> {

        let Some(layout) = self.layout(block) else {
            return Vec::new();
        };

        let mut states = vec![BlockState::new(block.clone())];
        for prop in layout {
            states = states.into_iter()
                .flat_map(|state| prop.values.iter().map(move |&value| state.clone().with(prop.name, value)))
                .collect();
        }

        states

    }

    /// Get the global table with the vanilla block layouts, built on first use.
    pub fn vanilla() -> &'static LegacyStateTable {
        static VANILLA: Lazy<LegacyStateTable> = Lazy::new(|| {
            let mut table = LegacyStateTable::new();
            register_vanilla(&mut table);
            table
        });
        &VANILLA
    }

}

impl LegacyMapping for LegacyStateTable {

    fn meta_from_state(&self, state: &BlockState) -> i16 {

        let Some(layout) = self.layout(state.block()) else {
            return 0;
        };

        let mut meta = 0u16;
        for prop in layout {
            // Missing or unknown values fall back to the first value of the property.
            let index = state.get(prop.name)
                .and_then(|value| prop.values.iter().position(|&v| v == value))
                .unwrap_or(0) as u16;
            meta |= (index << prop.shift) & prop.mask();
        }

        meta as i16

    }

    fn state_from_meta(&self, block: &Identifier, meta: i16) -> Option<BlockState> {

        if meta < 0 {
            return None;
        }

        let layout = self.layout(block)?;
        let meta = meta as u16;

        let used = layout.iter().fold(0u16, |used, prop| used | prop.mask());
        if meta & !used != 0 {
            return None;
        }

        let mut state = BlockState::new(block.clone());
        for prop in layout {
            let index = (meta & prop.mask()) >> prop.shift;
            state.set(prop.name, *prop.values.get(index as usize)?);
        }

        Some(state)

    }

}


const BOOLEAN: &[&str] = &["false", "true"];

/// Register the layouts of the vanilla blocks that have item forms with metadata.
fn register_vanilla(table: &mut LegacyStateTable) {

    table.register(Identifier::minecraft("stone"), vec![]);

    table.register(Identifier::minecraft("log"), vec![
        PropertyLayout { name: "wood_type", shift: 0, bits: 2, values: &["oak", "spruce", "birch"] },
        PropertyLayout { name: "axis", shift: 2, bits: 2, values: &["y", "x", "z"] },
    ]);

    table.register(Identifier::minecraft("wool"), vec![
        PropertyLayout { name: "color", shift: 0, bits: 4, values: &[
            "white", "orange", "magenta", "light_blue",
            "yellow", "lime", "pink", "gray",
            "silver", "cyan", "purple", "blue",
            "brown", "green", "red", "black",
        ] },
    ]);

    table.register(Identifier::minecraft("slab"), vec![
        PropertyLayout { name: "variant", shift: 0, bits: 3, values: &["stone", "sandstone", "wood", "cobblestone"] },
    ]);

    // Facing values are in the order of the metadata: +Z, -X, -Z, +X.
    table.register(Identifier::minecraft("bed"), vec![
        PropertyLayout { name: "facing", shift: 0, bits: 2, values: &["south", "west", "north", "east"] },
        PropertyLayout { name: "occupied", shift: 2, bits: 1, values: BOOLEAN },
        PropertyLayout { name: "head_piece", shift: 3, bits: 1, values: BOOLEAN },
    ]);

}
