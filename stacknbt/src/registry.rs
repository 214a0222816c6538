//! Item types and the registry resolving them from their identifiers.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::ident::Identifier;


/// This structure describe an item type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemType {
    /// The identifier of the item.
    pub id: Identifier,
    /// Set to true if this item is derived from a block, such items carry a block
    /// state encoded in their legacy metadata.
    pub block: bool,
    /// Maximum stack size for this item.
    pub max_stack_size: u16,
}

impl ItemType {

    /// The air type, used by empty item stacks.
    pub const AIR: Self = Self {
        id: Identifier::AIR,
        block: true,
        max_stack_size: 0,
    };

    /// A plain, non-block item stackable up to 64.
    pub fn new(id: Identifier) -> Self {
        Self {
            id,
            block: false,
            max_stack_size: 64,
        }
    }

    /// An item derived from a block, stackable up to 64.
    pub fn new_block(id: Identifier) -> Self {
        Self {
            block: true,
            ..Self::new(id)
        }
    }

    pub fn with_max_stack_size(mut self, max_stack_size: u16) -> Self {
        self.max_stack_size = max_stack_size;
        self
    }

    #[inline]
    pub fn is_air(&self) -> bool {
        self.id == Identifier::AIR
    }

}


/// The item type registry consumed by the stack codec.
pub trait ItemRegistry: Send + Sync {

    /// Resolve the item type of the given identifier, this never fails.
    fn resolve_type(&self, id: &Identifier) -> ItemType;

    /// Return the identifier of the given item type.
    fn identifier_of(&self, item_type: &ItemType) -> Identifier;

}


/// A simple item registry backed by a hash map. Unknown identifiers are resolved to
/// plain items.
#[derive(Debug, Default)]
pub struct ItemTypes {
    types: HashMap<Identifier, ItemType>,
}

impl ItemTypes {

    pub fn new() -> Self {
        let mut types = Self::default();
        types.register(ItemType::AIR);
        types
    }

    /// Register an item type, replacing any previous type with the same identifier.
    pub fn register(&mut self, item_type: ItemType) {
        self.types.insert(item_type.id.clone(), item_type);
    }

    /// Get a registered type, returning none if not registered.
    pub fn get(&self, id: &Identifier) -> Option<&ItemType> {
        self.types.get(id)
    }

    /// Get the global registry with the vanilla item types, built on first use.
    pub fn vanilla() -> &'static ItemTypes {
        static VANILLA: Lazy<ItemTypes> = Lazy::new(|| {
            let mut types = ItemTypes::new();
            register_vanilla(&mut types);
            types
        });
        &VANILLA
    }

}

impl ItemRegistry for ItemTypes {

    fn resolve_type(&self, id: &Identifier) -> ItemType {
        match self.types.get(id) {
            Some(item_type) => item_type.clone(),
            None => {
                debug!("unknown item type {id}, resolved as a plain item");
                ItemType::new(id.clone())
            }
        }
    }

    fn identifier_of(&self, item_type: &ItemType) -> Identifier {
        item_type.id.clone()
    }

}


/// Register a representative set of vanilla items. The bed item is not derived from a
/// block, its two-block placement is handled by the bed logic, not its metadata.
fn register_vanilla(types: &mut ItemTypes) {

    for block in ["stone", "log", "wool", "slab", "glass", "dirt"] {
        types.register(ItemType::new_block(Identifier::minecraft(block)));
    }

    for item in ["bed", "iron_shovel", "iron_pickaxe", "iron_axe", "diamond_sword", "bow", "shears", "leather_chestplate"] {
        types.register(ItemType::new(Identifier::minecraft(item)).with_max_stack_size(1));
    }

    for item in ["stick", "book", "paper", "diamond", "arrow"] {
        types.register(ItemType::new(Identifier::minecraft(item)));
    }

    types.register(ItemType::new(Identifier::minecraft("writable_book")).with_max_stack_size(1));
    types.register(ItemType::new(Identifier::minecraft("enchanted_book")).with_max_stack_size(1));

}


#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn resolve() {

        let types = ItemTypes::vanilla();

        let wool = types.resolve_type(&Identifier::minecraft("wool"));
        assert!(wool.block);
        assert_eq!(wool.max_stack_size, 64);

        let bed = types.resolve_type(&Identifier::minecraft("bed"));
        assert!(!bed.block);
        assert_eq!(bed.max_stack_size, 1);
        assert_eq!(types.identifier_of(&bed), Identifier::minecraft("bed"));

        assert_eq!(types.resolve_type(&Identifier::AIR), ItemType::AIR);
        assert!(ItemType::AIR.is_air());

    }

    #[test]
    fn resolve_unknown() {
        let id: Identifier = "mymod:gear".parse().unwrap();
        let gear = ItemTypes::vanilla().resolve_type(&id);
        assert_eq!(gear, ItemType::new(id));
        assert!(!gear.block);
    }

    #[test]
    fn register_overwrites() {
        let mut types = ItemTypes::new();
        types.register(ItemType::new(Identifier::minecraft("stick")));
        types.register(ItemType::new(Identifier::minecraft("stick")).with_max_stack_size(16));
        assert_eq!(types.get(&Identifier::minecraft("stick")).map(|t| t.max_stack_size), Some(16));
    }

}
