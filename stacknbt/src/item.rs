//! Item stacks with their metadata, and the builder used to construct them.

use std::collections::BTreeMap;

use indexmap::{IndexMap, IndexSet};

use crate::component::{Component, ComponentKind};
use crate::enchantment::EnchantmentType;
use crate::registry::ItemType;
use crate::block::BlockState;
use crate::ident::Identifier;
use crate::nbt::NbtCompound;


/// An item stack defines the actual number of items of a type and all their metadata.
/// Stacks are immutable once built, use [`ItemStack::to_builder`] to derive a modified
/// stack.
#[derive(Debug, Clone)]
pub struct ItemStack {
    id: Identifier,
    item_type: ItemType,
    amount: u16,
    meta: i16,
    components: BTreeMap<ComponentKind, Component>,
    name: Option<String>,
    lore: Vec<String>,
    enchantments: IndexMap<EnchantmentType, u16>,
    can_destroy: IndexSet<Identifier>,
    can_place_on: IndexSet<Identifier>,
    block_state: Option<BlockState>,
    nbt: NbtCompound,
}

impl ItemStack {

    /// The canonical empty stack: air, no items and no metadata.
    pub fn empty() -> Self {
        Self {
            id: Identifier::AIR,
            item_type: ItemType::AIR,
            amount: 0,
            meta: 0,
            components: BTreeMap::new(),
            name: None,
            lore: Vec::new(),
            enchantments: IndexMap::new(),
            can_destroy: IndexSet::new(),
            can_place_on: IndexSet::new(),
            block_state: None,
            nbt: NbtCompound::new(),
        }
    }

    /// Start building a new item stack.
    #[inline]
    pub fn builder() -> ItemStackBuilder {
        ItemStackBuilder::new()
    }

    /// Create a builder initialized with every field of this stack.
    pub fn to_builder(&self) -> ItemStackBuilder {
        ItemStackBuilder {
            id: Some(self.id.clone()),
            item_type: self.item_type.clone(),
            amount: self.amount,
            meta: self.meta,
            components: self.components.clone(),
            name: self.name.clone(),
            lore: self.lore.clone(),
            enchantments: self.enchantments.clone(),
            can_destroy: self.can_destroy.clone(),
            can_place_on: self.can_place_on.clone(),
            block_state: self.block_state.clone(),
            nbt: self.nbt.clone(),
        }
    }

    /// Return true if this item stack is air or has no item, which is a special case
    /// where the item stack represent an empty slot.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.item_type.is_air() || self.amount == 0
    }

    #[inline]
    pub fn id(&self) -> &Identifier {
        &self.id
    }

    #[inline]
    pub fn item_type(&self) -> &ItemType {
        &self.item_type
    }

    #[inline]
    pub fn amount(&self) -> u16 {
        self.amount
    }

    /// The legacy metadata this stack was decoded with. This is informative only, it
    /// is not part of the stack identity and is recomputed from the block state when
    /// encoding. Only block items without a block state encode it back.
    #[inline]
    pub fn meta(&self) -> i16 {
        self.meta
    }

    #[inline]
    pub fn components(&self) -> &BTreeMap<ComponentKind, Component> {
        &self.components
    }

    #[inline]
    pub fn component(&self, kind: ComponentKind) -> Option<&Component> {
        self.components.get(&kind)
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn lore(&self) -> &[String] {
        &self.lore
    }

    #[inline]
    pub fn enchantments(&self) -> &IndexMap<EnchantmentType, u16> {
        &self.enchantments
    }

    #[inline]
    pub fn can_destroy(&self) -> &IndexSet<Identifier> {
        &self.can_destroy
    }

    #[inline]
    pub fn can_place_on(&self) -> &IndexSet<Identifier> {
        &self.can_place_on
    }

    #[inline]
    pub fn block_state(&self) -> Option<&BlockState> {
        self.block_state.as_ref()
    }

    /// The minimal self-describing tag of this stack (name, damage and count), as
    /// attached when the stack was decoded. Empty for stacks built by hand.
    #[inline]
    pub fn nbt(&self) -> &NbtCompound {
        &self.nbt
    }

}

impl Default for ItemStack {
    fn default() -> Self {
        Self::empty()
    }
}

/// The minimal tag and the legacy metadata are derived descriptions, not part of the
/// identity of a stack.
impl PartialEq for ItemStack {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.item_type == other.item_type
            && self.amount == other.amount
            && self.components == other.components
            && self.name == other.name
            && self.lore == other.lore
            && self.enchantments.iter().eq(other.enchantments.iter())
            && self.can_destroy.iter().eq(other.can_destroy.iter())
            && self.can_place_on.iter().eq(other.can_place_on.iter())
            && self.block_state == other.block_state
    }
}


/// Builder accumulating the fields of an item stack, converted once into the stack.
#[derive(Debug, Clone)]
pub struct ItemStackBuilder {
    id: Option<Identifier>,
    item_type: ItemType,
    amount: u16,
    meta: i16,
    components: BTreeMap<ComponentKind, Component>,
    name: Option<String>,
    lore: Vec<String>,
    enchantments: IndexMap<EnchantmentType, u16>,
    can_destroy: IndexSet<Identifier>,
    can_place_on: IndexSet<Identifier>,
    block_state: Option<BlockState>,
    nbt: NbtCompound,
}

impl ItemStackBuilder {

    pub fn new() -> Self {
        Self {
            id: None,
            item_type: ItemType::AIR,
            amount: 1,
            meta: 0,
            components: BTreeMap::new(),
            name: None,
            lore: Vec::new(),
            enchantments: IndexMap::new(),
            can_destroy: IndexSet::new(),
            can_place_on: IndexSet::new(),
            block_state: None,
            nbt: NbtCompound::new(),
        }
    }

    /// Set the identifier of the stack, if not set the identifier of the type is used.
    pub fn id(&mut self, id: Identifier) -> &mut Self {
        self.id = Some(id);
        self
    }

    pub fn item_type(&mut self, item_type: ItemType) -> &mut Self {
        self.item_type = item_type;
        self
    }

    pub fn amount(&mut self, amount: u16) -> &mut Self {
        self.amount = amount;
        self
    }

    pub fn meta(&mut self, meta: i16) -> &mut Self {
        self.meta = meta;
        self
    }

    pub fn nbt(&mut self, nbt: NbtCompound) -> &mut Self {
        self.nbt = nbt;
        self
    }

    pub fn block_state(&mut self, block_state: BlockState) -> &mut Self {
        self.block_state = Some(block_state);
        self
    }

    pub fn name(&mut self, name: Option<String>) -> &mut Self {
        self.name = name;
        self
    }

    pub fn lore(&mut self, lore: Vec<String>) -> &mut Self {
        self.lore = lore;
        self
    }

    /// Add an enchantment, replacing the level if already present while keeping its
    /// original position.
    pub fn add_enchantment(&mut self, ty: EnchantmentType, level: u16) -> &mut Self {
        self.enchantments.insert(ty, level);
        self
    }

    pub fn add_can_destroy(&mut self, id: Identifier) -> &mut Self {
        self.can_destroy.insert(id);
        self
    }

    pub fn add_can_place_on(&mut self, id: Identifier) -> &mut Self {
        self.can_place_on.insert(id);
        self
    }

    /// Set a component, replacing any component of the same kind.
    pub fn component(&mut self, component: Component) -> &mut Self {
        self.components.insert(component.kind(), component);
        self
    }

    /// Return the type currently set on this builder.
    #[inline]
    pub fn get_item_type(&self) -> &ItemType {
        &self.item_type
    }

    /// Build the item stack, an air type always gives the canonical empty stack.
    pub fn build(self) -> ItemStack {

        if self.item_type.is_air() {
            return ItemStack::empty();
        }

        ItemStack {
            id: self.id.unwrap_or_else(|| self.item_type.id.clone()),
            item_type: self.item_type,
            amount: self.amount,
            meta: self.meta,
            components: self.components,
            name: self.name,
            lore: self.lore,
            enchantments: self.enchantments,
            can_destroy: self.can_destroy,
            can_place_on: self.can_place_on,
            block_state: self.block_state,
            nbt: self.nbt,
        }

    }

}

impl Default for ItemStackBuilder {
    fn default() -> Self {
        Self::new()
    }
}
