//! Enchantment types and their registry by legacy numeric id.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::ident::Identifier;


/// An enchantment type, with the numeric id used in the `ench` list of items.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnchantmentType {
    pub id: i16,
    pub name: Identifier,
}

impl EnchantmentType {

    pub fn new(id: i16, name: Identifier) -> Self {
        Self { id, name }
    }

}


/// The enchantment registry consumed by the stack codec.
pub trait EnchantmentRegistry: Send + Sync {

    /// Find the enchantment type with the given numeric id.
    fn type_by_id(&self, id: i16) -> Option<EnchantmentType>;

}


/// Enchantment registry backed by hash maps.
#[derive(Debug, Default)]
pub struct Enchantments {
    by_id: HashMap<i16, EnchantmentType>,
    by_name: HashMap<Identifier, i16>,
}

impl Enchantments {

    pub fn new() -> Self {
        Self::default()
    }

    /// Register an enchantment type, a previous type with the same id is replaced.
    pub fn register(&mut self, ty: EnchantmentType) {
        if let Some(prev) = self.by_id.insert(ty.id, ty.clone()) {
            self.by_name.remove(&prev.name);
        }
        self.by_name.insert(ty.name, ty.id);
    }

    /// Find the enchantment type with the given name.
    pub fn by_name(&self, name: &Identifier) -> Option<EnchantmentType> {
        self.by_name.get(name).and_then(|&id| self.by_id.get(&id)).cloned()
    }

    /// Get the global registry with the vanilla enchantments, built on first use.
    pub fn vanilla() -> &'static Enchantments {
        static VANILLA: Lazy<Enchantments> = Lazy::new(|| {
            let mut enchantments = Enchantments::new();
            for (id, name) in VANILLA_NAMES.iter().enumerate() {
                enchantments.register(EnchantmentType::new(id as i16, Identifier::minecraft(name)));
            }
            enchantments
        });
        &VANILLA
    }

}

impl EnchantmentRegistry for Enchantments {

    fn type_by_id(&self, id: i16) -> Option<EnchantmentType> {
        self.by_id.get(&id).cloned()
    }

}


/// Vanilla enchantment names, indexed by their numeric id.
const VANILLA_NAMES: [&str; 33] = [
    "protection",
    "fire_protection",
    "feather_falling",
    "blast_protection",
    "projectile_protection",
    "thorns",
    "respiration",
    "depth_strider",
    "aqua_affinity",
    "sharpness",
    "smite",
    "bane_of_arthropods",
    "knockback",
    "fire_aspect",
    "looting",
    "efficiency",
    "silk_touch",
    "unbreaking",
    "fortune",
    "power",
    "punch",
    "flame",
    "infinity",
    "luck_of_the_sea",
    "lure",
    "frost_walker",
    "mending",
    "binding",
    "vanishing",
    "impaling",
    "riptide",
    "loyalty",
    "channeling",
];
