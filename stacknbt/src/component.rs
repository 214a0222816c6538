//! Item metadata components and the registry of their NBT serializers.
//!
//! Components are an open set of optional typed values attached to item stacks. The
//! stack codec knows nothing about their shape, it only dispatches each component to
//! the serializer registered for its [`ComponentKind`].

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::item::ItemStack;
use crate::nbt::NbtCompound;


/// Discriminant of a [`Component`], used as the key of the serializer registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    Durability,
    DyeColor,
    RepairCost,
    Unbreakable,
    CustomData,
    BookPages,
    Cooldown,
}

/// A typed item metadata component.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    /// Damage taken by a tool or armor piece.
    Durability(i32),
    /// RGB color of dyed leather armor.
    DyeColor(i32),
    /// Experience cost added when repairing the item in an anvil.
    RepairCost(i32),
    Unbreakable(bool),
    /// Arbitrary fields stored as-is in the item tag.
    CustomData(NbtCompound),
    /// Pages of a writable book.
    BookPages(Vec<String>),
    /// Remaining ticks before the item can be used again, never persisted.
    Cooldown(u32),
}

impl Component {

    /// Get the kind of this component.
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Durability(_) => ComponentKind::Durability,
            Component::DyeColor(_) => ComponentKind::DyeColor,
            Component::RepairCost(_) => ComponentKind::RepairCost,
            Component::Unbreakable(_) => ComponentKind::Unbreakable,
            Component::CustomData(_) => ComponentKind::CustomData,
            Component::BookPages(_) => ComponentKind::BookPages,
            Component::Cooldown(_) => ComponentKind::Cooldown,
        }
    }

}


/// A serializer of a single component kind. Serializers hold no state and only work
/// on the data given to them.
pub trait ComponentSerializer: Send + Sync {

    /// Write the given component of the stack. Most components write into the data
    /// tag, which becomes the `tag` compound of the item, but the item tag itself is
    /// also given for components that need top-level fields.
    fn serialize(&self, stack: &ItemStack, item_tag: &mut NbtCompound, data_tag: &mut NbtCompound, value: &Component);

    /// Read the component back from the `tag` compound of an item, returning none if
    /// the component's fields are absent or malformed.
    fn deserialize(&self, data_tag: &NbtCompound) -> Option<Component> {
        let _ = data_tag;
        None
    }

}


/// Registration state of a component kind.
enum Registration {
    Serializer(Box<dyn ComponentSerializer>),
    /// The kind is intentionally not persisted.
    NonSerializable,
}

/// The registry mapping component kinds to their serializer. It is filled once at
/// startup and then only read, it can be shared between threads without locking.
#[derive(Default)]
pub struct ComponentRegistry {
    entries: BTreeMap<ComponentKind, Registration>,
}

impl ComponentRegistry {

    pub fn new() -> Self {
        Self::default()
    }

    /// Register the serializer of a component kind, the last registration wins.
    pub fn register(&mut self, kind: ComponentKind, serializer: impl ComponentSerializer + 'static) {
        self.entries.insert(kind, Registration::Serializer(Box::new(serializer)));
    }

    /// Mark a component kind as intentionally not persisted, such components are
    /// skipped without any diagnostic when encoding.
    pub fn register_non_serializable(&mut self, kind: ComponentKind) {
        self.entries.insert(kind, Registration::NonSerializable);
    }

    /// Find the serializer of a component kind.
    pub fn lookup(&self, kind: ComponentKind) -> Option<&dyn ComponentSerializer> {
        match self.entries.get(&kind)? {
            Registration::Serializer(serializer) => Some(&**serializer),
            Registration::NonSerializable => None,
        }
    }

    #[inline]
    pub fn is_non_serializable(&self, kind: ComponentKind) -> bool {
        matches!(self.entries.get(&kind), Some(Registration::NonSerializable))
    }

    /// Iterate over all registered serializers, ordered by kind.
    pub fn serializers(&self) -> impl Iterator<Item = (ComponentKind, &dyn ComponentSerializer)> + '_ {
        self.entries.iter().filter_map(|(&kind, registration)| match registration {
            Registration::Serializer(serializer) => Some((kind, &**serializer)),
            Registration::NonSerializable => None,
        })
    }

    /// Get the global registry with the serializers of the vanilla components, built
    /// on first use.
    pub fn vanilla() -> &'static ComponentRegistry {
        static VANILLA: Lazy<ComponentRegistry> = Lazy::new(|| {
            let mut registry = ComponentRegistry::new();
            register_vanilla(&mut registry);
            registry
        });
        &VANILLA
    }

}

fn register_vanilla(registry: &mut ComponentRegistry) {

    registry.register(ComponentKind::Durability, IntSerializer {
        key: "Damage",
        from_int: Component::Durability,
        to_int: |c| match *c { Component::Durability(n) => Some(n), _ => None },
    });

    registry.register(ComponentKind::DyeColor, IntSerializer {
        key: "customColor",
        from_int: Component::DyeColor,
        to_int: |c| match *c { Component::DyeColor(n) => Some(n), _ => None },
    });

    registry.register(ComponentKind::RepairCost, IntSerializer {
        key: "RepairCost",
        from_int: Component::RepairCost,
        to_int: |c| match *c { Component::RepairCost(n) => Some(n), _ => None },
    });

    registry.register(ComponentKind::Unbreakable, UnbreakableSerializer);
    registry.register(ComponentKind::CustomData, CustomDataSerializer);
    registry.register_non_serializable(ComponentKind::Cooldown);

}


/// Serializer for components holding a single int stored under a fixed key.
pub struct IntSerializer {
    pub key: &'static str,
    pub from_int: fn(i32) -> Component,
    pub to_int: fn(&Component) -> Option<i32>,
}

impl ComponentSerializer for IntSerializer {

    fn serialize(&self, _stack: &ItemStack, _item_tag: &mut NbtCompound, data_tag: &mut NbtCompound, value: &Component) {
        if let Some(n) = (self.to_int)(value) {
            data_tag.insert(self.key, n);
        }
    }

    fn deserialize(&self, data_tag: &NbtCompound) -> Option<Component> {
        data_tag.get_int(self.key).map(self.from_int)
    }

}

/// Serializer for [`Component::Unbreakable`], only written when set.
pub struct UnbreakableSerializer;

impl ComponentSerializer for UnbreakableSerializer {

    fn serialize(&self, _stack: &ItemStack, _item_tag: &mut NbtCompound, data_tag: &mut NbtCompound, value: &Component) {
        if let Component::Unbreakable(true) = value {
            data_tag.insert("Unbreakable", true);
        }
    }

    fn deserialize(&self, data_tag: &NbtCompound) -> Option<Component> {
        data_tag.get_boolean("Unbreakable").map(Component::Unbreakable)
    }

}

/// Serializer for [`Component::CustomData`], copying every field into the data tag.
/// It cannot be read back because its fields have no reserved key.
pub struct CustomDataSerializer;

impl ComponentSerializer for CustomDataSerializer {

    fn serialize(&self, _stack: &ItemStack, _item_tag: &mut NbtCompound, data_tag: &mut NbtCompound, value: &Component) {
        if let Component::CustomData(comp) = value {
            data_tag.merge(comp.clone());
        }
    }

}
