//! NBT serialization and deserialization for [`ItemStack`] type.
//!
//! An item is encoded as a compound with its `Name`, `Count` and legacy `Damage`,
//! and an optional `tag` compound holding its metadata:
//!
//! - `display`: compound with an optional `Name` string and `Lore` string list;
//! - `ench`: list of compounds with the `id` and `lvl` shorts of each enchantment;
//! - `CanDestroy` and `CanPlaceOn`: lists of block identifiers;
//! - any field written by the registered component serializers.
//!
//! Encoding and decoding never fail, metadata that cannot be represented is dropped
//! with a debug diagnostic.

use tracing::{debug, trace};

use crate::enchantment::{EnchantmentRegistry, Enchantments};
use crate::block::{LegacyMapping, LegacyStateTable};
use crate::registry::{ItemRegistry, ItemType, ItemTypes};
use crate::component::ComponentRegistry;
use crate::item::{ItemStack, ItemStackBuilder};
use crate::ident::Identifier;
use crate::nbt::NbtCompound;


/// The stack codec, linking the registries needed to encode and decode item stacks.
/// It only holds shared references so it can be copied and used from many threads.
#[derive(Clone, Copy)]
pub struct StackCodec<'a> {
    items: &'a dyn ItemRegistry,
    enchantments: &'a dyn EnchantmentRegistry,
    legacy: &'a dyn LegacyMapping,
    components: &'a ComponentRegistry,
}

impl StackCodec<'static> {

    /// The codec using all global vanilla registries.
    pub fn vanilla() -> Self {
        Self::new(
            ItemTypes::vanilla(),
            Enchantments::vanilla(),
            LegacyStateTable::vanilla(),
            ComponentRegistry::vanilla(),
        )
    }

}

impl<'a> StackCodec<'a> {

    pub fn new(
        items: &'a dyn ItemRegistry,
        enchantments: &'a dyn EnchantmentRegistry,
        legacy: &'a dyn LegacyMapping,
        components: &'a ComponentRegistry,
    ) -> Self {
        Self { items, enchantments, legacy, components }
    }

    /// Encode an item stack into a new item compound.
    #[inline]
    pub fn encode(&self, stack: &ItemStack) -> NbtCompound {
        let mut item_tag = NbtCompound::new();
        self.serialize(stack, &mut item_tag);
        item_tag
    }

    /// Encode an item stack into the given item compound.
    pub fn serialize(&self, stack: &ItemStack, item_tag: &mut NbtCompound) {

        trace!("serialize {} x{}", stack.id(), stack.amount());

        item_tag.insert("Name", self.items.identifier_of(stack.item_type()).to_string());
        item_tag.insert("Count", stack.amount().min(i8::MAX as u16) as i8);
        item_tag.insert("Damage", 0i16);

        let mut tag = NbtCompound::new();

        for (&kind, value) in stack.components() {
            let Some(serializer) = self.components.lookup(kind) else {
                if !self.components.is_non_serializable(kind) {
                    debug!("unregistered item component {kind:?}");
                }
                continue;
            };
            serializer.serialize(stack, item_tag, &mut tag, value);
        }

        // Block items without a structured state keep the legacy metadata they were
        // decoded with, it cannot be recomputed.
        if stack.item_type().block {
            let meta = match stack.block_state() {
                Some(state) => self.legacy.meta_from_state(state),
                None => stack.meta(),
            };
            item_tag.insert("Damage", meta);
        }

        // Well-known fields take precedence over the fields written by components.
        tag.merge(serialize_well_known(stack));

        if !tag.is_empty() {
            item_tag.insert("tag", tag);
        }

    }

    /// Decode an item stack from an item compound as written by [`Self::encode`].
    /// Missing `Count` or unparsable `Name` gives the empty stack.
    pub fn decode(&self, item_tag: &NbtCompound) -> ItemStack {

        let id = match item_tag.get_string("Name").map(str::parse::<Identifier>) {
            Some(Ok(id)) => id,
            Some(Err(err)) => {
                debug!("invalid item name: {err}");
                return ItemStack::empty();
            }
            None => return ItemStack::empty(),
        };

        let meta = item_tag.get_short("Damage").unwrap_or(0);
        let amount = item_tag.get_byte("Count").unwrap_or(0) as i32;
        let empty = NbtCompound::new();
        let tag = item_tag.get_compound("tag").unwrap_or(&empty);

        let mut builder = ItemStack::builder();
        self.deserialize(&id, meta, amount, &mut builder, tag);
        builder.build()

    }

    /// Decode an item stack from its already extracted identifier, legacy metadata,
    /// amount and `tag` compound (possibly empty) into the given builder.
    pub fn deserialize(&self, id: &Identifier, meta: i16, amount: i32, builder: &mut ItemStackBuilder, tag: &NbtCompound) {

        trace!("deserialize {id}:{meta} x{amount}");

        if amount <= 0 {
            builder.item_type(ItemType::AIR);
            return;
        }

        let item_type = self.items.resolve_type(id);
        let block = item_type.block;
        builder.id(id.clone());
        builder.item_type(item_type);
        builder.amount(amount.min(u16::MAX as i32) as u16);
        builder.meta(meta);

        let mut stub = NbtCompound::new();
        stub.insert("Name", id.to_string());
        stub.insert("Damage", meta);
        stub.insert("Count", amount.min(i8::MAX as i32) as i8);
        builder.nbt(stub);

        if block {
            match self.legacy.state_from_meta(id, meta) {
                Some(state) => { builder.block_state(state); }
                None => debug!("no block state for {id}:{meta}"),
            }
        }

        if tag.is_empty() {
            return;
        }

        if let Some(display) = tag.get_compound("display") {
            if !display.is_empty() {
                builder.name(display.get_string("Name").map(str::to_string));
                builder.lore(display.get_string_list("Lore").map(<[String]>::to_vec).unwrap_or_default());
            }
        }

        if let Some(ench) = tag.get_compound_list("ench") {
            for entry in ench {

                let Some(ench_id) = entry.get_short("id") else {
                    debug!("enchantment without id");
                    continue;
                };

                let Some(ty) = self.enchantments.type_by_id(ench_id) else {
                    debug!("unknown enchantment id: {ench_id}");
                    continue;
                };

                let level = entry.get_short("lvl").unwrap_or(1).max(1);
                builder.add_enchantment(ty, level as u16);

            }
        }

        if let Some(can_place_on) = tag.get_string_list("CanPlaceOn") {
            for s in can_place_on {
                match s.parse() {
                    Ok(id) => { builder.add_can_place_on(id); }
                    Err(err) => debug!("invalid CanPlaceOn identifier {s:?}: {err}"),
                }
            }
        }

        if let Some(can_destroy) = tag.get_string_list("CanDestroy") {
            for s in can_destroy {
                match s.parse() {
                    Ok(id) => { builder.add_can_destroy(id); }
                    Err(err) => debug!("invalid CanDestroy identifier {s:?}: {err}"),
                }
            }
        }

    }

    /// Offer the `tag` compound of an item to every registered component serializer
    /// and add the components they recognize to the builder. This is not part of
    /// [`Self::deserialize`] and must be called explicitly. Does nothing if the
    /// builder holds the empty type.
    pub fn deserialize_components(&self, builder: &mut ItemStackBuilder, tag: &NbtCompound) {

        if builder.get_item_type().is_air() {
            return;
        }

        for (kind, serializer) in self.components.serializers() {
            if let Some(component) = serializer.deserialize(tag) {
                debug_assert_eq!(component.kind(), kind);
                builder.component(component);
            }
        }

    }

}


/// Build the compound of the well-known metadata groups, each group is only present
/// if not empty.
fn serialize_well_known(stack: &ItemStack) -> NbtCompound {

    let mut tag = NbtCompound::new();

    if stack.name().is_some() || !stack.lore().is_empty() {

        let mut display = NbtCompound::new();

        if let Some(name) = stack.name() {
            display.insert("Name", name);
        }

        if !stack.lore().is_empty() {
            display.insert("Lore", stack.lore().to_vec());
        }

        tag.insert("display", display);

    }

    if !stack.enchantments().is_empty() {
        tag.insert("ench", stack.enchantments().iter()
            .map(|(ty, &level)| {
                let mut entry = NbtCompound::new();
                entry.insert("id", ty.id);
                entry.insert("lvl", level.min(i16::MAX as u16) as i16);
                entry
            })
            .collect::<Vec<_>>());
    }

    if !stack.can_destroy().is_empty() {
        tag.insert("CanDestroy", stack.can_destroy().iter()
            .map(Identifier::to_string)
            .collect::<Vec<_>>());
    }

    if !stack.can_place_on().is_empty() {
        tag.insert("CanPlaceOn", stack.can_place_on().iter()
            .map(Identifier::to_string)
            .collect::<Vec<_>>());
    }

    tag

}


#[cfg(test)]
mod tests {

    use super::*;

    use crate::component::{Component, ComponentKind, ComponentSerializer};
    use crate::enchantment::EnchantmentType;
    use crate::block::BlockState;
    use crate::nbt::Nbt;

    fn enchantment(name: &str) -> EnchantmentType {
        Enchantments::vanilla().by_name(&Identifier::minecraft(name)).unwrap()
    }

    fn item(name: &str) -> ItemStackBuilder {
        let mut builder = ItemStack::builder();
        builder.item_type(ItemTypes::vanilla().resolve_type(&Identifier::minecraft(name)));
        builder
    }

    fn bed_stack() -> ItemStack {
        let mut builder = item("bed");
        builder.amount(1)
            .add_enchantment(enchantment("sharpness"), 2)
            .lore(vec!["A cozy bed".to_string()]);
        builder.build()
    }

    #[test]
    fn bed_example() {

        let codec = StackCodec::vanilla();
        let stack = bed_stack();
        let item_tag = codec.encode(&stack);

        assert_eq!(item_tag.get_string("Name"), Some("minecraft:bed"));
        assert_eq!(item_tag.get_byte("Count"), Some(1));
        assert_eq!(item_tag.get_short("Damage"), Some(0));

        let tag = item_tag.get_compound("tag").unwrap();
        let display = tag.get_compound("display").unwrap();
        assert_eq!(display.get_string_list("Lore"), Some(&["A cozy bed".to_string()][..]));
        assert_eq!(display.get_string("Name"), None);

        let ench = tag.get_compound_list("ench").unwrap();
        assert_eq!(ench.len(), 1);
        assert_eq!(ench[0].get_short("id"), Some(9));
        assert_eq!(ench[0].get_short("lvl"), Some(2));

        assert!(!tag.contains_key("CanDestroy"));
        assert!(!tag.contains_key("CanPlaceOn"));

        assert_eq!(codec.decode(&item_tag), stack);

    }

    #[test]
    fn well_known_round_trip() {

        let codec = StackCodec::vanilla();

        let mut builder = item("diamond_sword");
        builder.amount(1)
            .name(Some("Excalibur".to_string()))
            .lore(vec!["first".to_string(), "second".to_string()])
            .add_enchantment(enchantment("looting"), 3)
            .add_enchantment(enchantment("sharpness"), 5)
            .add_enchantment(enchantment("unbreaking"), 1)
            .add_can_destroy(Identifier::minecraft("cobweb"))
            .add_can_destroy(Identifier::minecraft("bamboo"))
            .add_can_place_on("mymod:pedestal".parse().unwrap());
        let stack = builder.build();

        let decoded = codec.decode(&codec.encode(&stack));
        assert_eq!(decoded, stack);
        assert_eq!(decoded.enchantments().keys().map(|e| e.id).collect::<Vec<_>>(), [14, 9, 17]);

    }

    #[test]
    fn decode_is_idempotent() {

        let codec = StackCodec::vanilla();

        let mut item_tag = codec.encode(&bed_stack());
        // Unknown data that the decoding ignores.
        item_tag.insert("Slot", 3i8);

        let once = codec.decode(&item_tag);
        let twice = codec.decode(&codec.encode(&once));
        assert_eq!(once, twice);

    }

    fn raw_item(name: &str, damage: i16) -> NbtCompound {
        let mut item_tag = NbtCompound::new();
        item_tag.insert("Name", name);
        item_tag.insert("Count", 1i8);
        item_tag.insert("Damage", damage);
        item_tag
    }

    #[test]
    fn decode_is_idempotent_with_item_damage() {

        let codec = StackCodec::vanilla();

        let once = codec.decode(&raw_item("minecraft:iron_pickaxe", 7));
        assert_eq!(once.meta(), 7);

        let item_tag = codec.encode(&once);
        assert_eq!(item_tag.get_short("Damage"), Some(0));

        let twice = codec.decode(&item_tag);
        assert_eq!(twice.meta(), 0);
        assert_eq!(once, twice);

    }

    #[test]
    fn decode_is_idempotent_with_unrecognized_block_meta() {

        let codec = StackCodec::vanilla();

        let once = codec.decode(&raw_item("minecraft:log", 3));
        assert_eq!(once.block_state(), None);

        let item_tag = codec.encode(&once);
        assert_eq!(item_tag.get_short("Damage"), Some(3));

        let twice = codec.decode(&item_tag);
        assert_eq!(twice.block_state(), None);
        assert_eq!(twice.meta(), 3);
        assert_eq!(once, twice);

        // Recognized metadata goes through the block state.
        let once = codec.decode(&raw_item("minecraft:log", 6));
        assert!(once.block_state().is_some());
        assert_eq!(codec.decode(&codec.encode(&once)), once);

    }

    #[test]
    fn empty_amount_collapse() {

        let codec = StackCodec::vanilla();
        let tag = codec.encode(&bed_stack()).get_compound("tag").unwrap().clone();

        for amount in [0, -1, i32::MIN] {

            let mut builder = ItemStack::builder();
            builder.name(Some("Preset".to_string()));
            codec.deserialize(&Identifier::minecraft("bed"), 5, amount, &mut builder, &tag);

            let stack = builder.build();
            assert_eq!(stack, ItemStack::empty());
            assert!(stack.nbt().is_empty());

        }

        let mut item_tag = codec.encode(&bed_stack());
        item_tag.insert("Count", 0i8);
        assert_eq!(codec.decode(&item_tag), ItemStack::empty());

    }

    #[test]
    fn minimal_stub() {

        let codec = StackCodec::vanilla();

        let mut builder = ItemStack::builder();
        codec.deserialize(&Identifier::minecraft("stick"), 7, 12, &mut builder, &NbtCompound::new());
        let stack = builder.build();

        assert_eq!(stack.amount(), 12);
        assert_eq!(stack.meta(), 7);
        assert_eq!(stack.nbt().get_string("Name"), Some("minecraft:stick"));
        assert_eq!(stack.nbt().get_short("Damage"), Some(7));
        assert_eq!(stack.nbt().get_byte("Count"), Some(12));
        assert_eq!(stack.nbt().len(), 3);

        let mut builder = ItemStack::builder();
        codec.deserialize(&Identifier::minecraft("stick"), 0, 200, &mut builder, &NbtCompound::new());
        let stack = builder.build();

        assert_eq!(stack.amount(), 200);
        assert_eq!(stack.nbt().get_byte("Count"), Some(127));

    }

    #[test]
    fn unknown_enchantment_skipped() {

        let codec = StackCodec::vanilla();

        let entries = [(9, Some(2)), (999, Some(4)), (17, None)]
            .into_iter()
            .map(|(id, lvl)| {
                let mut entry = NbtCompound::new();
                entry.insert("id", id as i16);
                if let Some(lvl) = lvl {
                    entry.insert("lvl", lvl as i16);
                }
                entry
            })
            .collect::<Vec<_>>();

        let mut tag = NbtCompound::new();
        tag.insert("ench", entries);

        let mut builder = ItemStack::builder();
        codec.deserialize(&Identifier::minecraft("diamond_sword"), 0, 1, &mut builder, &tag);
        let stack = builder.build();

        let enchantments = stack.enchantments().iter()
            .map(|(ty, &level)| (ty.id, level))
            .collect::<Vec<_>>();
        assert_eq!(enchantments, [(9, 2), (17, 1)]);

    }

    #[test]
    fn enchantment_level_clamped() {

        let codec = StackCodec::vanilla();

        let entries = [(9, -1), (17, 0), (14, i16::MAX)]
            .into_iter()
            .map(|(id, lvl)| {
                let mut entry = NbtCompound::new();
                entry.insert("id", id as i16);
                entry.insert("lvl", lvl);
                entry
            })
            .collect::<Vec<_>>();

        let mut tag = NbtCompound::new();
        tag.insert("ench", entries);

        let mut builder = ItemStack::builder();
        codec.deserialize(&Identifier::minecraft("diamond_sword"), 0, 1, &mut builder, &tag);
        let stack = builder.build();

        let enchantments = stack.enchantments().iter()
            .map(|(ty, &level)| (ty.id, level))
            .collect::<Vec<_>>();
        assert_eq!(enchantments, [(9, 1), (17, 1), (14, i16::MAX as u16)]);

        let mut builder = item("diamond_sword");
        builder.add_enchantment(enchantment("sharpness"), u16::MAX);
        let item_tag = codec.encode(&builder.build());
        let ench = item_tag.get_compound("tag").and_then(|tag| tag.get_compound_list("ench")).unwrap();
        assert_eq!(ench[0].get_short("lvl"), Some(i16::MAX));

    }

    #[test]
    fn display_omission() {

        let codec = StackCodec::vanilla();

        let mut builder = item("stick");
        builder.add_can_place_on(Identifier::minecraft("dirt"));
        let item_tag = codec.encode(&builder.build());
        let tag = item_tag.get_compound("tag").unwrap();
        assert!(!tag.contains_key("display"));
        assert!(!tag.contains_key("ench"));

        let item_tag = codec.encode(&item("stick").build());
        assert!(!item_tag.contains_key("tag"));

        let mut builder = item("stick");
        builder.lore(vec!["only lore".to_string()]);
        let item_tag = codec.encode(&builder.build());
        let display = item_tag.get_compound("tag").unwrap().get_compound("display").unwrap();
        assert_eq!(display.len(), 1);
        assert!(display.contains_key("Lore"));

    }

    #[test]
    fn decode_malformed_groups() {

        let codec = StackCodec::vanilla();

        let mut display = NbtCompound::new();
        display.insert("Name", 12i32);
        display.insert("Lore", "not a list");

        let mut tag = NbtCompound::new();
        tag.insert("display", display);
        tag.insert("ench", vec![1i16, 2]);
        tag.insert("CanDestroy", vec![NbtCompound::new()]);
        tag.insert("CanPlaceOn", vec!["minecraft:stone".to_string(), "Not Valid".to_string()]);

        let mut builder = ItemStack::builder();
        codec.deserialize(&Identifier::minecraft("stick"), 0, 2, &mut builder, &tag);
        let stack = builder.build();

        assert_eq!(stack.name(), None);
        assert!(stack.lore().is_empty());
        assert!(stack.enchantments().is_empty());
        assert!(stack.can_destroy().is_empty());
        assert_eq!(stack.can_place_on().iter().collect::<Vec<_>>(), [&Identifier::minecraft("stone")]);

    }

    #[test]
    fn block_state_meta() {

        let codec = StackCodec::vanilla();
        let state = BlockState::new(Identifier::minecraft("wool")).with("color", "red");

        let mut builder = item("wool");
        builder.amount(64).meta(14).block_state(state.clone());
        let stack = builder.build();

        let item_tag = codec.encode(&stack);
        assert_eq!(item_tag.get_short("Damage"), Some(14));
        assert_eq!(item_tag.get_byte("Count"), Some(64));
        assert!(!item_tag.contains_key("tag"));

        let decoded = codec.decode(&item_tag);
        assert_eq!(decoded.block_state(), Some(&state));
        assert_eq!(decoded, stack);

    }

    #[test]
    fn block_state_unrecognized_meta() {

        let codec = StackCodec::vanilla();

        let mut builder = ItemStack::builder();
        codec.deserialize(&Identifier::minecraft("log"), 3, 1, &mut builder, &NbtCompound::new());
        let stack = builder.build();

        assert!(stack.item_type().block);
        assert_eq!(stack.block_state(), None);
        assert_eq!(stack.meta(), 3);

        // Non-block items never get a block state.
        let mut builder = ItemStack::builder();
        codec.deserialize(&Identifier::minecraft("bed"), 0, 1, &mut builder, &NbtCompound::new());
        assert_eq!(builder.build().block_state(), None);

    }

    #[test]
    fn count_clamped() {
        let codec = StackCodec::vanilla();
        let mut builder = item("stone");
        builder.amount(300);
        assert_eq!(codec.encode(&builder.build()).get_byte("Count"), Some(127));
    }

    #[test]
    fn components_written() {

        let codec = StackCodec::vanilla();

        let mut builder = item("leather_chestplate");
        builder.component(Component::Durability(12))
            .component(Component::DyeColor(0x00FF00))
            .component(Component::Cooldown(20))
            .component(Component::BookPages(vec!["page".to_string()]));
        let stack = builder.build();

        let item_tag = codec.encode(&stack);
        let tag = item_tag.get_compound("tag").unwrap();
        assert_eq!(tag.get_int("Damage"), Some(12));
        assert_eq!(tag.get_int("customColor"), Some(0x00FF00));
        assert_eq!(tag.len(), 2);
        // The legacy damage is not the durability.
        assert_eq!(item_tag.get_short("Damage"), Some(0));

        let mut builder = ItemStack::builder();
        codec.deserialize(&Identifier::minecraft("leather_chestplate"), 0, 1, &mut builder, tag);
        codec.deserialize_components(&mut builder, tag);
        let decoded = builder.build();
        assert_eq!(decoded.component(ComponentKind::Durability), Some(&Component::Durability(12)));
        assert_eq!(decoded.component(ComponentKind::DyeColor), Some(&Component::DyeColor(0x00FF00)));
        assert_eq!(decoded.components().len(), 2);

    }

    #[test]
    fn well_known_precedence() {

        let codec = StackCodec::vanilla();

        let mut custom = NbtCompound::new();
        custom.insert("display", "overwritten");
        custom.insert("Owner", "Notch");

        let mut builder = item("stick");
        builder.name(Some("Wand".to_string())).component(Component::CustomData(custom));
        let item_tag = codec.encode(&builder.build());

        let tag = item_tag.get_compound("tag").unwrap();
        assert_eq!(tag.get_string("Owner"), Some("Notch"));
        assert_eq!(tag.get_compound("display").and_then(|d| d.get_string("Name")), Some("Wand"));

    }

    #[test]
    fn custom_registry() {

        struct TopLevel;

        impl ComponentSerializer for TopLevel {
            fn serialize(&self, stack: &ItemStack, item_tag: &mut NbtCompound, _data_tag: &mut NbtCompound, value: &Component) {
                if let Component::BookPages(pages) = value {
                    item_tag.insert("Pages", pages.clone());
                    item_tag.insert("Amount", stack.amount() as i16);
                }
            }
        }

        let mut components = ComponentRegistry::new();
        components.register(ComponentKind::BookPages, TopLevel);

        let codec = StackCodec::new(
            ItemTypes::vanilla(),
            Enchantments::vanilla(),
            LegacyStateTable::vanilla(),
            &components,
        );

        let mut builder = item("writable_book");
        builder.component(Component::BookPages(vec!["a".to_string(), "b".to_string()]))
            .component(Component::RepairCost(3));
        let item_tag = codec.encode(&builder.build());

        assert_eq!(item_tag.get("Pages"), Some(&Nbt::ListString(vec!["a".to_string(), "b".to_string()])));
        assert_eq!(item_tag.get_short("Amount"), Some(1));
        // Repair cost has no serializer in this registry.
        assert!(!item_tag.contains_key("tag"));

    }

    #[test]
    fn decode_missing_name() {

        let codec = StackCodec::vanilla();

        let mut item_tag = NbtCompound::new();
        item_tag.insert("Count", 3i8);
        assert_eq!(codec.decode(&item_tag), ItemStack::empty());

        item_tag.insert("Name", "Not Valid");
        assert_eq!(codec.decode(&item_tag), ItemStack::empty());

    }

    #[test]
    fn concurrent_use() {

        let codec = StackCodec::vanilla();
        let stack = bed_stack();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        assert_eq!(codec.decode(&codec.encode(&stack)), stack);
                    }
                });
            }
        });

    }

}
