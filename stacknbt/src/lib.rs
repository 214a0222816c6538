//! NBT codec for item stacks, their metadata components and the legacy block metadata.
//!
//! The entry point is [`codec::StackCodec`], which encodes an [`item::ItemStack`] into
//! an [`nbt::NbtCompound`] and decodes it back. The codec relies on three registries
//! (item types, enchantments and legacy block states) and on the registry of component
//! serializers, vanilla versions of all of them are provided.

pub mod io;
pub mod nbt;
pub mod ident;

pub mod block;
pub mod registry;
pub mod enchantment;

pub mod item;
pub mod component;
pub mod codec;
