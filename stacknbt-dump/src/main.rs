//! Print the item stacks stored in NBT files, such as player data or chunk data
//! extracted from a world save.

mod config;

use std::io::{self, BufRead, BufReader};
use std::process::ExitCode;
use std::path::Path;
use std::fs::File;
use std::env;

use flate2::read::GzDecoder;
use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use stacknbt::nbt::{self, Nbt, NbtCompound, NbtError};
use stacknbt::codec::StackCodec;
use stacknbt::item::ItemStack;


/// Magic bytes at the start of gzip streams.
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Fields of an item compound that the codec reads and writes.
const ITEM_FIELDS: [&str; 4] = ["Name", "Count", "Damage", "tag"];


fn main() -> ExitCode {

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .from_env_lossy())
        .with_writer(io::stderr)
        .init();

    let paths = env::args_os().skip(1).collect::<Vec<_>>();
    if paths.is_empty() {
        eprintln!("usage: stacknbt-dump <file>...");
        return ExitCode::from(2);
    }

    let codec = StackCodec::vanilla();
    let mut failed = false;

    for path in paths {
        let path = Path::new(&path);
        match dump_file(codec, path) {
            Ok(count) => info!("{}: {count} item stacks", path.display()),
            Err(err) => {
                error!("{}: {err}", path.display());
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }

}

/// Print every item stack found in the given file, returning the number of stacks.
fn dump_file(codec: StackCodec, path: &Path) -> Result<usize, DumpError> {

    let mut reader = BufReader::new(File::open(path)?);

    let gzip = match config::gzip() {
        Some(gzip) => gzip,
        None => reader.fill_buf()?.starts_with(&GZIP_MAGIC),
    };

    let (_, root) = if gzip {
        nbt::from_reader(GzDecoder::new(reader))?
    } else {
        nbt::from_reader(reader)?
    };

    let root = root.as_compound().ok_or(DumpError::RootNotCompound)?;

    let mut items = Vec::new();
    find_items(root, &mut items);
    if items.is_empty() {
        return Err(DumpError::NoItem);
    }

    for (index, &item_tag) in items.iter().enumerate() {

        let stack = decode(codec, item_tag);
        println!("{}#{index}: {stack:#?}", path.display());

        let encoded = codec.encode(&stack);
        for field in ITEM_FIELDS {
            if item_tag.get(field) != encoded.get(field) {
                warn!("{}#{index}: field {field} changed after re-encoding", path.display());
            }
        }

    }

    Ok(items.len())

}

/// Recursively find all item compounds, an item compound has a `Name` string and a
/// `Count` byte. Item compounds are not searched for nested items.
fn find_items<'a>(comp: &'a NbtCompound, items: &mut Vec<&'a NbtCompound>) {

    if comp.get_string("Name").is_some() && comp.get_byte("Count").is_some() {
        items.push(comp);
        return;
    }

    for (_, tag) in comp.iter() {
        match tag {
            Nbt::Compound(child) => find_items(child, items),
            Nbt::ListCompound(list) => {
                for child in list {
                    find_items(child, items);
                }
            }
            _ => {}
        }
    }

}

/// Decode an item compound, with its components if enabled.
fn decode(codec: StackCodec, item_tag: &NbtCompound) -> ItemStack {

    let stack = codec.decode(item_tag);
    if !config::components() {
        return stack;
    }

    let Some(tag) = item_tag.get_compound("tag") else {
        return stack;
    };

    let mut builder = stack.to_builder();
    codec.deserialize_components(&mut builder, tag);
    builder.build()

}


/// Error type for the dump of a single file.
#[derive(thiserror::Error, Debug)]
enum DumpError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("invalid nbt: {0}")]
    Nbt(#[from] NbtError),
    #[error("root tag is not a compound")]
    RootNotCompound,
    #[error("no item stack found")]
    NoItem,
}


#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn find_nested_items() {

        let codec = StackCodec::vanilla();

        let mut stick = NbtCompound::new();
        stick.insert("Name", "minecraft:stick");
        stick.insert("Count", 4i8);
        stick.insert("Slot", 0i8);

        let mut player = NbtCompound::new();
        player.insert("Inventory", vec![stick.clone(), codec.encode(&ItemStack::empty())]);
        player.insert("Health", 20i16);

        let mut root = NbtCompound::new();
        root.insert("Player", player);
        root.insert("Items", vec![stick]);

        let mut items = Vec::new();
        find_items(&root, &mut items);
        assert_eq!(items.len(), 3);

        let stack = decode(codec, items[0]);
        assert_eq!(stack.amount(), 4);
        assert!(decode(codec, items[1]).is_empty());

    }

}
