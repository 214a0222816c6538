//! NBT tag tree and its binary serialization.

use std::io::{self, Read, Write};
use std::fmt;

use indexmap::IndexMap;

use crate::io::{ReadJavaExt, WriteJavaExt};


/// Maximum nesting of lists and compounds accepted when reading.
pub const MAX_DEPTH: usize = 512;


/// A generic NBT tag. Lists are typed so that a list can only ever contain a single
/// type of element.
#[derive(Clone, PartialEq)]
pub enum Nbt {
    // Primitive tags.
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<u8>),
    String(String),
    // List tags.
    ListByte(Vec<i8>),
    ListShort(Vec<i16>),
    ListInt(Vec<i32>),
    ListLong(Vec<i64>),
    ListFloat(Vec<f32>),
    ListDouble(Vec<f64>),
    ListByteArray(Vec<Vec<u8>>),
    ListString(Vec<String>),
    ListCompound(Vec<NbtCompound>),
    // Compound tag.
    Compound(NbtCompound),
}

/// An abstract NBT compound type that hides the internal implementation of the mapping.
/// Keys keep their insertion order so that serialization is deterministic, but two
/// compounds are equal regardless of the order of their keys.
#[derive(Clone, Default, PartialEq)]
pub struct NbtCompound {
    inner: IndexMap<String, Nbt>,
}


/// Deserialize a named NBT tag from a reader, returning its key and the tag.
pub fn from_reader(reader: impl Read) -> Result<(String, Nbt), NbtError> {
    NbtReader { inner: reader, depth: 0 }.read_named()
}

/// Serialize a named NBT tag into a writer.
pub fn to_writer(writer: impl Write, key: &str, tag: &Nbt) -> Result<(), NbtError> {
    NbtWriter { inner: writer }.write_named(key, tag)
}


/// Type of a tag in the binary form, the discriminant is the type id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
enum TagType {
    End = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    ByteArray = 7,
    String = 8,
    List = 9,
    Compound = 10,
}

impl TagType {

    fn from_id(id: i8) -> Result<Self, NbtError> {
        Ok(match id {
            0 => Self::End,
            1 => Self::Byte,
            2 => Self::Short,
            3 => Self::Int,
            4 => Self::Long,
            5 => Self::Float,
            6 => Self::Double,
            7 => Self::ByteArray,
            8 => Self::String,
            9 => Self::List,
            10 => Self::Compound,
            _ => return Err(NbtError::IllegalTagType),
        })
    }

    fn of(tag: &Nbt) -> Self {
        match tag {
            Nbt::Byte(_) => Self::Byte,
            Nbt::Short(_) => Self::Short,
            Nbt::Int(_) => Self::Int,
            Nbt::Long(_) => Self::Long,
            Nbt::Float(_) => Self::Float,
            Nbt::Double(_) => Self::Double,
            Nbt::ByteArray(_) => Self::ByteArray,
            Nbt::String(_) => Self::String,
            Nbt::ListByte(_) |
            Nbt::ListShort(_) |
            Nbt::ListInt(_) |
            Nbt::ListLong(_) |
            Nbt::ListFloat(_) |
            Nbt::ListDouble(_) |
            Nbt::ListByteArray(_) |
            Nbt::ListString(_) |
            Nbt::ListCompound(_) => Self::List,
            Nbt::Compound(_) => Self::Compound,
        }
    }

}


/// Reader of the binary form, tracking the current nesting depth.
struct NbtReader<R> {
    inner: R,
    depth: usize,
}

impl<R: Read> NbtReader<R> {

    fn read_type(&mut self) -> Result<TagType, NbtError> {
        TagType::from_id(self.inner.read_java_byte()?)
    }

    fn read_len(&mut self) -> Result<usize, NbtError> {
        usize::try_from(self.inner.read_java_int()?).map_err(|_| NbtError::IllegalLength)
    }

    fn read_named(&mut self) -> Result<(String, Nbt), NbtError> {

        let ty = self.read_type()?;
        if ty == TagType::End {
            return Err(NbtError::IllegalTagType);
        }

        let key = self.inner.read_java_string8()?;
        let tag = self.read_payload(ty)?;
        Ok((key, tag))

    }

    fn read_payload(&mut self, ty: TagType) -> Result<Nbt, NbtError> {
        Ok(match ty {
            TagType::End => return Err(NbtError::IllegalTagType),
            TagType::Byte => Nbt::Byte(self.inner.read_java_byte()?),
            TagType::Short => Nbt::Short(self.inner.read_java_short()?),
            TagType::Int => Nbt::Int(self.inner.read_java_int()?),
            TagType::Long => Nbt::Long(self.inner.read_java_long()?),
            TagType::Float => Nbt::Float(self.inner.read_java_float()?),
            TagType::Double => Nbt::Double(self.inner.read_java_double()?),
            TagType::ByteArray => Nbt::ByteArray(self.read_byte_array()?),
            TagType::String => Nbt::String(self.inner.read_java_string8()?),
            TagType::List => self.nested(Self::read_list)?,
            TagType::Compound => Nbt::Compound(self.nested(Self::read_compound)?),
        })
    }

    /// Run the given read function one level deeper.
    fn nested<T>(&mut self, func: impl FnOnce(&mut Self) -> Result<T, NbtError>) -> Result<T, NbtError> {
        if self.depth >= MAX_DEPTH {
            return Err(NbtError::TooDeep);
        }
        self.depth += 1;
        let ret = func(self);
        self.depth -= 1;
        ret
    }

    fn read_vec<T>(&mut self, len: usize, mut func: impl FnMut(&mut Self) -> Result<T, NbtError>) -> Result<Vec<T>, NbtError> {
        // The length comes from the input, only a bounded capacity is reserved.
        let mut list = Vec::with_capacity(len.min(1024));
        for _ in 0..len {
            list.push(func(self)?);
        }
        Ok(list)
    }

    fn read_list(&mut self) -> Result<Nbt, NbtError> {

        let ty = self.read_type()?;
        let len = self.read_len()?;

        Ok(match ty {
            // Empty lists are commonly written with the end type, read as byte lists.
            TagType::End if len == 0 => Nbt::ListByte(Vec::new()),
            TagType::Byte => Nbt::ListByte(self.read_vec(len, |r| Ok(r.inner.read_java_byte()?))?),
            TagType::Short => Nbt::ListShort(self.read_vec(len, |r| Ok(r.inner.read_java_short()?))?),
            TagType::Int => Nbt::ListInt(self.read_vec(len, |r| Ok(r.inner.read_java_int()?))?),
            TagType::Long => Nbt::ListLong(self.read_vec(len, |r| Ok(r.inner.read_java_long()?))?),
            TagType::Float => Nbt::ListFloat(self.read_vec(len, |r| Ok(r.inner.read_java_float()?))?),
            TagType::Double => Nbt::ListDouble(self.read_vec(len, |r| Ok(r.inner.read_java_double()?))?),
            TagType::ByteArray => Nbt::ListByteArray(self.read_vec(len, Self::read_byte_array)?),
            TagType::String => Nbt::ListString(self.read_vec(len, |r| Ok(r.inner.read_java_string8()?))?),
            TagType::Compound => Nbt::ListCompound(self.read_vec(len, |r| r.nested(Self::read_compound))?),
            // Lists of lists have no tree representation.
            TagType::End | TagType::List => return Err(NbtError::IllegalTagType),
        })

    }

    fn read_byte_array(&mut self) -> Result<Vec<u8>, NbtError> {
        let len = self.read_len()?;
        let mut buf = Vec::new();
        self.inner.by_ref().take(len as u64).read_to_end(&mut buf)?;
        if buf.len() != len {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        Ok(buf)
    }

    fn read_compound(&mut self) -> Result<NbtCompound, NbtError> {

        let mut compound = NbtCompound::new();

        loop {

            let ty = self.read_type()?;
            if ty == TagType::End {
                return Ok(compound);
            }

            let key = self.inner.read_java_string8()?;
            let tag = self.read_payload(ty)?;
            compound.insert(key, tag);

        }

    }

}


/// Writer of the binary form.
struct NbtWriter<W> {
    inner: W,
}

impl<W: Write> NbtWriter<W> {

    fn write_len(&mut self, len: usize) -> Result<(), NbtError> {
        let len = i32::try_from(len).map_err(|_| NbtError::IllegalLength)?;
        self.inner.write_java_int(len)?;
        Ok(())
    }

    fn write_named(&mut self, key: &str, tag: &Nbt) -> Result<(), NbtError> {
        self.inner.write_java_byte(TagType::of(tag) as i8)?;
        self.inner.write_java_string8(key)?;
        self.write_payload(tag)
    }

    fn write_payload(&mut self, tag: &Nbt) -> Result<(), NbtError> {

        match tag {
            Nbt::Byte(n) => self.inner.write_java_byte(*n)?,
            Nbt::Short(n) => self.inner.write_java_short(*n)?,
            Nbt::Int(n) => self.inner.write_java_int(*n)?,
            Nbt::Long(n) => self.inner.write_java_long(*n)?,
            Nbt::Float(n) => self.inner.write_java_float(*n)?,
            Nbt::Double(n) => self.inner.write_java_double(*n)?,
            Nbt::ByteArray(buf) => self.write_byte_array(buf)?,
            Nbt::String(string) => self.inner.write_java_string8(string)?,
            Nbt::ListByte(list) => self.write_list(TagType::Byte, list, |w, &n| Ok(w.inner.write_java_byte(n)?))?,
            Nbt::ListShort(list) => self.write_list(TagType::Short, list, |w, &n| Ok(w.inner.write_java_short(n)?))?,
            Nbt::ListInt(list) => self.write_list(TagType::Int, list, |w, &n| Ok(w.inner.write_java_int(n)?))?,
            Nbt::ListLong(list) => self.write_list(TagType::Long, list, |w, &n| Ok(w.inner.write_java_long(n)?))?,
            Nbt::ListFloat(list) => self.write_list(TagType::Float, list, |w, &n| Ok(w.inner.write_java_float(n)?))?,
            Nbt::ListDouble(list) => self.write_list(TagType::Double, list, |w, &n| Ok(w.inner.write_java_double(n)?))?,
            Nbt::ListByteArray(list) => self.write_list(TagType::ByteArray, list, |w, buf| w.write_byte_array(buf))?,
            Nbt::ListString(list) => self.write_list(TagType::String, list, |w, string| Ok(w.inner.write_java_string8(string)?))?,
            Nbt::ListCompound(list) => self.write_list(TagType::Compound, list, Self::write_compound)?,
            Nbt::Compound(compound) => self.write_compound(compound)?,
        }

        Ok(())

    }

    fn write_list<T>(&mut self, ty: TagType, list: &[T], mut func: impl FnMut(&mut Self, &T) -> Result<(), NbtError>) -> Result<(), NbtError> {
        self.inner.write_java_byte(ty as i8)?;
        self.write_len(list.len())?;
        list.iter().try_for_each(|item| func(self, item))
    }

    fn write_byte_array(&mut self, buf: &[u8]) -> Result<(), NbtError> {
        self.write_len(buf.len())?;
        self.inner.write_all(buf)?;
        Ok(())
    }

    fn write_compound(&mut self, compound: &NbtCompound) -> Result<(), NbtError> {
        for (key, tag) in &compound.inner {
            self.write_named(key, tag)?;
        }
        self.inner.write_java_byte(TagType::End as i8)?;
        Ok(())
    }

}


/// Basic methods to interpret a tag as its inner type if possible.
impl Nbt {

    #[inline]
    pub fn as_boolean(&self) -> Option<bool> {
        self.as_byte().map(|b| b != 0)
    }

    #[inline]
    pub fn as_byte(&self) -> Option<i8> {
        match *self {
            Self::Byte(n) => Some(n),
            _ => None
        }
    }

    #[inline]
    pub fn as_short(&self) -> Option<i16> {
        match *self {
            Self::Short(n) => Some(n),
            _ => None
        }
    }

    #[inline]
    pub fn as_int(&self) -> Option<i32> {
        match *self {
            Self::Int(n) => Some(n),
            _ => None
        }
    }

    #[inline]
    pub fn as_long(&self) -> Option<i64> {
        match *self {
            Self::Long(n) => Some(n),
            _ => None
        }
    }

    #[inline]
    pub fn as_float(&self) -> Option<f32> {
        match *self {
            Self::Float(n) => Some(n),
            _ => None
        }
    }

    #[inline]
    pub fn as_double(&self) -> Option<f64> {
        match *self {
            Self::Double(n) => Some(n),
            _ => None
        }
    }

    #[inline]
    pub fn as_byte_array(&self) -> Option<&[u8]> {
        match self {
            Self::ByteArray(buf) => Some(&buf[..]),
            _ => None
        }
    }

    #[inline]
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(string) => Some(string.as_str()),
            _ => None
        }
    }

    /// Interpret this tag as a list of strings. An empty list of any element type is
    /// also accepted because the element type of empty lists is not meaningful.
    #[inline]
    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            Self::ListString(list) => Some(&list[..]),
            _ if self.is_empty_list() => Some(&[]),
            _ => None
        }
    }

    /// Interpret this tag as a list of compounds, with the same rule as
    /// [`Self::as_string_list`] for empty lists.
    #[inline]
    pub fn as_compound_list(&self) -> Option<&[NbtCompound]> {
        match self {
            Self::ListCompound(list) => Some(&list[..]),
            _ if self.is_empty_list() => Some(&[]),
            _ => None
        }
    }

    #[inline]
    pub fn as_compound(&self) -> Option<&NbtCompound> {
        match self {
            Self::Compound(comp) => Some(comp),
            _ => None
        }
    }

    /// Return the number of elements if this tag is a list.
    pub fn list_len(&self) -> Option<usize> {
        Some(match self {
            Self::ListByte(list) => list.len(),
            Self::ListShort(list) => list.len(),
            Self::ListInt(list) => list.len(),
            Self::ListLong(list) => list.len(),
            Self::ListFloat(list) => list.len(),
            Self::ListDouble(list) => list.len(),
            Self::ListByteArray(list) => list.len(),
            Self::ListString(list) => list.len(),
            Self::ListCompound(list) => list.len(),
            _ => return None,
        })
    }

    #[inline]
    fn is_empty_list(&self) -> bool {
        self.list_len() == Some(0)
    }

}

/// Basic methods to create and manage keys in a compound.
impl NbtCompound {

    pub fn new() -> Self {
        Self { inner: IndexMap::new() }
    }

    /// Insert a tag in this compound, replacing any previous tag with the same key but
    /// keeping the position of the previous key.
    #[inline]
    pub fn insert(&mut self, key: impl Into<String>, tag: impl Into<Nbt>) {
        self.inner.insert(key.into(), tag.into());
    }

    /// Insert every tag of the other compound into this one, tags of the other
    /// compound replace the ones with the same key in this compound.
    pub fn merge(&mut self, other: NbtCompound) {
        self.inner.extend(other.inner);
    }

    #[inline]
    pub fn remove(&mut self, key: &str) -> Option<Nbt> {
        self.inner.shift_remove(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Iterate over all keys and tags in insertion order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Nbt)> + '_ {
        self.inner.iter().map(|(key, tag)| (key.as_str(), tag))
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Nbt> {
        self.inner.get(key)
    }

    #[inline]
    pub fn get_boolean(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Nbt::as_boolean)
    }

    #[inline]
    pub fn get_byte(&self, key: &str) -> Option<i8> {
        self.get(key).and_then(Nbt::as_byte)
    }

    #[inline]
    pub fn get_short(&self, key: &str) -> Option<i16> {
        self.get(key).and_then(Nbt::as_short)
    }

    #[inline]
    pub fn get_int(&self, key: &str) -> Option<i32> {
        self.get(key).and_then(Nbt::as_int)
    }

    #[inline]
    pub fn get_long(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Nbt::as_long)
    }

    #[inline]
    pub fn get_float(&self, key: &str) -> Option<f32> {
        self.get(key).and_then(Nbt::as_float)
    }

    #[inline]
    pub fn get_double(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Nbt::as_double)
    }

    #[inline]
    pub fn get_byte_array(&self, key: &str) -> Option<&[u8]> {
        self.get(key).and_then(Nbt::as_byte_array)
    }

    #[inline]
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Nbt::as_string)
    }

    #[inline]
    pub fn get_string_list(&self, key: &str) -> Option<&[String]> {
        self.get(key).and_then(Nbt::as_string_list)
    }

    #[inline]
    pub fn get_compound_list(&self, key: &str) -> Option<&[NbtCompound]> {
        self.get(key).and_then(Nbt::as_compound_list)
    }

    #[inline]
    pub fn get_compound(&self, key: &str) -> Option<&NbtCompound> {
        self.get(key).and_then(Nbt::as_compound)
    }

}

impl IntoIterator for NbtCompound {

    type Item = (String, Nbt);
    type IntoIter = indexmap::map::IntoIter<String, Nbt>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }

}


macro_rules! impl_from {
    ( $( $ty:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$ty> for Nbt {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from! {
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    Vec<u8> => ByteArray,
    String => String,
    Vec<i8> => ListByte,
    Vec<i16> => ListShort,
    Vec<i32> => ListInt,
    Vec<i64> => ListLong,
    Vec<f32> => ListFloat,
    Vec<f64> => ListDouble,
    Vec<Vec<u8>> => ListByteArray,
    Vec<String> => ListString,
    Vec<NbtCompound> => ListCompound,
    NbtCompound => Compound,
}

impl From<bool> for Nbt {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Byte(value as i8)
    }
}

impl From<&str> for Nbt {
    #[inline]
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}


/// Manual debug implement to shrink the potential huge byte arrays.
impl fmt::Debug for Nbt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte(n) => f.debug_tuple("Byte").field(n).finish(),
            Self::Short(n) => f.debug_tuple("Short").field(n).finish(),
            Self::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Self::Long(n) => f.debug_tuple("Long").field(n).finish(),
            Self::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Self::Double(n) => f.debug_tuple("Double").field(n).finish(),
            Self::ByteArray(buf) => {
                f.debug_tuple("ByteArray")
                    .field(&format_args!("({}) {:X?}...", buf.len(), &buf[..buf.len().min(10)]))
                    .finish()
            }
            Self::String(string) => f.debug_tuple("String").field(string).finish(),
            Self::ListByte(list) => f.debug_tuple("ListByte").field(list).finish(),
            Self::ListShort(list) => f.debug_tuple("ListShort").field(list).finish(),
            Self::ListInt(list) => f.debug_tuple("ListInt").field(list).finish(),
            Self::ListLong(list) => f.debug_tuple("ListLong").field(list).finish(),
            Self::ListFloat(list) => f.debug_tuple("ListFloat").field(list).finish(),
            Self::ListDouble(list) => f.debug_tuple("ListDouble").field(list).finish(),
            Self::ListByteArray(list) => {
                f.debug_tuple("ListByteArray")
                    .field(&format_args!("({} arrays)", list.len()))
                    .finish()
            }
            Self::ListString(list) => f.debug_tuple("ListString").field(list).finish(),
            Self::ListCompound(list) => f.debug_tuple("ListCompound").field(list).finish(),
            Self::Compound(compound) => f.debug_tuple("Compound").field(compound).finish(),
        }
    }
}

impl fmt::Debug for NbtCompound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.inner.iter()).finish()
    }
}


/// Error type returned when reading or writing the binary form of NBT.
#[derive(thiserror::Error, Debug)]
pub enum NbtError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("Illegal tag type.")]
    IllegalTagType,
    #[error("Illegal decoded length.")]
    IllegalLength,
    #[error("Tag nesting is too deep.")]
    TooDeep,
}


#[cfg(test)]
mod tests {

    use super::*;

    fn sample() -> NbtCompound {

        let mut display = NbtCompound::new();
        display.insert("Name", "Trusty Pick");
        display.insert("Lore", vec!["first".to_string(), "second".to_string()]);

        let mut ench = NbtCompound::new();
        ench.insert("id", 15i16);
        ench.insert("lvl", 3i16);

        let mut tag = NbtCompound::new();
        tag.insert("display", display);
        tag.insert("ench", vec![ench]);
        tag.insert("RepairCost", 4i32);

        let mut root = NbtCompound::new();
        root.insert("Name", "minecraft:iron_pickaxe");
        root.insert("Count", 1i8);
        root.insert("Damage", 0i16);
        root.insert("tag", tag);
        root

    }

    #[test]
    fn binary_round_trip() {

        let root = sample();

        let mut buf = Vec::new();
        to_writer(&mut buf, "", &Nbt::Compound(root.clone())).unwrap();

        let (key, tag) = from_reader(&buf[..]).unwrap();
        assert_eq!(key, "");
        assert_eq!(tag.as_compound(), Some(&root));

    }

    #[test]
    fn binary_layout() {

        let mut root = NbtCompound::new();
        root.insert("b", 5i8);

        let mut buf = Vec::new();
        to_writer(&mut buf, "", &Nbt::Compound(root)).unwrap();
        assert_eq!(buf, [10, 0, 0, 1, 0, 1, b'b', 5, 0]);

    }

    #[test]
    fn empty_end_list() {

        let buf = [10, 0, 0, 9, 0, 1, b'l', 0, 0, 0, 0, 0, 0];
        let (_, tag) = from_reader(&buf[..]).unwrap();
        let root = tag.as_compound().unwrap();
        assert_eq!(root.get("l"), Some(&Nbt::ListByte(vec![])));
        assert_eq!(root.get_string_list("l"), Some(&[][..]));
        assert_eq!(root.get_compound_list("l"), Some(&[][..]));

        let buf = [10, 0, 0, 9, 0, 1, b'l', 0, 0, 0, 0, 1, 0];
        assert!(matches!(from_reader(&buf[..]), Err(NbtError::IllegalTagType)));

    }

    #[test]
    fn illegal_inputs() {

        // Direct end tag.
        assert!(matches!(from_reader(&[0u8][..]), Err(NbtError::IllegalTagType)));
        // Negative byte array length.
        let buf = [7, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF];
        assert!(matches!(from_reader(&buf[..]), Err(NbtError::IllegalLength)));
        // Truncated input.
        let buf = [7, 0, 0, 0, 0, 0, 4, 1, 2];
        assert!(matches!(from_reader(&buf[..]), Err(NbtError::Io(_))));
        // List of lists.
        let buf = [9, 0, 0, 9, 0, 0, 0, 1];
        assert!(matches!(from_reader(&buf[..]), Err(NbtError::IllegalTagType)));

    }

    #[test]
    fn nesting_depth() {

        fn nested_compounds(count: usize) -> Vec<u8> {
            let mut buf = vec![10, 0, 0];
            for _ in 1..count {
                buf.extend_from_slice(&[10, 0, 0]);
            }
            buf.extend(std::iter::repeat_n(0, count));
            buf
        }

        assert!(from_reader(&nested_compounds(MAX_DEPTH)[..]).is_ok());
        assert!(matches!(from_reader(&nested_compounds(MAX_DEPTH + 1)[..]), Err(NbtError::TooDeep)));

        // Compounds inside a list count as one more level.
        let buf = [10, 0, 0, 9, 0, 1, b'l', 10, 0, 0, 0, 1, 0, 0];
        let (_, tag) = from_reader(&buf[..]).unwrap();
        assert_eq!(tag.as_compound().and_then(|c| c.get_compound_list("l")).map(<[_]>::len), Some(1));

    }

    #[test]
    fn compound_equality_ignores_order() {

        let mut a = NbtCompound::new();
        a.insert("x", 1i8);
        a.insert("y", 2i8);

        let mut b = NbtCompound::new();
        b.insert("y", 2i8);
        b.insert("x", 1i8);

        assert_eq!(a, b);
        assert_ne!(a.iter().map(|(k, _)| k).collect::<Vec<_>>(), b.iter().map(|(k, _)| k).collect::<Vec<_>>());

    }

    #[test]
    fn merge_overwrites() {

        let mut a = NbtCompound::new();
        a.insert("keep", 1i32);
        a.insert("display", "custom");

        let mut b = NbtCompound::new();
        b.insert("display", NbtCompound::new());

        a.merge(b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.get_int("keep"), Some(1));
        assert!(a.get_compound("display").is_some());

    }

    #[test]
    fn typed_getters() {

        let root = sample();
        assert_eq!(root.get_string("Name"), Some("minecraft:iron_pickaxe"));
        assert_eq!(root.get_short("Name"), None);
        assert_eq!(root.get_byte("Count"), Some(1));
        assert_eq!(root.get_short("Count"), None);
        assert_eq!(root.get_string_list("Damage"), None);

        let tag = root.get_compound("tag").unwrap();
        assert_eq!(tag.get_compound_list("ench").map(<[_]>::len), Some(1));
        assert_eq!(tag.get_string_list("ench"), None);

    }

}
