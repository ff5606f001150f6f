//! Contains all meta data attributes.
//! Each header can have any number of attributes, each with one of the known types.

use smallvec::SmallVec;
use bit_field::BitField;
use std::borrow::Borrow;
use std::convert::TryFrom;
use std::fmt;

use crate::io::*;
use crate::error::*;
use crate::math::{RoundingMode, Vec2, Vec3};


/// Contains one of all possible attributes.
/// There is no variant for unknown attribute types,
/// as those abort reading the header instead.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {

    /// Channel meta data.
    ChannelList(ChannelList),

    /// Color space definition.
    Chromaticities(Chromaticities),

    /// Compression method of the pixel data.
    Compression(Compression),

    /// This image is an environment map.
    EnvironmentMap(EnvironmentMap),

    /// Film roll information.
    KeyCode(KeyCode),

    /// Order of the blocks in the file.
    LineOrder(LineOrder),

    /// A 3x3 matrix of floats.
    Matrix3x3(Matrix3x3),

    /// A 4x4 matrix of floats.
    Matrix4x4(Matrix4x4),

    /// 8-bit rgba Preview of the image.
    Preview(Preview),

    /// An integer dividend and divisor.
    Rational(Rational),

    /// List of texts.
    TextVector(Vec<Text>),

    /// How to tile up the image.
    TileDescription(TileDescription),

    /// Timepoint and more.
    TimeCode(TimeCode),

    /// A string of bytes, usually UTF-8.
    Text(Text),

    /// 64-bit float
    F64(f64),

    /// 32-bit float
    F32(f32),

    /// 32-bit signed integer
    I32(i32),

    /// 2D integer rectangle.
    IntegerBounds(IntegerBounds),

    /// 2D float rectangle.
    FloatRect(FloatRect),

    /// 2D integer vector.
    IntVec2(Vec2<i32>),

    /// 2D float vector.
    FloatVec2(Vec2<f32>),

    /// 3D integer vector.
    IntVec3(Vec3<i32>),

    /// 3D float vector.
    FloatVec3(Vec3<f32>),
}

/// The type of an attribute, as announced by the type name in the file.
/// Every variant corresponds to exactly one `AttributeValue` variant.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum AttributeKind {

    /// `box2i`
    IntegerBounds,

    /// `box2f`
    FloatRect,

    /// `chlist`
    ChannelList,

    /// `chromaticities`
    Chromaticities,

    /// `compression`
    Compression,

    /// `double`
    F64,

    /// `envmap`
    EnvironmentMap,

    /// `float`
    F32,

    /// `int`
    I32,

    /// `keycode`
    KeyCode,

    /// `lineOrder`
    LineOrder,

    /// `m33f`
    Matrix3x3,

    /// `m44f`
    Matrix4x4,

    /// `preview`
    Preview,

    /// `rational`
    Rational,

    /// `string`
    Text,

    /// `stringvector`
    TextVector,

    /// `tiledesc`
    TileDescription,

    /// `timecode`
    TimeCode,

    /// `v2i`
    IntVec2,

    /// `v2f`
    FloatVec2,

    /// `v3i`
    IntVec3,

    /// `v3f`
    FloatVec3,
}

/// A byte array with each byte being a char, usually UTF-8.
/// Attribute names and type names are always texts.
#[derive(Clone, PartialEq, Eq, Ord, PartialOrd, Default, Hash)]
pub struct Text {
    bytes: TextBytes,
}

/// A text that was read up to its null-terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullTerminated {

    /// The text, without the null-terminator.
    pub text: Text,

    /// How many bytes were consumed, including the null-terminator if it was found.
    pub byte_size: usize,

    /// False if the maximum length was reached before a null-terminator was found.
    /// In that case, the byte source is positioned in the middle of the text.
    pub terminated: bool,
}

/// The raw bytes that make up a string in an exr file.
/// Each `u8` is a single char.
// will mostly be "R", "G", "B" or "dataWindow"
pub type TextBytes = SmallVec<[u8; 24]>;

/// A byte slice, interpreted as text.
pub type TextSlice = [u8];

/// An integer dividend and divisor, together forming a ratio.
pub type Rational = (i32, u32);

/// A float matrix with four rows and four columns, row-major.
pub type Matrix4x4 = [f32; 4*4];

/// A float matrix with three rows and three columns, row-major.
pub type Matrix3x3 = [f32; 3*3];

/// The integer rectangle describing where the pixels are placed in the infinite 2D global space.
pub type DataWindow = IntegerBounds;

/// The integer rectangle limiting which part of the infinite 2D global space should be displayed.
pub type DisplayWindow = IntegerBounds;


/// A rectangular section anywhere in 2D integer space.
/// Both corners are inclusive, exactly as stored in the file.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default, Hash)]
pub struct IntegerBounds {

    /// The top left corner, `(xMin, yMin)`.
    pub min: Vec2<i32>,

    /// The bottom right corner, `(xMax, yMax)`, inclusive.
    pub max: Vec2<i32>,
}

/// A rectangular section anywhere in 2D float space.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FloatRect {

    /// The top left corner location of the rectangle (inclusive)
    pub min: Vec2<f32>,

    /// The bottom right corner location of the rectangle (inclusive)
    pub max: Vec2<f32>
}

/// A list of channels, in the order they appear in the file.
/// Conforming files store them sorted alphabetically by name.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct ChannelList {

    /// The channels in this list.
    pub list: SmallVec<[ChannelDescription; 5]>,
}

/// A single channel in an image.
/// Does not contain the actual pixel data,
/// but instead merely describes it.
/// Keeps the integer values exactly as stored.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ChannelDescription {

    /// One of "R", "G", or "B" most of the time.
    pub name: Text,

    /// `0` for u32, `1` for f16, `2` for f32. See `sample_type()`.
    pub pixel_type: i32,

    /// Whether lossy compression should quantize this channel linearly.
    /// `0` or `1` in conforming files.
    pub p_linear: u8,

    /// Three bytes that should be zero.
    pub reserved: [u8; 3],

    /// How many of the samples are skipped compared to the other channels in this image.
    pub sampling: Vec2<i32>,
}

/// The type of samples in a channel.
#[derive(Clone, Debug, Eq, PartialEq, Copy, Hash)]
pub enum SampleType {

    /// This channel contains 32-bit unsigned int values.
    U32,

    /// This channel contains 16-bit float values.
    F16,

    /// This channel contains 32-bit float values.
    F32,
}

/// The color space of the pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chromaticities {

    /// "Red" location on the CIE XY chromaticity diagram.
    pub red: Vec2<f32>,

    /// "Green" location on the CIE XY chromaticity diagram.
    pub green: Vec2<f32>,

    /// "Blue" location on the CIE XY chromaticity diagram.
    pub blue: Vec2<f32>,

    /// "White" location on the CIE XY chromaticity diagram.
    pub white: Vec2<f32>
}

/// How the pixel data is compressed.
/// Only the compression methods known to the first file format version are named,
/// any other byte is kept as `Unknown`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Compression {

    /// `NO_COMPRESSION`
    Uncompressed,

    /// `RLE_COMPRESSION`
    RLE,

    /// `ZIPS_COMPRESSION`, a single scan line per block.
    ZIPS,

    /// `ZIP_COMPRESSION`, sixteen scan lines per block.
    ZIP,

    /// `PIZ_COMPRESSION`
    PIZ,

    /// `PXR24_COMPRESSION`
    PXR24,

    /// `B44_COMPRESSION`
    B44,

    /// `B44A_COMPRESSION`
    B44A,

    /// Any other byte value.
    Unknown(u8),
}

/// If this attribute is present, it describes
/// how this texture should be projected onto an environment.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum EnvironmentMap {

    /// This image is an environment map projected like a world map.
    LatitudeLongitude,

    /// This image contains the six sides of a cube.
    Cube,

    /// Any other byte value.
    Unknown(u8),
}

/// Uniquely identifies a motion picture film frame.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct KeyCode {

    /// Identifies a film manufacturer.
    pub film_manufacturer_code: i32,

    /// Identifies a film type.
    pub film_type: i32,

    /// Specifies the film roll prefix.
    pub film_roll_prefix: i32,

    /// Specifies the film count.
    pub count: i32,

    /// Specifies the perforation offset.
    pub perforation_offset: i32,

    /// Specifies the perforation count of each single frame.
    pub perforations_per_frame: i32,

    /// Specifies the perforation count of each single film.
    pub perforations_per_count: i32,
}

/// In what order the blocks of pixel data appear in a file.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum LineOrder {

    /// `INCREASING_Y`
    Increasing,

    /// `DECREASING_Y`
    Decreasing,

    /// `RANDOM_Y`, the blocks are not ordered in a specific way inside the file.
    Unspecified,

    /// Any other byte value.
    Unknown(u8),
}

/// A small `rgba` image of `u8` values that approximates the real exr image.
#[derive(Clone, Eq, PartialEq)]
pub struct Preview {

    /// The dimensions of the preview image.
    pub size: Vec2<u32>,

    /// An array with a length of 4 × width × height.
    /// Each pixel consists of the four `u8` values red, green, blue, alpha.
    pub pixel_data: Vec<u8>,
}

/// Describes how the image is divided into tiles.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct TileDescription {

    /// The size of each tile.
    pub tile_size: Vec2<u32>,

    /// Level mode in the lower four bits, rounding mode in the upper four bits.
    /// See `level_mode()` and `rounding_mode()`.
    pub mode: u8,
}

/// Whether to also store increasingly smaller versions of the original image.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum LevelMode {

    /// Only a single level.
    Singular,

    /// Levels with a similar aspect ratio.
    MipMap,

    /// Levels with all possible aspect ratios.
    RipMap,
}

/// Contains time information for this frame within a sequence,
/// packed as two `u32` values exactly as stored in the file.
///
/// Satisfies the [SMPTE standard 12M-1999](https://en.wikipedia.org/wiki/SMPTE_timecode).
/// The accessor methods unpack the TV60 encoding.
#[derive(Copy, Debug, Clone, Eq, PartialEq, Hash, Default)]
pub struct TimeCode {

    /// Frame, seconds, minutes and hours as binary coded decimals, plus some flags.
    pub time_and_flags: u32,

    /// Eight user-defined groups of four bits each.
    pub user_data: u32,
}


/// Contains string literals identifying the type of an attribute.
pub mod type_names {
    macro_rules! define_attribute_type_names {
        ( $($name: ident : $value: expr),* ) => {
            $(
                /// The byte-string name of this attribute type as it appears in an exr file.
                pub const $name: &'static [u8] = $value;
            )*
        };
    }

    define_attribute_type_names! {
        I32BOX2:        b"box2i",
        F32BOX2:        b"box2f",
        I32:            b"int",
        F32:            b"float",
        F64:            b"double",
        RATIONAL:       b"rational",
        TIME_CODE:      b"timecode",
        I32VEC2:        b"v2i",
        F32VEC2:        b"v2f",
        I32VEC3:        b"v3i",
        F32VEC3:        b"v3f",
        CHANNEL_LIST:   b"chlist",
        CHROMATICITIES: b"chromaticities",
        COMPRESSION:    b"compression",
        ENVIRONMENT_MAP:b"envmap",
        KEY_CODE:       b"keycode",
        LINE_ORDER:     b"lineOrder",
        F32MATRIX3X3:   b"m33f",
        F32MATRIX4X4:   b"m44f",
        PREVIEW:        b"preview",
        TEXT:           b"string",
        TEXT_VECTOR:    b"stringvector",
        TILES:          b"tiledesc"
    }
}


impl Text {

    /// Create a `Text` from a slice of bytes,
    /// without checking any of the bytes.
    pub fn from_slice_unchecked(text: &TextSlice) -> Self {
        Self::from_bytes_unchecked(SmallVec::from_slice(text))
    }

    /// Create a `Text` from the specified bytes object,
    /// without checking any of the bytes.
    pub fn from_bytes_unchecked(bytes: TextBytes) -> Self {
        Text { bytes }
    }

    /// The internal bytes this text is made of.
    pub fn as_slice(&self) -> &TextSlice {
        self.bytes.as_slice()
    }

    /// The text as a string slice, if it is valid UTF-8.
    pub fn to_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_slice()).ok()
    }

    /// Number of bytes in this text, excluding any terminator.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether this text contains no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Compare this `Text` with a plain `&str`.
    pub fn eq(&self, string: &str) -> bool {
        self.as_slice() == string.as_bytes()
    }

    /// Returns an error if this text is not valid UTF-8.
    pub fn validate_utf8(&self, purpose: &'static str) -> UnitResult {
        match self.to_str() {
            Some(_) => Ok(()),
            None => Err(Error::malformed(purpose)),
        }
    }

    /// Read bytes one by one until the null-terminator is found, which is consumed but not included.
    /// Stops early, leaving the terminator unread, once `max_bytes` bytes were scanned without finding it.
    pub fn read_null_terminated(read: &mut impl Read, max_bytes: usize) -> Result<NullTerminated> {
        let mut bytes = TextBytes::new();
        let mut byte_size = 0;

        while byte_size < max_bytes {
            let byte = u8::read(read)?;
            byte_size += 1;

            if byte == 0 {
                return Ok(NullTerminated { text: Text { bytes }, byte_size, terminated: true });
            }

            bytes.push(byte);
        }

        Ok(NullTerminated { text: Text { bytes }, byte_size, terminated: false })
    }

    /// Read the contents with that length.
    pub fn read_sized(read: &mut impl Read, size: usize) -> Result<Self> {
        const SMALL_SIZE: usize  = 24;

        // for small strings, read into small vec without heap allocation
        if size <= SMALL_SIZE {
            let mut buffer = [0_u8; SMALL_SIZE];
            let data = &mut buffer[..size];

            read.read_exact(data)?;
            Ok(Text::from_slice_unchecked(data))
        }

        // for large strings, read a dynamic vec of arbitrary size
        else {
            Ok(Text::from_bytes_unchecked(SmallVec::from_vec(u8::read_vec(read, size, 1024, None, "text attribute length")?)))
        }
    }

    /// Read texts, each prefixed with its i32 byte length,
    /// until all bytes of the attribute are consumed.
    fn read_vec_of_i32_sized(bytes: &mut &[u8]) -> Result<Vec<Text>> {
        let mut result = Vec::with_capacity(2);

        while !bytes.is_empty() {
            let size = i32_to_usize(i32::read(bytes)?, "negative text length in text vector")?;

            if size > bytes.len() {
                return Err(Error::malformed("text in text vector exceeds attribute size"));
            }

            result.push(Text::read_sized(bytes, size)?);
        }

        Ok(result)
    }
}

impl PartialEq<str> for Text {
    fn eq(&self, other: &str) -> bool {
        Text::eq(self, other)
    }
}

impl PartialEq<&str> for Text {
    fn eq(&self, other: &&str) -> bool {
        Text::eq(self, other)
    }
}

impl PartialEq<Text> for str {
    fn eq(&self, other: &Text) -> bool {
        other.eq(self)
    }
}

impl Borrow<TextSlice> for Text {
    fn borrow(&self) -> &TextSlice {
        self.as_slice()
    }
}

impl AsRef<[u8]> for Text {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl<'s> From<&'s str> for Text {
    fn from(str: &'s str) -> Self {
        Self::from_slice_unchecked(str.as_bytes())
    }
}

impl From<Text> for String {
    fn from(text: Text) -> Self {
        text.to_string()
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "Text({:?})", String::from_utf8_lossy(self.as_slice()))
    }
}

// automatically implements to_string for us
impl fmt::Display for Text {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&String::from_utf8_lossy(self.as_slice()))
    }
}


impl AttributeKind {

    /// Every attribute type this crate can decode.
    pub const ALL: [AttributeKind; 23] = [
        AttributeKind::IntegerBounds, AttributeKind::FloatRect, AttributeKind::ChannelList,
        AttributeKind::Chromaticities, AttributeKind::Compression, AttributeKind::F64,
        AttributeKind::EnvironmentMap, AttributeKind::F32, AttributeKind::I32,
        AttributeKind::KeyCode, AttributeKind::LineOrder, AttributeKind::Matrix3x3,
        AttributeKind::Matrix4x4, AttributeKind::Preview, AttributeKind::Rational,
        AttributeKind::Text, AttributeKind::TextVector, AttributeKind::TileDescription,
        AttributeKind::TimeCode, AttributeKind::IntVec2, AttributeKind::FloatVec2,
        AttributeKind::IntVec3, AttributeKind::FloatVec3,
    ];

    /// The type name that identifies this kind in a file.
    pub fn type_name(self) -> &'static [u8] {
        use self::type_names as ty;
        use self::AttributeKind::*;

        match self {
            IntegerBounds => ty::I32BOX2,
            FloatRect => ty::F32BOX2,
            ChannelList => ty::CHANNEL_LIST,
            Chromaticities => ty::CHROMATICITIES,
            Compression => ty::COMPRESSION,
            F64 => ty::F64,
            EnvironmentMap => ty::ENVIRONMENT_MAP,
            F32 => ty::F32,
            I32 => ty::I32,
            KeyCode => ty::KEY_CODE,
            LineOrder => ty::LINE_ORDER,
            Matrix3x3 => ty::F32MATRIX3X3,
            Matrix4x4 => ty::F32MATRIX4X4,
            Preview => ty::PREVIEW,
            Rational => ty::RATIONAL,
            Text => ty::TEXT,
            TextVector => ty::TEXT_VECTOR,
            TileDescription => ty::TILES,
            TimeCode => ty::TIME_CODE,
            IntVec2 => ty::I32VEC2,
            FloatVec2 => ty::F32VEC2,
            IntVec3 => ty::I32VEC3,
            FloatVec3 => ty::F32VEC3,
        }
    }

    /// Look up the kind for a type name. Case sensitive.
    pub fn from_type_name(type_name: &TextSlice) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.type_name() == type_name)
    }

    /// The number of bytes a value of this kind always occupies,
    /// or `None` if it depends on the data.
    pub fn byte_size(self) -> Option<usize> {
        use self::AttributeKind::*;

        match self {
            IntegerBounds => Some(4 * i32::BYTE_SIZE),
            FloatRect => Some(4 * f32::BYTE_SIZE),
            Chromaticities => Some(8 * f32::BYTE_SIZE),
            Compression | EnvironmentMap | LineOrder => Some(u8::BYTE_SIZE),
            F64 => Some(f64::BYTE_SIZE),
            F32 => Some(f32::BYTE_SIZE),
            I32 => Some(i32::BYTE_SIZE),
            KeyCode => Some(7 * i32::BYTE_SIZE),
            Matrix3x3 => Some(9 * f32::BYTE_SIZE),
            Matrix4x4 => Some(16 * f32::BYTE_SIZE),
            Rational => Some(i32::BYTE_SIZE + u32::BYTE_SIZE),
            TileDescription => Some(2 * u32::BYTE_SIZE + u8::BYTE_SIZE),
            TimeCode => Some(2 * u32::BYTE_SIZE),
            IntVec2 => Some(2 * i32::BYTE_SIZE),
            FloatVec2 => Some(2 * f32::BYTE_SIZE),
            IntVec3 => Some(3 * i32::BYTE_SIZE),
            FloatVec3 => Some(3 * f32::BYTE_SIZE),
            ChannelList | Text | TextVector | Preview => None,
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&String::from_utf8_lossy(self.type_name()))
    }
}


impl IntegerBounds {

    /// Create a rectangle from inclusive corner coordinates.
    pub fn new(min: impl Into<Vec2<i32>>, max: impl Into<Vec2<i32>>) -> Self {
        Self { min: min.into(), max: max.into() }
    }

    /// Read the value without validating.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        let x_min = i32::read(read)?;
        let y_min = i32::read(read)?;
        let x_max = i32::read(read)?;
        let y_max = i32::read(read)?;

        Ok(IntegerBounds { min: Vec2(x_min, y_min), max: Vec2(x_max, y_max) })
    }

    /// The number of pixels inside this rectangle in each dimension.
    /// Returns `None` if the maximum is smaller than the minimum.
    pub fn size(&self) -> Option<Vec2<usize>> {
        // compute in i64 to prevent overflow
        let width = i64::from(self.max.x()) - i64::from(self.min.x()) + 1;
        let height = i64::from(self.max.y()) - i64::from(self.min.y()) + 1;

        let width = usize::try_from(width).ok()?;
        let height = usize::try_from(height).ok()?;
        Some(Vec2(width, height))
    }
}

impl FloatRect {

    /// Read the value without validating.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        let x_min = f32::read(read)?;
        let y_min = f32::read(read)?;
        let x_max = f32::read(read)?;
        let y_max = f32::read(read)?;

        Ok(FloatRect {
            min: Vec2(x_min, y_min),
            max: Vec2(x_max, y_max)
        })
    }
}

impl SampleType {

    /// How many bytes a single sample takes up.
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            SampleType::F16 => 2,
            SampleType::F32 => f32::BYTE_SIZE,
            SampleType::U32 => u32::BYTE_SIZE,
        }
    }

    /// Interpret the pixel type integer of a channel.
    pub fn from_pixel_type(pixel_type: i32) -> Option<Self> {
        match pixel_type {
            0 => Some(SampleType::U32),
            1 => Some(SampleType::F16),
            2 => Some(SampleType::F32),
            _ => None,
        }
    }
}

impl ChannelDescription {

    /// The sample type, if the pixel type is one of the three known values.
    pub fn sample_type(&self) -> Option<SampleType> {
        SampleType::from_pixel_type(self.pixel_type)
    }

    /// Whether lossy compression should quantize this channel linearly.
    pub fn quantize_linearly(&self) -> bool {
        self.p_linear != 0
    }

    /// Read everything after the channel name, which was already read by the channel list.
    fn read_with_name(name: Text, read: &mut impl Read) -> Result<Self> {
        let pixel_type = i32::read(read)?;
        let p_linear = u8::read(read)?;

        let mut reserved = [0_u8; 3];
        u8::read_slice(read, &mut reserved)?;

        let x_sampling = i32::read(read)?;
        let y_sampling = i32::read(read)?;

        Ok(ChannelDescription {
            name, pixel_type, p_linear, reserved,
            sampling: Vec2(x_sampling, y_sampling),
        })
    }
}

impl ChannelList {

    /// Read channels until an empty channel name or the end of the attribute bytes.
    /// The slice must contain exactly the bytes of this attribute.
    pub fn read(bytes: &mut &[u8], max_name_bytes: usize) -> Result<Self> {
        let mut list = SmallVec::new();

        while !bytes.is_empty() {
            let name = Text::read_null_terminated(bytes, max_name_bytes)?;

            if !name.terminated {
                return Err(Error::malformed("channel name too long"));
            }

            if name.text.is_empty() {
                break;
            }

            list.push(ChannelDescription::read_with_name(name.text, bytes)?);
        }

        Ok(ChannelList { list })
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether there are no channels.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Iterate over the channels in file order.
    pub fn iter(&self) -> impl Iterator<Item = &ChannelDescription> {
        self.list.iter()
    }

    /// Find the first channel with exactly this name, case sensitive.
    pub fn find(&self, exact_name: &str) -> Option<&ChannelDescription> {
        self.list.iter().find(|channel| channel.name.eq(exact_name))
    }

    /// The number of bytes that one pixel in this image needs, ignoring subsampling.
    /// Returns `None` if any channel has an unknown pixel type.
    pub fn bytes_per_pixel(&self) -> Option<usize> {
        self.list.iter()
            .map(|channel| channel.sample_type().map(|sample| sample.bytes_per_sample()))
            .sum()
    }
}

impl Chromaticities {

    /// Read the value without validating.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        Ok(Chromaticities {
            red: Vec2(f32::read(read)?, f32::read(read)?),
            green: Vec2(f32::read(read)?, f32::read(read)?),
            blue: Vec2(f32::read(read)?, f32::read(read)?),
            white: Vec2(f32::read(read)?, f32::read(read)?),
        })
    }
}

impl Compression {

    /// Interpret the byte stored in the file.
    pub fn from_byte(byte: u8) -> Self {
        use self::Compression::*;
        match byte {
            0 => Uncompressed,
            1 => RLE,
            2 => ZIPS,
            3 => ZIP,
            4 => PIZ,
            5 => PXR24,
            6 => B44,
            7 => B44A,
            unknown => Unknown(unknown),
        }
    }

    /// Read the value. Unknown values do not produce an error.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        Ok(Self::from_byte(u8::read(read)?))
    }

    /// The name of this compression method, for example `PIZ_COMPRESSION`.
    pub fn name(self) -> &'static str {
        use self::Compression::*;
        match self {
            Uncompressed => "NO_COMPRESSION",
            RLE => "RLE_COMPRESSION",
            ZIPS => "ZIPS_COMPRESSION",
            ZIP => "ZIP_COMPRESSION",
            PIZ => "PIZ_COMPRESSION",
            PXR24 => "PXR24_COMPRESSION",
            B44 => "B44_COMPRESSION",
            B44A => "B44A_COMPRESSION",
            Unknown(_) => "unknown",
        }
    }
}

impl EnvironmentMap {

    /// Interpret the byte stored in the file.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 => EnvironmentMap::LatitudeLongitude,
            1 => EnvironmentMap::Cube,
            unknown => EnvironmentMap::Unknown(unknown),
        }
    }

    /// Read the value. Unknown values do not produce an error.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        Ok(Self::from_byte(u8::read(read)?))
    }

    /// The name of this projection, for example `ENVMAP_CUBE`.
    pub fn name(self) -> &'static str {
        match self {
            EnvironmentMap::LatitudeLongitude => "ENVMAP_LATLONG",
            EnvironmentMap::Cube => "ENVMAP_CUBE",
            EnvironmentMap::Unknown(_) => "unknown",
        }
    }
}

impl KeyCode {

    /// Read the value without validating.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        Ok(KeyCode {
            film_manufacturer_code: i32::read(read)?,
            film_type: i32::read(read)?,
            film_roll_prefix: i32::read(read)?,
            count: i32::read(read)?,
            perforation_offset: i32::read(read)?,
            perforations_per_frame: i32::read(read)?,
            perforations_per_count: i32::read(read)?,
        })
    }
}

impl LineOrder {

    /// Interpret the byte stored in the file.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 => LineOrder::Increasing,
            1 => LineOrder::Decreasing,
            2 => LineOrder::Unspecified,
            unknown => LineOrder::Unknown(unknown),
        }
    }

    /// Read the value. Unknown values do not produce an error.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        Ok(Self::from_byte(u8::read(read)?))
    }

    /// The name of this line order, for example `INCREASING_Y`.
    pub fn name(self) -> &'static str {
        match self {
            LineOrder::Increasing => "INCREASING_Y",
            LineOrder::Decreasing => "DECREASING_Y",
            LineOrder::Unspecified => "RANDOM_Y",
            LineOrder::Unknown(_) => "unknown",
        }
    }
}

impl Preview {

    /// Read the dimensions, then as many pixels as the dimensions require.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        let components_per_pixel = 4;
        let width = u32::read(read)?;
        let height = u32::read(read)?;

        let byte_count = (width as usize).checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(components_per_pixel))
            .ok_or_else(|| Error::malformed("preview dimensions too large"))?;

        let pixel_data = u8::read_vec(read, byte_count, 1024*1024*4, None, "preview attribute pixel count")?;

        Ok(Preview {
            size: Vec2(width, height),
            pixel_data,
        })
    }
}

impl fmt::Debug for Preview {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "Preview ({}x{} px)", self.size.width(), self.size.height())
    }
}

impl TileDescription {

    /// Read the value without validating.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        let x_size = u32::read(read)?;
        let y_size = u32::read(read)?;
        let mode = u8::read(read)?;

        Ok(TileDescription { tile_size: Vec2(x_size, y_size), mode })
    }

    /// The level mode, stored in the lower four bits of the mode byte.
    // mode = level_mode + (rounding_mode * 16)
    pub fn level_mode(&self) -> Option<LevelMode> {
        match self.mode & 0b0000_1111 {
            0 => Some(LevelMode::Singular),
            1 => Some(LevelMode::MipMap),
            2 => Some(LevelMode::RipMap),
            _ => None,
        }
    }

    /// The rounding mode, stored in the upper four bits of the mode byte.
    pub fn rounding_mode(&self) -> Option<RoundingMode> {
        match self.mode >> 4 {
            0 => Some(RoundingMode::Down),
            1 => Some(RoundingMode::Up),
            _ => None,
        }
    }

    /// How many tiles are needed to cover an image of the specified size,
    /// without considering smaller resolution levels.
    /// Returns `None` for zero-sized tiles.
    pub fn tile_count(&self, image_size: Vec2<usize>) -> Option<Vec2<usize>> {
        let tile_size = self.tile_size.map(|size| size as usize);

        if tile_size.x() == 0 || tile_size.y() == 0 {
            return None;
        }

        // round up, because if the image is not evenly divisible by the tiles,
        // we add another tile at the end (which is only partially used)
        Some(Vec2(
            RoundingMode::Up.divide(image_size.x(), tile_size.x()),
            RoundingMode::Up.divide(image_size.y(), tile_size.y()),
        ))
    }
}

// assumes value fits into u8
fn u8_from_decimal32(coded: u32) -> u8 {
    ((coded & 0x0f) + 10 * ((coded >> 4) & 0x0f)) as u8
}

// https://github.com/AcademySoftwareFoundation/openexr/blob/master/src/lib/OpenEXR/ImfTimeCode.cpp
impl TimeCode {

    /// Read the packed time and user data without validating.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        let time_and_flags = u32::read(read)?;
        let user_data = u32::read(read)?;
        Ok(TimeCode { time_and_flags, user_data })
    }

    /// Hours 0 - 23 are valid.
    pub fn hours(&self) -> u8 { u8_from_decimal32(self.time_and_flags.get_bits(24..30)) }

    /// Minutes 0 - 59 are valid.
    pub fn minutes(&self) -> u8 { u8_from_decimal32(self.time_and_flags.get_bits(16..23)) }

    /// Seconds 0 - 59 are valid.
    pub fn seconds(&self) -> u8 { u8_from_decimal32(self.time_and_flags.get_bits(8..15)) }

    /// Frame indices 0 - 29 are valid.
    pub fn frame(&self) -> u8 { u8_from_decimal32(self.time_and_flags.get_bits(0..6)) }

    /// Whether this is a drop frame.
    pub fn drop_frame(&self) -> bool { self.time_and_flags.get_bit(6) }

    /// Whether this is a color frame.
    pub fn color_frame(&self) -> bool { self.time_and_flags.get_bit(7) }

    /// Field phase.
    pub fn field_phase(&self) -> bool { self.time_and_flags.get_bit(15) }

    /// The eight user-defined groups of four bits each.
    pub fn binary_groups(&self) -> [u8; 8] {
        let mut groups = [0_u8; 8];

        // in rust, group index starts at zero, not at one.
        for (group_index, group) in groups.iter_mut().enumerate() {
            let min_bit = 4 * group_index;
            *group = self.user_data.get_bits(min_bit .. min_bit + 4) as u8;
        }

        groups
    }
}


impl AttributeValue {

    /// The kind of this value, which determines its type name in a file.
    pub fn kind(&self) -> AttributeKind {
        use self::AttributeValue::*;

        match *self {
            IntegerBounds(_) => AttributeKind::IntegerBounds,
            FloatRect(_) => AttributeKind::FloatRect,
            ChannelList(_) => AttributeKind::ChannelList,
            Chromaticities(_) => AttributeKind::Chromaticities,
            Compression(_) => AttributeKind::Compression,
            F64(_) => AttributeKind::F64,
            EnvironmentMap(_) => AttributeKind::EnvironmentMap,
            F32(_) => AttributeKind::F32,
            I32(_) => AttributeKind::I32,
            KeyCode(_) => AttributeKind::KeyCode,
            LineOrder(_) => AttributeKind::LineOrder,
            Matrix3x3(_) => AttributeKind::Matrix3x3,
            Matrix4x4(_) => AttributeKind::Matrix4x4,
            Preview(_) => AttributeKind::Preview,
            Rational(_) => AttributeKind::Rational,
            Text(_) => AttributeKind::Text,
            TextVector(_) => AttributeKind::TextVector,
            TileDescription(_) => AttributeKind::TileDescription,
            TimeCode(_) => AttributeKind::TimeCode,
            IntVec2(_) => AttributeKind::IntVec2,
            FloatVec2(_) => AttributeKind::FloatVec2,
            IntVec3(_) => AttributeKind::IntVec3,
            FloatVec3(_) => AttributeKind::FloatVec3,
        }
    }

    /// Read the value of an attribute whose type and declared size were already read.
    ///
    /// Fixed-size kinds read exactly their own byte size, ignoring `byte_size`.
    /// All other kinds read exactly `byte_size` bytes and fail if their content needs more.
    /// Returns the value and the number of declared bytes that the value did not use.
    pub fn read(read: &mut impl Read, kind: AttributeKind, byte_size: i32, max_name_bytes: usize) -> Result<(Self, usize)> {
        use self::AttributeValue::*;

        let mut unused_bytes = 0;

        let value = match kind {
            AttributeKind::IntegerBounds => IntegerBounds(self::IntegerBounds::read(read)?),
            AttributeKind::FloatRect => FloatRect(self::FloatRect::read(read)?),

            AttributeKind::I32 => I32(i32::read(read)?),
            AttributeKind::F32 => F32(f32::read(read)?),
            AttributeKind::F64 => F64(f64::read(read)?),

            AttributeKind::Rational => Rational({
                let a = i32::read(read)?;
                let b = u32::read(read)?;
                (a, b)
            }),

            AttributeKind::TimeCode => TimeCode(self::TimeCode::read(read)?),

            AttributeKind::IntVec2 => IntVec2({
                let a = i32::read(read)?;
                let b = i32::read(read)?;
                Vec2(a, b)
            }),

            AttributeKind::FloatVec2 => FloatVec2({
                let a = f32::read(read)?;
                let b = f32::read(read)?;
                Vec2(a, b)
            }),

            AttributeKind::IntVec3 => IntVec3({
                let a = i32::read(read)?;
                let b = i32::read(read)?;
                let c = i32::read(read)?;
                Vec3(a, b, c)
            }),

            AttributeKind::FloatVec3 => FloatVec3({
                let a = f32::read(read)?;
                let b = f32::read(read)?;
                let c = f32::read(read)?;
                Vec3(a, b, c)
            }),

            AttributeKind::Chromaticities  => Chromaticities(self::Chromaticities::read(read)?),
            AttributeKind::Compression     => Compression(self::Compression::read(read)?),
            AttributeKind::EnvironmentMap  => EnvironmentMap(self::EnvironmentMap::read(read)?),

            AttributeKind::KeyCode   => KeyCode(self::KeyCode::read(read)?),
            AttributeKind::LineOrder => LineOrder(self::LineOrder::read(read)?),
            AttributeKind::TileDescription => TileDescription(self::TileDescription::read(read)?),

            AttributeKind::Matrix3x3 => Matrix3x3({
                let mut result = [0.0_f32; 9];
                f32::read_slice(read, &mut result)?;
                result
            }),

            AttributeKind::Matrix4x4 => Matrix4x4({
                let mut result = [0.0_f32; 16];
                f32::read_slice(read, &mut result)?;
                result
            }),

            AttributeKind::Preview => {
                let bytes = read_declared_bytes(read, byte_size)?;
                let remaining = &mut bytes.as_slice();

                let preview = within_declared_size(self::Preview::read(remaining))?;
                unused_bytes = remaining.len();
                Preview(preview)
            },

            AttributeKind::Text => {
                let byte_size = i32_to_usize(byte_size, "negative text attribute size")?;
                Text(self::Text::read_sized(read, byte_size)?)
            },

            AttributeKind::ChannelList => {
                let bytes = read_declared_bytes(read, byte_size)?;
                let remaining = &mut bytes.as_slice();

                let channels = within_declared_size(self::ChannelList::read(remaining, max_name_bytes))?;
                unused_bytes = remaining.len();
                ChannelList(channels)
            },

            // the number of strings can be inferred from the total attribute size
            AttributeKind::TextVector => {
                let bytes = read_declared_bytes(read, byte_size)?;
                let texts = within_declared_size(self::Text::read_vec_of_i32_sized(&mut bytes.as_slice()))?;
                TextVector(texts)
            },
        };

        Ok((value, unused_bytes))
    }

    /// Returns an error if any text in this value is not valid UTF-8.
    pub fn validate_utf8(&self) -> UnitResult {
        match self {
            AttributeValue::Text(text) => text.validate_utf8("text attribute is not valid UTF-8"),

            AttributeValue::TextVector(texts) => texts.iter()
                .try_for_each(|text| text.validate_utf8("text vector attribute is not valid UTF-8")),

            AttributeValue::ChannelList(channels) => channels.iter()
                .try_for_each(|channel| channel.name.validate_utf8("channel name is not valid UTF-8")),

            _ => Ok(()),
        }
    }

    /// Return `Some(i32)` if this attribute is an i32.
    pub fn to_i32(&self) -> Option<i32> {
        match *self {
            AttributeValue::I32(value) => Some(value),
            _ => None
        }
    }

    /// Return `Some(f32)` if this attribute is an f32.
    pub fn to_f32(&self) -> Option<f32> {
        match *self {
            AttributeValue::F32(value) => Some(value),
            _ => None
        }
    }

    /// Return `Some(Text)` if this attribute is a text.
    pub fn to_text(&self) -> Option<&Text> {
        match self {
            AttributeValue::Text(value) => Some(value),
            _ => None
        }
    }
}

/// Read all bytes of an attribute that is sized by its declaration.
fn read_declared_bytes(read: &mut impl Read, byte_size: i32) -> Result<Vec<u8>> {
    let byte_size = i32_to_usize(byte_size, "negative attribute size")?;
    u8::read_vec(read, byte_size, 1024, None, "attribute size")
}

/// The attribute bytes were all read already,
/// so running out of bytes means the content contradicts the declared size.
fn within_declared_size<T>(result: Result<T>) -> Result<T> {
    result.map_err(|error| match error {
        Error::UnexpectedEndOfStream => Error::malformed("attribute content exceeds its declared size"),
        other => other,
    })
}


impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use self::AttributeValue::*;

        match self {
            ChannelList(channels) => {
                f.write_str("[")?;

                for (index, channel) in channels.iter().enumerate() {
                    if index != 0 { f.write_str(", ")?; }

                    write!(
                        f, "{} {{ pixel_type: {}, pLinear: {}, reserved: {:?}, xSampling: {}, ySampling: {} }}",
                        channel.name, channel.pixel_type, channel.p_linear, channel.reserved,
                        channel.sampling.x(), channel.sampling.y()
                    )?;
                }

                f.write_str("]")
            },

            Chromaticities(value) => write!(
                f, "{{ red: ({}, {}), green: ({}, {}), blue: ({}, {}), white: ({}, {}) }}",
                value.red.x(), value.red.y(), value.green.x(), value.green.y(),
                value.blue.x(), value.blue.y(), value.white.x(), value.white.y()
            ),

            Compression(value) => f.write_str(value.name()),
            EnvironmentMap(value) => f.write_str(value.name()),
            LineOrder(value) => f.write_str(value.name()),

            KeyCode(value) => write!(
                f, "{{ filmMfcCode: {}, filmType: {}, prefix: {}, count: {}, perfOffset: {}, perfsPerFrame: {}, perfsPerCount: {} }}",
                value.film_manufacturer_code, value.film_type, value.film_roll_prefix, value.count,
                value.perforation_offset, value.perforations_per_frame, value.perforations_per_count
            ),

            Matrix3x3(values) => write!(f, "{:?}", values),
            Matrix4x4(values) => write!(f, "{:?}", values),

            Preview(value) => write!(f, "{{ width: {}, height: {}, pixel bytes: {} }}", value.size.width(), value.size.height(), value.pixel_data.len()),
            Rational((numerator, denominator)) => write!(f, "{}/{}", numerator, denominator),

            TextVector(texts) => {
                f.write_str("[")?;

                for (index, text) in texts.iter().enumerate() {
                    if index != 0 { f.write_str(", ")?; }
                    write!(f, "{:?}", text.to_string())?;
                }

                f.write_str("]")
            },

            TileDescription(value) => write!(f, "{{ xSize: {}, ySize: {}, mode: {} }}", value.tile_size.x(), value.tile_size.y(), value.mode),

            TimeCode(value) => write!(
                f, "{:02}:{:02}:{:02}:{:02} (user data {:#010x})",
                value.hours(), value.minutes(), value.seconds(), value.frame(), value.user_data
            ),

            Text(text) => write!(f, "{:?}", text.to_string()),
            F64(value) => write!(f, "{:?}", value),
            F32(value) => write!(f, "{:?}", value),
            I32(value) => write!(f, "{}", value),

            IntegerBounds(value) => write!(f, "{{ xMin: {}, yMin: {}, xMax: {}, yMax: {} }}", value.min.x(), value.min.y(), value.max.x(), value.max.y()),
            FloatRect(value) => write!(f, "{{ xMin: {:?}, yMin: {:?}, xMax: {:?}, yMax: {:?} }}", value.min.x(), value.min.y(), value.max.x(), value.max.y()),

            IntVec2(value) => write!(f, "[{}, {}]", value.0, value.1),
            FloatVec2(value) => write!(f, "[{:?}, {:?}]", value.0, value.1),
            IntVec3(value) => write!(f, "[{}, {}, {}]", value.0, value.1, value.2),
            FloatVec3(value) => write!(f, "[{:?}, {:?}, {:?}]", value.0, value.1, value.2),
        }
    }
}
