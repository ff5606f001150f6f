
//! Describes all meta data possible in an exr header,
//! and reads it from a byte source.

pub mod attribute;
pub mod header;
pub mod options;
pub mod diagnostics;


use crate::io::*;
use crate::error::*;
use self::attribute::*;
use self::diagnostics::*;
use self::options::*;
use std::convert::TryFrom;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

pub use self::header::HeaderMetadata;


/// Some flags summarizing the features that must be supported to decode the file.
/// Decoded from the four bytes after the magic number.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Requirements {

    /// This number is always `2` for files written by current exr libraries.
    pub file_format_version: u8,

    /// If true, this image has tiled blocks and contains only a single layer.
    /// If false and not deep and not multilayer, this image is a single layer image with scan line blocks.
    pub is_single_layer_and_tiled: bool,

    /// Whether this file has strings with a length greater than 31.
    /// Strings can never be longer than 255.
    pub has_long_names: bool,

    /// This image contains at least one layer with deep data.
    pub has_deep_data: bool,

    /// Whether this file contains multiple layers.
    pub has_multiple_layers: bool,

    /// Any flag bits without a known meaning, at their original bit positions.
    pub unknown_flags: u32,
}


/// The first four bytes of each exr file.
pub mod magic_number {
    use super::*;

    /// The first four bytes of each exr file.
    pub const BYTES: [u8; 4] = [0x76, 0x2f, 0x31, 0x01];

    /// The first four bytes of each exr file, as a little-endian integer.
    pub const VALUE: i32 = 20000630;

    /// Consumes four bytes from the reader and returns them as an integer, without validating.
    pub fn read(read: &mut impl Read) -> Result<i32> {
        i32::read(read)
    }
}


impl Requirements {

    /// Is this file declared to contain multiple layers?
    pub fn is_multilayer(&self) -> bool {
        self.has_multiple_layers
    }

    /// Read the value without validating.
    pub fn read(read: &mut impl Read) -> Result<Self> {
        use ::bit_field::BitField;

        let version_and_flags = u32::read(read)?;

        // take the 8 least significant bits, they contain the file format version number
        let version = version_and_flags.get_bits(0..8) as u8;

        // the 24 most significant bits are treated as a set of boolean flags
        let is_single_tile = version_and_flags.get_bit(9);
        let has_long_names = version_and_flags.get_bit(10);
        let has_deep_data = version_and_flags.get_bit(11);
        let has_multiple_layers = version_and_flags.get_bit(12);

        // all remaining bits except 9, 10, 11 and 12 are reserved and should be 0
        let unknown_flags = version_and_flags & !(0xFF | 0b1111 << 9);

        Ok(Requirements {
            file_format_version: version,
            is_single_layer_and_tiled: is_single_tile,
            has_long_names, has_deep_data, has_multiple_layers,
            unknown_flags,
        })
    }
}


impl HeaderMetadata {

    /// Read the header of the exr file at the specified path.
    /// Returns `Error::NotFound` if the path does not exist.
    /// The file is closed before this function returns.
    pub fn read_from_file(path: impl AsRef<Path>, options: ReadOptions, diagnostics: &mut impl Diagnostics) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|error| {
            if error.kind() == ErrorKind::NotFound { Error::NotFound(path.to_path_buf()) }
            else { Error::from(error) }
        })?;

        Self::read_from_unbuffered(file, options, diagnostics)
    }

    /// Buffer the reader and then read the exr header from it.
    /// Use `read_from_buffered` if your reader is an in-memory reader.
    /// Use `read_from_file` if you have a file path.
    pub fn read_from_unbuffered(unbuffered: impl Read, options: ReadOptions, diagnostics: &mut impl Diagnostics) -> Result<Self> {
        Self::read_from_buffered(BufReader::new(unbuffered), options, diagnostics)
    }

    /// Read the exr header from a reader, consuming no bytes after the header terminator.
    /// Use `read_from_file` if you have a file path.
    /// Use `read_from_unbuffered` if this is not an in-memory reader.
    pub fn read_from_buffered(buffered: impl Read, options: ReadOptions, diagnostics: &mut impl Diagnostics) -> Result<Self> {
        let mut read = Tracking::new(buffered);

        let magic_number = magic_number::read(&mut read)?;
        if magic_number != magic_number::VALUE {
            if options.pedantic { return Err(Error::malformed("file identifier missing")); }
            diagnostics.warn(Warning { byte_position: 0, kind: WarningKind::UnexpectedMagicNumber(magic_number) });
        }

        let requirements_position = read.byte_position();
        let requirements = Requirements::read(&mut read)?;

        if requirements.unknown_flags != 0 {
            if options.pedantic { return Err(Error::malformed("unknown file feature flags")); }

            diagnostics.warn(Warning {
                byte_position: requirements_position,
                kind: WarningKind::UnknownVersionFlags(requirements.unknown_flags)
            });
        }

        if requirements.is_multilayer() {
            diagnostics.warn(Warning { byte_position: requirements_position, kind: WarningKind::MultipleParts });
        }

        let mut header = HeaderMetadata::new(magic_number, requirements);
        header.byte_size = header.read_attributes(&mut read, options, diagnostics)?;

        Ok(header)
    }

    /// Read attributes until the header terminator.
    /// Returns the byte position after the last attribute that was kept.
    fn read_attributes(&mut self, read: &mut Tracking<impl Read>, options: ReadOptions, diagnostics: &mut impl Diagnostics) -> Result<usize> {
        let max_token_length = options.max_token_length.max(1);
        let mut attribute_count = 0;

        loop {
            let name_position = read.byte_position();
            let name = read_name(read, options, diagnostics)?;

            // a single null byte terminates the header
            if name.is_empty() {
                return Ok(read.byte_position());
            }

            if attribute_count == options.max_attribute_count {
                if options.pedantic { return Err(Error::malformed("too many attributes")); }

                diagnostics.warn(Warning {
                    byte_position: name_position,
                    kind: WarningKind::AttributeLimitReached(attribute_count)
                });

                // the name of the dropped attribute is not part of the header
                return Ok(name_position);
            }

            attribute_count += 1;

            let type_name = read_name(read, options, diagnostics)?;
            let declared_size = i32::read(read)?;

            let kind = AttributeKind::from_type_name(type_name.as_slice())
                .ok_or(Error::UnsupportedAttributeType(type_name))?;

            let value_position = read.byte_position();
            let (value, unused_bytes) = AttributeValue::read(read, kind, declared_size, max_token_length)?;
            let byte_size = read.byte_position() - value_position;

            if usize::try_from(declared_size).ok() != Some(byte_size) {
                diagnostics.warn(Warning {
                    byte_position: value_position,
                    kind: WarningKind::SizeMismatch { attribute: name.clone(), declared_size, byte_size }
                });
            }

            if unused_bytes != 0 {
                diagnostics.warn(Warning {
                    byte_position: value_position,
                    kind: WarningKind::UnusedBytes { attribute: name.clone(), byte_count: unused_bytes }
                });
            }

            if options.pedantic {
                name.validate_utf8("attribute name is not valid UTF-8")?;
                value.validate_utf8()?;
            }

            if options.duplicate_attributes == DuplicateAttributes::Reject && self.contains(&name) {
                return Err(Error::malformed(format!("duplicate attribute `{}`", name)));
            }

            if self.insert(name.clone(), value).is_some() {
                diagnostics.warn(Warning { byte_position: name_position, kind: WarningKind::DuplicateAttribute(name) });
            }
        }
    }
}

/// Read an attribute name or type name, applying the length policy of the options.
fn read_name(read: &mut Tracking<impl Read>, options: ReadOptions, diagnostics: &mut impl Diagnostics) -> Result<Text> {
    let position = read.byte_position();
    let max_bytes = options.max_token_length.max(1);
    let token = Text::read_null_terminated(read, max_bytes)?;

    if !token.terminated {
        if options.pedantic { return Err(Error::malformed("name too long")); }

        diagnostics.warn(Warning {
            byte_position: position,
            kind: WarningKind::TruncatedText { text: token.text.clone(), max_bytes }
        });
    }

    Ok(token.text)
}
