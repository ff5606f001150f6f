
//! How strictly a header is read.

/// Controls how forgiving the header reader is.
/// Use `ReadOptions::lenient()` to read as many files as possible,
/// or `ReadOptions::pedantic()` to reject anything that other exr readers may reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReadOptions {

    /// If true, problems that would otherwise only produce a warning abort reading:
    /// an unexpected magic number, unknown version flags, overlong names,
    /// too many attributes, and text that is not UTF-8.
    pub pedantic: bool,

    /// Stop reading after this many attributes.
    /// Prevents endless reading of a stream that has no attribute terminator.
    pub max_attribute_count: usize,

    /// The maximum number of bytes a name may occupy, including its null-terminator.
    /// Applies to attribute names, type names, and channel names.
    pub max_token_length: usize,

    /// What to do when an attribute name appears a second time.
    pub duplicate_attributes: DuplicateAttributes,
}

/// What to do when an attribute name appears a second time in the same header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DuplicateAttributes {

    /// The later value replaces the earlier one, keeping the earlier position.
    Overwrite,

    /// Abort reading the header.
    Reject,
}

impl ReadOptions {

    /// Accept slightly broken files, reporting the problems as warnings.
    pub fn lenient() -> Self {
        ReadOptions {
            pedantic: false,
            max_attribute_count: 2000,
            max_token_length: 1024,
            duplicate_attributes: DuplicateAttributes::Overwrite,
        }
    }

    /// Abort on anything that does not conform to the file format.
    pub fn pedantic() -> Self {
        ReadOptions {
            pedantic: true,
            duplicate_attributes: DuplicateAttributes::Reject,
            .. Self::lenient()
        }
    }

    /// Use the specified duplicate policy.
    pub fn with_duplicate_attributes(self, duplicate_attributes: DuplicateAttributes) -> Self {
        ReadOptions { duplicate_attributes, ..self }
    }

    /// Stop after the specified number of attributes.
    pub fn with_max_attribute_count(self, max_attribute_count: usize) -> Self {
        ReadOptions { max_attribute_count, ..self }
    }
}

impl Default for ReadOptions {
    fn default() -> Self { Self::lenient() }
}

impl Default for DuplicateAttributes {
    fn default() -> Self { DuplicateAttributes::Overwrite }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn presets(){
        assert_eq!(ReadOptions::default(), ReadOptions::lenient());
        assert!(!ReadOptions::lenient().pedantic);

        let pedantic = ReadOptions::pedantic();
        assert!(pedantic.pedantic);
        assert_eq!(pedantic.duplicate_attributes, DuplicateAttributes::Reject);
        assert_eq!(pedantic.max_attribute_count, 2000);
        assert_eq!(pedantic.max_token_length, 1024);

        let custom = ReadOptions::lenient()
            .with_max_attribute_count(3)
            .with_duplicate_attributes(DuplicateAttributes::Reject);

        assert_eq!(custom.max_attribute_count, 3);
        assert_eq!(custom.duplicate_attributes, DuplicateAttributes::Reject);
        assert!(!custom.pedantic);
    }
}
