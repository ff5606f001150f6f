
//! The attributes of a single header, in file order.

use crate::meta::attribute::*;
use crate::meta::Requirements;


/// Contains the names of the attributes that every exr file has,
/// and some other commonly used names.
pub mod attribute_names {
    macro_rules! define_attribute_names {
        ( $($name: ident : $value: expr),* ) => {
            $(
                /// The byte-string name of this attribute as it appears in an exr file.
                pub const $name: &'static [u8] = $value;
            )*
        };
    }

    define_attribute_names! {
        CHANNELS:       b"channels",
        COMPRESSION:    b"compression",
        DATA_WINDOW:    b"dataWindow",
        DISPLAY_WINDOW: b"displayWindow",
        LINE_ORDER:     b"lineOrder",
        PIXEL_ASPECT:   b"pixelAspectRatio",
        WINDOW_CENTER:  b"screenWindowCenter",
        WINDOW_WIDTH:   b"screenWindowWidth",
        TILES:          b"tiles",
        OWNER:          b"owner",
        PREVIEW:        b"preview"
    }

    /// Each of these attributes must be present in a valid header.
    pub const REQUIRED: [&[u8]; 5] = [CHANNELS, COMPRESSION, DATA_WINDOW, DISPLAY_WINDOW, LINE_ORDER];
}


/// All attributes of the first header in a file,
/// together with the fields that precede them.
/// Each attribute name exists at most once.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderMetadata {

    /// The first four bytes of the file, as a little-endian integer.
    /// Always `20000630` for exr files.
    pub magic_number: i32,

    /// Some flags summarizing the features that must be supported to decode the file.
    pub requirements: Requirements,

    /// The number of bytes from the start of the file up to and including the header terminator.
    /// For single-part files, this is where the chunk offset table begins.
    /// When lenient reading stops at the attribute limit, this is the end of the last kept attribute.
    pub byte_size: usize,

    attributes: Vec<(Text, AttributeValue)>,
}

impl HeaderMetadata {

    /// A header without any attributes yet.
    pub(crate) fn new(magic_number: i32, requirements: Requirements) -> Self {
        HeaderMetadata { magic_number, requirements, byte_size: 0, attributes: Vec::new() }
    }

    /// Insert an attribute. If the name already exists,
    /// the value is replaced in its original position, and the old value is returned.
    pub(crate) fn insert(&mut self, name: Text, value: AttributeValue) -> Option<AttributeValue> {
        match self.attributes.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.attributes.push((name, value));
                None
            }
        }
    }

    /// Look up an attribute by its exact, case-sensitive name.
    pub fn get(&self, name: impl AsRef<[u8]>) -> Option<&AttributeValue> {
        let name = name.as_ref();

        self.attributes.iter()
            .find(|(existing, _)| existing.as_slice() == name)
            .map(|(_, value)| value)
    }

    /// Whether an attribute with this exact name exists.
    pub fn contains(&self, name: impl AsRef<[u8]>) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over all attributes in the order they first appeared in the file.
    pub fn iter(&self) -> impl Iterator<Item = (&Text, &AttributeValue)> {
        self.attributes.iter().map(|(name, value)| (name, value))
    }

    /// Number of distinct attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether the header has no attributes at all.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// The channel list, if the `channels` attribute exists with the expected type.
    pub fn channels(&self) -> Option<&ChannelList> {
        match self.get(attribute_names::CHANNELS)? {
            AttributeValue::ChannelList(channels) => Some(channels),
            _ => None,
        }
    }

    /// The compression method, if the `compression` attribute exists with the expected type.
    pub fn compression(&self) -> Option<Compression> {
        match self.get(attribute_names::COMPRESSION)? {
            AttributeValue::Compression(compression) => Some(*compression),
            _ => None,
        }
    }

    /// The line order, if the `lineOrder` attribute exists with the expected type.
    pub fn line_order(&self) -> Option<LineOrder> {
        match self.get(attribute_names::LINE_ORDER)? {
            AttributeValue::LineOrder(line_order) => Some(*line_order),
            _ => None,
        }
    }

    /// The data window, if the `dataWindow` attribute exists with the expected type.
    pub fn data_window(&self) -> Option<DataWindow> {
        self.integer_bounds(attribute_names::DATA_WINDOW)
    }

    /// The display window, if the `displayWindow` attribute exists with the expected type.
    pub fn display_window(&self) -> Option<DisplayWindow> {
        self.integer_bounds(attribute_names::DISPLAY_WINDOW)
    }

    /// The tile description, if the `tiles` attribute exists with the expected type.
    pub fn tiles(&self) -> Option<TileDescription> {
        match self.get(attribute_names::TILES)? {
            AttributeValue::TileDescription(tiles) => Some(*tiles),
            _ => None,
        }
    }

    /// Whether every attribute that a valid header must contain is present.
    /// Does not check the types of the values.
    pub fn has_required_attributes(&self) -> bool {
        attribute_names::REQUIRED.iter().all(|&name| self.contains(name))
    }

    fn integer_bounds(&self, name: &[u8]) -> Option<IntegerBounds> {
        match self.get(name)? {
            AttributeValue::IntegerBounds(bounds) => Some(*bounds),
            _ => None,
        }
    }
}

impl<'h> IntoIterator for &'h HeaderMetadata {
    type Item = &'h (Text, AttributeValue);
    type IntoIter = std::slice::Iter<'h, (Text, AttributeValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.iter()
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Vec2;

    fn requirements() -> Requirements {
        Requirements {
            file_format_version: 2,
            is_single_layer_and_tiled: false,
            has_long_names: false,
            has_deep_data: false,
            has_multiple_layers: false,
            unknown_flags: 0,
        }
    }

    #[test]
    fn overwrite_keeps_position(){
        let mut header = HeaderMetadata::new(20000630, requirements());
        assert!(header.insert(Text::from("owner"), AttributeValue::Text(Text::from("first"))).is_none());
        assert!(header.insert(Text::from("screenWindowWidth"), AttributeValue::F32(1.0)).is_none());

        let previous = header.insert(Text::from("owner"), AttributeValue::Text(Text::from("second")));
        assert_eq!(previous, Some(AttributeValue::Text(Text::from("first"))));

        let names: Vec<String> = header.iter().map(|(name, _)| name.to_string()).collect();
        assert_eq!(names, vec!["owner", "screenWindowWidth"]);
        assert_eq!(header.get("owner").and_then(|value| value.to_text()).unwrap(), "second");
        assert_eq!(header.len(), 2);
    }

    #[test]
    fn typed_accessors(){
        let mut header = HeaderMetadata::new(20000630, requirements());
        assert!(header.is_empty());
        assert!(!header.has_required_attributes());

        let window = IntegerBounds::new((0, 0), (609, 405));
        header.insert(Text::from("channels"), AttributeValue::ChannelList(ChannelList::default()));
        header.insert(Text::from("compression"), AttributeValue::Compression(Compression::PIZ));
        header.insert(Text::from("dataWindow"), AttributeValue::IntegerBounds(window));
        header.insert(Text::from("displayWindow"), AttributeValue::IntegerBounds(window));
        header.insert(Text::from("lineOrder"), AttributeValue::LineOrder(LineOrder::Increasing));

        assert!(header.has_required_attributes());
        assert_eq!(header.compression(), Some(Compression::PIZ));
        assert_eq!(header.line_order(), Some(LineOrder::Increasing));
        assert_eq!(header.data_window().and_then(|window| window.size()), Some(Vec2(610, 406)));
        assert_eq!(header.display_window(), Some(window));
        assert!(header.channels().unwrap().is_empty());
        assert_eq!(header.tiles(), None);

        assert!(header.contains("lineOrder"));
        assert!(!header.contains("lineorder"));
        assert_eq!((&header).into_iter().count(), 5);
    }

    #[test]
    fn accessors_check_the_type(){
        let mut header = HeaderMetadata::new(20000630, requirements());
        header.insert(Text::from("compression"), AttributeValue::I32(4));

        assert!(header.contains("compression"));
        assert_eq!(header.compression(), None);
    }
}
