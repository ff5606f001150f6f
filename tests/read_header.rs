extern crate exr_header;

use exr_header::prelude::*;
use exr_header::meta::attribute::*;
use exr_header::math::{Vec2, Vec3, RoundingMode};
use std::path::PathBuf;
use std::ffi::OsStr;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

const REC709: &str = "tests/images/valid/rec709_header.exr";
const ALL_TYPES: &str = "tests/images/valid/all_attribute_types.exr";

fn exr_files(path: &'static str) -> impl Iterator<Item=PathBuf> {
    walkdir::WalkDir::new(path).into_iter()
        .map(std::result::Result::unwrap).filter(|entry| entry.path().extension() == Some(OsStr::new("exr")))
        .map(walkdir::DirEntry::into_path)
}

fn read_pedantic(path: &str) -> (HeaderMetadata, Vec<Warning>) {
    let mut warnings: Vec<Warning> = Vec::new();
    let header = HeaderMetadata::read_from_file(path, ReadOptions::pedantic(), &mut warnings).unwrap();
    (header, warnings)
}

fn get<'h>(header: &'h HeaderMetadata, name: &str) -> &'h AttributeValue {
    header.get(name).unwrap_or_else(|| panic!("missing attribute `{}`", name))
}


#[test]
fn rec709_attributes() {
    let (header, warnings) = read_pedantic(REC709);
    assert!(warnings.is_empty(), "{:?}", warnings);

    assert_eq!(header.magic_number, 20000630);
    assert_eq!(header.requirements.file_format_version, 2);
    assert!(!header.requirements.is_single_layer_and_tiled);
    assert_eq!(header.byte_size, 369);
    assert_eq!(header.len(), 9);
    assert!(header.has_required_attributes());

    assert_eq!(header.compression(), Some(Compression::PIZ));
    assert_eq!(get(&header, "compression").to_string(), "PIZ_COMPRESSION");
    assert_eq!(header.line_order(), Some(LineOrder::Increasing));
    assert_eq!(get(&header, "lineOrder").to_string(), "INCREASING_Y");

    let window = IntegerBounds::new((0, 0), (609, 405));
    assert_eq!(header.data_window(), Some(window));
    assert_eq!(header.display_window(), Some(window));

    assert_eq!(get(&header, "owner").to_text().unwrap(), "Copyright 2006 Industrial Light & Magic");
    assert_eq!(get(&header, "pixelAspectRatio").to_f32(), Some(1.0));
    assert_eq!(get(&header, "screenWindowWidth").to_f32(), Some(1.0));
    assert_eq!(get(&header, "screenWindowCenter"), &AttributeValue::FloatVec2(Vec2(0.0, 0.0)));

    let channels = header.channels().unwrap();
    let names: Vec<String> = channels.iter().map(|channel| channel.name.to_string()).collect();
    assert_eq!(names, vec!["B", "G", "R"]);

    for name in &["R", "G", "B"] {
        let channel = channels.find(name).unwrap();
        assert_eq!(channel.pixel_type, 1);
        assert_eq!(channel.p_linear, 0);
        assert_eq!(channel.reserved, [0, 0, 0]);
        assert_eq!(channel.sampling, Vec2(1, 1));
    }
}

#[test]
fn rec709_attribute_order() {
    let (header, _) = read_pedantic(REC709);

    let names: Vec<String> = header.iter().map(|(name, _)| name.to_string()).collect();
    assert_eq!(names, vec![
        "channels", "compression", "dataWindow", "displayWindow", "lineOrder",
        "owner", "pixelAspectRatio", "screenWindowCenter", "screenWindowWidth",
    ]);
}

#[test]
fn all_attribute_types() {
    let (header, warnings) = read_pedantic(ALL_TYPES);
    assert!(warnings.is_empty(), "{:?}", warnings);

    assert!(header.requirements.is_single_layer_and_tiled);
    assert_eq!(header.byte_size, 984);
    assert_eq!(header.len(), 26);

    let mut kinds: Vec<AttributeKind> = header.iter().map(|(_, value)| value.kind()).collect();
    kinds.sort_by_key(|kind| kind.type_name());
    kinds.dedup();
    assert_eq!(kinds.len(), AttributeKind::ALL.len(), "every kind appears at least once");

    assert_eq!(header.compression(), Some(Compression::ZIP));
    assert_eq!(header.line_order(), Some(LineOrder::Unspecified));
    assert_eq!(get(&header, "envmap"), &AttributeValue::EnvironmentMap(EnvironmentMap::Cube));
    assert_eq!(get(&header, "envmap").to_string(), "ENVMAP_CUBE");
    assert_eq!(get(&header, "framesPerSecond"), &AttributeValue::Rational((24000, 1001)));
    assert_eq!(get(&header, "utcOffset"), &AttributeValue::F64(-3600.0));
    assert_eq!(get(&header, "version").to_i32(), Some(1));
    assert_eq!(get(&header, "position"), &AttributeValue::FloatVec3(Vec3(1.0, 2.0, 3.0)));
    assert_eq!(get(&header, "voxel"), &AttributeValue::IntVec3(Vec3(4, 5, 6)));
    assert_eq!(get(&header, "wrap"), &AttributeValue::IntVec2(Vec2(-1, 1)));

    assert_eq!(
        get(&header, "multiView"),
        &AttributeValue::TextVector(vec![Text::from("left"), Text::from("right")])
    );

    let data_window = header.data_window().unwrap();
    assert_eq!(data_window.min, Vec2(-8, -8));
    assert_eq!(data_window.size(), Some(Vec2(64, 32)));

    let tiles = header.tiles().unwrap();
    assert_eq!(tiles.tile_size, Vec2(16, 16));
    assert_eq!(tiles.level_mode(), Some(LevelMode::MipMap));
    assert_eq!(tiles.rounding_mode(), Some(RoundingMode::Up));
    assert_eq!(tiles.tile_count(Vec2(64, 32)), Some(Vec2(4, 2)));

    match get(&header, "channels") {
        AttributeValue::ChannelList(channels) => {
            assert_eq!(channels.find("A").and_then(ChannelDescription::sample_type), Some(SampleType::F32));
            assert_eq!(channels.find("Y").and_then(ChannelDescription::sample_type), Some(SampleType::F16));
            assert_eq!(channels.bytes_per_pixel(), Some(6));
        },
        other => panic!("unexpected channels {:?}", other),
    }

    match get(&header, "keyCode") {
        AttributeValue::KeyCode(key_code) => {
            assert_eq!(key_code.film_manufacturer_code, 1);
            assert_eq!(key_code.perforations_per_count, 7);
        },
        other => panic!("unexpected key code {:?}", other),
    }

    match get(&header, "timeCode") {
        AttributeValue::TimeCode(time_code) => {
            assert_eq!((time_code.hours(), time_code.minutes(), time_code.seconds(), time_code.frame()), (1, 2, 3, 4));
            assert_eq!(time_code.binary_groups(), [1, 2, 3, 4, 5, 6, 7, 8]);
        },
        other => panic!("unexpected time code {:?}", other),
    }

    match get(&header, "preview") {
        AttributeValue::Preview(preview) => {
            assert_eq!(preview.size, Vec2(2, 2));
            assert_eq!(preview.pixel_data, (0 .. 16).collect::<Vec<u8>>());
        },
        other => panic!("unexpected preview {:?}", other),
    }

    match get(&header, "chromaticities") {
        AttributeValue::Chromaticities(chromaticities) => {
            assert_eq!(chromaticities.red, Vec2(0.64, 0.33));
            assert_eq!(chromaticities.white, Vec2(0.3127, 0.329));
        },
        other => panic!("unexpected chromaticities {:?}", other),
    }

    match get(&header, "worldToCamera") {
        AttributeValue::Matrix4x4(matrix) => {
            assert_eq!(matrix[0], 1.0);
            assert_eq!(matrix[1], 0.0);
            assert_eq!(matrix[15], 1.0);
        },
        other => panic!("unexpected matrix {:?}", other),
    }

    match get(&header, "worldToNDC") {
        AttributeValue::Matrix3x3(matrix) => assert_eq!(matrix[4], 1.0),
        other => panic!("unexpected matrix {:?}", other),
    }
}

#[test]
fn reading_is_idempotent() {
    for path in exr_files("tests/images/valid") {
        let first = HeaderMetadata::read_from_file(&path, ReadOptions::lenient(), &mut IgnoreDiagnostics).unwrap();
        let second = HeaderMetadata::read_from_file(&path, ReadOptions::lenient(), &mut IgnoreDiagnostics).unwrap();
        assert_eq!(first, second, "{:?}", path);

        let bytes = std::fs::read(&path).unwrap();
        let from_memory = HeaderMetadata::read_from_buffered(bytes.as_slice(), ReadOptions::lenient(), &mut IgnoreDiagnostics).unwrap();
        assert_eq!(first, from_memory, "{:?}", path);
    }
}

#[test]
fn header_ends_before_offset_table() {
    let bytes = std::fs::read(REC709).unwrap();
    let mut remaining = bytes.as_slice();

    let header = HeaderMetadata::read_from_buffered(&mut remaining, ReadOptions::pedantic(), &mut IgnoreDiagnostics).unwrap();
    assert_eq!(remaining.len(), bytes.len() - header.byte_size);

    // the first offset points right behind the 13 offsets of the table
    let first_offset = u64::from_le_bytes([
        remaining[0], remaining[1], remaining[2], remaining[3],
        remaining[4], remaining[5], remaining[6], remaining[7],
    ]);

    assert_eq!(first_offset as usize, header.byte_size + 13 * 8);
}

#[test]
fn every_valid_file_has_required_attributes() {
    let files: Vec<PathBuf> = exr_files("tests/images/valid").collect();
    assert!(!files.is_empty());

    let results: Vec<(PathBuf, bool)> = files.into_par_iter()
        .map(|path| {
            let header = HeaderMetadata::read_from_file(&path, ReadOptions::pedantic(), &mut IgnoreDiagnostics);
            let valid = header.map(|header| header.has_required_attributes()).unwrap_or(false);
            (path, valid)
        })
        .collect();

    for (path, valid) in results {
        assert!(valid, "{:?}", path);
    }
}

#[test]
fn nonexistent_path() {
    let result = HeaderMetadata::read_from_file("tests/images/valid/missing.exr", ReadOptions::lenient(), &mut IgnoreDiagnostics);

    match result {
        Err(Error::NotFound(path)) => assert_eq!(path, PathBuf::from("tests/images/valid/missing.exr")),
        other => panic!("expected not found, got {:?}", other),
    }
}

#[test]
fn unknown_attribute_type() {
    let result = HeaderMetadata::read_from_file(
        "tests/images/invalid/unknown_attribute_type.exr",
        ReadOptions::lenient(), &mut IgnoreDiagnostics
    );

    match result {
        Err(Error::UnsupportedAttributeType(type_name)) => assert_eq!(type_name, "v4d"),
        other => panic!("expected unsupported type, got {:?}", other),
    }
}

#[test]
fn damaged_files() {
    let truncated = HeaderMetadata::read_from_file(
        "tests/images/invalid/truncated_header.exr",
        ReadOptions::lenient(), &mut IgnoreDiagnostics
    );

    assert!(matches!(truncated, Err(Error::UnexpectedEndOfStream)), "{:?}", truncated);

    let overrun = HeaderMetadata::read_from_file(
        "tests/images/invalid/channel_list_overrun.exr",
        ReadOptions::lenient(), &mut IgnoreDiagnostics
    );

    assert!(matches!(overrun, Err(Error::Malformed(_))), "{:?}", overrun);
}

#[test]
fn warnings_reach_closures() {
    let mut bytes = std::fs::read(REC709).unwrap();
    bytes[0] = 0; // damage the magic number

    let mut messages = Vec::new();
    let header = HeaderMetadata::read_from_buffered(
        bytes.as_slice(), ReadOptions::lenient(),
        &mut |warning: Warning| messages.push(warning.to_string())
    );

    assert!(header.is_ok());
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("at byte 0: unexpected magic number"), "{}", messages[0]);
}
