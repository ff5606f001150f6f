#[macro_use]
extern crate bencher;

extern crate exr_header;
use exr_header::prelude::*;

use bencher::Bencher;
use std::fs;

/// Open the file and read the header on every iteration
fn read_header_from_file(bench: &mut Bencher) {
    bench.iter(||{
        let header = HeaderMetadata::read_from_file(
            "tests/images/valid/all_attribute_types.exr",
            ReadOptions::lenient(), &mut IgnoreDiagnostics
        ).unwrap();

        bencher::black_box(header);
    })
}

/// Read the header from memory, without file system overhead
fn read_header_from_buffer(bench: &mut Bencher) {
    let file = fs::read("tests/images/valid/all_attribute_types.exr").unwrap();

    bench.iter(||{
        let header = HeaderMetadata::read_from_buffered(
            file.as_slice(), ReadOptions::lenient(), &mut IgnoreDiagnostics
        ).unwrap();

        bencher::black_box(header);
    })
}

/// Read the header from memory, collecting warnings
fn read_header_from_buffer_pedantic(bench: &mut Bencher) {
    let file = fs::read("tests/images/valid/rec709_header.exr").unwrap();

    bench.iter(||{
        let mut warnings: Vec<Warning> = Vec::new();
        let header = HeaderMetadata::read_from_buffered(
            file.as_slice(), ReadOptions::pedantic(), &mut warnings
        ).unwrap();

        bencher::black_box((header, warnings));
    })
}

benchmark_group!(read,
    read_header_from_file,
    read_header_from_buffer,
    read_header_from_buffer_pedantic
);

benchmark_main!(read);
