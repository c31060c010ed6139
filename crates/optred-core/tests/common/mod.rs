#![allow(dead_code)]

use std::path::{Path, PathBuf};

use fitsio::images::{ImageDescription, ImageType};
use fitsio::FitsFile;
use ndarray::Array2;

use optred_core::frame::Frame;
use optred_core::header::Header;
use optred_core::io::write_frame;

/// Header with an `IMAGETYP` and, if given, a `FILTER`.
pub fn typed_header(imagetyp: &str, filter: Option<&str>) -> Header {
    let mut header = Header::new();
    header.set("IMAGETYP", imagetyp);
    if let Some(filter) = filter {
        header.set("FILTER", filter);
    }
    header
}

/// Single-plane frame filled with `value`.
pub fn uniform_frame(h: usize, w: usize, value: f32, header: Header) -> Frame {
    Frame::from_plane(Array2::from_elem((h, w), value), header)
}

/// Single-plane frame with a left-to-right ramp scaled by `scale`.
pub fn ramp_frame(h: usize, w: usize, offset: f32, scale: f32, header: Header) -> Frame {
    let plane = Array2::from_shape_fn((h, w), |(_, c)| offset + scale * (1.0 + c as f32));
    Frame::from_plane(plane, header)
}

/// Write `frame` to `dir/name` and return the path.
pub fn write_fits(dir: &Path, name: &str, frame: &Frame) -> PathBuf {
    let path = dir.join(name);
    write_frame(&path, frame).expect("write test frame");
    path
}

/// Write a VATT-style file: an empty primary carrying `IMAGETYP`/`FILTER`
/// and two image extensions with their own `TRIMSEC`.
pub fn write_split_amplifier_fits(
    dir: &Path,
    name: &str,
    imagetyp: &str,
    filter: Option<&str>,
    first: &Array2<f32>,
    second: &Array2<f32>,
    trimsec: &str,
) -> PathBuf {
    let path = dir.join(name);
    let mut fptr = FitsFile::create(&path).open().expect("create fits");
    let primary = fptr.primary_hdu().expect("primary");
    primary
        .write_key(&mut fptr, "IMAGETYP", imagetyp)
        .expect("write IMAGETYP");
    if let Some(filter) = filter {
        primary
            .write_key(&mut fptr, "FILTER", filter)
            .expect("write FILTER");
    }

    for (i, plane) in [first, second].into_iter().enumerate() {
        let (h, w) = plane.dim();
        let dims = [h, w];
        let description = ImageDescription {
            data_type: ImageType::Float,
            dimensions: &dims,
        };
        let hdu = fptr
            .create_image(format!("AMP{}", i + 1), &description)
            .expect("create extension");
        let pixels: Vec<f32> = plane.iter().copied().collect();
        hdu.write_image(&mut fptr, &pixels).expect("write pixels");
        hdu.write_key(&mut fptr, "TRIMSEC", trimsec)
            .expect("write TRIMSEC");
    }
    path
}
