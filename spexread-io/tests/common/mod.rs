//! Synthetic SPE file builders shared by the integration tests.

#![allow(dead_code)]

use spexread_spe::{RawHeader, RoiBlock};
use std::io::Write;
use tempfile::NamedTempFile;

pub const HEADER_SIZE: usize = 4100;

/// Small deterministic generator so the geometry sweeps are reproducible.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 33) as u32
    }

    /// Uniform value in `lo..=hi`.
    pub fn range(&mut self, lo: u32, hi: u32) -> u32 {
        lo + self.next_u32() % (hi - lo + 1)
    }
}

/// Legacy v2.2 header with `rois` identical full-sensor ROIs binned by
/// `xbin`/`ybin`, 32-bit signed pixels.
pub fn legacy_header(xdim: u16, ydim: u16, xbin: u16, ybin: u16, frames: i32, rois: i16) -> RawHeader {
    let mut header = RawHeader {
        file_header_ver: 2.2,
        xdim: xdim / xbin,
        ydim: ydim / ybin,
        x_dim_det: xdim,
        y_dim_det: ydim,
        datatype: 1,
        num_roi: rois,
        num_frames: frames,
        ..RawHeader::default()
    };
    for block in header.roi_info.iter_mut().take(rois as usize) {
        *block = RoiBlock {
            startx: 1,
            endx: xdim,
            groupx: xbin,
            starty: 1,
            endy: ydim,
            groupy: ybin,
        };
    }
    header
}

/// Pixel value written at `(frame, roi, index)`; unique for small inputs.
pub fn marker(frame: usize, roi: usize, index: usize) -> i32 {
    (frame * 1_000_000 + roi * 10_000 + index) as i32
}

/// Header bytes followed by `frames` frames of `i32` markers for each ROI.
pub fn legacy_file_bytes(header: &RawHeader, roi_pixels: &[usize]) -> Vec<u8> {
    let mut bytes = header.to_bytes();
    for k in 0..header.num_frames as usize {
        for (r, &count) in roi_pixels.iter().enumerate() {
            for i in 0..count {
                bytes.extend_from_slice(&marker(k, r, i).to_le_bytes());
            }
        }
    }
    bytes
}

/// v3.0 file: header, data block, then `footer` at the recorded offset.
pub fn xml_file_bytes(data: &[u8], footer: &str) -> Vec<u8> {
    let header = RawHeader {
        file_header_ver: 3.0,
        xml_offset: (HEADER_SIZE + data.len()) as u64,
        ..RawHeader::default()
    };
    let mut bytes = header.to_bytes();
    bytes.extend_from_slice(data);
    bytes.extend_from_slice(footer.as_bytes());
    bytes
}

pub fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}
