//! Metadata from the LightField XML footer (v3.0).
//!
//! Paths read, relative to the `SpeFormat` root:
//!
//! - `DataFormat/DataBlock[type=Frame]` and its `DataBlock[type=Region]` children
//! - `MetaFormat/MetaBlock` with its tracked-value elements
//! - `Calibrations/WavelengthMapping`, `SensorInformation`, `SensorMapping`
//! - `GeneralInformation` (optional)

use crate::footer::TreeNode;
use crate::{Error, Result};
use spexread_core::{
    evaluate_polynomial, Calibrations, FormatVersion, FrameInfo, GeneralInformation, MetaBlock,
    MetaFormat, PixelFormat, RoiInfo, SensorInformation, SensorMapping, SpeMetadata,
    TrackedField, TrackedFieldKind, ValueType, WavelengthCalibration,
};
use std::str::FromStr;

/// Builds metadata from a parsed footer, starting at its root element.
///
/// # Errors
/// Fails when required elements or attributes are missing or malformed, or
/// when the declared geometry is inconsistent.
pub fn from_xml<N: TreeNode>(root: N) -> Result<SpeMetadata> {
    if root.tag() != "SpeFormat" {
        return Err(Error::MissingElement(format!(
            "SpeFormat (root element is {})",
            root.tag()
        )));
    }
    let version: f32 = optional_attr(root, "version")?.unwrap_or(3.0);

    let meta_format = meta_format(root)?;
    let frame = root
        .find(&["DataFormat"])
        .and_then(|f| block_of_type(f, "Frame"))
        .ok_or_else(|| Error::MissingElement("DataFormat/DataBlock[type=Frame]".into()))?;
    let (frame_info, declared_rois) = frame_info(frame, &meta_format)?;

    let calibrations = match root.child("Calibrations") {
        Some(node) => calibrations(node)?,
        None => Calibrations::default(),
    };
    let general = general_information(root);

    log::debug!(
        "XML footer v{version}: {} frame(s), {} ROI(s), {}, frame stride {} bytes, {} meta block(s)",
        frame_info.count,
        frame_info.rois.len(),
        frame_info.pixel_format,
        frame_info.stride,
        meta_format.blocks.len()
    );

    Ok(SpeMetadata::new(
        FormatVersion::Xml(version),
        frame_info,
        meta_format,
        calibrations,
        general,
        declared_rois,
    )?)
}

fn block_of_type<N: TreeNode>(parent: N, kind: &str) -> Option<N> {
    parent
        .children_named("DataBlock")
        .into_iter()
        .find(|b| b.attr("type") == Some(kind))
}

fn frame_info<N: TreeNode>(frame: N, meta_format: &MetaFormat) -> Result<(FrameInfo, usize)> {
    let count: usize = required_attr(frame, "count")?;
    let pixel_format: PixelFormat = required_attr(frame, "pixelFormat")?;
    let stride: usize = required_attr(frame, "stride")?;

    let regions: Vec<N> = frame
        .children_named("DataBlock")
        .into_iter()
        .filter(|b| b.attr("type") == Some("Region"))
        .collect();
    let rois = regions
        .iter()
        .map(|&region| roi_info(region, pixel_format))
        .collect::<Result<Vec<_>>>()?;
    if let Some(declared) = optional_attr::<_, usize>(frame, "size")? {
        let total = rois
            .iter()
            .try_fold(0usize, |acc, r| acc.checked_add(r.size))
            .unwrap_or(usize::MAX);
        if total != declared {
            return Err(spexread_core::Error::inconsistent(
                "Frame size (sum of Region sizes)",
                declared,
                total,
            )
            .into());
        }
    }

    let meta_index = match optional_attr::<_, u32>(frame, "metaFormat")? {
        Some(id) => Some(
            meta_format
                .blocks
                .iter()
                .position(|b| b.id == id)
                .ok_or_else(|| Error::MissingElement(format!("MetaFormat/MetaBlock[id={id}]")))?,
        ),
        None if !meta_format.blocks.is_empty() => Some(0),
        None => None,
    };

    let frame_info = FrameInfo {
        count,
        rois,
        stride,
        pixel_format,
        meta_format: meta_index,
    };
    Ok((frame_info, regions.len()))
}

fn roi_info<N: TreeNode>(region: N, pixel_format: PixelFormat) -> Result<RoiInfo> {
    let width: usize = required_attr(region, "width")?;
    let height: usize = required_attr(region, "height")?;
    let bpp = pixel_format.bytes_per_pixel();
    let size = match optional_attr(region, "size")? {
        Some(size) => size,
        None => width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(bpp))
            .ok_or_else(|| {
                spexread_core::Error::overflow("Region height", height, width.saturating_mul(bpp))
            })?,
    };
    let stride = optional_attr(region, "stride")?.unwrap_or(size);
    Ok(RoiInfo {
        width,
        height,
        size,
        stride,
    })
}

fn meta_format<N: TreeNode>(root: N) -> Result<MetaFormat> {
    let Some(format) = root.child("MetaFormat") else {
        return Ok(MetaFormat::default());
    };
    let blocks = format
        .children_named("MetaBlock")
        .into_iter()
        .enumerate()
        .map(|(i, block)| meta_block(block, i))
        .collect::<Result<Vec<_>>>()?;
    Ok(MetaFormat { blocks })
}

fn meta_block<N: TreeNode>(block: N, index: usize) -> Result<MetaBlock> {
    let id = match optional_attr(block, "id")? {
        Some(id) => id,
        None => u32::try_from(index + 1).unwrap_or(u32::MAX),
    };
    let mut fields = Vec::new();
    for element in block.child_elements() {
        let Some(kind) = tracked_kind(element) else {
            log::warn!(
                "MetaBlock {id}: skipping unknown tracked element <{}>",
                element.tag()
            );
            continue;
        };
        let value_type: ValueType = required_attr(element, "type")?;
        if let Some(bits) = optional_attr::<_, u32>(element, "bitDepth")? {
            if bits != value_type.bit_depth() {
                return Err(Error::InvalidAttribute {
                    element: element.tag().to_string(),
                    attribute: "bitDepth".into(),
                    message: format!("{bits} does not match type width {}", value_type.bit_depth()),
                });
            }
        }
        fields.push(TrackedField {
            kind,
            value_type,
            resolution: optional_attr(element, "resolution")?,
        });
    }
    Ok(MetaBlock { id, fields })
}

fn tracked_kind<N: TreeNode>(element: N) -> Option<TrackedFieldKind> {
    match (element.tag(), element.attr("event"), element.attr("component")) {
        ("TimeStamp", Some("ExposureStarted"), _) => Some(TrackedFieldKind::ExposureStarted),
        ("TimeStamp", Some("ExposureEnded"), _) => Some(TrackedFieldKind::ExposureEnded),
        ("FrameTrackingNumber", _, _) => Some(TrackedFieldKind::FrameTrackingNumber),
        ("GateTracking", _, Some("Delay")) => Some(TrackedFieldKind::GateTrackingDelay),
        ("GateTracking", _, Some("Width")) => Some(TrackedFieldKind::GateTrackingWidth),
        ("ModulationTracking", _, Some("Phase")) => Some(TrackedFieldKind::ModulationTrackingPhase),
        _ => None,
    }
}

fn calibrations<N: TreeNode>(node: N) -> Result<Calibrations> {
    let sensor_information = match node.child("SensorInformation") {
        Some(info) => SensorInformation {
            width: optional_attr(info, "width")?.unwrap_or(0),
            height: optional_attr(info, "height")?.unwrap_or(0),
            orientation: info.attr("orientation").unwrap_or("Normal").to_string(),
        },
        None => SensorInformation::default(),
    };

    let sensor_mapping = node
        .children_named("SensorMapping")
        .into_iter()
        .map(|m| -> Result<SensorMapping> {
            Ok(SensorMapping {
                x: optional_attr(m, "x")?.unwrap_or(0),
                y: optional_attr(m, "y")?.unwrap_or(0),
                width: required_attr(m, "width")?,
                height: required_attr(m, "height")?,
                x_binning: optional_attr(m, "xBinning")?.unwrap_or(1),
                y_binning: optional_attr(m, "yBinning")?.unwrap_or(1),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let wavelength = match node.child("WavelengthMapping") {
        Some(mapping) => wavelength_calibration(mapping, sensor_information.width)?,
        None => None,
    };

    Ok(Calibrations {
        wavelength,
        sensor_information,
        sensor_mapping,
    })
}

fn wavelength_calibration<N: TreeNode>(
    mapping: N,
    sensor_width: usize,
) -> Result<Option<WavelengthCalibration>> {
    let orientation = mapping.attr("orientation").map(str::to_string);

    if let Some(node) = mapping.child("Wavelength") {
        let wavelengths = parse_list(node, "Wavelength")?;
        return Ok(Some(WavelengthCalibration {
            orientation,
            coefficients: None,
            wavelengths,
        }));
    }
    if let Some(node) = mapping.child("WavelengthError") {
        // Pairs of "wavelength,error" separated by whitespace.
        let mut wavelengths = Vec::new();
        for pair in node.text().unwrap_or_default().split_whitespace() {
            let value = pair.split(',').next().unwrap_or_default();
            wavelengths.push(parse_number(value, "WavelengthError")?);
        }
        return Ok(Some(WavelengthCalibration {
            orientation,
            coefficients: None,
            wavelengths,
        }));
    }
    if let Some(node) = mapping.child("Polynomial") {
        let raw = node.attr("coefficients").unwrap_or_default();
        let coefficients = raw
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(|s| parse_number(s, "Polynomial"))
            .collect::<Result<Vec<_>>>()?;
        let wavelengths = evaluate_polynomial(&coefficients, sensor_width);
        return Ok(Some(WavelengthCalibration {
            orientation,
            coefficients: Some(coefficients),
            wavelengths,
        }));
    }
    Ok(None)
}

fn general_information<N: TreeNode>(root: N) -> GeneralInformation {
    let Some(info) = root.child("GeneralInformation") else {
        return GeneralInformation::default();
    };
    let file = info.child("FileInformation");
    let application = info.child("Application");
    GeneralInformation {
        date: file.and_then(|f| f.attr("created").map(str::to_string)),
        software: application.map(|a| {
            let name = a.attr("name").unwrap_or("LightField");
            match a.attr("version") {
                Some(v) => format!("{name} {v}"),
                None => name.to_string(),
            }
        }),
        experiment_time_local: None,
        experiment_time_utc: None,
    }
}

fn parse_list<N: TreeNode>(node: N, element: &str) -> Result<Vec<f64>> {
    node.text()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_number(s, element))
        .collect()
}

fn parse_number(value: &str, element: &str) -> Result<f64> {
    value.trim().parse().map_err(|e: std::num::ParseFloatError| Error::InvalidAttribute {
        element: element.to_string(),
        attribute: "text".into(),
        message: format!("{value:?}: {e}"),
    })
}

fn optional_attr<N: TreeNode, T: FromStr>(node: N, name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    node.attr(name)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| Error::InvalidAttribute {
                element: node.tag().to_string(),
                attribute: name.to_string(),
                message: format!("{raw:?}: {e}"),
            })
        })
        .transpose()
}

fn required_attr<N: TreeNode, T: FromStr>(node: N, name: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    optional_attr(node, name)?.ok_or_else(|| Error::InvalidAttribute {
        element: node.tag().to_string(),
        attribute: name.to_string(),
        message: "attribute is missing".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footer::parse_footer;
    use approx::assert_relative_eq;
    use spexread_core::{Axis, Orientation};

    const FOOTER: &str = r#"<SpeFormat version="3.0" xmlns="http://www.princetoninstruments.com/spe/2009">
      <DataFormat>
        <DataBlock type="Frame" version="3.0" count="4" pixelFormat="MonochromeUnsigned16" size="96" stride="116" metaFormat="1">
          <DataBlock type="Region" count="1" width="8" height="4" size="64" stride="64" calibrations="1,2"/>
          <DataBlock type="Region" count="1" width="4" height="4" size="32" stride="32"/>
        </DataBlock>
      </DataFormat>
      <MetaFormat>
        <MetaBlock id="1">
          <TimeStamp event="ExposureStarted" type="Int64" bitDepth="64" resolution="1000000">Exposure Started</TimeStamp>
          <GateTracking component="Delay" type="Double" bitDepth="64">Gate Tracking Delay</GateTracking>
          <FrameTrackingNumber type="Int32" bitDepth="32">Frame Tracking Number</FrameTrackingNumber>
        </MetaBlock>
      </MetaFormat>
      <Calibrations>
        <WavelengthMapping id="1" orientation="FlipHorizontal">
          <Wavelength xml:space="preserve">500.0,500.5,501.0,501.5,502.0,502.5,503.0,503.5</Wavelength>
        </WavelengthMapping>
        <SensorInformation id="2" width="8" height="8" orientation="Normal"/>
        <SensorMapping id="3" x="0" y="0" width="8" height="4" xBinning="1" yBinning="1"/>
        <SensorMapping id="4" x="4" y="4" width="4" height="4" xBinning="1" yBinning="1"/>
      </Calibrations>
      <GeneralInformation>
        <FileInformation created="2024-03-01T10:00:00"/>
        <Application name="LightField" version="6.16"/>
      </GeneralInformation>
    </SpeFormat>"#;

    fn metadata(text: &str) -> Result<SpeMetadata> {
        let doc = parse_footer(text, 0)?;
        from_xml(doc.root_element())
    }

    #[test]
    fn test_frame_geometry() {
        let metadata = metadata(FOOTER).unwrap();
        let frame = &metadata.frame_info;
        assert_eq!(metadata.version, FormatVersion::Xml(3.0));
        assert_eq!(frame.count, 4);
        assert_eq!(frame.pixel_format, PixelFormat::MonochromeUnsigned16);
        assert_eq!(frame.rois.len(), 2);
        assert_eq!(frame.rois[0].width, 8);
        assert_eq!(frame.rois[1].size, 32);
        assert_eq!(frame.stride, 116);
        assert_eq!(frame.meta_format, Some(0));
        assert_eq!(metadata.tracking_block_size(), 20);
    }

    #[test]
    fn test_meta_block() {
        let metadata = metadata(FOOTER).unwrap();
        let block = metadata.active_meta_block().unwrap();
        assert_eq!(block.id, 1);
        assert_eq!(block.fields.len(), 3);
        assert_relative_eq!(block.fields[0].divisor(), 1e6);
        assert_relative_eq!(block.fields[1].divisor(), 1.0);
        let kinds: Vec<_> = block.layout().iter().map(|(o, f)| (*o, f.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (0, TrackedFieldKind::ExposureStarted),
                (8, TrackedFieldKind::FrameTrackingNumber),
                (12, TrackedFieldKind::GateTrackingDelay),
            ]
        );
    }

    #[test]
    fn test_calibrations() {
        let metadata = metadata(FOOTER).unwrap();
        let calibrations = &metadata.calibrations;
        assert_eq!(calibrations.wl().len(), 8);
        assert_relative_eq!(calibrations.wl()[1], 500.5);
        assert_eq!(
            calibrations.calibration_orientation(),
            Orientation::new(true, false, false)
        );
        assert_eq!(calibrations.sensor_orientation(), Orientation::NORMAL);
        assert_eq!(calibrations.sensor_mapping.len(), 2);
        assert_eq!(calibrations.sensor_mapping[1].x, 4);

        assert_eq!(metadata.dimension_order(), (Axis::Y, Axis::X));
        assert_eq!(metadata.general.software.as_deref(), Some("LightField 6.16"));
        assert_eq!(metadata.general.date.as_deref(), Some("2024-03-01T10:00:00"));
    }

    #[test]
    fn test_stride_mismatch() {
        let text = FOOTER.replace(r#"stride="116""#, r#"stride="120""#);
        let err = metadata(&text).unwrap_err();
        assert!(matches!(
            err,
            Error::CoreError(spexread_core::Error::SchemaConsistency { .. })
        ));
    }

    #[test]
    fn test_frame_size_must_match_regions() {
        let text = FOOTER.replace(r#"size="96""#, r#"size="128""#);
        match metadata(&text) {
            Err(Error::CoreError(err)) => assert_eq!(
                err,
                spexread_core::Error::SchemaConsistency {
                    what: "Frame size (sum of Region sizes)".into(),
                    expected: 128,
                    actual: 96,
                }
            ),
            other => panic!("expected a frame size mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_region_size_overflow() {
        let text = FOOTER.replace(
            r#"width="4" height="4" size="32" stride="32""#,
            r#"width="4294967296" height="4294967296""#,
        );
        assert!(matches!(
            metadata(&text),
            Err(Error::CoreError(spexread_core::Error::SchemaConsistency { .. }))
        ));
    }

    #[test]
    fn test_bit_depth_mismatch() {
        let text = FOOTER.replace(
            r#"type="Int32" bitDepth="32""#,
            r#"type="Int32" bitDepth="64""#,
        );
        assert!(matches!(
            metadata(&text),
            Err(Error::InvalidAttribute { .. })
        ));
    }

    #[test]
    fn test_missing_frame_block() {
        let text = r#"<SpeFormat version="3.0"><DataFormat/></SpeFormat>"#;
        assert!(matches!(metadata(text), Err(Error::MissingElement(_))));

        let text = r#"<Other/>"#;
        assert!(matches!(metadata(text), Err(Error::MissingElement(_))));
    }

    #[test]
    fn test_polynomial_and_error_calibrations() {
        let text = r#"<SpeFormat version="3.0"><DataFormat><DataBlock type="Frame" count="1" pixelFormat="MonochromeFloating32" stride="16"><DataBlock type="Region" width="4" height="1"/></DataBlock></DataFormat><Calibrations><WavelengthMapping><Polynomial coefficients="100, 2"/></WavelengthMapping><SensorInformation width="4" height="1"/></Calibrations></SpeFormat>"#;
        let m = metadata(text).unwrap();
        assert_eq!(m.calibrations.wl(), &[100.0, 102.0, 104.0, 106.0]);
        assert!(m.frame_info.meta_format.is_none());
        assert_eq!(m.calibrations.sensor_information.orientation, "Normal");

        let text = text.replace(
            r#"<Polynomial coefficients="100, 2"/>"#,
            "<WavelengthError>400.5,0.1 401.5,0.1</WavelengthError>",
        );
        let m = metadata(&text).unwrap();
        assert_eq!(m.calibrations.wl(), &[400.5, 401.5]);
    }
}
