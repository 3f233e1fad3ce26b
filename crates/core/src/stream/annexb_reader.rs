use crate::shared::video_codec::VideoCodec;

/// One picture's worth of Annex-B bytes, start codes included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessUnit {
    pub data: Vec<u8>,
    pub is_keyframe: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NalKind {
    Slice { first_in_picture: bool, keyframe: bool },
    /// Parameter sets, SEI, delimiters: open a new access unit after a slice.
    Prefix,
    /// End-of-sequence, filler and suffix SEI: trail the current unit.
    Suffix,
}

/// Splits a raw H.264/H.265 byte stream into access units.
///
/// Parameter sets preceding the first picture land in the first unit, so its
/// payload carries the stream configuration. Bytes before the first start
/// code are ignored.
pub fn split_access_units(data: &[u8], codec: VideoCodec) -> Vec<AccessUnit> {
    let nals = nal_units(data);
    let mut units = Vec::new();

    let Some(&(first_start, _)) = nals.first() else {
        return units;
    };
    let mut unit_start = first_start;
    let mut has_slice = false;
    let mut keyframe = false;

    for (index, &(start, payload)) in nals.iter().enumerate() {
        let end = nals.get(index + 1).map_or(data.len(), |&(next, _)| next);
        let kind = classify(codec, &data[payload..end]);

        let begins_unit = match kind {
            NalKind::Slice {
                first_in_picture, ..
            } => has_slice && first_in_picture,
            NalKind::Prefix => has_slice,
            NalKind::Suffix => false,
        };
        if begins_unit {
            units.push(AccessUnit {
                data: data[unit_start..start].to_vec(),
                is_keyframe: keyframe,
            });
            unit_start = start;
            has_slice = false;
            keyframe = false;
        }

        if let NalKind::Slice { keyframe: key, .. } = kind {
            has_slice = true;
            keyframe |= key;
        }
    }

    units.push(AccessUnit {
        data: data[unit_start..].to_vec(),
        is_keyframe: keyframe,
    });
    units
}

/// Locates every NAL unit as `(start code offset, header offset)`.
///
/// A zero byte directly before a 3-byte start code is taken as part of a
/// 4-byte start code.
fn nal_units(data: &[u8]) -> Vec<(usize, usize)> {
    let mut nals = Vec::new();
    let mut i = 0;
    while i + 3 <= data.len() {
        if data[i] == 0 && data[i + 1] == 0 && data[i + 2] == 1 {
            let start = if i > 0 && data[i - 1] == 0 { i - 1 } else { i };
            nals.push((start, i + 3));
            i += 3;
        } else {
            i += 1;
        }
    }
    nals
}

fn classify(codec: VideoCodec, nal: &[u8]) -> NalKind {
    let Some(&header) = nal.first() else {
        return NalKind::Suffix;
    };
    match codec {
        VideoCodec::H264 => match header & 0x1f {
            // first_mb_in_slice is ue(v); a leading 1 bit encodes 0.
            nal_type @ 1..=5 => NalKind::Slice {
                first_in_picture: nal.get(1).map_or(true, |b| b & 0x80 != 0),
                keyframe: nal_type == 5,
            },
            6..=9 | 14..=18 => NalKind::Prefix,
            _ => NalKind::Suffix,
        },
        VideoCodec::H265 => match (header >> 1) & 0x3f {
            nal_type @ 0..=31 => NalKind::Slice {
                first_in_picture: nal.get(2).map_or(true, |b| b & 0x80 != 0),
                keyframe: (16..=23).contains(&nal_type),
            },
            32..=35 | 39 | 41..=44 | 48..=55 => NalKind::Prefix,
            _ => NalKind::Suffix,
        },
    }
}
