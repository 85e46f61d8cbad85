//! Text form of a [`PackedRegion`].
//!
//! Cells are walked column by column (`x * height + y`) and described as run
//! lengths alternating off/on, starting with off. Each run is an unsigned
//! 16-bit little-endian element of one contiguous buffer, which is then
//! base64 encoded with the standard alphabet. Runs longer than `u16::MAX` are
//! split by a zero-length run of the other state.

use crate::core::point::Point;
use crate::error::{FogboundError, Result};
use crate::map::region::PackedRegion;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

fn cells(region: &PackedRegion) -> impl Iterator<Item = bool> + '_ {
    let (width, height) = region.dimensions();
    let words_per_column = (height as usize + 63) / 64;
    let words = region.words();

    (0..width as usize).flat_map(move |x| {
        (0..height as usize).map(move |y| {
            let word = words[x * words_per_column + y / 64];
            (word >> (y % 64)) & 1 == 1
        })
    })
}

fn push_run(buffer: &mut Vec<u8>, mut run: usize) {
    while run > u16::MAX as usize {
        buffer.extend_from_slice(&u16::MAX.to_le_bytes());
        buffer.extend_from_slice(&0u16.to_le_bytes());
        run -= u16::MAX as usize;
    }
    buffer.extend_from_slice(&(run as u16).to_le_bytes());
}

pub fn encode_region(region: &PackedRegion) -> String {
    let mut buffer = Vec::new();
    let mut state = false;
    let mut run = 0usize;

    for on in cells(region) {
        if on != state {
            push_run(&mut buffer, run);
            state = on;
            run = 0;
        }
        run += 1;
    }

    if run > 0 {
        push_run(&mut buffer, run);
    }

    STANDARD.encode(buffer)
}

pub fn decode_region(width: u16, height: u16, text: &str) -> Result<PackedRegion> {
    let bytes = STANDARD.decode(text.trim())?;
    let expected = width as usize * height as usize;

    let mut on_cells = Vec::new();
    let mut index = 0usize;
    let mut state = false;

    let mut runs = bytes.chunks_exact(2);
    for pair in &mut runs {
        let run = u16::from_le_bytes([pair[0], pair[1]]) as usize;
        if index + run > expected {
            return Err(FogboundError::RegionLength {
                expected,
                found: index + run,
            });
        }

        if state {
            on_cells.extend((index..index + run).map(|i| {
                let (x, y) = (i / height as usize, i % height as usize);
                Point::new(x as i16, y as i16)
            }));
        }

        index += run;
        state = !state;
    }

    if !runs.remainder().is_empty() || index != expected {
        return Err(FogboundError::RegionLength {
            expected,
            found: index,
        });
    }

    Ok(PackedRegion::pack(width, height, on_cells))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_start_with_off_cells() {
        let region = PackedRegion::pack(2, 2, [Point::new(0, 0)]);
        let bytes = STANDARD.decode(encode_region(&region)).unwrap();
        assert_eq!(bytes, vec![0, 0, 1, 0, 3, 0]);
    }

    #[test]
    fn decoding_restores_the_region() {
        let region = PackedRegion::from_predicate(7, 70, |p| (p.x + p.y) % 3 == 0);
        let text = encode_region(&region);
        assert_eq!(decode_region(7, 70, &text).unwrap(), region);
    }

    #[test]
    fn long_runs_are_split() {
        let region = PackedRegion::full(300, 300);
        let bytes = STANDARD.decode(encode_region(&region)).unwrap();
        // off 0, on 65535, off 0, on 24465
        assert_eq!(bytes.len(), 8);
        assert_eq!(decode_region(300, 300, &encode_region(&region)).unwrap(), region);
    }

    #[test]
    fn short_data_is_rejected() {
        let text = encode_region(&PackedRegion::full(3, 3));
        assert!(matches!(
            decode_region(4, 4, &text),
            Err(FogboundError::RegionLength { expected: 16, found: 9 })
        ));
        assert!(matches!(decode_region(2, 2, "%%%"), Err(FogboundError::RegionDecode(_))));
    }
}
