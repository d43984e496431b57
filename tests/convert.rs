//! Depth-conversion behavior across the standard bitmap depths.

use zendib::*;

/// 24-bit bitmap whose bottom row is the given (r, g, b) pixels.
fn truecolor_row(pixels: &[(u8, u8, u8)]) -> Bitmap {
    let mut bmp = Bitmap::allocate(pixels.len() as u32, 1, 24).unwrap();
    let row = bmp.row_bytes_mut(0).unwrap();
    for (x, &(r, g, b)) in pixels.iter().enumerate() {
        row[x * 3..x * 3 + 3].copy_from_slice(&[b, g, r]);
    }
    bmp
}

fn grey8(values: &[u8]) -> Bitmap {
    let mut bmp = Bitmap::allocate(values.len() as u32, 1, 8).unwrap();
    bmp.row_bytes_mut(0).unwrap()[..values.len()].copy_from_slice(values);
    bmp
}

fn converted(outcome: ConvertOutcome) -> Bitmap {
    match outcome {
        ConvertOutcome::Converted(bmp) => bmp,
        ConvertOutcome::Unchanged => panic!("expected a converted bitmap"),
    }
}

// ── no-op detection ──────────────────────────────────────────────────

#[test]
fn same_depth_is_unchanged() {
    let cases = [
        (1, TargetDepth::OneBitThreshold),
        (4, TargetDepth::FourBit),
        (8, TargetDepth::EightBit),
        (16, TargetDepth::Sixteen555),
        (24, TargetDepth::TwentyFour),
        (32, TargetDepth::ThirtyTwo),
    ];
    for (bpp, target) in cases {
        let bmp = Bitmap::allocate(7, 3, bpp).unwrap();
        let out = convert(&bmp, target, &ConvertOptions::new()).unwrap();
        assert!(out.is_unchanged(), "{bpp} bpp to {target:?}");
    }
}

#[test]
fn mask_change_is_not_a_no_op() {
    let bmp = Bitmap::allocate(4, 2, 16).unwrap();
    assert_eq!(bmp.masks(), (RED_MASK_555, GREEN_MASK_555, BLUE_MASK_555));

    let out = converted(convert(&bmp, TargetDepth::Sixteen565, &ConvertOptions::new()).unwrap());
    assert_eq!(out.bpp(), 16);
    assert_eq!(out.masks(), (RED_MASK_565, GREEN_MASK_565, BLUE_MASK_565));

    let back = convert(&out, TargetDepth::Sixteen565, &ConvertOptions::new()).unwrap();
    assert!(back.is_unchanged());
}

#[test]
fn extended_image_types_pass_through() {
    let bmp = Bitmap::allocate_typed(4, 4, ImageType::Float).unwrap();
    let out = convert(&bmp, TargetDepth::TwentyFour, &ConvertOptions::new()).unwrap();
    assert!(out.is_unchanged());
}

#[test]
fn convert_replacing_hands_back_the_original() {
    let mut bmp = Bitmap::allocate(4, 2, 24).unwrap();
    bmp.metadata_mut()
        .set("Label", TagValue::Ascii("original".into()));
    let same = convert_replacing(bmp, TargetDepth::TwentyFour, &ConvertOptions::new()).unwrap();
    assert_eq!(same.bpp(), 24);
    assert!(same.metadata().get("Label").is_some());
}

// ── palette carryover ────────────────────────────────────────────────

#[test]
fn one_bit_to_eight_maps_to_index_ends() {
    let mut bmp = Bitmap::allocate(8, 1, 1).unwrap();
    bmp.row_bytes_mut(0).unwrap()[0] = 0b1100_0000;

    let out = converted(convert(&bmp, TargetDepth::EightBit, &ConvertOptions::new()).unwrap());
    assert_eq!(out.bpp(), 8);
    assert_eq!(
        out.row_bytes(0).unwrap(),
        &[255, 255, 0, 0, 0, 0, 0, 0][..]
    );
    // The two source colors land at the ramp ends.
    let pal = out.palette().unwrap();
    assert_eq!(pal.get(0).unwrap(), RgbQuad::new(0, 0, 0));
    assert_eq!(pal.get(255).unwrap(), RgbQuad::new(255, 255, 255));
}

#[test]
fn four_bit_to_eight_keeps_indices_and_colors() {
    let mut bmp = Bitmap::allocate(4, 1, 4).unwrap();
    let mut entries = [RgbQuad::default(); 16];
    entries[3] = RgbQuad::new(200, 10, 10);
    entries[9] = RgbQuad::new(10, 200, 10);
    bmp.set_palette(&entries).unwrap();
    bmp.row_bytes_mut(0).unwrap()[..2].copy_from_slice(&[0x39, 0x33]);

    let out = converted(convert(&bmp, TargetDepth::EightBit, &ConvertOptions::new()).unwrap());
    assert_eq!(out.row_bytes(0).unwrap(), &[3, 9, 3, 3][..]);
    let pal = out.palette().unwrap();
    assert_eq!(pal.get(3).unwrap(), RgbQuad::new(200, 10, 10));
    assert_eq!(pal.get(9).unwrap(), RgbQuad::new(10, 200, 10));
}

#[test]
fn one_bit_to_four_keeps_the_two_entry_palette() {
    let mut bmp = Bitmap::allocate(8, 1, 1).unwrap();
    bmp.set_palette(&[RgbQuad::new(255, 0, 0), RgbQuad::new(0, 0, 255)])
        .unwrap();
    bmp.row_bytes_mut(0).unwrap()[0] = 0b1010_0110;

    let out = converted(convert(&bmp, TargetDepth::FourBit, &ConvertOptions::new()).unwrap());
    assert_eq!(out.bpp(), 4);
    // Indices expand to nibbles without touching the colors.
    assert_eq!(out.row_bytes(0).unwrap(), &[0x10, 0x10, 0x01, 0x10][..]);
    assert_eq!(out.colors_used(), 2);
    let pal = out.palette().unwrap();
    assert_eq!(pal.get(0).unwrap(), RgbQuad::new(255, 0, 0));
    assert_eq!(pal.get(1).unwrap(), RgbQuad::new(0, 0, 255));
}

#[test]
fn eight_bit_grey_to_four_shifts_down() {
    let bmp = grey8(&[0, 17, 128, 255]);
    let out = converted(convert(&bmp, TargetDepth::FourBit, &ConvertOptions::new()).unwrap());
    assert_eq!(out.bpp(), 4);
    assert_eq!(out.row_bytes(0).unwrap(), &[0x01, 0x8F][..]);
}

// ── truecolor paths ──────────────────────────────────────────────────

#[test]
fn palette_to_truecolor_expands_entries() {
    let bmp = grey8(&[0, 128, 255]);
    let out = converted(convert(&bmp, TargetDepth::TwentyFour, &ConvertOptions::new()).unwrap());
    assert_eq!(
        out.row_bytes(0).unwrap(),
        &[0, 0, 0, 128, 128, 128, 255, 255, 255][..]
    );

    let out = converted(convert(&bmp, TargetDepth::ThirtyTwo, &ConvertOptions::new()).unwrap());
    assert_eq!(
        out.row_bytes(0).unwrap(),
        &[0, 0, 0, 255, 128, 128, 128, 255, 255, 255, 255, 255][..]
    );
}

#[test]
fn sixteen_bit_extremes_round_trip() {
    let src = truecolor_row(&[(255, 0, 0), (0, 255, 0), (0, 0, 255), (255, 255, 255)]);
    for target in [TargetDepth::Sixteen555, TargetDepth::Sixteen565] {
        let packed = converted(convert(&src, target, &ConvertOptions::new()).unwrap());
        assert_eq!(packed.bpp(), 16);
        let back = converted(convert(&packed, TargetDepth::TwentyFour, &ConvertOptions::new()).unwrap());
        assert!(
            compare(&src, &back, CompareFlags::ALL),
            "{target:?} altered saturated channels"
        );
    }
}

#[test]
fn thirty_two_to_twenty_four_drops_alpha() {
    let mut bmp = Bitmap::allocate(2, 1, 32).unwrap();
    bmp.row_bytes_mut(0)
        .unwrap()
        .copy_from_slice(&[1, 2, 3, 200, 4, 5, 6, 0]);
    let out = converted(convert(&bmp, TargetDepth::TwentyFour, &ConvertOptions::new()).unwrap());
    assert_eq!(out.row_bytes(0).unwrap(), &[1, 2, 3, 4, 5, 6][..]);
}

#[test]
fn indexed_to_truecolor_and_back_is_lossless() {
    // With the source palette reserved verbatim, remapping must restore
    // every index.
    let mut bmp = Bitmap::allocate(16, 2, 8).unwrap();
    for row in 0..2 {
        let bytes = bmp.row_bytes_mut(row).unwrap();
        for (x, slot) in bytes.iter_mut().enumerate() {
            *slot = (x * 16 + row as usize * 3) as u8;
        }
    }
    let reserve = bmp.palette().unwrap().entries();

    let truecolor =
        converted(convert(&bmp, TargetDepth::TwentyFour, &ConvertOptions::new()).unwrap());
    let opts = ConvertOptions::new().reserve_palette(reserve);
    let back = converted(convert(&truecolor, TargetDepth::EightBit, &opts).unwrap());

    assert!(compare(&bmp, &back, CompareFlags::ALL));
}

// ── greyscale handling ───────────────────────────────────────────────

#[test]
fn force_greyscale_applies_rec601_weights() {
    let src = truecolor_row(&[(255, 0, 0), (0, 255, 0), (0, 0, 255)]);
    let opts = ConvertOptions::new().force_greyscale(true);
    let out = converted(convert(&src, TargetDepth::EightBit, &opts).unwrap());
    assert_eq!(out.row_bytes(0).unwrap(), &[76, 150, 27][..]);
    assert!(out.is_greyscale());
}

#[test]
fn force_greyscale_collapses_a_one_bit_color_palette() {
    let mut bmp = Bitmap::allocate(8, 1, 1).unwrap();
    bmp.set_palette(&[RgbQuad::new(255, 0, 0), RgbQuad::new(0, 0, 255)])
        .unwrap();
    bmp.row_bytes_mut(0).unwrap()[0] = 0b1010_0110;
    assert!(!bmp.is_greyscale());

    let opts = ConvertOptions::new().force_greyscale(true);
    let out = converted(convert(&bmp, TargetDepth::EightBit, &opts).unwrap());
    assert_eq!(out.bpp(), 8);
    // Entry 0 is red, entry 1 is blue; the pixels become their lumas.
    assert_eq!(
        out.row_bytes(0).unwrap(),
        &[27, 76, 27, 76, 76, 27, 27, 76][..]
    );
    assert!(out.is_greyscale());
    assert_eq!(out.color_type(), ColorType::MinIsBlack);
}

#[test]
fn reorder_canonicalizes_an_inverted_ramp() {
    let mut bmp = grey8(&[0, 100, 255]);
    let inverted: Vec<RgbQuad> = (0..256)
        .map(|i| RgbQuad::new(255 - i as u8, 255 - i as u8, 255 - i as u8))
        .collect();
    bmp.set_palette(&inverted).unwrap();
    assert_eq!(bmp.color_type(), ColorType::MinIsWhite);

    let opts = ConvertOptions::new().reorder_palette(true);
    let out = converted(convert(&bmp, TargetDepth::EightBit, &opts).unwrap());
    assert_eq!(out.color_type(), ColorType::MinIsBlack);
    // Same colors, now stored under ramp order.
    assert_eq!(out.row_bytes(0).unwrap(), &[255, 155, 0][..]);
}

// ── 1-bit reduction ──────────────────────────────────────────────────

#[test]
fn threshold_splits_at_the_given_level() {
    let src = grey8(&[10, 200, 10, 200]);
    let out = converted(convert(&src, TargetDepth::OneBitThreshold, &ConvertOptions::new()).unwrap());
    assert_eq!(out.bpp(), 1);
    assert_eq!(out.row_bytes(0).unwrap()[0], 0b0101_0000);

    let all_set = ConvertOptions::new().threshold(10);
    let out = converted(convert(&src, TargetDepth::OneBitThreshold, &all_set).unwrap());
    assert_eq!(out.row_bytes(0).unwrap()[0], 0b1111_0000);
}

#[test]
fn dithered_flat_extremes_stay_flat() {
    for kind in [
        DitherKind::FloydSteinberg,
        DitherKind::Bayer4x4,
        DitherKind::Bayer8x8,
    ] {
        let opts = ConvertOptions::new().dither(kind);
        let dark = grey8(&[0, 0, 0, 0, 0, 0, 0, 0]);
        let out = converted(convert(&dark, TargetDepth::OneBitDither, &opts).unwrap());
        assert_eq!(out.row_bytes(0).unwrap()[0], 0, "{kind:?}");

        let light = grey8(&[255; 8]);
        let out = converted(convert(&light, TargetDepth::OneBitDither, &opts).unwrap());
        assert_eq!(out.row_bytes(0).unwrap()[0], 0xFF, "{kind:?}");
    }
}

// ── metadata ─────────────────────────────────────────────────────────

#[test]
fn conversion_carries_metadata() {
    let mut src = truecolor_row(&[(1, 2, 3)]);
    src.metadata_mut()
        .set("Comment", TagValue::Ascii("keep me".into()));
    let out = converted(convert(&src, TargetDepth::ThirtyTwo, &ConvertOptions::new()).unwrap());
    assert_eq!(
        out.metadata().get("Comment"),
        Some(&TagValue::Ascii("keep me".into()))
    );
}
