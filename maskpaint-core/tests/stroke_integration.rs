//! Integration tests for painting through the editor state (maskpaint-core).
//!
//! Covers the image-space scenarios and the scale-invariance properties of
//! the brush.

use maskpaint_core::raster::{is_removed, REMOVE_PIXEL};
use maskpaint_core::{EditorConfig, EditorState, MaskRaster, PaintMode, PointerEvent};
use proptest::prelude::*;

/// Editor with a loaded source at a given container width.
fn editor(image: (u32, u32), container: f32, brush: f32) -> EditorState {
    let mut state = EditorState::new(EditorConfig {
        brush_size: brush,
        ..EditorConfig::default()
    });
    state.resize_container(container, 1.0);
    state.load_source(image.0, image.1).expect("load");
    state
}

/// Count removed pixels in column `x`.
fn removed_in_column(raster: &MaskRaster, x: u32) -> u32 {
    let mut count = 0;
    for y in 0..raster.height() {
        if is_removed(&raster.pixel(x, y).expect("px")) {
            count += 1;
        }
    }
    count
}

// ==========================================================================
// Scenarios
// ==========================================================================

#[test]
fn test_center_dab_at_unit_scale() {
    // Container as wide as the image -> scale 1.0.
    let mut state = editor((892, 1248), 892.0, 30.0);
    let fit = state.layout().fit.expect("fit");
    assert!((fit.scale - 1.0).abs() < 1e-6);

    state
        .handle_pointer(&PointerEvent::down(446.0, 624.0))
        .expect("down");
    state
        .handle_pointer(&PointerEvent::up(446.0, 624.0))
        .expect("up");

    let raster = state.raster().expect("raster");
    assert_eq!(raster.pixel(446, 624), Some(REMOVE_PIXEL));
    assert!(is_removed(&raster.pixel(446 + 14, 624).expect("px")));
    assert!(!is_removed(&raster.pixel(446 + 16, 624).expect("px")));
    assert!(!is_removed(&raster.pixel(446, 624 - 17).expect("px")));

    // pi * 15^2 ~= 707
    let removed = raster.count_removed();
    assert!((650..=770).contains(&removed), "removed = {removed}");
}

#[test]
fn test_resize_mid_session_keeps_raster() {
    let mut state = editor((892, 1248), 900.0, 40.0);
    state
        .handle_pointer(&PointerEvent::down(100.0, 100.0))
        .expect("down");
    state
        .handle_pointer(&PointerEvent::moved(600.0, 900.0))
        .expect("move");
    state
        .handle_pointer(&PointerEvent::up(600.0, 900.0))
        .expect("up");

    let before = state.raster().cloned().expect("raster");
    let old_scale = state.layout().fit.expect("fit").scale;

    state.resize_container(400.0, 1.0);

    assert_eq!(state.raster(), Some(&before));
    let new_scale = state.layout().fit.expect("fit").scale;
    assert!(new_scale < old_scale);
    assert_eq!(state.raster().map(MaskRaster::dimensions), Some((892, 1248)));
}

#[test]
fn test_strokes_after_resize_land_in_image_space() {
    let mut state = editor((800, 600), 800.0, 20.0);
    state.resize_container(400.0, 2.0);

    // Display (200, 150) is image (400, 300) at scale 0.5.
    state
        .handle_pointer(&PointerEvent::down(200.0, 150.0))
        .expect("down");
    let raster = state.raster().expect("raster");
    assert_eq!(raster.pixel(400, 300), Some(REMOVE_PIXEL));
    assert!(!is_removed(&raster.pixel(200, 150).expect("px")));
}

#[test]
fn test_surface_origin_is_subtracted() {
    let mut state = editor((400, 400), 400.0, 10.0);
    state.set_surface_origin(50.0, 80.0);
    state
        .handle_pointer(&PointerEvent::down(150.0, 180.0))
        .expect("down");
    let raster = state.raster().expect("raster");
    assert_eq!(raster.pixel(100, 100), Some(REMOVE_PIXEL));
}

#[test]
fn test_restore_mode_erases_painted_region() {
    let mut state = editor((200, 200), 400.0, 20.0);
    state
        .handle_pointer(&PointerEvent::down(100.0, 100.0))
        .expect("down");
    state.handle_pointer(&PointerEvent::up(100.0, 100.0)).expect("up");
    assert!(state.raster().expect("raster").count_removed() > 0);

    state.set_mode(PaintMode::Restore);
    state.set_brush_size(60.0);
    state
        .handle_pointer(&PointerEvent::down(100.0, 100.0))
        .expect("down");
    assert_eq!(state.raster().expect("raster").count_removed(), 0);
}

// ==========================================================================
// Properties
// ==========================================================================

/// A drag in viewport coordinates.
fn arb_stroke() -> impl Strategy<Value = Vec<(f32, f32)>> {
    prop::collection::vec((0.0f32..500.0, 0.0f32..400.0), 1..8)
}

proptest! {
    #[test]
    fn prop_reset_after_strokes_is_blank(
        strokes in prop::collection::vec(arb_stroke(), 0..5),
        brush in 5.0f32..150.0,
    ) {
        let mut state = editor((250, 200), 500.0, brush);
        for stroke in &strokes {
            let (x0, y0) = stroke[0];
            state.handle_pointer(&PointerEvent::down(x0, y0)).expect("down");
            for &(x, y) in &stroke[1..] {
                state.handle_pointer(&PointerEvent::moved(x, y)).expect("move");
            }
            state.handle_pointer(&PointerEvent::up(x0, y0)).expect("up");
        }

        state.clear().expect("clear");
        prop_assert!(state.raster().expect("raster").is_blank());
        prop_assert!(!state.painted_remove());
    }

    #[test]
    fn prop_stroke_width_is_scale_invariant(
        brush in 10.0f32..120.0,
        container in 320.0f32..1600.0,
    ) {
        let mut state = editor((400, 300), container, brush);
        let fit = state.layout().fit.expect("fit");
        let scale = fit.scale;

        // Horizontal drag across the middle of the image.
        let y = fit.offset_y + 150.0 * scale;
        state.handle_pointer(&PointerEvent::down(fit.offset_x + 50.0 * scale, y)).expect("down");
        state.handle_pointer(&PointerEvent::moved(fit.offset_x + 350.0 * scale, y)).expect("move");

        let raster = state.raster().expect("raster");
        #[allow(clippy::cast_precision_loss)]
        let measured = removed_in_column(raster, 200) as f32;
        let expected = (brush / scale).min(300.0);
        prop_assert!(
            (measured - expected).abs() <= 2.0,
            "brush {} scale {} measured {} expected {}",
            brush, scale, measured, expected
        );
    }

    #[test]
    fn prop_raster_matches_source_for_any_layout(
        container in 0.0f32..3000.0,
        dpr in 0.5f32..4.0,
        w in 1u32..400,
        h in 1u32..400,
    ) {
        let mut state = EditorState::default();
        state.resize_container(container, dpr);
        state.load_source(w, h).expect("load");
        prop_assert_eq!(state.raster().map(MaskRaster::dimensions), Some((w, h)));
        let surface = state.layout().surface;
        prop_assert!(surface.logical_width >= 320.0);
        prop_assert!(surface.device_pixel_ratio >= 1.0);
    }
}
