use gradient::{shade, ColorStops, SurfaceUniforms};
use renderer::{
    Backdrop, BackdropOptions, BackdropState, ManualClock, RedrawFlag, SoftwareSurface,
    SurfaceGeometry, TickOutcome,
};

fn page_stops() -> ColorStops {
    ColorStops::parse(&["#951515", "#131d7c", "#1b0553"]).expect("page colors parse")
}

fn mount(clock: &ManualClock, flag: &RedrawFlag) -> Backdrop<SoftwareSurface> {
    let options = BackdropOptions::default();
    Backdrop::mount(
        page_stops(),
        options,
        SurfaceGeometry::fixed(24, 12),
        |geometry| Ok(SoftwareSurface::new(geometry, &options)),
        clock.source(),
        flag.clone(),
    )
}

fn expected_pixel(stops: &ColorStops, time: f32, x: u32, y: u32) -> [u8; 3] {
    let mut uniforms = SurfaceUniforms::new(stops);
    uniforms.set_elapsed_time(time);
    let p = [(x as f32 + 0.5) / 24.0, 1.0 - (y as f32 + 0.5) / 12.0];
    shade(p, &uniforms).to_rgb8()
}

#[test]
fn redraw_flag_drives_one_tick_at_a_time() {
    let clock = ManualClock::new();
    let flag = RedrawFlag::new();
    let mut backdrop = mount(&clock, &flag);

    let mut frames = 0;
    for step in 0..5 {
        assert!(flag.take(), "a tick should be pending before step {step}");
        assert!(!flag.is_pending());
        clock.advance(1.0 / 60.0);
        assert_eq!(backdrop.tick(), TickOutcome::Rendered);
        frames += 1;
    }
    assert_eq!(backdrop.frames_rendered(), frames);

    backdrop.unmount();
    assert!(!flag.is_pending());
    assert_eq!(backdrop.state(), BackdropState::Unmounted);
    assert!(backdrop.surface().is_none());
}

#[test]
fn animation_continues_across_prop_updates() {
    let clock = ManualClock::new();
    let flag = RedrawFlag::new();
    let mut backdrop = mount(&clock, &flag);

    clock.set(5.0);
    backdrop.tick();
    let before = backdrop
        .surface()
        .expect("surface is mounted")
        .image()
        .get_pixel(3, 4)
        .0;
    assert_eq!(before, expected_pixel(&page_stops(), 5.0, 3, 4));

    // Same colors spelled differently: nothing changes.
    let respelled = ColorStops::parse(&["#951515", "#131D7C", "#1B0553"]).unwrap();
    assert!(!backdrop.set_color_stops(respelled));

    // New colors apply on the next frame without restarting the clock.
    let sunset = ColorStops::parse(&["#ff7e5f", "#feb47b", "#6a3093"]).unwrap();
    assert!(backdrop.set_color_stops(sunset));
    clock.set(5.5);
    backdrop.tick();

    assert_eq!(backdrop.uniforms().elapsed_time, 5.5);
    let after = backdrop.surface().unwrap().image().get_pixel(3, 4).0;
    assert_eq!(after, expected_pixel(&sunset, 5.5, 3, 4));
}
