use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use nightsky_starfield::{
    DrawCommand, FrameHandle, Host, ListenerId, StarfieldLayer, StarfieldSettings, Surface,
    Viewport, member_count,
};

/// Counts draw calls through a shared cell so the count survives teardown.
struct CountingSurface {
    draws: Rc<Cell<usize>>,
}

impl Surface for CountingSurface {
    fn resize(&mut self, _viewport: Viewport) {}

    fn submit(&mut self, commands: &[DrawCommand]) {
        assert_eq!(commands.first(), Some(&DrawCommand::Clear));
        self.draws.set(self.draws.get() + 1);
    }
}

/// Host that fires frames on demand, like a display refresh.
#[derive(Default)]
struct ManualHost {
    next: u64,
    pending: HashSet<FrameHandle>,
    listeners: HashSet<ListenerId>,
    cancelled: usize,
}

impl ManualHost {
    fn take_frame(&mut self) -> Option<FrameHandle> {
        let handle = *self.pending.iter().next()?;
        self.pending.remove(&handle);
        Some(handle)
    }
}

impl Host for ManualHost {
    fn request_frame(&mut self) -> FrameHandle {
        self.next += 1;
        let handle = FrameHandle(self.next);
        self.pending.insert(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending.remove(&handle) {
            self.cancelled += 1;
        }
    }

    fn subscribe_resize(&mut self) -> ListenerId {
        self.next += 1;
        let id = ListenerId(self.next);
        self.listeners.insert(id);
        id
    }

    fn unsubscribe_resize(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
    }
}

fn mount(
    host: &mut ManualHost,
    viewport: Viewport,
) -> (StarfieldLayer<CountingSurface>, Rc<Cell<usize>>) {
    let draws = Rc::new(Cell::new(0));
    let surface = CountingSurface {
        draws: draws.clone(),
    };
    let layer = StarfieldLayer::mount(
        Ok(surface),
        viewport,
        StarfieldSettings::default().with_seed(2024),
        host,
    );
    (layer, draws)
}

/// Run `frames` host frames, `frame_ms` apart.
fn run_frames(
    layer: &mut StarfieldLayer<CountingSurface>,
    host: &mut ManualHost,
    frames: usize,
    frame_ms: f64,
) {
    for i in 0..frames {
        let handle = host.take_frame().expect("layer should keep a frame pending");
        layer.on_frame(handle, i as f64 * frame_ms, 0.0, host);
    }
}

#[test]
fn mount_at_1024x768_creates_112_stars_in_bounds() {
    let mut host = ManualHost::default();
    let viewport = Viewport::new(1024.0, 768.0);
    let (layer, _) = mount(&mut host, viewport);

    let starfield = layer.starfield().unwrap();
    assert_eq!(starfield.stars().len(), 100 + member_count());
    assert_eq!(starfield.stars().len(), 112);
    for star in starfield.stars() {
        assert!(star.x >= 0.0 && star.x < 1024.0);
        assert!(star.y >= 0.0 && star.y < 768.0);
    }
}

#[test]
fn resizing_twice_does_not_accumulate_stars() {
    let mut host = ManualHost::default();
    let (mut layer, _) = mount(&mut host, Viewport::new(1024.0, 768.0));

    layer.on_resize(Viewport::new(1280.0, 720.0));
    layer.on_resize(Viewport::new(1280.0, 720.0));

    assert_eq!(layer.starfield().unwrap().stars().len(), 112);
}

#[test]
fn hundred_short_frames_spawn_no_shooting_star() {
    let mut host = ManualHost::default();
    let (mut layer, draws) = mount(&mut host, Viewport::new(1024.0, 768.0));

    run_frames(&mut layer, &mut host, 100, 16.0);

    assert_eq!(draws.get(), 100);
    assert_eq!(layer.starfield().unwrap().spawned_count(), 0);
}

#[test]
fn twenty_seconds_spawn_at_most_one_shooting_star() {
    let mut host = ManualHost::default();
    let (mut layer, _) = mount(&mut host, Viewport::new(1024.0, 768.0));

    run_frames(&mut layer, &mut host, 100, 200.0);

    assert!(layer.starfield().unwrap().spawned_count() <= 1);
}

#[test]
fn shooting_stars_fade_and_leave() {
    let mut host = ManualHost::default();
    let viewport = Viewport::new(1024.0, 768.0);
    let (mut layer, _) = mount(&mut host, viewport);

    let mut seen = false;
    for i in 0..6000 {
        let handle = host.take_frame().unwrap();
        layer.on_frame(handle, i as f64 * 16.0, 0.0, &mut host);
        let starfield = layer.starfield().unwrap();
        for shooting_star in starfield.shooting_stars() {
            seen = true;
            assert!(shooting_star.opacity() > 0.0);
            assert!(shooting_star.x <= viewport.width + 100.0);
            assert!(shooting_star.y <= viewport.height + 100.0);
        }
    }
    assert!(seen, "no shooting star in 96 seconds");
}

#[test]
fn teardown_cancels_pending_frame_and_listener() {
    let mut host = ManualHost::default();
    let (mut layer, draws) = mount(&mut host, Viewport::new(800.0, 600.0));
    run_frames(&mut layer, &mut host, 3, 16.0);
    let in_flight = layer.pending_frame().unwrap();

    layer.teardown(&mut host);
    assert_eq!(host.cancelled, 1);
    assert!(host.pending.is_empty());
    assert!(host.listeners.is_empty());

    // A callback already in flight must not draw
    assert!(!layer.on_frame(in_flight, 100.0, 0.0, &mut host));
    assert_eq!(draws.get(), 3);

    layer.teardown(&mut host);
    assert_eq!(host.cancelled, 1);
}
