//! Driving the sync core through its public ports, the way a host does.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use marksync::sync::{
    Channel, CoordinateSequence, Dataset, EventHub, Owner, RenderPane, RenderedHeading,
    ScrollMetrics, ScrollSync, SourceMetrics, SourcePane, SyncAction, SyncConfig, SyncError,
    WheelDelta, WheelOutcome, source::Measure,
};

const LINE: f64 = 10.0;

fn clamp(offset: f64, pane: &impl ScrollMetrics) -> f64 {
    offset.clamp(0.0, pane.max_scroll_top())
}

struct Editor {
    text: String,
    scroll_top: f64,
    bottom_padding: Option<f64>,
    attrs: HashMap<String, String>,
}

impl Editor {
    fn new(text: String) -> Self {
        Self {
            text,
            scroll_top: 0.0,
            bottom_padding: None,
            attrs: HashMap::new(),
        }
    }
}

impl Dataset for Editor {
    fn data(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    fn set_data(&mut self, key: &str, value: String) {
        self.attrs.insert(key.to_string(), value);
    }
}

impl ScrollMetrics for Editor {
    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn set_scroll_top(&mut self, offset: f64) {
        self.scroll_top = clamp(offset, self);
    }

    fn scroll_height(&self) -> f64 {
        Lines.content_height(&self.text) + self.bottom_padding.unwrap_or(0.0)
    }

    fn client_height(&self) -> f64 {
        100.0
    }
}

impl SourcePane for Editor {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn metrics(&self) -> SourceMetrics {
        SourceMetrics {
            line_height: LINE,
            padding: 0.0,
        }
    }

    fn bottom_padding(&self) -> Option<f64> {
        self.bottom_padding
    }

    fn set_bottom_padding(&mut self, padding: f64) {
        self.bottom_padding = Some(padding);
    }
}

struct Lines;

impl Measure for Lines {
    fn content_height(&mut self, text: &str) -> f64 {
        text.lines().count() as f64 * LINE
    }
}

#[derive(Default)]
struct Preview {
    headings: Vec<RenderedHeading>,
    scroll_top: f64,
    bottom_margin: f64,
    images: Vec<f64>,
    opened: bool,
    attrs: HashMap<String, String>,
}

impl Dataset for Preview {
    fn data(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    fn set_data(&mut self, key: &str, value: String) {
        self.attrs.insert(key.to_string(), value);
    }
}

impl ScrollMetrics for Preview {
    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn set_scroll_top(&mut self, offset: f64) {
        self.scroll_top = clamp(offset, self);
    }

    fn scroll_height(&self) -> f64 {
        900.0 + self.bottom_margin
    }

    fn client_height(&self) -> f64 {
        100.0
    }
}

impl RenderPane for Preview {
    fn open_disclosures(&mut self) {
        self.opened = true;
    }

    fn load_images_eagerly(&mut self) {}

    fn image_natural_heights(&self) -> Vec<f64> {
        self.images.clone()
    }

    fn headings(&self) -> Vec<RenderedHeading> {
        self.headings.clone()
    }

    fn set_bottom_margin(&mut self, margin: f64) {
        self.bottom_margin = margin;
    }
}

/// Three ten-line sections; each source line is 10 high, each rendered
/// section 300.
fn panes() -> (Editor, Preview) {
    let mut text = String::new();
    for title in ["A", "B", "C"] {
        text.push_str(&format!("# {title}\n"));
        for _ in 0..9 {
            text.push_str("body\n");
        }
    }
    let headings = ["A", "B", "C"]
        .iter()
        .enumerate()
        .map(|(i, title)| RenderedHeading {
            level: 1,
            title: (*title).to_string(),
            offset: i as f64 * 300.0,
        })
        .collect();
    let preview = Preview {
        headings,
        ..Preview::default()
    };
    (Editor::new(text), preview)
}

fn attached() -> (ScrollSync, EventHub<SyncAction>) {
    let sync = ScrollSync::new(SyncConfig::default(), 0.0);
    let mut hub = EventHub::new();
    sync.attach(&mut hub).unwrap();
    (sync, hub)
}

#[test]
fn test_scroll_maps_through_stored_coordinates() {
    let (mut sync, mut hub) = attached();
    let (mut editor, mut preview) = panes();
    let now = Instant::now();

    assert_eq!(hub.emit(Channel::ContentChanged), vec![SyncAction::Recompute]);
    assert!(sync.on_content_changed(&mut editor, Some(&mut preview), &mut Lines, now));
    assert!(preview.opened);
    assert_eq!(preview.bottom_margin, 100.0);

    let source = CoordinateSequence::load(&editor).unwrap();
    let render = CoordinateSequence::load(&preview).unwrap();
    assert_eq!(source.as_slice(), &[0.0, 0.0, 100.0, 200.0, 300.0]);
    assert_eq!(render.as_slice(), &[0.0, 0.0, 300.0, 600.0, 1000.0]);

    editor.set_scroll_top(150.0);
    assert_eq!(hub.emit(Channel::SourceScroll), vec![SyncAction::MapScroll]);
    assert_eq!(sync.on_scroll(&editor, Some(&mut preview)), Some(450.0));
    assert_eq!(preview.scroll_top, 450.0);
}

#[test]
fn test_pending_images_delay_extraction() {
    let (mut sync, _hub) = attached();
    let (mut editor, mut preview) = panes();
    preview.images = vec![0.0];
    let now = Instant::now();

    assert!(!sync.on_content_changed(&mut editor, Some(&mut preview), &mut Lines, now));
    assert!(sync.is_pending());
    assert!(preview.data("coordinates").is_none());

    preview.images = vec![40.0];
    let later = now + Duration::from_millis(100);
    assert!(sync.tick(&mut editor, Some(&mut preview), later));
    assert!(!sync.is_pending());
    assert!(CoordinateSequence::load(&preview).is_some());
}

#[test]
fn test_deadline_stores_unsettled_layout() {
    let (mut sync, _hub) = attached();
    let (mut editor, mut preview) = panes();
    preview.images = vec![0.0];
    let now = Instant::now();

    assert!(!sync.on_content_changed(&mut editor, Some(&mut preview), &mut Lines, now));
    assert!(sync.tick(&mut editor, Some(&mut preview), now + Duration::from_secs(3)));
    assert!(!sync.is_pending());
}

#[test]
fn test_wheel_past_bottom_overscrolls_and_remaps() {
    let (mut sync, mut hub) = attached();
    let (mut editor, mut preview) = panes();
    assert!(sync.on_content_changed(&mut editor, Some(&mut preview), &mut Lines, Instant::now()));
    editor.set_scroll_top(f64::MAX);
    assert_eq!(editor.scroll_top, 200.0);

    assert_eq!(hub.emit(Channel::SourceWheel), vec![SyncAction::Overscroll]);
    let outcome = sync.on_wheel(&mut editor, Some(&mut preview), WheelDelta::lines(3.0));
    assert_eq!(outcome, WheelOutcome::Overscrolled);
    assert_eq!(editor.bottom_padding, Some(30.0));
    assert_eq!(editor.scroll_top, 230.0);
    assert_eq!(preview.scroll_top, 720.0);
}

#[test]
fn test_edit_arms_one_render_correction() {
    let (mut sync, mut hub) = attached();
    let (mut editor, mut preview) = panes();

    for _ in 0..3 {
        sync.on_input(&mut editor, Some(&mut preview), &mut hub)
            .unwrap();
    }
    assert_eq!(hub.listener_count(Channel::RenderScroll), 1);
    assert_eq!(hub.emit(Channel::RenderScroll), vec![SyncAction::CorrectRender]);
    assert!(hub.emit(Channel::RenderScroll).is_empty());
}

#[test]
fn test_host_claim_blocks_attach() {
    let sync = ScrollSync::new(SyncConfig::default(), 0.0);
    let mut hub: EventHub<SyncAction> = EventHub::new();
    hub.claim(Channel::SourceScroll, Owner::Host("minimap")).unwrap();

    let err = sync.attach(&mut hub).unwrap_err();
    assert!(matches!(
        err,
        SyncError::ChannelClaimed {
            channel: Channel::SourceScroll,
            ..
        }
    ));
}
