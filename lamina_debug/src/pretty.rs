// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use lamina_core::event::{LayerEvent, LayerEventKind};
use lamina_core::kurbo::Rect;
use lamina_core::surface::RenderPurpose;
use lamina_core::trace::{
    FlushEvent, IdentityRegeneratedEvent, RedrawRequestEvent, RenderPassEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the destination.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn purpose_name(purpose: RenderPurpose) -> &'static str {
    match purpose {
        RenderPurpose::Display => "display",
        RenderPurpose::Print => "print",
        RenderPurpose::Export => "export",
    }
}

fn event_name(kind: LayerEventKind) -> &'static str {
    match kind {
        LayerEventKind::LockStateChanged => "lock",
        LayerEventKind::VisibleStateChanged => "visible",
        LayerEventKind::NameChanged => "name",
        LayerEventKind::SelectionColorChanged => "selection-color",
    }
}

fn rect(r: Rect) -> String {
    format!("({:.1},{:.1})-({:.1},{:.1})", r.x0, r.y0, r.x1, r.y1)
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_redraw_requested(&mut self, e: &RedrawRequestEvent) {
        let area = e.rect.map_or_else(|| String::from("full"), rect);
        let _ = writeln!(
            self.writer,
            "[redraw] layer={}@{} area={area}",
            e.layer.index(),
            e.layer.generation(),
        );
    }

    fn on_render_pass(&mut self, e: &RenderPassEvent) {
        let _ = writeln!(
            self.writer,
            "[render] group={}@{} {} rendered={} culled={}",
            e.group.index(),
            e.group.generation(),
            purpose_name(e.purpose),
            e.rendered,
            e.culled,
        );
    }

    fn on_state_change(&mut self, e: &LayerEvent) {
        let _ = writeln!(
            self.writer,
            "[state] layer={}@{} {}",
            e.layer.index(),
            e.layer.generation(),
            event_name(e.kind),
        );
    }

    fn on_flush(&mut self, e: &FlushEvent) {
        let region = if e.full {
            String::from("full")
        } else {
            format!("rects={}", e.rects)
        };
        let _ = writeln!(
            self.writer,
            "[flush] displays={} {region}",
            e.displays,
        );
    }

    fn on_identity_regenerated(&mut self, e: &IdentityRegeneratedEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[identity] layer={}@{} {:?} -> {:?}",
            e.layer.index(),
            e.layer.generation(),
            e.persisted,
            e.assigned,
        );
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    use lamina_core::invalidate::{DamageRegion, DisplaySurface};
    use lamina_core::kurbo::Size;
    use lamina_core::layer::LayerTree;
    use lamina_core::persist::BasicFactory;

    use super::*;

    /// A writer the test can read back after handing the sink to a tree.
    #[derive(Clone, Default)]
    struct Shared(Rc<RefCell<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Shared {
        fn text(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    struct NullDisplay;

    impl DisplaySurface for NullDisplay {
        fn invalidate(&mut self, _region: &DamageRegion) {}
    }

    fn traced_tree() -> (LayerTree, Shared) {
        let out = Shared::default();
        let mut tree = LayerTree::default();
        tree.set_trace_sink(Some(Box::new(PrettyPrintSink::with_writer(out.clone()))));
        (tree, out)
    }

    #[test]
    fn state_changes_and_redraws_are_printed() {
        let (mut tree, out) = traced_tree();
        let id = tree.create_plain_layer();
        tree.set_drawing_size(Size::new(10.0, 20.0));
        tree.set_visible(id, false);

        let text = out.text();
        assert!(text.contains("visible"), "got: {text}");
        assert!(
            text.contains("[redraw] layer=0@0 area=(0.0,0.0)-(10.0,20.0)"),
            "got: {text}"
        );
    }

    #[test]
    fn render_and_flush_are_printed() {
        let (mut tree, out) = traced_tree();
        let root = tree.create_plain_group();
        tree.set_root_group(root).unwrap();
        tree.attach_display(Box::new(NullDisplay));
        tree.render(Rect::new(0.0, 0.0, 5.0, 5.0), None);
        assert!(tree.flush());

        let text = out.text();
        assert!(text.contains("[render] group=0@0 display rendered=0 culled=0"), "got: {text}");
        assert!(text.contains("[flush] displays=1 full"), "got: {text}");
    }

    #[test]
    fn identity_regeneration_is_printed() {
        let (mut tree, out) = traced_tree();
        let id = tree.create_plain_layer();
        let record = tree.encode_layer(id);
        tree.decode_layer(&record, &BasicFactory).unwrap();

        let text = out.text();
        assert!(text.contains("[identity] layer=1@0"), "got: {text}");
    }

    #[test]
    fn pretty_print_into_vec() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_flush(&FlushEvent {
            displays: 2,
            full: false,
            rects: 3,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(output, "[flush] displays=2 rects=3\n");
    }
}
