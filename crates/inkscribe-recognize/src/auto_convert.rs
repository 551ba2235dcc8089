//! Silent, debounced promotion of recent strokes to converted text.

use crate::engine::{RecognitionEngine, RecognitionService};
use crate::RecognizeError;
use inkscribe_core::stroke::{ConvertedText, Rgb, StrokeId};
use inkscribe_core::Canvas;
use inkscribe_render::renderer::encode_png;
use inkscribe_render::Renderer;
use kurbo::Point;
use std::time::Instant;

/// Padding around the batch bounding box when cropping recognition input.
pub const REGION_PADDING: f64 = 12.0;

/// Minimum normalized confidence for a batch to be promoted.
pub const MIN_CONFIDENCE: f64 = 0.6;

/// Drives the auto-conversion pipeline for one canvas.
///
/// Owns the recognition collaborator and polls the canvas's pending batch.
/// Recognition is advisory: every failure path degrades to "no conversion"
/// with the queue cleared, never to a user-visible error.
pub struct AutoConverter {
    service: RecognitionService,
}

impl AutoConverter {
    pub fn new(engine: Box<dyn RecognitionEngine>) -> Self {
        Self {
            service: RecognitionService::new(engine),
        }
    }

    pub fn service(&self) -> &RecognitionService {
        &self.service
    }

    /// Release the recognition engine (canvas teardown).
    pub async fn shutdown(&mut self) -> Result<(), RecognizeError> {
        self.service.close().await
    }

    /// Fire the pending batch if its debounce deadline has passed.
    ///
    /// Returns the id of the appended [`ConvertedText`], if any. The batch is
    /// consumed whether or not conversion succeeds.
    pub async fn poll(
        &mut self,
        canvas: &mut Canvas,
        renderer: &Renderer,
        now: Instant,
    ) -> Option<StrokeId> {
        let ids = canvas.pending.take_due(now)?;
        log::debug!("auto-conversion batch fired: {} strokes", ids.len());

        match self.convert_batch(canvas, renderer, &ids).await {
            Ok(converted) => converted,
            Err(e) => {
                log::warn!("auto-conversion failed: {}", e);
                None
            }
        }
    }

    async fn convert_batch(
        &mut self,
        canvas: &mut Canvas,
        renderer: &Renderer,
        ids: &[StrokeId],
    ) -> Result<Option<StrokeId>, RecognizeError> {
        let Some(bounds) = canvas.document.bounds_of(ids) else {
            return Ok(None);
        };
        let region = bounds.inflate(REGION_PADDING, REGION_PADDING);

        let pixmap = renderer.render_region(&canvas.document, ids, region)?;
        let png = encode_png(&pixmap)?;
        let result = self.service.recognize_region(png).await?;

        let confidence = result.confidence / 100.0;
        let text = result.text.trim();
        if text.is_empty() || confidence <= MIN_CONFIDENCE {
            log::debug!(
                "batch discarded: confidence {:.2}, {} chars",
                confidence,
                text.len()
            );
            return Ok(None);
        }

        // Anchor at the batch box's left edge / vertical center; size the
        // text to the box height. Color follows the first contributing
        // stroke. The originals stay on the canvas: the overlay is additive.
        let color = canvas
            .document
            .strokes_by_ids(ids)
            .next()
            .map(|s| s.tool.color)
            .unwrap_or_else(Rgb::black);
        let converted = ConvertedText::new(
            ids.to_vec(),
            text.to_string(),
            Point::new(bounds.x0, bounds.center().y),
            (bounds.height() / 3.0).clamp(12.0, 24.0),
            color,
        );
        let id = converted.id;
        canvas.document.add_converted_text(converted);
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{BoxFuture, RegionText, Word};
    use inkscribe_core::geometry::PointerDevice;
    use inkscribe_core::{PointerEvent, Tool, ToolKind, AUTO_CONVERT_DEBOUNCE};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

        fn dummy_raw_waker() -> RawWaker {
            fn no_op(_: *const ()) {}
            fn clone(_: *const ()) -> RawWaker {
                dummy_raw_waker()
            }
            static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
            RawWaker::new(std::ptr::null(), &VTABLE)
        }

        let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
        let mut cx = Context::from_waker(&waker);
        let mut f = std::pin::pin!(f);

        loop {
            match f.as_mut().poll(&mut cx) {
                Poll::Ready(result) => return result,
                Poll::Pending => {}
            }
        }
    }

    /// Mock collaborator with a fixed region answer and call counters.
    struct MockEngine {
        text: String,
        confidence: f64,
        opens: Arc<AtomicUsize>,
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl MockEngine {
        fn fixed(text: &str, confidence: f64) -> Self {
            Self {
                text: text.to_string(),
                confidence,
                opens: Arc::new(AtomicUsize::new(0)),
                calls: Arc::new(AtomicUsize::new(0)),
                fail: false,
            }
        }
    }

    impl RecognitionEngine for MockEngine {
        fn open(&self) -> BoxFuture<'_, Result<(), RecognizeError>> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok(()) })
        }

        fn close(&self) -> BoxFuture<'_, Result<(), RecognizeError>> {
            Box::pin(async { Ok(()) })
        }

        fn recognize_region(
            &self,
            _png: Vec<u8>,
        ) -> BoxFuture<'_, Result<RegionText, RecognizeError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = if self.fail {
                Err(RecognizeError::Engine("mock failure".to_string()))
            } else {
                Ok(RegionText {
                    text: self.text.clone(),
                    confidence: self.confidence,
                })
            };
            Box::pin(async move { result })
        }

        fn recognize_full(&self, _png: Vec<u8>) -> BoxFuture<'_, Result<Vec<Word>, RecognizeError>> {
            Box::pin(async { Ok(Vec::new()) })
        }
    }

    fn draw_pen_stroke(canvas: &mut Canvas, from: (f64, f64), to: (f64, f64)) {
        canvas.handle_pointer(PointerEvent::Down {
            pointer: 1,
            x: from.0,
            y: from.1,
            device: PointerDevice::Mouse,
        });
        canvas.handle_pointer(PointerEvent::Move {
            pointer: 1,
            x: (from.0 + to.0) / 2.0,
            y: (from.1 + to.1) / 2.0,
            device: PointerDevice::Mouse,
        });
        canvas.handle_pointer(PointerEvent::Up {
            pointer: 1,
            x: to.0,
            y: to.1,
            device: PointerDevice::Mouse,
        });
    }

    fn fired_poll(
        converter: &mut AutoConverter,
        canvas: &mut Canvas,
        renderer: &Renderer,
    ) -> Option<StrokeId> {
        // The deadline was armed at commit time, so one debounce window from
        // now is always past due.
        block_on(converter.poll(canvas, renderer, Instant::now() + AUTO_CONVERT_DEBOUNCE))
    }

    #[test]
    fn test_low_confidence_is_discarded() {
        let mut canvas = Canvas::new();
        canvas.set_tool(Tool::new(ToolKind::Pen, Rgb::black(), 2.0));
        draw_pen_stroke(&mut canvas, (10.0, 10.0), (60.0, 40.0));

        let renderer = Renderer::new();
        let mut converter = AutoConverter::new(Box::new(MockEngine::fixed("hello", 59.0)));

        assert!(fired_poll(&mut converter, &mut canvas, &renderer).is_none());
        assert!(canvas.document.converted_texts.is_empty());
        // The queue is spent either way.
        assert!(canvas.pending.is_empty());
    }

    #[test]
    fn test_sufficient_confidence_appends_converted_text() {
        let mut canvas = Canvas::new();
        canvas.set_tool(Tool::new(ToolKind::Pen, Rgb::new(0, 0, 200), 2.0));
        draw_pen_stroke(&mut canvas, (10.0, 10.0), (60.0, 40.0));
        draw_pen_stroke(&mut canvas, (70.0, 10.0), (120.0, 40.0));
        let stroke_ids: Vec<StrokeId> = canvas.document.strokes.iter().map(|s| s.id).collect();

        let renderer = Renderer::new();
        let mut converter = AutoConverter::new(Box::new(MockEngine::fixed("hello", 61.0)));

        assert!(fired_poll(&mut converter, &mut canvas, &renderer).is_some());
        assert_eq!(canvas.document.converted_texts.len(), 1);

        let converted = &canvas.document.converted_texts[0];
        assert_eq!(converted.text, "hello");
        assert_eq!(converted.original_stroke_ids, stroke_ids);
        assert_eq!(converted.color, Rgb::new(0, 0, 200));
        // Anchored at the batch box's left edge / vertical center.
        assert!((converted.position.x - 10.0).abs() < f64::EPSILON);
        assert!((converted.position.y - 25.0).abs() < f64::EPSILON);
        // Box height 30 / 3 = 10, clamped up to the 12pt floor.
        assert!((converted.font_size - 12.0).abs() < f64::EPSILON);

        // Original strokes are retained, not hidden.
        assert_eq!(canvas.document.strokes.len(), 2);
        assert!(canvas.pending.is_empty());
    }

    #[test]
    fn test_empty_text_is_discarded() {
        let mut canvas = Canvas::new();
        canvas.set_tool(Tool::new(ToolKind::Pen, Rgb::black(), 2.0));
        draw_pen_stroke(&mut canvas, (10.0, 10.0), (60.0, 40.0));

        let renderer = Renderer::new();
        let mut converter = AutoConverter::new(Box::new(MockEngine::fixed("   ", 95.0)));

        assert!(fired_poll(&mut converter, &mut canvas, &renderer).is_none());
        assert!(canvas.document.converted_texts.is_empty());
    }

    #[test]
    fn test_engine_failure_is_swallowed() {
        let mut canvas = Canvas::new();
        canvas.set_tool(Tool::new(ToolKind::Pen, Rgb::black(), 2.0));
        draw_pen_stroke(&mut canvas, (10.0, 10.0), (60.0, 40.0));

        let mut engine = MockEngine::fixed("hello", 95.0);
        engine.fail = true;
        let renderer = Renderer::new();
        let mut converter = AutoConverter::new(Box::new(engine));

        assert!(fired_poll(&mut converter, &mut canvas, &renderer).is_none());
        assert!(canvas.document.converted_texts.is_empty());
        // No retry: the queue is cleared despite the failure.
        assert!(canvas.pending.is_empty());
    }

    #[test]
    fn test_nothing_fires_before_deadline() {
        let mut canvas = Canvas::new();
        canvas.set_tool(Tool::new(ToolKind::Pen, Rgb::black(), 2.0));
        draw_pen_stroke(&mut canvas, (10.0, 10.0), (60.0, 40.0));

        let engine = MockEngine::fixed("hello", 95.0);
        let calls = engine.calls.clone();
        let renderer = Renderer::new();
        let mut converter = AutoConverter::new(Box::new(engine));

        assert!(block_on(converter.poll(&mut canvas, &renderer, Instant::now())).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(canvas.pending.len(), 1);
    }

    #[test]
    fn test_engine_opens_once_across_batches() {
        let mut canvas = Canvas::new();
        canvas.set_tool(Tool::new(ToolKind::Pen, Rgb::black(), 2.0));

        let engine = MockEngine::fixed("hi", 90.0);
        let opens = engine.opens.clone();
        let renderer = Renderer::new();
        let mut converter = AutoConverter::new(Box::new(engine));

        draw_pen_stroke(&mut canvas, (10.0, 10.0), (60.0, 40.0));
        assert!(fired_poll(&mut converter, &mut canvas, &renderer).is_some());
        draw_pen_stroke(&mut canvas, (10.0, 60.0), (60.0, 90.0));
        assert!(fired_poll(&mut converter, &mut canvas, &renderer).is_some());

        assert_eq!(canvas.document.converted_texts.len(), 2);
        assert_eq!(opens.load(Ordering::SeqCst), 1);
        assert!(converter.service().is_open());

        block_on(converter.shutdown()).unwrap();
        assert!(!converter.service().is_open());
    }
}
