//! On-demand recognition of the whole canvas.

use crate::engine::RecognitionService;
use inkscribe_core::stroke::RecognitionResult;
use inkscribe_core::Canvas;
use inkscribe_render::{preprocess, Renderer};
use kurbo::Rect;
use std::collections::HashSet;

/// Words below this normalized confidence are discarded.
pub const MIN_WORD_CONFIDENCE: f64 = 0.4;

/// Recognize every word on the canvas and install the results as advisory
/// overlays.
///
/// The full surface is rendered, downscaled and thresholded before being
/// sent to the collaborator. Surviving words are de-duplicated
/// case-insensitively and ordered by descending confidence; boxes are mapped
/// back to canvas coordinates. A collaborator failure yields an empty list.
/// Results are never promoted to converted text.
pub async fn recognize_canvas(
    canvas: &mut Canvas,
    renderer: &Renderer,
    service: &mut RecognitionService,
) -> Vec<RecognitionResult> {
    let results = match scan(canvas, renderer, service).await {
        Ok(results) => results,
        Err(e) => {
            log::warn!("full-canvas recognition failed: {}", e);
            Vec::new()
        }
    };
    canvas.overlays = results.clone();
    results
}

async fn scan(
    canvas: &Canvas,
    renderer: &Renderer,
    service: &mut RecognitionService,
) -> Result<Vec<RecognitionResult>, crate::RecognizeError> {
    let pixmap = renderer.render(&canvas.document, canvas.config.page)?;
    let (png, scale) = preprocess::recognition_input(&pixmap)?;
    let words = service.recognize_full(png).await?;

    let mut results: Vec<RecognitionResult> = words
        .into_iter()
        .filter_map(|word| {
            let confidence = word.confidence / 100.0;
            if confidence < MIN_WORD_CONFIDENCE || word.text.trim().is_empty() {
                return None;
            }
            Some(RecognitionResult {
                text: word.text,
                confidence,
                // Map the word box from the downscaled image back onto the
                // canvas.
                bounding_box: Rect::new(
                    word.bounds.x0 / scale,
                    word.bounds.y0 / scale,
                    word.bounds.x1 / scale,
                    word.bounds.y1 / scale,
                ),
            })
        })
        .collect();

    results.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut seen = HashSet::new();
    results.retain(|r| seen.insert(r.text.to_lowercase()));

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{BoxFuture, RecognitionEngine, RegionText, Word, WordBox};
    use crate::RecognizeError;
    use inkscribe_core::PageSize;

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

    struct WordEngine {
        words: Vec<Word>,
        fail: bool,
    }

    impl RecognitionEngine for WordEngine {
        fn open(&self) -> BoxFuture<'_, Result<(), RecognizeError>> {
            Box::pin(async { Ok(()) })
        }

        fn close(&self) -> BoxFuture<'_, Result<(), RecognizeError>> {
            Box::pin(async { Ok(()) })
        }

        fn recognize_region(
            &self,
            _png: Vec<u8>,
        ) -> BoxFuture<'_, Result<RegionText, RecognizeError>> {
            Box::pin(async {
                Err(RecognizeError::Engine("region path unused".to_string()))
            })
        }

        fn recognize_full(&self, _png: Vec<u8>) -> BoxFuture<'_, Result<Vec<Word>, RecognizeError>> {
            let result = if self.fail {
                Err(RecognizeError::Engine("mock failure".to_string()))
            } else {
                Ok(self.words.clone())
            };
            Box::pin(async move { result })
        }
    }

    fn word(text: &str, confidence: f64) -> Word {
        Word {
            text: text.to_string(),
            confidence,
            bounds: WordBox {
                x0: 10.0,
                y0: 20.0,
                x1: 40.0,
                y1: 30.0,
            },
        }
    }

    #[test]
    fn test_filters_dedupes_and_sorts() {
        let engine = WordEngine {
            words: vec![
                word("faint", 39.0),
                word("hello", 80.0),
                word("Hello", 95.0),
                word("world", 60.0),
            ],
            fail: false,
        };
        let mut canvas = Canvas::new();
        let renderer = Renderer::new();
        let mut service = RecognitionService::new(Box::new(engine));

        let results = block_on(recognize_canvas(&mut canvas, &renderer, &mut service));

        // Sub-40% words dropped, case-insensitive duplicates collapsed to the
        // most confident spelling, descending confidence order.
        let texts: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello", "world"]);
        assert!((results[0].confidence - 0.95).abs() < f64::EPSILON);
        assert_eq!(canvas.overlays, results);
    }

    #[test]
    fn test_boxes_map_back_to_canvas_coordinates() {
        let engine = WordEngine {
            words: vec![word("hi", 90.0)],
            fail: false,
        };
        let mut canvas = Canvas::new();
        let renderer = Renderer::new();
        let mut service = RecognitionService::new(Box::new(engine));

        let results = block_on(recognize_canvas(&mut canvas, &renderer, &mut service));

        // Portrait 850x1100 downscales by 800/1100; boxes divide back out.
        let scale = 800.0 / canvas.config.page.height() as f64;
        assert_eq!(canvas.config.page, PageSize::Portrait);
        let bounds = results[0].bounding_box;
        assert!((bounds.x0 - 10.0 / scale).abs() < 1e-9);
        assert!((bounds.y1 - 30.0 / scale).abs() < 1e-9);
    }

    #[test]
    fn test_failure_yields_empty_overlays() {
        let engine = WordEngine {
            words: Vec::new(),
            fail: true,
        };
        let mut canvas = Canvas::new();
        canvas.overlays.push(RecognitionResult {
            text: "stale".to_string(),
            confidence: 0.5,
            bounding_box: Rect::ZERO,
        });
        let renderer = Renderer::new();
        let mut service = RecognitionService::new(Box::new(engine));

        let results = block_on(recognize_canvas(&mut canvas, &renderer, &mut service));
        assert!(results.is_empty());
        assert!(canvas.overlays.is_empty());
    }
}
