//! Bridge to the host rasterizer for callouts and TeX math.

use crate::context::LayoutContext;
use notepress_traits::{RasterImage, RasterKind, RasterRequest, Rasterizer};

pub const MATH_PLACEHOLDER: &str = "[math render failed]";
pub const CALLOUT_PLACEHOLDER: &str = "[callout render failed]";

/// Vertical padding around a rasterized box.
pub const RASTER_PADDING: f32 = 4.0;

/// The printable width in CSS pixels, which is what renderers lay out against.
pub fn target_width_px(ctx: &LayoutContext) -> u32 {
    (ctx.content_box().width * 96.0 / 72.0).round().max(1.0) as u32
}

pub fn placeholder(kind: RasterKind) -> &'static str {
    match kind {
        RasterKind::BlockMath | RasterKind::InlineMath => MATH_PLACEHOLDER,
        RasterKind::Callout => CALLOUT_PLACEHOLDER,
    }
}

/// Source handed to the rasterizer, delimiters included for math.
pub fn math_markup(source: &str, is_block: bool) -> String {
    if is_block {
        format!("$${}$$", source)
    } else {
        format!("${}$", source)
    }
}

/// Rasterizes `markup` within the context's capability timeout.
///
/// Returns `None` on failure, timeout or a malformed pixel buffer; the caller
/// stamps a placeholder instead.
pub async fn rasterize(
    rasterizer: &dyn Rasterizer,
    ctx: &LayoutContext,
    markup: String,
    kind: RasterKind,
) -> Option<RasterImage> {
    let request = RasterRequest {
        markup,
        kind,
        theme: ctx.theme,
        target_width_px: target_width_px(ctx),
    };
    match tokio::time::timeout(ctx.capability_timeout, rasterizer.rasterize(&request)).await {
        Ok(Ok(image)) => match image.validate() {
            Ok(()) => Some(image),
            Err(e) => {
                log::warn!("{} returned an unusable image: {}", rasterizer.name(), e);
                None
            }
        },
        Ok(Err(e)) => {
            log::warn!("{} failed on {:?}: {}", rasterizer.name(), kind, e);
            None
        }
        Err(_) => {
            log::warn!(
                "{} timed out after {:?} on {:?}",
                rasterizer.name(),
                ctx.capability_timeout,
                kind
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use notepress_traits::{RasterError, UnavailableRasterizer};
    use std::time::Duration;

    #[derive(Debug)]
    struct SlowRasterizer;

    #[async_trait]
    impl Rasterizer for SlowRasterizer {
        async fn rasterize(&self, _request: &RasterRequest) -> Result<RasterImage, RasterError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(RasterImage { pixels: vec![0; 4], width: 1, height: 1 })
        }

        fn name(&self) -> &'static str {
            "SlowRasterizer"
        }
    }

    #[tokio::test]
    async fn failures_yield_none() {
        let ctx = LayoutContext::default();
        let out = rasterize(&UnavailableRasterizer, &ctx, "$x$".into(), RasterKind::InlineMath).await;
        assert!(out.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_rasterizers_time_out() {
        let mut ctx = LayoutContext::default();
        ctx.capability_timeout = Duration::from_millis(50);
        let out = rasterize(&SlowRasterizer, &ctx, "> hi".into(), RasterKind::Callout).await;
        assert!(out.is_none());
    }

    #[test]
    fn placeholders_and_markup() {
        assert_eq!(placeholder(RasterKind::Callout), CALLOUT_PLACEHOLDER);
        assert_eq!(placeholder(RasterKind::InlineMath), MATH_PLACEHOLDER);
        assert_eq!(math_markup("x", true), "$$x$$");
        assert_eq!(target_width_px(&LayoutContext::default()), 680);
    }
}
