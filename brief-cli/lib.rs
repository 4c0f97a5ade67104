use brief_core::{init_thread_pool, BriefConfig, BriefResult, Descriptors, Keypoint, Match};
use brief_descriptor::{MatchingContext, WindowOffsetTable};
use brief_match::HammingMatcher;
use log::info;

pub use brief_core::{self, BriefError};

/// Grayscale frame plus the keypoints an external detector found in it
#[derive(Debug, Clone)]
pub struct GrayFrame {
    pub pixels: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub keypoints: Vec<Keypoint>,
}

/// High-level pipeline: describe keypoints of two frames and keep mutual matches
pub struct BriefPipeline {
    context: MatchingContext,
    matcher: HammingMatcher,
}

impl BriefPipeline {
    /// Create a pipeline with a freshly generated sampling pattern
    pub fn new(config: BriefConfig) -> BriefResult<Self> {
        let context = MatchingContext::new(config)?;
        Ok(Self::from_context(context))
    }

    /// Create a pipeline around an existing sampling pattern
    pub fn with_table(config: BriefConfig, table: WindowOffsetTable) -> BriefResult<Self> {
        let context = MatchingContext::with_table(config, table)?;
        Ok(Self::from_context(context))
    }

    fn from_context(context: MatchingContext) -> Self {
        let matcher = HammingMatcher::new().parallel(context.config().parallel);
        Self { context, matcher }
    }

    /// Size the global rayon pool from the configuration. Call at most once per process.
    pub fn init_threads(&self) -> BriefResult<()> {
        init_thread_pool(self.context.config().n_threads)
    }

    pub fn context(&self) -> &MatchingContext {
        &self.context
    }

    /// Generate descriptors for the given keypoints
    pub fn describe(&self, pixels: &[u8], width: usize, keypoints: &[Keypoint]) -> BriefResult<Descriptors> {
        self.context.describe(pixels, width, keypoints)
    }

    /// Drop keypoints whose sampling window would leave the image
    pub fn retain_describable(&self, keypoints: &mut Vec<Keypoint>, width: usize, height: usize) {
        let border = self.context.border();
        keypoints.retain(|kp| {
            kp.x >= border && kp.y >= border && kp.x + border < width && kp.y + border < height
        });
    }

    /// Describe both frames and return their reciprocal matches
    pub fn match_frames(&self, a: &GrayFrame, b: &GrayFrame) -> BriefResult<Vec<Match>> {
        let desc_a = self.describe(&a.pixels, a.width, &a.keypoints)?;
        let desc_b = self.describe(&b.pixels, b.width, &b.keypoints)?;
        let matches = self
            .matcher
            .match_reciprocal(&a.keypoints, &desc_a, &b.keypoints, &desc_b)?;
        info!(
            "{} reciprocal matches between {} and {} keypoints",
            matches.len(),
            a.keypoints.len(),
            b.keypoints.len()
        );
        Ok(matches)
    }
}

/// One line per match: `index_a index_b [xa ya] [xb yb] confidence`
pub fn format_match(m: &Match) -> String {
    format!(
        "{} {} [{} {}] [{} {}] {}",
        m.index_a, m.index_b, m.keypoint_a.x, m.keypoint_a.y, m.keypoint_b.x, m.keypoint_b.y, m.confidence
    )
}
