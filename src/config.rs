//! Encoder options and their resolution into a complete configuration.
//!
//! [`Options`] is sparse: every tunable is an `Option`, and `None` means
//! "use the encoder default". [`resolve`] turns it into a [`ResolvedOptions`]
//! with every field populated, and decides which [`EncodePath`] the encode
//! call takes.
//!
//! The advanced fields (everything from `method` down) are only honored for
//! RGBA input. Gray and RGB input use `lossless` and `quality` alone.

/// Quality used when none is given.
pub const DEFAULT_QUALITY: f32 = 90.0;

/// Hint for the kind of image being compressed (lossless only).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImageHint {
    #[default]
    Default,
    /// Digital picture, like portrait or indoor shot.
    Picture,
    /// Outdoor photograph with natural lighting.
    Photo,
    /// Discrete tone image (graph, map tile).
    Graph,
}

/// In-loop filter type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterType {
    Simple,
    /// Only used if `filter_strength > 0` or `autofilter` is on.
    #[default]
    Strong,
}

/// Predictive filtering method for the alpha plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlphaFiltering {
    None,
    #[default]
    Fast,
    Best,
}

/// Encoding parameters as supplied by the caller.
///
/// Unset fields take the defaults listed on each field. An explicitly set
/// zero is kept as zero.
///
/// ```
/// use webpwrite::Options;
///
/// let opts = Options::new().with_quality(80.0).with_method(6);
/// assert_eq!(opts.method, Some(6));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Options {
    /// Request lossless encoding. Default: false.
    pub lossless: Option<bool>,
    /// Quality, 0-100. Default: 90.
    pub quality: Option<f32>,

    /// Quality/speed trade-off (0 = fast, 6 = slower-better). Default: 4.
    pub method: Option<u8>,
    /// Image type hint. Default: [`ImageHint::Default`].
    pub image_hint: Option<ImageHint>,
    /// Desired output size in bytes; takes precedence over quality.
    pub target_size: Option<u32>,
    /// Minimal distortion to try to achieve; takes precedence over
    /// `target_size`.
    pub target_psnr: Option<f32>,
    /// Maximum number of segments, 1-4. Default: 2.
    pub segments: Option<u8>,
    /// Spatial noise shaping, 0 (off) to 100. Default: 100.
    pub sns_strength: Option<u8>,
    /// Loop filter strength, 0 (off) to 100. Default: 100.
    pub filter_strength: Option<u8>,
    /// Loop filter sharpness, 0 (off) to 7 (least sharp). Default: 0.
    pub filter_sharpness: Option<u8>,
    /// Default: [`FilterType::Strong`].
    pub filter_type: Option<FilterType>,
    /// Auto-adjust filter strength. Default: false.
    pub autofilter: Option<bool>,
    /// Alpha plane coding, 0 (none) or 1 (WebP lossless). Default: 1.
    pub alpha_compression: Option<u8>,
    /// Default: [`AlphaFiltering::Fast`].
    pub alpha_filtering: Option<AlphaFiltering>,
    /// Entropy-analysis passes, 1-10. Default: 1.
    pub pass: Option<u8>,
    /// Export the compressed picture back, without in-loop filtering.
    /// Default: false.
    pub show_compressed: Option<bool>,
    /// Preprocessing filter (0 = none, 1 = segment-smooth). Default: 1.
    pub preprocessing: Option<u8>,
    /// log2 of the number of token partitions, 0-3. Default: 0.
    pub partitions: Option<u8>,
    /// Quality degradation allowed to fit the 512k limit on prediction
    /// modes, 0-100. Default: 0.
    pub partition_limit: Option<u8>,
    /// Remap parameters to match the output size of JPEG compression.
    /// Default: false.
    pub emulate_jpeg_size: Option<bool>,
    /// Use multi-threaded encoding inside libwebp. Default: false.
    pub thread_level: Option<bool>,
    /// Reduce memory usage at the cost of CPU. Default: false.
    pub low_memory: Option<bool>,
    /// Near-lossless preprocessing, 0 (max loss) to 100 (off). Lossless
    /// only. Default: 100.
    pub near_lossless: Option<u8>,
    /// Preserve RGB values under fully transparent pixels. Lossless only.
    /// Default: false.
    pub exact: Option<bool>,
    /// Reserved lossless feature. Default: false.
    pub use_delta_palette: Option<bool>,
    /// Sharp (slow) RGB to YUV conversion. Default: true.
    pub use_sharp_yuv: Option<bool>,
}

/// A fully populated configuration, produced by [`resolve`].
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedOptions {
    pub lossless: bool,
    pub quality: f32,
    pub method: u8,
    pub image_hint: ImageHint,
    pub target_size: u32,
    pub target_psnr: f32,
    pub segments: u8,
    pub sns_strength: u8,
    pub filter_strength: u8,
    pub filter_sharpness: u8,
    pub filter_type: FilterType,
    pub autofilter: bool,
    pub alpha_compression: u8,
    pub alpha_filtering: AlphaFiltering,
    pub pass: u8,
    pub show_compressed: bool,
    pub preprocessing: u8,
    pub partitions: u8,
    pub partition_limit: u8,
    pub emulate_jpeg_size: bool,
    pub thread_level: bool,
    pub low_memory: bool,
    pub near_lossless: u8,
    pub exact: bool,
    pub use_delta_palette: bool,
    pub use_sharp_yuv: bool,
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        apply_defaults(&Options::default())
    }
}

/// Which family of encoder entry points an encode call uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncodePath {
    /// Lossless entry points, one per canonical layout.
    Lossless,
    /// Quality-only lossy entry points.
    LossySimple,
    /// Full configuration; honored for RGBA8 only.
    LossyAdvanced,
}

impl Options {
    /// Empty options: every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options requesting lossless encoding.
    pub fn lossless() -> Self {
        Self::new().with_lossless(true)
    }

    pub fn with_lossless(mut self, lossless: bool) -> Self {
        self.lossless = Some(lossless);
        self
    }

    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_method(mut self, method: u8) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_image_hint(mut self, hint: ImageHint) -> Self {
        self.image_hint = Some(hint);
        self
    }

    pub fn with_target_size(mut self, bytes: u32) -> Self {
        self.target_size = Some(bytes);
        self
    }

    pub fn with_target_psnr(mut self, psnr: f32) -> Self {
        self.target_psnr = Some(psnr);
        self
    }

    pub fn with_segments(mut self, segments: u8) -> Self {
        self.segments = Some(segments);
        self
    }

    pub fn with_sns_strength(mut self, strength: u8) -> Self {
        self.sns_strength = Some(strength);
        self
    }

    pub fn with_filter_strength(mut self, strength: u8) -> Self {
        self.filter_strength = Some(strength);
        self
    }

    pub fn with_filter_sharpness(mut self, sharpness: u8) -> Self {
        self.filter_sharpness = Some(sharpness);
        self
    }

    pub fn with_filter_type(mut self, filter_type: FilterType) -> Self {
        self.filter_type = Some(filter_type);
        self
    }

    pub fn with_autofilter(mut self, enable: bool) -> Self {
        self.autofilter = Some(enable);
        self
    }

    pub fn with_alpha_compression(mut self, compression: u8) -> Self {
        self.alpha_compression = Some(compression);
        self
    }

    pub fn with_alpha_filtering(mut self, filtering: AlphaFiltering) -> Self {
        self.alpha_filtering = Some(filtering);
        self
    }

    pub fn with_pass(mut self, pass: u8) -> Self {
        self.pass = Some(pass);
        self
    }

    pub fn with_show_compressed(mut self, enable: bool) -> Self {
        self.show_compressed = Some(enable);
        self
    }

    pub fn with_preprocessing(mut self, preprocessing: u8) -> Self {
        self.preprocessing = Some(preprocessing);
        self
    }

    pub fn with_partitions(mut self, partitions: u8) -> Self {
        self.partitions = Some(partitions);
        self
    }

    pub fn with_partition_limit(mut self, limit: u8) -> Self {
        self.partition_limit = Some(limit);
        self
    }

    pub fn with_emulate_jpeg_size(mut self, enable: bool) -> Self {
        self.emulate_jpeg_size = Some(enable);
        self
    }

    pub fn with_thread_level(mut self, enable: bool) -> Self {
        self.thread_level = Some(enable);
        self
    }

    pub fn with_low_memory(mut self, enable: bool) -> Self {
        self.low_memory = Some(enable);
        self
    }

    pub fn with_near_lossless(mut self, value: u8) -> Self {
        self.near_lossless = Some(value);
        self
    }

    pub fn with_exact(mut self, exact: bool) -> Self {
        self.exact = Some(exact);
        self
    }

    pub fn with_delta_palette(mut self, enable: bool) -> Self {
        self.use_delta_palette = Some(enable);
        self
    }

    pub fn with_sharp_yuv(mut self, enable: bool) -> Self {
        self.use_sharp_yuv = Some(enable);
        self
    }
}

fn set<T: Default + PartialEq>(value: Option<T>) -> bool {
    value.is_some_and(|v| v != T::default())
}

/// Whether any advanced field is set to something other than its zero value.
///
/// Evaluated on the raw options, before defaults. For the enum fields the
/// zero value is the first variant.
pub fn has_advanced(opts: &Options) -> bool {
    set(opts.method)
        || set(opts.image_hint)
        || set(opts.target_size)
        || set(opts.target_psnr)
        || set(opts.segments)
        || set(opts.sns_strength)
        || set(opts.filter_strength)
        || set(opts.filter_sharpness)
        || opts.filter_type.is_some_and(|t| t != FilterType::Simple)
        || set(opts.autofilter)
        || set(opts.alpha_compression)
        || opts.alpha_filtering.is_some_and(|f| f != AlphaFiltering::None)
        || set(opts.pass)
        || set(opts.show_compressed)
        || set(opts.preprocessing)
        || set(opts.partitions)
        || set(opts.partition_limit)
        || set(opts.emulate_jpeg_size)
        || set(opts.thread_level)
        || set(opts.low_memory)
        || set(opts.near_lossless)
        || set(opts.exact)
        || set(opts.use_delta_palette)
        || set(opts.use_sharp_yuv)
}

/// Fill every unset field with its default. The input is not modified.
pub fn apply_defaults(opts: &Options) -> ResolvedOptions {
    ResolvedOptions {
        lossless: opts.lossless.unwrap_or(false),
        quality: opts.quality.unwrap_or(DEFAULT_QUALITY),
        method: opts.method.unwrap_or(4),
        image_hint: opts.image_hint.unwrap_or_default(),
        target_size: opts.target_size.unwrap_or(0),
        target_psnr: opts.target_psnr.unwrap_or(0.0),
        segments: opts.segments.unwrap_or(2),
        sns_strength: opts.sns_strength.unwrap_or(100),
        filter_strength: opts.filter_strength.unwrap_or(100),
        filter_sharpness: opts.filter_sharpness.unwrap_or(0),
        filter_type: opts.filter_type.unwrap_or_default(),
        autofilter: opts.autofilter.unwrap_or(false),
        alpha_compression: opts.alpha_compression.unwrap_or(1),
        alpha_filtering: opts.alpha_filtering.unwrap_or_default(),
        pass: opts.pass.unwrap_or(1),
        show_compressed: opts.show_compressed.unwrap_or(false),
        preprocessing: opts.preprocessing.unwrap_or(1),
        partitions: opts.partitions.unwrap_or(0),
        partition_limit: opts.partition_limit.unwrap_or(0),
        emulate_jpeg_size: opts.emulate_jpeg_size.unwrap_or(false),
        thread_level: opts.thread_level.unwrap_or(false),
        low_memory: opts.low_memory.unwrap_or(false),
        near_lossless: opts.near_lossless.unwrap_or(100),
        exact: opts.exact.unwrap_or(false),
        use_delta_palette: opts.use_delta_palette.unwrap_or(false),
        use_sharp_yuv: opts.use_sharp_yuv.unwrap_or(true),
    }
}

/// Resolve caller options into a complete configuration and an encode path.
///
/// Priority: any advanced field set selects [`EncodePath::LossyAdvanced`];
/// otherwise `lossless` selects [`EncodePath::Lossless`]; otherwise
/// [`EncodePath::LossySimple`]. On the simple path only `lossless` and
/// `quality` are read from the caller; everything else stays at its default.
pub fn resolve(opts: Option<&Options>) -> (ResolvedOptions, EncodePath) {
    let Some(opts) = opts else {
        tracing::debug!(path = ?EncodePath::LossySimple, "no options, using defaults");
        return (ResolvedOptions::default(), EncodePath::LossySimple);
    };

    let (resolved, path) = if has_advanced(opts) {
        (apply_defaults(opts), EncodePath::LossyAdvanced)
    } else if opts.lossless.unwrap_or(false) {
        let resolved = ResolvedOptions {
            lossless: true,
            quality: opts.quality.unwrap_or(DEFAULT_QUALITY),
            ..ResolvedOptions::default()
        };
        (resolved, EncodePath::Lossless)
    } else {
        let resolved = ResolvedOptions {
            quality: opts.quality.unwrap_or(DEFAULT_QUALITY),
            ..ResolvedOptions::default()
        };
        (resolved, EncodePath::LossySimple)
    };

    tracing::debug!(
        path = ?path,
        quality = resolved.quality,
        lossless = resolved.lossless,
        "resolved encode options"
    );
    (resolved, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_options_resolve_to_simple_q90() {
        let (resolved, path) = resolve(None);
        assert_eq!(path, EncodePath::LossySimple);
        assert_eq!(resolved.quality, 90.0);
        assert!(!resolved.lossless);
    }

    #[test]
    fn empty_options_resolve_to_simple_q90() {
        let (resolved, path) = resolve(Some(&Options::new()));
        assert_eq!(path, EncodePath::LossySimple);
        assert_eq!(resolved.quality, 90.0);
    }

    #[test]
    fn method_alone_selects_advanced() {
        let opts = Options::new().with_method(6);
        let (resolved, path) = resolve(Some(&opts));
        assert_eq!(path, EncodePath::LossyAdvanced);
        assert_eq!(resolved.method, 6);
        // Defaults fill in everything else.
        assert_eq!(resolved.quality, 90.0);
        assert_eq!(resolved.segments, 2);
        assert_eq!(resolved.sns_strength, 100);
        assert_eq!(resolved.filter_type, FilterType::Strong);
        assert!(resolved.use_sharp_yuv);
    }

    #[test]
    fn lossless_alone_selects_lossless() {
        let (resolved, path) = resolve(Some(&Options::lossless()));
        assert_eq!(path, EncodePath::Lossless);
        assert!(resolved.lossless);
        assert!(!resolved.exact);
    }

    #[test]
    fn advanced_wins_over_lossless() {
        let opts = Options::lossless().with_exact(true);
        let (resolved, path) = resolve(Some(&opts));
        assert_eq!(path, EncodePath::LossyAdvanced);
        assert!(resolved.lossless);
        assert!(resolved.exact);
    }

    #[test]
    fn simple_path_keeps_explicit_zero_quality() {
        let opts = Options::new().with_quality(0.0);
        let (resolved, path) = resolve(Some(&opts));
        assert_eq!(path, EncodePath::LossySimple);
        assert_eq!(resolved.quality, 0.0);
    }

    #[test]
    fn zero_valued_advanced_fields_are_not_advanced() {
        let opts = Options::new()
            .with_method(0)
            .with_target_psnr(0.0)
            .with_autofilter(false)
            .with_filter_type(FilterType::Simple)
            .with_alpha_filtering(AlphaFiltering::None)
            .with_image_hint(ImageHint::Default)
            .with_sharp_yuv(false);
        assert!(!has_advanced(&opts));
        assert_eq!(resolve(Some(&opts)).1, EncodePath::LossySimple);
    }

    #[test]
    fn every_advanced_field_is_detected() {
        let cases = [
            Options::new().with_method(1),
            Options::new().with_image_hint(ImageHint::Photo),
            Options::new().with_target_size(10_000),
            Options::new().with_target_psnr(42.0),
            Options::new().with_segments(4),
            Options::new().with_sns_strength(50),
            Options::new().with_filter_strength(80),
            Options::new().with_filter_sharpness(3),
            Options::new().with_filter_type(FilterType::Strong),
            Options::new().with_autofilter(true),
            Options::new().with_alpha_compression(1),
            Options::new().with_alpha_filtering(AlphaFiltering::Best),
            Options::new().with_pass(5),
            Options::new().with_show_compressed(true),
            Options::new().with_preprocessing(1),
            Options::new().with_partitions(2),
            Options::new().with_partition_limit(50),
            Options::new().with_emulate_jpeg_size(true),
            Options::new().with_thread_level(true),
            Options::new().with_low_memory(true),
            Options::new().with_near_lossless(60),
            Options::new().with_exact(true),
            Options::new().with_delta_palette(true),
            Options::new().with_sharp_yuv(true),
        ];
        for opts in &cases {
            assert!(has_advanced(opts), "not detected: {opts:?}");
        }
        assert!(!has_advanced(&Options::new().with_quality(50.0).with_lossless(true)));
    }

    #[test]
    fn defaults_never_touch_set_fields() {
        let opts = Options {
            lossless: Some(true),
            quality: Some(33.0),
            method: Some(6),
            image_hint: Some(ImageHint::Graph),
            target_size: Some(1234),
            target_psnr: Some(40.0),
            segments: Some(4),
            sns_strength: Some(10),
            filter_strength: Some(20),
            filter_sharpness: Some(7),
            filter_type: Some(FilterType::Simple),
            autofilter: Some(true),
            alpha_compression: Some(0),
            alpha_filtering: Some(AlphaFiltering::Best),
            pass: Some(10),
            show_compressed: Some(true),
            preprocessing: Some(0),
            partitions: Some(3),
            partition_limit: Some(90),
            emulate_jpeg_size: Some(true),
            thread_level: Some(true),
            low_memory: Some(true),
            near_lossless: Some(40),
            exact: Some(true),
            use_delta_palette: Some(true),
            use_sharp_yuv: Some(false),
        };
        let first = apply_defaults(&opts);
        assert_eq!(first.quality, 33.0);
        assert_eq!(first.method, 6);
        assert_eq!(first.alpha_compression, 0);
        assert_eq!(first.preprocessing, 0);
        assert!(!first.use_sharp_yuv);

        // Feeding the resolved values back in changes nothing.
        let again = apply_defaults(&Options {
            method: Some(first.method),
            segments: Some(first.segments),
            ..opts.clone()
        });
        assert_eq!(first, again);
    }

    #[test]
    fn apply_defaults_does_not_mutate_input() {
        let opts = Options::new().with_method(2);
        let before = opts.clone();
        let _ = apply_defaults(&opts);
        let _ = resolve(Some(&opts));
        assert_eq!(opts, before);
    }

    #[test]
    fn sharp_yuv_defaults_on_but_explicit_off_is_kept() {
        assert!(apply_defaults(&Options::new()).use_sharp_yuv);
        let opts = Options::new().with_method(3).with_sharp_yuv(false);
        let (resolved, path) = resolve(Some(&opts));
        assert_eq!(path, EncodePath::LossyAdvanced);
        assert!(!resolved.use_sharp_yuv);
    }
}
