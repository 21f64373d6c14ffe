/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Small epsilon to avoid division by zero in floating-point comparisons.
pub const EPSILON: f32 = 1e-10;

/// Tolerance used by polygon containment and clipping (in pixels).
pub const GEOMETRY_EPSILON: f64 = 1e-9;

/// ITU-R BT.601 luminance coefficient for the red channel.
pub const LUMINANCE_R: f32 = 0.299;

/// ITU-R BT.601 luminance coefficient for the green channel.
pub const LUMINANCE_G: f32 = 0.587;

/// ITU-R BT.601 luminance coefficient for the blue channel.
pub const LUMINANCE_B: f32 = 0.114;

/// Height (in pixels) that correspondence search images are reduced to.
/// Taller sources are downsampled; shorter ones are used as-is.
pub const DEFAULT_PREPROCESS_HEIGHT: u32 = 720;

/// Half-size of the correlation window used for matching (9x9 window).
pub const DEFAULT_MATCH_WINDOW_RADIUS: usize = 4;

/// Maximum displacement (preprocessed pixels) between matched corners.
pub const DEFAULT_MATCH_MAX_DISTANCE: f64 = 50.0;

/// Upper bound on corners kept per image for matching.
pub const DEFAULT_MAX_KEYPOINTS: usize = 500;

/// Minimum corner response, as a fraction of the strongest response.
pub const DEFAULT_CORNER_THRESHOLD: f32 = 0.01;

/// Minimum normalized cross-correlation for a match to be kept.
pub const DEFAULT_MIN_CORRELATION: f32 = 0.6;

/// Gaussian window sigma for the Harris structure tensor.
pub const HARRIS_WINDOW_SIGMA: f32 = 1.5;

/// Harris detector sensitivity constant `k`.
pub const HARRIS_K: f32 = 0.04;

/// Number of independent RANSAC trials run per frame pair.
pub const DEFAULT_RANSAC_TRIALS: usize = 20;

/// Maximum model evaluations within a single RANSAC run.
pub const DEFAULT_RANSAC_MAX_EVALUATIONS: usize = 1000;

/// Maximum attempts to draw a non-degenerate minimal sample per evaluation.
pub const DEFAULT_RANSAC_MAX_SAMPLINGS: usize = 100;

/// Symmetric transfer error (pixels) under which a correspondence is an inlier.
pub const DEFAULT_RANSAC_INLIER_THRESHOLD: f64 = 3.0;

/// Probability that at least one sample is outlier-free.
pub const DEFAULT_RANSAC_CONFIDENCE: f64 = 0.99;

/// Points per minimal homography sample.
pub const HOMOGRAPHY_SAMPLE_SIZE: usize = 4;

/// Chromosomes per generation in the crop search.
pub const DEFAULT_POPULATION_SIZE: usize = 1000;

/// Generation cap for the crop search.
pub const DEFAULT_MAX_GENERATIONS: usize = 1000;

/// Consecutive generations with an unchanged best chromosome before stopping.
pub const DEFAULT_STAGNATION_LIMIT: usize = 10;

/// Resampling attempts per mutation before the last value is kept.
pub const DEFAULT_MUTATION_ATTEMPTS: usize = 100;

/// Probability that a consecutive chromosome pair is crossed over.
pub const DEFAULT_CROSSOVER_RATE: f64 = 0.75;

/// Probability that a chromosome produces a mutated offspring.
pub const DEFAULT_MUTATION_RATE: f64 = 0.1;
