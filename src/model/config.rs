//! Conversion configuration

/// Default bound on component nesting depth
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// How resolved objects are laid out in the output package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Merge every object into one mesh; non-default colors become per-triangle paint states
    #[default]
    Painted,
    /// Keep one output object per resolved object, each assigned to its own extruder
    MultiObject,
}

impl OutputMode {
    /// Get a human-readable name for the mode
    pub fn name(&self) -> &'static str {
        match self {
            OutputMode::Painted => "painted",
            OutputMode::MultiObject => "multi-object",
        }
    }
}

/// Configuration for a conversion
///
/// # Example
///
/// ```
/// use bambu3mf::{ConvertConfig, OutputMode};
///
/// let config = ConvertConfig::new()
///     .with_mode(OutputMode::MultiObject)
///     .with_max_depth(16);
/// assert_eq!(config.mode(), OutputMode::MultiObject);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertConfig {
    mode: OutputMode,
    max_depth: usize,
}

impl ConvertConfig {
    /// Create a configuration for painted output with the default depth bound
    pub fn new() -> Self {
        Self {
            mode: OutputMode::Painted,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Select the output mode
    pub fn with_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    /// Bound component nesting; deeper references fail as a corrupt package
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Selected output mode
    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Component nesting bound
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self::new()
    }
}
