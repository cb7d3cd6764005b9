use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub snap: SnapConfig,
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            snap: SnapConfig::default(),
            gesture: GestureConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (log files live here)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Easing curve applied to the container scroll offset during a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    /// Jump straight to the target
    None,
    Linear,
    /// Half-cosine ease-in-out, the classic "swing" curve
    #[default]
    Swing,
    Cubic,
    Quintic,
    EaseOut,
}

/// Engine behaviour: selectors, timings and thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapConfig {
    /// Selector matching the section containers
    #[serde(default = "default_section_selector")]
    pub section_selector: String,
    /// Selector matching the scrollable content inside a section
    #[serde(default = "default_content_selector")]
    pub content_selector: String,
    /// Settle delay after start and after every transition
    #[serde(default = "default_delay")]
    pub delay_ms: u64,
    /// Transition duration
    #[serde(default = "default_speed")]
    pub speed_ms: u64,
    /// Viewport width above which snapping is active
    #[serde(default = "default_breakpoint")]
    pub breakpoint_px: f64,
    /// Duration of the optimistic document scroll before a transition
    #[serde(default = "default_pre_animation")]
    pub pre_animation_ms: u64,
    /// Quiet period before a resize is acted upon
    #[serde(default = "default_resize_debounce")]
    pub resize_debounce_ms: u64,
    /// Minimum vertical swipe distance that counts as a snap gesture
    #[serde(default = "default_touch_threshold")]
    pub touch_threshold_px: f64,
    /// Sub-pixel tolerance for edge detection
    #[serde(default = "default_edge_tolerance")]
    pub edge_tolerance_px: f64,
    /// Easing of the container scroll offset
    #[serde(default)]
    pub easing: EasingType,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            section_selector: default_section_selector(),
            content_selector: default_content_selector(),
            delay_ms: default_delay(),
            speed_ms: default_speed(),
            breakpoint_px: default_breakpoint(),
            pre_animation_ms: default_pre_animation(),
            resize_debounce_ms: default_resize_debounce(),
            touch_threshold_px: default_touch_threshold(),
            edge_tolerance_px: default_edge_tolerance(),
            easing: EasingType::default(),
        }
    }
}

impl SnapConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn speed(&self) -> Duration {
        Duration::from_millis(self.speed_ms)
    }

    pub fn pre_animation(&self) -> Duration {
        Duration::from_millis(self.pre_animation_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

/// Wheel gesture classifier sensitivity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Number of recent wheel samples kept
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,
    /// Samples older than this no longer count as the same stream
    #[serde(default = "default_window")]
    pub window_ms: u64,
    /// How much stronger than the recent average a sample must be to count
    /// as a new deliberate push
    #[serde(default = "default_stability")]
    pub stability: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            history_depth: default_history_depth(),
            window_ms: default_window(),
            stability: default_stability(),
        }
    }
}

impl GestureConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds while idle
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Frame rate while a transition is animating
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
    /// Wheel delta produced by one key press or mouse wheel notch
    #[serde(default = "default_wheel_step")]
    pub wheel_step: f64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            animation_fps: default_animation_fps(),
            wheel_step: default_wheel_step(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("snapscroll")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_section_selector() -> String {
    ".snap-item".to_string()
}

fn default_content_selector() -> String {
    ".snap-item__content".to_string()
}

fn default_delay() -> u64 {
    300
}

fn default_speed() -> u64 {
    750
}

fn default_breakpoint() -> f64 {
    992.0
}

fn default_pre_animation() -> u64 {
    200
}

fn default_resize_debounce() -> u64 {
    250
}

fn default_touch_threshold() -> f64 {
    100.0
}

fn default_edge_tolerance() -> f64 {
    1.0 // absorbs sub-pixel rendering error
}

fn default_history_depth() -> usize {
    7
}

fn default_window() -> u64 {
    100
}

fn default_stability() -> f64 {
    0.05
}

fn default_tick_rate() -> u64 {
    100
}

fn default_animation_fps() -> u32 {
    60
}

fn default_wheel_step() -> f64 {
    3.0
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from the default path or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load and validate configuration from an explicit file
    pub fn load_from(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(())
    }

    /// Render the configuration as pretty TOML
    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> crate::Result<()> {
        if self.gesture.history_depth == 0 {
            return Err(crate::Error::Config(
                "gesture.history_depth must be at least 1".to_string(),
            ));
        }
        if self.gesture.window_ms == 0 {
            return Err(crate::Error::Config(
                "gesture.window_ms must be greater than 0".to_string(),
            ));
        }
        if self.gesture.stability < 0.0 {
            return Err(crate::Error::Config(
                "gesture.stability must not be negative".to_string(),
            ));
        }
        if self.snap.touch_threshold_px < 0.0 || self.snap.edge_tolerance_px < 0.0 {
            return Err(crate::Error::Config(
                "snap thresholds must not be negative".to_string(),
            ));
        }
        if self.snap.section_selector.trim().is_empty() {
            return Err(crate::Error::Config(
                "snap.section_selector must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/snapscroll/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("snapscroll")
            .join("config.toml")
    }

    /// Get the log file path used by the terminal front end
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("snapscroll.log")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }
}
