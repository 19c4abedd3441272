//! Default values and fixed tables of the binding engine

/// Raw scale value meaning 1:1
pub const SCALE_UNITY: f64 = 1000.0;

/// Reserved live variable holding the logged-in user's level
pub const USER_LEVEL_VARIABLE: &str = ".currentuserlevel";

/// Fill/stroke value when a shape has no color
pub const NO_COLOR: &str = "none";

/// Fill-flags value that turns the fill off
pub const FILL_FLAG_NO_FILL: &str = "1";

/// Frame-flags value that turns the frame off
pub const FRAME_FLAG_NO_FRAME: &str = "8";

/// Input-disabled value that blocks pointer events
pub const INPUT_DISABLED: &str = "1";

/// Dash patterns only apply to lines at most this wide
pub const DASH_MAX_EDGE: f64 = 1.0;

/// Solid line
pub const DASH_SOLID: &str = "0";

/// Frame-flag value → stroke dash pattern
pub const DASH_PATTERNS: [(&str, &str); 4] = [
    ("4", "20,10,5,5,5,10"),
    ("3", "20,5,5,5"),
    ("2", "5,5"),
    ("1", "10,10"),
];
