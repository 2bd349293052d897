//! Shared constants for the board core.

// ── Canvas bounds ───────────────────────────────────────────────

/// Lower clamp bound for folder positions, in percent of the canvas.
pub const POSITION_MIN: f64 = 5.0;

/// Upper clamp bound for folder positions, in percent of the canvas.
pub const POSITION_MAX: f64 = 95.0;

/// Lower bound of the spawn range for new or position-less folders.
pub const SPAWN_MIN: f64 = 10.0;

/// Upper bound of the spawn range for new or position-less folders.
pub const SPAWN_MAX: f64 = 90.0;

/// X coordinate of the board center, in percent.
pub const BOARD_CENTER_X: f64 = 50.0;

/// Y coordinate of the board center, in percent.
pub const BOARD_CENTER_Y: f64 = 50.0;

// ── Connections ─────────────────────────────────────────────────

/// Sentinel endpoint value meaning "the board center".
pub const BOARD_CENTER_KEY: &str = "board";

/// Default connection color (cyan).
pub const DEFAULT_CONNECTION_COLOR: &str = "#00ffff";

/// Fixed palette offered by the folder context menu: cyan, pink, lime.
pub const CONNECTION_PALETTE: [&str; 3] = ["#00ffff", "#ff4081", "#76ff03"];
