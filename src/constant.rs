/// names of built-in commands
pub mod commands {
    pub const PING: &str = "ping";
    pub const ROLL: &str = "roll";
    pub const HELP: &str = "help";
}

/// limits for the `roll` command
pub mod dice {
    pub const MAX_COUNT: u32 = 100;
    pub const MIN_SIDES: u32 = 2;
    pub const MAX_SIDES: u32 = 1000;
    pub const MAX_MODIFIER: i64 = MAX_COUNT as i64 * MAX_SIDES as i64;
    /// Rolled when no expression is given
    pub const DEFAULT: &str = "1d6";
}
