// PHYSICAL
/// Gravitational constant in km^3 kg^-1 s^-2
pub const G: f64 = 6.67408e-20;
/// Mass of earth, in kilograms
pub const EARTH_MASS: f64 = 5.972e24;
/// Mean radius of earth, in kilometers
pub const EARTH_RADIUS: f64 = 6371.0;
/// Mass of the moon, in kilograms
pub const MOON_MASS: f64 = 7.34767309e22;
/// Mean radius of the moon, in kilometers
pub const MOON_RADIUS: f64 = 1737.4;

// TIME
pub const SEC_PER_MINUTE: f64 = 60.0;
pub const SEC_PER_HOUR: f64 = 60.0 * SEC_PER_MINUTE;
pub const SEC_PER_DAY: f64 = 24.0 * SEC_PER_HOUR;

// SIMULATION
/// Seconds of simulated time per tick unless configured otherwise.
pub const DEFAULT_DELTA: f64 = SEC_PER_DAY;
/// Upper bound on the size of a generated body cloud.
pub const MAX_GENERATED_BODIES: usize = 1_000_000;
/// Target number of ticks per wall-clock second.
pub const UPDATES_PER_SECOND: f64 = 15.0;
/// Interval between status lines printed by the binary, in seconds.
pub const STATUS_INTERVAL: f64 = 1.0;
