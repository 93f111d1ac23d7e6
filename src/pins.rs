//! GPIO / peripheral pin assignments for the PetFeeder board.
//!
//! | Signal      | GPIO | Owner                                   |
//! |-------------|------|-----------------------------------------|
//! | I²C SDA     | 41   | `I2cDriver` (`peripherals.pins.gpio41`) |
//! | I²C SCL     | 40   | `I2cDriver` (`peripherals.pins.gpio40`) |
//! | Servo PWM   | 19   | `LedcDriver` timer0/ch0                 |
//! | LED         | 5    | `PinDriver::output`                     |
//! | Buzzer      | 6    | raw LEDC timer1/ch1, [`BUZZER_GPIO`]    |
//!
//! Pins claimed through `esp-idf-hal` are typed singletons selected in
//! `main`; only the raw-configured buzzer needs a number here.

// ---------------------------------------------------------------------------
// I²C bus (AHT20 + CAP1188)
// ---------------------------------------------------------------------------

/// Standard-mode bus clock.
pub const I2C_BAUDRATE_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

/// Passive piezo buzzer, driven by a square wave on LEDC channel 1.
pub const BUZZER_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// Servo frame rate (50 Hz = 20 ms period).
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// Buzzer LEDC resolution (bits).  The tone frequency is retuned per tone.
pub const BUZZER_PWM_RESOLUTION_BITS: u32 = 10;
