//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements        | Connects to                     |
//! |-------------|-------------------|---------------------------------|
//! | `hardware`  | EnvironmentPort   | AHT20 over I2C                  |
//! |             | TouchPort         | CAP1188 over I2C                |
//! |             | ActuatorPort      | Servo PWM, LED GPIO, buzzer     |
//! | `cloud`     | TelemetryPort     | HTTPS collector (ESP-IDF HTTP)  |
//! | `log_sink`  | EventSink         | Serial log output               |
//! | `wifi`      | ConnectivityPort  | ESP-IDF WiFi STA                |
//! | `time`      | (clock)           | ESP32 high-resolution timer     |
//! | `device_id` | (identity)        | eFuse factory MAC               |

pub mod cloud;
pub mod device_id;
pub mod hardware;
pub mod log_sink;
pub mod time;
pub(super) mod utils;
pub mod wifi;
