//! One-shot buzzer peripheral initialization and raw tone control.
//!
//! The buzzer needs its LEDC timer frequency retuned for every tone, which
//! the channel-level HAL driver does not expose, so it is configured with
//! raw ESP-IDF sys calls on LEDC timer 1 / channel 1.  The servo owns
//! timer 0 / channel 0 through `esp-idf-hal`.

#[cfg(target_os = "espidf")]
use esp_idf_sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    LedcTimerFailed(i32),
    LedcChannelFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::LedcTimerFailed(rc) => write!(f, "LEDC timer config failed (rc={})", rc),
            Self::LedcChannelFailed(rc) => write!(f, "LEDC channel config failed (rc={})", rc),
        }
    }
}

impl core::error::Error for HwInitError {}

/// Tone carrier at rest, retuned by [`tone_start`].
pub const BUZZER_IDLE_FREQ_HZ: u32 = 2_000;
/// 50 % duty.
#[cfg(target_os = "espidf")]
const BUZZER_DUTY_HALF: u32 = 1 << (pins::BUZZER_PWM_RESOLUTION_BITS - 1);

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        let timer = ledc_timer_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            timer_num: ledc_timer_t_LEDC_TIMER_1,
            duty_resolution: pins::BUZZER_PWM_RESOLUTION_BITS,
            freq_hz: BUZZER_IDLE_FREQ_HZ,
            clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
            ..Default::default()
        };
        let ret = ledc_timer_config(&timer);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::LedcTimerFailed(ret));
        }

        let ret = ledc_channel_config(&ledc_channel_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel: ledc_channel_t_LEDC_CHANNEL_1,
            timer_sel: ledc_timer_t_LEDC_TIMER_1,
            gpio_num: pins::BUZZER_GPIO,
            duty: 0,
            hpoint: 0,
            ..Default::default()
        });
        if ret != ESP_OK as i32 {
            return Err(HwInitError::LedcChannelFailed(ret));
        }
    }
    info!("hw_init: buzzer LEDC configured (timer1/ch1, GPIO {})", pins::BUZZER_GPIO);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── Tone control ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn tone_start(frequency_hz: u32) {
    // SAFETY: timer1/ch1 were configured in init_peripherals(); only the
    // main loop touches them.
    unsafe {
        ledc_set_freq(
            ledc_mode_t_LEDC_LOW_SPEED_MODE,
            ledc_timer_t_LEDC_TIMER_1,
            frequency_hz,
        );
        ledc_set_duty(
            ledc_mode_t_LEDC_LOW_SPEED_MODE,
            ledc_channel_t_LEDC_CHANNEL_1,
            BUZZER_DUTY_HALF,
        );
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, ledc_channel_t_LEDC_CHANNEL_1);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn tone_start(_frequency_hz: u32) {}

#[cfg(target_os = "espidf")]
pub fn tone_stop() {
    // SAFETY: see tone_start().
    unsafe {
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, ledc_channel_t_LEDC_CHANNEL_1, 0);
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, ledc_channel_t_LEDC_CHANNEL_1);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn tone_stop() {}
