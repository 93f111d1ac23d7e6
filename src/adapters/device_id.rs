//! Telemetry identity of this feeder.
//!
//! The `deviceId` in every record (and in the collector URL) is either a
//! build-time override or `FD-` followed by the low three bytes of the
//! factory eFuse MAC.  The station hostname always follows the MAC so the
//! board stays findable on the router whatever id the cloud knows it by.

use core::fmt::Write;

use heapless::String;

pub type MacAddress = [u8; 6];

/// Id and hostname resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub id: String<32>,
    pub hostname: String<24>,
}

impl DeviceIdentity {
    /// Resolve from the factory MAC of this chip.
    pub fn from_factory_mac(override_id: &str) -> Self {
        Self::resolve(override_id, &factory_mac())
    }

    /// `override_id` wins when non-empty and fits; otherwise `FD-XXYYZZ`.
    pub fn resolve(override_id: &str, mac: &MacAddress) -> Self {
        let [.., a, b, c] = *mac;

        let mut id = String::new();
        if override_id.is_empty() || id.push_str(override_id).is_err() {
            id.clear();
            let _ = write!(id, "FD-{a:02X}{b:02X}{c:02X}");
        }

        let mut hostname = String::new();
        let _ = write!(hostname, "petfeeder-{a:02x}{b:02x}{c:02x}");

        Self { id, hostname }
    }
}

#[cfg(target_os = "espidf")]
fn factory_mac() -> MacAddress {
    let mut mac = [0u8; 6];
    // SAFETY: the buffer is the 6 bytes the call writes.
    unsafe {
        esp_idf_sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

#[cfg(not(target_os = "espidf"))]
fn factory_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}
