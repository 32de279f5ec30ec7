use crate::error::ResetError;
use rand::RngCore;
use serde::Serialize;
use uuid::Uuid;

/// Storage key for the machine identifier.
pub const MACHINE_ID_KEY: &str = "telemetry.machineId";
/// Storage key for the Mac machine identifier.
pub const MAC_MACHINE_ID_KEY: &str = "telemetry.macMachineId";
/// Storage key for the device identifier.
pub const DEV_DEVICE_ID_KEY: &str = "telemetry.devDeviceId";

fn hex_digit(nibble: u8) -> u8 {
    match nibble {
        0..=9 => b'0' + nibble,
        10..=15 => b'a' + (nibble - 10),
        // Defensive fallback; callers provide only 0..=15.
        _ => b'0',
    }
}

/// Generate a lowercase hex string of length `2 * bytes` from OS randomness.
///
/// # Errors
/// Returns [`ResetError::Randomness`] when the OS random source fails.
pub fn random_hex_id(bytes: usize) -> Result<String, ResetError> {
    let mut raw = vec![0_u8; bytes];
    rand::rngs::OsRng
        .try_fill_bytes(&mut raw)
        .map_err(ResetError::Randomness)?;

    // Manual hex encoding (avoid extra deps).
    let mut out = Vec::with_capacity(bytes.saturating_mul(2));
    for b in raw {
        out.push(hex_digit(b >> 4));
        out.push(hex_digit(b & 0x0f));
    }
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// One freshly generated set of identifier values.
///
/// Immutable once generated; serializes under the storage key names so the
/// JSON shape matches what lands in the document.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceIdSet {
    /// 64 lowercase hex characters.
    #[serde(rename = "telemetry.machineId")]
    pub machine_id: String,
    /// 64 lowercase hex characters, independent of `machine_id`.
    #[serde(rename = "telemetry.macMachineId")]
    pub mac_machine_id: String,
    /// Version-4 UUID in textual form.
    #[serde(rename = "telemetry.devDeviceId")]
    pub dev_device_id: String,
}

impl DeviceIdSet {
    /// Draw a fresh identifier set from the OS random source.
    ///
    /// # Errors
    /// Returns [`ResetError::Randomness`] when the OS random source fails.
    pub fn generate() -> Result<Self, ResetError> {
        Ok(Self {
            machine_id: random_hex_id(32)?,
            mac_machine_id: random_hex_id(32)?,
            dev_device_id: Uuid::new_v4().to_string(),
        })
    }

    /// The `(storage key, value)` pairs in display order.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, &str); 3] {
        [
            (MACHINE_ID_KEY, self.machine_id.as_str()),
            (MAC_MACHINE_ID_KEY, self.mac_machine_id.as_str()),
            (DEV_DEVICE_ID_KEY, self.dev_device_id.as_str()),
        ]
    }
}
