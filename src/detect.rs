//! Chip detection
//!
//! Probes every card and device slot until one reports a well-formed chip
//! identity. The driver is only held open for the duration of the probe.

use crate::dcmi::DcmiDriver;
use crate::domain::ChipInfo;
use crate::error::{DeviceContext, DeviceError, NotFoundKind};

use std::ops::Deref;

/// An initialized driver that is shut down when dropped
pub struct DriverSession<'a, D: DcmiDriver> {
    driver: &'a mut D,
}

impl<'a, D: DcmiDriver> DriverSession<'a, D> {
    /// Initialize the driver and hold it open
    pub fn open(driver: &'a mut D) -> Result<Self, DeviceError> {
        driver.init().map_err(DeviceError::InitFailed)?;
        Ok(Self { driver })
    }
}

impl<D: DcmiDriver> Deref for DriverSession<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.driver
    }
}

impl<D: DcmiDriver> Drop for DriverSession<'_, D> {
    fn drop(&mut self) {
        if let Err(e) = self.driver.shutdown() {
            log::warn!("Driver shutdown after probe failed: {}", e);
        }
    }
}

/// Find the first valid chip identity on the host
pub fn detect<D: DcmiDriver>(driver: &mut D) -> Result<ChipInfo, DeviceError> {
    let session = DriverSession::open(driver)?;

    let cards = session
        .card_list()
        .map_err(|source| DeviceError::DriverCallFailed {
            operation: "card_list",
            context: DeviceContext::Host,
            source,
        })?;
    if cards.is_empty() {
        return Err(DeviceError::NotFound(NotFoundKind::NoHardware));
    }

    for card_id in cards {
        let device_num = match session.device_num_in_card(card_id) {
            Ok(0) => {
                log::debug!("cardID({}) has no devices, skipping", card_id);
                continue;
            }
            Ok(n) => n,
            Err(e) => {
                log::debug!("cardID({}) device count failed: {}", card_id, e);
                continue;
            }
        };

        for device_id in 0..device_num {
            let context = DeviceContext::Slot { card_id, device_id };
            match session.chip_info(card_id, device_id) {
                Ok(chip) if chip.is_valid() => {
                    log::debug!("Detected {} at {}", chip, context);
                    return Ok(chip);
                }
                Ok(chip) => log::debug!("Ignoring malformed chip info {:?} at {}", chip, context),
                Err(e) => log::debug!("Chip info query failed at {}: {}", context, e),
            }
        }
    }

    Err(DeviceError::NotFound(NotFoundKind::NoValidChipInfo))
}
