//! End-to-end device manager flows against the fake driver

use npuctl::domain::{ChipInfo, DeviceComponent, DeviceType};
use npuctl::error::{DcmiError, DeviceError};
use npuctl::mock::{FakeDevice, FakeDriver};
use npuctl::DeviceManager;

fn ascend910_host() -> FakeDriver {
    let chip = ChipInfo::new("Ascend", "910B", "V1");
    FakeDriver::new()
        .with_card(0, vec![FakeDevice::new(0, chip.clone()), FakeDevice::new(1, chip.clone())])
        .with_card(1, vec![FakeDevice::new(2, chip).with_physic_id(5)])
}

#[test]
fn inventory_and_telemetry() {
    let driver = ascend910_host();
    let manager = DeviceManager::auto_init(driver.clone(), Some(DeviceType::Ascend910)).unwrap();

    assert_eq!(manager.device_type(), DeviceType::Ascend910);
    assert_eq!(manager.device_count().unwrap(), 3);
    assert_eq!(manager.device_list().unwrap(), vec![0, 1, 2]);
    assert_eq!(manager.card_id_device_id(2).unwrap(), (1, 0));
    assert_eq!(manager.logic_id_from_physic_id(5).unwrap(), 2);
    assert_eq!(manager.logic_id(0, 1).unwrap(), 1);

    assert_eq!(manager.temperature(1).unwrap(), 45);
    assert_eq!(manager.utilization_rate(1, DeviceComponent::Hbm).unwrap(), 30);
    assert!(manager.hbm_info(2).is_ok());

    manager.shutdown().unwrap();
    assert_eq!(driver.shutdown_calls(), 2);
}

#[test]
fn virtual_device_partitioning() {
    let driver = ascend910_host();
    let manager = DeviceManager::auto_init(driver.clone(), None).unwrap();

    let first = manager.create_vdevice(0, 8).unwrap();
    let second = manager.create_vdevice(0, 16).unwrap();
    assert_ne!(first, second);

    let info = manager.virtual_device_info(0).unwrap();
    assert_eq!(info.total.vdev_num, 2);
    assert_eq!(info.core_count(), 32);
    assert_eq!(info.core_num_unused(), 8);
    assert!(info.is_consistent());

    // Only 8 cores remain
    let err = manager.create_vdevice(0, 16).unwrap_err();
    assert!(matches!(
        err,
        DeviceError::DriverCallFailed {
            source: DcmiError::Call { code: -8005, .. },
            ..
        }
    ));

    manager.destroy_vdevice(0, first).unwrap();
    manager.destroy_vdevice(0, second).unwrap();
    assert_eq!(driver.vdev_count(0, 0), 0);
    assert_eq!(manager.virtual_device_info(0).unwrap().core_num_unused(), 32);
}

#[test]
fn mismatched_expectation_is_refused() {
    let driver = ascend910_host();
    let err = DeviceManager::auto_init(driver.clone(), Some(DeviceType::Ascend310P)).unwrap_err();
    assert!(matches!(
        err,
        DeviceError::TypeMismatch {
            expected: DeviceType::Ascend310P,
            detected: DeviceType::Ascend910,
        }
    ));
    // Detection session was closed, backend never initialized
    assert_eq!(driver.init_calls(), 1);
    assert_eq!(driver.shutdown_calls(), 1);
}
