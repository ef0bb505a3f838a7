//! Fake DCMI driver for testing
//!
//! Provides a stateful in-memory driver so the detector, backends and device
//! manager can be exercised without an NPU. Clones share state, so a test can
//! hand one clone to the code under test and inspect call counts on another.

use crate::dcmi::{DcmiDriver, RawVDevInfo, MAX_VDEV_NUM};
use crate::domain::{ChipInfo, DeviceComponent, ErrorCodes, HbmInfo, MemoryInfo};
use crate::error::DcmiError;

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};

/// Operations that are bookkeeping rather than device work
const NON_OPERATIONS: &[&str] = &["init", "shutdown", "card_id_device_id"];

/// A fake device slot
#[derive(Debug, Clone)]
pub struct FakeDevice {
    pub logic_id: u32,
    pub physic_id: u32,
    pub chip: Result<ChipInfo, DcmiError>,
    pub health: u32,
    pub temperature: i32,
    /// 0.01 V units
    pub voltage: u32,
    /// 0.1 W units
    pub power: u32,
    pub utilization: u32,
    pub frequency: u32,
    pub memory: MemoryInfo,
    pub hbm: HbmInfo,
    pub error_codes: ErrorCodes,
    pub ip: IpAddr,
    /// AI cores available for virtual devices
    pub ai_core: u32,
}

impl FakeDevice {
    /// Create a fake device with plausible telemetry
    pub fn new(logic_id: u32, chip: ChipInfo) -> Self {
        Self {
            logic_id,
            physic_id: logic_id,
            chip: Ok(chip),
            health: 0,
            temperature: 45,
            voltage: 85,
            power: 725,
            utilization: 30,
            frequency: 1000,
            memory: MemoryInfo::new(32768, 16384, 2666, 50),
            hbm: HbmInfo {
                size_kb: 64 * 1024 * 1024,
                frequency_mhz: 1600,
                usage_kb: 1024 * 1024,
                temperature: 40,
                bandwidth_util_rate: 10,
            },
            error_codes: ErrorCodes::new(0, Vec::new()),
            ip: IpAddr::V4(Ipv4Addr::new(192, 168, 1, 10)),
            ai_core: 32,
        }
    }

    /// Builder: chip info query fails with `err`
    pub fn with_chip_error(mut self, err: DcmiError) -> Self {
        self.chip = Err(err);
        self
    }

    /// Builder: set physical ID
    pub fn with_physic_id(mut self, physic_id: u32) -> Self {
        self.physic_id = physic_id;
        self
    }

    /// Builder: set AI core capacity
    pub fn with_ai_core(mut self, ai_core: u32) -> Self {
        self.ai_core = ai_core;
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct FakeVDev {
    id: u32,
    cores: u32,
}

#[derive(Debug, Default)]
struct FakeState {
    cards: Vec<(u32, Vec<FakeDevice>)>,
    /// Op name to (calls that still succeed, error afterwards)
    failures: HashMap<&'static str, (usize, DcmiError)>,
    calls: HashMap<&'static str, usize>,
    vdevs: HashMap<(u32, u32), Vec<FakeVDev>>,
    next_vdev_id: u32,
}

impl FakeState {
    fn device(&self, card_id: u32, device_id: u32) -> Result<&FakeDevice, DcmiError> {
        self.cards
            .iter()
            .find(|(id, _)| *id == card_id)
            .and_then(|(_, devices)| devices.get(device_id as usize))
            .ok_or_else(|| {
                DcmiError::InvalidArgument(format!(
                    "no device at card {} device {}",
                    card_id, device_id
                ))
            })
    }

    fn find_device<F>(&self, pred: F) -> Option<(u32, u32, &FakeDevice)>
    where
        F: Fn(&FakeDevice) -> bool,
    {
        self.cards.iter().find_map(|(card_id, devices)| {
            devices
                .iter()
                .enumerate()
                .find(|(_, d)| pred(d))
                .map(|(idx, d)| (*card_id, idx as u32, d))
        })
    }
}

/// Stateful fake driver
#[derive(Debug, Clone, Default)]
pub struct FakeDriver {
    state: Arc<Mutex<FakeState>>,
}

impl FakeDriver {
    /// Create a driver with no cards
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a card holding `devices`, indexed by position
    pub fn with_card(self, card_id: u32, devices: Vec<FakeDevice>) -> Self {
        self.state.lock().unwrap().cards.push((card_id, devices));
        self
    }

    /// Builder: make every call to `op` fail with `err`
    pub fn with_failure(self, op: &'static str, err: DcmiError) -> Self {
        self.with_failure_after(op, 0, err)
    }

    /// Builder: let the first `skip` calls to `op` succeed, then fail with `err`
    pub fn with_failure_after(self, op: &'static str, skip: usize, err: DcmiError) -> Self {
        self.state.lock().unwrap().failures.insert(op, (skip, err));
        self
    }

    /// Number of times `op` was called
    pub fn calls(&self, op: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(op)
            .copied()
            .unwrap_or(0)
    }

    /// Calls of real device operations, excluding lifecycle and address translation
    pub fn operation_calls(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|&(op, _)| !NON_OPERATIONS.contains(op))
            .map(|(_, n)| n)
            .sum()
    }

    pub fn init_calls(&self) -> usize {
        self.calls("init")
    }

    pub fn shutdown_calls(&self) -> usize {
        self.calls("shutdown")
    }

    /// Reset all call counters
    pub fn reset_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Number of live virtual devices on a slot
    pub fn vdev_count(&self, card_id: u32, device_id: u32) -> usize {
        self.state
            .lock()
            .unwrap()
            .vdevs
            .get(&(card_id, device_id))
            .map_or(0, Vec::len)
    }

    /// Count the call and apply any injected failure
    fn record(&self, state: &mut FakeState, op: &'static str) -> Result<(), DcmiError> {
        let count = state.calls.entry(op).or_insert(0);
        *count += 1;
        let count = *count;
        match state.failures.get(op) {
            Some((skip, err)) if count > *skip => Err(err.clone()),
            _ => Ok(()),
        }
    }

    fn read<T, F>(&self, op: &'static str, card_id: u32, device_id: u32, f: F) -> Result<T, DcmiError>
    where
        F: FnOnce(&FakeDevice) -> T,
    {
        let mut state = self.state.lock().unwrap();
        self.record(&mut state, op)?;
        state.device(card_id, device_id).map(f)
    }
}

/// Parse "virNN" into a core count
fn template_cores(template: &str) -> Result<u32, DcmiError> {
    template
        .strip_prefix("vir")
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| DcmiError::InvalidArgument(format!("unknown template {}", template)))
}

impl DcmiDriver for FakeDriver {
    fn init(&mut self) -> Result<(), DcmiError> {
        let mut state = self.state.lock().unwrap();
        self.record(&mut state, "init")
    }

    fn shutdown(&mut self) -> Result<(), DcmiError> {
        let mut state = self.state.lock().unwrap();
        self.record(&mut state, "shutdown")
    }

    fn card_list(&self) -> Result<Vec<u32>, DcmiError> {
        let mut state = self.state.lock().unwrap();
        self.record(&mut state, "card_list")?;
        Ok(state.cards.iter().map(|(id, _)| *id).collect())
    }

    fn device_num_in_card(&self, card_id: u32) -> Result<u32, DcmiError> {
        let mut state = self.state.lock().unwrap();
        self.record(&mut state, "device_num_in_card")?;
        state
            .cards
            .iter()
            .find(|(id, _)| *id == card_id)
            .map(|(_, devices)| devices.len() as u32)
            .ok_or_else(|| DcmiError::InvalidArgument(format!("no card {}", card_id)))
    }

    fn chip_info(&self, card_id: u32, device_id: u32) -> Result<ChipInfo, DcmiError> {
        self.read("chip_info", card_id, device_id, |d| d.chip.clone())?
    }

    fn card_id_device_id(&self, logic_id: u32) -> Result<(u32, u32), DcmiError> {
        let mut state = self.state.lock().unwrap();
        self.record(&mut state, "card_id_device_id")?;
        state
            .find_device(|d| d.logic_id == logic_id)
            .map(|(card, dev, _)| (card, dev))
            .ok_or_else(|| DcmiError::InvalidArgument(format!("no logic id {}", logic_id)))
    }

    fn logic_id(&self, card_id: u32, device_id: u32) -> Result<u32, DcmiError> {
        self.read("logic_id", card_id, device_id, |d| d.logic_id)
    }

    fn physic_id_from_logic_id(&self, logic_id: u32) -> Result<u32, DcmiError> {
        let mut state = self.state.lock().unwrap();
        self.record(&mut state, "physic_id_from_logic_id")?;
        state
            .find_device(|d| d.logic_id == logic_id)
            .map(|(_, _, d)| d.physic_id)
            .ok_or_else(|| DcmiError::InvalidArgument(format!("no logic id {}", logic_id)))
    }

    fn logic_id_from_physic_id(&self, physic_id: u32) -> Result<u32, DcmiError> {
        let mut state = self.state.lock().unwrap();
        self.record(&mut state, "logic_id_from_physic_id")?;
        state
            .find_device(|d| d.physic_id == physic_id)
            .map(|(_, _, d)| d.logic_id)
            .ok_or_else(|| DcmiError::InvalidArgument(format!("no physic id {}", physic_id)))
    }

    fn health(&self, card_id: u32, device_id: u32) -> Result<u32, DcmiError> {
        self.read("health", card_id, device_id, |d| d.health)
    }

    fn network_health(&self, card_id: u32, device_id: u32) -> Result<u32, DcmiError> {
        self.read("network_health", card_id, device_id, |d| d.health)
    }

    fn utilization_rate(
        &self,
        card_id: u32,
        device_id: u32,
        _component: DeviceComponent,
    ) -> Result<u32, DcmiError> {
        self.read("utilization_rate", card_id, device_id, |d| d.utilization)
    }

    fn temperature(&self, card_id: u32, device_id: u32) -> Result<i32, DcmiError> {
        self.read("temperature", card_id, device_id, |d| d.temperature)
    }

    fn voltage(&self, card_id: u32, device_id: u32) -> Result<u32, DcmiError> {
        self.read("voltage", card_id, device_id, |d| d.voltage)
    }

    fn power(&self, card_id: u32, device_id: u32) -> Result<u32, DcmiError> {
        self.read("power", card_id, device_id, |d| d.power)
    }

    fn frequency(
        &self,
        card_id: u32,
        device_id: u32,
        _component: DeviceComponent,
    ) -> Result<u32, DcmiError> {
        self.read("frequency", card_id, device_id, |d| d.frequency)
    }

    fn memory_info(&self, card_id: u32, device_id: u32) -> Result<MemoryInfo, DcmiError> {
        self.read("memory_info", card_id, device_id, |d| d.memory)
    }

    fn hbm_info(&self, card_id: u32, device_id: u32) -> Result<HbmInfo, DcmiError> {
        self.read("hbm_info", card_id, device_id, |d| d.hbm)
    }

    fn error_codes(&self, card_id: u32, device_id: u32) -> Result<ErrorCodes, DcmiError> {
        self.read("error_codes", card_id, device_id, |d| d.error_codes.clone())
    }

    fn ip_address(&self, card_id: u32, device_id: u32) -> Result<IpAddr, DcmiError> {
        self.read("ip_address", card_id, device_id, |d| d.ip)
    }

    fn create_vdevice(
        &self,
        card_id: u32,
        device_id: u32,
        template: &str,
    ) -> Result<u32, DcmiError> {
        let mut state = self.state.lock().unwrap();
        self.record(&mut state, "create_vdevice")?;
        let cores = template_cores(template)?;
        let capacity = state.device(card_id, device_id)?.ai_core;

        let live = state.vdevs.get(&(card_id, device_id)).map_or(&[][..], Vec::as_slice);
        let used: u32 = live.iter().map(|v| v.cores).sum();
        if live.len() >= MAX_VDEV_NUM || used + cores > capacity {
            return Err(DcmiError::Call {
                function: "dcmi_create_vdevice",
                code: -8005,
            });
        }

        state.next_vdev_id += 1;
        let id = state.next_vdev_id;
        state
            .vdevs
            .entry((card_id, device_id))
            .or_default()
            .push(FakeVDev { id, cores });
        Ok(id)
    }

    fn vdevice_info(&self, card_id: u32, device_id: u32) -> Result<RawVDevInfo, DcmiError> {
        let mut state = self.state.lock().unwrap();
        self.record(&mut state, "vdevice_info")?;
        let capacity = state.device(card_id, device_id)?.ai_core;
        let live = state.vdevs.get(&(card_id, device_id)).map_or(&[][..], Vec::as_slice);

        let mut raw = RawVDevInfo {
            vdev_num: live.len() as u32,
            ..RawVDevInfo::default()
        };
        let mut used = 0;
        for (slot, vdev) in live.iter().enumerate() {
            raw.vdev_id[slot] = vdev.id;
            raw.vf_id[slot] = slot as u32 + 1;
            raw.core_num[slot] = vdev.cores;
            used += vdev.cores;
        }
        raw.core_num_unused = capacity.saturating_sub(used);
        Ok(raw)
    }

    fn destroy_vdevice(&self, card_id: u32, device_id: u32, vdev_id: u32) -> Result<(), DcmiError> {
        let mut state = self.state.lock().unwrap();
        self.record(&mut state, "destroy_vdevice")?;
        state.device(card_id, device_id)?;
        let live = state.vdevs.entry((card_id, device_id)).or_default();
        match live.iter().position(|v| v.id == vdev_id) {
            Some(pos) => {
                live.remove(pos);
                Ok(())
            }
            None => Err(DcmiError::InvalidArgument(format!(
                "no virtual device {}",
                vdev_id
            ))),
        }
    }
}
