//! USB Module
//!
//! Telemetry link to the host. The CDC serial port is output-only: the
//! control loop pushes a line whenever the exposed temperature or rate index
//! changes, and `USBCTRL_IRQ` keeps enumeration and endpoints serviced since
//! the loop itself never waits on USB.

use core::cell::RefCell;
use core::fmt::Write as FmtWrite;
use critical_section::Mutex;
use heapless::String;
use temp_monitor::{Telemetry, TelemetryLink, TelemetrySnapshot};
use usb_device::bus::UsbBusAllocator;
use usb_device::prelude::*;
use usbd_serial::SerialPort;

use rp235x_hal as hal;
use hal::pac;

use rp235x_hal::pac::interrupt;

type UsbBusType = hal::usb::UsbBus;

/// pid.codes test VID/PID shared by hobby CDC devices.
const TELEMETRY_VID_PID: UsbVidPid = UsbVidPid(0x16c0, 0x27dd);

// Shared between the telemetry link (main loop) and USBCTRL_IRQ
static USB_DEVICE: Mutex<RefCell<Option<UsbDevice<UsbBusType>>>> = Mutex::new(RefCell::new(None));
static USB_SERIAL: Mutex<RefCell<Option<SerialPort<UsbBusType>>>> = Mutex::new(RefCell::new(None));

/// Brings up the telemetry CDC port and unmasks `USBCTRL_IRQ`.
///
/// Must run once, from `hardware::init`, before the control loop starts.
pub fn init(
    usb_periph: pac::USB,
    usb_dpram: pac::USB_DPRAM,
    usb_clock: hal::clocks::UsbClock,
    resets: &mut pac::RESETS,
) {
    let usb_bus = UsbBusType::new(usb_periph, usb_dpram, usb_clock, true, resets);

    // The device and port borrow the allocator for the rest of the program.
    static mut USB_BUS: Option<UsbBusAllocator<UsbBusType>> = None;
    let bus_allocator: &'static UsbBusAllocator<UsbBusType> = unsafe {
        // Safety: single call during bring-up, USBCTRL_IRQ still masked.
        let bus_ptr = core::ptr::addr_of_mut!(USB_BUS);
        *bus_ptr = Some(UsbBusAllocator::new(usb_bus));
        (*bus_ptr).as_ref().unwrap()
    };

    let serial = SerialPort::new(bus_allocator);
    let usb_dev = UsbDeviceBuilder::new(bus_allocator, TELEMETRY_VID_PID)
        .strings(&[StringDescriptors::default()
            .manufacturer("Raspberry Pi")
            .product("Pico 2 W Temperature Monitor")
            .serial_number("TEMP001")])
        .unwrap()
        .device_class(usbd_serial::USB_CLASS_CDC)
        .build();

    critical_section::with(|cs| {
        USB_DEVICE.borrow_ref_mut(cs).replace(usb_dev);
        USB_SERIAL.borrow_ref_mut(cs).replace(serial);
    });

    unsafe {
        cortex_m::peripheral::NVIC::unmask(pac::Interrupt::USBCTRL_IRQ);
    }
}

/// Write data to the USB Serial port without blocking.
///
/// Returns `false` if no host is listening or the endpoint buffer is full.
pub fn write(data: &[u8]) -> bool {
    critical_section::with(|cs| {
        let mut serial = USB_SERIAL.borrow_ref_mut(cs);
        match serial.as_mut() {
            Some(serial) => matches!(serial.write(data), Ok(n) if n == data.len()),
            None => false,
        }
    })
}

/// Streams a `temperature=<n> rate=<index>` line whenever the values change.
pub struct UsbTelemetry {
    last_sent: Option<TelemetrySnapshot>,
}

impl UsbTelemetry {
    pub const fn new() -> Self {
        Self { last_sent: None }
    }
}

impl TelemetryLink for UsbTelemetry {
    fn service(&mut self, telemetry: &Telemetry) {
        let snapshot = telemetry.snapshot();
        if self.last_sent == Some(snapshot) {
            return;
        }

        let mut line: String<32> = String::new();
        if FmtWrite::write_fmt(
            &mut line,
            format_args!("temperature={} rate={}\r\n", snapshot.temperature, snapshot.rate_index),
        )
        .is_ok()
            && write(line.as_bytes())
        {
            self.last_sent = Some(snapshot);
        }
    }
}

/// Services the USB stack.
///
/// Host input on the telemetry port has no meaning, so it is read and dropped
/// to keep the OUT endpoint from stalling.
#[allow(non_snake_case)]
#[interrupt]
fn USBCTRL_IRQ() {
    critical_section::with(|cs| {
        let mut dev = USB_DEVICE.borrow_ref_mut(cs);
        let mut serial = USB_SERIAL.borrow_ref_mut(cs);

        let (Some(dev), Some(serial)) = (dev.as_mut(), serial.as_mut()) else {
            return;
        };
        if dev.poll(&mut [serial]) {
            let mut discard = [0u8; 64];
            while matches!(serial.read(&mut discard), Ok(n) if n > 0) {}
        }
    });
}
