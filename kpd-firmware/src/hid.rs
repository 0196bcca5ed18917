use embassy_usb::driver::{EndpointError, EndpointIn};

pub const KEYBOARD_REPORT_ID: u8 = 1;
pub const MOUSE_REPORT_ID: u8 = 2;
pub const CONSUMER_REPORT_ID: u8 = 3;

/// Longest input report: id, modifiers and a 256 bit key map.
pub const MAX_REPORT_LEN: usize = 2 + crate::KEY_BITS_SIZE;

/// Keyboard (NKRO), mouse and consumer control collections sharing one interface.
#[rustfmt::skip]
pub const REPORT_DESC: [u8; 65 + 57 + 25] = [
    // keyboard
    0x05, 0x01,         // USAGE_PAGE (Generic Desktop)
    0x09, 0x06,         // USAGE (Keyboard)
    0xA1, 0x01,         // COLLECTION (Application)
    0x85, KEYBOARD_REPORT_ID,
    0x05, 0x07,         //   USAGE_PAGE (Keyboard/Keypad)
    0x19, 0xE0,         //   USAGE_MINIMUM (Left Control)
    0x29, 0xE7,         //   USAGE_MAXIMUM (Right GUI)
    0x15, 0x00,         //   LOGICAL_MINIMUM (0)
    0x25, 0x01,         //   LOGICAL_MAXIMUM (1)
    0x95, 0x08,         //   REPORT_COUNT (8)
    0x75, 0x01,         //   REPORT_SIZE (1)
    0x81, 0x02,         //   INPUT (Data,Var,Abs) modifier bits
    0x05, 0x07,         //   USAGE_PAGE (Keyboard/Keypad)
    0x19, 0x00,         //   USAGE_MINIMUM (0)
    0x29, 0xFE,         //   USAGE_MAXIMUM (0xFE)
    0x15, 0x00,         //   LOGICAL_MINIMUM (0)
    0x25, 0x01,         //   LOGICAL_MAXIMUM (1)
    0x95, 0xFF,         //   REPORT_COUNT (255)
    0x75, 0x01,         //   REPORT_SIZE (1)
    0x81, 0x02,         //   INPUT (Data,Var,Abs) key bitmap
    0x95, 0x01,         //   REPORT_COUNT (1)
    0x75, 0x01,         //   REPORT_SIZE (1)
    0x81, 0x01,         //   INPUT (Const) pad to 32 bytes
    0x05, 0x08,         //   USAGE_PAGE (LEDs)
    0x19, 0x01,         //   USAGE_MINIMUM (Num Lock)
    0x29, 0x05,         //   USAGE_MAXIMUM (Kana)
    0x95, 0x05,         //   REPORT_COUNT (5)
    0x75, 0x01,         //   REPORT_SIZE (1)
    0x91, 0x02,         //   OUTPUT (Data,Var,Abs)
    0x95, 0x01,         //   REPORT_COUNT (1)
    0x75, 0x03,         //   REPORT_SIZE (3)
    0x91, 0x01,         //   OUTPUT (Const)
    0xC0,               // END_COLLECTION

    // mouse
    0x05, 0x01,         // USAGE_PAGE (Generic Desktop)
    0x09, 0x02,         // USAGE (Mouse)
    0xA1, 0x01,         // COLLECTION (Application)
    0x85, MOUSE_REPORT_ID,
    0x09, 0x01,         //   USAGE (Pointer)
    0xA1, 0x00,         //   COLLECTION (Physical)
    0x05, 0x09,         //     USAGE_PAGE (Button)
    0x19, 0x01,         //     USAGE_MINIMUM (1)
    0x29, 0x08,         //     USAGE_MAXIMUM (8)
    0x15, 0x00,         //     LOGICAL_MINIMUM (0)
    0x25, 0x01,         //     LOGICAL_MAXIMUM (1)
    0x95, 0x08,         //     REPORT_COUNT (8)
    0x75, 0x01,         //     REPORT_SIZE (1)
    0x81, 0x02,         //     INPUT (Data,Var,Abs)
    0x05, 0x01,         //     USAGE_PAGE (Generic Desktop)
    0x09, 0x30,         //     USAGE (X)
    0x09, 0x31,         //     USAGE (Y)
    0x09, 0x38,         //     USAGE (Wheel)
    0x15, 0x81,         //     LOGICAL_MINIMUM (-127)
    0x25, 0x7F,         //     LOGICAL_MAXIMUM (127)
    0x75, 0x08,         //     REPORT_SIZE (8)
    0x95, 0x03,         //     REPORT_COUNT (3)
    0x81, 0x06,         //     INPUT (Data,Var,Rel)
    0x05, 0x0C,         //     USAGE_PAGE (Consumer)
    0x0A, 0x38, 0x02,   //     USAGE (AC Pan)
    0x95, 0x01,         //     REPORT_COUNT (1)
    0x81, 0x06,         //     INPUT (Data,Var,Rel)
    0xC0,               //   END_COLLECTION
    0xC0,               // END_COLLECTION

    // consumer control
    0x05, 0x0C,         // USAGE_PAGE (Consumer)
    0x09, 0x01,         // USAGE (Consumer Control)
    0xA1, 0x01,         // COLLECTION (Application)
    0x85, CONSUMER_REPORT_ID,
    0x19, 0x01,         //   USAGE_MINIMUM (1)
    0x2A, 0xA0, 0x02,   //   USAGE_MAXIMUM (0x2A0)
    0x15, 0x01,         //   LOGICAL_MINIMUM (1)
    0x26, 0xA0, 0x02,   //   LOGICAL_MAXIMUM (0x2A0)
    0x95, 0x01,         //   REPORT_COUNT (1)
    0x75, 0x10,         //   REPORT_SIZE (16)
    0x81, 0x00,         //   INPUT (Data,Array,Abs)
    0xC0,               // END_COLLECTION
];

/// Destination for HID input reports.
#[allow(async_fn_in_trait)]
pub trait ReportWriter {
    async fn write_report(&mut self, report: &[u8]) -> Result<(), EndpointError>;
}

/// Writes reports of at most `N` bytes to an interrupt IN endpoint.
pub struct HidWriter<E: EndpointIn, const N: usize> {
    ep_in: E,
}

impl<E: EndpointIn, const N: usize> HidWriter<E, N> {
    pub fn new(ep_in: E) -> Self {
        Self { ep_in }
    }

    /// Writes `report` to its interrupt endpoint.
    pub async fn write(&mut self, report: &[u8]) -> Result<(), EndpointError> {
        if report.len() > N {
            return Err(EndpointError::BufferOverflow);
        }

        let max_packet_size = usize::from(self.ep_in.info().max_packet_size);
        let zlp_needed = report.len() < N && report.len() % max_packet_size == 0;
        for chunk in report.chunks(max_packet_size) {
            self.ep_in.write(chunk).await?;
        }

        if zlp_needed {
            self.ep_in.write(&[]).await?;
        }

        Ok(())
    }
}

impl<E: EndpointIn, const N: usize> ReportWriter for HidWriter<E, N> {
    async fn write_report(&mut self, report: &[u8]) -> Result<(), EndpointError> {
        self.write(report).await
    }
}
