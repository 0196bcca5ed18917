extern crate std;
use core::cell::RefCell;
use embassy_usb::driver::{Endpoint, EndpointAddress, EndpointError, EndpointIn, EndpointInfo, EndpointType};
use std::rc::Rc;
use std::vec::Vec;

use crate::hid::{ReportWriter, MAX_REPORT_LEN};

/// Everything written to a stub endpoint, one entry per packet or report.
pub type Messages = Rc<RefCell<Vec<Vec<u8>>>>;

pub struct MyEndpointIn {
    pub messages: Messages,
    pub info: EndpointInfo,
}
impl MyEndpointIn {
    pub fn with_packet_size(max_packet_size: u16) -> Self {
        Self {
            messages: Messages::default(),
            info: EndpointInfo {
                addr: EndpointAddress::from(0x81),
                ep_type: EndpointType::Interrupt,
                max_packet_size,
                interval_ms: 1,
            },
        }
    }
}
impl Endpoint for MyEndpointIn {
    fn info(&self) -> &EndpointInfo {
        &self.info
    }

    async fn wait_enabled(&mut self) {}
}
impl EndpointIn for MyEndpointIn {
    async fn write(&mut self, buf: &[u8]) -> Result<(), EndpointError> {
        self.messages.borrow_mut().push(Vec::from(buf));
        Ok(())
    }
}
impl Default for MyEndpointIn {
    fn default() -> Self {
        Self::with_packet_size(64)
    }
}

/// Collects whole reports.
#[derive(Default)]
pub struct ReportLog {
    pub reports: Messages,
}
impl ReportWriter for ReportLog {
    async fn write_report(&mut self, report: &[u8]) -> Result<(), EndpointError> {
        if report.len() > MAX_REPORT_LEN {
            return Err(EndpointError::BufferOverflow);
        }
        self.reports.borrow_mut().push(Vec::from(report));
        Ok(())
    }
}
