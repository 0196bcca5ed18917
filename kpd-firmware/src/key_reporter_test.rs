extern crate std;
use embassy_futures::block_on;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use std::vec;

use crate::usb_test_stub::ReportLog;

use super::*;

macro_rules! setup {
    ($messages:ident, $rep:ident, $x:tt) => {
        block_on(async {
            let log = ReportLog::default();
            let $messages = log.reports.clone();
            let mut $rep = Reporter::new(log);

            $x
        });
    };
}

#[test]
fn basic_report() {
    setup!(messages, reporter, {
        reporter.report(KeyEvent::Basic(5, true)).await;
        reporter.report(KeyEvent::Basic(4, true)).await;
        reporter.report(KeyEvent::Basic(0xe2, true)).await;
        reporter.report(KeyEvent::Basic(4, false)).await;
        reporter.report(KeyEvent::Basic(0xe2, false)).await;

        let guard = messages.borrow();
        assert_eq!(guard[0].len(), MAX_REPORT_LEN);
        assert_eq!(&guard[0][..5], &vec![1, 0, 32, 0, 0]);
        assert_eq!(&guard[1][..5], &vec![1, 0, 48, 0, 0]);
        assert_eq!(&guard[2][..5], &vec![1, 4, 48, 0, 0]);
        assert_eq!(&guard[3][..5], &vec![1, 4, 32, 0, 0]);
        assert_eq!(&guard[4][..5], &vec![1, 0, 32, 0, 0]);
    });
}

#[test]
fn repeated_press_releases_first() {
    setup!(messages, reporter, {
        reporter.report(KeyEvent::Basic(4, true)).await;
        reporter.report(KeyEvent::Basic(4, true)).await;

        let guard = messages.borrow();
        assert_eq!(guard.len(), 3);
        assert_eq!(&guard[1][..3], &vec![1, 0, 0]);
        assert_eq!(&guard[2][..3], &vec![1, 0, 16]);
    });
}

#[test]
fn shifted_keys_share_shift() {
    setup!(messages, reporter, {
        // 'A' then '!' while 'A' is still held
        reporter.report(KeyEvent::Shifted(0x04, true)).await;
        reporter.report(KeyEvent::Shifted(0x1e, true)).await;
        reporter.report(KeyEvent::Shifted(0x04, false)).await;
        reporter.report(KeyEvent::Shifted(0x1e, false)).await;

        let guard = messages.borrow();
        assert_eq!(guard[0][1], 2);
        assert_eq!(guard[1][1], 2);
        assert_eq!(guard[2][1], 2);
        assert_eq!(guard[3][1], 0);
        assert!(guard[3][2..].iter().all(|b| *b == 0));
    });
}

#[test]
fn shift_key_survives_literal_release() {
    setup!(messages, reporter, {
        reporter.report(KeyEvent::Basic(0xe1, true)).await;
        reporter.report(KeyEvent::Shifted(0x04, true)).await;
        reporter.report(KeyEvent::Shifted(0x04, false)).await;

        let guard = messages.borrow();
        assert_eq!(guard[2][1], 2);
    });
}

#[test]
fn consumer_and_mouse() {
    setup!(messages, reporter, {
        reporter.report(KeyEvent::Consumer(0xcd)).await;
        reporter.report(KeyEvent::Consumer(0x1234)).await;
        reporter.report(KeyEvent::MouseButton(5)).await;

        let guard = messages.borrow();
        assert_eq!(guard[0], vec![3, 0xcd, 0]);
        assert_eq!(guard[1], vec![3, 0x34, 0x12]);
        assert_eq!(guard[2], vec![2, 5, 0, 0, 0, 0]);
    });
}

#[test]
fn clear_zeroes_every_report() {
    setup!(messages, reporter, {
        reporter.report(KeyEvent::Basic(0xe0, true)).await;
        reporter.report(KeyEvent::Shifted(0x10, true)).await;
        reporter.report(KeyEvent::Clear).await;

        let guard = messages.borrow();
        assert_eq!(guard.len(), 5);
        assert_eq!(guard[2], vec![2, 0, 0, 0, 0, 0]);
        assert_eq!(guard[3], vec![3, 0, 0]);
        assert_eq!(guard[4][0], 1);
        assert!(guard[4][1..].iter().all(|b| *b == 0));
    });
}

#[test]
fn run_forwards_channel_events() {
    use embassy_futures::select::{select, Either};

    let channel = ReportChannel::<NoopRawMutex, 4>::default();
    channel.report(KeyEvent::Consumer(0xe9));
    channel.report(KeyEvent::Consumer(0));
    setup!(messages, reporter, {
        let done = async {
            while messages.borrow().len() < 2 {
                embassy_futures::yield_now().await;
            }
        };
        match select(reporter.run(&channel), done).await {
            Either::First(_) => unreachable!(),
            Either::Second(()) => {}
        }
        assert_eq!(messages.borrow()[0], vec![3, 0xe9, 0]);
        assert_eq!(messages.borrow()[1], vec![3, 0, 0]);
    });
}
