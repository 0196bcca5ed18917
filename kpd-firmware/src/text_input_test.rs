use super::*;

fn feed_number(input: &mut NumberInput, s: &str, now: u64) -> Entry<u8> {
    let mut ans = Entry::Pending;
    for b in s.bytes() {
        ans = input.push(b, now);
        if ans != Entry::Pending {
            break;
        }
    }
    ans
}

#[test]
fn number_on_quiet_gap_once() {
    let mut input = NumberInput::default();
    assert_eq!(feed_number(&mut input, "255", 1000), Entry::Pending);
    assert_eq!(input.poll(1000 + QUIET_GAP_MS - 1), Entry::Pending);
    assert_eq!(input.poll(1000 + QUIET_GAP_MS), Entry::Done(255));
    assert_eq!(input.poll(1000 + QUIET_GAP_MS * 2), Entry::Pending);
}

#[test]
fn number_on_newline() {
    let mut input = NumberInput::default();
    assert_eq!(feed_number(&mut input, "42\r", 0), Entry::Done(42));
    // trailing LF of a CRLF pair is not an empty entry
    assert_eq!(input.push(b'\n', 1), Entry::Pending);
    assert_eq!(feed_number(&mut input, "0\n", 2), Entry::Done(0));
}

#[test]
fn number_rejects() {
    let mut input = NumberInput::default();
    assert_eq!(feed_number(&mut input, "300\r", 0), Entry::Invalid);
    assert_eq!(feed_number(&mut input, "1000\r", 0), Entry::Invalid);
    assert_eq!(feed_number(&mut input, "1a\r", 0), Entry::Invalid);
    assert_eq!(feed_number(&mut input, "-1", 0), Entry::Pending);
    assert_eq!(input.poll(QUIET_GAP_MS), Entry::Invalid);
    assert_eq!(feed_number(&mut input, "7\r", 0), Entry::Done(7));
}

#[test]
fn quiet_gap_measured_from_last_byte() {
    let mut input = NumberInput::default();
    input.push(b'1', 0);
    input.push(b'2', 200);
    assert_eq!(input.poll(300), Entry::Pending);
    assert_eq!(input.poll(450), Entry::Done(12));
}

fn feed_key(input: &mut KeyNameInput, s: &str, now: u64) -> Entry<u8> {
    let mut ans = Entry::Pending;
    for b in s.bytes() {
        ans = input.push(b, now);
        if ans != Entry::Pending {
            break;
        }
    }
    ans
}

#[test]
fn key_literal() {
    let mut input = KeyNameInput::default();
    assert_eq!(feed_key(&mut input, "a", 0), Entry::Done(97));
    assert_eq!(feed_key(&mut input, "\r\nZ", 0), Entry::Done(b'Z'));
    assert_eq!(feed_key(&mut input, " ", 0), Entry::Done(b' '));
    assert_eq!(input.push(0x1b, 0), Entry::Invalid);
}

#[test]
fn key_catalog_index() {
    let mut input = KeyNameInput::default();
    assert_eq!(feed_key(&mut input, ":8", 0), Entry::Pending);
    assert_eq!(input.poll(QUIET_GAP_MS), Entry::Done(136));

    assert_eq!(feed_key(&mut input, ":0\r", 0), Entry::Done(128));
    assert_eq!(feed_key(&mut input, ":71\n", 0), Entry::Done(199));
    assert_eq!(feed_key(&mut input, ":72\n", 0), Entry::Invalid);
    assert_eq!(feed_key(&mut input, ":1000\n", 0), Entry::Invalid);
    assert_eq!(feed_key(&mut input, ":x\n", 0), Entry::Invalid);
}

#[test]
fn bare_colon_is_literal() {
    let mut input = KeyNameInput::default();
    assert_eq!(feed_key(&mut input, ":\r", 0), Entry::Done(b':'));
    assert_eq!(feed_key(&mut input, ":", 10), Entry::Pending);
    assert_eq!(input.poll(10 + QUIET_GAP_MS), Entry::Done(b':'));
}
