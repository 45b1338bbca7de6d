use super::*;

#[derive(Default)]
struct Recorder {
    events: Vec<String>,
    batches: Vec<Vec<Modification>>,
}

impl EditObserver for Recorder {
    fn begin_edit(&mut self, buffer: &ByteBuffer) {
        self.events.push(format!("begin len={}", buffer.len()));
    }

    fn end_edit(&mut self, buffer: &ByteBuffer, modifications: &[Modification]) {
        self.events.push(format!("end len={}", buffer.len()));
        self.batches.push(modifications.to_vec());
    }
}

fn subscribed(buffer: &mut ByteBuffer) -> (Rc<RefCell<Recorder>>, Subscription) {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let weak: Weak<RefCell<dyn EditObserver>> = Rc::downgrade(&recorder) as _;
    let subscription = buffer.subscribe(weak);
    (recorder, subscription)
}

#[test]
fn test_new_buffer() {
    let buffer = ByteBuffer::new();
    assert!(buffer.is_empty());
    assert_eq!(buffer.len(), 0);
    assert_eq!(buffer.revision(), 0);
}

#[test]
fn test_insert_and_erase() {
    let mut buffer = ByteBuffer::from_bytes(b"Hello".to_vec());
    buffer.insert(5, b" World").unwrap();
    assert_eq!(buffer.bytes(), b"Hello World");
    buffer.erase(0, 6).unwrap();
    assert_eq!(buffer.bytes(), b"World");
    assert_eq!(buffer.revision(), 2);
    assert_eq!(buffer.slice(1..3), b"or");
}

#[test]
fn test_batch_uses_pre_edit_positions() {
    let mut buffer = ByteBuffer::from_bytes(b"abcdef".to_vec());
    let mut modifier = buffer.modify();
    modifier.replace(1, 1, b"XYZ").unwrap(); // b -> XYZ
    modifier.erase(3, 2).unwrap(); // de
    modifier.insert(6, b"!").unwrap();
    let applied = modifier.commit();

    assert_eq!(buffer.bytes(), b"aXYZcf!");
    assert_eq!(
        applied,
        vec![
            Modification { position: 1, removed: 1, added: 3 },
            Modification { position: 3, removed: 2, added: 0 },
            Modification { position: 6, removed: 0, added: 1 },
        ]
    );
}

#[test]
fn test_adjacent_replacements_fold() {
    let mut buffer = ByteBuffer::from_bytes(b"abcdef".to_vec());
    let mut modifier = buffer.modify();
    modifier.erase(1, 1).unwrap();
    modifier.replace(2, 1, b"Q").unwrap();
    assert_eq!(
        modifier.modifications(),
        vec![Modification { position: 1, removed: 2, added: 1 }]
    );
    drop(modifier);
    assert_eq!(buffer.bytes(), b"aQdef");
}

#[test]
fn test_out_of_bounds_rejected() {
    let mut buffer = ByteBuffer::from_bytes(b"abc".to_vec());
    let err = buffer.erase(2, 5).unwrap_err();
    assert_eq!(err.code, RANGE_OUT_OF_BOUNDS);
    let err = buffer.insert(4, b"x").unwrap_err();
    assert_eq!(err.code, RANGE_OUT_OF_BOUNDS);
    assert_eq!(buffer.bytes(), b"abc");
    assert_eq!(buffer.revision(), 0);
}

#[test]
fn test_unordered_rejected() {
    let mut buffer = ByteBuffer::from_bytes(b"abcdef".to_vec());
    let mut modifier = buffer.modify();
    modifier.erase(2, 2).unwrap();
    let err = modifier.insert(3, b"x").unwrap_err();
    assert_eq!(err.code, UNORDERED_EDIT);
    let err = modifier.insert(0, b"x").unwrap_err();
    assert_eq!(err.code, UNORDERED_EDIT);
    modifier.commit();
    assert_eq!(buffer.bytes(), b"abef");
}

#[test]
fn test_observer_notification_order() {
    let mut buffer = ByteBuffer::from_bytes(b"abc".to_vec());
    let (recorder, _subscription) = subscribed(&mut buffer);

    buffer.insert(3, b"de").unwrap();

    let recorder = recorder.borrow();
    assert_eq!(recorder.events, vec!["begin len=3", "end len=5"]);
    assert_eq!(
        recorder.batches,
        vec![vec![Modification { position: 3, removed: 0, added: 2 }]]
    );
}

#[test]
fn test_empty_batch_is_silent() {
    let mut buffer = ByteBuffer::from_bytes(b"abc".to_vec());
    let (recorder, _subscription) = subscribed(&mut buffer);
    {
        let mut modifier = buffer.modify();
        modifier.insert(1, b"").unwrap();
    }
    assert!(recorder.borrow().events.is_empty());
    assert_eq!(buffer.revision(), 0);
}

#[test]
fn test_dropping_subscription_unsubscribes() {
    let mut buffer = ByteBuffer::new();
    let (recorder, subscription) = subscribed(&mut buffer);
    assert_eq!(buffer.observer_count(), 1);

    drop(subscription);
    assert_eq!(buffer.observer_count(), 0);
    buffer.insert(0, b"x").unwrap();
    assert!(recorder.borrow().events.is_empty());
}

#[test]
fn test_dropped_observer_is_skipped() {
    let mut buffer = ByteBuffer::new();
    let (recorder, _subscription) = subscribed(&mut buffer);
    drop(recorder);
    assert_eq!(buffer.observer_count(), 0);
    buffer.insert(0, b"x").unwrap();
    assert_eq!(buffer.bytes(), b"x");
}
