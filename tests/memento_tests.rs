/// Memento tests
///
/// Capture/restore behaviour over field-map records
/// Run with: cargo test --test memento_tests

use rustmemento::{CopyDepth, MementoError, Record, Resource, Value, capture, capture_shared};
use std::cell::RefCell;
use std::rc::Rc;

fn sample() -> Record {
    Record::new()
        .with("id", 7)
        .with("name", "widget")
        .with("tags", Value::List(vec![Value::from("a"), Value::from("b")]))
}

#[test]
fn test_restore_after_mutations_shallow_and_deep() {
    for depth in [CopyDepth::Shallow, CopyDepth::Deep] {
        let mut record = sample();
        let memento = capture(&record, depth).unwrap();

        record.set("id", 8);
        record.remove("name");
        record.set("extra", 1.5);
        if let Some(Value::List(tags)) = record.get_mut("tags") {
            tags.push(Value::from("c"));
        }

        memento.restore_into(&mut record).unwrap();
        assert_eq!(record, sample(), "depth {}", depth);
    }
}

#[test]
fn test_shallow_capture_aliases_shared_values() {
    let shared = Value::shared(1);
    let mut record = Record::new().with("counter", shared.clone());
    let memento = capture(&record, CopyDepth::Shallow).unwrap();

    if let Value::Shared(cell) = &shared {
        *cell.borrow_mut() = Value::Integer(2);
    }
    memento.restore_into(&mut record).unwrap();

    assert_eq!(record.get("counter").and_then(Value::as_i64), Some(2));
}

#[test]
fn test_deep_capture_isolates_shared_values() {
    let shared = Value::shared(1);
    let mut record = Record::new().with("counter", shared.clone());
    let memento = capture(&record, CopyDepth::Deep).unwrap();

    if let Value::Shared(cell) = &shared {
        *cell.borrow_mut() = Value::Integer(2);
    }
    memento.restore_into(&mut record).unwrap();

    assert_eq!(record.get("counter").and_then(Value::as_i64), Some(1));
}

#[test]
fn test_restoring_twice_matches_restoring_once() {
    let record = Rc::new(RefCell::new(Record::new().with("value", Value::shared(3))));
    let handle = capture_shared(&record, CopyDepth::Deep).unwrap();

    record.borrow_mut().set("value", 4);
    handle.restore().unwrap();
    let once = Record::new().with("value", Value::shared(3));
    assert_eq!(*record.borrow(), once);

    if let Some(Value::Shared(cell)) = record.borrow().get("value") {
        *cell.borrow_mut() = Value::Integer(5);
    }
    handle.restore().unwrap();
    handle.restore().unwrap();

    assert_eq!(*record.borrow(), once);
    assert_eq!(record.borrow().get("value").and_then(Value::as_i64), Some(3));
}

#[test]
fn test_uncopyable_value_fails_deep_capture() {
    let record = Record::new().with("conn", Resource::new("db-connection"));

    assert!(capture(&record, CopyDepth::Shallow).is_ok());
    let err = capture(&record, CopyDepth::Deep).unwrap_err();
    assert_eq!(
        err,
        MementoError::CopyError("resource 'db-connection' cannot be deep copied".into())
    );
}

#[test]
fn test_capture_leaves_object_untouched() {
    let record = sample();
    let _memento = capture(&record, CopyDepth::Deep).unwrap();
    assert_eq!(record, sample());
}
