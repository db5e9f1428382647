//! End-to-end behaviour of the engine against the in-memory host.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use cameo::host::mock::Primitive;
use cameo::listener::changed_keys;
use cameo::prelude::*;

fn setup() -> (Arc<MockHost>, Registry<MockHost>) {
    let host = Arc::new(MockHost::new());
    (Arc::clone(&host), Registry::new(Arc::clone(&host)))
}

fn put<P: Property>(host: &MockHost, object: u32, key: P, value: PropertyValue) {
    host.insert_value(ObjectId(object), key, &value).unwrap();
}

fn ids(list: &[u32]) -> PropertyValue {
    PropertyValue::ArrayOfObjectId(list.iter().copied().map(ObjectId).collect())
}

/// Root 1 owns a device (2) exposing one stream (4) and a mute control (3).
fn camera_registry() -> (Arc<MockHost>, Registry<MockHost>) {
    let (host, reg) = setup();
    put(&host, 1, ObjectProperty::OwnedObjects, ids(&[2, 3]));
    put(&host, 2, ObjectProperty::Class, PropertyValue::ClassId(ClassId::DEVICE));
    put(&host, 2, ObjectProperty::Name, PropertyValue::String("FaceTime HD".into()));
    put(&host, 2, DeviceProperty::Streams, ids(&[4]));
    put(&host, 3, ObjectProperty::Class, PropertyValue::ClassId(ClassId::BOOLEAN_CONTROL));
    put(&host, 3, ObjectProperty::Name, PropertyValue::String("Mute".into()));
    put(&host, 3, BooleanControlProperty::Value, PropertyValue::Boolean(true));
    (host, reg)
}

#[test]
fn tree_follows_owned_objects_and_device_streams() {
    let (_, reg) = camera_registry();
    let tree = reg.build_tree(ObjectId::SYSTEM);

    let expected = Node::new(ObjectId(1), ClassId::OBJECT, "<untitled @1>").with_children(vec![
        Node::new(ObjectId(2), ClassId::DEVICE, "FaceTime HD").with_children(vec![Node::new(
            ObjectId(4),
            ClassId::OBJECT,
            "<untitled @4>",
        )]),
        Node::new(ObjectId(3), ClassId::BOOLEAN_CONTROL, "Mute"),
    ]);
    assert_eq!(tree, expected);
}

#[test]
fn boolean_control_reads_and_settability() {
    let (host, reg) = camera_registry();
    assert_eq!(
        reg.get(BooleanControlProperty::Value, ObjectId(3), None),
        Some(PropertyValue::Boolean(true))
    );

    assert!(!reg.is_settable(BooleanControlProperty::Value, ObjectId(3)));
    host.set_settable(ObjectId(3), BooleanControlProperty::Value.selector(), true);
    assert!(reg.is_settable(BooleanControlProperty::Value, ObjectId(3)));

    let Some(ControlModel::Boolean(model)) = reg.control_model(ObjectId(3)) else {
        panic!("expected a boolean control");
    };
    assert_eq!(model.name, "Mute");
    assert!(model.value);
}

#[test]
fn object_properties_apply_to_every_class() {
    let (_, reg) = camera_registry();
    assert_eq!(
        reg.all_existing::<ObjectProperty>(ObjectId(2)),
        vec![ObjectProperty::Class, ObjectProperty::Name]
    );
    assert_eq!(reg.all_existing::<DeviceProperty>(ObjectId(2)), vec![DeviceProperty::Streams]);
    assert!(reg.all_existing::<StreamProperty>(ObjectId(2)).is_empty());
}

#[test]
fn all_existing_keeps_declaration_order() {
    let (host, reg) = setup();
    // Inserted in reverse of declaration order.
    put(&host, 7, DeviceProperty::Streams, ids(&[]));
    put(&host, 7, DeviceProperty::ModelUid, PropertyValue::String("m".into()));
    put(&host, 7, DeviceProperty::PlugIn, PropertyValue::ObjectId(ObjectId(9)));
    host.reset_calls();

    let found = reg.all_existing::<DeviceProperty>(ObjectId(7));
    assert_eq!(
        found,
        vec![DeviceProperty::PlugIn, DeviceProperty::ModelUid, DeviceProperty::Streams]
    );
    assert_eq!(host.calls(Primitive::HasProperty), DeviceProperty::ALL.len());
}

#[test]
fn set_then_get_round_trip() {
    let (host, reg) = camera_registry();
    host.set_settable(ObjectId(3), BooleanControlProperty::Value.selector(), true);

    assert!(reg.set_boolean_control(ObjectId(3), false));
    assert_eq!(
        reg.get(BooleanControlProperty::Value, ObjectId(3), None),
        Some(PropertyValue::Boolean(false))
    );
    assert_eq!(
        host.raw_data(ObjectId(3), BooleanControlProperty::Value.selector()),
        Some(0u32.to_ne_bytes().to_vec())
    );
}

#[test]
fn set_on_read_only_property_keeps_host_status() {
    let (host, reg) = camera_registry();
    let err = reg
        .try_set(ObjectProperty::Name, &PropertyValue::String("x".into()), ObjectId(3), None)
        .unwrap_err();
    assert_eq!(err.status(), Some(Status::ILLEGAL_OPERATION));
    assert_eq!(reg.name_of(ObjectId(3)).as_deref(), Some("Mute"));
    assert_eq!(host.calls(Primitive::SetData), 1);
}

#[test]
fn set_with_wrong_value_type_makes_no_call() {
    let (host, reg) = camera_registry();
    host.reset_calls();
    let err = reg
        .try_set(ObjectProperty::Name, &PropertyValue::UInt32(1), ObjectId(3), None)
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
    assert_eq!(host.total_calls(), 0);
}

#[test]
fn qualified_read_without_qualifier_makes_no_call() {
    let (host, reg) = setup();
    host.insert_qualified_value(
        ObjectId(5),
        SelectorControlProperty::ItemName,
        &1u32.to_ne_bytes(),
        &PropertyValue::String("Composite".into()),
    )
    .unwrap();
    host.reset_calls();

    let err = reg.try_get(SelectorControlProperty::ItemName, ObjectId(5), None).unwrap_err();
    assert!(matches!(err, Error::QualifierRequired { .. }));
    assert_eq!(host.total_calls(), 0);

    let qualifier = Qualifier::from_scalar(&1u32);
    assert_eq!(
        reg.get(SelectorControlProperty::ItemName, ObjectId(5), Some(&qualifier)),
        Some(PropertyValue::String("Composite".into()))
    );
}

#[test]
fn translate_on_plain_key_makes_no_call() {
    let (host, reg) = camera_registry();
    host.reset_calls();
    let err = reg
        .try_translate(DeviceProperty::DeviceUid, &PropertyValue::String("x".into()), ObjectId(2))
        .unwrap_err();
    assert!(matches!(err, Error::SemanticsMismatch { .. }));

    let err = reg.try_get(SystemProperty::DeviceForUid, ObjectId::SYSTEM, None).unwrap_err();
    assert!(matches!(err, Error::SemanticsMismatch { .. }));
    assert_eq!(host.total_calls(), 0);
}

#[test]
fn translation_finds_device_by_uid() {
    let (host, reg) = camera_registry();
    host.on_translate(ObjectId::SYSTEM, SystemProperty::DeviceForUid.selector(), |input| {
        let id: u32 = if input == b"0x8020000005ac8514" { 2 } else { 0 };
        Ok(id.to_ne_bytes().to_vec())
    });
    assert_eq!(reg.device_for_uid("0x8020000005ac8514"), Some(ObjectId(2)));
    assert_eq!(reg.device_for_uid("missing"), None);
    assert_eq!(host.calls(Primitive::Data), 2);
}

#[test]
fn array_count_comes_from_returned_size() {
    let (host, reg) = setup();
    let bytes: Vec<u8> = [2u32, 3, 4].iter().flat_map(|v| v.to_ne_bytes()).collect();
    host.insert(ObjectId(2), DeviceProperty::Streams.selector(), bytes);
    host.override_size(ObjectId(2), DeviceProperty::Streams.selector(), 12);

    let streams = reg.get(DeviceProperty::Streams, ObjectId(2), None).unwrap();
    assert_eq!(streams.as_object_ids().map(<[ObjectId]>::len), Some(3));
    assert_eq!(host.calls(Primitive::DataSize), 1);
    assert_eq!(host.calls(Primitive::Data), 1);

    // An over-reported size still yields only the bytes delivered.
    host.override_size(ObjectId(2), DeviceProperty::Streams.selector(), 32);
    let streams = reg.get(DeviceProperty::Streams, ObjectId(2), None).unwrap();
    assert_eq!(streams, ids(&[2, 3, 4]));
}

#[test]
fn host_failure_reads_as_absent() {
    let (host, reg) = camera_registry();
    host.fail_property(ObjectId(2), ObjectProperty::Name.selector(), Status::BAD_OBJECT);
    assert_eq!(reg.name_of(ObjectId(2)), None);
    let err = reg.try_get(ObjectProperty::Name, ObjectId(2), None).unwrap_err();
    assert_eq!(err.status(), Some(Status::BAD_OBJECT));

    let tree = reg.build_tree(ObjectId::SYSTEM);
    assert_eq!(tree.find(ObjectId(2)).map(|n| n.name.as_str()), Some("<untitled @2>"));
}

#[test]
fn no_callback_after_remove() {
    let (host, reg) = camera_registry();
    host.set_settable(ObjectId(3), BooleanControlProperty::Value.selector(), true);
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&hits);
    let listener = reg
        .add_listener(BooleanControlProperty::Value, ObjectId(3), None, move |batch| {
            assert_eq!(changed_keys::<BooleanControlProperty>(batch), vec![BooleanControlProperty::Value]);
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    assert!(reg.set_boolean_control(ObjectId(3), false));
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    assert!(listener.remove());
    assert!(listener.remove());
    assert_eq!(host.listener_count(), 0);

    assert!(reg.set_boolean_control(ObjectId(3), true));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn dropped_listener_unregisters() {
    let (host, reg) = camera_registry();
    {
        let _listener = reg.add_listener(ObjectProperty::Name, ObjectId(2), None, |_| {}).unwrap();
        assert_eq!(host.listener_count(), 1);
    }
    assert_eq!(host.listener_count(), 0);
}

#[test]
fn queued_listener_delivers_on_worker() {
    let (host, reg) = camera_registry();
    let queue: Arc<dyn Dispatcher> = Arc::new(QueueDispatcher::spawn("cameo-test").unwrap());
    let (tx, rx) = mpsc::channel();
    let tx = parking_lot::Mutex::new(tx);

    let _listener = reg
        .add_listener(DeviceProperty::Streams, ObjectId(2), Some(queue), move |batch| {
            let _ = tx.lock().send((std::thread::current().name().map(str::to_string), batch.len()));
        })
        .unwrap();

    let address = reg.address(DeviceProperty::Streams.selector(), &Target::object(ObjectId(2)));
    assert_eq!(host.notify(ObjectId(2), &[address]), 1);

    let (thread, count) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(thread.as_deref(), Some("cameo-test"));
    assert_eq!(count, 1);
}

#[test]
fn listener_add_failure_yields_none() {
    let (host, reg) = camera_registry();
    host.fail(Primitive::AddListener, Status::UNSPECIFIED);
    assert!(reg.add_listener(ObjectProperty::Name, ObjectId(2), None, |_| {}).is_none());
    let err = reg
        .try_add_listener(ObjectProperty::Name, ObjectId(2), None, |_| {})
        .unwrap_err();
    assert_eq!(err.status(), Some(Status::UNSPECIFIED));
}

#[test]
fn describe_renders_tree_values() {
    let (_, reg) = camera_registry();
    let db = FourCcDatabase::builtin();
    assert_eq!(
        reg.describe_property(ObjectProperty::Class, ObjectId(2), None, db).as_deref(),
        Some("'adev' (kCMIODeviceClassID)")
    );
    assert_eq!(
        reg.describe_property(BooleanControlProperty::Value, ObjectId(3), None, db).as_deref(),
        Some("true (1)")
    );
    assert_eq!(
        reg.describe_property(DeviceProperty::Streams, ObjectId(2), None, db).as_deref(),
        Some("[@4]")
    );
}

#[test]
fn config_defaults_shape_addresses() {
    let host = Arc::new(MockHost::new());
    let config = Config::from_json(r#"{"default_scope": 1768845428, "max_tree_depth": 1}"#).unwrap();
    let reg = Registry::with_config(Arc::clone(&host), config);

    let address = reg.address(DeviceProperty::Streams.selector(), &Target::object(ObjectId(2)));
    assert_eq!(address.scope, Scope::DEVICE_INPUT);
    assert_eq!(address.element, Element::WILDCARD);

    host.insert_value(ObjectId(1), ObjectProperty::OwnedObjects, &ids(&[2])).unwrap();
    host.insert_value(ObjectId(2), ObjectProperty::OwnedObjects, &ids(&[3])).unwrap();
    assert_eq!(reg.build_tree(ObjectId(1)).count(), 2);
}

#[test]
fn owned_objects_filtered_by_class_qualifier() {
    let (host, reg) = camera_registry();
    host.insert_qualified_value(
        ObjectId(1),
        ObjectProperty::OwnedObjects,
        &ClassId::DEVICE.value().to_ne_bytes(),
        &ids(&[2]),
    )
    .unwrap();

    let classes = [ClassId::DEVICE];
    let devices = Qualifier::from_slice(&classes);
    assert_eq!(devices.count(), 1);
    assert_eq!(reg.get(ObjectProperty::OwnedObjects, ObjectId(1), Some(&devices)), Some(ids(&[2])));
    assert_eq!(reg.get(ObjectProperty::OwnedObjects, ObjectId(1), None), Some(ids(&[2, 3])));

    let db = FourCcDatabase::builtin();
    assert_eq!(
        reg.describe_property(ObjectProperty::OwnedObjects, ObjectId(1), Some(&devices), db).as_deref(),
        Some("[@2]")
    );
}
