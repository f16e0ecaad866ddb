use std::cell::RefCell;
use std::rc::Rc;

use serde::Deserialize;
use serde_json::{Value, json};
use tableflow_embed::{ChannelHandlers, ChannelState, EventChannel, ImporterMessage, MessageBus};

fn message(importer_id: &str, id: &str, kind: &str, data: Option<Value>) -> Value {
    let mut value = json!({
        "source": "tableflow-importer",
        "importerId": importer_id,
        "id": id,
        "type": kind,
    });
    if let Some(data) = data {
        value["data"] = data;
    }
    value
}

fn recording_channel(
    bus: &MessageBus,
    importer_id: &str,
) -> (EventChannel, Rc<RefCell<Vec<Option<Value>>>>, Rc<RefCell<usize>>) {
    let completed = Rc::new(RefCell::new(Vec::new()));
    let closed = Rc::new(RefCell::new(0));

    let on_complete = Rc::clone(&completed);
    let on_close = Rc::clone(&closed);
    let channel = EventChannel::start(
        bus,
        importer_id,
        ChannelHandlers::new()
            .on_complete(move |data| on_complete.borrow_mut().push(data))
            .on_close(move || *on_close.borrow_mut() += 1),
    );

    (channel, completed, closed)
}

#[test]
fn duplicate_event_ids_are_delivered_once() {
    let bus = MessageBus::new();
    let (channel, completed, _) = recording_channel(&bus, "imp-42");

    let event = message("imp-42", "evt-1", "complete", Some(json!({"num_rows": 10})));
    bus.post(event.clone());
    bus.post(event);

    assert_eq!(*completed.borrow(), vec![Some(json!({"num_rows": 10}))]);
    assert!(channel.has_delivered("evt-1"));
    assert_eq!(channel.delivered_count(), 1);
}

#[test]
fn foreign_messages_never_reach_handlers() {
    let bus = MessageBus::new();
    let (channel, completed, closed) = recording_channel(&bus, "imp-42");

    let mut foreign = message("imp-42", "evt-1", "complete", None);
    foreign["source"] = json!("other-app");
    bus.post(foreign);
    bus.post(message("imp-7", "evt-2", "complete", None));
    bus.post(message("imp-42", "", "close", None));
    bus.post(json!({"source": "tableflow-importer", "importerId": "imp-42", "type": "close"}));
    bus.post(json!("complete"));

    assert!(completed.borrow().is_empty());
    assert_eq!(*closed.borrow(), 0);
    assert_eq!(channel.delivered_count(), 0);
}

#[test]
fn unknown_kinds_are_ignored_without_consuming_the_id() {
    let bus = MessageBus::new();
    let (channel, completed, closed) = recording_channel(&bus, "imp-42");

    bus.post(message("imp-42", "evt-1", "progress", Some(json!(0.5))));
    assert!(!channel.has_delivered("evt-1"));

    bus.post(message("imp-42", "evt-1", "close", None));
    assert_eq!(*closed.borrow(), 1);
    assert!(completed.borrow().is_empty());
    assert!(channel.has_delivered("evt-1"));
}

#[test]
fn complete_without_data_passes_none() {
    let bus = MessageBus::new();
    let (_channel, completed, _) = recording_channel(&bus, "imp-42");

    bus.post(message("imp-42", "evt-1", "complete", None));

    assert_eq!(*completed.borrow(), vec![None]);
}

#[test]
fn missing_handler_does_not_mark_event_delivered() {
    let bus = MessageBus::new();
    let closed = Rc::new(RefCell::new(0));
    let on_close = Rc::clone(&closed);
    let channel: EventChannel = EventChannel::start(
        &bus,
        "imp-42",
        ChannelHandlers::new().on_close(move || *on_close.borrow_mut() += 1),
    );

    bus.post(message("imp-42", "evt-1", "complete", Some(json!({}))));
    assert!(!channel.has_delivered("evt-1"));

    bus.post(message("imp-42", "evt-2", "close", None));
    assert_eq!(*closed.borrow(), 1);
    assert!(channel.has_delivered("evt-2"));
}

#[test]
fn stop_and_drop_deregister_the_listener() {
    let bus = MessageBus::new();
    let (mut channel, completed, _) = recording_channel(&bus, "imp-42");
    assert_eq!(bus.listener_count(), 1);
    assert_eq!(channel.state(), ChannelState::Listening);

    channel.stop();
    channel.stop();
    assert_eq!(channel.state(), ChannelState::Stopped);
    assert_eq!(bus.listener_count(), 0);

    bus.post(message("imp-42", "evt-1", "complete", None));
    assert!(completed.borrow().is_empty());

    let (second, _, _) = recording_channel(&bus, "imp-42");
    assert_eq!(bus.listener_count(), 1);
    drop(second);
    assert_eq!(bus.listener_count(), 0);
}

#[test]
fn handler_can_stop_its_own_channel() {
    let bus = MessageBus::new();
    let slot: Rc<RefCell<Option<EventChannel>>> = Rc::new(RefCell::new(None));
    let calls = Rc::new(RefCell::new(0));

    let stopper = Rc::clone(&slot);
    let counter = Rc::clone(&calls);
    let channel = EventChannel::start(
        &bus,
        "imp-42",
        ChannelHandlers::new().on_close(move || {
            *counter.borrow_mut() += 1;
            if let Some(channel) = stopper.borrow_mut().as_mut() {
                channel.stop();
            }
        }),
    );
    *slot.borrow_mut() = Some(channel);

    bus.post(message("imp-42", "evt-1", "close", None));
    bus.post(message("imp-42", "evt-2", "close", None));

    assert_eq!(*calls.borrow(), 1);
    assert_eq!(bus.listener_count(), 0);
}

#[test]
fn handler_can_post_while_dispatching() {
    let bus = MessageBus::new();
    let closed = Rc::new(RefCell::new(0));

    let reply_bus = bus.clone();
    let on_close = Rc::clone(&closed);
    let _channel: EventChannel = EventChannel::start(
        &bus,
        "imp-42",
        ChannelHandlers::new()
            .on_complete(move |_| {
                reply_bus.post(message("imp-42", "evt-2", "close", None));
            })
            .on_close(move || *on_close.borrow_mut() += 1),
    );

    bus.post(message("imp-42", "evt-1", "complete", None));

    assert_eq!(*closed.borrow(), 1);
}

#[derive(Debug, Deserialize, PartialEq)]
struct ImportResult {
    num_rows: u64,
    columns: Vec<String>,
}

#[test]
fn typed_payloads_decode_and_malformed_ones_are_dropped() {
    let bus = MessageBus::new();
    let results = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&results);
    let channel = EventChannel::<ImportResult>::start(
        &bus,
        "imp-42",
        ChannelHandlers::new().on_complete(move |data| sink.borrow_mut().push(data)),
    );

    bus.post(message("imp-42", "evt-1", "complete", Some(json!({"num_rows": "many"}))));
    bus.post(message(
        "imp-42",
        "evt-2",
        "complete",
        Some(json!({"num_rows": 2, "columns": ["email", "age"]})),
    ));

    assert_eq!(
        *results.borrow(),
        vec![Some(ImportResult {
            num_rows: 2,
            columns: vec!["email".to_string(), "age".to_string()],
        })]
    );
    assert!(!channel.has_delivered("evt-1"));
    assert!(channel.has_delivered("evt-2"));
}

#[test]
fn outbound_importer_messages_are_admitted() {
    let bus = MessageBus::new();
    let (channel, completed, closed) = recording_channel(&bus, "imp-42");

    let complete = ImporterMessage::complete("imp-42", json!({"num_rows": 1}));
    bus.post(complete.to_value().expect("serialize"));
    bus.post(
        ImporterMessage::<Value>::close("imp-42")
            .to_value()
            .expect("serialize"),
    );

    assert_eq!(completed.borrow().len(), 1);
    assert_eq!(*closed.borrow(), 1);
    assert!(channel.has_delivered(&complete.id));
}
