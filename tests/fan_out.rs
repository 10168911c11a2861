use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
        mpsc,
    },
    thread,
};

use event_switch::{AnyData, EventName, EventSwitch};

fn started() -> Arc<EventSwitch<u64>> {
    let evsw = Arc::new(EventSwitch::<u64>::default());
    evsw.start().unwrap();
    evsw
}

/// Fire `offset..offset + 1000` into `event` and return the sum sent.
fn send_events(evsw: &EventSwitch<u64>, event: &str, offset: u64) -> u64 {
    let mut sent = 0;
    for i in offset..offset + 1000 {
        sent += i;
        evsw.fire_event(event, &i);
    }
    sent
}

fn forward_to(tx: &mpsc::Sender<u64>) -> impl Fn(&u64) + Send + Sync + 'static {
    let tx = tx.clone();
    move |n: &u64| {
        let _ = tx.send(*n);
    }
}

#[test]
fn test_add_listener_for_event() {
    let evsw = Arc::new(EventSwitch::<AnyData>::default());
    evsw.start().unwrap();

    let (tx, rx) = mpsc::channel::<AnyData>();
    evsw.add_listener_for_event("listener", "event", move |data: &AnyData| {
        let _ = tx.send(data.clone());
    });

    let publisher = evsw.clone();
    thread::spawn(move || publisher.fire_event("event", &(Arc::new("data") as AnyData)));

    let received = rx.recv().unwrap();
    assert_eq!(received.downcast_ref::<&str>(), Some(&"data"));
}

#[test]
fn test_add_listener_for_multiple_events() {
    let evsw = started();
    let (tx, rx) = mpsc::channel();
    evsw.add_listener_for_event("listener", "event", forward_to(&tx));
    drop(tx);

    let publisher = evsw.clone();
    let sender = thread::spawn(move || send_events(&publisher, "event", 1));
    let checksum = sender.join().unwrap();

    // dropping the switch drops the last sender
    drop(evsw);
    let received: u64 = rx.iter().sum();
    assert_eq!(checksum, 500_500);
    assert_eq!(received, checksum);
}

#[test]
fn test_add_listener_for_different_events() {
    let evsw = started();
    let sum = Arc::new(AtomicU64::new(0));
    for event in ["event1", "event2", "event3"] {
        let sum = sum.clone();
        evsw.add_listener_for_event("listener", event, move |n: &u64| {
            sum.fetch_add(*n, Ordering::SeqCst);
        });
    }

    let evsw = &*evsw;
    let checksum: u64 = thread::scope(|s| {
        let senders: Vec<_> = ["event1", "event2", "event3"]
            .into_iter()
            .map(|event| s.spawn(move || send_events(evsw, event, 1)))
            .collect();
        senders.into_iter().map(|h| h.join().unwrap()).sum()
    });

    assert_eq!(checksum, 3 * 500_500);
    assert_eq!(sum.load(Ordering::SeqCst), checksum);
}

#[test]
fn test_add_different_listener_for_different_events() {
    let evsw = started();
    let sum1 = Arc::new(AtomicU64::new(0));
    let sum2 = Arc::new(AtomicU64::new(0));
    for event in ["event1", "event2", "event3"] {
        let sum = sum1.clone();
        evsw.add_listener_for_event("listener1", event, move |n: &u64| {
            sum.fetch_add(*n, Ordering::SeqCst);
        });
    }
    for event in ["event2", "event3"] {
        let sum = sum2.clone();
        evsw.add_listener_for_event("listener2", event, move |n: &u64| {
            sum.fetch_add(*n, Ordering::SeqCst);
        });
    }

    let (event1, event2, event3) = thread::scope(|s| {
        let h1 = s.spawn(|| send_events(&evsw, "event1", 1));
        let h2 = s.spawn(|| send_events(&evsw, "event2", 1001));
        let h3 = s.spawn(|| send_events(&evsw, "event3", 2001));
        (h1.join().unwrap(), h2.join().unwrap(), h3.join().unwrap())
    });

    assert_eq!(sum1.load(Ordering::SeqCst), event1 + event2 + event3);
    assert_eq!(sum2.load(Ordering::SeqCst), event2 + event3);
}

#[test]
fn test_add_and_remove_listener_for_events() {
    let evsw = started();
    let sum1 = Arc::new(AtomicU64::new(0));
    let sum2 = Arc::new(AtomicU64::new(0));
    let s1 = sum1.clone();
    evsw.add_listener_for_event("listener", "event1", move |n: &u64| {
        s1.fetch_add(*n, Ordering::SeqCst);
    });
    let s2 = sum2.clone();
    evsw.add_listener_for_event("listener", "event2", move |n: &u64| {
        s2.fetch_add(*n, Ordering::SeqCst);
    });

    let checksum1 = send_events(&evsw, "event1", 1);
    evsw.remove_listener("listener");
    let checksum2 = send_events(&evsw, "event2", 1001);

    assert_eq!(sum1.load(Ordering::SeqCst), checksum1);
    assert_eq!(checksum2, 1_500_500);
    assert_eq!(sum2.load(Ordering::SeqCst), 0);
    assert!(evsw.events_of("listener").is_empty());
    assert!(evsw.event_names().is_empty());
}

#[test]
fn test_remove_listener_for_single_event() {
    let evsw = started();
    let sum = Arc::new(AtomicU64::new(0));
    for event in ["event1", "event2"] {
        let sum = sum.clone();
        evsw.add_listener_for_event("listener", event, move |n: &u64| {
            sum.fetch_add(*n, Ordering::SeqCst);
        });
    }

    evsw.remove_listener_for_event("listener", "event1");
    evsw.remove_listener_for_event("listener", "event1");
    evsw.remove_listener_for_event("nobody", "event2");

    assert_eq!(evsw.fire_event("event1", &5), 0);
    assert_eq!(evsw.fire_event("event2", &7), 1);
    assert_eq!(sum.load(Ordering::SeqCst), 7);
    assert_eq!(evsw.events_of("listener"), vec![EventName::from("event2")]);
}

#[test]
fn test_resubscribe_replaces_callback() {
    let evsw = started();
    let first = Arc::new(AtomicU64::new(0));
    let second = Arc::new(AtomicU64::new(0));

    let f = first.clone();
    evsw.add_listener_for_event("listener", "event", move |_: &u64| {
        f.fetch_add(1, Ordering::SeqCst);
    });
    let s = second.clone();
    evsw.add_listener_for_event("listener", "event", move |_: &u64| {
        s.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(evsw.listener_count("event"), 1);
    assert_eq!(evsw.fire_event("event", &0), 1);
    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[test]
fn test_delivery_follows_subscription_order() {
    let evsw = started();
    let log = Arc::new(Mutex::new(Vec::new()));
    for name in ["consensus", "mempool", "rpc"] {
        let log = log.clone();
        evsw.add_listener_for_event(name, "NewBlock", move |h: &u64| {
            log.lock().unwrap().push((name, *h));
        });
    }
    // replacing keeps the original slot
    let l = log.clone();
    evsw.add_listener_for_event("consensus", "NewBlock", move |h: &u64| {
        l.lock().unwrap().push(("consensus-v2", *h));
    });

    evsw.fire_event("NewBlock", &1);
    evsw.fire_event("NewBlock", &2);

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            ("consensus-v2", 1),
            ("mempool", 1),
            ("rpc", 1),
            ("consensus-v2", 2),
            ("mempool", 2),
            ("rpc", 2),
        ]
    );
}
