//! A toy node: consensus publishes, mempool and RPC observe.
//!
//! Run with `cargo run --example node`.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};

use event_switch::{AnyData, EventName, EventSwitch, Fireable, Result, Service};

#[derive(Debug)]
struct NewBlock {
    height: u64,
    txs: Vec<String>,
}

#[derive(Debug)]
struct Vote {
    height: u64,
    validator: &'static str,
}

/// Consensus only needs to publish, so it gets the narrow interface.
struct Consensus<'a> {
    events: &'a dyn Fireable<AnyData>,
    height: u64,
}

impl Consensus<'_> {
    fn commit(&mut self, txs: &[&str]) {
        self.height += 1;
        for validator in ["alice", "bob"] {
            let vote: AnyData = Arc::new(Vote {
                height: self.height,
                validator,
            });
            self.events.fire_event(EventName::from("Vote"), &vote);
        }
        let block: AnyData = Arc::new(NewBlock {
            height: self.height,
            txs: txs.iter().map(|tx| tx.to_string()).collect(),
        });
        self.events.fire_event(EventName::from("NewBlock"), &block);
    }
}

fn main() -> Result {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let evsw = Arc::new(EventSwitch::<AnyData>::default());
    let service: &dyn Service = &*evsw;
    service.start()?;

    let pending = Arc::new(Mutex::new(vec!["tx1".to_string(), "tx2".into(), "tx3".into()]));
    let mempool = pending.clone();
    evsw.add_listener_for_event("mempool", "NewBlock", move |data: &AnyData| {
        if let Some(block) = data.downcast_ref::<NewBlock>() {
            mempool.lock().unwrap().retain(|tx| !block.txs.contains(tx));
        }
    });

    let votes = Arc::new(AtomicU64::new(0));
    let seen = votes.clone();
    evsw.add_listener_for_event("rpc", "Vote", move |data: &AnyData| {
        if let Some(vote) = data.downcast_ref::<Vote>() {
            println!("rpc: vote from {} at {}", vote.validator, vote.height);
            seen.fetch_add(1, Ordering::SeqCst);
        }
    });
    evsw.add_listener_for_event("rpc", "NewBlock", |data: &AnyData| {
        if let Some(block) = data.downcast_ref::<NewBlock>() {
            println!("rpc: block {} with {} txs", block.height, block.txs.len());
        }
    });

    let mut consensus = Consensus {
        events: &*evsw,
        height: 0,
    };
    consensus.commit(&["tx1"]);

    // RPC server shuts down; nothing reaches it afterwards
    evsw.remove_listener("rpc");
    consensus.commit(&["tx2"]);

    println!(
        "votes seen by rpc: {}, pending txs: {:?}",
        votes.load(Ordering::SeqCst),
        pending.lock().unwrap()
    );

    service.stop()?;
    Ok(())
}
