use std::sync::Arc;
use std::time::Duration;

use chatrelay::config::Settings;
use chatrelay::{Broker, BrokerError, BrokerState, Client, Message, MessageStore};
use futures::future::join_all;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn integration_concurrent_producers_reach_their_recipients() {
    let token = CancellationToken::new();
    let broker = Arc::new(Broker::new(token.clone(), 8));
    let dispatcher = Broker::spawn(broker.clone());

    let mut inboxes = Vec::new();
    for user in 0..4 {
        let (client, inbox) = Client::channel(format!("user{user}"), 256);
        broker.register_client(client);
        inboxes.push(inbox);
    }

    // every producer sends 50 ordered messages to one recipient
    let producers = (0..4).map(|user| {
        let broker = broker.clone();
        tokio::spawn(async move {
            for seq in 0..50 {
                let msg = Message::new("producer", format!("user{user}"), "x", false, seq);
                broker.send_message(msg).await?;
            }
            Ok::<_, BrokerError>(())
        })
    });
    for result in join_all(producers).await {
        result.unwrap().unwrap();
    }

    for inbox in inboxes.iter_mut() {
        for seq in 0..50 {
            let msg = timeout(WAIT, inbox.recv()).await.unwrap().unwrap();
            assert_eq!(msg.timestamp, seq);
        }
    }

    token.cancel();
    timeout(WAIT, dispatcher).await.unwrap().unwrap();
    assert_eq!(broker.state(), BrokerState::Terminated);
}

#[tokio::test]
async fn integration_chat_session_records_and_relays() {
    let settings = Settings::default();
    let token = CancellationToken::new();
    let broker = Arc::new(Broker::with_settings(token.clone(), &settings.broker));
    let store = MessageStore::with_settings(&settings.store);
    let dispatcher = Broker::spawn(broker.clone());

    let (alice, mut alice_rx) = Client::channel("alice", 16);
    let (bob, mut bob_rx) = Client::channel("bob", 16);
    broker.register_client(alice);
    broker.register_client(bob);

    let outgoing = [
        Message::broadcast("alice", "hello everyone"),
        Message::direct("bob", "alice", "hi alice"),
        Message::direct("alice", "bob", "hi bob"),
    ];
    for msg in outgoing.iter() {
        store.append(msg).unwrap();
        broker.send_message(msg.clone()).await.unwrap();
    }

    let alice_got: Vec<_> = [
        timeout(WAIT, alice_rx.recv()).await.unwrap().unwrap(),
        timeout(WAIT, alice_rx.recv()).await.unwrap().unwrap(),
    ]
    .into_iter()
    .map(|m| m.content)
    .collect();
    assert_eq!(alice_got, vec!["hello everyone", "hi alice"]);

    let bob_got: Vec<_> = [
        timeout(WAIT, bob_rx.recv()).await.unwrap().unwrap(),
        timeout(WAIT, bob_rx.recv()).await.unwrap().unwrap(),
    ]
    .into_iter()
    .map(|m| m.content)
    .collect();
    assert_eq!(bob_got, vec!["hello everyone", "hi bob"]);

    let from_alice: Vec<_> = store
        .list(Some("alice"))
        .into_iter()
        .map(|m| m.content)
        .collect();
    assert_eq!(from_alice, vec!["hello everyone", "hi bob"]);

    // a departing user stops receiving
    broker.unregister_user("bob");
    broker
        .send_message(Message::broadcast("alice", "bob left"))
        .await
        .unwrap();
    let last = timeout(WAIT, alice_rx.recv()).await.unwrap().unwrap();
    assert_eq!(last.content, "bob left");
    assert!(bob_rx.try_recv().is_err());

    token.cancel();
    timeout(WAIT, broker.terminated()).await.unwrap();
    dispatcher.await.unwrap();

    assert!(broker.send_message(Message::broadcast("alice", "bye")).await.is_ok());
    assert!(alice_rx.try_recv().is_err());
}
