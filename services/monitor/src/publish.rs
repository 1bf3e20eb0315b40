//! Fan out a decoded [`types::SemanticEvent`] onto every KV channel it
//! belongs on (spec.md §6). Called only after the originating Store
//! transaction has committed (spec.md §4.4 step 5).

use kv::KvClient;
use types::SemanticEvent;

pub async fn publish_semantic_event(kv: &KvClient, event: &SemanticEvent) {
    let now = chrono::Utc::now().timestamp();
    let payload = event.payload(now);
    for channel in event.channels() {
        kv.publish(channel, &payload).await;
    }
}

pub async fn publish_all(kv: &KvClient, events: &[SemanticEvent]) {
    for event in events {
        publish_semantic_event(kv, event).await;
    }
}
