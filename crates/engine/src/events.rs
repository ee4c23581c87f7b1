//! Channel-backed observer for node state transitions.
//!
//! The executor reports progress through a plain callback. Consumers that
//! would rather read transitions from a queue (a UI task, a log shipper) can
//! pass [`channel_observer`] as that callback and drain the receiver.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::NodeExecutionState;

/// One state transition of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStateEvent {
    pub node_id: String,
    pub state: NodeExecutionState,
}

/// A state-change callback that forwards every transition into `sender`.
///
/// Send errors are ignored; the receiver may have been dropped.
pub fn channel_observer(
    sender: mpsc::UnboundedSender<NodeStateEvent>,
) -> impl FnMut(&str, &NodeExecutionState) + Send {
    move |node_id: &str, state: &NodeExecutionState| {
        let _ = sender.send(NodeStateEvent {
            node_id: node_id.to_owned(),
            state: state.clone(),
        });
    }
}
