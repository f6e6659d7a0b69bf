//! Channel-based tree source.
//!
//! Receives status trees pushed through a tokio watch channel, for
//! collectors running in the same process.

use fleetwatch_types::StatusTree;
use tokio::sync::watch;

use super::{SourceError, TreeSource};

/// A source that receives status trees via a watch channel.
///
/// # Example
///
/// ```
/// use fleetwatch::{ChannelSource, TreeSource};
/// use fleetwatch_types::StatusTree;
///
/// let (tx, mut source) = ChannelSource::create("collector");
/// assert!(source.poll().is_some());
///
/// tx.send(StatusTree::builder().namespace("web.prod", |ns| ns).build()).unwrap();
/// assert_eq!(source.poll().map(|t| t.len()), Some(1));
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<StatusTree>,
    description: String,
    initial_returned: bool,
    last_error: Option<SourceError>,
}

impl ChannelSource {
    /// Create a source from the receiving end of a watch channel.
    pub fn new(receiver: watch::Receiver<StatusTree>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            initial_returned: false,
            last_error: None,
        }
    }

    /// Create a channel pair; the sender publishes trees to the source.
    pub fn create(source_description: &str) -> (watch::Sender<StatusTree>, Self) {
        let (tx, rx) = watch::channel(StatusTree::default());
        (tx, Self::new(rx, source_description))
    }
}

impl TreeSource for ChannelSource {
    fn poll(&mut self) -> Option<StatusTree> {
        if !self.initial_returned {
            self.initial_returned = true;
            self.receiver.mark_changed();
        }

        match self.receiver.has_changed() {
            Ok(true) => Some(self.receiver.borrow_and_update().clone()),
            Ok(false) => None,
            Err(_) => {
                // sender gone, but its last value may still be unseen
                let value = self.receiver.borrow_and_update();
                if value.has_changed() {
                    return Some(value.clone());
                }
                drop(value);
                if self.last_error.is_none() {
                    self.last_error = Some(SourceError::Closed(self.description.clone()));
                }
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&SourceError> {
        self.last_error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetwatch_types::Status;

    #[test]
    fn test_channel_source_poll() {
        let (tx, mut source) = ChannelSource::create("test");
        assert_eq!(source.description(), "channel: test");

        // initial (empty) tree first
        assert!(source.poll().unwrap().is_empty());
        assert!(source.poll().is_none());

        let mut tree = StatusTree::new();
        tree.insert("web.prod", "cpu-v1", "host-1", "load", Status::new("OK", 0));
        tx.send(tree).unwrap();

        assert_eq!(source.poll().unwrap().leaf_count(), 1);
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_channel_source_closed() {
        let (tx, mut source) = ChannelSource::create("test");
        let _ = source.poll();
        drop(tx);

        assert!(source.poll().is_none());
        assert!(matches!(source.error(), Some(SourceError::Closed(_))));
    }

    #[test]
    fn test_channel_source_delivers_last_tree_after_close() {
        let (tx, mut source) = ChannelSource::create("test");
        let _ = source.poll();

        let mut tree = StatusTree::new();
        tree.insert("final.prod", "cpu-v1", "host-1", "load", Status::new("CRITICAL", 0));
        tx.send(tree.clone()).unwrap();
        drop(tx);

        assert_eq!(source.poll(), Some(tree));
        assert!(source.error().is_none());

        assert!(source.poll().is_none());
        assert!(matches!(source.error(), Some(SourceError::Closed(_))));
    }
}
