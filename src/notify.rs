use log::{info, warn};
use std::sync::Arc;

pub type NotifyError = Box<dyn std::error::Error + Send + Sync>;

/// External pub/sub endpoint receiving fire-and-forget event messages.
pub trait Notifier: Send + Sync {
    fn publish(&self, subject: &str, message: &str) -> Result<(), NotifyError>;
}

pub type SharedNotifier = Arc<dyn Notifier>;

/// Best-effort delivery: failures are logged and never propagated.
pub fn send(notifier: &dyn Notifier, subject: &str, message: &str) {
    if let Err(err) = notifier.publish(subject, message) {
        warn!("notification \"{}\" not delivered: {}", subject, err);
    }
}

/// Default sink, logs each event at info level.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn publish(&self, subject: &str, message: &str) -> Result<(), NotifyError> {
        info!("{}: {}", subject, message);
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records every published message.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub messages: Mutex<Vec<(String, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn publish(&self, subject: &str, message: &str) -> Result<(), NotifyError> {
            self.messages
                .lock()
                .unwrap()
                .push((subject.to_owned(), message.to_owned()));
            Ok(())
        }
    }

    /// Always fails, for exercising the swallow path.
    pub struct FailingNotifier;

    impl Notifier for FailingNotifier {
        fn publish(&self, _subject: &str, _message: &str) -> Result<(), NotifyError> {
            Err("sink unreachable".into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn send_records_subject_and_message() {
        let notifier = RecordingNotifier::default();
        send(&notifier, "User Login", "User Admin logged in");
        let messages = notifier.messages.lock().unwrap();
        assert_eq!(
            messages.as_slice(),
            &[("User Login".to_owned(), "User Admin logged in".to_owned())]
        );
    }

    #[test]
    fn send_swallows_delivery_failure() {
        // Must not panic or propagate.
        send(&FailingNotifier, "New Feedback", "New feedback for Eleven - Rating: 4");
    }
}
