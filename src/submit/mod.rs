mod announce;
mod notify;
mod pipeline;

pub use announce::{Announcement, AnnouncementQueue, Announcer, Priority};
pub use notify::{
    HandoffError, LogNotifier, MailtoNotifier, Notifier, OutboundMessage, encode_component,
};
pub use pipeline::{
    DEFAULT_SETTLE_DELAY, FAILURE_MESSAGE, MailSettings, SUCCESS_MESSAGE, SubmissionPipeline,
    SubmitFailure, SubmitOutcome, build_record, compose_message,
};
