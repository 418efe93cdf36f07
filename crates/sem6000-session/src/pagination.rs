//! Scheduler slot retrieval across pages.
//!
//! The plug returns at most four slots per page together with the total
//! number of stored schedulers. Page 0 is always fetched; pages
//! `1..=total_count / 4` follow. At an exact multiple of four this asks for
//! one trailing page, which the plug answers with no entries.

use sem6000_protocol::{Codec, Command, Notification, NotificationKind, SchedulerPage};
use tracing::debug;

use crate::error::SessionResult;
use crate::session::{unexpected, Session};
use crate::transport::Transport;

impl<T: Transport, C: Codec> Session<T, C> {
    /// Fetch a single scheduler page.
    pub fn request_scheduler_page(&mut self, page: u8) -> SessionResult<SchedulerPage> {
        match self.exchange_command(Command::RequestScheduler { page })? {
            Notification::SchedulerPage(page) => Ok(page),
            other => Err(unexpected("request_scheduler", NotificationKind::SchedulerPage, other)),
        }
    }

    /// Fetch every scheduler slot.
    ///
    /// The returned page carries `total_count` from page 0 and the entries
    /// of all pages in retrieval order. Any failing page aborts the whole
    /// retrieval.
    pub fn request_scheduler(&mut self) -> SessionResult<SchedulerPage> {
        let first = self.request_scheduler_page(0)?;
        let total_count = first.total_count;
        let last_page = SchedulerPage::last_page_index(total_count);
        debug!(
            "request_scheduler: {} schedulers, fetching pages 0..={}",
            total_count, last_page
        );

        let mut entries = first.entries;
        for page in 1..=last_page {
            entries.extend(self.request_scheduler_page(page)?.entries);
        }

        Ok(SchedulerPage {
            total_count,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SessionConfig;
    use crate::session::Session;
    use crate::sim::SimulatedPlug;
    use sem6000_protocol::{Command, Scheduler};

    fn seeded(count: u8) -> Session<SimulatedPlug> {
        let schedulers = (0..count).map(|slot| {
            (
                slot,
                Scheduler::new(true, slot % 2 == 0, [0], 2024, 1, 1, 6, slot).unwrap(),
            )
        });
        let plug = SimulatedPlug::new().with_schedulers(schedulers);
        let mut session = Session::new(plug, &SessionConfig::default());
        session.authorize().unwrap();
        session
    }

    fn pages_requested(session: &Session<SimulatedPlug>) -> Vec<u8> {
        session
            .transport()
            .received_commands()
            .iter()
            .filter_map(|command| match command {
                Command::RequestScheduler { page } => Some(*page),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_empty_fetches_only_first_page() {
        let mut session = seeded(0);
        let all = session.request_scheduler().unwrap();
        assert_eq!(all.total_count, 0);
        assert!(all.entries.is_empty());
        assert_eq!(pages_requested(&session), vec![0]);
    }

    #[test]
    fn test_exact_multiple_fetches_trailing_page() {
        let mut session = seeded(4);
        let all = session.request_scheduler().unwrap();
        assert_eq!(all.entries.len(), 4);
        assert_eq!(pages_requested(&session), vec![0, 1]);
    }

    #[test]
    fn test_nine_fetches_three_pages_in_order() {
        let mut session = seeded(9);
        let all = session.request_scheduler().unwrap();
        assert_eq!(all.total_count, 9);
        assert_eq!(pages_requested(&session), vec![0, 1, 2]);
        let slots: Vec<u8> = all.entries.iter().map(|e| e.slot_id).collect();
        assert_eq!(slots, (0..9).collect::<Vec<_>>());
    }
}
