//! Event logging for auditing and replay comparison.
//!
//! Every movement of money, goods or labor produces one event:
//! - **Money**: cheque issued, cheque deposited, loan granted, repayment
//! - **Labor**: hire, layoff
//! - **Goods**: production, purchase
//! - **Ownership**: owners assigned, dividend paid
//!
//! Two runs with the same seed and configuration produce identical logs.
//!
//! # Example
//!
//! ```rust
//! use macro_simulator_core_rs::{AgentId, Event, EventLog};
//!
//! let mut log = EventLog::new();
//! log.log(Event::Purchase {
//!     period: 3,
//!     buyer: AgentId::shareholder(0),
//!     supplier: AgentId::firm(2),
//!     volume: 5,
//!     value: 50,
//! });
//!
//! assert_eq!(log.events_at_period(3).len(), 1);
//! assert_eq!(log.events_for_agent(AgentId::firm(2)).len(), 1);
//! ```

use crate::agents::AgentId;
use serde::{Deserialize, Serialize};

/// Simulation event capturing a state change.
///
/// All events include the period in which they happened.
/// Events are logged in the order they occur within a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// A cheque was drawn (drawer account debited)
    ChequeIssued {
        period: usize,
        serial: u64,
        drawer: AgentId,
        payee: AgentId,
        amount: i64,
    },

    /// A cheque was deposited (payee account credited)
    ChequeDeposited {
        period: usize,
        serial: u64,
        payee: AgentId,
        amount: i64,
    },

    /// New money lent to an account holder
    Loan {
        period: usize,
        borrower: AgentId,
        amount: i64,
        term: usize,
        collateralized: bool,
    },

    /// Money destroyed by repayment
    Repayment {
        period: usize,
        borrower: AgentId,
        amount: i64,
    },

    Hire {
        period: usize,
        employer: AgentId,
        worker: AgentId,
        contract_id: u64,
        wage: i64,
        term: usize,
    },

    Layoff {
        period: usize,
        employer: AgentId,
        worker: AgentId,
        contract_id: u64,
    },

    Production {
        period: usize,
        firm: AgentId,
        volume: i64,
        value: i64,
    },

    Purchase {
        period: usize,
        buyer: AgentId,
        supplier: AgentId,
        volume: i64,
        value: i64,
    },

    OwnersAssigned {
        period: usize,
        firm: AgentId,
        owners: usize,
    },

    Dividend {
        period: usize,
        firm: AgentId,
        shareholder: AgentId,
        amount: i64,
    },
}

impl Event {
    /// Get the period when this event occurred
    pub fn period(&self) -> usize {
        match self {
            Event::ChequeIssued { period, .. } => *period,
            Event::ChequeDeposited { period, .. } => *period,
            Event::Loan { period, .. } => *period,
            Event::Repayment { period, .. } => *period,
            Event::Hire { period, .. } => *period,
            Event::Layoff { period, .. } => *period,
            Event::Production { period, .. } => *period,
            Event::Purchase { period, .. } => *period,
            Event::OwnersAssigned { period, .. } => *period,
            Event::Dividend { period, .. } => *period,
        }
    }

    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::ChequeIssued { .. } => "ChequeIssued",
            Event::ChequeDeposited { .. } => "ChequeDeposited",
            Event::Loan { .. } => "Loan",
            Event::Repayment { .. } => "Repayment",
            Event::Hire { .. } => "Hire",
            Event::Layoff { .. } => "Layoff",
            Event::Production { .. } => "Production",
            Event::Purchase { .. } => "Purchase",
            Event::OwnersAssigned { .. } => "OwnersAssigned",
            Event::Dividend { .. } => "Dividend",
        }
    }

    /// Agents involved in the event (initiator first)
    pub fn agents(&self) -> Vec<AgentId> {
        match self {
            Event::ChequeIssued { drawer, payee, .. } => vec![*drawer, *payee],
            Event::ChequeDeposited { payee, .. } => vec![*payee],
            Event::Loan { borrower, .. } => vec![*borrower],
            Event::Repayment { borrower, .. } => vec![*borrower],
            Event::Hire {
                employer, worker, ..
            } => vec![*employer, *worker],
            Event::Layoff {
                employer, worker, ..
            } => vec![*employer, *worker],
            Event::Production { firm, .. } => vec![*firm],
            Event::Purchase {
                buyer, supplier, ..
            } => vec![*buyer, *supplier],
            Event::OwnersAssigned { firm, .. } => vec![*firm],
            Event::Dividend {
                firm, shareholder, ..
            } => vec![*firm, *shareholder],
        }
    }
}

/// Event log for storing and querying simulation events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Get the number of events logged
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get all events
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get events for a specific period
    pub fn events_at_period(&self, period: usize) -> Vec<&Event> {
        self.events.iter().filter(|e| e.period() == period).collect()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get events involving a specific agent
    pub fn events_for_agent(&self, agent: AgentId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.agents().contains(&agent))
            .collect()
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_period_and_type() {
        let event = Event::Layoff {
            period: 7,
            employer: AgentId::firm(0),
            worker: AgentId::worker(4),
            contract_id: 12,
        };

        assert_eq!(event.period(), 7);
        assert_eq!(event.event_type(), "Layoff");
    }

    #[test]
    fn test_events_of_type() {
        let mut log = EventLog::new();
        log.log(Event::Loan {
            period: 1,
            borrower: AgentId::firm(0),
            amount: 30,
            term: 12,
            collateralized: false,
        });
        log.log(Event::Repayment {
            period: 2,
            borrower: AgentId::firm(0),
            amount: 10,
        });

        assert_eq!(log.events_of_type("Loan").len(), 1);
        assert_eq!(log.events_at_period(2).len(), 1);
        assert_eq!(log.events_for_agent(AgentId::firm(0)).len(), 2);

        log.clear();
        assert!(log.is_empty());
    }
}
