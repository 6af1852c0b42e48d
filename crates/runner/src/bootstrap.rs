//! Bootstrap - wires a broker to a venue and the account mirror
//!
//! Order matters: the venue needs the broker's sink before the broker can
//! start dispatching to it, and the mirror must be attached before any
//! push can arrive.

use relay_clock::Calendar;
use relay_engine::Broker;
use relay_ports::Clock;
use relay_venue::{AccountMirror, Market, SimulatedVenue};
use std::sync::Arc;

use crate::config::RunnerConfig;
use crate::error::Result;

/// A started broker with its venue and mirror
pub struct Bootstrap {
    pub broker: Broker,
    pub venue: Arc<SimulatedVenue>,
    pub mirror: Arc<AccountMirror>,
    pub calendar: Calendar,
}

impl Bootstrap {
    /// Run against the simulated venue seeded with [`Market::sample`]
    pub fn simulated(config: &RunnerConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let calendar = Calendar::kst(clock.clone());
        let market = Market::sample(calendar.local_now().naive_local());
        Self::with_market(config, clock, market)
    }

    pub fn with_market(config: &RunnerConfig, clock: Arc<dyn Clock>, market: Market) -> Result<Self> {
        config.validate()?;
        let calendar = Calendar::kst(clock.clone());
        let broker = Broker::new(config.broker.clone(), clock);
        let venue = SimulatedVenue::new(broker.sink(), config.simulator_latency(), market);

        let mirror = AccountMirror::new();
        mirror.attach(&broker);

        broker.start(venue.clone())?;
        log::info!(
            "Bootstrapped broker on {} (min interval {} ms, timeout {} ms)",
            relay_ports::Venue::name(venue.as_ref()),
            config.broker.min_interval_ms,
            config.broker.request_timeout_ms
        );

        Ok(Self {
            broker,
            venue,
            mirror,
            calendar,
        })
    }
}
